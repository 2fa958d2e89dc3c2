//! Snapshot collector for primitive tests

use std::time::Duration;

use async_trait::async_trait;
use concord_core::Snapshot;
use concord_runtime::{spawn, Actor, Context, SpawnOptions};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::time::timeout;

use crate::Destination;

struct Collector<V> {
    tx: UnboundedSender<Snapshot<V>>,
}

#[async_trait]
impl<V: Send + 'static> Actor for Collector<V> {
    type Message = Snapshot<V>;

    async fn handle(&mut self, snapshot: Snapshot<V>, _ctx: &mut Context<Snapshot<V>>) {
        let _ = self.tx.send(snapshot);
    }
}

pub(crate) fn collector<V: Send + 'static>() -> (Destination<V>, UnboundedReceiver<Snapshot<V>>) {
    let (tx, rx) = unbounded_channel();
    let address = spawn(Collector { tx }, SpawnOptions::named("collector"));
    (address.recipient(), rx)
}

pub(crate) async fn next<V>(rx: &mut UnboundedReceiver<Snapshot<V>>) -> Snapshot<V> {
    timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for snapshot")
        .expect("collector closed")
}

/// True when nothing arrives within a short grace period
pub(crate) async fn silent<V>(rx: &mut UnboundedReceiver<Snapshot<V>>) -> bool {
    timeout(Duration::from_millis(50), rx.recv()).await.is_err()
}
