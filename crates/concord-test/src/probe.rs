//! Recording subscriber

use std::time::Duration;

use async_trait::async_trait;
use concord_core::Snapshot;
use concord_flow::Destination;
use concord_runtime::{spawn, Actor, Address, Context, SpawnOptions};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::time::timeout;

/// Default wait for a single snapshot
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

struct Recorder<V> {
    tx: UnboundedSender<Snapshot<V>>,
}

#[async_trait]
impl<V: Send + 'static> Actor for Recorder<V> {
    type Message = Snapshot<V>;

    async fn handle(&mut self, snapshot: Snapshot<V>, _ctx: &mut Context<Snapshot<V>>) {
        let _ = self.tx.send(snapshot);
    }
}

/// Subscriber that records every snapshot it is sent
pub struct Probe<V> {
    address: Address<Snapshot<V>>,
    rx: UnboundedReceiver<Snapshot<V>>,
    seen: Vec<Snapshot<V>>,
}

impl<V: Clone + Send + 'static> Probe<V> {
    pub fn spawn(name: &str) -> Self {
        let (tx, rx) = unbounded_channel();
        let address = spawn(Recorder { tx }, SpawnOptions::named(format!("probe.{}", name)));
        Probe {
            address,
            rx,
            seen: Vec::new(),
        }
    }

    pub fn destination(&self) -> Destination<V> {
        self.address.recipient()
    }

    /// Next snapshot, waiting up to [`DEFAULT_TIMEOUT`]
    pub async fn recv(&mut self) -> Option<Snapshot<V>> {
        self.recv_timeout(DEFAULT_TIMEOUT).await
    }

    pub async fn recv_timeout(&mut self, wait: Duration) -> Option<Snapshot<V>> {
        let snapshot = timeout(wait, self.rx.recv()).await.ok().flatten()?;
        self.seen.push(snapshot.clone());
        Some(snapshot)
    }

    /// True when nothing arrives within `window`
    pub async fn expect_silence(&mut self, window: Duration) -> bool {
        self.recv_timeout(window).await.is_none()
    }

    /// Everything already delivered, without waiting
    pub fn drain(&mut self) -> Vec<Snapshot<V>> {
        let mut drained = Vec::new();
        while let Ok(snapshot) = self.rx.try_recv() {
            self.seen.push(snapshot.clone());
            drained.push(snapshot);
        }
        drained
    }

    /// Receive until nothing arrives for `quiet`; returns the last snapshot
    /// received during this call, `None` if nothing arrived
    pub async fn settle(&mut self, quiet: Duration) -> Option<&Snapshot<V>> {
        let before = self.seen.len();
        while self.recv_timeout(quiet).await.is_some() {}
        self.seen[before..].last()
    }

    /// Every snapshot received so far, in arrival order
    pub fn seen(&self) -> &[Snapshot<V>] {
        &self.seen
    }

    pub fn stop(&self) {
        self.address.stop();
    }
}
