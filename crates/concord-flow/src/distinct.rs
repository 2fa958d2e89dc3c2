//! Distinct - suppresses snapshots equal to the last forwarded one

use async_trait::async_trait;
use concord_core::Snapshot;
use concord_runtime::{Actor, Context};

use crate::{Relay, RelayConfig, RelayMessage};

/// Equality test between the last forwarded snapshot and a new one.
///
/// May suspend; the owning actor does not start its next message until
/// the comparison completes.
#[async_trait]
pub trait Comparator<V>: Send + Sync + 'static {
    async fn equal(&self, previous: &Snapshot<V>, current: &Snapshot<V>) -> bool;
}

#[async_trait]
impl<V, F> Comparator<V> for F
where
    V: Sync + 'static,
    F: Fn(&Snapshot<V>, &Snapshot<V>) -> bool + Send + Sync + 'static,
{
    async fn equal(&self, previous: &Snapshot<V>, current: &Snapshot<V>) -> bool {
        self(previous, current)
    }
}

/// Compares values only
#[derive(Clone, Copy, Debug, Default)]
pub struct ValueEq;

#[async_trait]
impl<V: PartialEq + Sync + 'static> Comparator<V> for ValueEq {
    async fn equal(&self, previous: &Snapshot<V>, current: &Snapshot<V>) -> bool {
        previous.value == current.value
    }
}

/// Compares version vectors and values; a version bump alone is a change
#[derive(Clone, Copy, Debug, Default)]
pub struct VersionAndValueEq;

#[async_trait]
impl<V: PartialEq + Sync + 'static> Comparator<V> for VersionAndValueEq {
    async fn equal(&self, previous: &Snapshot<V>, current: &Snapshot<V>) -> bool {
        previous.version == current.version && previous.value == current.value
    }
}

pub struct Distinct<V, C> {
    comparator: C,
    last: Option<Snapshot<V>>,
    relay: Relay<V>,
}

impl<V, C> Distinct<V, C>
where
    V: Clone + Send + Sync + 'static,
    C: Comparator<V>,
{
    pub fn new(comparator: C, config: RelayConfig<V>) -> Self {
        Distinct {
            comparator,
            last: None,
            relay: Relay::new(config),
        }
    }

    async fn on_snapshot(&mut self, snapshot: Snapshot<V>) {
        if let Some(previous) = &self.last {
            if self.comparator.equal(previous, &snapshot).await {
                tracing::trace!("unchanged snapshot suppressed");
                return;
            }
        }

        self.last = Some(snapshot.clone());
        self.relay.forward(snapshot);
    }
}

#[async_trait]
impl<V, C> Actor for Distinct<V, C>
where
    V: Clone + Send + Sync + 'static,
    C: Comparator<V>,
{
    type Message = RelayMessage<V>;

    async fn handle(&mut self, message: RelayMessage<V>, _ctx: &mut Context<RelayMessage<V>>) {
        if let Some(snapshot) = self.relay.route(message) {
            self.on_snapshot(snapshot).await;
        }
    }
}
