//! Identity and version stamping
//!
//! - SemanticBrander: relabels a snapshot with a fixed token
//! - Versioner: relabels and injects its own monotonically increasing
//!   counter into the version vector

use async_trait::async_trait;
use concord_core::{AuthorityId, Snapshot};
use concord_runtime::{Actor, Context};

use crate::{Relay, RelayConfig, RelayMessage};

/// Stateless relabeling; value and version untouched
pub struct SemanticBrander<V> {
    id: AuthorityId,
    relay: Relay<V>,
}

impl<V: Send + 'static> SemanticBrander<V> {
    pub fn new(id: AuthorityId, config: RelayConfig<V>) -> Self {
        SemanticBrander {
            id,
            relay: Relay::new(config),
        }
    }
}

#[async_trait]
impl<V: Send + 'static> Actor for SemanticBrander<V> {
    type Message = RelayMessage<V>;

    async fn handle(&mut self, message: RelayMessage<V>, _ctx: &mut Context<RelayMessage<V>>) {
        if let Some(snapshot) = self.relay.route(message) {
            self.relay.forward(snapshot.with_semantic(self.id));
        }
    }
}

/// Gives every forwarded snapshot a strictly increasing counter under
/// its own token, independent of gaps in the input version
pub struct Versioner<V> {
    id: AuthorityId,
    last_issued: Option<u64>,
    relay: Relay<V>,
}

impl<V: Send + 'static> Versioner<V> {
    pub fn new(id: AuthorityId, config: RelayConfig<V>) -> Self {
        Versioner {
            id,
            last_issued: None,
            relay: Relay::new(config),
        }
    }

    fn stamp(&mut self, snapshot: Snapshot<V>) -> Snapshot<V> {
        let counter = self.last_issued.map_or(0, |last| last + 1);
        self.last_issued = Some(counter);

        let Snapshot { value, mut version, .. } = snapshot;
        version.set(self.id, counter);
        Snapshot::new(value, version, Some(self.id))
    }
}

#[async_trait]
impl<V: Send + 'static> Actor for Versioner<V> {
    type Message = RelayMessage<V>;

    async fn handle(&mut self, message: RelayMessage<V>, _ctx: &mut Context<RelayMessage<V>>) {
        if let Some(snapshot) = self.relay.route(message) {
            let stamped = self.stamp(snapshot);
            self.relay.forward(stamped);
        }
    }
}
