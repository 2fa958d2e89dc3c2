//! Relay - the single-destination forwarder every primitive embeds

use async_trait::async_trait;
use concord_core::Snapshot;
use concord_runtime::{Actor, Context};

use crate::{Destination, RelayMessage};

/// Relay configuration
#[derive(Clone, Debug)]
pub struct RelayConfig<V> {
    pub initial_destination: Option<Destination<V>>,
}

impl<V> RelayConfig<V> {
    pub fn to(destination: Destination<V>) -> Self {
        RelayConfig {
            initial_destination: Some(destination),
        }
    }
}

impl<V> Default for RelayConfig<V> {
    fn default() -> Self {
        RelayConfig {
            initial_destination: None,
        }
    }
}

/// Holds an optional destination and forwards snapshots to it
#[derive(Debug)]
pub struct Relay<V> {
    destination: Option<Destination<V>>,
}

impl<V: Send + 'static> Relay<V> {
    pub fn new(config: RelayConfig<V>) -> Self {
        Relay {
            destination: config.initial_destination,
        }
    }

    pub fn destination(&self) -> Option<&Destination<V>> {
        self.destination.as_ref()
    }

    pub fn set_destination(&mut self, destination: Destination<V>) {
        self.destination = Some(destination);
    }

    pub fn unset_destination(&mut self) {
        self.destination = None;
    }

    /// Forward a snapshot. Without a destination the snapshot is dropped.
    pub fn forward(&self, snapshot: Snapshot<V>) {
        match &self.destination {
            Some(destination) => {
                if !destination.deliver(snapshot) {
                    tracing::trace!(destination = %destination.id(), "destination stopped");
                }
            }
            None => tracing::trace!("no destination, snapshot dropped"),
        }
    }

    /// Apply destination changes; hand back the snapshot, if that is what
    /// the message carried
    pub fn route<I>(&mut self, message: RelayMessage<I, V>) -> Option<Snapshot<I>> {
        match message {
            RelayMessage::Snapshot(snapshot) => Some(snapshot),
            RelayMessage::SetDestination(destination) => {
                self.set_destination(destination);
                None
            }
            RelayMessage::UnsetDestination => {
                self.unset_destination();
                None
            }
        }
    }
}

#[async_trait]
impl<V: Send + 'static> Actor for Relay<V> {
    type Message = RelayMessage<V>;

    async fn handle(&mut self, message: RelayMessage<V>, _ctx: &mut Context<RelayMessage<V>>) {
        if let Some(snapshot) = self.route(message) {
            self.forward(snapshot);
        }
    }
}
