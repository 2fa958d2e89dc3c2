//! Publisher - broadcasts snapshots to a subscriber set

use std::collections::HashMap;

use async_trait::async_trait;
use concord_core::{ActorId, Snapshot};
use concord_runtime::{Actor, Context};

use crate::{Destination, PublisherMessage};

/// Publisher configuration
#[derive(Clone, Debug)]
pub struct PublisherConfig<V> {
    pub initial_subscribers: Vec<Destination<V>>,
}

impl<V> Default for PublisherConfig<V> {
    fn default() -> Self {
        PublisherConfig {
            initial_subscribers: Vec::new(),
        }
    }
}

/// Membership-only subscriber set; keeps no history
#[derive(Debug)]
pub struct Publisher<V> {
    subscribers: HashMap<ActorId, Destination<V>>,
}

impl<V: Clone + Send + 'static> Publisher<V> {
    pub fn new(config: PublisherConfig<V>) -> Self {
        let mut publisher = Publisher {
            subscribers: HashMap::new(),
        };
        for subscriber in config.initial_subscribers {
            publisher.subscribe(subscriber);
        }
        publisher
    }

    pub fn subscribe(&mut self, subscriber: Destination<V>) {
        self.subscribers.insert(subscriber.id(), subscriber);
    }

    pub fn unsubscribe(&mut self, subscriber: &Destination<V>) {
        self.subscribers.remove(&subscriber.id());
    }

    pub fn is_subscribed(&self, subscriber: &Destination<V>) -> bool {
        self.subscribers.contains_key(&subscriber.id())
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Deliver to every current subscriber, no retry.
    /// Subscribers whose actor has stopped are pruned.
    pub fn broadcast(&mut self, snapshot: &Snapshot<V>) {
        self.subscribers.retain(|id, subscriber| {
            let delivered = subscriber.deliver(snapshot.clone());
            if !delivered {
                tracing::debug!(subscriber = %id, "pruning stopped subscriber");
            }
            delivered
        });
    }
}

#[async_trait]
impl<V: Clone + Send + 'static> Actor for Publisher<V> {
    type Message = PublisherMessage<V>;

    async fn handle(&mut self, message: PublisherMessage<V>, _ctx: &mut Context<PublisherMessage<V>>) {
        match message {
            PublisherMessage::Snapshot(snapshot) => self.broadcast(&snapshot),
            PublisherMessage::Subscribe(subscriber) => self.subscribe(subscriber),
            PublisherMessage::Unsubscribe(subscriber) => self.unsubscribe(&subscriber),
        }
    }
}
