//! ReplayPublisher - publisher with a bounded replay history

use std::collections::VecDeque;

use async_trait::async_trait;
use concord_core::Snapshot;
use concord_runtime::{Actor, Context};

use crate::{Destination, Publisher, PublisherConfig, PublisherMessage};

/// Replay configuration
#[derive(Clone, Debug)]
pub struct ReplayConfig<V> {
    /// Number of most recent snapshots replayed to each new subscriber
    pub depth: usize,
    pub initial_subscribers: Vec<Destination<V>>,
}

impl<V> ReplayConfig<V> {
    pub fn depth(depth: usize) -> Self {
        ReplayConfig {
            depth,
            initial_subscribers: Vec::new(),
        }
    }
}

impl<V> Default for ReplayConfig<V> {
    fn default() -> Self {
        ReplayConfig::depth(1)
    }
}

pub struct ReplayPublisher<V> {
    publisher: Publisher<V>,
    history: VecDeque<Snapshot<V>>,
    depth: usize,
}

impl<V: Clone + Send + 'static> ReplayPublisher<V> {
    pub fn new(config: ReplayConfig<V>) -> Self {
        ReplayPublisher {
            publisher: Publisher::new(PublisherConfig {
                initial_subscribers: config.initial_subscribers,
            }),
            history: VecDeque::with_capacity(config.depth),
            depth: config.depth,
        }
    }

    /// Retained snapshots, oldest first
    pub fn history(&self) -> impl Iterator<Item = &Snapshot<V>> + '_ {
        self.history.iter()
    }

    pub fn publish(&mut self, snapshot: Snapshot<V>) {
        self.publisher.broadcast(&snapshot);

        if self.depth == 0 {
            return;
        }
        if self.history.len() == self.depth {
            self.history.pop_front();
        }
        self.history.push_back(snapshot);
    }

    /// Replay the full history, oldest first, then join the live set.
    /// A subscriber already in the live set gets nothing replayed.
    pub fn subscribe(&mut self, subscriber: Destination<V>) {
        if self.publisher.is_subscribed(&subscriber) {
            tracing::trace!(subscriber = %subscriber.id(), "already subscribed");
            return;
        }
        for snapshot in &self.history {
            if !subscriber.deliver(snapshot.clone()) {
                tracing::debug!(subscriber = %subscriber.id(), "subscriber stopped during replay");
                return;
            }
        }
        self.publisher.subscribe(subscriber);
    }

    pub fn unsubscribe(&mut self, subscriber: &Destination<V>) {
        self.publisher.unsubscribe(subscriber);
    }

    pub fn subscriber_count(&self) -> usize {
        self.publisher.len()
    }
}

#[async_trait]
impl<V: Clone + Send + 'static> Actor for ReplayPublisher<V> {
    type Message = PublisherMessage<V>;

    async fn handle(&mut self, message: PublisherMessage<V>, _ctx: &mut Context<PublisherMessage<V>>) {
        match message {
            PublisherMessage::Snapshot(snapshot) => self.publish(snapshot),
            PublisherMessage::Subscribe(subscriber) => self.subscribe(subscriber),
            PublisherMessage::Unsubscribe(subscriber) => self.unsubscribe(&subscriber),
        }
    }
}
