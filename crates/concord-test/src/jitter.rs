//! Jitter injection
//!
//! Delays each snapshot by a random amount while keeping per-edge FIFO, so
//! that snapshots travelling on different edges overtake each other.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use concord_core::ActorId;
use concord_flow::{Relay, RelayConfig, RelayMessage, Source, SubscriptionRequest};
use concord_runtime::{spawn, Actor, Address, Context, SpawnOptions};
use parking_lot::Mutex;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Jitter configuration
#[derive(Clone, Debug)]
pub struct JitterConfig {
    pub min_ms: u64,
    pub max_ms: u64,
    /// Fixed seed for reproducible runs; entropy when `None`
    pub seed: Option<u64>,
}

impl Default for JitterConfig {
    fn default() -> Self {
        JitterConfig {
            min_ms: 0,
            max_ms: 10,
            seed: None,
        }
    }
}

impl JitterConfig {
    fn rng(&self, stream: u64) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream)),
            None => StdRng::from_entropy(),
        }
    }
}

/// Relay that sleeps a random delay before each forward
pub struct JitterRelay<V> {
    delay: Uniform<u64>,
    rng: StdRng,
    relay: Relay<V>,
}

impl<V: Send + 'static> JitterRelay<V> {
    pub fn new(config: &JitterConfig, relay: RelayConfig<V>) -> Self {
        Self::with_stream(config, 0, relay)
    }

    fn with_stream(config: &JitterConfig, stream: u64, relay: RelayConfig<V>) -> Self {
        JitterRelay {
            delay: Uniform::new_inclusive(config.min_ms, config.max_ms.max(config.min_ms)),
            rng: config.rng(stream),
            relay: Relay::new(relay),
        }
    }
}

#[async_trait]
impl<V: Send + 'static> Actor for JitterRelay<V> {
    type Message = RelayMessage<V>;

    async fn handle(&mut self, message: RelayMessage<V>, _ctx: &mut Context<RelayMessage<V>>) {
        if let Some(snapshot) = self.relay.route(message) {
            let delay = Duration::from_millis(self.delay.sample(&mut self.rng));
            tokio::time::sleep(delay).await;
            self.relay.forward(snapshot);
        }
    }
}

/// Wrap `source` so each subscriber is fed through its own jitter relay
pub fn jittered<V>(source: Source<V>, config: JitterConfig) -> Source<V>
where
    V: Send + 'static,
{
    let id = source.id();
    let relays: Arc<Mutex<HashMap<ActorId, Address<RelayMessage<V>>>>> = Arc::default();
    let streams = Arc::new(Mutex::new(0u64));

    Source::new(id, move |request: SubscriptionRequest<V>| match request {
        SubscriptionRequest::Subscribe(destination) => {
            let stream = {
                let mut streams = streams.lock();
                *streams += 1;
                *streams
            };
            let subscriber = destination.id();
            let relay = spawn(
                JitterRelay::with_stream(&config, stream, RelayConfig::to(destination)),
                SpawnOptions::named(format!("jitter.{}", id)),
            );
            source.subscribe(relay.recipient());
            let previous = relays.lock().insert(subscriber, relay);
            if let Some(previous) = previous {
                source.unsubscribe(previous.recipient());
                previous.stop();
            }
        }
        SubscriptionRequest::Unsubscribe(destination) => {
            let relay = relays.lock().remove(&destination.id());
            match relay {
                Some(relay) => {
                    source.unsubscribe(relay.recipient());
                    relay.stop();
                }
                None => tracing::warn!(subscriber = %destination.id(), "unsubscribe for unknown subscriber"),
            }
        }
    })
}
