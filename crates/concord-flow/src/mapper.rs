//! Mapper - value transformation in front of a relay

use std::marker::PhantomData;

use async_trait::async_trait;
use concord_core::Snapshot;
use concord_runtime::{Actor, Context};

use crate::{Relay, RelayConfig, RelayMessage};

/// Pure, possibly asynchronous value transform
#[async_trait]
pub trait Transform<A, B>: Send + Sync + 'static {
    async fn apply(&self, value: A) -> B;
}

#[async_trait]
impl<A, B, F> Transform<A, B> for F
where
    A: Send + 'static,
    B: Send + 'static,
    F: Fn(A) -> B + Send + Sync + 'static,
{
    async fn apply(&self, value: A) -> B {
        self(value)
    }
}

/// Rewrites a snapshot's value, keeping version and identity
pub struct Mapper<A, B, T> {
    transform: T,
    relay: Relay<B>,
    _input: PhantomData<fn(A)>,
}

impl<A, B, T> Mapper<A, B, T>
where
    A: Send + 'static,
    B: Send + 'static,
    T: Transform<A, B>,
{
    pub fn new(transform: T, config: RelayConfig<B>) -> Self {
        Mapper {
            transform,
            relay: Relay::new(config),
            _input: PhantomData,
        }
    }
}

#[async_trait]
impl<A, B, T> Actor for Mapper<A, B, T>
where
    A: Send + 'static,
    B: Send + 'static,
    T: Transform<A, B>,
{
    type Message = RelayMessage<A, B>;

    async fn handle(&mut self, message: RelayMessage<A, B>, _ctx: &mut Context<RelayMessage<A, B>>) {
        let Some(snapshot) = self.relay.route(message) else {
            return;
        };
        let Snapshot {
            value,
            version,
            semantic,
        } = snapshot;
        let value = self.transform.apply(value).await;
        self.relay.forward(Snapshot::new(value, version, semantic));
    }
}
