//! ValueSelector - pure derivation with cache carry-over

use std::marker::PhantomData;
use std::mem;

use async_trait::async_trait;
use concord_core::Snapshot;
use concord_runtime::{Actor, Context};

use crate::{Relay, RelayConfig, RelayMessage};

/// Derives an output from inputs and the previous cache, returning the
/// next cache alongside
#[async_trait]
pub trait Selector<I, O, C>: Send + Sync + 'static {
    async fn select(&self, inputs: &I, cache: C) -> (O, C);
}

#[async_trait]
impl<I, O, C, F> Selector<I, O, C> for F
where
    I: Sync + 'static,
    O: Send + 'static,
    C: Send + 'static,
    F: Fn(&I, C) -> (O, C) + Send + Sync + 'static,
{
    async fn select(&self, inputs: &I, cache: C) -> (O, C) {
        self(inputs, cache)
    }
}

pub struct ValueSelector<I, O, C, S> {
    selector: S,
    cache: C,
    relay: Relay<O>,
    _input: PhantomData<fn(I)>,
}

impl<I, O, C, S> ValueSelector<I, O, C, S>
where
    I: Send + Sync + 'static,
    O: Send + 'static,
    C: Default + Send + 'static,
    S: Selector<I, O, C>,
{
    pub fn new(selector: S, config: RelayConfig<O>) -> Self {
        ValueSelector {
            selector,
            cache: C::default(),
            relay: Relay::new(config),
            _input: PhantomData,
        }
    }

    async fn on_snapshot(&mut self, snapshot: Snapshot<I>) {
        let cache = mem::take(&mut self.cache);
        let (output, cache) = self.selector.select(&snapshot.value, cache).await;
        self.cache = cache;
        self.relay.forward(Snapshot::anonymous(output, snapshot.version));
    }
}

#[async_trait]
impl<I, O, C, S> Actor for ValueSelector<I, O, C, S>
where
    I: Send + Sync + 'static,
    O: Send + 'static,
    C: Default + Send + 'static,
    S: Selector<I, O, C>,
{
    type Message = RelayMessage<I, O>;

    async fn handle(&mut self, message: RelayMessage<I, O>, _ctx: &mut Context<RelayMessage<I, O>>) {
        if let Some(snapshot) = self.relay.route(message) {
            self.on_snapshot(snapshot).await;
        }
    }
}
