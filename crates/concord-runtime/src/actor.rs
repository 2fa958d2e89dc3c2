//! Actor trait and the per-actor run loop

use async_trait::async_trait;
use concord_core::ActorId;
use tokio::sync::mpsc;
use tracing::Instrument;

use crate::address::{Address, Envelope, StopHandle};

/// Spawn-time options
#[derive(Clone, Debug, Default)]
pub struct SpawnOptions {
    /// Name recorded on the actor's tracing span
    pub name: Option<String>,
}

impl SpawnOptions {
    pub fn named(name: impl Into<String>) -> Self {
        SpawnOptions {
            name: Some(name.into()),
        }
    }
}

/// A single-threaded, cooperative message handler.
///
/// Hooks run inside the actor's own task, so none of them ever interleaves
/// with message handling.
#[async_trait]
pub trait Actor: Send + 'static {
    type Message: Send + 'static;

    /// Runs once, before the first message
    async fn started(&mut self, _ctx: &mut Context<Self::Message>) {}

    async fn handle(&mut self, message: Self::Message, ctx: &mut Context<Self::Message>);

    /// Teardown hook, runs once when a stop request is reached.
    /// Children are stopped after it returns.
    async fn stopping(&mut self, _ctx: &mut Context<Self::Message>) {}
}

/// Per-actor context handed to every hook
pub struct Context<M> {
    address: Address<M>,
    children: Vec<StopHandle>,
}

impl<M: Send + 'static> Context<M> {
    #[inline]
    pub fn id(&self) -> ActorId {
        self.address.id()
    }

    /// This actor's own address
    #[inline]
    pub fn address(&self) -> &Address<M> {
        &self.address
    }

    /// Spawn a child; it is stopped when this actor stops
    pub fn spawn<A: Actor>(&mut self, actor: A, options: SpawnOptions) -> Address<A::Message> {
        let child = spawn(actor, options);
        self.children.push(child.stop_handle());
        child
    }

    /// Request this actor's own teardown
    pub fn stop(&self) {
        self.address.stop();
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

/// Spawn a root actor on the current tokio runtime.
///
/// # Panics
///
/// Panics when called outside a tokio runtime.
pub fn spawn<A: Actor>(actor: A, options: SpawnOptions) -> Address<A::Message> {
    let (tx, rx) = mpsc::unbounded_channel();
    let address = Address::new(ActorId::generate(), tx);

    let span = tracing::debug_span!(
        "actor",
        id = %address.id(),
        name = options.name.as_deref().unwrap_or("anonymous"),
    );
    let ctx = Context {
        address: address.clone(),
        children: Vec::new(),
    };
    tokio::spawn(run(actor, ctx, rx).instrument(span));

    address
}

async fn run<A: Actor>(
    mut actor: A,
    mut ctx: Context<A::Message>,
    mut rx: mpsc::UnboundedReceiver<Envelope<A::Message>>,
) {
    tracing::debug!("actor started");
    actor.started(&mut ctx).await;

    while let Some(envelope) = rx.recv().await {
        match envelope {
            Envelope::Message(message) => actor.handle(message, &mut ctx).await,
            Envelope::Stop => break,
        }
    }

    actor.stopping(&mut ctx).await;

    for child in ctx.children.drain(..) {
        tracing::trace!(child = %child.id, "stopping child");
        child.stop();
    }

    // Closes the mailbox; later deliveries fail
    drop(rx);
    tracing::debug!("actor stopped");
}
