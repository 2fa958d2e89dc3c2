//! The authority actor
//!
//! Spawns its pipeline as children when started, then routes subscriptions
//! to the terminal publisher and events to the reducer. Stopping the
//! authority stops the pipeline.

use async_trait::async_trait;
use concord_core::{AuthorityId, CombinedInputs};
use concord_flow::{
    CombinerConfig, Connection, Destination, Distinct, PublisherMessage, Reducer, ReducerMessage, RelayConfig,
    ReplayConfig, ReplayPublisher, ValueReducer, VersionAndValueEq, Versioner,
};
use concord_runtime::{spawn, Actor, Address, Context, Recipient, SpawnOptions};

use crate::{AuthorityConfig, AuthorityHandle, AuthorityMessage};

/// Entry points of a running pipeline
pub(crate) struct Wiring<E, O> {
    pub(crate) publisher: Address<PublisherMessage<O>>,
    /// `None` for authorities that take no events
    pub(crate) events: Option<Recipient<E>>,
    /// Connection control of the combiner; `None` without one
    pub(crate) inputs: Option<Recipient<Connection>>,
}

/// What a pipeline builder knows about the authority it builds for
pub(crate) struct Stage {
    pub(crate) id: AuthorityId,
    name: String,
    config: AuthorityConfig,
}

impl Stage {
    pub(crate) fn options(&self, part: &str) -> SpawnOptions {
        SpawnOptions::named(format!("{}.{}", self.name, part))
    }

    /// Terminal replay publisher
    pub(crate) fn spawn_publisher<M, O>(&self, ctx: &mut Context<M>) -> Address<PublisherMessage<O>>
    where
        M: Send + 'static,
        O: Clone + Send + 'static,
    {
        ctx.spawn(
            ReplayPublisher::<O>::new(ReplayConfig::depth(self.config.replay_depth)),
            self.options("publisher"),
        )
    }

    pub(crate) fn combiner_config<V>(&self, destination: Destination<CombinedInputs<V>>) -> CombinerConfig<V> {
        CombinerConfig {
            subscribe_on_start: self.config.manage_own_subscriptions,
            initial_destination: Some(destination),
        }
    }
}

type Build<E, O> = Box<dyn FnOnce(&Stage, &mut Context<AuthorityMessage<E, O>>) -> Wiring<E, O> + Send>;

struct AuthorityActor<E, O> {
    stage: Stage,
    build: Option<Build<E, O>>,
    wiring: Option<Wiring<E, O>>,
}

#[async_trait]
impl<E, O> Actor for AuthorityActor<E, O>
where
    E: Send + 'static,
    O: Clone + Send + 'static,
{
    type Message = AuthorityMessage<E, O>;

    async fn started(&mut self, ctx: &mut Context<AuthorityMessage<E, O>>) {
        if let Some(build) = self.build.take() {
            self.wiring = Some(build(&self.stage, ctx));
            tracing::debug!(
                authority = %self.stage.id,
                stages = ctx.child_count(),
                "pipeline spawned"
            );
        }
    }

    async fn handle(&mut self, message: AuthorityMessage<E, O>, _ctx: &mut Context<AuthorityMessage<E, O>>) {
        let Some(wiring) = &self.wiring else {
            return;
        };

        match message {
            AuthorityMessage::Subscribe(destination) => {
                wiring.publisher.dispatch(PublisherMessage::Subscribe(destination));
            }
            AuthorityMessage::Unsubscribe(destination) => {
                wiring.publisher.dispatch(PublisherMessage::Unsubscribe(destination));
            }
            AuthorityMessage::Event(event) => match &wiring.events {
                Some(events) => {
                    if !events.deliver(event) {
                        tracing::trace!(authority = %self.stage.id, "reducer stopped, event dropped");
                    }
                }
                None => {
                    tracing::warn!(authority = %self.stage.id, "authority takes no events, event ignored");
                }
            },
            AuthorityMessage::Connection(connection) => match &wiring.inputs {
                Some(inputs) => {
                    tracing::debug!(authority = %self.stage.id, ?connection, "input connection change");
                    inputs.deliver(connection);
                }
                None => {
                    tracing::warn!(authority = %self.stage.id, ?connection, "authority has no inputs, ignored");
                }
            },
        }
    }
}

/// Spawn an authority actor that runs `build` when it starts
pub(crate) fn spawn_authority<E, O, F>(config: AuthorityConfig, build: F) -> AuthorityHandle<E, O>
where
    E: Send + 'static,
    O: Clone + Send + 'static,
    F: FnOnce(&Stage, &mut Context<AuthorityMessage<E, O>>) -> Wiring<E, O> + Send + 'static,
{
    let id = AuthorityId::generate();
    let name = config
        .name
        .clone()
        .unwrap_or_else(|| format!("authority{}", id));

    let actor = AuthorityActor {
        stage: Stage {
            id,
            name: name.clone(),
            config,
        },
        build: Some(Box::new(build)),
        wiring: None,
    };
    let address = spawn(actor, SpawnOptions::named(name));

    AuthorityHandle::new(id, address)
}

/// ValueReducer → Distinct → Versioner → ReplayPublisher, spawned back to
/// front so every stage exists before anything can feed it
pub(crate) fn spawn_event_tail<R, M>(
    stage: &Stage,
    ctx: &mut Context<M>,
    reducer: R,
) -> (Address<ReducerMessage<R>>, Address<PublisherMessage<R::Output>>)
where
    R: Reducer,
    R::Output: Clone + PartialEq + Sync,
    M: Send + 'static,
{
    let publisher = stage.spawn_publisher::<M, R::Output>(ctx);
    let versioner = ctx.spawn(
        Versioner::<R::Output>::new(stage.id, RelayConfig::to(publisher.recipient())),
        stage.options("versioner"),
    );
    let distinct = ctx.spawn(
        Distinct::<R::Output, _>::new(VersionAndValueEq, RelayConfig::to(versioner.recipient())),
        stage.options("distinct"),
    );
    let reducer = ctx.spawn(
        ValueReducer::new(reducer, RelayConfig::to(distinct.recipient())),
        stage.options("reducer"),
    );

    (reducer, publisher)
}
