//! Event authorities - state reduced from events and inputs
//!
//! The output gets the authority's own monotonically increasing counter. An
//! emission is suppressed only when both the merged input version and the
//! selected value are unchanged.

use concord_core::{CombinedInputs, Snapshot, VersionVector};
use concord_flow::{Combiner, Reducer, ReducerMessage, Source};

use crate::authority::{spawn_authority, spawn_event_tail, Wiring};
use crate::{AuthorityConfig, AuthorityHandle};

/// Spawn an event authority over `sources`
pub fn spawn_event<V, R>(sources: Vec<Source<V>>, reducer: R, config: AuthorityConfig) -> AuthorityHandle<R::Event, R::Output>
where
    V: Clone + Send + Sync + 'static,
    R: Reducer<Inputs = CombinedInputs<V>>,
    R::Output: Clone + PartialEq + Sync,
{
    spawn_authority(config, move |stage, ctx| {
        let (reducer, publisher) = spawn_event_tail(stage, ctx, reducer);
        let combiner = ctx.spawn(
            Combiner::new(sources, stage.combiner_config(reducer.recipient())),
            stage.options("combiner"),
        );

        Wiring {
            publisher,
            events: Some(reducer.recipient_map(ReducerMessage::Event)),
            inputs: Some(combiner.recipient()),
        }
    })
}

/// Spawn an event authority without inputs.
///
/// The reducer is unblocked at start by one synthetic snapshot of empty
/// inputs and an empty version.
pub fn spawn_pure_event<R>(reducer: R, config: AuthorityConfig) -> AuthorityHandle<R::Event, R::Output>
where
    R: Reducer,
    R::Inputs: Default,
    R::Output: Clone + PartialEq + Sync,
{
    spawn_authority(config, move |stage, ctx| {
        let (reducer, publisher) = spawn_event_tail(stage, ctx, reducer);
        reducer.dispatch(ReducerMessage::Combined(Snapshot::anonymous(
            R::Inputs::default(),
            VersionVector::new(),
        )));

        Wiring {
            publisher,
            events: Some(reducer.recipient_map(ReducerMessage::Event)),
            inputs: None,
        }
    })
}
