//! ValueReducer - stateful derivation over events and combined inputs
//!
//! Until the first combined snapshot arrives the reducer has nothing to
//! reduce against, so events are queued and replayed, in arrival order,
//! right after that first snapshot.

use std::collections::VecDeque;
use std::mem;

use async_trait::async_trait;
use concord_core::{Snapshot, VersionVector};
use concord_runtime::{Actor, Context};

use crate::{Destination, Relay, RelayConfig};

/// Reduction over inputs and events, plus projection of the state to output
#[async_trait]
pub trait Reducer: Send + Sync + 'static {
    type Inputs: Send + Sync + 'static;
    type State: Send + Sync + 'static;
    type Event: Send + 'static;
    type Output: Send + 'static;

    /// New inputs arrived; `state` is `None` before the first reduction
    async fn reduce_inputs(&self, state: Option<Self::State>, inputs: &Self::Inputs) -> Self::State;

    async fn reduce_event(&self, state: Self::State, event: Self::Event, inputs: &Self::Inputs)
        -> Self::State;

    async fn select(&self, state: &Self::State, inputs: &Self::Inputs) -> Self::Output;
}

pub enum ReducerMessage<R: Reducer> {
    Combined(Snapshot<R::Inputs>),
    Event(R::Event),
    SetDestination(Destination<R::Output>),
    UnsetDestination,
}

impl<R: Reducer> From<Snapshot<R::Inputs>> for ReducerMessage<R> {
    fn from(snapshot: Snapshot<R::Inputs>) -> Self {
        ReducerMessage::Combined(snapshot)
    }
}

enum Phase<R: Reducer> {
    Pending {
        queue: VecDeque<R::Event>,
        state: Option<R::State>,
    },
    Live {
        state: R::State,
        inputs: R::Inputs,
        version: VersionVector,
    },
}

impl<R: Reducer> Default for Phase<R> {
    fn default() -> Self {
        Phase::Pending {
            queue: VecDeque::new(),
            state: None,
        }
    }
}

pub struct ValueReducer<R: Reducer> {
    reducer: R,
    phase: Phase<R>,
    relay: Relay<R::Output>,
}

impl<R: Reducer> ValueReducer<R> {
    pub fn new(reducer: R, config: RelayConfig<R::Output>) -> Self {
        ValueReducer {
            reducer,
            phase: Phase::default(),
            relay: Relay::new(config),
        }
    }

    /// Seed the state handed to the first `reduce_inputs`
    pub fn with_initial_state(mut self, state: R::State) -> Self {
        if let Phase::Pending { state: seed, .. } = &mut self.phase {
            *seed = Some(state);
        }
        self
    }

    pub fn is_live(&self) -> bool {
        matches!(self.phase, Phase::Live { .. })
    }

    async fn on_combined(&mut self, snapshot: Snapshot<R::Inputs>) {
        let Snapshot {
            value: inputs,
            version,
            ..
        } = snapshot;

        let (prior, queued) = match mem::take(&mut self.phase) {
            Phase::Pending { queue, state } => (state, queue),
            Phase::Live { state, .. } => (Some(state), VecDeque::new()),
        };

        let mut state = self.reducer.reduce_inputs(prior, &inputs).await;
        if !queued.is_empty() {
            tracing::debug!(count = queued.len(), "replaying queued events");
        }
        for event in queued {
            state = self.reducer.reduce_event(state, event, &inputs).await;
        }

        let value = self.reducer.select(&state, &inputs).await;
        self.relay.forward(Snapshot::anonymous(value, version.clone()));
        self.phase = Phase::Live {
            state,
            inputs,
            version,
        };
    }

    async fn on_event(&mut self, event: R::Event) {
        match mem::take(&mut self.phase) {
            Phase::Pending { mut queue, state } => {
                queue.push_back(event);
                tracing::trace!(queued = queue.len(), "event queued until inputs arrive");
                self.phase = Phase::Pending { queue, state };
            }
            Phase::Live {
                state,
                inputs,
                version,
            } => {
                let state = self.reducer.reduce_event(state, event, &inputs).await;
                let value = self.reducer.select(&state, &inputs).await;
                self.relay.forward(Snapshot::anonymous(value, version.clone()));
                self.phase = Phase::Live {
                    state,
                    inputs,
                    version,
                };
            }
        }
    }
}

#[async_trait]
impl<R: Reducer> Actor for ValueReducer<R> {
    type Message = ReducerMessage<R>;

    async fn handle(&mut self, message: ReducerMessage<R>, _ctx: &mut Context<ReducerMessage<R>>) {
        match message {
            ReducerMessage::Combined(snapshot) => self.on_combined(snapshot).await,
            ReducerMessage::Event(event) => self.on_event(event).await,
            ReducerMessage::SetDestination(destination) => self.relay.set_destination(destination),
            ReducerMessage::UnsetDestination => self.relay.unset_destination(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{collector, next, silent};
    use concord_core::AuthorityId;
    use concord_runtime::{spawn, SpawnOptions};
    use std::time::Duration;

    /// Sums events; output is the sum offset by the current input
    struct Accumulate;

    #[async_trait]
    impl Reducer for Accumulate {
        type Inputs = i64;
        type State = i64;
        type Event = i64;
        type Output = i64;

        async fn reduce_inputs(&self, state: Option<i64>, _inputs: &i64) -> i64 {
            state.unwrap_or(0)
        }

        async fn reduce_event(&self, state: i64, event: i64, _inputs: &i64) -> i64 {
            tokio::time::sleep(Duration::from_millis(2)).await;
            state + event
        }

        async fn select(&self, state: &i64, inputs: &i64) -> i64 {
            state + inputs
        }
    }

    #[tokio::test]
    async fn test_events_queue_until_first_inputs() {
        let id = AuthorityId::generate();
        let (out, mut rx) = collector::<i64>();
        let reducer = spawn(
            ValueReducer::new(Accumulate, RelayConfig::to(out)),
            SpawnOptions::named("reducer"),
        );

        reducer.dispatch(ReducerMessage::Event(1));
        reducer.dispatch(ReducerMessage::Event(2));
        assert!(silent(&mut rx).await);

        let v0: VersionVector = [(id, 0)].into_iter().collect();
        reducer.dispatch(Snapshot::anonymous(100i64, v0.clone()).into());
        let first = next(&mut rx).await;
        assert_eq!(first.value, 103);
        assert_eq!(first.version, v0);
        assert_eq!(first.semantic, None);

        // Events reuse the last combined version
        reducer.dispatch(ReducerMessage::Event(4));
        let second = next(&mut rx).await;
        assert_eq!(second.value, 107);
        assert_eq!(second.version, v0);

        let v1: VersionVector = [(id, 1)].into_iter().collect();
        reducer.dispatch(Snapshot::anonymous(200i64, v1.clone()).into());
        let third = next(&mut rx).await;
        assert_eq!(third.value, 207);
        assert_eq!(third.version, v1);
    }

    #[tokio::test]
    async fn test_initial_state_seeds_first_reduction() {
        let (out, mut rx) = collector::<i64>();
        let reducer = spawn(
            ValueReducer::new(Accumulate, RelayConfig::to(out)).with_initial_state(10),
            SpawnOptions::named("reducer"),
        );

        reducer.dispatch(ReducerMessage::Event(5));
        reducer.dispatch(Snapshot::anonymous(0i64, VersionVector::new()).into());
        assert_eq!(next(&mut rx).await.value, 15);
    }

    #[tokio::test]
    async fn test_destination_change() {
        let (first, mut first_rx) = collector::<i64>();
        let (second, mut second_rx) = collector::<i64>();
        let reducer = spawn(
            ValueReducer::new(Accumulate, RelayConfig::to(first)),
            SpawnOptions::default(),
        );

        reducer.dispatch(Snapshot::anonymous(1i64, VersionVector::new()).into());
        assert_eq!(next(&mut first_rx).await.value, 1);

        reducer.dispatch(ReducerMessage::SetDestination(second));
        reducer.dispatch(ReducerMessage::Event(1));
        assert_eq!(next(&mut second_rx).await.value, 2);

        reducer.dispatch(ReducerMessage::UnsetDestination);
        reducer.dispatch(ReducerMessage::Event(1));
        assert!(silent(&mut first_rx).await);
        assert!(silent(&mut second_rx).await);
    }

    #[test]
    fn test_starts_pending() {
        let reducer = ValueReducer::new(Accumulate, RelayConfig::default());
        assert!(!reducer.is_live());
    }
}
