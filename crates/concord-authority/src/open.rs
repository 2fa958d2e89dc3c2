//! Open authorities - state mutated directly from outside

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use concord_core::CombinedInputs;
use concord_flow::Reducer;

use crate::{spawn_pure_event, AuthorityConfig, AuthorityHandle};

pub enum OpenEvent<T> {
    /// Replace the value outright
    Replace(T),
    /// Compute the next value from the current one
    Transform(Arc<dyn Fn(&T) -> T + Send + Sync>),
}

impl<T> OpenEvent<T> {
    pub fn transform<F>(f: F) -> Self
    where
        F: Fn(&T) -> T + Send + Sync + 'static,
    {
        OpenEvent::Transform(Arc::new(f))
    }
}

impl<T: Clone> Clone for OpenEvent<T> {
    fn clone(&self) -> Self {
        match self {
            OpenEvent::Replace(value) => OpenEvent::Replace(value.clone()),
            OpenEvent::Transform(f) => OpenEvent::Transform(Arc::clone(f)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for OpenEvent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenEvent::Replace(value) => f.debug_tuple("Replace").field(value).finish(),
            OpenEvent::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}

pub type OpenAuthority<T> = AuthorityHandle<OpenEvent<T>, T>;

struct OpenReducer<T> {
    initial: T,
}

#[async_trait]
impl<T> Reducer for OpenReducer<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Inputs = CombinedInputs<()>;
    type State = T;
    type Event = OpenEvent<T>;
    type Output = T;

    async fn reduce_inputs(&self, state: Option<T>, _inputs: &CombinedInputs<()>) -> T {
        state.unwrap_or_else(|| self.initial.clone())
    }

    async fn reduce_event(&self, state: T, event: OpenEvent<T>, _inputs: &CombinedInputs<()>) -> T {
        match event {
            OpenEvent::Replace(value) => value,
            OpenEvent::Transform(f) => f(&state),
        }
    }

    async fn select(&self, state: &T, _inputs: &CombinedInputs<()>) -> T {
        state.clone()
    }
}

/// Spawn an open authority seeded with `initial`
pub fn spawn_open<T>(initial: T, config: AuthorityConfig) -> OpenAuthority<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    spawn_pure_event(OpenReducer { initial }, config)
}

impl<T> AuthorityHandle<OpenEvent<T>, T>
where
    T: Send + 'static,
{
    pub fn replace(&self, value: T) {
        self.dispatch_event(OpenEvent::Replace(value));
    }

    pub fn transform<F>(&self, f: F)
    where
        F: Fn(&T) -> T + Send + Sync + 'static,
    {
        self.dispatch_event(OpenEvent::transform(f));
    }
}
