//! Authority configuration

/// Construction-time options shared by every authority kind
#[derive(Clone, Debug)]
pub struct AuthorityConfig {
    /// Subscribe to declared inputs on start. When off, inputs are attached
    /// with [`AuthorityHandle::connect`](crate::AuthorityHandle::connect).
    /// Inputs still attached are detached on stop either way.
    pub manage_own_subscriptions: bool,
    /// Snapshots replayed to each new subscriber
    pub replay_depth: usize,
    /// Name recorded on the tracing spans of the authority and its pipeline
    pub name: Option<String>,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            manage_own_subscriptions: true,
            replay_depth: 1,
            name: None,
        }
    }
}

impl AuthorityConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}
