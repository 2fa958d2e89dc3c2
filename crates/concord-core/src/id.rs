//! Identity types for Concord
//!
//! Tokens are process-local: drawn from a monotonically increasing counter,
//! never reused and never serialized.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_AUTHORITY_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_ACTOR_ID: AtomicU64 = AtomicU64::new(1);

/// Authority identity - opaque token used both as a version-vector key and
/// as the semantic tag of a snapshot
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AuthorityId(u64);

impl AuthorityId {
    /// Issue a fresh token, distinct from every token issued before it
    #[inline]
    pub fn generate() -> Self {
        AuthorityId(NEXT_AUTHORITY_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw counter value, for logging only
    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for AuthorityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Authority(#{})", self.0)
    }
}

impl fmt::Display for AuthorityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Actor identity - names one mailbox in the runtime
///
/// Distinct from [`AuthorityId`]: an authority owns several actors, and
/// subscriber sets are keyed by the receiving actor.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(u64);

impl ActorId {
    #[inline]
    pub fn generate() -> Self {
        ActorId(NEXT_ACTOR_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Actor({})", self.0)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
