//! State snapshots
//!
//! A snapshot is the only thing that ever flows between components: a value,
//! the version vector it was computed from, and optionally the authority that
//! emitted it.

use crate::{AuthorityId, VersionVector};

/// Immutable `(value, version, identity)` triple
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot<V> {
    pub value: V,
    pub version: VersionVector,
    /// Emitting authority; `None` for intermediate output such as a
    /// combiner's merged value before it is re-branded
    pub semantic: Option<AuthorityId>,
}

impl<V> Snapshot<V> {
    pub fn new(value: V, version: VersionVector, semantic: Option<AuthorityId>) -> Self {
        Snapshot {
            value,
            version,
            semantic,
        }
    }

    /// Untagged snapshot
    pub fn anonymous(value: V, version: VersionVector) -> Self {
        Snapshot::new(value, version, None)
    }

    /// Same value and version, identity replaced
    pub fn with_semantic(self, semantic: AuthorityId) -> Self {
        Snapshot {
            semantic: Some(semantic),
            ..self
        }
    }

    /// Transform the value, keeping provenance
    pub fn map_value<U, F>(self, f: F) -> Snapshot<U>
    where
        F: FnOnce(V) -> U,
    {
        Snapshot {
            value: f(self.value),
            version: self.version,
            semantic: self.semantic,
        }
    }
}
