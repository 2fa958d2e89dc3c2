//! Version vectors - causal provenance of a snapshot
//!
//! Each entry records which generation of an authority a value was computed
//! from. Unlike a CRDT clock there is no max-merge here: two vectors can only
//! be folded together when they agree on every shared key. Disagreement means
//! the values were computed from different moments of some common ancestor,
//! and combining them would be a glitch.

use std::fmt;

use indexmap::IndexMap;

use crate::{AuthorityId, ConcordError, ConcordResult};

/// Insertion-ordered map from authority token to generation counter
#[derive(Clone, Default, PartialEq, Eq)]
pub struct VersionVector {
    clocks: IndexMap<AuthorityId, u64>,
}

impl VersionVector {
    pub fn new() -> Self {
        VersionVector {
            clocks: IndexMap::new(),
        }
    }

    /// Get the counter recorded for an authority
    #[inline]
    pub fn get(&self, id: AuthorityId) -> Option<u64> {
        self.clocks.get(&id).copied()
    }

    /// Record a counter, overwriting any previous one in place
    pub fn set(&mut self, id: AuthorityId, counter: u64) {
        self.clocks.insert(id, counter);
    }

    #[inline]
    pub fn contains(&self, id: AuthorityId) -> bool {
        self.clocks.contains_key(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.clocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.clocks.is_empty()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (AuthorityId, u64)> + '_ {
        self.clocks.iter().map(|(&id, &counter)| (id, counter))
    }

    pub fn keys(&self) -> impl Iterator<Item = AuthorityId> + '_ {
        self.clocks.keys().copied()
    }

    /// Find the first shared key on which the two vectors disagree
    pub fn first_conflict(&self, other: &VersionVector) -> Option<ConcordError> {
        other.iter().find_map(|(id, incoming)| match self.get(id) {
            Some(held) if held != incoming => Some(ConcordError::VersionConflict {
                id,
                held,
                incoming,
            }),
            _ => None,
        })
    }

    /// Two vectors are compatible when every shared key has equal counters
    pub fn is_compatible(&self, other: &VersionVector) -> bool {
        self.first_conflict(other).is_none()
    }

    /// Strict fold step: add every key of `other` missing from `self`.
    ///
    /// Fails on the first shared key whose counters differ. On failure
    /// `self` is left untouched.
    pub fn try_absorb(&mut self, other: &VersionVector) -> ConcordResult<()> {
        if let Some(conflict) = self.first_conflict(other) {
            return Err(conflict);
        }

        for (id, counter) in other.iter() {
            self.clocks.entry(id).or_insert(counter);
        }

        Ok(())
    }

    /// Strictly fold a sequence of vectors, in order, into a fresh one
    pub fn merged<'a, I>(vectors: I) -> ConcordResult<VersionVector>
    where
        I: IntoIterator<Item = &'a VersionVector>,
    {
        let mut acc = VersionVector::new();
        for vector in vectors {
            acc.try_absorb(vector)?;
        }
        Ok(acc)
    }
}

impl FromIterator<(AuthorityId, u64)> for VersionVector {
    fn from_iter<I: IntoIterator<Item = (AuthorityId, u64)>>(iter: I) -> Self {
        VersionVector {
            clocks: iter.into_iter().collect(),
        }
    }
}

impl fmt::Debug for VersionVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.clocks.iter().map(|(id, c)| (format!("{}", id), c)))
            .finish()
    }
}
