//! Combined input objects
//!
//! The value a combiner emits: the latest value of each declared source,
//! keyed by the source's token in declaration order. Sources of different
//! types are mapped into one value type `V` when they are subscribed, so the
//! object stays homogeneous and needs no runtime casts.

use indexmap::IndexMap;

use crate::AuthorityId;

#[derive(Clone, Debug, PartialEq)]
pub struct CombinedInputs<V> {
    values: IndexMap<AuthorityId, V>,
}

impl<V> CombinedInputs<V> {
    /// Zero-input object, used to unblock authorities with no sources
    pub fn empty() -> Self {
        CombinedInputs {
            values: IndexMap::new(),
        }
    }

    pub fn get(&self, id: AuthorityId) -> Option<&V> {
        self.values.get(&id)
    }

    /// Value at a declaration position
    pub fn get_index(&self, index: usize) -> Option<(AuthorityId, &V)> {
        self.values.get_index(index).map(|(id, v)| (*id, v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (AuthorityId, &V)> + '_ {
        self.values.iter().map(|(id, v)| (*id, v))
    }

    pub fn ids(&self) -> impl Iterator<Item = AuthorityId> + '_ {
        self.values.keys().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<V> Default for CombinedInputs<V> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<V> FromIterator<(AuthorityId, V)> for CombinedInputs<V> {
    fn from_iter<I: IntoIterator<Item = (AuthorityId, V)>>(iter: I) -> Self {
        CombinedInputs {
            values: iter.into_iter().collect(),
        }
    }
}
