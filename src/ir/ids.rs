//! Newtype ID for type-safe label references.
//!
//! Label ids are dense, zero-based indices into the run's
//! [`CategoryTable`](super::CategoryTable); the newtype keeps them from being
//! confused with ordinal ids or raw counts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A label id: the position of a category name in the category table.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelId(pub usize);

impl LabelId {
    /// Creates a new LabelId.
    #[inline]
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    /// Returns the underlying index.
    #[inline]
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl fmt::Debug for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LabelId({})", self.0)
    }
}

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for LabelId {
    fn from(id: usize) -> Self {
        LabelId::new(id)
    }
}
