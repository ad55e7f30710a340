//! Positional box identifiers.
//!
//! A box's identity is its index among the successfully parsed lines of its
//! label file. It is not persisted and is not stable across edits that
//! reorder or delete lines; it only lets a caller address boxes within one
//! load/save cycle.

use serde::{Serialize, Serializer};
use std::fmt;

/// Index of a box among the parsed boxes of one label file.
///
/// Renders as `box_<index>`.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoxId(pub usize);

impl BoxId {
    /// Creates a new BoxId.
    #[inline]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the underlying index.
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for BoxId {
    fn from(index: usize) -> Self {
        BoxId::new(index)
    }
}

impl fmt::Debug for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoxId({})", self.0)
    }
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "box_{}", self.0)
    }
}

impl Serialize for BoxId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
