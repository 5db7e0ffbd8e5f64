//! Delta<T> - Incremental changes to the member collection
//!
//! Every structural mutation of a [`MemberCollection`](super::MemberCollection)
//! is described as a `Delta` so observers can mirror the collection without
//! re-reading it.

use crate::errors::{ConductorError, ConductorResult};

/// Represents an incremental change to the member collection.
///
/// # Example
///
/// ```rust,ignore
/// use aura_conductor::Delta;
///
/// let mut mirror = vec!["a", "b", "c"];
/// Delta::remove(0).apply_to(&mut mirror)?;
/// assert_eq!(mirror, vec!["b", "c"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delta<T> {
    /// Replace the whole collection.
    /// Sent to subscribers that fell behind the retained change log.
    Reset(Vec<T>),

    /// An item was appended or inserted at `index`.
    /// Items at and after this index shift right.
    Insert {
        /// Position the item now occupies (0-indexed)
        index: usize,
        /// Inserted item
        item: T,
    },

    /// The item at `index` was removed.
    /// Items after this index shift left.
    Remove {
        /// Position the item occupied (0-indexed)
        index: usize,
    },
}

impl<T> Delta<T> {
    /// Create a reset delta with the given items.
    pub fn reset(items: Vec<T>) -> Self {
        Delta::Reset(items)
    }

    /// Create an insert delta.
    pub fn insert(index: usize, item: T) -> Self {
        Delta::Insert { index, item }
    }

    /// Create a remove delta.
    pub fn remove(index: usize) -> Self {
        Delta::Remove { index }
    }

    /// Replay this change onto a mirror of the collection.
    ///
    /// # Errors
    ///
    /// Returns [`ConductorError::IndexOutOfBounds`] when the mirror has
    /// drifted from the collection. The mirror is left untouched.
    pub fn apply_to(self, mirror: &mut Vec<T>) -> ConductorResult<()> {
        let len = mirror.len();
        match self {
            Delta::Reset(items) => *mirror = items,
            Delta::Insert { index, item } if index <= len => mirror.insert(index, item),
            Delta::Remove { index } if index < len => {
                mirror.remove(index);
            }
            Delta::Insert { index, .. } => return Err(drift(index, len, "insert")),
            Delta::Remove { index } => return Err(drift(index, len, "remove")),
        }
        Ok(())
    }
}

fn drift(index: usize, len: usize, operation: &'static str) -> ConductorError {
    ConductorError::IndexOutOfBounds {
        index,
        len,
        operation,
    }
}
