//! # Member Collection
//!
//! Ordered, duplicate-allowing storage for conductor members.
//!
//! - [`MemberCollection`]: the single mutable handle, owned by the conductor
//! - [`Items`]: cloneable read-only view handed to hosts and close strategies
//! - [`ItemsSubscription`]: poll-based change feed of [`Delta`]s
//!
//! Insertion order is significant: it decides which neighbor becomes active
//! when the active member closes. Lookups use `T`'s own equality, so a
//! collection holding equal duplicates resolves to the first one.

mod delta;

pub use delta::Delta;

use crate::errors::ConductorResult;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

struct CollectionInner<T> {
    items: Vec<T>,
    /// Incremented on every structural change.
    version: u64,
    /// `(version after the change, change)`, oldest first.
    log: VecDeque<(u64, Delta<T>)>,
    capacity: usize,
}

impl<T: Clone> CollectionInner<T> {
    fn record(&mut self, delta: Delta<T>) {
        self.version += 1;
        if self.log.len() == self.capacity {
            self.log.pop_front();
        }
        self.log.push_back((self.version, delta));
    }
}

/// Mutable handle to the member collection.
///
/// Deliberately not `Clone`: whoever owns it is the only writer.
pub struct MemberCollection<T> {
    inner: Rc<RefCell<CollectionInner<T>>>,
}

impl<T: Clone + PartialEq> MemberCollection<T> {
    /// Create an empty collection retaining up to `capacity` deltas.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Rc::new(RefCell::new(CollectionInner {
                items: Vec::new(),
                version: 0,
                log: VecDeque::new(),
                capacity: capacity.max(1),
            })),
        }
    }

    /// Append an item, returning the index it now occupies.
    pub fn push(&mut self, item: T) -> usize {
        let mut inner = self.inner.borrow_mut();
        let index = inner.items.len();
        inner.items.push(item.clone());
        inner.record(Delta::insert(index, item));
        index
    }

    /// Remove the first item equal to `item`. Returns the index it occupied.
    pub fn remove(&mut self, item: &T) -> Option<usize> {
        let mut inner = self.inner.borrow_mut();
        let index = inner.items.iter().position(|existing| existing == item)?;
        inner.items.remove(index);
        inner.record(Delta::remove(index));
        Some(index)
    }

    /// Read-only view sharing this collection's storage.
    pub fn view(&self) -> Items<T> {
        Items {
            inner: self.inner.clone(),
        }
    }

    /// Position of the first item equal to `item`.
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.view().index_of(item)
    }

    /// Item at `index`, cloned out of the collection.
    pub fn get(&self, index: usize) -> Option<T> {
        self.view().get(index)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.inner.borrow().items.len()
    }

    /// Whether the collection has no members.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the members in order.
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.borrow().items.clone()
    }
}

/// Read-only view of the member collection.
///
/// Reads always observe the current contents, including changes made after
/// the view was created.
pub struct Items<T> {
    inner: Rc<RefCell<CollectionInner<T>>>,
}

impl<T> Clone for Items<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + PartialEq> Items<T> {
    /// Position of the first item equal to `item`.
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.inner
            .borrow()
            .items
            .iter()
            .position(|existing| existing == item)
    }

    /// Whether an item equal to `item` is present.
    pub fn contains(&self, item: &T) -> bool {
        self.index_of(item).is_some()
    }

    /// Item at `index`, cloned out of the collection.
    pub fn get(&self, index: usize) -> Option<T> {
        self.inner.borrow().items.get(index).cloned()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.inner.borrow().items.len()
    }

    /// Whether the collection has no members.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the members in order.
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.borrow().items.clone()
    }

    /// Number of structural changes so far.
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Subscribe to changes made from now on.
    pub fn subscribe(&self) -> ItemsSubscription<T> {
        ItemsSubscription {
            source: self.inner.clone(),
            last_version: self.version(),
        }
    }
}

impl<T: Clone + PartialEq + std::fmt::Debug> std::fmt::Debug for Items<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Items")
            .field("items", &self.to_vec())
            .field("version", &self.version())
            .finish()
    }
}

/// Poll-based subscription to member collection changes.
///
/// ```rust,ignore
/// let mut sub = conductor.items().subscribe();
/// conductor.activate_item(Some(screen));
///
/// let mut mirror = Vec::new();
/// sub.sync(&mut mirror)?;
/// ```
pub struct ItemsSubscription<T> {
    source: Rc<RefCell<CollectionInner<T>>>,
    last_version: u64,
}

impl<T: Clone> ItemsSubscription<T> {
    /// Check if the collection changed since the last poll.
    pub fn has_changed(&self) -> bool {
        self.source.borrow().version > self.last_version
    }

    /// Changes since the last poll, oldest first.
    ///
    /// Returns `None` if nothing changed. A subscriber that fell behind the
    /// retained log receives a single [`Delta::Reset`] with the current
    /// contents instead.
    pub fn poll(&mut self) -> Option<Vec<Delta<T>>> {
        let source = self.source.borrow();
        if source.version <= self.last_version {
            return None;
        }

        let lagged = source
            .log
            .front()
            .map_or(true, |(oldest, _)| *oldest > self.last_version + 1);

        let deltas = if lagged {
            vec![Delta::reset(source.items.clone())]
        } else {
            source
                .log
                .iter()
                .filter(|(version, _)| *version > self.last_version)
                .map(|(_, delta)| delta.clone())
                .collect()
        };

        self.last_version = source.version;
        Some(deltas)
    }

    /// Bring `mirror` up to date by replaying [`poll`](Self::poll).
    ///
    /// Returns `Ok(false)` if nothing changed since the last poll.
    ///
    /// # Errors
    ///
    /// Returns [`ConductorError::IndexOutOfBounds`](crate::ConductorError::IndexOutOfBounds)
    /// if `mirror` did not match the collection as of the last poll.
    pub fn sync(&mut self, mirror: &mut Vec<T>) -> ConductorResult<bool> {
        let Some(deltas) = self.poll() else {
            return Ok(false);
        };
        for delta in deltas {
            delta.apply_to(mirror)?;
        }
        Ok(true)
    }

    /// Get the last version this subscription observed.
    pub fn last_observed_version(&self) -> u64 {
        self.last_version
    }
}
