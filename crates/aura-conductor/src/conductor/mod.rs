//! # One-Active Conductor
//!
//! Owns an ordered collection of members, keeps at most one of them active,
//! and sequences activation, deactivation and cooperative close.
//!
//! ## Transitions
//!
//! - [`activate_item`](OneActiveConductor::activate_item): insert if new,
//!   deactivate the previous active member, activate the new one
//! - [`close_item`](OneActiveConductor::close_item): ask the member's guard,
//!   then hand activation to a neighbor if it was active and remove it
//! - [`can_close`](OneActiveConductor::can_close): ask every member through
//!   the injected [`CloseStrategy`]
//!
//! ## Re-entrancy
//!
//! Members are called with no conductor state borrowed, so a member may
//! call back into its conductor from `activate`, `deactivate` or
//! `can_close`. Guard answers may arrive synchronously or much later; a
//! late answer for a conductor that has since been dropped is ignored.
//!
//! ```rust,ignore
//! let conductor = OneActiveConductor::new();
//! conductor.activate_item(Some(inbox.clone()));
//! conductor.activate_item(Some(drafts.clone()));
//! conductor.close_item(Some(drafts));
//! assert_eq!(conductor.active_item(), Some(inbox));
//! ```

mod next;

pub use next::next_index_to_activate;

use crate::close::{vote_channel, CloseCallback, CloseStrategy, CloseVote, DefaultCloseStrategy};
use crate::collection::{Items, MemberCollection};
use crate::config::ConductorConfig;
use crate::screen::{try_activate, try_deactivate, Activate, Deactivate, GuardClose, Screen};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, instrument, trace};

/// Listener notified after every activation change with the new active member.
type ActivationListener<T> = Rc<dyn Fn(Option<&T>)>;

struct ConductorState<T> {
    items: MemberCollection<T>,
    active: Option<T>,
    /// The conductor's own lifecycle flag when it is nested as a screen.
    is_active: bool,
    /// Members whose guard has been asked and has not answered yet.
    pending_closes: Vec<T>,
}

struct ConductorInner<T> {
    state: RefCell<ConductorState<T>>,
    listeners: RefCell<Vec<ActivationListener<T>>>,
    strategy: Box<dyn CloseStrategy<T>>,
    config: ConductorConfig,
}

impl<T: PartialEq> ConductorInner<T> {
    fn clear_pending_close(&self, item: &T) {
        let mut state = self.state.borrow_mut();
        if let Some(position) = state.pending_closes.iter().position(|p| p == item) {
            state.pending_closes.remove(position);
        }
    }
}

/// Pending-close entry owned by a guard's [`CloseCallback`].
///
/// The entry leaves `pending_closes` when the guard answers or when it drops
/// the callback unanswered, so a later `close_item` asks the guard again.
struct PendingClose<T: PartialEq> {
    conductor: Weak<ConductorInner<T>>,
    member: Option<T>,
}

impl<T: PartialEq> PendingClose<T> {
    /// Clear the entry and hand back the conductor and member, if the
    /// conductor is still alive.
    fn settle(mut self) -> Option<(Rc<ConductorInner<T>>, T)> {
        let member = self.member.take()?;
        let inner = self.conductor.upgrade()?;
        inner.clear_pending_close(&member);
        Some((inner, member))
    }
}

impl<T: PartialEq> Drop for PendingClose<T> {
    fn drop(&mut self) {
        let Some(member) = self.member.take() else {
            return;
        };
        if let Some(inner) = self.conductor.upgrade() {
            trace!("close callback dropped unanswered");
            inner.clear_pending_close(&member);
        }
    }
}

/// Conductor for a collection of screens with at most one active member.
///
/// A cheap handle: clones share the same state, and equality is identity.
pub struct OneActiveConductor<T> {
    inner: Rc<ConductorInner<T>>,
}

impl<T> Clone for OneActiveConductor<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> PartialEq for OneActiveConductor<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Eq for OneActiveConductor<T> {}

impl<T: Screen + Clone + PartialEq + 'static> Default for OneActiveConductor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Screen + Clone + PartialEq + 'static> OneActiveConductor<T> {
    /// Create a conductor with default configuration.
    pub fn new() -> Self {
        Self::with_config(ConductorConfig::default())
    }

    /// Create a conductor using the [`DefaultCloseStrategy`].
    pub fn with_config(config: ConductorConfig) -> Self {
        let strategy = DefaultCloseStrategy::from_config(&config);
        Self::with_strategy(config, strategy)
    }

    /// Create a conductor with a custom close-vote aggregator.
    pub fn with_strategy(config: ConductorConfig, strategy: impl CloseStrategy<T> + 'static) -> Self {
        Self {
            inner: Rc::new(ConductorInner {
                state: RefCell::new(ConductorState {
                    items: MemberCollection::new(config.change_log_capacity),
                    active: None,
                    is_active: false,
                    pending_closes: Vec::new(),
                }),
                listeners: RefCell::new(Vec::new()),
                strategy: Box::new(strategy),
                config,
            }),
        }
    }

    fn from_inner(inner: Rc<ConductorInner<T>>) -> Self {
        Self { inner }
    }

    fn downgrade(&self) -> Weak<ConductorInner<T>> {
        Rc::downgrade(&self.inner)
    }

    // ─── Queries ─────────────────────────────────────────────

    /// Read-only view of the members, in insertion order.
    pub fn items(&self) -> Items<T> {
        self.inner.state.borrow().items.view()
    }

    /// The currently active member.
    pub fn active_item(&self) -> Option<T> {
        self.inner.state.borrow().active.clone()
    }

    /// Whether the conductor itself is active.
    pub fn is_active(&self) -> bool {
        self.inner.state.borrow().is_active
    }

    /// Whether a close of `item` is waiting on its guard.
    pub fn is_closing(&self, item: &T) -> bool {
        self.inner.state.borrow().pending_closes.contains(item)
    }

    /// The configuration this conductor was built with.
    pub fn config(&self) -> &ConductorConfig {
        &self.inner.config
    }

    /// Register a listener called after every activation change.
    pub fn on_activation_processed(&self, listener: impl Fn(Option<&T>) + 'static) {
        self.inner.listeners.borrow_mut().push(Rc::new(listener));
    }

    // ─── Transitions ─────────────────────────────────────────

    /// Make `item` the active member, adding it to the collection if needed.
    ///
    /// Re-activating the current active member does nothing. `None` lets the
    /// conductor pick a neighbor of the current active member.
    #[instrument(level = "debug", skip_all)]
    pub fn activate_item(&self, item: Option<T>) {
        if let Some(candidate) = &item {
            if self.inner.state.borrow().active.as_ref() == Some(candidate) {
                trace!("member already active");
                return;
            }
        }
        self.change_active_item(item, false);
    }

    /// Deactivate the previous active member (closing it if
    /// `close_previous`), resolve the new one and activate it.
    pub fn change_active_item(&self, new_item: Option<T>, close_previous: bool) {
        if let Some(previous) = self.active_item() {
            try_deactivate(&previous, close_previous);
        }

        let resolved = self.ensure_item(new_item);
        self.inner.state.borrow_mut().active = resolved.clone();
        debug!(
            has_active = resolved.is_some(),
            close = close_previous,
            "active member changed"
        );

        self.on_activate();
        self.notify_activation_processed(resolved.as_ref());
    }

    /// Resolve the member about to become active.
    ///
    /// A present item is appended if it is not yet a member; otherwise the
    /// collection's own stored instance is returned. An absent item is
    /// replaced by the successor of the current active member (or of
    /// position 0 when nothing is active).
    pub fn ensure_item(&self, new_item: Option<T>) -> Option<T> {
        match new_item {
            None => {
                let seed = {
                    let state = self.inner.state.borrow();
                    match &state.active {
                        Some(active) => state.items.index_of(active),
                        None => Some(0),
                    }
                };
                seed.and_then(|index| self.determine_next_item_to_activate(index))
            }
            Some(item) => {
                let mut state = self.inner.state.borrow_mut();
                match state.items.index_of(&item) {
                    Some(index) => state.items.get(index),
                    None => {
                        let index = state.items.push(item.clone());
                        trace!(index, "member added");
                        Some(item)
                    }
                }
            }
        }
    }

    /// The member that should become active once the member at
    /// `last_index` is gone. See [`next_index_to_activate`].
    pub fn determine_next_item_to_activate(&self, last_index: usize) -> Option<T> {
        let state = self.inner.state.borrow();
        next_index_to_activate(last_index, state.items.len())
            .and_then(|index| state.items.get(index))
    }

    /// Close `item`, subject to its guard if it has one.
    ///
    /// Without a guard the close happens immediately. With a guard the close
    /// happens when, and only if, the guard answers yes.
    #[instrument(level = "debug", skip_all)]
    pub fn close_item(&self, item: Option<T>) {
        let Some(item) = item else {
            return;
        };

        let Some(guard) = item.as_guard_close() else {
            self.close_item_core(item);
            return;
        };

        {
            let mut state = self.inner.state.borrow_mut();
            if self.inner.config.deduplicate_pending_closes && state.pending_closes.contains(&item) {
                debug!("close already pending for member");
                return;
            }
            state.pending_closes.push(item.clone());
        }

        let pending = PendingClose {
            conductor: self.downgrade(),
            member: Some(item.clone()),
        };
        let callback: CloseCallback = Box::new(move |can_close| {
            let Some((inner, member)) = pending.settle() else {
                trace!("conductor dropped before close answer");
                return;
            };
            let conductor = OneActiveConductor::from_inner(inner);
            if can_close {
                conductor.close_item_core(member);
            } else {
                debug!("close vetoed by member");
            }
        });
        guard.can_close(callback);
    }

    fn close_item_core(&self, item: T) {
        let (was_active, index) = {
            let state = self.inner.state.borrow();
            (
                state.active.as_ref() == Some(&item),
                state.items.index_of(&item),
            )
        };

        if was_active {
            let next = index.and_then(|index| self.determine_next_item_to_activate(index));
            debug!(?index, "closing active member");
            self.change_active_item(next, true);
        } else {
            debug!(?index, "closing inactive member");
            try_deactivate(&item, true);
        }

        // Removal is recorded only after the deactivation above has run.
        self.inner.state.borrow_mut().items.remove(&item);
    }

    /// Ask every member whether the whole collection may close.
    ///
    /// `callback` receives the aggregate answer exactly once. Nothing is
    /// closed here; acting on `true` is up to the caller.
    #[instrument(level = "debug", skip_all)]
    pub fn can_close(&self, callback: CloseCallback) {
        let members = self.items().to_vec();
        trace!(count = members.len(), "collecting close votes");
        self.inner
            .strategy
            .execute(members, Box::new(move |verdict, _closable| callback(verdict)));
    }

    /// [`can_close`](Self::can_close) as a future.
    pub fn can_close_async(&self) -> CloseVote {
        let (callback, vote) = vote_channel();
        self.can_close(callback);
        vote
    }

    // ─── Lifecycle hooks ─────────────────────────────────────

    /// Activate the current active member, if it supports activation.
    pub fn on_activate(&self) {
        if let Some(active) = self.active_item() {
            try_activate(&active);
        }
    }

    /// Deactivate members when the conductor itself deactivates.
    ///
    /// When closing, every member that supports it is deactivated with
    /// `close = true` in collection order. Otherwise only the active member
    /// is deactivated, without closing. Repeated calls deactivate again.
    pub fn on_deactivate(&self, close: bool) {
        if close {
            let members = self.items().to_vec();
            debug!(count = members.len(), "closing all members");
            for member in &members {
                try_deactivate(member, true);
            }
        } else if let Some(active) = self.active_item() {
            try_deactivate(&active, false);
        }
    }

    fn notify_activation_processed(&self, active: Option<&T>) {
        let listeners = self.inner.listeners.borrow().clone();
        for listener in listeners {
            listener(active);
        }
    }
}

impl<T: Screen + Clone + PartialEq + 'static> Activate for OneActiveConductor<T> {
    fn activate(&self) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.is_active {
                return;
            }
            state.is_active = true;
        }
        self.on_activate();
    }
}

impl<T: Screen + Clone + PartialEq + 'static> Deactivate for OneActiveConductor<T> {
    fn deactivate(&self, close: bool) {
        {
            let mut state = self.inner.state.borrow_mut();
            if !state.is_active && !close {
                return;
            }
            state.is_active = false;
        }
        self.on_deactivate(close);
    }
}

impl<T: Screen + Clone + PartialEq + 'static> GuardClose for OneActiveConductor<T> {
    fn can_close(&self, callback: CloseCallback) {
        OneActiveConductor::can_close(self, callback);
    }
}

impl<T: Screen + Clone + PartialEq + 'static> Screen for OneActiveConductor<T> {
    fn as_activate(&self) -> Option<&dyn Activate> {
        Some(self)
    }

    fn as_deactivate(&self) -> Option<&dyn Deactivate> {
        Some(self)
    }

    fn as_guard_close(&self) -> Option<&dyn GuardClose> {
        Some(self)
    }
}

impl<T: Clone + PartialEq + std::fmt::Debug> std::fmt::Debug for OneActiveConductor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("OneActiveConductor")
            .field("items", &state.items.to_vec())
            .field("active", &state.active)
            .field("is_active", &state.is_active)
            .finish()
    }
}
