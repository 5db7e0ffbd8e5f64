//! # Screen Capabilities
//!
//! A member managed by a conductor may support any subset of three
//! lifecycle capabilities. None of them is required: the conductor asks a
//! member through [`Screen`] whether it supports a capability before every
//! call, and silently skips members that don't.
//!
//! ```rust,ignore
//! struct Editor { dirty: Cell<bool> }
//!
//! impl Deactivate for Editor {
//!     fn deactivate(&self, close: bool) { /* flush buffers */ }
//! }
//!
//! impl Screen for Editor {
//!     fn as_deactivate(&self) -> Option<&dyn Deactivate> {
//!         Some(self)
//!     }
//! }
//! ```

use crate::close::CloseCallback;
use std::rc::Rc;
use std::sync::Arc;

/// A member that reacts to becoming the active screen.
pub trait Activate {
    /// Called when the member becomes active. Idempotent by convention.
    fn activate(&self);
}

/// A member that reacts to losing activation or being closed.
pub trait Deactivate {
    /// Called when the member stops being active; `close` is set when the
    /// deactivation is part of permanent removal.
    fn deactivate(&self, close: bool);
}

/// A member that may veto its own closure.
pub trait GuardClose {
    /// Answer whether the member may close by invoking `callback` exactly
    /// once, now or later.
    fn can_close(&self, callback: CloseCallback);
}

/// Capability probes for a conductor member.
///
/// Every probe defaults to `None`; implement the ones the member supports.
pub trait Screen {
    /// Probe for the [`Activate`] capability
    fn as_activate(&self) -> Option<&dyn Activate> {
        None
    }

    /// Probe for the [`Deactivate`] capability
    fn as_deactivate(&self) -> Option<&dyn Deactivate> {
        None
    }

    /// Probe for the [`GuardClose`] capability
    fn as_guard_close(&self) -> Option<&dyn GuardClose> {
        None
    }
}

macro_rules! forward_screen {
    ($($ptr:ident),*) => {
        $(
            impl<S: Screen + ?Sized> Screen for $ptr<S> {
                fn as_activate(&self) -> Option<&dyn Activate> {
                    (**self).as_activate()
                }

                fn as_deactivate(&self) -> Option<&dyn Deactivate> {
                    (**self).as_deactivate()
                }

                fn as_guard_close(&self) -> Option<&dyn GuardClose> {
                    (**self).as_guard_close()
                }
            }
        )*
    };
}

forward_screen!(Rc, Arc, Box);

/// Activate `member` if it supports activation. Returns whether it did.
pub fn try_activate<S: Screen + ?Sized>(member: &S) -> bool {
    match member.as_activate() {
        Some(activatable) => {
            activatable.activate();
            true
        }
        None => false,
    }
}

/// Deactivate `member` if it supports deactivation. Returns whether it did.
pub fn try_deactivate<S: Screen + ?Sized>(member: &S, close: bool) -> bool {
    match member.as_deactivate() {
        Some(deactivatable) => {
            deactivatable.deactivate(close);
            true
        }
        None => false,
    }
}

/// Ask `member` whether it may close.
///
/// When the member has no guard the callback is handed back untouched so
/// the caller decides how an unguarded member votes.
pub fn try_guard_close<S: Screen + ?Sized>(
    member: &S,
    callback: CloseCallback,
) -> Option<CloseCallback> {
    match member.as_guard_close() {
        Some(guard) => {
            guard.can_close(callback);
            None
        }
        None => Some(callback),
    }
}
