//! Recording screens shared by the conductor integration tests.

use aura_conductor::{Activate, CloseCallback, Deactivate, GuardClose, Screen};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Lifecycle call observed on a recording screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Activated(&'static str),
    Deactivated(&'static str, bool),
    GuardAsked(&'static str),
}

pub type Journal = Rc<RefCell<Vec<Event>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

/// How a screen answers a close request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// No guard capability at all
    Absent,
    Approve,
    Veto,
    /// Park the callback until [`RecordingScreen::answer`] is called
    Deferred,
}

pub type Member = Rc<RecordingScreen>;

/// Screen that records every lifecycle call into a shared journal.
///
/// Equality is by name, so two instances with the same name are equal but
/// distinct.
pub struct RecordingScreen {
    pub name: &'static str,
    journal: Journal,
    activatable: bool,
    deactivatable: bool,
    guard: Guard,
    parked: RefCell<VecDeque<CloseCallback>>,
    deactivate_hook: RefCell<Option<Box<dyn Fn(bool)>>>,
}

impl RecordingScreen {
    pub fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            journal: journal.clone(),
            activatable: true,
            deactivatable: true,
            guard: Guard::Absent,
            parked: RefCell::new(VecDeque::new()),
            deactivate_hook: RefCell::new(None),
        }
    }

    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guard = guard;
        self
    }

    pub fn without_activate(mut self) -> Self {
        self.activatable = false;
        self
    }

    pub fn without_deactivate(mut self) -> Self {
        self.deactivatable = false;
        self
    }

    pub fn shared(self) -> Member {
        Rc::new(self)
    }

    /// Run `hook` at the end of every deactivation.
    pub fn on_deactivate(&self, hook: impl Fn(bool) + 'static) {
        *self.deactivate_hook.borrow_mut() = Some(Box::new(hook));
    }

    /// Resolve the oldest parked close request. Returns false if none.
    pub fn answer(&self, can_close: bool) -> bool {
        let callback = self.parked.borrow_mut().pop_front();
        match callback {
            Some(callback) => {
                callback(can_close);
                true
            }
            None => false,
        }
    }

    /// Drop the oldest parked close request without answering it.
    pub fn dismiss(&self) -> bool {
        let callback = self.parked.borrow_mut().pop_front();
        callback.is_some()
    }

    pub fn parked_requests(&self) -> usize {
        self.parked.borrow().len()
    }
}

impl PartialEq for RecordingScreen {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl std::fmt::Debug for RecordingScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RecordingScreen").field(&self.name).finish()
    }
}

impl Activate for RecordingScreen {
    fn activate(&self) {
        self.journal.borrow_mut().push(Event::Activated(self.name));
    }
}

impl Deactivate for RecordingScreen {
    fn deactivate(&self, close: bool) {
        self.journal
            .borrow_mut()
            .push(Event::Deactivated(self.name, close));
        if let Some(hook) = self.deactivate_hook.borrow().as_ref() {
            hook(close);
        }
    }
}

impl GuardClose for RecordingScreen {
    fn can_close(&self, callback: CloseCallback) {
        self.journal.borrow_mut().push(Event::GuardAsked(self.name));
        match self.guard {
            Guard::Approve | Guard::Absent => callback(true),
            Guard::Veto => callback(false),
            Guard::Deferred => self.parked.borrow_mut().push_back(callback),
        }
    }
}

impl Screen for RecordingScreen {
    fn as_activate(&self) -> Option<&dyn Activate> {
        self.activatable.then_some(self as &dyn Activate)
    }

    fn as_deactivate(&self) -> Option<&dyn Deactivate> {
        self.deactivatable.then_some(self as &dyn Deactivate)
    }

    fn as_guard_close(&self) -> Option<&dyn GuardClose> {
        (self.guard != Guard::Absent).then_some(self as &dyn GuardClose)
    }
}
