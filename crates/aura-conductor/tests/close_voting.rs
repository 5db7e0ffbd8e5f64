#![allow(missing_docs, dead_code, clippy::unwrap_used, clippy::expect_used)]
//! # Close Voting Tests
//!
//! Whole-collection close votes and nested conductors.

mod support;

use aura_conductor::{Activate, ConductorError, OneActiveConductor};
use futures::executor::block_on;
use std::cell::RefCell;
use std::rc::Rc;
use support::{journal, Event, Guard, Member, RecordingScreen};

fn answers() -> (Rc<RefCell<Vec<bool>>>, impl FnOnce(bool) + 'static) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    (seen, move |ok| sink.borrow_mut().push(ok))
}

#[test]
fn test_empty_conductor_can_close() {
    let conductor: OneActiveConductor<Member> = OneActiveConductor::new();
    let (seen, callback) = answers();

    conductor.can_close(Box::new(callback));

    assert_eq!(*seen.borrow(), vec![true]);
}

#[test]
fn test_single_veto_blocks_and_mutates_nothing() {
    let log = journal();
    let conductor = OneActiveConductor::new();
    for (name, guard) in [("a", Guard::Approve), ("b", Guard::Veto), ("c", Guard::Absent)] {
        conductor.activate_item(Some(RecordingScreen::new(name, &log).with_guard(guard).shared()));
    }
    let version = conductor.items().version();
    log.borrow_mut().clear();
    let (seen, callback) = answers();

    conductor.can_close(Box::new(callback));

    assert_eq!(*seen.borrow(), vec![false]);
    assert_eq!(conductor.items().version(), version);
    assert_eq!(
        *log.borrow(),
        vec![Event::GuardAsked("a"), Event::GuardAsked("b")]
    );
}

#[test]
fn test_deferred_votes_resolve_future_once_all_answer() {
    let log = journal();
    let first = RecordingScreen::new("first", &log)
        .with_guard(Guard::Deferred)
        .shared();
    let second = RecordingScreen::new("second", &log)
        .with_guard(Guard::Deferred)
        .shared();
    let conductor = OneActiveConductor::new();
    conductor.activate_item(Some(first.clone()));
    conductor.activate_item(Some(second.clone()));

    let mut vote = conductor.can_close_async();
    assert_eq!(vote.try_take().unwrap(), None);
    assert_eq!(second.parked_requests(), 0);

    first.answer(true);
    assert_eq!(second.parked_requests(), 1);
    assert_eq!(vote.try_take().unwrap(), None);

    second.answer(true);
    assert!(block_on(vote).unwrap());
}

#[test]
fn test_abandoned_guard_abandons_vote() {
    struct Forgetful;

    impl aura_conductor::GuardClose for Forgetful {
        fn can_close(&self, callback: aura_conductor::CloseCallback) {
            drop(callback);
        }
    }

    impl aura_conductor::Screen for Forgetful {
        fn as_guard_close(&self) -> Option<&dyn aura_conductor::GuardClose> {
            Some(self)
        }
    }

    impl PartialEq for Forgetful {
        fn eq(&self, _other: &Self) -> bool {
            true
        }
    }

    let conductor = OneActiveConductor::new();
    conductor.activate_item(Some(Rc::new(Forgetful)));

    let vote = conductor.can_close_async();
    assert!(matches!(block_on(vote), Err(ConductorError::VoteAbandoned)));
}

// ============================================================================
// Nested conductors
// ============================================================================

fn child(log: &support::Journal, names: &[(&'static str, Guard)]) -> OneActiveConductor<Member> {
    let conductor = OneActiveConductor::new();
    for &(name, guard) in names {
        conductor.activate_item(Some(RecordingScreen::new(name, log).with_guard(guard).shared()));
    }
    conductor
}

#[test]
fn test_child_conductor_veto_keeps_it_open() {
    let log = journal();
    let parent = OneActiveConductor::new();
    let stubborn = child(&log, &[("draft", Guard::Veto)]);
    parent.activate_item(Some(stubborn.clone()));

    parent.close_item(Some(stubborn.clone()));

    assert_eq!(parent.items().len(), 1);
    assert_eq!(parent.active_item(), Some(stubborn));
}

#[test]
fn test_closing_child_conductor_closes_its_members() {
    let log = journal();
    let parent = OneActiveConductor::new();
    let home = child(&log, &[("home", Guard::Absent)]);
    let settings = child(&log, &[("general", Guard::Approve), ("privacy", Guard::Absent)]);
    parent.activate_item(Some(home.clone()));
    parent.activate_item(Some(settings.clone()));
    assert!(settings.is_active());
    log.borrow_mut().clear();

    parent.close_item(Some(settings.clone()));

    assert!(!settings.is_active());
    assert!(home.is_active());
    assert_eq!(parent.active_item(), Some(home));
    assert_eq!(
        *log.borrow(),
        vec![
            Event::GuardAsked("general"),
            Event::Deactivated("general", true),
            Event::Deactivated("privacy", true),
            Event::Activated("home"),
        ]
    );
}

#[test]
fn test_activating_parent_skips_already_active_child() {
    let log = journal();
    let parent = OneActiveConductor::new();
    let inbox = child(&log, &[("inbox", Guard::Absent)]);
    parent.activate_item(Some(inbox.clone()));
    log.borrow_mut().clear();

    // The child was already activated when the parent selected it.
    Activate::activate(&parent);
    assert!(parent.is_active());
    assert!(log.borrow().is_empty());
}
