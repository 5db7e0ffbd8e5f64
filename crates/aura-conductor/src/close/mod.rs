//! # Close Voting
//!
//! Closing is cooperative: a member with the [`GuardClose`](crate::GuardClose)
//! capability answers through a [`CloseCallback`], on its own schedule.
//! Asking a whole collection is delegated to a [`CloseStrategy`], which folds
//! the individual answers into one verdict.

mod strategy;
mod vote;

pub use strategy::DefaultCloseStrategy;
pub use vote::{vote_channel, CloseVote};

/// Continuation receiving a single yes/no close answer.
///
/// `FnOnce` makes the single-invocation contract part of the type. A guard
/// that never calls it leaves the close pending forever.
pub type CloseCallback = Box<dyn FnOnce(bool)>;

/// Continuation receiving the aggregate verdict and the members that
/// individually agreed to close.
pub type CloseCompletion<T> = Box<dyn FnOnce(bool, Vec<T>)>;

/// Aggregates per-member close votes into one verdict.
pub trait CloseStrategy<T> {
    /// Ask every member of `items` whether it may close and report through
    /// `on_complete` exactly once.
    fn execute(&self, items: Vec<T>, on_complete: CloseCompletion<T>);
}
