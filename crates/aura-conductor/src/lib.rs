#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]
//! # Aura Conductor - Screen Collection Lifecycle
//!
//! Manages an ordered collection of screens with at most one active member.
//! The conductor sequences activation, deactivation and close, and lets each
//! member veto its own closure through an asynchronous callback.
//!
//! ## Pieces
//!
//! - [`OneActiveConductor`]: the state machine
//! - [`Screen`] and the [`Activate`] / [`Deactivate`] / [`GuardClose`]
//!   capabilities: optional, probed before every call
//! - [`CloseStrategy`]: aggregates whole-collection close votes
//! - [`Items`] / [`ItemsSubscription`]: read-only view and change feed
//!
//! Everything is single-threaded: handles are `Rc`-based and callbacks run
//! on whichever turn of the host's event loop invokes them.

pub mod close;
pub mod collection;
pub mod conductor;
pub mod config;
pub mod errors;
pub mod screen;

pub use close::{
    vote_channel, CloseCallback, CloseCompletion, CloseStrategy, CloseVote, DefaultCloseStrategy,
};
pub use collection::{Delta, Items, ItemsSubscription, MemberCollection};
pub use conductor::{next_index_to_activate, OneActiveConductor};
pub use config::ConductorConfig;
pub use errors::{ConductorError, ConductorResult};
pub use screen::{try_activate, try_deactivate, try_guard_close, Activate, Deactivate, GuardClose, Screen};
