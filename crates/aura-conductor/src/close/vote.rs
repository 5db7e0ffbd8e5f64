//! Future adapter for callback-style close answers.

use super::CloseCallback;
use crate::errors::{ConductorError, ConductorResult};
use futures::channel::oneshot;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Create a linked callback/future pair.
///
/// Hand the callback to anything expecting a [`CloseCallback`] and await the
/// [`CloseVote`] for the answer.
pub fn vote_channel() -> (CloseCallback, CloseVote) {
    let (sender, receiver) = oneshot::channel();
    let callback: CloseCallback = Box::new(move |can_close| {
        // The vote may have been dropped by a caller that lost interest.
        let _ = sender.send(can_close);
    });
    (callback, CloseVote { receiver })
}

/// A pending close answer.
///
/// Resolves to the answer, or to [`ConductorError::VoteAbandoned`] if the
/// callback was dropped without being called.
#[derive(Debug)]
pub struct CloseVote {
    receiver: oneshot::Receiver<bool>,
}

impl CloseVote {
    /// Take the answer without waiting. `Ok(None)` means still pending.
    pub fn try_take(&mut self) -> ConductorResult<Option<bool>> {
        self.receiver
            .try_recv()
            .map_err(|_| ConductorError::VoteAbandoned)
    }
}

impl Future for CloseVote {
    type Output = ConductorResult<bool>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|answer| answer.map_err(|_| ConductorError::VoteAbandoned))
    }
}
