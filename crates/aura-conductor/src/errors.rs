//! Conductor errors
//!
//! Lifecycle transitions never fail: a declined close is a normal outcome and
//! a missing capability is skipped. The variants here cover the edges around
//! the state machine: configuration, change-log replay and close votes whose
//! callback was dropped without an answer.

use std::path::PathBuf;

/// Errors surfaced by the conductor crate.
#[derive(Debug, thiserror::Error)]
pub enum ConductorError {
    /// Configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    ConfigIo {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Configuration content or value is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A delta referenced a position outside the mirrored collection.
    #[error("delta {operation} failed: index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// The invalid index
        index: usize,
        /// The current length of the collection
        len: usize,
        /// The operation that failed
        operation: &'static str,
    },

    /// The close callback was dropped without ever being invoked.
    #[error("close vote abandoned before an answer was given")]
    VoteAbandoned,
}

impl ConductorError {
    /// Create an invalid-configuration error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

/// Result alias for conductor operations that can fail.
pub type ConductorResult<T> = Result<T, ConductorError>;
