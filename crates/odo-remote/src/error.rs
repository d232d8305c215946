//! Error types for odo-remote.
//!
//! Every remote operation may fail (connectivity, credentials, malformed
//! responses). Failures are surfaced to the caller and never retried
//! internally; the only swallowed failure mode is the row-level decode skip,
//! which is reported through
//! [`FetchOutcome::skipped`](crate::store::FetchOutcome) instead.

use thiserror::Error;

/// Result type for odo-remote operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur talking to the remote table.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The credential supplier could not produce usable credentials.
    #[error("credential resolution failed: {0}")]
    Credential(String),

    /// Establishing the table connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// A put/query/delete failed after a connection existed.
    #[error("remote {operation} failed: {message}")]
    Operation {
        /// The operation that failed ("put", "query", "delete").
        operation: &'static str,
        /// Transport-level description of the failure.
        message: String,
    },

    /// One or more deletes in a wipe sequence failed.
    ///
    /// The sequence does not roll back or retry: every remaining delete is
    /// still attempted, and this aggregate is surfaced exactly once at the
    /// end. A wipe is therefore not atomic; a crash or partial failure
    /// leaves a partially-deleted table.
    #[error("wipe incomplete: {failed} of {attempted} deletes failed (first: {first_error})")]
    PartialWipe {
        /// Total rows the wipe attempted to delete.
        attempted: usize,
        /// How many of those deletes failed.
        failed: usize,
        /// The first failure, for display.
        first_error: String,
    },
}

impl Error {
    /// Create a credential resolution error.
    pub fn credential(message: impl Into<String>) -> Self {
        Self::Credential(message.into())
    }

    /// Create a connection establishment error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a remote operation error.
    pub fn operation(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Operation {
            operation,
            message: message.into(),
        }
    }
}
