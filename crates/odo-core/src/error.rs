//! Error types for odo-core.

use thiserror::Error;

/// Result type for odo-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the prediction and orchestration layer.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A remote table operation failed.
    #[error(transparent)]
    Remote(#[from] odo_remote::Error),

    /// A local persistence operation failed.
    #[error(transparent)]
    Local(#[from] odo_store::Error),

    /// The reminder sink rejected a schedule or cancel request.
    #[error("reminder sink error: {0}")]
    Sink(String),
}

impl Error {
    /// Create a reminder sink error.
    pub fn sink(message: impl Into<String>) -> Self {
        Self::Sink(message.into())
    }
}
