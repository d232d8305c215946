//! Error types for attribute decoding in odo-types.

use thiserror::Error;

/// Errors that can occur when decoding a remote table row into a domain
/// record.
///
/// These cover whole-record failures only. Malformed history entries and
/// malformed numeric strings never produce an error; they are dropped or
/// collapsed to `0` respectively (see the codec module docs).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// A required attribute is absent from the row.
    #[error("missing attribute: {0}")]
    MissingAttribute(&'static str),

    /// A required attribute is present but carries the wrong variant
    /// (e.g. a list where a string was expected).
    #[error("attribute '{0}' has an unexpected type")]
    WrongType(&'static str),

    /// The row's sort key is not a valid item identifier.
    #[error("invalid item id: {0}")]
    InvalidId(String),
}

/// Result type alias using odo-types' DecodeError type.
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;
