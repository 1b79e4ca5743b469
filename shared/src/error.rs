//! Error types shared by the stores and the HTTP layer.

use thiserror::Error;

/// A request field failed validation. The operation is aborted before
/// anything is written to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Name of the offending input field.
    pub field: &'static str,
    /// Operator-facing description.
    pub message: String,
}

impl ValidationError {
    /// Build a validation error for `field`.
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        ValidationError {
            field,
            message: message.into(),
        }
    }

    /// Shorthand for the most common case.
    pub fn required(field: &'static str) -> Self {
        ValidationError::new(field, "must not be empty")
    }
}

/// Failure talking to the hosted storage provider.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record matched the requested identifier or slug.
    #[error("record not found")]
    NotFound,

    /// The provider rejected a write that violates a uniqueness
    /// constraint (e.g. a duplicate slug).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Input was rejected before any provider call was made.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The provider answered with a non-success status.
    #[error("storage provider error ({status}): {message}")]
    Provider {
        /// HTTP status returned by the provider.
        status: u16,
        /// Provider error body, truncated for logging.
        message: String,
    },

    /// The provider could not be reached at all.
    #[error("storage transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider returned a body we could not decode.
    #[error("unexpected provider response: {0}")]
    Decode(String),
}
