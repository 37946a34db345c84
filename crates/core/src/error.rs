//! Dispatch error model.

use thiserror::Error;

/// Message carried by [`DispatchError::InvalidArgument`] when the batch is not a sequence.
pub const JOBS_NOT_AN_ARRAY: &str = "Jobs is not an array";

/// Result type used by the dispatch surface.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Errors surfaced synchronously to the caller of a dispatch.
///
/// Per-job submission failures and runtime job failures are reported through
/// logging only and never show up here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The input batch was rejected before any queue interaction.
    #[error("{0}")]
    InvalidArgument(String),

    /// Dispatcher configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl DispatchError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_an_array() -> Self {
        Self::InvalidArgument(JOBS_NOT_AN_ARRAY.to_string())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
