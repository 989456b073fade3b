//! Custom error types for paper-reconcile.
//!
//! Comparison and merge never fail: every degenerate input has a defined
//! fallback. Errors only come from the edges (decoding fetched records,
//! loading weight vectors, file I/O) and from contract violations such as an
//! invalid weight vector.

use thiserror::Error;

/// Main error type for paper-reconcile operations.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A fetched record could not be decoded into a paper
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// A pending source response resolved to a failure
    #[error("Fetch failed ({source_name}): {message}")]
    Fetch {
        /// Which provider the response came from
        source_name: String,
        /// Failure description from the fetch layer
        message: String,
    },

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias using `ReconcileError`
pub type Result<T> = std::result::Result<T, ReconcileError>;

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert Option to Result with a malformed-record message
    fn ok_or_malformed(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_malformed(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| ReconcileError::MalformedRecord(msg.to_string()))
    }
}
