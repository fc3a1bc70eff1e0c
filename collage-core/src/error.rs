//! Error types for collage operations.
//!
//! Geometry never fails: out-of-range positions, sizes and crops are
//! clamped instead. These errors cover lookups and document I/O only.

use thiserror::Error;

/// Result type for collage operations.
pub type CollageResult<T> = Result<T, CollageError>;

/// Errors that can occur in collage operations.
#[derive(Debug, Error)]
pub enum CollageError {
    /// Item not found on the canvas.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Operation not valid in the current interaction mode.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Document serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
