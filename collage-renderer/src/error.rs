//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while loading, compositing or delivering an export.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A tile image could not be fetched or decoded.
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// The export pipeline failed (surface allocation, compositing).
    #[error("Export failed: {0}")]
    Export(String),

    /// PNG encoding failed.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// Writing the export failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The system clipboard rejected the image.
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// No system clipboard is available on this platform or build.
    #[error("Clipboard not supported on this platform")]
    ClipboardUnsupported,
}
