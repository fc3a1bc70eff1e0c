//! Errors raised by the command implementations.

use std::path::PathBuf;

use collage_core::CollageError;
use collage_renderer::RenderError;
use thiserror::Error;

/// Errors that can occur while running a `collage` command.
#[derive(Debug, Error)]
pub enum CliError {
    /// An input or output file could not be accessed.
    #[error("cannot access {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// An asset list could not be parsed.
    #[error("invalid asset list {path}: {source}")]
    Assets {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// A layout document was rejected.
    #[error(transparent)]
    Layout(#[from] CollageError),

    /// Rendering or saving the export failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Result type for command implementations.
pub type CliResult<T> = Result<T, CliError>;
