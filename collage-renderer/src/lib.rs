//! # Collage Renderer
//!
//! Rasterizes a committed collage layout into a square PNG.
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              CollageExporter                │
//! ├──────────────┬──────────────┬───────────────┤
//! │ ImageLoader  │ Compositor   │ Delivery      │
//! │ data:/http/  │ z-order,crop │ PNG file,     │
//! │ file (async) │ radius,border│ clipboard     │
//! └──────────────┴──────────────┴───────────────┘
//! ```
//!
//! A tile whose image fails to load is skipped; the export still succeeds.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod artifact;
pub mod error;
pub mod export;
pub mod image;
pub mod loader;
pub mod status;
pub mod style;

pub use crate::image::{load_image_from_bytes, load_image_from_data_uri, ImageFormat, TextureData};
pub use artifact::ExportArtifact;
pub use error::{RenderError, RenderResult};
pub use export::{load_images, CollageExporter, PixelRect, SourceRect};
pub use loader::{DefaultImageLoader, ImageLoader, ImageSource, StaticImageLoader};
pub use status::{ExportStatus, StatusBoard, STATUS_DISPLAY_WINDOW};
pub use style::{Color, ExportStyle, DEFAULT_EXPORT_SIZE, MAX_EXPORT_SIZE, MIN_EXPORT_SIZE};

/// Collage renderer version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
