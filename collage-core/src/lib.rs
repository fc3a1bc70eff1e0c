//! # Collage Core
//!
//! Core collage logic: placing NFT images on a square grid, manipulating
//! them directly, and keeping an undo history.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                collage-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Layout Engine    │  Canvas State Machine   │
//! │  - Empty slots    │  - Items + selection    │
//! │  - Bulk packing   │  - Idle/drag/resize/crop│
//! │  - Blank fill     │  - Undo/redo history    │
//! ├─────────────────────────────────────────────┤
//! │  Interaction      │  Assets                 │
//! │  - Pixel→percent  │  - Identity resolution  │
//! │  - Snap + clamp   │  - Selection reconcile  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! All geometry lives on a normalized 0-100 canvas. Out-of-range values are
//! clamped, never rejected.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod asset;
pub mod document;
pub mod error;
pub mod grid;
pub mod history;
pub mod interaction;
pub mod item;
pub mod layout;
pub mod state;

pub use asset::{resolve_identity, IdentityKey, SelectedAsset};
pub use document::CollageDocument;
pub use error::{CollageError, CollageResult};
pub use grid::{Cell, GridConfig, Square, CANVAS_EXTENT};
pub use history::{History, HistoryEntry};
pub use interaction::{InteractionMode, PointerTarget, ResizeHandle, Viewport};
pub use item::{CanvasItem, CropRect, ItemId};
pub use layout::{
    fill_remaining, find_empty_slot, pack_multiple, InOrder, LayoutRng, Placement, SeededRng,
};
pub use state::{CanvasState, ClearSignal};

/// Collage core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
