//! Pointer interaction: coordinate conversion, gesture modes and the
//! geometry of drags and resizes.
//!
//! Pointer positions arrive in pixels relative to the rendered canvas and
//! are converted to canvas percent before any math. Gesture geometry is
//! always recomputed from the item's pre-gesture copy, never accumulated
//! frame over frame.

use serde::{Deserialize, Serialize};

use crate::grid::{GridConfig, Square, CANVAS_EXTENT};
use crate::item::{CanvasItem, CropRect, ItemId};

/// Rendered size of the canvas element in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    /// Rendered width.
    pub width: f64,
    /// Rendered height.
    pub height: f64,
}

impl Viewport {
    /// Create a viewport.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Convert a pixel position to canvas percent.
    ///
    /// Returns `None` while the canvas has no rendered size.
    #[must_use]
    pub fn to_percent(&self, px: f64, py: f64) -> Option<(f64, f64)> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        Some((
            px / self.width * CANVAS_EXTENT,
            py / self.height * CANVAS_EXTENT,
        ))
    }
}

/// One of the eight resize handles around a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    /// Top edge.
    N,
    /// Bottom edge.
    S,
    /// Right edge.
    E,
    /// Left edge.
    W,
    /// Top-right corner.
    Ne,
    /// Top-left corner.
    Nw,
    /// Bottom-right corner.
    Se,
    /// Bottom-left corner.
    Sw,
}

impl ResizeHandle {
    /// All handles, corners first so they win hit tests over edges.
    pub const ALL: [ResizeHandle; 8] = [
        Self::Nw,
        Self::Ne,
        Self::Se,
        Self::Sw,
        Self::N,
        Self::E,
        Self::S,
        Self::W,
    ];

    /// Outward direction of the handle on each axis (-1, 0 or 1).
    #[must_use]
    pub const fn direction(self) -> (i8, i8) {
        match self {
            Self::N => (0, -1),
            Self::S => (0, 1),
            Self::E => (1, 0),
            Self::W => (-1, 0),
            Self::Ne => (1, -1),
            Self::Nw => (-1, -1),
            Self::Se => (1, 1),
            Self::Sw => (-1, 1),
        }
    }

    /// Whether the handle sits on a corner.
    #[must_use]
    pub const fn is_corner(self) -> bool {
        matches!(self, Self::Ne | Self::Nw | Self::Se | Self::Sw)
    }

    /// Position of the handle on a square, in canvas percent.
    #[must_use]
    pub fn anchor(self, square: &Square) -> (f64, f64) {
        let (hx, hy) = self.direction();
        let along = |origin: f64, dir: i8| match dir {
            -1 => origin,
            0 => origin + square.size / 2.0,
            _ => origin + square.size,
        };
        (along(square.x, hx), along(square.y, hy))
    }
}

/// What a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "lowercase")]
pub enum PointerTarget {
    /// The body of a tile.
    Body {
        /// The tile.
        item: ItemId,
    },
    /// A resize handle of a tile.
    Handle {
        /// The tile.
        item: ItemId,
        /// Which handle.
        handle: ResizeHandle,
    },
}

impl PointerTarget {
    /// The tile under the pointer.
    #[must_use]
    pub const fn item(&self) -> ItemId {
        match self {
            Self::Body { item } | Self::Handle { item, .. } => *item,
        }
    }
}

/// State captured when a drag or resize starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Gesture {
    /// Pointer position at pointer-down, in canvas percent.
    pub start: (f64, f64),
    /// Full copy of the item before the gesture.
    pub initial: CanvasItem,
}

impl Gesture {
    /// The item being manipulated.
    #[must_use]
    pub fn item(&self) -> ItemId {
        self.initial.id
    }

    /// Pointer travel since pointer-down.
    #[must_use]
    pub fn delta(&self, current: (f64, f64)) -> (f64, f64) {
        (current.0 - self.start.0, current.1 - self.start.1)
    }
}

/// Current interaction mode of the canvas.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionMode {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Moving a tile.
    Dragging(Gesture),
    /// Resizing a tile from a handle.
    Resizing {
        /// The handle being dragged.
        handle: ResizeHandle,
        /// Gesture start state.
        gesture: Gesture,
    },
    /// Editing the crop of a tile.
    Cropping {
        /// The tile being cropped.
        item: ItemId,
        /// Uncommitted crop.
        draft: CropRect,
    },
}

impl InteractionMode {
    /// Whether no gesture is in progress.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Whether a pointer gesture is in progress.
    #[must_use]
    pub fn is_pointer_gesture(&self) -> bool {
        matches!(self, Self::Dragging(_) | Self::Resizing { .. })
    }
}

/// Geometry of a tile moved by `(dx, dy)`.
///
/// Snaps the new corner to the grid when enabled, then keeps the tile
/// inside the canvas.
#[must_use]
pub fn moved(initial: Square, dx: f64, dy: f64, grid: &GridConfig) -> Square {
    let size = initial.size.min(CANVAS_EXTENT);
    let max = CANVAS_EXTENT - size;
    Square::new(
        grid.snap(initial.x + dx).clamp(0.0, max),
        grid.snap(initial.y + dy).clamp(0.0, max),
        size,
    )
}

/// Geometry of a tile resized from `handle` by pointer travel `(dx, dy)`.
///
/// Edge handles use the travel along their own axis. Corner handles use
/// whichever axis moved further, so the tile stays square. Growing from the
/// west or north moves the corner so the opposite edge stays put. The side
/// is at least one cell and never pushes the tile past the canvas edge.
#[must_use]
pub fn resized(initial: Square, handle: ResizeHandle, dx: f64, dy: f64, grid: &GridConfig) -> Square {
    let (hx, hy) = handle.direction();
    let grow_x = dx * f64::from(hx);
    let grow_y = dy * f64::from(hy);

    let delta = if hx == 0 {
        grow_y
    } else if hy == 0 {
        grow_x
    } else if grow_x.abs() >= grow_y.abs() {
        grow_x
    } else {
        grow_y
    };

    let right = initial.right();
    let bottom = initial.bottom();
    let max_w = if hx < 0 { right } else { CANVAS_EXTENT - initial.x };
    let max_h = if hy < 0 { bottom } else { CANVAS_EXTENT - initial.y };

    let size = grid
        .snap(initial.size + delta)
        .min(max_w.min(max_h))
        .max(grid.cell_size());

    // The one-cell minimum can exceed the room left; clamping shifts the tile back.
    Square::new(
        if hx < 0 { right - size } else { initial.x },
        if hy < 0 { bottom - size } else { initial.y },
        size,
    )
    .clamped(grid.cell_size())
}

/// Geometry of a tile nudged by `(dx, dy)` from the keyboard or toolbar.
///
/// Like [`moved`], except that with snapping on a non-zero delta always
/// advances at least one cell in its direction instead of rounding back to
/// the starting cell.
#[must_use]
pub fn nudged(initial: Square, dx: f64, dy: f64, grid: &GridConfig) -> Square {
    let step = |origin: f64, delta: f64| {
        let start = grid.snap(origin);
        let target = grid.snap(origin + delta);
        if grid.snap_enabled && delta != 0.0 && (target - start).abs() < 1e-9 {
            start + delta.signum() * grid.cell_size()
        } else {
            target
        }
    };
    Square::new(step(initial.x, dx), step(initial.y, dy), initial.size).clamped(grid.cell_size())
}
