//! Canvas items - the tiles of a collage.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::asset::IdentityKey;
use crate::grid::{Square, CANVAS_EXTENT};

/// Unique identifier for a placed tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Create a new unique item ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Crop region in percent of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl CropRect {
    /// Smallest crop width or height accepted.
    pub const MIN_EXTENT: f64 = 10.0;

    /// Create a crop region, unclamped.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole source image.
    #[must_use]
    pub const fn full() -> Self {
        Self::new(0.0, 0.0, CANVAS_EXTENT, CANVAS_EXTENT)
    }

    /// Nearest valid crop.
    ///
    /// The origin stays far enough from the far edge for a minimum-size
    /// crop to fit, then each extent is held in
    /// `[MIN_EXTENT, 100 - origin]`.
    #[must_use]
    pub fn clamped(self) -> Self {
        let (x, width) = clamp_axis(self.x, self.width);
        let (y, height) = clamp_axis(self.y, self.height);
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether this crop covers the whole source image.
    #[must_use]
    pub fn is_full(&self) -> bool {
        *self == Self::full()
    }
}

impl Default for CropRect {
    fn default() -> Self {
        Self::full()
    }
}

fn clamp_axis(origin: f64, extent: f64) -> (f64, f64) {
    let origin = if origin.is_finite() { origin } else { 0.0 };
    let extent = if extent.is_finite() {
        extent
    } else {
        CANVAS_EXTENT
    };
    let origin = origin.clamp(0.0, CANVAS_EXTENT - CropRect::MIN_EXTENT);
    let extent = extent
        .min(CANVAS_EXTENT - origin)
        .max(CropRect::MIN_EXTENT);
    (origin, extent)
}

/// One placed tile on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasItem {
    /// Unique identifier.
    pub id: ItemId,
    /// Source image reference (URL, data URI or path).
    pub image_ref: String,
    /// Deduplication key of the asset this tile shows.
    pub identity: IdentityKey,
    /// Left edge in canvas percent.
    pub x: f64,
    /// Top edge in canvas percent.
    pub y: f64,
    /// Side length in canvas percent.
    pub size: f64,
    /// Paint order; higher draws later.
    pub z_index: i64,
    /// Region of the source image shown in the tile.
    pub crop: CropRect,
    /// Optional human-readable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl CanvasItem {
    /// Create a tile showing the full image at the given geometry.
    ///
    /// The identity defaults to the image reference itself.
    #[must_use]
    pub fn new(image_ref: impl Into<String>, geometry: Square) -> Self {
        let image_ref = image_ref.into();
        Self {
            id: ItemId::new(),
            identity: IdentityKey::ImageUrl(image_ref.clone()),
            image_ref,
            x: geometry.x,
            y: geometry.y,
            size: geometry.size,
            z_index: 0,
            crop: CropRect::full(),
            label: None,
        }
    }

    /// Set the identity key.
    #[must_use]
    pub fn with_identity(mut self, identity: IdentityKey) -> Self {
        self.identity = identity;
        self
    }

    /// Set the paint order.
    #[must_use]
    pub fn with_z_index(mut self, z_index: i64) -> Self {
        self.z_index = z_index;
        self
    }

    /// Set the label.
    #[must_use]
    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    /// Current geometry.
    #[must_use]
    pub fn geometry(&self) -> Square {
        Square::new(self.x, self.y, self.size)
    }

    /// Replace the geometry.
    pub fn set_geometry(&mut self, geometry: Square) {
        self.x = geometry.x;
        self.y = geometry.y;
        self.size = geometry.size;
    }

    /// Check if a canvas-percent point is within this tile.
    #[must_use]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.geometry().contains_point(x, y)
    }
}
