//! Export styling: borders, corner radius, background and output size.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// Smallest allowed export edge in pixels.
pub const MIN_EXPORT_SIZE: u32 = 100;
/// Largest allowed export edge in pixels.
pub const MAX_EXPORT_SIZE: u32 = 4000;
/// Default export edge in pixels.
pub const DEFAULT_EXPORT_SIZE: u32 = 1200;

/// An 8-bit straight-alpha RGBA color written as `#rgb`, `#rrggbb` or
/// `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Create an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color with alpha.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Components as an array.
    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub(crate) fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Color {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RenderError::Export(format!("invalid color '{s}'"));
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        let short = |i: usize| {
            u8::from_str_radix(&hex[i..=i], 16)
                .map(|v| v * 17)
                .map_err(|_| invalid())
        };

        match hex.len() {
            3 => Ok(Self::rgb(short(0)?, short(1)?, short(2)?)),
            6 => Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = RenderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(
                f,
                "#{:02x}{:02x}{:02x}{:02x}",
                self.r, self.g, self.b, self.a
            )
        }
    }
}

/// Styling applied when rasterizing a collage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportStyle {
    /// Border stroke width in output pixels; 0 disables the border.
    pub border_width: f32,
    /// Corner radius in output pixels; 0 draws square tiles.
    pub border_radius: f32,
    /// Border stroke color.
    pub border_color: Color,
    /// Canvas fill; `None` leaves the background transparent.
    pub background_color: Option<Color>,
    /// Requested output edge in pixels. See [`ExportStyle::size`].
    pub export_size: u32,
    /// Bilinear sampling when scaling tiles; nearest-neighbor otherwise.
    pub smoothing: bool,
}

impl Default for ExportStyle {
    fn default() -> Self {
        Self {
            border_width: 0.0,
            border_radius: 0.0,
            border_color: Color::WHITE,
            background_color: None,
            export_size: DEFAULT_EXPORT_SIZE,
            smoothing: true,
        }
    }
}

impl ExportStyle {
    /// Output edge clamped to the supported range.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.export_size.clamp(MIN_EXPORT_SIZE, MAX_EXPORT_SIZE)
    }

    /// Border width, with negative or non-finite values treated as 0.
    #[must_use]
    pub fn border_width(&self) -> f32 {
        sanitize(self.border_width)
    }

    /// Corner radius, with negative or non-finite values treated as 0.
    #[must_use]
    pub fn border_radius(&self) -> f32 {
        sanitize(self.border_radius)
    }

    /// Set the requested export size.
    #[must_use]
    pub fn with_size(mut self, size: u32) -> Self {
        self.export_size = size;
        self
    }

    /// Set the border stroke.
    #[must_use]
    pub fn with_border(mut self, width: f32, color: Color) -> Self {
        self.border_width = width;
        self.border_color = color;
        self
    }

    /// Set the corner radius.
    #[must_use]
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.border_radius = radius;
        self
    }

    /// Set the background fill.
    #[must_use]
    pub fn with_background(mut self, color: Option<Color>) -> Self {
        self.background_color = color;
        self
    }

    /// Enable or disable smoothing.
    #[must_use]
    pub fn with_smoothing(mut self, smoothing: bool) -> Self {
        self.smoothing = smoothing;
        self
    }
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}
