//! Collage export.
//!
//! Loads every distinct tile image once, then composites tiles in ascending
//! z-order onto a square surface. Each tile shows its crop region of the
//! source image scaled into the tile's square, clipped to a rounded
//! rectangle, with an optional inset border.

use std::collections::{BTreeSet, HashMap};

use collage_core::{CanvasItem, CropRect, CANVAS_EXTENT};
use futures::future::join_all;
use tiny_skia::{
    FillRule, FilterQuality, IntRect, Paint, Path, PathBuilder, Pattern, Pixmap, Rect, SpreadMode,
    Stroke, Transform,
};
use tracing::{debug, info, warn};

use crate::artifact::ExportArtifact;
use crate::error::{RenderError, RenderResult};
use crate::image::TextureData;
use crate::loader::ImageLoader;
use crate::style::ExportStyle;

/// Cubic Bezier approximation constant for quarter circles.
const KAPPA: f32 = 0.552_284_8;

/// Integer pixel rectangle of a tile on the output surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    /// Left edge.
    pub left: i32,
    /// Top edge.
    pub top: i32,
    /// Width, at least 1.
    pub width: u32,
    /// Height, at least 1.
    pub height: u32,
}

impl PixelRect {
    /// Map a tile's percent geometry onto a `size`-pixel surface.
    ///
    /// Both edges are rounded independently so adjacent tiles share edges
    /// without gaps or overlap.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn for_item(item: &CanvasItem, size: u32) -> Self {
        let scale = f64::from(size) / CANVAS_EXTENT;
        let edge = |v: f64| (v * scale).round() as i32;

        let left = edge(item.x);
        let top = edge(item.y);
        let right = edge(item.x + item.size);
        let bottom = edge(item.y + item.size);

        Self {
            left,
            top,
            width: (right - left).max(1).unsigned_abs(),
            height: (bottom - top).max(1).unsigned_abs(),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn to_rect(self) -> Option<Rect> {
        Rect::from_xywh(
            self.left as f32,
            self.top as f32,
            self.width as f32,
            self.height as f32,
        )
    }
}

/// Crop region of a source image, in source pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl SourceRect {
    /// Resolve a percent crop against an image's natural size.
    #[must_use]
    pub fn from_crop(crop: &CropRect, image_width: u32, image_height: u32) -> Self {
        let crop = crop.clamped();
        let w = f64::from(image_width);
        let h = f64::from(image_height);
        Self {
            x: crop.x / CANVAS_EXTENT * w,
            y: crop.y / CANVAS_EXTENT * h,
            width: (crop.width / CANVAS_EXTENT * w).max(f64::MIN_POSITIVE),
            height: (crop.height / CANVAS_EXTENT * h).max(f64::MIN_POSITIVE),
        }
    }

    /// Whole source pixels covering this rect, limited to the image.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_sign_loss
    )]
    pub fn pixel_window(&self, image_width: u32, image_height: u32) -> Option<IntRect> {
        let w = f64::from(image_width);
        let h = f64::from(image_height);
        let left = self.x.floor().clamp(0.0, (w - 1.0).max(0.0));
        let top = self.y.floor().clamp(0.0, (h - 1.0).max(0.0));
        let right = (self.x + self.width).ceil().clamp(left + 1.0, w.max(1.0));
        let bottom = (self.y + self.height).ceil().clamp(top + 1.0, h.max(1.0));
        IntRect::from_ltrb(left as i32, top as i32, right as i32, bottom as i32)
    }
}

/// Renders collages to square PNG images.
#[derive(Debug, Clone, Default)]
pub struct CollageExporter {
    style: ExportStyle,
}

impl CollageExporter {
    /// Create a new exporter with the given style.
    #[must_use]
    pub fn new(style: ExportStyle) -> Self {
        Self { style }
    }

    /// Create an exporter with default styling.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Styling in effect.
    #[must_use]
    pub fn style(&self) -> &ExportStyle {
        &self.style
    }

    /// Load every tile image through `loader`, then composite.
    ///
    /// Tiles whose image fails to load are skipped with a warning; the export
    /// itself still succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the output surface cannot be allocated or encoded.
    pub async fn export<L>(&self, items: &[CanvasItem], loader: &L) -> RenderResult<ExportArtifact>
    where
        L: ImageLoader + ?Sized,
    {
        let images = load_images(items, loader).await;
        self.compose(items, &images)
    }

    /// Composite tiles using already-decoded images keyed by `image_ref`.
    ///
    /// # Errors
    ///
    /// Returns an error if the output surface cannot be allocated or encoded.
    pub fn compose(
        &self,
        items: &[CanvasItem],
        images: &HashMap<String, TextureData>,
    ) -> RenderResult<ExportArtifact> {
        let size = self.style.size();
        let mut pixmap = Pixmap::new(size, size)
            .ok_or_else(|| RenderError::Export(format!("cannot allocate {size}x{size} surface")))?;

        if let Some(background) = self.style.background_color {
            pixmap.fill(background.to_skia());
        }

        // Stable sort: equal z keeps insertion order.
        let mut ordered: Vec<&CanvasItem> = items.iter().collect();
        ordered.sort_by_key(|item| item.z_index);

        let mut drawn = 0usize;
        for item in ordered {
            let Some(texture) = images.get(&item.image_ref) else {
                debug!("No image for tile {}, skipping", item.id);
                continue;
            };
            match self.draw_tile(&mut pixmap, item, texture) {
                Ok(()) => drawn += 1,
                Err(e) => warn!("Failed to draw tile {}: {}", item.id, e),
            }
        }

        info!("Exported {}/{} tiles at {}px", drawn, items.len(), size);
        ExportArtifact::from_pixmap(&pixmap)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn draw_tile(
        &self,
        pixmap: &mut Pixmap,
        item: &CanvasItem,
        texture: &TextureData,
    ) -> RenderResult<()> {
        let dest = PixelRect::for_item(item, pixmap.width());
        let rect = dest
            .to_rect()
            .ok_or_else(|| RenderError::Export(format!("degenerate tile rect {dest:?}")))?;
        let src = SourceRect::from_crop(&item.crop, texture.width, texture.height);

        // Sample from the crop window alone so padding and filtering never
        // pull in pixels outside the crop.
        let window = src
            .pixel_window(texture.width, texture.height)
            .ok_or_else(|| RenderError::Export(format!("empty source window {src:?}")))?;
        let source = texture
            .to_pixmap()?
            .clone_rect(window)
            .ok_or_else(|| RenderError::Export(format!("cannot crop source to {window:?}")))?;

        let scale_x = f64::from(dest.width) / src.width;
        let scale_y = f64::from(dest.height) / src.height;
        let transform = Transform::from_row(
            scale_x as f32,
            0.0,
            0.0,
            scale_y as f32,
            (f64::from(dest.left) - (src.x - f64::from(window.x())) * scale_x) as f32,
            (f64::from(dest.top) - (src.y - f64::from(window.y())) * scale_y) as f32,
        );

        let quality = if self.style.smoothing {
            FilterQuality::Bilinear
        } else {
            FilterQuality::Nearest
        };

        let radius = self.style.border_radius();
        let clip = tile_path(rect, radius)
            .ok_or_else(|| RenderError::Export("cannot build tile path".to_string()))?;

        let paint = Paint {
            shader: Pattern::new(
                source.as_ref(),
                SpreadMode::Pad,
                quality,
                1.0,
                transform,
            ),
            anti_alias: radius > 0.0,
            ..Paint::default()
        };
        pixmap.fill_path(&clip, &paint, FillRule::Winding, Transform::identity(), None);

        self.draw_border(pixmap, rect, radius, &clip);
        Ok(())
    }

    /// Stroke the border inside the tile so it never bleeds into neighbors.
    fn draw_border(&self, pixmap: &mut Pixmap, rect: Rect, radius: f32, clip: &Path) {
        let width = self.style.border_width();
        if width <= 0.0 {
            return;
        }

        let mut paint = Paint::default();
        paint.set_color(self.style.border_color.to_skia());
        paint.anti_alias = radius > 0.0;

        let half = width / 2.0;
        let inset = Rect::from_ltrb(
            rect.left() + half,
            rect.top() + half,
            rect.right() - half,
            rect.bottom() - half,
        );

        match inset.and_then(|r| tile_path(r, (radius - half).max(0.0))) {
            Some(path) => {
                let stroke = Stroke {
                    width,
                    ..Stroke::default()
                };
                pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
            }
            // Border wider than the tile: the tile is all border.
            None => {
                pixmap.fill_path(clip, &paint, FillRule::Winding, Transform::identity(), None);
            }
        }
    }
}

/// Load each distinct image reference once, concurrently.
///
/// Failed loads are logged and left out of the result.
pub async fn load_images<L>(items: &[CanvasItem], loader: &L) -> HashMap<String, TextureData>
where
    L: ImageLoader + ?Sized,
{
    let refs: BTreeSet<&str> = items.iter().map(|item| item.image_ref.as_str()).collect();
    debug!("Loading {} distinct tile images", refs.len());

    let loads = refs
        .into_iter()
        .map(|image_ref| async move { (image_ref, loader.load(image_ref).await) });

    join_all(loads)
        .await
        .into_iter()
        .filter_map(|(image_ref, result)| match result {
            Ok(texture) => Some((image_ref.to_string(), texture)),
            Err(e) => {
                warn!("Skipping image {}: {}", image_ref, e);
                None
            }
        })
        .collect()
}

/// Rectangle with quarter-circle corners of `radius`, capped at half the
/// shorter side.
fn tile_path(rect: Rect, radius: f32) -> Option<Path> {
    let r = radius.min(rect.width() / 2.0).min(rect.height() / 2.0);
    if r <= 0.0 {
        return Some(PathBuilder::from_rect(rect));
    }

    let (l, t, rt, b) = (rect.left(), rect.top(), rect.right(), rect.bottom());
    let k = r * KAPPA;

    let mut pb = PathBuilder::new();
    pb.move_to(l + r, t);
    pb.line_to(rt - r, t);
    pb.cubic_to(rt - r + k, t, rt, t + r - k, rt, t + r);
    pb.line_to(rt, b - r);
    pb.cubic_to(rt, b - r + k, rt - r + k, b, rt - r, b);
    pb.line_to(l + r, b);
    pb.cubic_to(l + r - k, b, l, b - r + k, l, b - r);
    pb.line_to(l, t + r);
    pb.cubic_to(l, t + r - k, l + r - k, t, l + r, t);
    pb.close();
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::create_solid_color;
    use crate::style::Color;
    use collage_core::Square;

    fn tile(image_ref: &str, x: f64, y: f64, size: f64) -> CanvasItem {
        CanvasItem::new(image_ref, Square::new(x, y, size))
    }

    fn crisp(size: u32) -> ExportStyle {
        ExportStyle::default().with_size(size).with_smoothing(false)
    }

    #[test]
    fn test_pixel_rect_rounds_edges_independently() {
        let a = PixelRect::for_item(&tile("a", 0.0, 0.0, 100.0 / 3.0), 1000);
        let b = PixelRect::for_item(&tile("b", 100.0 / 3.0, 0.0, 100.0 / 3.0), 1000);
        assert_eq!(a.left, 0);
        assert_eq!(a.width, 333);
        assert_eq!(b.left, 333);
        assert_eq!(b.width, 334);
    }

    #[test]
    fn test_pixel_rect_never_empty() {
        let rect = PixelRect::for_item(&tile("a", 10.0, 10.0, 0.01), 100);
        assert_eq!(rect.width, 1);
        assert_eq!(rect.height, 1);
    }

    #[test]
    fn test_source_rect_from_crop() {
        let src = SourceRect::from_crop(&CropRect::new(25.0, 50.0, 50.0, 25.0), 200, 400);
        assert!((src.x - 50.0).abs() < 1e-9);
        assert!((src.y - 200.0).abs() < 1e-9);
        assert!((src.width - 100.0).abs() < 1e-9);
        assert!((src.height - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_pixel_window_covers_fractional_crop() {
        let src = SourceRect::from_crop(&CropRect::new(10.0, 0.0, 50.0, 50.0), 15, 4);
        let window = src.pixel_window(15, 4).expect("window");
        assert_eq!((window.x(), window.y()), (1, 0));
        assert_eq!((window.width(), window.height()), (8, 2));
    }

    #[test]
    fn test_smoothing_does_not_bleed_past_crop() {
        let style = ExportStyle::default().with_size(100).with_smoothing(true);
        let halves = TextureData::from_rgba(2, 1, vec![255, 0, 0, 255, 0, 255, 0, 255])
            .expect("texture");
        let mut images = HashMap::new();
        images.insert("halves".to_string(), halves);

        let mut item = tile("halves", 0.0, 0.0, 100.0);
        item.crop = CropRect::new(0.0, 0.0, 50.0, 100.0);
        let artifact = CollageExporter::new(style)
            .compose(&[item], &images)
            .expect("export");
        assert_eq!(artifact.pixel(0, 50), Some([255, 0, 0, 255]));
        assert_eq!(artifact.pixel(99, 50), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_tile_path_variants() {
        let rect = Rect::from_xywh(0.0, 0.0, 40.0, 20.0).expect("rect");
        assert!(tile_path(rect, 0.0).is_some());
        let rounded = tile_path(rect, 100.0).expect("capped radius");
        let bounds = rounded.bounds();
        assert!((bounds.width() - 40.0).abs() < 1e-3);
        assert!((bounds.height() - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_compose_empty_canvas_with_background() {
        let style = ExportStyle::default()
            .with_size(100)
            .with_background(Some(Color::rgb(0, 0, 255)));
        let artifact = CollageExporter::new(style)
            .compose(&[], &HashMap::new())
            .expect("export");
        assert_eq!(artifact.size, 100);
        assert_eq!(artifact.pixel(50, 50), Some([0, 0, 255, 255]));
    }

    #[test]
    fn test_compose_skips_missing_images() {
        let style = crisp(100);
        let mut images = HashMap::new();
        images.insert("red".to_string(), create_solid_color(2, 2, 255, 0, 0, 255));

        let items = vec![tile("red", 0.0, 0.0, 50.0), tile("gone", 50.0, 50.0, 50.0)];
        let artifact = CollageExporter::new(style)
            .compose(&items, &images)
            .expect("export");
        assert_eq!(artifact.pixel(10, 10), Some([255, 0, 0, 255]));
        assert_eq!(artifact.pixel(75, 75).map(|px| px[3]), Some(0));
    }

    #[test]
    fn test_higher_z_draws_on_top() {
        let style = crisp(100);
        let mut images = HashMap::new();
        images.insert("red".to_string(), create_solid_color(2, 2, 255, 0, 0, 255));
        images.insert("green".to_string(), create_solid_color(2, 2, 0, 255, 0, 255));

        let items = vec![
            tile("green", 0.0, 0.0, 50.0).with_z_index(5),
            tile("red", 0.0, 0.0, 50.0).with_z_index(1),
        ];
        let artifact = CollageExporter::new(style)
            .compose(&items, &images)
            .expect("export");
        assert_eq!(artifact.pixel(25, 25), Some([0, 255, 0, 255]));
    }

    #[test]
    fn test_border_is_drawn_inside_tile() {
        let style = crisp(100).with_border(4.0, Color::WHITE);
        let mut images = HashMap::new();
        images.insert("red".to_string(), create_solid_color(2, 2, 255, 0, 0, 255));

        let items = vec![tile("red", 0.0, 0.0, 50.0)];
        let artifact = CollageExporter::new(style)
            .compose(&items, &images)
            .expect("export");
        assert_eq!(artifact.pixel(1, 25), Some([255, 255, 255, 255]));
        assert_eq!(artifact.pixel(25, 25), Some([255, 0, 0, 255]));
        assert_eq!(artifact.pixel(52, 25).map(|px| px[3]), Some(0));
    }

    #[test]
    fn test_rounded_corners_are_transparent() {
        let style = crisp(100).with_radius(20.0);
        let mut images = HashMap::new();
        images.insert("red".to_string(), create_solid_color(2, 2, 255, 0, 0, 255));

        let items = vec![tile("red", 0.0, 0.0, 100.0)];
        let artifact = CollageExporter::new(style)
            .compose(&items, &images)
            .expect("export");
        assert_eq!(artifact.pixel(0, 0).map(|px| px[3]), Some(0));
        assert_eq!(artifact.pixel(50, 50), Some([255, 0, 0, 255]));
    }
}
