//! Integration tests for collage export (collage-renderer).
//!
//! Covers pixel accuracy against a reference crop-and-scale, loader
//! behavior during export, and the delivery paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use base64::Engine;
use collage_core::{CanvasItem, CanvasState, CropRect, GridConfig, Square};
use collage_renderer::{
    CollageExporter, DefaultImageLoader, ExportStyle, ImageLoader, RenderError, RenderResult,
    StaticImageLoader, TextureData,
};

/// 8x8 image where every pixel has a distinct opaque color.
fn gradient_texture() -> TextureData {
    let mut data = Vec::with_capacity(8 * 8 * 4);
    for y in 0..8u8 {
        for x in 0..8u8 {
            data.extend_from_slice(&[x * 30, y * 30, 100, 255]);
        }
    }
    TextureData::from_rgba(8, 8, data).expect("texture")
}

fn crisp(size: u32) -> ExportStyle {
    ExportStyle::default().with_size(size).with_smoothing(false)
}

fn png_data_uri(texture: &TextureData) -> String {
    let png = texture.to_pixmap().expect("pixmap").encode_png().expect("png");
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}

/// Counts loads per reference and fails for refs starting with `bad:`.
#[derive(Default)]
struct CountingLoader {
    inner: StaticImageLoader,
    calls: AtomicUsize,
}

#[async_trait]
impl ImageLoader for CountingLoader {
    async fn load(&self, image_ref: &str) -> RenderResult<TextureData> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if image_ref.starts_with("bad:") {
            return Err(RenderError::Resource(format!("broken image {image_ref}")));
        }
        self.inner.load(image_ref).await
    }
}

// ==========================================================================
// Pixel accuracy
// ==========================================================================

#[test]
fn test_single_tile_matches_reference_crop_and_scale() {
    let texture = gradient_texture();
    let mut item = CanvasItem::new("gradient", Square::new(0.0, 0.0, 50.0));
    item.crop = CropRect::new(25.0, 25.0, 50.0, 50.0);

    let mut images = HashMap::new();
    images.insert("gradient".to_string(), texture.clone());
    let artifact = CollageExporter::new(crisp(200))
        .compose(&[item], &images)
        .expect("export");

    // Destination is 100x100 px; the crop covers source pixels 2..6.
    for dy in 0..100u32 {
        for dx in 0..100u32 {
            let sx = 2 + (dx * 4) / 100;
            let sy = 2 + (dy * 4) / 100;
            assert_eq!(
                artifact.pixel(dx, dy),
                texture.pixel(sx, sy),
                "mismatch at ({dx}, {dy})"
            );
        }
    }

    // Nothing outside the destination rect.
    for (x, y) in [(100, 0), (0, 100), (150, 150), (199, 199)] {
        assert_eq!(artifact.pixel(x, y).map(|px| px[3]), Some(0));
    }
}

#[test]
fn test_full_canvas_tile_covers_output() {
    let texture = gradient_texture();
    let item = CanvasItem::new("gradient", Square::new(0.0, 0.0, 100.0));
    let mut images = HashMap::new();
    images.insert("gradient".to_string(), texture.clone());

    let artifact = CollageExporter::new(crisp(160))
        .compose(&[item], &images)
        .expect("export");
    // 20 output px per source px.
    assert_eq!(artifact.pixel(10, 10), texture.pixel(0, 0));
    assert_eq!(artifact.pixel(155, 155), texture.pixel(7, 7));
    assert_eq!(artifact.pixel(70, 30), texture.pixel(3, 1));
}

// ==========================================================================
// Async export
// ==========================================================================

#[tokio::test]
async fn test_failed_image_is_skipped() {
    let mut loader = CountingLoader::default();
    loader.inner.insert("good", gradient_texture());

    let items = vec![
        CanvasItem::new("good", Square::new(0.0, 0.0, 50.0)),
        CanvasItem::new("bad:one", Square::new(50.0, 50.0, 50.0)),
    ];
    let artifact = CollageExporter::new(crisp(100))
        .export(&items, &loader)
        .await
        .expect("export succeeds despite a broken tile");

    assert_eq!(artifact.pixel(1, 1).map(|px| px[3]), Some(255));
    assert_eq!(artifact.pixel(75, 75).map(|px| px[3]), Some(0));
}

#[tokio::test]
async fn test_shared_image_loaded_once() {
    let mut loader = CountingLoader::default();
    loader.inner.insert("shared", gradient_texture());

    let items = vec![
        CanvasItem::new("shared", Square::new(0.0, 0.0, 25.0)),
        CanvasItem::new("shared", Square::new(25.0, 0.0, 25.0)),
        CanvasItem::new("shared", Square::new(50.0, 0.0, 25.0)),
    ];
    CollageExporter::new(crisp(100))
        .export(&items, &loader)
        .await
        .expect("export");
    assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_export_canvas_state_with_data_uris() {
    let mut state = CanvasState::with_seed(GridConfig::new(4), 3);
    let uri = png_data_uri(&gradient_texture());
    state.add_item(uri.clone());
    state.add_item(uri);

    let artifact = CollageExporter::new(crisp(400))
        .export(state.items(), &DefaultImageLoader::new())
        .await
        .expect("export");

    assert_eq!(artifact.size, 400);
    assert_eq!(&artifact.png[0..4], &[0x89, 0x50, 0x4E, 0x47]);
    // First tile occupies the top-left two cells.
    assert_eq!(artifact.pixel(10, 10).map(|px| px[3]), Some(255));

    let decoded = image::load_from_memory(&artifact.png).expect("decode png");
    assert_eq!(decoded.width(), 400);
    assert_eq!(decoded.height(), 400);
}

#[tokio::test]
async fn test_export_size_is_clamped() {
    let artifact = CollageExporter::new(crisp(5))
        .export(&[], &StaticImageLoader::new())
        .await
        .expect("export");
    assert_eq!(artifact.size, 100);
}

// ==========================================================================
// Delivery
// ==========================================================================

#[tokio::test]
async fn test_export_and_save() {
    let mut loader = StaticImageLoader::new();
    loader.insert("g", gradient_texture());
    let items = vec![CanvasItem::new("g", Square::new(10.0, 10.0, 30.0))];

    let artifact = CollageExporter::with_defaults()
        .export(&items, &loader)
        .await
        .expect("export");

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("collage.png");
    artifact.save_to_file(&path).expect("save");

    let written = std::fs::read(&path).expect("read");
    assert_eq!(written, artifact.png);
    assert_eq!(artifact.size, 1200);
}

#[test]
fn test_clipboard_failure_is_a_typed_error() {
    let artifact = CollageExporter::new(crisp(100))
        .compose(&[], &HashMap::new())
        .expect("export");

    // Headless CI usually has no clipboard; either outcome must be typed.
    match artifact.copy_to_clipboard() {
        Ok(()) | Err(RenderError::ClipboardUnsupported | RenderError::Clipboard(_)) => {}
        Err(other) => panic!("unexpected clipboard error: {other}"),
    }
}
