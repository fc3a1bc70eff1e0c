//! Finished exports and their delivery targets.

use std::path::Path;

use tiny_skia::Pixmap;
use tracing::info;

use crate::error::{RenderError, RenderResult};

/// A rendered collage: PNG bytes plus the straight-alpha pixels behind them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Edge length in pixels; exports are always square.
    pub size: u32,
    /// Encoded PNG.
    pub png: Vec<u8>,
    rgba: Vec<u8>,
}

impl ExportArtifact {
    /// Encode a finished surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface is not square or PNG encoding fails.
    pub fn from_pixmap(pixmap: &Pixmap) -> RenderResult<Self> {
        if pixmap.width() != pixmap.height() {
            return Err(RenderError::Export(format!(
                "export surface must be square, got {}x{}",
                pixmap.width(),
                pixmap.height()
            )));
        }

        let png = pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(format!("PNG encoding failed: {e}")))?;

        let rgba = pixmap
            .pixels()
            .iter()
            .flat_map(|px| {
                let c = px.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();

        Ok(Self {
            size: pixmap.width(),
            png,
            rgba,
        })
    }

    /// Straight-alpha RGBA pixels, row-major.
    #[must_use]
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Straight-alpha RGBA value at `(x, y)`.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size || y >= self.size {
            return None;
        }
        let offset = ((y as usize) * (self.size as usize) + x as usize) * 4;
        let px = self.rgba.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Write the PNG to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        let path = path.as_ref();
        std::fs::write(path, &self.png)?;
        info!("Saved {}px collage to {}", self.size, path.display());
        Ok(())
    }

    /// Place the image on the system clipboard.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::ClipboardUnsupported`] when no clipboard is
    /// available and [`RenderError::Clipboard`] when the write is rejected.
    #[cfg(feature = "clipboard")]
    pub fn copy_to_clipboard(&self) -> RenderResult<()> {
        use std::borrow::Cow;

        let mut clipboard = arboard::Clipboard::new().map_err(clipboard_error)?;
        clipboard
            .set_image(arboard::ImageData {
                width: self.size as usize,
                height: self.size as usize,
                bytes: Cow::Borrowed(&self.rgba),
            })
            .map_err(clipboard_error)?;
        info!("Copied {}px collage to clipboard", self.size);
        Ok(())
    }

    /// Place the image on the system clipboard.
    ///
    /// # Errors
    ///
    /// Always returns [`RenderError::ClipboardUnsupported`]; this build has
    /// no clipboard support.
    #[cfg(not(feature = "clipboard"))]
    pub fn copy_to_clipboard(&self) -> RenderResult<()> {
        Err(RenderError::ClipboardUnsupported)
    }
}

#[cfg(feature = "clipboard")]
fn clipboard_error(err: arboard::Error) -> RenderError {
    match err {
        arboard::Error::ClipboardNotSupported => RenderError::ClipboardUnsupported,
        other => RenderError::Clipboard(other.to_string()),
    }
}
