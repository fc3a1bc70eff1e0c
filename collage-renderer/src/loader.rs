//! Image sources for tile references.
//!
//! A tile's `image_ref` may be a `data:` URI, an `http(s)://` URL, a
//! `file://` URL or a plain filesystem path. [`DefaultImageLoader`] handles
//! all four; [`StaticImageLoader`] serves pre-decoded images from memory.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::error::{RenderError, RenderResult};
use crate::image::{load_image_from_bytes, load_image_from_data_uri, TextureData};

/// Resolves an image reference to decoded pixels.
#[async_trait]
pub trait ImageLoader: Send + Sync {
    /// Load and decode the image behind `image_ref`.
    async fn load(&self, image_ref: &str) -> RenderResult<TextureData>;
}

/// Where an image reference points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Inline `data:` URI.
    DataUri(String),
    /// Remote HTTP(S) resource.
    Remote(Url),
    /// Local file.
    File(PathBuf),
}

impl ImageSource {
    /// Classify an image reference.
    ///
    /// # Errors
    ///
    /// Returns an error for URLs with an unsupported scheme.
    pub fn parse(image_ref: &str) -> RenderResult<Self> {
        let trimmed = image_ref.trim();
        if trimmed.starts_with("data:") {
            return Ok(Self::DataUri(trimmed.to_string()));
        }

        match Url::parse(trimmed) {
            Ok(url) => match url.scheme() {
                "http" | "https" => Ok(Self::Remote(url)),
                "file" => url
                    .to_file_path()
                    .map(Self::File)
                    .map_err(|()| RenderError::Resource(format!("invalid file URL: {trimmed}"))),
                // Single-letter schemes are Windows drive letters.
                scheme if scheme.len() == 1 => Ok(Self::File(PathBuf::from(trimmed))),
                scheme => Err(RenderError::Resource(format!(
                    "unsupported image scheme '{scheme}'"
                ))),
            },
            Err(_) => Ok(Self::File(PathBuf::from(trimmed))),
        }
    }
}

/// Loads images from data URIs, the network and the filesystem.
#[derive(Debug, Clone, Default)]
pub struct DefaultImageLoader {
    #[cfg(feature = "remote")]
    client: reqwest::Client,
}

impl DefaultImageLoader {
    /// Create a loader with a fresh HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(feature = "remote")]
    async fn fetch(&self, url: Url) -> RenderResult<Vec<u8>> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| RenderError::Resource(format!("GET {url} failed: {e}")))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RenderError::Resource(format!("reading {url} failed: {e}")))?;
        Ok(bytes.to_vec())
    }

    #[cfg(not(feature = "remote"))]
    #[allow(clippy::unused_async)]
    async fn fetch(&self, url: Url) -> RenderResult<Vec<u8>> {
        Err(RenderError::Resource(format!(
            "remote images are disabled in this build: {url}"
        )))
    }
}

#[async_trait]
impl ImageLoader for DefaultImageLoader {
    async fn load(&self, image_ref: &str) -> RenderResult<TextureData> {
        match ImageSource::parse(image_ref)? {
            ImageSource::DataUri(uri) => load_image_from_data_uri(&uri),
            ImageSource::Remote(url) => {
                debug!("Fetching tile image {}", url);
                let bytes = self.fetch(url).await?;
                load_image_from_bytes(&bytes)
            }
            ImageSource::File(path) => {
                debug!("Reading tile image {}", path.display());
                let bytes = tokio::fs::read(&path).await.map_err(|e| {
                    RenderError::Resource(format!("cannot read {}: {e}", path.display()))
                })?;
                load_image_from_bytes(&bytes)
            }
        }
    }
}

/// Serves pre-decoded images keyed by reference.
#[derive(Debug, Clone, Default)]
pub struct StaticImageLoader {
    images: HashMap<String, TextureData>,
}

impl StaticImageLoader {
    /// Create an empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an image under `image_ref`.
    #[must_use]
    pub fn with_image(mut self, image_ref: impl Into<String>, texture: TextureData) -> Self {
        self.images.insert(image_ref.into(), texture);
        self
    }

    /// Register an image under `image_ref`.
    pub fn insert(&mut self, image_ref: impl Into<String>, texture: TextureData) {
        self.images.insert(image_ref.into(), texture);
    }
}

#[async_trait]
impl ImageLoader for StaticImageLoader {
    async fn load(&self, image_ref: &str) -> RenderResult<TextureData> {
        self.images
            .get(image_ref)
            .cloned()
            .ok_or_else(|| RenderError::Resource(format!("no image registered for {image_ref}")))
    }
}
