//! Serializable collage layout.

use serde::{Deserialize, Serialize};

use crate::error::{CollageError, CollageResult};
use crate::grid::GridConfig;
use crate::item::CanvasItem;
use crate::state::CanvasState;

/// Current layout format version.
pub const DOCUMENT_VERSION: u32 = 1;

/// A saved collage: grid settings plus placed tiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollageDocument {
    /// Format version.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Grid settings.
    #[serde(default)]
    pub grid: GridConfig,
    /// Tiles in insertion order.
    #[serde(default)]
    pub items: Vec<CanvasItem>,
}

fn default_version() -> u32 {
    DOCUMENT_VERSION
}

impl CollageDocument {
    /// Snapshot the committed layout of a canvas.
    #[must_use]
    pub fn from_state(state: &CanvasState) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            grid: *state.grid(),
            items: state.items().to_vec(),
        }
    }

    /// Rebuild a canvas from this document.
    #[must_use]
    pub fn into_state(self) -> CanvasState {
        CanvasState::from_items(self.grid, self.items)
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CollageResult<String> {
        serde_json::to_string_pretty(self).map_err(CollageError::Serialization)
    }

    /// Deserialize from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the version is newer
    /// than this build understands.
    pub fn from_json(json: &str) -> CollageResult<Self> {
        let document: Self = serde_json::from_str(json)?;
        if document.version > DOCUMENT_VERSION {
            return Err(CollageError::InvalidOperation(format!(
                "unsupported document version {}",
                document.version
            )));
        }
        Ok(document)
    }
}

impl CanvasState {
    /// Snapshot this canvas as a document.
    #[must_use]
    pub fn document(&self) -> CollageDocument {
        CollageDocument::from_state(self)
    }

    /// Rebuild a canvas from a document.
    #[must_use]
    pub fn from_document(document: CollageDocument) -> Self {
        document.into_state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_json_preserves_layout() {
        let mut state = CanvasState::with_seed(GridConfig::new(8), 1);
        state.add_item("https://img/a.png");
        state.add_item("https://img/b.png");

        let json = state.document().to_json().expect("serialize");
        assert!(json.contains("imageRef"));
        assert!(json.contains("zIndex"));

        let restored = CanvasState::from_document(CollageDocument::from_json(&json).expect("parse"));
        assert_eq!(restored.items(), state.items());
        assert_eq!(restored.grid().columns, 8);
    }

    #[test]
    fn test_rejects_future_version() {
        let json = r#"{"version": 99, "items": []}"#;
        assert!(CollageDocument::from_json(json).is_err());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let doc = CollageDocument::from_json("{}").expect("parse");
        assert_eq!(doc.version, DOCUMENT_VERSION);
        assert_eq!(doc.grid, GridConfig::default());
        assert!(doc.items.is_empty());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            CollageDocument::from_json("{not json"),
            Err(CollageError::Serialization(_))
        ));
    }
}
