//! Assets pushed in by the selection layer, and their identity keys.
//!
//! Asset records arrive in several shapes (a contract/token pair, a generic
//! id, or only an image URL). [`resolve_identity`] reduces any of them to one
//! [`IdentityKey`] so deduplication compares like with like.

use serde::{Deserialize, Serialize};

/// An asset chosen in the external selection layer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectedAsset {
    /// Contract address of the token, if known.
    pub contract_address: Option<String>,
    /// Token id within the contract, if known.
    pub token_id: Option<String>,
    /// Opaque marketplace id, if known.
    pub id: Option<String>,
    /// Image to show on the tile.
    pub image_url: String,
    /// Name shown in listings.
    pub display_name: Option<String>,
    /// Whether this is a collection-level artifact rather than a single token.
    pub is_collection_artifact: bool,
}

impl SelectedAsset {
    /// Asset identified only by its image.
    #[must_use]
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
            ..Self::default()
        }
    }

    /// Set the contract/token pair.
    #[must_use]
    pub fn with_token(mut self, contract_address: impl Into<String>, token_id: impl Into<String>) -> Self {
        self.contract_address = Some(contract_address.into());
        self.token_id = Some(token_id.into());
        self
    }

    /// Set the generic id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Identity key of this asset.
    #[must_use]
    pub fn identity(&self) -> IdentityKey {
        resolve_identity(self)
    }
}

/// Deduplication key for an asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum IdentityKey {
    /// Contract address (lowercased) and token id.
    Token {
        /// Contract address.
        contract: String,
        /// Token id.
        token_id: String,
    },
    /// Generic marketplace id.
    Id(String),
    /// Image URL, the last resort.
    ImageUrl(String),
}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Token { contract, token_id } => write!(f, "{contract}:{token_id}"),
            Self::Id(id) => write!(f, "id:{id}"),
            Self::ImageUrl(url) => write!(f, "url:{url}"),
        }
    }
}

/// Resolve the identity key of an asset.
///
/// Prefers the contract/token pair, then the generic id, then the image
/// URL. Blank strings count as missing. Contract addresses compare
/// case-insensitively.
#[must_use]
pub fn resolve_identity(asset: &SelectedAsset) -> IdentityKey {
    let present = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(ToString::to_string)
    };

    if let (Some(contract), Some(token_id)) =
        (present(&asset.contract_address), present(&asset.token_id))
    {
        return IdentityKey::Token {
            contract: contract.to_lowercase(),
            token_id,
        };
    }

    if let Some(id) = present(&asset.id) {
        return IdentityKey::Id(id);
    }

    IdentityKey::ImageUrl(asset.image_url.clone())
}
