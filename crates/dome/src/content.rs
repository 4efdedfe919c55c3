use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentKind {
    #[default]
    Image,
    EmbeddedDocument,
}

/// One entry of the gallery's content pool. URIs are opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRef {
    pub preview_uri: String,
    pub target_uri: String,
    #[serde(default)]
    pub alt_text: String,
    #[serde(default)]
    pub kind: ContentKind,
}

impl ContentRef {
    /// Image entry whose enlarged view reuses the preview.
    pub fn image(preview_uri: impl Into<String>) -> Self {
        let preview_uri = preview_uri.into();
        Self {
            target_uri: preview_uri.clone(),
            preview_uri,
            alt_text: String::new(),
            kind: ContentKind::Image,
        }
    }
}

/// Payload handed to the overlay presenter when a tile should open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenTile {
    pub tile: usize,
    pub target_uri: String,
    pub preview_uri: String,
    pub kind: ContentKind,
}
