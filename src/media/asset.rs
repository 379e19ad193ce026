//! Media asset and local file types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A resolved, remotely hosted image.
///
/// Assets are immutable once created. The catalog collaborator returns them
/// in camelCase JSON, so that is the serialized shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAsset {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl MediaAsset {
    /// Create an asset for a freshly uploaded file.
    ///
    /// The hosting service only reports a URL, so it doubles as the id and
    /// the thumbnail.
    pub fn from_upload(url: impl Into<String>, alt: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            id: url.clone(),
            thumbnail_url: url.clone(),
            url,
            alt: alt.into(),
            created_at: Utc::now(),
        }
    }

    /// URL to show in the picker grid, falling back to the full image.
    pub fn preview_url(&self) -> &str {
        if self.thumbnail_url.is_empty() {
            &self.url
        } else {
            &self.thumbnail_url
        }
    }

    /// Case-insensitive substring match against the alt text.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        query.is_empty() || self.alt.to_lowercase().contains(&query.to_lowercase())
    }
}

/// A file chosen by the operator, not yet uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    /// File name including extension, e.g. `sunset.png`
    pub name: String,
    pub bytes: Vec<u8>,
    pub mime_type: Option<String>,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The file name without directory or extension, used as alt text.
    pub fn base_name(&self) -> String {
        Path::new(&self.name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name_strips_extension() {
        assert_eq!(LocalFile::new("sunset.png", vec![]).base_name(), "sunset");
        assert_eq!(
            LocalFile::new("photos/beach.trip.jpg", vec![]).base_name(),
            "beach.trip"
        );
        assert_eq!(LocalFile::new("README", vec![]).base_name(), "README");
    }

    #[test]
    fn test_asset_from_catalog_json() {
        let json = r#"{
            "id": "a1",
            "url": "https://cdn/a1.png",
            "thumbnailUrl": "https://cdn/a1_t.png",
            "alt": "Harbor",
            "createdAt": "2024-05-01T12:00:00Z"
        }"#;
        let asset: MediaAsset = serde_json::from_str(json).unwrap();
        assert_eq!(asset.id, "a1");
        assert_eq!(asset.preview_url(), "https://cdn/a1_t.png");
        assert_eq!(asset.created_at.to_rfc3339(), "2024-05-01T12:00:00+00:00");
    }

    #[test]
    fn test_asset_json_defaults() {
        let asset: MediaAsset =
            serde_json::from_str(r#"{"id": "a2", "url": "https://cdn/a2.png"}"#).unwrap();
        assert!(asset.alt.is_empty());
        assert_eq!(asset.preview_url(), "https://cdn/a2.png");
    }

    #[test]
    fn test_from_upload_uses_url_as_id() {
        let asset = MediaAsset::from_upload("https://cdn/x.png", "x");
        assert_eq!(asset.id, asset.url);
        assert_eq!(asset.thumbnail_url, asset.url);
    }

    #[test]
    fn test_matches_ignores_case() {
        let asset = MediaAsset::from_upload("https://cdn/x.png", "Golden Gate");
        assert!(asset.matches("gate"));
        assert!(asset.matches(""));
        assert!(!asset.matches("bridge"));
    }
}
