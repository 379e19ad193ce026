//! Editor settings for Scribe
//!
//! This module defines the `EditorSettings` struct that holds all
//! user-configurable options, with serde support for JSON persistence.

use crate::document::ViewMode;
use crate::fragments::FragmentStyles;
use serde::{Deserialize, Serialize};

/// Editor preferences.
///
/// All fields use serde defaults so settings files written by older
/// versions still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    // ─────────────────────────────────────────────────────────────────────────
    // Media
    // ─────────────────────────────────────────────────────────────────────────
    /// Number of images requested from the catalog per picker session
    pub catalog_page_size: usize,

    // ─────────────────────────────────────────────────────────────────────────
    // Modals
    // ─────────────────────────────────────────────────────────────────────────
    /// Rows prefilled in the table modal
    pub default_table_rows: usize,
    /// Columns prefilled in the table modal
    pub default_table_cols: usize,

    // ─────────────────────────────────────────────────────────────────────────
    // Editing
    // ─────────────────────────────────────────────────────────────────────────
    /// Maximum undo history size of the visual view
    pub history_depth: usize,
    /// View that is live when the editor is created
    pub start_view_mode: ViewMode,
    /// Whether the editor starts in fullscreen layout
    pub start_fullscreen: bool,

    // ─────────────────────────────────────────────────────────────────────────
    // Output
    // ─────────────────────────────────────────────────────────────────────────
    /// Inline styles for inserted fragments
    pub fragment_styles: FragmentStyles,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            catalog_page_size: 100,
            default_table_rows: 3,
            default_table_cols: 3,
            history_depth: 100,
            start_view_mode: ViewMode::Visual,
            start_fullscreen: false,
            fragment_styles: FragmentStyles::default(),
        }
    }
}

impl EditorSettings {
    // ─────────────────────────────────────────────────────────────────────────
    // Validation Constants and Sanitization
    // ─────────────────────────────────────────────────────────────────────────

    /// Maximum catalog page size.
    pub const MAX_CATALOG_PAGE_SIZE: usize = 500;
    /// Maximum rows or columns prefilled in the table modal.
    pub const MAX_TABLE_DIMENSION: usize = 50;
    /// Maximum undo history size.
    pub const MAX_HISTORY_DEPTH: usize = 1000;

    /// Sanitize settings by clamping values to valid ranges.
    ///
    /// This is useful after loading settings from a file that might have
    /// been manually edited with invalid values.
    pub fn sanitize(&mut self) {
        self.catalog_page_size = self
            .catalog_page_size
            .clamp(1, Self::MAX_CATALOG_PAGE_SIZE);

        self.default_table_rows = self
            .default_table_rows
            .clamp(1, Self::MAX_TABLE_DIMENSION);
        self.default_table_cols = self
            .default_table_cols
            .clamp(1, Self::MAX_TABLE_DIMENSION);

        // Zero is allowed and disables history
        self.history_depth = self.history_depth.min(Self::MAX_HISTORY_DEPTH);
    }

    /// Load settings and sanitize them to ensure validity.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = EditorSettings::default();

        assert_eq!(settings.catalog_page_size, 100);
        assert_eq!(settings.default_table_rows, 3);
        assert_eq!(settings.default_table_cols, 3);
        assert_eq!(settings.history_depth, 100);
        assert_eq!(settings.start_view_mode, ViewMode::Visual);
        assert!(!settings.start_fullscreen);
    }

    #[test]
    fn test_view_mode_serialization() {
        assert_eq!(
            serde_json::to_string(&ViewMode::Visual).unwrap(),
            "\"visual\""
        );
        assert_eq!(
            serde_json::from_str::<ViewMode>("\"source\"").unwrap(),
            ViewMode::Source
        );
    }

    #[test]
    fn test_settings_serialization_roundtrip() {
        let settings = EditorSettings {
            catalog_page_size: 25,
            start_fullscreen: true,
            ..EditorSettings::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        let loaded: EditorSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(settings, loaded);
    }

    #[test]
    fn test_settings_deserialize_with_defaults() {
        let json = r#"{"start_view_mode": "source"}"#;
        let settings: EditorSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.start_view_mode, ViewMode::Source);
        assert_eq!(settings.catalog_page_size, 100);
        assert_eq!(settings.fragment_styles, FragmentStyles::default());
    }

    #[test]
    fn test_partial_fragment_styles() {
        let json = r#"{"fragment_styles": {"horizontal_rule": "border: 0;"}}"#;
        let settings: EditorSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.fragment_styles.horizontal_rule, "border: 0;");
        assert_eq!(
            settings.fragment_styles.image,
            FragmentStyles::default().image
        );
    }

    #[test]
    fn test_sanitize_clamps_values() {
        let mut settings = EditorSettings {
            catalog_page_size: 0,
            default_table_rows: 0,
            default_table_cols: 1000,
            history_depth: 1_000_000,
            ..EditorSettings::default()
        };
        settings.sanitize();
        assert_eq!(settings.catalog_page_size, 1);
        assert_eq!(settings.default_table_rows, 1);
        assert_eq!(
            settings.default_table_cols,
            EditorSettings::MAX_TABLE_DIMENSION
        );
        assert_eq!(settings.history_depth, EditorSettings::MAX_HISTORY_DEPTH);
    }

    #[test]
    fn test_from_json_sanitized() {
        let json = r#"{"catalog_page_size": 9999, "history_depth": 0}"#;
        let settings = EditorSettings::from_json_sanitized(json).unwrap();
        assert_eq!(
            settings.catalog_page_size,
            EditorSettings::MAX_CATALOG_PAGE_SIZE
        );
        assert_eq!(settings.history_depth, 0);
    }
}
