//! Scribe - a headless rich-content HTML editing engine.
//!
//! An editor instance keeps one authoritative HTML document and shows it
//! through two views: a structured visual view driven by formatting
//! commands, and a raw source view. Exactly one view is live at a time.
//! Links, tables, images and rules are inserted as validated fragments, and
//! images are resolved through host-supplied upload and catalog services.

pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod formatting;
pub mod fragments;
pub mod media;
pub mod string_utils;

pub use config::EditorSettings;
pub use document::{DualViewSynchronizer, ViewMode};
pub use editor::{EditingMode, EditingSurface, PendingModalState};
pub use error::{Error, Result};
pub use formatting::{Alignment, FormatCommand, Selection};
pub use fragments::{StructuredFragment, ValidationError};
pub use media::{LocalFile, MediaAsset, UploadError};
