//! Fragment builders.
//!
//! One pure constructor per fragment kind. Each validates its input and
//! returns either a well-formed [`StructuredFragment`] or a
//! [`ValidationError`] describing what is missing. Invalid input is an
//! expected state while a modal is being filled in, so nothing here panics
//! or logs.

use super::{StructuredFragment, TableCell, TableFragment};
use crate::media::MediaAsset;
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Reasons a fragment cannot be built yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Link URL is empty or whitespace
    EmptyUrl,
    /// Table needs at least one row and one column
    InvalidTableShape { rows: usize, cols: usize },
    /// No resolved media asset was supplied
    MissingAsset,
    /// The media asset has no usable URL
    EmptyImageUrl,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyUrl => write!(f, "a link needs a URL"),
            ValidationError::InvalidTableShape { rows, cols } => write!(
                f,
                "a table needs at least 1 row and 1 column (got {}x{})",
                rows, cols
            ),
            ValidationError::MissingAsset => write!(f, "no image selected"),
            ValidationError::EmptyImageUrl => write!(f, "the image has no URL"),
        }
    }
}

impl std::error::Error for ValidationError {}

// ─────────────────────────────────────────────────────────────────────────────
// Builders
// ─────────────────────────────────────────────────────────────────────────────

/// Build a link. The URL is required; without display text the URL is shown.
pub fn build_link(url: &str, text: Option<&str>) -> Result<StructuredFragment, ValidationError> {
    let href = url.trim();
    if href.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }

    let text = text
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(href);

    Ok(StructuredFragment::Link {
        href: href.to_string(),
        text: text.to_string(),
    })
}

/// Build a `rows` x `cols` table whose first row is header cells.
pub fn build_table(rows: usize, cols: usize) -> Result<StructuredFragment, ValidationError> {
    if rows == 0 || cols == 0 {
        return Err(ValidationError::InvalidTableShape { rows, cols });
    }

    let grid = (0..rows)
        .map(|row| {
            (0..cols)
                .map(|col| {
                    if row == 0 {
                        TableCell::header(format!("Header {}", col + 1))
                    } else {
                        TableCell::body()
                    }
                })
                .collect()
        })
        .collect();

    Ok(StructuredFragment::Table(TableFragment::from_rows(grid)))
}

/// Build an image from a resolved media asset.
pub fn build_image(asset: Option<&MediaAsset>) -> Result<StructuredFragment, ValidationError> {
    let asset = asset.ok_or(ValidationError::MissingAsset)?;
    if asset.url.trim().is_empty() {
        return Err(ValidationError::EmptyImageUrl);
    }

    Ok(StructuredFragment::Image {
        src: asset.url.clone(),
        alt: asset.alt.clone(),
    })
}

/// Build a horizontal rule. Always succeeds.
pub fn build_horizontal_rule() -> StructuredFragment {
    StructuredFragment::HorizontalRule
}
