//! Structured content fragments
//!
//! Self-contained, insertable units of content (links, tables, images,
//! horizontal rules), built from validated input independently of how
//! they end up in the document.
//!
//! # Architecture
//!
//! - `builders.rs` - One validating constructor per fragment kind
//! - `html.rs` - Serialization of fragments to literal HTML
//!
//! # Example
//! ```ignore
//! use crate::fragments::{build_link, FragmentStyles};
//!
//! let link = build_link("https://example.com", None)?;
//! let html = link.to_html(&FragmentStyles::default());
//! ```

mod builders;
mod html;

pub use builders::{
    build_horizontal_rule, build_image, build_link, build_table, ValidationError,
};
pub use html::FragmentStyles;

use crate::media::MediaAsset;

// ─────────────────────────────────────────────────────────────────────────────
// Fragment Types
// ─────────────────────────────────────────────────────────────────────────────

/// The kinds of fragment the builders produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    Link,
    Table,
    Image,
    HorizontalRule,
}

/// A constructed, well-formed content unit ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuredFragment {
    /// Hyperlink opening in a new browsing context
    Link { href: String, text: String },
    /// Grid whose first row holds header cells
    Table(TableFragment),
    /// Image from a resolved media asset
    Image { src: String, alt: String },
    /// Horizontal rule with fixed styling
    HorizontalRule,
}

impl StructuredFragment {
    pub fn kind(&self) -> FragmentKind {
        match self {
            StructuredFragment::Link { .. } => FragmentKind::Link,
            StructuredFragment::Table(_) => FragmentKind::Table,
            StructuredFragment::Image { .. } => FragmentKind::Image,
            StructuredFragment::HorizontalRule => FragmentKind::HorizontalRule,
        }
    }

    /// Build a fragment from the fields collected for its kind.
    pub fn build(fields: FragmentFields<'_>) -> Result<Self, ValidationError> {
        match fields {
            FragmentFields::Link { url, text } => build_link(url, text),
            FragmentFields::Table { rows, cols } => build_table(rows, cols),
            FragmentFields::Image { asset } => build_image(asset),
            FragmentFields::HorizontalRule => Ok(build_horizontal_rule()),
        }
    }
}

/// Input collected for a fragment, per kind.
#[derive(Debug, Clone, Copy)]
pub enum FragmentFields<'a> {
    Link { url: &'a str, text: Option<&'a str> },
    Table { rows: usize, cols: usize },
    Image { asset: Option<&'a MediaAsset> },
    HorizontalRule,
}

impl FragmentFields<'_> {
    pub fn kind(&self) -> FragmentKind {
        match self {
            FragmentFields::Link { .. } => FragmentKind::Link,
            FragmentFields::Table { .. } => FragmentKind::Table,
            FragmentFields::Image { .. } => FragmentKind::Image,
            FragmentFields::HorizontalRule => FragmentKind::HorizontalRule,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tables
// ─────────────────────────────────────────────────────────────────────────────

/// Whether a table cell belongs to the header row or the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Header,
    Body,
}

/// A single table cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCell {
    pub kind: CellKind,
    pub content: String,
}

impl TableCell {
    pub fn header(content: impl Into<String>) -> Self {
        Self {
            kind: CellKind::Header,
            content: content.into(),
        }
    }

    pub fn body() -> Self {
        Self {
            kind: CellKind::Body,
            content: String::new(),
        }
    }
}

/// A rectangular grid of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFragment {
    rows: Vec<Vec<TableCell>>,
}

impl TableFragment {
    pub(crate) fn from_rows(rows: Vec<Vec<TableCell>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<TableCell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&TableCell> {
        self.rows.get(row)?.get(col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_dispatches_by_kind() {
        let link = StructuredFragment::build(FragmentFields::Link {
            url: "https://x.com",
            text: None,
        })
        .unwrap();
        assert_eq!(link.kind(), FragmentKind::Link);

        let table = StructuredFragment::build(FragmentFields::Table { rows: 2, cols: 4 }).unwrap();
        assert_eq!(table.kind(), FragmentKind::Table);

        let rule = StructuredFragment::build(FragmentFields::HorizontalRule).unwrap();
        assert_eq!(rule.kind(), FragmentKind::HorizontalRule);
    }

    #[test]
    fn test_build_reports_validation_failure() {
        let err = StructuredFragment::build(FragmentFields::Link { url: "", text: None });
        assert_eq!(err, Err(ValidationError::EmptyUrl));

        let err = StructuredFragment::build(FragmentFields::Image { asset: None });
        assert_eq!(err, Err(ValidationError::MissingAsset));
    }

    #[test]
    fn test_fields_kind() {
        assert_eq!(
            FragmentFields::Table { rows: 1, cols: 1 }.kind(),
            FragmentKind::Table
        );
        assert_eq!(FragmentFields::Image { asset: None }.kind(), FragmentKind::Image);
    }

    #[test]
    fn test_table_cell_lookup() {
        let StructuredFragment::Table(table) = build_table(2, 2).unwrap() else {
            panic!("expected a table");
        };
        assert_eq!(table.cell(0, 1).map(|c| c.content.as_str()), Some("Header 2"));
        assert_eq!(table.cell(1, 0).map(|c| c.kind), Some(CellKind::Body));
        assert!(table.cell(2, 0).is_none());
    }
}
