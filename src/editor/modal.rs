//! Pending modal state for link and table insertion.
//!
//! A modal only collects fields. Nothing touches the document until the
//! modal is confirmed, and the state is dropped on close either way.

use crate::fragments::{FragmentFields, FragmentKind, StructuredFragment, ValidationError};

/// The modal currently open, with the fields entered so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PendingModalState {
    #[default]
    None,
    LinkInsert {
        url: String,
        text: String,
    },
    TableInsert {
        rows: usize,
        cols: usize,
    },
}

impl PendingModalState {
    pub fn link(text: Option<String>) -> Self {
        PendingModalState::LinkInsert {
            url: String::new(),
            text: text.unwrap_or_default(),
        }
    }

    pub fn table(rows: usize, cols: usize) -> Self {
        PendingModalState::TableInsert { rows, cols }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, PendingModalState::None)
    }

    /// Fragment kind the modal produces, if one is open.
    pub fn kind(&self) -> Option<FragmentKind> {
        match self {
            PendingModalState::None => None,
            PendingModalState::LinkInsert { .. } => Some(FragmentKind::Link),
            PendingModalState::TableInsert { .. } => Some(FragmentKind::Table),
        }
    }

    fn fields(&self) -> Option<FragmentFields<'_>> {
        match self {
            PendingModalState::None => None,
            PendingModalState::LinkInsert { url, text } => Some(FragmentFields::Link {
                url: url.as_str(),
                text: Some(text.as_str()),
            }),
            PendingModalState::TableInsert { rows, cols } => Some(FragmentFields::Table {
                rows: *rows,
                cols: *cols,
            }),
        }
    }

    /// Build the fragment from the entered fields. `None` if no modal is open.
    pub fn build(&self) -> Option<Result<StructuredFragment, ValidationError>> {
        self.fields().map(StructuredFragment::build)
    }

    /// Whether the confirm action should be enabled.
    pub fn is_valid(&self) -> bool {
        matches!(self.build(), Some(Ok(_)))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Field setters. Each returns false when the open modal has no such field.
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_link_url(&mut self, value: impl Into<String>) -> bool {
        match self {
            PendingModalState::LinkInsert { url, .. } => {
                *url = value.into();
                true
            }
            _ => false,
        }
    }

    pub fn set_link_text(&mut self, value: impl Into<String>) -> bool {
        match self {
            PendingModalState::LinkInsert { text, .. } => {
                *text = value.into();
                true
            }
            _ => false,
        }
    }

    pub fn set_table_rows(&mut self, value: usize) -> bool {
        match self {
            PendingModalState::TableInsert { rows, .. } => {
                *rows = value;
                true
            }
            _ => false,
        }
    }

    pub fn set_table_cols(&mut self, value: usize) -> bool {
        match self {
            PendingModalState::TableInsert { cols, .. } => {
                *cols = value;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_modal_gates_on_url() {
        let mut modal = PendingModalState::link(Some("Example".to_string()));
        assert!(modal.is_open());
        assert!(!modal.is_valid());
        assert_eq!(modal.build(), Some(Err(ValidationError::EmptyUrl)));

        assert!(modal.set_link_url("https://x.com"));
        assert!(modal.is_valid());
        assert_eq!(
            modal.build(),
            Some(Ok(StructuredFragment::Link {
                href: "https://x.com".to_string(),
                text: "Example".to_string(),
            }))
        );
    }

    #[test]
    fn test_table_modal_gates_on_shape() {
        let mut modal = PendingModalState::table(3, 3);
        assert!(modal.is_valid());
        modal.set_table_rows(0);
        assert!(!modal.is_valid());
        modal.set_table_rows(2);
        modal.set_table_cols(4);
        assert_eq!(modal.kind(), Some(FragmentKind::Table));
        assert!(modal.is_valid());
    }

    #[test]
    fn test_setters_reject_wrong_modal() {
        let mut modal = PendingModalState::table(3, 3);
        assert!(!modal.set_link_url("https://x.com"));
        let mut none = PendingModalState::None;
        assert!(!none.set_table_cols(2));
        assert_eq!(none.build(), None);
        assert!(!none.is_valid());
    }
}
