//! Dual-view synchronization.
//!
//! The synchronizer owns both views of the document and knows which one is
//! live. Exactly one view accepts edits at any moment; the other is a stale
//! mirror that is reconciled when it becomes live.
//!
//! ```text
//!              switch_to_source (copy markup)
//!   VisualLive ───────────────────────────────▶ SourceLive
//!       ▲                                            │
//!       └────────────────────────────────────────────┘
//!              switch_to_visual (install verbatim)
//! ```

use super::view::{SourceView, VisualView};
use crate::formatting::{detect_formatting_state, FormatCommand, FormattingState, Selection};
use crate::string_utils::{safe_slice, strip_tags};
use log::debug;
use serde::{Deserialize, Serialize};

/// Which view currently accepts edits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Structured editing with formatting commands
    #[default]
    Visual,
    /// Raw markup editing
    Source,
}

impl ViewMode {
    /// Toggle between Visual and Source modes.
    pub fn toggle(&self) -> Self {
        match self {
            ViewMode::Visual => ViewMode::Source,
            ViewMode::Source => ViewMode::Visual,
        }
    }

    /// Get a display label for the mode.
    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Visual => "Visual",
            ViewMode::Source => "Source",
        }
    }
}

/// Owns the document and reconciles its visual and source views.
#[derive(Debug, Clone)]
pub struct DualViewSynchronizer {
    mode: ViewMode,
    visual: VisualView,
    source: SourceView,
}

impl DualViewSynchronizer {
    /// Start in visual mode with `initial` as the document value.
    pub fn new(initial: impl Into<String>, history_depth: usize) -> Self {
        Self {
            mode: ViewMode::Visual,
            visual: VisualView::new(initial, history_depth),
            source: SourceView::default(),
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// The document value: the content of whichever view is live.
    pub fn value(&self) -> &str {
        match self.mode {
            ViewMode::Visual => self.visual.html(),
            ViewMode::Source => self.source.text(),
        }
    }

    pub fn visual(&self) -> &VisualView {
        &self.visual
    }

    pub fn source(&self) -> &SourceView {
        &self.source
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Copy the visual markup into the source buffer and make it live.
    ///
    /// Returns false if the source view was already live.
    pub fn switch_to_source(&mut self) -> bool {
        if self.mode == ViewMode::Source {
            return false;
        }
        self.source.load(self.visual.html());
        self.mode = ViewMode::Source;
        debug!("Switched to source view ({} bytes)", self.source.text().len());
        true
    }

    /// Install the source buffer verbatim as the visual markup and make the
    /// visual view live. The markup is not validated or sanitized.
    ///
    /// Returns false if the visual view was already live.
    pub fn switch_to_visual(&mut self) -> bool {
        if self.mode == ViewMode::Visual {
            return false;
        }
        let text = self.source.text().to_string();
        if text != self.visual.html() {
            debug!("Installing edited source markup into visual view");
        }
        self.visual.replace(text, None);
        self.mode = ViewMode::Visual;
        debug!("Switched to visual view");
        true
    }

    pub fn toggle_mode(&mut self) -> ViewMode {
        match self.mode {
            ViewMode::Visual => self.switch_to_source(),
            ViewMode::Source => self.switch_to_visual(),
        };
        self.mode
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Edits
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the source buffer. Ignored unless the source view is live.
    pub fn edit_source(&mut self, text: impl Into<String>) -> bool {
        if self.mode != ViewMode::Source {
            debug!("Ignoring source edit while the visual view is live");
            return false;
        }
        self.source.edit(text.into())
    }

    /// Replace the visual markup, as typing into the visual surface does.
    /// Ignored unless the visual view is live.
    pub fn edit_visual(&mut self, html: impl Into<String>) -> bool {
        if self.mode != ViewMode::Visual {
            debug!("Ignoring visual edit while the source view is live");
            return false;
        }
        let selection = self.visual.selection();
        self.visual.replace(html.into(), selection)
    }

    /// Set the selection of the live view. `None` means no caret, in which
    /// case insertions append.
    pub fn set_selection(&mut self, selection: Option<Selection>) {
        match self.mode {
            ViewMode::Visual => self.visual.set_selection(selection),
            ViewMode::Source => self.source.set_selection(selection),
        }
    }

    pub fn selection(&self) -> Option<Selection> {
        match self.mode {
            ViewMode::Visual => self.visual.selection(),
            ViewMode::Source => self.source.selection(),
        }
    }

    /// Plain text currently selected in the live view, if any.
    pub fn selected_text(&self) -> Option<String> {
        let sel = self.selection()?.clamped_to(self.value());
        let text = strip_tags(safe_slice(self.value(), sel.start, sel.end));
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    /// Apply a formatting command to the visual view.
    ///
    /// Inert while the source view is live. Returns whether the document
    /// changed.
    pub fn dispatch(&mut self, command: &FormatCommand) -> bool {
        if self.mode != ViewMode::Visual {
            debug!("Ignoring {} while the source view is live", command.label());
            return false;
        }
        self.visual.apply(command)
    }

    /// Insert literal HTML into the live view at its caret, or append it.
    pub fn insert_html(&mut self, fragment: &str) -> bool {
        match self.mode {
            ViewMode::Visual => self.visual.insert(fragment),
            ViewMode::Source => self.source.insert(fragment),
        }
    }

    /// Formatting state at the visual caret, or `None` while the source view
    /// is live.
    pub fn formatting_state(&self) -> Option<FormattingState> {
        if self.mode != ViewMode::Visual {
            return None;
        }
        let caret = self
            .visual
            .selection()
            .map_or(self.visual.html().len(), |s| s.start);
        Some(detect_formatting_state(self.visual.html(), caret))
    }

    pub fn can_undo(&self) -> bool {
        self.mode == ViewMode::Visual && self.visual.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.mode == ViewMode::Visual && self.visual.can_redo()
    }
}
