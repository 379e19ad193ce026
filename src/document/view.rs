//! The two views of a document: structured (visual) and raw markup (source).

use super::history::{History, Snapshot};
use crate::formatting::{apply_format, FormatCommand, Selection};
use log::debug;

// ─────────────────────────────────────────────────────────────────────────────
// Visual View
// ─────────────────────────────────────────────────────────────────────────────

/// Structured view. Formatting commands only ever apply here.
#[derive(Debug, Clone)]
pub struct VisualView {
    html: String,
    selection: Option<Selection>,
    history: History,
}

impl VisualView {
    pub fn new(html: impl Into<String>, history_depth: usize) -> Self {
        Self {
            html: html.into(),
            selection: None,
            history: History::new(history_depth),
        }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Set the selection, clamped onto the markup.
    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection.map(|s| s.clamped_to(&self.html));
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            html: self.html.clone(),
            selection: self.selection,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.html = snapshot.html;
        self.selection = snapshot.selection;
    }

    /// Replace the markup, recording the previous state in the history.
    /// Returns false if nothing changed.
    pub fn replace(&mut self, html: String, selection: Option<Selection>) -> bool {
        if html == self.html {
            self.set_selection(selection);
            return false;
        }
        self.history.record(self.snapshot());
        self.html = html;
        self.set_selection(selection);
        true
    }

    /// Apply a formatting command at the current selection.
    ///
    /// Without a selection the caret is taken to be at the end of the markup.
    pub fn apply(&mut self, command: &FormatCommand) -> bool {
        match command {
            FormatCommand::Undo => return self.undo(),
            FormatCommand::Redo => return self.redo(),
            _ => {}
        }

        let selection = self
            .selection
            .unwrap_or_else(|| Selection::caret(self.html.len()));
        let result = apply_format(&self.html, selection, command);
        debug!(
            "{} {} at {}..{}",
            if result.applied { "Applied" } else { "Removed" },
            command.label(),
            selection.start,
            selection.end
        );
        self.replace(result.html, Some(result.selection))
    }

    pub fn undo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.undo(current) {
            Some(previous) => {
                self.restore(previous);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.redo(current) {
            Some(next) => {
                self.restore(next);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Insert literal HTML at the selection, or append it.
    pub fn insert(&mut self, fragment: &str) -> bool {
        let (html, caret) = splice(&self.html, self.selection, fragment);
        self.replace(html, Some(caret))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Source View
// ─────────────────────────────────────────────────────────────────────────────

/// Raw markup view. Its buffer is trusted verbatim.
#[derive(Debug, Clone, Default)]
pub struct SourceView {
    text: String,
    selection: Option<Selection>,
}

impl SourceView {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection.map(Selection::normalized);
    }

    /// Load a snapshot of the visual markup into the buffer.
    pub fn load(&mut self, text: &str) {
        self.text = text.to_string();
        self.selection = None;
    }

    /// Replace the buffer. Returns false if nothing changed.
    pub fn edit(&mut self, text: String) -> bool {
        if text == self.text {
            return false;
        }
        self.text = text;
        self.selection = self.selection.map(|s| s.clamped_to(&self.text));
        true
    }

    pub fn insert(&mut self, fragment: &str) -> bool {
        let (text, caret) = splice(&self.text, self.selection, fragment);
        self.selection = Some(caret);
        self.edit(text)
    }
}

/// Insert `fragment` into `markup` at `selection`.
///
/// A selection over plain text is replaced; one spanning markup collapses to
/// its end so no tag is cut in half. Without a selection the fragment is
/// appended. Returns the new markup and the caret just after the fragment.
fn splice(markup: &str, selection: Option<Selection>, fragment: &str) -> (String, Selection) {
    let (start, end) = match selection.map(|s| s.clamped_to(markup)) {
        Some(sel) if markup[sel.start..sel.end].contains(['<', '>']) => (sel.end, sel.end),
        Some(sel) => (sel.start, sel.end),
        None => (markup.len(), markup.len()),
    };

    let mut out = String::with_capacity(markup.len() + fragment.len());
    out.push_str(&markup[..start]);
    out.push_str(fragment);
    out.push_str(&markup[end..]);
    (out, Selection::caret(start + fragment.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splice_appends_without_selection() {
        let (out, caret) = splice("<p>a</p>", None, "<hr />");
        assert_eq!(out, "<p>a</p><hr />");
        assert_eq!(caret, Selection::caret(out.len()));
    }

    #[test]
    fn test_splice_snaps_caret_out_of_tag() {
        // Caret at 1 is inside "<p>"
        let (out, _) = splice("<p>a</p>", Some(Selection::caret(1)), "X");
        assert_eq!(out, "<p>Xa</p>");
    }

    #[test]
    fn test_splice_replaces_plain_text_selection() {
        let html = "<p>go here</p>";
        let (out, caret) = splice(html, Some(Selection::new(6, 10)), "<a>x</a>");
        assert_eq!(out, "<p>go <a>x</a></p>");
        assert_eq!(caret, Selection::caret(6 + "<a>x</a>".len()));
    }

    #[test]
    fn test_splice_never_cuts_tags() {
        let html = "<p>a</p><p>b</p>";
        let (out, _) = splice(html, Some(Selection::new(3, 12)), "X");
        assert_eq!(out, "<p>a</p><p>bX</p>");
    }

    #[test]
    fn test_visual_apply_and_undo() {
        let mut view = VisualView::new("<p>Hello</p>", 100);
        view.set_selection(Some(Selection::new(3, 8)));
        assert!(view.apply(&FormatCommand::Bold));
        assert_eq!(view.html(), "<p><strong>Hello</strong></p>");

        assert!(view.apply(&FormatCommand::Undo));
        assert_eq!(view.html(), "<p>Hello</p>");
        assert_eq!(view.selection(), Some(Selection::new(3, 8)));

        assert!(view.apply(&FormatCommand::Redo));
        assert_eq!(view.html(), "<p><strong>Hello</strong></p>");
        assert!(!view.apply(&FormatCommand::Redo));
    }

    #[test]
    fn test_visual_replace_same_markup_is_noop() {
        let mut view = VisualView::new("<p>x</p>", 100);
        assert!(!view.replace("<p>x</p>".to_string(), None));
        assert!(!view.can_undo());
    }

    #[test]
    fn test_source_edit_and_insert() {
        let mut view = SourceView::default();
        view.load("<p>a</p>");
        assert!(!view.edit("<p>a</p>".to_string()));
        assert!(view.edit("<p>a</p><div".to_string()));
        assert!(view.insert("<hr />"));
        assert_eq!(view.text(), "<p>a</p><div<hr />");
    }
}
