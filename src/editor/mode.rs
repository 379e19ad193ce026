//! Editing mode: which view is live, and whether the layout is fullscreen.

use crate::document::ViewMode;
use std::fmt;

/// View mode plus the orthogonal fullscreen flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EditingMode {
    pub view: ViewMode,
    /// Layout only; never affects content
    pub fullscreen: bool,
}

impl EditingMode {
    pub fn new(view: ViewMode, fullscreen: bool) -> Self {
        Self { view, fullscreen }
    }

    pub fn is_source(&self) -> bool {
        self.view == ViewMode::Source
    }
}

impl fmt::Display for EditingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fullscreen {
            write!(f, "{} (fullscreen)", self.view.label())
        } else {
            write!(f, "{}", self.view.label())
        }
    }
}
