//! Bounded in-memory undo/redo history for the visual view.

use crate::formatting::Selection;

/// Markup plus the selection it was edited with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub html: String,
    pub selection: Option<Selection>,
}

/// Undo and redo stacks with a maximum depth.
#[derive(Debug, Clone)]
pub struct History {
    /// Undo history stack
    undo_stack: Vec<Snapshot>,
    /// Redo history stack
    redo_stack: Vec<Snapshot>,
    /// Maximum undo history size
    max_depth: usize,
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth,
        }
    }

    /// Record the state before an edit. New edits invalidate the redo stack.
    pub fn record(&mut self, before: Snapshot) {
        if self.max_depth == 0 {
            return;
        }
        self.undo_stack.push(before);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    /// Step back. `current` is moved onto the redo stack.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Step forward. `current` is moved onto the undo stack.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}
