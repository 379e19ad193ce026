//! Formatting commands for the visual view
//!
//! This module turns discrete formatting intents (emphasis toggles, block
//! transforms, lists, alignment, colors, clear-formatting) into rewrites of
//! the visual view's markup.
//!
//! # Architecture
//!
//! - `command.rs` - The closed `FormatCommand` vocabulary and toolbar metadata
//! - `elements.rs` - Tag scanner that locates elements by byte range
//! - `apply.rs` - Pure `apply_format(html, selection, command)` rewrites
//! - `state.rs` - Formatting state at the caret for toolbar reflection

mod apply;
mod command;
mod elements;
mod state;

pub use apply::{apply_format, FormatResult, Selection};
pub use command::{Alignment, FormatCommand};
pub use elements::{scan_elements, Element};
pub use state::{detect_formatting_state, FormattingState};
