//! Document ownership and view synchronization
//!
//! The document is a single HTML string owned by the editor. It is shown
//! through two views, a structured visual view and a raw source view, of
//! which exactly one is live.
//!
//! # Architecture
//!
//! - `history.rs` - Bounded undo/redo stacks for the visual view
//! - `view.rs` - `VisualView` and `SourceView` buffers with caret insertion
//! - `sync.rs` - `DualViewSynchronizer` state machine and `ViewMode`

mod history;
mod sync;
mod view;

pub use history::{History, Snapshot};
pub use sync::{DualViewSynchronizer, ViewMode};
pub use view::{SourceView, VisualView};
