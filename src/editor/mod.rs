//! Editing surface controller
//!
//! The top-level state machine of an editor instance: editing mode, the
//! pending link/table modal, image insertion entry points, and the single
//! change-notification path to the host.
//!
//! # Architecture
//!
//! - `mode.rs` - `EditingMode` (view mode plus fullscreen)
//! - `modal.rs` - `PendingModalState` and its field validation
//! - `controller.rs` - `EditingSurface`, composing document, fragments and media
//!
//! # Example
//! ```ignore
//! use crate::editor::EditingSurface;
//!
//! let mut editor = EditingSurface::new(
//!     "<p>Hello</p>",
//!     EditorSettings::default(),
//!     uploader,
//!     catalog,
//!     |value: &str| save_draft(value),
//! );
//! editor.open_table_modal();
//! editor.confirm_modal()?;
//! ```

mod controller;
mod modal;
mod mode;

pub use controller::{ChangeCallback, EditingSurface};
pub use modal::PendingModalState;
pub use mode::EditingMode;
