//! Media resolution
//!
//! Turns local files and catalog entries into [`MediaAsset`]s the fragment
//! builders can embed.
//!
//! # Architecture
//!
//! - `asset.rs` - `MediaAsset` and `LocalFile`
//! - `service.rs` - Upload and catalog collaborator traits and wire types
//! - `resolver.rs` - Request bookkeeping and channel-based completion
//! - `picker.rs` - Image picker session and `SelectionSet`
//!
//! # Example
//! ```ignore
//! use crate::media::{LocalFile, MediaEvent, MediaResolver};
//!
//! let mut resolver = MediaResolver::new(uploader, catalog, 100);
//! resolver.upload_local_file(&LocalFile::new("sunset.png", bytes));
//!
//! // Later, from the event loop:
//! for event in resolver.poll() {
//!     if let MediaEvent::Uploaded { result: Ok(asset), .. } = event {
//!         println!("hosted at {}", asset.url);
//!     }
//! }
//! ```

mod asset;
mod picker;
mod resolver;
mod service;

pub use asset::{LocalFile, MediaAsset};
pub use picker::{ImagePicker, SelectionSet};
pub use resolver::{MediaEvent, MediaResolver, RequestId, UploadError};
pub use service::{CatalogResponse, CatalogService, Completion, UploadResponse, UploadService};

#[cfg(test)]
pub(crate) use resolver::fakes;
