//! Collaborator interfaces for the upload and catalog services.
//!
//! The engine never performs network I/O itself. A host supplies
//! implementations of these traits and calls the completion when the
//! request finishes, from any thread.

use super::asset::{LocalFile, MediaAsset};
use super::resolver::UploadError;
use serde::{Deserialize, Serialize};

/// Callback handed to a collaborator, invoked exactly once with the outcome.
///
/// `Err` is reserved for transport failures. A service that answered but
/// refused the request reports that inside the response.
pub type Completion<T> = Box<dyn FnOnce(Result<T, UploadError>) + Send + 'static>;

/// Response of the upload service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub url: Option<String>,
    pub error: Option<String>,
}

impl UploadResponse {
    pub fn ok(url: impl Into<String>) -> Self {
        Self {
            success: true,
            url: Some(url.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            url: None,
            error: Some(error.into()),
        }
    }
}

/// Response of the image catalog service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub success: bool,
    pub images: Option<Vec<MediaAsset>>,
    pub error: Option<String>,
}

impl CatalogResponse {
    pub fn ok(images: Vec<MediaAsset>) -> Self {
        Self {
            success: true,
            images: Some(images),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            images: None,
            error: Some(error.into()),
        }
    }
}

/// Uploads one local file and reports the hosted URL.
pub trait UploadService {
    fn upload(&self, file: &LocalFile, done: Completion<UploadResponse>);
}

/// Lists up to `limit` previously uploaded images.
pub trait CatalogService {
    fn list_images(&self, limit: usize, done: Completion<CatalogResponse>);
}
