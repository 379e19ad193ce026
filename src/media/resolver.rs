//! Bridges the editor to the upload and catalog collaborators.
//!
//! Requests are started with [`MediaResolver::upload_local_file`] and
//! [`MediaResolver::list_catalog_assets`]. Collaborators complete them on
//! whatever thread they like; completions travel over a channel and are
//! turned into [`MediaEvent`]s by [`MediaResolver::poll`], which the host
//! calls from its event loop.

use super::asset::{LocalFile, MediaAsset};
use super::service::{CatalogResponse, CatalogService, UploadResponse, UploadService};
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt;
use std::sync::mpsc::{channel, Receiver, Sender};

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Failure of an upload or catalog request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// The service answered but refused the request
    Rejected(String),
    /// The request never got a usable answer
    Transport(String),
    /// The upload reported success without a URL
    MissingUrl,
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::Rejected(msg) | UploadError::Transport(msg) => write!(f, "{}", msg),
            UploadError::MissingUrl => write!(f, "upload succeeded but returned no URL"),
        }
    }
}

impl std::error::Error for UploadError {}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// Identifies one started request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub(crate) u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A finished media request.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    Uploaded {
        request: RequestId,
        result: Result<MediaAsset, UploadError>,
    },
    CatalogLoaded {
        request: RequestId,
        result: Result<Vec<MediaAsset>, UploadError>,
    },
}

impl MediaEvent {
    pub fn request(&self) -> RequestId {
        match self {
            MediaEvent::Uploaded { request, .. } | MediaEvent::CatalogLoaded { request, .. } => {
                *request
            }
        }
    }
}

/// Raw completion as sent by a collaborator.
enum Completed {
    Upload(RequestId, Result<UploadResponse, UploadError>),
    Catalog(RequestId, Result<CatalogResponse, UploadError>),
}

/// What the resolver remembers about a request until it completes.
enum Pending {
    Upload { alt: String },
    Catalog { query: Option<String> },
}

// ─────────────────────────────────────────────────────────────────────────────
// Resolver
// ─────────────────────────────────────────────────────────────────────────────

/// Starts media requests and collects their results.
pub struct MediaResolver {
    uploader: Box<dyn UploadService>,
    catalog: Box<dyn CatalogService>,
    page_size: usize,
    sender: Sender<Completed>,
    receiver: Receiver<Completed>,
    pending: HashMap<RequestId, Pending>,
    next_id: u64,
}

impl MediaResolver {
    pub fn new(
        uploader: Box<dyn UploadService>,
        catalog: Box<dyn CatalogService>,
        page_size: usize,
    ) -> Self {
        let (sender, receiver) = channel();
        Self {
            uploader,
            catalog,
            page_size: page_size.max(1),
            sender,
            receiver,
            pending: HashMap::new(),
            next_id: 0,
        }
    }

    fn next_request(&mut self) -> RequestId {
        self.next_id += 1;
        RequestId(self.next_id)
    }

    /// Upload a local file. The resulting asset's alt text is the file's
    /// base name.
    pub fn upload_local_file(&mut self, file: &LocalFile) -> RequestId {
        let request = self.next_request();
        debug!(
            "Uploading '{}' ({} bytes) as request {}",
            file.name,
            file.len(),
            request
        );
        self.pending.insert(
            request,
            Pending::Upload {
                alt: file.base_name(),
            },
        );

        let tx = self.sender.clone();
        self.uploader.upload(
            file,
            Box::new(move |result| {
                let _ = tx.send(Completed::Upload(request, result));
            }),
        );
        request
    }

    /// Fetch one page of catalog images, optionally filtered by alt text.
    pub fn list_catalog_assets(&mut self, query: Option<&str>) -> RequestId {
        let request = self.next_request();
        debug!(
            "Listing up to {} catalog images as request {}",
            self.page_size, request
        );
        let query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);
        self.pending.insert(request, Pending::Catalog { query });

        let tx = self.sender.clone();
        self.catalog.list_images(
            self.page_size,
            Box::new(move |result| {
                let _ = tx.send(Completed::Catalog(request, result));
            }),
        );
        request
    }

    /// Number of requests started but not yet drained by [`poll`](Self::poll).
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    /// Drain finished requests. Non-blocking.
    pub fn poll(&mut self) -> Vec<MediaEvent> {
        let mut events = Vec::new();
        while let Ok(completed) = self.receiver.try_recv() {
            if let Some(event) = self.resolve(completed) {
                events.push(event);
            }
        }
        events
    }

    fn resolve(&mut self, completed: Completed) -> Option<MediaEvent> {
        match completed {
            Completed::Upload(request, response) => {
                let Some(Pending::Upload { alt }) = self.pending.remove(&request) else {
                    warn!("Dropping upload result for unknown request {}", request);
                    return None;
                };
                let result = response.and_then(|response| upload_asset(response, alt));
                if let Err(e) = &result {
                    warn!("Upload {} failed: {}", request, e);
                }
                Some(MediaEvent::Uploaded { request, result })
            }
            Completed::Catalog(request, response) => {
                let Some(Pending::Catalog { query }) = self.pending.remove(&request) else {
                    warn!("Dropping catalog result for unknown request {}", request);
                    return None;
                };
                let result = response
                    .and_then(catalog_assets)
                    .map(|assets| self.page(assets, query.as_deref()));
                if let Err(e) = &result {
                    warn!("Catalog request {} failed: {}", request, e);
                }
                Some(MediaEvent::CatalogLoaded { request, result })
            }
        }
    }

    fn page(&self, assets: Vec<MediaAsset>, query: Option<&str>) -> Vec<MediaAsset> {
        assets
            .into_iter()
            .filter(|asset| query.map_or(true, |q| asset.matches(q)))
            .take(self.page_size)
            .collect()
    }
}

impl fmt::Debug for MediaResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaResolver")
            .field("page_size", &self.page_size)
            .field("in_flight", &self.pending.len())
            .finish_non_exhaustive()
    }
}

fn upload_asset(response: UploadResponse, alt: String) -> Result<MediaAsset, UploadError> {
    if !response.success {
        return Err(UploadError::Rejected(
            response.error.unwrap_or_else(|| "upload rejected".to_string()),
        ));
    }
    match response.url {
        Some(url) if !url.trim().is_empty() => Ok(MediaAsset::from_upload(url, alt)),
        _ => Err(UploadError::MissingUrl),
    }
}

fn catalog_assets(response: CatalogResponse) -> Result<Vec<MediaAsset>, UploadError> {
    if !response.success {
        return Err(UploadError::Rejected(
            response
                .error
                .unwrap_or_else(|| "catalog request failed".to_string()),
        ));
    }
    Ok(response.images.unwrap_or_default())
}
