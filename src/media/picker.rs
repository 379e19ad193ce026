//! Image picker session state.
//!
//! The picker is a modal grid of catalog images. While it is open the
//! operator marks images for batch insertion; the marks live in a
//! [`SelectionSet`] that is emptied whenever the picker opens or closes.

use super::asset::MediaAsset;
use super::resolver::{RequestId, UploadError};
use log::{debug, warn};
use std::collections::HashSet;

// ─────────────────────────────────────────────────────────────────────────────
// Selection Set
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered set of asset ids, in the order they were marked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: Vec<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id` if absent, remove it if present. Returns whether it is now
    /// selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        if let Some(pos) = self.ids.iter().position(|existing| existing == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id.to_string());
            true
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Keep only ids for which `keep` returns true, preserving order.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.ids.retain(|id| keep(id.as_str()));
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Picker
// ─────────────────────────────────────────────────────────────────────────────

/// State of the image picker modal and of in-flight uploads.
#[derive(Debug, Default)]
pub struct ImagePicker {
    open: bool,
    /// Catalog request whose result the open session is waiting for
    catalog_request: Option<RequestId>,
    assets: Vec<MediaAsset>,
    selection: SelectionSet,
    filter: String,
    uploads: HashSet<RequestId>,
    last_error: Option<UploadError>,
}

impl ImagePicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new session waiting on `request`. Any previous session state
    /// is dropped.
    pub fn open(&mut self, request: RequestId) {
        debug!("Image picker opened, waiting on catalog {}", request);
        self.open = true;
        self.catalog_request = Some(request);
        self.assets.clear();
        self.selection.clear();
        self.filter.clear();
        self.last_error = None;
    }

    /// Re-request the catalog for the open session, e.g. after an upload.
    ///
    /// The current grid and selection stay visible until the new page
    /// arrives. Ignored when the picker is closed.
    pub fn reload(&mut self, request: RequestId) -> bool {
        if !self.open {
            return false;
        }
        debug!("Image picker reloading from catalog {}", request);
        self.catalog_request = Some(request);
        true
    }

    /// Close the session, discarding the selection.
    pub fn close(&mut self) {
        if self.open {
            debug!("Image picker closed");
        }
        self.open = false;
        self.catalog_request = None;
        self.assets.clear();
        self.selection.clear();
        self.filter.clear();
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// True while the open session has not received its catalog page.
    pub fn is_loading(&self) -> bool {
        self.open && self.catalog_request.is_some()
    }

    pub fn is_uploading(&self) -> bool {
        !self.uploads.is_empty()
    }

    pub fn assets(&self) -> &[MediaAsset] {
        &self.assets
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Error of the most recent failed catalog request, if any.
    pub fn last_error(&self) -> Option<&UploadError> {
        self.last_error.as_ref()
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    /// Assets whose alt text matches the current filter.
    pub fn filtered_assets(&self) -> impl Iterator<Item = &MediaAsset> {
        self.assets.iter().filter(|asset| asset.matches(&self.filter))
    }

    /// Accept a catalog result. Results for a closed session, or for a
    /// superseded request, are discarded. Returns whether it was accepted.
    pub fn receive_catalog(
        &mut self,
        request: RequestId,
        result: Result<Vec<MediaAsset>, UploadError>,
    ) -> bool {
        if !self.open || self.catalog_request != Some(request) {
            debug!("Discarding stale catalog result {}", request);
            return false;
        }

        self.catalog_request = None;
        match result {
            Ok(assets) => {
                debug!("Image picker loaded {} assets", assets.len());
                self.assets = assets;
                let assets = &self.assets;
                self.selection
                    .retain(|id| assets.iter().any(|asset| asset.id == id));
            }
            Err(e) => {
                warn!("Image catalog unavailable: {}", e);
                self.last_error = Some(e);
            }
        }
        true
    }

    /// Toggle an asset's selection. Ignored while a catalog fetch or an
    /// upload is pending, and for ids not in the loaded catalog.
    pub fn toggle(&mut self, id: &str) -> bool {
        if !self.open || self.is_loading() || self.is_uploading() {
            return false;
        }
        if !self.assets.iter().any(|asset| asset.id == id) {
            return false;
        }
        self.selection.toggle(id);
        true
    }

    /// Selected assets in catalog order.
    pub fn selected_assets(&self) -> Vec<&MediaAsset> {
        self.assets
            .iter()
            .filter(|asset| self.selection.contains(&asset.id))
            .collect()
    }

    /// Take the selected assets (in catalog order) and close the session.
    pub fn take_selection(&mut self) -> Vec<MediaAsset> {
        let taken = self
            .assets
            .iter()
            .filter(|asset| self.selection.contains(&asset.id))
            .cloned()
            .collect();
        self.close();
        taken
    }

    pub fn track_upload(&mut self, request: RequestId) {
        self.uploads.insert(request);
    }

    /// Forget an upload. Returns false if it was never tracked.
    pub fn finish_upload(&mut self, request: RequestId) -> bool {
        self.uploads.remove(&request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::resolver::fakes::{asset, FakeCatalog, FakeUploader};
    use crate::media::{MediaEvent, MediaResolver};

    /// An open picker with its catalog already delivered.
    fn loaded_picker(assets: Vec<MediaAsset>) -> ImagePicker {
        let mut resolver = MediaResolver::new(
            Box::new(FakeUploader { max_bytes: 0 }),
            Box::new(FakeCatalog { images: assets }),
            100,
        );
        let mut picker = ImagePicker::new();
        picker.open(resolver.list_catalog_assets(None));
        for event in resolver.poll() {
            if let MediaEvent::CatalogLoaded { request, result } = event {
                assert!(picker.receive_catalog(request, result));
            }
        }
        picker
    }

    #[test]
    fn test_selection_set_toggle_twice_restores() {
        let mut set = SelectionSet::new();
        assert!(set.toggle("a"));
        assert!(set.toggle("b"));
        assert!(!set.toggle("a"));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["b"]);
        set.toggle("a");
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn test_toggle_ignored_while_loading() {
        let mut picker = ImagePicker::new();
        picker.open(RequestId(1));
        assert!(picker.is_loading());
        assert!(!picker.toggle("1"));
        assert!(picker.selection().is_empty());
    }

    #[test]
    fn test_selected_assets_in_catalog_order() {
        let mut picker = loaded_picker(vec![asset("a", "A"), asset("b", "B"), asset("c", "C")]);
        assert!(!picker.is_loading());
        picker.toggle("c");
        picker.toggle("a");
        let ids: Vec<_> = picker.selected_assets().iter().map(|a| a.id.clone()).collect();
        assert_eq!(ids, vec!["a", "c"]);

        let taken = picker.take_selection();
        assert_eq!(taken.len(), 2);
        assert!(!picker.is_open());
        assert!(picker.selection().is_empty());
    }

    #[test]
    fn test_toggle_unknown_id_is_ignored() {
        let mut picker = loaded_picker(vec![asset("a", "A")]);
        assert!(!picker.toggle("zzz"));
        assert!(picker.toggle("a"));
        assert_eq!(picker.selection().len(), 1);
    }

    #[test]
    fn test_late_result_after_close_is_discarded() {
        let mut picker = ImagePicker::new();
        picker.open(RequestId(1));
        picker.close();
        assert!(!picker.receive_catalog(RequestId(1), Ok(vec![asset("a", "A")])));
        assert!(picker.assets().is_empty());
    }

    #[test]
    fn test_superseded_request_is_discarded() {
        let mut picker = ImagePicker::new();
        picker.open(RequestId(1));
        picker.open(RequestId(2));
        assert!(!picker.receive_catalog(RequestId(1), Ok(vec![asset("a", "A")])));
        assert!(picker.receive_catalog(RequestId(2), Ok(vec![asset("b", "B")])));
        assert_eq!(picker.assets()[0].id, "b");
    }

    #[test]
    fn test_catalog_failure_leaves_grid_empty() {
        let mut picker = ImagePicker::new();
        picker.open(RequestId(1));
        assert!(picker.receive_catalog(
            RequestId(1),
            Err(UploadError::Transport("offline".to_string()))
        ));
        assert!(!picker.is_loading());
        assert!(picker.assets().is_empty());
        assert!(picker.last_error().is_some());
    }

    #[test]
    fn test_reload_keeps_surviving_selection() {
        let mut picker = loaded_picker(vec![asset("a", "A"), asset("b", "B")]);
        picker.toggle("a");
        picker.toggle("b");

        assert!(picker.reload(RequestId(99)));
        assert!(picker.is_loading());
        assert!(!picker.toggle("a"));

        picker.receive_catalog(RequestId(99), Ok(vec![asset("new", "N"), asset("b", "B")]));
        assert_eq!(picker.selection().iter().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(picker.assets().len(), 2);
    }

    #[test]
    fn test_reload_ignored_when_closed() {
        let mut picker = ImagePicker::new();
        assert!(!picker.reload(RequestId(1)));
        assert!(!picker.is_loading());
    }

    #[test]
    fn test_filter() {
        let mut picker = loaded_picker(vec![asset("a", "Red barn"), asset("b", "Blue sky")]);
        picker.set_filter("sky");
        let ids: Vec<_> = picker.filtered_assets().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn test_upload_tracking() {
        let mut picker = ImagePicker::new();
        picker.track_upload(RequestId(3));
        assert!(picker.is_uploading());
        assert!(picker.finish_upload(RequestId(3)));
        assert!(!picker.is_uploading());
        assert!(!picker.finish_upload(RequestId(3)));
    }

    #[test]
    fn test_toggle_ignored_while_uploading() {
        let mut picker = loaded_picker(vec![asset("a", "A")]);
        picker.track_upload(RequestId(9));
        assert!(!picker.toggle("a"));
        assert!(picker.selection().is_empty());

        picker.finish_upload(RequestId(9));
        assert!(picker.toggle("a"));
    }
}
