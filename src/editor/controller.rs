//! The editing surface: top-level state machine of the editor.
//!
//! `EditingSurface` owns the document, the editing mode, the pending modal
//! and the media session. Every path that can change the document ends in
//! a single private `notify_change`, which forwards the new value to the
//! host only when it actually differs from the last value the host saw.

use super::modal::PendingModalState;
use super::mode::EditingMode;
use crate::config::EditorSettings;
use crate::document::{DualViewSynchronizer, ViewMode};
use crate::error::{Error, Result};
use crate::formatting::{FormatCommand, FormattingState, Selection};
use crate::fragments::{build_horizontal_rule, build_image, StructuredFragment};
use crate::media::{
    CatalogService, ImagePicker, LocalFile, MediaAsset, MediaEvent, MediaResolver, RequestId,
    UploadService,
};
use log::{debug, info, warn};
use std::fmt;

/// Host callback receiving every new document value.
pub type ChangeCallback = Box<dyn FnMut(&str)>;

/// A single editor instance.
pub struct EditingSurface {
    document: DualViewSynchronizer,
    fullscreen: bool,
    modal: PendingModalState,
    media: MediaResolver,
    picker: ImagePicker,
    settings: EditorSettings,
    on_change: ChangeCallback,
    /// Last value handed to `on_change`
    last_notified: String,
}

impl EditingSurface {
    /// Create an editor over `initial`.
    ///
    /// The host is not notified of the initial value; it already has it.
    pub fn new(
        initial: impl Into<String>,
        settings: EditorSettings,
        uploader: Box<dyn UploadService>,
        catalog: Box<dyn CatalogService>,
        on_change: impl FnMut(&str) + 'static,
    ) -> Self {
        let initial = initial.into();
        let mut document = DualViewSynchronizer::new(initial.clone(), settings.history_depth);
        if settings.start_view_mode == ViewMode::Source {
            document.switch_to_source();
        }

        info!(
            "Editor created ({} bytes, {} mode)",
            initial.len(),
            document.mode().label()
        );

        Self {
            document,
            fullscreen: settings.start_fullscreen,
            modal: PendingModalState::None,
            media: MediaResolver::new(uploader, catalog, settings.catalog_page_size),
            picker: ImagePicker::new(),
            settings,
            on_change: Box::new(on_change),
            last_notified: initial,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Current document value.
    pub fn value(&self) -> &str {
        self.document.value()
    }

    pub fn mode(&self) -> EditingMode {
        EditingMode::new(self.document.mode(), self.fullscreen)
    }

    pub fn document(&self) -> &DualViewSynchronizer {
        &self.document
    }

    pub fn modal(&self) -> &PendingModalState {
        &self.modal
    }

    pub fn picker(&self) -> &ImagePicker {
        &self.picker
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Formatting state at the caret, for toolbar reflection.
    pub fn formatting_state(&self) -> Option<FormattingState> {
        self.document.formatting_state()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mode
    // ─────────────────────────────────────────────────────────────────────────

    /// Toggle fullscreen layout. Returns the new state.
    pub fn toggle_fullscreen(&mut self) -> bool {
        self.fullscreen = !self.fullscreen;
        debug!("Fullscreen {}", if self.fullscreen { "on" } else { "off" });
        self.fullscreen
    }

    pub fn switch_to_source(&mut self) -> bool {
        let switched = self.document.switch_to_source();
        self.notify_change();
        switched
    }

    pub fn switch_to_visual(&mut self) -> bool {
        let switched = self.document.switch_to_visual();
        self.notify_change();
        switched
    }

    pub fn toggle_view_mode(&mut self) -> ViewMode {
        let mode = self.document.toggle_mode();
        self.notify_change();
        mode
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Editing
    // ─────────────────────────────────────────────────────────────────────────

    /// Move the caret or selection of the live view.
    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.document.set_selection(selection);
    }

    pub fn edit_source(&mut self, text: impl Into<String>) -> bool {
        let changed = self.document.edit_source(text);
        self.notify_change();
        changed
    }

    pub fn edit_visual(&mut self, html: impl Into<String>) -> bool {
        let changed = self.document.edit_visual(html);
        self.notify_change();
        changed
    }

    /// Apply a formatting command. Inert while the source view is live.
    pub fn dispatch(&mut self, command: &FormatCommand) -> bool {
        let changed = self.document.dispatch(command);
        self.notify_change();
        changed
    }

    /// Insert a horizontal rule at the caret.
    pub fn insert_horizontal_rule(&mut self) -> bool {
        self.insert_fragments(&[build_horizontal_rule()])
    }

    fn insert_fragments(&mut self, fragments: &[StructuredFragment]) -> bool {
        if fragments.is_empty() {
            return false;
        }
        let html: String = fragments
            .iter()
            .map(|fragment| fragment.to_html(&self.settings.fragment_styles))
            .collect();
        let inserted = self.document.insert_html(&html);
        self.notify_change();
        inserted
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Modals
    // ─────────────────────────────────────────────────────────────────────────

    /// Open the link modal, prefilling the text with the current selection.
    pub fn open_link_modal(&mut self) {
        let text = self.document.selected_text();
        debug!("Opening link modal (prefilled: {})", text.is_some());
        self.modal = PendingModalState::link(text);
    }

    /// Open the table modal with the configured default shape.
    pub fn open_table_modal(&mut self) {
        debug!("Opening table modal");
        self.modal = PendingModalState::table(
            self.settings.default_table_rows,
            self.settings.default_table_cols,
        );
    }

    pub fn set_link_url(&mut self, url: impl Into<String>) -> bool {
        self.modal.set_link_url(url)
    }

    pub fn set_link_text(&mut self, text: impl Into<String>) -> bool {
        self.modal.set_link_text(text)
    }

    pub fn set_table_rows(&mut self, rows: usize) -> bool {
        self.modal.set_table_rows(rows)
    }

    pub fn set_table_cols(&mut self, cols: usize) -> bool {
        self.modal.set_table_cols(cols)
    }

    /// Whether the open modal's confirm action is enabled.
    pub fn can_confirm_modal(&self) -> bool {
        self.modal.is_valid()
    }

    /// Build the modal's fragment and insert it at the caret.
    ///
    /// Returns `Ok(false)` if no modal is open. While the fields are invalid
    /// the modal stays open and the validation error is returned.
    pub fn confirm_modal(&mut self) -> Result<bool> {
        let fragment = match self.modal.build() {
            None => return Ok(false),
            Some(result) => result.map_err(Error::Validation)?,
        };
        self.modal = PendingModalState::None;
        debug!("Confirmed {:?} modal", fragment.kind());
        Ok(self.insert_fragments(&[fragment]))
    }

    /// Close the modal without touching the document.
    pub fn cancel_modal(&mut self) {
        if self.modal.is_open() {
            debug!("Modal cancelled");
        }
        self.modal = PendingModalState::None;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Images
    // ─────────────────────────────────────────────────────────────────────────

    /// Upload a local file. On success the image is inserted when the
    /// completion is pumped.
    pub fn upload_image(&mut self, file: &LocalFile) -> RequestId {
        let request = self.media.upload_local_file(file);
        self.picker.track_upload(request);
        request
    }

    /// Open the picker and request a catalog page.
    pub fn open_image_picker(&mut self) -> RequestId {
        let request = self.media.list_catalog_assets(None);
        self.picker.open(request);
        request
    }

    /// Toggle an asset in the picker selection. Ignored while loading.
    pub fn toggle_picker_asset(&mut self, id: &str) -> bool {
        self.picker.toggle(id)
    }

    pub fn set_picker_filter(&mut self, filter: impl Into<String>) {
        self.picker.set_filter(filter);
    }

    /// Insert every selected asset in catalog order, then close the picker.
    ///
    /// Returns the number of images inserted. With nothing selected the
    /// picker stays open.
    pub fn insert_selected_images(&mut self) -> usize {
        if self.picker.selection().is_empty() {
            return 0;
        }
        let assets = self.picker.take_selection();
        let fragments: Vec<StructuredFragment> = assets
            .iter()
            .filter_map(|asset| match build_image(Some(asset)) {
                Ok(fragment) => Some(fragment),
                Err(e) => {
                    warn!("Skipping image '{}': {}", asset.id, e);
                    None
                }
            })
            .collect();
        self.insert_fragments(&fragments);
        fragments.len()
    }

    pub fn close_image_picker(&mut self) {
        self.picker.close();
    }

    /// Process finished media requests. Call from the host's event loop.
    ///
    /// Returns the number of events handled.
    pub fn pump_media_events(&mut self) -> usize {
        let events = self.media.poll();
        let count = events.len();
        for event in events {
            match event {
                MediaEvent::Uploaded { request, result } => {
                    self.picker.finish_upload(request);
                    if let Ok(asset) = result {
                        self.insert_uploaded(&asset);
                    }
                }
                MediaEvent::CatalogLoaded { request, result } => {
                    self.picker.receive_catalog(request, result);
                }
            }
        }
        count
    }

    fn insert_uploaded(&mut self, asset: &MediaAsset) {
        match build_image(Some(asset)) {
            Ok(fragment) => {
                info!("Inserting uploaded image {}", asset.url);
                self.insert_fragments(&[fragment]);
            }
            Err(e) => warn!("Uploaded image cannot be inserted: {}", e),
        }

        // Refresh an open picker so the new upload shows up
        if self.picker.is_open() {
            let request = self.media.list_catalog_assets(None);
            self.picker.reload(request);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Change notification
    // ─────────────────────────────────────────────────────────────────────────

    fn notify_change(&mut self) {
        let value = self.document.value();
        if value == self.last_notified {
            return;
        }
        self.last_notified = value.to_string();
        (self.on_change)(&self.last_notified);
    }
}

impl fmt::Debug for EditingSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditingSurface")
            .field("mode", &self.mode())
            .field("modal", &self.modal)
            .field("picker", &self.picker)
            .field("media", &self.media)
            .finish_non_exhaustive()
    }
}
