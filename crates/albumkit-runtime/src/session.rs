#![forbid(unsafe_code)]

//! One open collection and everything the UI does with it.
//!
//! [`AlbumSession`] wires the pure core (selection, reorder, visibility) to
//! persistence and the asset store. All indices it accepts from the UI are
//! indices into [`AlbumSession::visible_items`]; reorders always operate on
//! the full order, hidden items included.
//!
//! ```text
//!  UI ──tap/drag──► SelectionController ──events──► UI
//!  UI ──commit────► reorder(full, selection) ──► SyncCoordinator ──► AssetStore
//!                                                     │
//!                                                     ├──► OrderStore
//!                                                     └──► ActionLog
//! ```

use std::sync::Arc;

use albumkit_core::{
    CollectionId, HeaderSet, ItemId, OrderDiff, Paragraph, ReorderError, SelectionChange,
    SelectionController, SelectionEvent, SelectionMode, SelectionModel, reorder, visible_items,
};
use albumkit_store::{
    HeaderStore, KeyValueStore, OrderStore, PreferenceStore, SortPreference, StoreError,
};

use crate::asset_store::{AssetStore, AssetStoreError};
use crate::clipboard::{Pasteboard, PasteboardError};
use crate::config::SessionConfig;
use crate::sync::{SyncCoordinator, SyncError};
use crate::undo::{StoreOp, UndoAction};

/// Failures of session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no collection is open")]
    NotOpen,
    #[error("nothing is selected")]
    NothingSelected,
    #[error("index {index} is out of bounds for {len} visible items")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("could not load collection: {0}")]
    Fetch(#[from] AssetStoreError),
    #[error(transparent)]
    Reorder(#[from] ReorderError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Pasteboard(#[from] PasteboardError),
}

/// Control flow for one collection at a time.
pub struct AlbumSession<S> {
    config: SessionConfig,
    coordinator: SyncCoordinator<S>,
    headers: HeaderStore,
    preferences: PreferenceStore,
    pasteboard: Pasteboard,
    controller: SelectionController,
    collection: Option<CollectionId>,
    preference: SortPreference,
    full_order: Vec<ItemId>,
    header_set: HeaderSet,
    visible: Vec<ItemId>,
}

impl<S> std::fmt::Debug for AlbumSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlbumSession")
            .field("collection", &self.collection)
            .field("preference", &self.preference)
            .field("items", &self.full_order.len())
            .field("visible", &self.visible.len())
            .field("selected", &self.controller.selection().len())
            .finish_non_exhaustive()
    }
}

impl<S: AssetStore> AlbumSession<S> {
    /// Assemble a session from explicitly constructed parts.
    #[must_use]
    pub fn new(
        config: SessionConfig,
        coordinator: SyncCoordinator<S>,
        headers: HeaderStore,
        preferences: PreferenceStore,
    ) -> Self {
        let controller = SelectionController::new(config.selection_mode);
        let preference = config.default_sort;
        Self {
            config,
            coordinator,
            headers,
            preferences,
            pasteboard: Pasteboard::new(),
            controller,
            collection: None,
            preference,
            full_order: Vec::new(),
            header_set: HeaderSet::new(),
            visible: Vec::new(),
        }
    }

    /// Build every store on top of one key-value `backend`.
    #[must_use]
    pub fn with_backend(config: SessionConfig, assets: S, backend: Arc<dyn KeyValueStore>) -> Self {
        let coordinator = SyncCoordinator::new(
            assets,
            OrderStore::new(backend.clone()),
            config.to_history_config(),
        );
        let headers = HeaderStore::new(backend.clone());
        let preferences = PreferenceStore::new(backend);
        Self::new(config, coordinator, headers, preferences)
    }

    // ========================================================================
    // Opening and reloading
    // ========================================================================

    /// Open `collection` with a fresh selection.
    ///
    /// Loads the sort preference, fetches live items, applies the custom
    /// order (seeding it on first open) when the preference is custom, and
    /// drops headers whose item is gone.
    pub fn open(&mut self, collection: CollectionId) -> Result<(), SessionError> {
        let span = tracing::debug_span!("album.open", collection = collection.as_str());
        let _guard = span.enter();

        self.preference = self
            .preferences
            .load_or(&collection, self.config.default_sort)?;
        self.collection = Some(collection);
        self.controller = SelectionController::new(self.config.selection_mode);
        if let Err(err) = self.reload() {
            self.close();
            return Err(err);
        }
        tracing::info!(
            message = "album.open",
            preference = self.preference.as_str(),
            items = self.full_order.len(),
            visible = self.visible.len(),
            headers = self.header_set.len(),
        );
        Ok(())
    }

    /// Forget the open collection, its selection, and its cached order.
    pub fn close(&mut self) {
        self.collection = None;
        self.controller = SelectionController::new(self.config.selection_mode);
        self.full_order.clear();
        self.header_set = HeaderSet::new();
        self.visible.clear();
    }

    /// Re-read the open collection, keeping whatever selection survives.
    ///
    /// Visible indices may shift, so a pending range start is dropped.
    pub fn reload(&mut self) -> Result<(), SessionError> {
        let collection = self.open_collection()?;
        let fresh = self
            .coordinator
            .assets()
            .fetch_items(&collection, self.preference.sort_key())?;
        self.full_order = if self.preference.is_custom() {
            self.coordinator
                .orders_mut()
                .load_or_seed(&collection, &fresh)?
        } else {
            fresh
        };
        self.headers.cleanup_invalid(&collection, &self.full_order)?;
        self.header_set = self.headers.load(&collection)?;
        self.refresh_visible();
        self.controller.retain_present(&self.full_order);
        self.controller.set_mode(self.controller.mode());
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn collection(&self) -> Option<&CollectionId> {
        self.collection.as_ref()
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Every item of the open collection in display order.
    #[must_use]
    pub fn full_order(&self) -> &[ItemId] {
        &self.full_order
    }

    /// Items currently shown: headers plus items of expanded paragraphs.
    #[must_use]
    pub fn visible_items(&self) -> &[ItemId] {
        &self.visible
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderSet {
        &self.header_set
    }

    #[must_use]
    pub fn paragraphs(&self) -> Vec<Paragraph> {
        self.header_set.paragraphs(&self.full_order)
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionModel {
        self.controller.selection()
    }

    #[must_use]
    pub fn preference(&self) -> SortPreference {
        self.preference
    }

    #[must_use]
    pub fn coordinator(&self) -> &SyncCoordinator<S> {
        &self.coordinator
    }

    /// Mutable coordinator access, e.g. to reach the asset store in tests.
    pub fn coordinator_mut(&mut self) -> &mut SyncCoordinator<S> {
        &mut self.coordinator
    }

    #[must_use]
    pub fn pasteboard(&self) -> &Pasteboard {
        &self.pasteboard
    }

    /// Replace the pasteboard, e.g. with text from the system clipboard.
    pub fn set_pasteboard(&mut self, pasteboard: Pasteboard) {
        self.pasteboard = pasteboard;
    }

    /// Take queued selection events, oldest first.
    pub fn drain_events(&mut self) -> Vec<SelectionEvent> {
        self.controller.drain_events()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.coordinator.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.coordinator.can_redo()
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        self.controller.set_mode(mode);
    }

    #[must_use]
    pub fn selection_mode(&self) -> SelectionMode {
        self.controller.mode()
    }

    /// Tap the visible item at `index`.
    pub fn tap(&mut self, index: usize) -> SelectionChange {
        self.controller.tap(&self.visible, index)
    }

    pub fn drag_begin(&mut self, index: usize) -> SelectionChange {
        self.controller.drag_begin(&self.visible, index)
    }

    pub fn drag_over(&mut self, index: Option<usize>) -> SelectionChange {
        self.controller.drag_over(&self.visible, index)
    }

    pub fn drag_end(&mut self) {
        self.controller.drag_end();
    }

    pub fn clear_selection(&mut self) -> SelectionChange {
        self.controller.clear()
    }

    /// Anchor the visible item at `index`, or clear the anchor with `None`.
    pub fn set_anchor(&mut self, index: Option<usize>) -> Result<(), SessionError> {
        let item = match index {
            Some(index) => Some(self.visible_at(index)?.clone()),
            None => None,
        };
        self.controller.set_anchor(item);
        Ok(())
    }

    /// Anchor the visible item at `index`, or un-anchor it if it already is.
    pub fn toggle_anchor(&mut self, index: usize) -> Result<(), SessionError> {
        let item = self.visible_at(index)?.clone();
        self.controller.toggle_anchor(&item);
        Ok(())
    }

    // ========================================================================
    // Headers and sorting
    // ========================================================================

    /// Collapse or expand the paragraph of `header`. Returns the new flag.
    pub fn toggle_collapse(&mut self, header: &ItemId) -> Result<bool, SessionError> {
        let collection = self.open_collection()?;
        let collapsed = self.headers.toggle_collapse(&collection, header)?;
        self.reload_headers(&collection)?;
        Ok(collapsed)
    }

    /// Make `item` a paragraph header.
    pub fn set_header(&mut self, item: &ItemId) -> Result<bool, SessionError> {
        let collection = self.open_collection()?;
        let added = self.headers.set_header(&collection, item)?;
        self.reload_headers(&collection)?;
        Ok(added)
    }

    pub fn remove_header(&mut self, item: &ItemId) -> Result<bool, SessionError> {
        let collection = self.open_collection()?;
        let removed = self.headers.remove_header(&collection, item)?;
        self.reload_headers(&collection)?;
        Ok(removed)
    }

    /// Persist `preference` for the open collection and reload it.
    pub fn set_sort_preference(&mut self, preference: SortPreference) -> Result<(), SessionError> {
        let collection = self.open_collection()?;
        self.preferences.save(&collection, preference)?;
        self.preference = preference;
        self.reload()
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Move the selected items next to the base item and commit the result.
    ///
    /// Returns how the visible items changed. A committed reorder makes the
    /// collection's preference custom.
    pub fn commit_selection(&mut self) -> Result<OrderDiff, SessionError> {
        let collection = self.open_collection()?;
        let new_order = reorder(&self.full_order, self.controller.selection())?;
        self.coordinator.commit_reorder(&collection, &new_order)?;

        if !self.preference.is_custom() {
            self.preferences.save(&collection, SortPreference::Custom)?;
            self.preference = SortPreference::Custom;
        }

        let before = std::mem::take(&mut self.visible);
        self.full_order = new_order;
        self.refresh_visible();
        let diff = OrderDiff::between(&before, &self.visible);

        if self.config.clear_selection_after_commit {
            self.controller.clear();
        } else {
            self.controller.set_mode(self.controller.mode());
        }
        Ok(diff)
    }

    /// Copy the selected items, in selection order, to the pasteboard.
    pub fn copy_selection(&mut self) -> Result<usize, SessionError> {
        let items = self.controller.selection().selected_items_in_order();
        Ok(self.pasteboard.copy(items)?)
    }

    /// Paste the pasteboard's items before the visible item at `index`, or
    /// at the end when `index` is past the last visible item.
    pub fn paste(&mut self, index: usize) -> Result<Vec<ItemId>, SessionError> {
        let collection = self.open_collection()?;
        let assets = self.coordinator.assets();
        let items = self.pasteboard.resolve(|item| assets.contains(item))?;
        let at = self
            .visible
            .get(index)
            .and_then(|target| self.full_order.iter().position(|i| i == target))
            .unwrap_or(self.full_order.len());
        let inserted = self.coordinator.paste_items(&items, &collection, at)?;
        self.reload()?;
        Ok(inserted)
    }

    /// Remove the selected items from the open collection.
    pub fn delete_selection(&mut self) -> Result<Vec<ItemId>, SessionError> {
        let collection = self.open_collection()?;
        let items = self.selected_or_err()?;
        let removed = self.coordinator.delete_items(&collection, &items)?;
        self.controller.clear();
        self.reload()?;
        Ok(removed)
    }

    /// Move the selected items to `destination`.
    pub fn move_selection(
        &mut self,
        destination: &CollectionId,
    ) -> Result<Vec<ItemId>, SessionError> {
        let collection = self.open_collection()?;
        let items = self.selected_or_err()?;
        let moved = self
            .coordinator
            .move_items(&items, &collection, destination)?;
        self.controller.clear();
        self.reload()?;
        Ok(moved)
    }

    /// Revert the newest action. The open collection is reloaded when the
    /// action changed it.
    pub fn undo(&mut self) -> Result<Option<UndoAction>, SessionError> {
        let action = self.coordinator.undo()?;
        if let Some(action) = &action {
            self.reload_if_touched(&action.undo_op())?;
        }
        Ok(action)
    }

    /// Re-apply the newest undone action. The open collection is reloaded
    /// when the action changed it.
    pub fn redo(&mut self) -> Result<Option<UndoAction>, SessionError> {
        let action = self.coordinator.redo()?;
        if let Some(action) = &action {
            self.reload_if_touched(&action.redo_op())?;
        }
        Ok(action)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn open_collection(&self) -> Result<CollectionId, SessionError> {
        self.collection.clone().ok_or(SessionError::NotOpen)
    }

    fn visible_at(&self, index: usize) -> Result<&ItemId, SessionError> {
        self.visible.get(index).ok_or(SessionError::IndexOutOfBounds {
            index,
            len: self.visible.len(),
        })
    }

    fn selected_or_err(&self) -> Result<Vec<ItemId>, SessionError> {
        let items = self.controller.selection().selected_items_in_order();
        if items.is_empty() {
            return Err(SessionError::NothingSelected);
        }
        Ok(items.to_vec())
    }

    fn reload_if_touched(&mut self, op: &StoreOp) -> Result<(), SessionError> {
        match &self.collection {
            Some(open) if op.touches(open) => self.reload(),
            _ => Ok(()),
        }
    }

    fn refresh_visible(&mut self) {
        self.visible = visible_items(&self.full_order, &self.header_set);
    }

    /// Visible indices shift when headers change, so a pending range start
    /// is dropped.
    fn reload_headers(&mut self, collection: &CollectionId) -> Result<(), SessionError> {
        self.header_set = self.headers.load(collection)?;
        self.refresh_visible();
        self.controller.set_mode(self.controller.mode());
        Ok(())
    }
}
