#![forbid(unsafe_code)]

//! Commits album changes to the asset store and records them for undo.
//!
//! # Commit pipeline
//!
//! ```text
//! commit_reorder(collection, new_order)
//!   │
//!   ├─ access.can_write()?            ── no ──► PermissionDenied
//!   ├─ fetch live items
//!   ├─ live empty?                    ── yes ─► EmptyCollection
//!   ├─ len(new_order) == len(live)?   ── no ──► CountMismatch
//!   ├─ set(new_order) == set(live)?   ── no ──► SetMismatch
//!   ├─ replace_all(new_order)         ── err ─► SyncFailed(reason)
//!   ├─ OrderStore::save(new_order)    ── err ─► Store(..)
//!   └─ record Sort { original: live, sorted: new_order }
//! ```
//!
//! Nothing is recorded unless the asset store accepted the change. Undo and
//! redo apply a [`StoreOp`] through the same paths without recording, and a
//! failed undo or redo leaves the log exactly as the pop left it.
//!
//! # Concurrency
//!
//! Every mutating method takes `&mut self`, so at most one commit per
//! coordinator is in flight. Share a coordinator across threads behind a
//! `Mutex`.

use ahash::AHashSet;
use albumkit_core::{CollectionId, ItemId};
use albumkit_store::{OrderStore, StoreError};

use crate::asset_store::{AssetStore, AssetStoreError};
use crate::undo::{ActionLog, HistoryConfig, StoreOp, UndoAction};

/// Reasons a commit, mutation, undo, or redo did not happen.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("no write access to the photo library")]
    PermissionDenied,
    #[error("the collection has no items")]
    EmptyCollection,
    #[error("new order has {actual} items but the collection has {expected}")]
    CountMismatch { expected: usize, actual: usize },
    #[error(
        "new order does not match the collection ({} missing, {} unexpected)",
        .missing.len(),
        .unexpected.len()
    )]
    SetMismatch {
        /// Live items absent from the new order.
        missing: Vec<ItemId>,
        /// Items of the new order that are not live.
        unexpected: Vec<ItemId>,
    },
    /// The asset store refused or failed the change.
    #[error("sync failed: {0}")]
    SyncFailed(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Check that `proposed` is a reordering of `live`.
pub fn validate_order(live: &[ItemId], proposed: &[ItemId]) -> Result<(), SyncError> {
    if live.is_empty() {
        return Err(SyncError::EmptyCollection);
    }
    if live.len() != proposed.len() {
        return Err(SyncError::CountMismatch {
            expected: live.len(),
            actual: proposed.len(),
        });
    }
    let live_set: AHashSet<&ItemId> = live.iter().collect();
    let proposed_set: AHashSet<&ItemId> = proposed.iter().collect();
    let missing: Vec<ItemId> = live
        .iter()
        .filter(|i| !proposed_set.contains(i))
        .cloned()
        .collect();
    let unexpected: Vec<ItemId> = proposed
        .iter()
        .filter(|i| !live_set.contains(i))
        .cloned()
        .collect();
    if missing.is_empty() && unexpected.is_empty() {
        Ok(())
    } else {
        Err(SyncError::SetMismatch {
            missing,
            unexpected,
        })
    }
}

fn rejected(err: AssetStoreError) -> SyncError {
    tracing::warn!(message = "album.store_rejected", reason = %err);
    SyncError::SyncFailed(err.to_string())
}

/// Owns the asset store, the custom order store, and the action log.
pub struct SyncCoordinator<S> {
    assets: S,
    orders: OrderStore,
    log: ActionLog,
}

impl<S: std::fmt::Debug> std::fmt::Debug for SyncCoordinator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncCoordinator")
            .field("assets", &self.assets)
            .field("orders", &self.orders)
            .field("log", &self.log)
            .finish()
    }
}

impl<S: AssetStore> SyncCoordinator<S> {
    #[must_use]
    pub fn new(assets: S, orders: OrderStore, history: HistoryConfig) -> Self {
        Self {
            assets,
            orders,
            log: ActionLog::new(history),
        }
    }

    #[must_use]
    pub fn assets(&self) -> &S {
        &self.assets
    }

    /// Direct access to the asset store. Changes made here are not recorded.
    pub fn assets_mut(&mut self) -> &mut S {
        &mut self.assets
    }

    pub fn orders_mut(&mut self) -> &mut OrderStore {
        &mut self.orders
    }

    #[must_use]
    pub fn log(&self) -> &ActionLog {
        &self.log
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.log.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.log.can_redo()
    }

    // ========================================================================
    // Forward operations
    // ========================================================================

    /// Replace the content of `collection` with `new_order`, persist it as
    /// the custom order, and record a Sort action.
    pub fn commit_reorder(
        &mut self,
        collection: &CollectionId,
        new_order: &[ItemId],
    ) -> Result<(), SyncError> {
        let span = tracing::debug_span!(
            "album.commit",
            collection = collection.as_str(),
            len = new_order.len()
        );
        let _guard = span.enter();

        let original = self.sync_order(collection, new_order)?;
        self.log.record(UndoAction::sort(
            collection.clone(),
            original,
            new_order.to_vec(),
        ));
        tracing::info!(
            message = "album.commit.ok",
            collection = collection.as_str(),
            len = new_order.len(),
        );
        Ok(())
    }

    /// Remove `items` from `collection`. Returns the items actually removed.
    pub fn delete_items(
        &mut self,
        collection: &CollectionId,
        items: &[ItemId],
    ) -> Result<Vec<ItemId>, SyncError> {
        self.ensure_writable()?;
        let removed = self.present_in(collection, items)?;
        if removed.is_empty() {
            return Ok(removed);
        }
        self.assets.remove(collection, &removed).map_err(rejected)?;
        self.log
            .record(UndoAction::delete(collection.clone(), removed.clone()));
        Ok(removed)
    }

    /// Move `items` from `from` to `to`. Returns the items actually moved.
    pub fn move_items(
        &mut self,
        items: &[ItemId],
        from: &CollectionId,
        to: &CollectionId,
    ) -> Result<Vec<ItemId>, SyncError> {
        self.ensure_writable()?;
        if from == to {
            return Ok(Vec::new());
        }
        let moved = self.present_in(from, items)?;
        if moved.is_empty() {
            return Ok(moved);
        }
        self.assets
            .move_items(&moved, from, to)
            .map_err(rejected)?;
        self.log
            .record(UndoAction::moved(from.clone(), to.clone(), moved.clone()));
        Ok(moved)
    }

    /// Append `items` to `destination`. Returns the items actually added.
    pub fn copy_items(
        &mut self,
        items: &[ItemId],
        destination: &CollectionId,
    ) -> Result<Vec<ItemId>, SyncError> {
        self.ensure_writable()?;
        let added = self.absent_from(destination, items)?;
        if added.is_empty() {
            return Ok(added);
        }
        self.assets.add(&added, destination).map_err(rejected)?;
        self.log
            .record(UndoAction::copy(added.clone(), destination.clone()));
        Ok(added)
    }

    /// Insert `items` into `destination` at `index`. Returns the items
    /// actually inserted.
    ///
    /// A saved custom order of `destination` gets the items spliced in at
    /// the same index so they show where they were pasted.
    pub fn paste_items(
        &mut self,
        items: &[ItemId],
        destination: &CollectionId,
        index: usize,
    ) -> Result<Vec<ItemId>, SyncError> {
        self.ensure_writable()?;
        let inserted = self.absent_from(destination, items)?;
        if inserted.is_empty() {
            return Ok(inserted);
        }
        self.insert_and_splice(destination, &inserted, index)?;
        self.log.record(UndoAction::paste(
            inserted.clone(),
            destination.clone(),
            index,
        ));
        Ok(inserted)
    }

    // ========================================================================
    // Undo / redo
    // ========================================================================

    /// Revert the newest recorded action.
    ///
    /// Returns `Ok(None)` when there is nothing to undo. On failure the
    /// action stays on the redo stack.
    pub fn undo(&mut self) -> Result<Option<UndoAction>, SyncError> {
        let Some(action) = self.log.undo() else {
            return Ok(None);
        };
        let span = tracing::debug_span!("album.undo", description = action.description());
        let _guard = span.enter();
        self.apply(&action.undo_op()).inspect_err(|err| {
            tracing::warn!(message = "album.undo.failed", error = %err);
        })?;
        Ok(Some(action))
    }

    /// Re-apply the newest undone action.
    ///
    /// Returns `Ok(None)` when there is nothing to redo. On failure the
    /// action stays on the undo stack.
    pub fn redo(&mut self) -> Result<Option<UndoAction>, SyncError> {
        let Some(action) = self.log.redo() else {
            return Ok(None);
        };
        let span = tracing::debug_span!("album.redo", description = action.description());
        let _guard = span.enter();
        self.apply(&action.redo_op()).inspect_err(|err| {
            tracing::warn!(message = "album.redo.failed", error = %err);
        })?;
        Ok(Some(action))
    }

    /// Apply `op` without recording it.
    pub fn apply(&mut self, op: &StoreOp) -> Result<(), SyncError> {
        match op {
            StoreOp::ReplaceAll { collection, order } => {
                self.sync_order(collection, order).map(|_| ())
            }
            StoreOp::Remove { collection, items } => {
                self.ensure_writable()?;
                self.assets.remove(collection, items).map_err(rejected)
            }
            StoreOp::Add { collection, items } => {
                self.ensure_writable()?;
                self.assets.add(items, collection).map_err(rejected)
            }
            StoreOp::Move { items, from, to } => {
                self.ensure_writable()?;
                self.assets.move_items(items, from, to).map_err(rejected)
            }
            StoreOp::Insert {
                collection,
                items,
                index,
            } => {
                self.ensure_writable()?;
                self.insert_and_splice(collection, items, *index)
            }
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn ensure_writable(&self) -> Result<(), SyncError> {
        let access = self.assets.access();
        if access.can_write() {
            return Ok(());
        }
        tracing::warn!(message = "album.permission_denied", access = ?access);
        Err(SyncError::PermissionDenied)
    }

    /// Validate and write `new_order`. Returns the live order it replaced.
    fn sync_order(
        &mut self,
        collection: &CollectionId,
        new_order: &[ItemId],
    ) -> Result<Vec<ItemId>, SyncError> {
        self.ensure_writable()?;
        let live = self
            .assets
            .fetch_items(collection, None)
            .map_err(rejected)?;
        validate_order(&live, new_order).inspect_err(|err| {
            tracing::warn!(
                message = "album.commit.invalid",
                collection = collection.as_str(),
                error = %err,
            );
        })?;
        self.assets
            .replace_all(collection, new_order)
            .map_err(rejected)?;
        self.orders.save(collection, new_order)?;
        Ok(live)
    }

    fn insert_and_splice(
        &mut self,
        collection: &CollectionId,
        items: &[ItemId],
        index: usize,
    ) -> Result<(), SyncError> {
        self.assets
            .insert(items, collection, index)
            .map_err(rejected)?;
        let mut saved = self.orders.load(collection)?;
        if !saved.is_empty() {
            saved.retain(|i| !items.contains(i));
            let at = index.min(saved.len());
            saved.splice(at..at, items.iter().cloned());
            self.orders.save(collection, &saved)?;
        }
        Ok(())
    }

    /// `items` that are in `collection`, in `items` order.
    fn present_in(
        &self,
        collection: &CollectionId,
        items: &[ItemId],
    ) -> Result<Vec<ItemId>, SyncError> {
        let live = self
            .assets
            .fetch_items(collection, None)
            .map_err(rejected)?;
        let live: AHashSet<&ItemId> = live.iter().collect();
        let mut seen = AHashSet::new();
        Ok(items
            .iter()
            .filter(|i| live.contains(i) && seen.insert(*i))
            .cloned()
            .collect())
    }

    /// `items` that are not yet in `collection`, in `items` order.
    fn absent_from(
        &self,
        collection: &CollectionId,
        items: &[ItemId],
    ) -> Result<Vec<ItemId>, SyncError> {
        let live = self
            .assets
            .fetch_items(collection, None)
            .map_err(rejected)?;
        let live: AHashSet<&ItemId> = live.iter().collect();
        let mut seen = AHashSet::new();
        Ok(items
            .iter()
            .filter(|i| !live.contains(i) && seen.insert(*i))
            .cloned()
            .collect())
    }
}
