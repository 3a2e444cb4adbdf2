#![forbid(unsafe_code)]

//! Persisted custom order per collection, reconciled against live items.
//!
//! The saved order is authoritative for display but may be stale: items can
//! be deleted or added outside the app. [`reconcile`] merges the saved order
//! with the fresh item list from the asset store.
//!
//! ```text
//! saved   3 1          fresh  1 2 3
//!         │ │                   │
//!         ▼ ▼                   ▼
//! result  3 1  ──────────────►  2      (new arrivals appended)
//! ```
//!
//! # Invariants
//!
//! 1. `reconcile(saved, fresh)` is always a permutation of `fresh`
//! 2. `reconcile([], fresh) == fresh`
//! 3. The cache never holds an entry that differs from the backend

use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use albumkit_core::{CollectionId, ItemId};

use crate::backend::KeyValueStore;
use crate::error::StoreResult;
use crate::keys;

/// Merge a saved custom order with the live item list.
///
/// Walks `saved`, keeping ids still present in `fresh`, then appends every
/// item of `fresh` not yet emitted, in `fresh` order. If the result does not
/// have exactly `fresh.len()` items (for example because `saved` repeats an
/// id) the merge is discarded and `fresh` is returned unchanged.
#[must_use]
pub fn reconcile(saved: &[ItemId], fresh: &[ItemId]) -> Vec<ItemId> {
    if saved.is_empty() {
        return fresh.to_vec();
    }

    let live: AHashSet<&ItemId> = fresh.iter().collect();
    let mut emitted: AHashSet<&ItemId> = AHashSet::with_capacity(fresh.len());
    let mut out = Vec::with_capacity(fresh.len());

    for item in saved {
        if live.contains(item) {
            out.push(item.clone());
            emitted.insert(item);
        }
    }
    for item in fresh {
        if !emitted.contains(item) {
            out.push(item.clone());
        }
    }

    if out.len() != fresh.len() {
        tracing::warn!(
            message = "order.reconcile_fallback",
            saved = saved.len(),
            fresh = fresh.len(),
            reconciled = out.len(),
        );
        return fresh.to_vec();
    }
    out
}

/// Custom order persistence with a write-through cache.
pub struct OrderStore {
    backend: Arc<dyn KeyValueStore>,
    cache: AHashMap<CollectionId, Vec<ItemId>>,
}

impl std::fmt::Debug for OrderStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderStore")
            .field("cached_collections", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl OrderStore {
    /// Create a store on top of `backend`.
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            cache: AHashMap::new(),
        }
    }

    /// The saved order for `collection`, empty if none was saved.
    pub fn load(&mut self, collection: &CollectionId) -> StoreResult<Vec<ItemId>> {
        if let Some(cached) = self.cache.get(collection) {
            return Ok(cached.clone());
        }
        let saved: Vec<ItemId> = self
            .backend
            .get_list(&keys::custom_order(collection))?
            .unwrap_or_default()
            .into_iter()
            .map(ItemId::new)
            .collect();
        self.cache.insert(collection.clone(), saved.clone());
        Ok(saved)
    }

    /// Overwrite the saved order for `collection` with `items`.
    pub fn save(&mut self, collection: &CollectionId, items: &[ItemId]) -> StoreResult<()> {
        let raw: Vec<String> = items.iter().map(|i| i.as_str().to_owned()).collect();
        self.backend.set_list(&keys::custom_order(collection), &raw)?;
        self.cache.insert(collection.clone(), items.to_vec());
        tracing::debug!(
            message = "order.save",
            collection = collection.as_str(),
            len = items.len(),
        );
        Ok(())
    }

    /// Forget the saved order for `collection`.
    pub fn clear(&mut self, collection: &CollectionId) -> StoreResult<()> {
        self.backend.remove(&keys::custom_order(collection))?;
        self.cache.remove(collection);
        Ok(())
    }

    /// The display order for `collection` given its live items.
    ///
    /// Seeds storage with `fresh` when nothing is saved yet; otherwise
    /// returns [`reconcile`] of the saved order against `fresh`.
    pub fn load_or_seed(
        &mut self,
        collection: &CollectionId,
        fresh: &[ItemId],
    ) -> StoreResult<Vec<ItemId>> {
        let saved = self.load(collection)?;
        if saved.is_empty() {
            self.save(collection, fresh)?;
            return Ok(fresh.to_vec());
        }
        Ok(reconcile(&saved, fresh))
    }
}
