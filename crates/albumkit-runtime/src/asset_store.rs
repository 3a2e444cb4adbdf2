#![forbid(unsafe_code)]

//! The external asset store collaborator.
//!
//! The asset store owns the actual photo library: which items exist, which
//! collections contain them, and in what native order. Every mutation is
//! all-or-nothing; a failed call leaves the store unchanged.
//!
//! [`MemoryAssetStore`] is a complete in-process implementation used by
//! tests and demos. It can be told to reject the next mutation to exercise
//! failure paths.

use ahash::{AHashMap, AHashSet};
use albumkit_core::{CollectionId, ItemId};
use albumkit_store::SortKey;

/// Library access granted to the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessLevel {
    /// The user has not been asked yet.
    #[default]
    NotDetermined,
    /// Access was refused.
    Denied,
    /// Access to a user-chosen subset of the library.
    Limited,
    /// Full access.
    Authorized,
}

impl AccessLevel {
    /// Whether collections may be modified.
    #[must_use]
    pub const fn can_write(self) -> bool {
        matches!(self, Self::Limited | Self::Authorized)
    }
}

/// Failures reported by an [`AssetStore`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssetStoreError {
    #[error("collection {0} does not exist")]
    UnknownCollection(CollectionId),
    #[error("item {0} does not exist in the library")]
    UnknownItem(ItemId),
    /// The backend refused the change.
    #[error("asset store rejected the change: {0}")]
    Rejected(String),
}

/// Operations the album logic needs from the photo library.
pub trait AssetStore {
    /// Current library access.
    fn access(&self) -> AccessLevel;

    /// Whether `item` exists anywhere in the library.
    fn contains(&self, item: &ItemId) -> bool;

    /// Items of `collection`, natively ordered, or sorted by `sort`.
    fn fetch_items(
        &self,
        collection: &CollectionId,
        sort: Option<SortKey>,
    ) -> Result<Vec<ItemId>, AssetStoreError>;

    /// Replace the whole content of `collection` with `order`.
    fn replace_all(&mut self, collection: &CollectionId, order: &[ItemId])
    -> Result<(), AssetStoreError>;

    /// Remove `items` from `collection`. Items not in it are ignored.
    fn remove(&mut self, collection: &CollectionId, items: &[ItemId])
    -> Result<(), AssetStoreError>;

    /// Remove `items` from `from` and append them to `to`.
    fn move_items(
        &mut self,
        items: &[ItemId],
        from: &CollectionId,
        to: &CollectionId,
    ) -> Result<(), AssetStoreError>;

    /// Append `items` to `collection`. Items already in it are skipped.
    fn add(&mut self, items: &[ItemId], collection: &CollectionId) -> Result<(), AssetStoreError>;

    /// Insert `items` into `collection` starting at `index` (clamped to the
    /// collection length). Items already in it are skipped.
    fn insert(
        &mut self,
        items: &[ItemId],
        collection: &CollectionId,
        index: usize,
    ) -> Result<(), AssetStoreError>;
}

// ============================================================================
// MemoryAssetStore
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
struct AssetDates {
    created: u64,
    modified: u64,
}

/// In-memory photo library.
#[derive(Debug, Clone)]
pub struct MemoryAssetStore {
    access: AccessLevel,
    library: AHashMap<ItemId, AssetDates>,
    collections: AHashMap<CollectionId, Vec<ItemId>>,
    /// Reason the next mutation will be rejected with.
    pending_failure: Option<String>,
    clock: u64,
}

impl Default for MemoryAssetStore {
    fn default() -> Self {
        Self {
            access: AccessLevel::Authorized,
            library: AHashMap::new(),
            collections: AHashMap::new(),
            pending_failure: None,
            clock: 0,
        }
    }
}

impl MemoryAssetStore {
    /// An empty, fully authorized library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collection holding `items`, registering unknown items in the
    /// library with increasing creation dates.
    #[must_use]
    pub fn with_collection(mut self, collection: impl Into<CollectionId>, items: &[&str]) -> Self {
        let items: Vec<ItemId> = items.iter().map(|s| ItemId::new(*s)).collect();
        for item in &items {
            self.register(item.clone());
        }
        self.collections.insert(collection.into(), items);
        self
    }

    /// Set the creation and modification stamps of `item`.
    #[must_use]
    pub fn with_dates(mut self, item: &str, created: u64, modified: u64) -> Self {
        self.library
            .insert(ItemId::new(item), AssetDates { created, modified });
        self
    }

    /// Register `item` in the library without adding it to any collection.
    pub fn register(&mut self, item: ItemId) {
        self.clock += 1;
        let stamp = self.clock;
        self.library.entry(item).or_insert(AssetDates {
            created: stamp,
            modified: stamp,
        });
    }

    /// Change the access level.
    pub fn set_access(&mut self, access: AccessLevel) {
        self.access = access;
    }

    /// Reject the next mutating call with `reason`.
    pub fn fail_next(&mut self, reason: impl Into<String>) {
        self.pending_failure = Some(reason.into());
    }

    /// Current content of `collection`, if it exists.
    #[must_use]
    pub fn items(&self, collection: &CollectionId) -> Option<&[ItemId]> {
        self.collections.get(collection).map(Vec::as_slice)
    }

    /// Remove an item from the library and every collection, as if the user
    /// deleted it in another app.
    pub fn delete_externally(&mut self, item: &ItemId) {
        self.library.remove(item);
        for items in self.collections.values_mut() {
            items.retain(|i| i != item);
        }
    }

    /// Append a new item to `collection` from outside the app.
    pub fn add_externally(&mut self, collection: &CollectionId, item: &str) {
        let item = ItemId::new(item);
        self.register(item.clone());
        if let Some(items) = self.collections.get_mut(collection) {
            items.push(item);
        }
    }

    fn check_failure(&mut self) -> Result<(), AssetStoreError> {
        match self.pending_failure.take() {
            Some(reason) => Err(AssetStoreError::Rejected(reason)),
            None => Ok(()),
        }
    }

    fn check_items(&self, items: &[ItemId]) -> Result<(), AssetStoreError> {
        match items.iter().find(|i| !self.library.contains_key(*i)) {
            Some(missing) => Err(AssetStoreError::UnknownItem(missing.clone())),
            None => Ok(()),
        }
    }

    fn collection(&self, collection: &CollectionId) -> Result<&Vec<ItemId>, AssetStoreError> {
        self.collections
            .get(collection)
            .ok_or_else(|| AssetStoreError::UnknownCollection(collection.clone()))
    }

    fn collection_mut(
        &mut self,
        collection: &CollectionId,
    ) -> Result<&mut Vec<ItemId>, AssetStoreError> {
        self.collections
            .get_mut(collection)
            .ok_or_else(|| AssetStoreError::UnknownCollection(collection.clone()))
    }
}

impl AssetStore for MemoryAssetStore {
    fn access(&self) -> AccessLevel {
        self.access
    }

    fn contains(&self, item: &ItemId) -> bool {
        self.library.contains_key(item)
    }

    fn fetch_items(
        &self,
        collection: &CollectionId,
        sort: Option<SortKey>,
    ) -> Result<Vec<ItemId>, AssetStoreError> {
        let mut items = self.collection(collection)?.clone();
        if let Some(key) = sort {
            let stamp = |item: &ItemId| {
                let dates = self.library.get(item).copied().unwrap_or_default();
                match key {
                    SortKey::CreationDate => dates.created,
                    SortKey::ModificationDate => dates.modified,
                }
            };
            items.sort_by(|a, b| stamp(b).cmp(&stamp(a)));
        }
        Ok(items)
    }

    fn replace_all(
        &mut self,
        collection: &CollectionId,
        order: &[ItemId],
    ) -> Result<(), AssetStoreError> {
        self.collection(collection)?;
        self.check_items(order)?;
        self.check_failure()?;
        *self.collection_mut(collection)? = order.to_vec();
        Ok(())
    }

    fn remove(&mut self, collection: &CollectionId, items: &[ItemId]) -> Result<(), AssetStoreError> {
        self.collection(collection)?;
        self.check_failure()?;
        let gone: AHashSet<&ItemId> = items.iter().collect();
        self.collection_mut(collection)?
            .retain(|i| !gone.contains(i));
        Ok(())
    }

    fn move_items(
        &mut self,
        items: &[ItemId],
        from: &CollectionId,
        to: &CollectionId,
    ) -> Result<(), AssetStoreError> {
        self.collection(from)?;
        self.collection(to)?;
        self.check_items(items)?;
        self.check_failure()?;
        let moving: AHashSet<&ItemId> = items.iter().collect();
        self.collection_mut(from)?.retain(|i| !moving.contains(i));
        let target = self.collection_mut(to)?;
        for item in items {
            if !target.contains(item) {
                target.push(item.clone());
            }
        }
        Ok(())
    }

    fn add(&mut self, items: &[ItemId], collection: &CollectionId) -> Result<(), AssetStoreError> {
        let len = self.collection(collection)?.len();
        self.insert(items, collection, len)
    }

    fn insert(
        &mut self,
        items: &[ItemId],
        collection: &CollectionId,
        index: usize,
    ) -> Result<(), AssetStoreError> {
        self.collection(collection)?;
        self.check_items(items)?;
        self.check_failure()?;
        let target = self.collection_mut(collection)?;
        let mut fresh: Vec<ItemId> = Vec::with_capacity(items.len());
        for item in items {
            if !target.contains(item) && !fresh.contains(item) {
                fresh.push(item.clone());
            }
        }
        let at = index.min(target.len());
        target.splice(at..at, fresh);
        Ok(())
    }
}
