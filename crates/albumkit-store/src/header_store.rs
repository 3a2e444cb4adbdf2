#![forbid(unsafe_code)]

//! Persisted paragraph headers and their collapsed flags.
//!
//! Each collection stores two string lists: the headers in designation
//! order, and the ids whose paragraph is collapsed. Every mutating call
//! loads, edits, and writes back, so the backend is always current.

use std::sync::Arc;

use albumkit_core::{CollectionId, HeaderSet, ItemId};

use crate::backend::KeyValueStore;
use crate::error::StoreResult;
use crate::keys;

/// Header persistence for any number of collections.
#[derive(Clone)]
pub struct HeaderStore {
    backend: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for HeaderStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeaderStore").finish_non_exhaustive()
    }
}

impl HeaderStore {
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Headers and collapsed flags of `collection`.
    pub fn load(&self, collection: &CollectionId) -> StoreResult<HeaderSet> {
        let headers = self.read_ids(&keys::headers(collection))?;
        let collapsed = self.read_ids(&keys::collapsed(collection))?;
        Ok(HeaderSet::from_parts(headers, collapsed))
    }

    /// Overwrite the stored headers of `collection` with `set`.
    pub fn save(&self, collection: &CollectionId, set: &HeaderSet) -> StoreResult<()> {
        self.write_ids(&keys::headers(collection), set.headers())?;
        self.write_ids(&keys::collapsed(collection), &set.collapsed_items())
    }

    /// Designate `item` as a header. Returns false if it already was one.
    pub fn set_header(&self, collection: &CollectionId, item: &ItemId) -> StoreResult<bool> {
        let mut set = self.load(collection)?;
        if !set.set_header(item.clone()) {
            return Ok(false);
        }
        self.save(collection, &set)?;
        tracing::debug!(
            message = "header.set",
            collection = collection.as_str(),
            item = item.as_str(),
        );
        Ok(true)
    }

    /// Remove `item` from the headers and drop its collapsed flag.
    pub fn remove_header(&self, collection: &CollectionId, item: &ItemId) -> StoreResult<bool> {
        let mut set = self.load(collection)?;
        let removed = set.remove_header(item);
        self.save(collection, &set)?;
        if removed {
            tracing::debug!(
                message = "header.remove",
                collection = collection.as_str(),
                item = item.as_str(),
            );
        }
        Ok(removed)
    }

    /// Whether `item` is a header of `collection`.
    pub fn is_header(&self, collection: &CollectionId, item: &ItemId) -> StoreResult<bool> {
        Ok(self.load(collection)?.is_header(item))
    }

    /// Flip and persist the collapsed flag of `header`. Returns the new flag.
    pub fn toggle_collapse(&self, collection: &CollectionId, header: &ItemId) -> StoreResult<bool> {
        let mut set = self.load(collection)?;
        let collapsed = set.toggle_collapse(header);
        self.save(collection, &set)?;
        tracing::debug!(
            message = "header.toggle_collapse",
            collection = collection.as_str(),
            header = header.as_str(),
            collapsed,
        );
        Ok(collapsed)
    }

    /// Remove all header data of `collection`.
    pub fn clear(&self, collection: &CollectionId) -> StoreResult<()> {
        self.backend.remove(&keys::headers(collection))?;
        self.backend.remove(&keys::collapsed(collection))
    }

    /// Drop headers whose item is not in `present`. Returns how many were
    /// removed; storage is only rewritten when something changed.
    pub fn cleanup_invalid(
        &self,
        collection: &CollectionId,
        present: &[ItemId],
    ) -> StoreResult<usize> {
        let mut set = self.load(collection)?;
        let stale_flags = set.collapsed_items().len();
        let removed = set.retain_present(present);
        if removed > 0 || set.collapsed_items().len() != stale_flags {
            self.save(collection, &set)?;
        }
        if removed > 0 {
            tracing::info!(
                message = "header.cleanup",
                collection = collection.as_str(),
                removed,
            );
        }
        Ok(removed)
    }

    fn read_ids(&self, key: &str) -> StoreResult<Vec<ItemId>> {
        Ok(self
            .backend
            .get_list(key)?
            .unwrap_or_default()
            .into_iter()
            .map(ItemId::new)
            .collect())
    }

    fn write_ids(&self, key: &str, items: &[ItemId]) -> StoreResult<()> {
        let raw: Vec<String> = items.iter().map(|i| i.as_str().to_owned()).collect();
        self.backend.set_list(key, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryStore;
    use albumkit_core::{ids, visible_items};

    fn setup() -> (HeaderStore, CollectionId) {
        (
            HeaderStore::new(Arc::new(MemoryStore::new())),
            CollectionId::new("album"),
        )
    }

    fn id(s: &str) -> ItemId {
        ItemId::new(s)
    }

    #[test]
    fn empty_collection_has_no_headers() {
        let (store, c) = setup();
        assert!(store.load(&c).unwrap().is_empty());
        assert!(!store.is_header(&c, &id("a")).unwrap());
    }

    #[test]
    fn set_header_persists_once() {
        let (store, c) = setup();
        assert!(store.set_header(&c, &id("h")).unwrap());
        assert!(!store.set_header(&c, &id("h")).unwrap());
        assert!(store.is_header(&c, &id("h")).unwrap());
        assert_eq!(store.load(&c).unwrap().headers(), &ids(["h"])[..]);
    }

    #[test]
    fn toggle_collapse_persists_and_drives_visibility() {
        let (store, c) = setup();
        store.set_header(&c, &id("h")).unwrap();
        assert!(store.toggle_collapse(&c, &id("h")).unwrap());

        let full = ids(["a", "h", "b"]);
        let set = store.load(&c).unwrap();
        assert_eq!(visible_items(&full, &set), ids(["a", "h"]));

        assert!(!store.toggle_collapse(&c, &id("h")).unwrap());
        assert_eq!(visible_items(&full, &store.load(&c).unwrap()), full);
    }

    #[test]
    fn remove_header_drops_collapse_flag() {
        let (store, c) = setup();
        store.set_header(&c, &id("h")).unwrap();
        store.toggle_collapse(&c, &id("h")).unwrap();
        assert!(store.remove_header(&c, &id("h")).unwrap());
        store.set_header(&c, &id("h")).unwrap();
        assert!(!store.load(&c).unwrap().is_collapsed(&id("h")));
    }

    #[test]
    fn cleanup_invalid_removes_missing_headers() {
        let (store, c) = setup();
        store.set_header(&c, &id("h1")).unwrap();
        store.set_header(&c, &id("h2")).unwrap();
        store.toggle_collapse(&c, &id("h2")).unwrap();
        assert_eq!(store.cleanup_invalid(&c, &ids(["h1", "x"])).unwrap(), 1);
        let set = store.load(&c).unwrap();
        assert_eq!(set.headers(), &ids(["h1"])[..]);
        assert!(set.collapsed_items().is_empty());
        assert_eq!(store.cleanup_invalid(&c, &ids(["h1"])).unwrap(), 0);
    }

    #[test]
    fn clear_wipes_collection_only() {
        let (store, c) = setup();
        let other = CollectionId::new("other");
        store.set_header(&c, &id("h")).unwrap();
        store.set_header(&other, &id("h")).unwrap();
        store.clear(&c).unwrap();
        assert!(store.load(&c).unwrap().is_empty());
        assert!(store.is_header(&other, &id("h")).unwrap());
    }
}
