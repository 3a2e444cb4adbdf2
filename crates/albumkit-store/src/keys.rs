#![forbid(unsafe_code)]

//! Storage key layout, one key per concern per collection.

use albumkit_core::CollectionId;

/// Key of the saved custom order.
#[must_use]
pub fn custom_order(collection: &CollectionId) -> String {
    format!("custom_order.{collection}")
}

/// Key of the ordered header list.
#[must_use]
pub fn headers(collection: &CollectionId) -> String {
    format!("headers.{collection}")
}

/// Key of the collapsed-header list.
#[must_use]
pub fn collapsed(collection: &CollectionId) -> String {
    format!("collapsed.{collection}")
}

/// Key of the sort preference.
#[must_use]
pub fn sort_preference(collection: &CollectionId) -> String {
    format!("sort_preference.{collection}")
}
