#![forbid(unsafe_code)]

//! Index-level description of how one ordering turned into another.
//!
//! Rendering layers apply the diff however they like (batch updates, full
//! reload); the core only reports indices.

use ahash::AHashMap;

use crate::item::ItemId;

/// Changes between an old and a new ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderDiff {
    /// Indices in the old ordering of items that are gone.
    pub removed: Vec<usize>,
    /// Indices in the new ordering of items that are new.
    pub inserted: Vec<usize>,
    /// `(old, new)` index pairs of surviving items whose index changed.
    pub moved: Vec<(usize, usize)>,
}

impl OrderDiff {
    /// Compute the diff from `old` to `new`.
    #[must_use]
    pub fn between(old: &[ItemId], new: &[ItemId]) -> Self {
        let old_index: AHashMap<&ItemId, usize> =
            old.iter().enumerate().map(|(i, item)| (item, i)).collect();
        let new_index: AHashMap<&ItemId, usize> =
            new.iter().enumerate().map(|(i, item)| (item, i)).collect();

        let removed = old
            .iter()
            .enumerate()
            .filter(|(_, item)| !new_index.contains_key(item))
            .map(|(i, _)| i)
            .collect();

        let mut inserted = Vec::new();
        let mut moved = Vec::new();
        for (to, item) in new.iter().enumerate() {
            match old_index.get(item) {
                None => inserted.push(to),
                Some(&from) if from != to => moved.push((from, to)),
                Some(_) => {}
            }
        }

        Self {
            removed,
            inserted,
            moved,
        }
    }

    /// True when both orderings are identical.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.inserted.is_empty() && self.moved.is_empty()
    }
}
