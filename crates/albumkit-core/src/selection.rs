#![forbid(unsafe_code)]

//! Ranked multi-selection with an independent anchor.
//!
//! Every selected item carries a rank: its 1-based position in the order the
//! user selected things. Ranks are what the reorder engine uses to lay the
//! moved items out, so they must stay meaningful under arbitrary
//! select/deselect sequences.
//!
//! # Invariants
//!
//! 1. The ranks of the selected items are exactly `1..=len()`, no gaps and
//!    no duplicates.
//! 2. Removing the item with rank `r` decrements every rank above `r` by one
//!    and leaves the others untouched.
//! 3. The anchor may name an unselected item, but it is cleared whenever the
//!    anchored item is deselected, pruned, or the selection is cleared.

use ahash::{AHashMap, AHashSet};

use crate::item::ItemId;

/// Items that changed in one selection mutation, in the order they changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionChange {
    /// Newly selected items.
    pub selected: Vec<ItemId>,
    /// Newly deselected items.
    pub deselected: Vec<ItemId>,
    /// Whether the anchor was cleared as a side effect.
    pub anchor_cleared: bool,
}

impl SelectionChange {
    /// True when nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty() && self.deselected.is_empty() && !self.anchor_cleared
    }
}

/// Selected items in selection order, plus an optional anchor.
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    /// Selected items; the item at position `i` has rank `i + 1`.
    order: Vec<ItemId>,
    /// Rank lookup for `order`.
    ranks: AHashMap<ItemId, usize>,
    anchor: Option<ItemId>,
}

impl SelectionModel {
    /// Create an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Number of selected items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether `item` is selected.
    #[must_use]
    pub fn is_selected(&self, item: &ItemId) -> bool {
        self.ranks.contains_key(item)
    }

    /// 1-based selection rank of `item`, if selected.
    #[must_use]
    pub fn rank_of(&self, item: &ItemId) -> Option<usize> {
        self.ranks.get(item).copied()
    }

    /// Selected items sorted by ascending rank.
    ///
    /// This is the selection order, which is unrelated to display order.
    #[must_use]
    pub fn selected_items_in_order(&self) -> &[ItemId] {
        &self.order
    }

    /// Item holding rank 1, if anything is selected.
    #[must_use]
    pub fn first_selected(&self) -> Option<&ItemId> {
        self.order.first()
    }

    /// Current anchor, if set.
    #[must_use]
    pub fn anchor(&self) -> Option<&ItemId> {
        self.anchor.as_ref()
    }

    // ========================================================================
    // Single-item mutation
    // ========================================================================

    /// Select `item` with rank `len() + 1`. Returns false if it was already
    /// selected.
    pub fn select(&mut self, item: &ItemId) -> bool {
        if self.ranks.contains_key(item) {
            return false;
        }
        self.order.push(item.clone());
        self.ranks.insert(item.clone(), self.order.len());
        #[cfg(feature = "tracing")]
        self.log_change("select", item);
        true
    }

    /// Deselect `item`, renumbering the ranks above it. Returns the rank the
    /// item held, or `None` if it was not selected.
    ///
    /// Clears the anchor when `item` is the anchor.
    pub fn deselect(&mut self, item: &ItemId) -> Option<usize> {
        let rank = self.ranks.remove(item)?;
        self.order.remove(rank - 1);
        for moved in &self.order[rank - 1..] {
            if let Some(r) = self.ranks.get_mut(moved) {
                *r -= 1;
            }
        }
        if self.anchor.as_ref() == Some(item) {
            self.anchor = None;
        }
        #[cfg(feature = "tracing")]
        self.log_change("deselect", item);
        Some(rank)
    }

    /// Deselect `item` if selected, otherwise select it.
    pub fn toggle(&mut self, item: &ItemId) -> SelectionChange {
        let mut change = SelectionChange::default();
        if self.is_selected(item) {
            let had_anchor = self.anchor.as_ref() == Some(item);
            self.deselect(item);
            change.deselected.push(item.clone());
            change.anchor_cleared = had_anchor;
        } else {
            self.select(item);
            change.selected.push(item.clone());
        }
        change
    }

    /// Toggle the item at `index` of `display`.
    ///
    /// An index outside `display` is a no-op and yields `None`.
    pub fn toggle_at(&mut self, display: &[ItemId], index: usize) -> Option<SelectionChange> {
        let item = display.get(index)?;
        Some(self.toggle(item))
    }

    // ========================================================================
    // Range mutation
    // ========================================================================

    /// Whether every item of `display[low..=high]` is selected.
    ///
    /// The bounds are clamped to `display`; an empty interval is never
    /// considered fully selected.
    #[must_use]
    pub fn is_range_selected(&self, display: &[ItemId], low: usize, high: usize) -> bool {
        match clamp_range(display.len(), low, high) {
            Some((low, high)) => display[low..=high].iter().all(|i| self.is_selected(i)),
            None => false,
        }
    }

    /// Select every not-yet-selected item of `display[low..=high]`.
    ///
    /// The interval is walked from `high` down to `low` when `reverse` is
    /// set, otherwise from `low` up to `high`; each newly selected item gets
    /// the next free rank in that traversal order.
    pub fn range_select(
        &mut self,
        display: &[ItemId],
        low: usize,
        high: usize,
        reverse: bool,
    ) -> SelectionChange {
        let mut change = SelectionChange::default();
        let Some((low, high)) = clamp_range(display.len(), low, high) else {
            return change;
        };
        let window = &display[low..=high];
        let mut visit = |item: &ItemId| {
            if self.select(item) {
                change.selected.push(item.clone());
            }
        };
        if reverse {
            window.iter().rev().for_each(&mut visit);
        } else {
            window.iter().for_each(&mut visit);
        }
        change
    }

    /// Deselect every selected item of `display[low..=high]`, in ascending
    /// index order regardless of the direction the range was drawn in.
    pub fn range_deselect(&mut self, display: &[ItemId], low: usize, high: usize) -> SelectionChange {
        let mut change = SelectionChange::default();
        let Some((low, high)) = clamp_range(display.len(), low, high) else {
            return change;
        };
        for item in &display[low..=high] {
            let had_anchor = self.anchor.as_ref() == Some(item);
            if self.deselect(item).is_some() {
                change.deselected.push(item.clone());
                change.anchor_cleared |= had_anchor;
            }
        }
        change
    }

    // ========================================================================
    // Whole-selection mutation
    // ========================================================================

    /// Empty the selection and clear the anchor.
    pub fn clear(&mut self) -> SelectionChange {
        let change = SelectionChange {
            selected: Vec::new(),
            deselected: std::mem::take(&mut self.order),
            anchor_cleared: self.anchor.take().is_some(),
        };
        self.ranks.clear();
        change
    }

    /// Drop every selected item (and the anchor) that is not in `present`.
    ///
    /// Used after the collection was refreshed and items may have been
    /// deleted externally.
    pub fn retain_present(&mut self, present: &[ItemId]) -> SelectionChange {
        let present: AHashSet<&ItemId> = present.iter().collect();
        let mut change = SelectionChange::default();
        let gone: Vec<ItemId> = self
            .order
            .iter()
            .filter(|item| !present.contains(item))
            .cloned()
            .collect();
        for item in gone {
            let had_anchor = self.anchor.as_ref() == Some(&item);
            self.deselect(&item);
            change.anchor_cleared |= had_anchor;
            change.deselected.push(item);
        }
        if self.anchor.as_ref().is_some_and(|a| !present.contains(a)) {
            self.anchor = None;
            change.anchor_cleared = true;
        }
        change
    }

    // ========================================================================
    // Anchor
    // ========================================================================

    /// Set the anchor to `item`, selected or not. Returns the previous anchor.
    pub fn set_anchor(&mut self, item: ItemId) -> Option<ItemId> {
        self.anchor.replace(item)
    }

    /// Clear the anchor. Returns the previous anchor.
    pub fn clear_anchor(&mut self) -> Option<ItemId> {
        self.anchor.take()
    }

    #[cfg(feature = "tracing")]
    fn log_change(&self, action: &str, item: &ItemId) {
        tracing::debug!(
            message = "selection.change",
            action,
            item = item.as_str(),
            rank = self.rank_of(item),
            selected_count = self.len(),
        );
    }
}

/// Clamp `[low, high]` to a list of `len` items. `None` when nothing remains.
fn clamp_range(len: usize, low: usize, high: usize) -> Option<(usize, usize)> {
    let (low, high) = if low <= high { (low, high) } else { (high, low) };
    if len == 0 || low >= len {
        return None;
    }
    Some((low, high.min(len - 1)))
}
