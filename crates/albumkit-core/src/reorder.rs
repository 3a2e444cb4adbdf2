#![forbid(unsafe_code)]

//! Move selected items next to a base item.
//!
//! The base item is the anchor when one is set, otherwise the item with
//! selection rank 1. Every other selected item (a "mover") is lifted out of
//! the full order and reinserted, as one contiguous block in selection
//! order, directly after the base. The base itself never moves relative to
//! the unselected items, which makes the operation idempotent for a fixed
//! selection.
//!
//! ```text
//! full order  X A Y B Z C      selection A(1) B(2) C(3), no anchor
//! base        A
//! movers      B C
//! result      X A B C Y Z
//! ```

use ahash::AHashSet;

use crate::item::ItemId;
use crate::selection::SelectionModel;

/// Reasons a reorder cannot be computed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReorderError {
    /// Fewer than two items are selected.
    #[error("at least two items must be selected to reorder (selected {selected})")]
    InsufficientSelection { selected: usize },
    /// The base item is missing from the full order.
    #[error("base item {0} is not part of the collection")]
    AnchorNotFound(ItemId),
    /// A selected item is missing from the full order.
    #[error("selected item {0} is not part of the collection")]
    StaleSelection(ItemId),
}

/// A resolved reorder: the base item and the movers in selection order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderPlan {
    pub base: ItemId,
    pub movers: Vec<ItemId>,
}

impl ReorderPlan {
    /// Resolve base and movers from `selection`.
    pub fn from_selection(selection: &SelectionModel) -> Result<Self, ReorderError> {
        let selected = selection.selected_items_in_order();
        if selected.len() < 2 {
            return Err(ReorderError::InsufficientSelection {
                selected: selected.len(),
            });
        }
        let base = match selection.anchor() {
            Some(anchor) => anchor.clone(),
            None => selected[0].clone(),
        };
        let movers = selected.iter().filter(|i| **i != base).cloned().collect();
        Ok(Self { base, movers })
    }

    /// Apply the plan to `full_order`, returning the new full order.
    pub fn apply(&self, full_order: &[ItemId]) -> Result<Vec<ItemId>, ReorderError> {
        let movers: AHashSet<&ItemId> = self.movers.iter().collect();
        let mut present = 0usize;
        let mut result: Vec<ItemId> = Vec::with_capacity(full_order.len());
        for item in full_order {
            if movers.contains(item) {
                present += 1;
            } else {
                result.push(item.clone());
            }
        }
        if present != movers.len() {
            let missing = self
                .movers
                .iter()
                .find(|m| !full_order.contains(m))
                .cloned()
                .unwrap_or_else(|| self.base.clone());
            return Err(ReorderError::StaleSelection(missing));
        }

        let base_index = result
            .iter()
            .position(|item| *item == self.base)
            .ok_or_else(|| ReorderError::AnchorNotFound(self.base.clone()))?;
        result.splice(base_index + 1..base_index + 1, self.movers.iter().cloned());
        Ok(result)
    }
}

/// Compute the new full order for `selection` applied to `full_order`.
pub fn reorder(full_order: &[ItemId], selection: &SelectionModel) -> Result<Vec<ItemId>, ReorderError> {
    let plan = ReorderPlan::from_selection(selection)?;
    let result = plan.apply(full_order)?;
    #[cfg(feature = "tracing")]
    tracing::debug!(
        message = "reorder.apply",
        base = plan.base.as_str(),
        movers = plan.movers.len(),
        len = result.len(),
    );
    Ok(result)
}
