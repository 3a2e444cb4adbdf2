#![forbid(unsafe_code)]

//! Typed selection events.
//!
//! The interaction controller queues one event per observable change. UI
//! layers drain the queue and match on the variants instead of implementing
//! a delegate with optional callbacks.

use crate::item::ItemId;

/// A change the UI may want to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    /// `item` at display `index` became selected with the given rank.
    SelectedAt {
        index: usize,
        item: ItemId,
        rank: usize,
    },
    /// `item` at display `index` was deselected.
    DeselectedAt { index: usize, item: ItemId },
    /// Emitted once after every batch of selection changes.
    SelectionChanged { count: usize },
    /// The anchor moved to `item`, or was cleared when `None`.
    AnchorSet { item: Option<ItemId> },
    /// The user asked to paste at display `index`.
    PasteRequested { index: usize },
}

impl SelectionEvent {
    /// Display index the event refers to, if any.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::SelectedAt { index, .. }
            | Self::DeselectedAt { index, .. }
            | Self::PasteRequested { index } => Some(*index),
            Self::SelectionChanged { .. } | Self::AnchorSet { .. } => None,
        }
    }
}
