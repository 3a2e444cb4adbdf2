#![forbid(unsafe_code)]

//! Recorded actions and the store operations that invert or replay them.
//!
//! An [`UndoAction`] snapshots everything needed to go both ways at the
//! moment it is recorded. The asset store may have changed by the time undo
//! or redo runs, so nothing is re-queried from it.
//!
//! | Kind  | Undo                                   | Redo                          |
//! |-------|----------------------------------------|-------------------------------|
//! | Sort  | replace all with `original`            | replace all with `sorted`     |
//! | Delete| add `items` back to `collection`       | remove `items` again          |
//! | Move  | move `items` destination -> source     | move source -> destination    |
//! | Copy  | remove `items` from `destination`      | add `items` to `destination`  |
//! | Paste | remove `items` from `destination`      | insert `items` at `index`     |

use std::fmt;

use albumkit_core::{CollectionId, ItemId};
use web_time::Instant;

/// What was done, with the data needed to invert it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoKind {
    /// A collection was reordered from `original` to `sorted`.
    Sort {
        collection: CollectionId,
        original: Vec<ItemId>,
        sorted: Vec<ItemId>,
    },
    /// `items` were removed from `collection`.
    Delete {
        collection: CollectionId,
        items: Vec<ItemId>,
    },
    /// `items` were moved from `source` to `destination`.
    Move {
        source: CollectionId,
        destination: CollectionId,
        items: Vec<ItemId>,
    },
    /// `items` were appended to `destination`.
    Copy {
        items: Vec<ItemId>,
        destination: CollectionId,
    },
    /// `items` were inserted into `destination` at `index`.
    Paste {
        items: Vec<ItemId>,
        destination: CollectionId,
        index: usize,
    },
}

/// A single asset-store mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    ReplaceAll {
        collection: CollectionId,
        order: Vec<ItemId>,
    },
    Remove {
        collection: CollectionId,
        items: Vec<ItemId>,
    },
    Add {
        collection: CollectionId,
        items: Vec<ItemId>,
    },
    Move {
        items: Vec<ItemId>,
        from: CollectionId,
        to: CollectionId,
    },
    Insert {
        collection: CollectionId,
        items: Vec<ItemId>,
        index: usize,
    },
}

impl StoreOp {
    /// Whether applying this op changes `collection`.
    #[must_use]
    pub fn touches(&self, collection: &CollectionId) -> bool {
        match self {
            Self::ReplaceAll { collection: c, .. }
            | Self::Remove { collection: c, .. }
            | Self::Add { collection: c, .. }
            | Self::Insert { collection: c, .. } => c == collection,
            Self::Move { from, to, .. } => from == collection || to == collection,
        }
    }
}

/// A recorded, invertible action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoAction {
    kind: UndoKind,
    recorded_at: Instant,
    description: String,
}

impl UndoAction {
    /// Record `kind` now, with a generated description.
    #[must_use]
    pub fn new(kind: UndoKind) -> Self {
        let description = describe(&kind);
        Self {
            kind,
            recorded_at: Instant::now(),
            description,
        }
    }

    #[must_use]
    pub fn sort(collection: CollectionId, original: Vec<ItemId>, sorted: Vec<ItemId>) -> Self {
        Self::new(UndoKind::Sort {
            collection,
            original,
            sorted,
        })
    }

    #[must_use]
    pub fn delete(collection: CollectionId, items: Vec<ItemId>) -> Self {
        Self::new(UndoKind::Delete { collection, items })
    }

    #[must_use]
    pub fn moved(source: CollectionId, destination: CollectionId, items: Vec<ItemId>) -> Self {
        Self::new(UndoKind::Move {
            source,
            destination,
            items,
        })
    }

    #[must_use]
    pub fn copy(items: Vec<ItemId>, destination: CollectionId) -> Self {
        Self::new(UndoKind::Copy { items, destination })
    }

    #[must_use]
    pub fn paste(items: Vec<ItemId>, destination: CollectionId, index: usize) -> Self {
        Self::new(UndoKind::Paste {
            items,
            destination,
            index,
        })
    }

    #[must_use]
    pub fn kind(&self) -> &UndoKind {
        &self.kind
    }

    /// Human-readable description for menus.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// When the action was recorded.
    #[must_use]
    pub fn recorded_at(&self) -> Instant {
        self.recorded_at
    }

    /// Approximate heap plus inline size, for history budgeting.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        let ids = |items: &[ItemId]| -> usize {
            items
                .iter()
                .map(|i| std::mem::size_of::<ItemId>() + i.as_str().len())
                .sum()
        };
        let payload = match &self.kind {
            UndoKind::Sort {
                original, sorted, ..
            } => ids(original) + ids(sorted),
            UndoKind::Delete { items, .. }
            | UndoKind::Move { items, .. }
            | UndoKind::Copy { items, .. }
            | UndoKind::Paste { items, .. } => ids(items),
        };
        std::mem::size_of::<Self>() + self.description.len() + payload
    }

    /// The operation that reverts this action.
    #[must_use]
    pub fn undo_op(&self) -> StoreOp {
        match &self.kind {
            UndoKind::Sort {
                collection,
                original,
                ..
            } => StoreOp::ReplaceAll {
                collection: collection.clone(),
                order: original.clone(),
            },
            UndoKind::Delete { collection, items } => StoreOp::Add {
                collection: collection.clone(),
                items: items.clone(),
            },
            UndoKind::Move {
                source,
                destination,
                items,
            } => StoreOp::Move {
                items: items.clone(),
                from: destination.clone(),
                to: source.clone(),
            },
            UndoKind::Copy { items, destination } | UndoKind::Paste {
                items, destination, ..
            } => StoreOp::Remove {
                collection: destination.clone(),
                items: items.clone(),
            },
        }
    }

    /// The operation that performs this action again.
    #[must_use]
    pub fn redo_op(&self) -> StoreOp {
        match &self.kind {
            UndoKind::Sort {
                collection, sorted, ..
            } => StoreOp::ReplaceAll {
                collection: collection.clone(),
                order: sorted.clone(),
            },
            UndoKind::Delete { collection, items } => StoreOp::Remove {
                collection: collection.clone(),
                items: items.clone(),
            },
            UndoKind::Move {
                source,
                destination,
                items,
            } => StoreOp::Move {
                items: items.clone(),
                from: source.clone(),
                to: destination.clone(),
            },
            UndoKind::Copy { items, destination } => StoreOp::Add {
                collection: destination.clone(),
                items: items.clone(),
            },
            UndoKind::Paste {
                items,
                destination,
                index,
            } => StoreOp::Insert {
                collection: destination.clone(),
                items: items.clone(),
                index: *index,
            },
        }
    }
}

impl fmt::Display for UndoAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

fn describe(kind: &UndoKind) -> String {
    let (verb, count) = match kind {
        UndoKind::Sort { sorted, .. } => ("Sort", sorted.len()),
        UndoKind::Delete { items, .. } => ("Delete", items.len()),
        UndoKind::Move { items, .. } => ("Move", items.len()),
        UndoKind::Copy { items, .. } => ("Copy", items.len()),
        UndoKind::Paste { items, .. } => ("Paste", items.len()),
    };
    let noun = if count == 1 { "photo" } else { "photos" };
    format!("{verb} {count} {noun}")
}
