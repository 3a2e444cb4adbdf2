#![forbid(unsafe_code)]

//! Copy/paste of item identifiers.
//!
//! The payload is plain text: identifiers joined with commas, in the order
//! they were selected. That keeps it exchangeable with a system clipboard.

use albumkit_core::ItemId;

const SEPARATOR: &str = ",";

/// Why a copy or paste could not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PasteboardError {
    /// Nothing was selected to copy, or nothing has been copied.
    #[error("nothing to copy or paste")]
    Empty,
    /// None of the copied items exist any more.
    #[error("none of the copied items are available")]
    NoKnownItems,
}

/// Holds the most recently copied identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pasteboard {
    payload: Option<String>,
}

impl Pasteboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a pasteboard from raw text, e.g. read from the system
    /// clipboard.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            payload: Some(text.into()),
        }
    }

    /// Raw payload, if anything was copied.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    /// Copy `items` in the given order. Returns how many were copied.
    ///
    /// Identifiers are joined with `,`, so an identifier containing a comma
    /// does not survive the round trip. Whitespace is kept as is.
    pub fn copy(&mut self, items: &[ItemId]) -> Result<usize, PasteboardError> {
        if items.is_empty() {
            return Err(PasteboardError::Empty);
        }
        let text = items
            .iter()
            .map(ItemId::as_str)
            .collect::<Vec<_>>()
            .join(SEPARATOR);
        tracing::debug!(message = "pasteboard.copy", count = items.len());
        self.payload = Some(text);
        Ok(items.len())
    }

    /// Copied identifiers in copy order. Empty segments are skipped;
    /// nothing is trimmed.
    #[must_use]
    pub fn items(&self) -> Vec<ItemId> {
        self.payload
            .as_deref()
            .map(|text| {
                text.split(SEPARATOR)
                    .filter(|s| !s.is_empty())
                    .map(ItemId::new)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Copied identifiers that `known` still recognizes, in copy order.
    pub fn resolve(&self, known: impl Fn(&ItemId) -> bool) -> Result<Vec<ItemId>, PasteboardError> {
        let items = self.items();
        if items.is_empty() {
            return Err(PasteboardError::Empty);
        }
        let resolved: Vec<ItemId> = items.into_iter().filter(|i| known(i)).collect();
        if resolved.is_empty() {
            return Err(PasteboardError::NoKnownItems);
        }
        Ok(resolved)
    }

    pub fn clear(&mut self) {
        self.payload = None;
    }
}
