#![forbid(unsafe_code)]

//! Paragraph headers and the visibility filter.
//!
//! A header item starts a paragraph that runs up to, but not including, the
//! next header. A collapsed paragraph hides everything except its header.
//! Items before the first header form an implicit paragraph that is always
//! visible.
//!
//! Header membership and the collapsed flag are independent of selection and
//! anchoring: an item can be a header and selected at the same time.

use ahash::{AHashMap, AHashSet};

use crate::item::ItemId;

/// Headers of one collection and their collapsed flags.
///
/// Headers are kept in the order they were designated, which is also the
/// order they are persisted in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    headers: Vec<ItemId>,
    collapsed: AHashMap<ItemId, bool>,
}

/// One paragraph of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    /// Header item, or `None` for leading ungrouped items.
    pub header: Option<ItemId>,
    /// Whether the paragraph is collapsed. Always false without a header.
    pub collapsed: bool,
    /// Items following the header (the header itself is not included).
    pub items: Vec<ItemId>,
}

impl HeaderSet {
    /// An empty header set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted parts.
    ///
    /// Collapse flags for ids that are not headers are kept; they take effect
    /// if the id becomes a header again.
    #[must_use]
    pub fn from_parts(headers: Vec<ItemId>, collapsed: impl IntoIterator<Item = ItemId>) -> Self {
        let mut set = Self::default();
        for header in headers {
            set.set_header(header);
        }
        for item in collapsed {
            set.collapsed.insert(item, true);
        }
        set
    }

    /// Headers in designation order.
    #[must_use]
    pub fn headers(&self) -> &[ItemId] {
        &self.headers
    }

    /// Ids whose collapsed flag is set, in header order first, then the rest
    /// sorted for stable persistence.
    #[must_use]
    pub fn collapsed_items(&self) -> Vec<ItemId> {
        let mut out: Vec<ItemId> = self
            .headers
            .iter()
            .filter(|h| self.is_collapsed(h))
            .cloned()
            .collect();
        let mut rest: Vec<ItemId> = self
            .collapsed
            .iter()
            .filter(|(item, flag)| **flag && !self.headers.contains(item))
            .map(|(item, _)| item.clone())
            .collect();
        rest.sort();
        out.extend(rest);
        out
    }

    /// Number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// True when there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Whether `item` is a header.
    #[must_use]
    pub fn is_header(&self, item: &ItemId) -> bool {
        self.headers.contains(item)
    }

    /// Stored collapsed flag for `item`.
    #[must_use]
    pub fn is_collapsed(&self, item: &ItemId) -> bool {
        self.collapsed.get(item).copied().unwrap_or(false)
    }

    /// Designate `item` as a header. Returns false if it already was one.
    pub fn set_header(&mut self, item: ItemId) -> bool {
        if self.is_header(&item) {
            return false;
        }
        self.headers.push(item);
        true
    }

    /// Remove `item` from the headers, dropping its collapsed flag.
    pub fn remove_header(&mut self, item: &ItemId) -> bool {
        let before = self.headers.len();
        self.headers.retain(|h| h != item);
        self.collapsed.remove(item);
        self.headers.len() != before
    }

    /// Flip the collapsed flag of `header` and return the new value.
    ///
    /// Visibility is not recomputed; call [`visible_items`] again.
    pub fn toggle_collapse(&mut self, header: &ItemId) -> bool {
        let flag = self.collapsed.entry(header.clone()).or_insert(false);
        *flag = !*flag;
        *flag
    }

    /// Drop headers (and flags) whose item is not in `present`. Returns how
    /// many headers were removed.
    pub fn retain_present(&mut self, present: &[ItemId]) -> usize {
        let present: AHashSet<&ItemId> = present.iter().collect();
        let before = self.headers.len();
        self.headers.retain(|h| present.contains(h));
        self.collapsed.retain(|item, _| present.contains(item));
        before - self.headers.len()
    }

    /// Split `full_order` into paragraphs.
    #[must_use]
    pub fn paragraphs(&self, full_order: &[ItemId]) -> Vec<Paragraph> {
        let headers: AHashSet<&ItemId> = self.headers.iter().collect();
        let mut out: Vec<Paragraph> = Vec::new();
        for item in full_order {
            if headers.contains(item) {
                out.push(Paragraph {
                    header: Some(item.clone()),
                    collapsed: self.is_collapsed(item),
                    items: Vec::new(),
                });
                continue;
            }
            match out.last_mut() {
                Some(paragraph) => paragraph.items.push(item.clone()),
                None => out.push(Paragraph {
                    header: None,
                    collapsed: false,
                    items: vec![item.clone()],
                }),
            }
        }
        out
    }
}

/// Items of `full_order` that should be exposed for display and selection.
///
/// Headers are always visible; non-header items are visible unless the
/// paragraph they belong to is collapsed. Runs in one pass over
/// `full_order`.
#[must_use]
pub fn visible_items(full_order: &[ItemId], headers: &HeaderSet) -> Vec<ItemId> {
    let header_ids: AHashSet<&ItemId> = headers.headers.iter().collect();
    let mut hidden = false;
    let mut out = Vec::with_capacity(full_order.len());
    for item in full_order {
        if header_ids.contains(item) {
            hidden = headers.is_collapsed(item);
            out.push(item.clone());
        } else if !hidden {
            out.push(item.clone());
        }
    }
    out
}
