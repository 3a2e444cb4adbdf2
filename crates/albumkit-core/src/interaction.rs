#![forbid(unsafe_code)]

//! Tap, range, and drag selection on top of [`SelectionModel`].
//!
//! The controller turns raw pointer interactions, expressed as indices into
//! the currently displayed items, into selection mutations and a queue of
//! [`SelectionEvent`]s.
//!
//! # Range mode state machine
//!
//! ```text
//!            tap unselected / select, start = i
//!   ┌──────┐ ─────────────────────────────────► ┌─────────────────────┐
//!   │ Idle │                                    │ AwaitingSecondPoint │
//!   └──────┘ ◄───────────────────────────────── └─────────────────────┘
//!              tap unselected / fill [start, i]
//!              tap selected   / deselect it
//! ```
//!
//! Tapping a selected item deselects just that item and returns to `Idle`
//! from either state.
//!
//! # Drag to select
//!
//! The item under the initial touch decides the drag mode: deselecting if it
//! is already selected, selecting otherwise. Every item the touch then
//! crosses is selected or deselected accordingly. Staying over the same item
//! is a no-op until the touch leaves it.

use std::collections::VecDeque;

use ahash::AHashMap;

use crate::event::SelectionEvent;
use crate::item::ItemId;
use crate::selection::{SelectionChange, SelectionModel};

/// How a plain tap is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SelectionMode {
    /// Each tap toggles the tapped item.
    #[default]
    Toggle,
    /// Two taps on unselected items select everything between them.
    Range,
}

/// Progress of a two-tap range selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangePhase {
    /// No range in progress.
    #[default]
    Idle,
    /// First point recorded at display index `start`.
    AwaitingSecondPoint { start: usize },
}

/// Whether an active drag selects or deselects the items it crosses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Selecting,
    Deselecting,
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    mode: DragMode,
    /// Index currently under the touch, `None` while between items.
    current: Option<usize>,
}

/// Interaction front-end for a [`SelectionModel`].
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    model: SelectionModel,
    mode: SelectionMode,
    phase: RangePhase,
    /// Last completed range as `(start, end)` display indices.
    last_range: Option<(usize, usize)>,
    drag: Option<DragState>,
    events: VecDeque<SelectionEvent>,
}

impl SelectionController {
    /// Create a controller with an empty selection.
    #[must_use]
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// The underlying selection.
    #[must_use]
    pub fn selection(&self) -> &SelectionModel {
        &self.model
    }

    /// Current tap interpretation.
    #[must_use]
    pub const fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Current range phase.
    #[must_use]
    pub const fn phase(&self) -> RangePhase {
        self.phase
    }

    /// The `(start, end)` indices of the last completed range, if any.
    #[must_use]
    pub const fn last_range(&self) -> Option<(usize, usize)> {
        self.last_range
    }

    /// Mode of the drag in progress, if any.
    #[must_use]
    pub fn drag_mode(&self) -> Option<DragMode> {
        self.drag.map(|d| d.mode)
    }

    /// Switch tap interpretation, discarding any half-finished range.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        self.mode = mode;
        self.reset_range();
    }

    /// Take every queued event, oldest first.
    pub fn drain_events(&mut self) -> Vec<SelectionEvent> {
        self.events.drain(..).collect()
    }

    // ========================================================================
    // Taps
    // ========================================================================

    /// Handle a tap on `display[index]`.
    ///
    /// Out-of-bounds indices are ignored.
    pub fn tap(&mut self, display: &[ItemId], index: usize) -> SelectionChange {
        let Some(item) = display.get(index) else {
            return SelectionChange::default();
        };

        if self.model.is_selected(item) {
            self.reset_range();
            let change = self.model.toggle(item);
            self.publish(display, &change);
            return change;
        }

        let change = match (self.mode, self.phase) {
            (SelectionMode::Toggle, _) => self.model.toggle(item),
            (SelectionMode::Range, RangePhase::Idle) => {
                self.phase = RangePhase::AwaitingSecondPoint { start: index };
                self.last_range = None;
                self.model.toggle(item)
            }
            (SelectionMode::Range, RangePhase::AwaitingSecondPoint { start }) => {
                self.phase = RangePhase::Idle;
                self.last_range = Some((start, index));
                self.fill_range(display, start, index)
            }
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "selection.tap",
            index,
            phase = ?self.phase,
            selected_count = self.model.len(),
        );
        self.publish(display, &change);
        change
    }

    /// Complete a range between `start` and `end`.
    fn fill_range(&mut self, display: &[ItemId], start: usize, end: usize) -> SelectionChange {
        let (low, high) = (start.min(end), start.max(end));
        if self.model.is_range_selected(display, low, high) {
            self.model.range_deselect(display, low, high)
        } else {
            self.model.range_select(display, low, high, end < start)
        }
    }

    fn reset_range(&mut self) {
        self.phase = RangePhase::Idle;
        self.last_range = None;
    }

    // ========================================================================
    // Drag
    // ========================================================================

    /// Start a drag over `display[index]`.
    ///
    /// Picks the drag mode from the item under the touch and applies it to
    /// that item. Any half-finished range is discarded. Out-of-bounds indices
    /// start nothing.
    pub fn drag_begin(&mut self, display: &[ItemId], index: usize) -> SelectionChange {
        let Some(item) = display.get(index) else {
            self.drag = None;
            return SelectionChange::default();
        };
        self.reset_range();
        let mode = if self.model.is_selected(item) {
            DragMode::Deselecting
        } else {
            DragMode::Selecting
        };
        self.drag = Some(DragState {
            mode,
            current: None,
        });
        self.drag_over(display, Some(index))
    }

    /// Move the active drag over `index`, or between items when `None`.
    pub fn drag_over(&mut self, display: &[ItemId], index: Option<usize>) -> SelectionChange {
        let Some(drag) = self.drag.as_mut() else {
            return SelectionChange::default();
        };
        if drag.current == index {
            return SelectionChange::default();
        }
        drag.current = index;
        let mode = drag.mode;

        let Some(item) = index.and_then(|i| display.get(i)) else {
            return SelectionChange::default();
        };
        let mut change = SelectionChange::default();
        match mode {
            DragMode::Selecting => {
                if self.model.select(item) {
                    change.selected.push(item.clone());
                }
            }
            DragMode::Deselecting => {
                let had_anchor = self.model.anchor() == Some(item);
                if self.model.deselect(item).is_some() {
                    change.deselected.push(item.clone());
                    change.anchor_cleared = had_anchor;
                }
            }
        }
        self.publish(display, &change);
        change
    }

    /// Finish the active drag.
    pub fn drag_end(&mut self) {
        self.drag = None;
    }

    // ========================================================================
    // Whole-selection operations
    // ========================================================================

    /// Empty the selection, clear the anchor, and forget range markers.
    pub fn clear(&mut self) -> SelectionChange {
        self.reset_range();
        self.drag = None;
        let change = self.model.clear();
        self.publish(&[], &change);
        change
    }

    /// Drop selected items (and the anchor) no longer in `present`.
    pub fn retain_present(&mut self, present: &[ItemId]) -> SelectionChange {
        let change = self.model.retain_present(present);
        self.publish(present, &change);
        change
    }

    /// Set the anchor to `item`, or clear it when `None`.
    pub fn set_anchor(&mut self, item: Option<ItemId>) {
        let previous = match item.clone() {
            Some(item) => self.model.set_anchor(item),
            None => self.model.clear_anchor(),
        };
        if previous != item {
            self.events.push_back(SelectionEvent::AnchorSet { item });
        }
    }

    /// Anchor `item`, or clear the anchor if `item` already holds it.
    pub fn toggle_anchor(&mut self, item: &ItemId) {
        if self.model.anchor() == Some(item) {
            self.set_anchor(None);
        } else {
            self.set_anchor(Some(item.clone()));
        }
    }

    /// Queue a paste request at display `index`.
    pub fn request_paste(&mut self, index: usize) {
        self.events.push_back(SelectionEvent::PasteRequested { index });
    }

    /// Queue events describing `change`. Items absent from `display` only
    /// contribute to the summary event.
    fn publish(&mut self, display: &[ItemId], change: &SelectionChange) {
        if change.is_empty() {
            return;
        }
        let positions: AHashMap<&ItemId, usize> =
            display.iter().enumerate().map(|(i, item)| (item, i)).collect();

        for item in &change.deselected {
            if let Some(&index) = positions.get(item) {
                self.events.push_back(SelectionEvent::DeselectedAt {
                    index,
                    item: item.clone(),
                });
            }
        }
        if change.anchor_cleared {
            self.events.push_back(SelectionEvent::AnchorSet { item: None });
        }
        for item in &change.selected {
            if let (Some(&index), Some(rank)) = (positions.get(item), self.model.rank_of(item)) {
                self.events.push_back(SelectionEvent::SelectedAt {
                    index,
                    item: item.clone(),
                    rank,
                });
            }
        }
        self.events.push_back(SelectionEvent::SelectionChanged {
            count: self.model.len(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ids;

    fn order(c: &SelectionController) -> Vec<String> {
        c.selection()
            .selected_items_in_order()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn toggle_mode_taps_toggle() {
        let display = ids(["a", "b", "c"]);
        let mut c = SelectionController::new(SelectionMode::Toggle);
        c.tap(&display, 0);
        c.tap(&display, 2);
        assert_eq!(order(&c), ["a", "c"]);
        c.tap(&display, 0);
        assert_eq!(order(&c), ["c"]);
        assert_eq!(c.selection().rank_of(&display[2]), Some(1));
        assert_eq!(c.phase(), RangePhase::Idle);
    }

    #[test]
    fn range_first_tap_awaits_second_point() {
        let display = ids(["a", "b", "c", "d"]);
        let mut c = SelectionController::new(SelectionMode::Range);
        c.tap(&display, 1);
        assert_eq!(c.phase(), RangePhase::AwaitingSecondPoint { start: 1 });
        assert_eq!(order(&c), ["b"]);
    }

    #[test]
    fn range_second_tap_fills_forward() {
        let display = ids(["a", "b", "c", "d", "e"]);
        let mut c = SelectionController::new(SelectionMode::Range);
        c.tap(&display, 1);
        c.tap(&display, 4);
        assert_eq!(order(&c), ["b", "c", "d", "e"]);
        assert_eq!(c.phase(), RangePhase::Idle);
        assert_eq!(c.last_range(), Some((1, 4)));
    }

    #[test]
    fn range_second_tap_before_start_fills_backward() {
        let display = ids(["a", "b", "c", "d", "e"]);
        let mut c = SelectionController::new(SelectionMode::Range);
        c.tap(&display, 3);
        c.tap(&display, 0);
        assert_eq!(order(&c), ["d", "c", "b", "a"]);
    }

    #[test]
    fn tapping_selected_item_resets_range() {
        let display = ids(["a", "b", "c"]);
        let mut c = SelectionController::new(SelectionMode::Range);
        c.tap(&display, 0);
        c.tap(&display, 0);
        assert_eq!(c.phase(), RangePhase::Idle);
        assert!(c.selection().is_empty());

        c.tap(&display, 0);
        c.tap(&display, 1);
        c.tap(&display, 2);
        assert_eq!(c.phase(), RangePhase::AwaitingSecondPoint { start: 2 });
        c.tap(&display, 1);
        assert_eq!(c.phase(), RangePhase::Idle);
        assert_eq!(order(&c), ["a", "c"]);
    }

    #[test]
    fn range_keeps_existing_ranks_and_extends() {
        let display = ids(["a", "b", "c", "d", "e"]);
        let mut c = SelectionController::new(SelectionMode::Toggle);
        c.tap(&display, 2);
        c.set_mode(SelectionMode::Range);
        c.tap(&display, 0);
        c.tap(&display, 4);
        assert_eq!(order(&c), ["c", "a", "b", "d", "e"]);
    }

    #[test]
    fn set_mode_discards_pending_start() {
        let display = ids(["a", "b"]);
        let mut c = SelectionController::new(SelectionMode::Range);
        c.tap(&display, 0);
        c.set_mode(SelectionMode::Range);
        assert_eq!(c.phase(), RangePhase::Idle);
    }

    #[test]
    fn out_of_bounds_tap_is_ignored() {
        let display = ids(["a"]);
        let mut c = SelectionController::new(SelectionMode::Range);
        assert!(c.tap(&display, 5).is_empty());
        assert!(c.drain_events().is_empty());
        assert_eq!(c.phase(), RangePhase::Idle);
    }

    #[test]
    fn drag_selects_crossed_items() {
        let display = ids(["a", "b", "c", "d"]);
        let mut c = SelectionController::new(SelectionMode::Toggle);
        c.drag_begin(&display, 1);
        assert_eq!(c.drag_mode(), Some(DragMode::Selecting));
        c.drag_over(&display, Some(2));
        c.drag_over(&display, Some(2));
        c.drag_over(&display, Some(3));
        c.drag_end();
        assert_eq!(order(&c), ["b", "c", "d"]);
        assert_eq!(c.drag_mode(), None);
    }

    #[test]
    fn drag_from_selected_item_deselects() {
        let display = ids(["a", "b", "c", "d"]);
        let mut c = SelectionController::new(SelectionMode::Toggle);
        for i in 0..4 {
            c.tap(&display, i);
        }
        c.drag_begin(&display, 1);
        assert_eq!(c.drag_mode(), Some(DragMode::Deselecting));
        c.drag_over(&display, Some(2));
        c.drag_end();
        assert_eq!(order(&c), ["a", "d"]);
        assert_eq!(c.selection().rank_of(&display[3]), Some(2));
    }

    #[test]
    fn drag_reentry_reapplies_mode() {
        let display = ids(["a", "b", "c"]);
        let mut c = SelectionController::new(SelectionMode::Toggle);
        c.drag_begin(&display, 0);
        c.drag_over(&display, Some(1));
        // Toggle b off out of band, then leave and re-enter it.
        c.tap(&display, 1);
        c.drag_over(&display, Some(1));
        assert!(!c.selection().is_selected(&display[1]));
        c.drag_over(&display, None);
        c.drag_over(&display, Some(1));
        assert!(c.selection().is_selected(&display[1]));
    }

    #[test]
    fn drag_over_without_begin_is_noop() {
        let display = ids(["a"]);
        let mut c = SelectionController::new(SelectionMode::Toggle);
        assert!(c.drag_over(&display, Some(0)).is_empty());
        assert!(c.selection().is_empty());
    }

    #[test]
    fn events_describe_tap() {
        let display = ids(["a", "b"]);
        let mut c = SelectionController::new(SelectionMode::Toggle);
        c.tap(&display, 1);
        assert_eq!(
            c.drain_events(),
            vec![
                SelectionEvent::SelectedAt {
                    index: 1,
                    item: display[1].clone(),
                    rank: 1
                },
                SelectionEvent::SelectionChanged { count: 1 },
            ]
        );
        c.tap(&display, 1);
        assert_eq!(
            c.drain_events(),
            vec![
                SelectionEvent::DeselectedAt {
                    index: 1,
                    item: display[1].clone()
                },
                SelectionEvent::SelectionChanged { count: 0 },
            ]
        );
    }

    #[test]
    fn anchor_events_and_toggle() {
        let mut c = SelectionController::new(SelectionMode::Toggle);
        let y = ItemId::new("y");
        c.toggle_anchor(&y);
        assert_eq!(c.selection().anchor(), Some(&y));
        c.set_anchor(Some(y.clone()));
        c.toggle_anchor(&y);
        assert!(c.selection().anchor().is_none());
        assert_eq!(
            c.drain_events(),
            vec![
                SelectionEvent::AnchorSet {
                    item: Some(y.clone())
                },
                SelectionEvent::AnchorSet { item: None },
            ]
        );
    }

    #[test]
    fn range_deselect_over_anchor_queues_anchor_after_deselections() {
        let display = ids(["a", "b", "c", "d"]);
        let mut c = SelectionController::new(SelectionMode::Range);
        c.tap(&display, 0);
        c.tap(&display, 3);
        c.set_anchor(Some(display[2].clone()));
        c.drain_events();

        let change = c.model.range_deselect(&display, 1, 3);
        c.publish(&display, &change);
        assert_eq!(
            c.drain_events(),
            vec![
                SelectionEvent::DeselectedAt {
                    index: 1,
                    item: display[1].clone()
                },
                SelectionEvent::DeselectedAt {
                    index: 2,
                    item: display[2].clone()
                },
                SelectionEvent::DeselectedAt {
                    index: 3,
                    item: display[3].clone()
                },
                SelectionEvent::AnchorSet { item: None },
                SelectionEvent::SelectionChanged { count: 1 },
            ]
        );
        assert!(c.selection().anchor().is_none());
    }

    #[test]
    fn deselecting_drag_across_anchor_clears_it_after_its_deselection() {
        let display = ids(["a", "b", "c"]);
        let mut c = SelectionController::new(SelectionMode::Toggle);
        for i in 0..3 {
            c.tap(&display, i);
        }
        c.set_anchor(Some(display[1].clone()));
        c.drain_events();

        c.drag_begin(&display, 0);
        c.drag_over(&display, Some(1));
        c.drag_end();
        assert_eq!(
            c.drain_events(),
            vec![
                SelectionEvent::DeselectedAt {
                    index: 0,
                    item: display[0].clone()
                },
                SelectionEvent::SelectionChanged { count: 2 },
                SelectionEvent::DeselectedAt {
                    index: 1,
                    item: display[1].clone()
                },
                SelectionEvent::AnchorSet { item: None },
                SelectionEvent::SelectionChanged { count: 1 },
            ]
        );
    }

    #[test]
    fn clear_resets_range_and_anchor() {
        let display = ids(["a", "b"]);
        let mut c = SelectionController::new(SelectionMode::Range);
        c.tap(&display, 0);
        c.set_anchor(Some(display[1].clone()));
        c.clear();
        assert_eq!(c.phase(), RangePhase::Idle);
        assert!(c.selection().is_empty());
        assert!(c.selection().anchor().is_none());
    }

    #[test]
    fn paste_request_is_queued() {
        let mut c = SelectionController::new(SelectionMode::Toggle);
        c.request_paste(4);
        assert_eq!(
            c.drain_events(),
            vec![SelectionEvent::PasteRequested { index: 4 }]
        );
    }
}
