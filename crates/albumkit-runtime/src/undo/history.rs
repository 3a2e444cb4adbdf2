#![forbid(unsafe_code)]

//! Undo/redo stacks of recorded actions.
//!
//! [`ActionLog`] only does bookkeeping: it hands actions back to the caller,
//! who applies the inverse (or the original) against the asset store.
//!
//! # Invariants
//!
//! 1. `total_bytes` always equals the sum of `size_bytes()` over both stacks
//! 2. `undo_stack.len() <= config.max_depth` after any operation
//! 3. `total_bytes <= config.max_bytes` after any operation, if enforced
//! 4. The redo stack is cleared whenever a new action is recorded
//! 5. `undo()` then `redo()` restores both stacks exactly
//!
//! ```text
//! record(a3)
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [a1, a2, a3]                      │
//! │ Redo Stack: []                                │
//! └───────────────────────────────────────────────┘
//!
//! undo()  -> a3
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [a1, a2]                          │
//! │ Redo Stack: [a3]                              │
//! └───────────────────────────────────────────────┘
//!
//! record(a4)  <-- new branch, clears redo
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [a1, a2, a4]                      │
//! │ Redo Stack: []                                │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! An action whose inverse then fails to apply is not put back; the caller
//! reports the failure and history moves on.

use std::collections::VecDeque;
use std::fmt;

use super::action::UndoAction;

/// Limits for the action log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum number of actions to keep in undo history.
    pub max_depth: usize,
    /// Maximum total bytes for all actions (0 = unlimited).
    pub max_bytes: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: 100,
            max_bytes: 10 * 1024 * 1024, // 10 MB
        }
    }
}

impl HistoryConfig {
    /// Create a configuration with custom limits.
    #[must_use]
    pub fn new(max_depth: usize, max_bytes: usize) -> Self {
        Self {
            max_depth,
            max_bytes,
        }
    }

    /// Set the depth limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the byte budget (0 = unlimited).
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Unlimited configuration (for testing).
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
            max_bytes: 0,
        }
    }
}

/// Undo and redo stacks.
#[derive(Clone)]
pub struct ActionLog {
    /// Actions available for undo (newest at back).
    undo_stack: VecDeque<UndoAction>,
    /// Actions available for redo (newest at back).
    redo_stack: VecDeque<UndoAction>,
    config: HistoryConfig,
    total_bytes: usize,
}

impl fmt::Debug for ActionLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionLog")
            .field("undo_depth", &self.undo_stack.len())
            .field("redo_depth", &self.redo_stack.len())
            .field("total_bytes", &self.total_bytes)
            .field("config", &self.config)
            .finish()
    }
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl ActionLog {
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            config,
            total_bytes: 0,
        }
    }

    // ========================================================================
    // Core Operations
    // ========================================================================

    /// Record an action that has already been applied.
    ///
    /// Clears the redo stack and enforces limits.
    pub fn record(&mut self, action: UndoAction) {
        self.clear_redo();
        self.total_bytes += action.size_bytes();
        tracing::debug!(
            message = "history.record",
            description = action.description(),
            undo_depth = self.undo_stack.len() + 1,
        );
        self.undo_stack.push_back(action);
        self.enforce_limits();
    }

    /// Pop the newest action for undoing and move it onto the redo stack.
    ///
    /// Returns `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<UndoAction> {
        let action = self.undo_stack.pop_back()?;
        self.redo_stack.push_back(action.clone());
        Some(action)
    }

    /// Pop the newest undone action for redoing and move it back onto the
    /// undo stack.
    ///
    /// Returns `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<UndoAction> {
        let action = self.redo_stack.pop_back()?;
        self.undo_stack.push_back(action.clone());
        Some(action)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    // ========================================================================
    // Info
    // ========================================================================

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Undoable actions, oldest first.
    pub fn undo_actions(&self) -> impl Iterator<Item = &UndoAction> {
        self.undo_stack.iter()
    }

    /// Redoable actions, oldest first.
    pub fn redo_actions(&self) -> impl Iterator<Item = &UndoAction> {
        self.redo_stack.iter()
    }

    /// Descriptions of undoable actions (most recent first).
    pub fn undo_descriptions(&self, limit: usize) -> Vec<&str> {
        self.undo_stack
            .iter()
            .rev()
            .take(limit)
            .map(UndoAction::description)
            .collect()
    }

    /// Descriptions of redoable actions (most recent first).
    pub fn redo_descriptions(&self, limit: usize) -> Vec<&str> {
        self.redo_stack
            .iter()
            .rev()
            .take(limit)
            .map(UndoAction::description)
            .collect()
    }

    #[must_use]
    pub fn next_undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(UndoAction::description)
    }

    #[must_use]
    pub fn next_redo_description(&self) -> Option<&str> {
        self.redo_stack.back().map(UndoAction::description)
    }

    /// Total bytes held by both stacks.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.total_bytes
    }

    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Clear all history (both undo and redo).
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.total_bytes = 0;
    }

    fn clear_redo(&mut self) {
        for action in self.redo_stack.drain(..) {
            self.total_bytes = self.total_bytes.saturating_sub(action.size_bytes());
        }
    }

    /// Evict oldest actions until depth and byte limits hold.
    fn enforce_limits(&mut self) {
        while self.undo_stack.len() > self.config.max_depth {
            if let Some(action) = self.undo_stack.pop_front() {
                self.total_bytes = self.total_bytes.saturating_sub(action.size_bytes());
            }
        }

        if self.config.max_bytes > 0 {
            while self.total_bytes > self.config.max_bytes {
                // Redo entries are speculative; drop them first.
                if let Some(action) = self.redo_stack.pop_front() {
                    self.total_bytes = self.total_bytes.saturating_sub(action.size_bytes());
                    continue;
                }
                if let Some(action) = self.undo_stack.pop_front() {
                    self.total_bytes = self.total_bytes.saturating_sub(action.size_bytes());
                } else {
                    break;
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
