#![forbid(unsafe_code)]

//! Undo/redo history for album mutations.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                         ActionLog                          │
//! │  ┌──────────────────┐          ┌──────────────────┐        │
//! │  │   Undo Stack     │  undo()  │   Redo Stack     │        │
//! │  │  UndoAction N    │ ───────► │  UndoAction 1    │        │
//! │  │  ...             │ ◄─────── │  ...             │        │
//! │  │  UndoAction 1    │  redo()  │  UndoAction N    │        │
//! │  └──────────────────┘          └──────────────────┘        │
//! └────────────────────────────────────────────────────────────┘
//!                │ undo_op() / redo_op()
//!                ▼
//!            StoreOp  ──► SyncCoordinator ──► AssetStore
//! ```
//!
//! - [`action`]: recorded actions and their inverse operations
//! - [`history`]: the bounded two-stack log

pub mod action;
pub mod history;

pub use action::{StoreOp, UndoAction, UndoKind};
pub use history::{ActionLog, HistoryConfig};
