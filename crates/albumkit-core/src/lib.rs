#![forbid(unsafe_code)]

//! Core model for custom-ordered photo albums.
//!
//! This crate holds the pure, I/O-free part of albumkit:
//!
//! - [`ItemId`] / [`CollectionId`] - opaque identifiers handed out by the
//!   external asset store
//! - [`SelectionModel`] - ranked multi-selection plus an independent anchor
//! - [`SelectionController`] - tap, range, and drag interaction state machines
//!   that drive a [`SelectionModel`] and queue [`SelectionEvent`]s
//! - [`reorder`] - moves the selected items next to the base item
//! - [`HeaderSet`] - paragraph headers and the visibility filter
//! - [`OrderDiff`] - index-level change description for rendering layers
//!
//! # How it fits in the system
//! `albumkit-store` persists what this crate computes, and `albumkit-runtime`
//! commits it to the asset store and records it for undo.

pub mod diff;
pub mod event;
pub mod interaction;
pub mod item;
pub mod reorder;
pub mod selection;
pub mod visibility;

pub use diff::OrderDiff;
pub use event::SelectionEvent;
pub use interaction::{DragMode, RangePhase, SelectionController, SelectionMode};
pub use item::{CollectionId, ItemId, ids};
pub use reorder::{ReorderError, ReorderPlan, reorder};
pub use selection::{SelectionChange, SelectionModel};
pub use visibility::{HeaderSet, Paragraph, visible_items};
