#![forbid(unsafe_code)]

//! Runtime for custom-ordered photo albums.
//!
//! - [`AssetStore`] - the external photo library, with [`MemoryAssetStore`]
//!   for tests
//! - [`SyncCoordinator`] - validates and commits orders and mutations, and
//!   records them in the [`ActionLog`]
//! - [`AlbumSession`] - one open collection: selection, headers, sort
//!   preference, clipboard, and undo wired together
//! - [`SessionConfig`] - tunables loadable from TOML or JSON
//!
//! # Example
//!
//! ```rust,ignore
//! let backend = Arc::new(JsonFileStore::open("albums.json")?);
//! let mut session = AlbumSession::with_backend(config, assets, backend);
//! session.open(CollectionId::new("holiday"))?;
//! session.tap(3);
//! session.tap(0);
//! session.commit_selection()?;
//! session.undo()?;
//! ```

pub mod asset_store;
pub mod clipboard;
pub mod config;
pub mod session;
pub mod sync;
pub mod undo;

pub use asset_store::{AccessLevel, AssetStore, AssetStoreError, MemoryAssetStore};
pub use clipboard::{Pasteboard, PasteboardError};
pub use config::{ConfigError, SessionConfig};
pub use session::{AlbumSession, SessionError};
pub use sync::{SyncCoordinator, SyncError, validate_order};
pub use undo::{ActionLog, HistoryConfig, StoreOp, UndoAction, UndoKind};
