#![forbid(unsafe_code)]

//! albumkit public facade crate.
//!
//! Re-exports the everyday types of the albumkit crates and offers a
//! prelude. The pure model lives in `albumkit-core`, persistence in
//! `albumkit-store`, and the asset-store commit path, undo history, and
//! session control flow in `albumkit-runtime` (the default `runtime`
//! feature).

// --- Core re-exports -------------------------------------------------------

pub use albumkit_core::{
    CollectionId, DragMode, HeaderSet, ItemId, OrderDiff, Paragraph, RangePhase, ReorderError,
    ReorderPlan, SelectionChange, SelectionController, SelectionEvent, SelectionMode,
    SelectionModel, reorder, visible_items,
};

// --- Store re-exports ------------------------------------------------------

pub use albumkit_store::{
    HeaderStore, JsonFileStore, KeyValueStore, MemoryStore, OrderStore, PreferenceStore, SortKey,
    SortPreference, StoreError, reconcile,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use albumkit_runtime::{
    AccessLevel, ActionLog, AlbumSession, AssetStore, AssetStoreError, ConfigError,
    HistoryConfig, MemoryAssetStore, Pasteboard, PasteboardError, SessionConfig, SessionError,
    StoreOp, SyncCoordinator, SyncError, UndoAction, UndoKind,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for albumkit applications.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Reorder(#[from] ReorderError),
    #[cfg(feature = "runtime")]
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[cfg(feature = "runtime")]
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Standard result type for albumkit APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Session bootstrap ------------------------------------------------------

/// Build a session whose stores all live in the JSON file at `path`.
#[cfg(feature = "runtime")]
pub fn open_file_session<S: AssetStore>(
    config: SessionConfig,
    assets: S,
    path: impl AsRef<std::path::Path>,
) -> Result<AlbumSession<S>> {
    let backend: std::sync::Arc<dyn KeyValueStore> =
        std::sync::Arc::new(JsonFileStore::open(path)?);
    Ok(AlbumSession::with_backend(config.validated()?, assets, backend))
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        CollectionId, Error, HeaderSet, ItemId, OrderDiff, Result, SelectionEvent, SelectionMode,
        SelectionModel, SortPreference,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{AlbumSession, AssetStore, MemoryAssetStore, SessionConfig, UndoAction};

    pub use crate::{core, store};

    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use albumkit_core as core;
#[cfg(feature = "runtime")]
pub use albumkit_runtime as runtime;
pub use albumkit_store as store;
