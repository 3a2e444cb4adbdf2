#![forbid(unsafe_code)]

//! Persistence for custom-ordered photo albums.
//!
//! Everything here sits on a [`KeyValueStore`], a string-keyed store of
//! string lists and strings shared as `Arc<dyn KeyValueStore>`:
//!
//! - [`OrderStore`] - saved custom order per collection, plus [`reconcile`]
//! - [`HeaderStore`] - paragraph headers and collapsed flags
//! - [`PreferenceStore`] - per-collection [`SortPreference`]
//!
//! Stores are constructed explicitly and handed to whoever needs them; there
//! is no process-wide instance. Tests use [`MemoryStore`], applications
//! typically use [`JsonFileStore`].

pub mod backend;
pub mod error;
pub mod header_store;
pub mod keys;
pub mod order_store;
pub mod preference;

pub use backend::{JsonFileStore, KeyValueStore, MemoryStore};
pub use error::{StoreError, StoreResult};
pub use header_store::HeaderStore;
pub use order_store::{OrderStore, reconcile};
pub use preference::{PreferenceStore, SortKey, SortPreference, UnknownSortPreference};
