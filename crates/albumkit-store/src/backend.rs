#![forbid(unsafe_code)]

//! String-keyed persistence backends.
//!
//! A backend stores two kinds of values under string keys: ordered string
//! lists (custom orders, header lists) and single strings (preferences).
//! Reading a key holding the other kind yields `None`, the same as a missing
//! key.
//!
//! # Backends
//!
//! - [`MemoryStore`]: process-local map, used by tests and ephemeral sessions
//! - [`JsonFileStore`]: one JSON document on disk, rewritten on every change
//!
//! # Atomic Writes
//!
//! [`JsonFileStore`] writes to a sibling temp file and renames it over the
//! target, so a crash mid-write leaves the previous document intact.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "entries": {
//!     "custom_order.album-1": ["3", "1", "2"],
//!     "sort_preference.album-1": "custom"
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Current file format version.
const FORMAT_VERSION: u64 = 1;

/// A string-keyed store of string lists and strings.
///
/// Implementations use interior mutability so one backend can be shared by
/// several stores through an `Arc<dyn KeyValueStore>`.
pub trait KeyValueStore: Send + Sync {
    /// Read the list stored under `key`.
    fn get_list(&self, key: &str) -> StoreResult<Option<Vec<String>>>;

    /// Overwrite `key` with `values`.
    fn set_list(&self, key: &str, values: &[String]) -> StoreResult<()>;

    /// Read the string stored under `key`.
    fn get_value(&self, key: &str) -> StoreResult<Option<String>>;

    /// Overwrite `key` with `value`.
    fn set_value(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Delete `key`. Missing keys are not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;
}

/// One stored value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredValue {
    List(Vec<String>),
    Value(String),
}

impl StoredValue {
    fn as_list(&self) -> Option<Vec<String>> {
        match self {
            Self::List(values) => Some(values.clone()),
            Self::Value(_) => None,
        }
    }

    fn as_value(&self) -> Option<String> {
        match self {
            Self::Value(value) => Some(value.clone()),
            Self::List(_) => None,
        }
    }
}

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory backend. Contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<AHashMap<String, StoredValue>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// True when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get_list(&self, key: &str) -> StoreResult<Option<Vec<String>>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).and_then(StoredValue::as_list))
    }

    fn set_list(&self, key: &str, values: &[String]) -> StoreResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_owned(), StoredValue::List(values.to_vec()));
        Ok(())
    }

    fn get_value(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).and_then(StoredValue::as_value))
    }

    fn set_value(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_owned(), StoredValue::Value(value.to_owned()));
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}

// ============================================================================
// JsonFileStore
// ============================================================================

/// On-disk representation.
#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u64,
    entries: BTreeMap<String, StoredValue>,
}

/// Backend persisted as a single JSON document.
///
/// The whole document is held in memory; every mutation rewrites the file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, StoredValue>>,
}

impl JsonFileStore {
    /// Open the store at `path`.
    ///
    /// - **Missing file** opens an empty store; the file is created on the
    ///   first write.
    /// - **Corrupted file** returns [`StoreError::Json`].
    /// - **Version mismatch** returns [`StoreError::UnsupportedVersion`].
    ///
    /// The parent directory must already exist.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            let file: StoreFile = serde_json::from_str(&contents)?;
            if file.version != FORMAT_VERSION {
                return Err(StoreError::UnsupportedVersion {
                    found: file.version,
                    expected: FORMAT_VERSION,
                });
            }
            file.entries
        } else {
            BTreeMap::new()
        };
        tracing::debug!(
            message = "store.open",
            path = %path.display(),
            keys = entries.len(),
        );
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `mutate` to the entries and flush them to disk.
    ///
    /// The in-memory state is only updated when the write succeeds.
    fn update(&self, mutate: impl FnOnce(&mut BTreeMap<String, StoredValue>)) -> StoreResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let mut next = entries.clone();
        mutate(&mut next);
        self.write(&next)?;
        *entries = next;
        Ok(())
    }

    fn write(&self, entries: &BTreeMap<String, StoredValue>) -> StoreResult<()> {
        let file = StoreFile {
            version: FORMAT_VERSION,
            entries: entries.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        let temp = self.path.with_extension("json.tmp");
        std::fs::write(&temp, json)?;
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_list(&self, key: &str) -> StoreResult<Option<Vec<String>>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).and_then(StoredValue::as_list))
    }

    fn set_list(&self, key: &str, values: &[String]) -> StoreResult<()> {
        self.update(|entries| {
            entries.insert(key.to_owned(), StoredValue::List(values.to_vec()));
        })
    }

    fn get_value(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).and_then(StoredValue::as_value))
    }

    fn set_value(&self, key: &str, value: &str) -> StoreResult<()> {
        self.update(|entries| {
            entries.insert(key.to_owned(), StoredValue::Value(value.to_owned()));
        })
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        if !self
            .entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(key)
        {
            return Ok(());
        }
        self.update(|entries| {
            entries.remove(key);
        })
    }
}
