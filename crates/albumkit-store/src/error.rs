#![forbid(unsafe_code)]

//! Errors raised by the persistence layer.

use std::io;

/// Errors from a [`KeyValueStore`](crate::KeyValueStore) backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The backing file could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The backing file was written by an incompatible version.
    #[error("unsupported store file version: {found} (expected {expected})")]
    UnsupportedVersion { found: u64, expected: u64 },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
