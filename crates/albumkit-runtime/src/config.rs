#![forbid(unsafe_code)]

//! Session configuration as data.
//!
//! # Loading
//!
//! ```toml
//! # albumkit.toml
//! history_depth = 50
//! history_bytes = 4194304
//! selection_mode = "range"
//! default_sort = "custom"
//! clear_selection_after_commit = true
//! ```
//!
//! ```rust,ignore
//! let config = SessionConfig::from_toml_file("albumkit.toml")?;
//! let config = SessionConfig::from_json_str(json)?.validated()?;
//! ```
//!
//! # Defaults
//!
//! Every field has a default, so an empty document is a valid config equal
//! to `SessionConfig::default()`.

use std::path::Path;

use albumkit_core::SelectionMode;
use albumkit_store::SortPreference;
use serde::{Deserialize, Serialize};

use crate::undo::HistoryConfig;

/// Tunables for an [`AlbumSession`](crate::AlbumSession).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum number of undoable actions.
    pub history_depth: usize,
    /// Byte budget for the undo history (0 = unlimited).
    pub history_bytes: usize,
    /// How taps are interpreted when a collection is opened.
    pub selection_mode: SelectionMode,
    /// Sort preference for collections without a stored one.
    pub default_sort: SortPreference,
    /// Whether a committed reorder empties the selection.
    pub clear_selection_after_commit: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let history = HistoryConfig::default();
        Self {
            history_depth: history.max_depth,
            history_bytes: history.max_bytes,
            selection_mode: SelectionMode::default(),
            default_sort: SortPreference::default(),
            clear_selection_after_commit: true,
        }
    }
}

impl SessionConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.history_depth == 0 {
            errors.push("history_depth must be > 0".into());
        }
        if self.history_bytes != 0 && self.history_bytes < 1024 {
            errors.push(format!(
                "history_bytes must be 0 (unlimited) or >= 1024, got {}",
                self.history_bytes
            ));
        }
        errors
    }

    /// `self` if it validates, otherwise [`ConfigError::Validation`].
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    #[must_use]
    pub fn to_history_config(&self) -> HistoryConfig {
        HistoryConfig::new(self.history_depth, self.history_bytes)
    }

    /// Set the default selection mode.
    #[must_use]
    pub fn with_selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    /// Set the default sort preference.
    #[must_use]
    pub fn with_default_sort(mut self, sort: SortPreference) -> Self {
        self.default_sort = sort;
        self
    }

    /// Keep or clear the selection after a committed reorder.
    #[must_use]
    pub fn with_clear_selection_after_commit(mut self, clear: bool) -> Self {
        self.clear_selection_after_commit = clear;
        self
    }
}

/// Errors that can occur when loading a session configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(toml::de::Error),
    #[error("JSON parse error: {0}")]
    Json(serde_json::Error),
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_validates_clean() {
        let errors = SessionConfig::default().validate();
        assert!(errors.is_empty(), "default should validate: {errors:?}");
    }

    #[test]
    fn default_matches_history_defaults() {
        assert_eq!(
            SessionConfig::default().to_history_config(),
            HistoryConfig::default()
        );
    }

    #[test]
    fn empty_documents_are_defaults() {
        assert_eq!(
            SessionConfig::from_toml_str("").unwrap(),
            SessionConfig::default()
        );
        assert_eq!(
            SessionConfig::from_json_str("{}").unwrap(),
            SessionConfig::default()
        );
    }

    #[test]
    fn toml_overrides_fields() {
        let config = SessionConfig::from_toml_str(
            r#"
            history_depth = 5
            selection_mode = "range"
            default_sort = "creation_date"
            clear_selection_after_commit = false
            "#,
        )
        .unwrap();
        assert_eq!(config.history_depth, 5);
        assert_eq!(config.selection_mode, SelectionMode::Range);
        assert_eq!(config.default_sort, SortPreference::CreationDate);
        assert!(!config.clear_selection_after_commit);
    }

    #[test]
    fn json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("albumkit.json");
        let config = SessionConfig::default().with_selection_mode(SelectionMode::Range);
        std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();
        assert_eq!(SessionConfig::from_json_file(&path).unwrap(), config);
    }

    #[test]
    fn toml_file_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            SessionConfig::from_toml_file(dir.path().join("absent.toml")),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn bad_values_are_reported() {
        assert!(matches!(
            SessionConfig::from_toml_str("selection_mode = \"lasso\""),
            Err(ConfigError::Toml(_))
        ));
        let config = SessionConfig {
            history_depth: 0,
            history_bytes: 10,
            ..SessionConfig::default()
        };
        let errors = config.clone().validate();
        assert!(errors.iter().any(|e| e.contains("history_depth")));
        assert!(errors.iter().any(|e| e.contains("history_bytes")));
        match config.validated() {
            Err(ConfigError::Validation(list)) => assert_eq!(list.len(), 2),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
