#![forbid(unsafe_code)]

//! Per-collection sort preference.
//!
//! Only [`SortPreference::Custom`] uses the saved custom order; the other
//! preferences ask the asset store for a native sort via [`SortKey`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use albumkit_core::CollectionId;
use serde::{Deserialize, Serialize};

use crate::backend::KeyValueStore;
use crate::error::StoreResult;
use crate::keys;

/// How a collection is ordered for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortPreference {
    /// Newest creation date first.
    CreationDate,
    /// Most recently modified first.
    ModificationDate,
    /// Most recently added first.
    RecentlyAdded,
    /// The user's saved custom order.
    #[default]
    Custom,
}

/// Native sort requested from the asset store. Both keys sort descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    CreationDate,
    ModificationDate,
}

/// A stored preference string that names no known preference.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort preference: {0:?}")]
pub struct UnknownSortPreference(pub String);

impl SortPreference {
    /// All preferences, in menu order.
    pub const ALL: [Self; 4] = [
        Self::CreationDate,
        Self::ModificationDate,
        Self::RecentlyAdded,
        Self::Custom,
    ];

    /// Stable storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreationDate => "creation_date",
            Self::ModificationDate => "modification_date",
            Self::RecentlyAdded => "recently_added",
            Self::Custom => "custom",
        }
    }

    /// Native sort for this preference; `None` for [`SortPreference::Custom`].
    #[must_use]
    pub const fn sort_key(self) -> Option<SortKey> {
        match self {
            Self::CreationDate => Some(SortKey::CreationDate),
            Self::ModificationDate | Self::RecentlyAdded => Some(SortKey::ModificationDate),
            Self::Custom => None,
        }
    }

    /// Whether the saved custom order applies.
    #[must_use]
    pub const fn is_custom(self) -> bool {
        matches!(self, Self::Custom)
    }
}

impl fmt::Display for SortPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortPreference {
    type Err = UnknownSortPreference;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownSortPreference(s.to_owned()))
    }
}

/// Sort preference persistence.
#[derive(Clone)]
pub struct PreferenceStore {
    backend: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceStore").finish_non_exhaustive()
    }
}

impl PreferenceStore {
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Preference of `collection`, or `default` when nothing usable is stored.
    pub fn load_or(
        &self,
        collection: &CollectionId,
        default: SortPreference,
    ) -> StoreResult<SortPreference> {
        let Some(raw) = self.backend.get_value(&keys::sort_preference(collection))? else {
            return Ok(default);
        };
        Ok(raw.parse().unwrap_or_else(|err: UnknownSortPreference| {
            tracing::warn!(
                message = "preference.unknown",
                collection = collection.as_str(),
                error = %err,
            );
            default
        }))
    }

    /// Preference of `collection`, [`SortPreference::Custom`] by default.
    pub fn load(&self, collection: &CollectionId) -> StoreResult<SortPreference> {
        self.load_or(collection, SortPreference::default())
    }

    /// Persist `preference` for `collection`.
    pub fn save(&self, collection: &CollectionId, preference: SortPreference) -> StoreResult<()> {
        self.backend
            .set_value(&keys::sort_preference(collection), preference.as_str())
    }
}
