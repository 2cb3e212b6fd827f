//! Label → owning-team lookup.
//!
//! The directory is read once per run from a JSON object such as
//! `{"payments": ["Alpha", "Beta"], "search": ["Gamma"]}` and is read-only
//! afterwards.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{MttrError, Result};

/// Default file name, resolved against the working directory.
pub const DEFAULT_OWNERS_FILE: &str = "owners.json";

/// Immutable mapping from a ticket label to the ordered teams that own it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct OwnerDirectory {
    owners: HashMap<String, Vec<String>>,
}

impl OwnerDirectory {
    /// Build a directory from in-memory entries.
    pub fn new(owners: HashMap<String, Vec<String>>) -> Self {
        Self { owners }
    }

    /// Load the directory from `path`.
    ///
    /// A missing file or anything other than a JSON object of string arrays
    /// is reported as [`MttrError::OwnerDirectoryLoad`].
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| MttrError::OwnerDirectoryLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let directory = Self::from_json(&content).map_err(|e| MttrError::OwnerDirectoryLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!(
            "Loaded {} owner mappings from {}",
            directory.len(),
            path.display()
        );
        Ok(directory)
    }

    /// Parse the directory from a JSON document.
    pub fn from_json(content: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Teams owning `label`, in file order. Empty when the label is unmapped.
    pub fn resolve_owners(&self, label: &str) -> &[String] {
        self.owners.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Owners of every label in turn, concatenated.
    ///
    /// A team that owns two of the labels appears twice.
    pub fn owners_of<'a, I>(&self, labels: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        labels
            .into_iter()
            .flat_map(|label| self.resolve_owners(label).iter().cloned())
            .collect()
    }

    /// Number of mapped labels.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

impl<L, T> FromIterator<(L, Vec<T>)> for OwnerDirectory
where
    L: Into<String>,
    T: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (L, Vec<T>)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(label, teams)| (label.into(), teams.into_iter().map(Into::into).collect()))
                .collect(),
        )
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
