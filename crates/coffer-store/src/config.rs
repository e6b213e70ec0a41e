use serde::{Deserialize, Serialize};

use crate::index::DEFAULT_INDEX_FILE;

/// How the directory index is replaced at the end of a save.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexReplace {
    /// Write a temporary file in the directory and rename it over the index.
    #[default]
    AtomicRename,
    /// Write `<index>.new`, copy it over the index, then remove it.
    CopyOver,
}

/// Tunables for the persistence engine.
///
/// Every field has a default, so a partial TOML or JSON document is valid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// File name of the index inside a collection directory.
    pub index_file: String,
    /// Strategy for replacing the index file.
    pub index_replace: IndexReplace,
    /// Pretty-print the index JSON.
    pub pretty_index: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            index_file: DEFAULT_INDEX_FILE.to_string(),
            index_replace: IndexReplace::AtomicRename,
            pretty_index: true,
        }
    }
}

impl StoreConfig {
    /// Copy-over index replacement, for file systems where renaming over an
    /// existing file is unavailable.
    pub fn copy_over() -> Self {
        Self {
            index_replace: IndexReplace::CopyOver,
            ..Default::default()
        }
    }
}
