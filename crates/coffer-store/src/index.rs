//! The JSON index of a collection directory.
//!
//! ```json
//! {
//!   "name": "settings",
//!   "timestamp": 1700000000000,
//!   "members": [
//!     { "name": "count", "fileName": "count.txt", "type": "Int", "timestamp": 1700000000000 }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use coffer_types::TypeTag;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::fsio;

pub const DEFAULT_INDEX_FILE: &str = "index.json";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexFile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub timestamp: i64,
    pub members: Vec<IndexEntry>,
}

/// One member file recorded in the index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub name: String,
    pub file_name: String,
    #[serde(rename = "type")]
    pub type_tag: TypeTag,
    /// Absent in indexes written without per-member timestamps.
    #[serde(default)]
    pub timestamp: i64,
}

impl IndexFile {
    pub fn new(name: impl Into<String>, timestamp: i64) -> Self {
        Self {
            name: name.into(),
            timestamp,
            members: Vec::new(),
        }
    }

    pub fn read(path: &Path) -> StoreResult<Self> {
        let bytes = fsio::read(path)?;
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Index {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_bytes(&self, pretty: bool) -> serde_json::Result<Vec<u8>> {
        let mut bytes = if pretty {
            serde_json::to_vec_pretty(self)?
        } else {
            serde_json::to_vec(self)?
        };
        bytes.push(b'\n');
        Ok(bytes)
    }

    pub fn entry(&self, name: &str) -> Option<&IndexEntry> {
        self.members.iter().find(|e| e.name == name)
    }

    /// Append entries from a previous index that were not rewritten.
    ///
    /// Entries with an empty name or a name already present are dropped.
    /// Returns how many entries were retained.
    pub fn merge_retained(&mut self, previous: Vec<IndexEntry>) -> usize {
        let mut seen: HashSet<String> = self.members.iter().map(|e| e.name.clone()).collect();
        let before = self.members.len();
        for entry in previous {
            if entry.name.is_empty() || !seen.insert(entry.name.clone()) {
                continue;
            }
            self.members.push(entry);
        }
        self.members.len() - before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, ext: &str) -> IndexEntry {
        IndexEntry {
            name: name.into(),
            file_name: format!("{name}.{ext}"),
            type_tag: TypeTag::from_static("Int"),
            timestamp: 7,
        }
    }

    #[test]
    fn json_field_names() {
        let mut index = IndexFile::new("c", 42);
        index.members.push(entry("a", "txt"));
        let value: serde_json::Value =
            serde_json::from_slice(&index.to_bytes(false).unwrap()).unwrap();
        assert_eq!(value["name"], "c");
        assert_eq!(value["timestamp"], 42);
        assert_eq!(value["members"][0]["fileName"], "a.txt");
        assert_eq!(value["members"][0]["type"], "Int");
        assert_eq!(value["members"][0]["timestamp"], 7);
    }

    #[test]
    fn entry_timestamp_is_optional() {
        let index: IndexFile = serde_json::from_str(
            r#"{"name":"c","timestamp":1,"members":[{"name":"a","fileName":"a.txt","type":"Int"}]}"#,
        )
        .unwrap();
        assert_eq!(index.members[0].timestamp, 0);
        assert_eq!(index.entry("a").unwrap().type_tag, "Int");
        assert!(index.entry("b").is_none());
    }

    #[test]
    fn members_list_is_required() {
        let err = serde_json::from_str::<IndexFile>(r#"{"name":"c","timestamp":1}"#).unwrap_err();
        assert!(err.to_string().contains("members"));

        let index: IndexFile = serde_json::from_str(r#"{"members":[]}"#).unwrap();
        assert_eq!(index, IndexFile::default());
    }

    #[test]
    fn merge_keeps_new_entries_first() {
        let mut index = IndexFile::new("c", 1);
        index.members.push(entry("b", "json"));
        let previous = vec![entry("a", "txt"), entry("b", "txt"), entry("", "txt")];

        assert_eq!(index.merge_retained(previous), 1);
        let names: Vec<&str> = index.members.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(index.entry("b").unwrap().file_name, "b.json");
    }

    #[test]
    fn merge_drops_duplicate_previous_entries() {
        let mut index = IndexFile::new("c", 1);
        let retained = index.merge_retained(vec![entry("a", "txt"), entry("a", "json")]);
        assert_eq!(retained, 1);
        assert_eq!(index.members[0].file_name, "a.txt");
    }
}
