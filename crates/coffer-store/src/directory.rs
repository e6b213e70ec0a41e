//! Collections as a directory: one file per member plus a JSON index.
//!
//! Member files are named `<member name>.<factory extension>`. The index is
//! replaced last, so a save that fails part-way leaves the previous index in
//! place.

use std::io::Write;
use std::path::Path;

use coffer_registry::Registry;
use coffer_types::{Collection, Subset};
use tracing::{debug, info};

use crate::config::{IndexReplace, StoreConfig};
use crate::error::{StoreError, StoreResult};
use crate::fsio;
use crate::index::{IndexEntry, IndexFile};

/// What a directory save did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SaveSummary {
    /// Member files written by this save.
    pub written: usize,
    /// Entries kept from the previous index during an append.
    pub retained: usize,
}

pub fn load(
    registry: &Registry,
    config: &StoreConfig,
    dir: &Path,
    output: &mut Collection,
    subset: &Subset,
) -> StoreResult<()> {
    let index = IndexFile::read(&dir.join(&config.index_file))?;
    output.set_name(index.name);
    output.set_timestamp_ms(index.timestamp);

    let mut loaded = 0usize;
    for entry in index.members {
        if !subset.admits(&entry.name) {
            continue;
        }
        if entry.type_tag.is_empty() {
            return Err(StoreError::MissingType(entry.name));
        }
        if !is_plain_file_name(&entry.file_name) {
            return Err(StoreError::UnsafeFileName {
                name: entry.name,
                file_name: entry.file_name,
            });
        }
        let Some(factory) = registry.lookup(entry.type_tag.as_str()) else {
            return Err(StoreError::UnknownType {
                name: entry.name,
                type_tag: entry.type_tag,
            });
        };

        let data = fsio::read(&dir.join(&entry.file_name))?;
        let member = factory.decode(&data).map_err(|source| StoreError::Load {
            name: entry.name.clone(),
            type_tag: entry.type_tag.clone(),
            source,
        })?;
        output.add_member(member.with_identity(entry.name, entry.timestamp));
        loaded += 1;
    }

    debug!(dir = %dir.display(), members = loaded, "loaded collection directory");
    Ok(())
}

/// Save `collection` into `dir`.
///
/// Without `append`, `dir` must not exist. With `append`, the existing index
/// is read first and entries for members not rewritten are kept after the
/// new ones. Every member is encoded before anything is written.
pub fn save(
    registry: &Registry,
    config: &StoreConfig,
    collection: &Collection,
    dir: &Path,
    append: bool,
) -> StoreResult<SaveSummary> {
    let exists = dir.exists();
    if exists && !append {
        return Err(StoreError::AlreadyExists(dir.to_path_buf()));
    }
    let previous = if exists {
        IndexFile::read(&dir.join(&config.index_file))?.members
    } else {
        Vec::new()
    };

    let mut index = IndexFile::new(collection.name(), collection.timestamp_ms());
    let mut files = Vec::with_capacity(collection.len());
    for member in collection.members() {
        if !is_plain_file_name(member.name()) {
            return Err(StoreError::InvalidMemberName(member.name().to_string()));
        }
        let factory =
            registry
                .lookup(member.type_tag().as_str())
                .ok_or_else(|| StoreError::MissingFactory {
                    name: member.name().to_string(),
                    type_tag: member.type_tag().clone(),
                })?;
        let data = factory
            .encode(member)
            .map_err(|source| StoreError::Member {
                name: member.name().to_string(),
                source,
            })?;

        let file_name = format!("{}.{}", member.name(), factory.extension());
        if file_name == config.index_file {
            return Err(StoreError::InvalidMemberName(member.name().to_string()));
        }
        index.members.push(IndexEntry {
            name: member.name().to_string(),
            file_name: file_name.clone(),
            type_tag: member.type_tag().clone(),
            timestamp: member.timestamp_ms(),
        });
        files.push((file_name, data));
    }

    if !exists {
        fsio::create_dir_all(dir)?;
    }
    for (file_name, data) in &files {
        fsio::write(&dir.join(file_name), data)?;
    }

    let retained = index.merge_retained(previous);
    replace_index(config, dir, &index)?;

    let summary = SaveSummary {
        written: files.len(),
        retained,
    };
    info!(
        dir = %dir.display(),
        written = summary.written,
        retained = summary.retained,
        "saved collection directory"
    );
    Ok(summary)
}

fn replace_index(config: &StoreConfig, dir: &Path, index: &IndexFile) -> StoreResult<()> {
    let index_path = dir.join(&config.index_file);
    let bytes = index
        .to_bytes(config.pretty_index)
        .map_err(|source| StoreError::Index {
            path: index_path.clone(),
            source,
        })?;

    match config.index_replace {
        IndexReplace::AtomicRename => {
            let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(fsio::io_error(dir))?;
            tmp.write_all(&bytes)
                .and_then(|()| tmp.as_file().sync_all())
                .map_err(fsio::io_error(&index_path))?;
            tmp.persist(&index_path).map_err(|e| StoreError::Io {
                path: index_path.clone(),
                source: e.error,
            })?;
        }
        IndexReplace::CopyOver => {
            let staged = dir.join(format!("{}.new", config.index_file));
            fsio::write(&staged, &bytes)?;
            fsio::copy(&staged, &index_path)?;
            fsio::remove_file(&staged)?;
        }
    }
    debug!(path = %index_path.display(), entries = index.members.len(), "index replaced");
    Ok(())
}

/// A single path component that is neither empty nor a dot entry.
pub(crate) fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(|c| c == '/' || c == '\\' || c == '\0')
}
