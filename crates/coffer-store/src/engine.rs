use std::fmt;
use std::path::Path;
use std::sync::Arc;

use coffer_registry::Registry;
use coffer_types::{Collection, Member, Subset};
use tracing::{debug, warn};

use crate::binary;
use crate::config::StoreConfig;
use crate::directory::{self, SaveSummary};
use crate::error::{CloneFailure, StoreError, StoreResult};

/// A member encoded by its factory, ready to be written somewhere.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerializedMember {
    pub data: Vec<u8>,
    /// File extension suggested by the member's factory, without the dot.
    pub extension: String,
}

/// The persistence engine.
///
/// Holds a shared, read-only [`Registry`] and dispatches every member to the
/// factory registered for its type. The engine itself keeps no per-call
/// state, so one engine can serve many threads.
pub struct Engine {
    registry: Arc<Registry>,
    config: StoreConfig,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("types", &self.registry.len())
            .field("config", &self.config)
            .finish()
    }
}

impl Engine {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::with_config(registry, StoreConfig::default())
    }

    pub fn with_config(registry: Arc<Registry>, config: StoreConfig) -> Self {
        if !registry.is_finalized() {
            debug!("engine created over an unfinalized registry");
        }
        Self { registry, config }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // ---------------------------------------------------------------
    // Binary blobs
    // ---------------------------------------------------------------

    /// Encode the whole collection as one blob.
    pub fn save_to_bytes(&self, collection: &Collection) -> StoreResult<Vec<u8>> {
        binary::encode(&self.registry, collection)
    }

    /// Decode a blob into `output`.
    ///
    /// `output` is not cleared first; its name and timestamp are overwritten
    /// by the header. On failure, members decoded before the error remain.
    pub fn load_from_bytes(
        &self,
        data: &[u8],
        output: &mut Collection,
        subset: &Subset,
    ) -> StoreResult<()> {
        binary::decode_into(&self.registry, data, output, subset)
    }

    // ---------------------------------------------------------------
    // Directories
    // ---------------------------------------------------------------

    pub fn load_from_dir(
        &self,
        dir: impl AsRef<Path>,
        output: &mut Collection,
        subset: &Subset,
    ) -> StoreResult<()> {
        directory::load(&self.registry, &self.config, dir.as_ref(), output, subset)
    }

    /// Write the collection as a directory. See [`directory::save`].
    pub fn save_to_dir(
        &self,
        collection: &Collection,
        dir: impl AsRef<Path>,
        append: bool,
    ) -> StoreResult<SaveSummary> {
        directory::save(&self.registry, &self.config, collection, dir.as_ref(), append)
    }

    // ---------------------------------------------------------------
    // Cloning
    // ---------------------------------------------------------------

    /// Deep-copy the members of `source` admitted by `subset` onto the end
    /// of `output`.
    ///
    /// Best effort: a member that cannot be cloned is skipped and the rest
    /// are still copied. Returns the number of members copied, or
    /// [`StoreError::Clone`] listing every failure.
    pub fn clone_append(
        &self,
        source: &Collection,
        output: &mut Collection,
        subset: &Subset,
    ) -> StoreResult<usize> {
        let mut copied = 0;
        let mut failures = Vec::new();
        for member in source.members() {
            if !subset.admits(member.name()) {
                continue;
            }
            match self.registry.clone_member(member) {
                Ok(copy) => {
                    output.add_member(copy);
                    copied += 1;
                }
                Err(error) => {
                    warn!(member = member.name(), error = %error, "failed to clone member");
                    failures.push(CloneFailure {
                        name: member.name().to_string(),
                        error,
                    });
                }
            }
        }

        if failures.is_empty() {
            Ok(copied)
        } else {
            Err(StoreError::Clone(failures))
        }
    }

    /// Deep-copy one member, keeping its name and timestamp.
    pub fn clone_member(&self, member: &Member) -> StoreResult<Member> {
        self.registry
            .clone_member(member)
            .map_err(|e| StoreError::from_registry(member.name(), e))
    }

    /// Encode one member with its factory.
    pub fn serialize_member(&self, member: &Member) -> StoreResult<SerializedMember> {
        let factory = self
            .registry
            .require(member.type_tag())
            .map_err(|e| StoreError::from_registry(member.name(), e))?;
        let data = factory
            .encode(member)
            .map_err(|source| StoreError::Member {
                name: member.name().to_string(),
                source,
            })?;
        Ok(SerializedMember {
            data,
            extension: factory.extension().to_string(),
        })
    }
}
