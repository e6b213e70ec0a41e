//! Error types for the persistence engine.

use std::fmt;
use std::path::PathBuf;

use coffer_codec::CodecError;
use coffer_registry::{FactoryError, RegistryError};
use coffer_types::TypeTag;

/// Broad classification of a [`StoreError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No factory for a type, or a value the engine cannot store as given.
    Configuration,
    /// Truncated or malformed binary stream or index.
    Format,
    /// A factory could not decode or encode its own payload.
    Parse,
    /// A factory was handed a member of another variant.
    TypeMismatch,
    /// File system failure.
    Io,
    /// Non-append save into an existing directory.
    AlreadyExists,
}

/// Errors from persistence engine operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No factory is registered for a member being saved, cloned or
    /// serialized.
    #[error("no member factory registered for type `{type_tag}` (member `{name}`)")]
    MissingFactory { name: String, type_tag: TypeTag },

    /// The member name cannot be used as a file name.
    #[error("invalid member name {0:?}: not usable as a file name")]
    InvalidMemberName(String),

    /// A factory rejected a member while encoding or cloning it.
    #[error("member `{name}`: {source}")]
    Member {
        name: String,
        #[source]
        source: FactoryError,
    },

    /// Loading was asked to decode zero bytes.
    #[error("data is empty")]
    EmptyData,

    /// The binary stream could not be framed.
    #[error("malformed stream: {0}")]
    Stream(#[from] CodecError),

    /// A stored member record carries no type.
    #[error("member `{0}` has no type")]
    MissingType(String),

    /// A stored member's type has no registered factory.
    #[error("unknown type `{type_tag}` for stored member `{name}`")]
    UnknownType { name: String, type_tag: TypeTag },

    /// A stored member's payload failed to decode.
    #[error("failed to load member `{name}` of type `{type_tag}`: {source}")]
    Load {
        name: String,
        type_tag: TypeTag,
        #[source]
        source: FactoryError,
    },

    /// An index entry points outside its collection directory.
    #[error("index entry for `{name}` has unsafe file name {file_name:?}")]
    UnsafeFileName { name: String, file_name: String },

    /// The index file is not valid JSON of the expected shape.
    #[error("malformed index {path}: {source}")]
    Index {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("output directory already exists: {0}")]
    AlreadyExists(PathBuf),

    /// One or more members failed during clone/append. Members that cloned
    /// successfully were still added to the output.
    #[error("{} member(s) failed to clone: {}", .0.len(), list_failures(.0))]
    Clone(Vec<CloneFailure>),

    #[error(transparent)]
    Registry(RegistryError),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingFactory { .. } | Self::InvalidMemberName(_) => ErrorKind::Configuration,
            Self::Member { source, .. } => factory_kind(source),
            Self::EmptyData
            | Self::Stream(_)
            | Self::MissingType(_)
            | Self::UnknownType { .. }
            | Self::Load { .. }
            | Self::UnsafeFileName { .. }
            | Self::Index { .. } => ErrorKind::Format,
            Self::Io { .. } => ErrorKind::Io,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::Clone(failures) => failures
                .first()
                .map(CloneFailure::kind)
                .unwrap_or(ErrorKind::Configuration),
            Self::Registry(e) => registry_kind(e),
        }
    }

    /// Attach a member name to a registry error.
    pub(crate) fn from_registry(name: &str, error: RegistryError) -> Self {
        match error {
            RegistryError::MissingFactory(type_tag) => Self::MissingFactory {
                name: name.to_string(),
                type_tag,
            },
            RegistryError::Factory(source) => Self::Member {
                name: name.to_string(),
                source,
            },
            other => Self::Registry(other),
        }
    }
}

/// A single member that clone/append could not copy.
#[derive(Debug)]
pub struct CloneFailure {
    pub name: String,
    pub error: RegistryError,
}

impl CloneFailure {
    pub fn kind(&self) -> ErrorKind {
        registry_kind(&self.error)
    }
}

impl fmt::Display for CloneFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`: {}", self.name, self.error)
    }
}

fn list_failures(failures: &[CloneFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn factory_kind(error: &FactoryError) -> ErrorKind {
    match error {
        FactoryError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
        FactoryError::Parse { .. } | FactoryError::Encode { .. } => ErrorKind::Parse,
    }
}

fn registry_kind(error: &RegistryError) -> ErrorKind {
    match error {
        RegistryError::Finalized(_) | RegistryError::MissingFactory(_) => {
            ErrorKind::Configuration
        }
        RegistryError::Factory(e) => factory_kind(e),
    }
}

/// Convenience alias for store results.
pub type StoreResult<T> = Result<T, StoreError>;
