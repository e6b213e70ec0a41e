//! Error types for factories and the registry.

use coffer_types::TypeTag;

/// Why a codec could not turn bytes into a payload, or a payload into bytes.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("invalid number {text:?}: {reason}")]
    Number { text: String, reason: String },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by a single member factory.
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    /// The factory was handed a member of another variant.
    #[error("factory for `{expected}` cannot handle member `{name}` of type `{found}`")]
    TypeMismatch {
        expected: TypeTag,
        found: TypeTag,
        name: String,
    },

    /// The bytes are not a valid encoding for the factory's type.
    #[error("failed to parse `{type_tag}` payload: {source}")]
    Parse {
        type_tag: TypeTag,
        #[source]
        source: PayloadError,
    },

    /// The payload could not be encoded.
    #[error("failed to encode `{type_tag}` payload: {source}")]
    Encode {
        type_tag: TypeTag,
        #[source]
        source: PayloadError,
    },
}

/// Convenience alias for factory results.
pub type FactoryResult<T> = Result<T, FactoryError>;

/// Errors raised by registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Registration attempted after [`Registry::finalize`](crate::Registry::finalize).
    #[error("registry is finalized; rejected factory for `{0}`")]
    Finalized(TypeTag),

    /// No factory serves the requested type.
    #[error("no member factory registered for type `{0}`")]
    MissingFactory(TypeTag),

    #[error(transparent)]
    Factory(#[from] FactoryError),
}

/// Convenience alias for registry results.
pub type RegistryResult<T> = Result<T, RegistryError>;
