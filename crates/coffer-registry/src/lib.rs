//! Member factories and the type registry for Coffer.
//!
//! Every member type is served by exactly one [`MemberFactory`], which knows
//! how to encode, decode and deep-clone members of that type. Factories are
//! collected in a [`Registry`] keyed by [`TypeTag`](coffer_types::TypeTag).
//!
//! # Lifecycle
//!
//! 1. A composition root builds a [`Registrations`] list of callbacks, one per
//!    module that provides member types.
//! 2. [`Registry::from_registrations`] runs them in order and finalizes.
//! 3. The finalized registry is shared read-only (typically in an `Arc`) with
//!    the persistence engine in `coffer-store`.
//!
//! Most member types only need a [`MemberCodec`] for their payload type;
//! [`CodecFactory`] turns one into a factory and performs the variant check.

pub mod error;
pub mod factory;
pub mod members;
pub mod registration;
pub mod registry;

pub use error::{FactoryError, FactoryResult, PayloadError, RegistryError, RegistryResult};
pub use factory::{CodecFactory, DisplayColor, MemberCodec, MemberFactory};
pub use members::{register_builtin, StringId};
pub use registration::{RegisterFn, Registrations};
pub use registry::Registry;
