//! Foundation types for Coffer.
//!
//! This crate provides the data model shared by every other Coffer crate:
//! named, typed, timestamped members and the ordered collections that own
//! them. It knows nothing about encodings; those live behind member factories
//! in `coffer-registry`.
//!
//! # Key Types
//!
//! - [`TypeTag`]: Identifies a member variant and selects its codec
//! - [`Member`]: A named, typed, timestamped payload
//! - [`MemberValue`]: Object-safe bound for member payloads
//! - [`Collection`]: An ordered, named set of owned members
//! - [`Subset`]: An optional allow-list of member names

pub mod collection;
pub mod member;
pub mod subset;
pub mod tag;
pub mod time;

pub use collection::Collection;
pub use member::{Member, MemberValue};
pub use subset::Subset;
pub use tag::TypeTag;
pub use time::now_ms;
