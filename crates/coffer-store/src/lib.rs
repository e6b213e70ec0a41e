//! Persistence engine for Coffer collections.
//!
//! The [`Engine`] turns a [`Collection`](coffer_types::Collection) into one
//! of two on-disk shapes and back:
//!
//! - **Binary blob**: a flat stream of key/value parts (see `coffer-codec`),
//!   suitable for embedding in another file or sending over a wire.
//! - **Directory**: one file per member named `<member>.<ext>`, plus an
//!   `index.json` listing name, file name, type and timestamp of each member.
//!   Saves can append to an existing directory, replacing same-named entries.
//!
//! Every member goes through the factory registered for its type tag in the
//! engine's [`Registry`](coffer_registry::Registry). Loads accept a
//! [`Subset`](coffer_types::Subset) to restrict which members are
//! materialized.

pub mod binary;
pub mod config;
pub mod directory;
pub mod engine;
pub mod error;
mod fsio;
pub mod index;

pub use config::{IndexReplace, StoreConfig};
pub use directory::SaveSummary;
pub use engine::{Engine, SerializedMember};
pub use error::{CloneFailure, ErrorKind, StoreError, StoreResult};
pub use index::{IndexEntry, IndexFile, DEFAULT_INDEX_FILE};
