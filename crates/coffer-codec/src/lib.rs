//! Binary part codec for Coffer.
//!
//! A Coffer blob is a flat stream of length-prefixed key/value parts:
//!
//! ```text
//! [1 byte: key length][key bytes][4 bytes: data length (little-endian u32)][data bytes]
//! ```
//!
//! This crate only frames and unframes parts. Which keys appear and in what
//! order is decided by the persistence engine in `coffer-store`.

pub mod error;
pub mod part;
pub mod reader;
pub mod writer;

pub use error::{CodecError, CodecResult};
pub use part::{decode_timestamp, encode_timestamp, Part, PartKey};
pub use reader::PartReader;
pub use writer::PartWriter;
