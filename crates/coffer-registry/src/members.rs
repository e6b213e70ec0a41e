//! Built-in member types.
//!
//! Text, string ids, string-id lists, and the four number widths. Numbers and
//! text are stored as plain UTF-8 so collection directories stay readable.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use coffer_types::{Member, MemberValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{PayloadError, RegistryResult};
use crate::factory::{CodecFactory, DisplayColor, MemberCodec};
use crate::registry::Registry;

/// Type tags of the built-in members.
pub mod tags {
    use coffer_types::TypeTag;

    pub const STRING: TypeTag = TypeTag::from_static("String");
    pub const STRING_ID: TypeTag = TypeTag::from_static("String id");
    pub const STRING_ID_VECTOR: TypeTag = TypeTag::from_static("String id vector");
    pub const INT: TypeTag = TypeTag::from_static("Int");
    pub const SIZE_T: TypeTag = TypeTag::from_static("Size t");
    pub const FLOAT: TypeTag = TypeTag::from_static("Float");
    pub const DOUBLE: TypeTag = TypeTag::from_static("Double");
}

/// A short identifier string, kept distinct from free text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StringId(pub String);

impl StringId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StringId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for StringId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------
// Codecs
// ---------------------------------------------------------------

/// Free text, stored verbatim.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextCodec;

impl MemberCodec for TextCodec {
    type Value = String;

    fn extension(&self) -> &str {
        "txt"
    }

    fn encode(&self, value: &String) -> Result<Vec<u8>, PayloadError> {
        Ok(value.as_bytes().to_vec())
    }

    fn decode(&self, data: &[u8]) -> Result<String, PayloadError> {
        Ok(std::str::from_utf8(data)?.to_string())
    }
}

/// A single [`StringId`], stored verbatim.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringIdCodec;

impl MemberCodec for StringIdCodec {
    type Value = StringId;

    fn extension(&self) -> &str {
        "txt"
    }

    fn encode(&self, value: &StringId) -> Result<Vec<u8>, PayloadError> {
        Ok(value.as_str().as_bytes().to_vec())
    }

    fn decode(&self, data: &[u8]) -> Result<StringId, PayloadError> {
        Ok(StringId::new(std::str::from_utf8(data)?))
    }
}

/// A list of [`StringId`]s as a pretty-printed JSON array.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringIdVectorCodec;

impl MemberCodec for StringIdVectorCodec {
    type Value = Vec<StringId>;

    fn extension(&self) -> &str {
        "json"
    }

    fn encode(&self, value: &Vec<StringId>) -> Result<Vec<u8>, PayloadError> {
        Ok(serde_json::to_vec_pretty(value)?)
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<StringId>, PayloadError> {
        Ok(serde_json::from_slice(data)?)
    }
}

/// A number as decimal text.
pub struct NumberCodec<T>(PhantomData<fn() -> T>);

impl<T> NumberCodec<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for NumberCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MemberCodec for NumberCodec<T>
where
    T: MemberValue + Clone + FromStr + fmt::Display,
    T::Err: fmt::Display,
{
    type Value = T;

    fn extension(&self) -> &str {
        "txt"
    }

    fn encode(&self, value: &T) -> Result<Vec<u8>, PayloadError> {
        Ok(value.to_string().into_bytes())
    }

    fn decode(&self, data: &[u8]) -> Result<T, PayloadError> {
        let text = std::str::from_utf8(data)?.trim();
        text.parse::<T>().map_err(|e| PayloadError::Number {
            text: text.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Any serde type as compact JSON.
pub struct JsonCodec<T>(PhantomData<fn() -> T>);

impl<T> JsonCodec<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MemberCodec for JsonCodec<T>
where
    T: MemberValue + Clone + Serialize + DeserializeOwned,
{
    type Value = T;

    fn extension(&self) -> &str {
        "json"
    }

    fn encode(&self, value: &T) -> Result<Vec<u8>, PayloadError> {
        Ok(serde_json::to_vec(value)?)
    }

    fn decode(&self, data: &[u8]) -> Result<T, PayloadError> {
        Ok(serde_json::from_slice(data)?)
    }
}

// ---------------------------------------------------------------
// Registration
// ---------------------------------------------------------------

/// Register factories for every built-in member type.
pub fn register_builtin(registry: &mut Registry) -> RegistryResult<()> {
    registry.register(
        CodecFactory::new(tags::STRING, TextCodec).with_color(DisplayColor::rgb(52, 192, 235)),
    )?;
    registry.register(
        CodecFactory::new(tags::STRING_ID, StringIdCodec)
            .with_color(DisplayColor::rgb(25, 144, 181)),
    )?;
    registry.register(
        CodecFactory::new(tags::STRING_ID_VECTOR, StringIdVectorCodec)
            .with_color(DisplayColor::rgb(8, 146, 189)),
    )?;
    registry.register(
        CodecFactory::new(tags::INT, NumberCodec::<i32>::new())
            .with_color(DisplayColor::rgb(212, 99, 193)),
    )?;
    registry.register(
        CodecFactory::new(tags::SIZE_T, NumberCodec::<u64>::new())
            .with_color(DisplayColor::rgb(166, 63, 148)),
    )?;
    registry.register(
        CodecFactory::new(tags::FLOAT, NumberCodec::<f32>::new())
            .with_color(DisplayColor::rgb(163, 31, 140)),
    )?;
    registry.register(
        CodecFactory::new(tags::DOUBLE, NumberCodec::<f64>::new())
            .with_color(DisplayColor::rgb(212, 11, 177)),
    )?;
    Ok(())
}

// ---------------------------------------------------------------
// Constructors
// ---------------------------------------------------------------

pub fn string(name: impl Into<String>, value: impl Into<String>) -> Member {
    Member::new(name, tags::STRING, value.into())
}

pub fn string_id(name: impl Into<String>, value: impl Into<String>) -> Member {
    Member::new(name, tags::STRING_ID, StringId::new(value))
}

pub fn string_id_vector<I, S>(name: impl Into<String>, ids: I) -> Member
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let ids: Vec<StringId> = ids.into_iter().map(StringId::new).collect();
    Member::new(name, tags::STRING_ID_VECTOR, ids)
}

pub fn int(name: impl Into<String>, value: i32) -> Member {
    Member::new(name, tags::INT, value)
}

pub fn size_t(name: impl Into<String>, value: u64) -> Member {
    Member::new(name, tags::SIZE_T, value)
}

pub fn float(name: impl Into<String>, value: f32) -> Member {
    Member::new(name, tags::FLOAT, value)
}

pub fn double(name: impl Into<String>, value: f64) -> Member {
    Member::new(name, tags::DOUBLE, value)
}
