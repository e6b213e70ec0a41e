use std::fmt;

use coffer_types::{Member, MemberValue, TypeTag};
use serde::{Deserialize, Serialize};

use crate::error::{FactoryError, FactoryResult, PayloadError};

/// UI color hint attached to a factory.
///
/// Carried through registration untouched; the persistence engine never
/// reads it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl DisplayColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Codec for one member type.
///
/// Implementations must satisfy these invariants:
/// - `decode(encode(m))` reproduces the payload of `m`.
/// - `decode` and `clone_member` return a member with an empty name and a
///   zero timestamp. Assigning identity is the caller's job.
/// - `clone_member` returns an owned deep copy; the result shares nothing
///   with the source.
/// - `encode` and `clone_member` reject members of any other variant with
///   [`FactoryError::TypeMismatch`].
pub trait MemberFactory: fmt::Debug + Send + Sync {
    /// The type tag this factory serves.
    fn type_tag(&self) -> &TypeTag;

    /// File suffix for members written to a collection directory.
    fn extension(&self) -> &str;

    /// Optional UI hint.
    fn display_color(&self) -> Option<DisplayColor> {
        None
    }

    /// Encode a member's payload.
    fn encode(&self, member: &Member) -> FactoryResult<Vec<u8>>;

    /// Decode a payload into a fresh, unnamed member.
    fn decode(&self, data: &[u8]) -> FactoryResult<Member>;

    /// Deep-copy a member's payload into a fresh, unnamed member.
    fn clone_member(&self, member: &Member) -> FactoryResult<Member>;
}

/// Payload-level codec for a single concrete value type.
///
/// Wrap in a [`CodecFactory`] to get a [`MemberFactory`]. The adapter does the
/// variant check once per call, so codecs only ever see their own type.
pub trait MemberCodec: Send + Sync + 'static {
    type Value: MemberValue + Clone;

    fn extension(&self) -> &str;

    fn encode(&self, value: &Self::Value) -> Result<Vec<u8>, PayloadError>;

    fn decode(&self, data: &[u8]) -> Result<Self::Value, PayloadError>;
}

/// A [`MemberFactory`] built from a type tag and a [`MemberCodec`].
pub struct CodecFactory<C> {
    type_tag: TypeTag,
    codec: C,
    color: Option<DisplayColor>,
}

impl<C: MemberCodec> CodecFactory<C> {
    pub fn new(type_tag: TypeTag, codec: C) -> Self {
        Self {
            type_tag,
            codec,
            color: None,
        }
    }

    pub fn with_color(mut self, color: DisplayColor) -> Self {
        self.color = Some(color);
        self
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    fn typed<'m>(&self, member: &'m Member) -> FactoryResult<&'m C::Value> {
        let value = if member.type_tag() == &self.type_tag {
            member.downcast_ref::<C::Value>()
        } else {
            None
        };
        value.ok_or_else(|| FactoryError::TypeMismatch {
            expected: self.type_tag.clone(),
            found: member.type_tag().clone(),
            name: member.name().to_string(),
        })
    }
}

impl<C: MemberCodec> MemberFactory for CodecFactory<C> {
    fn type_tag(&self) -> &TypeTag {
        &self.type_tag
    }

    fn extension(&self) -> &str {
        self.codec.extension()
    }

    fn display_color(&self) -> Option<DisplayColor> {
        self.color
    }

    fn encode(&self, member: &Member) -> FactoryResult<Vec<u8>> {
        let value = self.typed(member)?;
        self.codec
            .encode(value)
            .map_err(|source| FactoryError::Encode {
                type_tag: self.type_tag.clone(),
                source,
            })
    }

    fn decode(&self, data: &[u8]) -> FactoryResult<Member> {
        let value = self
            .codec
            .decode(data)
            .map_err(|source| FactoryError::Parse {
                type_tag: self.type_tag.clone(),
                source,
            })?;
        Ok(Member::unnamed(self.type_tag.clone(), value))
    }

    fn clone_member(&self, member: &Member) -> FactoryResult<Member> {
        let value = self.typed(member)?.clone();
        Ok(Member::unnamed(self.type_tag.clone(), value))
    }
}

impl<C: MemberCodec> fmt::Debug for CodecFactory<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecFactory")
            .field("type_tag", &self.type_tag)
            .field("extension", &self.codec.extension())
            .field("color", &self.color)
            .finish()
    }
}
