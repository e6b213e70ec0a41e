//! Whole collections as a single binary blob.
//!
//! Layout, as a sequence of parts:
//!
//! ```text
//! name, timestamp,
//! (member, type, timestamp, data)*
//! ```
//!
//! On load the header closes at the first `member` part. A `timestamp` part
//! belongs to the pending member if there is one, otherwise to the
//! collection. The collection name and timestamp are taken from their first
//! occurrence only. Unknown keys are skipped. Members outside the subset are
//! dropped before any of their parts are parsed.

use coffer_codec::{decode_timestamp, encode_timestamp, Part, PartKey, PartReader, PartWriter};
use coffer_registry::Registry;
use coffer_types::{Collection, Subset, TypeTag};
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};

pub fn encode(registry: &Registry, collection: &Collection) -> StoreResult<Vec<u8>> {
    let mut writer = PartWriter::new();
    writer.write_part(PartKey::Name, collection.name().as_bytes())?;
    writer.write_part(
        PartKey::Timestamp,
        &encode_timestamp(collection.timestamp_ms()),
    )?;

    for member in collection.members() {
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

        writer.write_part(PartKey::Member, member.name().as_bytes())?;
        writer.write_part(PartKey::Type, member.type_tag().as_str().as_bytes())?;
        writer.write_part(PartKey::Timestamp, &encode_timestamp(member.timestamp_ms()))?;
        writer.write_part(PartKey::Data, &data)?;
    }

    debug!(
        collection = collection.name(),
        members = collection.len(),
        bytes = writer.len(),
        "encoded collection"
    );
    Ok(writer.finish())
}

/// Decode a blob into `output`, keeping only members admitted by `subset`.
///
/// Members committed before a failure stay in `output`.
pub fn decode_into(
    registry: &Registry,
    data: &[u8],
    output: &mut Collection,
    subset: &Subset,
) -> StoreResult<()> {
    if data.is_empty() {
        return Err(StoreError::EmptyData);
    }

    let mut decoder = StreamDecoder {
        registry,
        subset,
        output,
        pending: None,
        in_header: true,
        name_seen: false,
        timestamp_seen: false,
    };
    let mut reader = PartReader::new(data);
    while let Some(part) = reader.next_part()? {
        decoder.accept(part)?;
    }
    decoder.commit_pending()
}

/// A member record whose parts are still arriving.
struct PendingMember<'a> {
    name: String,
    type_tag: Option<TypeTag>,
    timestamp: Option<&'a [u8]>,
    data: &'a [u8],
}

struct StreamDecoder<'r, 'o, 'a> {
    registry: &'r Registry,
    subset: &'r Subset,
    output: &'o mut Collection,
    pending: Option<PendingMember<'a>>,
    in_header: bool,
    name_seen: bool,
    timestamp_seen: bool,
}

impl<'a> StreamDecoder<'_, '_, 'a> {
    fn accept(&mut self, part: Part<'a>) -> StoreResult<()> {
        let Some(key) = part.key() else {
            debug!(
                key = %String::from_utf8_lossy(part.raw_key),
                offset = part.offset,
                "skipping unknown part"
            );
            return Ok(());
        };

        match key {
            PartKey::Member => {
                self.commit_pending()?;
                self.in_header = false;
                self.pending = Some(PendingMember {
                    name: part.data_lossy().into_owned(),
                    type_tag: None,
                    timestamp: None,
                    data: &[],
                });
            }
            PartKey::Name if self.in_header && !self.name_seen => {
                self.output.set_name(part.data_lossy());
                self.name_seen = true;
            }
            PartKey::Timestamp => match &mut self.pending {
                Some(pending) => pending.timestamp = Some(part.data),
                None if !self.timestamp_seen => {
                    self.output.set_timestamp_ms(decode_timestamp(part.data)?);
                    self.timestamp_seen = true;
                }
                None => Self::stray(key, part.offset),
            },
            PartKey::Type => match &mut self.pending {
                Some(pending) => pending.type_tag = Some(TypeTag::new(part.data_lossy())),
                None => Self::stray(key, part.offset),
            },
            PartKey::Data => match &mut self.pending {
                Some(pending) => pending.data = part.data,
                None => Self::stray(key, part.offset),
            },
            PartKey::Name => Self::stray(key, part.offset),
        }
        Ok(())
    }

    fn stray(key: PartKey, offset: usize) {
        warn!(
            key = %String::from_utf8_lossy(key.as_bytes()),
            offset,
            "ignoring part outside its record"
        );
    }

    fn commit_pending(&mut self) -> StoreResult<()> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };
        if !self.subset.admits(&pending.name) {
            debug!(member = %pending.name, "skipping member outside subset");
            return Ok(());
        }

        let timestamp_ms = match pending.timestamp {
            Some(raw) => decode_timestamp(raw)?,
            None => 0,
        };
        let type_tag = pending
            .type_tag
            .ok_or_else(|| StoreError::MissingType(pending.name.clone()))?;
        let Some(factory) = self.registry.lookup(type_tag.as_str()) else {
            warn!(member = %pending.name, type_tag = %type_tag, "no factory for stored member");
            return Err(StoreError::UnknownType {
                name: pending.name,
                type_tag,
            });
        };
        let member = match factory.decode(pending.data) {
            Ok(member) => member,
            Err(source) => {
                warn!(
                    member = %pending.name,
                    type_tag = %type_tag,
                    error = %source,
                    "failed to decode member"
                );
                return Err(StoreError::Load {
                    name: pending.name,
                    type_tag,
                    source,
                });
            }
        };
        self.output
            .add_member(member.with_identity(pending.name, timestamp_ms));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coffer_registry::{members, Registrations};

    fn registry() -> Registry {
        Registry::from_registrations(&Registrations::standard()).unwrap()
    }

    fn raw(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut w = PartWriter::new();
        for (key, data) in parts {
            w.write_raw(key.as_bytes(), data.as_bytes()).unwrap();
        }
        w.finish()
    }

    #[test]
    fn header_only() {
        let data = raw(&[("name", "empty"), ("timestamp", "99")]);
        let mut out = Collection::default();
        decode_into(&registry(), &data, &mut out, &Subset::all()).unwrap();
        assert_eq!(out.name(), "empty");
        assert_eq!(out.timestamp_ms(), 99);
        assert!(out.is_empty());
    }

    #[test]
    fn unknown_keys_are_skipped() {
        let data = raw(&[
            ("name", "c"),
            ("comment", "ignored"),
            ("member", "n"),
            ("type", "Int"),
            ("color", "red"),
            ("data", "3"),
        ]);
        let mut out = Collection::default();
        decode_into(&registry(), &data, &mut out, &Subset::all()).unwrap();
        assert_eq!(out.value::<i32>("n"), Some(&3));
    }

    #[test]
    fn name_after_header_is_ignored() {
        let data = raw(&[
            ("name", "first"),
            ("member", "n"),
            ("type", "Int"),
            ("data", "3"),
            ("name", "second"),
        ]);
        let mut out = Collection::default();
        decode_into(&registry(), &data, &mut out, &Subset::all()).unwrap();
        assert_eq!(out.name(), "first");
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn repeated_header_parts_are_ignored() {
        let data = raw(&[
            ("name", "first"),
            ("timestamp", "1"),
            ("name", "second"),
            ("timestamp", "2"),
        ]);
        let mut out = Collection::default();
        decode_into(&registry(), &data, &mut out, &Subset::all()).unwrap();
        assert_eq!(out.name(), "first");
        assert_eq!(out.timestamp_ms(), 1);
    }

    #[test]
    fn member_without_type_fails() {
        let data = raw(&[("name", "c"), ("member", "n"), ("data", "3")]);
        let mut out = Collection::default();
        let err = decode_into(&registry(), &data, &mut out, &Subset::all()).unwrap_err();
        assert!(matches!(err, StoreError::MissingType(ref n) if n == "n"));
    }

    #[test]
    fn skipped_members_are_not_validated() {
        // The skipped member has neither a known type nor a valid payload.
        let data = raw(&[
            ("member", "skip"),
            ("type", "Nope"),
            ("data", "garbage"),
            ("member", "keep"),
            ("type", "Int"),
            ("data", "1"),
        ]);
        let mut out = Collection::default();
        decode_into(&registry(), &data, &mut out, &Subset::of(["keep"])).unwrap();
        assert_eq!(out.names().collect::<Vec<_>>(), ["keep"]);
    }

    #[test]
    fn type_and_data_before_first_member_are_ignored() {
        let data = raw(&[
            ("name", "c"),
            ("type", "Nope"),
            ("data", "zzz"),
            ("member", "n"),
            ("type", "Int"),
            ("data", "4"),
        ]);
        let mut out = Collection::default();
        decode_into(&registry(), &data, &mut out, &Subset::all()).unwrap();
        assert_eq!(out.name(), "c");
        assert_eq!(out.names().collect::<Vec<_>>(), ["n"]);
        assert_eq!(out.value::<i32>("n"), Some(&4));
    }

    #[test]
    fn skipped_member_timestamp_is_not_parsed() {
        let data = raw(&[
            ("member", "skip"),
            ("type", "Int"),
            ("timestamp", "garbage"),
            ("data", "1"),
            ("member", "keep"),
            ("type", "Int"),
            ("timestamp", "12"),
            ("data", "2"),
        ]);
        let mut out = Collection::default();
        decode_into(&registry(), &data, &mut out, &Subset::of(["keep"])).unwrap();
        assert_eq!(out.names().collect::<Vec<_>>(), ["keep"]);
        assert_eq!(out.member("keep").unwrap().timestamp_ms(), 12);

        let err = decode_into(&registry(), &data, &mut Collection::default(), &Subset::all())
            .unwrap_err();
        assert!(matches!(err, StoreError::Stream(_)));
    }

    #[test]
    fn bad_timestamp_is_format_error() {
        let data = raw(&[("name", "c"), ("timestamp", "soon")]);
        let mut out = Collection::default();
        let err = decode_into(&registry(), &data, &mut out, &Subset::all()).unwrap_err();
        assert!(matches!(err, StoreError::Stream(_)));
    }

    #[test]
    fn encode_writes_parts_in_order() {
        let mut c = Collection::new("c");
        c.set_timestamp_ms(5);
        let mut m = members::string("greeting", "hi");
        m.set_timestamp_ms(6);
        c.add_member(m);

        let bytes = encode(&registry(), &c).unwrap();
        let parts: Vec<(String, String)> = PartReader::new(&bytes)
            .map(|p| {
                let p = p.unwrap();
                (
                    String::from_utf8_lossy(p.raw_key).into_owned(),
                    p.data_lossy().into_owned(),
                )
            })
            .collect();
        let expected = [
            ("name", "c"),
            ("timestamp", "5"),
            ("member", "greeting"),
            ("type", "String"),
            ("timestamp", "6"),
            ("data", "hi"),
        ];
        assert_eq!(parts.len(), expected.len());
        for ((k, d), (ek, ed)) in parts.iter().zip(expected) {
            assert_eq!(k, ek);
            assert_eq!(d, ed);
        }
    }
}
