use crate::error::{CodecError, CodecResult};

/// Keys understood by the collection stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PartKey {
    /// Collection name (header).
    Name,
    /// Collection timestamp in the header, member timestamp after a `member` part.
    Timestamp,
    /// Starts a new member record; the data is the member name.
    Member,
    /// Type tag of the pending member.
    Type,
    /// Factory-encoded payload of the pending member.
    Data,
}

impl PartKey {
    /// The key as written on the wire.
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            Self::Name => b"name",
            Self::Timestamp => b"timestamp",
            Self::Member => b"member",
            Self::Type => b"type",
            Self::Data => b"data",
        }
    }

    /// Parse a wire key. Unknown keys yield `None`.
    pub fn from_bytes(key: &[u8]) -> Option<Self> {
        match key {
            b"name" => Some(Self::Name),
            b"timestamp" => Some(Self::Timestamp),
            b"member" => Some(Self::Member),
            b"type" => Some(Self::Type),
            b"data" => Some(Self::Data),
            _ => None,
        }
    }
}

/// One key/value part borrowed from an input buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Part<'a> {
    /// Raw key bytes.
    pub raw_key: &'a [u8],
    /// Raw data bytes.
    pub data: &'a [u8],
    /// Offset of the part's first byte in the input.
    pub offset: usize,
}

impl<'a> Part<'a> {
    /// The parsed key, or `None` for keys this version does not know.
    pub fn key(&self) -> Option<PartKey> {
        PartKey::from_bytes(self.raw_key)
    }

    /// The data as UTF-8, replacing invalid sequences.
    pub fn data_lossy(&self) -> std::borrow::Cow<'a, str> {
        String::from_utf8_lossy(self.data)
    }
}

/// Timestamps travel as decimal text.
pub fn encode_timestamp(timestamp_ms: i64) -> Vec<u8> {
    timestamp_ms.to_string().into_bytes()
}

pub fn decode_timestamp(data: &[u8]) -> CodecResult<i64> {
    std::str::from_utf8(data)
        .ok()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .ok_or_else(|| CodecError::InvalidTimestamp(String::from_utf8_lossy(data).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_roundtrip_through_wire_form() {
        for key in [
            PartKey::Name,
            PartKey::Timestamp,
            PartKey::Member,
            PartKey::Type,
            PartKey::Data,
        ] {
            assert_eq!(PartKey::from_bytes(key.as_bytes()), Some(key));
        }
    }

    #[test]
    fn unknown_key() {
        assert_eq!(PartKey::from_bytes(b"color"), None);
        assert_eq!(PartKey::from_bytes(b""), None);
        assert_eq!(PartKey::from_bytes(b"Name"), None);
    }

    #[test]
    fn timestamp_text() {
        assert_eq!(encode_timestamp(-12), b"-12");
        assert_eq!(decode_timestamp(b"1700000000000").unwrap(), 1_700_000_000_000);
        assert_eq!(decode_timestamp(b" 7 ").unwrap(), 7);
    }

    #[test]
    fn bad_timestamp() {
        let err = decode_timestamp(b"soon").unwrap_err();
        assert_eq!(err, CodecError::InvalidTimestamp("soon".into()));
        assert!(decode_timestamp(&[0xff, 0xfe]).is_err());
        assert!(decode_timestamp(b"").is_err());
    }
}
