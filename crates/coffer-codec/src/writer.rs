use crate::error::{CodecError, CodecResult};
use crate::part::PartKey;

/// Appends length-prefixed parts to an in-memory buffer.
#[derive(Debug, Default)]
pub struct PartWriter {
    buf: Vec<u8>,
}

impl PartWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Append a part with a known key.
    pub fn write_part(&mut self, key: PartKey, data: &[u8]) -> CodecResult<()> {
        self.write_raw(key.as_bytes(), data)
    }

    /// Append a part with an arbitrary key.
    pub fn write_raw(&mut self, key: &[u8], data: &[u8]) -> CodecResult<()> {
        let key_len = u8::try_from(key.len()).map_err(|_| CodecError::KeyTooLong(key.len()))?;
        let data_len =
            u32::try_from(data.len()).map_err(|_| CodecError::DataTooLarge(data.len()))?;

        self.buf.reserve(1 + key.len() + 4 + data.len());
        self.buf.push(key_len);
        self.buf.extend_from_slice(key);
        self.buf.extend_from_slice(&data_len.to_le_bytes());
        self.buf.extend_from_slice(data);
        Ok(())
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consume the writer and return the encoded stream.
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}
