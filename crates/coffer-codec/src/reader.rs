use crate::error::{CodecError, CodecResult};
use crate::part::Part;

/// Reads parts front-to-back from a borrowed buffer.
///
/// The reader stops cleanly at the end of the buffer. Any part whose declared
/// key or data length runs past the end is a [`CodecError::Truncated`].
#[derive(Debug)]
pub struct PartReader<'a> {
    data: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> PartReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            failed: false,
        }
    }

    /// Offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Read the next part. `Ok(None)` at end of input.
    pub fn next_part(&mut self) -> CodecResult<Option<Part<'a>>> {
        if self.pos >= self.data.len() {
            return Ok(None);
        }
        let offset = self.pos;
        let mut pos = self.pos;

        let key_len = self.data[pos] as usize;
        pos += 1;
        let raw_key = self.read_slice(offset, &mut pos, key_len)?;

        let len_bytes = self.read_slice(offset, &mut pos, 4)?;
        let data_len =
            u32::from_le_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]) as usize;
        let data = self.read_slice(offset, &mut pos, data_len)?;

        self.pos = pos;
        Ok(Some(Part {
            raw_key,
            data,
            offset,
        }))
    }

    fn read_slice(
        &self,
        offset: usize,
        pos: &mut usize,
        count: usize,
    ) -> CodecResult<&'a [u8]> {
        let available = self.data.len() - *pos;
        if count > available {
            return Err(CodecError::Truncated {
                offset,
                needed: count,
                available,
            });
        }
        let slice = &self.data[*pos..*pos + count];
        *pos += count;
        Ok(slice)
    }
}

impl<'a> Iterator for PartReader<'a> {
    type Item = CodecResult<Part<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_part() {
            Ok(part) => part.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
