use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("part truncated at offset {offset}: need {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("part key too long: {0} bytes (max 255)")]
    KeyTooLong(usize),

    #[error("part data too large: {0} bytes (max 4 GiB)")]
    DataTooLarge(usize),

    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),
}

pub type CodecResult<T> = Result<T, CodecError>;
