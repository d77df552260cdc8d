use std::str::Utf8Error;

pub type Result<T> = std::result::Result<T, EncodeError>;

/// Failures of the size calculator and the encoder. None of them are retried internally.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// The byte length of a string exceeds what its length prefix can hold.
    #[error("string of {len} bytes exceeds maximum {max}")]
    OversizeString { len: usize, max: usize },

    /// A type code outside the closed set of value kinds.
    #[error("unsupported type code 0x{0:02x}")]
    UnsupportedKind(u8),

    /// The sink cannot accept the bytes of the current write.
    #[error("sink exhausted: {needed} bytes needed, {remaining} remaining")]
    SinkExhausted { needed: usize, remaining: usize },

    /// The body length handed to the encoder does not match the composite.
    #[error("composite body length {expected} given, {actual} computed")]
    SizeMismatch { expected: u32, actual: u32 },

    /// A composite whose size or element count does not fit into 32 bits.
    #[error("composite of {0} exceeds 32 bit length field")]
    CompositeTooLarge(usize),
}

/// Rejected `Str` construction.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("bytes are not valid Utf-8: {0}")]
    Utf8(#[from] Utf8Error),

    #[error("non-ascii byte at position {position}")]
    NotAscii { position: usize },

    #[error("utf-16 payload of odd length {0}")]
    OddUtf16Length(usize),
}
