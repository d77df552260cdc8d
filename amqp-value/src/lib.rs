//! Encoding of the AMQP 0-10 variant model: scalars, strings, lists and maps, nested arbitrarily.
//!
//! Encoding happens in two passes. The size calculator (`size`) computes how many bytes a value will occupy,
//! then the `Encoder` writes exactly that many bytes into a `Sink`. Lists and maps are framed by a 4 byte length
//! of everything after the length field, so the length has to be known before the body is written. The
//! `Measured` token ties the two passes together: it is only produced by measuring a composite and it keeps the
//! composite borrowed until the encoder consumes it.
//!
//! # A note on the length field
//!
//! The length field of a composite covers its 4 byte element count as well as its elements. An empty list thus
//! encodes as `a9 00000004 00000000`: type code, a length of 4 and a count of zero.
//!
//! # A note on Maps
//!
//! `Map` keeps its pairs in a `Vec` because insertion order is part of the encoded output; keys are written in
//! the order they were first inserted. Keys are AMQP `str8` and therefore at most 255 bytes long.
//!
//! # Examples
//!
//! ```
//! use amqp_value::*;
//!
//! let mut map = Map::new();
//! map.insert("key", "value");
//! let measured = Measured::map(&map).unwrap();
//! assert_eq!(15, measured.body_len());
//!
//! let mut buf = bytes::BytesMut::with_capacity(measured.wire_len());
//! Encoder::new(&mut buf).encode_measured(measured).unwrap();
//! assert_eq!(&buf[..], &[
//!     0x00, 0x00, 0x00, 0x0f, // body length 15
//!     0x00, 0x00, 0x00, 0x01, // one pair
//!     0x03,                   // key of length 3
//!     0x6b, 0x65, 0x79,       // 'k' 'e' 'y'
//!     0x85,                   // str8
//!     0x05,                   // length 5
//!     0x76, 0x61, 0x6c, 0x75, 0x65, // 'v' 'a' 'l' 'u' 'e'
//! ]);
//! ```

mod code;
mod encoder;
mod error;
mod measured;
mod sink;
mod value;
pub mod size;

#[cfg(test)]
mod reader;

pub use code::*;
pub use encoder::*;
pub use error::*;
pub use measured::*;
pub use sink::*;
pub use size::EncodedSize;
pub use value::*;
