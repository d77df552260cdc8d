//! Writes values into a `Sink`, mirroring `size` one to one.
//!
//! `encode` writes a value's payload but never its type code; whoever places the value (a list, a map or a
//! top level caller through `encode_tagged`) writes the code in front of it. Composites are framed by their
//! body length as the size calculator reports it, followed by their element count.

use crate::error::{EncodeError, Result};
use crate::measured::{Composite, Measured};
use crate::sink::Sink;
use crate::size;
use crate::value::{LengthClass, Map, Str, Value};
use bytes::BytesMut;
use std::convert::TryFrom;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Recompute the body length handed to `encode_list` and `encode_map` and refuse to write on a mismatch.
    pub verify_lengths: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self { verify_lengths: cfg!(debug_assertions) }
    }
}

pub struct Encoder<'s, S: Sink + ?Sized> {
    sink: &'s mut S,
    config: EncoderConfig,
}

impl<'s, S: Sink + ?Sized> Encoder<'s, S> {

    pub fn new(sink: &'s mut S) -> Self {
        Self::with_config(sink, EncoderConfig::default())
    }

    pub fn with_config(sink: &'s mut S, config: EncoderConfig) -> Self {
        Self { sink, config }
    }

    pub fn config(&self) -> EncoderConfig {
        self.config
    }

    /// Encode the payload of a value. Nested composites are measured on the way down to obtain their length fields.
    pub fn encode(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Void     => Ok(()),
            Value::Bool(v)  => self.sink.put_u8(u8::from(*v)),
            Value::U8(v)    => self.sink.put_u8(*v),
            Value::U16(v)   => self.sink.put_u16(*v),
            Value::U32(v)   => self.sink.put_u32(*v),
            Value::U64(v)   => self.sink.put_u64(*v),
            Value::I8(v)    => self.sink.put_i8(*v),
            Value::I16(v)   => self.sink.put_i16(*v),
            Value::I32(v)   => self.sink.put_i32(*v),
            Value::I64(v)   => self.sink.put_i64(*v),
            Value::F32(v)   => self.sink.put_f32(*v),
            Value::F64(v)   => self.sink.put_f64(*v),
            Value::Uuid(v)  => self.sink.put_slice(v.as_bytes()),
            Value::Str(v)   => self.encode_string(v),
            Value::List(v)  => {
                let body_len = size::list(v)?;
                self.write_list(v, body_len)
            },
            Value::Map(v)   => {
                let body_len = size::map(v)?;
                self.write_map(v, body_len)
            },
        }
    }

    /// Encode a value preceded by its type code.
    pub fn encode_tagged(&mut self, value: &Value) -> Result<()> {
        self.sink.put_u8(value.type_code()?.to_u8())?;
        self.encode(value)
    }

    /// Length prefix at the width the length class demands, then the bytes verbatim.
    pub fn encode_string(&mut self, value: &Str) -> Result<()> {
        match value.length_class()? {
            LengthClass::Short => self.sink.put_u8(value.len() as u8)?,
            LengthClass::Long  => self.sink.put_u16(value.len() as u16)?,
        }
        self.sink.put_slice(value.as_bytes())
    }

    pub fn encode_key(&mut self, key: &str) -> Result<()> {
        size::key(key)?;
        self.sink.put_u8(key.len() as u8)?;
        self.sink.put_slice(key.as_bytes())
    }

    /// `total_body_len` must be what `size::list` returns for `values`. It is only checked if the encoder was
    /// configured to verify lengths.
    pub fn encode_list(&mut self, values: &[Value], total_body_len: u32) -> Result<()> {
        self.verify(values, total_body_len)?;
        self.write_list(values, total_body_len)
    }

    /// `total_body_len` must be what `size::map` returns for `map`. It is only checked if the encoder was
    /// configured to verify lengths.
    pub fn encode_map(&mut self, map: &Map, total_body_len: u32) -> Result<()> {
        self.verify(map, total_body_len)?;
        self.write_map(map, total_body_len)
    }

    /// Encode a composite with the length it was measured with.
    pub fn encode_measured<C: Composite + ?Sized>(&mut self, measured: Measured<'_, C>) -> Result<()> {
        measured.write(self)
    }

    pub(crate) fn write_list(&mut self, values: &[Value], body_len: u32) -> Result<()> {
        trace!(count = values.len(), body_len, "writing list");
        self.sink.put_u32(body_len)?;
        self.sink.put_u32(Self::count(values.len())?)?;
        for value in values {
            self.encode_tagged(value)?;
        }
        Ok(())
    }

    pub(crate) fn write_map(&mut self, map: &Map, body_len: u32) -> Result<()> {
        trace!(count = map.len(), body_len, "writing map");
        self.sink.put_u32(body_len)?;
        self.sink.put_u32(Self::count(map.len())?)?;
        for (key, value) in map.iter() {
            self.encode_key(key)?;
            self.encode_tagged(value)?;
        }
        Ok(())
    }

    fn verify<C: Composite + ?Sized>(&self, composite: &C, expected: u32) -> Result<()> {
        if !self.config.verify_lengths {
            return Ok(());
        }
        let actual = composite.body_len()?;
        if actual != expected {
            debug!(expected, actual, kind = C::CODE.name(), "body length does not match composite");
            return Err(EncodeError::SizeMismatch { expected, actual });
        }
        Ok(())
    }

    #[inline]
    fn count(len: usize) -> Result<u32> {
        u32::try_from(len).map_err(|_| EncodeError::CompositeTooLarge(len))
    }

}

/// Encode a value with its type code into a buffer allocated once at the exact size.
pub fn to_bytes(value: &Value) -> Result<BytesMut> {
    let len = size::tagged(value)?;
    let mut buf = BytesMut::with_capacity(len);
    Encoder::new(&mut buf).encode_tagged(value)?;
    Ok(buf)
}

/// Encode a map the way a field table argument carries it: length, count and pairs, without a type code.
pub fn map_to_bytes(map: &Map) -> Result<BytesMut> {
    let measured = Measured::map(map)?;
    let mut buf = BytesMut::with_capacity(measured.wire_len());
    Encoder::new(&mut buf).encode_measured(measured)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::{map_to_bytes, to_bytes, Encoder, EncoderConfig};
    use crate::error::EncodeError;
    use crate::measured::Measured;
    use crate::reader::Reader;
    use crate::sink::FixedSink;
    use crate::size;
    use crate::value::{Encoding, Map, Str, Value};
    use uuid::Uuid;

    fn scalars() -> Vec<Value> {
        vec![
            Value::Void,
            Value::Bool(true),
            Value::Bool(false),
            Value::U8(u8::MAX),
            Value::U16(0x0102),
            Value::U32(u32::MAX),
            Value::U64(u64::MAX),
            Value::I8(i8::MIN),
            Value::I16(-2),
            Value::I32(i32::MIN),
            Value::I64(i64::MAX),
            Value::F32(std::f32::consts::PI),
            Value::F64(f64::MIN),
            Value::Uuid(Uuid::from_u128(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef)),
            Value::from("Üben von Xylophon und Querflöte ist ja zweckmäßig."),
            Value::Str(Str::binary(vec![1, 2, 3, 4, 255])),
            Value::Str(Str::ascii("plain").unwrap()),
            Value::Str(Str::utf16("Jessica")),
            Value::Str(Str::utf8("x".repeat(300))),
            Value::Str(Str::binary(vec![0u8; 65535])),
        ]
    }

    /// Lists of maps of lists, `depth` levels deep, with every scalar at every level.
    fn nested(depth: usize) -> Value {
        let mut value = Value::List(scalars());
        for level in 0..depth {
            let mut map = Map::new();
            map.insert(format!("level{}", level), value.clone());
            map.insert("scalars", Value::List(scalars()));
            map.insert("empty", Value::Map(Map::new()));
            value = Value::List(vec![Value::Map(map), Value::List(Vec::new()), Value::I32(level as i32)]);
        }
        value
    }

    fn corpus() -> Vec<Value> {
        let mut values = scalars();
        values.push(Value::List(Vec::new()));
        values.push(Value::Map(Map::new()));
        for depth in 1..=4 {
            values.push(nested(depth));
        }
        values
    }

    #[test]
    fn size_equals_written_bytes() {
        for value in corpus() {
            let len = size::tagged(&value).unwrap();
            let mut region = vec![0u8; len];
            let mut sink = FixedSink::new(&mut region);
            Encoder::new(&mut sink).encode_tagged(&value).unwrap();
            assert!(sink.is_full(), "{} wrote {} of {} bytes", value.typename(), sink.position(), len);
        }
    }

    #[test]
    fn payload_size_equals_written_bytes() {
        for value in corpus() {
            let mut buf: Vec<u8> = Vec::new();
            Encoder::new(&mut buf).encode(&value).unwrap();
            assert_eq!(size::value(&value).unwrap() as usize, buf.len());
        }
    }

    #[test]
    fn one_byte_short_is_reported() {
        for value in corpus().into_iter().filter(|v| size::tagged(v).unwrap() > 1) {
            let len = size::tagged(&value).unwrap();
            let mut region = vec![0u8; len - 1];
            let mut sink = FixedSink::new(&mut region);
            let result = Encoder::new(&mut sink).encode_tagged(&value);
            assert!(matches!(result, Err(EncodeError::SinkExhausted { .. })), "{:?}", result);
        }
    }

    #[test]
    fn roundtrip() {
        for value in corpus() {
            let buf = to_bytes(&value).unwrap();
            let mut reader = Reader::new(&buf);
            assert_eq!(value, reader.read_tagged().unwrap());
            assert!(reader.is_empty());
        }
    }

    #[test]
    fn length_class_threshold() {
        let buf = to_bytes(&Value::Str(Str::utf8("a".repeat(255)))).unwrap();
        assert_eq!(&[0x85, 0xff], &buf[..2]);
        assert_eq!(257, buf.len());
        let buf = to_bytes(&Value::Str(Str::utf8("a".repeat(256)))).unwrap();
        assert_eq!(&[0x95, 0x01, 0x00], &buf[..3]);
        assert_eq!(259, buf.len());
        let oversize = Value::Str(Str::binary(vec![0u8; 65536]));
        assert_eq!(Err(EncodeError::OversizeString { len: 65536, max: 65535 }), to_bytes(&oversize).map(|_| ()));
        let mut buf: Vec<u8> = Vec::new();
        assert!(matches!(Encoder::new(&mut buf).encode(&oversize), Err(EncodeError::OversizeString { .. })));
        assert!(buf.is_empty());
    }

    #[test]
    fn empty_composites() {
        assert_eq!(&[0xa9, 0, 0, 0, 4, 0, 0, 0, 0], &to_bytes(&Value::List(Vec::new())).unwrap()[..]);
        assert_eq!(&[0xa8, 0, 0, 0, 4, 0, 0, 0, 0], &to_bytes(&Value::Map(Map::new())).unwrap()[..]);
    }

    #[test]
    fn map_bytes() {
        let mut map = Map::new();
        map.insert("b", Value::Bool(true));
        map.insert("a", Value::U16(0x0102));
        assert_eq!(&[
            0x00, 0x00, 0x00, 0x0d, // body length
            0x00, 0x00, 0x00, 0x02, // count
            0x01, b'b',             // str8 key
            0x08, 0x01,             // boolean true
            0x01, b'a',             // str8 key
            0x12, 0x01, 0x02,       // uint16
        ], &map_to_bytes(&map).unwrap()[..]);
    }

    #[test]
    fn key_order_is_insertion_order() {
        let map = Map::from(vec![("b", Value::Void), ("a", Value::Void)]);
        let buf = map_to_bytes(&map).unwrap();
        assert_eq!(&[0x01, b'b', 0xf0, 0x01, b'a', 0xf0], &buf[8..]);
    }

    #[test]
    fn string_encodings() {
        let mut buf: Vec<u8> = Vec::new();
        let mut encoder = Encoder::new(&mut buf);
        for encoding in [Encoding::Binary, Encoding::Ascii, Encoding::Utf8, Encoding::Utf16] {
            encoder.encode_tagged(&Value::Str(Str::new(vec![0x00, 0x41], encoding).unwrap())).unwrap();
            encoder.encode_tagged(&Value::Str(Str::new(vec![0x41; 256], encoding).unwrap())).unwrap();
        }
        let mut reader = Reader::new(&buf);
        for code in [0x80, 0x84, 0x85, 0x86] {
            assert_eq!(code, reader.peek_code());
            reader.read_tagged().unwrap();
            assert_eq!(code | 0x10, reader.peek_code());
            reader.read_tagged().unwrap();
        }
    }

    #[test]
    fn oversize_key() {
        let map = Map::from(vec![("k".repeat(256), Value::Void)]);
        assert_eq!(Err(EncodeError::OversizeString { len: 256, max: 255 }), map_to_bytes(&map).map(|_| ()));
    }

    #[test]
    fn size_mismatch_when_verifying() {
        let values = vec![Value::I32(1), Value::I32(2)];
        let mut buf: Vec<u8> = Vec::new();
        let mut encoder = Encoder::with_config(&mut buf, EncoderConfig { verify_lengths: true });
        assert_eq!(Err(EncodeError::SizeMismatch { expected: 7, actual: 14 }), encoder.encode_list(&values, 7));
        encoder.encode_list(&values, 14).unwrap();
        assert_eq!(4 + 14, buf.len());
    }

    #[test]
    fn trusted_length_without_verifying() {
        let map = Map::from(vec![("k", Value::U8(1))]);
        let mut buf: Vec<u8> = Vec::new();
        Encoder::with_config(&mut buf, EncoderConfig { verify_lengths: false }).encode_map(&map, 99).unwrap();
        assert_eq!(&[0, 0, 0, 99, 0, 0, 0, 1, 1, b'k', 0x02, 1], &buf[..]);
    }

    #[test]
    fn measured_list() {
        let values = match nested(2) { Value::List(v) => v, _ => unreachable!() };
        let measured = Measured::list(&values).unwrap();
        let mut region = vec![0u8; measured.wire_len()];
        let mut sink = FixedSink::new(&mut region);
        Encoder::new(&mut sink).encode_measured(measured).unwrap();
        assert!(sink.is_full());
        let mut reader = Reader::new(&region);
        assert_eq!(Value::List(values), reader.read_list().unwrap());
    }

}
