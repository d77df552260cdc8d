//! Reads encoded values back so tests can check round trips. Every composite's length field is checked
//! against the bytes its body actually occupied.

use crate::code::TypeCode;
use crate::error::{EncodeError, ValueError};
use crate::value::{Encoding, Map, Str, Value};
use std::convert::TryFrom;
use uuid::Uuid;

#[derive(Debug, PartialEq)]
pub enum ReadError {
    Eof,
    Code(EncodeError),
    Str(ValueError),
    Key(std::str::Utf8Error),
    BodyLength { declared: u32, actual: usize },
}

pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {

    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.pos == self.buf.len()
    }

    pub fn peek_code(&self) -> u8 {
        self.buf[self.pos]
    }

    pub fn read_tagged(&mut self) -> Result<Value, ReadError> {
        let code = TypeCode::try_from(self.take::<1>()?[0]).map_err(ReadError::Code)?;
        self.read_value(code)
    }

    pub fn read_list(&mut self) -> Result<Value, ReadError> {
        let (declared, count, start) = self.frame()?;
        let mut values = Vec::new();
        for _ in 0..count {
            values.push(self.read_tagged()?);
        }
        self.check(declared, start)?;
        Ok(Value::List(values))
    }

    pub fn read_map(&mut self) -> Result<Value, ReadError> {
        let (declared, count, start) = self.frame()?;
        let mut map = Map::new();
        for _ in 0..count {
            let len = self.take::<1>()?[0] as usize;
            let key = std::str::from_utf8(self.slice(len)?).map_err(ReadError::Key)?.to_owned();
            let value = self.read_tagged()?;
            map.insert(key, value);
        }
        self.check(declared, start)?;
        Ok(Value::Map(map))
    }

    fn read_value(&mut self, code: TypeCode) -> Result<Value, ReadError> {
        Ok(match code {
            TypeCode::Void       => Value::Void,
            TypeCode::Boolean    => Value::Bool(self.take::<1>()?[0] != 0),
            TypeCode::Uint8      => Value::U8(self.take::<1>()?[0]),
            TypeCode::Int8       => Value::I8(i8::from_be_bytes(self.take()?)),
            TypeCode::Uint16     => Value::U16(u16::from_be_bytes(self.take()?)),
            TypeCode::Int16      => Value::I16(i16::from_be_bytes(self.take()?)),
            TypeCode::Uint32     => Value::U32(u32::from_be_bytes(self.take()?)),
            TypeCode::Int32      => Value::I32(i32::from_be_bytes(self.take()?)),
            TypeCode::Float      => Value::F32(f32::from_be_bytes(self.take()?)),
            TypeCode::Uint64     => Value::U64(u64::from_be_bytes(self.take()?)),
            TypeCode::Int64      => Value::I64(i64::from_be_bytes(self.take()?)),
            TypeCode::Double     => Value::F64(f64::from_be_bytes(self.take()?)),
            TypeCode::Uuid       => Value::Uuid(Uuid::from_bytes(self.take()?)),
            TypeCode::Vbin8      => self.read_str(1, Encoding::Binary)?,
            TypeCode::Str8Latin  => self.read_str(1, Encoding::Ascii)?,
            TypeCode::Str8       => self.read_str(1, Encoding::Utf8)?,
            TypeCode::Str8Utf16  => self.read_str(1, Encoding::Utf16)?,
            TypeCode::Vbin16     => self.read_str(2, Encoding::Binary)?,
            TypeCode::Str16Latin => self.read_str(2, Encoding::Ascii)?,
            TypeCode::Str16      => self.read_str(2, Encoding::Utf8)?,
            TypeCode::Str16Utf16 => self.read_str(2, Encoding::Utf16)?,
            TypeCode::List       => self.read_list()?,
            TypeCode::Map        => self.read_map()?,
        })
    }

    fn read_str(&mut self, prefix: usize, encoding: Encoding) -> Result<Value, ReadError> {
        let len = match prefix {
            1 => self.take::<1>()?[0] as usize,
            _ => u16::from_be_bytes(self.take()?) as usize,
        };
        let bytes = self.slice(len)?.to_vec();
        Str::new(bytes, encoding).map(Value::Str).map_err(ReadError::Str)
    }

    fn frame(&mut self) -> Result<(u32, u32, usize), ReadError> {
        let declared = u32::from_be_bytes(self.take()?);
        let start = self.pos;
        let count = u32::from_be_bytes(self.take()?);
        Ok((declared, count, start))
    }

    fn check(&self, declared: u32, start: usize) -> Result<(), ReadError> {
        let actual = self.pos - start;
        if actual == declared as usize {
            Ok(())
        } else {
            Err(ReadError::BodyLength { declared, actual })
        }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], ReadError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.slice(N)?);
        Ok(out)
    }

    fn slice(&mut self, len: usize) -> Result<&'a [u8], ReadError> {
        if self.buf.len() - self.pos < len {
            Err(ReadError::Eof)
        } else {
            self.pos += len;
            Ok(&self.buf[self.pos - len .. self.pos])
        }
    }

}
