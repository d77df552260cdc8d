//! The atom of an AMQP message field is the `Value`.
//! Values are trees: lists and maps own their children, so neither the size calculator nor the encoder
//! ever meets a cycle or a shared node. Scalars have a fixed payload width, strings carry their bytes
//! together with an `Encoding` which, along with their length, selects the type code used on wire.

use crate::code::TypeCode;
use crate::error::{EncodeError, ValueError};
use bytes::Bytes;
use std::borrow::Cow;
use std::fmt::{self, Display, Formatter, Write as _};
use std::str::from_utf8;
use uuid::Uuid;

/// The semantic encoding of a `Str`. The bytes themselves are opaque to the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Binary,
    Ascii,
    Utf8,
    /// Big-endian Utf-16 code units.
    Utf16,
}

impl Encoding {

    pub fn type_code(&self, class: LengthClass) -> TypeCode {
        match (*self, class) {
            (Encoding::Binary, LengthClass::Short) => TypeCode::Vbin8,
            (Encoding::Ascii,  LengthClass::Short) => TypeCode::Str8Latin,
            (Encoding::Utf8,   LengthClass::Short) => TypeCode::Str8,
            (Encoding::Utf16,  LengthClass::Short) => TypeCode::Str8Utf16,
            (Encoding::Binary, LengthClass::Long)  => TypeCode::Vbin16,
            (Encoding::Ascii,  LengthClass::Long)  => TypeCode::Str16Latin,
            (Encoding::Utf8,   LengthClass::Long)  => TypeCode::Str16,
            (Encoding::Utf16,  LengthClass::Long)  => TypeCode::Str16Utf16,
        }
    }

}

/// Which length prefix a string is written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthClass {
    /// One length byte.
    Short,
    /// Two length bytes in network byte order.
    Long,
}

impl LengthClass {

    pub const SHORT_MAX: usize = u8::MAX as usize;
    pub const LONG_MAX: usize = u16::MAX as usize;

    /// The one place where the threshold between the two classes is decided. Both the size calculator and the
    /// encoder go through here.
    #[inline]
    pub fn of(len: usize) -> Result<Self, EncodeError> {
        if len <= Self::SHORT_MAX {
            Ok(LengthClass::Short)
        } else if len <= Self::LONG_MAX {
            Ok(LengthClass::Long)
        } else {
            Err(EncodeError::OversizeString { len, max: Self::LONG_MAX })
        }
    }

    #[inline]
    pub const fn prefix_width(&self) -> u32 {
        match *self {
            LengthClass::Short => 1,
            LengthClass::Long  => 2,
        }
    }

}

/// A byte string tagged with its encoding. Construction checks that the bytes are plausible for the encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Str {
    bytes: Bytes,
    encoding: Encoding,
}

impl Str {

    pub fn new(bytes: impl Into<Bytes>, encoding: Encoding) -> Result<Self, ValueError> {
        let bytes = bytes.into();
        match encoding {
            Encoding::Binary => {},
            Encoding::Utf8   => { from_utf8(&bytes)?; },
            Encoding::Ascii  => {
                if let Some(position) = bytes.iter().position(|b| !b.is_ascii()) {
                    return Err(ValueError::NotAscii { position });
                }
            },
            Encoding::Utf16 if bytes.len() % 2 != 0 => return Err(ValueError::OddUtf16Length(bytes.len())),
            Encoding::Utf16  => {},
        }
        Ok(Self { bytes, encoding })
    }

    pub fn utf8(text: impl Into<String>) -> Self {
        Self { bytes: Bytes::from(text.into()), encoding: Encoding::Utf8 }
    }

    pub fn binary(bytes: impl Into<Bytes>) -> Self {
        Self { bytes: bytes.into(), encoding: Encoding::Binary }
    }

    pub fn ascii(text: &str) -> Result<Self, ValueError> {
        Self::new(Bytes::copy_from_slice(text.as_bytes()), Encoding::Ascii)
    }

    pub fn utf16(text: &str) -> Self {
        let bytes: Vec<u8> = text.encode_utf16().flat_map(u16::to_be_bytes).collect();
        Self { bytes: Bytes::from(bytes), encoding: Encoding::Utf16 }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn length_class(&self) -> Result<LengthClass, EncodeError> {
        LengthClass::of(self.len())
    }

    pub fn type_code(&self) -> Result<TypeCode, EncodeError> {
        Ok(self.encoding.type_code(self.length_class()?))
    }

    /// The textual content, if the encoding is a text encoding. Invalid Utf-16 is replaced lossily.
    pub fn to_text(&self) -> Option<Cow<'_, str>> {
        match self.encoding {
            Encoding::Binary                 => None,
            Encoding::Utf8 | Encoding::Ascii => from_utf8(&self.bytes).ok().map(Cow::Borrowed),
            Encoding::Utf16                  => {
                let units: Vec<u16> = self.bytes.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]])).collect();
                Some(Cow::Owned(String::from_utf16_lossy(&units)))
            },
        }
    }

}

/// An insertion ordered map with unique keys. The order is part of the encoding.
///
/// Lookups are linear; field tables are small.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Map {
    entries: Vec<(String, Value)>,
}

impl Map {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity) }
    }

    /// Inserts a pair. If the key is already present, its value is replaced in place, keeping the key's
    /// position, and the previous value is returned.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None            => { self.entries.push((key, value)); None },
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Map::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<K: Into<String>, V: Into<Value>> From<Vec<(K, V)>> for Map {
    fn from(entries: Vec<(K, V)>) -> Self {
        entries.into_iter().collect()
    }
}

/// The possible values according to the AMQP 0-10 variant model.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Void,
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Uuid(Uuid),
    Str(Str),
    List(Vec<Value>),
    Map(Map),
}

impl Value {

    /// The tag a container writes in front of this value.
    pub fn type_code(&self) -> Result<TypeCode, EncodeError> {
        Ok(match self {
            Value::Void    => TypeCode::Void,
            Value::Bool(_) => TypeCode::Boolean,
            Value::U8(_)   => TypeCode::Uint8,
            Value::U16(_)  => TypeCode::Uint16,
            Value::U32(_)  => TypeCode::Uint32,
            Value::U64(_)  => TypeCode::Uint64,
            Value::I8(_)   => TypeCode::Int8,
            Value::I16(_)  => TypeCode::Int16,
            Value::I32(_)  => TypeCode::Int32,
            Value::I64(_)  => TypeCode::Int64,
            Value::F32(_)  => TypeCode::Float,
            Value::F64(_)  => TypeCode::Double,
            Value::Uuid(_) => TypeCode::Uuid,
            Value::Str(s)  => s.type_code()?,
            Value::List(_) => TypeCode::List,
            Value::Map(_)  => TypeCode::Map,
        })
    }

    pub fn typename(&self) -> &'static str {
        match self {
            Value::Void    => "void",
            Value::Bool(_) => "bool",
            Value::U8(_)   => "u8",
            Value::U16(_)  => "u16",
            Value::U32(_)  => "u32",
            Value::U64(_)  => "u64",
            Value::I8(_)   => "i8",
            Value::I16(_)  => "i16",
            Value::I32(_)  => "i32",
            Value::I64(_)  => "i64",
            Value::F32(_)  => "f32",
            Value::F64(_)  => "f64",
            Value::Uuid(_) => "uuid",
            Value::Str(_)  => "string",
            Value::List(_) => "list",
            Value::Map(_)  => "map",
        }
    }

    pub fn as_str(&self) -> Option<&Str> {
        match self {
            Value::Str(s) => Some(s),
            _             => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _              => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _             => None,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Value::List(_) | Value::Map(_))
    }

    const KEY_CHARS: &'static str = "_-.";

    fn is_bare_key(key: &str) -> bool {
        let mut chars = key.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || Self::KEY_CHARS.contains(c))
    }

    fn quote(f: &mut Formatter<'_>, prefix: &str, text: &str) -> fmt::Result {
        write!(f, "{}\"{}\"", prefix, text.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n"))
    }

}

impl Display for Str {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match (self.encoding, self.to_text()) {
            (Encoding::Utf8, Some(text))  => Value::quote(f, "", &text),
            (Encoding::Ascii, Some(text)) => Value::quote(f, "a", &text),
            (Encoding::Utf16, Some(text)) => Value::quote(f, "w", &text),
            _                             => {
                let mut hex = String::with_capacity(self.len() * 2);
                for b in self.as_bytes() {
                    let _ = write!(hex, "{:02x}", b);
                }
                write!(f, "x\"{}\"", hex)
            },
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void         => f.write_str("void"),
            Value::Bool(true)   => f.write_str("true"),
            Value::Bool(false)  => f.write_str("false"),
            Value::U8(v)        => write!(f, "{}u8", v),
            Value::U16(v)       => write!(f, "{}u16", v),
            Value::U32(v)       => write!(f, "{}u32", v),
            Value::U64(v)       => write!(f, "{}u64", v),
            Value::I8(v)        => write!(f, "{}i8", v),
            Value::I16(v)       => write!(f, "{}i16", v),
            Value::I32(v)       => write!(f, "{}i32", v),
            Value::I64(v)       => write!(f, "{}i64", v),
            Value::F32(v)       => write!(f, "{:?}f32", v),
            Value::F64(v)       => write!(f, "{:?}f64", v),
            Value::Uuid(v)      => write!(f, "u\"{}\"", v.hyphenated()),
            Value::Str(v)       => write!(f, "{}", v),
            Value::List(v)      => {
                f.write_str("[")?;
                for (i, value) in v.iter().enumerate() {
                    if i > 0 { f.write_str(", ")?; }
                    write!(f, "{}", value)?;
                }
                f.write_str("]")
            },
            Value::Map(v)       => {
                f.write_str("{")?;
                for (i, (key, value)) in v.iter().enumerate() {
                    if i > 0 { f.write_str(", ")?; }
                    if Self::is_bare_key(key) {
                        f.write_str(key)?;
                    } else {
                        Self::quote(f, "", key)?;
                    }
                    write!(f, ": {}", value)?;
                }
                f.write_str("}")
            },
        }
    }
}

macro_rules! from_primitive {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Value {
                    Value::$variant(v)
                }
            }
        )*
    };
}

from_primitive! {
    bool => Bool,
    u8 => U8, u16 => U16, u32 => U32, u64 => U64,
    i8 => I8, i16 => I16, i32 => I32, i64 => I64,
    f32 => F32, f64 => F64,
    Uuid => Uuid,
    Str => Str,
    Vec<Value> => List,
    Map => Map,
}

impl From<&str> for Value {
    fn from(v: &str) -> Value {
        Value::Str(Str::utf8(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Value {
        Value::Str(Str::utf8(v))
    }
}
