//! Computes the number of bytes a value occupies on wire without writing anything.
//!
//! Every function here has a twin in `encoder`; the two must agree byte for byte. A composite's body
//! length, as returned by `list` and `map`, counts the 4 byte element count and the elements but not
//! the 4 byte length field itself, so a composite value takes `4 + body` bytes after its tag.

use crate::error::{EncodeError, Result};
use crate::value::{LengthClass, Map, Str, Value};
use std::convert::TryFrom;

/// Width of a composite's length field and of its count field.
pub const COMPOSITE_FIELD: u32 = 4;

/// Width of the type code in front of every value inside a container.
pub const TAG: u32 = 1;

/// Length prefix plus bytes. The type code that selects the length class is charged by the container.
pub fn string(value: &Str) -> Result<u32> {
    let class = value.length_class()?;
    Ok(class.prefix_width() + value.len() as u32)
}

/// Map keys are always written with a one byte length and no type code.
pub fn key(key: &str) -> Result<u32> {
    if key.len() > LengthClass::SHORT_MAX {
        return Err(EncodeError::OversizeString { len: key.len(), max: LengthClass::SHORT_MAX });
    }
    Ok(1 + key.len() as u32)
}

/// Body length of a list: count plus one tag and one payload per element.
pub fn list(values: &[Value]) -> Result<u32> {
    count(values.len())?;
    values.iter().try_fold(COMPOSITE_FIELD, |acc, element| add(acc, add(TAG, value(element)?)?))
}

/// Body length of a map: count plus key, tag and payload per pair.
pub fn map(map: &Map) -> Result<u32> {
    count(map.len())?;
    map.iter().try_fold(COMPOSITE_FIELD, |acc, (k, v)| add(add(acc, key(k)?)?, add(TAG, value(v)?)?))
}

/// Payload length of a value, excluding its own tag.
pub fn value(value: &Value) -> Result<u32> {
    match value {
        Value::Void    => Ok(0),
        Value::Bool(_)
            | Value::U8(_)
            | Value::I8(_)  => Ok(1),
        Value::U16(_)
            | Value::I16(_) => Ok(2),
        Value::U32(_)
            | Value::I32(_)
            | Value::F32(_) => Ok(4),
        Value::U64(_)
            | Value::I64(_)
            | Value::F64(_) => Ok(8),
        Value::Uuid(_) => Ok(16),
        Value::Str(s)  => string(s),
        Value::List(l) => add(COMPOSITE_FIELD, list(l)?),
        Value::Map(m)  => add(COMPOSITE_FIELD, map(m)?),
    }
}

/// Length of a value written at top level together with its tag.
pub fn tagged(v: &Value) -> Result<usize> {
    Ok(TAG as usize + value(v)? as usize)
}

/// Anything the size calculator can measure.
pub trait EncodedSize {
    fn encoded_size(&self) -> Result<u32>;
}

impl EncodedSize for Str {
    fn encoded_size(&self) -> Result<u32> {
        string(self)
    }
}

impl EncodedSize for Value {
    fn encoded_size(&self) -> Result<u32> {
        value(self)
    }
}

impl EncodedSize for [Value] {
    fn encoded_size(&self) -> Result<u32> {
        list(self)
    }
}

impl EncodedSize for Map {
    fn encoded_size(&self) -> Result<u32> {
        map(self)
    }
}

#[inline]
fn add(acc: u32, n: u32) -> Result<u32> {
    acc.checked_add(n).ok_or(EncodeError::CompositeTooLarge((u64::from(acc) + u64::from(n)) as usize))
}

#[inline]
fn count(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| EncodeError::CompositeTooLarge(len))
}
