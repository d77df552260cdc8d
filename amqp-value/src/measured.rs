//! A composite paired with the body length the size calculator produced for it.
//!
//! A `Measured` can only be obtained by measuring, and it keeps the composite borrowed until the encoder
//! consumes it, so the composite cannot change between the two passes.

use crate::code::TypeCode;
use crate::encoder::Encoder;
use crate::error::Result;
use crate::sink::Sink;
use crate::size;
use crate::value::{Map, Value};

mod private {
    pub trait Sealed {}
    impl Sealed for [crate::value::Value] {}
    impl Sealed for crate::value::Map {}
}

/// Lists and maps: the values framed by a length and a count.
pub trait Composite: private::Sealed {
    const CODE: TypeCode;

    fn body_len(&self) -> Result<u32>;

    #[doc(hidden)]
    fn write_body<S: Sink + ?Sized>(&self, encoder: &mut Encoder<'_, S>, body_len: u32) -> Result<()>;
}

impl Composite for [Value] {
    const CODE: TypeCode = TypeCode::List;

    fn body_len(&self) -> Result<u32> {
        size::list(self)
    }

    fn write_body<S: Sink + ?Sized>(&self, encoder: &mut Encoder<'_, S>, body_len: u32) -> Result<()> {
        encoder.write_list(self, body_len)
    }
}

impl Composite for Map {
    const CODE: TypeCode = TypeCode::Map;

    fn body_len(&self) -> Result<u32> {
        size::map(self)
    }

    fn write_body<S: Sink + ?Sized>(&self, encoder: &mut Encoder<'_, S>, body_len: u32) -> Result<()> {
        encoder.write_map(self, body_len)
    }
}

#[derive(Debug)]
pub struct Measured<'v, C: Composite + ?Sized> {
    composite: &'v C,
    body_len: u32,
}

impl<'v, C: Composite + ?Sized> Measured<'v, C> {

    pub fn new(composite: &'v C) -> Result<Self> {
        let body_len = composite.body_len()?;
        Ok(Self { composite, body_len })
    }

    /// The value of the length field.
    pub fn body_len(&self) -> u32 {
        self.body_len
    }

    /// Bytes the encoder will write: the length field and the body, without a type code.
    pub fn wire_len(&self) -> usize {
        size::COMPOSITE_FIELD as usize + self.body_len as usize
    }

    pub fn type_code(&self) -> TypeCode {
        C::CODE
    }

    pub fn composite(&self) -> &'v C {
        self.composite
    }

    pub(crate) fn write<S: Sink + ?Sized>(self, encoder: &mut Encoder<'_, S>) -> Result<()> {
        self.composite.write_body(encoder, self.body_len)
    }

}

impl<'v> Measured<'v, [Value]> {
    pub fn list(values: &'v [Value]) -> Result<Self> {
        Self::new(values)
    }
}

impl<'v> Measured<'v, Map> {
    pub fn map(map: &'v Map) -> Result<Self> {
        Self::new(map)
    }
}
