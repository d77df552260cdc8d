//! AMQP 0-10 type codes. Each value inside a list or a map is preceded by exactly one of these
//! bytes, which is all a peer needs to know how many payload bytes follow.

use crate::error::EncodeError;
use std::convert::TryFrom;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCode {
    Int8       = 0x01,
    Uint8      = 0x02,
    Boolean    = 0x08,
    Int16      = 0x11,
    Uint16     = 0x12,
    Int32      = 0x21,
    Uint32     = 0x22,
    Float      = 0x23,
    Int64      = 0x31,
    Uint64     = 0x32,
    Double     = 0x33,
    Uuid       = 0x48,
    Vbin8      = 0x80,
    Str8Latin  = 0x84,
    Str8       = 0x85,
    Str8Utf16  = 0x86,
    Vbin16     = 0x90,
    Str16Latin = 0x94,
    Str16      = 0x95,
    Str16Utf16 = 0x96,
    Map        = 0xa8,
    List       = 0xa9,
    Void       = 0xf0,
}

impl TypeCode {

    const ALL: [TypeCode; 23] = [
        TypeCode::Int8, TypeCode::Uint8, TypeCode::Boolean, TypeCode::Int16, TypeCode::Uint16,
        TypeCode::Int32, TypeCode::Uint32, TypeCode::Float, TypeCode::Int64, TypeCode::Uint64,
        TypeCode::Double, TypeCode::Uuid, TypeCode::Vbin8, TypeCode::Str8Latin, TypeCode::Str8,
        TypeCode::Str8Utf16, TypeCode::Vbin16, TypeCode::Str16Latin, TypeCode::Str16,
        TypeCode::Str16Utf16, TypeCode::Map, TypeCode::List, TypeCode::Void,
    ];

    /// Returns the mnemonic of the code as the AMQP type table spells it. This is useful for error messages.
    pub fn name(&self) -> &'static str {
        match *self {
            TypeCode::Int8       => "int8",
            TypeCode::Uint8      => "uint8",
            TypeCode::Boolean    => "boolean",
            TypeCode::Int16      => "int16",
            TypeCode::Uint16     => "uint16",
            TypeCode::Int32      => "int32",
            TypeCode::Uint32     => "uint32",
            TypeCode::Float      => "float",
            TypeCode::Int64      => "int64",
            TypeCode::Uint64     => "uint64",
            TypeCode::Double     => "double",
            TypeCode::Uuid       => "uuid",
            TypeCode::Vbin8      => "vbin8",
            TypeCode::Str8Latin  => "str8-latin",
            TypeCode::Str8       => "str8",
            TypeCode::Str8Utf16  => "str8-utf16",
            TypeCode::Vbin16     => "vbin16",
            TypeCode::Str16Latin => "str16-latin",
            TypeCode::Str16      => "str16",
            TypeCode::Str16Utf16 => "str16-utf16",
            TypeCode::Map        => "map",
            TypeCode::List       => "list",
            TypeCode::Void       => "void",
        }
    }

    /// The payload width of fixed-size kinds, `None` for strings and composites.
    pub const fn fixed_width(&self) -> Option<u32> {
        match *self {
            TypeCode::Void                                                          => Some(0),
            TypeCode::Boolean | TypeCode::Int8 | TypeCode::Uint8                    => Some(1),
            TypeCode::Int16 | TypeCode::Uint16                                      => Some(2),
            TypeCode::Int32 | TypeCode::Uint32 | TypeCode::Float                    => Some(4),
            TypeCode::Int64 | TypeCode::Uint64 | TypeCode::Double                   => Some(8),
            TypeCode::Uuid                                                          => Some(16),
            _                                                                       => None,
        }
    }

    #[inline]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

}

impl TryFrom<u8> for TypeCode {
    type Error = EncodeError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        TypeCode::ALL.iter().copied().find(|code| *code as u8 == v).ok_or(EncodeError::UnsupportedKind(v))
    }
}

#[cfg(test)]
mod tests {
    use super::TypeCode;
    use crate::error::EncodeError;
    use std::convert::TryFrom;

    #[test]
    fn every_code_byte() {
        let mut known = 0;
        for b in 0..=u8::MAX {
            match TypeCode::try_from(b) {
                Ok(code) => { assert_eq!(b, code.to_u8()); known += 1; },
                Err(e)   => assert_eq!(EncodeError::UnsupportedKind(b), e),
            }
        }
        assert_eq!(TypeCode::ALL.len(), known);
    }

    #[test]
    fn length_class_nibbles() {
        assert_eq!(TypeCode::Str8.to_u8() & 0x0f, TypeCode::Str16.to_u8() & 0x0f);
        assert_eq!(TypeCode::Vbin8.to_u8() >> 4, 0x8);
        assert_eq!(TypeCode::Str16Utf16.to_u8() >> 4, 0x9);
        assert_eq!(None, TypeCode::Str16.fixed_width());
        assert_eq!(Some(16), TypeCode::Uuid.fixed_width());
    }

}
