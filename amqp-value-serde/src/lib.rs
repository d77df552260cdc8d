//! Conveniently serialize your Rust data structures into AMQP 0-10 values and on to the wire.
//!
//! Structs and maps become `Value::Map`s whose keys keep the declaration order, sequences and tuples become
//! `Value::List`s, and integers and floats keep their width. Unit variants are written as their name,
//! variants carrying data as a map with a single entry named after the variant.
//!
//! # Examples
//!
//! ```
//! use serde::Serialize;
//! use amqp_value::Value;
//!
//! #[derive(Serialize)]
//! pub enum Species {
//!     PrionailurusViverrinus,
//!     LynxLynx,
//! }
//!
//! #[derive(Serialize)]
//! struct Cat<'a> {
//!     name: &'a str,
//!     species: Species,
//!     lives: u8,
//! }
//!
//! let cat = Cat { name: "Jessica", species: Species::PrionailurusViverrinus, lives: 9 };
//! let value = amqp_value_serde::to_value(&cat).unwrap();
//! assert_eq!(r#"{name: "Jessica", species: "PrionailurusViverrinus", lives: 9u8}"#, value.to_string());
//!
//! let table = amqp_value_serde::to_field_table(&cat).unwrap();
//! assert_eq!(table.len(), 4 + amqp_value::size::map(value.as_map().unwrap()).unwrap() as usize);
//! ```

mod error;
mod ser;

pub use error::{Error, Result};
pub use ser::{to_value, Serializer};

use bytes::BytesMut;
use serde::Serialize;
use tracing::trace;

/// Serialize into a value and encode it together with its type code.
pub fn to_bytes<T: ?Sized + Serialize>(value: &T) -> Result<BytesMut> {
    let value = to_value(value)?;
    let buf = amqp_value::to_bytes(&value)?;
    trace!(kind = value.typename(), len = buf.len(), "serialized value");
    Ok(buf)
}

/// Serialize into a map and encode it without a type code, the way a field table argument is carried.
pub fn to_field_table<T: ?Sized + Serialize>(value: &T) -> Result<BytesMut> {
    match to_value(value)? {
        amqp_value::Value::Map(map) => {
            let buf = amqp_value::map_to_bytes(&map)?;
            trace!(pairs = map.len(), len = buf.len(), "serialized field table");
            Ok(buf)
        },
        other => Err(Error::NotAMap(other.typename())),
    }
}
