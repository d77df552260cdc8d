use amqp_value::{EncodeError, ValueError};
use serde::ser;
use std::fmt::Display;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    #[error("map key must be a string, a char or an integer. Maybe use crate `serde_with` to transform the map into a vec of tuples")]
    KeyType,

    #[error("a field table must be a map, found {0}")]
    NotAMap(&'static str),

    #[error("encoding error: {0}")]
    Encode(#[from] EncodeError),

    #[error("invalid string: {0}")]
    Value(#[from] ValueError),
}

impl ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}
