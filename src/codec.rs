//! Type coercion between Rust values and the byte strings Redis stores.
//!
//! Every field descriptor is parameterised by a [`Codec`] type. The built-in
//! encodings favour human readability: numbers are stored as decimal text,
//! booleans as `True`/`False`, and `Vec<u8>`/[`Bytes`] pass through as-is.

use crate::error::{TrolError, TrolResult};
use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct CodecError(pub String);

impl CodecError {
    pub fn new(reason: impl Into<String>) -> Self {
        CodecError(reason.into())
    }
}

/// Conversion to and from the stored representation of a field value.
pub trait Codec: Sized + fmt::Debug {
    fn encode(&self) -> Result<Vec<u8>, CodecError>;
    fn decode(raw: &[u8]) -> Result<Self, CodecError>;
}

impl Codec for Vec<u8> {
    fn encode(&self) -> Result<Vec<u8>, CodecError> {
        Ok(self.clone())
    }

    fn decode(raw: &[u8]) -> Result<Self, CodecError> {
        Ok(raw.to_vec())
    }
}

impl Codec for Bytes {
    fn encode(&self) -> Result<Vec<u8>, CodecError> {
        Ok(self.to_vec())
    }

    fn decode(raw: &[u8]) -> Result<Self, CodecError> {
        Ok(Bytes::copy_from_slice(raw))
    }
}

impl Codec for String {
    fn encode(&self) -> Result<Vec<u8>, CodecError> {
        Ok(self.as_bytes().to_vec())
    }

    fn decode(raw: &[u8]) -> Result<Self, CodecError> {
        String::from_utf8(raw.to_vec()).map_err(|e| CodecError::new(e.to_string()))
    }
}

impl Codec for bool {
    fn encode(&self) -> Result<Vec<u8>, CodecError> {
        Ok(if *self { b"True".to_vec() } else { b"False".to_vec() })
    }

    fn decode(raw: &[u8]) -> Result<Self, CodecError> {
        match raw {
            b"True" => Ok(true),
            b"False" => Ok(false),
            _ => Err(CodecError::new("expected 'True' or 'False'")),
        }
    }
}

macro_rules! decimal_codec {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Codec for $ty {
                fn encode(&self) -> Result<Vec<u8>, CodecError> {
                    Ok(self.to_string().into_bytes())
                }

                fn decode(raw: &[u8]) -> Result<Self, CodecError> {
                    let text = std::str::from_utf8(raw)
                        .map_err(|_| CodecError::new("not valid UTF-8"))?;
                    text.parse::<$ty>().map_err(|e| CodecError::new(e.to_string()))
                }
            }
        )*
    };
}

decimal_codec!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// Stores any serde type as JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Serialize + DeserializeOwned + fmt::Debug> Codec for Json<T> {
    fn encode(&self) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(&self.0).map_err(|e| CodecError::new(e.to_string()))
    }

    fn decode(raw: &[u8]) -> Result<Self, CodecError> {
        serde_json::from_slice(raw)
            .map(Json)
            .map_err(|e| CodecError::new(e.to_string()))
    }
}

/// Encode a value on behalf of `field`, mapping failures to [`TrolError::Coercion`].
pub(crate) fn encode_field<T: Codec>(field: &str, value: &T) -> TrolResult<Vec<u8>> {
    value.encode().map_err(|e| TrolError::Coercion {
        field: field.to_string(),
        value: format!("{value:?}"),
        reason: e.0,
    })
}

pub(crate) fn encode_all<T: Codec>(field: &str, values: &[T]) -> TrolResult<Vec<Vec<u8>>> {
    values.iter().map(|v| encode_field(field, v)).collect()
}

pub(crate) fn decode_field<T: Codec>(field: &str, raw: &[u8]) -> TrolResult<T> {
    T::decode(raw).map_err(|e| TrolError::Coercion {
        field: field.to_string(),
        value: String::from_utf8_lossy(raw).into_owned(),
        reason: e.0,
    })
}

pub(crate) fn decode_all<T: Codec>(field: &str, raws: Vec<Vec<u8>>) -> TrolResult<Vec<T>> {
    raws.iter().map(|raw| decode_field(field, raw)).collect()
}
