/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Raw values as read from the stream, before operators are applied.

use crate::error::FastError;
use bytes::Bytes;
use fastfix_core::{FixValue, Payload};
use fastfix_template::{ScalarType, narrow_integer};

/// A primitive value read from the stream.
///
/// Delta-encoded strings and byte vectors carry the subtraction length read
/// ahead of their payload. Integer deltas are widened to `i128` so that the
/// operator can detect overflow of the target width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Absent optional value.
    Null,
    /// Unsigned 32-bit integer.
    U32(u32),
    /// Signed 32-bit integer.
    I32(i32),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// Signed 64-bit integer.
    I64(i64),
    /// Wide signed integer (integer delta).
    BigInt(i128),
    /// ASCII string.
    String {
        /// The characters read.
        text: String,
        /// Subtraction length; zero outside delta.
        subtraction: i32,
    },
    /// Byte vector, also the wire form of unicode strings.
    Bytes {
        /// The bytes read.
        bytes: Bytes,
        /// Subtraction length; zero outside delta.
        subtraction: i32,
    },
}

impl Value {
    /// Creates a string value without subtraction.
    #[must_use]
    pub fn string(text: impl Into<String>) -> Self {
        Self::String {
            text: text.into(),
            subtraction: 0,
        }
    }

    /// Creates a byte vector value without subtraction.
    #[must_use]
    pub fn bytes(bytes: impl Into<Bytes>) -> Self {
        Self::Bytes {
            bytes: bytes.into(),
            subtraction: 0,
        }
    }

    /// Returns true if the value is `Null`.
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns any integer value widened to `i128`.
    #[must_use]
    pub const fn as_i128(&self) -> Option<i128> {
        match self {
            Self::U32(v) => Some(*v as i128),
            Self::I32(v) => Some(*v as i128),
            Self::U64(v) => Some(*v as i128),
            Self::I64(v) => Some(*v as i128),
            Self::BigInt(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the characters or bytes of a string or byte vector value.
    #[must_use]
    pub fn as_items(&self) -> Option<&[u8]> {
        match self {
            Self::String { text, .. } => Some(text.as_bytes()),
            Self::Bytes { bytes, .. } => Some(bytes),
            _ => None,
        }
    }

    /// Returns the subtraction length of a delta-encoded string or byte vector.
    #[must_use]
    pub const fn subtraction(&self) -> i32 {
        match self {
            Self::String { subtraction, .. } | Self::Bytes { subtraction, .. } => *subtraction,
            _ => 0,
        }
    }

    /// Converts the value verbatim into a field value of type `ty`.
    ///
    /// # Errors
    /// Returns `FastError::IntegerOverflow` if an integer does not fit `ty`,
    /// `FastError::InvalidString` if unicode bytes are not valid UTF-8, and
    /// `FastError::TypeMismatch` if the value kind does not match `ty`.
    pub fn into_field_value(self, ty: ScalarType) -> Result<FixValue, FastError> {
        let payload = match self {
            Self::Null => return Ok(FixValue::Null),
            Self::String { text, .. } => match ty {
                ScalarType::AsciiString | ScalarType::UnicodeString => Payload::String(text),
                ScalarType::ByteVector => Payload::Bytes(Bytes::from(text.into_bytes())),
                _ => return Err(mismatch(ty, "string")),
            },
            Self::Bytes { bytes, .. } => items_to_payload(ty, bytes.to_vec())?,
            integer => {
                let value = integer.as_i128().ok_or_else(|| mismatch(ty, "unknown"))?;
                narrow_integer(value, ty).ok_or(FastError::IntegerOverflow {
                    value,
                    target: ty.tag_name(),
                })?
            }
        };
        Ok(FixValue::Present(payload))
    }
}

/// Builds the payload of a string or byte vector field from its items.
///
/// # Errors
/// Returns `FastError::InvalidString` if string bytes are not valid UTF-8 and
/// `FastError::TypeMismatch` for integer types.
pub fn items_to_payload(ty: ScalarType, items: Vec<u8>) -> Result<Payload, FastError> {
    match ty {
        ScalarType::AsciiString | ScalarType::UnicodeString => String::from_utf8(items)
            .map(Payload::String)
            .map_err(|_| FastError::InvalidString),
        ScalarType::ByteVector => Ok(Payload::Bytes(Bytes::from(items))),
        _ => Err(mismatch(ty, "bytes")),
    }
}

const fn mismatch(expected: ScalarType, actual: &'static str) -> FastError {
    FastError::TypeMismatch { expected, actual }
}
