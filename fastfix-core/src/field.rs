/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Field values produced by the FAST decoder.
//!
//! This module provides:
//! - [`Payload`]: A concrete decoded value of one of the FAST field types
//! - [`FixValue`]: Either an absent (`Null`) value or a [`Payload`]
//! - [`ScaledDecimal`]: Exact exponent/mantissa decimal with `f64` and
//!   [`rust_decimal::Decimal`] views

use crate::message::FixMessage;
use bytes::Bytes;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest exponent a FAST decimal may carry.
pub const MIN_DECIMAL_EXPONENT: i32 = -63;

/// Largest exponent a FAST decimal may carry.
pub const MAX_DECIMAL_EXPONENT: i32 = 63;

/// Decimal value `mantissa * 10^exponent`, kept exactly as decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScaledDecimal {
    exponent: i32,
    mantissa: i64,
}

impl ScaledDecimal {
    /// Creates a decimal from its exponent and mantissa.
    #[inline]
    #[must_use]
    pub const fn new(exponent: i32, mantissa: i64) -> Self {
        Self { exponent, mantissa }
    }

    /// Returns the base-10 exponent.
    #[inline]
    #[must_use]
    pub const fn exponent(&self) -> i32 {
        self.exponent
    }

    /// Returns the mantissa.
    #[inline]
    #[must_use]
    pub const fn mantissa(&self) -> i64 {
        self.mantissa
    }

    /// Returns true if the exponent lies in the FAST range [-63, 63].
    #[must_use]
    pub const fn has_valid_exponent(&self) -> bool {
        self.exponent >= MIN_DECIMAL_EXPONENT && self.exponent <= MAX_DECIMAL_EXPONENT
    }

    /// Returns the value as a double, `mantissa * 10^exponent`.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.mantissa as f64 * 10f64.powi(self.exponent)
    }

    /// Returns the value as a [`Decimal`], or `None` if it cannot be represented.
    #[must_use]
    pub fn to_decimal(&self) -> Option<Decimal> {
        let mantissa = i128::from(self.mantissa);
        if self.exponent <= 0 {
            Decimal::try_from_i128_with_scale(mantissa, self.exponent.unsigned_abs()).ok()
        } else {
            let scaled = 10i128
                .checked_pow(self.exponent.unsigned_abs())
                .and_then(|factor| mantissa.checked_mul(factor))?;
            Decimal::try_from_i128_with_scale(scaled, 0).ok()
        }
    }
}

impl fmt::Display for ScaledDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mantissa == 0 {
            return f.write_str("0");
        }
        let mut buf = itoa::Buffer::new();
        let digits = buf.format(self.mantissa.unsigned_abs());
        if self.mantissa < 0 {
            f.write_str("-")?;
        }
        if self.exponent >= 0 {
            f.write_str(digits)?;
            for _ in 0..self.exponent {
                f.write_str("0")?;
            }
            return Ok(());
        }

        let scale = self.exponent.unsigned_abs() as usize;
        if digits.len() > scale {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            write!(f, "{int_part}.{frac_part}")
        } else {
            f.write_str("0.")?;
            for _ in 0..scale - digits.len() {
                f.write_str("0")?;
            }
            f.write_str(digits)
        }
    }
}

/// A concrete decoded field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    /// Unsigned 32-bit integer.
    U32(u32),
    /// Signed 32-bit integer.
    I32(i32),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// Signed 64-bit integer.
    I64(i64),
    /// Decimal value.
    Decimal(ScaledDecimal),
    /// ASCII or Unicode string.
    String(String),
    /// Byte vector.
    Bytes(Bytes),
    /// Sequence of sub-messages.
    Sequence(Vec<FixMessage>),
}

impl Payload {
    /// Returns the name of the payload type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::U32(_) => "u32",
            Self::I32(_) => "i32",
            Self::U64(_) => "u64",
            Self::I64(_) => "i64",
            Self::Decimal(_) => "decimal",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Sequence(_) => "sequence",
        }
    }

    /// Returns any integer payload widened to `i128`.
    #[must_use]
    pub const fn as_i128(&self) -> Option<i128> {
        match self {
            Self::U32(v) => Some(*v as i128),
            Self::I32(v) => Some(*v as i128),
            Self::U64(v) => Some(*v as i128),
            Self::I64(v) => Some(*v as i128),
            _ => None,
        }
    }

    /// Returns the raw bytes of a string or byte vector payload.
    #[must_use]
    pub fn as_byte_slice(&self) -> Option<&[u8]> {
        match self {
            Self::String(s) => Some(s.as_bytes()),
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = itoa::Buffer::new();
        match self {
            Self::U32(v) => f.write_str(buf.format(*v)),
            Self::I32(v) => f.write_str(buf.format(*v)),
            Self::U64(v) => f.write_str(buf.format(*v)),
            Self::I64(v) => f.write_str(buf.format(*v)),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::String(s) => f.write_str(s),
            Self::Bytes(b) => f.write_str(&hex::encode(b)),
            Self::Sequence(items) => f.write_str(buf.format(items.len())),
        }
    }
}

/// A decoded field value: absent, or present with a [`Payload`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FixValue {
    /// The field was absent (optional fields only).
    Null,
    /// The field carries a value.
    Present(Payload),
}

impl FixValue {
    /// Returns true if the value is `Null`.
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the payload, if present.
    #[must_use]
    pub const fn payload(&self) -> Option<&Payload> {
        match self {
            Self::Null => None,
            Self::Present(p) => Some(p),
        }
    }

    /// Consumes the value and returns its payload, if present.
    #[must_use]
    pub fn into_payload(self) -> Option<Payload> {
        match self {
            Self::Null => None,
            Self::Present(p) => Some(p),
        }
    }

    /// Returns the name of the value type, `"null"` for absent values.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Present(p) => p.type_name(),
        }
    }

    /// Returns the value as a u32, if it is one.
    #[must_use]
    pub const fn as_u32(&self) -> Option<u32> {
        match self {
            Self::Present(Payload::U32(v)) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as an i32, if it is one.
    #[must_use]
    pub const fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Present(Payload::I32(v)) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as a u64, if it is one.
    #[must_use]
    pub const fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Present(Payload::U64(v)) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as an i64, if it is one.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Present(Payload::I64(v)) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as a decimal, if it is one.
    #[must_use]
    pub const fn as_decimal(&self) -> Option<ScaledDecimal> {
        match self {
            Self::Present(Payload::Decimal(d)) => Some(*d),
            _ => None,
        }
    }

    /// Returns the value as a string slice, if it is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Present(Payload::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as bytes, if it is a byte vector.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Present(Payload::Bytes(b)) => Some(b),
            _ => None,
        }
    }

    /// Returns the sub-messages, if the value is a sequence.
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[FixMessage]> {
        match self {
            Self::Present(Payload::Sequence(items)) => Some(items),
            _ => None,
        }
    }
}

impl From<Payload> for FixValue {
    fn from(payload: Payload) -> Self {
        Self::Present(payload)
    }
}

impl From<Option<Payload>> for FixValue {
    fn from(payload: Option<Payload>) -> Self {
        payload.map_or(Self::Null, Self::Present)
    }
}

impl fmt::Display for FixValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("nil"),
            Self::Present(p) => write!(f, "{p}"),
        }
    }
}
