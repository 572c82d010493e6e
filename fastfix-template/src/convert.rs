/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Conversion of `value` attributes into typed initial values.
//!
//! Integers are decimal text range-checked into the target width, byte
//! vectors are whitespace-insensitive hex, and decimals are normalized so
//! the mantissa is not divisible by 10.

use crate::error::TemplateError;
use crate::schema::ScalarType;
use bytes::Bytes;
use fastfix_core::{MAX_DECIMAL_EXPONENT, MIN_DECIMAL_EXPONENT, Payload, ScaledDecimal};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Converts a `value` attribute into a payload of the field's type.
///
/// # Arguments
/// * `field` - Field name, for error context
/// * `ty` - Target scalar type
/// * `text` - The attribute text
///
/// # Errors
/// Returns `TemplateError::InvalidInitialValue` (S3) for malformed text and
/// `TemplateError::IntegerOutOfRange` (R4) for integers that do not fit.
pub fn parse_initial_value(
    field: &str,
    ty: ScalarType,
    text: &str,
) -> Result<Payload, TemplateError> {
    match ty {
        ScalarType::AsciiString => {
            if text.is_ascii() {
                Ok(Payload::String(text.to_string()))
            } else {
                Err(invalid(field, text, "ascii string", "non-ascii character"))
            }
        }
        ScalarType::UnicodeString => Ok(Payload::String(text.to_string())),
        ScalarType::ByteVector => parse_hex(text)
            .map(Payload::Bytes)
            .map_err(|reason| invalid(field, text, "byte vector", reason)),
        ScalarType::Int32 | ScalarType::UInt32 | ScalarType::Int64 | ScalarType::UInt64 => {
            let value = i128::from_str(text.trim())
                .map_err(|e| invalid(field, text, "integer", e.to_string()))?;
            narrow_integer(value, ty).ok_or_else(|| TemplateError::IntegerOutOfRange {
                field: field.to_string(),
                value: text.to_string(),
                field_type: ty,
            })
        }
    }
}

/// Narrows a wide integer into the payload of an integer type.
///
/// Returns `None` if the value does not fit or `ty` is not an integer type.
#[must_use]
pub fn narrow_integer(value: i128, ty: ScalarType) -> Option<Payload> {
    match ty {
        ScalarType::Int32 => i32::try_from(value).ok().map(Payload::I32),
        ScalarType::UInt32 => u32::try_from(value).ok().map(Payload::U32),
        ScalarType::Int64 => i64::try_from(value).ok().map(Payload::I64),
        ScalarType::UInt64 => u64::try_from(value).ok().map(Payload::U64),
        _ => None,
    }
}

/// Parses a whitespace-insensitive hex string.
///
/// # Errors
/// Returns a description of the problem for odd nibble counts or non-hex
/// characters.
pub fn parse_hex(text: &str) -> Result<Bytes, String> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(&compact)
        .map(Bytes::from)
        .map_err(|e| e.to_string())
}

/// Parses a decimal literal into a normalized exponent/mantissa pair.
///
/// The mantissa is stripped of trailing zeros, so `"1.50"` becomes
/// `(exponent -1, mantissa 15)` and `"1200"` becomes `(2, 12)`.
///
/// # Errors
/// Returns `TemplateError::InvalidInitialValue` (S3) for malformed text and
/// `TemplateError::DecimalOutOfRange` (R1) if the exponent falls outside
/// [-63, 63] or the mantissa outside i64.
pub fn parse_decimal(field: &str, text: &str) -> Result<ScaledDecimal, TemplateError> {
    let trimmed = text.trim();
    let parsed = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|e| invalid(field, text, "decimal", e.to_string()))?;

    let mut mantissa = parsed.mantissa();
    let mut exponent = -i64::from(parsed.scale());
    if mantissa == 0 {
        exponent = 0;
    }
    while mantissa != 0 && mantissa % 10 == 0 {
        mantissa /= 10;
        exponent += 1;
    }

    let out_of_range = || TemplateError::DecimalOutOfRange {
        field: field.to_string(),
        value: text.to_string(),
    };
    let mantissa = i64::try_from(mantissa).map_err(|_| out_of_range())?;
    let exponent = i32::try_from(exponent)
        .ok()
        .filter(|e| (MIN_DECIMAL_EXPONENT..=MAX_DECIMAL_EXPONENT).contains(e))
        .ok_or_else(out_of_range)?;
    Ok(ScaledDecimal::new(exponent, mantissa))
}

fn invalid(
    field: &str,
    value: &str,
    field_type: &'static str,
    reason: impl Into<String>,
) -> TemplateError {
    TemplateError::InvalidInitialValue {
        field: field.to_string(),
        value: value.to_string(),
        field_type,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastfix_core::ErrorCode;

    #[test]
    fn test_parse_integers() {
        assert_eq!(
            parse_initial_value("f", ScalarType::UInt32, "42").unwrap(),
            Payload::U32(42)
        );
        assert_eq!(
            parse_initial_value("f", ScalarType::Int32, "-7").unwrap(),
            Payload::I32(-7)
        );
        assert_eq!(
            parse_initial_value("f", ScalarType::UInt64, " 18446744073709551615 ").unwrap(),
            Payload::U64(u64::MAX)
        );
    }

    #[test]
    fn test_parse_integer_out_of_range_is_r4() {
        let err = parse_initial_value("f", ScalarType::UInt32, "4294967296").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::R4));
        let err = parse_initial_value("f", ScalarType::UInt64, "-1").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::R4));
    }

    #[test]
    fn test_parse_integer_malformed_is_s3() {
        let err = parse_initial_value("f", ScalarType::Int64, "12a").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::S3));
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(
            parse_initial_value("f", ScalarType::ByteVector, "0a 0B\n ff").unwrap(),
            Payload::Bytes(Bytes::from_static(&[0x0a, 0x0b, 0xff]))
        );
        assert_eq!(parse_hex("").unwrap(), Bytes::new());
    }

    #[test]
    fn test_parse_hex_odd_nibbles_rejected() {
        let err = parse_initial_value("f", ScalarType::ByteVector, "abc").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::S3));
    }

    #[test]
    fn test_parse_ascii_rejects_non_ascii() {
        let err = parse_initial_value("f", ScalarType::AsciiString, "héllo").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::S3));
        assert_eq!(
            parse_initial_value("f", ScalarType::UnicodeString, "héllo").unwrap(),
            Payload::String("héllo".to_string())
        );
    }

    #[test]
    fn test_parse_decimal_normalizes() {
        assert_eq!(parse_decimal("f", "1.50").unwrap(), ScaledDecimal::new(-1, 15));
        assert_eq!(parse_decimal("f", "1200").unwrap(), ScaledDecimal::new(2, 12));
        assert_eq!(parse_decimal("f", "-0.025").unwrap(), ScaledDecimal::new(-3, -25));
        assert_eq!(parse_decimal("f", "0.000").unwrap(), ScaledDecimal::new(0, 0));
        assert_eq!(parse_decimal("f", "94.3").unwrap(), ScaledDecimal::new(-1, 943));
    }

    #[test]
    fn test_parse_decimal_malformed() {
        let err = parse_decimal("f", "1.2.3").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::S3));
    }
}
