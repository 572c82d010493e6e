/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! FAST primitive decoding.
//!
//! Stop-bit readers for integers, ASCII strings, and byte vectors, plus the
//! [`PrimitiveReader`] adapter that a field selects once at construction.
//!
//! Every integer reader has a byte budget: 5 bytes for 32-bit types, 10 for
//! 64-bit types, 11 for the wide integers used by delta, and one extra byte
//! for nullable encodings. A value without a stop bit inside its budget is
//! an R6 error; a value that does not fit its width is R4.

use crate::cursor::ByteCursor;
use crate::error::FastError;
use crate::value::Value;
use bytes::Bytes;
use fastfix_template::{OperatorKind, ScalarType};
use num_traits::FromPrimitive;

/// Stop bit marking the last byte of a value.
pub const STOP_BIT: u8 = 0x80;

/// Sign bit of the first byte of a signed integer.
const SIGN_BIT: u8 = 0x40;

/// Byte budget of 32-bit integers.
pub const U32_MAX_BYTES: usize = 5;

/// Byte budget of 64-bit integers.
pub const U64_MAX_BYTES: usize = 10;

/// Byte budget of wide integers.
pub const BIG_INT_MAX_BYTES: usize = 11;

/// Extra byte allowed by nullable integer encodings.
const NULLABLE_HEADROOM: usize = 1;

fn read_unsigned(cursor: &mut ByteCursor<'_>, limit: usize) -> Result<u128, FastError> {
    let start = cursor.position();
    let mut value: u128 = 0;
    for _ in 0..limit {
        let byte = cursor.read_byte()?;
        value = (value << 7) | u128::from(byte & 0x7F);
        if byte & STOP_BIT != 0 {
            return Ok(value);
        }
    }
    Err(FastError::StopBitNotFound {
        offset: start,
        limit,
    })
}

fn read_signed(cursor: &mut ByteCursor<'_>, limit: usize) -> Result<i128, FastError> {
    let start = cursor.position();
    let first = cursor.read_byte()?;
    cursor.unread_byte();

    let mut value: i128 = if first & SIGN_BIT != 0 { -1 } else { 0 };
    for _ in 0..limit {
        let byte = cursor.read_byte()?;
        value = (value << 7) | i128::from(byte & 0x7F);
        if byte & STOP_BIT != 0 {
            return Ok(value);
        }
    }
    Err(FastError::StopBitNotFound {
        offset: start,
        limit,
    })
}

fn narrow<T: FromPrimitive>(value: i128, target: &'static str) -> Result<T, FastError> {
    T::from_i128(value).ok_or(FastError::IntegerOverflow { value, target })
}

fn narrow_unsigned<T: FromPrimitive>(value: u128, target: &'static str) -> Result<T, FastError> {
    T::from_u128(value).ok_or(FastError::IntegerOverflow {
        value: i128::try_from(value).unwrap_or(i128::MAX),
        target,
    })
}

/// Removes the nullable bias from an unsigned value. `None` is Null.
const fn unbias_unsigned(value: u128) -> Option<u128> {
    value.checked_sub(1)
}

/// Removes the nullable bias from a signed value. Negative values carry no
/// bias. `None` is Null.
const fn unbias_signed(value: i128) -> Option<i128> {
    if value == 0 {
        None
    } else if value > 0 {
        Some(value - 1)
    } else {
        Some(value)
    }
}

/// Reads a mandatory `uInt32`.
///
/// # Errors
/// Returns R6 past 5 bytes, R4 if the value exceeds `u32::MAX`.
pub fn read_u32(cursor: &mut ByteCursor<'_>) -> Result<u32, FastError> {
    narrow_unsigned(read_unsigned(cursor, U32_MAX_BYTES)?, "uInt32")
}

/// Reads an optional `uInt32`. The encoding `0x80` is Null.
///
/// # Errors
/// Returns R6 past 6 bytes, R4 if the value exceeds `u32::MAX`.
pub fn read_optional_u32(cursor: &mut ByteCursor<'_>) -> Result<Option<u32>, FastError> {
    let raw = read_unsigned(cursor, U32_MAX_BYTES + NULLABLE_HEADROOM)?;
    unbias_unsigned(raw)
        .map(|v| narrow_unsigned(v, "uInt32"))
        .transpose()
}

/// Reads a mandatory `int32`.
///
/// # Errors
/// Returns R6 past 5 bytes, R4 if the value does not fit `i32`.
pub fn read_i32(cursor: &mut ByteCursor<'_>) -> Result<i32, FastError> {
    narrow(read_signed(cursor, U32_MAX_BYTES)?, "int32")
}

/// Reads an optional `int32`.
///
/// # Errors
/// Returns R6 past 6 bytes, R4 if the value does not fit `i32`.
pub fn read_optional_i32(cursor: &mut ByteCursor<'_>) -> Result<Option<i32>, FastError> {
    let raw = read_signed(cursor, U32_MAX_BYTES + NULLABLE_HEADROOM)?;
    unbias_signed(raw).map(|v| narrow(v, "int32")).transpose()
}

/// Reads a mandatory `uInt64`.
///
/// # Errors
/// Returns R6 past 10 bytes, R4 if the value exceeds `u64::MAX`.
pub fn read_u64(cursor: &mut ByteCursor<'_>) -> Result<u64, FastError> {
    narrow_unsigned(read_unsigned(cursor, U64_MAX_BYTES)?, "uInt64")
}

/// Reads an optional `uInt64`.
///
/// # Errors
/// Returns R6 past 11 bytes, R4 if the value exceeds `u64::MAX`.
pub fn read_optional_u64(cursor: &mut ByteCursor<'_>) -> Result<Option<u64>, FastError> {
    let raw = read_unsigned(cursor, U64_MAX_BYTES + NULLABLE_HEADROOM)?;
    unbias_unsigned(raw)
        .map(|v| narrow_unsigned(v, "uInt64"))
        .transpose()
}

/// Reads a mandatory `int64`.
///
/// # Errors
/// Returns R6 past 10 bytes, R4 if the value does not fit `i64`.
pub fn read_i64(cursor: &mut ByteCursor<'_>) -> Result<i64, FastError> {
    narrow(read_signed(cursor, U64_MAX_BYTES)?, "int64")
}

/// Reads an optional `int64`.
///
/// # Errors
/// Returns R6 past 11 bytes, R4 if the value does not fit `i64`.
pub fn read_optional_i64(cursor: &mut ByteCursor<'_>) -> Result<Option<i64>, FastError> {
    let raw = read_signed(cursor, U64_MAX_BYTES + NULLABLE_HEADROOM)?;
    unbias_signed(raw).map(|v| narrow(v, "int64")).transpose()
}

/// Reads a wide signed integer, as used by integer delta.
///
/// # Errors
/// Returns R6 past 11 bytes.
pub fn read_big_int(cursor: &mut ByteCursor<'_>) -> Result<i128, FastError> {
    read_signed(cursor, BIG_INT_MAX_BYTES)
}

/// Reads an optional wide signed integer.
///
/// # Errors
/// Returns R6 past 12 bytes.
pub fn read_optional_big_int(cursor: &mut ByteCursor<'_>) -> Result<Option<i128>, FastError> {
    Ok(unbias_signed(read_signed(
        cursor,
        BIG_INT_MAX_BYTES + NULLABLE_HEADROOM,
    )?))
}

/// Reads a wide unsigned integer.
///
/// # Errors
/// Returns R6 past 11 bytes.
pub fn read_big_uint(cursor: &mut ByteCursor<'_>) -> Result<u128, FastError> {
    read_unsigned(cursor, BIG_INT_MAX_BYTES)
}

/// Reads an optional wide unsigned integer.
///
/// # Errors
/// Returns R6 past 12 bytes.
pub fn read_optional_big_uint(cursor: &mut ByteCursor<'_>) -> Result<Option<u128>, FastError> {
    Ok(unbias_unsigned(read_unsigned(
        cursor,
        BIG_INT_MAX_BYTES + NULLABLE_HEADROOM,
    )?))
}

/// Reads raw stop-bit delimited bytes, including the stop byte.
///
/// # Errors
/// Returns R6 if no stop bit appears within `limit` bytes.
pub fn read_raw_value<'a>(
    cursor: &mut ByteCursor<'a>,
    limit: usize,
) -> Result<&'a [u8], FastError> {
    let start = cursor.position();
    for _ in 0..limit {
        if cursor.read_byte()? & STOP_BIT != 0 {
            return Ok(cursor.consumed_since(start));
        }
    }
    Err(FastError::StopBitNotFound {
        offset: start,
        limit,
    })
}

fn ascii_from_raw(raw: &[u8]) -> String {
    raw.iter()
        .map(|b| b & 0x7F)
        .filter(|b| *b != 0)
        .map(char::from)
        .collect()
}

/// Reads a mandatory ASCII string. A lone `0x80` is the empty string.
///
/// # Errors
/// Returns `FastError::UnexpectedEof` if the stop bit is missing.
pub fn read_ascii(cursor: &mut ByteCursor<'_>) -> Result<String, FastError> {
    Ok(ascii_from_raw(read_raw_value(cursor, usize::MAX)?))
}

/// Reads an optional ASCII string. A lone `0x80` is Null and `0x00 0x80`
/// the empty string.
///
/// # Errors
/// Returns `FastError::UnexpectedEof` if the stop bit is missing.
pub fn read_optional_ascii(cursor: &mut ByteCursor<'_>) -> Result<Option<String>, FastError> {
    let raw = read_raw_value(cursor, usize::MAX)?;
    if raw == [STOP_BIT] {
        return Ok(None);
    }
    Ok(Some(ascii_from_raw(raw)))
}

/// Reads a mandatory byte vector: a `uInt32` length then raw bytes.
///
/// # Errors
/// Returns length decoding errors or `FastError::UnexpectedEof`.
pub fn read_byte_vector<'a>(cursor: &mut ByteCursor<'a>) -> Result<&'a [u8], FastError> {
    let len = read_u32(cursor)?;
    cursor.read_n(len as usize)
}

/// Reads an optional byte vector. A Null length is a Null vector.
///
/// # Errors
/// Returns length decoding errors or `FastError::UnexpectedEof`.
pub fn read_optional_byte_vector<'a>(
    cursor: &mut ByteCursor<'a>,
) -> Result<Option<&'a [u8]>, FastError> {
    read_optional_u32(cursor)?
        .map(|len| cursor.read_n(len as usize))
        .transpose()
}

/// Stream reader of a field, chosen from its type and operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveReader {
    /// `uInt32` value.
    U32,
    /// `int32` value.
    I32,
    /// `uInt64` value.
    U64,
    /// `int64` value.
    I64,
    /// ASCII string value.
    Ascii,
    /// Byte vector value, also used for unicode strings.
    ByteVector,
    /// Wide signed integer delta.
    IntegerDelta,
    /// Subtraction length followed by an ASCII string.
    AsciiDelta,
    /// Subtraction length followed by a byte vector.
    ByteVectorDelta,
}

impl PrimitiveReader {
    /// Selects the reader of a field.
    #[must_use]
    pub const fn for_field(ty: ScalarType, operator: OperatorKind) -> Self {
        let delta = matches!(operator, OperatorKind::Delta);
        match ty {
            _ if delta && ty.is_integer() => Self::IntegerDelta,
            ScalarType::AsciiString if delta => Self::AsciiDelta,
            ScalarType::UnicodeString | ScalarType::ByteVector if delta => Self::ByteVectorDelta,
            ScalarType::UInt32 => Self::U32,
            ScalarType::Int32 => Self::I32,
            ScalarType::UInt64 => Self::U64,
            ScalarType::Int64 => Self::I64,
            ScalarType::AsciiString => Self::Ascii,
            ScalarType::UnicodeString | ScalarType::ByteVector => Self::ByteVector,
        }
    }

    /// Reads one value from the stream. Optional fields use the nullable
    /// encodings; the payload after a delta subtraction is always mandatory.
    ///
    /// # Errors
    /// Returns the errors of the underlying primitive reader.
    pub fn read(&self, cursor: &mut ByteCursor<'_>, required: bool) -> Result<Value, FastError> {
        let value = match (self, required) {
            (Self::U32, true) => Value::U32(read_u32(cursor)?),
            (Self::U32, false) => read_optional_u32(cursor)?.map_or(Value::Null, Value::U32),
            (Self::I32, true) => Value::I32(read_i32(cursor)?),
            (Self::I32, false) => read_optional_i32(cursor)?.map_or(Value::Null, Value::I32),
            (Self::U64, true) => Value::U64(read_u64(cursor)?),
            (Self::U64, false) => read_optional_u64(cursor)?.map_or(Value::Null, Value::U64),
            (Self::I64, true) => Value::I64(read_i64(cursor)?),
            (Self::I64, false) => read_optional_i64(cursor)?.map_or(Value::Null, Value::I64),
            (Self::Ascii, true) => Value::string(read_ascii(cursor)?),
            (Self::Ascii, false) => read_optional_ascii(cursor)?.map_or(Value::Null, Value::string),
            (Self::ByteVector, true) => {
                Value::bytes(Bytes::copy_from_slice(read_byte_vector(cursor)?))
            }
            (Self::ByteVector, false) => read_optional_byte_vector(cursor)?
                .map_or(Value::Null, |b| Value::bytes(Bytes::copy_from_slice(b))),
            (Self::IntegerDelta, true) => Value::BigInt(read_big_int(cursor)?),
            (Self::IntegerDelta, false) => {
                read_optional_big_int(cursor)?.map_or(Value::Null, Value::BigInt)
            }
            (Self::AsciiDelta, _) => match read_subtraction(cursor, required)? {
                None => Value::Null,
                Some(subtraction) => Value::String {
                    text: read_ascii(cursor)?,
                    subtraction,
                },
            },
            (Self::ByteVectorDelta, _) => match read_subtraction(cursor, required)? {
                None => Value::Null,
                Some(subtraction) => Value::Bytes {
                    bytes: Bytes::copy_from_slice(read_byte_vector(cursor)?),
                    subtraction,
                },
            },
        };
        Ok(value)
    }
}

fn read_subtraction(cursor: &mut ByteCursor<'_>, required: bool) -> Result<Option<i32>, FastError> {
    if required {
        read_i32(cursor).map(Some)
    } else {
        read_optional_i32(cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastfix_core::ErrorCode;

    fn cursor(data: &[u8]) -> ByteCursor<'_> {
        ByteCursor::new(data)
    }

    #[test]
    fn test_read_u32_single_and_multi_byte() {
        assert_eq!(read_u32(&mut cursor(&[0x80])).unwrap(), 0);
        assert_eq!(read_u32(&mut cursor(&[0x81])).unwrap(), 1);
        assert_eq!(read_u32(&mut cursor(&[0x01, 0x80])).unwrap(), 128);
        assert_eq!(
            read_u32(&mut cursor(&[0x0F, 0x7F, 0x7F, 0x7F, 0xFF])).unwrap(),
            u32::MAX
        );
    }

    #[test]
    fn test_read_u32_overflow_is_r4() {
        let err = read_u32(&mut cursor(&[0x10, 0x00, 0x00, 0x00, 0x80])).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::R4));
    }

    #[test]
    fn test_read_u32_missing_stop_bit_is_r6() {
        let err = read_u32(&mut cursor(&[0x01, 0x01, 0x01, 0x01, 0x01, 0x81])).unwrap_err();
        assert_eq!(
            err,
            FastError::StopBitNotFound {
                offset: 0,
                limit: U32_MAX_BYTES
            }
        );
        assert_eq!(err.code(), Some(ErrorCode::R6));
    }

    #[test]
    fn test_read_optional_u32() {
        assert_eq!(read_optional_u32(&mut cursor(&[0x80])).unwrap(), None);
        assert_eq!(read_optional_u32(&mut cursor(&[0x81])).unwrap(), Some(0));
        assert_eq!(read_optional_u32(&mut cursor(&[0x8B])).unwrap(), Some(10));
        assert_eq!(
            read_optional_u32(&mut cursor(&[0x10, 0x00, 0x00, 0x00, 0x80])).unwrap(),
            Some(u32::MAX)
        );
    }

    #[test]
    fn test_read_i32_sign_extension() {
        assert_eq!(read_i32(&mut cursor(&[0xFF])).unwrap(), -1);
        assert_eq!(read_i32(&mut cursor(&[0xFA])).unwrap(), -6);
        assert_eq!(read_i32(&mut cursor(&[0xBF])).unwrap(), 63);
        assert_eq!(read_i32(&mut cursor(&[0x00, 0xC0])).unwrap(), 64);
        assert_eq!(read_i32(&mut cursor(&[0x7F, 0xBF])).unwrap(), -65);
    }

    #[test]
    fn test_read_optional_i32_negative_not_biased() {
        assert_eq!(read_optional_i32(&mut cursor(&[0x80])).unwrap(), None);
        assert_eq!(read_optional_i32(&mut cursor(&[0x81])).unwrap(), Some(0));
        assert_eq!(read_optional_i32(&mut cursor(&[0xFF])).unwrap(), Some(-1));
    }

    #[test]
    fn test_read_i64_and_u64() {
        assert_eq!(read_i64(&mut cursor(&[0x7F, 0xFF])).unwrap(), -1);
        assert_eq!(read_u64(&mut cursor(&[0x01, 0x00, 0x80])).unwrap(), 16384);
        assert_eq!(read_optional_u64(&mut cursor(&[0x80])).unwrap(), None);
        assert_eq!(read_optional_i64(&mut cursor(&[0x82])).unwrap(), Some(1));
    }

    #[test]
    fn test_read_big_int() {
        assert_eq!(read_big_int(&mut cursor(&[0xFA])).unwrap(), -6);
        assert_eq!(read_optional_big_int(&mut cursor(&[0x80])).unwrap(), None);
        assert_eq!(read_big_uint(&mut cursor(&[0x01, 0x80])).unwrap(), 128);
        assert_eq!(read_optional_big_uint(&mut cursor(&[0x81])).unwrap(), Some(0));
    }

    #[test]
    fn test_read_ascii() {
        assert_eq!(read_ascii(&mut cursor(&[0x80])).unwrap(), "");
        assert_eq!(read_ascii(&mut cursor(&[0x41, 0x42, 0xC3])).unwrap(), "ABC");
        assert_eq!(read_optional_ascii(&mut cursor(&[0x80])).unwrap(), None);
        assert_eq!(
            read_optional_ascii(&mut cursor(&[0x00, 0x80])).unwrap(),
            Some(String::new())
        );
    }

    #[test]
    fn test_read_ascii_drops_embedded_zero() {
        assert_eq!(read_ascii(&mut cursor(&[0x41, 0x00, 0xC2])).unwrap(), "AB");
        assert_eq!(
            read_optional_ascii(&mut cursor(&[0x41, 0x00, 0xC2])).unwrap(),
            Some("AB".to_string())
        );
    }

    #[test]
    fn test_read_u64_max() {
        let mut max = vec![0x01];
        max.extend([0x7F; 8]);
        max.push(0xFF);
        assert_eq!(read_u64(&mut cursor(&max)).unwrap(), u64::MAX);

        // u64::MAX + 1 once biased
        let mut biased = vec![0x02];
        biased.extend([0x00; 8]);
        biased.push(0x80);
        assert_eq!(read_optional_u64(&mut cursor(&biased)).unwrap(), Some(u64::MAX));
    }

    #[test]
    fn test_read_ascii_missing_stop_bit() {
        assert_eq!(
            read_ascii(&mut cursor(&[0x41, 0x42])),
            Err(FastError::UnexpectedEof { offset: 2 })
        );
    }

    #[test]
    fn test_read_byte_vector() {
        let data = [0x83, 0x01, 0xFF, 0x02, 0x99];
        let mut c = cursor(&data);
        assert_eq!(read_byte_vector(&mut c).unwrap(), &[0x01, 0xFF, 0x02]);
        assert_eq!(c.position(), 4);
        assert_eq!(read_optional_byte_vector(&mut cursor(&[0x80])).unwrap(), None);
        assert_eq!(
            read_optional_byte_vector(&mut cursor(&[0x81])).unwrap(),
            Some(&b""[..])
        );
    }

    #[test]
    fn test_read_raw_value_limit() {
        let err = read_raw_value(&mut cursor(&[0x00, 0x00, 0x80]), 2).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::R6));
        assert_eq!(
            read_raw_value(&mut cursor(&[0x00, 0x80, 0x01]), 2).unwrap(),
            &[0x00, 0x80]
        );
    }

    #[test]
    fn test_reader_selection() {
        assert_eq!(
            PrimitiveReader::for_field(ScalarType::UInt32, OperatorKind::Copy),
            PrimitiveReader::U32
        );
        assert_eq!(
            PrimitiveReader::for_field(ScalarType::Int64, OperatorKind::Delta),
            PrimitiveReader::IntegerDelta
        );
        assert_eq!(
            PrimitiveReader::for_field(ScalarType::AsciiString, OperatorKind::Delta),
            PrimitiveReader::AsciiDelta
        );
        assert_eq!(
            PrimitiveReader::for_field(ScalarType::UnicodeString, OperatorKind::Tail),
            PrimitiveReader::ByteVector
        );
    }

    #[test]
    fn test_string_delta_reader() {
        let data = [0xFA, 0x54, 0x45, 0x53, 0x54, 0xB1];
        let value = PrimitiveReader::AsciiDelta
            .read(&mut cursor(&data), true)
            .unwrap();
        assert_eq!(
            value,
            Value::String {
                text: "TEST1".to_string(),
                subtraction: -6
            }
        );
        let value = PrimitiveReader::AsciiDelta
            .read(&mut cursor(&[0x80]), false)
            .unwrap();
        assert!(value.is_null());
    }
}
