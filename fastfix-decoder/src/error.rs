/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! FAST decoding error types.

use fastfix_core::ErrorCode;
use fastfix_template::{OperatorKind, ScalarType};
use thiserror::Error;

/// Errors that can occur while decoding a FAST message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FastError {
    /// Unexpected end of input.
    #[error("unexpected end of input at byte {offset}")]
    UnexpectedEof {
        /// Offset of the missing byte.
        offset: usize,
    },

    /// No stop bit within the primitive's byte budget.
    #[error("[R6] stop bit not found within {limit} bytes at byte {offset}")]
    StopBitNotFound {
        /// Offset of the first byte of the value.
        offset: usize,
        /// Byte budget of the primitive.
        limit: usize,
    },

    /// Integer value does not fit the target width.
    #[error("[R4] value {value} does not fit {target}")]
    IntegerOverflow {
        /// The out-of-range value.
        value: i128,
        /// Target type name.
        target: &'static str,
    },

    /// Decimal exponent outside [-63, 63].
    #[error("[R1] decimal exponent {exponent} out of range [-63, 63]")]
    ExponentOutOfRange {
        /// The decoded exponent.
        exponent: i32,
    },

    /// Decimal mantissa outside the `int64` range.
    #[error("[R1] decimal mantissa {mantissa} out of int64 range")]
    MantissaOutOfRange {
        /// The decoded mantissa.
        mantissa: i128,
    },

    /// Sequence length larger than the input left to hold its elements.
    #[error("sequence length {length} exceeds the {remaining} bytes left in the input")]
    SequenceTooLong {
        /// The decoded length.
        length: u32,
        /// Bytes left after the length.
        remaining: usize,
    },

    /// Mandatory field absent with no previous or initial value.
    #[error("[D5] mandatory field absent with no previous or initial value")]
    MissingMandatoryValue,

    /// Mandatory field absent with an empty previous value.
    #[error("[D6] mandatory field absent with an empty previous value")]
    EmptyPreviousValue,

    /// Delta subtraction length exceeds the base length.
    #[error("[D7] subtraction length {subtraction} exceeds base length {base_len}")]
    SubtractionTooLong {
        /// The subtraction length read from the stream.
        subtraction: i32,
        /// Length of the base value.
        base_len: usize,
    },

    /// Unknown template ID.
    #[error("[D9] unknown template id: {0}")]
    UnknownTemplate(u32),

    /// Invalid string encoding.
    #[error("invalid string encoding")]
    InvalidString,

    /// A dictionary entry holds a value of another type than the field.
    #[error("previous value of type {actual} cannot be used as {expected}")]
    TypeMismatch {
        /// The field's type.
        expected: ScalarType,
        /// The type found in the dictionary.
        actual: &'static str,
    },

    /// The operator always reads from the stream and has no absent-value rule.
    #[error("{0} operator has no value when the field is not encoded")]
    NotEncodedUnsupported(OperatorKind),

    /// A failure while decoding a specific field.
    #[error("field '{name}' ({operator}) at byte {offset}: {source}")]
    Field {
        /// Dictionary name of the field.
        name: String,
        /// Operator of the field.
        operator: OperatorKind,
        /// Stream offset at which the field started.
        offset: usize,
        /// The underlying failure.
        source: Box<FastError>,
    },
}

impl FastError {
    /// Wraps the error with the context of the field being decoded.
    #[must_use]
    pub fn in_field(self, name: &str, operator: OperatorKind, offset: usize) -> Self {
        Self::Field {
            name: name.to_string(),
            operator,
            offset,
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping field context.
    #[must_use]
    pub fn root_cause(&self) -> &FastError {
        match self {
            Self::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Returns the FAST error code, if the error has one.
    #[must_use]
    pub fn code(&self) -> Option<ErrorCode> {
        match self.root_cause() {
            Self::StopBitNotFound { .. } => Some(ErrorCode::R6),
            Self::IntegerOverflow { .. } => Some(ErrorCode::R4),
            Self::ExponentOutOfRange { .. } | Self::MantissaOutOfRange { .. } => {
                Some(ErrorCode::R1)
            }
            Self::MissingMandatoryValue => Some(ErrorCode::D5),
            Self::EmptyPreviousValue => Some(ErrorCode::D6),
            Self::SubtractionTooLong { .. } => Some(ErrorCode::D7),
            Self::UnknownTemplate(_) => Some(ErrorCode::D9),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_context_display() {
        let err = FastError::SubtractionTooLong {
            subtraction: 9,
            base_len: 4,
        }
        .in_field("Symbol", OperatorKind::Delta, 12);
        assert_eq!(
            err.to_string(),
            "field 'Symbol' (delta) at byte 12: [D7] subtraction length 9 exceeds base length 4"
        );
        assert_eq!(err.code(), Some(ErrorCode::D7));
    }

    #[test]
    fn test_root_cause_unwraps_nesting() {
        let err = FastError::EmptyPreviousValue
            .in_field("MDEntryPx", OperatorKind::Increment, 9)
            .in_field("MDEntries", OperatorKind::None, 4);
        assert_eq!(err.root_cause(), &FastError::EmptyPreviousValue);
        assert_eq!(err.code(), Some(ErrorCode::D6));
    }

    #[test]
    fn test_uncoded_errors() {
        assert_eq!(FastError::UnexpectedEof { offset: 3 }.code(), None);
        assert_eq!(FastError::InvalidString.code(), None);
        assert_eq!(
            FastError::UnknownTemplate(99).to_string(),
            "[D9] unknown template id: 99"
        );
    }
}
