/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Error codes and message access errors shared by all fastfix crates.
//!
//! The FAST standard assigns stable identifiers to its static (S),
//! dynamic (D) and reportable (R) errors. Every coded error in fastfix
//! renders its identifier in square brackets at the start of its message so
//! callers can match on the substring, and exposes it as an [`ErrorCode`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stable FAST error identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Operator not applicable to the field's type.
    S2,
    /// Initial value cannot be converted to the field's type.
    S3,
    /// Constant operator without an initial value.
    S4,
    /// Default operator on a mandatory field without an initial value.
    S5,
    /// Mandatory field absent from the stream with no previous or initial value.
    D5,
    /// Mandatory field absent from the stream with an empty previous value.
    D6,
    /// Delta subtraction length exceeds the base length.
    D7,
    /// Template id in the stream does not match any template.
    D9,
    /// Decimal exponent or mantissa out of range.
    R1,
    /// Integer value does not fit the target width.
    R4,
    /// Stop bit not found within the primitive's byte budget.
    R6,
}

impl ErrorCode {
    /// Returns the identifier as it appears in error messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::S2 => "S2",
            Self::S3 => "S3",
            Self::S4 => "S4",
            Self::S5 => "S5",
            Self::D5 => "D5",
            Self::D6 => "D6",
            Self::D7 => "D7",
            Self::D9 => "D9",
            Self::R1 => "R1",
            Self::R4 => "R4",
            Self::R6 => "R6",
        }
    }

    /// Returns true for static errors, which surface while loading templates.
    #[must_use]
    pub const fn is_static(&self) -> bool {
        matches!(self, Self::S2 | Self::S3 | Self::S4 | Self::S5)
    }

    /// Returns a short description of the error class.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::S2 => "operator not applicable to field type",
            Self::S3 => "initial value not convertible to field type",
            Self::S4 => "constant operator without initial value",
            Self::S5 => "default operator on mandatory field without initial value",
            Self::D5 => "mandatory field has no previous or initial value",
            Self::D6 => "mandatory field has an empty previous value",
            Self::D7 => "subtraction length exceeds base length",
            Self::D9 => "unknown template id",
            Self::R1 => "decimal out of range",
            Self::R4 => "integer out of range",
            Self::R6 => "stop bit not found",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised when querying a decoded FIX message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// The message has no field with the requested tag.
    #[error("tag {0} not found in message")]
    MissingTag(u64),

    /// The field holds a value of a different type.
    #[error("tag {tag} holds {actual}, not {expected}")]
    TypeMismatch {
        /// The queried tag.
        tag: u64,
        /// The type the caller asked for.
        expected: &'static str,
        /// The type actually stored.
        actual: &'static str,
    },
}
