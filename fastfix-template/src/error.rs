/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Template loading error types.

use crate::schema::{OperatorKind, ScalarType};
use fastfix_core::ErrorCode;
use thiserror::Error;

/// Errors raised while turning template definitions into decoders.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// The operator cannot be used with the field's type.
    #[error("[S2] field '{field}': {operator} operator not applicable to {field_type}")]
    OperatorNotApplicable {
        /// Field name.
        field: String,
        /// Offending operator.
        operator: OperatorKind,
        /// Field type name.
        field_type: String,
    },

    /// The initial value cannot be converted to the field's type.
    #[error("[S3] field '{field}': initial value '{value}' is not a valid {field_type}: {reason}")]
    InvalidInitialValue {
        /// Field name.
        field: String,
        /// The value attribute as written.
        value: String,
        /// Target type name.
        field_type: &'static str,
        /// Why conversion failed.
        reason: String,
    },

    /// A constant operator has no initial value.
    #[error("[S4] field '{field}': constant operator requires an initial value")]
    ConstantWithoutValue {
        /// Field name.
        field: String,
    },

    /// A default operator on a mandatory field has no initial value.
    #[error("[S5] field '{field}': default operator on a mandatory field requires an initial value")]
    DefaultWithoutValue {
        /// Field name.
        field: String,
    },

    /// An integer initial value does not fit the field's width.
    #[error("[R4] field '{field}': initial value {value} does not fit {field_type}")]
    IntegerOutOfRange {
        /// Field name.
        field: String,
        /// The value attribute as written.
        value: String,
        /// Target type.
        field_type: ScalarType,
    },

    /// A decimal initial value has an exponent outside [-63, 63] or a
    /// mantissa outside i64.
    #[error("[R1] field '{field}': decimal initial value {value} out of range")]
    DecimalOutOfRange {
        /// Field name.
        field: String,
        /// The value attribute as written.
        value: String,
    },

    /// Two templates share the same id.
    #[error("duplicate template id: {0}")]
    DuplicateTemplate(u32),
}

impl TemplateError {
    /// Returns the FAST error code, if the error has one.
    #[must_use]
    pub const fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::OperatorNotApplicable { .. } => Some(ErrorCode::S2),
            Self::InvalidInitialValue { .. } => Some(ErrorCode::S3),
            Self::ConstantWithoutValue { .. } => Some(ErrorCode::S4),
            Self::DefaultWithoutValue { .. } => Some(ErrorCode::S5),
            Self::IntegerOutOfRange { .. } => Some(ErrorCode::R4),
            Self::DecimalOutOfRange { .. } => Some(ErrorCode::R1),
            Self::DuplicateTemplate(_) => None,
        }
    }
}
