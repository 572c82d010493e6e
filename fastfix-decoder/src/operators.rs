/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! FAST field operators.
//!
//! Operators define how field values are decoded relative to the presence
//! map and to previous values in the dictionary. Each variant carries its
//! typed initial value and implements four hooks:
//!
//! | Operator  | pMap bit       | Read from stream | Value when not read |
//! |-----------|----------------|------------------|---------------------|
//! | none      | no             | always           | -                   |
//! | constant  | iff optional   | never            | initial, or Null when optional and bit clear |
//! | default   | yes            | bit set          | initial (possibly Null) |
//! | copy      | yes            | bit set          | previous, Null if empty, initial if undefined |
//! | increment | yes            | bit set          | previous + 1, Null if empty, initial if undefined |
//! | tail      | yes            | bit set          | previous, Null if empty, initial if undefined |
//! | delta     | no             | always           | -                   |

use crate::dictionary::Entry;
use crate::error::FastError;
use crate::pmap::PresenceMap;
use crate::value::{Value, items_to_payload};
use bytes::Bytes;
use fastfix_core::{FixValue, Payload};
use fastfix_template::{
    OperatorDef, OperatorKind, ScalarType, TemplateError, narrow_integer, parse_initial_value,
};

/// A field operator with its initial value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Operator {
    /// Value is always present in the stream.
    #[default]
    None,
    /// Value is never in the stream.
    Constant(Payload),
    /// If absent, use the initial value.
    Default(Option<Payload>),
    /// If absent, use the previous value.
    Copy(Option<Payload>),
    /// If absent, use the previous value plus one.
    Increment(Option<Payload>),
    /// Stream value replaces the tail of the previous value.
    Tail(Option<Payload>),
    /// Stream value is a difference from the previous value.
    Delta(Option<Payload>),
}

impl Operator {
    /// Builds an operator from its kind and typed initial value.
    ///
    /// # Errors
    /// Returns S2 if the operator does not apply to `ty`, S4 for a constant
    /// without a value, and S5 for a mandatory default without a value.
    pub fn new(
        kind: OperatorKind,
        initial: Option<Payload>,
        field: &str,
        ty: ScalarType,
        required: bool,
    ) -> Result<Self, TemplateError> {
        if !kind.applies_to(ty) {
            return Err(TemplateError::OperatorNotApplicable {
                field: field.to_string(),
                operator: kind,
                field_type: ty.to_string(),
            });
        }
        Ok(match kind {
            OperatorKind::None => Self::None,
            OperatorKind::Constant => {
                Self::Constant(initial.ok_or_else(|| TemplateError::ConstantWithoutValue {
                    field: field.to_string(),
                })?)
            }
            OperatorKind::Default => {
                if required && initial.is_none() {
                    return Err(TemplateError::DefaultWithoutValue {
                        field: field.to_string(),
                    });
                }
                Self::Default(initial)
            }
            OperatorKind::Copy => Self::Copy(initial),
            OperatorKind::Increment => Self::Increment(initial),
            OperatorKind::Tail => Self::Tail(initial),
            OperatorKind::Delta => Self::Delta(initial),
        })
    }

    /// Builds an operator from a template operator node.
    ///
    /// # Errors
    /// Returns the errors of [`Operator::new`], S3 for an unconvertible
    /// initial value and R4 for an out-of-range integer initial value.
    pub fn from_def(
        field: &str,
        ty: ScalarType,
        required: bool,
        def: Option<&OperatorDef>,
    ) -> Result<Self, TemplateError> {
        let Some(def) = def else {
            return Ok(Self::None);
        };
        let initial = def
            .value
            .as_deref()
            .map(|text| parse_initial_value(field, ty, text))
            .transpose()?;
        Self::new(def.kind, initial, field, ty, required)
    }

    /// Returns the operator kind.
    #[must_use]
    pub const fn kind(&self) -> OperatorKind {
        match self {
            Self::None => OperatorKind::None,
            Self::Constant(_) => OperatorKind::Constant,
            Self::Default(_) => OperatorKind::Default,
            Self::Copy(_) => OperatorKind::Copy,
            Self::Increment(_) => OperatorKind::Increment,
            Self::Tail(_) => OperatorKind::Tail,
            Self::Delta(_) => OperatorKind::Delta,
        }
    }

    /// Returns the initial value, if any.
    #[must_use]
    pub const fn initial(&self) -> Option<&Payload> {
        match self {
            Self::None => None,
            Self::Constant(v) => Some(v),
            Self::Default(v)
            | Self::Copy(v)
            | Self::Increment(v)
            | Self::Tail(v)
            | Self::Delta(v) => v.as_ref(),
        }
    }

    /// Returns true if the operator consumes a presence map bit.
    #[must_use]
    pub const fn requires_pmap(&self, required: bool) -> bool {
        match self {
            Self::None | Self::Delta(_) => false,
            Self::Constant(_) => !required,
            Self::Default(_) | Self::Copy(_) | Self::Increment(_) | Self::Tail(_) => true,
        }
    }

    /// Decides whether the value is read from the stream, consuming the
    /// presence map bit where the operator has one.
    pub fn should_read_value(&self, pmap: &mut PresenceMap) -> bool {
        match self {
            Self::None | Self::Delta(_) => true,
            Self::Constant(_) => false,
            Self::Default(_) | Self::Copy(_) | Self::Increment(_) | Self::Tail(_) => {
                pmap.next_bit()
            }
        }
    }

    /// Produces the value of a field that is not in the stream.
    ///
    /// # Errors
    /// Returns D5 for a mandatory field with no previous or initial value,
    /// D6 for a mandatory increment over an empty previous value, and R4 if
    /// the increment overflows `ty`.
    pub fn not_encoded_value(
        &self,
        pmap: &mut PresenceMap,
        required: bool,
        previous: Entry<'_>,
        ty: ScalarType,
    ) -> Result<FixValue, FastError> {
        match self {
            Self::None | Self::Delta(_) => Err(FastError::NotEncodedUnsupported(self.kind())),
            Self::Constant(value) => {
                if required || pmap.next_bit() {
                    Ok(FixValue::Present(value.clone()))
                } else {
                    Ok(FixValue::Null)
                }
            }
            Self::Default(initial) => Ok(initial.clone().into()),
            Self::Copy(initial) | Self::Tail(initial) => match previous {
                Entry::Assigned(value) => Ok(FixValue::Present(value.clone())),
                Entry::Empty => Ok(FixValue::Null),
                Entry::Undefined => initial_or_missing(initial.as_ref(), required),
            },
            Self::Increment(initial) => match previous {
                Entry::Assigned(value) => increment(value, ty).map(FixValue::Present),
                Entry::Empty if required => Err(FastError::EmptyPreviousValue),
                Entry::Empty => Ok(FixValue::Null),
                Entry::Undefined => initial_or_missing(initial.as_ref(), required),
            },
        }
    }

    /// Combines a value read from the stream with the operator state.
    ///
    /// # Errors
    /// Returns D6 for delta over an empty previous value, D7 for a
    /// subtraction longer than the base, and R4 for integer overflow.
    pub fn apply(
        &self,
        read: Value,
        previous: Entry<'_>,
        ty: ScalarType,
    ) -> Result<FixValue, FastError> {
        match self {
            Self::Tail(initial) if !read.is_null() => {
                let base = base_value(previous, initial.as_ref(), ty);
                let tail = read.as_items().ok_or_else(|| mismatch(ty, &read))?;
                let base_items = items_of(&base, ty)?;
                items_to_payload(ty, replace_tail(base_items, tail)).map(FixValue::Present)
            }
            Self::Delta(initial) if !read.is_null() => {
                if previous.is_empty() {
                    return Err(FastError::EmptyPreviousValue);
                }
                let base = base_value(previous, initial.as_ref(), ty);
                apply_delta(&base, &read, ty).map(FixValue::Present)
            }
            _ => read.into_field_value(ty),
        }
    }
}

fn initial_or_missing(initial: Option<&Payload>, required: bool) -> Result<FixValue, FastError> {
    match initial {
        Some(value) => Ok(FixValue::Present(value.clone())),
        None if required => Err(FastError::MissingMandatoryValue),
        None => Ok(FixValue::Null),
    }
}

fn increment(previous: &Payload, ty: ScalarType) -> Result<Payload, FastError> {
    let value = previous
        .as_i128()
        .ok_or(FastError::TypeMismatch {
            expected: ty,
            actual: previous.type_name(),
        })?
        + 1;
    narrow_integer(value, ty).ok_or(FastError::IntegerOverflow {
        value,
        target: ty.tag_name(),
    })
}

/// Zero, the empty string, or the empty byte vector.
fn structural_base(ty: ScalarType) -> Payload {
    match ty {
        ScalarType::AsciiString | ScalarType::UnicodeString => Payload::String(String::new()),
        ScalarType::ByteVector => Payload::Bytes(Bytes::new()),
        ScalarType::Int32 => Payload::I32(0),
        ScalarType::UInt32 => Payload::U32(0),
        ScalarType::Int64 => Payload::I64(0),
        ScalarType::UInt64 => Payload::U64(0),
    }
}

fn base_value(previous: Entry<'_>, initial: Option<&Payload>, ty: ScalarType) -> Payload {
    match previous {
        Entry::Assigned(value) => value.clone(),
        _ => initial.cloned().unwrap_or_else(|| structural_base(ty)),
    }
}

fn items_of(payload: &Payload, ty: ScalarType) -> Result<&[u8], FastError> {
    payload.as_byte_slice().ok_or(FastError::TypeMismatch {
        expected: ty,
        actual: payload.type_name(),
    })
}

fn mismatch(ty: ScalarType, read: &Value) -> FastError {
    FastError::TypeMismatch {
        expected: ty,
        actual: if read.as_i128().is_some() {
            "integer"
        } else {
            "unknown"
        },
    }
}

/// Overwrites the tail of `base` with `tail`.
fn replace_tail(base: &[u8], tail: &[u8]) -> Vec<u8> {
    let keep = base.len().saturating_sub(tail.len());
    let mut out = Vec::with_capacity(keep + tail.len());
    out.extend_from_slice(&base[..keep]);
    out.extend_from_slice(tail);
    out
}

/// Applies a string or byte vector delta.
///
/// `subtraction >= 0` removes that many trailing items and appends;
/// `subtraction < 0` removes `|subtraction| - 1` leading items and prepends.
///
/// # Errors
/// Returns D7 if the removal exceeds the base length.
pub fn subtract_and_merge(
    base: &[u8],
    payload: &[u8],
    subtraction: i32,
) -> Result<Vec<u8>, FastError> {
    let too_long = || FastError::SubtractionTooLong {
        subtraction,
        base_len: base.len(),
    };
    let mut out = Vec::with_capacity(base.len() + payload.len());
    if subtraction >= 0 {
        let remove = subtraction.unsigned_abs() as usize;
        let keep = base.len().checked_sub(remove).ok_or_else(too_long)?;
        out.extend_from_slice(&base[..keep]);
        out.extend_from_slice(payload);
    } else {
        let remove = (subtraction.unsigned_abs() - 1) as usize;
        if remove > base.len() {
            return Err(too_long());
        }
        out.extend_from_slice(payload);
        out.extend_from_slice(&base[remove..]);
    }
    Ok(out)
}

fn apply_delta(base: &Payload, read: &Value, ty: ScalarType) -> Result<Payload, FastError> {
    if ty.is_integer() {
        let base_value = base.as_i128().ok_or(FastError::TypeMismatch {
            expected: ty,
            actual: base.type_name(),
        })?;
        let delta = read.as_i128().ok_or_else(|| mismatch(ty, read))?;
        let sum = base_value
            .checked_add(delta)
            .ok_or(FastError::IntegerOverflow {
                value: delta,
                target: ty.tag_name(),
            })?;
        return narrow_integer(sum, ty).ok_or(FastError::IntegerOverflow {
            value: sum,
            target: ty.tag_name(),
        });
    }
    let payload = read.as_items().ok_or_else(|| mismatch(ty, read))?;
    let merged = subtract_and_merge(items_of(base, ty)?, payload, read.subtraction())?;
    items_to_payload(ty, merged)
}
