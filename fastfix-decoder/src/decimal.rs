/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Composite decimal field: an `int32` exponent and an `int64` mantissa.
//!
//! When the exponent is Null the decimal is Null and no mantissa bytes are
//! in the stream. The mantissa is always mandatory.

use crate::cursor::ByteCursor;
use crate::dictionary::Dictionary;
use crate::error::FastError;
use crate::field::ScalarField;
use crate::operators::Operator;
use crate::pmap::PresenceMap;
use fastfix_core::{
    FixValue, MAX_DECIMAL_EXPONENT, MIN_DECIMAL_EXPONENT, Payload, ScaledDecimal,
};
use fastfix_template::{DecimalOperators, OperatorKind, ScalarType, TemplateError, parse_decimal};

/// A decimal field built from two scalar sub-fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DecimalField {
    id: u32,
    name: String,
    required: bool,
    exponent: ScalarField,
    mantissa: ScalarField,
}

impl DecimalField {
    /// Creates a decimal field. Sub-fields are named `<name>Exponent` and
    /// `<name>Mantissa`.
    #[must_use]
    pub fn new(
        id: u32,
        name: impl Into<String>,
        required: bool,
        exponent: Operator,
        mantissa: Operator,
    ) -> Self {
        let name = name.into();
        Self {
            exponent: ScalarField::new(
                id,
                format!("{name}Exponent"),
                ScalarType::Int32,
                required,
                exponent,
            ),
            mantissa: ScalarField::new(
                id,
                format!("{name}Mantissa"),
                ScalarType::Int64,
                true,
                mantissa,
            ),
            id,
            name,
            required,
        }
    }

    /// Creates a decimal field from its operator nodes.
    ///
    /// A single operator is applied to both sub-fields, with its decimal
    /// initial value split into exponent and mantissa.
    ///
    /// # Errors
    /// Returns S2..S5 loader errors for either sub-field, S2 for a single
    /// increment operator, and R1 for a decimal initial value out of range.
    pub fn from_def(
        id: u32,
        name: impl Into<String>,
        required: bool,
        operators: &DecimalOperators,
    ) -> Result<Self, TemplateError> {
        let name = name.into();
        let exponent_name = format!("{name}Exponent");
        let mantissa_name = format!("{name}Mantissa");
        let (exponent, mantissa) = match operators {
            DecimalOperators::None => (Operator::None, Operator::None),
            DecimalOperators::Single(def) => {
                if matches!(def.kind, OperatorKind::Increment) {
                    return Err(TemplateError::OperatorNotApplicable {
                        field: name,
                        operator: def.kind,
                        field_type: "decimal".to_string(),
                    });
                }
                let initial = def
                    .value
                    .as_deref()
                    .map(|text| parse_decimal(&name, text))
                    .transpose()?;
                let exponent = Operator::new(
                    def.kind,
                    initial.map(|d| Payload::I32(d.exponent())),
                    &exponent_name,
                    ScalarType::Int32,
                    required,
                )?;
                // presence checks follow the decimal; the mantissa is still read as mandatory
                let mantissa = Operator::new(
                    def.kind,
                    initial.map(|d| Payload::I64(d.mantissa())),
                    &mantissa_name,
                    ScalarType::Int64,
                    required,
                )?;
                (exponent, mantissa)
            }
            DecimalOperators::Split { exponent, mantissa } => (
                Operator::from_def(
                    &exponent_name,
                    ScalarType::Int32,
                    required,
                    exponent.as_ref(),
                )?,
                Operator::from_def(
                    &mantissa_name,
                    ScalarType::Int64,
                    true,
                    mantissa.as_ref(),
                )?,
            ),
        };
        Ok(Self::new(id, name, required, exponent, mantissa))
    }

    /// Returns the FIX tag.
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Returns the dictionary name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true for mandatory decimals.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the exponent sub-field.
    #[must_use]
    pub const fn exponent(&self) -> &ScalarField {
        &self.exponent
    }

    /// Returns the mantissa sub-field.
    #[must_use]
    pub const fn mantissa(&self) -> &ScalarField {
        &self.mantissa
    }

    /// Returns true if either sub-field consumes a presence map bit.
    #[must_use]
    pub const fn requires_pmap(&self) -> bool {
        self.exponent.requires_pmap() || self.mantissa.requires_pmap()
    }

    /// Decodes the decimal and records it under its own name.
    ///
    /// # Errors
    /// Returns sub-field errors, R1 for an exponent outside [-63, 63] or a
    /// mantissa outside `int64`, and D5 if the mantissa yields no value.
    pub fn decode(
        &self,
        cursor: &mut ByteCursor<'_>,
        pmap: &mut PresenceMap,
        dictionary: &mut Dictionary,
    ) -> Result<FixValue, FastError> {
        let offset = cursor.position();
        let context = |e: FastError| e.in_field(&self.name, OperatorKind::None, offset);

        let exponent = match self.exponent.decode(cursor, pmap, dictionary)? {
            FixValue::Null => {
                dictionary.set(&self.name, &FixValue::Null);
                return Ok(FixValue::Null);
            }
            value => value.as_i32().ok_or_else(|| {
                context(FastError::TypeMismatch {
                    expected: ScalarType::Int32,
                    actual: value.type_name(),
                })
            })?,
        };
        if !(MIN_DECIMAL_EXPONENT..=MAX_DECIMAL_EXPONENT).contains(&exponent) {
            return Err(context(FastError::ExponentOutOfRange { exponent }));
        }

        let mantissa = self
            .mantissa
            .decode(cursor, pmap, dictionary)
            .map_err(|e| {
                if let FastError::IntegerOverflow { value, .. } = *e.root_cause() {
                    context(FastError::MantissaOutOfRange { mantissa: value })
                } else {
                    e
                }
            })?
            .as_i64()
            .ok_or_else(|| context(FastError::MissingMandatoryValue))?;

        let value = FixValue::Present(Payload::Decimal(ScaledDecimal::new(exponent, mantissa)));
        dictionary.set(&self.name, &value);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastfix_core::ErrorCode;
    use fastfix_template::OperatorDef;

    fn decode(
        field: &DecimalField,
        data: &[u8],
        bits: &[bool],
    ) -> (Result<FixValue, FastError>, usize) {
        let mut cursor = ByteCursor::new(data);
        let mut pmap = PresenceMap::from_bits(bits);
        let result = field.decode(&mut cursor, &mut pmap, &mut Dictionary::new());
        (result, cursor.position())
    }

    #[test]
    fn test_plain_decimal() {
        let field = DecimalField::new(270, "MDEntryPx", true, Operator::None, Operator::None);
        // exponent -2, mantissa 15025
        let (value, read) = decode(&field, &[0xFE, 0x00, 0x75, 0xB1], &[]);
        assert_eq!(
            value.unwrap(),
            FixValue::Present(Payload::Decimal(ScaledDecimal::new(-2, 15025)))
        );
        assert_eq!(read, 4);
    }

    #[test]
    fn test_null_exponent_skips_mantissa() {
        let field = DecimalField::new(270, "MDEntryPx", false, Operator::None, Operator::None);
        let (value, read) = decode(&field, &[0x80, 0x85], &[]);
        assert!(value.unwrap().is_null());
        assert_eq!(read, 1);
    }

    #[test]
    fn test_exponent_out_of_range_is_r1() {
        let field = DecimalField::new(270, "MDEntryPx", true, Operator::None, Operator::None);
        // exponent 64
        let (value, _) = decode(&field, &[0x00, 0xC0, 0x81], &[]);
        assert_eq!(value.unwrap_err().code(), Some(ErrorCode::R1));
    }

    #[test]
    fn test_mantissa_out_of_int64_is_r1() {
        let field = DecimalField::new(44, "Px", true, Operator::None, Operator::None);
        // exponent -2, mantissa 2^63
        let mut data = vec![0xFE, 0x01];
        data.extend([0x00; 8]);
        data.push(0x80);
        let (value, _) = decode(&field, &data, &[]);
        let err = value.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::R1));
        assert_eq!(
            err.root_cause(),
            &FastError::MantissaOutOfRange {
                mantissa: 1_i128 << 63
            }
        );
    }

    #[test]
    fn test_optional_single_default_without_value() {
        let def = DecimalOperators::Single(OperatorDef::default_value());
        let field = DecimalField::from_def(44, "Price", false, &def).unwrap();
        assert_eq!(field.mantissa().operator(), &Operator::Default(None));
        assert!(field.mantissa().is_required());

        let (value, read) = decode(&field, &[], &[false]);
        assert!(value.unwrap().is_null());
        assert_eq!(read, 0);

        let err = DecimalField::from_def(44, "Price", true, &def).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::S5));
    }

    #[test]
    fn test_single_increment_is_s2() {
        let def = DecimalOperators::Single(OperatorDef::increment());
        let err = DecimalField::from_def(44, "Price", false, &def).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::S2));
        assert_eq!(
            err.to_string(),
            "[S2] field 'Price': increment operator not applicable to decimal"
        );
    }

    #[test]
    fn test_single_operator_splits_initial_value() {
        let def = DecimalOperators::Single(OperatorDef::default_value().with_value("1.50"));
        let field = DecimalField::from_def(44, "Price", true, &def).unwrap();
        assert!(field.requires_pmap());
        assert_eq!(
            field.exponent().operator(),
            &Operator::Default(Some(Payload::I32(-1)))
        );
        assert_eq!(
            field.mantissa().operator(),
            &Operator::Default(Some(Payload::I64(15)))
        );

        let (value, read) = decode(&field, &[], &[false, false]);
        assert_eq!(value.unwrap().as_decimal(), Some(ScaledDecimal::new(-1, 15)));
        assert_eq!(read, 0);
    }

    #[test]
    fn test_split_operators() {
        let def = DecimalOperators::Split {
            exponent: Some(OperatorDef::copy().with_value("-2")),
            mantissa: Some(OperatorDef::delta()),
        };
        let field = DecimalField::from_def(44, "Price", true, &def).unwrap();
        let mut dict = Dictionary::new();
        let mut pmap = PresenceMap::from_bits(&[false]);
        let data = [0x00, 0xE4];
        let mut cursor = ByteCursor::new(&data);
        let value = field.decode(&mut cursor, &mut pmap, &mut dict).unwrap();
        assert_eq!(value.as_decimal(), Some(ScaledDecimal::new(-2, 100)));
        assert!(matches!(
            dict.get("PriceMantissa"),
            crate::dictionary::Entry::Assigned(Payload::I64(100))
        ));
    }

    #[test]
    fn test_tail_on_decimal_is_s2() {
        let def = DecimalOperators::Single(OperatorDef::tail());
        let err = DecimalField::from_def(44, "Price", true, &def).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::S2));
    }
}
