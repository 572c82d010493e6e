/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Schema definitions for FAST templates.
//!
//! This module defines the template tree consumed by the decoder:
//! - [`TemplateSet`]: The `templates` root
//! - [`TemplateDef`]: One template with its numeric id and ordered fields
//! - [`FieldDef`]: A field node (scalar, decimal or sequence)
//! - [`OperatorDef`]: A field operator with its optional initial value
//!
//! Parsing template XML is left to callers; the tree can also be built in
//! code with the `with_*` builders or deserialized with serde.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scalar FAST field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    /// `string` (ASCII charset).
    AsciiString,
    /// `string` with `charset="unicode"`.
    UnicodeString,
    /// `int32`.
    Int32,
    /// `uInt32`.
    UInt32,
    /// `int64`.
    Int64,
    /// `uInt64`.
    UInt64,
    /// `byteVector`.
    ByteVector,
}

impl ScalarType {
    /// Returns the template tag name of this type.
    #[must_use]
    pub const fn tag_name(&self) -> &'static str {
        match self {
            Self::AsciiString | Self::UnicodeString => "string",
            Self::Int32 => "int32",
            Self::UInt32 => "uInt32",
            Self::Int64 => "int64",
            Self::UInt64 => "uInt64",
            Self::ByteVector => "byteVector",
        }
    }

    /// Returns true for the integer types.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Self::Int32 | Self::UInt32 | Self::Int64 | Self::UInt64)
    }

    /// Returns true for strings and byte vectors.
    #[must_use]
    pub const fn is_sequence_of_items(&self) -> bool {
        matches!(
            self,
            Self::AsciiString | Self::UnicodeString | Self::ByteVector
        )
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnicodeString => f.write_str("unicode string"),
            other => f.write_str(other.tag_name()),
        }
    }
}

impl FromStr for ScalarType {
    type Err = String;

    /// Parses a scalar template tag name. `string` maps to the ASCII charset.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Self::AsciiString),
            "int32" => Ok(Self::Int32),
            "uInt32" => Ok(Self::UInt32),
            "int64" => Ok(Self::Int64),
            "uInt64" => Ok(Self::UInt64),
            "byteVector" => Ok(Self::ByteVector),
            other => Err(format!("unknown scalar field type: {other}")),
        }
    }
}

/// Field presence attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Presence {
    /// The field always carries a value.
    #[default]
    Mandatory,
    /// The field may be absent (`Null`).
    Optional,
}

impl Presence {
    /// Returns true for mandatory fields.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        matches!(self, Self::Mandatory)
    }
}

/// FAST field operator kinds. A field without an operator uses `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OperatorKind {
    /// No operator - value is always present in stream.
    #[default]
    None,
    /// Constant - value is never in stream, always uses initial value.
    Constant,
    /// Default - if absent, use initial value.
    Default,
    /// Copy - if absent, use previous value from dictionary.
    Copy,
    /// Increment - if absent, increment previous value by 1.
    Increment,
    /// Tail - value in stream replaces tail of previous value.
    Tail,
    /// Delta - value in stream is delta from previous value.
    Delta,
}

impl OperatorKind {
    /// Returns the template tag name of this operator.
    #[must_use]
    pub const fn tag_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Constant => "constant",
            Self::Default => "default",
            Self::Copy => "copy",
            Self::Increment => "increment",
            Self::Tail => "tail",
            Self::Delta => "delta",
        }
    }

    /// Returns true if the operator can be applied to the scalar type.
    #[must_use]
    pub const fn applies_to(&self, ty: ScalarType) -> bool {
        match self {
            Self::Increment => ty.is_integer(),
            Self::Tail => ty.is_sequence_of_items(),
            _ => true,
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag_name())
    }
}

impl FromStr for OperatorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "constant" => Ok(Self::Constant),
            "default" => Ok(Self::Default),
            "copy" => Ok(Self::Copy),
            "increment" => Ok(Self::Increment),
            "tail" => Ok(Self::Tail),
            "delta" => Ok(Self::Delta),
            other => Err(format!("unknown operator: {other}")),
        }
    }
}

/// An operator child of a field node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OperatorDef {
    /// The operator kind.
    pub kind: OperatorKind,
    /// The `value` attribute, in the field's type domain.
    #[serde(default)]
    pub value: Option<String>,
}

impl OperatorDef {
    /// Creates an operator without an initial value.
    #[must_use]
    pub const fn new(kind: OperatorKind) -> Self {
        Self { kind, value: None }
    }

    /// Sets the initial value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// `<constant value="..."/>`.
    #[must_use]
    pub fn constant(value: impl Into<String>) -> Self {
        Self::new(OperatorKind::Constant).with_value(value)
    }

    /// `<default/>`.
    #[must_use]
    pub const fn default_value() -> Self {
        Self::new(OperatorKind::Default)
    }

    /// `<copy/>`.
    #[must_use]
    pub const fn copy() -> Self {
        Self::new(OperatorKind::Copy)
    }

    /// `<increment/>`.
    #[must_use]
    pub const fn increment() -> Self {
        Self::new(OperatorKind::Increment)
    }

    /// `<tail/>`.
    #[must_use]
    pub const fn tail() -> Self {
        Self::new(OperatorKind::Tail)
    }

    /// `<delta/>`.
    #[must_use]
    pub const fn delta() -> Self {
        Self::new(OperatorKind::Delta)
    }
}

/// Operator children of a decimal field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DecimalOperators {
    /// No operator child; both sub-fields use `none`.
    #[default]
    None,
    /// A single operator applied to both sub-fields; its value is a decimal
    /// literal split into exponent and mantissa initial values.
    Single(OperatorDef),
    /// Separate `exponent` and `mantissa` children.
    Split {
        /// Operator of the exponent sub-field.
        exponent: Option<OperatorDef>,
        /// Operator of the mantissa sub-field.
        mantissa: Option<OperatorDef>,
    },
}

/// The `length` child of a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LengthDef {
    /// Tag emitted for the length; defaults to the sequence id.
    #[serde(default)]
    pub id: Option<u32>,
    /// Dictionary key; defaults to `<sequence name>Length`.
    #[serde(default)]
    pub name: Option<String>,
    /// Operator applied to the length field.
    #[serde(default)]
    pub operator: Option<OperatorDef>,
}

/// Kind-specific part of a field node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// A scalar field with at most one operator.
    Scalar {
        /// Scalar type.
        ty: ScalarType,
        /// Operator child, `None` for no operator.
        operator: Option<OperatorDef>,
    },
    /// A decimal (exponent + mantissa).
    Decimal(DecimalOperators),
    /// A sequence of repeated members.
    Sequence {
        /// The length child.
        length: LengthDef,
        /// Member fields of each element.
        fields: Vec<FieldDef>,
    },
}

/// A field node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// FIX tag emitted for this field.
    pub id: u32,
    /// Dictionary key; defaults to the id's decimal text.
    #[serde(default)]
    pub name: Option<String>,
    /// Presence attribute.
    #[serde(default)]
    pub presence: Presence,
    /// Kind-specific definition.
    pub kind: FieldKind,
}

impl FieldDef {
    /// Creates a mandatory scalar field without an operator.
    #[must_use]
    pub fn scalar(id: u32, name: impl Into<String>, ty: ScalarType) -> Self {
        Self {
            id,
            name: Some(name.into()),
            presence: Presence::Mandatory,
            kind: FieldKind::Scalar { ty, operator: None },
        }
    }

    /// Creates an ASCII `string` field.
    #[must_use]
    pub fn string(id: u32, name: impl Into<String>) -> Self {
        Self::scalar(id, name, ScalarType::AsciiString)
    }

    /// Creates a `string` field with `charset="unicode"`.
    #[must_use]
    pub fn unicode(id: u32, name: impl Into<String>) -> Self {
        Self::scalar(id, name, ScalarType::UnicodeString)
    }

    /// Creates an `int32` field.
    #[must_use]
    pub fn int32(id: u32, name: impl Into<String>) -> Self {
        Self::scalar(id, name, ScalarType::Int32)
    }

    /// Creates a `uInt32` field.
    #[must_use]
    pub fn uint32(id: u32, name: impl Into<String>) -> Self {
        Self::scalar(id, name, ScalarType::UInt32)
    }

    /// Creates an `int64` field.
    #[must_use]
    pub fn int64(id: u32, name: impl Into<String>) -> Self {
        Self::scalar(id, name, ScalarType::Int64)
    }

    /// Creates a `uInt64` field.
    #[must_use]
    pub fn uint64(id: u32, name: impl Into<String>) -> Self {
        Self::scalar(id, name, ScalarType::UInt64)
    }

    /// Creates a `byteVector` field.
    #[must_use]
    pub fn byte_vector(id: u32, name: impl Into<String>) -> Self {
        Self::scalar(id, name, ScalarType::ByteVector)
    }

    /// Creates a mandatory `decimal` field without operators.
    #[must_use]
    pub fn decimal(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
            presence: Presence::Mandatory,
            kind: FieldKind::Decimal(DecimalOperators::None),
        }
    }

    /// Creates a mandatory `sequence` with the given members.
    #[must_use]
    pub fn sequence(id: u32, name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            id,
            name: Some(name.into()),
            presence: Presence::Mandatory,
            kind: FieldKind::Sequence {
                length: LengthDef::default(),
                fields,
            },
        }
    }

    /// Marks the field optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }

    /// Sets the operator of a scalar field, or the single operator of a decimal.
    ///
    /// Has no effect on sequences; use [`FieldDef::with_length`] for those.
    #[must_use]
    pub fn with_operator(mut self, op: OperatorDef) -> Self {
        match &mut self.kind {
            FieldKind::Scalar { operator, .. } => *operator = Some(op),
            FieldKind::Decimal(ops) => *ops = DecimalOperators::Single(op),
            FieldKind::Sequence { .. } => {}
        }
        self
    }

    /// Sets separate exponent and mantissa operators on a decimal field.
    #[must_use]
    pub fn with_decimal_operators(
        mut self,
        exponent: Option<OperatorDef>,
        mantissa: Option<OperatorDef>,
    ) -> Self {
        if let FieldKind::Decimal(ops) = &mut self.kind {
            *ops = DecimalOperators::Split { exponent, mantissa };
        }
        self
    }

    /// Sets the length child of a sequence.
    #[must_use]
    pub fn with_length(mut self, def: LengthDef) -> Self {
        if let FieldKind::Sequence { length, .. } = &mut self.kind {
            *length = def;
        }
        self
    }

    /// Returns true if the field is mandatory.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.presence.is_required()
    }

    /// Returns the dictionary key of the field.
    #[must_use]
    pub fn key(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.id.to_string())
    }
}

/// A template: a numeric id and an ordered list of fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDef {
    /// Template id, matched against the id in the stream.
    pub id: u32,
    /// Template name.
    #[serde(default)]
    pub name: Option<String>,
    /// Fields in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl TemplateDef {
    /// Creates an empty template.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self {
            id,
            name: None,
            fields: Vec::new(),
        }
    }

    /// Sets the template name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }
}

/// The `templates` root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TemplateSet {
    /// Templates in declaration order.
    #[serde(default)]
    pub templates: Vec<TemplateDef>,
}

impl TemplateSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a template.
    #[must_use]
    pub fn template(mut self, template: TemplateDef) -> Self {
        self.templates.push(template);
        self
    }

    /// Gets a template definition by id.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&TemplateDef> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Returns an iterator over all template definitions.
    pub fn iter(&self) -> impl Iterator<Item = &TemplateDef> {
        self.templates.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_type_from_str() {
        assert_eq!("uInt32".parse::<ScalarType>().unwrap(), ScalarType::UInt32);
        assert_eq!(
            "byteVector".parse::<ScalarType>().unwrap(),
            ScalarType::ByteVector
        );
        assert_eq!("string".parse::<ScalarType>().unwrap(), ScalarType::AsciiString);
        assert!("decimal".parse::<ScalarType>().is_err());
    }

    #[test]
    fn test_operator_applicability() {
        assert!(OperatorKind::Increment.applies_to(ScalarType::Int64));
        assert!(!OperatorKind::Increment.applies_to(ScalarType::AsciiString));
        assert!(OperatorKind::Tail.applies_to(ScalarType::ByteVector));
        assert!(!OperatorKind::Tail.applies_to(ScalarType::UInt32));
        assert!(OperatorKind::Delta.applies_to(ScalarType::UnicodeString));
    }

    #[test]
    fn test_field_builders() {
        let field = FieldDef::uint32(34, "MsgSeqNum")
            .optional()
            .with_operator(OperatorDef::increment().with_value("1"));
        assert!(!field.is_required());
        assert_eq!(field.key(), "MsgSeqNum");
        match field.kind {
            FieldKind::Scalar { ty, operator } => {
                assert_eq!(ty, ScalarType::UInt32);
                assert_eq!(operator.unwrap().value.as_deref(), Some("1"));
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn test_field_key_defaults_to_id() {
        let mut field = FieldDef::uint32(52, "SendingTime");
        field.name = None;
        assert_eq!(field.key(), "52");
    }

    #[test]
    fn test_template_set_lookup() {
        let set = TemplateSet::new()
            .template(TemplateDef::new(144).with_name("Heartbeat"))
            .template(TemplateDef::new(145));
        assert_eq!(set.get(144).unwrap().name.as_deref(), Some("Heartbeat"));
        assert!(set.get(1).is_none());
        assert_eq!(set.iter().count(), 2);
    }
}
