/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Scalar field decoders.

use crate::cursor::ByteCursor;
use crate::decoder::PrimitiveReader;
use crate::dictionary::Dictionary;
use crate::error::FastError;
use crate::operators::Operator;
use crate::pmap::PresenceMap;
use fastfix_core::FixValue;
use fastfix_template::{OperatorDef, ScalarType, TemplateError};

/// A scalar field: type, operator, and the reader chosen for them.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    id: u32,
    name: String,
    ty: ScalarType,
    required: bool,
    operator: Operator,
    reader: PrimitiveReader,
}

impl ScalarField {
    /// Creates a scalar field.
    #[must_use]
    pub fn new(
        id: u32,
        name: impl Into<String>,
        ty: ScalarType,
        required: bool,
        operator: Operator,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            ty,
            required,
            reader: PrimitiveReader::for_field(ty, operator.kind()),
            operator,
        }
    }

    /// Creates a scalar field from its operator node.
    ///
    /// # Errors
    /// Returns the loader errors of [`Operator::from_def`].
    pub fn from_def(
        id: u32,
        name: impl Into<String>,
        ty: ScalarType,
        required: bool,
        operator: Option<&OperatorDef>,
    ) -> Result<Self, TemplateError> {
        let name = name.into();
        let operator = Operator::from_def(&name, ty, required, operator)?;
        Ok(Self::new(id, name, ty, required, operator))
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

    /// Returns the scalar type.
    #[must_use]
    pub const fn ty(&self) -> ScalarType {
        self.ty
    }

    /// Returns true for mandatory fields.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the operator.
    #[must_use]
    pub const fn operator(&self) -> &Operator {
        &self.operator
    }

    /// Returns true if the field consumes a presence map bit.
    #[must_use]
    pub const fn requires_pmap(&self) -> bool {
        self.operator.requires_pmap(self.required)
    }

    /// Decodes the field and records its value in the dictionary.
    ///
    /// # Errors
    /// Returns reader and operator errors wrapped with the field's name,
    /// operator, and starting offset.
    pub fn decode(
        &self,
        cursor: &mut ByteCursor<'_>,
        pmap: &mut PresenceMap,
        dictionary: &mut Dictionary,
    ) -> Result<FixValue, FastError> {
        let offset = cursor.position();
        let value = {
            let previous = dictionary.get(&self.name);
            if self.operator.should_read_value(pmap) {
                let read = self.reader.read(cursor, self.required);
                read.and_then(|read| self.operator.apply(read, previous, self.ty))
            } else {
                self.operator
                    .not_encoded_value(pmap, self.required, previous, self.ty)
            }
        }
        .map_err(|e| e.in_field(&self.name, self.operator.kind(), offset))?;

        dictionary.set(&self.name, &value);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastfix_core::{ErrorCode, Payload};
    use fastfix_template::OperatorKind;

    #[test]
    fn test_copy_field_sequence_of_messages() {
        let field = ScalarField::from_def(
            34,
            "MsgSeqNum",
            ScalarType::UInt32,
            true,
            Some(&OperatorDef::copy()),
        )
        .unwrap();
        let mut dict = Dictionary::new();

        let data = [0x8A];
        let mut cursor = ByteCursor::new(&data);
        let mut pmap = PresenceMap::from_bits(&[true]);
        let value = field.decode(&mut cursor, &mut pmap, &mut dict).unwrap();
        assert_eq!(value, FixValue::Present(Payload::U32(10)));

        let mut cursor = ByteCursor::new(&[]);
        let mut pmap = PresenceMap::from_bits(&[false]);
        let value = field.decode(&mut cursor, &mut pmap, &mut dict).unwrap();
        assert_eq!(value, FixValue::Present(Payload::U32(10)));
    }

    #[test]
    fn test_optional_null_marks_entry_empty() {
        let field = ScalarField::new(58, "Text", ScalarType::AsciiString, false, Operator::None);
        let mut dict = Dictionary::new();
        let data = [0x80];
        let mut cursor = ByteCursor::new(&data);
        let value = field.decode(&mut cursor, &mut PresenceMap::new(), &mut dict).unwrap();
        assert!(value.is_null());
        assert!(dict.get("Text").is_empty());
    }

    #[test]
    fn test_errors_carry_field_context() {
        let field = ScalarField::new(
            34,
            "MsgSeqNum",
            ScalarType::UInt32,
            true,
            Operator::Copy(None),
        );
        let mut cursor = ByteCursor::new(&[0x81, 0x82]);
        cursor.read_byte().unwrap();
        let err = field
            .decode(&mut cursor, &mut PresenceMap::new(), &mut Dictionary::new())
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::D5));
        match err {
            FastError::Field {
                name,
                operator,
                offset,
                ..
            } => {
                assert_eq!(name, "MsgSeqNum");
                assert_eq!(operator, OperatorKind::Copy);
                assert_eq!(offset, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_delta_reader_selected() {
        let field = ScalarField::new(
            270,
            "MDEntryPx",
            ScalarType::Int32,
            true,
            Operator::Delta(None),
        );
        assert!(!field.requires_pmap());
        let mut dict = Dictionary::new();
        dict.set("MDEntryPx", &FixValue::Present(Payload::I32(i32::MAX)));
        let err = field
            .decode(
                &mut ByteCursor::new(&[0x81]),
                &mut PresenceMap::new(),
                &mut dict,
            )
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::R4));
    }
}
