/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Sequence fields: a `uInt32` length followed by repeated groups.

use crate::cursor::ByteCursor;
use crate::error::FastError;
use crate::field::ScalarField;
use crate::pmap::PresenceMap;
use crate::template::{DecodeContext, Field, decode_fields};
use fastfix_core::{FixMessage, FixValue, Payload};
use fastfix_template::{FieldDef, LengthDef, ScalarType, TemplateError};
use tracing::trace;

/// Upper bound on elements preallocated from an untrusted length.
const MAX_PREALLOCATED_ELEMENTS: usize = 64;

/// A sequence of repeated groups.
///
/// Each element carries its own presence map when any member consumes a
/// presence map bit.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceField {
    id: u32,
    name: String,
    required: bool,
    length: ScalarField,
    fields: Vec<Field>,
    element_pmap: bool,
}

impl SequenceField {
    /// Creates a sequence from its length field and members.
    #[must_use]
    pub fn new(
        id: u32,
        name: impl Into<String>,
        required: bool,
        length: ScalarField,
        fields: Vec<Field>,
    ) -> Self {
        let element_pmap = fields.iter().any(Field::requires_pmap);
        Self {
            id,
            name: name.into(),
            required,
            length,
            fields,
            element_pmap,
        }
    }

    /// Creates a sequence from its template node.
    ///
    /// The length field is named `<name>Length` and tagged with the sequence
    /// id unless the length node says otherwise.
    ///
    /// # Errors
    /// Returns loader errors of the length field or any member.
    pub fn from_def(
        id: u32,
        name: impl Into<String>,
        required: bool,
        length: &LengthDef,
        members: &[FieldDef],
    ) -> Result<Self, TemplateError> {
        let name = name.into();
        let length_field = ScalarField::from_def(
            length.id.unwrap_or(id),
            length
                .name
                .clone()
                .unwrap_or_else(|| format!("{name}Length")),
            ScalarType::UInt32,
            required,
            length.operator.as_ref(),
        )?;
        let fields = members
            .iter()
            .map(Field::from_def)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(id, name, required, length_field, fields))
    }

    /// Returns the FIX tag.
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Returns the sequence name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true for mandatory sequences.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the length field.
    #[must_use]
    pub const fn length(&self) -> &ScalarField {
        &self.length
    }

    /// Returns the member fields.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns true if the length field consumes a presence map bit.
    #[must_use]
    pub const fn requires_pmap(&self) -> bool {
        self.length.requires_pmap()
    }

    /// Decodes the length and every element.
    ///
    /// # Errors
    /// Returns length and member errors, wrapped with the sequence name, and
    /// `FastError::SequenceTooLong` when elements consume no input and the
    /// length exceeds the bytes left.
    pub fn decode(
        &self,
        cursor: &mut ByteCursor<'_>,
        pmap: &mut PresenceMap,
        ctx: &mut DecodeContext<'_>,
    ) -> Result<FixValue, FastError> {
        let offset = cursor.position();
        let length = self.length.decode(cursor, pmap, ctx.dictionary)?;
        let Some(count) = length.as_u32() else {
            return Ok(FixValue::Null);
        };
        trace!(sequence = %self.name, count, "decoding sequence");

        let wrap = |e: FastError| e.in_field(&self.name, self.length.operator().kind(), offset);
        let mut elements = Vec::with_capacity((count as usize).min(MAX_PREALLOCATED_ELEMENTS));
        for index in 0..count {
            let start = cursor.position();
            let element = self.decode_element(cursor, ctx).map_err(wrap)?;
            elements.push(element);

            // elements that read nothing cannot be bounded by the input
            let left = (count - index - 1) as usize;
            if cursor.position() == start && left > cursor.remaining() {
                return Err(wrap(FastError::SequenceTooLong {
                    length: count,
                    remaining: cursor.remaining(),
                }));
            }
        }
        Ok(FixValue::Present(Payload::Sequence(elements)))
    }

    fn decode_element(
        &self,
        cursor: &mut ByteCursor<'_>,
        ctx: &mut DecodeContext<'_>,
    ) -> Result<FixMessage, FastError> {
        let mut pmap = if self.element_pmap {
            PresenceMap::decode(cursor, ctx.max_pmap_bytes)?
        } else {
            PresenceMap::new()
        };
        decode_fields(&self.fields, cursor, &mut pmap, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Dictionary;
    use crate::pmap::DEFAULT_MAX_PMAP_BYTES;
    use fastfix_core::ErrorCode;
    use fastfix_template::OperatorDef;

    fn entries() -> SequenceField {
        let members = vec![
            FieldDef::uint32(279, "MDUpdateAction").with_operator(OperatorDef::copy()),
            FieldDef::decimal(270, "MDEntryPx"),
        ];
        SequenceField::from_def(268, "MDEntries", true, &LengthDef::default(), &members).unwrap()
    }

    #[test]
    fn test_length_field_defaults() {
        let seq = entries();
        assert_eq!(seq.length().name(), "MDEntriesLength");
        assert_eq!(seq.length().id(), 268);
        assert!(!seq.requires_pmap());
        assert_eq!(seq.fields().len(), 2);
    }

    #[test]
    fn test_decode_elements_with_pmaps() {
        let seq = entries();
        let data = [
            0x82, // length 2
            0xC0, 0x81, 0xFF, 0x8F, // pmap, action 1, px 15e-1
            0x80, 0xFF, 0x99, // pmap (copy), px 25e-1
        ];
        let mut cursor = ByteCursor::new(&data);
        let mut dict = Dictionary::new();
        let mut ctx = DecodeContext {
            dictionary: &mut dict,
            max_pmap_bytes: DEFAULT_MAX_PMAP_BYTES,
        };
        let value = seq.decode(&mut cursor, &mut PresenceMap::new(), &mut ctx).unwrap();
        let items = value.as_sequence().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].to_string(), "279=1|270=1.5|");
        assert_eq!(items[1].to_string(), "279=1|270=2.5|");
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_optional_null_length() {
        let seq = SequenceField::from_def(
            268,
            "MDEntries",
            false,
            &LengthDef::default(),
            &[FieldDef::uint32(279, "MDUpdateAction")],
        )
        .unwrap();
        let mut dict = Dictionary::new();
        let mut ctx = DecodeContext {
            dictionary: &mut dict,
            max_pmap_bytes: DEFAULT_MAX_PMAP_BYTES,
        };
        let value = seq
            .decode(&mut ByteCursor::new(&[0x80]), &mut PresenceMap::new(), &mut ctx)
            .unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn test_element_error_names_sequence() {
        let seq = entries();
        let data = [0x81, 0x80];
        let mut dict = Dictionary::new();
        let mut ctx = DecodeContext {
            dictionary: &mut dict,
            max_pmap_bytes: DEFAULT_MAX_PMAP_BYTES,
        };
        let err = seq
            .decode(&mut ByteCursor::new(&data), &mut PresenceMap::new(), &mut ctx)
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::D5));
        assert!(err.to_string().starts_with("field 'MDEntries'"));
    }

    #[test]
    fn test_elements_reading_nothing_are_bounded_by_input() {
        let seq = SequenceField::from_def(
            268,
            "MDEntries",
            true,
            &LengthDef::default(),
            &[FieldDef::string(269, "MDEntryType").with_operator(OperatorDef::constant("0"))],
        )
        .unwrap();
        let mut dict = Dictionary::new();
        let mut ctx = DecodeContext {
            dictionary: &mut dict,
            max_pmap_bytes: DEFAULT_MAX_PMAP_BYTES,
        };

        let mut encoder = crate::encoder::FastEncoder::new();
        encoder.encode_uint(3_000_000);
        let data = encoder.finish();
        let err = seq
            .decode(&mut ByteCursor::new(&data), &mut PresenceMap::new(), &mut ctx)
            .unwrap_err();
        assert_eq!(
            err.root_cause(),
            &FastError::SequenceTooLong {
                length: 3_000_000,
                remaining: 0
            }
        );
        assert!(err.to_string().starts_with("field 'MDEntries'"));

        // short sequences still decode when trailing input could cover them
        let data = [0x83, 0x80, 0x80, 0x80];
        let mut cursor = ByteCursor::new(&data);
        let value = seq.decode(&mut cursor, &mut PresenceMap::new(), &mut ctx).unwrap();
        assert_eq!(value.as_sequence().map(<[_]>::len), Some(3));
        assert_eq!(cursor.remaining(), 3);
    }
}
