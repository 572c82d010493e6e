/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Template model and interpreter.
//!
//! A [`Template`] is an ordered list of field decoders built from a
//! [`TemplateDef`]; a [`TemplateStore`] maps template ids to templates and
//! can be shared between decoders.

use crate::cursor::ByteCursor;
use crate::decimal::DecimalField;
use crate::dictionary::Dictionary;
use crate::error::FastError;
use crate::field::ScalarField;
use crate::pmap::PresenceMap;
use crate::sequence::SequenceField;
use fastfix_core::{FixMessage, FixValue};
use fastfix_template::{FieldDef, FieldKind, TemplateDef, TemplateError, TemplateSet};
use std::collections::HashMap;

/// Mutable state threaded through field decoders.
#[derive(Debug)]
pub struct DecodeContext<'a> {
    /// Operator state.
    pub dictionary: &'a mut Dictionary,
    /// Longest accepted presence map, in bytes.
    pub max_pmap_bytes: usize,
}

/// A field decoder of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// Scalar field.
    Scalar(ScalarField),
    /// Decimal field.
    Decimal(DecimalField),
    /// Sequence field.
    Sequence(SequenceField),
}

impl Field {
    /// Builds a field decoder from its template node.
    ///
    /// # Errors
    /// Returns S2..S5, R1, and R4 loader errors.
    pub fn from_def(def: &FieldDef) -> Result<Self, TemplateError> {
        let name = def.key();
        let required = def.is_required();
        Ok(match &def.kind {
            FieldKind::Scalar { ty, operator } => Self::Scalar(ScalarField::from_def(
                def.id,
                name,
                *ty,
                required,
                operator.as_ref(),
            )?),
            FieldKind::Decimal(operators) => {
                Self::Decimal(DecimalField::from_def(def.id, name, required, operators)?)
            }
            FieldKind::Sequence { length, fields } => Self::Sequence(SequenceField::from_def(
                def.id, name, required, length, fields,
            )?),
        })
    }

    /// Returns the FIX tag.
    #[must_use]
    pub const fn id(&self) -> u32 {
        match self {
            Self::Scalar(f) => f.id(),
            Self::Decimal(f) => f.id(),
            Self::Sequence(f) => f.id(),
        }
    }

    /// Returns the dictionary name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar(f) => f.name(),
            Self::Decimal(f) => f.name(),
            Self::Sequence(f) => f.name(),
        }
    }

    /// Returns true for mandatory fields.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        match self {
            Self::Scalar(f) => f.is_required(),
            Self::Decimal(f) => f.is_required(),
            Self::Sequence(f) => f.is_required(),
        }
    }

    /// Returns true if the field consumes a bit of the enclosing presence map.
    #[must_use]
    pub const fn requires_pmap(&self) -> bool {
        match self {
            Self::Scalar(f) => f.requires_pmap(),
            Self::Decimal(f) => f.requires_pmap(),
            Self::Sequence(f) => f.requires_pmap(),
        }
    }

    /// Decodes the field.
    ///
    /// # Errors
    /// Returns the errors of the field decoder.
    pub fn decode(
        &self,
        cursor: &mut ByteCursor<'_>,
        pmap: &mut PresenceMap,
        ctx: &mut DecodeContext<'_>,
    ) -> Result<FixValue, FastError> {
        match self {
            Self::Scalar(f) => f.decode(cursor, pmap, ctx.dictionary),
            Self::Decimal(f) => f.decode(cursor, pmap, ctx.dictionary),
            Self::Sequence(f) => f.decode(cursor, pmap, ctx),
        }
    }
}

/// Decodes `fields` in order into a message keyed by field id.
pub(crate) fn decode_fields(
    fields: &[Field],
    cursor: &mut ByteCursor<'_>,
    pmap: &mut PresenceMap,
    ctx: &mut DecodeContext<'_>,
) -> Result<FixMessage, FastError> {
    let mut message = FixMessage::with_capacity(fields.len());
    for field in fields {
        let value = field.decode(cursor, pmap, ctx)?;
        message.insert(u64::from(field.id()), value);
    }
    Ok(message)
}

/// A decoding template.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    id: u32,
    name: Option<String>,
    fields: Vec<Field>,
}

impl Template {
    /// Creates a template from field decoders.
    #[must_use]
    pub const fn new(id: u32, fields: Vec<Field>) -> Self {
        Self {
            id,
            name: None,
            fields,
        }
    }

    /// Builds a template from its definition.
    ///
    /// # Errors
    /// Returns the first loader error among its fields.
    pub fn from_def(def: &TemplateDef) -> Result<Self, TemplateError> {
        let fields = def
            .fields
            .iter()
            .map(Field::from_def)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            id: def.id,
            name: def.name.clone(),
            fields,
        })
    }

    /// Returns the template id.
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Returns the template name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the field decoders in order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns how many message presence map bits the template's fields use.
    #[must_use]
    pub fn pmap_bits(&self) -> usize {
        self.fields.iter().filter(|f| f.requires_pmap()).count()
    }

    /// Decodes every field into a message.
    ///
    /// # Errors
    /// Returns the first field error.
    pub fn decode(
        &self,
        cursor: &mut ByteCursor<'_>,
        pmap: &mut PresenceMap,
        ctx: &mut DecodeContext<'_>,
    ) -> Result<FixMessage, FastError> {
        decode_fields(&self.fields, cursor, pmap, ctx)
    }
}

/// Templates keyed by id.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    templates: HashMap<u32, Template>,
}

impl TemplateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds every template of a set.
    ///
    /// # Errors
    /// Returns loader errors and `TemplateError::DuplicateTemplate` if two
    /// templates share an id.
    pub fn from_set(set: &TemplateSet) -> Result<Self, TemplateError> {
        let mut store = Self::new();
        for def in set.iter() {
            store.insert(Template::from_def(def)?)?;
        }
        Ok(store)
    }

    /// Adds a template.
    ///
    /// # Errors
    /// Returns `TemplateError::DuplicateTemplate` if the id is taken.
    pub fn insert(&mut self, template: Template) -> Result<(), TemplateError> {
        if self.templates.contains_key(&template.id) {
            return Err(TemplateError::DuplicateTemplate(template.id));
        }
        self.templates.insert(template.id, template);
        Ok(())
    }

    /// Gets a template by id.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&Template> {
        self.templates.get(&id)
    }

    /// Returns the number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if the store holds no templates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Returns the template ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.templates.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastfix_core::ErrorCode;
    use fastfix_template::OperatorDef;

    fn heartbeat() -> TemplateDef {
        TemplateDef::new(144)
            .with_name("Heartbeat")
            .field(FieldDef::uint32(1128, "ApplVerID").with_operator(OperatorDef::constant("9")))
            .field(FieldDef::string(35, "MsgType").with_operator(OperatorDef::constant("0")))
            .field(FieldDef::uint32(34, "MsgSeqNum"))
            .field(FieldDef::uint32(52, "SendingTime"))
    }

    #[test]
    fn test_template_from_def() {
        let template = Template::from_def(&heartbeat()).unwrap();
        assert_eq!(template.id(), 144);
        assert_eq!(template.name(), Some("Heartbeat"));
        assert_eq!(template.fields().len(), 4);
        assert_eq!(template.pmap_bits(), 0);
        assert_eq!(template.fields()[2].name(), "MsgSeqNum");
        assert!(template.fields()[0].is_required());
    }

    #[test]
    fn test_template_decode_in_order() {
        let template = Template::from_def(&heartbeat()).unwrap();
        let data = [0x8A, 0x8B];
        let mut dict = Dictionary::new();
        let mut ctx = DecodeContext {
            dictionary: &mut dict,
            max_pmap_bytes: 8,
        };
        let message = template
            .decode(&mut ByteCursor::new(&data), &mut PresenceMap::new(), &mut ctx)
            .unwrap();
        assert_eq!(message.to_string(), "1128=9|35=0|34=10|52=11|");
    }

    #[test]
    fn test_store_rejects_duplicate_ids() {
        let set = TemplateSet::new()
            .template(heartbeat())
            .template(TemplateDef::new(144));
        assert_eq!(
            TemplateStore::from_set(&set).unwrap_err(),
            TemplateError::DuplicateTemplate(144)
        );
    }

    #[test]
    fn test_store_surfaces_loader_errors() {
        let set = TemplateSet::new().template(
            TemplateDef::new(1)
                .field(FieldDef::string(55, "Symbol").with_operator(OperatorDef::increment())),
        );
        assert_eq!(
            TemplateStore::from_set(&set).unwrap_err().code(),
            Some(ErrorCode::S2)
        );
    }

    #[test]
    fn test_store_lookup() {
        let set = TemplateSet::new()
            .template(heartbeat())
            .template(TemplateDef::new(2));
        let store = TemplateStore::from_set(&set).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.ids(), vec![2, 144]);
        assert!(store.get(144).is_some());
        assert!(store.get(3).is_none());
    }
}
