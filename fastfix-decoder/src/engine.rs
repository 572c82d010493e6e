/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Message-level decoding entry point.
//!
//! Each message is a presence map, a template id (a mandatory `uInt32` copy
//! field named `TemplateId`), and the fields of that template.

use crate::cursor::ByteCursor;
use crate::dictionary::Dictionary;
use crate::error::FastError;
use crate::field::ScalarField;
use crate::operators::Operator;
use crate::pmap::{DEFAULT_MAX_PMAP_BYTES, PresenceMap};
use crate::template::{DecodeContext, TemplateStore};
use fastfix_core::FixMessage;
use fastfix_template::ScalarType;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, trace};

/// Dictionary name of the template id field.
pub const TEMPLATE_ID_FIELD: &str = "TemplateId";

/// When the dictionary returns to the undefined state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ResetPolicy {
    /// Before every message.
    #[default]
    PerMessage,
    /// Only on [`Engine::reset`].
    Manual,
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Longest accepted presence map, in bytes.
    pub max_pmap_bytes: usize,
    /// Dictionary reset policy.
    pub reset_policy: ResetPolicy,
}

impl EngineConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_pmap_bytes: DEFAULT_MAX_PMAP_BYTES,
            reset_policy: ResetPolicy::PerMessage,
        }
    }

    /// Sets the presence map length cap.
    #[must_use]
    pub const fn with_max_pmap_bytes(mut self, max_pmap_bytes: usize) -> Self {
        self.max_pmap_bytes = max_pmap_bytes;
        self
    }

    /// Sets the dictionary reset policy.
    #[must_use]
    pub const fn with_reset_policy(mut self, reset_policy: ResetPolicy) -> Self {
        self.reset_policy = reset_policy;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// FAST message decoder over a shared template store.
///
/// The engine owns one dictionary; decoding is single-threaded per stream.
/// Independent streams each use their own engine over the same store.
#[derive(Debug)]
pub struct Engine {
    templates: Arc<TemplateStore>,
    dictionary: Dictionary,
    config: EngineConfig,
    template_id: ScalarField,
    last_template_id: Option<u32>,
}

impl Engine {
    /// Creates an engine with the default configuration.
    #[must_use]
    pub fn new(templates: impl Into<Arc<TemplateStore>>) -> Self {
        Self::with_config(templates, EngineConfig::default())
    }

    /// Creates an engine with the given configuration.
    #[must_use]
    pub fn with_config(templates: impl Into<Arc<TemplateStore>>, config: EngineConfig) -> Self {
        Self {
            templates: templates.into(),
            dictionary: Dictionary::new(),
            config,
            template_id: ScalarField::new(
                0,
                TEMPLATE_ID_FIELD,
                ScalarType::UInt32,
                true,
                Operator::Copy(None),
            ),
            last_template_id: None,
        }
    }

    /// Decodes one message starting at the cursor.
    ///
    /// # Errors
    /// Returns D9 for an unknown template id, R6 for an oversized presence
    /// map, and any field error.
    pub fn decode(&mut self, cursor: &mut ByteCursor<'_>) -> Result<FixMessage, FastError> {
        let start = cursor.position();
        if self.config.reset_policy == ResetPolicy::PerMessage {
            self.dictionary.reset();
        }

        let result = self.decode_message(cursor);
        match &result {
            Ok(message) => debug!(
                template_id = ?self.last_template_id,
                fields = message.len(),
                bytes = cursor.position() - start,
                "decoded FAST message"
            ),
            Err(e) => debug!(offset = start, error = %e, "failed to decode FAST message"),
        }
        result
    }

    fn decode_message(&mut self, cursor: &mut ByteCursor<'_>) -> Result<FixMessage, FastError> {
        let mut pmap = PresenceMap::decode(cursor, self.config.max_pmap_bytes)?;
        trace!(bits = pmap.len(), "read presence map");

        let id = self
            .template_id
            .decode(cursor, &mut pmap, &mut self.dictionary)?
            .as_u32()
            .ok_or(FastError::MissingMandatoryValue)?;
        self.last_template_id = Some(id);

        let template = self
            .templates
            .get(id)
            .ok_or(FastError::UnknownTemplate(id))?;
        trace!(template_id = id, name = ?template.name(), "resolved template");

        let mut ctx = DecodeContext {
            dictionary: &mut self.dictionary,
            max_pmap_bytes: self.config.max_pmap_bytes,
        };
        template.decode(cursor, &mut pmap, &mut ctx)
    }

    /// Decodes one message from the start of `data`.
    ///
    /// # Errors
    /// Returns the errors of [`Engine::decode`].
    pub fn decode_bytes(&mut self, data: &[u8]) -> Result<FixMessage, FastError> {
        self.decode(&mut ByteCursor::new(data))
    }

    /// Decodes back-to-back messages until `data` is exhausted.
    ///
    /// # Errors
    /// Returns the first message error.
    pub fn decode_all(&mut self, data: &[u8]) -> Result<Vec<FixMessage>, FastError> {
        let mut cursor = ByteCursor::new(data);
        let mut messages = Vec::new();
        while !cursor.is_empty() {
            messages.push(self.decode(&mut cursor)?);
        }
        Ok(messages)
    }

    /// Returns the dictionary to the undefined state.
    pub fn reset(&mut self) {
        self.dictionary.reset();
        self.last_template_id = None;
    }

    /// Returns the operator state.
    #[must_use]
    pub const fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Returns the template store.
    #[must_use]
    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the id of the last template resolved.
    #[must_use]
    pub const fn last_template_id(&self) -> Option<u32> {
        self.last_template_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastfix_core::ErrorCode;
    use fastfix_template::{FieldDef, OperatorDef, TemplateDef, TemplateSet};

    fn store() -> TemplateStore {
        let set = TemplateSet::new().template(
            TemplateDef::new(1)
                .field(FieldDef::uint32(34, "MsgSeqNum").with_operator(OperatorDef::increment())),
        );
        TemplateStore::from_set(&set).unwrap()
    }

    #[test]
    fn test_config_builders() {
        let config = EngineConfig::new()
            .with_max_pmap_bytes(2)
            .with_reset_policy(ResetPolicy::Manual);
        assert_eq!(config.max_pmap_bytes, 2);
        assert_eq!(config.reset_policy, ResetPolicy::Manual);
        assert_eq!(EngineConfig::default().max_pmap_bytes, 8);
    }

    #[test]
    fn test_per_message_reset() {
        let mut engine = Engine::new(store());
        // pmap: template id, seq num
        let first = engine.decode_bytes(&[0xE0, 0x81, 0x85]).unwrap();
        assert_eq!(first.get_u32(34).unwrap(), Some(5));
        assert_eq!(engine.last_template_id(), Some(1));

        // template id copy has no previous value after the reset
        let err = engine.decode_bytes(&[0x80]).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::D5));
    }

    #[test]
    fn test_manual_reset_keeps_state() {
        let config = EngineConfig::new().with_reset_policy(ResetPolicy::Manual);
        let mut engine = Engine::with_config(store(), config);
        let messages = engine.decode_all(&[0xE0, 0x81, 0x85, 0x80, 0x80]).unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].get_u32(34).unwrap(), Some(6));
        assert_eq!(messages[2].get_u32(34).unwrap(), Some(7));

        engine.reset();
        assert!(engine.dictionary().is_empty());
        assert_eq!(engine.last_template_id(), None);
    }

    #[test]
    fn test_oversized_pmap_is_r6() {
        let config = EngineConfig::new().with_max_pmap_bytes(1);
        let mut engine = Engine::with_config(store(), config);
        let err = engine.decode_bytes(&[0x40, 0x80, 0x81]).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::R6));
    }

    #[test]
    fn test_unknown_template_is_d9() {
        let mut engine = Engine::new(store());
        let err = engine.decode_bytes(&[0xC0, 0x87]).unwrap_err();
        assert_eq!(err, FastError::UnknownTemplate(7));
        assert_eq!(engine.last_template_id(), Some(7));
    }

    #[test]
    fn test_shared_store() {
        let shared = Arc::new(store());
        let a = Engine::new(Arc::clone(&shared));
        let b = Engine::new(shared);
        assert_eq!(a.templates().len(), b.templates().len());
    }
}
