/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Operator state shared by all fields of a decoder.

use fastfix_core::{FixValue, Payload};
use std::collections::HashMap;

/// State of a dictionary entry as seen by an operator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Entry<'a> {
    /// No value has been set since the last reset.
    #[default]
    Undefined,
    /// The last value was absent.
    Empty,
    /// The last value.
    Assigned(&'a Payload),
}

impl Entry<'_> {
    /// Returns true if the entry is undefined.
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Returns true if the entry is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Previous values keyed by field name.
///
/// A single flat namespace: two fields with the same name share an entry.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: HashMap<String, Option<Payload>>,
}

impl Dictionary {
    /// Creates an empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the state of the entry under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Entry<'_> {
        match self.entries.get(name) {
            None => Entry::Undefined,
            Some(None) => Entry::Empty,
            Some(Some(payload)) => Entry::Assigned(payload),
        }
    }

    /// Stores a field's value; `Null` marks the entry empty.
    pub fn set(&mut self, name: &str, value: &FixValue) {
        let slot = value.payload().cloned();
        match self.entries.get_mut(name) {
            Some(existing) => *existing = slot,
            None => {
                self.entries.insert(name.to_string(), slot);
            }
        }
    }

    /// Returns every entry to the undefined state.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Returns the number of defined entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no entry is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_transitions() {
        let mut dict = Dictionary::new();
        assert!(dict.get("MsgSeqNum").is_undefined());

        dict.set("MsgSeqNum", &FixValue::Present(Payload::U32(10)));
        assert_eq!(dict.get("MsgSeqNum"), Entry::Assigned(&Payload::U32(10)));

        dict.set("MsgSeqNum", &FixValue::Null);
        assert!(dict.get("MsgSeqNum").is_empty());

        dict.set("MsgSeqNum", &FixValue::Present(Payload::U32(11)));
        assert_eq!(dict.get("MsgSeqNum"), Entry::Assigned(&Payload::U32(11)));
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn test_reset_undefines_all() {
        let mut dict = Dictionary::new();
        dict.set("a", &FixValue::Null);
        dict.set("b", &FixValue::Present(Payload::I64(1)));
        dict.reset();
        assert!(dict.is_empty());
        assert!(dict.get("a").is_undefined());
        assert!(dict.get("b").is_undefined());
    }
}
