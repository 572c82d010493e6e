/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Decoded FIX message.
//!
//! [`FixMessage`] is an insertion-ordered `tag -> value` map. Rendering
//! follows encounter order, so the field list is the source of truth for
//! both lookup and output.

use crate::error::MessageError;
use crate::field::{FixValue, Payload, ScaledDecimal};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Insertion-ordered FIX message produced by the decoder.
///
/// Rendering (`Display`) emits `<tag>=<value>|` for every field in
/// insertion order. `Null` renders as `nil`; a sequence renders its length
/// followed by each sub-message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixMessage {
    fields: SmallVec<[(u64, FixValue); 16]>,
}

impl FixMessage {
    /// Creates an empty message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty message with room for `capacity` fields.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: SmallVec::with_capacity(capacity),
        }
    }

    /// Sets the value for `tag`.
    ///
    /// A new tag is appended; an existing tag keeps its position and has its
    /// value replaced.
    pub fn insert(&mut self, tag: u64, value: FixValue) {
        match self.fields.iter_mut().find(|(t, _)| *t == tag) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((tag, value)),
        }
    }

    /// Returns the value stored under `tag`.
    ///
    /// # Errors
    /// Returns `MessageError::MissingTag` if the tag is not present.
    pub fn get(&self, tag: u64) -> Result<&FixValue, MessageError> {
        self.fields
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, v)| v)
            .ok_or(MessageError::MissingTag(tag))
    }

    /// Returns true if the message has a field with `tag`.
    #[must_use]
    pub fn contains(&self, tag: u64) -> bool {
        self.fields.iter().any(|(t, _)| *t == tag)
    }

    /// Returns an iterator over `(tag, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &FixValue)> {
        self.fields.iter().map(|(t, v)| (*t, v))
    }

    /// Returns the tags in insertion order.
    pub fn tags(&self) -> impl Iterator<Item = u64> + '_ {
        self.fields.iter().map(|(t, _)| *t)
    }

    /// Returns the number of fields.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the message has no fields.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the u32 stored under `tag`, `None` if it is `Null`.
    ///
    /// # Errors
    /// Returns `MessageError` if the tag is missing or holds another type.
    pub fn get_u32(&self, tag: u64) -> Result<Option<u32>, MessageError> {
        self.typed(tag, "u32", |p| match p {
            Payload::U32(v) => Some(*v),
            _ => None,
        })
    }

    /// Returns the i32 stored under `tag`, `None` if it is `Null`.
    ///
    /// # Errors
    /// Returns `MessageError` if the tag is missing or holds another type.
    pub fn get_i32(&self, tag: u64) -> Result<Option<i32>, MessageError> {
        self.typed(tag, "i32", |p| match p {
            Payload::I32(v) => Some(*v),
            _ => None,
        })
    }

    /// Returns the u64 stored under `tag`, `None` if it is `Null`.
    ///
    /// # Errors
    /// Returns `MessageError` if the tag is missing or holds another type.
    pub fn get_u64(&self, tag: u64) -> Result<Option<u64>, MessageError> {
        self.typed(tag, "u64", |p| match p {
            Payload::U64(v) => Some(*v),
            _ => None,
        })
    }

    /// Returns the i64 stored under `tag`, `None` if it is `Null`.
    ///
    /// # Errors
    /// Returns `MessageError` if the tag is missing or holds another type.
    pub fn get_i64(&self, tag: u64) -> Result<Option<i64>, MessageError> {
        self.typed(tag, "i64", |p| match p {
            Payload::I64(v) => Some(*v),
            _ => None,
        })
    }

    /// Returns the decimal stored under `tag`, `None` if it is `Null`.
    ///
    /// # Errors
    /// Returns `MessageError` if the tag is missing or holds another type.
    pub fn get_decimal(&self, tag: u64) -> Result<Option<ScaledDecimal>, MessageError> {
        self.typed(tag, "decimal", |p| match p {
            Payload::Decimal(d) => Some(*d),
            _ => None,
        })
    }

    /// Returns the string stored under `tag`, `None` if it is `Null`.
    ///
    /// # Errors
    /// Returns `MessageError` if the tag is missing or holds another type.
    pub fn get_str(&self, tag: u64) -> Result<Option<&str>, MessageError> {
        self.typed(tag, "string", |p| match p {
            Payload::String(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Returns the byte vector stored under `tag`, `None` if it is `Null`.
    ///
    /// # Errors
    /// Returns `MessageError` if the tag is missing or holds another type.
    pub fn get_bytes(&self, tag: u64) -> Result<Option<&Bytes>, MessageError> {
        self.typed(tag, "bytes", |p| match p {
            Payload::Bytes(b) => Some(b),
            _ => None,
        })
    }

    /// Returns the sub-messages stored under `tag`, `None` if it is `Null`.
    ///
    /// # Errors
    /// Returns `MessageError` if the tag is missing or holds another type.
    pub fn get_sequence(&self, tag: u64) -> Result<Option<&[FixMessage]>, MessageError> {
        self.typed(tag, "sequence", |p| match p {
            Payload::Sequence(items) => Some(items.as_slice()),
            _ => None,
        })
    }

    fn typed<'a, T>(
        &'a self,
        tag: u64,
        expected: &'static str,
        extract: impl FnOnce(&'a Payload) -> Option<T>,
    ) -> Result<Option<T>, MessageError> {
        match self.get(tag)? {
            FixValue::Null => Ok(None),
            FixValue::Present(payload) => {
                extract(payload)
                    .map(Some)
                    .ok_or(MessageError::TypeMismatch {
                        tag,
                        expected,
                        actual: payload.type_name(),
                    })
            }
        }
    }
}

impl fmt::Display for FixMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = itoa::Buffer::new();
        for (tag, value) in &self.fields {
            f.write_str(buf.format(*tag))?;
            f.write_str("=")?;
            match value {
                FixValue::Present(Payload::Sequence(items)) => {
                    write!(f, "{}|", items.len())?;
                    for item in items {
                        write!(f, "{item}")?;
                    }
                }
                other => write!(f, "{other}|")?,
            }
        }
        Ok(())
    }
}

impl FromIterator<(u64, FixValue)> for FixMessage {
    fn from_iter<I: IntoIterator<Item = (u64, FixValue)>>(iter: I) -> Self {
        let mut msg = Self::new();
        for (tag, value) in iter {
            msg.insert(tag, value);
        }
        msg
    }
}
