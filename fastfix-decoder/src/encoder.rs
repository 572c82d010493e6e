/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Canonical FAST primitive encoder.
//!
//! Writes the shortest stop-bit encoding of each primitive. Used to build
//! test streams and fixtures for the decoder; it applies no operators.

use crate::decoder::STOP_BIT;
use crate::pmap::PresenceMap;
use smallvec::SmallVec;

/// FAST primitive encoder.
#[derive(Debug, Default)]
pub struct FastEncoder {
    /// Output buffer.
    buffer: Vec<u8>,
}

impl FastEncoder {
    /// Creates a new FAST encoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new encoder with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    fn push_groups(&mut self, mut groups: SmallVec<[u8; 12]>) {
        groups.reverse();
        if let Some(last) = groups.last_mut() {
            *last |= STOP_BIT;
        }
        self.buffer.extend_from_slice(&groups);
    }

    fn encode_unsigned(&mut self, value: u128) {
        let mut groups: SmallVec<[u8; 12]> = SmallVec::new();
        let mut v = value;
        loop {
            groups.push((v & 0x7F) as u8);
            v >>= 7;
            if v == 0 {
                break;
            }
        }
        self.push_groups(groups);
    }

    fn encode_signed(&mut self, value: i128) {
        let mut groups: SmallVec<[u8; 12]> = SmallVec::new();
        let mut v = value;
        loop {
            let group = (v & 0x7F) as u8;
            groups.push(group);
            v >>= 7;
            let sign_clear = group & 0x40 == 0;
            if (v == 0 && sign_clear) || (v == -1 && !sign_clear) {
                break;
            }
        }
        self.push_groups(groups);
    }

    /// Encodes an unsigned integer using stop-bit encoding.
    pub fn encode_uint(&mut self, value: u64) {
        self.encode_unsigned(u128::from(value));
    }

    /// Encodes a signed integer using stop-bit encoding.
    pub fn encode_int(&mut self, value: i64) {
        self.encode_signed(i128::from(value));
    }

    /// Encodes a wide signed integer, as carried by integer delta.
    pub fn encode_big_int(&mut self, value: i128) {
        self.encode_signed(value);
    }

    /// Encodes a nullable unsigned integer. `None` is `0x80`.
    pub fn encode_nullable_uint(&mut self, value: Option<u64>) {
        match value {
            Some(v) => self.encode_unsigned(u128::from(v) + 1),
            None => self.buffer.push(STOP_BIT),
        }
    }

    /// Encodes a nullable signed integer. Non-negative values are biased by
    /// one; negative values are written as is.
    pub fn encode_nullable_int(&mut self, value: Option<i64>) {
        match value {
            Some(v) if v >= 0 => self.encode_signed(i128::from(v) + 1),
            Some(v) => self.encode_signed(i128::from(v)),
            None => self.buffer.push(STOP_BIT),
        }
    }

    /// Encodes an ASCII string. The empty string is `0x80`.
    pub fn encode_ascii(&mut self, value: &str) {
        let bytes = value.as_bytes();
        match bytes.split_last() {
            None => self.buffer.push(STOP_BIT),
            Some((last, head)) => {
                self.buffer.extend(head.iter().map(|b| b & 0x7F));
                self.buffer.push(last | STOP_BIT);
            }
        }
    }

    /// Encodes a nullable ASCII string. `None` is `0x80`, the empty string
    /// `0x00 0x80`.
    pub fn encode_nullable_ascii(&mut self, value: Option<&str>) {
        match value {
            None => self.buffer.push(STOP_BIT),
            Some("") => self.buffer.extend_from_slice(&[0x00, STOP_BIT]),
            Some(text) => self.encode_ascii(text),
        }
    }

    /// Encodes a byte vector with length prefix.
    pub fn encode_bytes(&mut self, value: &[u8]) {
        self.encode_uint(value.len() as u64);
        self.buffer.extend_from_slice(value);
    }

    /// Encodes a nullable byte vector with a nullable length prefix.
    pub fn encode_nullable_bytes(&mut self, value: Option<&[u8]>) {
        self.encode_nullable_uint(value.map(|v| v.len() as u64));
        if let Some(bytes) = value {
            self.buffer.extend_from_slice(bytes);
        }
    }

    /// Encodes a presence map.
    pub fn encode_pmap(&mut self, pmap: &PresenceMap) {
        self.buffer.extend_from_slice(&pmap.encode());
    }

    /// Appends raw bytes.
    pub fn encode_raw(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Returns the encoded bytes.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.buffer
    }

    /// Returns a reference to the current buffer.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Returns the current buffer length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clears the buffer for reuse.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
