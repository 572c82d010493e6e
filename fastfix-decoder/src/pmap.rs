/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! FAST presence map handling.
//!
//! The presence map (PMAP) is a stop-bit encoded bitmap that tells which
//! operator-driven fields carry a value in the stream. Bits 6..0 of each
//! byte are consumed in order; bit 7 only marks the last byte.

use crate::cursor::ByteCursor;
use crate::decoder::{STOP_BIT, read_raw_value};
use crate::error::FastError;
use smallvec::SmallVec;

/// Default cap on presence map length, in bytes.
pub const DEFAULT_MAX_PMAP_BYTES: usize = 8;

const BITS_PER_BYTE: usize = 7;

/// FAST presence map.
///
/// Bits are consumed in order as fields are decoded. Reading past the end
/// yields `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceMap {
    /// Raw map bytes, stop bit included.
    bytes: SmallVec<[u8; DEFAULT_MAX_PMAP_BYTES]>,
    /// Index of the next bit to consume.
    position: usize,
}

impl PresenceMap {
    /// Creates an empty presence map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a presence map from raw bytes as found on the wire.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: SmallVec::from_slice(bytes),
            position: 0,
        }
    }

    /// Creates a presence map holding the given bits.
    #[must_use]
    pub fn from_bits(bits: &[bool]) -> Self {
        let mut bytes: SmallVec<[u8; DEFAULT_MAX_PMAP_BYTES]> = bits
            .chunks(BITS_PER_BYTE)
            .map(|chunk| {
                chunk
                    .iter()
                    .enumerate()
                    .filter(|(_, set)| **set)
                    .fold(0u8, |byte, (i, _)| byte | (1 << (6 - i)))
            })
            .collect();
        match bytes.last_mut() {
            Some(last) => *last |= STOP_BIT,
            None => bytes.push(STOP_BIT),
        }
        Self { bytes, position: 0 }
    }

    /// Reads a presence map from the stream.
    ///
    /// # Arguments
    /// * `cursor` - Stream positioned at the map
    /// * `max_bytes` - Longest accepted map
    ///
    /// # Errors
    /// Returns `FastError::StopBitNotFound` (R6) if the map is longer than
    /// `max_bytes`, or `FastError::UnexpectedEof` if the stream ends first.
    pub fn decode(cursor: &mut ByteCursor<'_>, max_bytes: usize) -> Result<Self, FastError> {
        read_raw_value(cursor, max_bytes).map(Self::from_bytes)
    }

    /// Returns the next bit from the presence map.
    ///
    /// # Returns
    /// `true` if the field is present, `false` otherwise.
    /// Returns `false` if the map is exhausted.
    #[inline]
    pub fn next_bit(&mut self) -> bool {
        let bit = self.bit(self.position);
        self.position += 1;
        bit
    }

    /// Returns the bit at the specified position without consuming it.
    #[must_use]
    pub fn bit(&self, index: usize) -> bool {
        self.bytes
            .get(index / BITS_PER_BYTE)
            .is_some_and(|byte| byte & (1 << (6 - index % BITS_PER_BYTE)) != 0)
    }

    /// Returns the number of bits in the presence map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len() * BITS_PER_BYTE
    }

    /// Returns true if the presence map holds no bits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the index of the next bit to consume.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Resets the position to the beginning.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Returns the wire encoding of the map.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        if self.bytes.is_empty() {
            return vec![STOP_BIT];
        }
        self.bytes.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastfix_core::ErrorCode;

    #[test]
    fn test_presence_map_decode_single_byte() {
        let data = [0b1100_0000];
        let mut cursor = ByteCursor::new(&data);
        let pmap = PresenceMap::decode(&mut cursor, DEFAULT_MAX_PMAP_BYTES).unwrap();

        assert_eq!(cursor.position(), 1);
        assert_eq!(pmap.len(), 7);
        assert!(pmap.bit(0));
        assert!(!pmap.bit(1));
        assert!(!pmap.bit(6));
    }

    #[test]
    fn test_presence_map_decode_multi_byte() {
        let data = [0b0100_0000, 0b1000_0001];
        let mut cursor = ByteCursor::new(&data);
        let pmap = PresenceMap::decode(&mut cursor, DEFAULT_MAX_PMAP_BYTES).unwrap();

        assert_eq!(cursor.position(), 2);
        assert_eq!(pmap.len(), 14);
        assert!(pmap.bit(0));
        assert!(pmap.bit(13));
        assert!(!pmap.bit(7));
    }

    #[test]
    fn test_presence_map_exceeding_cap_is_r6() {
        let data = [0x00, 0x00, 0x80];
        let err = PresenceMap::decode(&mut ByteCursor::new(&data), 2).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::R6));
    }

    #[test]
    fn test_presence_map_next_bit_exhausted_is_false() {
        let mut pmap = PresenceMap::from_bytes(&[0b1101_0000]);

        assert!(pmap.next_bit());
        assert!(!pmap.next_bit());
        assert!(pmap.next_bit());
        for _ in 0..4 {
            assert!(!pmap.next_bit());
        }
        assert!(!pmap.next_bit());
        assert!(!pmap.next_bit());
        assert_eq!(pmap.position(), 9);
    }

    #[test]
    fn test_presence_map_from_bits() {
        let pmap = PresenceMap::from_bits(&[true, true, false, false, false, false, false]);
        assert_eq!(pmap.encode(), vec![0b1110_0000]);

        let pmap = PresenceMap::from_bits(&[true; 8]);
        assert_eq!(pmap.encode(), vec![0x7F, 0xC0]);

        assert_eq!(PresenceMap::from_bits(&[]).encode(), vec![STOP_BIT]);
    }
}
