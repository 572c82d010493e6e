/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Byte cursor over a FAST stream buffer.

use crate::error::FastError;

/// Sequential reader over a byte buffer.
///
/// Every failure reports the offset at which input ran out, so errors can
/// point at the byte that broke a message.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    /// Creates a cursor positioned at the start of `data`.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Reads one byte.
    ///
    /// # Errors
    /// Returns `FastError::UnexpectedEof` at the end of the buffer.
    #[inline]
    pub fn read_byte(&mut self) -> Result<u8, FastError> {
        let byte = *self.data.get(self.position).ok_or(FastError::UnexpectedEof {
            offset: self.position,
        })?;
        self.position += 1;
        Ok(byte)
    }

    /// Steps back over the last byte read.
    #[inline]
    pub fn unread_byte(&mut self) {
        self.position = self.position.saturating_sub(1);
    }

    /// Reads exactly `n` raw bytes.
    ///
    /// # Errors
    /// Returns `FastError::UnexpectedEof` if fewer than `n` bytes remain.
    pub fn read_n(&mut self, n: usize) -> Result<&'a [u8], FastError> {
        let end = self
            .position
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or(FastError::UnexpectedEof {
                offset: self.data.len(),
            })?;
        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    /// Returns the bytes read since `start`.
    #[must_use]
    pub fn consumed_since(&self, start: usize) -> &'a [u8] {
        &self.data[start.min(self.position)..self.position]
    }

    /// Returns the next byte without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.data.get(self.position).copied()
    }

    /// Returns the current offset.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Returns the number of unread bytes.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Returns true if every byte has been read.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }
}
