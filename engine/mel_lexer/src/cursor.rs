//! Byte cursor over a sentinel-terminated buffer.
//!
//! EOF is detected when the current byte equals the sentinel and the
//! position has reached the source length; an interior null at an earlier
//! position is an invalid character, not EOF.

use crate::source_buffer::SourceBuffer;

/// Advancing byte cursor.
pub struct Cursor<'a> {
    bytes: &'a [u8],
    source_len: usize,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buffer: &'a SourceBuffer) -> Self {
        Cursor {
            bytes: buffer.bytes(),
            source_len: buffer.source_len(),
            pos: 0,
        }
    }

    /// Current byte; the sentinel once past the end.
    #[inline]
    pub fn current(&self) -> u8 {
        self.bytes[self.pos.min(self.bytes.len() - 1)]
    }

    /// Byte at `offset` positions ahead of the current one.
    #[inline]
    pub fn peek(&self, offset: usize) -> u8 {
        let idx = self.pos + offset;
        if idx < self.bytes.len() {
            self.bytes[idx]
        } else {
            SourceBuffer::SENTINEL
        }
    }

    #[inline]
    pub fn advance(&mut self) {
        if self.pos < self.source_len {
            self.pos += 1;
        }
    }

    #[inline]
    pub fn advance_n(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.source_len);
    }

    /// Jump to an absolute position (clamped to the source length).
    #[inline]
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.source_len);
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.source_len
    }

    /// Remaining bytes from the current position, excluding the sentinel.
    #[inline]
    pub fn rest(&self) -> &'a [u8] {
        &self.bytes[self.pos..self.source_len.max(self.pos)]
    }
}
