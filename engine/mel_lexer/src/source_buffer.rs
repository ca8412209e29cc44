//! Sentinel-terminated source buffer.
//!
//! The scanner reads bytes through a [`Cursor`](crate::cursor::Cursor)
//! over this buffer. A trailing `0x00` sentinel lets the hot scanning
//! loops terminate without a bounds check on every byte; an interior null
//! is distinguished from EOF by comparing the position against the source
//! length.

/// Source text plus a trailing sentinel byte.
pub struct SourceBuffer {
    bytes: Vec<u8>,
    /// Length of the source, excluding the sentinel.
    source_len: usize,
}

impl SourceBuffer {
    /// Sentinel byte appended after the source.
    pub const SENTINEL: u8 = 0x00;

    pub fn new(source: &str) -> Self {
        let mut bytes = Vec::with_capacity(source.len() + 1);
        bytes.extend_from_slice(source.as_bytes());
        bytes.push(Self::SENTINEL);
        SourceBuffer {
            bytes,
            source_len: source.len(),
        }
    }

    /// The buffer including the sentinel.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Source length, excluding the sentinel.
    #[inline]
    pub fn source_len(&self) -> usize {
        self.source_len
    }

    /// Original source slice for `start..end`.
    ///
    /// The scanner only ever slices at token boundaries, which are ASCII
    /// in this grammar, so the slice is valid UTF-8 whenever the input was.
    #[inline]
    pub fn slice(&self, start: usize, end: usize) -> &str {
        // Tokens never straddle the sentinel.
        std::str::from_utf8(&self.bytes[start..end]).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::SourceBuffer;

    #[test]
    fn appends_sentinel() {
        let buf = SourceBuffer::new("ab");
        assert_eq!(buf.bytes(), &[b'a', b'b', 0]);
        assert_eq!(buf.source_len(), 2);
    }

    #[test]
    fn slice_returns_source_text() {
        let buf = SourceBuffer::new("var $x");
        assert_eq!(buf.slice(4, 6), "$x");
    }
}
