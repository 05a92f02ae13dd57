//! Mutable code stream
//!
//! The search-template instruction rewrites the stream it is executing from,
//! so the interpreter runs over an owned, growable buffer rather than a slice.

use std::ops::Range;

use codehandler_spec::CODE_LINE_BYTES;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeBuffer {
    bytes: Vec<u8>,
}

impl CodeBuffer {
    pub fn new(bytes: Vec<u8>) -> Self {
        CodeBuffer { bytes }
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Code line starting at `position`, if a whole line is there
    pub fn line_at(&self, position: usize) -> Option<&[u8]> {
        self.bytes.get(position..position.checked_add(CODE_LINE_BYTES)?)
    }

    /// Overwrite the code line at `position`.
    ///
    /// Returns `false` and leaves the buffer untouched if the line does not fit.
    pub fn write_line(&mut self, position: usize, line: &[u8; CODE_LINE_BYTES]) -> bool {
        let Some(end) = position.checked_add(CODE_LINE_BYTES) else {
            return false;
        };
        match self.bytes.get_mut(position..end) {
            Some(slot) => {
                slot.copy_from_slice(line);
                true
            }
            None => false,
        }
    }

    /// Remove a byte range, shifting the tail left over it.
    ///
    /// The range is clamped to the buffer.
    pub fn remove_span(&mut self, span: Range<usize>) {
        let end = span.end.min(self.bytes.len());
        let start = span.start.min(end);
        let removed = end - start;
        if removed == 0 {
            return;
        }
        self.bytes.copy_within(end.., start);
        self.bytes.truncate(self.bytes.len() - removed);
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.bytes
    }
}

impl From<Vec<u8>> for CodeBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        CodeBuffer::new(bytes)
    }
}

impl From<&[u8]> for CodeBuffer {
    fn from(bytes: &[u8]) -> Self {
        CodeBuffer::new(bytes.to_vec())
    }
}

impl AsRef<[u8]> for CodeBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
