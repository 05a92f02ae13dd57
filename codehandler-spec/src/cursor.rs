//! Bounds-checked reader over a code stream
//!
//! Every fixed-width read goes through here, so running off the end of the
//! stream is a `CodeError::Truncated` instead of a panic.

use std::fmt;

use crate::byte_order::{read_u16, read_u32, read_u8};
use crate::error::{CodeError, Result};

/// Forward-only cursor over stream bytes
#[derive(Clone)]
pub struct StreamCursor<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> StreamCursor<'a> {
    #[inline]
    pub fn new(bytes: &'a [u8]) -> Self {
        StreamCursor { bytes, position: 0 }
    }

    /// Offset of the next unread byte
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of unread bytes
    #[inline]
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.remaining() == 0
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let slice = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.take::<1>().map(read_u8)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.take::<2>().map(read_u16)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.take::<4>().map(read_u32)
    }

    /// Borrow the next `count` bytes and advance past them
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes: &'a [u8] = self.bytes;
        let end = self
            .position
            .checked_add(count)
            .filter(|end| *end <= bytes.len())
            .ok_or(CodeError::Truncated {
                position: self.position,
                wanted: count,
                available: self.remaining(),
            })?;
        let slice = &bytes[self.position..end];
        self.position = end;
        Ok(slice)
    }

    /// Advance without reading
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.read_bytes(count).map(|_| ())
    }
}

impl fmt::Debug for StreamCursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamCursor")
            .field("position", &self.position)
            .field("length", &self.bytes.len())
            .finish()
    }
}
