//! Code line encoding helpers
//!
//! Bit-field extraction for the mode byte, line-size rounding, and the
//! pointer-load line that the search template writes back into the stream.

use crate::byte_order::write_u32_be;
use crate::opcode::Opcode;
use crate::operand::{PointerMode, ValueSize};
use crate::CODE_LINE_BYTES;

#[inline]
pub const fn upper_nibble(byte: u8) -> u8 {
    byte >> 4
}

#[inline]
pub const fn lower_nibble(byte: u8) -> u8 {
    byte & 0x0F
}

/// Pack pointer mode and value size into the byte after the opcode
#[inline]
pub const fn mode_byte(pointer: PointerMode, size: ValueSize) -> u8 {
    (pointer.to_nibble() << 4) | size.to_nibble()
}

/// Round a byte count up to a whole number of code lines
#[inline]
pub const fn round_up_to_line(length: usize) -> usize {
    length.div_ceil(CODE_LINE_BYTES) * CODE_LINE_BYTES
}

/// `LoadPointerDirectly` line for an address
pub fn direct_pointer_line(address: u32) -> [u8; CODE_LINE_BYTES] {
    let mut line = [0u8; CODE_LINE_BYTES];
    line[0] = Opcode::LoadPointerDirectly.to_u8();
    line[4..8].copy_from_slice(&write_u32_be(address));
    line
}
