//! Search-template operation
//!
//! Finds the N-th occurrence of a byte template in a memory range, then
//! rewrites the executing stream: the search header becomes a direct pointer
//! load of the match and the template bytes are cut out. Later passes load the
//! cached address without scanning again.

use codehandler_spec::encoding::direct_pointer_line;
use codehandler_spec::CODE_LINE_BYTES;

use crate::buffer::CodeBuffer;
use crate::host::Host;

/// Address of the `target_index`-th (0-based) match of `template` in
/// `[start, end)`, stepping by one byte
pub fn find_template<H: Host + ?Sized>(
    host: &H,
    template: &[u8],
    target_index: u16,
    start: u32,
    end: u32,
) -> Option<u32> {
    let mut remaining = target_index;
    let mut address = start as u64;
    while address < end as u64 {
        let base = address as u32;
        let matches = template
            .iter()
            .enumerate()
            .all(|(offset, byte)| host.read_u8(base.wrapping_add(offset as u32)) == *byte);
        if matches {
            if remaining == 0 {
                return Some(base);
            }
            remaining -= 1;
        }
        address += 1;
    }
    None
}

/// Start and end addresses encoded as their high 16 bits
#[inline]
pub fn search_range(start_high: u16, end_high: u16) -> (u32, u32) {
    ((start_high as u32) << 16, (end_high as u32) << 16)
}

/// Replace the search instruction at `position` with a direct pointer load.
///
/// `consumed` is the full encoded length of the search instruction; everything
/// after its first line is removed from the stream.
pub fn rewrite_as_pointer_load(buffer: &mut CodeBuffer, position: usize, consumed: usize, address: u32) {
    buffer.write_line(position, &direct_pointer_line(address));
    buffer.remove_span(position + CODE_LINE_BYTES..position + consumed);
}
