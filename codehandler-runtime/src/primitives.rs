//! Memory-operation primitives
//!
//! Sized reads and writes plus the iterative write shapes, all through the
//! host capability. Addresses wrap around the 32-bit space.

use codehandler_spec::{Comparison, ValueSize};

use crate::host::Host;

/// Read a zero-extended value of `size` at `address`
pub fn read_value<H: Host + ?Sized>(host: &H, size: ValueSize, address: u32) -> u32 {
    match size {
        ValueSize::Bits8 => host.read_u8(address) as u32,
        ValueSize::Bits16 => host.read_u16(address) as u32,
        ValueSize::Bits32 => host.read_u32(address),
    }
}

/// Write the low `size` bits of `value` at `address`
pub fn write_value<H: Host + ?Sized>(host: &mut H, size: ValueSize, address: u32, value: u32) {
    tracing::trace!(address = format_args!("{:#010x}", address), value, %size, "write");
    match size {
        ValueSize::Bits8 => host.write_u8(address, value as u8),
        ValueSize::Bits16 => host.write_u16(address, value as u16),
        ValueSize::Bits32 => host.write_u32(address, value),
    }
}

pub fn write_string<H: Host + ?Sized>(host: &mut H, address: u32, bytes: &[u8]) {
    tracing::trace!(address = format_args!("{:#010x}", address), length = bytes.len(), "string write");
    host.write_bytes(address, bytes);
}

/// Write `value` `iterations` times, moving the address by `step` and adding
/// `increment` to the value after each write
pub fn skip_write<H: Host + ?Sized>(
    host: &mut H,
    size: ValueSize,
    address: u32,
    value: u32,
    iterations: u32,
    step: u32,
    increment: u32,
) {
    let mut address = address;
    let mut value = size.truncate(value);
    for _ in 0..iterations {
        write_value(host, size, address, value);
        value = size.truncate(value.wrapping_add(increment));
        address = address.wrapping_add(step);
    }
}

/// Fill `length` bytes with a 32-bit pattern, one word at a time
pub fn fill_area<H: Host + ?Sized>(host: &mut H, address: u32, value: u32, length: u32) {
    skip_write(host, ValueSize::Bits32, address, value, length / 4, 4, 0);
}

/// Replace every aligned word equal to `search` in `[start, end)`.
///
/// Returns the number of words replaced.
pub fn corrupt<H: Host + ?Sized>(
    host: &mut H,
    start: u32,
    end: u32,
    search: u32,
    replacement: u32,
) -> usize {
    let mut replaced = 0;
    let mut address = start as u64;
    while address < end as u64 {
        let current = address as u32;
        if host.read_u32(current) == search {
            host.write_u32(current, replacement);
            replaced += 1;
        }
        address += 4;
    }
    replaced
}

/// Compare the sized value at `address` against the operand.
///
/// The operand is cut to the value size; the `Between` upper bound is kept as
/// a full word.
pub fn evaluate_condition<H: Host + ?Sized>(
    host: &H,
    comparison: Comparison,
    size: ValueSize,
    address: u32,
    value: u32,
    upper: u32,
) -> bool {
    let memory = read_value(host, size, address);
    comparison.holds(memory, size.truncate(value), upper)
}
