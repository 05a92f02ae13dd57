//! Procedure-call operation

use codehandler_spec::{Register, MAX_CALL_ARGUMENTS};

use crate::host::Host;
use crate::registers::RegisterFile;

/// Call a foreign function and split its 64-bit result: the low word goes to
/// `low`, the high word to `high`
pub fn procedure_call<H: Host + ?Sized>(
    host: &mut H,
    registers: &mut RegisterFile,
    address: u32,
    arguments: &[u32],
    low: Register,
    high: Register,
) -> u64 {
    let count = arguments.len().min(MAX_CALL_ARGUMENTS);
    let mut slots = [0u32; MAX_CALL_ARGUMENTS];
    slots[..count].copy_from_slice(&arguments[..count]);

    let result = host.invoke_foreign_function(address, &slots, count);
    tracing::debug!(
        address = format_args!("{:#010x}", address),
        arguments = count,
        result = format_args!("{:#018x}", result),
        "procedure call"
    );

    registers.write_integer(low, result as u32);
    registers.write_integer(high, (result >> 32) as u32);
    result
}
