//! # Code Handler Disassembler
//!
//! Decode code handler streams into structured instructions and listing text.
//!
//! The decoder is the single source of truth for instruction layouts: the
//! runtime dispatch loop decodes through [`decode`] as well.
//!
//! ## Example
//!
//! ```rust
//! use codehandler_disassembler::{decode, disassemble};
//! use codehandler_spec::{Instruction, TERMINATOR_LINE};
//!
//! let (instr, consumed) = decode(&TERMINATOR_LINE).unwrap();
//! assert_eq!(instr, Instruction::Terminator);
//! assert_eq!(consumed, 8);
//!
//! let listing = disassemble(&TERMINATOR_LINE).unwrap();
//! assert!(listing.contains("end"));
//! ```

pub mod error;
pub mod decoder;
pub mod formatter;
pub mod disassembler;

pub use error::{DisassemblerError, Result};
pub use disassembler::{disassemble, instructions};
pub use decoder::{decode, decode_conditional, decode_operand};
pub use formatter::{format, format_line};

#[cfg(test)]
mod tests {
    use super::*;
    use codehandler_spec::{Instruction, Opcode, CODE_LINE_BYTES};

    #[test]
    fn test_public_exports() {
        let _ = DisassemblerError::UnknownOpcode(0xFF);
    }

    #[test]
    fn test_decode_all_single_line_controls() {
        for (opcode, expected) in [
            (Opcode::NoOperation, Instruction::NoOperation),
            (Opcode::TimerTermination, Instruction::TimerTermination),
            (Opcode::ResetTimer, Instruction::ResetTimer),
        ] {
            let mut line = [0u8; CODE_LINE_BYTES];
            line[0] = opcode.to_u8();
            assert_eq!(decode(&line).unwrap(), (expected, CODE_LINE_BYTES));
        }
    }

    #[test]
    fn test_result_type() {
        let ok: Result<i32> = Ok(42);
        assert!(ok.is_ok());

        let err: Result<i32> = Err(DisassemblerError::UnknownOpcode(0xFF));
        assert!(err.is_err());
    }

    // Cross-crate encode/decode agreement lives in the workspace-level tests/cross_module.rs
}
