//! Disassembler errors

use codehandler_spec::CodeError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisassemblerError {
    #[error("Unknown opcode: 0x{0:02X}")]
    UnknownOpcode(u8),

    #[error("Malformed instruction: {0}")]
    Malformed(#[from] CodeError),

    #[error("Stream ends mid-line: {remaining} trailing bytes at offset {position:#x}")]
    PartialLine { position: usize, remaining: usize },
}

pub type Result<T> = std::result::Result<T, DisassemblerError>;
