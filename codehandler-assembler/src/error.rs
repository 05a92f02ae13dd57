//! Assembler errors

use codehandler_spec::Opcode;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblerError {
    #[error("String too long: {0} bytes (maximum 65535)")]
    StringTooLong(usize),

    #[error("Search template too long: {0} bytes (maximum 255)")]
    TemplateTooLong(usize),

    #[error("Native code is not a whole number of lines: {0} bytes")]
    PartialCodeLine(usize),

    #[error("Native code too long: {0} lines (maximum 65535)")]
    CodeTooLong(usize),

    #[error("Too many call arguments: {0} (maximum 8)")]
    TooManyArguments(u8),

    #[error("Invalid instruction {index} ({opcode}): {reason}")]
    InvalidInstruction {
        index: usize,
        opcode: Opcode,
        reason: Box<AssemblerError>,
    },
}

pub type Result<T> = std::result::Result<T, AssemblerError>;
