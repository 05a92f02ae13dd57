//! # Error Types for the Code Handler Instruction Set

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeError {
    // Field errors
    #[error("Invalid opcode: {0:#04x}")]
    InvalidOpcode(u8),

    #[error("Invalid value size nibble: {0} (valid range: 0-2)")]
    InvalidValueSize(u8),

    #[error("Invalid pointer mode nibble: {0} (valid range: 0-1)")]
    InvalidPointerMode(u8),

    #[error("Invalid register index: {0} (valid range: 0-7)")]
    InvalidRegister(u8),

    #[error("Too many call arguments: {0} (maximum 8)")]
    TooManyArguments(u8),

    #[error("Invalid integer operation: {0:#04x}")]
    InvalidIntegerOperation(u8),

    #[error("Invalid float operation: {0:#04x}")]
    InvalidFloatOperation(u8),

    // Stream errors
    #[error("Truncated instruction at offset {position:#x}: wanted {wanted} bytes, {available} available")]
    Truncated {
        position: usize,
        wanted: usize,
        available: usize,
    },
}

pub type Result<T> = std::result::Result<T, CodeError>;

impl CodeError {
    /// Check if this error comes from running off the end of the stream
    pub fn is_truncation(&self) -> bool {
        matches!(self, CodeError::Truncated { .. })
    }
}
