//! Runtime error types for the code handler interpreter
//!
//! Every variant is fatal: the current pass stops and the stream is left as
//! it was at the failing instruction.

use codehandler_disassembler::DisassemblerError;
use thiserror::Error;

use crate::scanner::BlockEnd;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Decode error at offset {position:#x}: {source}")]
    Decode {
        position: usize,
        #[source]
        source: DisassemblerError,
    },

    #[error("Block opened at offset {position:#x} is not closed by a {end} line")]
    UnterminatedBlock { position: usize, end: BlockEnd },

    #[error("Negative length: offset {position:#x} is past the end of a {length}-byte stream")]
    NegativeLength { position: usize, length: usize },

    #[error("Illegal code length: {remaining} bytes remain at offset {position:#x}")]
    MisalignedLength { position: usize, remaining: usize },

    #[error("State snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;

impl RuntimeError {
    /// Stream offset the error was raised at, if it has one
    pub fn position(&self) -> Option<usize> {
        match self {
            RuntimeError::Decode { position, .. }
            | RuntimeError::UnterminatedBlock { position, .. }
            | RuntimeError::NegativeLength { position, .. }
            | RuntimeError::MisalignedLength { position, .. } => Some(*position),
            RuntimeError::Snapshot(_) => None,
        }
    }
}
