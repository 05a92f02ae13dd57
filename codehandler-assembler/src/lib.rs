//! Code Handler Assembler
//!
//! Encode structured instructions into the binary code stream the runtime
//! executes. There is no text syntax: instructions are built as values.
//!
//! ## Example
//!
//! ```rust
//! use codehandler_assembler::assemble;
//! use codehandler_spec::{Instruction, PointerMode, ValueSize};
//!
//! let stream = assemble(&[
//!     Instruction::RamWrite {
//!         pointer: PointerMode::NoPointer,
//!         size: ValueSize::Bits32,
//!         address: 0x8000_1000,
//!         value: 0xAA,
//!     },
//!     Instruction::Terminator,
//! ])
//! .unwrap();
//! assert_eq!(stream.len(), 24);
//! ```

pub mod error;
pub mod encoder;
pub mod assembler;

pub use error::{AssemblerError, Result};
pub use assembler::{assemble, validate};
pub use encoder::{encode, ram_write};
