//! # Code Handler Instruction Set
//!
//! Compact binary instruction format for patching a running process's memory.
//!
//! ## Key Features
//! - Stream of 8-byte code lines, all multi-byte fields big-endian
//! - One-byte opcodes, many instructions spanning several lines
//! - Pointer-relative addressing through a cached base pointer
//! - Conditional blocks closed by a fixed terminator line
//! - 8 integer and 8 float registers
//! - Self-modifying search templates that rewrite the stream in place

pub mod arithmetic;
pub mod byte_order;
pub mod cursor;
pub mod encoding;
pub mod error;
pub mod instruction;
pub mod opcode;
pub mod operand;
pub mod register;

pub use arithmetic::{Arithmetic, FloatOperation, IntegerOperation};
pub use byte_order::HostOrder;
pub use cursor::StreamCursor;
pub use error::{CodeError, Result};
pub use instruction::{ArithmeticSource, Instruction, Operand};
pub use opcode::{InstructionFamily, Opcode};
pub use operand::{Comparison, PointerMode, ValueSize};
pub use register::{Register, REGISTER_COUNT};

/// Size of one code line in bytes
pub const CODE_LINE_BYTES: usize = 8;

/// Maximum number of integer arguments a procedure call can pass
pub const MAX_CALL_ARGUMENTS: usize = 8;

/// Line that closes a conditional block
pub const TERMINATOR_LINE: [u8; CODE_LINE_BYTES] = [0xD0, 0x00, 0x00, 0x00, 0xDE, 0xAD, 0xCA, 0xFE];

/// Line that closes a time-gated block and clears the delay
pub const RESET_TIMER_LINE: [u8; CODE_LINE_BYTES] = [0x0D, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];

/// Address type of the patched process (32-bit)
pub type Address = u32;

/// Word read from or written to the patched process
pub type Word = u32;
