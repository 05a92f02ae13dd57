//! # Code Handler Runtime
//!
//! Interpret code handler streams against a host process.
//!
//! A stream is consumed instruction by instruction once per pass. VM state
//! (registers, execution counter, timer delay) persists across passes of one
//! [`Interpreter`]; the condition flag and loaded pointer are per pass.
//!
//! ## Features
//!
//! - **32 opcodes**: memory writes, conditionals, timer gating, registers,
//!   pointers, native execution, memory patching and template search
//! - **Host capability**: all foreign access goes through [`Host`]
//! - **Dry run**: the [`Access`] gate disables every side effect
//! - **Self-modifying search**: search templates rewrite the stream into a
//!   cached pointer load
//!
//! ## Example
//!
//! ```rust
//! use codehandler_runtime::{CodeBuffer, Host, Interpreter, InterpreterConfig, SimulatedMemory};
//!
//! // write 0x000000AA to 0x80001000
//! let mut code = CodeBuffer::new(vec![
//!     0x00, 0x02, 0x00, 0x00, 0x80, 0x00, 0x10, 0x00,
//!     0x00, 0x00, 0x00, 0xAA, 0x00, 0x00, 0x00, 0x00,
//! ]);
//! let mut vm = Interpreter::new(SimulatedMemory::new(), InterpreterConfig::default());
//! vm.run(&mut code).unwrap();
//! assert_eq!(vm.host().read_u32(0x8000_1000), 0xAA);
//! ```

pub mod error;
pub mod registers;
pub mod state;
pub mod host;
pub mod memory;
pub mod buffer;
pub mod scanner;
pub mod primitives;
pub mod search;
pub mod call;
pub mod execute;
pub mod vm;

pub use error::{Result, RuntimeError};
pub use registers::RegisterFile;
pub use state::VmState;
pub use host::{Access, Host};
pub use memory::{ForeignCall, SimulatedMemory};
pub use buffer::CodeBuffer;
pub use scanner::{find_pattern, BlockEnd};
pub use execute::{execute, Flow};
pub use vm::{Interpreter, InterpreterConfig, PassSummary};

/// Simple execution helper
///
/// Runs one pass of `code` against fresh simulated memory and returns the
/// memory afterwards.
pub fn run(code: &[u8]) -> Result<SimulatedMemory> {
    let mut vm = Interpreter::new(SimulatedMemory::new(), InterpreterConfig::default());
    let mut buffer = CodeBuffer::from(code);
    vm.run(&mut buffer)?;
    Ok(vm.into_host())
}
