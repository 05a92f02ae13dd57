//! VM state for the code handler
//!
//! One `VmState` lives as long as its interpreter. The per-pass fields
//! (condition flag, loaded pointer) are cleared at the start of every pass and
//! by each terminator; the timer delay only by `ResetTimer`; the execution
//! counter never.

use codehandler_spec::PointerMode;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::registers::RegisterFile;

/// VM state
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VmState {
    /// Result of the last evaluated comparison
    pub condition_flag: bool,

    /// Base for pointer-mode operands (0 = unset)
    pub loaded_pointer: u32,

    /// Timer gating period (0 = no gating)
    pub time_dependence_delay: u32,

    /// Completed passes since initialization
    pub execution_count: u32,

    /// Integer and float registers
    pub registers: RegisterFile,
}

impl VmState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an operand with this pointer mode may have side effects
    #[inline]
    pub fn is_execution_allowed(&self, pointer: PointerMode) -> bool {
        match pointer {
            PointerMode::NoPointer => true,
            PointerMode::Pointer => self.loaded_pointer != 0,
        }
    }

    /// Effective address of an operand
    #[inline]
    pub fn resolve(&self, pointer: PointerMode, address: u32) -> u32 {
        match pointer {
            PointerMode::NoPointer => address,
            PointerMode::Pointer => self.loaded_pointer.wrapping_add(address),
        }
    }

    /// Gate and resolve in one step
    pub fn target(&self, pointer: PointerMode, address: u32) -> Option<u32> {
        if self.is_execution_allowed(pointer) {
            Some(self.resolve(pointer, address))
        } else {
            tracing::trace!(offset = address, "pointer not loaded, side effect suppressed");
            None
        }
    }

    /// Clear per-pass fields before the first instruction
    pub fn begin_pass(&mut self) {
        self.condition_flag = false;
        self.loaded_pointer = 0;
    }

    /// Account for a pass that consumed the whole stream
    pub fn finish_pass(&mut self) {
        self.execution_count = self.execution_count.wrapping_add(1);
    }

    /// Close a conditional block
    pub fn terminate_block(&mut self) {
        self.condition_flag = false;
        self.loaded_pointer = 0;
    }

    /// Put back the memory-derived fields of `saved`.
    ///
    /// Used after a dry run: registers, loaded pointer and condition flag
    /// only ever see sentinel reads there, so they are discarded.
    pub fn discard_memory_derived(&mut self, saved: &VmState) {
        self.registers = saved.registers;
        self.loaded_pointer = saved.loaded_pointer;
        self.condition_flag = saved.condition_flag;
    }

    /// Whether a time-gated block is skipped on this pass
    pub fn is_timer_gated(&self) -> bool {
        self.time_dependence_delay != 0 && self.execution_count % self.time_dependence_delay != 0
    }

    /// Serialize the state (registers and counters included)
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Restore a state written by [`VmState::to_bytes`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}
