//! Instruction execution
//!
//! `execute` applies one decoded instruction to the VM state and the host and
//! tells the dispatch loop how to move on. It never fails: every malformed
//! field has already been rejected by the decoder.

use codehandler_spec::{ArithmeticSource, Instruction};

use crate::call::procedure_call;
use crate::host::Host;
use crate::primitives::{corrupt, evaluate_condition, fill_area, read_value, skip_write, write_string, write_value};
use crate::registers::DIVIDE_BY_ZERO_RESULT;
use crate::scanner::BlockEnd;
use crate::search::{find_template, search_range};
use crate::state::VmState;

/// How the dispatch loop continues after an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Continue after the instruction
    Next,
    /// Skip to the next closing line, which executes next
    SkipTo(BlockEnd),
    /// Rewrite the instruction into a direct pointer load of `address`
    Rewrite { address: u32 },
}

/// Execute single instruction
pub fn execute<H: Host + ?Sized>(instr: &Instruction<'_>, state: &mut VmState, host: &mut H) -> Flow {
    match *instr {
        // ========== Memory Write ==========
        Instruction::RamWrite { pointer, size, address, value } => {
            if let Some(target) = state.target(pointer, address) {
                write_value(host, size, target, value);
            }
        }

        Instruction::StringWrite { pointer, address, bytes } => {
            if let Some(target) = state.target(pointer, address) {
                write_string(host, target, bytes);
            }
        }

        Instruction::SkipWrite { pointer, size, address, value, iterations, step, increment } => {
            if let Some(target) = state.target(pointer, address) {
                skip_write(host, size, target, value, iterations as u32, step, increment);
            }
        }

        Instruction::FillMemoryArea { pointer, address, value, length } => {
            if let Some(target) = state.target(pointer, address) {
                fill_area(host, target, value, length);
            }
        }

        // ========== Conditional ==========
        Instruction::Conditional { comparison, pointer, size, address, value, upper } => {
            if let Some(target) = state.target(pointer, address) {
                let holds = evaluate_condition(host, comparison, size, target, value, upper);
                state.condition_flag = holds;
                tracing::debug!(?comparison, holds, "condition evaluated");
                if !holds {
                    return Flow::SkipTo(BlockEnd::Terminator);
                }
            }
        }

        // ========== Timer ==========
        Instruction::AddTimeDependence { delay } => {
            state.time_dependence_delay = delay;
            if state.is_timer_gated() {
                tracing::debug!(delay, execution_count = state.execution_count, "timer gate closed");
                return Flow::SkipTo(BlockEnd::ResetTimer);
            }
        }

        Instruction::ResetTimer => state.time_dependence_delay = 0,

        // ========== Registers ==========
        Instruction::LoadInteger { pointer, size, register, address } => {
            if let Some(target) = state.target(pointer, address) {
                let value = read_value(host, size, target);
                state.registers.write_integer(register, value);
            }
        }

        Instruction::StoreInteger { pointer, size, register, address } => {
            if let Some(target) = state.target(pointer, address) {
                let value = state.registers.read_integer(register);
                write_value(host, size, target, value);
            }
        }

        Instruction::LoadFloat { pointer, register, address } => {
            if let Some(target) = state.target(pointer, address) {
                let bits = host.read_u32(target);
                state.registers.write_float(register, f32::from_bits(bits));
            }
        }

        Instruction::StoreFloat { pointer, register, address } => {
            if let Some(target) = state.target(pointer, address) {
                let bits = state.registers.read_float(register).to_bits();
                host.write_u32(target, bits);
            }
        }

        Instruction::IntegerOperation { arithmetic, destination, source } => {
            let operand = match source {
                ArithmeticSource::Register(reg) => state.registers.read_integer(reg),
                ArithmeticSource::Value(value) => value,
            };
            if !state.registers.apply_integer(arithmetic, destination, operand) {
                tracing::warn!(
                    register = %destination,
                    result = DIVIDE_BY_ZERO_RESULT,
                    "integer division by zero"
                );
            }
        }

        Instruction::FloatOperation { arithmetic, destination, source } => {
            let operand = match source {
                ArithmeticSource::Register(reg) => state.registers.read_float(reg),
                ArithmeticSource::Value(bits) => f32::from_bits(bits),
            };
            state.registers.apply_float(arithmetic, destination, operand);
        }

        Instruction::FloatToInteger { source, destination } => {
            state.registers.float_to_integer(source, destination);
        }

        // ========== Pointer ==========
        Instruction::LoadPointer { pointer, address, lower, upper } => {
            if let Some(target) = state.target(pointer, address) {
                let dereferenced = host.read_u32(target);
                let cached = (lower..=upper).contains(&dereferenced);
                state.loaded_pointer = if cached { target } else { 0 };
                tracing::debug!(
                    address = format_args!("{:#010x}", target),
                    dereferenced = format_args!("{:#010x}", dereferenced),
                    cached,
                    "load pointer"
                );
            }
        }

        Instruction::AddOffsetToPointer { offset } => {
            state.loaded_pointer = state.loaded_pointer.wrapping_add_signed(offset);
        }

        Instruction::LoadPointerDirectly { address } => state.loaded_pointer = address,

        // ========== Raw Execution ==========
        Instruction::ExecuteAssembly { code } => host.execute_raw_instructions(code),

        Instruction::PerformSystemCall { code } => host.trigger_system_call(code),

        // ========== Stream Control ==========
        Instruction::Terminator => state.terminate_block(),

        Instruction::NoOperation | Instruction::TimerTermination => {}

        // ========== Scan / Patch ==========
        Instruction::Corrupter { start, end, search, replacement } => {
            let replaced = corrupt(host, start, end, search, replacement);
            tracing::debug!(replaced, "corrupter");
        }

        Instruction::SearchTemplate { template, target_index, start_high, end_high } => {
            let (start, end) = search_range(start_high, end_high);
            let found = find_template(host, template, target_index, start, end);
            if found.is_none() {
                tracing::debug!(target_index, "search template not found");
            }
            return Flow::Rewrite { address: found.unwrap_or(0) };
        }

        Instruction::ProcedureCall { address, low, high, .. } => {
            procedure_call(host, &mut state.registers, address, instr.call_arguments(), low, high);
        }
    }

    Flow::Next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::SimulatedMemory;
    use codehandler_spec::{Arithmetic, Comparison, PointerMode, Register, ValueSize};

    #[test]
    fn test_ram_write_gated_by_pointer() {
        let mut state = VmState::new();
        let mut mem = SimulatedMemory::new();
        let instr = Instruction::RamWrite {
            pointer: PointerMode::Pointer,
            size: ValueSize::Bits32,
            address: 0x10,
            value: 0xAA,
        };

        assert_eq!(execute(&instr, &mut state, &mut mem), Flow::Next);
        assert_eq!(mem.write_count(), 0);

        state.loaded_pointer = 0x8000_0000;
        execute(&instr, &mut state, &mut mem);
        assert_eq!(mem.read_u32(0x8000_0010), 0xAA);
    }

    #[test]
    fn test_false_condition_skips_to_terminator() {
        let mut state = VmState::new();
        let mut mem = SimulatedMemory::new();
        mem.write_u32(0x100, 5);

        let instr = Instruction::Conditional {
            comparison: Comparison::Equal,
            pointer: PointerMode::NoPointer,
            size: ValueSize::Bits32,
            address: 0x100,
            value: 6,
            upper: 0,
        };
        assert_eq!(execute(&instr, &mut state, &mut mem), Flow::SkipTo(BlockEnd::Terminator));
        assert!(!state.condition_flag);
    }

    #[test]
    fn test_gated_condition_neither_compares_nor_skips() {
        let mut state = VmState::new();
        let mut mem = SimulatedMemory::new();
        let instr = Instruction::Conditional {
            comparison: Comparison::Equal,
            pointer: PointerMode::Pointer,
            size: ValueSize::Bits32,
            address: 0,
            value: 1,
            upper: 0,
        };
        assert_eq!(execute(&instr, &mut state, &mut mem), Flow::Next);
    }

    #[test]
    fn test_timer_gate() {
        let mut state = VmState::new();
        let mut mem = SimulatedMemory::new();
        let instr = Instruction::AddTimeDependence { delay: 3 };

        assert_eq!(execute(&instr, &mut state, &mut mem), Flow::Next);
        state.execution_count = 1;
        assert_eq!(execute(&instr, &mut state, &mut mem), Flow::SkipTo(BlockEnd::ResetTimer));
        assert_eq!(execute(&Instruction::ResetTimer, &mut state, &mut mem), Flow::Next);
        assert_eq!(state.time_dependence_delay, 0);
    }

    #[test]
    fn test_load_pointer_caches_address_in_range() {
        let mut state = VmState::new();
        let mut mem = SimulatedMemory::new();
        mem.write_u32(0x8000_0000, 0x8100_0000);

        let instr = Instruction::LoadPointer {
            pointer: PointerMode::NoPointer,
            address: 0x8000_0000,
            lower: 0x8000_0000,
            upper: 0x8180_0000,
        };
        execute(&instr, &mut state, &mut mem);
        assert_eq!(state.loaded_pointer, 0x8000_0000);

        let out_of_range = Instruction::LoadPointer {
            pointer: PointerMode::NoPointer,
            address: 0x8000_0000,
            lower: 0x9000_0000,
            upper: 0x9100_0000,
        };
        execute(&out_of_range, &mut state, &mut mem);
        assert_eq!(state.loaded_pointer, 0);
    }

    #[test]
    fn test_pointer_offset_is_signed() {
        let mut state = VmState::new();
        let mut mem = SimulatedMemory::new();
        state.loaded_pointer = 0x8000_0010;
        execute(&Instruction::AddOffsetToPointer { offset: -0x10 }, &mut state, &mut mem);
        assert_eq!(state.loaded_pointer, 0x8000_0000);
    }

    #[test]
    fn test_register_load_store_roundtrip() {
        let mut state = VmState::new();
        let mut mem = SimulatedMemory::new();
        mem.write_u16(0x500, 0x1234);

        let load = Instruction::LoadInteger {
            pointer: PointerMode::NoPointer,
            size: ValueSize::Bits16,
            register: Register::R3,
            address: 0x500,
        };
        execute(&load, &mut state, &mut mem);
        assert_eq!(state.registers.read_integer(Register::R3), 0x1234);

        let add = Instruction::IntegerOperation {
            arithmetic: Arithmetic::Add,
            destination: Register::R3,
            source: ArithmeticSource::Value(1),
        };
        execute(&add, &mut state, &mut mem);

        let store = Instruction::StoreInteger {
            pointer: PointerMode::NoPointer,
            size: ValueSize::Bits8,
            register: Register::R3,
            address: 0x600,
        };
        execute(&store, &mut state, &mut mem);
        assert_eq!(mem.read_u8(0x600), 0x35);
    }

    #[test]
    fn test_float_register_transfer() {
        let mut state = VmState::new();
        let mut mem = SimulatedMemory::new();
        mem.write_u32(0x700, 1.5f32.to_bits());

        execute(
            &Instruction::LoadFloat { pointer: PointerMode::NoPointer, register: Register::R1, address: 0x700 },
            &mut state,
            &mut mem,
        );
        execute(
            &Instruction::FloatOperation {
                arithmetic: Arithmetic::Multiply,
                destination: Register::R1,
                source: ArithmeticSource::Value(2.0f32.to_bits()),
            },
            &mut state,
            &mut mem,
        );
        execute(
            &Instruction::StoreFloat { pointer: PointerMode::NoPointer, register: Register::R1, address: 0x704 },
            &mut state,
            &mut mem,
        );
        assert_eq!(f32::from_bits(mem.read_u32(0x704)), 3.0);
    }

    #[test]
    fn test_search_not_found_rewrites_to_zero() {
        let mut state = VmState::new();
        let mut mem = SimulatedMemory::new();
        let instr = Instruction::SearchTemplate {
            template: &[0x12, 0x34],
            target_index: 0,
            start_high: 0x0000,
            end_high: 0x0001,
        };
        assert_eq!(execute(&instr, &mut state, &mut mem), Flow::Rewrite { address: 0 });
    }

    #[test]
    fn test_terminator_clears_block_state() {
        let mut state = VmState::new();
        let mut mem = SimulatedMemory::new();
        state.condition_flag = true;
        state.loaded_pointer = 0x8000_0000;
        state.time_dependence_delay = 2;
        execute(&Instruction::Terminator, &mut state, &mut mem);
        assert!(!state.condition_flag);
        assert_eq!(state.loaded_pointer, 0);
        assert_eq!(state.time_dependence_delay, 2);
    }
}
