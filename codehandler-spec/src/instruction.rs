//! Code Handler Instruction Set
//!
//! Decoded instructions borrow their variable-length payloads (string bytes,
//! native code, search templates) straight from the stream.
//!
//! ## Line Layouts
//! - Regular:     [op][ptr:4|size:4][field:16][address:32] [value:32][extra:32]
//! - Register:    [op][ptr:4|size:4][-][reg][address:32]
//! - Arithmetic:  [op][subop][dest][src][value:32]
//! - Search:      [op][len][index:16][start_hi:16][end_hi:16] [template..]
//! - Call:        [op][low][high][count][address:32] [args..]

use crate::arithmetic::Arithmetic;
use crate::encoding::round_up_to_line;
use crate::opcode::Opcode;
use crate::operand::{Comparison, PointerMode, ValueSize};
use crate::register::Register;
use crate::{CODE_LINE_BYTES, MAX_CALL_ARGUMENTS};

/// Common operand fields of a regular code line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operand {
    /// Raw byte after the opcode (sub-opcode for register arithmetic)
    pub mode: u8,
    pub pointer: PointerMode,
    pub size: ValueSize,
    /// Absolute address, or offset from the loaded pointer in pointer mode
    pub address: u32,
    /// Second word of the instruction (0 for single-line shapes)
    pub value: u32,
    /// Payload length in bytes
    pub length: usize,
    /// Opcode-specific 16-bit field at line bytes 2..4
    pub field: u16,
}

/// Second operand of register arithmetic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticSource {
    Register(Register),
    /// Literal; a float bit pattern for float operations
    Value(u32),
}

impl ArithmeticSource {
    #[inline]
    pub fn is_direct(&self) -> bool {
        matches!(self, ArithmeticSource::Value(_))
    }
}

/// Decoded instruction
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instruction<'a> {
    // ========== Memory Write ==========
    RamWrite {
        pointer: PointerMode,
        size: ValueSize,
        address: u32,
        value: u32,
    },
    StringWrite {
        pointer: PointerMode,
        address: u32,
        bytes: &'a [u8],
    },
    SkipWrite {
        pointer: PointerMode,
        size: ValueSize,
        address: u32,
        value: u32,
        iterations: u16,
        step: u32,
        increment: u32,
    },
    FillMemoryArea {
        pointer: PointerMode,
        address: u32,
        value: u32,
        length: u32,
    },

    // ========== Conditional ==========
    /// `upper` is only meaningful for `Comparison::Between`
    Conditional {
        comparison: Comparison,
        pointer: PointerMode,
        size: ValueSize,
        address: u32,
        value: u32,
        upper: u32,
    },

    // ========== Timer ==========
    AddTimeDependence { delay: u32 },
    ResetTimer,

    // ========== Registers ==========
    LoadInteger {
        pointer: PointerMode,
        size: ValueSize,
        register: Register,
        address: u32,
    },
    StoreInteger {
        pointer: PointerMode,
        size: ValueSize,
        register: Register,
        address: u32,
    },
    LoadFloat {
        pointer: PointerMode,
        register: Register,
        address: u32,
    },
    StoreFloat {
        pointer: PointerMode,
        register: Register,
        address: u32,
    },
    IntegerOperation {
        arithmetic: Arithmetic,
        destination: Register,
        source: ArithmeticSource,
    },
    FloatOperation {
        arithmetic: Arithmetic,
        destination: Register,
        source: ArithmeticSource,
    },
    /// int_reg[destination] = float_reg[source] as integer
    FloatToInteger {
        source: Register,
        destination: Register,
    },

    // ========== Pointer ==========
    LoadPointer {
        pointer: PointerMode,
        address: u32,
        lower: u32,
        upper: u32,
    },
    AddOffsetToPointer { offset: i32 },
    LoadPointerDirectly { address: u32 },

    // ========== Raw Execution ==========
    ExecuteAssembly { code: &'a [u8] },
    PerformSystemCall { code: u16 },

    // ========== Stream Control ==========
    Terminator,
    NoOperation,
    TimerTermination,

    // ========== Scan / Patch ==========
    Corrupter {
        start: u32,
        end: u32,
        search: u32,
        replacement: u32,
    },
    SearchTemplate {
        template: &'a [u8],
        target_index: u16,
        start_high: u16,
        end_high: u16,
    },
    ProcedureCall {
        address: u32,
        low: Register,
        high: Register,
        arguments: [u32; MAX_CALL_ARGUMENTS],
        argument_count: u8,
    },
}

impl<'a> Instruction<'a> {
    /// Opcode byte this instruction encodes to
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::RamWrite { .. } => Opcode::RamWrite,
            Instruction::StringWrite { .. } => Opcode::StringWrite,
            Instruction::SkipWrite { .. } => Opcode::SkipWrite,
            Instruction::FillMemoryArea { .. } => Opcode::FillMemoryArea,
            Instruction::Conditional { comparison, .. } => Opcode::for_comparison(*comparison),
            Instruction::AddTimeDependence { .. } => Opcode::AddTimeDependence,
            Instruction::ResetTimer => Opcode::ResetTimer,
            Instruction::LoadInteger { .. } => Opcode::LoadInteger,
            Instruction::StoreInteger { .. } => Opcode::StoreInteger,
            Instruction::LoadFloat { .. } => Opcode::LoadFloat,
            Instruction::StoreFloat { .. } => Opcode::StoreFloat,
            Instruction::IntegerOperation { .. } => Opcode::IntegerOperation,
            Instruction::FloatOperation { .. } | Instruction::FloatToInteger { .. } => {
                Opcode::FloatOperation
            }
            Instruction::LoadPointer { .. } => Opcode::LoadPointer,
            Instruction::AddOffsetToPointer { .. } => Opcode::AddOffsetToPointer,
            Instruction::LoadPointerDirectly { .. } => Opcode::LoadPointerDirectly,
            Instruction::ExecuteAssembly { .. } => Opcode::ExecuteAssembly,
            Instruction::PerformSystemCall { .. } => Opcode::PerformSystemCall,
            Instruction::Terminator => Opcode::Terminator,
            Instruction::NoOperation => Opcode::NoOperation,
            Instruction::TimerTermination => Opcode::TimerTermination,
            Instruction::Corrupter { .. } => Opcode::Corrupter,
            Instruction::SearchTemplate { .. } => Opcode::SearchTemplate,
            Instruction::ProcedureCall { .. } => Opcode::ProcedureCall,
        }
    }

    /// Number of stream bytes the instruction occupies
    pub fn encoded_length(&self) -> usize {
        match self {
            Instruction::StringWrite { bytes, .. } => CODE_LINE_BYTES + round_up_to_line(bytes.len()),
            Instruction::ExecuteAssembly { code } => CODE_LINE_BYTES + round_up_to_line(code.len()),
            Instruction::SearchTemplate { template, .. } => {
                CODE_LINE_BYTES + round_up_to_line(template.len())
            }
            Instruction::ProcedureCall { argument_count, .. } => {
                CODE_LINE_BYTES + round_up_to_line(*argument_count as usize * 4)
            }
            other => other.opcode().fixed_length().unwrap_or(CODE_LINE_BYTES),
        }
    }

    /// Pointer mode of the address operand, if the instruction has one
    pub fn pointer_mode(&self) -> Option<PointerMode> {
        match self {
            Instruction::RamWrite { pointer, .. }
            | Instruction::StringWrite { pointer, .. }
            | Instruction::SkipWrite { pointer, .. }
            | Instruction::FillMemoryArea { pointer, .. }
            | Instruction::Conditional { pointer, .. }
            | Instruction::LoadInteger { pointer, .. }
            | Instruction::StoreInteger { pointer, .. }
            | Instruction::LoadFloat { pointer, .. }
            | Instruction::StoreFloat { pointer, .. }
            | Instruction::LoadPointer { pointer, .. } => Some(*pointer),
            _ => None,
        }
    }

    /// Supplied procedure-call arguments
    pub fn call_arguments(&self) -> &[u32] {
        match self {
            Instruction::ProcedureCall { arguments, argument_count, .. } => {
                let count = (*argument_count as usize).min(MAX_CALL_ARGUMENTS);
                &arguments[..count]
            }
            _ => &[],
        }
    }
}
