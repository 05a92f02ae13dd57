//! # Code Handler Opcode Definitions
//!
//! Every instruction starts with a one-byte opcode. The table is closed: any
//! byte not listed here is a fatal decode error.
//!
//! ## Opcode Encoding
//!
//! Opcodes are organized by instruction family:
//! - 0x00-0x02: Memory write (RAM, string, skip)
//! - 0x03-0x0B: Conditional (compare, mask, range)
//! - 0x0C-0x0D: Timer gating
//! - 0x10-0x15: Register load/store and arithmetic
//! - 0x20: Area fill
//! - 0x30-0x32: Pointer control
//! - 0xC0-0xC1: Raw execution (native code, system call)
//! - 0xD0-0xD2: Stream control (terminator, no-op, timer termination)
//! - 0xF0-0xF8: Memory scan/patch, search template, procedure call

use serde::{Deserialize, Serialize};

use crate::operand::Comparison;

/// Instruction opcode (one byte)
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    // ========== Memory Write (0x00-0x02) ==========
    /// Write a sized value to an address
    RamWrite = 0x00,
    /// Write raw bytes to an address
    StringWrite = 0x01,
    /// Repeated write with address step and value increment
    SkipWrite = 0x02,

    // ========== Conditional (0x03-0x0B) ==========
    /// mem == value
    IfEqual = 0x03,
    /// mem != value
    IfNotEqual = 0x04,
    /// mem > value
    IfGreater = 0x05,
    /// mem < value
    IfLess = 0x06,
    /// mem >= value
    IfGreaterOrEqual = 0x07,
    /// mem <= value
    IfLessOrEqual = 0x08,
    /// (mem & value) != 0
    And = 0x09,
    /// (mem | value) != 0
    Or = 0x0A,
    /// lower < mem < upper
    IfValueBetween = 0x0B,

    // ========== Timer (0x0C-0x0D) ==========
    /// Gate the following block on the execution counter
    AddTimeDependence = 0x0C,
    /// Clear the timer delay
    ResetTimer = 0x0D,

    // ========== Registers (0x10-0x15) ==========
    /// int_reg = mem
    LoadInteger = 0x10,
    /// mem = int_reg
    StoreInteger = 0x11,
    /// float_reg = mem (bit pattern)
    LoadFloat = 0x12,
    /// mem = float_reg (bit pattern)
    StoreFloat = 0x13,
    /// Integer register arithmetic
    IntegerOperation = 0x14,
    /// Float register arithmetic
    FloatOperation = 0x15,

    // ========== Fill (0x20) ==========
    /// Fill an area with a 32-bit value
    FillMemoryArea = 0x20,

    // ========== Pointer (0x30-0x32) ==========
    /// Cache an address whose content lies in a range
    LoadPointer = 0x30,
    /// loaded_pointer += offset
    AddOffsetToPointer = 0x31,
    /// loaded_pointer = literal
    LoadPointerDirectly = 0x32,

    // ========== Raw Execution (0xC0-0xC1) ==========
    /// Hand raw native instructions to the host
    ExecuteAssembly = 0xC0,
    /// Trigger a console system call
    PerformSystemCall = 0xC1,

    // ========== Stream Control (0xD0-0xD2) ==========
    /// Close a conditional block
    Terminator = 0xD0,
    /// Do nothing
    NoOperation = 0xD1,
    /// Timer termination marker
    TimerTermination = 0xD2,

    // ========== Scan / Patch (0xF0-0xF8) ==========
    /// Replace every matching word in a range
    Corrupter = 0xF0,
    /// Find a byte template and rewrite the stream into a pointer load
    SearchTemplate = 0xF6,
    /// Call a foreign function with register results
    ProcedureCall = 0xF8,
}

impl Opcode {
    /// Try to convert from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            // Memory write
            0x00 => Some(Opcode::RamWrite),
            0x01 => Some(Opcode::StringWrite),
            0x02 => Some(Opcode::SkipWrite),

            // Conditional
            0x03 => Some(Opcode::IfEqual),
            0x04 => Some(Opcode::IfNotEqual),
            0x05 => Some(Opcode::IfGreater),
            0x06 => Some(Opcode::IfLess),
            0x07 => Some(Opcode::IfGreaterOrEqual),
            0x08 => Some(Opcode::IfLessOrEqual),
            0x09 => Some(Opcode::And),
            0x0A => Some(Opcode::Or),
            0x0B => Some(Opcode::IfValueBetween),

            // Timer
            0x0C => Some(Opcode::AddTimeDependence),
            0x0D => Some(Opcode::ResetTimer),

            // Registers
            0x10 => Some(Opcode::LoadInteger),
            0x11 => Some(Opcode::StoreInteger),
            0x12 => Some(Opcode::LoadFloat),
            0x13 => Some(Opcode::StoreFloat),
            0x14 => Some(Opcode::IntegerOperation),
            0x15 => Some(Opcode::FloatOperation),

            // Fill
            0x20 => Some(Opcode::FillMemoryArea),

            // Pointer
            0x30 => Some(Opcode::LoadPointer),
            0x31 => Some(Opcode::AddOffsetToPointer),
            0x32 => Some(Opcode::LoadPointerDirectly),

            // Raw execution
            0xC0 => Some(Opcode::ExecuteAssembly),
            0xC1 => Some(Opcode::PerformSystemCall),

            // Stream control
            0xD0 => Some(Opcode::Terminator),
            0xD1 => Some(Opcode::NoOperation),
            0xD2 => Some(Opcode::TimerTermination),

            // Scan / patch
            0xF0 => Some(Opcode::Corrupter),
            0xF6 => Some(Opcode::SearchTemplate),
            0xF8 => Some(Opcode::ProcedureCall),

            _ => None,
        }
    }

    /// Convert to u8
    #[inline]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Check if this opcode opens a conditional block
    #[inline]
    pub const fn is_conditional(self) -> bool {
        matches!(
            self,
            Opcode::IfEqual
                | Opcode::IfNotEqual
                | Opcode::IfGreater
                | Opcode::IfLess
                | Opcode::IfGreaterOrEqual
                | Opcode::IfLessOrEqual
                | Opcode::And
                | Opcode::Or
                | Opcode::IfValueBetween
        )
    }

    /// Check if this is a plain memory write
    #[inline]
    pub const fn is_memory_write(self) -> bool {
        matches!(
            self,
            Opcode::RamWrite | Opcode::StringWrite | Opcode::SkipWrite | Opcode::FillMemoryArea
        )
    }

    /// Check if this is a timer opcode
    #[inline]
    pub const fn is_timer(self) -> bool {
        matches!(self, Opcode::AddTimeDependence | Opcode::ResetTimer)
    }

    /// Check if this moves a value between memory and a register
    #[inline]
    pub const fn is_register_transfer(self) -> bool {
        matches!(
            self,
            Opcode::LoadInteger | Opcode::StoreInteger | Opcode::LoadFloat | Opcode::StoreFloat
        )
    }

    /// Check if this is a register arithmetic opcode
    #[inline]
    pub const fn is_arithmetic(self) -> bool {
        matches!(self, Opcode::IntegerOperation | Opcode::FloatOperation)
    }

    /// Check if this changes the loaded pointer
    #[inline]
    pub const fn is_pointer(self) -> bool {
        matches!(
            self,
            Opcode::LoadPointer | Opcode::AddOffsetToPointer | Opcode::LoadPointerDirectly
        )
    }

    /// Check if this hands control to the host
    #[inline]
    pub const fn is_native(self) -> bool {
        matches!(
            self,
            Opcode::ExecuteAssembly | Opcode::PerformSystemCall | Opcode::ProcedureCall
        )
    }

    /// Check if this is a stream control opcode
    #[inline]
    pub const fn is_stream_control(self) -> bool {
        matches!(
            self,
            Opcode::Terminator | Opcode::NoOperation | Opcode::TimerTermination
        )
    }

    /// Check if this scans a memory range
    #[inline]
    pub const fn is_scan(self) -> bool {
        matches!(self, Opcode::Corrupter | Opcode::SearchTemplate)
    }

    /// Comparison performed by a conditional opcode
    pub const fn comparison(self) -> Option<Comparison> {
        match self {
            Opcode::IfEqual => Some(Comparison::Equal),
            Opcode::IfNotEqual => Some(Comparison::NotEqual),
            Opcode::IfGreater => Some(Comparison::Greater),
            Opcode::IfLess => Some(Comparison::Less),
            Opcode::IfGreaterOrEqual => Some(Comparison::GreaterOrEqual),
            Opcode::IfLessOrEqual => Some(Comparison::LessOrEqual),
            Opcode::And => Some(Comparison::And),
            Opcode::Or => Some(Comparison::Or),
            Opcode::IfValueBetween => Some(Comparison::Between),
            _ => None,
        }
    }

    /// Conditional opcode for a comparison
    pub const fn for_comparison(comparison: Comparison) -> Self {
        match comparison {
            Comparison::Equal => Opcode::IfEqual,
            Comparison::NotEqual => Opcode::IfNotEqual,
            Comparison::Greater => Opcode::IfGreater,
            Comparison::Less => Opcode::IfLess,
            Comparison::GreaterOrEqual => Opcode::IfGreaterOrEqual,
            Comparison::LessOrEqual => Opcode::IfLessOrEqual,
            Comparison::And => Opcode::And,
            Comparison::Or => Opcode::Or,
            Comparison::Between => Opcode::IfValueBetween,
        }
    }

    /// Encoded length in bytes, or `None` when the length depends on a
    /// field inside the instruction
    pub const fn fixed_length(self) -> Option<usize> {
        match self {
            Opcode::StringWrite
            | Opcode::ExecuteAssembly
            | Opcode::SearchTemplate
            | Opcode::ProcedureCall => None,
            Opcode::SkipWrite | Opcode::Corrupter => Some(24),
            Opcode::RamWrite | Opcode::FillMemoryArea | Opcode::LoadPointer => Some(16),
            op if op.is_conditional() => Some(16),
            _ => Some(8),
        }
    }

    /// Get the instruction family
    #[inline]
    pub const fn family(self) -> InstructionFamily {
        if self.is_memory_write() {
            InstructionFamily::MemoryWrite
        } else if self.is_conditional() {
            InstructionFamily::Conditional
        } else if self.is_timer() {
            InstructionFamily::Timer
        } else if self.is_register_transfer() {
            InstructionFamily::RegisterTransfer
        } else if self.is_arithmetic() {
            InstructionFamily::Arithmetic
        } else if self.is_pointer() {
            InstructionFamily::Pointer
        } else if self.is_native() {
            InstructionFamily::Native
        } else if self.is_scan() {
            InstructionFamily::Scan
        } else {
            InstructionFamily::StreamControl
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Opcode::RamWrite => "write",
            Opcode::StringWrite => "string",
            Opcode::SkipWrite => "skip",
            Opcode::IfEqual => "ifeq",
            Opcode::IfNotEqual => "ifne",
            Opcode::IfGreater => "ifgt",
            Opcode::IfLess => "iflt",
            Opcode::IfGreaterOrEqual => "ifge",
            Opcode::IfLessOrEqual => "ifle",
            Opcode::And => "ifand",
            Opcode::Or => "ifor",
            Opcode::IfValueBetween => "ifbetween",
            Opcode::AddTimeDependence => "timer",
            Opcode::ResetTimer => "resettimer",
            Opcode::LoadInteger => "ldint",
            Opcode::StoreInteger => "stint",
            Opcode::LoadFloat => "ldfloat",
            Opcode::StoreFloat => "stfloat",
            Opcode::IntegerOperation => "intop",
            Opcode::FloatOperation => "floatop",
            Opcode::FillMemoryArea => "fill",
            Opcode::LoadPointer => "ldptr",
            Opcode::AddOffsetToPointer => "addptr",
            Opcode::LoadPointerDirectly => "setptr",
            Opcode::ExecuteAssembly => "asm",
            Opcode::PerformSystemCall => "syscall",
            Opcode::Terminator => "end",
            Opcode::NoOperation => "nop",
            Opcode::TimerTermination => "timerend",
            Opcode::Corrupter => "corrupt",
            Opcode::SearchTemplate => "search",
            Opcode::ProcedureCall => "call",
        };
        write!(f, "{}", name)
    }
}

/// Instruction family
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstructionFamily {
    /// RamWrite, StringWrite, SkipWrite, FillMemoryArea
    MemoryWrite = 0,
    /// IfEqual .. IfValueBetween
    Conditional = 1,
    /// AddTimeDependence, ResetTimer
    Timer = 2,
    /// LoadInteger, StoreInteger, LoadFloat, StoreFloat
    RegisterTransfer = 3,
    /// IntegerOperation, FloatOperation
    Arithmetic = 4,
    /// LoadPointer, AddOffsetToPointer, LoadPointerDirectly
    Pointer = 5,
    /// ExecuteAssembly, PerformSystemCall, ProcedureCall
    Native = 6,
    /// Corrupter, SearchTemplate
    Scan = 7,
    /// Terminator, NoOperation, TimerTermination
    StreamControl = 8,
}

impl InstructionFamily {
    /// Total number of instruction families
    pub const COUNT: usize = 9;
}

impl std::fmt::Display for InstructionFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            InstructionFamily::MemoryWrite => "memory-write",
            InstructionFamily::Conditional => "conditional",
            InstructionFamily::Timer => "timer",
            InstructionFamily::RegisterTransfer => "register-transfer",
            InstructionFamily::Arithmetic => "arithmetic",
            InstructionFamily::Pointer => "pointer",
            InstructionFamily::Native => "native",
            InstructionFamily::Scan => "scan",
            InstructionFamily::StreamControl => "stream-control",
        };
        write!(f, "{}", name)
    }
}
