//! Operand bit fields
//!
//! The byte after the opcode packs the pointer mode (upper nibble) and the
//! value size (lower nibble) for most instructions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CodeError, Result};

/// Whether the address field is absolute or relative to the loaded pointer
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerMode {
    NoPointer = 0,
    Pointer = 1,
}

impl PointerMode {
    pub fn from_nibble(nibble: u8) -> Result<Self> {
        match nibble {
            0 => Ok(PointerMode::NoPointer),
            1 => Ok(PointerMode::Pointer),
            other => Err(CodeError::InvalidPointerMode(other)),
        }
    }

    #[inline]
    pub const fn to_nibble(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn is_pointer(self) -> bool {
        matches!(self, PointerMode::Pointer)
    }
}

/// Width of the value operated on
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueSize {
    Bits8 = 0,
    Bits16 = 1,
    Bits32 = 2,
}

impl ValueSize {
    pub fn from_nibble(nibble: u8) -> Result<Self> {
        match nibble {
            0 => Ok(ValueSize::Bits8),
            1 => Ok(ValueSize::Bits16),
            2 => Ok(ValueSize::Bits32),
            other => Err(CodeError::InvalidValueSize(other)),
        }
    }

    #[inline]
    pub const fn to_nibble(self) -> u8 {
        self as u8
    }

    /// Width in bytes
    #[inline]
    pub const fn bytes(self) -> usize {
        match self {
            ValueSize::Bits8 => 1,
            ValueSize::Bits16 => 2,
            ValueSize::Bits32 => 4,
        }
    }

    /// Bit mask covering the value width
    #[inline]
    pub const fn mask(self) -> u32 {
        match self {
            ValueSize::Bits8 => 0xFF,
            ValueSize::Bits16 => 0xFFFF,
            ValueSize::Bits32 => 0xFFFF_FFFF,
        }
    }

    #[inline]
    pub const fn truncate(self, value: u32) -> u32 {
        value & self.mask()
    }
}

impl fmt::Display for ValueSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSize::Bits8 => write!(f, "u8"),
            ValueSize::Bits16 => write!(f, "u16"),
            ValueSize::Bits32 => write!(f, "u32"),
        }
    }
}

/// Test performed by a conditional instruction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    Equal,
    NotEqual,
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
    And,
    Or,
    Between,
}

impl Comparison {
    /// Evaluate against a value read from memory.
    ///
    /// `memory` and `value` are already truncated to the operand size. Both
    /// sides are zero-extended windows of the big-endian stream bytes, so the
    /// unsigned order here is the byte-wise order of those windows. `upper`
    /// is only consulted by `Between`, which excludes both bounds; it is a
    /// full word, not truncated.
    pub fn holds(self, memory: u32, value: u32, upper: u32) -> bool {
        match self {
            Comparison::Equal => memory == value,
            Comparison::NotEqual => memory != value,
            Comparison::Greater => memory > value,
            Comparison::Less => memory < value,
            Comparison::GreaterOrEqual => memory >= value,
            Comparison::LessOrEqual => memory <= value,
            Comparison::And => memory & value != 0,
            Comparison::Or => memory | value != 0,
            Comparison::Between => value < memory && memory < upper,
        }
    }
}
