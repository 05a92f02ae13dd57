//! Register definitions
//!
//! The integer and float register files are both indexed r0-r7.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CodeError, Result};

/// Number of registers in each register file
pub const REGISTER_COUNT: usize = 8;

/// Register (r0-r7)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Register {
    R0 = 0,
    R1 = 1,
    R2 = 2,
    R3 = 3,
    R4 = 4,
    R5 = 5,
    R6 = 6,
    R7 = 7,
}

impl Register {
    const ALL: [Register; REGISTER_COUNT] = [
        Register::R0,
        Register::R1,
        Register::R2,
        Register::R3,
        Register::R4,
        Register::R5,
        Register::R6,
        Register::R7,
    ];

    #[inline]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Decode a register byte from the stream
    pub fn from_byte(byte: u8) -> Result<Self> {
        Self::from_index(byte as usize).ok_or(CodeError::InvalidRegister(byte))
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Iterate all registers in index order
    pub fn all() -> impl Iterator<Item = Register> {
        Self::ALL.into_iter()
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.index())
    }
}
