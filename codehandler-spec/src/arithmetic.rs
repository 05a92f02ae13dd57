//! Register arithmetic sub-opcodes
//!
//! `IntegerOperation` and `FloatOperation` carry a sub-opcode in the byte after
//! the opcode. Sub-opcodes 0-3 take their second operand from a register,
//! 4-7 from the literal in the last word of the line. The integer and float
//! tables order the direct multiply/divide pair differently.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CodeError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arithmetic {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Arithmetic {
    /// Register-operand table shared by both integer and float operations
    const fn from_register_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Arithmetic::Add),
            1 => Some(Arithmetic::Subtract),
            2 => Some(Arithmetic::Multiply),
            3 => Some(Arithmetic::Divide),
            _ => None,
        }
    }

    const fn register_index(self) -> u8 {
        match self {
            Arithmetic::Add => 0,
            Arithmetic::Subtract => 1,
            Arithmetic::Multiply => 2,
            Arithmetic::Divide => 3,
        }
    }
}

impl fmt::Display for Arithmetic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Arithmetic::Add => "add",
            Arithmetic::Subtract => "sub",
            Arithmetic::Multiply => "mul",
            Arithmetic::Divide => "div",
        };
        write!(f, "{}", name)
    }
}

/// Decoded `IntegerOperation` sub-opcode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntegerOperation {
    pub arithmetic: Arithmetic,
    /// Second operand is the literal instead of a register
    pub direct: bool,
}

impl IntegerOperation {
    pub fn from_u8(sub_opcode: u8) -> Result<Self> {
        let (arithmetic, direct) = match sub_opcode {
            0..=3 => match Arithmetic::from_register_index(sub_opcode) {
                Some(arithmetic) => (arithmetic, false),
                None => return Err(CodeError::InvalidIntegerOperation(sub_opcode)),
            },
            4 => (Arithmetic::Add, true),
            5 => (Arithmetic::Subtract, true),
            6 => (Arithmetic::Divide, true),
            7 => (Arithmetic::Multiply, true),
            other => return Err(CodeError::InvalidIntegerOperation(other)),
        };
        Ok(IntegerOperation { arithmetic, direct })
    }

    pub const fn to_u8(self) -> u8 {
        if !self.direct {
            return self.arithmetic.register_index();
        }
        match self.arithmetic {
            Arithmetic::Add => 4,
            Arithmetic::Subtract => 5,
            Arithmetic::Divide => 6,
            Arithmetic::Multiply => 7,
        }
    }
}

/// Decoded `FloatOperation` sub-opcode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FloatOperation {
    Arithmetic { arithmetic: Arithmetic, direct: bool },
    /// Convert a float register into an integer register
    ToInteger,
}

impl FloatOperation {
    pub const TO_INTEGER: u8 = 8;

    pub fn from_u8(sub_opcode: u8) -> Result<Self> {
        let (arithmetic, direct) = match sub_opcode {
            0..=3 => match Arithmetic::from_register_index(sub_opcode) {
                Some(arithmetic) => (arithmetic, false),
                None => return Err(CodeError::InvalidFloatOperation(sub_opcode)),
            },
            4 => (Arithmetic::Add, true),
            5 => (Arithmetic::Subtract, true),
            6 => (Arithmetic::Multiply, true),
            7 => (Arithmetic::Divide, true),
            Self::TO_INTEGER => return Ok(FloatOperation::ToInteger),
            other => return Err(CodeError::InvalidFloatOperation(other)),
        };
        Ok(FloatOperation::Arithmetic { arithmetic, direct })
    }

    pub const fn to_u8(self) -> u8 {
        match self {
            FloatOperation::ToInteger => Self::TO_INTEGER,
            FloatOperation::Arithmetic { arithmetic, direct: false } => arithmetic.register_index(),
            FloatOperation::Arithmetic { arithmetic, direct: true } => {
                4 + arithmetic.register_index()
            }
        }
    }
}
