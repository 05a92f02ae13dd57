//! Integer and float register files
//!
//! Both files hold 8 registers. They survive across passes of one
//! interpreter and are only cleared by re-initialization.

use codehandler_spec::{Arithmetic, Register, REGISTER_COUNT};
use serde::{Deserialize, Serialize};

/// Integer division result when the divisor is zero (RISC-V convention)
pub const DIVIDE_BY_ZERO_RESULT: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RegisterFile {
    pub integer: [u32; REGISTER_COUNT],
    pub float: [f32; REGISTER_COUNT],
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn read_integer(&self, reg: Register) -> u32 {
        self.integer[reg.index()]
    }

    #[inline]
    pub fn write_integer(&mut self, reg: Register, value: u32) {
        self.integer[reg.index()] = value;
    }

    #[inline]
    pub fn read_float(&self, reg: Register) -> f32 {
        self.float[reg.index()]
    }

    #[inline]
    pub fn write_float(&mut self, reg: Register, value: f32) {
        self.float[reg.index()] = value;
    }

    /// `destination = destination <op> operand` on the integer file.
    ///
    /// Wraps on overflow. Returns `false` if the operation divided by zero,
    /// in which case the destination holds [`DIVIDE_BY_ZERO_RESULT`].
    pub fn apply_integer(&mut self, arithmetic: Arithmetic, destination: Register, operand: u32) -> bool {
        let current = self.read_integer(destination);
        let (result, ok) = match arithmetic {
            Arithmetic::Add => (current.wrapping_add(operand), true),
            Arithmetic::Subtract => (current.wrapping_sub(operand), true),
            Arithmetic::Multiply => (current.wrapping_mul(operand), true),
            Arithmetic::Divide => match current.checked_div(operand) {
                Some(quotient) => (quotient, true),
                None => (DIVIDE_BY_ZERO_RESULT, false),
            },
        };
        self.write_integer(destination, result);
        ok
    }

    /// `destination = destination <op> operand` on the float file (IEEE-754)
    pub fn apply_float(&mut self, arithmetic: Arithmetic, destination: Register, operand: f32) {
        let current = self.read_float(destination);
        let result = match arithmetic {
            Arithmetic::Add => current + operand,
            Arithmetic::Subtract => current - operand,
            Arithmetic::Multiply => current * operand,
            Arithmetic::Divide => current / operand,
        };
        self.write_float(destination, result);
    }

    /// Truncate a float register toward zero into an integer register.
    ///
    /// The value is converted as a signed 32-bit integer (saturating, NaN
    /// becomes 0) and stored as its two's-complement bits.
    pub fn float_to_integer(&mut self, source: Register, destination: Register) {
        let value = self.read_float(source) as i32;
        self.write_integer(destination, value as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_arithmetic_wraps() {
        let mut regs = RegisterFile::new();
        regs.write_integer(Register::R1, u32::MAX);
        assert!(regs.apply_integer(Arithmetic::Add, Register::R1, 2));
        assert_eq!(regs.read_integer(Register::R1), 1);

        assert!(regs.apply_integer(Arithmetic::Subtract, Register::R1, 2));
        assert_eq!(regs.read_integer(Register::R1), u32::MAX);

        regs.write_integer(Register::R2, 0x1_0000);
        assert!(regs.apply_integer(Arithmetic::Multiply, Register::R2, 0x1_0000));
        assert_eq!(regs.read_integer(Register::R2), 0);
    }

    #[test]
    fn test_integer_division_by_zero() {
        let mut regs = RegisterFile::new();
        regs.write_integer(Register::R0, 42);
        assert!(!regs.apply_integer(Arithmetic::Divide, Register::R0, 0));
        assert_eq!(regs.read_integer(Register::R0), DIVIDE_BY_ZERO_RESULT);

        regs.write_integer(Register::R0, 42);
        assert!(regs.apply_integer(Arithmetic::Divide, Register::R0, 5));
        assert_eq!(regs.read_integer(Register::R0), 8);
    }

    #[test]
    fn test_float_arithmetic() {
        let mut regs = RegisterFile::new();
        regs.write_float(Register::R3, 1.5);
        regs.apply_float(Arithmetic::Multiply, Register::R3, 4.0);
        assert_eq!(regs.read_float(Register::R3), 6.0);

        regs.apply_float(Arithmetic::Divide, Register::R3, 0.0);
        assert!(regs.read_float(Register::R3).is_infinite());
    }

    #[test]
    fn test_float_to_integer() {
        let mut regs = RegisterFile::new();
        regs.write_float(Register::R0, 99.9);
        regs.float_to_integer(Register::R0, Register::R4);
        assert_eq!(regs.read_integer(Register::R4), 99);

        regs.write_float(Register::R0, -2.0);
        regs.float_to_integer(Register::R0, Register::R4);
        assert_eq!(regs.read_integer(Register::R4), (-2i32) as u32);

        regs.write_float(Register::R0, f32::NAN);
        regs.float_to_integer(Register::R0, Register::R4);
        assert_eq!(regs.read_integer(Register::R4), 0);
    }
}
