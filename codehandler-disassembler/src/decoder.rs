//! Instruction decoder
//!
//! Decoding is pure: pointer-mode addresses stay as offsets and are resolved
//! against the loaded pointer at execution time.

use codehandler_spec::encoding::{lower_nibble, round_up_to_line, upper_nibble};
use codehandler_spec::{
    ArithmeticSource, FloatOperation, Instruction, IntegerOperation, Opcode, Operand,
    PointerMode, Register, StreamCursor, ValueSize, CODE_LINE_BYTES, MAX_CALL_ARGUMENTS,
};

use crate::error::{DisassemblerError, Result};

/// Decode the instruction at the start of `stream`.
///
/// Returns the instruction and the number of bytes it occupies.
pub fn decode(stream: &[u8]) -> Result<(Instruction<'_>, usize)> {
    let mut cursor = StreamCursor::new(stream);
    let byte = cursor.read_u8()?;
    let opcode = Opcode::from_u8(byte).ok_or(DisassemblerError::UnknownOpcode(byte))?;

    let instruction = match opcode {
        // ========== Memory Write ==========
        Opcode::RamWrite => {
            let op = decode_operand(&mut cursor, opcode)?;
            cursor.skip(4)?;
            Instruction::RamWrite {
                pointer: op.pointer,
                size: op.size,
                address: op.address,
                value: op.value,
            }
        }
        Opcode::StringWrite => {
            let op = decode_operand(&mut cursor, opcode)?;
            let bytes = read_padded(&mut cursor, op.length)?;
            Instruction::StringWrite { pointer: op.pointer, address: op.address, bytes }
        }
        Opcode::SkipWrite => {
            let op = decode_operand(&mut cursor, opcode)?;
            let step = cursor.read_u32()?;
            let increment = cursor.read_u32()?;
            cursor.skip(4)?;
            Instruction::SkipWrite {
                pointer: op.pointer,
                size: op.size,
                address: op.address,
                value: op.value,
                iterations: op.field,
                step,
                increment,
            }
        }
        Opcode::FillMemoryArea => {
            let op = decode_operand(&mut cursor, opcode)?;
            let length = cursor.read_u32()?;
            Instruction::FillMemoryArea {
                pointer: op.pointer,
                address: op.address,
                value: op.value,
                length,
            }
        }

        // ========== Conditional ==========
        op if op.is_conditional() => {
            let (operand, upper) = decode_conditional(&mut cursor)?;
            match op.comparison() {
                Some(comparison) => Instruction::Conditional {
                    comparison,
                    pointer: operand.pointer,
                    size: operand.size,
                    address: operand.address,
                    value: operand.value,
                    upper,
                },
                None => return Err(DisassemblerError::UnknownOpcode(byte)),
            }
        }

        // ========== Timer ==========
        Opcode::AddTimeDependence => {
            cursor.skip(3)?;
            Instruction::AddTimeDependence { delay: cursor.read_u32()? }
        }
        Opcode::ResetTimer => {
            cursor.skip(CODE_LINE_BYTES - 1)?;
            Instruction::ResetTimer
        }

        // ========== Registers ==========
        Opcode::LoadInteger | Opcode::StoreInteger | Opcode::LoadFloat | Opcode::StoreFloat => {
            let op = decode_operand(&mut cursor, opcode)?;
            let register = Register::from_byte(low_byte(op.field))?;
            match opcode {
                Opcode::LoadInteger => Instruction::LoadInteger {
                    pointer: op.pointer,
                    size: op.size,
                    register,
                    address: op.address,
                },
                Opcode::StoreInteger => Instruction::StoreInteger {
                    pointer: op.pointer,
                    size: op.size,
                    register,
                    address: op.address,
                },
                Opcode::LoadFloat => Instruction::LoadFloat {
                    pointer: op.pointer,
                    register,
                    address: op.address,
                },
                _ => Instruction::StoreFloat {
                    pointer: op.pointer,
                    register,
                    address: op.address,
                },
            }
        }
        Opcode::IntegerOperation => {
            let op = decode_operand(&mut cursor, opcode)?;
            let operation = IntegerOperation::from_u8(op.mode)?;
            Instruction::IntegerOperation {
                arithmetic: operation.arithmetic,
                destination: Register::from_byte(high_byte(op.field))?,
                source: arithmetic_source(operation.direct, &op)?,
            }
        }
        Opcode::FloatOperation => {
            let op = decode_operand(&mut cursor, opcode)?;
            match FloatOperation::from_u8(op.mode)? {
                FloatOperation::ToInteger => Instruction::FloatToInteger {
                    source: Register::from_byte(high_byte(op.field))?,
                    destination: Register::from_byte(low_byte(op.field))?,
                },
                FloatOperation::Arithmetic { arithmetic, direct } => Instruction::FloatOperation {
                    arithmetic,
                    destination: Register::from_byte(high_byte(op.field))?,
                    source: arithmetic_source(direct, &op)?,
                },
            }
        }

        // ========== Pointer ==========
        Opcode::LoadPointer => {
            let op = decode_operand(&mut cursor, opcode)?;
            let upper = cursor.read_u32()?;
            Instruction::LoadPointer {
                pointer: op.pointer,
                address: op.address,
                lower: op.value,
                upper,
            }
        }
        Opcode::AddOffsetToPointer => {
            cursor.skip(3)?;
            Instruction::AddOffsetToPointer { offset: cursor.read_u32()? as i32 }
        }
        Opcode::LoadPointerDirectly => {
            cursor.skip(3)?;
            Instruction::LoadPointerDirectly { address: cursor.read_u32()? }
        }

        // ========== Raw Execution ==========
        Opcode::ExecuteAssembly => {
            cursor.skip(1)?;
            let lines = cursor.read_u16()? as usize;
            cursor.skip(4)?;
            let code = cursor.read_bytes(lines * CODE_LINE_BYTES)?;
            Instruction::ExecuteAssembly { code }
        }
        Opcode::PerformSystemCall => {
            cursor.skip(1)?;
            let code = cursor.read_u16()?;
            cursor.skip(4)?;
            Instruction::PerformSystemCall { code }
        }

        // ========== Stream Control ==========
        Opcode::Terminator | Opcode::NoOperation | Opcode::TimerTermination => {
            cursor.skip(CODE_LINE_BYTES - 1)?;
            match opcode {
                Opcode::Terminator => Instruction::Terminator,
                Opcode::NoOperation => Instruction::NoOperation,
                _ => Instruction::TimerTermination,
            }
        }

        // ========== Scan / Patch ==========
        Opcode::Corrupter => {
            cursor.skip(3)?;
            let start = cursor.read_u32()?;
            let end = cursor.read_u32()?;
            let search = cursor.read_u32()?;
            let replacement = cursor.read_u32()?;
            cursor.skip(4)?;
            Instruction::Corrupter { start, end, search, replacement }
        }
        Opcode::SearchTemplate => {
            let length = cursor.read_u8()? as usize;
            let target_index = cursor.read_u16()?;
            let start_high = cursor.read_u16()?;
            let end_high = cursor.read_u16()?;
            let template = read_padded(&mut cursor, length)?;
            Instruction::SearchTemplate { template, target_index, start_high, end_high }
        }
        Opcode::ProcedureCall => decode_procedure_call(&mut cursor)?,

        // every conditional is matched by the guard above
        _ => return Err(DisassemblerError::UnknownOpcode(byte)),
    };

    Ok((instruction, cursor.position()))
}

/// Decode the common operand fields of a regular code line.
///
/// The cursor must sit right after the opcode byte.
pub fn decode_operand(cursor: &mut StreamCursor<'_>, opcode: Opcode) -> Result<Operand> {
    let mode = cursor.read_u8()?;
    let field = cursor.read_u16()?;
    let word = cursor.read_u32()?;

    let (pointer, size, length, address, value) = match opcode {
        Opcode::IntegerOperation | Opcode::FloatOperation => {
            (PointerMode::NoPointer, ValueSize::Bits32, 4, 0, word)
        }
        Opcode::StringWrite => {
            let pointer = PointerMode::from_nibble(upper_nibble(mode))?;
            (pointer, ValueSize::Bits8, field as usize, word, 0)
        }
        _ => {
            let pointer = PointerMode::from_nibble(upper_nibble(mode))?;
            let size = ValueSize::from_nibble(lower_nibble(mode))?;
            let value = match opcode.fixed_length() {
                Some(length) if length > CODE_LINE_BYTES => cursor.read_u32()?,
                _ => 0,
            };
            (pointer, size, size.bytes(), word, value)
        }
    };

    Ok(Operand { mode, pointer, size, address, value, length, field })
}

/// Decode a 16-byte conditional: regular operand plus the upper bound in the
/// last word.
pub fn decode_conditional(cursor: &mut StreamCursor<'_>) -> Result<(Operand, u32)> {
    let operand = decode_operand(cursor, Opcode::IfNotEqual)?;
    let upper = cursor.read_u32()?;
    Ok((operand, upper))
}

fn decode_procedure_call<'a>(cursor: &mut StreamCursor<'a>) -> Result<Instruction<'a>> {
    let low = Register::from_byte(cursor.read_u8()?)?;
    let high = Register::from_byte(cursor.read_u8()?)?;
    let count = cursor.read_u8()?;
    if count as usize > MAX_CALL_ARGUMENTS {
        return Err(codehandler_spec::CodeError::TooManyArguments(count).into());
    }
    let address = cursor.read_u32()?;

    let mut arguments = [0u32; MAX_CALL_ARGUMENTS];
    for slot in arguments.iter_mut().take(count as usize) {
        *slot = cursor.read_u32()?;
    }
    if count % 2 == 1 {
        cursor.skip(4)?;
    }

    Ok(Instruction::ProcedureCall { address, low, high, arguments, argument_count: count })
}

/// Read a payload padded with zeros to the next line boundary.
///
/// A payload that already fills whole lines carries no padding. Streams
/// produced by older tooling that always appended an extra line in that case
/// are out of sync after such a payload.
fn read_padded<'a>(cursor: &mut StreamCursor<'a>, length: usize) -> Result<&'a [u8]> {
    let bytes = cursor.read_bytes(length)?;
    cursor.skip(round_up_to_line(length) - length)?;
    Ok(bytes)
}

fn arithmetic_source(direct: bool, op: &Operand) -> Result<ArithmeticSource> {
    if direct {
        Ok(ArithmeticSource::Value(op.value))
    } else {
        Ok(ArithmeticSource::Register(Register::from_byte(low_byte(op.field))?))
    }
}

#[inline]
fn high_byte(field: u16) -> u8 {
    (field >> 8) as u8
}

#[inline]
fn low_byte(field: u16) -> u8 {
    (field & 0xFF) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use codehandler_spec::{Arithmetic, CodeError, Comparison, TERMINATOR_LINE};

    #[test]
    fn test_decode_ram_write() {
        let stream = [
            0x00, 0x02, 0x00, 0x00, 0x80, 0x00, 0x10, 0x00,
            0x00, 0x00, 0x00, 0xAA, 0x00, 0x00, 0x00, 0x00,
        ];
        let (instr, consumed) = decode(&stream).unwrap();
        assert_eq!(consumed, 16);
        assert_eq!(
            instr,
            Instruction::RamWrite {
                pointer: PointerMode::NoPointer,
                size: ValueSize::Bits32,
                address: 0x8000_1000,
                value: 0xAA,
            }
        );
    }

    #[test]
    fn test_decode_terminator() {
        let (instr, consumed) = decode(&TERMINATOR_LINE).unwrap();
        assert_eq!(instr, Instruction::Terminator);
        assert_eq!(consumed, 8);
    }

    #[test]
    fn test_decode_conditional_reads_upper_bound_last() {
        let stream = [
            0x0B, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x08,
            0x00, 0x00, 0x00, 0x0A, 0x00, 0x00, 0x00, 0x14,
        ];
        let (instr, consumed) = decode(&stream).unwrap();
        assert_eq!(consumed, 16);
        assert_eq!(
            instr,
            Instruction::Conditional {
                comparison: Comparison::Between,
                pointer: PointerMode::Pointer,
                size: ValueSize::Bits8,
                address: 8,
                value: 10,
                upper: 20,
            }
        );
    }

    #[test]
    fn test_decode_string_write_padding() {
        let stream = [
            0x01, 0x00, 0x00, 0x03, 0x80, 0x00, 0x00, 0x00,
            b'a', b'b', b'c', 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        let (instr, consumed) = decode(&stream).unwrap();
        assert_eq!(consumed, 16);
        match instr {
            Instruction::StringWrite { bytes, address, .. } => {
                assert_eq!(bytes, b"abc");
                assert_eq!(address, 0x8000_0000);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decode_line_sized_string_has_no_padding() {
        let stream = [
            0x01, 0x00, 0x00, 0x08, 0x80, 0x00, 0x00, 0x00,
            b'a', b'b', b'c', b'd', b'e', b'f', b'g', b'h',
            0xD0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        let (instr, consumed) = decode(&stream).unwrap();
        assert_eq!(consumed, 16);
        assert_eq!(instr.encoded_length(), 16);
    }

    #[test]
    fn test_decode_integer_operation_tables() {
        // direct sub-op 6 divides
        let stream = [0x14, 0x06, 0x02, 0x00, 0x00, 0x00, 0x00, 0x04];
        let (instr, _) = decode(&stream).unwrap();
        assert_eq!(
            instr,
            Instruction::IntegerOperation {
                arithmetic: Arithmetic::Divide,
                destination: Register::R2,
                source: ArithmeticSource::Value(4),
            }
        );

        // register sub-op 2 multiplies r2 by r5
        let stream = [0x14, 0x02, 0x02, 0x05, 0x00, 0x00, 0x00, 0x00];
        let (instr, _) = decode(&stream).unwrap();
        assert_eq!(
            instr,
            Instruction::IntegerOperation {
                arithmetic: Arithmetic::Multiply,
                destination: Register::R2,
                source: ArithmeticSource::Register(Register::R5),
            }
        );
    }

    #[test]
    fn test_decode_float_to_integer() {
        let stream = [0x15, 0x08, 0x03, 0x01, 0x00, 0x00, 0x00, 0x00];
        let (instr, _) = decode(&stream).unwrap();
        assert_eq!(
            instr,
            Instruction::FloatToInteger { source: Register::R3, destination: Register::R1 }
        );
    }

    #[test]
    fn test_decode_procedure_call_odd_count_padding() {
        let mut stream = vec![0xF8, 0x00, 0x01, 0x03, 0x80, 0x00, 0x20, 0x00];
        for arg in [1u32, 2, 3] {
            stream.extend_from_slice(&arg.to_be_bytes());
        }
        stream.extend_from_slice(&[0; 4]);
        let (instr, consumed) = decode(&stream).unwrap();
        assert_eq!(consumed, 24);
        assert_eq!(instr.call_arguments(), &[1, 2, 3]);
    }

    #[test]
    fn test_decode_procedure_call_rejects_bad_fields() {
        let too_many = [0xF8, 0x00, 0x01, 0x09, 0x80, 0x00, 0x20, 0x00];
        assert_eq!(
            decode(&too_many).unwrap_err(),
            DisassemblerError::Malformed(CodeError::TooManyArguments(9))
        );

        let bad_register = [0xF8, 0x08, 0x01, 0x00, 0x80, 0x00, 0x20, 0x00];
        assert_eq!(
            decode(&bad_register).unwrap_err(),
            DisassemblerError::Malformed(CodeError::InvalidRegister(8))
        );
    }

    #[test]
    fn test_decode_search_template_header() {
        let stream = [
            0xF6, 0x04, 0x00, 0x01, 0x80, 0x00, 0x81, 0x00,
            0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x00, 0x00, 0x00,
        ];
        let (instr, consumed) = decode(&stream).unwrap();
        assert_eq!(consumed, 16);
        assert_eq!(
            instr,
            Instruction::SearchTemplate {
                template: &[0xDE, 0xAD, 0xBE, 0xEF],
                target_index: 1,
                start_high: 0x8000,
                end_high: 0x8100,
            }
        );
    }

    #[test]
    fn test_decode_invalid_fields() {
        assert_eq!(
            decode(&[0xFF, 0, 0, 0, 0, 0, 0, 0]).unwrap_err(),
            DisassemblerError::UnknownOpcode(0xFF)
        );

        let bad_size = [0x00, 0x03, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(
            decode(&bad_size).unwrap_err(),
            DisassemblerError::Malformed(CodeError::InvalidValueSize(3))
        );

        let bad_pointer = [0x00, 0x20, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(
            decode(&bad_pointer).unwrap_err(),
            DisassemblerError::Malformed(CodeError::InvalidPointerMode(2))
        );

        let bad_sub_op = [0x14, 0x09, 0, 0, 0, 0, 0, 0];
        assert_eq!(
            decode(&bad_sub_op).unwrap_err(),
            DisassemblerError::Malformed(CodeError::InvalidIntegerOperation(9))
        );
    }

    #[test]
    fn test_decode_truncated() {
        let err = decode(&[0x00, 0x02, 0x00, 0x00, 0x80, 0x00, 0x10, 0x00]).unwrap_err();
        assert!(matches!(
            err,
            DisassemblerError::Malformed(CodeError::Truncated { position: 8, wanted: 4, .. })
        ));
        assert!(decode(&[]).is_err());
    }
}
