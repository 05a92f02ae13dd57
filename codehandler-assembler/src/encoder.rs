//! Instruction encoding to code lines
//!
//! `encode` trusts its input: payload lengths that do not fit their fields
//! are truncated. Use [`crate::assemble`] for validated encoding.

use codehandler_spec::arithmetic::{FloatOperation, IntegerOperation};
use codehandler_spec::byte_order::{write_u16_be, write_u32_be};
use codehandler_spec::encoding::{mode_byte, round_up_to_line};
use codehandler_spec::{
    ArithmeticSource, Instruction, PointerMode, Register, ValueSize, CODE_LINE_BYTES,
    TERMINATOR_LINE,
};

/// Encode instruction to stream bytes
pub fn encode(instr: &Instruction<'_>) -> Vec<u8> {
    let op = instr.opcode().to_u8();
    let mut out = Vec::with_capacity(instr.encoded_length());

    match instr {
        // ========== Memory Write ==========
        Instruction::RamWrite { pointer, size, address, value } => {
            push_line(&mut out, op, mode_byte(*pointer, *size), 0, *address);
            push_words(&mut out, &[*value, 0]);
        }
        Instruction::StringWrite { pointer, address, bytes } => {
            let mode = mode_byte(*pointer, ValueSize::Bits8);
            push_line(&mut out, op, mode, bytes.len() as u16, *address);
            push_padded(&mut out, bytes);
        }
        Instruction::SkipWrite { pointer, size, address, value, iterations, step, increment } => {
            push_line(&mut out, op, mode_byte(*pointer, *size), *iterations, *address);
            push_words(&mut out, &[*value, *step, *increment, 0]);
        }
        Instruction::FillMemoryArea { pointer, address, value, length } => {
            push_line(&mut out, op, mode_byte(*pointer, ValueSize::Bits32), 0, *address);
            push_words(&mut out, &[*value, *length]);
        }

        // ========== Conditional ==========
        Instruction::Conditional { pointer, size, address, value, upper, .. } => {
            push_line(&mut out, op, mode_byte(*pointer, *size), 0, *address);
            push_words(&mut out, &[*value, *upper]);
        }

        // ========== Timer ==========
        Instruction::AddTimeDependence { delay } => push_line(&mut out, op, 0, 0, *delay),
        Instruction::ResetTimer => push_line(&mut out, op, 0, 0, 0),

        // ========== Registers ==========
        Instruction::LoadInteger { pointer, size, register, address }
        | Instruction::StoreInteger { pointer, size, register, address } => {
            let field = register.to_u8() as u16;
            push_line(&mut out, op, mode_byte(*pointer, *size), field, *address);
        }
        Instruction::LoadFloat { pointer, register, address }
        | Instruction::StoreFloat { pointer, register, address } => {
            let field = register.to_u8() as u16;
            push_line(&mut out, op, mode_byte(*pointer, ValueSize::Bits32), field, *address);
        }
        Instruction::IntegerOperation { arithmetic, destination, source } => {
            let sub = IntegerOperation { arithmetic: *arithmetic, direct: source.is_direct() };
            push_arithmetic(&mut out, op, sub.to_u8(), *destination, source);
        }
        Instruction::FloatOperation { arithmetic, destination, source } => {
            let sub = FloatOperation::Arithmetic {
                arithmetic: *arithmetic,
                direct: source.is_direct(),
            };
            push_arithmetic(&mut out, op, sub.to_u8(), *destination, source);
        }
        Instruction::FloatToInteger { source, destination } => {
            let field = register_pair(*source, *destination);
            push_line(&mut out, op, FloatOperation::TO_INTEGER, field, 0);
        }

        // ========== Pointer ==========
        Instruction::LoadPointer { pointer, address, lower, upper } => {
            push_line(&mut out, op, mode_byte(*pointer, ValueSize::Bits32), 0, *address);
            push_words(&mut out, &[*lower, *upper]);
        }
        Instruction::AddOffsetToPointer { offset } => push_line(&mut out, op, 0, 0, *offset as u32),
        Instruction::LoadPointerDirectly { address } => push_line(&mut out, op, 0, 0, *address),

        // ========== Raw Execution ==========
        Instruction::ExecuteAssembly { code } => {
            let lines = code.len().div_ceil(CODE_LINE_BYTES) as u16;
            push_line(&mut out, op, 0, lines, 0);
            push_padded(&mut out, code);
        }
        Instruction::PerformSystemCall { code } => push_line(&mut out, op, 0, *code, 0),

        // ========== Stream Control ==========
        Instruction::Terminator => out.extend_from_slice(&TERMINATOR_LINE),
        Instruction::NoOperation | Instruction::TimerTermination => push_line(&mut out, op, 0, 0, 0),

        // ========== Scan / Patch ==========
        Instruction::Corrupter { start, end, search, replacement } => {
            push_line(&mut out, op, 0, 0, *start);
            push_words(&mut out, &[*end, *search, *replacement, 0]);
        }
        Instruction::SearchTemplate { template, target_index, start_high, end_high } => {
            out.push(op);
            out.push(template.len() as u8);
            out.extend_from_slice(&write_u16_be(*target_index));
            out.extend_from_slice(&write_u16_be(*start_high));
            out.extend_from_slice(&write_u16_be(*end_high));
            push_padded(&mut out, template);
        }
        Instruction::ProcedureCall { address, low, high, .. } => {
            let arguments = instr.call_arguments();
            out.extend_from_slice(&[op, low.to_u8(), high.to_u8(), arguments.len() as u8]);
            out.extend_from_slice(&write_u32_be(*address));
            push_words(&mut out, arguments);
            if arguments.len() % 2 == 1 {
                push_words(&mut out, &[0]);
            }
        }
    }

    out
}

/// `[op][mode][field:16][word:32]`
fn push_line(out: &mut Vec<u8>, op: u8, mode: u8, field: u16, word: u32) {
    out.push(op);
    out.push(mode);
    out.extend_from_slice(&write_u16_be(field));
    out.extend_from_slice(&write_u32_be(word));
}

fn push_words(out: &mut Vec<u8>, words: &[u32]) {
    for word in words {
        out.extend_from_slice(&write_u32_be(*word));
    }
}

fn push_padded(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(bytes);
    out.resize(out.len() + round_up_to_line(bytes.len()) - bytes.len(), 0);
}

fn push_arithmetic(
    out: &mut Vec<u8>,
    op: u8,
    sub_opcode: u8,
    destination: Register,
    source: &ArithmeticSource,
) {
    match source {
        ArithmeticSource::Register(reg) => {
            push_line(out, op, sub_opcode, register_pair(destination, *reg), 0)
        }
        ArithmeticSource::Value(value) => {
            push_line(out, op, sub_opcode, register_pair(destination, Register::R0), *value)
        }
    }
}

#[inline]
fn register_pair(first: Register, second: Register) -> u16 {
    ((first.to_u8() as u16) << 8) | second.to_u8() as u16
}

/// Encode a 32-bit RAM write line pair, the most common code shape
pub fn ram_write(address: u32, value: u32) -> Vec<u8> {
    encode(&Instruction::RamWrite {
        pointer: PointerMode::NoPointer,
        size: ValueSize::Bits32,
        address,
        value,
    })
}
