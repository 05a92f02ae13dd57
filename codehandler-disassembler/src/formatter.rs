//! Instruction formatting to listing text

use codehandler_spec::{ArithmeticSource, Comparison, Instruction, PointerMode, CODE_LINE_BYTES};

/// Format instruction as listing text
pub fn format(instr: &Instruction<'_>) -> String {
    let op = instr.opcode();
    match instr {
        // ========== Memory Write ==========
        Instruction::RamWrite { pointer, size, address, value } => {
            format!("{}.{} {}, {:#x}", op, size, format_target(*pointer, *address), value)
        }
        Instruction::StringWrite { pointer, address, bytes } => {
            format!(
                "{} {}, \"{}\"",
                op,
                format_target(*pointer, *address),
                bytes.escape_ascii()
            )
        }
        Instruction::SkipWrite { pointer, size, address, value, iterations, step, increment } => {
            format!(
                "{}.{} {}, {:#x}, count={}, step={:#x}, inc={:#x}",
                op,
                size,
                format_target(*pointer, *address),
                value,
                iterations,
                step,
                increment
            )
        }
        Instruction::FillMemoryArea { pointer, address, value, length } => {
            format!("{} {}, {:#x}, len={:#x}", op, format_target(*pointer, *address), value, length)
        }

        // ========== Conditional ==========
        Instruction::Conditional { comparison, pointer, size, address, value, upper } => {
            let target = format_target(*pointer, *address);
            match comparison {
                Comparison::Between => {
                    format!("{}.{} {}, {:#x}, {:#x}", op, size, target, value, upper)
                }
                _ => format!("{}.{} {}, {:#x}", op, size, target, value),
            }
        }

        // ========== Timer ==========
        Instruction::AddTimeDependence { delay } => format!("{} {}", op, delay),
        Instruction::ResetTimer => op.to_string(),

        // ========== Registers ==========
        Instruction::LoadInteger { pointer, size, register, address }
        | Instruction::StoreInteger { pointer, size, register, address } => {
            format!("{}.{} {}, {}", op, size, register, format_target(*pointer, *address))
        }
        Instruction::LoadFloat { pointer, register, address }
        | Instruction::StoreFloat { pointer, register, address } => {
            format!("{} f{}, {}", op, register.index(), format_target(*pointer, *address))
        }
        Instruction::IntegerOperation { arithmetic, destination, source } => {
            let source = match source {
                ArithmeticSource::Register(reg) => reg.to_string(),
                ArithmeticSource::Value(value) => format!("{:#x}", value),
            };
            format!("{}.{} {}, {}", op, arithmetic, destination, source)
        }
        Instruction::FloatOperation { arithmetic, destination, source } => {
            let source = match source {
                ArithmeticSource::Register(reg) => format!("f{}", reg.index()),
                ArithmeticSource::Value(bits) => format!("{}", f32::from_bits(*bits)),
            };
            format!("{}.{} f{}, {}", op, arithmetic, destination.index(), source)
        }
        Instruction::FloatToInteger { source, destination } => {
            format!("{}.toint {}, f{}", op, destination, source.index())
        }

        // ========== Pointer ==========
        Instruction::LoadPointer { pointer, address, lower, upper } => {
            format!(
                "{} {}, {:#x}..={:#x}",
                op,
                format_target(*pointer, *address),
                lower,
                upper
            )
        }
        Instruction::AddOffsetToPointer { offset } => format!("{} {}", op, offset),
        Instruction::LoadPointerDirectly { address } => format!("{} {:#010x}", op, address),

        // ========== Raw Execution ==========
        Instruction::ExecuteAssembly { code } => {
            format!("{} {} lines", op, code.len() / CODE_LINE_BYTES)
        }
        Instruction::PerformSystemCall { code } => format!("{} {:#x}", op, code),

        // ========== Stream Control ==========
        Instruction::Terminator | Instruction::NoOperation | Instruction::TimerTermination => {
            op.to_string()
        }

        // ========== Scan / Patch ==========
        Instruction::Corrupter { start, end, search, replacement } => {
            format!(
                "{} [{:#010x}..{:#010x}], {:#x} -> {:#x}",
                op, start, end, search, replacement
            )
        }
        Instruction::SearchTemplate { template, target_index, start_high, end_high } => {
            format!(
                "{} [{:#06x}0000..{:#06x}0000], #{}, {}",
                op,
                start_high,
                end_high,
                target_index,
                format_hex(template)
            )
        }
        Instruction::ProcedureCall { address, low, high, .. } => {
            let args: Vec<String> = instr
                .call_arguments()
                .iter()
                .map(|arg| format!("{:#x}", arg))
                .collect();
            format!("{} {}:{}, {:#010x}({})", op, high, low, address, args.join(", "))
        }
    }
}

/// Format an address operand, pointer-relative addresses as `[ptr+offset]`
pub fn format_target(pointer: PointerMode, address: u32) -> String {
    match pointer {
        PointerMode::NoPointer => format!("[{:#010x}]", address),
        PointerMode::Pointer => format!("[ptr+{:#x}]", address),
    }
}

/// Format bytes as contiguous upper-case hex
pub fn format_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

/// Format a code line as two space-separated hex words
pub fn format_line(line: &[u8]) -> String {
    let split = line.len().min(CODE_LINE_BYTES / 2);
    let (first, second) = line.split_at(split);
    if second.is_empty() {
        format_hex(first)
    } else {
        format!("{} {}", format_hex(first), format_hex(second))
    }
}
