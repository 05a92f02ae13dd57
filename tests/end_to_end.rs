//! End-to-end integration tests for the code handler toolchain
//!
//! These tests verify the complete workflow:
//! 1. Assemble instructions into a code stream
//! 2. Run the stream for one or more passes against simulated memory
//! 3. Verify memory, registers and the (possibly rewritten) stream
//! 4. Disassemble the stream

use codehandler_assembler::{assemble, ram_write};
use codehandler_disassembler::disassemble;
use codehandler_runtime::{CodeBuffer, Host, Interpreter, InterpreterConfig, SimulatedMemory};
use codehandler_spec::{
    Arithmetic, ArithmeticSource, Comparison, Instruction, PointerMode, Register, ValueSize,
};

fn code(instructions: &[Instruction<'_>]) -> CodeBuffer {
    CodeBuffer::new(assemble(instructions).expect("Assembly failed"))
}

// ============================================================================
// Typical Codes
// ============================================================================

#[test]
fn test_infinite_health_code() {
    // Player struct pointer at 0x80400000, health at +0x1C (u16)
    let mut memory = SimulatedMemory::new();
    memory.load(0x8040_0000, &[0x81, 0x20, 0x00, 0x00]);
    memory.load(0x8120_001C, &[0x00, 0x03]);

    let mut stream = code(&[
        Instruction::LoadInteger {
            pointer: PointerMode::NoPointer,
            size: ValueSize::Bits32,
            register: Register::R0,
            address: 0x8040_0000,
        },
        Instruction::StoreInteger {
            pointer: PointerMode::NoPointer,
            size: ValueSize::Bits32,
            register: Register::R0,
            address: 0x8000_0F00,
        },
        Instruction::LoadPointer {
            pointer: PointerMode::NoPointer,
            address: 0x8000_0F00,
            lower: 0x8000_0000,
            upper: 0x817F_FFFF,
        },
        Instruction::AddOffsetToPointer { offset: 0 },
        Instruction::Terminator,
        Instruction::LoadPointerDirectly { address: 0x8120_0000 },
        Instruction::RamWrite {
            pointer: PointerMode::Pointer,
            size: ValueSize::Bits16,
            address: 0x1C,
            value: 0x0063,
        },
        Instruction::Terminator,
    ]);

    let mut vm = Interpreter::new(memory, InterpreterConfig::default());
    for _ in 0..3 {
        vm.run(&mut stream).expect("Execution failed");
        assert_eq!(vm.host().read_u16(0x8120_001C), 0x0063);
    }
    assert_eq!(vm.state().execution_count, 3);
}

#[test]
fn test_button_activated_code() {
    // Button mask at 0x80001000; holding 0x0010 writes the moon-jump value
    let mut stream = code(&[
        Instruction::Conditional {
            comparison: Comparison::And,
            pointer: PointerMode::NoPointer,
            size: ValueSize::Bits16,
            address: 0x8000_1000,
            value: 0x0010,
            upper: 0,
        },
        Instruction::RamWrite {
            pointer: PointerMode::NoPointer,
            size: ValueSize::Bits32,
            address: 0x8050_0000,
            value: 0x4120_0000,
        },
        Instruction::Terminator,
    ]);

    let mut vm = Interpreter::new(SimulatedMemory::new(), InterpreterConfig::default());
    vm.run(&mut stream).expect("Execution failed");
    assert_eq!(vm.host().read_u32(0x8050_0000), 0);

    vm.host_mut().write_u16(0x8000_1000, 0x0030);
    vm.run(&mut stream).expect("Execution failed");
    assert_eq!(vm.host().read_u32(0x8050_0000), 0x4120_0000);
}

#[test]
fn test_register_arithmetic_code() {
    // Double the coin counter every pass, capped by a less-than check
    let mut memory = SimulatedMemory::new();
    memory.load(0x8000_2000, &[0x00, 0x00, 0x00, 0x05]);

    let mut stream = code(&[
        Instruction::Conditional {
            comparison: Comparison::Less,
            pointer: PointerMode::NoPointer,
            size: ValueSize::Bits32,
            address: 0x8000_2000,
            value: 100,
            upper: 0,
        },
        Instruction::LoadInteger {
            pointer: PointerMode::NoPointer,
            size: ValueSize::Bits32,
            register: Register::R1,
            address: 0x8000_2000,
        },
        Instruction::IntegerOperation {
            arithmetic: Arithmetic::Multiply,
            destination: Register::R1,
            source: ArithmeticSource::Value(2),
        },
        Instruction::StoreInteger {
            pointer: PointerMode::NoPointer,
            size: ValueSize::Bits32,
            register: Register::R1,
            address: 0x8000_2000,
        },
        Instruction::Terminator,
    ]);

    let mut vm = Interpreter::new(memory, InterpreterConfig::default());
    vm.run_passes(&mut stream, 6).expect("Execution failed");

    // 5, 10, 20, 40, 80, 160, then the condition stops it
    assert_eq!(vm.host().read_u32(0x8000_2000), 160);
}

#[test]
fn test_float_code() {
    let mut memory = SimulatedMemory::new();
    memory.load(0x8000_3000, &1.25f32.to_be_bytes());

    let mut stream = code(&[
        Instruction::LoadFloat { pointer: PointerMode::NoPointer, register: Register::R0, address: 0x8000_3000 },
        Instruction::FloatOperation {
            arithmetic: Arithmetic::Multiply,
            destination: Register::R0,
            source: ArithmeticSource::Value(4.0f32.to_bits()),
        },
        Instruction::StoreFloat { pointer: PointerMode::NoPointer, register: Register::R0, address: 0x8000_3004 },
        Instruction::FloatToInteger { source: Register::R0, destination: Register::R5 },
    ]);

    let mut vm = Interpreter::new(memory, InterpreterConfig::default());
    vm.run(&mut stream).expect("Execution failed");

    assert_eq!(vm.host().bytes(0x8000_3004, 4), 5.0f32.to_be_bytes().to_vec());
    assert_eq!(vm.state().registers.read_integer(Register::R5), 5);
}

// ============================================================================
// Self-Modifying Streams
// ============================================================================

#[test]
fn test_search_then_patch_then_disassemble() {
    // blr; li r3, 1 inside a function we want to patch
    let signature = [0x4E, 0x80, 0x00, 0x20, 0x38, 0x60, 0x00, 0x01];
    let mut memory = SimulatedMemory::new();
    memory.load(0x8030_0040, &signature);

    let mut stream = code(&[
        Instruction::SearchTemplate {
            template: &signature,
            target_index: 0,
            start_high: 0x8030,
            end_high: 0x8031,
        },
        Instruction::RamWrite {
            pointer: PointerMode::Pointer,
            size: ValueSize::Bits32,
            address: 4,
            value: 0x3860_0000,
        },
        Instruction::Terminator,
    ]);
    assert_eq!(stream.len(), 16 + 16 + 8);

    let mut vm = Interpreter::new(memory, InterpreterConfig::default());
    vm.run(&mut stream).expect("Execution failed");

    assert_eq!(stream.len(), 8 + 16 + 8);
    assert_eq!(vm.host().read_u32(0x8030_0044), 0x3860_0000);

    let listing = disassemble(stream.as_slice()).expect("Disassembly failed");
    assert!(listing.contains("setptr 0x80300040"));
    assert!(listing.contains("write.u32 [ptr+0x4], 0x38600000"));

    // the patched memory no longer matches, the cached pointer still applies
    vm.run(&mut stream).expect("Execution failed");
    assert_eq!(vm.state().execution_count, 2);
}

// ============================================================================
// Dry Run
// ============================================================================

#[test]
fn test_dry_run_matches_live_control_flow() {
    let instructions = [
        Instruction::Conditional {
            comparison: Comparison::Equal,
            pointer: PointerMode::NoPointer,
            size: ValueSize::Bits32,
            address: 0x8000_0000,
            value: 0x4321_9876,
            upper: 0,
        },
        Instruction::NoOperation,
        Instruction::Terminator,
    ];

    let mut memory = SimulatedMemory::new();
    memory.load(0x8000_0000, &[0x43, 0x21, 0x98, 0x76]);
    let mut live = Interpreter::new(memory, InterpreterConfig::default());
    let mut dry = Interpreter::new(SimulatedMemory::new(), InterpreterConfig::dry_run());

    let live_summary = live.run(&mut code(&instructions)).expect("Execution failed");
    let dry_summary = dry.run(&mut code(&instructions)).expect("Execution failed");
    assert_eq!(live_summary, dry_summary);
}

#[test]
fn test_concatenated_ram_writes() {
    let mut bytes = ram_write(0x8000_0000, 1);
    bytes.extend(ram_write(0x8000_0004, 2));
    bytes.extend(ram_write(0x8000_0008, 3));

    let mut vm = Interpreter::new(SimulatedMemory::new(), InterpreterConfig::default());
    let summary = vm.run(&mut CodeBuffer::new(bytes)).expect("Execution failed");

    assert_eq!(summary.instructions, 3);
    assert_eq!(vm.host().bytes(0x8000_0000, 12), vec![0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3]);
}
