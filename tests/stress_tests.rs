//! Stress tests for the code handler
//!
//! Tests with long streams, many passes, and edge cases.

use codehandler_assembler::assemble;
use codehandler_runtime::{CodeBuffer, Host, Interpreter, InterpreterConfig, SimulatedMemory};
use codehandler_spec::{
    Arithmetic, ArithmeticSource, Comparison, Instruction, PointerMode, Register, ValueSize,
};

fn interpreter() -> Interpreter<SimulatedMemory> {
    Interpreter::new(SimulatedMemory::new(), InterpreterConfig::default())
}

// ============================================================================
// Long Streams
// ============================================================================

#[test]
fn test_1000_ram_writes() {
    let instructions: Vec<Instruction<'_>> = (0..1000u32)
        .map(|i| Instruction::RamWrite {
            pointer: PointerMode::NoPointer,
            size: ValueSize::Bits32,
            address: 0x8000_0000 + i * 4,
            value: i,
        })
        .collect();
    let mut code = CodeBuffer::new(assemble(&instructions).unwrap());

    let mut vm = interpreter();
    let summary = vm.run(&mut code).unwrap();

    assert_eq!(summary.instructions, 1000);
    assert_eq!(vm.host().read_u32(0x8000_0000 + 999 * 4), 999);
}

#[test]
fn test_many_skipped_blocks() {
    let mut instructions = Vec::new();
    for i in 0..200u32 {
        instructions.push(Instruction::Conditional {
            comparison: Comparison::NotEqual,
            pointer: PointerMode::NoPointer,
            size: ValueSize::Bits32,
            address: 0x8000_0000,
            value: 0,
            upper: 0,
        });
        instructions.push(Instruction::RamWrite {
            pointer: PointerMode::NoPointer,
            size: ValueSize::Bits32,
            address: 0x8100_0000 + i * 4,
            value: 1,
        });
        instructions.push(Instruction::Terminator);
    }
    let mut code = CodeBuffer::new(assemble(&instructions).unwrap());

    let mut vm = interpreter();
    let summary = vm.run(&mut code).unwrap();

    assert_eq!(summary.skipped_blocks, 200);
    assert_eq!(summary.instructions, 400);
    assert_eq!(vm.host().write_count(), 0);
}

#[test]
fn test_large_string_write() {
    let payload: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
    let mut code = CodeBuffer::new(
        assemble(&[Instruction::StringWrite {
            pointer: PointerMode::NoPointer,
            address: 0x8000_0000,
            bytes: &payload,
        }])
        .unwrap(),
    );

    let mut vm = interpreter();
    vm.run(&mut code).unwrap();
    assert_eq!(vm.host().bytes(0x8000_0000, payload.len()), payload);
}

// ============================================================================
// Many Passes
// ============================================================================

#[test]
fn test_thousand_passes_with_timer() {
    let mut code = CodeBuffer::new(
        assemble(&[
            Instruction::AddTimeDependence { delay: 10 },
            Instruction::IntegerOperation {
                arithmetic: Arithmetic::Add,
                destination: Register::R0,
                source: ArithmeticSource::Value(1),
            },
            Instruction::ResetTimer,
            Instruction::IntegerOperation {
                arithmetic: Arithmetic::Add,
                destination: Register::R1,
                source: ArithmeticSource::Value(1),
            },
        ])
        .unwrap(),
    );

    let mut vm = interpreter();
    vm.run_passes(&mut code, 1000).unwrap();

    assert_eq!(vm.state().registers.read_integer(Register::R0), 100);
    assert_eq!(vm.state().registers.read_integer(Register::R1), 1000);
    assert_eq!(vm.state().execution_count, 1000);
}

// ============================================================================
// Edge Cases
// ============================================================================

#[test]
fn test_division_by_zero_does_not_stop_the_pass() {
    let mut code = CodeBuffer::new(
        assemble(&[
            Instruction::IntegerOperation {
                arithmetic: Arithmetic::Divide,
                destination: Register::R2,
                source: ArithmeticSource::Value(0),
            },
            Instruction::StoreInteger {
                pointer: PointerMode::NoPointer,
                size: ValueSize::Bits32,
                register: Register::R2,
                address: 0x8000_0000,
            },
        ])
        .unwrap(),
    );

    let mut vm = interpreter();
    vm.run(&mut code).unwrap();
    assert_eq!(vm.host().read_u32(0x8000_0000), u32::MAX);
}

#[test]
fn test_writes_wrap_at_top_of_address_space() {
    let mut code = CodeBuffer::new(
        assemble(&[
            Instruction::LoadPointerDirectly { address: 0xFFFF_FFFC },
            Instruction::RamWrite {
                pointer: PointerMode::Pointer,
                size: ValueSize::Bits32,
                address: 0x8,
                value: 0xABCD_EF01,
            },
        ])
        .unwrap(),
    );

    let mut vm = interpreter();
    vm.run(&mut code).unwrap();
    assert_eq!(vm.host().read_u32(0x4), 0xABCD_EF01);
}

#[test]
fn test_full_argument_call() {
    let arguments = [1, 2, 3, 4, 5, 6, 7, 8];
    let mut code = CodeBuffer::new(
        assemble(&[Instruction::ProcedureCall {
            address: 0x8000_1234,
            low: Register::R6,
            high: Register::R7,
            arguments,
            argument_count: 8,
        }])
        .unwrap(),
    );
    assert_eq!(code.len(), 8 + 32);

    let mut vm = interpreter();
    vm.run(&mut code).unwrap();
    assert_eq!(vm.host().foreign_calls()[0].arguments, arguments.to_vec());
}
