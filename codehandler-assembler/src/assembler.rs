//! Validated assembly of instruction sequences into a code stream

use codehandler_spec::{Instruction, CODE_LINE_BYTES, MAX_CALL_ARGUMENTS};

use crate::encoder::encode;
use crate::error::{AssemblerError, Result};

/// Encode a sequence of instructions into one stream.
///
/// Every payload must fit its length field; the output is always a whole
/// number of code lines.
pub fn assemble(instructions: &[Instruction<'_>]) -> Result<Vec<u8>> {
    let capacity = instructions.iter().map(|instr| instr.encoded_length()).sum();
    let mut stream = Vec::with_capacity(capacity);

    for (index, instr) in instructions.iter().enumerate() {
        validate(instr).map_err(|reason| AssemblerError::InvalidInstruction {
            index,
            opcode: instr.opcode(),
            reason: Box::new(reason),
        })?;
        stream.extend_from_slice(&encode(instr));
    }

    debug_assert_eq!(stream.len() % CODE_LINE_BYTES, 0);
    Ok(stream)
}

/// Check that an instruction's payloads fit their encoded fields
pub fn validate(instr: &Instruction<'_>) -> Result<()> {
    match instr {
        Instruction::StringWrite { bytes, .. } if bytes.len() > u16::MAX as usize => {
            Err(AssemblerError::StringTooLong(bytes.len()))
        }
        Instruction::SearchTemplate { template, .. } if template.len() > u8::MAX as usize => {
            Err(AssemblerError::TemplateTooLong(template.len()))
        }
        Instruction::ExecuteAssembly { code } => {
            if code.len() % CODE_LINE_BYTES != 0 {
                Err(AssemblerError::PartialCodeLine(code.len()))
            } else if code.len() / CODE_LINE_BYTES > u16::MAX as usize {
                Err(AssemblerError::CodeTooLong(code.len() / CODE_LINE_BYTES))
            } else {
                Ok(())
            }
        }
        Instruction::ProcedureCall { argument_count, .. }
            if *argument_count as usize > MAX_CALL_ARGUMENTS =>
        {
            Err(AssemblerError::TooManyArguments(*argument_count))
        }
        _ => Ok(()),
    }
}
