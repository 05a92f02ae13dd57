//! Linear stream listing

use codehandler_spec::{Instruction, CODE_LINE_BYTES};

use crate::decoder::decode;
use crate::error::{DisassemblerError, Result};
use crate::formatter::{format, format_line};

/// Decode every instruction of a stream, in order, with its byte offset.
///
/// Follows the stream linearly; conditional skips are not taken.
pub fn instructions(stream: &[u8]) -> Result<Vec<(usize, Instruction<'_>)>> {
    if stream.len() % CODE_LINE_BYTES != 0 {
        return Err(DisassemblerError::PartialLine {
            position: stream.len() - stream.len() % CODE_LINE_BYTES,
            remaining: stream.len() % CODE_LINE_BYTES,
        });
    }

    let mut out = Vec::new();
    let mut position = 0;
    while position < stream.len() {
        let (instr, consumed) = decode(&stream[position..])?;
        out.push((position, instr));
        position += consumed;
    }
    Ok(out)
}

/// Disassemble a code stream into listing text.
///
/// Decoding stops at the first malformed instruction; the error is written
/// into the listing.
pub fn disassemble(stream: &[u8]) -> Result<String> {
    let mut output = String::new();

    output.push_str("; Code Handler Disassembly\n");
    output.push_str(&format!(
        "; Stream size: {} bytes ({} lines)\n",
        stream.len(),
        stream.len() / CODE_LINE_BYTES
    ));
    output.push('\n');

    let mut position = 0;
    let mut count = 0;

    while position < stream.len() {
        let line_end = (position + CODE_LINE_BYTES).min(stream.len());

        // Offset label
        output.push_str(&format!("0x{:04X}:  ", position));

        // First line of the instruction
        output.push_str(&format!("{:<17}  ", format_line(&stream[position..line_end])));

        match decode(&stream[position..]) {
            Ok((instr, consumed)) => {
                output.push_str(&format(&instr));
                output.push('\n');

                // Continuation lines
                let mut offset = position + CODE_LINE_BYTES;
                while offset < position + consumed {
                    let end = (offset + CODE_LINE_BYTES).min(stream.len());
                    output.push_str(&format!("0x{:04X}:  {}\n", offset, format_line(&stream[offset..end])));
                    offset += CODE_LINE_BYTES;
                }

                position += consumed;
                count += 1;
            }
            Err(e) => {
                output.push_str(&format!("; ERROR: {}\n", e));
                break;
            }
        }
    }

    output.push_str(&format!("; {} instructions\n", count));
    Ok(output)
}
