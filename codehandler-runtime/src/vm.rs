//! Interpreter for code handler streams

use codehandler_disassembler::{decode, format, format_line};
use codehandler_spec::CODE_LINE_BYTES;

use crate::buffer::CodeBuffer;
use crate::error::{Result, RuntimeError};
use crate::execute::{execute, Flow};
use crate::host::{Access, Host};
use crate::scanner::find_pattern;
use crate::search::rewrite_as_pointer_load;
use crate::state::VmState;

/// Interpreter configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Forward memory access and native calls to the host.
    ///
    /// When disabled the run is a dry run: control flow is identical but no
    /// side effect reaches the host, and the memory-derived VM state is put
    /// back when the pass ends.
    pub memory_access_enabled: bool,

    /// Word returned by every read during a dry run
    pub dry_run_read_value: u32,

    /// Result of every foreign call during a dry run
    pub dry_run_call_result: u64,

    /// Log the formatted listing of each executed instruction at `info`
    pub trace: bool,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            memory_access_enabled: true,
            dry_run_read_value: 0x4321_9876,
            dry_run_call_result: 0x1111_1111_2222_2222,
            trace: false,
        }
    }
}

impl InterpreterConfig {
    /// Configuration with memory access disabled
    pub fn dry_run() -> Self {
        Self {
            memory_access_enabled: false,
            ..Self::default()
        }
    }
}

/// Outcome of one completed pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    /// Instructions decoded and executed
    pub instructions: usize,

    /// Blocks skipped by a false condition or a closed timer gate
    pub skipped_blocks: usize,

    /// Stream length after the pass (search templates shrink it)
    pub stream_length: usize,

    /// Execution counter after the pass
    pub execution_count: u32,
}

/// Code handler interpreter
///
/// Owns its VM state and its host; the state persists across passes.
pub struct Interpreter<H: Host> {
    state: VmState,
    host: H,
    config: InterpreterConfig,
}

impl<H: Host> Interpreter<H> {
    /// Create an interpreter with freshly initialized state
    pub fn new(host: H, config: InterpreterConfig) -> Self {
        Self::with_state(host, config, VmState::new())
    }

    /// Create an interpreter resuming from a saved state
    pub fn with_state(host: H, config: InterpreterConfig, state: VmState) -> Self {
        Self { state, host, config }
    }

    pub fn state(&self) -> &VmState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut VmState {
        &mut self.state
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Re-initialize the whole state, execution counter included
    pub fn reset(&mut self) {
        self.state = VmState::new();
    }

    /// Run one pass over `code`.
    ///
    /// The buffer may be rewritten in place by search-template instructions.
    /// On a fatal error the pass stops, the execution counter is not advanced
    /// and the error is logged once.
    ///
    /// A dry run leaves registers, loaded pointer and condition flag as they
    /// were before the pass; only the timer and the execution counter move.
    pub fn run(&mut self, code: &mut CodeBuffer) -> Result<PassSummary> {
        let saved = (!self.config.memory_access_enabled).then(|| self.state.clone());
        let outcome = self.run_pass(code);
        if let Some(saved) = saved {
            self.state.discard_memory_derived(&saved);
        }
        outcome
    }

    fn run_pass(&mut self, code: &mut CodeBuffer) -> Result<PassSummary> {
        self.state.begin_pass();
        tracing::debug!(
            length = code.len(),
            execution_count = self.state.execution_count,
            "pass started"
        );

        let mut summary = PassSummary {
            instructions: 0,
            skipped_blocks: 0,
            stream_length: code.len(),
            execution_count: self.state.execution_count,
        };

        let mut position = 0;
        if let Err(err) = self.dispatch(code, &mut position, &mut summary) {
            let position = err.position().unwrap_or(position);
            let line = code.as_slice().get(position..).unwrap_or_default();
            let line = &line[..line.len().min(CODE_LINE_BYTES)];
            tracing::error!(
                position = format_args!("{:#x}", position),
                line = %format_line(line),
                "{}",
                err
            );
            return Err(err);
        }

        self.state.finish_pass();
        summary.stream_length = code.len();
        summary.execution_count = self.state.execution_count;
        tracing::debug!(
            instructions = summary.instructions,
            skipped_blocks = summary.skipped_blocks,
            execution_count = summary.execution_count,
            "pass completed"
        );
        Ok(summary)
    }

    /// Run `passes` consecutive passes, stopping at the first fatal error
    pub fn run_passes(&mut self, code: &mut CodeBuffer, passes: usize) -> Result<Vec<PassSummary>> {
        (0..passes).map(|_| self.run(code)).collect()
    }

    fn dispatch(&mut self, code: &mut CodeBuffer, position: &mut usize, summary: &mut PassSummary) -> Result<()> {
        let mut access = Access::new(&mut self.host, &self.config);

        loop {
            let length = code.len();
            if *position > length {
                return Err(RuntimeError::NegativeLength { position: *position, length });
            }
            let remaining = length - *position;
            if remaining % CODE_LINE_BYTES != 0 {
                return Err(RuntimeError::MisalignedLength { position: *position, remaining });
            }
            if remaining == 0 {
                return Ok(());
            }

            let start = *position;
            let (instr, consumed) = decode(&code.as_slice()[start..])
                .map_err(|source| RuntimeError::Decode { position: start, source })?;

            if self.config.trace {
                tracing::info!("{:06X}: {}", start, format(&instr));
            } else {
                tracing::debug!(position = start, opcode = %instr.opcode(), ?instr, "execute");
            }

            let flow = execute(&instr, &mut self.state, &mut access);
            summary.instructions += 1;
            *position = start + consumed;

            match flow {
                Flow::Next => {}
                Flow::SkipTo(end) => {
                    let tail = &code.as_slice()[*position..];
                    let offset = find_pattern(tail, end.line(), tail.len())
                        .ok_or(RuntimeError::UnterminatedBlock { position: start, end })?;
                    tracing::debug!(from = *position, to = *position + offset, %end, "block skipped");
                    *position += offset;
                    summary.skipped_blocks += 1;
                }
                Flow::Rewrite { address } => {
                    rewrite_as_pointer_load(code, start, consumed, address);
                    tracing::debug!(
                        position = start,
                        address = format_args!("{:#010x}", address),
                        removed = consumed - CODE_LINE_BYTES,
                        "search template rewritten"
                    );
                    // The rewritten line loads the pointer on this pass too
                    *position = start;
                }
            }
        }
    }
}
