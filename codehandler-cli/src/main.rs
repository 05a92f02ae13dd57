//! Code handler command-line tool
//!
//! Usage:
//! - `codehandler run <file> [--passes N] [--dry-run] [--trace] [--state FILE]`
//! - `codehandler disasm <file>`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use codehandler_disassembler::disassemble;
use codehandler_runtime::{CodeBuffer, Interpreter, InterpreterConfig, SimulatedMemory, VmState};
use codehandler_spec::Register;

#[derive(Parser, Debug)]
#[command(name = "codehandler")]
#[command(about = "Run or disassemble binary code handler streams")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a code file against simulated memory
    Run {
        /// Raw code file (big-endian code lines)
        file: PathBuf,

        /// Number of passes over the stream
        #[arg(long, default_value = "1")]
        passes: usize,

        /// Disable memory access (reads return a sentinel, writes are dropped)
        #[arg(long)]
        dry_run: bool,

        /// Log every executed instruction
        #[arg(long)]
        trace: bool,

        /// Resume from and save the VM state to this file
        #[arg(long)]
        state: Option<PathBuf>,
    },

    /// Print the instruction listing of a code file
    Disasm {
        /// Raw code file (big-endian code lines)
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let trace = matches!(cli.command, Command::Run { trace: true, .. });
    let default_filter = if trace { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Command::Run { file, passes, dry_run, trace, state } => {
            run(&file, passes, dry_run, trace, state.as_deref())
        }
        Command::Disasm { file } => {
            let code = read_code(&file)?;
            let listing = disassemble(&code)
                .with_context(|| format!("Failed to disassemble '{}'", file.display()))?;
            print!("{}", listing);
            Ok(())
        }
    }
}

fn read_code(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Error reading file '{}'", path.display()))
}

fn load_state(path: &Path) -> Result<VmState> {
    if !path.exists() {
        return Ok(VmState::new());
    }
    let bytes = fs::read(path).with_context(|| format!("Error reading state '{}'", path.display()))?;
    VmState::from_bytes(&bytes).with_context(|| format!("Error decoding state '{}'", path.display()))
}

fn run(file: &Path, passes: usize, dry_run: bool, trace: bool, state_path: Option<&Path>) -> Result<()> {
    let mut code = CodeBuffer::new(read_code(file)?);
    info!("Loaded {} bytes from {}", code.len(), file.display());

    let mut config = if dry_run { InterpreterConfig::dry_run() } else { InterpreterConfig::default() };
    config.trace = trace;

    let state = match state_path {
        Some(path) => load_state(path)?,
        None => VmState::new(),
    };
    let mut vm = Interpreter::with_state(SimulatedMemory::new(), config, state);

    for pass in 0..passes {
        let summary = vm
            .run(&mut code)
            .with_context(|| format!("Pass {} of '{}' failed", pass, file.display()))?;
        info!(
            "Pass {}: {} instructions, {} skipped blocks, stream {} bytes",
            pass, summary.instructions, summary.skipped_blocks, summary.stream_length
        );
    }

    let state = vm.state();
    println!("execution count: {}", state.execution_count);
    println!("loaded pointer:  {:#010x}", state.loaded_pointer);
    for reg in Register::all() {
        println!(
            "{}: {:#010x}    f{}: {}",
            reg,
            state.registers.read_integer(reg),
            reg.index(),
            state.registers.read_float(reg)
        );
    }
    println!("bytes written:   {}", vm.host().write_count());

    if let Some(path) = state_path {
        let bytes = state.to_bytes().context("Error encoding state")?;
        fs::write(path, bytes).with_context(|| format!("Error writing state '{}'", path.display()))?;
        info!("Saved state to {}", path.display());
    }

    Ok(())
}
