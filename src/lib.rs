//! A decode-dispatch simulator for the 16-bit x86 (8086) instruction subset
//! (§1 "Purpose & Scope"). The core lives in [`cpu`]; [`config`], [`dump`]
//! and [`error`] are the ambient stack around it.

pub mod config;
pub mod cpu;
pub mod dump;
pub mod error;

use std::io::Write;

use cpu::{Machine, SimulationMode};
use error::SimError;

/// Loads `program` into a fresh [`Machine`] and runs the decode-dispatch
/// loop to completion (§1, §5). The single entry point `main` and the
/// integration tests both go through this.
pub fn run_program(program: &[u8], mode: SimulationMode, out: &mut dyn Write) -> Result<Machine, SimError> {
    let mut machine = Machine::new();
    machine.memory.load_program(program)?;
    cpu::decode::run(&mut machine, mode, out)?;
    Ok(machine)
}
