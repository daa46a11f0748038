//! Command-line configuration (§6 "Command-line surface"). The teacher's
//! `clap` dependency was carried but never wired up to an actual parser;
//! this is where it earns its keep.

use std::path::PathBuf;

use clap::Parser;

use crate::cpu::SimulationMode;

/// A decode-dispatch simulator for the 16-bit x86 (8086) instruction subset.
#[derive(Debug, Parser)]
#[command(name = "risc86", version, about)]
pub struct Config {
    /// Raw binary file containing a flat sequence of 8086 instruction bytes.
    pub input: PathBuf,

    /// Print disassembly instead of executing (default).
    #[arg(long, conflicts_with = "execute")]
    pub print: bool,

    /// Execute the program against a simulated machine instead of printing it.
    #[arg(long)]
    pub execute: bool,

    /// Write the post-run 1 MiB memory image to this path (§6 "Persisted state").
    #[arg(short = 'd', long, value_name = "PATH")]
    pub dump: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    pub fn mode(&self) -> SimulationMode {
        if self.execute {
            SimulationMode::Simulate
        } else {
            SimulationMode::Print
        }
    }
}
