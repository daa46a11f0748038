//! The optional post-run memory dump (§6 "Persisted state"), an external
//! collaborator per §1 — thin file I/O kept out of the simulator core.

use std::fs;
use std::path::Path;

use crate::cpu::Machine;

/// Writes the full 1 MiB memory image to `path`.
pub fn write_memory_image(path: &Path, machine: &Machine) -> std::io::Result<()> {
    fs::write(path, machine.memory.as_slice())
}
