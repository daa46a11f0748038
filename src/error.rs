use thiserror::Error;

use crate::cpu::types::{OpcodeKind, RegisterName};

/// Every terminal condition the simulator can hit (§7 "Error Handling
/// Design"). All variants are fatal: the decode-dispatch loop stops and the
/// binary exits with a nonzero code.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    #[error("unknown opcode 0b{0:06b} at offset {1:#06x}")]
    UnknownOpcode(u8, usize),

    #[error("operand form {0:?} is not implemented")]
    UnimplementedOperandForm(OpcodeKind),

    #[error("unexpected end of instruction stream at offset {0:#06x}")]
    UnexpectedEndOfStream(usize),

    #[error("memory index {0} is out of range (memory size is {1:#x})")]
    MemoryOutOfRange(i64, usize),

    #[error("read or write to unknown register {0:?}")]
    UnknownRegister(RegisterName),
}
