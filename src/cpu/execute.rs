//! Executors for each operand form (§4.5). Each function either writes a
//! single disassembly line (`SimulationMode::Print`) or mutates the machine
//! (`SimulationMode::Simulate`) — never both in the same call, matching the
//! `Mode` switch the source uses in every `Simulate*` function.

use std::io::Write;

use crate::cpu::machine::{Flags, Machine};
use crate::cpu::types::{EffectiveAddress, InstructionKind, RegisterName, SimulationMode};
use crate::cpu::{alu, operand, print};
use crate::error::SimError;

/// Where an immediate-form instruction's destination operand lives.
#[derive(Debug, Clone, Copy)]
pub enum ImmediateDestination {
    Register(RegisterName),
    Memory(EffectiveAddress),
}

/// Applies `instruction` to a register destination and writes the result
/// back, unless `instruction` is Cmp (flags only) or Mov (direct overwrite,
/// no flags). Shared by the register-to-register, immediate-to-register and
/// accumulator-immediate executors.
fn apply_to_register(
    machine: &mut Machine,
    instruction: InstructionKind,
    destination: RegisterName,
    destination_value: u16,
    operand_value: u16,
    is_wide: bool,
) {
    match instruction {
        InstructionKind::Mov => machine.write_register(destination, operand_value),
        InstructionKind::Cmp => {
            let carry_in = machine.flags.contains(Flags::CARRY);
            let result = alu::evaluate(instruction, destination_value, operand_value, carry_in, is_wide);
            machine.set_arithmetic_flags(result.flags);
        }
        _ => {
            let carry_in = machine.flags.contains(Flags::CARRY);
            let result = alu::evaluate(instruction, destination_value, operand_value, carry_in, is_wide);
            machine.set_arithmetic_flags(result.flags);
            machine.write_register(destination, result.value);
        }
    }
}

/// Same as [`apply_to_register`], but for a memory destination addressed by
/// a linear byte index already resolved by the caller.
fn apply_to_memory(
    machine: &mut Machine,
    instruction: InstructionKind,
    index: i64,
    destination_value: u16,
    operand_value: u16,
    is_wide: bool,
) -> Result<(), SimError> {
    match instruction {
        InstructionKind::Mov => machine.memory.write(index, operand_value, is_wide),
        InstructionKind::Cmp => {
            let carry_in = machine.flags.contains(Flags::CARRY);
            let result = alu::evaluate(instruction, destination_value, operand_value, carry_in, is_wide);
            machine.set_arithmetic_flags(result.flags);
            Ok(())
        }
        _ => {
            let carry_in = machine.flags.contains(Flags::CARRY);
            let result = alu::evaluate(instruction, destination_value, operand_value, carry_in, is_wide);
            machine.set_arithmetic_flags(result.flags);
            machine.memory.write(index, result.value, is_wide)
        }
    }
}

/// Register↔Register (§4.5, MOD=11 case of `RegisterMemoryToFromRegister`).
pub fn register_to_register(
    machine: &mut Machine,
    mode: SimulationMode,
    out: &mut dyn Write,
    instruction: InstructionKind,
    destination: RegisterName,
    source: RegisterName,
) -> Result<(), SimError> {
    match mode {
        SimulationMode::Print => {
            let _ = writeln!(out, "{}", print::register_to_register(instruction.display(), destination, source));
        }
        SimulationMode::Simulate => {
            let destination_value = machine.read_register(destination);
            let source_value = machine.read_register(source);
            apply_to_register(machine, instruction, destination, destination_value, source_value, destination.is_word());
        }
    }
    Ok(())
}

/// Register↔Effective-Address (§4.5). Per the source, the arithmetic value
/// is always `memory_value OP register_value`; only the write target
/// depends on `register_is_destination` (the D bit).
pub fn register_and_effective_address(
    machine: &mut Machine,
    mode: SimulationMode,
    out: &mut dyn Write,
    instruction: InstructionKind,
    register: RegisterName,
    ea: EffectiveAddress,
    register_is_destination: bool,
    is_wide: bool,
) -> Result<(), SimError> {
    match mode {
        SimulationMode::Print => {
            let _ = writeln!(
                out,
                "{}",
                print::register_and_effective_address(instruction.display(), register, ea, register_is_destination)
            );
        }
        SimulationMode::Simulate => {
            let index = operand::effective_address_to_linear(machine, ea);
            let memory_value = machine.memory.read(index, is_wide)?;
            let register_value = machine.read_register(register);
            match instruction {
                InstructionKind::Mov => {
                    if register_is_destination {
                        machine.write_register(register, memory_value);
                    } else {
                        machine.memory.write(index, register_value, is_wide)?;
                    }
                }
                InstructionKind::Cmp => {
                    let carry_in = machine.flags.contains(Flags::CARRY);
                    let result = alu::evaluate(instruction, memory_value, register_value, carry_in, is_wide);
                    machine.set_arithmetic_flags(result.flags);
                }
                _ => {
                    let carry_in = machine.flags.contains(Flags::CARRY);
                    let result = alu::evaluate(instruction, memory_value, register_value, carry_in, is_wide);
                    machine.set_arithmetic_flags(result.flags);
                    if register_is_destination {
                        machine.write_register(register, result.value);
                    } else {
                        machine.memory.write(index, result.value, is_wide)?;
                    }
                }
            }
        }
    }
    Ok(())
}

/// Immediate→Register/Memory (§4.5): covers both the MOD=11 register-direct
/// case and the memory-destination case, the way the source's single
/// `SimulateImmediateToRegisterMemory`/`SimulateImmediateToEffectiveAddress*`
/// pair does.
#[allow(clippy::too_many_arguments)]
pub fn immediate_to_register_memory(
    machine: &mut Machine,
    mode: SimulationMode,
    out: &mut dyn Write,
    instruction: InstructionKind,
    destination: ImmediateDestination,
    immediate: i16,
    is_move: bool,
    is_wide: bool,
) -> Result<(), SimError> {
    match mode {
        SimulationMode::Print => {
            let line = match destination {
                ImmediateDestination::Register(r) => {
                    print::immediate_to_register_memory(instruction.display(), r, immediate, is_wide)
                }
                ImmediateDestination::Memory(ea) => {
                    print::immediate_to_effective_address(instruction.display(), ea, immediate, is_move, is_wide)
                }
            };
            let _ = writeln!(out, "{}", line);
        }
        SimulationMode::Simulate => match destination {
            ImmediateDestination::Register(r) => {
                let current = machine.read_register(r);
                apply_to_register(machine, instruction, r, current, immediate as u16, is_wide);
            }
            ImmediateDestination::Memory(ea) => {
                let index = operand::effective_address_to_linear(machine, ea);
                let current = machine.memory.read(index, is_wide)?;
                apply_to_memory(machine, instruction, index, current, immediate as u16, is_wide)?;
            }
        },
    }
    Ok(())
}

/// Immediate→Register, short form (§4.5, opcodes 0b101100-0b101111). Always
/// a Mov; there is no flag update and no Cmp/arithmetic variant at this
/// opcode.
pub fn immediate_to_register(
    machine: &mut Machine,
    mode: SimulationMode,
    out: &mut dyn Write,
    destination: RegisterName,
    immediate: i16,
) -> Result<(), SimError> {
    match mode {
        SimulationMode::Print => {
            let _ = writeln!(out, "{}", print::immediate_to_register("mov", destination, immediate));
        }
        SimulationMode::Simulate => machine.write_register(destination, immediate as u16),
    }
    Ok(())
}

/// Accumulator↔Memory (§4.5): the memory-direct Mov form (`data` is an
/// address) and the accumulator-immediate arithmetic form (`data` is the
/// immediate itself) share one opcode kind, distinguished by `is_move`.
#[allow(clippy::too_many_arguments)]
pub fn accumulator_memory(
    machine: &mut Machine,
    mode: SimulationMode,
    out: &mut dyn Write,
    instruction: InstructionKind,
    data: i16,
    accumulator_is_destination: bool,
    is_move: bool,
    is_wide: bool,
) -> Result<(), SimError> {
    let accumulator = if is_wide { RegisterName::Ax } else { RegisterName::Al };
    match mode {
        SimulationMode::Print => {
            let line = if is_move {
                print::accumulator_memory_direct(instruction.display(), data as u16, is_wide, accumulator_is_destination)
            } else {
                print::accumulator_immediate(instruction.display(), is_wide, data)
            };
            let _ = writeln!(out, "{}", line);
        }
        SimulationMode::Simulate => {
            if is_move {
                let address = data as u16 as i64;
                if accumulator_is_destination {
                    let value = machine.memory.read(address, is_wide)?;
                    machine.write_register(accumulator, value);
                } else {
                    let value = machine.read_register(accumulator);
                    machine.memory.write(address, value, is_wide)?;
                }
            } else {
                let current = machine.read_register(accumulator);
                apply_to_register(machine, instruction, accumulator, current, data as u16, is_wide);
            }
        }
    }
    Ok(())
}

/// Jump/Loop (§4.5, §4.6). Returns whether the branch was taken; the
/// decode-dispatch loop uses this to decide whether to add `offset` on top
/// of the already-advanced IP. The CX-decrement for the LOOP family happens
/// here, unconditionally, before the branch condition is evaluated, per the
/// source's `SimulateJump`.
pub fn jump(
    machine: &mut Machine,
    mode: SimulationMode,
    out: &mut dyn Write,
    op: crate::cpu::types::JumpOp,
    offset: i8,
) -> Result<bool, SimError> {
    use crate::cpu::types::JumpOp::*;

    if mode == SimulationMode::Print {
        let _ = writeln!(out, "{}", print::jump(op.mnemonic(), offset));
        return Ok(false);
    }

    let mut cx_after_decrement = 0u16;
    if op.is_loop_family() {
        cx_after_decrement = machine.read_register(RegisterName::Cx).wrapping_sub(1);
        if op != Jcxz {
            machine.write_register(RegisterName::Cx, cx_after_decrement);
        }
    }

    let f = machine.flags;
    let taken = match op {
        Je => f.contains(Flags::ZERO),
        Jne => !f.contains(Flags::ZERO),
        Jl => f.contains(Flags::SIGN) != f.contains(Flags::OVERFLOW),
        Jnl => f.contains(Flags::SIGN) == f.contains(Flags::OVERFLOW),
        Jle => f.contains(Flags::ZERO) || (f.contains(Flags::SIGN) != f.contains(Flags::OVERFLOW)),
        Jnle => !f.contains(Flags::ZERO) && (f.contains(Flags::SIGN) == f.contains(Flags::OVERFLOW)),
        Jb => f.contains(Flags::CARRY),
        Jnb => !f.contains(Flags::CARRY),
        Jbe => f.contains(Flags::CARRY) || f.contains(Flags::ZERO),
        Jnbe => !f.contains(Flags::CARRY) && !f.contains(Flags::ZERO),
        Jp => f.contains(Flags::PARITY),
        Jnp => !f.contains(Flags::PARITY),
        Jo => f.contains(Flags::OVERFLOW),
        Jno => !f.contains(Flags::OVERFLOW),
        Js => f.contains(Flags::SIGN),
        Jns => !f.contains(Flags::SIGN),
        Loop => cx_after_decrement != 0,
        Loopz => cx_after_decrement != 0 && f.contains(Flags::ZERO),
        Loopnz => cx_after_decrement != 0 && !f.contains(Flags::ZERO),
        Jcxz => machine.read_register(RegisterName::Cx) == 0,
    };

    Ok(taken)
}
