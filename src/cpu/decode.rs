//! The decode-dispatch loop (§4.6). Reads the byte at IP, classifies it
//! through the two opcode tables, extracts D/W/MOD/REG/R/M, computes the
//! instruction length, invokes the matching executor, and advances IP.

use std::io::Write;

use tracing::{debug, trace, warn};

use crate::cpu::execute::{self, ImmediateDestination};
use crate::cpu::machine::Machine;
use crate::cpu::operand;
use crate::cpu::print;
use crate::cpu::tables;
use crate::cpu::types::{EaBase, EffectiveAddress, InstructionKind, Opcode, OpcodeKind, RegisterName, SimulationMode};
use crate::error::SimError;

fn top_six_bits(byte: u8) -> u8 {
    (byte >> 2) & 0b0011_1111
}
fn d_bit(byte: u8) -> bool {
    (byte >> 1) & 1 != 0
}
fn w_bit(byte: u8) -> bool {
    byte & 1 != 0
}
fn mod_field(byte: u8) -> u8 {
    (byte >> 6) & 0b11
}
fn reg_field(byte: u8) -> u8 {
    (byte >> 3) & 0b111
}
fn rm_field(byte: u8) -> u8 {
    byte & 0b111
}

/// Reads one byte during decode (as opposed to during operand access),
/// reporting a missing byte as `UnexpectedEndOfStream` rather than
/// `MemoryOutOfRange` (§7).
fn fetch_byte(machine: &Machine, index: i64) -> Result<u8, SimError> {
    let byte = machine.memory.read_u8(index).map_err(|_| SimError::UnexpectedEndOfStream(index as usize))?;
    trace!(index, byte, "fetched byte");
    Ok(byte)
}

/// Reads an immediate/displacement at `IP + offset`, reporting the same
/// decode-time error kind as [`fetch_byte`].
fn fetch_immediate(machine: &Machine, offset: i64, is_word: bool) -> Result<i16, SimError> {
    let ip = machine.read_register(RegisterName::Ip) as i64;
    operand::fetch_immediate(machine, offset, is_word).map_err(|_| SimError::UnexpectedEndOfStream((ip + offset) as usize))
}

/// Looks up `byte`'s opcode, letting the full-byte table override the 6-bit
/// primary table (§9 "Two-layer opcode table").
fn classify(byte: u8) -> Result<Opcode, SimError> {
    if let Some(opcode) = tables::full_byte_opcode(byte) {
        return Ok(opcode);
    }
    tables::primary_opcode(top_six_bits(byte)).ok_or(SimError::UnknownOpcode(top_six_bits(byte), 0))
}

fn advance(machine: &mut Machine, ip: i64, length: i64) {
    machine.write_register(RegisterName::Ip, (ip + length) as u16);
}

/// Decodes and executes (or prints) one instruction. Returns `Ok(true)` when
/// a halt was reached — IP is left unchanged and the caller's loop stops.
pub fn step(machine: &mut Machine, mode: SimulationMode, out: &mut dyn Write) -> Result<bool, SimError> {
    let ip = machine.read_register(RegisterName::Ip) as i64;
    let first_byte = fetch_byte(machine, ip)?;
    let opcode = classify(first_byte).map_err(|e| match e {
        SimError::UnknownOpcode(kind, _) => {
            warn!(ip, first_byte, kind, "unknown opcode");
            SimError::UnknownOpcode(kind, ip as usize)
        }
        other => other,
    })?;
    debug!(ip, ?opcode.kind, ?opcode.instruction, "decoded instruction");

    match opcode.kind {
        OpcodeKind::Halt => return Ok(true),

        OpcodeKind::Jump => {
            let jump_op = tables::jump_op(first_byte).expect("Jump opcode kind implies a full-byte jump table hit");
            let offset = fetch_byte(machine, ip + 1)? as i8;
            let length = 2i64;
            let next_ip = (ip + length) as u16;
            let taken = execute::jump(machine, mode, out, jump_op, offset)?;
            let target = if mode == SimulationMode::Simulate && taken {
                next_ip.wrapping_add(offset as i16 as u16)
            } else {
                next_ip
            };
            machine.write_register(RegisterName::Ip, target);
        }

        OpcodeKind::SegmentRegister | OpcodeKind::RegisterMemoryToFromRegister => {
            let is_segment = opcode.kind == OpcodeKind::SegmentRegister;
            let d = d_bit(first_byte);
            let w = w_bit(first_byte);
            let second_byte = fetch_byte(machine, ip + 1)?;
            let md = mod_field(second_byte);
            let reg = reg_field(second_byte);
            let rm = rm_field(second_byte);
            let reg_register = if is_segment { tables::segment_register(reg) } else { tables::register(reg, w) };

            if md == 0b11 {
                let rm_is_wide = is_segment || w;
                let rm_register = tables::register(rm, rm_is_wide);
                let (destination, source) = if d { (reg_register, rm_register) } else { (rm_register, reg_register) };
                execute::register_to_register(machine, mode, out, opcode.instruction, destination, source)?;
                advance(machine, ip, 2);
            } else {
                let ea_base = tables::effective_address_base(md, rm);
                let is_wide = is_segment || w;
                let (ea, length) = match md {
                    0b00 if ea_base == EaBase::DirectAddress => {
                        let disp = fetch_immediate(machine, 2, true)?;
                        (EffectiveAddress { base: EaBase::DirectAddress, displacement: disp }, 4)
                    }
                    0b00 => (EffectiveAddress { base: ea_base, displacement: 0 }, 2),
                    0b01 => {
                        let disp = fetch_immediate(machine, 2, false)?;
                        (EffectiveAddress { base: ea_base, displacement: disp }, 3)
                    }
                    0b10 => {
                        let disp = fetch_immediate(machine, 2, true)?;
                        (EffectiveAddress { base: ea_base, displacement: disp }, 4)
                    }
                    _ => unreachable!("MOD is a 2-bit field"),
                };
                execute::register_and_effective_address(machine, mode, out, opcode.instruction, reg_register, ea, d, is_wide)?;
                advance(machine, ip, length);
            }
        }

        OpcodeKind::ImmediateToRegisterMemory => {
            // This byte position is the D bit for every other
            // RegisterMemoryToFromRegister-shaped opcode, but for the
            // 0b100000 Derived family it is the sign-extend (S) bit: the
            // immediate is read as 8-bit-then-sign-extended instead of
            // 16-bit whenever S=1 and W=1 (§9 "Ambiguous opcode families").
            let sign_extend = d_bit(first_byte);
            let w = w_bit(first_byte);
            let second_byte = fetch_byte(machine, ip + 1)?;
            let md = mod_field(second_byte);
            let reg = reg_field(second_byte);
            let rm = rm_field(second_byte);
            let is_move = opcode.instruction == InstructionKind::Mov;
            let instruction = if opcode.instruction == InstructionKind::Derived {
                tables::derived_arithmetic_instruction(reg).ok_or_else(|| {
                    warn!(ip, reg, "unimplemented derived arithmetic instruction");
                    SimError::UnimplementedOperandForm(opcode.kind)
                })?
            } else {
                opcode.instruction
            };
            let is_wide_data = if is_move { w } else { !sign_extend && w };

            if md == 0b11 {
                let length = if is_wide_data { 4 } else { 3 };
                let immediate = fetch_immediate(machine, 2, is_wide_data)?;
                let destination = tables::register(rm, w);
                execute::immediate_to_register_memory(
                    machine, mode, out, instruction, ImmediateDestination::Register(destination), immediate, is_move, w,
                )?;
                advance(machine, ip, length);
            } else {
                let ea_base = tables::effective_address_base(md, rm);
                let (ea, immediate, length) = match md {
                    0b00 if ea_base == EaBase::DirectAddress => {
                        let direct = fetch_immediate(machine, 2, true)?;
                        let immediate = fetch_immediate(machine, 4, is_wide_data)?;
                        let length = if is_wide_data { 6 } else { 5 };
                        (EffectiveAddress { base: EaBase::DirectAddress, displacement: direct }, immediate, length)
                    }
                    0b00 => {
                        let immediate = fetch_immediate(machine, 2, is_wide_data)?;
                        let length = if is_wide_data { 4 } else { 3 };
                        (EffectiveAddress { base: ea_base, displacement: 0 }, immediate, length)
                    }
                    0b01 => {
                        let disp = fetch_immediate(machine, 2, false)?;
                        let immediate = fetch_immediate(machine, 3, is_wide_data)?;
                        let length = if is_wide_data { 5 } else { 4 };
                        (EffectiveAddress { base: ea_base, displacement: disp }, immediate, length)
                    }
                    0b10 => {
                        let disp = fetch_immediate(machine, 2, true)?;
                        let immediate = fetch_immediate(machine, 4, is_wide_data)?;
                        let length = if is_wide_data { 6 } else { 5 };
                        (EffectiveAddress { base: ea_base, displacement: disp }, immediate, length)
                    }
                    _ => unreachable!("MOD is a 2-bit field"),
                };
                execute::immediate_to_register_memory(
                    machine, mode, out, instruction, ImmediateDestination::Memory(ea), immediate, is_move, w,
                )?;
                advance(machine, ip, length);
            }
        }

        OpcodeKind::ImmediateToRegister => {
            let w = (first_byte >> 3) & 1 != 0;
            let reg = first_byte & 0b111;
            let destination = tables::register(reg, w);
            let immediate = fetch_immediate(machine, 1, w)?;
            let length = if w { 3 } else { 2 };
            execute::immediate_to_register(machine, mode, out, destination, immediate)?;
            advance(machine, ip, length);
        }

        OpcodeKind::MemoryAccumulator => {
            let d = d_bit(first_byte);
            let w = w_bit(first_byte);
            let is_move = opcode.instruction == InstructionKind::Mov;
            let is_wide_data = is_move || w;
            let length = if is_wide_data { 3 } else { 2 };
            let data = fetch_immediate(machine, 1, is_wide_data)?;
            let accumulator_is_destination = !d;
            execute::accumulator_memory(machine, mode, out, opcode.instruction, data, accumulator_is_destination, is_move, w)?;
            advance(machine, ip, length);
        }

        OpcodeKind::RegisterToRegisterMemory => {
            warn!(ip, ?opcode.kind, "unimplemented operand form");
            return Err(SimError::UnimplementedOperandForm(opcode.kind));
        }
    }

    Ok(false)
}

/// Runs the decode-dispatch loop to completion: repeatedly steps until halt
/// or a terminal error. In `Print` mode, emits the `bits 16` header first
/// and never mutates registers/flags/memory beyond IP (§8 "Print mode is
/// pure").
pub fn run(machine: &mut Machine, mode: SimulationMode, out: &mut dyn Write) -> Result<(), SimError> {
    if mode == SimulationMode::Print {
        let _ = writeln!(out, "{}", print::bits_directive());
    }
    loop {
        match step(machine, mode, out) {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(err) => {
                warn!(%err, "decode-dispatch loop stopped");
                return Err(err);
            }
        }
    }
}
