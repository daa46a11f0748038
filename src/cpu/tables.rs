//! Static, declarative encoding data (§4.1). Nothing in this module reads
//! memory or mutates state — it only maps bit patterns to tags.

use crate::cpu::types::{EaBase, InstructionKind, JumpOp, Opcode, OpcodeKind, RegisterName};

/// Looks up the primary opcode table by the top six bits of the first
/// instruction byte (§4.1 "Primary opcode table"). Unrecognized entries
/// carry `(OpcodeKind::Halt, InstructionKind::None)`... no: unrecognized
/// entries are signalled by returning `None`, which the decoder turns into
/// `SimError::UnknownOpcode`.
pub fn primary_opcode(top_six_bits: u8) -> Option<Opcode> {
    use InstructionKind::*;
    use OpcodeKind::*;
    let (kind, instruction) = match top_six_bits {
        0b100010 => (RegisterMemoryToFromRegister, Mov),
        0b110001 => (ImmediateToRegisterMemory, Mov),
        0b101100..=0b101111 => (ImmediateToRegister, Mov),
        0b101000 => (MemoryAccumulator, Mov),
        0b100011 => (SegmentRegister, Mov),

        0b000000 => (RegisterMemoryToFromRegister, Add),
        0b000001 => (MemoryAccumulator, Add),

        0b001010 => (RegisterMemoryToFromRegister, Sub),
        0b001011 => (MemoryAccumulator, Sub),

        0b001110 => (RegisterMemoryToFromRegister, Cmp),
        0b001111 => (MemoryAccumulator, Cmp),

        0b100000 => (ImmediateToRegisterMemory, Derived),

        0b011101 | 0b011111 | 0b011100 | 0b011110 | 0b111000 => (Jump, Derived),

        0b111101 => (Halt, None),

        _ => return Option::None,
    };
    Some(Opcode { kind, instruction })
}

/// Looks up the full-byte opcode table, which takes precedence over the
/// 6-bit primary table for halt, conditional jumps and loops (§4.1, §4.6,
/// §9 "Two-layer opcode table"). Returns `None` when the full byte carries
/// no override.
pub fn full_byte_opcode(byte: u8) -> Option<Opcode> {
    if byte == 0xF4 {
        return Some(Opcode { kind: OpcodeKind::Halt, instruction: InstructionKind::None });
    }
    if jump_op(byte).is_some() {
        return Some(Opcode { kind: OpcodeKind::Jump, instruction: InstructionKind::Derived });
    }
    Option::None
}

/// Classifies a full instruction byte as one of the twenty jump/loop
/// mnemonics (§4.1 "Full-byte opcode table").
pub fn jump_op(byte: u8) -> Option<JumpOp> {
    use JumpOp::*;
    Some(match byte {
        0x74 => Je,
        0x7C => Jl,
        0x7E => Jle,
        0x72 => Jb,
        0x76 => Jbe,
        0x7A => Jp,
        0x70 => Jo,
        0x78 => Js,
        0x75 => Jne,
        0x7D => Jnl,
        0x7F => Jnle,
        0x73 => Jnb,
        0x77 => Jnbe,
        0x7B => Jnp,
        0x71 => Jno,
        0x79 => Jns,
        0xE2 => Loop,
        0xE1 => Loopz,
        0xE0 => Loopnz,
        0xE3 => Jcxz,
        _ => return Option::None,
    })
}

/// Resolves the instruction kind of the 0b100000 arithmetic-immediate
/// family from the REG sub-field of the second byte (§4.1, §4.5).
pub fn derived_arithmetic_instruction(reg: u8) -> Option<InstructionKind> {
    use InstructionKind::*;
    Some(match reg & 0b111 {
        0b000 => Add,
        0b010 => Adc,
        0b101 => Sub,
        0b011 => Sbb,
        0b111 => Cmp,
        _ => return Option::None,
    })
}

/// Register-selection table, keyed by (3-bit reg/rm field, W bit). W=0
/// selects byte halves, W=1 selects word registers (§4.1).
pub fn register(reg_or_rm: u8, is_wide: bool) -> RegisterName {
    use RegisterName::*;
    const BYTE: [RegisterName; 8] = [Al, Cl, Dl, Bl, Ah, Ch, Dh, Bh];
    const WORD: [RegisterName; 8] = [Ax, Cx, Dx, Bx, Sp, Bp, Si, Di];
    let index = (reg_or_rm & 0b111) as usize;
    if is_wide { WORD[index] } else { BYTE[index] }
}

/// Segment-register table, keyed by a 2-bit field (§4.1).
pub fn segment_register(two_bit_field: u8) -> RegisterName {
    use RegisterName::*;
    const TABLE: [RegisterName; 4] = [Es, Cs, Ss, Ds];
    TABLE[(two_bit_field & 0b11) as usize]
}

/// Effective-address base table, keyed by (MOD, R/M). MOD=11 is
/// register-mode and is short-circuited in the decoder rather than
/// represented here (§4.1).
pub fn effective_address_base(mod_field: u8, rm: u8) -> EaBase {
    use EaBase::*;
    const MOD00: [EaBase; 8] = [BxSi, BxDi, BpSi, BpDi, Si, Di, DirectAddress, Bx];
    const MOD01_10: [EaBase; 8] = [BxSi, BxDi, BpSi, BpDi, Si, Di, Bp, Bx];
    let index = (rm & 0b111) as usize;
    match mod_field & 0b11 {
        0b00 => MOD00[index],
        _ => MOD01_10[index],
    }
}
