//! Disassembly formatting (§6 "Printed disassembly"). Kept separate from
//! decode and execute, the way the teacher keeps `disassembler.rs` apart
//! from `instructions.rs`.

use crate::cpu::types::{EffectiveAddress, RegisterName};

/// The first line any disassembly run emits.
pub fn bits_directive() -> &'static str {
    "bits 16"
}

pub fn register_to_register(mnemonic: &str, dest: RegisterName, src: RegisterName) -> String {
    format!("{} {}, {}", mnemonic, dest.display(), src.display())
}

pub fn register_and_effective_address(mnemonic: &str, register: RegisterName, ea: EffectiveAddress, register_is_destination: bool) -> String {
    if register_is_destination {
        format!("{} {}, {}", mnemonic, register.display(), ea.display())
    } else {
        format!("{} {}, {}", mnemonic, ea.display(), register.display())
    }
}

fn size_prefix(is_wide: bool) -> &'static str {
    if is_wide { "word" } else { "byte" }
}

pub fn immediate_to_register_memory(mnemonic: &str, register: RegisterName, immediate: i16, is_wide: bool) -> String {
    format!("{} {} {}, {}", mnemonic, size_prefix(is_wide), register.display(), immediate)
}

pub fn immediate_to_effective_address(mnemonic: &str, ea: EffectiveAddress, immediate: i16, is_move: bool, is_wide: bool) -> String {
    if is_move {
        format!("{} {}, {} {}", mnemonic, ea.display(), size_prefix(is_wide), immediate)
    } else {
        format!("{} {} {}, {}", mnemonic, size_prefix(is_wide), ea.display(), immediate)
    }
}

pub fn immediate_to_register(mnemonic: &str, register: RegisterName, immediate: i16) -> String {
    format!("{} {}, {}", mnemonic, register.display(), immediate)
}

pub fn accumulator_memory_direct(mnemonic: &str, address: u16, is_wide: bool, accumulator_is_destination: bool) -> String {
    let accumulator = if is_wide { "ax" } else { "al" };
    if accumulator_is_destination {
        format!("{} {}, [{}]", mnemonic, accumulator, address)
    } else {
        format!("{} [{}], {}", mnemonic, address, accumulator)
    }
}

pub fn accumulator_immediate(mnemonic: &str, is_wide: bool, immediate: i16) -> String {
    let accumulator = if is_wide { "ax" } else { "al" };
    format!("{} {}, {}", mnemonic, accumulator, immediate)
}

pub fn jump(mnemonic: &str, offset: i8) -> String {
    format!("{} $+2+{}", mnemonic, offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::types::EaBase;

    #[test]
    fn formats_register_pair() {
        assert_eq!(register_to_register("mov", RegisterName::Ax, RegisterName::Bx), "mov ax, bx");
    }

    #[test]
    fn formats_effective_address_with_displacement() {
        let ea = EffectiveAddress { base: EaBase::Bp, displacement: 4 };
        assert_eq!(ea.display(), "[bp + 4]");
    }

    #[test]
    fn formats_direct_address() {
        let ea = EffectiveAddress { base: EaBase::DirectAddress, displacement: 1000 };
        assert_eq!(ea.display(), "[1000]");
    }

    #[test]
    fn formats_jump_target() {
        assert_eq!(jump("jne", -4), "jne $+2+-4");
    }

    #[test]
    fn formats_sized_immediate() {
        assert_eq!(
            immediate_to_effective_address("mov", EffectiveAddress { base: EaBase::Bx, displacement: 0 }, 5, true, false),
            "mov [bx], byte 5"
        );
    }
}
