//! AArch32 (A32) and Thumb instruction tables.
//!
//! ## A32
//!
//! A32 words are 32-bit with the condition code in bits 28..31; every rule
//! here is conditional ([`CondAt::A32`]), encoding `al` (0xE) when no
//! suffix is written. Data-processing immediates use the rotated imm8 form
//! (imm8 ROR 2×rot4); values that no rotation can produce are rejected at
//! encode time. Words with condition 0xF occupy the unconditional space
//! and are not decoded by these rules.
//!
//! ## Thumb
//!
//! Only the 16-bit halfword encodings (T1/T2). Most data-processing forms
//! carry 3-bit register fields and accept `r0`..`r7` only; the
//! high-register MOV/ADD forms use the split D:Rd field. The conditional
//! branch is the single conditional Thumb instruction here.

use crate::ir::AddrMode;
use crate::table::{is_sorted_by_specificity, Arg, CondAt, RegClass, Rule};

// ── A32 field shorthand ──────────────────────────────────────────────────

const RD12: Arg = Arg::Arm { lsb: 12, bits: 4 };
const RN16: Arg = Arg::Arm { lsb: 16, bits: 4 };
const RM0: Arg = Arg::Arm { lsb: 0, bits: 4 };
/// MUL puts Rd at 16, Rn at 0 and Rm at 8.
const MUL_RD: Arg = Arg::Arm { lsb: 16, bits: 4 };
const MUL_RN: Arg = Arg::Arm { lsb: 0, bits: 4 };
const MUL_RM: Arg = Arg::Arm { lsb: 8, bits: 4 };

/// Operand2 barrel shift: Rm at 0, kind at 5..6, imm5 at 7..11 (bit 4 is
/// zero for shift-by-immediate).
const SHIFT_A: Arg = Arg::Shifted {
    rm_lsb: 0,
    rm_bits: 4,
    kind_lsb: 5,
    amt_lsb: 7,
    amt_bits: 5,
    cls: RegClass::A,
};

const B24: Arg = Arg::Target { lsb: 0, bits: 24, step: 4 };
const IMM24: Arg = Arg::UImm { lsb: 0, bits: 24 };

/// `[rn{, #imm12}]`; the P/U/W addressing bits live in each rule's base.
const fn mem_a(mode: AddrMode) -> Arg {
    Arg::MemU {
        rn_lsb: 16,
        rn_bits: 4,
        off_lsb: 0,
        off_bits: 12,
        scale: 1,
        mode,
    }
}

const MEM_REG_A: Arg = Arg::MemReg {
    rn_lsb: 16,
    rn_bits: 4,
    rm_lsb: 0,
    rm_bits: 4,
};

const fn a32(mnemonic: &'static str, base: u32, args: &'static [Arg]) -> Rule {
    Rule::new32(mnemonic, base, CondAt::A32, args)
}

/// A32 rules, ordered by descending fixed-bit count.
#[rustfmt::skip]
pub(crate) static A32_RULES: &[Rule] = &[
    a32("nop", 0x0320_F000, &[]),

    a32("bx", 0x012F_FF10, &[RM0]),

    // Two-register comparisons and moves (S or opcode distinguish them).
    a32("cmp", 0x0150_0000, &[RN16, RM0]),
    a32("cmn", 0x0170_0000, &[RN16, RM0]),
    a32("tst", 0x0110_0000, &[RN16, RM0]),
    a32("teq", 0x0130_0000, &[RN16, RM0]),
    a32("mov", 0x01A0_0000, &[RD12, RM0]),
    a32("mvn", 0x01E0_0000, &[RD12, RM0]),

    // MUL: bits 4..7 are 1001, which keeps it out of the dp-register space.
    a32("mul", 0x0000_0090, &[MUL_RD, MUL_RN, MUL_RM]),

    // Data processing, register operand2 (no shift).
    a32("add", 0x0080_0000, &[RD12, RN16, RM0]),
    a32("sub", 0x0040_0000, &[RD12, RN16, RM0]),
    a32("rsb", 0x0060_0000, &[RD12, RN16, RM0]),
    a32("and", 0x0000_0000, &[RD12, RN16, RM0]),
    a32("orr", 0x0180_0000, &[RD12, RN16, RM0]),
    a32("eor", 0x0020_0000, &[RD12, RN16, RM0]),
    a32("bic", 0x01C0_0000, &[RD12, RN16, RM0]),

    // Load/store, register offset (P=1, U=1, no shift).
    a32("ldr", 0x0790_0000, &[RD12, MEM_REG_A]),
    a32("str", 0x0780_0000, &[RD12, MEM_REG_A]),

    // Moves with a shifted-register operand2.
    a32("mov", 0x01A0_0000, &[RD12, SHIFT_A]),
    a32("mvn", 0x01E0_0000, &[RD12, SHIFT_A]),

    // Comparisons and moves, rotated immediate.
    a32("cmp", 0x0350_0000, &[RN16, Arg::RotImm]),
    a32("cmn", 0x0370_0000, &[RN16, Arg::RotImm]),
    a32("tst", 0x0310_0000, &[RN16, Arg::RotImm]),
    a32("teq", 0x0330_0000, &[RN16, Arg::RotImm]),
    a32("mov", 0x03A0_0000, &[RD12, Arg::RotImm]),
    a32("mvn", 0x03E0_0000, &[RD12, Arg::RotImm]),

    // Data processing, shifted-register operand2.
    a32("add", 0x0080_0000, &[RD12, RN16, SHIFT_A]),
    a32("sub", 0x0040_0000, &[RD12, RN16, SHIFT_A]),
    a32("rsb", 0x0060_0000, &[RD12, RN16, SHIFT_A]),
    a32("and", 0x0000_0000, &[RD12, RN16, SHIFT_A]),
    a32("orr", 0x0180_0000, &[RD12, RN16, SHIFT_A]),
    a32("eor", 0x0020_0000, &[RD12, RN16, SHIFT_A]),
    a32("bic", 0x01C0_0000, &[RD12, RN16, SHIFT_A]),

    // Data processing, rotated immediate.
    a32("add", 0x0280_0000, &[RD12, RN16, Arg::RotImm]),
    a32("sub", 0x0240_0000, &[RD12, RN16, Arg::RotImm]),
    a32("rsb", 0x0260_0000, &[RD12, RN16, Arg::RotImm]),
    a32("and", 0x0200_0000, &[RD12, RN16, Arg::RotImm]),
    a32("orr", 0x0380_0000, &[RD12, RN16, Arg::RotImm]),
    a32("eor", 0x0220_0000, &[RD12, RN16, Arg::RotImm]),
    a32("bic", 0x03C0_0000, &[RD12, RN16, Arg::RotImm]),

    // Wide moves (imm4:imm12).
    a32("movw", 0x0300_0000, &[RD12, Arg::MovwImm]),
    a32("movt", 0x0340_0000, &[RD12, Arg::MovwImm]),

    // Load/store immediate. Offsets are non-negative (U=1 throughout).
    a32("ldr",  0x0590_0000, &[RD12, mem_a(AddrMode::Offset)]),
    a32("str",  0x0580_0000, &[RD12, mem_a(AddrMode::Offset)]),
    a32("ldr",  0x05B0_0000, &[RD12, mem_a(AddrMode::PreIndex)]),
    a32("str",  0x05A0_0000, &[RD12, mem_a(AddrMode::PreIndex)]),
    a32("ldr",  0x0490_0000, &[RD12, mem_a(AddrMode::PostIndex)]),
    a32("str",  0x0480_0000, &[RD12, mem_a(AddrMode::PostIndex)]),
    a32("ldrb", 0x05D0_0000, &[RD12, mem_a(AddrMode::Offset)]),
    a32("strb", 0x05C0_0000, &[RD12, mem_a(AddrMode::Offset)]),

    a32("b",   0x0A00_0000, &[B24]),
    a32("bl",  0x0B00_0000, &[B24]),
    a32("svc", 0x0F00_0000, &[IMM24]),
];

const _: () = assert!(is_sorted_by_specificity(A32_RULES));

// ── Thumb field shorthand ────────────────────────────────────────────────

const T_RD: Arg = Arg::Arm { lsb: 0, bits: 3 };
const T_RN: Arg = Arg::Arm { lsb: 3, bits: 3 };
const T_RM: Arg = Arg::Arm { lsb: 6, bits: 3 };
const T_RDN8: Arg = Arg::Arm { lsb: 8, bits: 3 };
const T_RM4: Arg = Arg::Arm { lsb: 3, bits: 4 };

const T_IMM8: Arg = Arg::UImm { lsb: 0, bits: 8 };
const T_IMM3: Arg = Arg::UImm { lsb: 6, bits: 3 };
const T_IMM5: Arg = Arg::UImm { lsb: 6, bits: 5 };

const T_B11: Arg = Arg::Target { lsb: 0, bits: 11, step: 2 };
const T_B8: Arg = Arg::Target { lsb: 0, bits: 8, step: 2 };

/// `[rn, #imm5]`, offset scaled by the access size.
const fn t_mem(scale: u16) -> Arg {
    Arg::MemU {
        rn_lsb: 3,
        rn_bits: 3,
        off_lsb: 6,
        off_bits: 5,
        scale,
        mode: AddrMode::Offset,
    }
}

const fn thumb(mnemonic: &'static str, base: u32, args: &'static [Arg]) -> Rule {
    Rule::new16(mnemonic, base, CondAt::None, args)
}

/// Thumb rules, ordered by descending fixed-bit count.
#[rustfmt::skip]
pub(crate) static THUMB_RULES: &[Rule] = &[
    thumb("nop", 0xBF00, &[]),

    thumb("bx", 0x4700, &[T_RM4]),

    // Two-register data processing (LSLS #0 is the canonical MOVS).
    thumb("movs", 0x0000, &[T_RD, T_RN]),
    thumb("ands", 0x4000, &[T_RD, T_RN]),
    thumb("eors", 0x4040, &[T_RD, T_RN]),
    thumb("orrs", 0x4300, &[T_RD, T_RN]),
    thumb("bics", 0x4380, &[T_RD, T_RN]),
    thumb("mvns", 0x43C0, &[T_RD, T_RN]),
    thumb("cmp",  0x4280, &[T_RD, T_RN]),

    // High-register forms (split D:Rd field) and SVC.
    thumb("mov", 0x4600, &[Arg::ArmHi, T_RM4]),
    thumb("add", 0x4400, &[Arg::ArmHi, T_RM4]),
    thumb("svc", 0xDF00, &[T_IMM8]),

    // Three-operand add/subtract.
    thumb("adds", 0x1800, &[T_RD, T_RN, T_RM]),
    thumb("subs", 0x1A00, &[T_RD, T_RN, T_RM]),
    thumb("adds", 0x1C00, &[T_RD, T_RN, T_IMM3]),
    thumb("subs", 0x1E00, &[T_RD, T_RN, T_IMM3]),

    // Shift-by-immediate.
    thumb("lsls", 0x0000, &[T_RD, T_RN, T_IMM5]),
    thumb("lsrs", 0x0800, &[T_RD, T_RN, T_IMM5]),
    thumb("asrs", 0x1000, &[T_RD, T_RN, T_IMM5]),

    // Two-operand immediate forms.
    thumb("movs", 0x2000, &[T_RDN8, T_IMM8]),
    thumb("cmp",  0x2800, &[T_RDN8, T_IMM8]),
    thumb("adds", 0x3000, &[T_RDN8, T_IMM8]),
    thumb("subs", 0x3800, &[T_RDN8, T_IMM8]),

    // Load/store with scaled imm5 offset.
    thumb("str",  0x6000, &[T_RD, t_mem(4)]),
    thumb("ldr",  0x6800, &[T_RD, t_mem(4)]),
    thumb("strb", 0x7000, &[T_RD, t_mem(1)]),
    thumb("ldrb", 0x7800, &[T_RD, t_mem(1)]),
    thumb("strh", 0x8000, &[T_RD, t_mem(2)]),
    thumb("ldrh", 0x8800, &[T_RD, t_mem(2)]),

    thumb("b", 0xE000, &[T_B11]),

    Rule::new16("b", 0xD000, CondAt::Thumb8, &[T_B8]),
];

const _: () = assert!(is_sorted_by_specificity(THUMB_RULES));

// ── Rotated immediates ───────────────────────────────────────────────────

/// Encode a value as an A32 rotated immediate.
///
/// Returns the 12-bit `rot4:imm8` field (value = imm8 ROR 2×rot), or
/// `None` when no rotation produces the value.
pub(crate) fn encode_rot_imm(value: u32) -> Option<u32> {
    for rot in 0..16u32 {
        let rotated = value.rotate_left(rot * 2);
        if rotated <= 0xFF {
            return Some((rot << 8) | rotated);
        }
    }
    None
}

/// Expand a 12-bit `rot4:imm8` field back to its value.
pub(crate) fn decode_rot_imm(field: u32) -> u32 {
    let imm8 = field & 0xFF;
    let rot = (field >> 8) & 0xF;
    imm8.rotate_right(rot * 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::check_table;

    #[test]
    fn a32_table_is_structurally_valid() {
        check_table(A32_RULES, 0xFFFF_FFFF);
    }

    #[test]
    fn thumb_table_is_structurally_valid() {
        check_table(THUMB_RULES, 0xFFFF);
    }

    #[test]
    fn thumb_rules_fit_sixteen_bits() {
        for rule in THUMB_RULES {
            assert_eq!(rule.value >> 16, 0, "{}", rule.mnemonic);
            assert_eq!(rule.mask >> 16, 0, "{}", rule.mnemonic);
        }
    }

    #[test]
    fn movs_register_outranks_lsls_zero() {
        let movs = THUMB_RULES
            .iter()
            .position(|r| r.mnemonic == "movs" && r.mask == 0xFFC0)
            .unwrap();
        let lsls = THUMB_RULES
            .iter()
            .position(|r| r.mnemonic == "lsls")
            .unwrap();
        assert!(movs < lsls);
    }

    #[test]
    fn rot_imm_simple_values() {
        assert_eq!(encode_rot_imm(0), Some(0));
        assert_eq!(encode_rot_imm(0xFF), Some(0xFF));
        // 0xFF000000 = 0xFF ROR 8 → rot = 4.
        assert_eq!(encode_rot_imm(0xFF00_0000), Some(0x4FF));
        // 0x3FC = 0xFF ROR 30 → rot = 15.
        assert_eq!(encode_rot_imm(0x3FC), Some(0xFFF));
    }

    #[test]
    fn rot_imm_unencodable() {
        assert_eq!(encode_rot_imm(0x101), None);
        assert_eq!(encode_rot_imm(0xFF1), None);
    }

    #[test]
    fn rot_imm_round_trips() {
        for value in [0u32, 1, 0xFF, 0x3F0, 0xFF00_0000, 0x8000_0001, 0xF000_000F] {
            let field = encode_rot_imm(value).unwrap_or_else(|| panic!("0x{value:x}"));
            assert_eq!(decode_rot_imm(field), value, "0x{value:x}");
        }
    }
}
