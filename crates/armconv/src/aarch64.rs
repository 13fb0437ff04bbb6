//! AArch64 (A64) instruction table.
//!
//! All A64 instructions are 32-bit words. Register fields are 5 bits; the
//! `sf` bit that selects between `w` and `x` variants is baked into each
//! rule's base value, so the 32- and 64-bit forms are separate rules and
//! the operand shape (register width) picks between them.
//!
//! Covered classes:
//!
//! - **Data processing (immediate)**: ADD/ADDS/SUB/SUBS with imm12, CMP/CMN
//!   aliases, AND/ORR/EOR/TST with bitmask immediates, MOVZ/MOVN/MOVK
//!   (hw=0) and the MOV immediate alias
//! - **Data processing (register)**: plain and shifted-register forms
//! - **Branches**: B/BL (imm26), B.cond (imm19), BR/BLR/RET, CBZ/CBNZ
//! - **Load/store**: unsigned scaled offset, pre/post-index, register
//!   offset, byte/halfword variants
//! - **System**: NOP, SVC
//!
//! Decoding renders the canonical alias: `subs` with Rd=31 is `cmp`, `orr`
//! from the zero register is `mov`, `movz` with hw=0 is `mov`. The alias
//! rules carry more fixed bits than the underlying form, so the
//! specificity ordering picks them first.

use crate::ir::AddrMode;
use crate::table::{is_sorted_by_specificity, Arg, CondAt, R31, RegClass, Rule};

// ── Field shorthand ──────────────────────────────────────────────────────

const fn gpr(lsb: u8, cls: RegClass, r31: R31) -> Arg {
    Arg::Gpr { lsb, cls, r31 }
}

const RD_W: Arg = gpr(0, RegClass::W, R31::Zr);
const RD_X: Arg = gpr(0, RegClass::X, R31::Zr);
const RD_WSP: Arg = gpr(0, RegClass::W, R31::Sp);
const RD_XSP: Arg = gpr(0, RegClass::X, R31::Sp);
const RN_W: Arg = gpr(5, RegClass::W, R31::Zr);
const RN_X: Arg = gpr(5, RegClass::X, R31::Zr);
const RN_WSP: Arg = gpr(5, RegClass::W, R31::Sp);
const RN_XSP: Arg = gpr(5, RegClass::X, R31::Sp);
const RM_W: Arg = gpr(16, RegClass::W, R31::Zr);
const RM_X: Arg = gpr(16, RegClass::X, R31::Zr);

/// Rd hardwired to 31 (comparison aliases write the zero register).
const RD31: Arg = Arg::Fixed { lsb: 0, bits: 5, val: 31 };
/// Rn hardwired to 31 (`mov` is `orr` from the zero register).
const RN31: Arg = Arg::Fixed { lsb: 5, bits: 5, val: 31 };

const IMM12: Arg = Arg::UImm { lsb: 10, bits: 12 };
const IMM16: Arg = Arg::UImm { lsb: 5, bits: 16 };
const BM32: Arg = Arg::Bitmask { is64: false };
const BM64: Arg = Arg::Bitmask { is64: true };

/// B/BL: 26-bit word offset.
const B26: Arg = Arg::Target { lsb: 0, bits: 26, step: 4 };
/// B.cond / CBZ / CBNZ: 19-bit word offset.
const B19: Arg = Arg::Target { lsb: 5, bits: 19, step: 4 };

const SHIFT_W: Arg = Arg::Shifted {
    rm_lsb: 16,
    rm_bits: 5,
    kind_lsb: 22,
    amt_lsb: 10,
    amt_bits: 6,
    cls: RegClass::W,
};
const SHIFT_X: Arg = Arg::Shifted {
    rm_lsb: 16,
    rm_bits: 5,
    kind_lsb: 22,
    amt_lsb: 10,
    amt_bits: 6,
    cls: RegClass::X,
};

/// `[xn{, #imm}]` with a scaled unsigned imm12.
const fn mem(scale: u16) -> Arg {
    Arg::MemU {
        rn_lsb: 5,
        rn_bits: 5,
        off_lsb: 10,
        off_bits: 12,
        scale,
        mode: AddrMode::Offset,
    }
}

const MEM_PRE: Arg = Arg::MemS9 { pre: true };
const MEM_POST: Arg = Arg::MemS9 { pre: false };
const MEM_REG: Arg = Arg::MemReg {
    rn_lsb: 5,
    rn_bits: 5,
    rm_lsb: 16,
    rm_bits: 5,
};

const fn rule(mnemonic: &'static str, base: u32, args: &'static [Arg]) -> Rule {
    Rule::new32(mnemonic, base, CondAt::None, args)
}

// ── Rule table ───────────────────────────────────────────────────────────

/// A64 rules, ordered by descending fixed-bit count.
#[rustfmt::skip]
pub(crate) static RULES: &[Rule] = &[
    // Fully fixed words.
    rule("nop", 0xD503_201F, &[]),
    rule("ret", 0xD65F_03C0, &[]),

    // Branch-to-register: only Rn varies.
    rule("br",  0xD61F_0000, &[RN_X]),
    rule("blr", 0xD63F_0000, &[RN_X]),
    rule("ret", 0xD65F_0000, &[RN_X]),

    // Two-register aliases (10 variable bits).
    rule("mov", 0x2A00_0000, &[RD_W, RM_W, RN31]),          // ORR Wd, WZR, Wm
    rule("mov", 0xAA00_0000, &[RD_X, RM_X, RN31]),
    rule("cmp", 0x6B00_0000, &[RN_W, RM_W, RD31]),          // SUBS WZR, Wn, Wm
    rule("cmp", 0xEB00_0000, &[RN_X, RM_X, RD31]),
    rule("cmn", 0x2B00_0000, &[RN_W, RM_W, RD31]),          // ADDS WZR, Wn, Wm
    rule("cmn", 0xAB00_0000, &[RN_X, RM_X, RD31]),
    // `mov` to or from the stack pointer is ADD #0; this spelling only
    // encodes (the ORR alias above wins for plain registers, and the word
    // decodes as `add`).
    rule("mov", 0x1100_0000, &[RD_WSP, RN_WSP]).encode_only(),
    rule("mov", 0x9100_0000, &[RD_XSP, RN_XSP]).encode_only(),

    // Three-register data processing, shift amount fixed to zero.
    rule("add",  0x0B00_0000, &[RD_W, RN_W, RM_W]),
    rule("add",  0x8B00_0000, &[RD_X, RN_X, RM_X]),
    rule("adds", 0x2B00_0000, &[RD_W, RN_W, RM_W]),
    rule("adds", 0xAB00_0000, &[RD_X, RN_X, RM_X]),
    rule("sub",  0x4B00_0000, &[RD_W, RN_W, RM_W]),
    rule("sub",  0xCB00_0000, &[RD_X, RN_X, RM_X]),
    rule("subs", 0x6B00_0000, &[RD_W, RN_W, RM_W]),
    rule("subs", 0xEB00_0000, &[RD_X, RN_X, RM_X]),
    rule("and",  0x0A00_0000, &[RD_W, RN_W, RM_W]),
    rule("and",  0x8A00_0000, &[RD_X, RN_X, RM_X]),
    rule("orr",  0x2A00_0000, &[RD_W, RN_W, RM_W]),
    rule("orr",  0xAA00_0000, &[RD_X, RN_X, RM_X]),
    rule("eor",  0x4A00_0000, &[RD_W, RN_W, RM_W]),
    rule("eor",  0xCA00_0000, &[RD_X, RN_X, RM_X]),

    // Load/store, register offset (LSL #0 option).
    rule("ldr", 0xB860_6800, &[RD_W, MEM_REG]),
    rule("ldr", 0xF860_6800, &[RD_X, MEM_REG]),
    rule("str", 0xB820_6800, &[RD_W, MEM_REG]),
    rule("str", 0xF820_6800, &[RD_X, MEM_REG]),

    rule("svc", 0xD400_0001, &[IMM16]),

    // Comparison immediates (Rd fixed).
    rule("cmp", 0x7100_0000, &[RN_WSP, IMM12, RD31]),       // SUBS WZR, Wn, #imm
    rule("cmp", 0xF100_0000, &[RN_XSP, IMM12, RD31]),
    rule("cmn", 0x3100_0000, &[RN_WSP, IMM12, RD31]),       // ADDS WZR, Wn, #imm
    rule("cmn", 0xB100_0000, &[RN_XSP, IMM12, RD31]),
    rule("tst", 0x7200_0000, &[RN_W, BM32, RD31]),          // ANDS WZR, Wn, #bm
    rule("tst", 0xF200_0000, &[RN_X, BM64, RD31]),

    // Load/store, pre/post-index (simm9).
    rule("ldr", 0xB840_0C00, &[RD_W, MEM_PRE]),
    rule("ldr", 0xB840_0400, &[RD_W, MEM_POST]),
    rule("ldr", 0xF840_0C00, &[RD_X, MEM_PRE]),
    rule("ldr", 0xF840_0400, &[RD_X, MEM_POST]),
    rule("str", 0xB800_0C00, &[RD_W, MEM_PRE]),
    rule("str", 0xB800_0400, &[RD_W, MEM_POST]),
    rule("str", 0xF800_0C00, &[RD_X, MEM_PRE]),
    rule("str", 0xF800_0400, &[RD_X, MEM_POST]),

    // Move wide, hw=0. `mov` is the canonical decode of MOVZ.
    rule("mov",  0x5280_0000, &[RD_W, IMM16]),
    rule("mov",  0xD280_0000, &[RD_X, IMM16]),
    rule("movz", 0x5280_0000, &[RD_W, IMM16]).encode_only(),
    rule("movz", 0xD280_0000, &[RD_X, IMM16]).encode_only(),
    rule("movn", 0x1280_0000, &[RD_W, IMM16]),
    rule("movn", 0x9280_0000, &[RD_X, IMM16]),
    rule("movk", 0x7280_0000, &[RD_W, IMM16]),
    rule("movk", 0xF280_0000, &[RD_X, IMM16]),

    // Add/subtract immediate (shift 0).
    rule("add",  0x1100_0000, &[RD_WSP, RN_WSP, IMM12]),
    rule("add",  0x9100_0000, &[RD_XSP, RN_XSP, IMM12]),
    rule("adds", 0x3100_0000, &[RD_W, RN_WSP, IMM12]),
    rule("adds", 0xB100_0000, &[RD_X, RN_XSP, IMM12]),
    rule("sub",  0x5100_0000, &[RD_WSP, RN_WSP, IMM12]),
    rule("sub",  0xD100_0000, &[RD_XSP, RN_XSP, IMM12]),
    rule("subs", 0x7100_0000, &[RD_W, RN_WSP, IMM12]),
    rule("subs", 0xF100_0000, &[RD_X, RN_XSP, IMM12]),

    // Logical bitmask immediate, 32-bit (N fixed to 0).
    rule("and", 0x1200_0000, &[RD_WSP, RN_W, BM32]),
    rule("orr", 0x3200_0000, &[RD_WSP, RN_W, BM32]),
    rule("eor", 0x5200_0000, &[RD_WSP, RN_W, BM32]),

    // Load/store, unsigned scaled offset.
    rule("ldr",  0xB940_0000, &[RD_W, mem(4)]),
    rule("ldr",  0xF940_0000, &[RD_X, mem(8)]),
    rule("str",  0xB900_0000, &[RD_W, mem(4)]),
    rule("str",  0xF900_0000, &[RD_X, mem(8)]),
    rule("ldrb", 0x3940_0000, &[RD_W, mem(1)]),
    rule("strb", 0x3900_0000, &[RD_W, mem(1)]),
    rule("ldrh", 0x7940_0000, &[RD_W, mem(2)]),
    rule("strh", 0x7900_0000, &[RD_W, mem(2)]),

    // Logical bitmask immediate, 64-bit (N variable).
    rule("and", 0x9200_0000, &[RD_XSP, RN_X, BM64]),
    rule("orr", 0xB200_0000, &[RD_XSP, RN_X, BM64]),
    rule("eor", 0xD200_0000, &[RD_XSP, RN_X, BM64]),

    // Shifted-register data processing (non-flag-setting forms).
    rule("add", 0x0B00_0000, &[RD_W, RN_W, SHIFT_W]),
    rule("add", 0x8B00_0000, &[RD_X, RN_X, SHIFT_X]),
    rule("sub", 0x4B00_0000, &[RD_W, RN_W, SHIFT_W]),
    rule("sub", 0xCB00_0000, &[RD_X, RN_X, SHIFT_X]),
    rule("and", 0x0A00_0000, &[RD_W, RN_W, SHIFT_W]),
    rule("and", 0x8A00_0000, &[RD_X, RN_X, SHIFT_X]),
    rule("orr", 0x2A00_0000, &[RD_W, RN_W, SHIFT_W]),
    rule("orr", 0xAA00_0000, &[RD_X, RN_X, SHIFT_X]),
    rule("eor", 0x4A00_0000, &[RD_W, RN_W, SHIFT_W]),
    rule("eor", 0xCA00_0000, &[RD_X, RN_X, SHIFT_X]),

    // Conditional branch.
    Rule::new32("b", 0x5400_0000, CondAt::A64Low, &[B19]),

    // Compare-and-branch.
    rule("cbz",  0x3400_0000, &[RD_W, B19]),
    rule("cbnz", 0x3500_0000, &[RD_W, B19]),
    rule("cbz",  0xB400_0000, &[RD_X, B19]),
    rule("cbnz", 0xB500_0000, &[RD_X, B19]),

    // PC-relative address and unconditional branches.
    rule("adr", 0x1000_0000, &[RD_X, Arg::AdrImm]),
    rule("b",   0x1400_0000, &[B26]),
    rule("bl",  0x9400_0000, &[B26]),
];

const _: () = assert!(is_sorted_by_specificity(RULES));

// ── Bitmask immediates ───────────────────────────────────────────────────

/// Encode a value as an A64 logical bitmask immediate.
///
/// Returns the packed `N:immr:imms` 13-bit field, or `None` when the value
/// is not a rotation of a replicated run of ones (all-zeros and all-ones
/// are never encodable).
pub(crate) fn encode_bitmask_imm(value: u64, is64: bool) -> Option<u32> {
    let value = if is64 {
        value
    } else {
        // The 32-bit variant is the 64-bit algorithm on the replicated word.
        let w = value & 0xFFFF_FFFF;
        (w << 32) | w
    };
    if value == 0 || value == u64::MAX {
        return None;
    }

    // Shrink to the smallest element that replicates to the full value.
    let mut esize = 64u32;
    let mut elem = value;
    while esize > 2 {
        let half = esize / 2;
        let lo = elem & (u64::MAX >> (64 - half));
        if elem >> half != lo {
            break;
        }
        esize = half;
        elem = lo;
    }

    let ones = elem.count_ones();
    // A rotation of a contiguous run: rotating the element down by some
    // amount must leave exactly `ones` trailing ones and nothing above
    // them. The field holds the inverse rotation (the amount the run is
    // rotated right by to produce the element).
    let mut rot = None;
    for r in 0..esize {
        let rotated = ror(elem, r, esize);
        if rotated.trailing_ones() == ones && rotated >> ones == 0 {
            rot = Some(r);
            break;
        }
    }
    let immr = match rot? {
        0 => 0,
        r => esize - r,
    };

    let n = u32::from(esize == 64);
    let imms = if esize == 64 {
        ones - 1
    } else {
        // High bits of imms encode the element size as a run of ones.
        (!(2 * esize - 1) & 0x3F) | (ones - 1)
    };
    Some((n << 12) | (immr << 6) | imms)
}

/// Expand an `N:immr:imms` field back to the immediate value.
///
/// Returns `None` for reserved field combinations, which makes the
/// containing word an undefined encoding.
pub(crate) fn decode_bitmask_imm(n: u32, immr: u32, imms: u32, is64: bool) -> Option<u64> {
    if !is64 && n != 0 {
        return None;
    }
    // Element size: position of the highest set bit of N:NOT(imms).
    let lead = (n << 6) | (!imms & 0x3F);
    if lead == 0 {
        return None;
    }
    let len = 31 - lead.leading_zeros();
    let esize = 1u32 << len;
    let levels = esize - 1;

    let s = imms & levels;
    let r = immr & levels;
    if s == levels {
        // A full run of ones is reserved.
        return None;
    }

    let run = u64::MAX >> (64 - (s + 1));
    let mut elem = ror(run, r, esize);

    // Replicate the element across 64 bits.
    let mut size = esize;
    while size < 64 {
        elem |= elem << size;
        size *= 2;
    }
    Some(if is64 { elem } else { elem & 0xFFFF_FFFF })
}

/// Rotate the low `esize` bits of `value` right by `amount`.
fn ror(value: u64, amount: u32, esize: u32) -> u64 {
    if esize == 64 {
        return value.rotate_right(amount);
    }
    let mask = u64::MAX >> (64 - esize);
    let value = value & mask;
    if amount == 0 {
        value
    } else {
        ((value >> amount) | (value << (esize - amount))) & mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::check_table;

    #[test]
    fn table_is_structurally_valid() {
        check_table(RULES, 0xFFFF_FFFF);
    }

    #[test]
    fn aliases_are_more_specific_than_their_base() {
        // `cmp` (subs Rd=31) must be scanned before `subs`.
        let cmp = RULES
            .iter()
            .position(|r| r.mnemonic == "cmp" && r.value == 0x7100_001F)
            .unwrap();
        let subs = RULES
            .iter()
            .position(|r| r.mnemonic == "subs" && r.value == 0x7100_0000)
            .unwrap();
        assert!(cmp < subs);
    }

    #[test]
    fn bitmask_known_values() {
        // and w3, w3, #0xff → imms run of 8 ones, no rotation.
        assert_eq!(encode_bitmask_imm(0xFF, false), Some(0x007));
        // 64-bit all-but-low-bit: 0xFFFF_FFFF_FFFF_FFFE = ~1.
        let field = encode_bitmask_imm(!1u64, true).unwrap();
        assert_eq!(
            decode_bitmask_imm(field >> 12, (field >> 6) & 0x3F, field & 0x3F, true),
            Some(!1u64)
        );
    }

    #[test]
    fn bitmask_rejects_degenerate_values() {
        assert_eq!(encode_bitmask_imm(0, false), None);
        assert_eq!(encode_bitmask_imm(0, true), None);
        assert_eq!(encode_bitmask_imm(u64::MAX, true), None);
        assert_eq!(encode_bitmask_imm(0xFFFF_FFFF, false), None);
        // Not a rotated run: 0b101.
        assert_eq!(encode_bitmask_imm(0b101, true), None);
    }

    #[test]
    fn bitmask_round_trips() {
        for value in [
            0x1u64,
            0x3,
            0xF0,
            0xFF,
            0xFF00,
            0x0000_FFFF,
            0xFFFF_0000,
            0x5555_5555,
            0x8000_0001,
        ] {
            let field = encode_bitmask_imm(value, false).unwrap_or_else(|| {
                panic!("0x{value:x} should encode");
            });
            let back =
                decode_bitmask_imm(field >> 12, (field >> 6) & 0x3F, field & 0x3F, false).unwrap();
            assert_eq!(back, value, "0x{value:x}");
        }
        for value in [0x1u64, 0xFFFF_FFFF_0000_0000, 0xAAAA_AAAA_AAAA_AAAA, !0xFFu64] {
            let field = encode_bitmask_imm(value, true).unwrap();
            let back =
                decode_bitmask_imm(field >> 12, (field >> 6) & 0x3F, field & 0x3F, true).unwrap();
            assert_eq!(back, value, "0x{value:x}");
        }
    }

    #[test]
    fn decode_rejects_reserved_fields() {
        // 32-bit with N set.
        assert_eq!(decode_bitmask_imm(1, 0, 0x01, false), None);
        // Full run of ones at 64-bit element size.
        assert_eq!(decode_bitmask_imm(1, 0, 0x3F, true), None);
    }
}
