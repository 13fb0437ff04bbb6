//! Instruction-table machinery: bidirectional encoding rules and lookup.
//!
//! Each instruction form is one [`Rule`]: fixed opcode bits plus a list of
//! [`Arg`] descriptors giving the position and semantics of every variable
//! field. The same rule drives both directions — the encoder fills the
//! variable fields from parsed operands, the decoder extracts and renders
//! them — so the two sides cannot drift apart.
//!
//! Decoding matches `word & mask == value`. Masks are derived from the arg
//! list at compile time, and each table is authored most-specific-first
//! (descending mask popcount); [`is_sorted_by_specificity`] is checked by a
//! `const` assertion next to each table, so a misordered table fails to
//! build.

use alloc::string::{String, ToString};

use crate::ir::{AddrMode, ArchMode, Family, Inst, Operand, Register};
use crate::error::ConvError;

/// Where a rule places its condition code, if anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CondAt {
    /// Unconditional instruction.
    None,
    /// A32: bits 28..31. Encodes `al` (0xE) when no suffix is written.
    A32,
    /// AArch64 `b.<cond>`: bits 0..3.
    A64Low,
    /// Thumb conditional branch: bits 8..11.
    Thumb8,
}

/// Register class a field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RegClass {
    /// AArch64 32-bit (`w` file).
    W,
    /// AArch64 64-bit (`x` file).
    X,
    /// AArch32/Thumb `r` file.
    A,
}

/// What register number 31 means in an AArch64 field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum R31 {
    /// 31 is the stack pointer (`sp`/`wsp`).
    Sp,
    /// 31 is the zero register (`xzr`/`wzr`).
    Zr,
}

/// One variable field (or field group) of an instruction word.
///
/// Args are listed in operand order; `Fixed` entries consume no operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Arg {
    /// AArch64 5-bit register field.
    Gpr { lsb: u8, cls: RegClass, r31: R31 },
    /// AArch32/Thumb register field, `bits` wide (3 or 4).
    Arm { lsb: u8, bits: u8 },
    /// Thumb split register field: low 3 bits at 0, high bit at 7. Accepts
    /// the full `r` file (high-register MOV/ADD forms).
    ArmHi,
    /// Unsigned immediate.
    UImm { lsb: u8, bits: u8 },
    /// PC-relative branch target: signed field of `bits`, byte offset =
    /// field × `step` (the mode's natural alignment).
    Target { lsb: u8, bits: u8, step: u8 },
    /// A32 rotated imm8 "operand2" at bits 0..11 (imm8 ROR 2×rot4).
    RotImm,
    /// AArch64 logical bitmask immediate: imms:immr at bit 10, N at 22
    /// (64-bit forms only; 32-bit forms have N fixed to 0).
    Bitmask { is64: bool },
    /// AArch64 ADR split immediate: immlo at 29, immhi at 5.
    AdrImm,
    /// A32 MOVW/MOVT split imm16: imm4 at 16, imm12 at 0.
    MovwImm,
    /// Register with barrel shift (kind field is 2 bits).
    Shifted {
        rm_lsb: u8,
        rm_bits: u8,
        kind_lsb: u8,
        amt_lsb: u8,
        amt_bits: u8,
        cls: RegClass,
    },
    /// `[rn{, #imm}]` with an unsigned scaled offset; addressing per `mode`
    /// (A32 writes its pre/post-indexed forms with this same field layout).
    MemU {
        rn_lsb: u8,
        rn_bits: u8,
        off_lsb: u8,
        off_bits: u8,
        scale: u16,
        mode: AddrMode,
    },
    /// AArch64 `[rn, #simm9]` pre/post-index (imm9 at 12, rn at 5).
    MemS9 { pre: bool },
    /// `[rn, rm]` register offset.
    MemReg {
        rn_lsb: u8,
        rn_bits: u8,
        rm_lsb: u8,
        rm_bits: u8,
    },
    /// Fixed field value; consumes no operand. Used by aliases (`cmp` is
    /// `subs` with Rd fixed to 31) and gains decode specificity.
    Fixed { lsb: u8, bits: u8, val: u32 },
}

const fn bits_at(lsb: u8, bits: u8) -> u32 {
    (((1u64 << bits) - 1) as u32) << lsb
}

impl Arg {
    /// The word bits this arg varies (excluded from the decode mask).
    pub(crate) const fn variable_bits(&self) -> u32 {
        match *self {
            Arg::Gpr { lsb, .. } => bits_at(lsb, 5),
            Arg::Arm { lsb, bits } => bits_at(lsb, bits),
            Arg::ArmHi => bits_at(0, 3) | bits_at(7, 1),
            Arg::UImm { lsb, bits } => bits_at(lsb, bits),
            Arg::Target { lsb, bits, .. } => bits_at(lsb, bits),
            Arg::RotImm => bits_at(0, 12),
            Arg::Bitmask { is64 } => {
                if is64 {
                    bits_at(10, 13)
                } else {
                    bits_at(10, 12)
                }
            }
            Arg::AdrImm => bits_at(29, 2) | bits_at(5, 19),
            Arg::MovwImm => bits_at(16, 4) | bits_at(0, 12),
            Arg::Shifted {
                rm_lsb,
                rm_bits,
                kind_lsb,
                amt_lsb,
                amt_bits,
                ..
            } => bits_at(rm_lsb, rm_bits) | bits_at(kind_lsb, 2) | bits_at(amt_lsb, amt_bits),
            Arg::MemU {
                rn_lsb,
                rn_bits,
                off_lsb,
                off_bits,
                ..
            } => bits_at(rn_lsb, rn_bits) | bits_at(off_lsb, off_bits),
            Arg::MemS9 { .. } => bits_at(5, 5) | bits_at(12, 9),
            Arg::MemReg {
                rn_lsb,
                rn_bits,
                rm_lsb,
                rm_bits,
            } => bits_at(rn_lsb, rn_bits) | bits_at(rm_lsb, rm_bits),
            Arg::Fixed { .. } => 0,
        }
    }

    /// Whether this arg consumes a source operand.
    pub(crate) const fn takes_operand(&self) -> bool {
        !matches!(*self, Arg::Fixed { .. })
    }
}

impl CondAt {
    pub(crate) const fn variable_bits(self) -> u32 {
        match self {
            CondAt::None => 0,
            CondAt::A32 => bits_at(28, 4),
            CondAt::A64Low => bits_at(0, 4),
            CondAt::Thumb8 => bits_at(8, 4),
        }
    }
}

/// One instruction form: fixed bits plus variable-field descriptors.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Rule {
    /// Base mnemonic (condition suffix excluded).
    pub mnemonic: &'static str,
    /// All fixed bits of the word, including `Fixed` arg values. This is
    /// both the decode match value and the encoder's accumulator seed.
    pub value: u32,
    /// Fixed-bit mask: every bit not covered by a variable field.
    pub mask: u32,
    /// Condition-code placement.
    pub cond: CondAt,
    /// Variable fields in operand order.
    pub args: &'static [Arg],
    /// False for encode-only aliases whose words are rendered by a more
    /// canonical rule (e.g. `movz` with hw=0 decodes as `mov`).
    pub decode: bool,
}

const fn build(
    mnemonic: &'static str,
    base: u32,
    cond: CondAt,
    args: &'static [Arg],
    word_mask: u32,
    decode: bool,
) -> Rule {
    let mut variable = cond.variable_bits();
    let mut value = base;
    let mut i = 0;
    while i < args.len() {
        variable |= args[i].variable_bits();
        if let Arg::Fixed { lsb, bits, val } = args[i] {
            value |= (val & ((1u32 << bits) - 1)) << lsb;
        }
        i += 1;
    }
    Rule {
        mnemonic,
        value,
        mask: word_mask & !variable,
        cond,
        args,
        decode,
    }
}

impl Rule {
    /// A 32-bit rule (AArch64 / A32).
    pub(crate) const fn new32(
        mnemonic: &'static str,
        base: u32,
        cond: CondAt,
        args: &'static [Arg],
    ) -> Rule {
        build(mnemonic, base, cond, args, 0xFFFF_FFFF, true)
    }

    /// A 16-bit rule (Thumb).
    pub(crate) const fn new16(
        mnemonic: &'static str,
        base: u32,
        cond: CondAt,
        args: &'static [Arg],
    ) -> Rule {
        build(mnemonic, base, cond, args, 0xFFFF, true)
    }

    /// Mark the rule encode-only.
    pub(crate) const fn encode_only(mut self) -> Rule {
        self.decode = false;
        self
    }
}

/// Compile-time check that a table is ordered by descending fixed-bit count,
/// so a generic rule can never shadow a more specific one.
pub(crate) const fn is_sorted_by_specificity(rules: &[Rule]) -> bool {
    let mut i = 1;
    while i < rules.len() {
        if rules[i].mask.count_ones() > rules[i - 1].mask.count_ones() {
            return false;
        }
        i += 1;
    }
    true
}

/// The rule table for a mode family.
pub(crate) fn rules_for(family: Family) -> &'static [Rule] {
    match family {
        Family::A64 => crate::aarch64::RULES,
        Family::A32 => crate::arm::A32_RULES,
        Family::Thumb => crate::arm::THUMB_RULES,
    }
}

/// Find the encoding rule for a parsed instruction.
///
/// Exact match on mnemonic plus operand shape. Distinguishes "mnemonic not
/// known at all" from "known mnemonic, unsupported operand form".
pub(crate) fn lookup_encoding(inst: &Inst<'_>, mode: ArchMode) -> Result<&'static Rule, ConvError> {
    let rules = rules_for(mode.family());
    let mut mnemonic_seen = false;
    for rule in rules {
        if !rule.mnemonic.eq_ignore_ascii_case(inst.mnemonic) {
            continue;
        }
        mnemonic_seen = true;
        // A condition suffix requires a rule with a condition field, and
        // the dedicated condition placements require a suffix: a bare `b`
        // is the unconditional branch, never `b.al`. A32 rules encode `al`
        // by default and accept either spelling.
        match rule.cond {
            CondAt::None if inst.cond.is_some() => continue,
            CondAt::A64Low | CondAt::Thumb8 if inst.cond.is_none() => continue,
            _ => {}
        }
        if args_match(rule.args, &inst.operands) {
            return Ok(rule);
        }
    }
    if mnemonic_seen {
        Err(ConvError::UnsupportedOperandForm {
            mnemonic: inst.mnemonic.to_string(),
            detail: shape_desc(&inst.operands),
        })
    } else {
        Err(ConvError::UnknownMnemonic {
            mnemonic: inst.mnemonic.to_string(),
            mode,
        })
    }
}

/// Find the decoding rule for a word: first full mask/value match in the
/// specificity-ordered table.
pub(crate) fn lookup_decoding(word: u32, family: Family) -> Option<&'static Rule> {
    rules_for(family)
        .iter()
        .find(|r| r.decode && (word & r.mask) == r.value)
}

/// Whether any rule for this mnemonic carries a condition field. Used by
/// the parser to decide if a condition suffix may be stripped.
pub(crate) fn has_conditional_rule(mnemonic: &str, family: Family) -> bool {
    rules_for(family)
        .iter()
        .any(|r| r.cond != CondAt::None && r.mnemonic.eq_ignore_ascii_case(mnemonic))
}

/// Whether the mnemonic exists at all in this family's table.
pub(crate) fn has_mnemonic(mnemonic: &str, family: Family) -> bool {
    rules_for(family)
        .iter()
        .any(|r| r.mnemonic.eq_ignore_ascii_case(mnemonic))
}

fn args_match(args: &[Arg], ops: &[Operand]) -> bool {
    let mut oi = 0;
    for arg in args {
        if !arg.takes_operand() {
            continue;
        }
        let Some(op) = ops.get(oi) else {
            return false;
        };
        if !arg_matches(arg, op) {
            return false;
        }
        oi += 1;
    }
    oi == ops.len()
}

fn reg_in_class(reg: Register, cls: RegClass, r31: R31) -> bool {
    match cls {
        RegClass::W => match reg {
            Register::W(_) => true,
            Register::Wzr => r31 == R31::Zr,
            Register::Wsp => r31 == R31::Sp,
            _ => false,
        },
        RegClass::X => match reg {
            Register::X(_) => true,
            Register::Xzr => r31 == R31::Zr,
            Register::Sp => r31 == R31::Sp,
            _ => false,
        },
        RegClass::A => matches!(reg, Register::R(_)),
    }
}

fn arg_matches(arg: &Arg, op: &Operand) -> bool {
    match (*arg, *op) {
        (Arg::Gpr { cls, r31, .. }, Operand::Register(r)) => reg_in_class(r, cls, r31),
        (Arg::Arm { bits, .. }, Operand::Register(Register::R(n))) => u32::from(n) < (1 << bits),
        (Arg::ArmHi, Operand::Register(Register::R(_))) => true,
        (
            Arg::UImm { .. }
            | Arg::Target { .. }
            | Arg::RotImm
            | Arg::Bitmask { .. }
            | Arg::AdrImm
            | Arg::MovwImm,
            Operand::Immediate(_),
        ) => true,
        (Arg::Shifted { cls, .. }, Operand::ShiftedRegister { reg, .. }) => {
            reg_in_class(reg, cls, R31::Zr)
        }
        (Arg::MemU { rn_bits, mode, .. }, Operand::Memory(m)) => {
            m.index.is_none()
                && m.addr_mode == mode
                && mem_base_ok(m.base, rn_bits)
        }
        (Arg::MemS9 { pre }, Operand::Memory(m)) => {
            let want = if pre {
                AddrMode::PreIndex
            } else {
                AddrMode::PostIndex
            };
            m.index.is_none() && m.addr_mode == want && mem_base_ok(m.base, 5)
        }
        (Arg::MemReg { rn_bits, rm_bits, .. }, Operand::Memory(m)) => {
            let Some(index) = m.index else { return false };
            m.addr_mode == AddrMode::Offset
                && m.offset == 0
                && mem_base_ok(m.base, rn_bits)
                && mem_index_ok(index, rm_bits)
        }
        _ => false,
    }
}

/// A 5-bit base field is AArch64 (64-bit register or sp); narrower fields
/// are the A32/Thumb `r` file.
fn mem_base_ok(base: Register, rn_bits: u8) -> bool {
    if rn_bits == 5 {
        matches!(base, Register::X(_) | Register::Sp)
    } else {
        matches!(base, Register::R(n) if u32::from(n) < (1 << rn_bits))
    }
}

fn mem_index_ok(index: Register, rm_bits: u8) -> bool {
    if rm_bits == 5 {
        matches!(index, Register::X(_) | Register::Xzr)
    } else {
        matches!(index, Register::R(n) if u32::from(n) < (1 << rm_bits))
    }
}

/// Human-readable operand shape, e.g. `(register, immediate)`.
fn shape_desc(ops: &[Operand]) -> String {
    if ops.is_empty() {
        return "no operands".to_string();
    }
    let mut out = String::from("(");
    for (i, op) in ops.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(op.kind_name());
    }
    out.push(')');
    out
}

/// Structural validation shared by the per-family table tests: every fixed
/// value within the mask, variable fields pairwise disjoint and inside the
/// word, and no two decodable rules of equal specificity able to match the
/// same word.
#[cfg(test)]
pub(crate) fn check_table(rules: &[Rule], word_mask: u32) {
    for rule in rules {
        assert_eq!(
            rule.value & rule.mask,
            rule.value,
            "{}: fixed bits stray into a variable field",
            rule.mnemonic
        );
        assert_eq!(
            rule.value & !word_mask,
            0,
            "{}: value exceeds word width",
            rule.mnemonic
        );

        let mut seen = rule.cond.variable_bits();
        for arg in rule.args {
            let bits = arg.variable_bits();
            assert_eq!(
                bits & !word_mask,
                0,
                "{}: field exceeds word width",
                rule.mnemonic
            );
            assert_eq!(
                seen & bits,
                0,
                "{}: overlapping fields in arg list",
                rule.mnemonic
            );
            seen |= bits;
        }
    }

    for (i, a) in rules.iter().enumerate() {
        for b in &rules[i + 1..] {
            if !a.decode || !b.decode {
                continue;
            }
            if a.mask.count_ones() != b.mask.count_ones() {
                continue;
            }
            let shared = a.mask & b.mask;
            assert_ne!(
                a.value & shared,
                b.value & shared,
                "{} / {}: equally specific rules can match the same word",
                a.mnemonic,
                b.mnemonic
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::MemoryRef;

    const RD: Arg = Arg::Gpr {
        lsb: 0,
        cls: RegClass::W,
        r31: R31::Zr,
    };
    const IMM12: Arg = Arg::UImm { lsb: 10, bits: 12 };

    #[test]
    fn mask_derivation() {
        const ARGS: [Arg; 2] = [RD, IMM12];
        const RULE: Rule = Rule::new32("t", 0x5280_0000, CondAt::None, &ARGS);
        // Variable: bits 0..4 and 10..21. Everything else fixed.
        assert_eq!(RULE.mask, 0xFFC0_03E0);
        assert_eq!(RULE.value, 0x5280_0000);
        assert!(RULE.decode);
    }

    #[test]
    fn fixed_arg_joins_value_and_mask() {
        const ARGS: [Arg; 2] = [
            Arg::Gpr {
                lsb: 5,
                cls: RegClass::W,
                r31: R31::Sp,
            },
            Arg::Fixed {
                lsb: 0,
                bits: 5,
                val: 31,
            },
        ];
        const RULE: Rule = Rule::new32("t", 0x7100_0000, CondAt::None, &ARGS);
        assert_eq!(RULE.value & 0x1F, 31);
        assert_eq!(RULE.mask & 0x1F, 0x1F);
    }

    #[test]
    fn cond_bits_leave_the_mask() {
        const RULE: Rule = Rule::new32("t", 0x0A00_0000, CondAt::A32, &[]);
        assert_eq!(RULE.mask, 0x0FFF_FFFF);
    }

    #[test]
    fn encode_only_rules_skip_decode() {
        const RULE: Rule = Rule::new32("t", 0x5280_0000, CondAt::None, &[]).encode_only();
        assert!(!RULE.decode);
    }

    #[test]
    fn sortedness_check() {
        const SORTED: [Rule; 2] = [
            Rule::new32("a", 0, CondAt::None, &[]),
            Rule::new32("b", 0, CondAt::None, &[IMM12]),
        ];
        assert!(is_sorted_by_specificity(&SORTED));

        const UNSORTED: [Rule; 2] = [SORTED[1], SORTED[0]];
        assert!(!is_sorted_by_specificity(&UNSORTED));
    }

    #[test]
    fn register_class_matching() {
        assert!(reg_in_class(Register::W(3), RegClass::W, R31::Zr));
        assert!(reg_in_class(Register::Wzr, RegClass::W, R31::Zr));
        assert!(!reg_in_class(Register::Wzr, RegClass::W, R31::Sp));
        assert!(reg_in_class(Register::Sp, RegClass::X, R31::Sp));
        assert!(!reg_in_class(Register::Sp, RegClass::X, R31::Zr));
        assert!(!reg_in_class(Register::X(0), RegClass::W, R31::Zr));
        assert!(reg_in_class(Register::R(7), RegClass::A, R31::Zr));
    }

    #[test]
    fn low_register_fields_reject_high_registers() {
        let arm3 = Arg::Arm { lsb: 0, bits: 3 };
        assert!(arg_matches(&arm3, &Operand::Register(Register::R(7))));
        assert!(!arg_matches(&arm3, &Operand::Register(Register::R(8))));
        assert!(arg_matches(&Arg::ArmHi, &Operand::Register(Register::R(12))));
    }

    #[test]
    fn memory_arg_matching() {
        let uoff = Arg::MemU {
            rn_lsb: 5,
            rn_bits: 5,
            off_lsb: 10,
            off_bits: 12,
            scale: 4,
            mode: AddrMode::Offset,
        };
        let plain = Operand::Memory(MemoryRef::base_only(Register::X(1)));
        assert!(arg_matches(&uoff, &plain));

        let pre = Operand::Memory(MemoryRef {
            addr_mode: AddrMode::PreIndex,
            ..MemoryRef::base_only(Register::X(1))
        });
        assert!(!arg_matches(&uoff, &pre));
        assert!(arg_matches(&Arg::MemS9 { pre: true }, &pre));
        assert!(!arg_matches(&Arg::MemS9 { pre: false }, &pre));

        // w register is not a valid 64-bit base
        let w_base = Operand::Memory(MemoryRef::base_only(Register::W(1)));
        assert!(!arg_matches(&uoff, &w_base));
    }
}
