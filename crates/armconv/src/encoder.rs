//! Encoder: assembly text → machine word.
//!
//! [`assemble_line`] runs the full pipeline: parse, rule lookup, field
//! rendering. Rendering starts from the rule's fixed bits and fills one
//! variable field per operand; all value validation that depends on the
//! selected rule (immediate ranges, offset alignment, shift limits) happens
//! here, after shape matching has already picked the rule.
//!
//! Branch operands are written as absolute target addresses. The encoded
//! field is the displacement from the instruction's address plus the mode's
//! PC bias (0 for A64, 8 for A32, 4 for Thumb); in the 32-bit modes the
//! displacement is computed in 32-bit address space, so targets that wrap
//! around zero encode the short way round.

use alloc::format;
use alloc::string::ToString;

use crate::aarch64::encode_bitmask_imm;
use crate::arm::encode_rot_imm;
use crate::error::ConvError;
use crate::ir::{ArchMode, Cond, Family, Inst, MachineWord, Operand};
use crate::parser;
use crate::table::{self, Arg, CondAt, RegClass, Rule};

/// Assemble one line at the given address.
pub(crate) fn assemble_line(
    line: &str,
    mode: ArchMode,
    addr: u64,
) -> Result<MachineWord, ConvError> {
    let inst = parser::parse_line(line, mode)?;
    let rule = table::lookup_encoding(&inst, mode)?;
    let word = render_word(&inst, rule, mode, addr)?;
    Ok(MachineWord::new(word, mode))
}

fn render_word(
    inst: &Inst<'_>,
    rule: &Rule,
    mode: ArchMode,
    addr: u64,
) -> Result<u32, ConvError> {
    let mut word = rule.value;
    let cond = inst.cond.unwrap_or(Cond::Al);
    match rule.cond {
        CondAt::None => {}
        CondAt::A32 => word |= cond.code() << 28,
        CondAt::A64Low => word |= cond.code(),
        CondAt::Thumb8 => word |= cond.code() << 8,
    }

    let mut ops = inst.operands.iter();
    for arg in rule.args {
        if !arg.takes_operand() {
            continue;
        }
        let op = ops.next().expect("operand count checked during lookup");
        encode_arg(&mut word, arg, op, inst.mnemonic, mode, addr)?;
    }
    Ok(word)
}

fn encode_arg(
    word: &mut u32,
    arg: &Arg,
    op: &Operand,
    mnemonic: &str,
    mode: ArchMode,
    addr: u64,
) -> Result<(), ConvError> {
    match (*arg, *op) {
        (Arg::Gpr { lsb, .. }, Operand::Register(r)) => {
            *word |= r.num() << lsb;
        }
        (Arg::Arm { lsb, .. }, Operand::Register(r)) => {
            *word |= r.num() << lsb;
        }
        (Arg::ArmHi, Operand::Register(r)) => {
            let n = r.num();
            *word |= (n & 7) | ((n >> 3) << 7);
        }
        (Arg::UImm { lsb, bits }, Operand::Immediate(value)) => {
            let max = (1i64 << bits) - 1;
            if !(0..=max).contains(&value) {
                return Err(range(mnemonic, value, 0, max));
            }
            *word |= (value as u32) << lsb;
        }
        (Arg::Target { lsb, bits, step }, Operand::Immediate(target)) => {
            let offset = branch_offset(target, mode, addr);
            let step = i64::from(step);
            if offset % step != 0 {
                return Err(ConvError::MisalignedImmediate {
                    mnemonic: mnemonic.to_string(),
                    value: offset,
                    align: step as u32,
                });
            }
            let units = offset / step;
            let lo = -(1i64 << (bits - 1));
            let hi = (1i64 << (bits - 1)) - 1;
            if !(lo..=hi).contains(&units) {
                return Err(range(mnemonic, offset, lo * step, hi * step));
            }
            let mask = ((1u64 << bits) - 1) as u32;
            *word |= ((units as u32) & mask) << lsb;
        }
        (Arg::RotImm, Operand::Immediate(value)) => {
            let raw = u32::try_from(value)
                .map_err(|_| range(mnemonic, value, 0, i64::from(u32::MAX)))?;
            let field = encode_rot_imm(raw).ok_or_else(|| ConvError::UnsupportedOperandForm {
                mnemonic: mnemonic.to_string(),
                detail: format!("#0x{:x} is not an encodable rotated immediate", raw),
            })?;
            *word |= field;
        }
        (Arg::Bitmask { is64 }, Operand::Immediate(value)) => {
            let raw = value as u64;
            if !is64 {
                // A 32-bit pattern, possibly written sign-extended.
                let upper = raw >> 32;
                if upper != 0 && upper != 0xFFFF_FFFF {
                    return Err(range(mnemonic, value, 0, i64::from(u32::MAX)));
                }
            }
            let field =
                encode_bitmask_imm(raw, is64).ok_or_else(|| ConvError::UnsupportedOperandForm {
                    mnemonic: mnemonic.to_string(),
                    detail: format!(
                        "#0x{:x} is not an encodable bitmask immediate",
                        if is64 { raw } else { raw & 0xFFFF_FFFF }
                    ),
                })?;
            *word |= field << 10;
        }
        (Arg::AdrImm, Operand::Immediate(target)) => {
            let offset = branch_offset(target, mode, addr);
            let lo = -(1i64 << 20);
            let hi = (1i64 << 20) - 1;
            if !(lo..=hi).contains(&offset) {
                return Err(range(mnemonic, offset, lo, hi));
            }
            let field = (offset as u32) & 0x1F_FFFF;
            *word |= (field & 3) << 29;
            *word |= (field >> 2) << 5;
        }
        (Arg::MovwImm, Operand::Immediate(value)) => {
            if !(0..=0xFFFF).contains(&value) {
                return Err(range(mnemonic, value, 0, 0xFFFF));
            }
            let v = value as u32;
            *word |= (v >> 12) << 16;
            *word |= v & 0xFFF;
        }
        (
            Arg::Shifted {
                rm_lsb,
                kind_lsb,
                amt_lsb,
                cls,
                ..
            },
            Operand::ShiftedRegister { reg, kind, amount },
        ) => {
            let max = if cls == RegClass::X { 63 } else { 31 };
            if i64::from(amount) > max {
                return Err(range(mnemonic, i64::from(amount), 0, max));
            }
            *word |= reg.num() << rm_lsb;
            *word |= kind.code() << kind_lsb;
            *word |= u32::from(amount) << amt_lsb;
        }
        (
            Arg::MemU {
                rn_lsb,
                off_lsb,
                off_bits,
                scale,
                ..
            },
            Operand::Memory(m),
        ) => {
            let scale = i64::from(scale);
            if m.offset % scale != 0 {
                return Err(ConvError::MisalignedImmediate {
                    mnemonic: mnemonic.to_string(),
                    value: m.offset,
                    align: scale as u32,
                });
            }
            let max = ((1i64 << off_bits) - 1) * scale;
            if !(0..=max).contains(&m.offset) {
                return Err(range(mnemonic, m.offset, 0, max));
            }
            *word |= m.base.num() << rn_lsb;
            *word |= ((m.offset / scale) as u32) << off_lsb;
        }
        (Arg::MemS9 { .. }, Operand::Memory(m)) => {
            if !(-256..=255).contains(&m.offset) {
                return Err(range(mnemonic, m.offset, -256, 255));
            }
            *word |= m.base.num() << 5;
            *word |= ((m.offset as u32) & 0x1FF) << 12;
        }
        (Arg::MemReg { rn_lsb, rm_lsb, .. }, Operand::Memory(m)) => {
            *word |= m.base.num() << rn_lsb;
            if let Some(index) = m.index {
                *word |= index.num() << rm_lsb;
            }
        }
        _ => unreachable!("operand shape checked during lookup"),
    }
    Ok(())
}

/// Displacement from the PC reference point to the absolute target.
///
/// 32-bit modes wrap in 32-bit address space before sign extension.
fn branch_offset(target: i64, mode: ArchMode, addr: u64) -> i64 {
    let base = addr.wrapping_add(mode.pc_bias());
    if mode.family() == Family::A64 {
        (target as u64).wrapping_sub(base) as i64
    } else {
        i64::from((target as u32).wrapping_sub(base as u32) as i32)
    }
}

fn range(mnemonic: &str, value: i64, min: i64, max: i64) -> ConvError {
    ConvError::ImmediateOutOfRange {
        mnemonic: mnemonic.to_string(),
        value,
        min,
        max,
    }
}
