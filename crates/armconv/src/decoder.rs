//! Decoder: machine word → canonical assembly text.
//!
//! Decoding scans the mode's rule table for the first `word & mask ==
//! value` match; the specificity ordering guarantees aliases (`cmp`,
//! `mov`) win over their underlying forms, so the rendering is canonical.
//! Words that match no rule, carry a reserved bitmask field, or sit in the
//! A32 unconditional space (cond 0xF) are reported as undefined encodings
//! rather than guessed at.
//!
//! Immediates render with a `#` prefix, magnitudes below 10 in decimal and
//! larger ones in lowercase hex. PC-relative targets render as absolute
//! addresses, wrapped to 32 bits in the A32/Thumb modes.

use alloc::string::String;
use core::fmt::Write as _;

use crate::aarch64::decode_bitmask_imm;
use crate::arm::decode_rot_imm;
use crate::error::ConvError;
use crate::ir::{
    write_imm, write_target, AddrMode, ArchMode, Cond, Family, MachineWord, MemoryRef, Operand,
    Register, ShiftKind,
};
use crate::table::{self, Arg, CondAt, R31, RegClass};

/// Disassemble one word at the given address.
pub(crate) fn disassemble_word(word: &MachineWord, addr: u64) -> Result<String, ConvError> {
    let mode = word.mode();
    if !mode.supports_disassembly() {
        return Err(ConvError::UnsupportedModeForDisassembly { mode });
    }
    let value = word.value();
    let undefined = ConvError::UndefinedEncoding { word: value, mode };

    let family = mode.family();
    // A32 words with cond 0xF are the unconditional space, which none of
    // the table's encodings occupy.
    if family == Family::A32 && value >> 28 == 0xF {
        return Err(undefined);
    }

    let rule = table::lookup_decoding(value, family).ok_or_else(|| undefined.clone())?;

    let mut out = String::from(rule.mnemonic);
    match rule.cond {
        CondAt::None => {}
        CondAt::A32 => {
            let cond = Cond::from_code(value >> 28);
            if cond != Cond::Al {
                out.push_str(cond.name());
            }
        }
        CondAt::A64Low => {
            out.push('.');
            out.push_str(Cond::from_code(value & 0xF).name());
        }
        CondAt::Thumb8 => {
            let code = (value >> 8) & 0xF;
            // 0xE is the permanently undefined slot, 0xF belongs to SVC.
            if code >= 0xE {
                return Err(undefined);
            }
            out.push_str(Cond::from_code(code).name());
        }
    }

    let mut first = true;
    for arg in rule.args {
        if !arg.takes_operand() {
            continue;
        }
        out.push_str(if first { " " } else { ", " });
        first = false;
        render_arg(&mut out, arg, value, mode, addr).ok_or_else(|| undefined.clone())?;
    }
    Ok(out)
}

/// Render one decoded field. `None` marks a reserved field combination
/// (only bitmask immediates have any), which the caller reports as an
/// undefined encoding.
fn render_arg(out: &mut String, arg: &Arg, value: u32, mode: ArchMode, addr: u64) -> Option<()> {
    let wide = mode.family() == Family::A64;
    match *arg {
        Arg::Gpr { lsb, cls, r31 } => {
            let _ = write!(out, "{}", a64_reg((value >> lsb) & 0x1F, cls, r31));
        }
        Arg::Arm { lsb, bits } => {
            let n = (value >> lsb) & ((1 << bits) - 1);
            let _ = write!(out, "{}", Register::R(n as u8));
        }
        Arg::ArmHi => {
            let n = (value & 7) | (((value >> 7) & 1) << 3);
            let _ = write!(out, "{}", Register::R(n as u8));
        }
        Arg::UImm { lsb, bits } => {
            let v = (value >> lsb) & (((1u64 << bits) - 1) as u32);
            let _ = write_imm(out, i64::from(v));
        }
        Arg::Target { lsb, bits, step } => {
            let field = (value >> lsb) & (((1u64 << bits) - 1) as u32);
            let offset = sign_extend(field, bits) * i64::from(step);
            let _ = write_target(out, target_addr(offset, mode, addr), wide);
        }
        Arg::RotImm => {
            let _ = write_imm(out, i64::from(decode_rot_imm(value & 0xFFF)));
        }
        Arg::Bitmask { is64 } => {
            let n = (value >> 22) & 1;
            let immr = (value >> 16) & 0x3F;
            let imms = (value >> 10) & 0x3F;
            let pattern = decode_bitmask_imm(n, immr, imms, is64)?;
            // Rendered unsigned; 64-bit patterns can fill the word.
            let _ = write_target(out, pattern, true);
        }
        Arg::AdrImm => {
            let field = ((value >> 29) & 3) | (((value >> 5) & 0x7_FFFF) << 2);
            let offset = sign_extend(field, 21);
            let _ = write_target(out, target_addr(offset, mode, addr), wide);
        }
        Arg::MovwImm => {
            let v = (((value >> 16) & 0xF) << 12) | (value & 0xFFF);
            let _ = write_imm(out, i64::from(v));
        }
        Arg::Shifted {
            rm_lsb,
            rm_bits,
            kind_lsb,
            amt_lsb,
            amt_bits,
            cls,
        } => {
            let reg = if rm_bits == 5 {
                a64_reg((value >> rm_lsb) & 0x1F, cls, R31::Zr)
            } else {
                Register::R(((value >> rm_lsb) & 0xF) as u8)
            };
            let kind = ShiftKind::from_code((value >> kind_lsb) & 3);
            let amount = ((value >> amt_lsb) & (((1u64 << amt_bits) - 1) as u32)) as u8;
            let _ = write!(
                out,
                "{}",
                Operand::ShiftedRegister { reg, kind, amount }
            );
        }
        Arg::MemU {
            rn_lsb,
            rn_bits,
            off_lsb,
            off_bits,
            scale,
            mode: addr_mode,
        } => {
            let base = mem_base((value >> rn_lsb) & ((1 << rn_bits) - 1), rn_bits);
            let field = (value >> off_lsb) & (((1u64 << off_bits) - 1) as u32);
            let mem = MemoryRef {
                offset: i64::from(field) * i64::from(scale),
                addr_mode,
                ..MemoryRef::base_only(base)
            };
            let _ = write!(out, "{}", mem);
        }
        Arg::MemS9 { pre } => {
            let base = mem_base((value >> 5) & 0x1F, 5);
            let mem = MemoryRef {
                offset: sign_extend((value >> 12) & 0x1FF, 9),
                addr_mode: if pre {
                    AddrMode::PreIndex
                } else {
                    AddrMode::PostIndex
                },
                ..MemoryRef::base_only(base)
            };
            let _ = write!(out, "{}", mem);
        }
        Arg::MemReg {
            rn_lsb,
            rn_bits,
            rm_lsb,
            rm_bits,
        } => {
            let base = mem_base((value >> rn_lsb) & ((1 << rn_bits) - 1), rn_bits);
            let index = if rm_bits == 5 {
                a64_reg((value >> rm_lsb) & 0x1F, RegClass::X, R31::Zr)
            } else {
                Register::R(((value >> rm_lsb) & 0xF) as u8)
            };
            let mem = MemoryRef {
                index: Some(index),
                ..MemoryRef::base_only(base)
            };
            let _ = write!(out, "{}", mem);
        }
        Arg::Fixed { .. } => {}
    }
    Some(())
}

fn a64_reg(n: u32, cls: RegClass, r31: R31) -> Register {
    match (cls, n) {
        (RegClass::W, 31) => match r31 {
            R31::Sp => Register::Wsp,
            R31::Zr => Register::Wzr,
        },
        (RegClass::X, 31) => match r31 {
            R31::Sp => Register::Sp,
            R31::Zr => Register::Xzr,
        },
        (RegClass::W, n) => Register::W(n as u8),
        (RegClass::X, n) => Register::X(n as u8),
        (RegClass::A, n) => Register::R(n as u8),
    }
}

/// A 5-bit memory base field is AArch64 (x-file or sp).
fn mem_base(n: u32, rn_bits: u8) -> Register {
    if rn_bits == 5 {
        if n == 31 {
            Register::Sp
        } else {
            Register::X(n as u8)
        }
    } else {
        Register::R(n as u8)
    }
}

fn sign_extend(field: u32, bits: u8) -> i64 {
    let shift = 64 - u32::from(bits);
    (i64::from(field) << shift) >> shift
}

/// Absolute target address for a decoded displacement, wrapped to the
/// mode's address width.
fn target_addr(offset: i64, mode: ArchMode, addr: u64) -> u64 {
    let base = addr.wrapping_add(mode.pc_bias());
    if mode.family() == Family::A64 {
        base.wrapping_add(offset as u64)
    } else {
        u64::from((base as u32).wrapping_add(offset as u32))
    }
}
