//! Parser: token stream → one [`Inst`].
//!
//! Operand classification is driven by syntax alone: registers by name,
//! immediates by their `#` prefix, memory references by brackets. Two
//! folds happen at comma boundaries, because their surface syntax spans
//! operands:
//!
//! - a shift group (`lsl #2`) after a register operand folds into a
//!   [`Operand::ShiftedRegister`];
//! - a trailing immediate after a bare `[rn]` folds into a post-indexed
//!   memory reference (`[rn], #4`).
//!
//! Condition suffixes are stripped by consulting the mode's table, so a
//! mnemonic that merely ends in condition-like letters (`teq`, `bls`) is
//! never misparsed: the full spelling is looked up first, and a suffix is
//! only split off when the remaining base names a conditional instruction.

use alloc::string::ToString;
use alloc::vec::Vec;

use crate::error::ConvError;
use crate::ir::{AddrMode, ArchMode, Cond, Family, Inst, MemoryRef, Operand, Register, ShiftKind};
use crate::lexer::{tokenize, Token, TokenKind};
use crate::table;

/// Parse one line of assembly under the given mode.
pub(crate) fn parse_line(line: &str, mode: ArchMode) -> Result<Inst<'_>, ConvError> {
    let tokens = tokenize(line)?;
    let Some(first) = tokens.first() else {
        return Err(ConvError::UnknownMnemonic {
            mnemonic: alloc::string::String::new(),
            mode,
        });
    };
    if first.kind != TokenKind::Ident {
        return Err(ConvError::UnknownMnemonic {
            mnemonic: first.text.to_string(),
            mode,
        });
    }

    let (mnemonic, cond) = split_condition(first.text, mode);
    let operands = parse_operands(mnemonic, &tokens[1..], mode)?;
    Ok(Inst {
        mnemonic,
        cond,
        operands,
    })
}

/// Split a condition suffix off a mnemonic, if the mode's table supports
/// the conditional base. Returns the spelling unchanged when no valid
/// split exists; the table lookup then reports it as unknown.
fn split_condition(text: &str, mode: ArchMode) -> (&str, Option<Cond>) {
    let family = mode.family();
    if family == Family::A64 {
        // AArch64 spells conditions with a dot: `b.ne`.
        if let Some((base, suffix)) = text.split_once('.') {
            if let Some(cond) = cond_suffix(suffix) {
                if table::has_conditional_rule(base, family) {
                    return (base, Some(cond));
                }
            }
        }
        return (text, None);
    }

    // A32/Thumb suffix form: the full spelling wins (`teq` is not
    // `te` + `eq`), then a two-letter suffix on a conditional base.
    if table::has_mnemonic(text, family) {
        return (text, None);
    }
    if text.len() > 2 {
        let (base, suffix) = text.split_at(text.len() - 2);
        if let Some(cond) = cond_suffix(suffix) {
            // Cond 0xF sits in the A32 unconditional space, and the Thumb
            // branch row stops at 0xD (0xE is the undefined slot, 0xF is
            // `svc`): those suffixes have no encoding and must not split.
            let encodable = match family {
                Family::Thumb => cond.code() < 0xE,
                _ => cond != Cond::Nv,
            };
            if encodable && table::has_conditional_rule(base, family) {
                return (base, Some(cond));
            }
        }
    }
    (text, None)
}

/// Case-insensitive two-letter condition suffix.
fn cond_suffix(s: &str) -> Option<Cond> {
    if s.len() != 2 {
        return None;
    }
    let b = s.as_bytes();
    let lower = [b[0].to_ascii_lowercase(), b[1].to_ascii_lowercase()];
    Cond::from_suffix(core::str::from_utf8(&lower).ok()?)
}

/// Case-insensitive shift mnemonic.
fn shift_name(s: &str) -> Option<ShiftKind> {
    if s.len() != 3 {
        return None;
    }
    let b = s.as_bytes();
    let lower = [
        b[0].to_ascii_lowercase(),
        b[1].to_ascii_lowercase(),
        b[2].to_ascii_lowercase(),
    ];
    ShiftKind::from_name(core::str::from_utf8(&lower).ok()?)
}

fn parse_operands(
    mnemonic: &str,
    tokens: &[Token<'_>],
    mode: ArchMode,
) -> Result<Vec<Operand>, ConvError> {
    let mut operands = Vec::new();
    let mut pos = 0;

    if pos < tokens.len() {
        let op = parse_operand(tokens, &mut pos, mode)?;
        operands.push(op);
    }
    while pos < tokens.len() {
        if tokens[pos].kind != TokenKind::Comma {
            return Err(unexpected(tokens, pos));
        }
        pos += 1;

        // Shift fold: `, lsl #2` after a register operand.
        if let Some(kind) = peek_shift(tokens, pos) {
            let Some(Operand::Register(reg)) = operands.last().copied() else {
                return Err(unexpected(tokens, pos));
            };
            let TokenKind::Imm(amount) = tokens[pos + 1].kind else {
                unreachable!("peek_shift checked the immediate");
            };
            if !(0..=63).contains(&amount) {
                return Err(ConvError::ImmediateOutOfRange {
                    mnemonic: mnemonic.to_string(),
                    value: amount,
                    min: 0,
                    max: 63,
                });
            }
            *operands.last_mut().unwrap() = Operand::ShiftedRegister {
                reg,
                kind,
                amount: amount as u8,
            };
            pos += 2;
            continue;
        }

        // Post-index fold: `, #4` after a bare `[rn]`.
        if let (TokenKind::Imm(offset), Some(Operand::Memory(m))) =
            (tokens[pos].kind, operands.last().copied())
        {
            if m.index.is_none() && m.offset == 0 && m.addr_mode == AddrMode::Offset {
                *operands.last_mut().unwrap() = Operand::Memory(MemoryRef {
                    offset,
                    addr_mode: AddrMode::PostIndex,
                    ..m
                });
                pos += 1;
                continue;
            }
        }

        let op = parse_operand(tokens, &mut pos, mode)?;
        operands.push(op);
    }

    Ok(operands)
}

/// Whether `tokens[pos..]` starts a shift group (`lsl #n`).
fn peek_shift(tokens: &[Token<'_>], pos: usize) -> Option<ShiftKind> {
    let tok = tokens.get(pos)?;
    if tok.kind != TokenKind::Ident {
        return None;
    }
    let kind = shift_name(tok.text)?;
    matches!(tokens.get(pos + 1)?.kind, TokenKind::Imm(_)).then_some(kind)
}

fn parse_operand(
    tokens: &[Token<'_>],
    pos: &mut usize,
    mode: ArchMode,
) -> Result<Operand, ConvError> {
    let tok = &tokens[*pos];
    match tok.kind {
        TokenKind::Imm(value) => {
            *pos += 1;
            Ok(Operand::Immediate(value))
        }
        TokenKind::Ident => {
            let reg = parse_register(tok.text, mode.family())
                .ok_or_else(|| unexpected(tokens, *pos))?;
            *pos += 1;
            Ok(Operand::Register(reg))
        }
        TokenKind::OpenBracket => {
            *pos += 1;
            parse_memory(tokens, pos, mode)
        }
        _ => Err(unexpected(tokens, *pos)),
    }
}

fn parse_memory(
    tokens: &[Token<'_>],
    pos: &mut usize,
    mode: ArchMode,
) -> Result<Operand, ConvError> {
    let base_tok = tokens.get(*pos).ok_or_else(|| unexpected(tokens, *pos))?;
    let base = match base_tok.kind {
        TokenKind::Ident => parse_register(base_tok.text, mode.family())
            .ok_or_else(|| unexpected(tokens, *pos))?,
        _ => return Err(unexpected(tokens, *pos)),
    };
    *pos += 1;

    let mut mem = MemoryRef::base_only(base);
    match tokens.get(*pos).map(|t| t.kind) {
        Some(TokenKind::CloseBracket) => {
            *pos += 1;
        }
        Some(TokenKind::Comma) => {
            *pos += 1;
            match tokens.get(*pos).map(|t| t.kind) {
                Some(TokenKind::Imm(offset)) => {
                    mem.offset = offset;
                    *pos += 1;
                }
                Some(TokenKind::Ident) => {
                    let index = parse_register(tokens[*pos].text, mode.family())
                        .ok_or_else(|| unexpected(tokens, *pos))?;
                    mem.index = Some(index);
                    *pos += 1;
                }
                _ => return Err(unexpected(tokens, *pos)),
            }
            match tokens.get(*pos).map(|t| t.kind) {
                Some(TokenKind::CloseBracket) => {
                    *pos += 1;
                }
                _ => return Err(unexpected(tokens, *pos)),
            }
        }
        _ => return Err(unexpected(tokens, *pos)),
    }

    // Writeback marker: `[rn, #imm]!`
    if tokens.get(*pos).map(|t| t.kind) == Some(TokenKind::Bang) {
        if mem.index.is_some() {
            return Err(unexpected(tokens, *pos));
        }
        mem.addr_mode = AddrMode::PreIndex;
        *pos += 1;
    }

    Ok(Operand::Memory(mem))
}

/// Register name for the mode's register file; `None` if the text is not a
/// register in that file.
fn parse_register(text: &str, family: Family) -> Option<Register> {
    if family == Family::A64 {
        for (name, reg) in [
            ("sp", Register::Sp),
            ("wsp", Register::Wsp),
            ("xzr", Register::Xzr),
            ("wzr", Register::Wzr),
            ("fp", Register::X(29)),
            ("lr", Register::X(30)),
        ] {
            if text.eq_ignore_ascii_case(name) {
                return Some(reg);
            }
        }
        let (prefix, rest) = text.split_at(1);
        let n: u8 = rest.parse().ok()?;
        if n > 30 {
            return None;
        }
        return match prefix {
            "x" | "X" => Some(Register::X(n)),
            "w" | "W" => Some(Register::W(n)),
            _ => None,
        };
    }

    for (name, n) in [("sp", 13), ("lr", 14), ("pc", 15), ("fp", 11), ("ip", 12)] {
        if text.eq_ignore_ascii_case(name) {
            return Some(Register::R(n));
        }
    }
    let (prefix, rest) = text.split_at(1);
    if prefix != "r" && prefix != "R" {
        return None;
    }
    let n: u8 = rest.parse().ok()?;
    (n <= 15).then_some(Register::R(n))
}

/// The offending token at `pos`, or the last token when input ended early.
fn unexpected(tokens: &[Token<'_>], pos: usize) -> ConvError {
    let text = tokens
        .get(pos)
        .or_else(|| tokens.last())
        .map(|t| t.text)
        .unwrap_or_default();
    ConvError::UnknownOperandSyntax {
        token: text.to_string(),
    }
}
