//! Lexer for one line of ARM assembly text.
//!
//! The lexer splits a line into a small stream of [`Token`]s. Token text is
//! borrowed from the source string, so no allocation happens on the happy
//! path; error variants carry an owned copy of the offending text.
//!
//! `#`-prefixed immediates are resolved to their numeric value here, because
//! the `#` marker is unambiguous in ARM syntax and handling it in one place
//! keeps the parser free of sign/radix concerns.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::str;

use crate::error::ConvError;

/// A token produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token<'src> {
    /// Token classification.
    pub kind: TokenKind,
    /// Source text of the token, borrowed from the input line.
    pub text: &'src str,
}

/// The type of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// An identifier: mnemonic, register name, or shift name. May contain
    /// `.` (`b.ne`).
    Ident,
    /// A `#`-prefixed immediate, already parsed to its value.
    Imm(i64),
    /// A bare numeric literal (no `#`). Never a valid operand; kept as a
    /// token so the parser can report it precisely.
    Number(i64),
    /// Comma separator.
    Comma,
    /// Open bracket `[` (memory operand).
    OpenBracket,
    /// Close bracket `]`.
    CloseBracket,
    /// Exclamation mark `!` (pre-index writeback).
    Bang,
}

/// Tokenize one line of assembly.
///
/// Recognized tokens: identifiers, `#`-immediates (decimal or `0x` hex,
/// optional leading `-`), bare numbers, `,`, `[`, `]`, `!`. Comments run
/// from `;` or `//` to end of line. Anything else is
/// [`ConvError::UnknownOperandSyntax`].
pub(crate) fn tokenize(line: &str) -> Result<Vec<Token<'_>>, ConvError> {
    let mut tokens = Vec::new();
    let bytes = line.as_bytes();
    let len = bytes.len();
    let mut pos = 0;

    while pos < len {
        let ch = bytes[pos];

        // Whitespace
        if ch == b' ' || ch == b'\t' || ch == b'\r' || ch == b'\n' {
            pos += 1;
            continue;
        }

        // Comment: ';' or '//' to end of line
        if ch == b';' {
            break;
        }
        if ch == b'/' && pos + 1 < len && bytes[pos + 1] == b'/' {
            break;
        }

        // Single-byte punctuation
        let punct = match ch {
            b',' => Some(TokenKind::Comma),
            b'[' => Some(TokenKind::OpenBracket),
            b']' => Some(TokenKind::CloseBracket),
            b'!' => Some(TokenKind::Bang),
            _ => None,
        };
        if let Some(kind) = punct {
            tokens.push(Token {
                kind,
                text: &line[pos..pos + 1],
            });
            pos += 1;
            continue;
        }

        // Immediate: '#' with optional '-', then decimal or 0x hex
        if ch == b'#' {
            let start = pos;
            pos += 1;
            let negative = pos < len && bytes[pos] == b'-';
            if negative {
                pos += 1;
            }
            let num_start = pos;
            while pos < len && (bytes[pos].is_ascii_alphanumeric()) {
                pos += 1;
            }
            let text = &line[start..pos];
            let value = parse_number(&line[num_start..pos])
                .ok_or_else(|| ConvError::MalformedImmediate {
                    text: text.to_string(),
                })?;
            let value = if negative { value.wrapping_neg() } else { value };
            tokens.push(Token {
                kind: TokenKind::Imm(value),
                text,
            });
            continue;
        }

        // Bare number
        if ch.is_ascii_digit() {
            let start = pos;
            while pos < len && bytes[pos].is_ascii_alphanumeric() {
                pos += 1;
            }
            let text = &line[start..pos];
            let value = parse_number(text).ok_or_else(|| ConvError::UnknownOperandSyntax {
                token: text.to_string(),
            })?;
            tokens.push(Token {
                kind: TokenKind::Number(value),
                text,
            });
            continue;
        }

        // Identifier: mnemonic, register, shift name; '.' allowed for the
        // AArch64 `b.<cond>` spelling
        if ch.is_ascii_alphabetic() || ch == b'_' {
            let start = pos;
            while pos < len
                && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_' || bytes[pos] == b'.')
            {
                pos += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Ident,
                text: &line[start..pos],
            });
            continue;
        }

        return Err(ConvError::UnknownOperandSyntax {
            token: char_at(line, pos),
        });
    }

    Ok(tokens)
}

/// Parse a decimal or `0x`-prefixed hex magnitude.
///
/// Hex accepts the full 64-bit range and wraps into `i64` (branch targets
/// are written as wrapped unsigned addresses, e.g. `#0xfffffffffffcbff4`);
/// decimal must fit `i64`. Returns `None` on empty, non-numeric or
/// overflowing input.
fn parse_number(text: &str) -> Option<i64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        if hex.is_empty() {
            return None;
        }
        return u64::from_str_radix(hex, 16).ok().map(|v| v as i64);
    }
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<i64>().ok()
}

/// The UTF-8 character starting at byte `pos`, as an owned string.
fn char_at(line: &str, pos: usize) -> String {
    line[pos..]
        .chars()
        .next()
        .map(|c| c.to_string())
        .unwrap_or_default()
}
