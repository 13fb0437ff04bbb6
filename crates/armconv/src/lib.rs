//! # armconv — Pure Rust ARM Assembler/Disassembler
//!
//! `armconv` is a pure Rust, zero-C-dependency codec between ARM assembly
//! text and hex-encoded machine words: AArch64, AArch32, and Thumb, in both
//! endiannesses, one instruction per line.
//!
//! ## Quick Start
//!
//! ```rust
//! use armconv::{assemble, disassemble, ArchMode};
//!
//! let word = assemble("mov w0, #0", ArchMode::AArch64).unwrap();
//! assert_eq!(word.to_hex(), "00008052");
//!
//! let text = disassemble("C0035FD6", ArchMode::AArch64).unwrap();
//! assert_eq!(text, "ret");
//! ```
//!
//! ## Features
//!
//! - **Pure Rust** — no C/C++ FFI, no external assembler, no network.
//! - **Bidirectional** — one const rule table per architecture drives both
//!   assembly and disassembly, so the two directions cannot drift apart.
//! - **Deterministic errors** — every failure is a typed [`ConvError`]
//!   carrying the offending text or value; nothing is guessed or retried.
//! - **`no_std` + `alloc`** — embeddable in firmware, kernels, WASM.
//!
//! Hex words are uppercase without a `0x` prefix and follow the mode's byte
//! order: `mov w0, #0` is `00008052` little-endian and `52800000` big-endian.
//! PC-relative instructions encode against a base address (0 unless an `_at`
//! variant or [`Converter::with_base_addr`] supplies one) and decode back to
//! absolute targets.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
// ── Pedantic lint policy ─────────────────────────────────────────────────
// An assembler intentionally performs many narrowing / sign-changing casts
// between integer widths (i64→u32, u32→u8, etc.) and uses dense hex
// literals without separators (0xD65F03C0, 0x0FF00FF0).  The lints below
// are expected and acceptable in this context.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_lossless,
    clippy::cast_possible_wrap,
    clippy::unreadable_literal,
    clippy::match_same_arms,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::uninlined_format_args,
    clippy::doc_markdown,
    clippy::similar_names,
    clippy::too_many_lines,
    clippy::missing_errors_doc
)]

extern crate alloc;

pub(crate) mod aarch64;
pub(crate) mod arm;
/// Reusable conversion handle and batch orchestration.
pub mod converter;
pub(crate) mod decoder;
pub(crate) mod encoder;
/// Error types for assembly and disassembly failures.
pub mod error;
/// Data model: architecture modes, registers, operands, machine words.
pub mod ir;
pub(crate) mod lexer;
pub(crate) mod parser;
pub(crate) mod table;

// Re-exports
pub use converter::Converter;
pub use error::{BatchError, ConvError};
pub use ir::{AddrMode, ArchMode, MachineWord, MemoryRef, Operand, Register, ShiftKind};

use alloc::string::String;
use alloc::vec::Vec;

/// Assemble one line of assembly to a machine word.
///
/// # Errors
///
/// Returns [`ConvError`] if the line contains an unknown mnemonic, an
/// unsupported operand form, a malformed or out-of-range immediate, or any
/// other encoding issue.
///
/// # Examples
///
/// ```rust
/// use armconv::{assemble, ArchMode};
///
/// let word = assemble("ret", ArchMode::AArch64).unwrap();
/// assert_eq!(word.to_hex(), "C0035FD6");
/// ```
pub fn assemble(line: &str, mode: ArchMode) -> Result<MachineWord, ConvError> {
    assemble_at(line, mode, 0)
}

/// Assemble with an explicit base address for PC-relative instructions.
///
/// # Errors
///
/// Returns [`ConvError`] on assembly failure (see [`assemble`] for details).
///
/// # Examples
///
/// ```rust
/// use armconv::{assemble_at, ArchMode};
///
/// // A branch to its own address encodes a zero displacement.
/// let word = assemble_at("b #0x1000", ArchMode::AArch64, 0x1000).unwrap();
/// assert_eq!(word.value(), 0x14000000);
/// ```
pub fn assemble_at(line: &str, mode: ArchMode, addr: u64) -> Result<MachineWord, ConvError> {
    Converter::new(mode).with_base_addr(addr).assemble(line)
}

/// Assemble a batch of lines, stopping at the first failure.
///
/// All lines share the base address 0; results preserve input order.
///
/// # Errors
///
/// Returns [`BatchError`] naming the first failing line's index and error.
/// Earlier results are discarded and later lines are never attempted.
pub fn assemble_all<S: AsRef<str>>(
    lines: &[S],
    mode: ArchMode,
) -> Result<Vec<MachineWord>, BatchError> {
    assemble_all_at(lines, mode, 0)
}

/// Assemble a batch of lines at an explicit base address.
///
/// The same base address applies to every line.
///
/// # Errors
///
/// Returns [`BatchError`] naming the first failing line's index and error.
pub fn assemble_all_at<S: AsRef<str>>(
    lines: &[S],
    mode: ArchMode,
    addr: u64,
) -> Result<Vec<MachineWord>, BatchError> {
    Converter::new(mode).with_base_addr(addr).assemble_all(lines)
}

/// Disassemble one hex word to canonical assembly text.
///
/// The input must have exactly [`ArchMode::hex_digits`] digits (4 for
/// Thumb modes, 8 otherwise), no `0x` prefix, in the mode's byte order;
/// either letter case is accepted.
///
/// # Errors
///
/// Returns [`ConvError`] for malformed hex, words that match no known
/// encoding, and modes without a decoder (big-endian AArch64).
///
/// # Examples
///
/// ```rust
/// use armconv::{disassemble, ArchMode};
///
/// assert_eq!(disassemble("0120", ArchMode::Thumb).unwrap(), "movs r0, #1");
/// ```
pub fn disassemble(hex: &str, mode: ArchMode) -> Result<String, ConvError> {
    disassemble_at(hex, mode, 0)
}

/// Disassemble with an explicit base address for PC-relative targets.
///
/// # Errors
///
/// Returns [`ConvError`] on disassembly failure (see [`disassemble`] for
/// details).
pub fn disassemble_at(hex: &str, mode: ArchMode, addr: u64) -> Result<String, ConvError> {
    Converter::new(mode).with_base_addr(addr).disassemble(hex)
}

/// Disassemble a batch of hex words, stopping at the first failure.
///
/// # Errors
///
/// Returns [`BatchError`] naming the first failing word's index and error.
pub fn disassemble_all<S: AsRef<str>>(
    hexes: &[S],
    mode: ArchMode,
) -> Result<Vec<String>, BatchError> {
    disassemble_all_at(hexes, mode, 0)
}

/// Disassemble a batch of hex words at an explicit base address.
///
/// # Errors
///
/// Returns [`BatchError`] naming the first failing word's index and error.
pub fn disassemble_all_at<S: AsRef<str>>(
    hexes: &[S],
    mode: ArchMode,
    addr: u64,
) -> Result<Vec<String>, BatchError> {
    Converter::new(mode)
        .with_base_addr(addr)
        .disassemble_all(hexes)
}

/// Disassemble an already-parsed [`MachineWord`] at base address 0.
///
/// # Errors
///
/// Returns [`ConvError`] for undefined encodings and for modes without a
/// decoder.
pub fn disassemble_word(word: &MachineWord) -> Result<String, ConvError> {
    Converter::new(word.mode()).disassemble_word(word)
}
