//! Core data model: architecture modes, registers, operands and machine
//! words, shared by the assembler and disassembler.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::error::ConvError;

// ── Architecture mode ────────────────────────────────────────────────────

/// Architecture/endianness variant selected for a conversion.
///
/// The mode is immutable per call and determines the word width (Thumb
/// modes are 16-bit, others 32-bit), the byte order of the hex
/// representation, and which instruction table is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArchMode {
    /// ARMv8-A 64-bit, little-endian.
    AArch64,
    /// ARMv8-A 64-bit, big-endian. Assembly only; no decode table exists.
    AArch64BigEndian,
    /// ARM A32, little-endian.
    AArch32,
    /// ARM A32, big-endian.
    AArch32BigEndian,
    /// Thumb (16-bit encodings), little-endian.
    Thumb,
    /// Thumb (16-bit encodings), big-endian.
    ThumbBigEndian,
}

/// Which instruction-table partition a mode decodes against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Family {
    A64,
    A32,
    Thumb,
}

impl ArchMode {
    /// All modes, in the order the original selector enumerated them.
    pub const ALL: [ArchMode; 6] = [
        ArchMode::AArch64,
        ArchMode::AArch64BigEndian,
        ArchMode::AArch32,
        ArchMode::AArch32BigEndian,
        ArchMode::Thumb,
        ArchMode::ThumbBigEndian,
    ];

    /// Width of one machine word in bytes (2 for Thumb modes, 4 otherwise).
    #[must_use]
    pub fn word_bytes(self) -> usize {
        match self.family() {
            Family::Thumb => 2,
            _ => 4,
        }
    }

    /// Number of hex digits in the textual word representation.
    #[must_use]
    pub fn hex_digits(self) -> usize {
        self.word_bytes() * 2
    }

    /// Whether the hex representation is big-endian.
    #[must_use]
    pub fn is_big_endian(self) -> bool {
        matches!(
            self,
            ArchMode::AArch64BigEndian | ArchMode::AArch32BigEndian | ArchMode::ThumbBigEndian
        )
    }

    /// Whether a decode table exists for this mode.
    ///
    /// Big-endian AArch64 assembles but does not disassemble; the decoder
    /// fails fast with [`ConvError::UnsupportedModeForDisassembly`].
    #[must_use]
    pub fn supports_disassembly(self) -> bool {
        self != ArchMode::AArch64BigEndian
    }

    /// PC read-ahead in bytes: the value the PC reads as, relative to the
    /// instruction's own address. 8 in A32, 4 in Thumb, 0 in AArch64
    /// (where PC-relative instructions are relative to their own address).
    #[must_use]
    pub fn pc_bias(self) -> u64 {
        match self.family() {
            Family::A64 => 0,
            Family::A32 => 8,
            Family::Thumb => 4,
        }
    }

    /// The selector string the original web API used for this mode.
    #[must_use]
    pub fn api_name(self) -> &'static str {
        match self {
            ArchMode::AArch64 => "arm64",
            ArchMode::AArch64BigEndian => "arm64be",
            ArchMode::AArch32 => "arm",
            ArchMode::AArch32BigEndian => "armbe",
            ArchMode::Thumb => "thumb",
            ArchMode::ThumbBigEndian => "thumbbe",
        }
    }

    /// Parse an API selector string (`"arm64"`, `"armbe"`, ...).
    ///
    /// Returns `None` for unknown names; an unrecognized selector is never
    /// defaulted to some other mode.
    #[must_use]
    pub fn from_api_name(name: &str) -> Option<ArchMode> {
        ArchMode::ALL.iter().copied().find(|m| m.api_name() == name)
    }

    pub(crate) fn family(self) -> Family {
        match self {
            ArchMode::AArch64 | ArchMode::AArch64BigEndian => Family::A64,
            ArchMode::AArch32 | ArchMode::AArch32BigEndian => Family::A32,
            ArchMode::Thumb | ArchMode::ThumbBigEndian => Family::Thumb,
        }
    }
}

impl fmt::Display for ArchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchMode::AArch64 => write!(f, "AArch64"),
            ArchMode::AArch64BigEndian => write!(f, "big-endian AArch64"),
            ArchMode::AArch32 => write!(f, "AArch32"),
            ArchMode::AArch32BigEndian => write!(f, "big-endian AArch32"),
            ArchMode::Thumb => write!(f, "Thumb"),
            ArchMode::ThumbBigEndian => write!(f, "big-endian Thumb"),
        }
    }
}

// ── Registers ────────────────────────────────────────────────────────────

/// A core register of either register file.
///
/// AArch64 general registers carry their number (0..=30); `sp`, `xzr` and
/// `wzr` all encode as number 31 and are distinguished by name. AArch32 and
/// Thumb share the `R` bank (0..=15), where r13/r14/r15 render as
/// `sp`/`lr`/`pc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Register {
    /// AArch64 64-bit register x0..x30.
    X(u8),
    /// AArch64 32-bit register w0..w30.
    W(u8),
    /// AArch64 stack pointer (encodes as 31).
    Sp,
    /// AArch64 32-bit stack pointer (encodes as 31).
    Wsp,
    /// AArch64 64-bit zero register (encodes as 31).
    Xzr,
    /// AArch64 32-bit zero register (encodes as 31).
    Wzr,
    /// AArch32/Thumb core register r0..r15.
    R(u8),
}

impl Register {
    /// The number this register encodes as in an instruction field.
    #[must_use]
    pub fn num(self) -> u32 {
        match self {
            Register::X(n) | Register::W(n) | Register::R(n) => u32::from(n),
            Register::Sp | Register::Wsp | Register::Xzr | Register::Wzr => 31,
        }
    }

    /// True for AArch64 registers (either width).
    #[must_use]
    pub fn is_a64(self) -> bool {
        !matches!(self, Register::R(_))
    }

    /// True for AArch32/Thumb registers.
    #[must_use]
    pub fn is_arm(self) -> bool {
        matches!(self, Register::R(_))
    }

    /// True for 64-bit AArch64 registers (x-file, sp, xzr).
    #[must_use]
    pub fn is_a64_64bit(self) -> bool {
        matches!(self, Register::X(_) | Register::Sp | Register::Xzr)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Register::X(n) => write!(f, "x{}", n),
            Register::W(n) => write!(f, "w{}", n),
            Register::Sp => write!(f, "sp"),
            Register::Wsp => write!(f, "wsp"),
            Register::Xzr => write!(f, "xzr"),
            Register::Wzr => write!(f, "wzr"),
            Register::R(13) => write!(f, "sp"),
            Register::R(14) => write!(f, "lr"),
            Register::R(15) => write!(f, "pc"),
            Register::R(n) => write!(f, "r{}", n),
        }
    }
}

// ── Condition codes ──────────────────────────────────────────────────────

/// ARM condition code (4 bits).
///
/// Spelled `b.<cond>` in AArch64 syntax and as a bare suffix (`addne`,
/// `beq`) in AArch32/Thumb syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum Cond {
    Eq = 0x0,
    Ne = 0x1,
    Cs = 0x2,
    Cc = 0x3,
    Mi = 0x4,
    Pl = 0x5,
    Vs = 0x6,
    Vc = 0x7,
    Hi = 0x8,
    Ls = 0x9,
    Ge = 0xA,
    Lt = 0xB,
    Gt = 0xC,
    Le = 0xD,
    Al = 0xE,
    Nv = 0xF,
}

impl Cond {
    /// The 4-bit encoding.
    pub(crate) fn code(self) -> u32 {
        self as u32
    }

    /// Decode a 4-bit field value.
    pub(crate) fn from_code(code: u32) -> Cond {
        match code & 0xF {
            0x0 => Cond::Eq,
            0x1 => Cond::Ne,
            0x2 => Cond::Cs,
            0x3 => Cond::Cc,
            0x4 => Cond::Mi,
            0x5 => Cond::Pl,
            0x6 => Cond::Vs,
            0x7 => Cond::Vc,
            0x8 => Cond::Hi,
            0x9 => Cond::Ls,
            0xA => Cond::Ge,
            0xB => Cond::Lt,
            0xC => Cond::Gt,
            0xD => Cond::Le,
            0xE => Cond::Al,
            _ => Cond::Nv,
        }
    }

    /// Parse a lowercase two-letter suffix. `hs`/`lo` are aliases for
    /// `cs`/`cc`.
    pub(crate) fn from_suffix(s: &str) -> Option<Cond> {
        Some(match s {
            "eq" => Cond::Eq,
            "ne" => Cond::Ne,
            "cs" | "hs" => Cond::Cs,
            "cc" | "lo" => Cond::Cc,
            "mi" => Cond::Mi,
            "pl" => Cond::Pl,
            "vs" => Cond::Vs,
            "vc" => Cond::Vc,
            "hi" => Cond::Hi,
            "ls" => Cond::Ls,
            "ge" => Cond::Ge,
            "lt" => Cond::Lt,
            "gt" => Cond::Gt,
            "le" => Cond::Le,
            "al" => Cond::Al,
            "nv" => Cond::Nv,
            _ => return None,
        })
    }

    /// Canonical suffix spelling.
    pub(crate) fn name(self) -> &'static str {
        match self {
            Cond::Eq => "eq",
            Cond::Ne => "ne",
            Cond::Cs => "cs",
            Cond::Cc => "cc",
            Cond::Mi => "mi",
            Cond::Pl => "pl",
            Cond::Vs => "vs",
            Cond::Vc => "vc",
            Cond::Hi => "hi",
            Cond::Ls => "ls",
            Cond::Ge => "ge",
            Cond::Lt => "lt",
            Cond::Gt => "gt",
            Cond::Le => "le",
            Cond::Al => "al",
            Cond::Nv => "nv",
        }
    }
}

// ── Operands ─────────────────────────────────────────────────────────────

/// Barrel-shift kind for a shifted-register operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShiftKind {
    /// Logical shift left.
    Lsl,
    /// Logical shift right.
    Lsr,
    /// Arithmetic shift right.
    Asr,
    /// Rotate right.
    Ror,
}

impl ShiftKind {
    /// The 2-bit encoding shared by A32 operand2 and AArch64 shifted
    /// register forms.
    #[must_use]
    pub fn code(self) -> u32 {
        match self {
            ShiftKind::Lsl => 0b00,
            ShiftKind::Lsr => 0b01,
            ShiftKind::Asr => 0b10,
            ShiftKind::Ror => 0b11,
        }
    }

    pub(crate) fn from_code(code: u32) -> ShiftKind {
        match code & 0b11 {
            0b00 => ShiftKind::Lsl,
            0b01 => ShiftKind::Lsr,
            0b10 => ShiftKind::Asr,
            _ => ShiftKind::Ror,
        }
    }

    pub(crate) fn from_name(name: &str) -> Option<ShiftKind> {
        Some(match name {
            "lsl" => ShiftKind::Lsl,
            "lsr" => ShiftKind::Lsr,
            "asr" => ShiftKind::Asr,
            "ror" => ShiftKind::Ror,
            _ => return None,
        })
    }
}

impl fmt::Display for ShiftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftKind::Lsl => write!(f, "lsl"),
            ShiftKind::Lsr => write!(f, "lsr"),
            ShiftKind::Asr => write!(f, "asr"),
            ShiftKind::Ror => write!(f, "ror"),
        }
    }
}

/// Addressing mode of a memory operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AddrMode {
    /// `[rn]` / `[rn, #imm]` / `[rn, rm]` — base (plus offset), no
    /// writeback.
    #[default]
    Offset,
    /// `[rn, #imm]!` — offset applied before access, written back.
    PreIndex,
    /// `[rn], #imm` — offset applied after access, written back.
    PostIndex,
}

/// A memory operand: base register plus an optional index register or
/// immediate offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryRef {
    /// Base address register.
    pub base: Register,
    /// Optional index register (`[rn, rm]` forms); mutually exclusive with
    /// a non-zero `offset`.
    pub index: Option<Register>,
    /// Immediate byte offset.
    pub offset: i64,
    /// Offset, pre-index or post-index addressing.
    pub addr_mode: AddrMode,
}

impl MemoryRef {
    /// A bare `[rn]` reference.
    #[must_use]
    pub fn base_only(base: Register) -> Self {
        Self {
            base,
            index: None,
            offset: 0,
            addr_mode: AddrMode::Offset,
        }
    }
}

impl fmt::Display for MemoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.index, self.addr_mode) {
            (Some(idx), _) => write!(f, "[{}, {}]", self.base, idx),
            (None, AddrMode::Offset) => {
                if self.offset == 0 {
                    write!(f, "[{}]", self.base)
                } else {
                    write!(f, "[{}, ", self.base)?;
                    write_imm(f, self.offset)?;
                    write!(f, "]")
                }
            }
            (None, AddrMode::PreIndex) => {
                write!(f, "[{}, ", self.base)?;
                write_imm(f, self.offset)?;
                write!(f, "]!")
            }
            (None, AddrMode::PostIndex) => {
                write!(f, "[{}], ", self.base)?;
                write_imm(f, self.offset)
            }
        }
    }
}

/// One parsed operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operand {
    /// A core register.
    Register(Register),
    /// A `#`-prefixed immediate.
    Immediate(i64),
    /// A register with a barrel shift, e.g. `x2, lsl #4`.
    ShiftedRegister {
        /// The shifted register.
        reg: Register,
        /// Shift kind.
        kind: ShiftKind,
        /// Immediate shift amount.
        amount: u8,
    },
    /// A memory reference.
    Memory(MemoryRef),
}

impl Operand {
    /// Short name of the operand's kind, used in error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Operand::Register(_) => "register",
            Operand::Immediate(_) => "immediate",
            Operand::ShiftedRegister { .. } => "shifted register",
            Operand::Memory(m) => match (m.index, m.addr_mode) {
                (Some(_), _) => "memory (register offset)",
                (None, AddrMode::Offset) => "memory",
                (None, AddrMode::PreIndex) => "memory (pre-index)",
                (None, AddrMode::PostIndex) => "memory (post-index)",
            },
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Register(r) => write!(f, "{}", r),
            Operand::Immediate(v) => write_imm(f, *v),
            Operand::ShiftedRegister { reg, kind, amount } => {
                write!(f, "{}, {} #{}", reg, kind, amount)
            }
            Operand::Memory(m) => write!(f, "{}", m),
        }
    }
}

/// Canonical immediate rendering: `#` prefix, magnitudes below 10 in
/// decimal, larger ones in lowercase hex.
pub(crate) fn write_imm<W: fmt::Write>(w: &mut W, value: i64) -> fmt::Result {
    let mag = value.unsigned_abs();
    let sign = if value < 0 { "-" } else { "" };
    if mag < 10 {
        write!(w, "#{}{}", sign, mag)
    } else {
        write!(w, "#{}0x{:x}", sign, mag)
    }
}

/// PC-relative targets render as the absolute address wrapped to the mode's
/// address width, matching the unsigned style branch targets are written in.
pub(crate) fn write_target<W: fmt::Write>(w: &mut W, target: u64, wide: bool) -> fmt::Result {
    let value = if wide { target } else { u64::from(target as u32) };
    if value < 10 {
        write!(w, "#{}", value)
    } else {
        write!(w, "#0x{:x}", value)
    }
}

/// One parsed line of assembly: base mnemonic, optional condition suffix,
/// ordered operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Inst<'src> {
    pub mnemonic: &'src str,
    pub cond: Option<Cond>,
    pub operands: Vec<Operand>,
}

// ── Machine words ────────────────────────────────────────────────────────

/// A fixed-width machine word together with the mode it was produced or
/// consumed under.
///
/// The value is held in its natural (host-order) interpretation; byte order
/// only applies when converting to or from the hex representation. Thumb
/// words occupy the low 16 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MachineWord {
    value: u32,
    mode: ArchMode,
}

impl MachineWord {
    pub(crate) fn new(value: u32, mode: ArchMode) -> Self {
        debug_assert!(mode.word_bytes() == 4 || value <= 0xFFFF);
        Self { value, mode }
    }

    /// Parse a hex string of exactly [`ArchMode::hex_digits`] digits, no
    /// `0x` prefix, either letter case, byte order per the mode.
    pub fn from_hex(hex: &str, mode: ArchMode) -> Result<Self, ConvError> {
        let expected = mode.hex_digits();
        let len = hex.chars().count();
        if len != expected {
            return Err(ConvError::InvalidHexLength { len, expected });
        }

        let mut bytes = [0u8; 4];
        for (i, ch) in hex.chars().enumerate() {
            let nibble = ch
                .to_digit(16)
                .ok_or(ConvError::InvalidHexDigit { ch, index: i })? as u8;
            let byte = &mut bytes[i / 2];
            *byte = (*byte << 4) | nibble;
        }

        let n = mode.word_bytes();
        let mut value = 0u32;
        for i in 0..n {
            // Hex text is byte order; fold per mode endianness.
            let shift = if mode.is_big_endian() {
                (n - 1 - i) * 8
            } else {
                i * 8
            };
            value |= u32::from(bytes[i]) << shift;
        }
        Ok(Self { value, mode })
    }

    /// Render as uppercase hex, no `0x` prefix, byte order per the mode.
    #[must_use]
    pub fn to_hex(&self) -> String {
        use fmt::Write as _;

        let n = self.mode.word_bytes();
        let mut out = String::with_capacity(n * 2);
        for i in 0..n {
            let shift = if self.mode.is_big_endian() {
                (n - 1 - i) * 8
            } else {
                i * 8
            };
            let byte = (self.value >> shift) & 0xFF;
            let _ = write!(out, "{:02X}", byte);
        }
        out
    }

    /// The word value in its natural interpretation.
    #[must_use]
    pub fn value(&self) -> u32 {
        self.value
    }

    /// The mode this word belongs to.
    #[must_use]
    pub fn mode(&self) -> ArchMode {
        self.mode
    }
}

impl fmt::Display for MachineWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
