//! Error types for assembly and disassembly failures.

use alloc::string::String;
use core::fmt;

use crate::ir::ArchMode;

/// Conversion error produced by the assembler or disassembler.
///
/// Every variant carries the offending text or value so callers can report
/// failures without re-parsing the input. Nothing is retried internally and
/// no failure is ever collapsed into an empty result.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConvError {
    /// Mnemonic not known to the active architecture mode.
    UnknownMnemonic {
        /// The mnemonic that was not recognized (empty for a blank line).
        mnemonic: String,
        /// The active architecture mode.
        mode: ArchMode,
    },

    /// Mnemonic exists in this mode, but not for the given operand shape.
    UnsupportedOperandForm {
        /// The mnemonic as written.
        mnemonic: String,
        /// Description of the operand form that was supplied.
        detail: String,
    },

    /// `#`-prefixed immediate whose payload is not a valid number.
    MalformedImmediate {
        /// The immediate text as written, including the `#`.
        text: String,
    },

    /// Immediate value does not fit the instruction's field.
    ImmediateOutOfRange {
        /// The mnemonic being encoded.
        mnemonic: String,
        /// The immediate value that was supplied.
        value: i64,
        /// Minimum encodable value.
        min: i64,
        /// Maximum encodable value.
        max: i64,
    },

    /// Immediate violates the field's alignment requirement.
    MisalignedImmediate {
        /// The mnemonic being encoded.
        mnemonic: String,
        /// The offending value (for branches, the PC-relative displacement).
        value: i64,
        /// Required alignment in bytes.
        align: u32,
    },

    /// Operand text matches no recognized operand form.
    UnknownOperandSyntax {
        /// The operand text as written.
        token: String,
    },

    /// Hex word has the wrong number of digits for the mode.
    InvalidHexLength {
        /// Number of hex digits supplied.
        len: usize,
        /// Number of digits the mode requires (4 for Thumb, 8 otherwise).
        expected: usize,
    },

    /// Hex word contains a non-hex character.
    InvalidHexDigit {
        /// The offending character.
        ch: char,
        /// 0-based position of the character within the hex string.
        index: usize,
    },

    /// Word matches no decoding rule in the active mode's table.
    UndefinedEncoding {
        /// The word value after endianness correction.
        word: u32,
        /// The active architecture mode.
        mode: ArchMode,
    },

    /// The mode has no decode table (big-endian AArch64).
    UnsupportedModeForDisassembly {
        /// The rejected mode.
        mode: ArchMode,
    },
}

impl fmt::Display for ConvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvError::UnknownMnemonic { mnemonic, mode } => {
                if mnemonic.is_empty() {
                    write!(f, "empty input line ({})", mode)
                } else {
                    write!(f, "unknown mnemonic '{}' for {}", mnemonic, mode)
                }
            }
            ConvError::UnsupportedOperandForm { mnemonic, detail } => {
                write!(f, "{}: unsupported operand form: {}", mnemonic, detail)
            }
            ConvError::MalformedImmediate { text } => {
                write!(f, "malformed immediate '{}'", text)
            }
            ConvError::ImmediateOutOfRange {
                mnemonic,
                value,
                min,
                max,
            } => {
                write!(
                    f,
                    "{}: immediate value {} out of range [{}..{}]",
                    mnemonic, value, min, max
                )
            }
            ConvError::MisalignedImmediate {
                mnemonic,
                value,
                align,
            } => {
                write!(
                    f,
                    "{}: value {} is not a multiple of {}",
                    mnemonic, value, align
                )
            }
            ConvError::UnknownOperandSyntax { token } => {
                write!(f, "unrecognized operand '{}'", token)
            }
            ConvError::InvalidHexLength { len, expected } => {
                write!(f, "hex word has {} digits, expected {}", len, expected)
            }
            ConvError::InvalidHexDigit { ch, index } => {
                write!(f, "invalid hex digit '{}' at position {}", ch, index)
            }
            ConvError::UndefinedEncoding { word, mode } => {
                let digits = mode.hex_digits();
                write!(
                    f,
                    "word 0x{:0width$X} matches no {} encoding",
                    word,
                    mode,
                    width = digits
                )
            }
            ConvError::UnsupportedModeForDisassembly { mode } => {
                write!(f, "disassembly is not supported for {}", mode)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConvError {}

/// Failure of a batch operation: the first failing line's index and error.
///
/// Batch conversion stops at the first failing line; earlier results are
/// discarded and later lines are never attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchError {
    /// 0-based index of the failing line within the input sequence.
    pub index: usize,
    /// Why that line failed.
    pub error: ConvError,
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.index, self.error)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
