//! Reusable conversion handle and batch orchestration.

use alloc::string::String;
use alloc::vec::Vec;

use crate::decoder;
use crate::encoder;
use crate::error::{BatchError, ConvError};
use crate::ir::{ArchMode, MachineWord};

/// A configured assembler/disassembler: an architecture mode plus the base
/// address conversions happen at.
///
/// The handle is plain data; it can be copied, shared, and used from any
/// number of threads. The base address applies to PC-relative instructions
/// (`b`, `bl`, `adr`, …) and defaults to 0; batch operations use the same
/// base address for every line.
///
/// ```
/// use armconv::{ArchMode, Converter};
///
/// let conv = Converter::new(ArchMode::AArch64);
/// assert_eq!(conv.assemble("ret").unwrap().to_hex(), "C0035FD6");
/// assert_eq!(conv.disassemble("C0035FD6").unwrap(), "ret");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Converter {
    mode: ArchMode,
    base_addr: u64,
}

impl Converter {
    /// A converter for the given mode, based at address 0.
    #[must_use]
    pub fn new(mode: ArchMode) -> Self {
        Self { mode, base_addr: 0 }
    }

    /// Set the base address for PC-relative instructions.
    #[must_use]
    pub fn with_base_addr(mut self, addr: u64) -> Self {
        self.base_addr = addr;
        self
    }

    /// The configured mode.
    #[must_use]
    pub fn mode(&self) -> ArchMode {
        self.mode
    }

    /// The configured base address.
    #[must_use]
    pub fn base_addr(&self) -> u64 {
        self.base_addr
    }

    /// Assemble one line to a machine word.
    pub fn assemble(&self, line: &str) -> Result<MachineWord, ConvError> {
        encoder::assemble_line(line, self.mode, self.base_addr)
    }

    /// Disassemble one hex word to canonical assembly text.
    pub fn disassemble(&self, hex: &str) -> Result<String, ConvError> {
        let word = MachineWord::from_hex(hex, self.mode)?;
        decoder::disassemble_word(&word, self.base_addr)
    }

    /// Disassemble an already-parsed machine word.
    pub fn disassemble_word(&self, word: &MachineWord) -> Result<String, ConvError> {
        decoder::disassemble_word(word, self.base_addr)
    }

    /// Assemble a batch of lines, stopping at the first failure.
    pub fn assemble_all<S: AsRef<str>>(&self, lines: &[S]) -> Result<Vec<MachineWord>, BatchError> {
        batch(lines, |line| self.assemble(line))
    }

    /// Disassemble a batch of hex words, stopping at the first failure.
    pub fn disassemble_all<S: AsRef<str>>(&self, hexes: &[S]) -> Result<Vec<String>, BatchError> {
        batch(hexes, |hex| self.disassemble(hex))
    }
}

fn batch<S, T>(
    items: &[S],
    mut op: impl FnMut(&str) -> Result<T, ConvError>,
) -> Result<Vec<T>, BatchError>
where
    S: AsRef<str>,
{
    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match op(item.as_ref()) {
            Ok(value) => out.push(value),
            Err(error) => return Err(BatchError { index, error }),
        }
    }
    Ok(out)
}
