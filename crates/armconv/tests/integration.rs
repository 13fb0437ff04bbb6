//! Integration tests for armconv.
//!
//! These tests exercise the public API end-to-end: one-shot conversion,
//! base addresses, batch semantics, endianness, and the error surface.

use armconv::{
    assemble, assemble_all, assemble_all_at, assemble_at, disassemble, disassemble_all,
    disassemble_all_at, disassemble_at, disassemble_word, ArchMode, ConvError, Converter,
    MachineWord,
};

/// The AArch64 acceptance vectors (base address 0), bidirectional.
const VECTORS: &[(&str, &str)] = &[
    ("mov w0, #0", "00008052"),
    ("ret", "C0035FD6"),
    ("ldr w3, [x1]", "230040B9"),
    ("and w3, w3, #0xff", "631C0012"),
    ("cmp w3, #0x61", "7F840171"),
    ("b.ne #0x1c", "E1000054"),
    ("adr x1, #0x24", "21010010"),
    ("sub sp, sp, #0x60", "FF8301D1"),
    ("b #0xfffffffffffcbff4", "FD2FFF17"),
];

// ============================================================================
// Acceptance vectors
// ============================================================================

#[test]
fn acceptance_vectors_assemble() {
    for &(text, hex) in VECTORS {
        let word = assemble(text, ArchMode::AArch64).unwrap();
        assert_eq!(word.to_hex(), hex, "{text}");
    }
}

#[test]
fn acceptance_vectors_disassemble() {
    for &(text, hex) in VECTORS {
        assert_eq!(disassemble(hex, ArchMode::AArch64).unwrap(), text, "{hex}");
    }
}

// ============================================================================
// One-shot API
// ============================================================================

#[test]
fn one_shot_assemble() {
    let word = assemble("ret", ArchMode::AArch64).unwrap();
    assert_eq!(word.value(), 0xD65F03C0);
    assert_eq!(word.mode(), ArchMode::AArch64);
}

#[test]
fn one_shot_disassemble() {
    assert_eq!(disassemble("C0035FD6", ArchMode::AArch64).unwrap(), "ret");
    assert_eq!(disassemble("0120", ArchMode::Thumb).unwrap(), "movs r0, #1");
}

#[test]
fn one_shot_with_base_address() {
    // A branch back to the start of a function at 0x1000.
    let word = assemble_at("b #0x1000", ArchMode::AArch64, 0x1010).unwrap();
    assert_eq!(word.value(), 0x17FFFFFC);
    assert_eq!(
        disassemble_at(&word.to_hex(), ArchMode::AArch64, 0x1010).unwrap(),
        "b #0x1000"
    );
}

#[test]
fn disassemble_word_form() {
    let word = MachineWord::from_hex("C0035FD6", ArchMode::AArch64).unwrap();
    assert_eq!(disassemble_word(&word).unwrap(), "ret");
}

#[test]
fn input_case_is_flexible() {
    let upper = assemble("MOV W0, #0", ArchMode::AArch64).unwrap();
    let lower = assemble("mov w0, #0", ArchMode::AArch64).unwrap();
    assert_eq!(upper, lower);

    assert_eq!(disassemble("c0035fd6", ArchMode::AArch64).unwrap(), "ret");
}

#[test]
fn comments_and_whitespace_are_ignored() {
    let word = assemble("  ret   ; return to caller", ArchMode::AArch64).unwrap();
    assert_eq!(word.value(), 0xD65F03C0);
    let word = assemble("\tret // tail", ArchMode::AArch64).unwrap();
    assert_eq!(word.value(), 0xD65F03C0);
}

// ============================================================================
// Batch semantics
// ============================================================================

#[test]
fn batch_assemble_preserves_order() {
    let words = assemble_all(&["mov w0, #0", "ret"], ArchMode::AArch64).unwrap();
    let hexes: Vec<String> = words.iter().map(MachineWord::to_hex).collect();
    assert_eq!(hexes, vec!["00008052", "C0035FD6"]);
}

#[test]
fn batch_disassemble_preserves_order() {
    let texts = disassemble_all(&["00008052", "C0035FD6"], ArchMode::AArch64).unwrap();
    assert_eq!(texts, vec!["mov w0, #0", "ret"]);
}

#[test]
fn batch_reports_first_failure_only() {
    // Index 2 is also invalid; the error must name index 1.
    let err = assemble_all(&["ret", "bogus", "x?!"], ArchMode::AArch64).unwrap_err();
    assert_eq!(err.index, 1);
    assert_eq!(
        err.error,
        ConvError::UnknownMnemonic {
            mnemonic: "bogus".into(),
            mode: ArchMode::AArch64,
        }
    );
}

#[test]
fn batch_shares_one_base_address() {
    // Both branches target 0x2000 from the same base.
    let words =
        assemble_all_at(&["b #0x2000", "bl #0x2000"], ArchMode::AArch64, 0x2000).unwrap();
    assert_eq!(words[0].value(), 0x14000000);
    assert_eq!(words[1].value(), 0x94000000);

    let texts = disassemble_all_at(
        &[words[0].to_hex(), words[1].to_hex()],
        ArchMode::AArch64,
        0x2000,
    )
    .unwrap();
    assert_eq!(texts, vec!["b #0x2000", "bl #0x2000"]);
}

#[test]
fn batch_error_display_names_the_line() {
    let err = disassemble_all(&["C0035FD6", "nothex00"], ArchMode::AArch64).unwrap_err();
    assert_eq!(err.index, 1);
    assert_eq!(
        err.to_string(),
        "line 1: invalid hex digit 'n' at position 0"
    );
}

// ============================================================================
// Endianness
// ============================================================================

#[test]
fn big_endian_hex_is_byte_reversed() {
    let pairs = [
        (ArchMode::AArch64, ArchMode::AArch64BigEndian, "mov w0, #0"),
        (ArchMode::AArch32, ArchMode::AArch32BigEndian, "mov r0, #1"),
        (ArchMode::Thumb, ArchMode::ThumbBigEndian, "movs r0, #1"),
    ];
    for (le, be, text) in pairs {
        let le_hex = assemble(text, le).unwrap().to_hex();
        let be_hex = assemble(text, be).unwrap().to_hex();
        let reversed: String = le_hex
            .as_bytes()
            .chunks(2)
            .rev()
            .flat_map(|pair| pair.iter().map(|&b| b as char))
            .collect();
        assert_eq!(be_hex, reversed, "{text}");
    }
}

#[test]
fn big_endian_disassembly_round_trips() {
    let word = assemble("movs r0, #1", ArchMode::ThumbBigEndian).unwrap();
    assert_eq!(word.to_hex(), "2001");
    assert_eq!(
        disassemble("2001", ArchMode::ThumbBigEndian).unwrap(),
        "movs r0, #1"
    );
}

#[test]
fn aarch64_big_endian_assembles_but_never_disassembles() {
    let word = assemble("ret", ArchMode::AArch64BigEndian).unwrap();
    assert_eq!(word.to_hex(), "D65F03C0");
    assert_eq!(
        disassemble("D65F03C0", ArchMode::AArch64BigEndian).unwrap_err(),
        ConvError::UnsupportedModeForDisassembly {
            mode: ArchMode::AArch64BigEndian
        }
    );
    assert_eq!(
        disassemble_word(&word).unwrap_err(),
        ConvError::UnsupportedModeForDisassembly {
            mode: ArchMode::AArch64BigEndian
        }
    );
}

// ============================================================================
// Converter handle
// ============================================================================

#[test]
fn converter_is_reusable() {
    let conv = Converter::new(ArchMode::AArch32);
    assert_eq!(conv.mode(), ArchMode::AArch32);
    assert_eq!(conv.base_addr(), 0);
    for _ in 0..3 {
        assert_eq!(conv.assemble("nop").unwrap().value(), 0xE320F000);
    }
}

#[test]
fn converter_base_addr_round_trip() {
    let conv = Converter::new(ArchMode::Thumb).with_base_addr(0x8000);
    let word = conv.assemble("b #0x8010").unwrap();
    assert_eq!(conv.disassemble(&word.to_hex()).unwrap(), "b #0x8010");
}

// ============================================================================
// Mode names
// ============================================================================

#[test]
fn api_names_select_modes() {
    assert_eq!(ArchMode::from_api_name("arm64"), Some(ArchMode::AArch64));
    assert_eq!(
        ArchMode::from_api_name("arm64be"),
        Some(ArchMode::AArch64BigEndian)
    );
    assert_eq!(ArchMode::from_api_name("arm"), Some(ArchMode::AArch32));
    assert_eq!(
        ArchMode::from_api_name("armbe"),
        Some(ArchMode::AArch32BigEndian)
    );
    assert_eq!(ArchMode::from_api_name("thumb"), Some(ArchMode::Thumb));
    assert_eq!(
        ArchMode::from_api_name("thumbbe"),
        Some(ArchMode::ThumbBigEndian)
    );
    assert_eq!(ArchMode::from_api_name("x86"), None);
}

// ============================================================================
// Error surface — every variant is reachable from the public API
// ============================================================================

#[test]
fn error_unknown_mnemonic() {
    assert_eq!(
        assemble("bogus", ArchMode::AArch32).unwrap_err(),
        ConvError::UnknownMnemonic {
            mnemonic: "bogus".into(),
            mode: ArchMode::AArch32,
        }
    );
}

#[test]
fn error_unsupported_operand_form() {
    assert!(matches!(
        assemble("ret #1", ArchMode::AArch64).unwrap_err(),
        ConvError::UnsupportedOperandForm { .. }
    ));
}

#[test]
fn error_malformed_immediate() {
    assert_eq!(
        assemble("mov w0, #zz", ArchMode::AArch64).unwrap_err(),
        ConvError::MalformedImmediate { text: "#zz".into() }
    );
}

#[test]
fn error_immediate_out_of_range() {
    assert!(matches!(
        assemble("add w0, w0, #4096", ArchMode::AArch64).unwrap_err(),
        ConvError::ImmediateOutOfRange { value: 4096, .. }
    ));
}

#[test]
fn error_misaligned_immediate() {
    assert!(matches!(
        assemble("b #0x1e", ArchMode::AArch64).unwrap_err(),
        ConvError::MisalignedImmediate { align: 4, .. }
    ));
}

#[test]
fn error_unknown_operand_syntax() {
    assert_eq!(
        assemble("mov w0, 5", ArchMode::AArch64).unwrap_err(),
        ConvError::UnknownOperandSyntax { token: "5".into() }
    );
}

#[test]
fn error_invalid_hex_length() {
    assert_eq!(
        disassemble("C0035FD", ArchMode::AArch64).unwrap_err(),
        ConvError::InvalidHexLength {
            len: 7,
            expected: 8
        }
    );
    assert_eq!(
        disassemble("C0035FD6", ArchMode::Thumb).unwrap_err(),
        ConvError::InvalidHexLength {
            len: 8,
            expected: 4
        }
    );
}

#[test]
fn error_invalid_hex_digit() {
    assert_eq!(
        disassemble("C0035FG6", ArchMode::AArch64).unwrap_err(),
        ConvError::InvalidHexDigit { ch: 'G', index: 6 }
    );
}

#[test]
fn error_undefined_encoding() {
    assert_eq!(
        disassemble("FFFFFFFF", ArchMode::AArch64).unwrap_err(),
        ConvError::UndefinedEncoding {
            word: 0xFFFFFFFF,
            mode: ArchMode::AArch64,
        }
    );
}

#[test]
fn error_unsupported_mode_for_disassembly() {
    assert!(matches!(
        disassemble("00008052", ArchMode::AArch64BigEndian).unwrap_err(),
        ConvError::UnsupportedModeForDisassembly { .. }
    ));
}

// ============================================================================
// Round trips across modes
// ============================================================================

#[test]
fn canonical_text_round_trips() {
    let cases: &[(ArchMode, &[&str])] = &[
        (
            ArchMode::AArch64,
            &[
                "nop",
                "ret",
                "ret x1",
                "mov w0, #0",
                "mov x5, #0x10",
                "movn w2, #1",
                "movk x1, #0xffff",
                "add x0, x1, x2",
                "add x0, x1, x2, lsl #4",
                "sub sp, sp, #0x60",
                "cmp w3, #0x61",
                "cmn x1, x2",
                "tst w0, #1",
                "and w3, w3, #0xff",
                "orr x0, x1, #0xff00",
                "ldr w3, [x1]",
                "ldr x2, [sp, #0x10]",
                "str w0, [x1, x2]",
                "str x0, [sp, #-0x10]!",
                "ldr x0, [sp], #0x10",
                "ldrb w2, [x0, #1]",
                "strh w2, [x0, #2]",
                "cbz w0, #8",
                "cbnz x3, #0x40",
                "adr x1, #0x24",
                "b #0x10",
                "bl #0x400",
                "b.ne #0x1c",
                "br x16",
                "blr x8",
                "svc #0",
            ],
        ),
        (
            ArchMode::AArch32,
            &[
                "nop",
                "bx lr",
                "mov r0, #1",
                "movne r0, #1",
                "mvn r1, r2",
                "add r0, r1, r2",
                "addne r0, r1, r2",
                "sub r3, r3, #4",
                "rsb r0, r1, #0",
                "orr r0, r0, #0xff00",
                "bic r2, r2, #3",
                "cmp r0, #0x41",
                "teq r0, r1",
                "mul r0, r1, r2",
                "mov r0, r1, lsl #2",
                "movw r0, #0x1234",
                "movt r0, #0xffff",
                "ldr r0, [r1, #4]",
                "str r0, [r1, #8]!",
                "ldr r0, [r1], #4",
                "ldr r0, [r1, r2]",
                "ldrb r2, [r3, #1]",
                "b #8",
                "bleq #0x10",
                "svc #0",
            ],
        ),
        (
            ArchMode::Thumb,
            &[
                "nop",
                "bx lr",
                "movs r0, #1",
                "movs r1, r2",
                "mov r8, r1",
                "adds r0, r1, r2",
                "adds r0, r1, #3",
                "subs r2, #0x10",
                "ands r0, r1",
                "mvns r3, r4",
                "cmp r0, #0x41",
                "lsls r1, r2, #3",
                "ldr r0, [r1, #4]",
                "strb r0, [r1, #1]",
                "ldrh r0, [r1, #2]",
                "b #8",
                "bne #0x10",
                "svc #0xab",
            ],
        ),
    ];

    for &(mode, lines) in cases {
        for &line in lines {
            let word = assemble(line, mode)
                .unwrap_or_else(|e| panic!("{mode}: {line}: {e}"));
            let back = disassemble(&word.to_hex(), mode)
                .unwrap_or_else(|e| panic!("{mode}: {line}: {e}"));
            assert_eq!(back, line, "{mode}");
        }
    }
}
