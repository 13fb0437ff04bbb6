//! Multi-mode example — the same operations across AArch64, AArch32 and
//! Thumb, in both byte orders.
//!
//! Run with: `cargo run --example multi_arch`

use armconv::{assemble, ArchMode, Converter};

fn main() {
    println!("=== armconv multi-mode converter ===\n");

    // ── Same operation, three instruction sets ──────────────────────────

    println!("1. Return zero, three ways:");
    let variants = [
        (ArchMode::AArch64, "mov w0, #0", "ret"),
        (ArchMode::AArch32, "mov r0, #0", "bx lr"),
        (ArchMode::Thumb, "movs r0, #0", "bx lr"),
    ];
    for (mode, mov, ret) in variants {
        let a = assemble(mov, mode).unwrap();
        let b = assemble(ret, mode).unwrap();
        println!("   {:<8} {mov:<12} -> {a}   {ret:<6} -> {b}", mode.api_name());
    }

    // ── Endianness ──────────────────────────────────────────────────────

    println!("\n2. Byte order (same word, different hex):");
    let pairs = [
        (ArchMode::AArch64, ArchMode::AArch64BigEndian, "mov w0, #0"),
        (ArchMode::AArch32, ArchMode::AArch32BigEndian, "mov r0, #0"),
        (ArchMode::Thumb, ArchMode::ThumbBigEndian, "movs r0, #0"),
    ];
    for (le, be, line) in pairs {
        let l = assemble(line, le).unwrap();
        let b = assemble(line, be).unwrap();
        println!("   {line:<12} LE {l}   BE {b}");
    }

    // ── Mode selectors ──────────────────────────────────────────────────

    println!("\n3. Selector strings:");
    for name in ["arm64", "arm64be", "arm", "armbe", "thumb", "thumbbe"] {
        let mode = ArchMode::from_api_name(name).unwrap();
        println!("   {name:<8} -> {mode} ({}-digit hex)", mode.hex_digits());
    }

    // ── Round trips ─────────────────────────────────────────────────────

    println!("\n4. Round trips (text -> hex -> text):");
    let samples = [
        (ArchMode::AArch64, "ldr x0, [sp], #16"),
        (ArchMode::AArch64, "b.ne #0x1c"),
        (ArchMode::AArch32, "addne r0, r1, r2"),
        (ArchMode::AArch32, "str r0, [r1, #8]!"),
        (ArchMode::Thumb, "adds r0, r1, r2"),
        (ArchMode::Thumb, "bne #8"),
    ];
    for (mode, line) in samples {
        let conv = Converter::new(mode);
        let word = conv.assemble(line).unwrap();
        let text = conv.disassemble(&word.to_hex()).unwrap();
        println!("   {:<8} {line:<20} -> {word} -> {text}", mode.api_name());
    }

    // ── One-way modes ───────────────────────────────────────────────────

    println!("\n5. Big-endian AArch64 assembles but never disassembles:");
    let word = assemble("ret", ArchMode::AArch64BigEndian).unwrap();
    println!("   ret -> {word}");
    let err = Converter::new(ArchMode::AArch64BigEndian)
        .disassemble(&word.to_hex())
        .unwrap_err();
    println!("   back: {err}");

    println!("\n=== Done! ===");
}
