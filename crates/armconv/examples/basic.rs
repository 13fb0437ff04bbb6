//! Basic conversion example — demonstrates the one-shot and `Converter` APIs.
//!
//! Run with: `cargo run --example basic`

use armconv::{assemble, disassemble, ArchMode, Converter};

fn main() {
    println!("=== armconv basic example ===\n");

    // --- One-shot assembly ---
    println!("1. One-shot assembly:");
    for line in ["mov w0, #0", "add x0, x1, x2", "ret"] {
        let word = assemble(line, ArchMode::AArch64).unwrap();
        println!("   {line:<18} -> {word}");
    }

    // --- One-shot disassembly ---
    println!("\n2. One-shot disassembly:");
    for hex in ["00008052", "230040B9", "C0035FD6"] {
        let text = disassemble(hex, ArchMode::AArch64).unwrap();
        println!("   {hex} -> {text}");
    }

    // --- Reusable converter with a base address ---
    println!("\n3. Branches relative to a base address:");
    let conv = Converter::new(ArchMode::AArch64).with_base_addr(0x10_4000);
    let word = conv.assemble("b #0x104010").unwrap();
    println!("   b #0x104010 @ 0x104000 -> {word}");
    println!("   {} @ 0x104000 -> {}", word, conv.disassemble(&word.to_hex()).unwrap());

    // --- Batch conversion ---
    println!("\n4. Batch assembly (a small function):");
    let lines = [
        "sub sp, sp, #0x20",
        "ldr w3, [x1]",
        "and w3, w3, #0xff",
        "cmp w3, #0x61",
        "b.ne #0x1c",
        "ret",
    ];
    let conv = Converter::new(ArchMode::AArch64);
    for (line, word) in lines.iter().zip(conv.assemble_all(&lines).unwrap()) {
        println!("   {line:<20} -> {word}");
    }

    // --- Errors are typed ---
    println!("\n5. Typed errors:");
    println!("   {}", assemble("bogus x0", ArchMode::AArch64).unwrap_err());
    println!("   {}", assemble("add x0, x1, #5000000", ArchMode::AArch64).unwrap_err());
    println!("   {}", disassemble("FFFFFFFF", ArchMode::AArch64).unwrap_err());

    println!("\n=== Done! ===");
}
