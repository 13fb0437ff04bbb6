#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let _ = armconv::assemble(data, armconv::ArchMode::AArch64);
    let _ = armconv::assemble_at(data, armconv::ArchMode::AArch64, 0x40_0000);
    let _ = armconv::assemble(data, armconv::ArchMode::AArch64BigEndian);

    // Whatever assembles must disassemble back without panicking.
    if let Ok(word) = armconv::assemble(data, armconv::ArchMode::AArch64) {
        let _ = armconv::disassemble(&word.to_hex(), armconv::ArchMode::AArch64);
    }
});
