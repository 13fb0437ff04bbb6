#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let _ = armconv::assemble(data, armconv::ArchMode::AArch32);
    let _ = armconv::assemble_at(data, armconv::ArchMode::AArch32, 0x8000);
    let _ = armconv::assemble(data, armconv::ArchMode::AArch32BigEndian);

    if let Ok(word) = armconv::assemble(data, armconv::ArchMode::AArch32) {
        let _ = armconv::disassemble(&word.to_hex(), armconv::ArchMode::AArch32);
    }
});
