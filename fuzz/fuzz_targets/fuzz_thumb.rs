#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let _ = armconv::assemble(data, armconv::ArchMode::Thumb);
    let _ = armconv::assemble_at(data, armconv::ArchMode::Thumb, 0x8000);
    let _ = armconv::assemble(data, armconv::ArchMode::ThumbBigEndian);

    if let Ok(word) = armconv::assemble(data, armconv::ArchMode::Thumb) {
        let _ = armconv::disassemble(&word.to_hex(), armconv::ArchMode::Thumb);
    }
});
