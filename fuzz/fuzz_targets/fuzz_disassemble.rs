#![no_main]
use libfuzzer_sys::fuzz_target;

use armconv::ArchMode;

fuzz_target!(|data: &str| {
    for mode in ArchMode::ALL {
        let _ = armconv::disassemble(data, mode);
        let _ = armconv::disassemble_at(data, mode, 0x40_0000);

        // Whatever decodes must assemble back without panicking.
        if let Ok(text) = armconv::disassemble(data, mode) {
            let _ = armconv::assemble(&text, mode);
        }
    }
});
