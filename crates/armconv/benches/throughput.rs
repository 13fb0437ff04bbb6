//! Performance benchmarks for `armconv`.
//!
//! Measures:
//! - Single instruction latency, assembly and disassembly, per mode
//! - Batch conversion throughput (instructions per second)
//! - Lookup cost across instruction shapes (fixed word vs. memory operand)
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use armconv::{assemble, disassemble, ArchMode, Converter};

// ─── Single-Instruction Assembly Latency ─────────────────────────────────────

fn bench_assemble_single(c: &mut Criterion) {
    let mut group = c.benchmark_group("assemble_single");

    group.bench_function("aarch64_nop", |b| {
        b.iter(|| assemble(black_box("nop"), ArchMode::AArch64).unwrap())
    });

    group.bench_function("aarch64_mov_imm", |b| {
        b.iter(|| assemble(black_box("mov x0, #0x1234"), ArchMode::AArch64).unwrap())
    });

    group.bench_function("aarch64_add_reg", |b| {
        b.iter(|| assemble(black_box("add x0, x1, x2"), ArchMode::AArch64).unwrap())
    });

    group.bench_function("aarch64_ldr_offset", |b| {
        b.iter(|| assemble(black_box("ldr x0, [x1, #8]"), ArchMode::AArch64).unwrap())
    });

    group.bench_function("aarch64_bitmask_imm", |b| {
        b.iter(|| assemble(black_box("and x0, x1, #0xff00"), ArchMode::AArch64).unwrap())
    });

    group.bench_function("aarch64_cond_branch", |b| {
        b.iter(|| assemble(black_box("b.ne #0x1c"), ArchMode::AArch64).unwrap())
    });

    group.bench_function("a32_add_reg", |b| {
        b.iter(|| assemble(black_box("add r0, r1, r2"), ArchMode::AArch32).unwrap())
    });

    group.bench_function("a32_rotated_imm", |b| {
        b.iter(|| assemble(black_box("mov r0, #0xff000000"), ArchMode::AArch32).unwrap())
    });

    group.bench_function("thumb_movs_imm", |b| {
        b.iter(|| assemble(black_box("movs r0, #1"), ArchMode::Thumb).unwrap())
    });

    group.bench_function("thumb_ldr_offset", |b| {
        b.iter(|| assemble(black_box("ldr r0, [r1, #4]"), ArchMode::Thumb).unwrap())
    });

    group.finish();
}

// ─── Single-Word Disassembly Latency ─────────────────────────────────────────

fn bench_disassemble_single(c: &mut Criterion) {
    let mut group = c.benchmark_group("disassemble_single");

    // nop sits first in the table; str with writeback sits far down it.
    group.bench_function("aarch64_nop", |b| {
        b.iter(|| disassemble(black_box("1F2003D5"), ArchMode::AArch64).unwrap())
    });

    group.bench_function("aarch64_str_pre_index", |b| {
        b.iter(|| disassemble(black_box("E00F1FF8"), ArchMode::AArch64).unwrap())
    });

    group.bench_function("aarch64_cond_branch", |b| {
        b.iter(|| disassemble(black_box("E1000054"), ArchMode::AArch64).unwrap())
    });

    group.bench_function("a32_ldr_offset", |b| {
        b.iter(|| disassemble(black_box("040091E5"), ArchMode::AArch32).unwrap())
    });

    group.bench_function("thumb_adds", |b| {
        b.iter(|| disassemble(black_box("8818"), ArchMode::Thumb).unwrap())
    });

    // Worst case: the word matches nothing and the whole table is scanned.
    group.bench_function("aarch64_no_match", |b| {
        b.iter(|| disassemble(black_box("FFFFFFFF"), ArchMode::AArch64).unwrap_err())
    });

    group.finish();
}

// ─── Batch Throughput ────────────────────────────────────────────────────────

/// Generate a block of N AArch64 instruction lines.
fn gen_aarch64_lines(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| match i % 5 {
            0 => "add x0, x1, x2".to_owned(),
            1 => "sub sp, sp, #0x60".to_owned(),
            2 => "ldr w3, [x1]".to_owned(),
            3 => "and w3, w3, #0xff".to_owned(),
            _ => "cmp w3, #0x61".to_owned(),
        })
        .collect()
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch");
    let conv = Converter::new(ArchMode::AArch64);

    for n in [100usize, 1000] {
        let lines = gen_aarch64_lines(n);
        let words: Vec<String> = conv
            .assemble_all(&lines)
            .unwrap()
            .iter()
            .map(|w| w.to_hex())
            .collect();

        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("assemble_{n}_insn"), |b| {
            b.iter(|| conv.assemble_all(black_box(&lines)).unwrap())
        });
        group.bench_function(format!("disassemble_{n}_words"), |b| {
            b.iter(|| conv.disassemble_all(black_box(&words)).unwrap())
        });
    }

    group.finish();
}

// ─── Realistic Workloads ─────────────────────────────────────────────────────

fn bench_realistic(c: &mut Criterion) {
    let mut group = c.benchmark_group("realistic");

    // Function body with a frame, loads, compares and branches.
    let aarch64_fn = [
        "sub sp, sp, #0x20",
        "str x0, [sp, #8]",
        "ldr w3, [x1]",
        "and w3, w3, #0xff",
        "cmp w3, #0x61",
        "b.ne #0x1c",
        "add w0, w0, #1",
        "ldr x0, [sp], #0x20",
        "ret",
    ];
    let conv = Converter::new(ArchMode::AArch64).with_base_addr(0x1000);
    group.bench_function("aarch64_function", |b| {
        b.iter(|| conv.assemble_all(black_box(&aarch64_fn)).unwrap())
    });

    let a32_fn = [
        "movw r0, #0x1234",
        "movt r0, #0x5678",
        "ldr r1, [r0]",
        "add r1, r1, #1",
        "str r1, [r0]",
        "bx lr",
    ];
    let conv_a32 = Converter::new(ArchMode::AArch32);
    group.bench_function("a32_function", |b| {
        b.iter(|| conv_a32.assemble_all(black_box(&a32_fn)).unwrap())
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_assemble_single,
    bench_disassemble_single,
    bench_batch,
    bench_realistic,
);
criterion_main!(benches);
