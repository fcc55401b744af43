use criterion::{criterion_group, criterion_main, Criterion};
use dmg_core::test::{build_test, TestOptions};

fn benchmark_cpu_clock(c: &mut Criterion) {
    let mut gb = build_test(TestOptions {
        ppu_enabled: Some(false),
        apu_enabled: Some(false),
        dma_enabled: Some(false),
        io_enabled: Some(false),
    });

    c.bench_function("cpu_cycles", |b| {
        b.iter(|| {
            gb.steps(1_000_000);
        })
    });
}

criterion_group!(benches, benchmark_cpu_clock);
criterion_main!(benches);
