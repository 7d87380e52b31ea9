use criterion::{criterion_group, criterion_main};

use periodogram::{bench_multiband_periodogram, bench_periodogram};

use phasor::bench_phasor;

criterion_group!(
    benches,
    bench_periodogram,
    bench_multiband_periodogram,
    bench_phasor
);
criterion_main!(benches);
