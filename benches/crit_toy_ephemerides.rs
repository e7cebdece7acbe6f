use criterion::{black_box, criterion_group, criterion_main, Criterion};
use spice_core::backend::{FakeBackend, SpiceBackend};
use spice_core::ephemeris::spkezr;
use spice_core::time::EphemerisTime;

const NUM_QUERIES: i64 = 10_000;

fn benchmark_free_function_spkezr() {
    for i in 0..NUM_QUERIES {
        let et = EphemerisTime::from_seconds(i as f64 * 86_400.0);
        black_box(spkezr(399, et, 301, "NONE"));
    }
}

fn benchmark_backend_dispatch_spkezr(backend: &mut FakeBackend) {
    for i in 0..NUM_QUERIES {
        let et = i as f64 * 86_400.0;
        black_box(backend.spkezr(
            "MOON",
            EphemerisTime::from_seconds(et),
            "J2000",
            "NONE",
            "EARTH",
        ));
    }
}

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("toy ephemeris free-function spkezr", |b| {
        b.iter(benchmark_free_function_spkezr)
    });

    let mut backend = FakeBackend::new();
    c.bench_function("toy ephemeris backend dispatch spkezr", |b| {
        b.iter(|| benchmark_backend_dispatch_spkezr(&mut backend))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
