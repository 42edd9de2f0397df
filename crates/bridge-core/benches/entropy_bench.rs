//! Criterion benchmarks for the OS entropy fill.
//!
//! Measures `secure_random_bytes` across the request sizes the bridge
//! clamps receives to, to keep an eye on the per-call syscall overhead.
//!
//! Run with:
//! ```bash
//! cargo bench --package bridge-core --bench entropy_bench
//! ```

use bridge_core::secure_random_bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn bench_secure_random_bytes(c: &mut Criterion) {
    let mut group = c.benchmark_group("secure_random_bytes");
    for &size in &[32usize, 1024, 65536] {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| secure_random_bytes(black_box(size)).expect("entropy source failed"));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_secure_random_bytes);
criterion_main!(benches);
