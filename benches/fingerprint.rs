//! Benchmarks for fingerprint construction and comparison.
//!
//! Counting and hashing scale with trace length; scoring is a handful of
//! word-level popcounts and should be flat in trace length.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;
use tracegram::{
    build_bitvector, build_ngrams, compare, stable_hash, top_k, FingerprintConfig, Fingerprinter,
};

// === Generators ===

const SYSCALLS: &[&str] = &[
    "execve", "brk", "mmap", "mprotect", "munmap", "openat", "fstat", "read", "write", "close",
    "futex", "clone", "wait4", "rt_sigaction", "ioctl", "lseek", "getdents64", "poll",
];

fn random_trace(len: usize, seed: u64) -> Vec<&'static str> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| SYSCALLS[rng.gen_range(0..SYSCALLS.len())])
        .collect()
}

// === Benchmarks ===

fn bench_build_ngrams(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_ngrams");

    for len in [1_000, 10_000, 100_000].iter() {
        group.throughput(Throughput::Elements(*len as u64));
        let trace = random_trace(*len, 42);

        group.bench_with_input(BenchmarkId::from_parameter(len), len, |bench, _| {
            bench.iter(|| build_ngrams(black_box(&trace), 3).unwrap());
        });
    }

    group.finish();
}

fn bench_top_k(c: &mut Criterion) {
    let mut group = c.benchmark_group("top_k");
    let freq = build_ngrams(&random_trace(100_000, 7), 3).unwrap();

    for k in [16, 256, 4096].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(k), k, |bench, &k| {
            bench.iter(|| top_k(black_box(&freq), k));
        });
    }

    group.finish();
}

fn bench_stable_hash(c: &mut Criterion) {
    c.bench_function("stable_hash", |bench| {
        bench.iter(|| stable_hash(black_box("openat,fstat,mmap"), 256).unwrap());
    });
}

fn bench_build_bitvector(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_bitvector");
    let freq = build_ngrams(&random_trace(50_000, 11), 3).unwrap();
    let grams: Vec<_> = freq.ngrams().cloned().collect();

    for bits in [64, 256, 1024].iter() {
        group.throughput(Throughput::Elements(grams.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(bits), bits, |bench, &bits| {
            bench.iter(|| build_bitvector(black_box(&grams), bits).unwrap());
        });
    }

    group.finish();
}

fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare");

    for bits in [64, 256, 4096].iter() {
        let fpr = Fingerprinter::new(FingerprintConfig::new(3, *bits, 0).unwrap()).unwrap();
        let a = fpr.fingerprint(&random_trace(10_000, 1)).unwrap();
        let b = fpr.fingerprint(&random_trace(10_000, 2)).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(bits), bits, |bench, _| {
            bench.iter(|| compare(black_box(&a), black_box(&b)).unwrap());
        });
    }

    group.finish();
}

fn bench_pipeline_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("fingerprint_batch");
    let fpr = Fingerprinter::new(FingerprintConfig::new(3, 256, 64).unwrap()).unwrap();

    for n in [8, 64].iter() {
        let traces: Vec<Vec<&str>> = (0..*n).map(|i| random_trace(5_000, i as u64)).collect();
        group.throughput(Throughput::Elements(*n as u64));

        group.bench_with_input(BenchmarkId::from_parameter(n), n, |bench, _| {
            bench.iter(|| fpr.fingerprint_batch(black_box(traces.as_slice())).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_build_ngrams,
    bench_top_k,
    bench_stable_hash,
    bench_build_bitvector,
    bench_compare,
    bench_pipeline_batch,
);
criterion_main!(benches);
