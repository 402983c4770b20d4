//! # Operator Benchmarks
//!
//! Performance benchmarks for sluice-core pull chains.
//!
//! Run with: `cargo bench -p sluice-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use sluice_core::{Status, Stream, ops, pipeline};
use std::hint::black_box;

/// Counter behind `depth` no-op stages: pure propagation overhead.
fn deep_chain(depth: usize) -> Stream {
    let mut stages = vec![ops::counter()];
    for _ in 0..depth {
        stages.push(ops::nooper());
    }
    pipeline(stages).expect("pipeline")
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_pull_through_noopers(c: &mut Criterion) {
    let mut group = c.benchmark_group("pull_through_noopers");

    for depth in [1usize, 8, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            let mut chain = deep_chain(depth);
            b.iter(|| black_box(chain.pull(Status::Ok)));
        });
    }

    group.finish();
}

fn bench_multiplier(c: &mut Criterion) {
    c.bench_function("counter_times_ten", |b| {
        let mut chain =
            pipeline([ops::counter(), ops::multiplier(10)]).expect("pipeline");
        b.iter(|| black_box(chain.pull(Status::Ok)));
    });
}

fn bench_splitter(c: &mut Criterion) {
    let mut group = c.benchmark_group("splitter");

    for chunk_len in [64usize, 1024] {
        group.bench_with_input(
            BenchmarkId::from_parameter(chunk_len),
            &chunk_len,
            |b, &chunk_len| {
                let line: Vec<u8> = b"x".repeat(chunk_len - 1).into_iter().chain(*b"\n").collect();
                b.iter(|| {
                    let source = ops::single_value(&line).expect("source");
                    let split = ops::splitter(b"\n").expect("splitter");
                    let mut chain = pipeline([source, split]).expect("pipeline");
                    while let Some(value) = chain.pull(Status::Ok) {
                        black_box(value);
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_pull_through_noopers,
    bench_multiplier,
    bench_splitter
);
criterion_main!(benches);
