//! Rule-engine fixed-point benchmarks: built-in conjunction decomposition
//! and anaphora resolution at increasing knowledge-base sizes.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use semhg::execution::ResourceLimits;
use semhg::kb::Kb;
use semhg::notation;
use semhg::rules::RuleEngine;

fn seeded_conjunction_kb(sentences: usize) -> Kb {
    let kb = Kb::new();
    for i in 0..sentences {
        kb.insert(
            notation::parse(&format!(
                "(likes/P person{i}/C.s (and/J bananas{i}/C apples{i}/C))"
            ))
            .unwrap(),
        );
    }
    kb
}

fn bench_conjunction_decomposition_fixed_point(c: &mut Criterion) {
    let mut group = c.benchmark_group("conjunction_decomposition");
    for size in [10usize, 100, 500] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || seeded_conjunction_kb(size),
                |kb| {
                    let mut engine = RuleEngine::with_builtins();
                    engine.run(&kb, &ResourceLimits::default(), None).unwrap();
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn seeded_anaphora_kb(sentences: usize) -> Kb {
    let kb = Kb::new();
    for i in 0..sentences {
        kb.insert(
            notation::parse(&format!(
                "(claim/P person{i}/C.s (likes/P she/C.s bananas{i}/C))"
            ))
            .unwrap(),
        );
    }
    kb
}

fn bench_anaphora_resolution_fixed_point(c: &mut Criterion) {
    let mut group = c.benchmark_group("anaphora_resolution");
    for size in [10usize, 100, 500] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || seeded_anaphora_kb(size),
                |kb| {
                    let mut engine = RuleEngine::with_builtins();
                    engine.run(&kb, &ResourceLimits::default(), None).unwrap();
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_conjunction_decomposition_fixed_point,
    bench_anaphora_resolution_fixed_point
);
criterion_main!(benches);
