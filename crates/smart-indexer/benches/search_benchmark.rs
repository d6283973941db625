use criterion::{black_box, criterion_group, criterion_main, Criterion};
use smart_indexer::search::rank_names;

fn sample_names(size: usize) -> Vec<String> {
    (0..size)
        .map(|i| format!("getUserSetting{i}"))
        .collect()
}

fn benchmark_search(c: &mut Criterion) {
    let names = sample_names(20_000);

    c.bench_function("rank_names_exact_prefix", |b| {
        b.iter(|| rank_names(black_box("getUser"), black_box(names.clone()), black_box(50)))
    });

    c.bench_function("rank_names_subsequence", |b| {
        b.iter(|| rank_names(black_box("gUS"), black_box(names.clone()), black_box(50)))
    });
}

criterion_group!(benches, benchmark_search);
criterion_main!(benches);
