use criterion::{criterion_group, criterion_main, Criterion};

use acca::comb::{count_combinations, is_unique_quadratic, Combinator};

fn criterion_benchmark(c: &mut Criterion) {
    // sanity check
    let mut combinator = Combinator::new(10, 3);
    let mut unique = 0;
    while let Some(ordinals) = combinator.advance() {
        if is_unique_quadratic(ordinals) {
            unique += 1;
        }
    }
    assert_eq!(count_combinations(10, 3), unique);

    fn bench(c: &mut Criterion, items: usize, legs: usize) {
        c.bench_function(&format!("cri_comb_{items}c{legs}"), |b| {
            b.iter(|| {
                let mut combinator = Combinator::new(items, legs);
                let mut visited = 0u64;
                while combinator.advance().is_some() {
                    visited += 1;
                }
                visited
            });
        });
    }
    bench(c, 30, 3);
    bench(c, 60, 3);
    bench(c, 30, 4);
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
