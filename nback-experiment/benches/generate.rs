use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use nback_experiment::{NBackConfig, generate_block};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn bench_generate_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_block");
    for trials in [25usize, 100, 1000] {
        let config = NBackConfig::default().with_trials(trials);
        group.bench_function(format!("trials_{trials}"), |b| {
            b.iter_batched(
                || StdRng::seed_from_u64(9),
                |mut rng| black_box(generate_block(&mut rng, black_box(&config)).unwrap()),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_generate_block);
criterion_main!(benches);
