//! Benchmarks for damage distribution

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use firstaid::damage::distribution::PartWeight;
use firstaid::{DamageDistribution, DamageModelConfig, FirstAidRegistry, PlayerDamageModel, PlayerPart};

fn distributions() -> Vec<DamageDistribution> {
    vec![
        DamageDistribution::Random,
        DamageDistribution::Head,
        DamageDistribution::Fall,
        DamageDistribution::Starve,
        DamageDistribution::Weighted(vec![
            PartWeight::new(PlayerPart::Head, 1.0),
            PartWeight::new(PlayerPart::Body, 3.0),
        ]),
    ]
}

fn bench_distribute(c: &mut Criterion) {
    let mut group = c.benchmark_group("distribute");
    let config = DamageModelConfig::uniform(20.0);
    let registry = FirstAidRegistry::standard();

    for distribution in distributions() {
        group.bench_with_input(
            BenchmarkId::from_parameter(distribution.name()),
            &distribution,
            |b, distribution| {
                let mut model = PlayerDamageModel::with_seed(&config, &registry, 42);
                b.iter(|| {
                    let outcome = model.apply_damage(black_box(6.5), distribution, false);
                    model.revive_player();
                    black_box(outcome)
                });
            },
        );
    }

    group.finish();
}

fn bench_tick(c: &mut Criterion) {
    let config = DamageModelConfig::default();
    let registry = FirstAidRegistry::standard();
    let ctx = firstaid::PlayerContext::default();

    c.bench_function("tick", |b| {
        let mut model = PlayerDamageModel::with_seed(&config, &registry, 7);
        model.apply_damage(10.0, &DamageDistribution::Random, true);
        b.iter(|| black_box(model.tick(&ctx)));
    });
}

criterion_group!(benches, bench_distribute, bench_tick);
criterion_main!(benches);
