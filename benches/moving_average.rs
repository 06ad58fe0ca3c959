//! Benchmarks for training and cached forecasting of moving-average models.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use openforecast::core::Dataset;
use openforecast::models::baseline::{MovingAverage, WeightedMovingAverage};
use openforecast::models::ForecastingModel;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn noisy_series(n: usize) -> Dataset {
    let mut rng = StdRng::seed_from_u64(42);
    let values: Vec<f64> = (0..n)
        .map(|i| 100.0 + 0.1 * i as f64 + rng.gen_range(-5.0..5.0))
        .collect();
    Dataset::from_values("t", 0.0, 1.0, &values)
}

fn bench_train(c: &mut Criterion) {
    let mut group = c.benchmark_group("train");

    for size in [50, 200, 800].iter() {
        let data = noisy_series(*size);

        group.bench_with_input(BenchmarkId::new("MA(6)", size), &data, |b, d| {
            b.iter(|| {
                let mut model = MovingAverage::new(6);
                model.train(black_box(d)).unwrap();
                black_box(model.mse())
            })
        });

        group.bench_with_input(BenchmarkId::new("WMA(1..6)", size), &data, |b, d| {
            b.iter(|| {
                let mut model =
                    WeightedMovingAverage::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
                model.train(black_box(d)).unwrap();
                black_box(model.mse())
            })
        });
    }
    group.finish();
}

fn bench_forecast_horizon(c: &mut Criterion) {
    let mut group = c.benchmark_group("forecast_horizon");
    let data = noisy_series(200);

    for horizon in [1usize, 10, 100].iter() {
        group.bench_with_input(BenchmarkId::new("cold", horizon), horizon, |b, &h| {
            b.iter(|| {
                let mut model = MovingAverage::new(6);
                model.train(&data).unwrap();
                black_box(model.forecast_time(199.0 + h as f64).unwrap())
            })
        });

        let mut warm = MovingAverage::new(6);
        warm.train(&data).unwrap();
        warm.forecast_time(199.0 + *horizon as f64).unwrap();

        group.bench_with_input(BenchmarkId::new("cached", horizon), horizon, |b, &h| {
            b.iter(|| black_box(warm.forecast_time(199.0 + h as f64).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_train, bench_forecast_horizon);
criterion_main!(benches);
