//! Benchmarks for metric aggregation and history windows

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use face_guidance::metrics::{BoundedHistory, MetricsAggregator};

fn bench_record(c: &mut Criterion) {
    let mut group = c.benchmark_group("metrics");

    for capacity in [50, 500] {
        let mut metrics = MetricsAggregator::new(capacity, 0.9);
        let mut t = 0.0;
        group.bench_with_input(BenchmarkId::new("record", capacity), &capacity, |b, _| {
            b.iter(|| {
                t += 0.033;
                black_box(metrics.record(black_box(t), black_box(t + 0.004), true))
            });
        });
    }

    group.finish();
}

fn bench_history_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("history");

    for capacity in [50, 500, 5000] {
        let mut history = BoundedHistory::new(capacity);
        for _ in 0..capacity {
            history.push(rand::random::<f64>() * 30.0);
        }

        group.bench_with_input(BenchmarkId::new("push", capacity), &capacity, |b, _| {
            b.iter(|| history.push(black_box(29.7)));
        });
        group.bench_with_input(BenchmarkId::new("stats", capacity), &capacity, |b, _| {
            b.iter(|| black_box(history.stats()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_record, bench_history_stats);
criterion_main!(benches);
