//! Aggregation throughput benchmarks.
//!
//! Run with: `cargo bench --package candela-bench`

use candela_aggregate::CandleAggregator;
use candela_bench::{FeedConfig, replay, synthetic_trades};
use candela_types::Interval;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use std::thread;

fn feed_configs() -> Vec<(&'static str, FeedConfig)> {
    vec![
        (
            "1-symbol",
            FeedConfig {
                symbols: 1,
                trades: 100_000,
                step_ms: 10,
            },
        ),
        (
            "100-symbols",
            FeedConfig {
                symbols: 100,
                trades: 100_000,
                step_ms: 10,
            },
        ),
        (
            "5000-symbols",
            FeedConfig {
                symbols: 5_000,
                trades: 100_000,
                step_ms: 1,
            },
        ),
    ]
}

fn replay_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay");

    for (name, config) in feed_configs() {
        let trades = synthetic_trades(config);
        group.throughput(Throughput::Elements(trades.len() as u64));

        for interval in [Interval::SECOND, Interval::MINUTE] {
            group.bench_with_input(
                BenchmarkId::new(name, interval),
                &trades,
                |b, trades| {
                    b.iter(|| {
                        let aggregator = CandleAggregator::new(interval);
                        black_box(replay(&aggregator, trades))
                    });
                },
            );
        }
    }

    group.finish();
}

fn contended_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended");
    group.sample_size(20);

    let config = FeedConfig {
        symbols: 100,
        trades: 100_000,
        step_ms: 10,
    };
    let trades = Arc::new(synthetic_trades(config));
    group.throughput(Throughput::Elements(trades.len() as u64));

    for writers in [1, 2, 4] {
        group.bench_with_input(BenchmarkId::new("writers", writers), &writers, |b, &writers| {
            b.iter(|| {
                let aggregator = Arc::new(CandleAggregator::new(Interval::SECOND));
                let handles: Vec<_> = (0..writers)
                    .map(|w| {
                        let aggregator = aggregator.clone();
                        let trades = trades.clone();
                        thread::spawn(move || {
                            let mut drained = 0;
                            for trade in trades.iter().skip(w).step_by(writers) {
                                let _ = aggregator.accept_trade(trade);
                                drained += aggregator.drain_ready(trade.timestamp).len();
                            }
                            drained
                        })
                    })
                    .collect();

                let drained: usize = handles.into_iter().map(|h| h.join().unwrap_or(0)).sum();
                black_box(drained + aggregator.finish().len())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, replay_benchmark, contended_benchmark);
criterion_main!(benches);
