//! Benchmarks for chart series building and history decoding
//!
//! Run with: cargo bench

use coinwatch::views::{build_candlestick, build_line};
use coinwatch::OhlcvPoint;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn history_json(count: usize) -> String {
    let points: Vec<String> = (0..count as i64)
        .map(|i| {
            let close = 1_700_086_399 + i * 86_400;
            format!(
                r#"{{"time_open":{},"time_close":{},"open":"{}.5","high":{},"low":{},"close":{},"volume":"1000","market_cap":0}}"#,
                close - 86_399,
                close,
                99 + i,
                110 + i,
                90 + i,
                100 + i
            )
        })
        .collect();
    format!("[{}]", points.join(","))
}

fn bench_series(c: &mut Criterion) {
    let mut group = c.benchmark_group("series");

    for size in [14, 365, 5000] {
        let json = history_json(size);
        let points: Vec<OhlcvPoint> = serde_json::from_str(&json).unwrap();

        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("decode_{}", size), |b| {
            b.iter(|| serde_json::from_str::<Vec<OhlcvPoint>>(black_box(&json)).unwrap())
        });

        group.bench_function(format!("line_{}", size), |b| {
            b.iter(|| build_line(black_box(&points)))
        });

        group.bench_function(format!("candlestick_{}", size), |b| {
            b.iter(|| build_candlestick(black_box(&points)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_series);
criterion_main!(benches);
