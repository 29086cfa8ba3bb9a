//! Criterion benchmarks for the per-tick hot path.
//!
//! Benchmarks:
//! 1. Full feature recomputation over a session-sized buffer
//! 2. Individual indicator series (EMA, RSI, MACD, Bollinger)
//! 3. Gate evaluation on the latest vector

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chrono::{Duration, FixedOffset, TimeZone};
use spxwatch_core::components::AdmissionGate;
use spxwatch_core::domain::{Observation, RegimeLabel};
use spxwatch_core::indicators::{Bollinger, Ema, Macd, Rsi, SeriesIndicator};
use spxwatch_core::{FeatureConfig, FeatureEngine, TimeSeriesBuffer};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_observations(n: usize) -> Vec<Observation> {
    let open = FixedOffset::west_opt(5 * 3600)
        .unwrap()
        .with_ymd_and_hms(2026, 1, 29, 9, 30, 0)
        .unwrap();
    (0..n)
        .map(|i| {
            let price = 6000.0 + (i as f64 * 0.1).sin() * 15.0;
            Observation::new(
                open + Duration::minutes(i as i64),
                price,
                40.0 - i as f64 * 0.01,
                5.0,
                17.0,
            )
        })
        .collect()
}

fn filled_buffer(n: usize) -> TimeSeriesBuffer {
    let mut buffer = TimeSeriesBuffer::new(n);
    buffer.seed(make_observations(n));
    buffer
}

// ── 1. Feature recomputation ─────────────────────────────────────────

fn bench_recompute(c: &mut Criterion) {
    let engine = FeatureEngine::new(FeatureConfig::default());
    let mut group = c.benchmark_group("recompute");
    for n in [100usize, 390, 800] {
        let buffer = filled_buffer(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &buffer, |b, buf| {
            b.iter(|| engine.recompute(black_box(buf)))
        });
    }
    group.finish();
}

// ── 2. Indicator series ──────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let prices: Vec<f64> = make_observations(390).iter().map(|o| o.price).collect();
    let mut group = c.benchmark_group("indicators_390");
    group.bench_function("ema21", |b| b.iter(|| Ema::new(21).compute(black_box(&prices))));
    group.bench_function("rsi14", |b| b.iter(|| Rsi::new(14).compute(black_box(&prices))));
    group.bench_function("macd", |b| b.iter(|| Macd::standard().compute(black_box(&prices))));
    group.bench_function("bollinger20", |b| {
        b.iter(|| Bollinger::new(20, 2.0).compute(black_box(&prices)))
    });
    group.finish();
}

// ── 3. Gate ──────────────────────────────────────────────────────────

fn bench_gate(c: &mut Criterion) {
    let engine = FeatureEngine::new(FeatureConfig::default());
    let latest = engine
        .latest(&filled_buffer(390))
        .expect("buffer is non-empty");
    let gate = AdmissionGate::default();
    c.bench_function("gate_evaluate", |b| {
        b.iter(|| gate.evaluate(black_box(&latest), &RegimeLabel::RangeBound))
    });
}

criterion_group!(benches, bench_recompute, bench_indicators, bench_gate);
criterion_main!(benches);
