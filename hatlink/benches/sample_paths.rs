//! Per-sample hot path benchmarks.
//!
//! The settle window and the range trigger run inside the delivery
//! context on every sample; the angle normalization runs per absolute
//! move. All three must stay far below the sample cadence.

use criterion::{Criterion, criterion_group, criterion_main};
use hatlink::angle::shortest_delta;
use hatlink::range::RangeTrigger;
use hatlink::settle::SettleWindow;
use std::hint::black_box;

fn bench_settle_observe(c: &mut Criterion) {
    let mut window = SettleWindow::new();
    let mut position = 0.0f64;

    c.bench_function("settle_observe", |b| {
        b.iter(|| {
            position += 0.37;
            black_box(window.observe(black_box(position)));
        });
    });
}

fn bench_range_observe(c: &mut Criterion) {
    let mut trigger = RangeTrigger::new(100);
    let readings = [150, 80, 80, -1, 150, 99, 101];
    let mut idx = 0usize;

    c.bench_function("range_observe", |b| {
        b.iter(|| {
            idx = (idx + 1) % readings.len();
            black_box(trigger.observe(black_box(readings[idx])));
        });
    });
}

fn bench_shortest_delta(c: &mut Criterion) {
    let mut angle = 0.0f64;

    c.bench_function("shortest_delta", |b| {
        b.iter(|| {
            angle = (angle + 37.0) % 360.0;
            black_box(shortest_delta(black_box(angle), black_box(123.0)));
        });
    });
}

criterion_group!(
    benches,
    bench_settle_observe,
    bench_range_observe,
    bench_shortest_delta
);
criterion_main!(benches);
