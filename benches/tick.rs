//! Benchmarks for the per-tick pipeline
//!
//! `process` runs once per probe interval on the driver thread, and `resize`
//! runs on width changes. Both should stay well below a millisecond at the
//! largest supported window.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pingmon::monitor::{MonitorConfig, MonitorState};
use pingmon::probe::ProbeReply;
use pingmon::MAX_WINDOW_WIDTH;
use std::time::Duration;

/// Monitor pre-filled with `samples` replies, every 9th one failed
fn warmed(width: u32, samples: u64) -> MonitorState {
    let mut monitor = MonitorState::new(MonitorConfig {
        window_width: width,
        ..Default::default()
    });
    for n in 1..=samples {
        monitor.process(reply(n));
    }
    monitor
}

fn reply(n: u64) -> ProbeReply {
    if n % 9 == 0 {
        ProbeReply::failure()
    } else {
        ProbeReply::success(Duration::from_millis(20 + n % 180))
    }
}

fn bench_process(c: &mut Criterion) {
    let mut group = c.benchmark_group("process");
    for width in [10u32, 120, MAX_WINDOW_WIDTH] {
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, &width| {
            let mut monitor = warmed(width, 5_000);
            let mut n = monitor.current_index();
            b.iter(|| {
                n += 1;
                black_box(monitor.process(reply(n)));
            });
        });
    }
    group.finish();
}

fn bench_resize(c: &mut Criterion) {
    c.bench_function("resize_widen_narrow", |b| {
        let mut monitor = warmed(10, 5_000);
        b.iter(|| {
            monitor.resize(black_box(MAX_WINDOW_WIDTH));
            monitor.resize(black_box(10));
        });
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let monitor = warmed(MAX_WINDOW_WIDTH, 5_000);
    c.bench_function("snapshot", |b| {
        b.iter(|| black_box(monitor.snapshot(chrono::Utc::now(), false)));
    });
}

criterion_group!(benches, bench_process, bench_resize, bench_snapshot);
criterion_main!(benches);
