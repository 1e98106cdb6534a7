//! E2E tests for the windowed series
//!
//! Feeds sample streams through the monitor and checks the window length
//! invariant, failure alignment and resize behavior.

use pingmon::monitor::{MonitorConfig, MonitorState};
use pingmon::probe::ProbeReply;
use pingmon::series::Transform;
use std::time::Duration;

fn monitor(width: u32) -> MonitorState {
    MonitorState::new(MonitorConfig {
        window_width: width,
        transform: Transform::Identity,
        ..Default::default()
    })
}

fn reply(rtt: Option<u64>) -> ProbeReply {
    match rtt {
        Some(ms) => ProbeReply::success(Duration::from_millis(ms)),
        None => ProbeReply::failure(),
    }
}

#[test]
fn test_window_length_invariant() {
    for width in [0u32, 1, 5, 10, 37] {
        let mut m = monitor(width);
        for n in 1..=60u64 {
            let rtt = if n % 7 == 0 { None } else { Some(n) };
            m.process(reply(rtt));
            assert_eq!(
                m.window().len(),
                (n as usize).min(width as usize),
                "width {} after {} samples",
                width,
                n
            );
        }
    }
}

#[test]
fn test_fifteen_samples_width_ten() {
    let mut m = monitor(10);
    for ms in 1..=15 {
        m.process(reply(Some(ms)));
    }

    let expected: Vec<f64> = (6..=15).map(|v| v as f64).collect();
    assert_eq!(m.window().values(), expected.as_slice());

    let xs: Vec<u64> = m.series().iter().map(|&(x, _)| x).collect();
    assert_eq!(xs, (6..=15).collect::<Vec<u64>>());
}

#[test]
fn test_failures_keep_x_alignment() {
    let mut m = monitor(4);
    for rtt in [Some(10), None, Some(30), None] {
        m.process(reply(rtt));
    }
    let series = m.series();
    assert_eq!(series.len(), 4);
    assert_eq!(series[0], (1, 10.0));
    assert_eq!(series[1].0, 2);
    assert!(series[1].1.is_nan());
    assert!(series[3].1.is_nan());
}

#[test]
fn test_padded_slots_for_fixed_consumers() {
    let mut m = monitor(6);
    m.process(reply(Some(5)));
    m.process(reply(Some(6)));

    let slots = m.window().padded();
    assert_eq!(slots.len(), 6);
    assert!(slots[..4].iter().all(|v| v.is_nan()));
    assert_eq!(&slots[4..], &[5.0, 6.0]);
}

#[test]
fn test_resize_to_zero_then_back() {
    let mut m = monitor(5);
    for ms in 1..=8 {
        m.process(reply(Some(ms)));
    }
    m.resize(0);
    assert!(m.window().is_empty());
    assert!(m.statistics().max.is_none());

    m.resize(3);
    assert_eq!(m.window().values(), &[6.0, 7.0, 8.0]);
}

#[test]
fn test_gap_between_ticks_still_advances_by_one() {
    let mut m = monitor(5);
    let start = chrono::Utc::now();
    m.process(ProbeReply::success_at(Duration::from_millis(10), start));
    let later = start + chrono::Duration::minutes(10);
    let outcome = m.process(ProbeReply::success_at(Duration::from_millis(12), later));
    assert_eq!(outcome.index, 2);
    assert_eq!(m.current_index(), 2);
}

#[test]
fn test_snapshot_series_has_width_slots_while_filling() {
    let mut m = monitor(10);
    for (n, rtt) in [Some(12), None, Some(18)].into_iter().enumerate() {
        m.process(reply(rtt));
        let snapshot = m.snapshot(chrono::Utc::now(), false);
        assert_eq!(snapshot.series.len(), 10, "after {} samples", n + 1);
        assert_eq!(snapshot.series.last().map(|&(x, _)| x), Some(n as i64 + 1));
    }

    let snapshot = m.snapshot(chrono::Utc::now(), false);
    let xs: Vec<i64> = snapshot.series.iter().map(|&(x, _)| x).collect();
    assert_eq!(xs, (-6..=3).collect::<Vec<i64>>());
    assert!(snapshot.series[..7].iter().all(|&(_, v)| v.is_nan()));
    assert_eq!(snapshot.series[7], (1, 12.0));
    assert!(snapshot.series[8].1.is_nan());
    assert_eq!(snapshot.series[9], (3, 18.0));
    let (low, high) = snapshot.y_limits.unwrap();
    assert_eq!(low, 0.95);
    approx::assert_relative_eq!(high, 18.9, epsilon = 1e-9);
}
