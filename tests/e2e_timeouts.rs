//! E2E tests for timeout markers
//!
//! Markers must track exactly the failed samples in `[index - width, index]`,
//! across pruning, widening and narrowing.

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

/// Feed samples `from..=to`, failing those listed
fn feed(m: &mut MonitorState, to: u64, failed: &[u64]) {
    let from = m.current_index() + 1;
    for index in from..=to {
        if failed.contains(&index) {
            m.process(ProbeReply::failure());
        } else {
            m.process(ProbeReply::success(Duration::from_millis(25)));
        }
    }
}

/// Failed indices in `[index - width, index]`, computed from scratch
fn expected_markers(failed: &[u64], index: u64, width: u32) -> Vec<u64> {
    let floor = index.saturating_sub(u64::from(width));
    let mut expected: Vec<u64> = failed
        .iter()
        .copied()
        .filter(|&i| i >= floor && i <= index)
        .collect();
    expected.sort_unstable();
    expected.dedup();
    expected
}

#[test]
fn test_marker_lives_while_in_window() {
    let mut m = monitor(5);
    for index in 1..=8 {
        feed(&mut m, index, &[3]);
        if index >= 3 {
            assert_eq!(m.markers(), vec![3], "at index {}", index);
        }
    }
    feed(&mut m, 9, &[3]);
    assert!(m.markers().is_empty());
}

#[test]
fn test_widening_at_twelve_recovers_marker() {
    let mut m = monitor(5);
    feed(&mut m, 12, &[3]);
    assert!(m.markers().is_empty());

    m.resize(10);
    assert_eq!(m.markers(), vec![3]);
}

#[test]
fn test_widening_matches_scratch_computation() {
    let failed = [2, 3, 9, 15, 16, 22, 30, 41, 44, 45];
    for (w1, w2) in [(3u32, 8u32), (5, 20), (1, 50), (10, 11)] {
        let mut m = monitor(w1);
        feed(&mut m, 45, &failed);
        assert_eq!(m.markers(), expected_markers(&failed, 45, w1));

        m.resize(w2);
        assert_eq!(
            m.markers(),
            expected_markers(&failed, 45, w2),
            "widening {} -> {}",
            w1,
            w2
        );
    }
}

#[test]
fn test_repeated_widening_never_duplicates() {
    let failed = [4, 6, 8];
    let mut m = monitor(2);
    feed(&mut m, 10, &failed);

    m.resize(4);
    m.resize(8);
    m.resize(9);
    m.resize(100);
    assert_eq!(m.markers(), vec![4, 6, 8]);
    assert_eq!(m.timeouts().len(), 3);
}

#[test]
fn test_narrow_then_rewiden_restores_markers() {
    let failed = [5, 12, 18, 19, 27];
    let mut steady = monitor(15);
    let mut churned = monitor(15);
    feed(&mut steady, 30, &failed);
    feed(&mut churned, 30, &failed);

    churned.resize(4);
    churned.resize(1);
    churned.resize(9);
    churned.resize(15);
    assert_eq!(churned.markers(), steady.markers());

    // Keep ticking after the churn and stay in step
    feed(&mut steady, 40, &[33, 40]);
    feed(&mut churned, 40, &[33, 40]);
    assert_eq!(churned.markers(), steady.markers());
}

#[test]
fn test_narrowing_prunes_immediately() {
    let failed = [2, 7, 9];
    let mut m = monitor(10);
    feed(&mut m, 10, &failed);
    assert_eq!(m.markers(), vec![2, 7, 9]);

    m.resize(3);
    assert_eq!(m.markers(), vec![7, 9]);
}

#[test]
fn test_backfill_on_empty_history() {
    let mut m = monitor(5);
    m.resize(50);
    assert!(m.markers().is_empty());
    assert_eq!(m.current_index(), 0);
}

#[test]
fn test_zero_rtt_reply_is_a_timeout() {
    let mut m = monitor(5);
    m.process(ProbeReply::success(Duration::from_millis(30)));
    let outcome = m.process(ProbeReply::success(Duration::ZERO));

    assert!(outcome.failed);
    assert_eq!(m.markers(), vec![2]);
    assert!(m.window().values()[1].is_nan());
    assert_eq!(m.statistics().min, Some(30.0));
    assert_eq!(m.last_band(), Some(pingmon::band::RttBand::Failed));

    // Same marker set as an explicit failure would give
    let mut explicit = monitor(5);
    explicit.process(ProbeReply::success(Duration::from_millis(30)));
    explicit.process(ProbeReply::failure());
    assert_eq!(m.markers(), explicit.markers());
}
