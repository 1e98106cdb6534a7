//! Terminal rendering of monitor snapshots
//!
//! Colours follow the severity bands computed in the core; this module only
//! maps bands to terminal styles.

use chrono::Local;
use console::{style, StyledObject};
use pingmon_core::band::RttBand;
use pingmon_core::freshness::{FreshnessBand, FreshnessReport};
use pingmon_core::monitor::MonitorSnapshot;
use pingmon_core::series::Transform;

fn styled_rtt<D>(band: Option<RttBand>, value: D) -> StyledObject<D> {
    let text = style(value);
    match band {
        None | Some(RttBand::Failed) => text.dim(),
        Some(RttBand::Excellent) => text.green().bright(),
        Some(RttBand::Good) => text.green(),
        Some(RttBand::Fair) => text.yellow(),
        Some(RttBand::Poor) => text.red().bright(),
        Some(RttBand::Critical) => text.red(),
    }
}

fn styled_freshness<D>(band: FreshnessBand, value: D) -> StyledObject<D> {
    let text = style(value);
    match band {
        FreshnessBand::Stale => text.green(),
        FreshnessBand::Cooling => text.green().bright(),
        FreshnessBand::Warm => text.yellow(),
        FreshnessBand::Hot => text.red(),
    }
}

/// Statistic back in milliseconds, or `--` when undefined
fn stat_ms(transform: Transform, value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.0}", transform.invert(v)),
        None => "--".to_string(),
    }
}

/// `[12:00:01]   42 ms | max 80 min 12 avg 35 med 30 | axis 11-84 ms | timeouts 1/10`
pub fn status_line(snapshot: &MonitorSnapshot) -> String {
    let time = snapshot.taken_at.with_timezone(&Local).format("%H:%M:%S");
    // Failures print as 0 ms
    let rtt = snapshot.last_rtt_ms.map_or(0, |ms| ms.round() as u64);
    let summary = &snapshot.summary;
    let (low, high) = snapshot.y_limits.unzip();

    format!(
        "[{}] {} ms | max {} min {} avg {} med {} | axis {}-{} ms | timeouts {}/{}",
        time,
        styled_rtt(snapshot.last_band, format!("{:>5}", rtt)),
        stat_ms(snapshot.transform, summary.max),
        stat_ms(snapshot.transform, summary.min),
        stat_ms(snapshot.transform, summary.average),
        stat_ms(snapshot.transform, summary.median),
        stat_ms(snapshot.transform, low),
        stat_ms(snapshot.transform, high),
        snapshot.markers.len(),
        snapshot.window_width,
    )
}

/// Freshness report with each threshold coloured by its band
pub fn freshness_line(report: &FreshnessReport) -> String {
    report
        .entries()
        .iter()
        .map(|entry| styled_freshness(entry.band, entry.to_string()).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use pingmon_core::monitor::{MonitorConfig, MonitorState};
    use pingmon_core::probe::ProbeReply;

    fn plain(s: &str) -> String {
        console::strip_ansi_codes(s).to_string()
    }

    #[test]
    fn test_status_line_reports_statistics() {
        let mut monitor = MonitorState::new(MonitorConfig::default());
        for ms in [10, 100, 1000] {
            monitor.process(ProbeReply::success(std::time::Duration::from_millis(ms)));
        }
        monitor.inject_failure();

        let line = plain(&status_line(&monitor.snapshot(Utc::now(), false)));
        assert!(line.contains("    0 ms"), "{}", line);
        assert!(line.contains("max 1000 min 10 avg 100"), "{}", line);
        assert!(line.contains("med --"), "{}", line);
        assert!(line.contains("axis 9-1413 ms"), "{}", line);
        assert!(line.ends_with("timeouts 1/10"), "{}", line);
    }

    #[test]
    fn test_status_line_without_samples() {
        let monitor = MonitorState::new(MonitorConfig::default());
        let line = plain(&status_line(&monitor.snapshot(Utc::now(), false)));
        assert!(line.contains("axis ---- ms"), "{}", line);
        assert!(line.ends_with("timeouts 0/10"), "{}", line);
    }

    #[test]
    fn test_freshness_line_matches_report_text() {
        let now = Utc::now();
        let report = FreshnessReport::build(
            vec![(0, now - Duration::seconds(45)), (25, now)],
            now,
            false,
        );
        assert_eq!(plain(&freshness_line(&report)), report.to_string());
    }
}
