use chrono::{DateTime, Duration, FixedOffset};
use itertools::Itertools;
use tracing::warn;

use crate::config::AnomalyRules;
use crate::record::{LogRecord, CATEGORY_USER_INTERACTION};

/// Counts adjacent pairs of sorted timestamps closer than `window`.
///
/// This counts qualifying gaps, not bursts: a run of N errors one second
/// apart yields N-1.
pub fn count_rapid_gaps(times: &[DateTime<FixedOffset>], window: Duration) -> usize {
    let mut sorted = times.to_vec();
    sorted.sort_unstable();
    sorted.iter().tuple_windows().filter(|(a, b)| **b - **a < window).count()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Values strictly greater than `factor` times the mean.
pub fn count_outliers(values: &[f64], factor: f64) -> usize {
    match mean(values) {
        Some(m) => values.iter().filter(|v| **v > m * factor).count(),
        None => 0,
    }
}

pub fn durations(records: &[LogRecord]) -> Vec<f64> {
    records.iter().filter_map(|r| r.duration).collect()
}

pub fn detect_anomalies(records: &[LogRecord], rules: &AnomalyRules) -> Vec<String> {
    let mut anomalies = Vec::new();

    let error_times: Vec<DateTime<FixedOffset>> =
        records.iter().filter(|r| r.is_error()).filter_map(LogRecord::time).collect();
    match Duration::try_seconds(rules.rapid_window_secs) {
        Some(window) => {
            let rapid = count_rapid_gaps(&error_times, window);
            if rapid > rules.rapid_min_sequences {
                anomalies.push(format!("Detected {rapid} rapid error sequences"));
            }
        }
        None => warn!(secs = rules.rapid_window_secs, "rapid error window out of range; burst check skipped"),
    }

    let user_actions = records.iter().filter(|r| r.has_category(CATEGORY_USER_INTERACTION)).count();
    if user_actions > rules.user_activity_limit {
        anomalies.push("Unusually high user activity detected".to_string());
    }

    let outliers = count_outliers(&durations(records), rules.outlier_factor);
    if outliers > 0 {
        anomalies.push(format!("Detected {outliers} performance outliers"));
    }

    anomalies
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<FixedOffset> {
        let base = FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2024, 1, 1, 20, 0, 0).unwrap();
        base + Duration::seconds(secs)
    }

    #[test]
    fn gaps_counted_after_sorting() {
        let times = vec![at(8), at(0), at(4), at(30)];
        assert_eq!(count_rapid_gaps(&times, Duration::seconds(10)), 2);
    }

    #[test]
    fn gap_of_exactly_window_does_not_count() {
        let times = vec![at(0), at(10), at(20)];
        assert_eq!(count_rapid_gaps(&times, Duration::seconds(10)), 0);
    }

    #[test]
    fn run_of_errors_counts_pairs_not_bursts() {
        let times: Vec<_> = (0..6).map(|i| at(i)).collect();
        assert_eq!(count_rapid_gaps(&times, Duration::seconds(10)), 5);
    }

    #[test]
    fn outliers_are_strictly_above_factor() {
        assert_eq!(count_outliers(&[], 3.0), 0);
        assert_eq!(count_outliers(&[10.0, 10.0, 10.0], 3.0), 0);
        let mut vals = vec![100.0; 9];
        vals.push(5000.0);
        // mean 590, threshold 1770
        assert_eq!(count_outliers(&vals, 3.0), 1);
    }

    #[test]
    fn oversized_window_skips_burst_check() {
        let recs = crate::record::records_from_values(&[
            serde_json::json!({"level": "error", "timestamp": "2024-01-01T20:00:00Z"}),
            serde_json::json!({"level": "error", "timestamp": "2024-01-01T20:00:01Z"}),
        ])
        .unwrap();
        let rules = AnomalyRules { rapid_window_secs: i64::MAX, rapid_min_sequences: 0, ..AnomalyRules::default() };
        assert!(detect_anomalies(&recs, &rules).is_empty());
    }

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
    }
}
