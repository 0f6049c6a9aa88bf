use crate::record::{LogRecord, CATEGORY_USER_INTERACTION};
use crate::tally::OrderedTally;

/// Percentage of `true` among records whose `success` is a boolean.
pub fn success_rate(records: &[LogRecord]) -> Option<f64> {
    let outcomes: Vec<bool> = records.iter().filter_map(|r| r.success).collect();
    if outcomes.is_empty() {
        return None;
    }
    let ok = outcomes.iter().filter(|s| **s).count();
    Some(ok as f64 / outcomes.len() as f64 * 100.0)
}

/// Hours between the earliest and latest parseable timestamps.
pub fn time_span_hours(records: &[LogRecord]) -> Option<f64> {
    let mut times = records.iter().filter_map(LogRecord::time);
    let first = times.next()?;
    let (min, max) = times.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
    Some((max - min).num_milliseconds() as f64 / 3_600_000.0)
}

pub fn extract_insights(records: &[LogRecord]) -> Vec<String> {
    let mut insights = Vec::new();

    let actions: OrderedTally<&str> = records
        .iter()
        .filter(|r| r.has_category(CATEGORY_USER_INTERACTION))
        .map(|r| r.action.as_deref().unwrap_or(""))
        .collect();
    if let Some((action, count)) = actions.mode() {
        insights.push(format!("Most frequent user action: {action} ({count} times)"));
    }

    if let Some(rate) = success_rate(records) {
        let line = if rate > 95.0 {
            format!("Excellent system reliability: {rate:.1}% success rate")
        } else if rate > 85.0 {
            format!("Good system reliability: {rate:.1}% success rate")
        } else {
            format!("System reliability concerns: {rate:.1}% success rate")
        };
        insights.push(line);
    }

    // a zero span (single timestamp or identical ones) says nothing
    if let Some(hours) = time_span_hours(records).filter(|h| *h > 0.0) {
        insights.push(format!("Analysis covers {hours:.1} hours of system activity"));
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::records_from_values;
    use serde_json::json;

    #[test]
    fn success_rate_ignores_non_boolean_values() {
        let recs = records_from_values(&[
            json!({"success": true}),
            json!({"success": false}),
            json!({"success": "true"}),
            json!({}),
        ])
        .unwrap();
        assert_eq!(success_rate(&recs), Some(50.0));
        assert_eq!(extract_insights(&recs), vec!["System reliability concerns: 50.0% success rate"]);
    }

    #[test]
    fn reliability_buckets() {
        let mk = |ok: usize, fail: usize| {
            let mut v = vec![json!({"success": true}); ok];
            v.extend(vec![json!({"success": false}); fail]);
            records_from_values(&v).unwrap()
        };
        assert_eq!(extract_insights(&mk(96, 4)), vec!["Excellent system reliability: 96.0% success rate"]);
        assert_eq!(extract_insights(&mk(95, 5)), vec!["Good system reliability: 95.0% success rate"]);
        assert_eq!(extract_insights(&mk(85, 15)), vec!["System reliability concerns: 85.0% success rate"]);
    }

    #[test]
    fn top_action_and_time_span() {
        let recs = records_from_values(&[
            json!({"category": "user_interaction", "action": "route_input", "timestamp": "2024-02-10T18:00:00Z"}),
            json!({"category": "user_interaction", "action": "power_on", "timestamp": "2024-02-10T19:30:00Z"}),
            json!({"category": "user_interaction", "action": "power_on", "timestamp": "2024-02-10T20:12:00Z"}),
        ])
        .unwrap();
        assert_eq!(
            extract_insights(&recs),
            vec![
                "Most frequent user action: power_on (2 times)",
                "Analysis covers 2.2 hours of system activity",
            ]
        );
    }

    #[test]
    fn single_timestamp_has_no_span_insight() {
        let recs = records_from_values(&[json!({"timestamp": "2024-02-10T18:00:00Z"})]).unwrap();
        assert!(extract_insights(&recs).is_empty());
    }
}
