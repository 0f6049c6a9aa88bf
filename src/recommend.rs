use crate::anomaly::{durations, mean};
use crate::config::RecommendationRules;
use crate::record::{LogRecord, CATEGORY_SECURITY};
use crate::tally::OrderedTally;

pub fn generate_recommendations(records: &[LogRecord], rules: &RecommendationRules) -> Vec<String> {
    let mut recs = Vec::new();

    let errors: Vec<&LogRecord> = records.iter().filter(|r| r.is_error()).collect();
    let error_rate = if records.is_empty() { 0.0 } else { errors.len() as f64 / records.len() as f64 };
    if error_rate > rules.high_error_rate {
        recs.push("High error rate detected - investigate system stability".to_string());
    }

    if let Some(avg) = mean(&durations(records)) {
        if avg > rules.slow_mean_ms {
            recs.push("Average response time is high - optimize slow operations".to_string());
        }
    }

    let failing: OrderedTally<&str> = errors.iter().filter_map(|r| r.device_type.as_deref()).collect();
    for (device, count) in failing.top(rules.device_limit) {
        recs.push(format!("Check {device} device - {count} errors detected"));
    }

    if records.iter().any(|r| r.has_category(CATEGORY_SECURITY)) {
        recs.push("Security events detected - review access logs".to_string());
    }

    recs.truncate(rules.max_recommendations);
    recs
}
