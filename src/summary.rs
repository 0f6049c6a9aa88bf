use crate::record::{LogRecord, CATEGORY_HARDWARE, CATEGORY_USER_INTERACTION};
use crate::tally::OrderedTally;

pub fn generate_summary(records: &[LogRecord], error_message_chars: usize) -> String {
    let errors: Vec<&LogRecord> = records.iter().filter(|r| r.is_error()).collect();
    let user_actions = records.iter().filter(|r| r.has_category(CATEGORY_USER_INTERACTION)).count();
    let device_ops = records.iter().filter(|r| r.has_category(CATEGORY_HARDWARE)).count();

    let mut parts = vec![format!("Analyzed {} log entries", records.len())];
    if errors.is_empty() {
        parts.push("No errors detected".to_string());
    } else {
        parts.push(format!("{} errors detected", errors.len()));
    }
    parts.push(format!("{user_actions} user interactions recorded"));
    parts.push(format!("{device_ops} device operations logged"));

    let messages: OrderedTally<&str> = errors.iter().map(|r| r.message_text()).collect();
    if let Some((message, _)) = messages.mode() {
        let head: String = message.chars().take(error_message_chars).collect();
        parts.push(format!("Most frequent error: {head}..."));
    }

    parts.join(". ")
}

/// Coarse trust in the verdict, driven only by how many records were seen.
pub fn confidence(record_count: usize) -> f64 {
    match record_count {
        0 => 0.0,
        1..=9 => 0.3,
        10..=49 => 0.6,
        50..=99 => 0.8,
        _ => 0.95,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::records_from_values;
    use serde_json::json;

    #[test]
    fn confidence_steps() {
        assert_eq!(confidence(0), 0.0);
        assert_eq!(confidence(1), 0.3);
        assert_eq!(confidence(9), 0.3);
        assert_eq!(confidence(10), 0.6);
        assert_eq!(confidence(49), 0.6);
        assert_eq!(confidence(50), 0.8);
        assert_eq!(confidence(99), 0.8);
        assert_eq!(confidence(100), 0.95);
        assert_eq!(confidence(100_000), 0.95);
    }

    #[test]
    fn summary_without_errors() {
        let recs = records_from_values(&[
            json!({"level": "info", "category": "user_interaction"}),
            json!({"level": "info", "category": "hardware"}),
        ])
        .unwrap();
        assert_eq!(
            generate_summary(&recs, 50),
            "Analyzed 2 log entries. No errors detected. 1 user interactions recorded. 1 device operations logged"
        );
    }

    #[test]
    fn summary_truncates_most_frequent_error() {
        let long = "x".repeat(80);
        let recs = records_from_values(&[
            json!({"level": "error", "message": long}),
            json!({"level": "critical", "message": long}),
            json!({"level": "error", "message": "short"}),
        ])
        .unwrap();
        let s = generate_summary(&recs, 50);
        assert!(s.starts_with("Analyzed 3 log entries. 3 errors detected."));
        assert!(s.ends_with(&format!("Most frequent error: {}...", "x".repeat(50))));
    }

    #[test]
    fn summary_error_mode_ties_go_to_first_message() {
        let recs = records_from_values(&[
            json!({"level": "error", "message": "Matrix route lost"}),
            json!({"level": "error", "message": "Projector offline"}),
        ])
        .unwrap();
        assert!(generate_summary(&recs, 50).ends_with("Most frequent error: Matrix route lost..."));
    }
}
