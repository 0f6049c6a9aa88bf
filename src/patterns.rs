use chrono::Timelike;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::PatternSpec;
use crate::error::ConfigError;
use crate::record::LogRecord;
use crate::tally::OrderedTally;

/// A named case-insensitive regex matched against error messages.
#[derive(Debug, Clone)]
pub struct ErrorCategory {
    pub name: String,
    pub regex: Regex,
}

impl ErrorCategory {
    pub fn compile(name: &str, pattern: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(&format!("(?i){pattern}"))
            .map_err(|source| ConfigError::Regex { name: name.to_string(), source })?;
        Ok(Self { name: name.to_string(), regex })
    }

    /// Display form: underscores become spaces.
    pub fn label(&self) -> String {
        self.name.replace('_', " ")
    }
}

const BUILTIN_ERROR_PATTERNS: &[(&str, &str)] = &[
    ("network_timeout", r"timeout|connection.*refused|network.*error"),
    ("device_failure", r"device.*not.*found|hardware.*failure|connection.*lost"),
    ("authentication", r"auth.*failed|unauthorized|invalid.*credentials"),
    ("performance", r"slow.*response|high.*latency|timeout"),
    ("configuration", r"config.*error|setting.*invalid|parameter.*missing"),
];

static BUILTIN_CATEGORIES: Lazy<Vec<ErrorCategory>> = Lazy::new(|| {
    BUILTIN_ERROR_PATTERNS
        .iter()
        .map(|(name, re)| ErrorCategory {
            name: name.to_string(),
            regex: Regex::new(&format!("(?i){re}")).unwrap(),
        })
        .collect()
});

/// Built-in categories followed by any configured extras.
pub fn error_categories(extra: &[PatternSpec]) -> Result<Vec<ErrorCategory>, ConfigError> {
    let mut out = BUILTIN_CATEGORIES.clone();
    for spec in extra {
        out.push(ErrorCategory::compile(&spec.name, &spec.regex)?);
    }
    Ok(out)
}

/// Busiest hour of day, read in each timestamp's own offset. Lowest hour wins a tie.
pub fn peak_hour(records: &[LogRecord]) -> Option<u32> {
    let mut hours = [0usize; 24];
    let mut seen = false;
    for t in records.iter().filter_map(LogRecord::time) {
        hours[t.hour() as usize] += 1;
        seen = true;
    }
    if !seen {
        return None;
    }
    let mut best = 0usize;
    for h in 1..24 {
        if hours[h] > hours[best] {
            best = h;
        }
    }
    Some(best as u32)
}

/// Categories whose regex matches at least one error message, in table order.
pub fn matched_categories<'a>(records: &[LogRecord], categories: &'a [ErrorCategory]) -> Vec<&'a ErrorCategory> {
    let messages: Vec<&str> = records.iter().filter(|r| r.is_error()).map(LogRecord::message_text).collect();
    categories
        .iter()
        .filter(|c| messages.iter().any(|m| c.regex.is_match(m)))
        .collect()
}

pub fn identify_patterns(records: &[LogRecord], categories: &[ErrorCategory], max_patterns: usize) -> Vec<String> {
    let mut patterns = Vec::new();

    if let Some(hour) = peak_hour(records) {
        patterns.push(format!("Peak activity at hour {hour}:00"));
    }

    for c in matched_categories(records, categories) {
        patterns.push(format!("Detected {} pattern", c.label()));
    }

    let devices: OrderedTally<&str> = records.iter().filter_map(|r| r.device_type.as_deref()).collect();
    if let Some((device, count)) = devices.mode() {
        patterns.push(format!("Most active device type: {device} ({count} operations)"));
    }

    patterns.truncate(max_patterns);
    patterns
}
