use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Upper bound for `max_patterns` and `max_recommendations`.
pub const MAX_LISTED: usize = 5;

/// Longest accepted rapid-error window: one day.
pub const MAX_RAPID_WINDOW_SECS: i64 = 86_400;

/// Thresholds and extra tables for [`crate::analyzer::LogPatternAnalyzer`].
///
/// Every field has a default, so a TOML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub severity: SeverityThresholds,
    pub summary: SummaryRules,
    pub patterns: PatternRules,
    pub recommendations: RecommendationRules,
    pub anomalies: AnomalyRules,
}

/// Error-rate cut-offs; each tier fires when the rate is strictly greater.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityThresholds {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self { critical: 0.20, high: 0.10, medium: 0.05 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryRules {
    pub error_message_chars: usize,
}

impl Default for SummaryRules {
    fn default() -> Self {
        Self { error_message_chars: 50 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternRules {
    pub max_patterns: usize,
    /// Appended after the built-in error categories.
    pub extra: Vec<PatternSpec>,
}

impl Default for PatternRules {
    fn default() -> Self {
        Self { max_patterns: 5, extra: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSpec {
    pub name: String,
    pub regex: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationRules {
    pub max_recommendations: usize,
    pub high_error_rate: f64,
    pub slow_mean_ms: f64,
    pub device_limit: usize,
}

impl Default for RecommendationRules {
    fn default() -> Self {
        Self { max_recommendations: 5, high_error_rate: 0.10, slow_mean_ms: 5000.0, device_limit: 2 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyRules {
    pub rapid_window_secs: i64,
    /// Rapid-error anomaly fires when the gap count exceeds this.
    pub rapid_min_sequences: usize,
    pub user_activity_limit: usize,
    pub outlier_factor: f64,
}

impl Default for AnomalyRules {
    fn default() -> Self {
        Self { rapid_window_secs: 10, rapid_min_sequences: 3, user_activity_limit: 100, outlier_factor: 3.0 }
    }
}

impl AnalyzerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AnalyzerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks threshold sanity. Regexes are checked when the analyzer compiles them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.severity;
        for (name, v) in [("critical", s.critical), ("high", s.high), ("medium", s.medium)] {
            if !v.is_finite() || v < 0.0 {
                return Err(ConfigError::Threshold(format!("severity.{name} must be a finite non-negative rate")));
            }
        }
        if !(s.critical >= s.high && s.high >= s.medium) {
            return Err(ConfigError::Threshold(
                "severity thresholds must satisfy critical >= high >= medium".to_string(),
            ));
        }
        if self.patterns.max_patterns > MAX_LISTED {
            return Err(ConfigError::Threshold(format!("patterns.max_patterns must be at most {MAX_LISTED}")));
        }
        let r = &self.recommendations;
        if r.max_recommendations > MAX_LISTED {
            return Err(ConfigError::Threshold(format!(
                "recommendations.max_recommendations must be at most {MAX_LISTED}"
            )));
        }
        if !r.high_error_rate.is_finite() || !r.slow_mean_ms.is_finite() {
            return Err(ConfigError::Threshold("recommendation thresholds must be finite".to_string()));
        }
        let a = &self.anomalies;
        if a.rapid_window_secs <= 0 || a.rapid_window_secs > MAX_RAPID_WINDOW_SECS {
            return Err(ConfigError::Threshold(format!(
                "anomalies.rapid_window_secs must be between 1 and {MAX_RAPID_WINDOW_SECS}"
            )));
        }
        if !a.outlier_factor.is_finite() || a.outlier_factor <= 0.0 {
            return Err(ConfigError::Threshold("anomalies.outlier_factor must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg = AnalyzerConfig::from_toml_str("").expect("defaults");
        assert_eq!(cfg, AnalyzerConfig::default());
        assert_eq!(cfg.severity.critical, 0.20);
        assert_eq!(cfg.anomalies.rapid_min_sequences, 3);
    }

    #[test]
    fn partial_toml_overrides_only_named_keys() {
        let cfg = AnalyzerConfig::from_toml_str(
            r#"
            [anomalies]
            user_activity_limit = 250

            [[patterns.extra]]
            name = "matrix_routing"
            regex = "matrix.*route.*failed"
            "#,
        )
        .expect("config");
        assert_eq!(cfg.anomalies.user_activity_limit, 250);
        assert_eq!(cfg.anomalies.outlier_factor, 3.0);
        assert_eq!(cfg.patterns.extra.len(), 1);
        assert_eq!(cfg.patterns.extra[0].name, "matrix_routing");
    }

    #[test]
    fn rejects_unordered_severity_thresholds() {
        let err = AnalyzerConfig::from_toml_str("[severity]\nhigh = 0.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Threshold(_)));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let ok = format!("[anomalies]\nrapid_window_secs = {MAX_RAPID_WINDOW_SECS}\n");
        assert!(AnalyzerConfig::from_toml_str(&ok).is_ok());
        let over = format!("[anomalies]\nrapid_window_secs = {}\n", MAX_RAPID_WINDOW_SECS + 1);
        assert!(matches!(AnalyzerConfig::from_toml_str(&over), Err(ConfigError::Threshold(_))));
        assert!(AnalyzerConfig::from_toml_str("[anomalies]\nrapid_window_secs = 0\n").is_err());
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = AnalyzerConfig::from_toml_str("[severity\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
