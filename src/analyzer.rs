use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Display;
use tracing::{debug, warn};

use crate::anomaly::detect_anomalies;
use crate::config::AnalyzerConfig;
use crate::error::ConfigError;
use crate::insights::extract_insights;
use crate::patterns::{error_categories, identify_patterns, ErrorCategory};
use crate::record::{extract_logs, records_from_values, LogRecord};
use crate::recommend::generate_recommendations;
use crate::severity::{error_rate, error_rate_policy, Severity, TieredPolicy};
use crate::summary::{confidence, generate_summary};

/// Verdict over one log batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub severity: Severity,
    pub summary: String,
    pub patterns: Vec<String>,
    pub recommendations: Vec<String>,
    pub anomalies: Vec<String>,
    pub insights: Vec<String>,
    pub confidence: f64,
}

/// Where a failure was caught; the fallback recommendation differs per site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackSite {
    /// Inside the analyzer, after the document was read.
    Analysis,
    /// At the outer invocation boundary (unreadable or malformed document).
    Invocation,
}

impl AnalysisResult {
    pub fn empty() -> Self {
        AnalysisResult {
            severity: Severity::Low,
            summary: "No logs available for analysis".to_string(),
            patterns: vec![],
            recommendations: vec!["Enable logging for better system monitoring".to_string()],
            anomalies: vec![],
            insights: vec!["System appears inactive or logging disabled".to_string()],
            confidence: 0.0,
        }
    }

    pub fn fallback(reason: impl Display, site: FallbackSite) -> Self {
        let recommendation = match site {
            FallbackSite::Analysis => "Review log analysis system",
            FallbackSite::Invocation => "Check log analysis system",
        };
        AnalysisResult {
            severity: Severity::Medium,
            summary: format!("Analysis failed: {reason}"),
            patterns: vec![],
            recommendations: vec![recommendation.to_string()],
            anomalies: vec![],
            insights: vec![],
            confidence: 0.1,
        }
    }
}

/// Either a full analysis or the degraded result produced after a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Complete(AnalysisResult),
    Degraded { reason: String, result: AnalysisResult },
}

impl AnalysisOutcome {
    fn degraded(reason: impl Display) -> Self {
        let reason = reason.to_string();
        let result = AnalysisResult::fallback(&reason, FallbackSite::Analysis);
        AnalysisOutcome::Degraded { reason, result }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, AnalysisOutcome::Degraded { .. })
    }

    pub fn result(&self) -> &AnalysisResult {
        match self {
            AnalysisOutcome::Complete(r) => r,
            AnalysisOutcome::Degraded { result, .. } => result,
        }
    }

    pub fn into_result(self) -> AnalysisResult {
        match self {
            AnalysisOutcome::Complete(r) => r,
            AnalysisOutcome::Degraded { result, .. } => result,
        }
    }
}

/// Rule-based classifier over a batch of structured log records.
///
/// The analyzer owns its compiled regex table and severity policy; both are
/// immutable after construction, so one instance can serve any number of
/// batches from any number of threads.
pub struct LogPatternAnalyzer {
    config: AnalyzerConfig,
    categories: Vec<ErrorCategory>,
    severity: TieredPolicy<Severity, f64>,
}

impl Default for LogPatternAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LogPatternAnalyzer {
    pub fn new() -> Self {
        let config = AnalyzerConfig::default();
        // the built-in table is compiled from literals and has no extras to fail on
        let categories = error_categories(&[]).unwrap_or_default();
        let severity = error_rate_policy(&config.severity);
        Self { config, categories, severity }
    }

    pub fn with_config(config: AnalyzerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let categories = error_categories(&config.patterns.extra)?;
        let severity = error_rate_policy(&config.severity);
        Ok(Self { config, categories, severity })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn categories(&self) -> &[ErrorCategory] {
        &self.categories
    }

    /// Analyzes already-typed records. Never fails.
    pub fn analyze(&self, records: &[LogRecord]) -> AnalysisResult {
        if records.is_empty() {
            debug!("empty batch");
            return AnalysisResult::empty();
        }

        let rate = error_rate(records);
        let (severity, breach) = self.severity.classify_with_reason(&rate);
        debug!(records = records.len(), error_rate = rate, %severity, breach = breach.unwrap_or("none"), "classified batch");

        let cfg = &self.config;
        AnalysisResult {
            severity,
            summary: generate_summary(records, cfg.summary.error_message_chars),
            patterns: identify_patterns(records, &self.categories, cfg.patterns.max_patterns),
            recommendations: generate_recommendations(records, &cfg.recommendations),
            anomalies: detect_anomalies(records, &cfg.anomalies),
            insights: extract_insights(records),
            confidence: confidence(records.len()),
        }
    }

    /// Analyzes raw `logs` entries; a malformed entry degrades the whole batch.
    pub fn analyze_entries(&self, entries: &[Value]) -> AnalysisOutcome {
        match records_from_values(entries) {
            Ok(records) => AnalysisOutcome::Complete(self.analyze(&records)),
            Err(e) => {
                warn!(error = %e, "log batch degraded to fallback result");
                AnalysisOutcome::degraded(e)
            }
        }
    }

    /// Analyzes a parsed `{ "logs": [...] }` document.
    pub fn analyze_document(&self, doc: &Value) -> Result<AnalysisOutcome, crate::error::InputError> {
        let entries = extract_logs(doc)?;
        Ok(self.analyze_entries(entries))
    }

    /// Full invocation path: text in, result out, nothing propagates.
    pub fn analyze_input(&self, input: &str) -> AnalysisResult {
        let parsed = serde_json::from_str::<Value>(input)
            .map_err(crate::error::InputError::from)
            .and_then(|doc| self.analyze_document(&doc));
        match parsed {
            Ok(outcome) => outcome.into_result(),
            Err(e) => {
                warn!(error = %e, "malformed input document");
                AnalysisResult::fallback(e, FallbackSite::Invocation)
            }
        }
    }

    /// Independent batches analyzed in parallel; output keeps input order.
    pub fn analyze_inputs(&self, inputs: &[String]) -> Vec<AnalysisResult> {
        inputs.par_iter().map(|i| self.analyze_input(i)).collect()
    }
}
