//! Audio processor health scoring.
//!
//! Scores a processor snapshot (`processorData`, `logs`, `metrics`) on signal
//! quality, network stability and DSP load, then grades it with the same
//! tiered breach policy the log analyzer uses.

use chrono::Local;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::{debug, warn};

use crate::error::DeviceDataError;
use crate::severity::{Breach, TieredPolicy};

const AUDIO_PATTERNS: &[(&str, &str)] = &[
    ("signal_clipping", r"clipping|overload|distortion|peak.*limit"),
    ("phantom_power", r"phantom.*power|\+48v|condenser.*mic"),
    ("feedback", r"feedback|howl|oscillation|ringing"),
    ("dropout", r"dropout|silence|no.*signal|mute.*stuck"),
    ("dante_network", r"dante.*error|network.*audio|sync.*loss|clock.*error"),
    ("dsp_overload", r"dsp.*overload|processing.*limit|cpu.*high"),
    ("scene_recall", r"scene.*recall|preset.*load|configuration.*change"),
    ("eq_saturation", r"eq.*clip|filter.*overload|resonance"),
    ("compressor_pumping", r"compressor.*pump|dynamics.*issue|gain.*reduce"),
    ("input_fault", r"input.*fault|mic.*error|line.*problem"),
];

static AUDIO_REGEXES: Lazy<Vec<(&'static str, &'static str, Regex)>> = Lazy::new(|| {
    AUDIO_PATTERNS
        .iter()
        .map(|(name, re)| (*name, *re, Regex::new(&format!("(?i){re}")).unwrap()))
        .collect()
});

// dBFS limits
const INPUT_TOO_HOT: f64 = -3.0;
const INPUT_TOO_LOW: f64 = -35.0;
const OUTPUT_CLIP_RISK: f64 = -6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioSeverity {
    Optimal,
    Minor,
    Moderate,
    Critical,
}

impl fmt::Display for AudioSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AudioSeverity::Optimal => "optimal",
            AudioSeverity::Minor => "minor",
            AudioSeverity::Moderate => "moderate",
            AudioSeverity::Critical => "critical",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub signal_quality: f64,
    pub latency_ms: f64,
    pub processing_load: f64,
    pub network_stability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioReport {
    pub severity: AudioSeverity,
    pub category: String,
    pub summary: String,
    pub audio_patterns: Vec<String>,
    pub hardware_recommendations: Vec<String>,
    pub configuration_issues: Vec<String>,
    pub performance_metrics: PerformanceMetrics,
    pub audio_insights: Vec<String>,
    pub confidence: u32,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFailure {
    pub error: String,
    pub severity: AudioSeverity,
    pub confidence: u32,
    pub timestamp: String,
}

impl AudioFailure {
    fn new(error: String) -> Self {
        Self { error, severity: AudioSeverity::Critical, confidence: 0, timestamp: now_iso() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AudioOutcome {
    Report(AudioReport),
    Failure(AudioFailure),
}

impl AudioOutcome {
    /// Failure raised before a document could be analyzed at all.
    pub fn script_failure(reason: impl fmt::Display) -> Self {
        AudioOutcome::Failure(AudioFailure::new(format!("Script execution failed: {reason}")))
    }

    pub fn report(&self) -> Option<&AudioReport> {
        match self {
            AudioOutcome::Report(r) => Some(r),
            AudioOutcome::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&AudioFailure> {
        match self {
            AudioOutcome::Report(_) => None,
            AudioOutcome::Failure(f) => Some(f),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Recommendations {
    hardware: Vec<String>,
    configuration: Vec<String>,
    insights: Vec<String>,
}

pub struct AudioProcessorAnalyzer {
    severity: TieredPolicy<AudioSeverity, PerformanceMetrics>,
}

impl Default for AudioProcessorAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioProcessorAnalyzer {
    pub fn new() -> Self {
        let severity = TieredPolicy::new(AudioSeverity::Optimal)
            .tier(
                AudioSeverity::Critical,
                vec![
                    Breach::new("signal_quality_below_60", |m: &PerformanceMetrics| m.signal_quality < 60.0),
                    Breach::new("processing_load_above_95", |m: &PerformanceMetrics| m.processing_load > 95.0),
                    Breach::new("network_stability_below_50", |m: &PerformanceMetrics| m.network_stability < 50.0),
                ],
            )
            .tier(
                AudioSeverity::Moderate,
                vec![
                    Breach::new("signal_quality_below_80", |m: &PerformanceMetrics| m.signal_quality < 80.0),
                    Breach::new("processing_load_above_85", |m: &PerformanceMetrics| m.processing_load > 85.0),
                    Breach::new("network_stability_below_80", |m: &PerformanceMetrics| m.network_stability < 80.0),
                ],
            )
            .tier(
                AudioSeverity::Minor,
                vec![
                    Breach::new("signal_quality_below_95", |m: &PerformanceMetrics| m.signal_quality < 95.0),
                    Breach::new("processing_load_above_75", |m: &PerformanceMetrics| m.processing_load > 75.0),
                    Breach::new("network_stability_below_95", |m: &PerformanceMetrics| m.network_stability < 95.0),
                ],
            );
        Self { severity }
    }

    pub fn classify(&self, metrics: &PerformanceMetrics) -> AudioSeverity {
        self.severity.classify(metrics)
    }

    /// Text in, outcome out; unparseable text is reported as a failure document.
    pub fn analyze_input(&self, input: &str) -> AudioOutcome {
        match serde_json::from_str::<Value>(input) {
            Ok(doc) => self.analyze_document(&doc),
            Err(e) => {
                warn!(error = %e, "unreadable processor document");
                AudioOutcome::script_failure(e)
            }
        }
    }

    pub fn analyze_document(&self, doc: &Value) -> AudioOutcome {
        match self.build_report(doc) {
            Ok(report) => AudioOutcome::Report(report),
            Err(e) => {
                warn!(error = %e, "processor analysis failed");
                AudioOutcome::Failure(AudioFailure::new(format!("Atlas analysis failed: {e}")))
            }
        }
    }

    fn build_report(&self, doc: &Value) -> Result<AudioReport, DeviceDataError> {
        let obj = doc.as_object().ok_or(DeviceDataError::NotObject)?;
        let empty = Map::new();
        let metrics = object_field(obj, "metrics")?.unwrap_or(&empty);
        let logs = log_messages(obj)?;

        let audio_patterns = audio_patterns(&logs);

        let inputs = level_map(metrics, "inputLevels")?;
        let outputs = level_map(metrics, "outputLevels")?;
        let latency = number_field(metrics, "networkLatency")?.unwrap_or(0.0);
        let load = number_field(metrics, "cpuLoad")?.unwrap_or(0.0);

        let performance = PerformanceMetrics {
            signal_quality: signal_quality(&inputs, &outputs),
            latency_ms: latency,
            processing_load: load,
            network_stability: network_stability(latency),
        };

        let recs = recommendations(&performance);
        let (severity, breach) = self.severity.classify_with_reason(&performance);
        debug!(%severity, breach = breach.unwrap_or("none"), "graded processor");

        Ok(AudioReport {
            severity,
            category: "performance".to_string(),
            summary: audio_summary(severity, &performance),
            audio_patterns,
            hardware_recommendations: recs.hardware,
            configuration_issues: recs.configuration,
            performance_metrics: performance,
            audio_insights: recs.insights,
            confidence: 85,
            timestamp: now_iso(),
        })
    }
}

fn now_iso() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

fn object_field<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<Option<&'a Map<String, Value>>, DeviceDataError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(m)) => Ok(Some(m)),
        Some(_) => Err(DeviceDataError::FieldType { field: field.to_string(), expected: "an object" }),
    }
}

fn number_field(obj: &Map<String, Value>, field: &str) -> Result<Option<f64>, DeviceDataError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(_) => Err(DeviceDataError::FieldType { field: field.to_string(), expected: "a number" }),
    }
}

fn level_map(metrics: &Map<String, Value>, field: &str) -> Result<Vec<(String, f64)>, DeviceDataError> {
    let Some(levels) = object_field(metrics, field)? else {
        return Ok(Vec::new());
    };
    levels
        .iter()
        .map(|(id, v)| {
            v.as_f64().map(|db| (id.clone(), db)).ok_or_else(|| DeviceDataError::FieldType {
                field: format!("{field}.{id}"),
                expected: "a number",
            })
        })
        .collect()
}

fn log_messages(obj: &Map<String, Value>) -> Result<Vec<String>, DeviceDataError> {
    let entries = match obj.get("logs") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(a)) => a,
        Some(_) => {
            return Err(DeviceDataError::FieldType { field: "logs".to_string(), expected: "an array" })
        }
    };
    entries
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let entry = e.as_object().ok_or_else(|| DeviceDataError::FieldType {
                field: format!("logs.{i}"),
                expected: "an object",
            })?;
            match entry.get("message") {
                None | Some(Value::Null) => Ok(String::new()),
                Some(Value::String(s)) => Ok(s.to_lowercase()),
                Some(_) => Err(DeviceDataError::FieldType {
                    field: format!("logs.{i}.message"),
                    expected: "a string",
                }),
            }
        })
        .collect()
}

/// `"<name>: <regex>"` for every audio pattern any message matches, first-seen order.
pub fn audio_patterns(messages: &[String]) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for m in messages {
        for (name, source, re) in AUDIO_REGEXES.iter() {
            if re.is_match(m) {
                let line = format!("{name}: {source}");
                if !found.contains(&line) {
                    found.push(line);
                }
            }
        }
    }
    found
}

/// Starts at 100 and loses points for hot, quiet or clipping channels.
pub fn signal_quality(inputs: &[(String, f64)], outputs: &[(String, f64)]) -> f64 {
    let mut score = 100.0;
    for (id, db) in inputs {
        if *db > INPUT_TOO_HOT {
            debug!(input = %id, dbfs = *db, "signal too hot");
            score -= 15.0;
        } else if *db < INPUT_TOO_LOW {
            debug!(input = %id, dbfs = *db, "signal too low");
            score -= 10.0;
        }
    }
    for (id, db) in outputs {
        if *db > OUTPUT_CLIP_RISK {
            debug!(output = %id, dbfs = *db, "risk of clipping");
            score -= 20.0;
        }
    }
    score
}

pub fn network_stability(latency_ms: f64) -> f64 {
    if latency_ms > 50.0 {
        50.0
    } else if latency_ms > 20.0 {
        75.0
    } else {
        100.0
    }
}

fn recommendations(m: &PerformanceMetrics) -> Recommendations {
    let mut r = Recommendations::default();
    if m.signal_quality < 80.0 {
        r.configuration.push("Review input gain structure - some signals may be too hot or too low".to_string());
        r.insights.push("Proper gain staging is critical for audio quality".to_string());
    }
    if m.network_stability < 90.0 {
        r.hardware.push("Check Dante network configuration and switch settings".to_string());
        r.insights.push("Dante audio requires dedicated gigabit network infrastructure".to_string());
    }
    if m.processing_load > 85.0 {
        r.configuration.push("Consider reducing DSP processing load or upgrading processor".to_string());
        r.insights.push("High DSP load can cause audio dropouts and latency".to_string());
    }
    r
}

pub fn audio_summary(severity: AudioSeverity, m: &PerformanceMetrics) -> String {
    match severity {
        AudioSeverity::Optimal => format!(
            "Atlas system operating optimally. Signal quality: {:.0}%, Processing load: {:.0}%",
            m.signal_quality, m.processing_load
        ),
        AudioSeverity::Minor => {
            "Atlas system stable with minor issues. Monitor signal levels and processing load.".to_string()
        }
        AudioSeverity::Moderate => format!(
            "Atlas system requires attention. Signal quality: {:.0}%, Processing: {:.0}%",
            m.signal_quality, m.processing_load
        ),
        AudioSeverity::Critical => {
            "CRITICAL: Atlas system issues detected. Immediate attention required.".to_string()
        }
    }
}
