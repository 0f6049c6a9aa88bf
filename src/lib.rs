pub mod error;
pub mod config;
pub mod record;
pub mod tally;
pub mod severity;
pub mod summary;
pub mod patterns;
pub mod anomaly;
pub mod recommend;
pub mod insights;
pub mod analyzer;
pub mod audio;
pub mod status;

pub use analyzer::{AnalysisOutcome, AnalysisResult, FallbackSite, LogPatternAnalyzer};
pub use audio::{AudioOutcome, AudioProcessorAnalyzer};
pub use config::AnalyzerConfig;
pub use record::{LogBatch, LogRecord};
pub use severity::Severity;
