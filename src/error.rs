use thiserror::Error;

/// Problems with the input document as a whole.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("json parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("input document is not a JSON object")]
    NotObject,
    #[error("input document has no 'logs' array")]
    MissingLogs,
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

/// A single log record that cannot be interpreted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("log entry {index} is not an object")]
    NotObject { index: usize },
    #[error("log entry {index}: field '{field}' must be {expected}")]
    FieldType {
        index: usize,
        field: &'static str,
        expected: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid regex for pattern '{name}': {source}")]
    Regex {
        name: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid threshold: {0}")]
    Threshold(String),
}

/// Malformed audio processor documents.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceDataError {
    #[error("processor document is not a JSON object")]
    NotObject,
    #[error("field '{field}' must be {expected}")]
    FieldType {
        field: String,
        expected: &'static str,
    },
}
