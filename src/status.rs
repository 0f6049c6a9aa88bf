use chrono::Local;
use serde::{Deserialize, Serialize};

pub const CAPABILITIES: &[&str] = &[
    "Pattern Recognition",
    "Error Classification",
    "Performance Analysis",
    "Anomaly Detection",
    "Trend Analysis",
    "Recommendation Generation",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub available: bool,
    pub capabilities: Vec<String>,
    pub version: String,
    pub last_check: String,
    pub system_info: SystemInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub platform: String,
    pub arch: String,
}

/// Availability report polled by the web application before it sends batches.
pub fn check_status() -> StatusReport {
    StatusReport {
        available: true,
        capabilities: CAPABILITIES.iter().map(|c| c.to_string()).collect(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        last_check: Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        system_info: SystemInfo {
            platform: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_lists_capabilities() {
        let s = check_status();
        assert!(s.available);
        assert_eq!(s.capabilities.len(), 6);
        let v = serde_json::to_value(&s).unwrap();
        assert!(v.get("lastCheck").is_some());
        assert!(v["systemInfo"]["platform"].is_string());
    }
}
