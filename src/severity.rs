use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::SeverityThresholds;
use crate::record::LogRecord;

/// Ordinal verdict of the general log analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        f.write_str(s)
    }
}

type Predicate<I> = Box<dyn Fn(&I) -> bool + Send + Sync>;

/// A named threshold check over some input.
pub struct Breach<I> {
    pub name: &'static str,
    check: Predicate<I>,
}

impl<I> Breach<I> {
    pub fn new(name: &'static str, check: impl Fn(&I) -> bool + Send + Sync + 'static) -> Self {
        Self { name, check: Box::new(check) }
    }

    pub fn is_breached(&self, input: &I) -> bool {
        (self.check)(input)
    }
}

struct Tier<L, I> {
    level: L,
    breaches: Vec<Breach<I>>,
}

/// Ordered severity tiers, most severe first.
///
/// `classify` walks the tiers in order and returns the level of the first tier
/// with any breached predicate; when nothing is breached the floor level is
/// returned.
pub struct TieredPolicy<L, I> {
    tiers: Vec<Tier<L, I>>,
    floor: L,
}

impl<L: Copy, I> TieredPolicy<L, I> {
    pub fn new(floor: L) -> Self {
        Self { tiers: Vec::new(), floor }
    }

    pub fn tier(mut self, level: L, breaches: Vec<Breach<I>>) -> Self {
        self.tiers.push(Tier { level, breaches });
        self
    }

    pub fn classify(&self, input: &I) -> L {
        self.classify_with_reason(input).0
    }

    /// Level plus the name of the breach that decided it.
    pub fn classify_with_reason(&self, input: &I) -> (L, Option<&'static str>) {
        for tier in &self.tiers {
            if let Some(b) = tier.breaches.iter().find(|b| b.is_breached(input)) {
                return (tier.level, Some(b.name));
            }
        }
        (self.floor, None)
    }
}

/// Share of records whose level is error or critical, case-insensitively.
pub fn error_rate(records: &[LogRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let errors = records.iter().filter(|r| r.is_error_any_case()).count();
    errors as f64 / records.len() as f64
}

pub fn error_rate_policy(t: &SeverityThresholds) -> TieredPolicy<Severity, f64> {
    let (critical, high, medium) = (t.critical, t.high, t.medium);
    TieredPolicy::new(Severity::Low)
        .tier(Severity::Critical, vec![Breach::new("error_rate_critical", move |r: &f64| *r > critical)])
        .tier(Severity::High, vec![Breach::new("error_rate_high", move |r: &f64| *r > high)])
        .tier(Severity::Medium, vec![Breach::new("error_rate_medium", move |r: &f64| *r > medium)])
}
