use logpulse::LogPatternAnalyzer;
use serde_json::{json, Value};
use std::time::Instant;

const LEVELS: &[&str] = &["info", "info", "info", "warning", "error"];
const CATEGORIES: &[&str] = &["user_interaction", "hardware", "system", "security"];
const DEVICES: &[&str] = &["wolf_pack", "atlas", "directv", "fire_tv"];
const MESSAGES: &[&str] = &[
    "Route input 3 to output 7",
    "Device connection timeout",
    "Atlas zone volume changed",
    "Config error: missing output map",
];

fn synthetic_batch(n: usize) -> Value {
    let logs: Vec<Value> = (0..n)
        .map(|i| {
            json!({
                "id": format!("bench-{i}"),
                "timestamp": format!("2024-06-01T{:02}:{:02}:{:02}Z", (i / 3600) % 24, (i / 60) % 60, i % 60),
                "level": LEVELS[i % LEVELS.len()],
                "category": CATEGORIES[i % CATEGORIES.len()],
                "message": MESSAGES[i % MESSAGES.len()],
                "action": format!("action_{}", i % 7),
                "success": i % 11 != 0,
                "duration": (i % 97) as f64 * 13.5,
                "deviceType": DEVICES[i % DEVICES.len()],
            })
        })
        .collect();
    json!({ "logs": logs })
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let n: usize = match args.get(1) {
        Some(s) => s.parse()?,
        None => 10_000,
    };
    let rounds = 20;

    let input = serde_json::to_string(&synthetic_batch(n))?;
    let analyzer = LogPatternAnalyzer::new();

    println!("Benchmarking analysis of {n} records over {rounds} rounds...");

    // Warmup
    let warm = analyzer.analyze_input(&input);
    println!("Severity: {} (confidence {})", warm.severity, warm.confidence);

    let start = Instant::now();
    for _ in 0..rounds {
        let _ = analyzer.analyze_input(&input);
    }
    let elapsed = start.elapsed();
    let per_round = elapsed / rounds;
    println!("Total: {:.3}s, per batch: {:.3}ms", elapsed.as_secs_f64(), per_round.as_secs_f64() * 1000.0);
    println!("Throughput: {:.0} records/s", (n as f64 * rounds as f64) / elapsed.as_secs_f64());
    Ok(())
}
