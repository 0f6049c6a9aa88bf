use clap::Parser;
use logpulse::{AnalysisResult, AnalyzerConfig, AudioOutcome, AudioProcessorAnalyzer, FallbackSite, LogPatternAnalyzer};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Once;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn init_parallelism() {
    static START: Once = Once::new();
    START.call_once(|| {
        let n = num_cpus::get();
        let _ = rayon::ThreadPoolBuilder::new().num_threads(n).build_global();
    });
}

fn init_tracing() {
    // stdout carries the result document, so diagnostics go to stderr
    let filter = EnvFilter::try_from_env("LOGPULSE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

#[derive(Parser, Debug)]
#[command(name = "logpulse", version, about = "Rule-based analysis of AV control log batches")]
struct Cli {
    /// Input documents (`-` for stdin). May be repeated; defaults to stdin.
    #[arg(required = false)]
    input: Vec<String>,

    /// Analyze audio processor snapshots instead of log batches
    #[arg(long = "audio", default_value_t = false)]
    audio: bool,

    /// TOML file with analyzer thresholds and extra error patterns
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Print the capability report and exit
    #[arg(long = "status", default_value_t = false)]
    status: bool,

    /// Single-line JSON output
    #[arg(long = "compact", default_value_t = false)]
    compact: bool,
}

enum Engine {
    Logs(LogPatternAnalyzer),
    Audio(AudioProcessorAnalyzer),
}

impl Engine {
    fn run(&self, input: io::Result<String>) -> serde_json::Result<Value> {
        match (self, input) {
            (Engine::Logs(a), Ok(text)) => serde_json::to_value(a.analyze_input(&text)),
            (Engine::Logs(_), Err(e)) => {
                serde_json::to_value(AnalysisResult::fallback(e, FallbackSite::Invocation))
            }
            (Engine::Audio(a), Ok(text)) => serde_json::to_value(a.analyze_input(&text)),
            (Engine::Audio(_), Err(e)) => serde_json::to_value(AudioOutcome::script_failure(e)),
        }
    }
}

fn read_input(path: &str) -> io::Result<String> {
    let mut buf = String::new();
    if path == "-" {
        if atty::is(atty::Stream::Stdin) {
            info!("reading document from terminal; end input with Ctrl-D");
        }
        io::stdin().lock().read_to_string(&mut buf)?;
    } else {
        buf = std::fs::read_to_string(path)?;
    }
    debug!(path, bytes = buf.len(), "read input");
    Ok(buf)
}

fn emit<T: Serialize>(value: &T, compact: bool) -> anyhow::Result<()> {
    let text = if compact { serde_json::to_string(value)? } else { serde_json::to_string_pretty(value)? };
    let mut out = io::stdout().lock();
    match writeln!(out, "{text}").and_then(|_| out.flush()) {
        // reader went away (e.g. `| head`); nothing left to deliver
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other.map_err(anyhow::Error::from),
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if cli.status {
        return emit(&logpulse::status::check_status(), cli.compact);
    }

    let engine = if cli.audio {
        Engine::Audio(AudioProcessorAnalyzer::new())
    } else {
        let config = match &cli.config {
            Some(path) => AnalyzerConfig::load(path)?,
            None => AnalyzerConfig::default(),
        };
        Engine::Logs(LogPatternAnalyzer::with_config(config)?)
    };

    let inputs = if cli.input.is_empty() { vec!["-".to_string()] } else { cli.input.clone() };

    if inputs.len() == 1 {
        let out = engine.run(read_input(&inputs[0]))?;
        return emit(&out, cli.compact);
    }

    // Several documents: read in order, analyze in parallel, print one array.
    init_parallelism();
    let texts: Vec<io::Result<String>> = inputs.iter().map(|p| read_input(p)).collect();
    let results: Vec<Value> = texts
        .into_par_iter()
        .map(|t| engine.run(t))
        .collect::<serde_json::Result<Vec<Value>>>()?;
    emit(&results, cli.compact)
}
