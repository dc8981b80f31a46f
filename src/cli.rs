use std::env;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub now: Option<DateTime<Utc>>,
    pub samples_out: Option<PathBuf>,
    pub history: bool,
    pub serve: bool,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    if args.len() == 1 && (args[0] == "--help" || args[0] == "-h") {
        print_usage();
        std::process::exit(0);
    }
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut config = None;
    let mut now = None;
    let mut samples_out = None;
    let mut history = false;
    let mut serve = false;

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --config (expected a TOML file path)",
                )?;
                if config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--now" => {
                i += 1;
                let raw = args.next_or_err(
                    i,
                    "missing value for --now (expected an RFC 3339 timestamp)",
                )?;
                let parsed = DateTime::parse_from_rfc3339(raw)
                    .map_err(|e| format!("--now value \"{raw}\" is not RFC 3339: {e}"))?;
                if now.replace(parsed.with_timezone(&Utc)).is_some() {
                    return Err("--now provided more than once".to_string());
                }
            }
            "--samples-out" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --samples-out (expected a file path)",
                )?;
                if samples_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--samples-out provided more than once".to_string());
                }
            }
            "--history" => history = true,
            "--serve" => serve = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if serve && (history || now.is_some() || samples_out.is_some()) {
        return Err(
            "`--serve` collects on every request; `--history`, `--now` and `--samples-out` apply to one-shot runs only"
                .to_string(),
        );
    }

    Ok(CliOptions {
        config,
        now,
        samples_out,
        history,
        serve,
    })
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("shed-timeline: load-shed program timeline exporter");
    eprintln!();
    eprintln!("Usage:");
    eprintln!(
        "  shed-timeline [--config <path>] [--now <rfc3339>] [--history] [--samples-out <path>]"
    );
    eprintln!("  shed-timeline [--config <path>] --serve");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>        Load configuration from a TOML file");
    eprintln!("  --now <rfc3339>        Reference instant for a one-shot run (default: now)");
    eprintln!("  --history              Print the step signal instead of realtime gauges");
    eprintln!("  --samples-out <path>   Export every emitted sample to CSV");
    eprintln!("  --serve                Serve /metrics, /history and /countdown over HTTP");
    eprintln!("  --help                 Show this help message");
    eprintln!();
    eprintln!("Environment: LISTEN or PORT override server.listen; RUST_LOG sets verbosity.");
}
