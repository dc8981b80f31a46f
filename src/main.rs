//! shed-timeline entry point: CLI wiring and config-driven collection.

use std::path::Path;
use std::process;

use chrono::Utc;
use env_logger::Env;
use log::info;

use shed_timeline::cli::{self, CliOptions};
use shed_timeline::collector::Collector;
use shed_timeline::config::ExporterConfig;
use shed_timeline::exposition::{render_history, render_realtime};
use shed_timeline::io::export::export_csv;
use shed_timeline::shed::types::Sample;
use shed_timeline::source::FileSource;

fn load_config(cli: &CliOptions) -> ExporterConfig {
    let mut config = match cli.config {
        Some(ref path) => match ExporterConfig::from_toml_file(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        },
        None => ExporterConfig::default(),
    };

    config.apply_env_overrides(|key| std::env::var(key).ok());

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    config
}

#[cfg(feature = "api")]
fn serve(config: ExporterConfig, source: FileSource) {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use shed_timeline::api::{self, AppState};

    let addr: SocketAddr = match config.server.listen.parse() {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("error: invalid listen address \"{}\": {e}", config.server.listen);
            process::exit(1);
        }
    };
    let state = Arc::new(AppState {
        config,
        source: Arc::new(source),
    });
    let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("error: failed to create tokio runtime: {e}");
        process::exit(1);
    });
    if let Err(e) = rt.block_on(api::serve(state, addr)) {
        eprintln!("error: server failed: {e}");
        process::exit(1);
    }
}

#[cfg(not(feature = "api"))]
fn serve(_config: ExporterConfig, _source: FileSource) {
    eprintln!("error: --serve requires building with the `api` feature");
    process::exit(1);
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = match cli::parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(1);
        }
    };

    let config = load_config(&cli);
    let Some(source) = FileSource::from_config(&config.source) else {
        eprintln!("error: source.time_zone \"{}\" is not a known time zone", config.source.time_zone);
        process::exit(1);
    };

    if cli.serve {
        serve(config, source);
        return;
    }

    let now = cli.now.unwrap_or_else(Utc::now);
    let report = Collector::new(&source, &config).collect(now);

    if cli.history {
        print!("{}", render_history(&report));
    } else {
        print!("{}", render_realtime(&report));
    }

    if let Some(ref path) = cli.samples_out {
        let samples: Vec<Sample> = report
            .reports()
            .flat_map(|class| class.samples.iter().cloned())
            .collect();
        if let Err(e) = export_csv(&samples, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        info!("{} sample(s) written to {}", samples.len(), path.display());
    }
}
