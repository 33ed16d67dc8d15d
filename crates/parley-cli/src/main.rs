mod cli;
mod commands;

use std::process::ExitCode;

use parley_common::ParleyError;
use parley_config::ParleyConfig;
use tracing_subscriber::EnvFilter;

/// Crates whose events are shown at the configured level.
const LOG_TARGETS: [&str; 4] = ["parley", "parley_ai", "parley_config", "parley_common"];

fn init_logging(level: &str) {
    let directives = LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&directives))
        .unwrap_or_else(|_| EnvFilter::new("parley=info,parley_ai=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before anything reads the environment; set variables win.
    dotenvy::dotenv().ok();

    let args = cli::parse();

    let loaded = parley_config::load_config(args.config.as_deref());
    let level = match (&args.log_level, &loaded) {
        (Some(level), _) => level.clone(),
        (None, Ok(config)) => config.logging.level.as_directive().to_string(),
        (None, Err(_)) => "info".to_string(),
    };
    init_logging(&level);

    tracing::debug!("parley v{} starting", env!("CARGO_PKG_VERSION"));

    let config: ParleyConfig = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match commands::run(args.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("error: {e}");
            match e {
                ParleyError::NotFound(_) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}
