//! Chute - newline-delimited JSON into ClickHouse
//!
//! # Usage
//!
//! ```bash
//! # Read records from stdin using chute.toml in the working directory
//! app | chute
//!
//! chute --config configs/logs.toml --log-level debug < records.ndjson
//! ```

mod input;
mod serve;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chute_config::{Config, LogFormat};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Chute - newline-delimited JSON into ClickHouse
#[derive(Parser, Debug)]
#[command(name = "chute")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "chute.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_file(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let log_level = resolve_log_level(cli.log_level.as_deref(), &config);
    init_logging(&log_level, config.log.format)?;

    serve::run(config).await
}

/// Resolve log level: CLI flag > config file > default "info"
fn resolve_log_level(cli_level: Option<&str>, config: &Config) -> String {
    cli_level
        .unwrap_or_else(|| config.log.level.as_str())
        .to_string()
}

/// Initialize the tracing subscriber for logging
///
/// Logs go to stderr; stdin carries the records.
fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Console => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }

    Ok(())
}
