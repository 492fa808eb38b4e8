//! Log subscriber setup for the server.

use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::cli::Args;

/// Crates whose spans are worth seeing at the requested level; everything
/// else (sqlx, hyper, reqwest) stays at `warn`.
const SERVICE_TARGETS: &[&str] = &[
    "insight_server",
    "insight_api",
    "insight_nlp",
    "insight_data",
    "insight_narrative",
    "tower_http",
];

/// Installs the global subscriber. `RUST_LOG` wins over `--log-level`.
pub fn init_telemetry(args: &Args) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => service_filter(get_log_level(&args.log_level))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = if args.json_logs {
        builder.json().try_init()
    } else {
        builder.pretty().with_file(true).with_line_number(true).try_init()
    };

    installed.map_err(|e| anyhow!("Failed to install log subscriber: {}", e))
}

/// `warn` globally, `level` for the InsightFlow crates.
fn service_directives(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    SERVICE_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .fold(String::from("warn"), |acc, directive| acc + "," + &directive)
}

fn service_filter(level: Level) -> Result<EnvFilter> {
    let directives = service_directives(level);
    EnvFilter::try_new(&directives).map_err(|e| anyhow!("Invalid log filter '{}': {}", directives, e))
}

/// Parses a log level name, defaulting to INFO.
pub fn get_log_level(level_str: &str) -> Level {
    level_str.trim().parse().unwrap_or(Level::INFO)
}
