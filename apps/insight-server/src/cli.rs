//! Command-line argument parsing

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "insight-server",
    about = "InsightFlow BI chat server",
    version,
    long_about = "Answers natural-language business questions about orders, \
                  revenue and delivery failures over HTTP."
)]
pub struct Args {
    /// Path to a configuration file (toml, yaml or json)
    #[arg(short, long, env = "INSIGHT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Bind address, overrides the configured host
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// HTTP server port, overrides the configured port
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        env = "LOG_LEVEL",
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"]
    )]
    pub log_level: String,

    /// Enable JSON log format
    #[arg(long, env = "JSON_LOGS")]
    pub json_logs: bool,
}

impl Args {
    /// Validate the arguments
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(path) = &self.config {
            if !path.is_file() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
        }
        Ok(())
    }
}
