//! InsightFlow CLI
//!
//! Classify business questions locally or ask a running InsightFlow server.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "insight",
    author = "InsightFlow Team",
    version,
    about = "InsightFlow - BI questions in plain language",
    long_about = "A command-line interface for InsightFlow.\n\n\
                  Classify questions locally to see which analysis they map to,\n\
                  or ask a running server for a full answer."
)]
struct Cli {
    /// Server URL
    #[arg(
        short,
        long,
        env = "INSIGHT_API_URL",
        default_value = "http://localhost:5001"
    )]
    api_url: String,

    /// YAML file replacing the built-in countries, cities and glossary
    #[arg(short, long, env = "INSIGHT_CATALOG")]
    catalog: Option<PathBuf>,

    /// Output format (text, json, yaml)
    #[arg(
        short,
        long,
        default_value = "text",
        value_parser = ["text", "json", "yaml"]
    )]
    format: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a question and show the intent and extracted parameters
    Classify {
        /// The question to classify
        query: String,
    },

    /// Ask a running server and print its answer
    Ask {
        /// The question to ask
        query: String,
    },

    /// List glossary terms and their definitions
    Glossary,

    /// List the reporting periods and their current date ranges
    Periods,

    /// Check server readiness
    Health,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let format: OutputFormat = match cli.format.parse() {
        Ok(format) => format,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Classify { query } => {
            commands::classify::run(&query, cli.catalog.as_deref(), format)
        }
        Commands::Ask { query } => commands::ask::run(&cli.api_url, &query, format).await,
        Commands::Glossary => commands::glossary::run(cli.catalog.as_deref(), format),
        Commands::Periods => commands::periods::run(format),
        Commands::Health => commands::health::run(&cli.api_url, format).await,
    };

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            if cli.verbose {
                if let Some(source) = e.source() {
                    eprintln!("{}: {}", "Caused by".yellow(), source);
                }
            }
            ExitCode::FAILURE
        }
    }
}
