//! `insight-server`: serves the InsightFlow chat API.

mod app;
mod cli;
mod server;
mod telemetry;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use crate::app::App;
use crate::cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args = Args::parse();
    telemetry::init_telemetry(&args)?;

    info!(version = env!("CARGO_PKG_VERSION"), "InsightFlow server starting");

    let outcome = match App::build(args).await {
        Ok(app) => app.run().await,
        Err(e) => Err(e),
    };

    match &outcome {
        Ok(()) => info!("InsightFlow server stopped"),
        Err(e) => error!("InsightFlow server failed: {:#}", e),
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert()
    }
}
