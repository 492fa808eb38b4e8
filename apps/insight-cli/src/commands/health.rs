//! Server readiness command

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::Value;
use std::time::Duration;

use crate::output::{self, OutputFormat};

pub async fn run(api_url: &str, format: OutputFormat) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    let url = format!("{}/ready", api_url.trim_end_matches('/'));
    let response = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("Failed to reach {}", url))?;

    let ready = response.status().is_success();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if let Some(rendered) = output::format_structured(&body, format)? {
        println!("{}", rendered);
    } else {
        let status = if ready { "Ready".green() } else { "Not ready".red() };
        println!("{}: {}", "Status".bold(), status);
        for component in ["database", "ai_engine"] {
            let up = body[component].as_bool().unwrap_or(false);
            output::key_value(component, if up { "up" } else { "down" });
        }
    }

    if ready {
        Ok(())
    } else {
        anyhow::bail!("Server at {} is not ready", api_url)
    }
}
