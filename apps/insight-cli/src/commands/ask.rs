//! Single question command

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

use crate::output::{self, OutputFormat};

/// Body returned by `POST /chat`; failures carry `error` instead of `response`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatReply {
    fn text(&self) -> &str {
        self.response
            .as_deref()
            .or(self.error.as_deref())
            .unwrap_or_default()
    }
}

pub async fn run(api_url: &str, query: &str, format: OutputFormat) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(120))
        .user_agent(format!("insight-cli/{}", env!("CARGO_PKG_VERSION")))
        .build()?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")?,
    );
    spinner.set_message("Analyzing...");
    spinner.enable_steady_tick(Duration::from_millis(80));

    let url = format!("{}/chat", api_url.trim_end_matches('/'));
    let response = client
        .post(&url)
        .json(&json!({ "query": query }))
        .send()
        .await
        .with_context(|| format!("Failed to reach {}", url));

    spinner.finish_and_clear();

    let response = response?;
    let status = response.status();
    let reply: ChatReply = response
        .json()
        .await
        .context("Server returned an unreadable response")?;

    if let Some(rendered) = output::format_structured(&reply, format)? {
        println!("{}", rendered);
    } else {
        println!("{}", reply.text());
    }

    match status {
        StatusCode::OK => Ok(()),
        status => anyhow::bail!("Server answered with status {}", status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_text_prefers_response() {
        let reply: ChatReply = serde_json::from_str(r#"{"response": "Revenue grew."}"#).unwrap();
        assert_eq!(reply.text(), "Revenue grew.");

        let reply: ChatReply = serde_json::from_str(r#"{"error": "Query empty."}"#).unwrap();
        assert_eq!(reply.text(), "Query empty.");
    }
}
