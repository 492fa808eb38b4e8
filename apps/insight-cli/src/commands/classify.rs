//! Local classification command

use anyhow::Result;
use colored::Colorize;
use insight_nlp::{Classification, NlpEngine, NlpEngineImpl};
use std::path::Path;
use std::sync::Arc;

use crate::output::{self, OutputFormat};

pub fn run(query: &str, catalog: Option<&Path>, format: OutputFormat) -> Result<()> {
    let catalog = super::load_catalog(catalog)?;
    let engine = NlpEngineImpl::with_catalog(Arc::new(catalog));
    let outcome = engine.classify(query);

    if let Some(rendered) = output::format_structured(&outcome, format)? {
        println!("{}", rendered);
        return Ok(());
    }

    match &outcome {
        Classification::Matched { intent, context } => {
            output::success(&format!("Intent: {}", intent.as_str().bold()));
            output::dimmed(intent.description());

            if context.is_empty() {
                output::dimmed("No parameters extracted");
            } else {
                output::section("Parameters");
                let params = serde_json::to_value(context)?;
                if let Some(params) = params.as_object() {
                    for (key, value) in params {
                        let value = match value {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        output::key_value(key, &value);
                    }
                }
            }
        }
        Classification::Ambiguous { error } | Classification::NoMatch { error } => {
            output::warning(error.message());
        }
    }

    Ok(())
}
