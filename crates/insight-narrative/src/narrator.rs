//! Turns fetched data into the final answer text.

use async_trait::async_trait;
use insight_data::FetchedData;
use insight_nlp::{Context, Intent};
use tracing::{debug, info, instrument, warn};

use crate::error::{NarrativeError, Result};
use crate::gemini::TextCompletion;
use crate::prompt::{PromptBuilder, PromptPlan};

/// Produces a natural-language answer for an analytical intent.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn narrate(
        &self,
        intent: Intent,
        context: &Context,
        query: &str,
        data: &FetchedData,
    ) -> Result<String>;
}

/// Narrator backed by a text-completion model.
pub struct LlmNarrator<C> {
    completion: C,
    prompts: PromptBuilder,
}

impl<C: TextCompletion> LlmNarrator<C> {
    pub fn new(completion: C) -> Self {
        Self {
            completion,
            prompts: PromptBuilder::new(),
        }
    }

    pub fn with_prompts(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }
}

#[async_trait]
impl<C: TextCompletion> NarrativeGenerator for LlmNarrator<C> {
    #[instrument(skip(self, context, query, data), fields(intent = %intent))]
    async fn narrate(
        &self,
        intent: Intent,
        context: &Context,
        query: &str,
        data: &FetchedData,
    ) -> Result<String> {
        let prompt = match self.prompts.plan(intent, context, data)? {
            PromptPlan::Direct(answer) => {
                debug!("Answered without a model call");
                return Ok(answer);
            }
            PromptPlan::Model(prompt) => prompt,
        };

        let rendered = prompt.render(self.prompts.preamble(), query);
        let completion = self.completion.complete(&rendered).await?;
        let narrative = completion.trim();

        if narrative.is_empty() {
            warn!("Completion was blank");
            return Err(NarrativeError::EmptyCompletion { feedback: None });
        }

        if prompt.is_echo(narrative) {
            info!("Completion repeated the data, answering with the summary");
            return Ok(prompt.summary_answer());
        }

        Ok(narrative.to_string())
    }
}
