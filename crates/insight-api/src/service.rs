//! The chat pipeline: classify, fetch, narrate.

use std::sync::Arc;

use insight_data::DataAccess;
use insight_narrative::{canned, NarrativeError, NarrativeGenerator};
use insight_nlp::{Classification, NlpEngine};
use tracing::{info, instrument, warn};

use crate::error::{ChatError, Result};

/// Answers chat queries end to end.
#[derive(Clone)]
pub struct ChatService {
    engine: Arc<dyn NlpEngine>,
    data: Arc<dyn DataAccess>,
    narrator: Option<Arc<dyn NarrativeGenerator>>,
}

impl ChatService {
    pub fn new(engine: Arc<dyn NlpEngine>, data: Arc<dyn DataAccess>) -> Self {
        Self {
            engine,
            data,
            narrator: None,
        }
    }

    pub fn with_narrator(mut self, narrator: Arc<dyn NarrativeGenerator>) -> Self {
        self.narrator = Some(narrator);
        self
    }

    /// Whether a narrative engine is configured.
    pub fn is_available(&self) -> bool {
        self.narrator.is_some()
    }

    pub fn data(&self) -> &Arc<dyn DataAccess> {
        &self.data
    }

    /// Answers one query.
    ///
    /// Queries that are not understood still succeed with an apology; only
    /// an unavailable engine, a blank query or a failed fetch/narration is
    /// an error.
    #[instrument(skip(self, query))]
    pub async fn answer(&self, query: &str) -> Result<String> {
        let narrator = self.narrator.as_ref().ok_or(ChatError::EngineUnavailable)?;

        let query = query.trim();
        if query.is_empty() {
            return Err(ChatError::EmptyQuery);
        }
        info!("Received query: '{}'", query);

        let (intent, context) = match self.engine.classify(query) {
            Classification::Matched { intent, context } => (intent, context),
            Classification::Ambiguous { error } | Classification::NoMatch { error } => {
                return Ok(format!("Sorry, {}", error.message()));
            }
        };

        if let Some(answer) = canned::answer(intent, &context, self.engine.catalog(), query) {
            return Ok(answer);
        }

        let data = self.data.fetch(intent, &context).await?;

        match narrator.narrate(intent, &context, query, &data).await {
            Ok(narrative) => Ok(narrative),
            Err(NarrativeError::EmptyCompletion { feedback }) => {
                warn!("No narrative produced, feedback: {:?}", feedback);
                Ok(format!(
                    "Analysis engine provided no narrative. (Safety Feedback: {})",
                    feedback.as_deref().unwrap_or("N/A")
                ))
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use insight_data::{DataError, FetchedData};
    use insight_nlp::{Context, Intent, NlpEngineImpl};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeData {
        calls: Mutex<Vec<Intent>>,
        fail: bool,
    }

    #[async_trait]
    impl DataAccess for FakeData {
        async fn fetch(&self, intent: Intent, _context: &Context) -> insight_data::Result<FetchedData> {
            self.calls.lock().unwrap().push(intent);
            if self.fail {
                return Err(DataError::connection("refused"));
            }
            Ok(FetchedData::Amount(1500.0))
        }

        async fn ping(&self) -> insight_data::Result<()> {
            Ok(())
        }
    }

    struct FakeNarrator {
        outcome: fn() -> insight_narrative::Result<String>,
    }

    #[async_trait]
    impl NarrativeGenerator for FakeNarrator {
        async fn narrate(
            &self,
            intent: Intent,
            _context: &Context,
            _query: &str,
            _data: &FetchedData,
        ) -> insight_narrative::Result<String> {
            assert_eq!(intent, Intent::GetDeliveredRevenue);
            (self.outcome)()
        }
    }

    fn service(data: Arc<FakeData>, outcome: fn() -> insight_narrative::Result<String>) -> ChatService {
        ChatService::new(Arc::new(NlpEngineImpl::new()), data)
            .with_narrator(Arc::new(FakeNarrator { outcome }))
    }

    #[tokio::test]
    async fn test_unavailable_engine() {
        let service = ChatService::new(Arc::new(NlpEngineImpl::new()), Arc::new(FakeData::default()));
        let err = service.answer("revenue last month").await.unwrap_err();
        assert!(matches!(err, ChatError::EngineUnavailable));
    }

    #[tokio::test]
    async fn test_empty_query() {
        let service = service(Arc::new(FakeData::default()), || Ok(String::new()));
        let err = service.answer("   ").await.unwrap_err();
        assert!(matches!(err, ChatError::EmptyQuery));
    }

    #[tokio::test]
    async fn test_not_understood_is_an_apology() {
        let data = Arc::new(FakeData::default());
        let service = service(data.clone(), || Ok(String::new()));
        let answer = service.answer("tell me a joke").await.unwrap();
        assert!(answer.starts_with("Sorry, "));
        assert!(data.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_help_skips_data() {
        let data = Arc::new(FakeData::default());
        let service = service(data.clone(), || Ok(String::new()));
        let answer = service.answer("help").await.unwrap();
        assert!(answer.starts_with("I can provide insights on:"));
        assert!(data.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_analytical_query() {
        let data = Arc::new(FakeData::default());
        let service = service(data.clone(), || Ok("Revenue was $1,500.00.".to_string()));
        let answer = service.answer("revenue last month").await.unwrap();
        assert_eq!(answer, "Revenue was $1,500.00.");
        assert_eq!(*data.calls.lock().unwrap(), vec![Intent::GetDeliveredRevenue]);
    }

    #[tokio::test]
    async fn test_data_failure() {
        let data = Arc::new(FakeData {
            fail: true,
            ..FakeData::default()
        });
        let service = service(data, || Ok(String::new()));
        let err = service.answer("revenue last month").await.unwrap_err();
        assert_eq!(
            err.user_message(),
            "Sorry, couldn't get data due to: Database connection failed."
        );
    }

    #[tokio::test]
    async fn test_empty_completion_is_reported() {
        let service = service(Arc::new(FakeData::default()), || {
            Err(NarrativeError::EmptyCompletion {
                feedback: Some("SAFETY".to_string()),
            })
        });
        let answer = service.answer("revenue last month").await.unwrap();
        assert_eq!(
            answer,
            "Analysis engine provided no narrative. (Safety Feedback: SAFETY)"
        );
    }
}
