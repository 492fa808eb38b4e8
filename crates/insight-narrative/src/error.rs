//! Narrative-generation error types

use insight_nlp::Intent;
use thiserror::Error;

/// Failures while turning fetched data into an answer.
#[derive(Error, Debug)]
pub enum NarrativeError {
    /// No text-completion engine is configured.
    #[error("AI engine unavailable: {0}")]
    Unavailable(String),

    /// HTTP request to the completion service failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The completion service returned an error response
    #[error("Completion API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The model answered without any text, typically a safety block.
    #[error("Completion returned no content")]
    EmptyCompletion { feedback: Option<String> },

    /// The fetched data does not have the shape the intent needs.
    #[error("Unexpected '{kind}' data for intent '{intent}'")]
    UnexpectedData { intent: Intent, kind: &'static str },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NarrativeError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// True when the completion engine itself is missing or failing, as
    /// opposed to a problem preparing the prompt.
    pub fn is_engine_failure(&self) -> bool {
        matches!(
            self,
            Self::Unavailable(_) | Self::Http(_) | Self::Api { .. } | Self::EmptyCompletion { .. }
        )
    }
}

/// Result type for narrative operations
pub type Result<T> = std::result::Result<T, NarrativeError>;

// Convert to insight_core AppError
impl From<NarrativeError> for insight_core::AppError {
    fn from(err: NarrativeError) -> Self {
        match err {
            NarrativeError::Unavailable(msg) => insight_core::AppError::unavailable(msg),
            NarrativeError::UnexpectedData { .. } | NarrativeError::Json(_) => {
                insight_core::AppError::internal(err.to_string())
            }
            _ => insight_core::AppError::external_service(err.to_string()),
        }
    }
}
