//! Chat pipeline errors and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use insight_data::DataError;
use insight_narrative::NarrativeError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failures while answering a chat query.
#[derive(Error, Debug)]
pub enum ChatError {
    /// No narrative engine is configured.
    #[error("AI engine unavailable")]
    EngineUnavailable,

    /// The request carried no `query` field.
    #[error("missing query")]
    MissingQuery,

    /// The query was blank after trimming.
    #[error("query empty")]
    EmptyQuery,

    #[error("data error: {0}")]
    Data(#[from] DataError),

    #[error("narrative error: {0}")]
    Narrative(#[from] NarrativeError),
}

impl ChatError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::EngineUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::MissingQuery | Self::EmptyQuery => StatusCode::BAD_REQUEST,
            Self::Data(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Narrative(err) if err.is_engine_failure() => StatusCode::SERVICE_UNAVAILABLE,
            Self::Narrative(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::EngineUnavailable => "Error: AI engine unavailable.".to_string(),
            Self::MissingQuery => "Missing 'query'.".to_string(),
            Self::EmptyQuery => "Query empty.".to_string(),
            Self::Data(err) => format!("Sorry, couldn't get data due to: {}.", err.user_message()),
            Self::Narrative(err) if err.is_engine_failure() => {
                "Sorry, the AI engine failed to generate the insight. Please try again later."
                    .to_string()
            }
            Self::Narrative(_) => {
                "Sorry, an internal error occurred generating the insight.".to_string()
            }
        }
    }

    /// Request validation failures are reported under `error`, everything
    /// else under `response`.
    fn is_request_error(&self) -> bool {
        matches!(self, Self::MissingQuery | Self::EmptyQuery)
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = status.as_u16(), "Chat request failed: {}", self);
        }

        let body = if self.is_request_error() {
            json!({ "error": self.user_message() })
        } else {
            json!({ "response": self.user_message() })
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for chat operations
pub type Result<T> = std::result::Result<T, ChatError>;

// Convert to insight_core AppError
impl From<ChatError> for insight_core::AppError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::EngineUnavailable => insight_core::AppError::unavailable(err.to_string()),
            ChatError::MissingQuery | ChatError::EmptyQuery => {
                insight_core::AppError::validation(err.to_string())
            }
            ChatError::Data(err) => err.into(),
            ChatError::Narrative(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ChatError::EngineUnavailable.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ChatError::EmptyQuery.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ChatError::from(DataError::MissingSlot("city")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ChatError::from(NarrativeError::api(500, "boom")).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ChatError::from(NarrativeError::UnexpectedData {
                intent: insight_nlp::Intent::GetGrossProfit,
                kind: "funnel",
            })
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_data_error_message() {
        let err = ChatError::from(DataError::MissingSlot("city"));
        assert_eq!(
            err.user_message(),
            "Sorry, couldn't get data due to: City name not identified."
        );
    }

    #[test]
    fn test_into_app_error() {
        let app: insight_core::AppError = ChatError::EmptyQuery.into();
        assert!(matches!(app, insight_core::AppError::Validation(_)));
    }
}
