//! Request handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::error::ChatError;
use crate::service::ChatService;

/// Chat request body
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: Option<String>,
}

/// Chat response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Answer a chat query
pub async fn chat(
    State(service): State<Arc<ChatService>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ChatError> {
    if !service.is_available() {
        return Err(ChatError::EngineUnavailable);
    }

    let query = match payload {
        Ok(Json(ChatRequest { query: Some(query) })) => query,
        Ok(_) => return Err(ChatError::MissingQuery),
        Err(rejection) => {
            warn!("Rejected chat body: {}", rejection);
            return Err(ChatError::MissingQuery);
        }
    };

    let response = service.answer(&query).await?;
    Ok(Json(ChatResponse { response }))
}

/// Liveness
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Readiness: the database answers and a narrative engine is configured.
pub async fn readiness_check(State(service): State<Arc<ChatService>>) -> impl IntoResponse {
    let database = service.data().ping().await;
    let engine = service.is_available();

    if let Err(err) = &database {
        warn!("Readiness check: database unreachable: {}", err);
    }

    let status = if database.is_ok() && engine {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "database": database.is_ok(),
            "ai_engine": engine,
        })),
    )
}
