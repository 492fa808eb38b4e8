//! HTTP behaviour of the chat router.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use insight_api::{create_router, ChatService};
use insight_data::{DataAccess, DataError, FetchedData};
use insight_narrative::NarrativeGenerator;
use insight_nlp::{Context, Intent, NlpEngineImpl};
use serde_json::{json, Value};
use tower::ServiceExt;

struct StaticData {
    reachable: bool,
}

#[async_trait]
impl DataAccess for StaticData {
    async fn fetch(&self, intent: Intent, context: &Context) -> insight_data::Result<FetchedData> {
        match intent {
            Intent::SuggestImprovementForHighFailureCity if context.city.is_none() => {
                Err(DataError::MissingSlot("city"))
            }
            Intent::GetGrossProfit => Err(DataError::connection("connection refused")),
            _ => Ok(FetchedData::Amount(42_000.0)),
        }
    }

    async fn ping(&self) -> insight_data::Result<()> {
        if self.reachable {
            Ok(())
        } else {
            Err(DataError::connection("connection refused"))
        }
    }
}

struct EchoNarrator;

#[async_trait]
impl NarrativeGenerator for EchoNarrator {
    async fn narrate(
        &self,
        intent: Intent,
        _context: &Context,
        _query: &str,
        _data: &FetchedData,
    ) -> insight_narrative::Result<String> {
        Ok(format!("Narrative for {}", intent))
    }
}

fn app(with_narrator: bool, reachable: bool) -> axum::Router {
    let mut service = ChatService::new(
        Arc::new(NlpEngineImpl::new()),
        Arc::new(StaticData { reachable }),
    );
    if with_narrator {
        service = service.with_narrator(Arc::new(EchoNarrator));
    }
    create_router(service)
}

async fn post_chat(app: axum::Router, body: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/chat")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_chat_answers_analytical_query() {
    let (status, body) = post_chat(app(true, true), r#"{"query": "revenue last month"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "response": "Narrative for get_delivered_revenue" }));
}

#[tokio::test]
async fn test_chat_help() {
    let (status, body) = post_chat(app(true, true), r#"{"query": "help"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["response"].as_str().unwrap().starts_with("I can provide insights on:"));
}

#[tokio::test]
async fn test_chat_not_understood() {
    let (status, body) = post_chat(app(true, true), r#"{"query": "tell me a joke"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["response"].as_str().unwrap().starts_with("Sorry, "));
}

#[tokio::test]
async fn test_chat_missing_query() {
    let (status, body) = post_chat(app(true, true), r#"{"question": "revenue"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Missing 'query'." }));

    let (status, body) = post_chat(app(true, true), "not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Missing 'query'." }));
}

#[tokio::test]
async fn test_chat_empty_query() {
    let (status, body) = post_chat(app(true, true), r#"{"query": "   "}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Query empty." }));
}

#[tokio::test]
async fn test_chat_without_engine() {
    let (status, body) = post_chat(app(false, true), r#"{"query": "revenue last month"}"#).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({ "response": "Error: AI engine unavailable." }));
}

#[tokio::test]
async fn test_chat_data_failure() {
    let (status, body) = post_chat(app(true, true), r#"{"query": "gross profit last month"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "response": "Sorry, couldn't get data due to: Database connection failed." })
    );
}

#[tokio::test]
async fn test_health_and_readiness() {
    let response = app(false, false)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app(true, false)
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = app(true, true)
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
