//! HR Assistant HTTP Server
//!
//! Axum-based server exposing the HR assistant as a stateless REST API.
//! Callers that want multi-turn conversations send the earlier turns back in
//! `history` with each request.

mod handlers;
mod state;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hr_assistant::{Configuration, build_search_client};

use crate::handlers::{chat_handler, health_check};
use crate::state::AppState;

fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/chat", post(chat_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment before the filter reads RUST_LOG
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Configuration::from_env()?;
    let search = build_search_client(&config)?;

    if search.health_check().await {
        tracing::info!("✓ Knowledge base: {}", search.name());
    } else {
        tracing::warn!("⚠ Knowledge base not configured - searches will report an error");
        tracing::warn!("  Set COG_SEARCH_ENDPOINT, COG_SEARCH_KEY and COG_SEARCH_INDEX_NAME in .env");
    }
    tracing::info!("Model: {}", config.model);

    let state = AppState::new(config, search);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("HR assistant server running on http://{}", addr);
    tracing::info!("  GET  /health    - Health check");
    tracing::info!("  POST /api/chat  - Ask a question");

    axum::serve(listener, app(state)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use hr_assistant::{SearchBackend, search::MockSearchClient};
    use mockito::Matcher;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn test_app() -> Router {
        let config = Configuration {
            search_backend: SearchBackend::Mock,
            ..Default::default()
        };
        app(AppState::new(config, Arc::new(MockSearchClient::new())))
    }

    async fn post_chat(app: Router, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["model"], "azure_openai/gpt-4o-mini");
        assert_eq!(body["search_configured"], true);
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected() {
        let (status, body) = post_chat(test_app(), json!({"message": "   "})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "EMPTY_MESSAGE");
    }

    #[tokio::test]
    async fn test_tool_messages_in_history_are_rejected() {
        let (status, body) = post_chat(
            test_app(),
            json!({"message": "Hi", "history": [{"role": "tool", "content": "{}"}]}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_HISTORY");
    }

    #[tokio::test]
    async fn test_malformed_model_name_is_rejected() {
        let (status, body) = post_chat(test_app(), json!({"message": "Hi", "model": "gpt-4o"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_CONFIGURATION");
    }

    #[tokio::test]
    async fn test_endpoint_override_without_key_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let upstream = server
            .mock("POST", Matcher::Any)
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let (status, body) = post_chat(
            test_app(),
            json!({"message": "Hi", "azure_endpoint": server.url()}),
        )
        .await;

        upstream.assert_async().await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "MISSING_API_KEY");
    }

    #[tokio::test]
    async fn test_chat_round_trip_with_overrides() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/openai/deployments/hr-gpt/chat/completions")
            .match_query(Matcher::Any)
            .match_header("api-key", "test-key")
            .match_body(Matcher::PartialJson(json!({
                "messages": [{"role": "system"}, {"role": "user", "content": "Hello before"},
                             {"role": "assistant", "content": "Hi!"}, {"role": "user", "content": "Hello"}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"r1","choices":[{"message":{"content":"Hello! Ask me about HR."},"finish_reason":"stop"}]}"#)
            .create_async()
            .await;

        let (status, body) = post_chat(
            test_app(),
            json!({
                "message": "Hello",
                "conversation_id": "abc",
                "history": [{"role": "user", "content": "Hello before"}, {"role": "assistant", "content": "Hi!"}],
                "azure_endpoint": server.url(),
                "azure_api_key": "test-key",
                "azure_deployment_name": "hr-gpt",
                "max_steps": 3
            }),
        )
        .await;

        mock.assert_async().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Hello! Ask me about HR.");
        assert_eq!(body["conversation_id"], "abc");
        assert_eq!(body["model"], "azure_openai/gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_provider_failure_is_an_answer_not_a_5xx() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", Matcher::Any)
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"error":{"message":"Access denied"}}"#)
            .create_async()
            .await;

        let (status, body) = post_chat(
            test_app(),
            json!({
                "message": "What is the travel policy?",
                "azure_endpoint": server.url(),
                "azure_api_key": "bad",
                "azure_deployment_name": "hr-gpt"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].as_str().unwrap().starts_with("Error: "));
        assert!(body["conversation_id"].as_str().is_some_and(|id| !id.is_empty()));
    }
}
