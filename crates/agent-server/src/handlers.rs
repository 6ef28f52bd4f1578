//! HTTP Handlers

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use agent_core::{Message, Role};
use hr_assistant::{ConfigOverrides, HrAssistant};

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model: String,
    pub search_configured: bool,
}

/// Earlier turn supplied by the caller
#[derive(Debug, Deserialize)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<HistoryMessage>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// Per-request settings (`model`, `max_search_results`, `max_steps`, ...)
    #[serde(flatten)]
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: String,
    pub conversation_id: String,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn reject(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model: state.config.model.clone(),
        search_configured: state.search.health_check().await,
    })
}

/// Answer one message, optionally continuing a caller-held history
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = payload.message.trim();
    if message.is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, "EMPTY_MESSAGE", "message must not be empty"));
    }

    let history = payload
        .history
        .into_iter()
        .map(|turn| match turn.role {
            Role::User | Role::Assistant => Ok(Message::new(turn.role, turn.content)),
            other => Err(reject(
                StatusCode::BAD_REQUEST,
                "INVALID_HISTORY",
                format!("history may only contain user and assistant messages, got '{other}'"),
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;

    // The server's own key is never sent to a caller-chosen endpoint
    if payload.overrides.azure_endpoint.is_some() && payload.overrides.azure_api_key.is_none() {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            "MISSING_API_KEY",
            "azure_endpoint requires azure_api_key in the same request",
        ));
    }

    let config = state.config.with_overrides(&payload.overrides);
    let model = config.model.clone();

    let assistant = HrAssistant::with_search(config, state.search.clone()).map_err(|e| {
        tracing::warn!(model = %model, error = %e, "Rejected chat configuration");
        reject(StatusCode::BAD_REQUEST, "INVALID_CONFIGURATION", e.to_string())
    })?;

    let mut conversation = assistant.conversation_with_history(history);
    let answer = assistant.chat(&mut conversation, message).await;

    let conversation_id = payload
        .conversation_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    tracing::info!(
        conversation_id = %conversation_id,
        model = %model,
        messages = conversation.messages().len(),
        "Chat request answered"
    );

    Ok(Json(ChatResponse {
        message: answer,
        conversation_id,
        model,
    }))
}
