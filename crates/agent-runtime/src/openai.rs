//! OpenAI-Compatible Provider
//!
//! `LlmProvider` for any backend speaking the chat-completions protocol with
//! bearer authentication: OpenAI itself, Ollama's `/v1` endpoint, and the
//! generic fallback used for unknown provider prefixes.

use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::Message,
    provider::{Completion, GenerationOptions, LlmProvider},
    tool::ToolSchema,
};
use async_trait::async_trait;

use crate::wire::{ChatRequest, send_chat_request};

/// OpenAI-compatible provider configuration
#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    /// Display name (e.g., "OpenAI", "Ollama")
    pub label: String,

    /// Base URL up to and including the API version segment (e.g. `https://api.openai.com/v1`)
    pub base_url: String,

    /// Bearer token, if the backend needs one
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            label: "OpenAI".into(),
            base_url: "https://api.openai.com/v1".into(),
            api_key: None,
            timeout_secs: 120,
        }
    }
}

/// Chat-completions provider with bearer auth
pub struct OpenAiProvider {
    http: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiProvider {
    /// Create from configuration
    pub fn from_config(config: OpenAiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    pub const fn config(&self) -> &OpenAiConfig {
        &self.config
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        &self.config.label
    }

    async fn health_check(&self) -> Result<bool> {
        let request = self.authorized(self.http.get(self.url("models")));
        match request.send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                tracing::warn!("{} health check failed: {}", self.config.label, e);
                Ok(false)
            }
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let body = ChatRequest::new(Some(&options.model), messages, tools, options);
        let request = self.authorized(self.http.post(self.url("chat/completions")));

        tracing::debug!(
            provider = %self.config.label,
            model = %options.model,
            messages = messages.len(),
            "Sending chat completion"
        );

        send_chat_request(request, &body)
            .await?
            .into_completion(&options.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn test_config_defaults() {
        let config = OpenAiConfig::default();
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.timeout_secs, 120);
        assert!(config.api_key.is_none());
    }

    #[tokio::test]
    async fn test_complete_sends_bearer_and_model() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(serde_json::json!({"model": "gpt-4o"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"r1","choices":[{"message":{"content":"Hello!"},"finish_reason":"stop"}]}"#)
            .create_async()
            .await;

        let provider = OpenAiProvider::from_config(OpenAiConfig {
            base_url: format!("{}/v1/", server.url()),
            api_key: Some("sk-test".into()),
            ..Default::default()
        })
        .unwrap();

        let options = GenerationOptions {
            model: "gpt-4o".into(),
            ..Default::default()
        };
        let completion = provider
            .complete(&[Message::user("Hi")], &[], &options)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(completion.content, "Hello!");
        assert_eq!(completion.model, "gpt-4o");
        assert!(!completion.has_tool_calls());
    }

    #[tokio::test]
    async fn test_rate_limit_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body(r#"{"error":{"message":"Too many requests"}}"#)
            .create_async()
            .await;

        let provider = OpenAiProvider::from_config(OpenAiConfig {
            base_url: server.url(),
            ..Default::default()
        })
        .unwrap();

        let err = provider
            .complete(&[Message::user("Hi")], &[], &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::RateLimited(m) if m == "Too many requests"));
    }
}
