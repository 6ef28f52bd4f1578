//! Azure OpenAI Provider
//!
//! Implementation of `LlmProvider` for Azure OpenAI deployments. The
//! deployment in the URL selects the model and the key goes in `api-key`.

use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::Message,
    provider::{Completion, GenerationOptions, LlmProvider},
    tool::ToolSchema,
};
use async_trait::async_trait;

use crate::wire::{ChatRequest, send_chat_request};

pub const ENDPOINT_VAR: &str = "OPENAI_API_BASE";
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const API_VERSION_VAR: &str = "OPENAI_API_VERSION";
pub const DEPLOYMENT_VAR: &str = "GPT4OMINI";

pub const DEFAULT_API_VERSION: &str = "2024-05-01-preview";

/// Azure OpenAI configuration
#[derive(Clone, Debug)]
pub struct AzureOpenAiConfig {
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`
    pub endpoint: Option<String>,

    pub api_key: Option<String>,

    pub api_version: String,

    /// Deployment name
    pub deployment: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for AzureOpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            api_version: DEFAULT_API_VERSION.into(),
            deployment: "gpt-4o-mini".into(),
            timeout_secs: 120,
        }
    }
}

impl AzureOpenAiConfig {
    /// Names of the required settings that are unset
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.endpoint.as_deref().is_none_or(str::is_empty) {
            missing.push(ENDPOINT_VAR);
        }
        if self.api_key.as_deref().is_none_or(str::is_empty) {
            missing.push(API_KEY_VAR);
        }
        missing
    }

    fn chat_url(&self, endpoint: &str) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            endpoint.trim_end_matches('/'),
            self.deployment,
            self.api_version
        )
    }
}

/// Azure OpenAI chat-completions provider
pub struct AzureOpenAiProvider {
    http: reqwest::Client,
    config: AzureOpenAiConfig,
}

impl AzureOpenAiProvider {
    /// Create from configuration.
    ///
    /// Missing credentials are not an error here; they are reported by
    /// `complete` so the caller sees them as a normal turn failure.
    pub fn from_config(config: AzureOpenAiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    pub const fn config(&self) -> &AzureOpenAiConfig {
        &self.config
    }

    fn credentials(&self) -> Result<(&str, &str)> {
        match (self.config.endpoint.as_deref(), self.config.api_key.as_deref()) {
            (Some(endpoint), Some(key)) if !endpoint.is_empty() && !key.is_empty() => {
                Ok((endpoint, key))
            }
            _ => Err(AgentError::missing_config("Azure OpenAI", &self.config.missing())),
        }
    }
}

#[async_trait]
impl LlmProvider for AzureOpenAiProvider {
    fn name(&self) -> &str {
        "Azure OpenAI"
    }

    async fn health_check(&self) -> Result<bool> {
        let missing = self.config.missing();
        if !missing.is_empty() {
            tracing::warn!("Azure OpenAI not configured: {}", missing.join(", "));
        }
        Ok(missing.is_empty())
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let (endpoint, key) = self.credentials()?;

        let body = ChatRequest::new(None, messages, tools, options);
        let request = self
            .http
            .post(self.config.chat_url(endpoint))
            .header("api-key", key);

        tracing::debug!(
            deployment = %self.config.deployment,
            messages = messages.len(),
            tools = tools.len(),
            "Sending Azure OpenAI chat completion"
        );

        send_chat_request(request, &body)
            .await?
            .into_completion(&self.config.deployment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn test_config_defaults() {
        let config = AzureOpenAiConfig::default();
        assert_eq!(config.api_version, "2024-05-01-preview");
        assert_eq!(config.deployment, "gpt-4o-mini");
        assert_eq!(config.missing(), vec![ENDPOINT_VAR, API_KEY_VAR]);
    }

    #[tokio::test]
    async fn test_missing_credentials_are_named() {
        let provider = AzureOpenAiProvider::from_config(AzureOpenAiConfig {
            endpoint: Some("https://example.openai.azure.com".into()),
            ..Default::default()
        })
        .unwrap();

        let err = provider
            .complete(&[Message::user("Hi")], &[], &GenerationOptions::default())
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Configuration error: Azure OpenAI configuration missing: OPENAI_API_KEY"
        );
        assert!(!provider.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_complete_against_deployment_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/openai/deployments/hr-gpt/chat/completions")
            .match_query(Matcher::UrlEncoded("api-version".into(), "2024-05-01-preview".into()))
            .match_header("api-key", "secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id":"chatcmpl-9","choices":[{"message":{"content":null,"tool_calls":[
                    {"id":"call_1","type":"function","function":{"name":"azure_ai_search","arguments":"{\"query\":\"travel policy\"}"}}
                ]},"finish_reason":"tool_calls"}]}"#,
            )
            .create_async()
            .await;

        let provider = AzureOpenAiProvider::from_config(AzureOpenAiConfig {
            endpoint: Some(server.url()),
            api_key: Some("secret".into()),
            deployment: "hr-gpt".into(),
            ..Default::default()
        })
        .unwrap();

        let completion = provider
            .complete(&[Message::user("Travel?")], &[], &GenerationOptions::default())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(completion.id.as_deref(), Some("chatcmpl-9"));
        assert_eq!(completion.model, "hr-gpt");
        assert_eq!(completion.tool_calls[0].str_arg("query"), Some("travel policy"));
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", Matcher::Regex("^/openai/deployments/".into()))
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"error":{"message":"Invalid key"}}"#)
            .create_async()
            .await;

        let provider = AzureOpenAiProvider::from_config(AzureOpenAiConfig {
            endpoint: Some(server.url()),
            api_key: Some("wrong".into()),
            ..Default::default()
        })
        .unwrap();

        let err = provider
            .complete(&[Message::user("Hi")], &[], &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Auth(m) if m == "Invalid key"));
    }
}
