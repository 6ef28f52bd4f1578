//! LLM Provider Strategy Pattern
//!
//! Defines a common interface for all chat-completion backends (Azure OpenAI,
//! OpenAI, Ollama, ...) so the agent loop works with any of them unchanged.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_core::provider::{BoundModel, GenerationOptions};
//!
//! let model = BoundModel::new(provider, registry.schemas(), GenerationOptions::default());
//! let completion = model.invoke(&system_prompt, conversation.messages()).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;
use crate::message::Message;
use crate::tool::{ToolCall, ToolSchema};

/// Configuration for LLM generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier without provider prefix (e.g., "gpt-4o-mini")
    pub model: String,

    /// Temperature for sampling (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Top-p nucleus sampling
    #[serde(default)]
    pub top_p: Option<f32>,

    /// Stop sequences
    #[serde(default)]
    pub stop_sequences: Vec<String>,
}

const fn default_temperature() -> f32 {
    0.1
}

const fn default_max_tokens() -> u32 {
    1000
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: None,
            stop_sequences: Vec::new(),
        }
    }
}

/// Response from an LLM completion
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Completion {
    /// Provider response identifier
    pub id: Option<String>,

    /// The generated text (empty when the model only requests tools)
    pub content: String,

    /// Tool calls requested by the model
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,

    /// Model that generated this response
    pub model: String,

    /// Token usage statistics (if available)
    pub usage: Option<TokenUsage>,

    /// Finish reason
    pub finish_reason: Option<FinishReason>,
}

impl Completion {
    /// Plain text answer without tool requests
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            id: None,
            content: content.into(),
            tool_calls: Vec::new(),
            model: String::new(),
            usage: None,
            finish_reason: Some(FinishReason::Stop),
        }
    }

    /// Response that only requests tools
    pub fn tool_request(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            id: None,
            content: String::new(),
            tool_calls,
            model: String::new(),
            usage: None,
            finish_reason: Some(FinishReason::ToolUse),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Convert into the assistant message appended to the log
    pub fn into_message(self) -> Message {
        Message::assistant(self.content)
            .with_id(self.id)
            .with_tool_calls(self.tool_calls)
    }
}

/// Token usage statistics
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Reason for completion finishing
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolUse,
    ContentFilter,
    Error,
}

/// Strategy trait for LLM providers
///
/// Implement this trait to add support for new chat-completion backends.
/// The agent works exclusively through this interface.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., "Azure OpenAI")
    fn name(&self) -> &str;

    /// Check if the provider is reachable and configured correctly
    async fn health_check(&self) -> Result<bool>;

    /// Generate one assistant response from the message log.
    ///
    /// `tools` are the function schemas the model may request.
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<Completion>;
}

/// A provider with its tool schemas and generation options bound.
///
/// Accepts a system prompt and the message log and yields exactly one
/// completion or one failure.
#[derive(Clone)]
pub struct BoundModel {
    provider: Arc<dyn LlmProvider>,
    tools: Vec<ToolSchema>,
    options: GenerationOptions,
}

impl BoundModel {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Vec<ToolSchema>,
        options: GenerationOptions,
    ) -> Self {
        Self {
            provider,
            tools,
            options,
        }
    }

    /// Call the model with `system` prepended to `messages`
    pub async fn invoke(&self, system: &str, messages: &[Message]) -> Result<Completion> {
        let mut request = Vec::with_capacity(messages.len() + 1);
        request.push(Message::system(system));
        request.extend_from_slice(messages);

        self.provider.complete(&request, &self.tools, &self.options).await
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    pub fn tools(&self) -> &[ToolSchema] {
        &self.tools
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }
}
