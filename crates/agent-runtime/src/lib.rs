//! # agent-runtime
//!
//! Chat-completion providers for the agent loop.
//!
//! ## Providers
//!
//! - **Azure OpenAI** (`azure_openai/<model>`): deployment-scoped endpoint, `api-key` auth
//! - **OpenAI** (`openai/<model>`): api.openai.com with bearer auth
//! - **Ollama** (`ollama/<model>`): local inference through the OpenAI-compatible `/v1` API
//! - anything else: generic OpenAI-compatible endpoint from `<PROVIDER>_API_BASE`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::{load_chat_model, ProviderSettings};
//!
//! let loaded = load_chat_model("azure_openai/gpt-4o-mini", &ProviderSettings::default())?;
//! let agent = AgentBuilder::new()
//!     .provider(loaded.provider)
//!     .generation(loaded.generation)
//!     .build()?;
//! ```

pub mod azure;
pub mod openai;
pub mod registry;
pub mod wire;

pub use azure::{AzureOpenAiConfig, AzureOpenAiProvider};
pub use openai::{OpenAiConfig, OpenAiProvider};
pub use registry::{LoadedModel, ProviderSettings, load_chat_model, load_chat_model_with, parse_model_name};

// Re-export core types for convenience
pub use agent_core::{
    Agent, AgentError, ConversationState, LlmProvider, Message, Result, Role, Tool, ToolRegistry,
};
