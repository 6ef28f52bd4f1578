//! HR Assistant
//!
//! Wires a configured chat model, the knowledge-search tool and the agent
//! loop together.

use std::sync::Arc;

use agent_core::{
    Agent, AgentConfig, ConversationState, GenerationOptions, LlmProvider, Message, ToolRegistry,
};
use agent_runtime::load_chat_model;

use crate::config::{Configuration, SearchBackend};
use crate::error::Result;
use crate::search::{AzureSearchClient, MockSearchClient, SearchClient};
use crate::svckit::KnowledgeSearchTool;

/// Search client for the configured backend
pub fn build_search_client(config: &Configuration) -> Result<Arc<dyn SearchClient>> {
    Ok(match config.search_backend {
        SearchBackend::Azure => Arc::new(AzureSearchClient::from_config(config.search.clone())?),
        SearchBackend::Mock => Arc::new(MockSearchClient::new()),
    })
}

/// HR question-answering agent
pub struct HrAssistant {
    agent: Agent,
    config: Configuration,
    search: Arc<dyn SearchClient>,
}

impl HrAssistant {
    /// Resolve the model and search backend named in `config`
    pub fn from_config(config: Configuration) -> Result<Self> {
        let search = build_search_client(&config)?;
        Self::with_search(config, search)
    }

    /// Resolve the model named in `config` and use an existing search client
    pub fn with_search(config: Configuration, search: Arc<dyn SearchClient>) -> Result<Self> {
        let loaded = load_chat_model(&config.model, &config.model_settings)?;
        Ok(Self::with_parts(config, loaded.provider, loaded.generation, search))
    }

    /// Assemble from already-built components
    pub fn with_parts(
        config: Configuration,
        provider: Arc<dyn LlmProvider>,
        generation: GenerationOptions,
        search: Arc<dyn SearchClient>,
    ) -> Self {
        let mut tools = ToolRegistry::new();
        tools.register(KnowledgeSearchTool::new(search.clone(), config.max_search_results));

        let agent_config = AgentConfig {
            system_prompt: config.system_prompt.clone(),
            max_steps: config.max_steps,
            generation,
        };

        tracing::debug!(
            model = %config.model,
            search = search.name(),
            max_steps = config.max_steps,
            "HR assistant ready"
        );

        Self {
            agent: Agent::new(provider, Arc::new(tools), agent_config),
            config,
            search,
        }
    }

    pub fn new_conversation(&self) -> ConversationState {
        self.agent.new_conversation()
    }

    /// Conversation seeded with earlier messages
    pub fn conversation_with_history(&self, history: Vec<Message>) -> ConversationState {
        ConversationState::with_history(history, self.config.max_steps)
    }

    /// Answer one user message within an ongoing conversation
    pub async fn chat(&self, state: &mut ConversationState, input: &str) -> String {
        self.agent.respond(state, input).await
    }

    /// Answer a standalone question
    pub async fn ask(&self, question: &str) -> String {
        self.agent.ask(question).await
    }

    pub const fn config(&self) -> &Configuration {
        &self.config
    }

    pub const fn agent(&self) -> &Agent {
        &self.agent
    }

    pub async fn search_configured(&self) -> bool {
        self.search.health_check().await
    }
}
