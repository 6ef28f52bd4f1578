//! Reasoning Loop
//!
//! Implements the ReAct (Reason + Act) pattern: the model is asked for an
//! answer, any tools it requests are run and their output fed back, until the
//! model answers without requesting tools or the step budget runs out.
//!
//! ```text
//!   user ──▶ AwaitingModel ──(tool calls)──▶ AwaitingTool
//!                 │    ▲                           │
//!                 │    └───────────────────────────┘
//!                 ▼
//!               Done  (citations appended, search buffer cleared)
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;

use crate::citation::{apply_citations, results_from_payload, results_from_text};
use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::provider::{BoundModel, GenerationOptions, LlmProvider};
use crate::state::ConversationState;
use crate::tool::{Tool, ToolCall, ToolRegistry, ToolResult};

/// Answer used when the model still wants tools on its last allowed step
pub const STEP_LIMIT_MESSAGE: &str =
    "Sorry, I could not find an answer to your question in the specified number of steps.";

/// Placeholder in the system prompt replaced with the current UTC time
pub const SYSTEM_TIME_PLACEHOLDER: &str = "{system_time}";

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// System prompt template (may contain `{system_time}`)
    pub system_prompt: String,

    /// Maximum model invocations per user turn
    pub max_steps: usize,

    /// Generation options
    pub generation: GenerationOptions,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_steps: 10,
            generation: GenerationOptions::default(),
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.

Use the available tools when you need facts you do not have.
After receiving tool results, synthesize them into a helpful response.
Be concise and accurate.

System time: {system_time}";

/// States of one turn through the loop
#[derive(Clone, Debug, PartialEq)]
pub enum LoopState {
    /// Waiting for the model's next response
    AwaitingModel,
    /// Waiting for the requested tool calls to finish
    AwaitingTool(Vec<ToolCall>),
    /// Final answer produced
    Done(String),
}

/// The main Agent struct
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Empty conversation using this agent's step budget
    pub fn new_conversation(&self) -> ConversationState {
        ConversationState::new(self.config.max_steps)
    }

    /// Instantiate the system prompt template at `now`
    pub fn render_system_prompt(&self, now: DateTime<Utc>) -> String {
        self.config
            .system_prompt
            .replace(SYSTEM_TIME_PLACEHOLDER, &now.to_rfc3339())
    }

    fn bound_model(&self) -> BoundModel {
        BoundModel::new(
            self.provider.clone(),
            self.tools.schemas(),
            self.config.generation.clone(),
        )
    }

    /// Process one user message, never failing.
    ///
    /// Model or configuration failures become an `Error: ...` answer which is
    /// also recorded in the conversation.
    pub async fn respond(&self, state: &mut ConversationState, input: &str) -> String {
        match self.run_turn(state, input).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, retryable = e.is_retryable(), "Agent turn failed");
                state.clear_search_results();
                let answer = format!("Error: {e}");
                state.push(Message::assistant(&answer));
                answer
            }
        }
    }

    /// Run with a single question in a throwaway conversation
    pub async fn ask(&self, question: &str) -> String {
        let mut state = self.new_conversation();
        self.respond(&mut state, question).await
    }

    /// Process one user message, returning the final answer text
    pub async fn run_turn(&self, state: &mut ConversationState, input: &str) -> Result<String> {
        state.push(Message::user(input));
        state.begin_turn();

        let model = self.bound_model();
        let mut phase = LoopState::AwaitingModel;

        loop {
            phase = match phase {
                LoopState::AwaitingModel => self.call_model(&model, state).await?,
                LoopState::AwaitingTool(calls) => {
                    self.run_tools(state, calls).await;
                    LoopState::AwaitingModel
                }
                LoopState::Done(answer) => {
                    tracing::info!(
                        steps = state.step(),
                        messages = state.messages().len(),
                        "Turn complete"
                    );
                    return Ok(answer);
                }
            };
        }
    }

    async fn call_model(&self, model: &BoundModel, state: &mut ConversationState) -> Result<LoopState> {
        state.advance_step();
        tracing::debug!(
            step = state.step(),
            budget = state.step_budget(),
            tokens = state.conversation().estimate_tokens(),
            "Calling model"
        );

        let system = self.render_system_prompt(Utc::now());
        let mut completion = model.invoke(&system, state.messages()).await?;

        if !completion.has_tool_calls() {
            let answer = apply_citations(&completion.content, state.sources());
            state.clear_search_results();
            completion.content.clone_from(&answer);
            state.push(completion.into_message());
            return Ok(LoopState::Done(answer));
        }

        if state.is_last_step() {
            tracing::warn!(
                budget = state.step_budget(),
                "Model still requested tools on the last step"
            );
            state.clear_search_results();
            state.push(Message::assistant(STEP_LIMIT_MESSAGE).with_id(completion.id));
            return Ok(LoopState::Done(STEP_LIMIT_MESSAGE.into()));
        }

        for call in &mut completion.tool_calls {
            if call.id.is_none() {
                call.id = Some(uuid::Uuid::new_v4().to_string());
            }
        }
        let calls = completion.tool_calls.clone();
        state.push(completion.into_message());

        Ok(LoopState::AwaitingTool(calls))
    }

    /// Run every requested call concurrently, then append results in request order
    async fn run_tools(&self, state: &mut ConversationState, calls: Vec<ToolCall>) {
        let results = join_all(calls.iter().map(|call| self.execute_tool(call))).await;

        for result in &results {
            let found = result
                .data
                .as_ref()
                .and_then(results_from_payload)
                .or_else(|| results_from_text(&result.output));

            if let Some(found) = found {
                tracing::debug!(tool = %result.name, hits = found.len(), "Search results updated");
                state.replace_search_results(found);
            }
        }

        state.extend(
            results
                .into_iter()
                .map(|result| Message::tool(result.output, result.id)),
        );
    }

    /// Execute a tool call
    async fn execute_tool(&self, call: &ToolCall) -> ToolResult {
        tracing::debug!(tool = %call.name, id = ?call.id, "Executing tool");

        match self.tools.execute(call).await {
            Ok(mut result) => {
                result.id.clone_from(&call.id);
                result
            }
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "Tool call failed");
                let mut result =
                    ToolResult::json(&call.name, false, serde_json::json!({ "error": e.to_string() }));
                result.id.clone_from(&call.id);
                result
            }
        }
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Get configuration
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolRegistry::new(),
            config: AgentConfig::default(),
        }
    }

    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    pub fn generation(mut self, generation: GenerationOptions) -> Self {
        self.config.generation = generation;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    pub const fn temperature(mut self, temp: f32) -> Self {
        self.config.generation.temperature = temp;
        self
    }

    pub const fn max_steps(mut self, max: usize) -> Self {
        self.config.max_steps = max;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        Ok(Agent::new(provider, Arc::new(self.tools), self.config))
    }
}
