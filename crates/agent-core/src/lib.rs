//! # agent-core
//!
//! Core agent logic with provider-agnostic LLM abstraction, tool execution
//! and deterministic source citations.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Agent                                │
//! │  ┌─────────────┐  ┌─────────────┐  ┌──────────────────────┐  │
//! │  │  Reasoning  │  │    Tools    │  │   LlmProvider        │  │
//! │  │    Loop     │──│   Registry  │──│   (Strategy)         │  │
//! │  └─────────────┘  └─────────────┘  └──────────────────────┘  │
//! │         │                                                     │
//! │  ┌─────────────────────┐  ┌──────────────────────────────┐   │
//! │  │  ConversationState  │  │  Citations (sources block)   │   │
//! │  └─────────────────────┘  └──────────────────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait enables swapping between Azure OpenAI, OpenAI,
//! Ollama or any other chat-completion backend without changing agent logic.

pub mod citation;
pub mod error;
pub mod message;
pub mod provider;
pub mod reasoning;
pub mod state;
pub mod tool;

pub use citation::{SearchResult, apply_citations, extract_sources};
pub use error::{AgentError, Result};
pub use message::{Conversation, Message, Role};
pub use provider::{BoundModel, Completion, GenerationOptions, LlmProvider};
pub use reasoning::{Agent, AgentBuilder, AgentConfig, LoopState, STEP_LIMIT_MESSAGE};
pub use state::ConversationState;
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
