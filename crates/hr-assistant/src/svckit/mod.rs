//! Service Kit - Agent Tools
//!
//! Domain-specific tools that implement `agent_core::Tool` for the HR assistant.

mod knowledge_search;

pub use knowledge_search::{KnowledgeSearchTool, SEARCH_TOOL_NAME};
