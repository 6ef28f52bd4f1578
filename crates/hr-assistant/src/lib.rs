//! # hr-assistant
//!
//! HR question-answering agent. Policy and benefits questions are answered
//! from an Azure AI Search knowledge base, and answers built on retrieved
//! documents get a sources block listing the document titles.
//!
//! ## Flow
//!
//! ```text
//!   question ──▶ model ──(azure_ai_search)──▶ knowledge base
//!                  ▲                               │
//!                  └───────── documents ───────────┘
//!                  │
//!                  ▼
//!   answer + **Sources:** (unless it is a general-knowledge answer)
//! ```
//!
//! ## Configuration
//!
//! | Variable                  | Default                    |
//! |---------------------------|----------------------------|
//! | `HR_AGENT_MODEL`          | `azure_openai/gpt-4o-mini` |
//! | `HR_MAX_SEARCH_RESULTS`   | `5`                        |
//! | `HR_MAX_STEPS`            | `10`                       |
//! | `HR_SEARCH_BACKEND`       | `azure` (`mock` for demos) |
//! | `COG_SEARCH_ENDPOINT`, `COG_SEARCH_KEY`, `COG_SEARCH_INDEX_NAME` | unset |

pub mod assistant;
pub mod config;
pub mod error;
pub mod prompts;
pub mod search;
pub mod svckit;

pub use assistant::{HrAssistant, build_search_client};
pub use config::{ConfigOverrides, Configuration, SearchBackend};
pub use error::{HrError, Result};
pub use prompts::SYSTEM_PROMPT;
pub use search::{SearchClient, SearchPayload, format_search_results_for_context, search_knowledge_base};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{KnowledgeSearchTool, SEARCH_TOOL_NAME};
}
