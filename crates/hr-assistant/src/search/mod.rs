//! Knowledge Base Search
//!
//! Abstractions over the HR document index plus the payload the search tool
//! hands back to the model.

mod azure;
mod mock;

pub use azure::{AzureSearchClient, AzureSearchConfig};
pub use mock::MockSearchClient;

use agent_core::SearchResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{HrError, Result};

/// Message attached to an empty result set
pub const NO_DOCUMENTS_MESSAGE: &str = "No documents found matching your query";

/// Search client trait (Strategy pattern)
///
/// Implement this for each document index backend.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Hybrid keyword + vector search returning at most `top` documents
    async fn search(&self, query: &str, top: usize) -> Result<Vec<SearchResult>>;

    /// Check if the index is reachable and configured
    async fn health_check(&self) -> bool;

    /// Backend name
    fn name(&self) -> &str;
}

/// What the search tool returns to the model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchPayload {
    Results {
        results: Vec<SearchResult>,
        total_count: usize,
        query: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Error {
        error: String,
    },
}

impl SearchPayload {
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }))
    }
}

/// Run a search and shape the outcome as a tool payload.
///
/// Never fails: configuration and service problems become an `error` payload
/// the model can read.
pub async fn search_knowledge_base(client: &dyn SearchClient, query: &str, top: usize) -> SearchPayload {
    match client.search(query, top).await {
        Ok(results) if results.is_empty() => {
            tracing::info!(backend = client.name(), query, "Search returned no documents");
            SearchPayload::Results {
                results,
                total_count: 0,
                query: query.to_string(),
                message: Some(NO_DOCUMENTS_MESSAGE.into()),
            }
        }
        Ok(results) => {
            tracing::info!(backend = client.name(), query, hits = results.len(), "Search complete");
            SearchPayload::Results {
                total_count: results.len(),
                results,
                query: query.to_string(),
                message: None,
            }
        }
        Err(e @ HrError::MissingSearchConfig(_)) => {
            tracing::warn!(error = %e, "Search is not configured");
            SearchPayload::Error { error: e.to_string() }
        }
        Err(e) => {
            tracing::warn!(backend = client.name(), error = %e, "Search failed");
            let reason = match e {
                HrError::Search(detail) => detail,
                other => other.to_string(),
            };
            SearchPayload::Error {
                error: format!("Search failed: {reason}"),
            }
        }
    }
}

/// Render documents as numbered context blocks
pub fn format_search_results_for_context(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No search results found.".into();
    }

    results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let title = if result.title.is_empty() {
                "Untitled"
            } else {
                result.title.as_str()
            };
            format!("Document {} - {title}:\n{}\n", i + 1, result.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
