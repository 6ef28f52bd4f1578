//! Knowledge Search Tool
//!
//! Lets the model query the HR document index.

use std::sync::Arc;

use agent_core::{Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema, tool::ParameterSchema};
use async_trait::async_trait;

use crate::search::{SearchClient, search_knowledge_base};

/// Name the model calls the tool by
pub const SEARCH_TOOL_NAME: &str = "azure_ai_search";

/// Tool for searching the HR knowledge base
pub struct KnowledgeSearchTool {
    client: Arc<dyn SearchClient>,
    max_results: usize,
}

impl KnowledgeSearchTool {
    pub fn new(client: Arc<dyn SearchClient>, max_results: usize) -> Self {
        Self {
            client,
            max_results: max_results.max(1),
        }
    }
}

#[async_trait]
impl Tool for KnowledgeSearchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: SEARCH_TOOL_NAME.into(),
            description: "Search the HR knowledge base using hybrid vector and keyword search. \
                          Returns matching documents with title, content, key phrases and category."
                .into(),
            parameters: vec![ParameterSchema {
                name: "query".into(),
                param_type: "string".into(),
                description: "The search query".into(),
                required: true,
                default: None,
                enum_values: None,
            }],
            category: Some("knowledge_base".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let query = call.str_arg("query").unwrap_or_default().trim();

        let payload = search_knowledge_base(self.client.as_ref(), query, self.max_results).await;

        Ok(ToolResult::json(SEARCH_TOOL_NAME, !payload.is_error(), payload.to_json()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{AzureSearchClient, AzureSearchConfig, MockSearchClient};
    use agent_core::{ToolRegistry, citation::results_from_payload};

    #[tokio::test]
    async fn test_results_are_readable_by_the_agent_loop() {
        let tool = KnowledgeSearchTool::new(Arc::new(MockSearchClient::new()), 2);
        let call = ToolCall::new(SEARCH_TOOL_NAME).with_argument("query", "travel hotel".into());

        let result = tool.execute(&call).await.unwrap();

        assert!(result.success);
        let found = results_from_payload(result.data.as_ref().unwrap()).unwrap();
        assert!(!found.is_empty() && found.len() <= 2);
        assert_eq!(found[0].title, "Travel Policy.pdf");
    }

    #[tokio::test]
    async fn test_missing_configuration_names_exact_parameters() {
        let config = AzureSearchConfig {
            endpoint: Some("https://hr.search.windows.net".into()),
            ..Default::default()
        };
        let client = AzureSearchClient::from_config(config).unwrap();
        let tool = KnowledgeSearchTool::new(Arc::new(client), 5);
        let call = ToolCall::new(SEARCH_TOOL_NAME).with_argument("query", "vacation".into());

        let result = tool.execute(&call).await.unwrap();

        assert!(!result.success);
        assert_eq!(
            result.output,
            r#"{"error":"Azure Search configuration missing: COG_SEARCH_KEY, COG_SEARCH_INDEX_NAME"}"#
        );
    }

    #[tokio::test]
    async fn test_registry_requires_query() {
        let mut registry = ToolRegistry::new();
        registry.register(KnowledgeSearchTool::new(Arc::new(MockSearchClient::new()), 5));

        let err = registry.execute(&ToolCall::new(SEARCH_TOOL_NAME)).await.unwrap_err();
        assert!(err.to_string().contains("query"));
    }
}
