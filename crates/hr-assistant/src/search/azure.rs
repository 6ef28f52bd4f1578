//! Azure AI Search Client
//!
//! Hybrid search over the REST API: the query text is used both for keyword
//! matching and as a vectorizable query against `content_vector`.

use std::time::Duration;

use agent_core::SearchResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::SearchClient;
use crate::error::{HrError, Result};

pub const ENDPOINT_VAR: &str = "COG_SEARCH_ENDPOINT";
pub const KEY_VAR: &str = "COG_SEARCH_KEY";
pub const INDEX_VAR: &str = "COG_SEARCH_INDEX_NAME";
pub const API_VERSION_VAR: &str = "COG_SEARCH_API_VERSION";

pub const DEFAULT_API_VERSION: &str = "2024-07-01";

/// Nearest neighbours considered by the vector half of the query
const VECTOR_K: usize = 50;
const VECTOR_FIELD: &str = "content_vector";
const SELECT_FIELDS: &str = "title,content,keyPhrases,category,document_type";

/// Connection settings for the search service
#[derive(Clone, Debug)]
pub struct AzureSearchConfig {
    /// Service endpoint, e.g. `https://my-search.search.windows.net`
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub index_name: Option<String>,
    pub api_version: String,
    pub timeout_secs: u64,
}

impl Default for AzureSearchConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            index_name: None,
            api_version: DEFAULT_API_VERSION.into(),
            timeout_secs: 30,
        }
    }
}

impl AzureSearchConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            endpoint: lookup(ENDPOINT_VAR),
            api_key: lookup(KEY_VAR),
            index_name: lookup(INDEX_VAR),
            api_version: lookup(API_VERSION_VAR).unwrap_or_else(|| DEFAULT_API_VERSION.into()),
            ..Default::default()
        }
    }

    /// Names of the required settings that are unset, in a fixed order
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (ENDPOINT_VAR, &self.endpoint),
            (KEY_VAR, &self.api_key),
            (INDEX_VAR, &self.index_name),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_none_or(str::is_empty))
        .map(|(name, _)| name)
        .collect()
    }

    pub fn is_configured(&self) -> bool {
        self.missing().is_empty()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    search: &'a str,
    vector_queries: [VectorQuery<'a>; 1],
    select: &'static str,
    top: usize,
}

#[derive(Serialize)]
struct VectorQuery<'a> {
    kind: &'static str,
    text: &'a str,
    k: usize,
    fields: &'static str,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    value: Vec<SearchHit>,
}

/// One document as the service returns it; any selected field may be null
#[derive(Deserialize)]
struct SearchHit {
    #[serde(rename = "@search.score", default)]
    score: Option<f64>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(rename = "keyPhrases", default)]
    key_phrases: Option<Vec<String>>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    document_type: Option<String>,
}

impl From<SearchHit> for SearchResult {
    fn from(hit: SearchHit) -> Self {
        Self {
            title: hit.title.unwrap_or_default(),
            content: hit.content.unwrap_or_default(),
            key_phrases: hit.key_phrases.unwrap_or_default(),
            category: hit.category.unwrap_or_default(),
            document_type: hit.document_type.unwrap_or_default(),
            score: hit.score.unwrap_or_default(),
        }
    }
}

/// Azure AI Search REST client
pub struct AzureSearchClient {
    http: reqwest::Client,
    config: AzureSearchConfig,
}

impl AzureSearchClient {
    /// Create from configuration. Missing settings are reported per search.
    pub fn from_config(config: AzureSearchConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, config })
    }

    pub const fn config(&self) -> &AzureSearchConfig {
        &self.config
    }

    fn connection(&self) -> Result<(&str, &str, &str)> {
        match (
            self.config.endpoint.as_deref(),
            self.config.api_key.as_deref(),
            self.config.index_name.as_deref(),
        ) {
            (Some(endpoint), Some(key), Some(index))
                if !endpoint.is_empty() && !key.is_empty() && !index.is_empty() =>
            {
                Ok((endpoint, key, index))
            }
            _ => Err(HrError::MissingSearchConfig(
                self.config.missing().into_iter().map(String::from).collect(),
            )),
        }
    }
}

#[async_trait]
impl SearchClient for AzureSearchClient {
    async fn search(&self, query: &str, top: usize) -> Result<Vec<SearchResult>> {
        let (endpoint, key, index) = self.connection()?;

        let url = format!(
            "{}/indexes/{index}/docs/search?api-version={}",
            endpoint.trim_end_matches('/'),
            self.config.api_version
        );
        let body = SearchRequest {
            search: query,
            vector_queries: [VectorQuery {
                kind: "text",
                text: query,
                k: VECTOR_K,
                fields: VECTOR_FIELD,
            }],
            select: SELECT_FIELDS,
            top,
        };

        tracing::debug!(index, top, "Querying Azure AI Search");

        let response = self
            .http
            .post(url)
            .header("api-key", key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(String::from))
                .unwrap_or(text);
            return Err(HrError::Search(format!("HTTP {}: {detail}", status.as_u16())));
        }

        let parsed: SearchResponse = response.json().await?;
        Ok(parsed.value.into_iter().map(SearchResult::from).collect())
    }

    async fn health_check(&self) -> bool {
        self.config.is_configured()
    }

    fn name(&self) -> &str {
        "Azure AI Search"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn configured(endpoint: String) -> AzureSearchConfig {
        AzureSearchConfig {
            endpoint: Some(endpoint),
            api_key: Some("search-key".into()),
            index_name: Some("hr-docs".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_names_only_unset_settings() {
        let config = AzureSearchConfig {
            endpoint: Some("https://hr.search.windows.net".into()),
            index_name: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(config.missing(), vec![KEY_VAR, INDEX_VAR]);
        assert!(!config.is_configured());
    }

    #[tokio::test]
    async fn test_unconfigured_search_fails_with_names() {
        let client = AzureSearchClient::from_config(AzureSearchConfig::default()).unwrap();
        let err = client.search("vacation", 5).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Azure Search configuration missing: COG_SEARCH_ENDPOINT, COG_SEARCH_KEY, COG_SEARCH_INDEX_NAME"
        );
    }

    #[tokio::test]
    async fn test_hybrid_search_request_and_mapping() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/indexes/hr-docs/docs/search")
            .match_query(Matcher::UrlEncoded("api-version".into(), "2024-07-01".into()))
            .match_header("api-key", "search-key")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "search": "parental leave",
                "vectorQueries": [{"kind": "text", "text": "parental leave", "k": 50, "fields": "content_vector"}],
                "select": "title,content,keyPhrases,category,document_type",
                "top": 2
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"value":[
                    {"@search.score":3.5,"title":"Leave Policy.pdf","content":"Sixteen weeks paid.","keyPhrases":["leave"],"category":"Policy","document_type":"pdf"},
                    {"@search.score":1.0,"title":null,"content":"Loose text","keyPhrases":null}
                ]}"#,
            )
            .create_async()
            .await;

        let client = AzureSearchClient::from_config(configured(server.url())).unwrap();
        let results = client.search("parental leave", 2).await.unwrap();

        mock.assert_async().await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Leave Policy.pdf");
        assert_eq!(results[0].key_phrases, vec!["leave".to_string()]);
        assert!((results[0].score - 3.5).abs() < f64::EPSILON);
        assert_eq!(results[1].title, "");
        assert!(results[1].key_phrases.is_empty());
    }

    #[tokio::test]
    async fn test_service_error_detail() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/indexes/hr-docs/docs/search")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"error":{"message":"Index not found"}}"#)
            .create_async()
            .await;

        let client = AzureSearchClient::from_config(configured(server.url())).unwrap();
        let err = client.search("anything", 5).await.unwrap_err();
        assert!(matches!(err, HrError::Search(m) if m == "HTTP 404: Index not found"));
    }
}
