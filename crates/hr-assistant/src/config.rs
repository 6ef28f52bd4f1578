//! Configuration
//!
//! Built once per process from the environment, optionally specialised per
//! request with [`ConfigOverrides`], then shared read-only behind an `Arc`.

use agent_runtime::{ProviderSettings, parse_model_name};
use serde::Deserialize;

use crate::error::{HrError, Result};
use crate::prompts::SYSTEM_PROMPT;
use crate::search::AzureSearchConfig;

pub const DEFAULT_MODEL: &str = "azure_openai/gpt-4o-mini";
pub const DEFAULT_MAX_SEARCH_RESULTS: usize = 5;
pub const DEFAULT_MAX_STEPS: usize = 10;

/// Provider prefix the `azure_*` overrides apply to
const AZURE_PROVIDER: &str = "azure_openai";

/// Which knowledge base the search tool talks to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackend {
    /// Azure AI Search over REST
    #[default]
    Azure,
    /// Built-in sample documents, no network
    Mock,
}

/// Immutable per-run settings
#[derive(Clone, Debug)]
pub struct Configuration {
    /// System prompt template
    pub system_prompt: String,

    /// Provider-qualified model name, `provider/model`
    pub model: String,

    /// Maximum documents returned per search
    pub max_search_results: usize,

    /// Maximum model invocations per question
    pub max_steps: usize,

    /// Model connection overrides; unset fields fall back to provider env vars
    pub model_settings: ProviderSettings,

    /// Search service connection
    pub search: AzureSearchConfig,

    pub search_backend: SearchBackend,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            system_prompt: SYSTEM_PROMPT.into(),
            model: DEFAULT_MODEL.into(),
            max_search_results: DEFAULT_MAX_SEARCH_RESULTS,
            max_steps: DEFAULT_MAX_STEPS,
            model_settings: ProviderSettings::default(),
            search: AzureSearchConfig::default(),
            search_backend: SearchBackend::default(),
        }
    }
}

impl Configuration {
    /// Load from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let defaults = Self::default();
        let search_backend = match get("HR_SEARCH_BACKEND").as_deref() {
            None | Some("azure") => SearchBackend::Azure,
            Some("mock") => SearchBackend::Mock,
            Some(other) => {
                return Err(HrError::Config(format!(
                    "HR_SEARCH_BACKEND must be 'azure' or 'mock', got '{other}'"
                )));
            }
        };

        Ok(Self {
            model: get("HR_AGENT_MODEL").unwrap_or(defaults.model),
            max_search_results: parse_count(get("HR_MAX_SEARCH_RESULTS"), "HR_MAX_SEARCH_RESULTS")?
                .unwrap_or(defaults.max_search_results),
            max_steps: parse_count(get("HR_MAX_STEPS"), "HR_MAX_STEPS")?.unwrap_or(defaults.max_steps),
            search: AzureSearchConfig::from_lookup(&get),
            search_backend,
            ..defaults
        })
    }

    /// A copy with every set override applied.
    ///
    /// The `azure_*` fields only take effect when the resulting model is an
    /// `azure_openai/*` model.
    #[must_use]
    pub fn with_overrides(&self, overrides: &ConfigOverrides) -> Self {
        let mut config = self.clone();

        if let Some(model) = &overrides.model {
            config.model.clone_from(model);
        }
        if let Some(prompt) = &overrides.system_prompt {
            config.system_prompt.clone_from(prompt);
        }
        if let Some(n) = overrides.max_search_results {
            config.max_search_results = n;
        }
        if let Some(n) = overrides.max_steps {
            config.max_steps = n;
        }
        if !config.uses_azure_openai() {
            return config;
        }

        if let Some(endpoint) = &overrides.azure_endpoint {
            config.model_settings.api_base = Some(endpoint.clone());
        }
        if let Some(key) = &overrides.azure_api_key {
            config.model_settings.api_key = Some(key.clone());
        }
        if let Some(version) = &overrides.azure_api_version {
            config.model_settings.api_version = Some(version.clone());
        }
        if let Some(deployment) = &overrides.azure_deployment_name {
            config.model_settings.deployment = Some(deployment.clone());
        }

        config
    }

    pub fn uses_azure_openai(&self) -> bool {
        parse_model_name(&self.model).is_ok_and(|(provider, _)| provider == AZURE_PROVIDER)
    }
}

fn parse_count(value: Option<String>, key: &str) -> Result<Option<usize>> {
    value
        .map(|v| {
            v.trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| HrError::Config(format!("{key} must be a positive integer, got '{v}'")))
        })
        .transpose()
}

/// Caller-supplied settings that take precedence over the environment
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub max_search_results: Option<usize>,
    pub max_steps: Option<usize>,
    pub azure_endpoint: Option<String>,
    pub azure_api_key: Option<String>,
    pub azure_api_version: Option<String>,
    pub azure_deployment_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_vars(vars: &[(&str, &str)]) -> Result<Configuration> {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        Configuration::from_lookup(|key| vars.get(key).map(|v| (*v).to_string()))
    }

    #[test]
    fn test_defaults() {
        let config = from_vars(&[]).unwrap();
        assert_eq!(config.model, "azure_openai/gpt-4o-mini");
        assert_eq!(config.max_search_results, 5);
        assert_eq!(config.max_steps, 10);
        assert_eq!(config.search_backend, SearchBackend::Azure);
        assert_eq!(config.search.missing().len(), 3);
    }

    #[test]
    fn test_environment_values() {
        let config = from_vars(&[
            ("HR_AGENT_MODEL", "openai/gpt-4o"),
            ("HR_MAX_SEARCH_RESULTS", "3"),
            ("HR_SEARCH_BACKEND", "mock"),
            ("COG_SEARCH_ENDPOINT", "https://hr.search.windows.net"),
            ("COG_SEARCH_KEY", "key"),
            ("COG_SEARCH_INDEX_NAME", "hr-docs"),
        ])
        .unwrap();

        assert_eq!(config.model, "openai/gpt-4o");
        assert_eq!(config.max_search_results, 3);
        assert_eq!(config.search_backend, SearchBackend::Mock);
        assert!(config.search.missing().is_empty());
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        assert!(matches!(from_vars(&[("HR_MAX_STEPS", "many")]), Err(HrError::Config(_))));
        assert!(matches!(from_vars(&[("HR_MAX_SEARCH_RESULTS", "0")]), Err(HrError::Config(_))));
        assert!(matches!(from_vars(&[("HR_SEARCH_BACKEND", "bing")]), Err(HrError::Config(_))));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let base = from_vars(&[("HR_MAX_SEARCH_RESULTS", "3")]).unwrap();
        let overrides: ConfigOverrides = serde_json::from_value(serde_json::json!({
            "model": "ollama/llama3.2",
            "max_search_results": 8,
            "azure_deployment_name": "hr-gpt"
        }))
        .unwrap();

        let config = base.with_overrides(&overrides);

        assert_eq!(config.model, "ollama/llama3.2");
        assert_eq!(config.max_search_results, 8);
        assert_eq!(config.max_steps, 10);
        // Not an Azure model, so the Azure deployment is ignored
        assert!(config.model_settings.deployment.is_none());
        // The base configuration is untouched
        assert_eq!(base.max_search_results, 3);
        assert_eq!(base.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_azure_overrides_only_apply_to_azure_models() {
        let base = from_vars(&[]).unwrap();
        let azure_fields = ConfigOverrides {
            azure_endpoint: Some("https://elsewhere.example".into()),
            azure_api_key: Some("caller-key".into()),
            azure_deployment_name: Some("hr-gpt".into()),
            ..Default::default()
        };

        let azure = base.with_overrides(&azure_fields);
        assert!(azure.uses_azure_openai());
        assert_eq!(azure.model_settings.api_base.as_deref(), Some("https://elsewhere.example"));
        assert_eq!(azure.model_settings.api_key.as_deref(), Some("caller-key"));

        let openai = base.with_overrides(&ConfigOverrides {
            model: Some("openai/gpt-4o".into()),
            ..azure_fields
        });
        assert!(!openai.uses_azure_openai());
        assert!(openai.model_settings.api_base.is_none());
        assert!(openai.model_settings.api_key.is_none());
        assert!(openai.model_settings.deployment.is_none());
    }
}
