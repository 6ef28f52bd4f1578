//! Provider Dispatch
//!
//! Resolves a provider-qualified model name (`provider/model`) into a ready
//! `LlmProvider` plus the generation options for that model.

use std::sync::Arc;

use agent_core::{
    error::{AgentError, Result},
    provider::{GenerationOptions, LlmProvider},
};

use crate::azure::{
    API_KEY_VAR, API_VERSION_VAR, AzureOpenAiConfig, AzureOpenAiProvider, DEFAULT_API_VERSION,
    DEPLOYMENT_VAR, ENDPOINT_VAR,
};
use crate::openai::{OpenAiConfig, OpenAiProvider};

/// Connection settings supplied by the caller.
///
/// Every field wins over the provider's environment variables when set.
#[derive(Clone, Debug, Default)]
pub struct ProviderSettings {
    pub api_base: Option<String>,
    pub api_key: Option<String>,
    pub api_version: Option<String>,
    pub deployment: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// A resolved model: the backend and the options to call it with
#[derive(Clone)]
pub struct LoadedModel {
    pub provider: Arc<dyn LlmProvider>,
    pub generation: GenerationOptions,
}

/// Environment lookup used by the constructors
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

type ProviderFactory = fn(&str, &str, &ProviderSettings, EnvLookup<'_>) -> Result<LoadedModel>;

/// Known provider prefixes. Anything else goes through [`build_generic`].
const PROVIDERS: &[(&str, ProviderFactory)] = &[
    ("azure_openai", build_azure_openai),
    ("openai", build_openai),
    #[cfg(feature = "ollama")]
    ("ollama", build_ollama),
];

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Split `provider/model` on the first `/`
pub fn parse_model_name(fully_specified: &str) -> Result<(&str, &str)> {
    match fully_specified.split_once('/') {
        Some((provider, model)) if !provider.is_empty() && !model.is_empty() => Ok((provider, model)),
        _ => Err(AgentError::Config(format!(
            "Model must be given as 'provider/model', got '{fully_specified}'"
        ))),
    }
}

/// Load a chat model using process environment variables as fallback
pub fn load_chat_model(fully_specified: &str, settings: &ProviderSettings) -> Result<LoadedModel> {
    load_chat_model_with(fully_specified, settings, &env_var)
}

/// Load a chat model with an explicit environment lookup
pub fn load_chat_model_with(
    fully_specified: &str,
    settings: &ProviderSettings,
    env: EnvLookup<'_>,
) -> Result<LoadedModel> {
    let (provider, model) = parse_model_name(fully_specified)?;

    let factory = PROVIDERS
        .iter()
        .find(|(name, _)| *name == provider)
        .map_or(build_generic as ProviderFactory, |(_, factory)| *factory);

    let loaded = factory(provider, model, settings, env)?;
    tracing::info!(provider = %loaded.provider.name(), model = %model, "Chat model loaded");
    Ok(loaded)
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn pick(explicit: Option<&String>, env: EnvLookup<'_>, key: &str) -> Option<String> {
    explicit.cloned().or_else(|| env(key))
}

/// Key for the resolved endpoint. An endpoint supplied by the caller never
/// gets the environment key; it must come with its own.
fn credential(settings: &ProviderSettings, env: EnvLookup<'_>, key: &str) -> Option<String> {
    if settings.api_base.is_some() {
        settings.api_key.clone()
    } else {
        pick(settings.api_key.as_ref(), env, key)
    }
}

fn generation_for(model: &str) -> GenerationOptions {
    GenerationOptions {
        model: model.to_string(),
        ..Default::default()
    }
}

fn build_azure_openai(
    _provider: &str,
    model: &str,
    settings: &ProviderSettings,
    env: EnvLookup<'_>,
) -> Result<LoadedModel> {
    let config = AzureOpenAiConfig {
        endpoint: pick(settings.api_base.as_ref(), env, ENDPOINT_VAR),
        api_key: credential(settings, env, API_KEY_VAR),
        api_version: pick(settings.api_version.as_ref(), env, API_VERSION_VAR)
            .unwrap_or_else(|| DEFAULT_API_VERSION.into()),
        deployment: pick(settings.deployment.as_ref(), env, DEPLOYMENT_VAR)
            .unwrap_or_else(|| model.to_string()),
        timeout_secs: settings.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
    };

    Ok(LoadedModel {
        provider: Arc::new(AzureOpenAiProvider::from_config(config)?),
        generation: generation_for(model),
    })
}

fn build_openai(
    _provider: &str,
    model: &str,
    settings: &ProviderSettings,
    env: EnvLookup<'_>,
) -> Result<LoadedModel> {
    let config = OpenAiConfig {
        base_url: settings
            .api_base
            .clone()
            .unwrap_or_else(|| OpenAiConfig::default().base_url),
        api_key: credential(settings, env, "OPENAI_API_KEY"),
        timeout_secs: settings.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        ..Default::default()
    };

    Ok(LoadedModel {
        provider: Arc::new(OpenAiProvider::from_config(config)?),
        generation: generation_for(model),
    })
}

#[cfg(feature = "ollama")]
fn build_ollama(
    _provider: &str,
    model: &str,
    settings: &ProviderSettings,
    env: EnvLookup<'_>,
) -> Result<LoadedModel> {
    let base_url = settings.api_base.clone().unwrap_or_else(|| {
        let host = env("OLLAMA_HOST").unwrap_or_else(|| "http://localhost".into());
        let port = env("OLLAMA_PORT")
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(11434);
        format!("{}:{port}/v1", host.trim_end_matches('/'))
    });

    let config = OpenAiConfig {
        label: "Ollama".into(),
        base_url,
        api_key: settings.api_key.clone(),
        timeout_secs: settings.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
    };

    Ok(LoadedModel {
        provider: Arc::new(OpenAiProvider::from_config(config)?),
        generation: generation_for(model),
    })
}

/// Fallback for unknown prefixes: an OpenAI-compatible endpoint at
/// `<PROVIDER>_API_BASE` with an optional `<PROVIDER>_API_KEY`
fn build_generic(
    provider: &str,
    model: &str,
    settings: &ProviderSettings,
    env: EnvLookup<'_>,
) -> Result<LoadedModel> {
    let prefix = provider.to_uppercase().replace('-', "_");
    let base_var = format!("{prefix}_API_BASE");

    let base_url = pick(settings.api_base.as_ref(), env, &base_var)
        .ok_or_else(|| AgentError::missing_config(provider, &[base_var.as_str()]))?;

    let config = OpenAiConfig {
        label: provider.to_string(),
        base_url,
        api_key: credential(settings, env, &format!("{prefix}_API_KEY")),
        timeout_secs: settings.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
    };

    Ok(LoadedModel {
        provider: Arc::new(OpenAiProvider::from_config(config)?),
        generation: generation_for(model),
    })
}
