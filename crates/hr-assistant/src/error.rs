//! Error Types for the HR Assistant

use agent_core::AgentError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HrError>;

#[derive(Error, Debug)]
pub enum HrError {
    /// Required search connection parameters are unset; holds their names
    #[error("Azure Search configuration missing: {}", .0.join(", "))]
    MissingSearchConfig(Vec<String>),

    #[error("Search service error: {0}")]
    Search(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Agent(#[from] AgentError),
}
