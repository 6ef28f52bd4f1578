//! Source Citations
//!
//! The model is told never to write its own sources section. Instead the
//! agent loop appends one built from the documents the last search returned.

use serde::{Deserialize, Serialize};

/// Marker that opens an appended sources block
pub const SOURCES_MARKER: &str = "**Sources:**";

/// Literal marker the model uses to flag a general-knowledge answer
pub const GENERAL_KNOWLEDGE_NOTE: &str = "NOTE:";

/// Phrases (matched case-insensitively) that disclaim the knowledge base
pub const GENERAL_KNOWLEDGE_PHRASES: &[&str] =
    &["not from the knowledge base", "from my general knowledge"];

/// A document returned by the knowledge-base search
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Document title, used as the citation label
    #[serde(default)]
    pub title: String,

    /// Text body
    #[serde(default)]
    pub content: String,

    #[serde(default, rename = "keyPhrases")]
    pub key_phrases: Vec<String>,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub document_type: String,

    /// Relevance score, higher is more relevant
    #[serde(default)]
    pub score: f64,
}

impl SearchResult {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }
}

/// Distinct non-empty titles in first-seen order
pub fn extract_sources(results: &[SearchResult]) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();
    for result in results {
        if !result.title.is_empty() && !sources.contains(&result.title) {
            sources.push(result.title.clone());
        }
    }
    sources
}

/// Pull the `results` list out of a tool payload.
///
/// Returns `None` when the payload is not a JSON object or has no
/// well-formed `results` field.
pub fn results_from_payload(payload: &serde_json::Value) -> Option<Vec<SearchResult>> {
    let results = payload.as_object()?.get("results")?;
    match serde_json::from_value(results.clone()) {
        Ok(results) => Some(results),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring malformed search results payload");
            None
        }
    }
}

/// Same as [`results_from_payload`] for raw tool output text
pub fn results_from_text(text: &str) -> Option<Vec<SearchResult>> {
    let trimmed = text.trim_start();
    if !trimmed.starts_with('{') {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => results_from_payload(&value),
        Err(e) => {
            tracing::debug!(error = %e, "Tool output is not JSON");
            None
        }
    }
}

/// Whether the answer says it came from general knowledge rather than documents
pub fn is_general_knowledge(text: &str) -> bool {
    if text.contains(GENERAL_KNOWLEDGE_NOTE) {
        return true;
    }
    let lowered = text.to_lowercase();
    GENERAL_KNOWLEDGE_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
}

/// Render the trailing sources block
pub fn format_sources_block(sources: &[String]) -> String {
    let lines: Vec<String> = sources.iter().map(|s| format!("- {s}")).collect();
    format!("\n\n{SOURCES_MARKER}\n{}", lines.join("\n"))
}

/// Append a sources block to a final answer when it is backed by documents.
///
/// Skipped when there are no sources, when the answer already has a sources
/// block, or when it disclaims the knowledge base.
pub fn apply_citations(answer: &str, sources: &[String]) -> String {
    if sources.is_empty() || answer.contains(SOURCES_MARKER) || is_general_knowledge(answer) {
        return answer.to_string();
    }
    format!("{answer}{}", format_sources_block(sources))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(titles: &[&str]) -> Vec<SearchResult> {
        titles.iter().map(|t| SearchResult::new(*t, "body")).collect()
    }

    #[test]
    fn test_extract_sources_dedupes_in_order() {
        let results = titled(&["Vacation Policy", "Vacation Policy", "Benefits Guide"]);
        assert_eq!(extract_sources(&results), vec!["Vacation Policy", "Benefits Guide"]);
    }

    #[test]
    fn test_extract_sources_skips_empty_and_is_stable() {
        let results = titled(&["", "Travel Policy", "", "Travel Policy"]);
        let first = extract_sources(&results);
        assert_eq!(first, vec!["Travel Policy"]);
        assert_eq!(extract_sources(&results), first);
    }

    #[test]
    fn test_apply_citations_appends_block() {
        let sources = vec!["Vacation Policy".to_string(), "Benefits Guide".to_string()];
        let answer = apply_citations("You get **20 days** of PTO.", &sources);
        assert_eq!(
            answer,
            "You get **20 days** of PTO.\n\n**Sources:**\n- Vacation Policy\n- Benefits Guide"
        );
    }

    #[test]
    fn test_apply_citations_skips_existing_marker() {
        let sources = vec!["Vacation Policy".to_string()];
        let answer = "PTO is 20 days.\n\n**Sources:**\n- Handbook";
        assert_eq!(apply_citations(answer, &sources), answer);
    }

    #[test]
    fn test_apply_citations_skips_general_knowledge() {
        let sources = vec!["Vacation Policy".to_string()];
        for answer in [
            "**NOTE:** generic advice follows.",
            "This data is Not From The Knowledge Base.",
            "Answering FROM MY GENERAL KNOWLEDGE: ...",
        ] {
            assert_eq!(apply_citations(answer, &sources), answer);
        }
    }

    #[test]
    fn test_note_marker_is_case_sensitive() {
        assert!(!is_general_knowledge("a footnote: see below"));
        assert!(is_general_knowledge("NOTE: general"));
    }

    #[test]
    fn test_apply_citations_without_sources() {
        assert_eq!(apply_citations("Hello!", &[]), "Hello!");
    }

    #[test]
    fn test_results_from_payload() {
        let payload = serde_json::json!({
            "results": [{"title": "Benefits Guide", "content": "...", "keyPhrases": ["dental"], "score": 2.5}],
            "total_count": 1,
            "query": "dental",
        });
        let results = results_from_payload(&payload).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].key_phrases, vec!["dental"]);
        assert!((results[0].score - 2.5).abs() < f64::EPSILON);

        assert!(results_from_payload(&serde_json::json!({"error": "down"})).is_none());
        assert!(results_from_payload(&serde_json::json!({"results": "nope"})).is_none());
    }

    #[test]
    fn test_results_from_text_ignores_non_json() {
        assert!(results_from_text("plain text").is_none());
        assert!(results_from_text("{broken").is_none());
        assert_eq!(
            results_from_text(r#"{"results": [], "total_count": 0}"#),
            Some(Vec::new())
        );
    }
}
