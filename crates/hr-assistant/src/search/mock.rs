//! Mock Search Client
//!
//! For local runs and tests. Serves a handful of static HR documents ranked
//! by how many query terms they contain.

use agent_core::SearchResult;
use async_trait::async_trait;

use super::SearchClient;
use crate::error::Result;

struct Document {
    title: &'static str,
    content: &'static str,
    key_phrases: &'static [&'static str],
    category: &'static str,
}

const DOCUMENTS: &[Document] = &[
    Document {
        title: "Travel Policy.pdf",
        content: "Employees must book economy class for flights under six hours. \
                  Hotel stays are reimbursed up to the city rate published by Finance. \
                  Travel requests need manager approval at least two weeks in advance.",
        key_phrases: &["travel", "flights", "hotel", "reimbursement"],
        category: "Policy",
    },
    Document {
        title: "Vacation and Leave Policy.pdf",
        content: "Full-time employees accrue 20 vacation days per year. \
                  Up to 5 unused days carry over into the next calendar year. \
                  Parental leave is 16 weeks at full pay.",
        key_phrases: &["vacation", "leave", "parental leave", "carry over"],
        category: "Policy",
    },
    Document {
        title: "Benefits Overview 2024.docx",
        content: "The company covers 90% of medical premiums for employees and 75% for dependents. \
                  Dental and vision plans are optional. The 401k match is 100% of the first 4% contributed.",
        key_phrases: &["benefits", "medical", "dental", "401k"],
        category: "Benefits",
    },
    Document {
        title: "Remote Work Guidelines.pdf",
        content: "Employees may work remotely up to three days per week with manager agreement. \
                  A one-time home office stipend of $500 is available.",
        key_phrases: &["remote work", "home office", "stipend"],
        category: "Guidelines",
    },
    Document {
        title: "Code of Conduct.pdf",
        content: "Harassment and discrimination are not tolerated. \
                  Concerns can be raised with HR or through the anonymous ethics hotline.",
        key_phrases: &["conduct", "harassment", "ethics"],
        category: "Policy",
    },
];

/// Mock search client over static documents
#[derive(Default)]
pub struct MockSearchClient;

impl MockSearchClient {
    pub fn new() -> Self {
        Self
    }

    fn score(document: &Document, terms: &[String]) -> f64 {
        let haystack = format!(
            "{} {} {}",
            document.title,
            document.content,
            document.key_phrases.join(" ")
        )
        .to_lowercase();

        let hits = terms.iter().filter(|term| haystack.contains(term.as_str())).count();
        hits as f64
    }
}

#[async_trait]
impl SearchClient for MockSearchClient {
    async fn search(&self, query: &str, top: usize) -> Result<Vec<SearchResult>> {
        let terms: Vec<String> = query
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.len() > 2)
            .map(str::to_lowercase)
            .collect();

        let mut scored: Vec<(f64, &Document)> = DOCUMENTS
            .iter()
            .map(|doc| (Self::score(doc, &terms), doc))
            .filter(|(score, _)| *score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(top)
            .map(|(score, doc)| SearchResult {
                title: doc.title.into(),
                content: doc.content.into(),
                key_phrases: doc.key_phrases.iter().map(|p| (*p).to_string()).collect(),
                category: doc.category.into(),
                document_type: doc.title.rsplit('.').next().unwrap_or_default().into(),
                score,
            })
            .collect())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "MockSearch"
    }
}
