use crate::workflows::eligibility::rules::StateCode;
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Excerpt from a state unemployment handbook returned by retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandbookSection {
    pub section_id: String,
    pub content: String,
    pub similarity: f32,
    #[serde(default)]
    pub metadata: SectionMetadata,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SectionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalOptions {
    pub match_count: usize,
    pub match_threshold: f32,
    pub effective_year: i32,
}

impl RetrievalOptions {
    /// Options for handbooks effective in the current calendar year.
    pub fn new(match_count: usize, match_threshold: f32) -> Self {
        Self {
            match_count,
            match_threshold,
            effective_year: Local::now().year(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmploymentDates {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Facts about the claimant's separation handed to the qualitative assessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimantFacts {
    pub state_code: StateCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separation_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment_dates: Option<EmploymentDates>,
    /// Oldest to newest.
    #[serde(default)]
    pub quarterly_earnings: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
    #[error("collaborator request failed: {0}")]
    Request(String),
    #[error("collaborator returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// Semantic search over handbook excerpts for one state.
pub trait HandbookRetriever: Send + Sync {
    /// Returns sections in descending similarity; an empty list is not an error.
    fn retrieve(
        &self,
        query: &str,
        state: &StateCode,
        options: &RetrievalOptions,
    ) -> Result<Vec<HandbookSection>, CollaboratorError>;
}

/// Produces a raw, untrusted likelihood judgment for the claimant's facts.
pub trait QualitativeAssessor: Send + Sync {
    fn assess(
        &self,
        facts: &ClaimantFacts,
        sections: &[HandbookSection],
    ) -> Result<String, CollaboratorError>;
}

/// Runs several queries and merges the hits by section id, keeping the best
/// similarity per section. Failing queries are skipped unless all of them fail.
pub fn retrieve_multiple_queries<R: HandbookRetriever + ?Sized>(
    retriever: &R,
    queries: &[String],
    state: &StateCode,
    options: &RetrievalOptions,
) -> Result<Vec<HandbookSection>, CollaboratorError> {
    let mut merged: HashMap<String, HandbookSection> = HashMap::new();
    let mut last_error = None;
    let mut succeeded = false;

    for query in queries {
        match retriever.retrieve(query, state, options) {
            Ok(sections) => {
                succeeded = true;
                for section in sections {
                    match merged.get(&section.section_id) {
                        Some(existing) if existing.similarity >= section.similarity => {}
                        _ => {
                            merged.insert(section.section_id.clone(), section);
                        }
                    }
                }
            }
            Err(err) => {
                warn!(%state, query = %query, error = %err, "handbook query failed");
                last_error = Some(err);
            }
        }
    }

    if let (false, Some(err)) = (succeeded, last_error) {
        return Err(err);
    }

    let mut sections: Vec<HandbookSection> = merged.into_values().collect();
    sections.sort_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then_with(|| a.section_id.cmp(&b.section_id))
    });
    Ok(sections)
}
