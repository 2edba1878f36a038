use std::sync::{Arc, Mutex};

use axum::body::to_bytes;
use axum::response::Response;
use serde_json::Value;

use crate::workflows::eligibility::assessment::{
    ClaimantFacts, CollaboratorError, HandbookRetriever, HandbookSection, QualitativeAssessor,
    RetrievalOptions, SectionMetadata,
};
use crate::workflows::eligibility::monetary::{MonetaryEligibilityEngine, MonetaryInputs};
use crate::workflows::eligibility::rules::{RuleStore, StateCode};
use crate::workflows::eligibility::service::EligibilityService;

pub(super) fn store() -> Arc<RuleStore> {
    Arc::new(RuleStore::embedded().expect("embedded dataset loads"))
}

pub(super) fn engine() -> MonetaryEligibilityEngine {
    MonetaryEligibilityEngine::new(store())
}

/// Single-state store keyed `XX` for exercising one module in isolation.
pub(super) fn custom_store(
    primary_module: &str,
    checks: &str,
    wage_context: &str,
) -> Arc<RuleStore> {
    let raw = format!(
        r#"{{
            "metadata": {{"source": "fixture", "title": "fixture", "effective_year": 2025, "version": "test"}},
            "states": {{
                "XX": {{
                    "state_code": "XX",
                    "state_name": "Testland",
                    "primary_module": "{primary_module}",
                    "weekly_benefit": {{"min_wba": 50, "max_wba": 500, "divisor": 25}},
                    "duration": {{"min_weeks": 12, "max_weeks": 26}},
                    "wage_context": {wage_context},
                    "checks": {checks}
                }}
            }}
        }}"#
    );
    Arc::new(RuleStore::from_json(&raw).expect("fixture dataset is valid"))
}

pub(super) fn custom_engine(primary_module: &str, checks: &str) -> MonetaryEligibilityEngine {
    MonetaryEligibilityEngine::new(custom_store(primary_module, checks, "{}"))
}

pub(super) fn quarters(values: &[f64]) -> MonetaryInputs {
    MonetaryInputs::with_quarters(values.iter().sum(), values.to_vec())
}

pub(super) fn section(id: &str, similarity: f32) -> HandbookSection {
    HandbookSection {
        section_id: id.to_string(),
        content: format!("Handbook text for {id}."),
        similarity,
        metadata: SectionMetadata {
            section_title: Some(format!("Section {id}")),
            ..SectionMetadata::default()
        },
    }
}

pub(super) fn facts(state: &str, reason: Option<&str>, earnings: &[f64]) -> ClaimantFacts {
    ClaimantFacts {
        state_code: StateCode::parse(state).expect("valid state"),
        separation_type: None,
        separation_reason: reason.map(str::to_string),
        employment_dates: None,
        quarterly_earnings: earnings.to_vec(),
    }
}

/// Retriever returning canned sections and recording every query it sees.
#[derive(Default)]
pub(super) struct StubRetriever {
    pub(super) sections: Vec<HandbookSection>,
    pub(super) queries: Mutex<Vec<(String, usize)>>,
}

impl StubRetriever {
    pub(super) fn with_sections(sections: Vec<HandbookSection>) -> Self {
        Self {
            sections,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().expect("queries mutex poisoned").clone()
    }
}

impl HandbookRetriever for StubRetriever {
    fn retrieve(
        &self,
        query: &str,
        _state: &StateCode,
        options: &RetrievalOptions,
    ) -> Result<Vec<HandbookSection>, CollaboratorError> {
        self.queries
            .lock()
            .expect("queries mutex poisoned")
            .push((query.to_string(), options.match_count));
        Ok(self
            .sections
            .iter()
            .filter(|section| section.similarity >= options.match_threshold)
            .take(options.match_count)
            .cloned()
            .collect())
    }
}

pub(super) struct FailingRetriever;

impl HandbookRetriever for FailingRetriever {
    fn retrieve(
        &self,
        _query: &str,
        _state: &StateCode,
        _options: &RetrievalOptions,
    ) -> Result<Vec<HandbookSection>, CollaboratorError> {
        Err(CollaboratorError::Unavailable("vector store offline".to_string()))
    }
}

pub(super) struct StubAssessor {
    pub(super) response: String,
}

impl StubAssessor {
    pub(super) fn responding(response: &str) -> Self {
        Self {
            response: response.to_string(),
        }
    }
}

impl QualitativeAssessor for StubAssessor {
    fn assess(
        &self,
        _facts: &ClaimantFacts,
        _sections: &[HandbookSection],
    ) -> Result<String, CollaboratorError> {
        Ok(self.response.clone())
    }
}

pub(super) struct FailingAssessor;

impl QualitativeAssessor for FailingAssessor {
    fn assess(
        &self,
        _facts: &ClaimantFacts,
        _sections: &[HandbookSection],
    ) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::Request("model timed out".to_string()))
    }
}

pub(super) const LIKELY_RESPONSE: &str = "```json\n{\n  \"assessment\": \"likely\",\n  \"confidence_score\": 70,\n  \"risk_factors\": [\"employer may contest\"],\n  \"reasoning_summary\": \"Laid off for lack of work.\",\n  \"key_citations\": [\"CA-1253\"]\n}\n```";

pub(super) fn handbook() -> Vec<HandbookSection> {
    vec![
        section("CA-1253", 0.91),
        section("CA-1256", 0.84),
        section("CA-1030", 0.72),
        section("CA-0001", 0.40),
    ]
}

pub(super) fn service<A: QualitativeAssessor + 'static>(
    assessor: A,
) -> Arc<EligibilityService<StubRetriever, A>> {
    Arc::new(EligibilityService::new(
        store(),
        Arc::new(StubRetriever::with_sections(handbook())),
        Arc::new(assessor),
    ))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
