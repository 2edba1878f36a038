mod collaborators;
mod response;

pub use collaborators::{
    retrieve_multiple_queries, ClaimantFacts, CollaboratorError, EmploymentDates,
    HandbookRetriever, HandbookSection, QualitativeAssessor, RetrievalOptions, SectionMetadata,
};
pub use response::{AssessmentCategory, AssessmentError, AssessmentResult};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Retrieval settings for a full assessment.
pub const ASSESSMENT_MATCH_COUNT: usize = 5;
pub const ASSESSMENT_MATCH_THRESHOLD: f32 = 0.65;
const PRELIMINARY_MATCH_COUNT: usize = 3;
const PRELIMINARY_KEY_FACTORS: usize = 2;
const REQUIRED_EARNING_QUARTERS: usize = 4;
const DISQUALIFYING_TERMS: [&str; 3] = ["quit", "fired for cause", "misconduct"];

/// Qualitative layer of an eligibility report. Collaborator failures degrade
/// to `Unavailable` instead of failing the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QualitativeOutcome {
    Assessed {
        result: AssessmentResult,
        cited_sections: Vec<String>,
    },
    Skipped {
        reason: String,
    },
    Unavailable {
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactField {
    SeparationReason,
    QuarterlyEarnings,
}

impl FactField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FactField::SeparationReason => "separation_reason",
            FactField::QuarterlyEarnings => "quarterly_earnings",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikelihoodRange {
    LikelyEligible,
    Uncertain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreliminaryAssessment {
    pub likelihood_range: LikelihoodRange,
    pub key_factors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialAssessment {
    pub can_assess: bool,
    pub missing_fields: Vec<FactField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preliminary_assessment: Option<PreliminaryAssessment>,
}

fn separation_reason(facts: &ClaimantFacts) -> Option<&str> {
    facts
        .separation_reason
        .as_deref()
        .map(str::trim)
        .filter(|reason| !reason.is_empty())
}

pub fn missing_facts(facts: &ClaimantFacts) -> Vec<FactField> {
    let mut missing = Vec::new();
    if separation_reason(facts).is_none() {
        missing.push(FactField::SeparationReason);
    }
    if facts.quarterly_earnings.len() < REQUIRED_EARNING_QUARTERS {
        missing.push(FactField::QuarterlyEarnings);
    }
    missing
}

/// Retrieval queries for a full assessment: the separation reason, plus the
/// separation type when one was given. Empty without a reason.
pub fn assessment_queries(facts: &ClaimantFacts) -> Vec<String> {
    let Some(reason) = separation_reason(facts) else {
        return Vec::new();
    };
    let state = &facts.state_code;
    let mut queries = vec![format!("{reason} unemployment eligibility {state}")];
    if let Some(kind) = facts
        .separation_type
        .as_deref()
        .map(str::trim)
        .filter(|kind| !kind.is_empty())
    {
        queries.push(format!("{kind} separation unemployment {state}"));
    }
    queries
}

/// Retrieves handbook law for the claimant's separation and asks the
/// assessor for a judgment. Never fails; problems surface in the outcome.
pub fn run_assessment<R, A>(
    retriever: &R,
    assessor: &A,
    facts: &ClaimantFacts,
    options: &RetrievalOptions,
) -> QualitativeOutcome
where
    R: HandbookRetriever + ?Sized,
    A: QualitativeAssessor + ?Sized,
{
    let queries = assessment_queries(facts);
    if queries.is_empty() {
        return QualitativeOutcome::Skipped {
            reason: "no separation reason was provided".to_string(),
        };
    }

    let sections =
        match retrieve_multiple_queries(retriever, &queries, &facts.state_code, options) {
            Ok(mut sections) => {
                sections.truncate(options.match_count);
                sections
            }
            Err(err) => {
                warn!(state = %facts.state_code, error = %err, "handbook retrieval unavailable");
                return QualitativeOutcome::Unavailable {
                    reason: err.to_string(),
                };
            }
        };

    let raw = match assessor.assess(facts, &sections) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(state = %facts.state_code, error = %err, "qualitative assessor unavailable");
            return QualitativeOutcome::Unavailable {
                reason: err.to_string(),
            };
        }
    };

    match AssessmentResult::parse(&raw) {
        Ok(mut result) => {
            let dropped =
                result.retain_known_citations(sections.iter().map(|s| s.section_id.as_str()));
            if !dropped.is_empty() {
                warn!(state = %facts.state_code, ?dropped, "assessment cited unknown sections");
            }
            debug!(
                state = %facts.state_code,
                assessment = ?result.assessment,
                "qualitative assessment complete"
            );
            let cited_sections = result.key_citations.clone();
            QualitativeOutcome::Assessed {
                result,
                cited_sections,
            }
        }
        Err(err) => {
            warn!(state = %facts.state_code, error = %err, "rejected assessment response");
            QualitativeOutcome::Unavailable {
                reason: err.to_string(),
            }
        }
    }
}

/// Reports which facts block a full assessment and, given a separation
/// reason, a preliminary likelihood range.
pub fn run_partial_assessment<R>(
    retriever: &R,
    facts: &ClaimantFacts,
    options: &RetrievalOptions,
) -> PartialAssessment
where
    R: HandbookRetriever + ?Sized,
{
    let missing_fields = missing_facts(facts);
    if missing_fields.is_empty() {
        return PartialAssessment {
            can_assess: true,
            missing_fields,
            preliminary_assessment: None,
        };
    }

    let preliminary_assessment = separation_reason(facts).map(|reason| {
        let lowered = reason.to_lowercase();
        let likelihood_range = if DISQUALIFYING_TERMS.iter().any(|term| lowered.contains(term)) {
            LikelihoodRange::Uncertain
        } else {
            LikelihoodRange::LikelyEligible
        };

        let preliminary_options = RetrievalOptions {
            match_count: PRELIMINARY_MATCH_COUNT,
            ..options.clone()
        };
        let retrieved = retriever.retrieve(reason, &facts.state_code, &preliminary_options);
        let key_factors = match retrieved {
            Ok(sections) => sections
                .into_iter()
                .take(PRELIMINARY_KEY_FACTORS)
                .map(|section| section.section_id)
                .collect(),
            Err(err) => {
                warn!(state = %facts.state_code, error = %err, "preliminary retrieval unavailable");
                Vec::new()
            }
        };

        PreliminaryAssessment {
            likelihood_range,
            key_factors,
        }
    });

    PartialAssessment {
        can_assess: false,
        missing_fields,
        preliminary_assessment,
    }
}
