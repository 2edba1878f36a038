//! Unemployment-insurance monetary eligibility, benefit figures and the
//! qualitative assessment layer.
//!
//! State rules are loaded once into a [`RuleStore`] and shared read-only. The
//! monetary engine and benefit calculator are pure functions over that store;
//! handbook retrieval and the qualitative assessor are collaborators behind
//! traits so their failures only degrade the qualitative part of a report.

pub mod assessment;
pub mod benefits;
pub mod localization;
pub mod monetary;
pub mod router;
pub mod rules;
pub mod service;

#[cfg(test)]
mod tests;

pub use assessment::{
    AssessmentCategory, AssessmentResult, ClaimantFacts, CollaboratorError, HandbookRetriever,
    HandbookSection, PartialAssessment, QualitativeAssessor, QualitativeOutcome,
    RetrievalOptions,
};
pub use benefits::{BenefitCalculation, BenefitCalculator, WeeklyBenefitEstimate};
pub use localization::Language;
pub use monetary::{
    CheckResult, EligibilityError, InputField, MonetaryEligibilityEngine,
    MonetaryEligibilityResult, MonetaryInputs, RequiredInputs,
};
pub use router::eligibility_router;
pub use rules::{ModuleKind, RuleStore, RuleStoreError, StateCode, StateRuleBatch};
pub use service::{EligibilityReport, EligibilityReportRequest, EligibilityService};
