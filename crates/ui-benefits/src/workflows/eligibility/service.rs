use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::assessment::{
    missing_facts, run_assessment, run_partial_assessment, AssessmentCategory, ClaimantFacts,
    EmploymentDates, HandbookRetriever, PartialAssessment, QualitativeAssessor,
    QualitativeOutcome, RetrievalOptions, ASSESSMENT_MATCH_COUNT, ASSESSMENT_MATCH_THRESHOLD,
};
use super::benefits::{
    BenefitCalculation, BenefitCalculator, BenefitEstimateError, WeeklyBenefitEstimate,
};
use super::localization::{assessment_label, Language};
use super::monetary::{
    EligibilityError, MonetaryEligibilityEngine, MonetaryEligibilityResult, MonetaryInputs,
    RequiredInputs,
};
use super::rules::RuleStore;

/// Request for the combined monetary, qualitative and benefit report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityReportRequest {
    pub state_code: String,
    pub inputs: MonetaryInputs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separation_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment_dates: Option<EmploymentDates>,
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentLabel {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityReport {
    pub monetary: MonetaryEligibilityResult,
    pub qualitative: QualitativeOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualitative_label: Option<AssessmentLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preliminary: Option<PartialAssessment>,
    pub benefits: BenefitCalculation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_estimate: Option<WeeklyBenefitEstimate>,
}

/// Service composing the monetary engine, benefit calculator and the
/// external retrieval and assessment collaborators.
pub struct EligibilityService<R, A> {
    engine: MonetaryEligibilityEngine,
    benefits: BenefitCalculator,
    retriever: Arc<R>,
    assessor: Arc<A>,
    retrieval: RetrievalOptions,
}

impl<R, A> EligibilityService<R, A>
where
    R: HandbookRetriever + 'static,
    A: QualitativeAssessor + 'static,
{
    pub fn new(store: Arc<RuleStore>, retriever: Arc<R>, assessor: Arc<A>) -> Self {
        Self {
            engine: MonetaryEligibilityEngine::new(Arc::clone(&store)),
            benefits: BenefitCalculator::new(store),
            retriever,
            assessor,
            retrieval: RetrievalOptions::new(ASSESSMENT_MATCH_COUNT, ASSESSMENT_MATCH_THRESHOLD),
        }
    }

    pub fn with_retrieval_options(mut self, retrieval: RetrievalOptions) -> Self {
        self.retrieval = retrieval;
        self
    }

    pub fn store(&self) -> &RuleStore {
        self.engine.store()
    }

    pub fn engine(&self) -> &MonetaryEligibilityEngine {
        &self.engine
    }

    pub fn retrieval_options(&self) -> &RetrievalOptions {
        &self.retrieval
    }

    pub fn required_inputs(&self, state_code: &str) -> Result<RequiredInputs, EligibilityError> {
        self.engine.required_inputs(state_code)
    }

    pub fn run_monetary_eligibility(
        &self,
        state_code: &str,
        inputs: &MonetaryInputs,
        language: Language,
    ) -> Result<MonetaryEligibilityResult, EligibilityError> {
        self.engine.run_localized(state_code, inputs, language)
    }

    pub fn calculate_benefits(
        &self,
        state_code: &str,
        quarterly_earnings: &[f64],
    ) -> BenefitCalculation {
        self.benefits
            .calculate_benefits(state_code, quarterly_earnings)
    }

    pub fn estimate_weekly_benefit(
        &self,
        state_code: &str,
        quarterly_earnings: &[f64],
    ) -> Result<WeeklyBenefitEstimate, BenefitEstimateError> {
        self.benefits.estimate_weekly_benefit(state_code, quarterly_earnings)
    }

    pub fn partial_assessment(&self, facts: &ClaimantFacts) -> PartialAssessment {
        run_partial_assessment(self.retriever.as_ref(), facts, &self.retrieval)
    }

    /// Runs monetary eligibility, then the qualitative layer when the claimant
    /// is monetarily eligible, and attaches benefit figures.
    pub fn report(
        &self,
        request: &EligibilityReportRequest,
    ) -> Result<EligibilityReport, EligibilityError> {
        let monetary = self.engine.run_localized(
            &request.state_code,
            &request.inputs,
            request.language,
        )?;

        // Only a breakdown the claimant reported; questionnaire splits are not earnings.
        let quarterly_earnings = request.inputs.quarterly_wages.clone();

        let facts = ClaimantFacts {
            state_code: monetary.state_code.clone(),
            separation_type: request.separation_type.clone(),
            separation_reason: request.separation_reason.clone(),
            employment_dates: request.employment_dates.clone(),
            quarterly_earnings,
        };

        let (qualitative, preliminary) = if !monetary.eligible {
            (
                QualitativeOutcome::Skipped {
                    reason: "monetary eligibility requirements are not met".to_string(),
                },
                None,
            )
        } else if !missing_facts(&facts).is_empty() {
            let partial = self.partial_assessment(&facts);
            let missing = partial
                .missing_fields
                .iter()
                .map(|field| field.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            (
                QualitativeOutcome::Skipped {
                    reason: format!("missing facts: {missing}"),
                },
                Some(partial),
            )
        } else {
            (
                run_assessment(
                    self.retriever.as_ref(),
                    self.assessor.as_ref(),
                    &facts,
                    &self.retrieval,
                ),
                None,
            )
        };

        let qualitative_label = match &qualitative {
            QualitativeOutcome::Assessed { result, .. } => {
                Some(label_for(result.assessment, request.language))
            }
            _ => None,
        };

        let benefits = self
            .benefits
            .calculate_benefits(&request.state_code, &facts.quarterly_earnings);
        let weekly_estimate = self
            .benefits
            .estimate_weekly_benefit(&request.state_code, &facts.quarterly_earnings)
            .ok();

        info!(
            state = %monetary.state_code,
            eligible = monetary.eligible,
            assessed = matches!(qualitative, QualitativeOutcome::Assessed { .. }),
            "eligibility report generated"
        );

        Ok(EligibilityReport {
            monetary,
            qualitative,
            qualitative_label,
            preliminary,
            benefits,
            weekly_estimate,
        })
    }
}

fn label_for(category: AssessmentCategory, language: Language) -> AssessmentLabel {
    let (title, description) = assessment_label(category, language);
    AssessmentLabel {
        title: title.to_string(),
        description: description.to_string(),
    }
}
