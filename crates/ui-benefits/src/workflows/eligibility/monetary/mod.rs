pub mod format;
mod inputs;
mod modules;
mod outcome;

pub use inputs::{InputField, InputViolation, MonetaryInputs, WageFacts, MAX_QUARTERS};
pub use modules::{DEFAULT_STATE_AVERAGE_ANNUAL_WAGE, FEDERAL_MINIMUM_WAGE};
pub use outcome::{
    CheckDetail, CheckResult, CountUnit, MonetaryEligibilityResult, RequiredInputs,
    ThresholdDerivation,
};

use super::localization::{self, Language};
use super::rules::{CheckRule, RuleStore, StateNotSupported, StateRuleBatch};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EligibilityError {
    #[error(transparent)]
    StateNotSupported(#[from] StateNotSupported),
    #[error("malformed monetary inputs: {0}")]
    MalformedInput(#[from] InputViolation),
}

/// Evaluates a state's monetary checks against claimant wage facts.
///
/// The engine holds no per-request state; identical inputs always produce
/// identical results.
#[derive(Debug, Clone)]
pub struct MonetaryEligibilityEngine {
    store: Arc<RuleStore>,
}

impl MonetaryEligibilityEngine {
    pub fn new(store: Arc<RuleStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &RuleStore {
        &self.store
    }

    /// Inputs the state's required checks read. Informational checks never
    /// make a field mandatory.
    pub fn required_inputs(&self, state_code: &str) -> Result<RequiredInputs, EligibilityError> {
        let batch = self.store.get_state_batch(state_code)?;
        Ok(required_inputs_for(batch))
    }

    pub fn run_monetary_eligibility(
        &self,
        state_code: &str,
        inputs: &MonetaryInputs,
    ) -> Result<MonetaryEligibilityResult, EligibilityError> {
        self.run_localized(state_code, inputs, Language::English)
    }

    /// Same evaluation as [`Self::run_monetary_eligibility`] with display
    /// strings rendered in `language`.
    pub fn run_localized(
        &self,
        state_code: &str,
        inputs: &MonetaryInputs,
        language: Language,
    ) -> Result<MonetaryEligibilityResult, EligibilityError> {
        let batch = self.store.get_state_batch(state_code)?;
        let facts = WageFacts::from_inputs(inputs)?;

        let mut checks = Vec::with_capacity(batch.checks.len());
        let mut missing = BTreeSet::new();
        for check in &batch.checks {
            match modules::evaluate(&check.rule, &facts, batch) {
                Ok(detail) => checks.push(CheckResult::new(
                    check.module(),
                    check.required,
                    detail,
                    language,
                )),
                Err(field) if check.required => {
                    missing.insert(field);
                }
                Err(field) => {
                    debug!(
                        state = %batch.state_code,
                        module = %check.module(),
                        %field,
                        "skipping informational check without input"
                    );
                }
            }
        }

        let missing_inputs: Vec<InputField> = missing.into_iter().collect();
        let failed_requirements: Vec<String> = checks
            .iter()
            .filter(|check| check.required && !check.passed)
            .map(|check| check.explanation.clone())
            .collect();
        let eligible = missing_inputs.is_empty() && failed_requirements.is_empty();

        let summary = if missing_inputs.is_empty() {
            localization::summary(language, &batch.state_name, failed_requirements.len())
        } else {
            let required = required_inputs_for(batch);
            localization::missing_summary(
                language,
                &missing_inputs,
                required.min_hours,
                required.min_weeks,
            )
        };

        debug!(
            state = %batch.state_code,
            eligible,
            checks = checks.len(),
            failed = failed_requirements.len(),
            missing = missing_inputs.len(),
            "monetary eligibility evaluated"
        );

        Ok(MonetaryEligibilityResult {
            state_code: batch.state_code.clone(),
            state_name: batch.state_name.clone(),
            eligible,
            language,
            checks,
            failed_requirements,
            missing_inputs,
            summary,
        })
    }
}

fn required_inputs_for(batch: &StateRuleBatch) -> RequiredInputs {
    let mut fields = BTreeSet::from([InputField::BasePeriodWages]);
    let mut min_hours = None;
    let mut min_weeks = None;
    for check in batch.required_checks() {
        fields.extend(modules::input_fields(&check.rule));
        match check.rule {
            CheckRule::HoursWorked { min_hours: hours } => {
                min_hours = Some(min_hours.map_or(hours, |current: u32| current.max(hours)))
            }
            CheckRule::WeeksWorked { min_weeks: weeks } => {
                min_weeks = Some(min_weeks.map_or(weeks, |current: u32| current.max(weeks)))
            }
            _ => {}
        }
    }

    RequiredInputs {
        state_code: batch.state_code.clone(),
        fields,
        min_hours,
        min_weeks,
    }
}
