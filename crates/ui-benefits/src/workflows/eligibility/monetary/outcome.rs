use super::format::meets;
use super::inputs::InputField;
use crate::workflows::eligibility::localization::{self, Language};
use crate::workflows::eligibility::rules::{
    AverageWageFactor, ModuleKind, StateCode, WageAggregate, WagePeriod,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How a wage threshold was derived from the rule parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ThresholdDerivation {
    Fixed,
    HighQuarterMultiple {
        multiplier: f64,
        high_quarter: f64,
        tolerance: f64,
    },
    WbaMultiple {
        multiplier: f64,
        estimated_wba: f64,
    },
    MinimumWageMultiple {
        multiplier: f64,
        hourly_wage: f64,
    },
    PercentOf {
        percentage: f64,
        of: WageAggregate,
        base: f64,
    },
    StateAverageWage {
        average_wage: f64,
        period: WagePeriod,
        factor: AverageWageFactor,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountUnit {
    Quarters,
    Hours,
    Weeks,
}

/// Structured facts behind a single check, independent of display language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckDetail {
    Wages {
        basis: WageAggregate,
        actual: f64,
        threshold: f64,
        derivation: ThresholdDerivation,
    },
    QualifyingQuarters {
        floor: f64,
        qualifying: u32,
        required: u32,
    },
    Count {
        unit: CountUnit,
        actual: u32,
        required: u32,
    },
}

impl CheckDetail {
    pub fn passed(&self) -> bool {
        match self {
            CheckDetail::Wages {
                actual, threshold, ..
            } => meets(*actual, *threshold),
            CheckDetail::QualifyingQuarters {
                qualifying,
                required,
                ..
            } => qualifying >= required,
            CheckDetail::Count {
                actual, required, ..
            } => actual >= required,
        }
    }
}

/// Outcome of one evaluated check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub module: ModuleKind,
    pub required: bool,
    pub passed: bool,
    pub actual_value: String,
    pub required_value: String,
    pub explanation: String,
    pub detail: CheckDetail,
}

impl CheckResult {
    pub(crate) fn new(
        module: ModuleKind,
        required: bool,
        detail: CheckDetail,
        language: Language,
    ) -> Self {
        let passed = detail.passed();
        Self {
            module,
            required,
            passed,
            actual_value: localization::actual_value(&detail, language),
            required_value: localization::required_value(&detail, language),
            explanation: localization::explain(&detail, passed, language),
            detail,
        }
    }
}

/// Aggregate verdict for a state, with every evaluated check in dataset order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonetaryEligibilityResult {
    pub state_code: StateCode,
    pub state_name: String,
    pub eligible: bool,
    pub language: Language,
    pub checks: Vec<CheckResult>,
    pub failed_requirements: Vec<String>,
    pub missing_inputs: Vec<InputField>,
    pub summary: String,
}

impl MonetaryEligibilityResult {
    /// The missing fields when the run was blocked on absent inputs.
    pub fn missing_required_input(&self) -> Option<&[InputField]> {
        if self.missing_inputs.is_empty() {
            None
        } else {
            Some(&self.missing_inputs)
        }
    }

    pub fn check(&self, module: ModuleKind) -> Option<&CheckResult> {
        self.checks.iter().find(|check| check.module == module)
    }
}

/// Inputs a state batch needs, with the thresholds attached to work counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredInputs {
    pub state_code: StateCode,
    pub fields: BTreeSet<InputField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_hours: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_weeks: Option<u32>,
}

impl RequiredInputs {
    pub fn needs(&self, field: InputField) -> bool {
        self.fields.contains(&field)
    }
}
