use super::domain::{
    AverageWageFactor, CheckRule, DurationCap, MinimumWageSource, ModuleKind, MonetaryCheck,
    OutsideHqThreshold, StateCode, StateRuleBatch, WageAggregate, WageContext, WagePeriod,
    WeeklyBenefitFormula,
};
use super::RuleStoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum number of base-period quarters a check may reference.
const MAX_QUARTERS: u8 = 8;

const DEFAULT_HQ_MULTIPLIER: f64 = 1.5;
const DEFAULT_WBA_MULTIPLIER: f64 = 26.0;
const DEFAULT_MIN_QUARTERS: u8 = 2;

/// Provenance block carried at the top of every rules dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetMetadata {
    pub source: String,
    pub title: String,
    pub effective_year: i32,
    pub version: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawDataset {
    pub(crate) metadata: DatasetMetadata,
    pub(crate) states: BTreeMap<String, RawBatch>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawBatch {
    state_code: String,
    state_name: String,
    primary_module: ModuleKind,
    weekly_benefit: WeeklyBenefitFormula,
    duration: DurationCap,
    #[serde(default)]
    wage_context: WageContext,
    checks: Vec<RawCheck>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCheck {
    module: ModuleKind,
    #[serde(default)]
    params: RawParams,
    #[serde(default = "default_required")]
    required: bool,
}

fn default_required() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawParams {
    min_amount: Option<f64>,
    multiplier: Option<f64>,
    tolerance: Option<f64>,
    min_quarters: Option<u8>,
    min_hours: Option<u32>,
    min_weeks: Option<u32>,
    min_percentage: Option<f64>,
    percentage: Option<f64>,
    of: Option<PercentBase>,
    apply_to: Option<WageAggregate>,
    wage_type: Option<MinimumWageSource>,
    wage_period: Option<WagePeriod>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum PercentBase {
    Hqw,
    Bpw,
}

impl From<PercentBase> for WageAggregate {
    fn from(value: PercentBase) -> Self {
        match value {
            PercentBase::Hqw => WageAggregate::HighestQuarter,
            PercentBase::Bpw => WageAggregate::BasePeriod,
        }
    }
}

impl RawParams {
    fn present(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let mut mark = |set: bool, name: &'static str| {
            if set {
                names.push(name);
            }
        };
        mark(self.min_amount.is_some(), "min_amount");
        mark(self.multiplier.is_some(), "multiplier");
        mark(self.tolerance.is_some(), "tolerance");
        mark(self.min_quarters.is_some(), "min_quarters");
        mark(self.min_hours.is_some(), "min_hours");
        mark(self.min_weeks.is_some(), "min_weeks");
        mark(self.min_percentage.is_some(), "min_percentage");
        mark(self.percentage.is_some(), "percentage");
        mark(self.of.is_some(), "of");
        mark(self.apply_to.is_some(), "apply_to");
        mark(self.wage_type.is_some(), "wage_type");
        mark(self.wage_period.is_some(), "wage_period");
        names
    }
}

fn accepted_params(module: ModuleKind) -> &'static [&'static str] {
    match module {
        ModuleKind::FlatFloor => &["min_amount", "apply_to"],
        ModuleKind::HqFloor => &["min_amount", "min_quarters"],
        ModuleKind::OutsideHq => &["min_amount", "min_percentage", "of"],
        ModuleKind::HqMultiplier => &["multiplier", "tolerance"],
        ModuleKind::MultiQuarter => &["min_quarters"],
        ModuleKind::HoursWorked => &["min_hours"],
        ModuleKind::WeeksWorked => &["min_weeks"],
        ModuleKind::WbaMultiplier => &["multiplier", "apply_to"],
        ModuleKind::MinWageMultiplier => &["multiplier", "wage_type", "apply_to"],
        ModuleKind::StateAww => &["percentage", "multiplier", "wage_period", "apply_to"],
    }
}

pub(crate) fn validate_dataset(
    raw: RawDataset,
) -> Result<(DatasetMetadata, BTreeMap<StateCode, StateRuleBatch>), RuleStoreError> {
    if raw.states.is_empty() {
        return Err(RuleStoreError::EmptyDataset);
    }

    let mut batches = BTreeMap::new();
    for (key, batch) in raw.states {
        let validated = validate_batch(&key, batch)?;
        batches.insert(validated.state_code.clone(), validated);
    }

    Ok((raw.metadata, batches))
}

fn validate_batch(key: &str, raw: RawBatch) -> Result<StateRuleBatch, RuleStoreError> {
    let invalid = |reason: String| RuleStoreError::InvalidBatch {
        state: key.to_string(),
        reason,
    };

    let key_code = StateCode::parse(key).map_err(|err| invalid(err.to_string()))?;
    let state_code = StateCode::parse(&raw.state_code).map_err(|err| invalid(err.to_string()))?;
    if key_code != state_code {
        return Err(invalid(format!(
            "keyed as {key_code} but declares state_code {state_code}"
        )));
    }
    if raw.state_name.trim().is_empty() {
        return Err(invalid("state_name is empty".to_string()));
    }

    let benefit = &raw.weekly_benefit;
    if benefit.min_wba == 0 || benefit.min_wba > benefit.max_wba {
        return Err(invalid(format!(
            "weekly benefit range {}..{} is not positive and ordered",
            benefit.min_wba, benefit.max_wba
        )));
    }
    positive("weekly_benefit.divisor", benefit.divisor).map_err(invalid)?;
    if raw.duration.min_weeks == 0 || raw.duration.min_weeks > raw.duration.max_weeks {
        return Err(invalid(format!(
            "duration range {}..{} is not positive and ordered",
            raw.duration.min_weeks, raw.duration.max_weeks
        )));
    }
    if let Some(wage) = raw.wage_context.state_minimum_wage {
        positive("wage_context.state_minimum_wage", wage).map_err(invalid)?;
    }
    if let Some(wage) = raw.wage_context.state_average_annual_wage {
        positive("wage_context.state_average_annual_wage", wage).map_err(invalid)?;
    }

    if raw.checks.is_empty() {
        return Err(invalid("batch has no checks".to_string()));
    }

    let mut checks = Vec::with_capacity(raw.checks.len());
    for (index, check) in raw.checks.into_iter().enumerate() {
        let module = check.module;
        let rule = validate_check(check.module, check.params)
            .map_err(|reason| invalid(format!("check #{index} ({module}): {reason}")))?;
        checks.push(MonetaryCheck {
            rule,
            required: check.required,
        });
    }

    if !checks.iter().any(|check| check.module() == raw.primary_module) {
        return Err(invalid(format!(
            "primary module {} has no matching check",
            raw.primary_module
        )));
    }

    Ok(StateRuleBatch {
        state_code,
        state_name: raw.state_name.trim().to_string(),
        primary_module: raw.primary_module,
        weekly_benefit: raw.weekly_benefit,
        duration: raw.duration,
        wage_context: raw.wage_context,
        checks,
    })
}

fn validate_check(module: ModuleKind, params: RawParams) -> Result<CheckRule, String> {
    let accepted = accepted_params(module);
    if let Some(unexpected) = params
        .present()
        .into_iter()
        .find(|name| !accepted.contains(name))
    {
        return Err(format!("parameter `{unexpected}` does not apply"));
    }

    let rule = match module {
        ModuleKind::FlatFloor => CheckRule::FlatFloor {
            min_amount: required_positive("min_amount", params.min_amount)?,
            basis: params.apply_to.unwrap_or_default(),
        },
        ModuleKind::HqFloor => CheckRule::HqFloor {
            min_amount: required_positive("min_amount", params.min_amount)?,
            min_quarters: params.min_quarters.map(quarter_count).transpose()?,
        },
        ModuleKind::OutsideHq => {
            let threshold = match (params.min_amount, params.min_percentage) {
                (Some(amount), None) => OutsideHqThreshold::Amount(positive("min_amount", amount)?),
                (None, Some(pct)) => OutsideHqThreshold::PercentOf {
                    percentage: percentage("min_percentage", pct)?,
                    of: params.of.map(WageAggregate::from).unwrap_or_default(),
                },
                (Some(_), Some(_)) => {
                    return Err("min_amount and min_percentage are exclusive".to_string())
                }
                (None, None) => return Err("requires min_amount or min_percentage".to_string()),
            };
            if params.of.is_some() && params.min_percentage.is_none() {
                return Err("`of` only applies with min_percentage".to_string());
            }
            CheckRule::OutsideHq { threshold }
        }
        ModuleKind::HqMultiplier => {
            let tolerance = params.tolerance.unwrap_or(0.0);
            if !tolerance.is_finite() || tolerance < 0.0 {
                return Err(format!("tolerance must be finite and non-negative, got {tolerance}"));
            }
            CheckRule::HqMultiplier {
                multiplier: positive(
                    "multiplier",
                    params.multiplier.unwrap_or(DEFAULT_HQ_MULTIPLIER),
                )?,
                tolerance,
            }
        }
        ModuleKind::MultiQuarter => CheckRule::MultiQuarter {
            min_quarters: quarter_count(params.min_quarters.unwrap_or(DEFAULT_MIN_QUARTERS))?,
        },
        ModuleKind::HoursWorked => match params.min_hours {
            Some(hours) if hours > 0 => CheckRule::HoursWorked { min_hours: hours },
            Some(_) => return Err("min_hours must be positive".to_string()),
            None => return Err("requires min_hours".to_string()),
        },
        ModuleKind::WeeksWorked => match params.min_weeks {
            Some(weeks) if weeks > 0 && weeks <= 52 => CheckRule::WeeksWorked { min_weeks: weeks },
            Some(weeks) => return Err(format!("min_weeks must be within 1..=52, got {weeks}")),
            None => return Err("requires min_weeks".to_string()),
        },
        ModuleKind::WbaMultiplier => CheckRule::WbaMultiplier {
            multiplier: positive(
                "multiplier",
                params.multiplier.unwrap_or(DEFAULT_WBA_MULTIPLIER),
            )?,
            basis: params.apply_to.unwrap_or_default(),
        },
        ModuleKind::MinWageMultiplier => CheckRule::MinWageMultiplier {
            multiplier: required_positive("multiplier", params.multiplier)?,
            wage: params.wage_type.unwrap_or_default(),
            basis: params.apply_to.unwrap_or_default(),
        },
        ModuleKind::StateAww => {
            let factor = match (params.percentage, params.multiplier) {
                (Some(pct), None) => AverageWageFactor::Percentage(percentage("percentage", pct)?),
                (None, Some(multiple)) => {
                    AverageWageFactor::Multiple(positive("multiplier", multiple)?)
                }
                (None, None) => AverageWageFactor::Full,
                (Some(_), Some(_)) => {
                    return Err("percentage and multiplier are exclusive".to_string())
                }
            };
            CheckRule::StateAww {
                factor,
                period: params.wage_period.unwrap_or_default(),
                basis: params.apply_to.unwrap_or_default(),
            }
        }
    };

    Ok(rule)
}

fn positive(field: &str, value: f64) -> Result<f64, String> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("{field} must be positive and finite, got {value}"))
    }
}

fn required_positive(field: &str, value: Option<f64>) -> Result<f64, String> {
    match value {
        Some(value) => positive(field, value),
        None => Err(format!("requires {field}")),
    }
}

fn percentage(field: &str, value: f64) -> Result<f64, String> {
    if value.is_finite() && value > 0.0 && value <= 100.0 {
        Ok(value)
    } else {
        Err(format!("{field} must be within (0, 100], got {value}"))
    }
}

fn quarter_count(value: u8) -> Result<u8, String> {
    if (1..=MAX_QUARTERS).contains(&value) {
        Ok(value)
    } else {
        Err(format!("min_quarters must be within 1..={MAX_QUARTERS}, got {value}"))
    }
}
