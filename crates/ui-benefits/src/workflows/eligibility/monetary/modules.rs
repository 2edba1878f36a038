use super::format::meets;
use super::inputs::{InputField, WageFacts};
use super::outcome::{CheckDetail, CountUnit, ThresholdDerivation};
use crate::workflows::eligibility::rules::{
    AverageWageFactor, CheckRule, MinimumWageSource, OutsideHqThreshold, StateRuleBatch,
    WageAggregate, WagePeriod,
};

pub const FEDERAL_MINIMUM_WAGE: f64 = 7.25;
pub const DEFAULT_STATE_AVERAGE_ANNUAL_WAGE: f64 = 60_000.0;
const WEEKS_PER_YEAR: f64 = 52.0;

/// Fields a rule reads beyond the always-present base-period wages.
pub(crate) fn input_fields(rule: &CheckRule) -> Vec<InputField> {
    let mut fields = Vec::new();
    if rule.needs_quarter_breakdown() {
        fields.push(InputField::QuarterlyWages);
    }
    match rule {
        CheckRule::HoursWorked { .. } => fields.push(InputField::HoursWorked),
        CheckRule::WeeksWorked { .. } => fields.push(InputField::WeeksWorked),
        _ => {}
    }
    fields
}

/// Routes a rule to its evaluator. `Err` names the input the rule could not
/// be evaluated without.
pub(crate) fn evaluate(
    rule: &CheckRule,
    facts: &WageFacts,
    batch: &StateRuleBatch,
) -> Result<CheckDetail, InputField> {
    match rule {
        CheckRule::FlatFloor { min_amount, basis } => flat_floor(facts, *min_amount, *basis),
        CheckRule::HqFloor {
            min_amount,
            min_quarters,
        } => hq_floor(facts, *min_amount, *min_quarters),
        CheckRule::OutsideHq { threshold } => outside_hq(facts, threshold),
        CheckRule::HqMultiplier {
            multiplier,
            tolerance,
        } => hq_multiplier(facts, *multiplier, *tolerance),
        CheckRule::MultiQuarter { min_quarters } => multi_quarter(facts, *min_quarters),
        CheckRule::HoursWorked { min_hours } => Ok(CheckDetail::Count {
            unit: CountUnit::Hours,
            actual: facts.hours_worked()?,
            required: *min_hours,
        }),
        CheckRule::WeeksWorked { min_weeks } => Ok(CheckDetail::Count {
            unit: CountUnit::Weeks,
            actual: facts.weeks_worked()?,
            required: *min_weeks,
        }),
        CheckRule::WbaMultiplier { multiplier, basis } => {
            wba_multiplier(facts, batch, *multiplier, *basis)
        }
        CheckRule::MinWageMultiplier {
            multiplier,
            wage,
            basis,
        } => min_wage_multiplier(facts, batch, *multiplier, *wage, *basis),
        CheckRule::StateAww {
            factor,
            period,
            basis,
        } => state_aww(facts, batch, *factor, *period, *basis),
    }
}

fn flat_floor(
    facts: &WageFacts,
    min_amount: f64,
    basis: WageAggregate,
) -> Result<CheckDetail, InputField> {
    Ok(CheckDetail::Wages {
        basis,
        actual: facts.aggregate(basis)?,
        threshold: min_amount,
        derivation: ThresholdDerivation::Fixed,
    })
}

fn hq_floor(
    facts: &WageFacts,
    min_amount: f64,
    min_quarters: Option<u8>,
) -> Result<CheckDetail, InputField> {
    match min_quarters {
        Some(required) if required >= 2 => {
            let qualifying = facts
                .quarters()?
                .iter()
                .filter(|value| meets(**value, min_amount))
                .count() as u32;
            Ok(CheckDetail::QualifyingQuarters {
                floor: min_amount,
                qualifying,
                required: u32::from(required),
            })
        }
        _ => flat_floor(facts, min_amount, WageAggregate::HighestQuarter),
    }
}

fn outside_hq(
    facts: &WageFacts,
    threshold: &OutsideHqThreshold,
) -> Result<CheckDetail, InputField> {
    let actual = facts.aggregate(WageAggregate::OutsideHighQuarter)?;
    let (threshold, derivation) = match *threshold {
        OutsideHqThreshold::Amount(amount) => (amount, ThresholdDerivation::Fixed),
        OutsideHqThreshold::PercentOf { percentage, of } => {
            let base = facts.aggregate(of)?;
            (
                base * percentage / 100.0,
                ThresholdDerivation::PercentOf {
                    percentage,
                    of,
                    base,
                },
            )
        }
    };

    Ok(CheckDetail::Wages {
        basis: WageAggregate::OutsideHighQuarter,
        actual,
        threshold,
        derivation,
    })
}

fn hq_multiplier(
    facts: &WageFacts,
    multiplier: f64,
    tolerance: f64,
) -> Result<CheckDetail, InputField> {
    let high_quarter = facts.highest_quarter()?;
    Ok(CheckDetail::Wages {
        basis: WageAggregate::BasePeriod,
        actual: facts.base_period(),
        threshold: (high_quarter * multiplier - tolerance).max(0.0),
        derivation: ThresholdDerivation::HighQuarterMultiple {
            multiplier,
            high_quarter,
            tolerance,
        },
    })
}

fn multi_quarter(facts: &WageFacts, min_quarters: u8) -> Result<CheckDetail, InputField> {
    Ok(CheckDetail::Count {
        unit: CountUnit::Quarters,
        actual: facts.quarters_with_wages()?,
        required: u32::from(min_quarters),
    })
}

/// The state minimum weekly benefit stands in for the claimant's own WBA.
fn wba_multiplier(
    facts: &WageFacts,
    batch: &StateRuleBatch,
    multiplier: f64,
    basis: WageAggregate,
) -> Result<CheckDetail, InputField> {
    let estimated_wba = f64::from(batch.weekly_benefit.min_wba);
    Ok(CheckDetail::Wages {
        basis,
        actual: facts.aggregate(basis)?,
        threshold: estimated_wba * multiplier,
        derivation: ThresholdDerivation::WbaMultiple {
            multiplier,
            estimated_wba,
        },
    })
}

fn min_wage_multiplier(
    facts: &WageFacts,
    batch: &StateRuleBatch,
    multiplier: f64,
    wage: MinimumWageSource,
    basis: WageAggregate,
) -> Result<CheckDetail, InputField> {
    let hourly_wage = match wage {
        MinimumWageSource::StateHourly => batch
            .wage_context
            .state_minimum_wage
            .unwrap_or(FEDERAL_MINIMUM_WAGE),
        MinimumWageSource::FederalHourly => FEDERAL_MINIMUM_WAGE,
    };

    Ok(CheckDetail::Wages {
        basis,
        actual: facts.aggregate(basis)?,
        threshold: hourly_wage * multiplier,
        derivation: ThresholdDerivation::MinimumWageMultiple {
            multiplier,
            hourly_wage,
        },
    })
}

fn state_aww(
    facts: &WageFacts,
    batch: &StateRuleBatch,
    factor: AverageWageFactor,
    period: WagePeriod,
    basis: WageAggregate,
) -> Result<CheckDetail, InputField> {
    let annual = batch
        .wage_context
        .state_average_annual_wage
        .unwrap_or(DEFAULT_STATE_AVERAGE_ANNUAL_WAGE);
    let average_wage = match period {
        WagePeriod::Annual => annual,
        WagePeriod::Weekly => annual / WEEKS_PER_YEAR,
    };

    Ok(CheckDetail::Wages {
        basis,
        actual: facts.aggregate(basis)?,
        threshold: factor.apply(average_wage),
        derivation: ThresholdDerivation::StateAverageWage {
            average_wage,
            period,
            factor,
        },
    })
}
