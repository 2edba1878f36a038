use super::format::to_cents;
use crate::workflows::eligibility::rules::WageAggregate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound on the per-quarter breakdown a caller may supply.
pub const MAX_QUARTERS: usize = 8;
/// Quarters synthesized when only a count of quarters with wages is known.
pub const QUESTIONNAIRE_QUARTERS: usize = 4;

const WEEKS_PER_YEAR: f64 = 52.0;

/// Caller-supplied wage and work facts for a single monetary evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonetaryInputs {
    pub base_period_wages: f64,
    /// Per-quarter wages ordered oldest to newest.
    #[serde(default)]
    pub quarterly_wages: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highest_quarter_wages: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarters_with_wages: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_worked: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weeks_worked: Option<u32>,
}

impl MonetaryInputs {
    pub fn with_quarters(base_period_wages: f64, quarterly_wages: Vec<f64>) -> Self {
        Self {
            base_period_wages,
            quarterly_wages,
            ..Self::default()
        }
    }

    pub fn hours(mut self, hours: u32) -> Self {
        self.hours_worked = Some(hours);
        self
    }

    pub fn weeks(mut self, weeks: u32) -> Self {
        self.weeks_worked = Some(weeks);
        self
    }
}

/// Input field names a state batch may demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputField {
    BasePeriodWages,
    QuarterlyWages,
    HoursWorked,
    WeeksWorked,
}

impl InputField {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputField::BasePeriodWages => "base_period_wages",
            InputField::QuarterlyWages => "quarterly_wages",
            InputField::HoursWorked => "hours_worked",
            InputField::WeeksWorked => "weeks_worked",
        }
    }
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputViolation {
    #[error("{field} must be a finite, non-negative amount (found {value})")]
    InvalidAmount { field: &'static str, value: f64 },
    #[error("at most {max} quarters of wages may be supplied (found {found})")]
    TooManyQuarters { max: usize, found: usize },
    #[error("quarters_with_wages must be at most {max} (found {count})")]
    QuarterCountOutOfRange { count: u8, max: usize },
    #[error("highest quarter wages ({highest}) exceed base period wages ({base_period})")]
    HighestQuarterExceedsBasePeriod { highest: f64, base_period: f64 },
    #[error("base period wages ({base_period}) were reported with no quarters of wages")]
    WagesWithoutEarningQuarters { base_period: f64 },
    #[error(
        "{count} quarters of at most {highest} cannot add up to base period wages ({base_period})"
    )]
    QuartersCannotCoverBasePeriod {
        count: u8,
        highest: f64,
        base_period: f64,
    },
}

/// Normalized facts handed to the module evaluators.
///
/// Every figure an evaluator needs is resolved here so evaluators stay pure
/// arithmetic over validated values.
#[derive(Debug, Clone, PartialEq)]
pub struct WageFacts {
    base_period: f64,
    quarters: Option<Vec<f64>>,
    /// Stated high quarter, used when no breakdown is available.
    highest_quarter: Option<f64>,
    hours_worked: Option<u32>,
    weeks_worked: Option<u32>,
}

impl WageFacts {
    pub fn from_inputs(inputs: &MonetaryInputs) -> Result<Self, InputViolation> {
        let base_period = amount("base_period_wages", inputs.base_period_wages)?;

        if inputs.quarterly_wages.len() > MAX_QUARTERS {
            return Err(InputViolation::TooManyQuarters {
                max: MAX_QUARTERS,
                found: inputs.quarterly_wages.len(),
            });
        }
        for value in &inputs.quarterly_wages {
            amount("quarterly_wages", *value)?;
        }
        let supplied_highest = inputs
            .highest_quarter_wages
            .map(|value| amount("highest_quarter_wages", value))
            .transpose()?;
        if let Some(count) = inputs.quarters_with_wages {
            let limit = if inputs.quarterly_wages.is_empty() {
                QUESTIONNAIRE_QUARTERS
            } else {
                inputs.quarterly_wages.len()
            };
            if usize::from(count) > limit {
                return Err(InputViolation::QuarterCountOutOfRange { count, max: limit });
            }
            if inputs.quarterly_wages.is_empty() {
                check_questionnaire(base_period, count, supplied_highest)?;
            }
        }

        let quarters = if !inputs.quarterly_wages.is_empty() {
            Some(inputs.quarterly_wages.clone())
        } else {
            inputs
                .quarters_with_wages
                .map(|count| synthesize_quarters(base_period, usize::from(count), supplied_highest))
        };

        let highest = quarters
            .as_deref()
            .map(highest_of)
            .or(supplied_highest);
        if let Some(highest) = highest {
            if to_cents(highest) > to_cents(base_period) {
                return Err(InputViolation::HighestQuarterExceedsBasePeriod {
                    highest,
                    base_period,
                });
            }
        }

        Ok(Self {
            base_period,
            quarters,
            highest_quarter: supplied_highest,
            hours_worked: inputs.hours_worked,
            weeks_worked: inputs.weeks_worked,
        })
    }

    pub fn base_period(&self) -> f64 {
        self.base_period
    }

    pub fn quarters(&self) -> Result<&[f64], InputField> {
        self.quarters.as_deref().ok_or(InputField::QuarterlyWages)
    }

    /// Highest quarter from the breakdown, else the stated figure.
    pub fn highest_quarter(&self) -> Result<f64, InputField> {
        match (self.quarters.as_deref(), self.highest_quarter) {
            (Some(quarters), _) => Ok(highest_of(quarters)),
            (None, Some(highest)) => Ok(highest),
            (None, None) => Err(InputField::QuarterlyWages),
        }
    }

    pub fn quarters_with_wages(&self) -> Result<u32, InputField> {
        Ok(self.quarters()?.iter().filter(|value| **value > 0.0).count() as u32)
    }

    pub fn hours_worked(&self) -> Result<u32, InputField> {
        self.hours_worked.ok_or(InputField::HoursWorked)
    }

    pub fn weeks_worked(&self) -> Result<u32, InputField> {
        self.weeks_worked.ok_or(InputField::WeeksWorked)
    }

    /// Computes the named wage figure, or names the missing input it needs.
    pub fn aggregate(&self, kind: WageAggregate) -> Result<f64, InputField> {
        let value = match kind {
            WageAggregate::BasePeriod => self.base_period,
            WageAggregate::AverageWeekly => self.base_period / WEEKS_PER_YEAR,
            WageAggregate::HighestQuarter => self.highest_quarter()?,
            WageAggregate::TwoHighestQuarters => two_highest(self.quarters()?),
            WageAggregate::AverageTwoHighestQuarters => two_highest(self.quarters()?) / 2.0,
            WageAggregate::LastTwoQuarters => {
                let quarters = self.quarters()?;
                quarters.iter().rev().take(2).sum()
            }
            WageAggregate::OutsideHighQuarter => (self.base_period - self.highest_quarter()?).max(0.0),
        };
        Ok(value)
    }
}

fn amount(field: &'static str, value: f64) -> Result<f64, InputViolation> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(InputViolation::InvalidAmount { field, value })
    }
}

/// Rejects questionnaire answers no four-quarter split could satisfy.
fn check_questionnaire(
    base_period: f64,
    count: u8,
    highest: Option<f64>,
) -> Result<(), InputViolation> {
    if count == 0 {
        if to_cents(base_period) > 0 {
            return Err(InputViolation::WagesWithoutEarningQuarters { base_period });
        }
        return Ok(());
    }
    if let Some(highest) = highest {
        if to_cents(highest * f64::from(count)) < to_cents(base_period) {
            return Err(InputViolation::QuartersCannotCoverBasePeriod {
                count,
                highest,
                base_period,
            });
        }
    }
    Ok(())
}

fn highest_of(quarters: &[f64]) -> f64 {
    quarters.iter().copied().fold(0.0, f64::max)
}

fn two_highest(quarters: &[f64]) -> f64 {
    let mut sorted = quarters.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));
    sorted.iter().take(2).sum()
}

/// Builds a four-quarter breakdown from questionnaire answers.
///
/// The newest `count` quarters carry wages. With a stated high quarter the
/// remainder of the base period is split evenly over the other earning quarters.
fn synthesize_quarters(base_period: f64, count: usize, highest: Option<f64>) -> Vec<f64> {
    let mut quarters = vec![0.0; QUESTIONNAIRE_QUARTERS];
    if count == 0 {
        return quarters;
    }

    let first_earning = QUESTIONNAIRE_QUARTERS - count;
    match highest {
        Some(highest) => {
            quarters[QUESTIONNAIRE_QUARTERS - 1] = highest;
            if count > 1 {
                let remainder = (base_period - highest).max(0.0);
                let share = remainder / (count - 1) as f64;
                for slot in &mut quarters[first_earning..QUESTIONNAIRE_QUARTERS - 1] {
                    *slot = share;
                }
            }
        }
        None => {
            let share = base_period / count as f64;
            for slot in &mut quarters[first_earning..] {
                *slot = share;
            }
        }
    }
    quarters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_aggregates_from_breakdown() {
        let inputs = MonetaryInputs::with_quarters(20000.0, vec![2000.0, 8000.0, 4000.0, 6000.0]);
        let facts = WageFacts::from_inputs(&inputs).expect("valid");

        assert_eq!(facts.highest_quarter(), Ok(8000.0));
        assert_eq!(facts.aggregate(WageAggregate::TwoHighestQuarters), Ok(14000.0));
        assert_eq!(facts.aggregate(WageAggregate::AverageTwoHighestQuarters), Ok(7000.0));
        assert_eq!(facts.aggregate(WageAggregate::LastTwoQuarters), Ok(10000.0));
        assert_eq!(facts.aggregate(WageAggregate::OutsideHighQuarter), Ok(12000.0));
        assert_eq!(facts.aggregate(WageAggregate::AverageWeekly), Ok(20000.0 / 52.0));
        assert_eq!(facts.quarters_with_wages(), Ok(4));
    }

    #[test]
    fn zero_quarters_do_not_count_as_earning() {
        let inputs = MonetaryInputs::with_quarters(9000.0, vec![0.0, 0.0, 4000.0, 5000.0]);
        let facts = WageFacts::from_inputs(&inputs).expect("valid");
        assert_eq!(facts.quarters_with_wages(), Ok(2));
    }

    #[test]
    fn questionnaire_answers_synthesize_even_split() {
        let inputs = MonetaryInputs {
            base_period_wages: 12000.0,
            quarters_with_wages: Some(3),
            ..MonetaryInputs::default()
        };
        let facts = WageFacts::from_inputs(&inputs).expect("valid");
        assert_eq!(facts.quarters(), Ok(&[0.0, 4000.0, 4000.0, 4000.0][..]));
    }

    #[test]
    fn questionnaire_high_quarter_takes_newest_slot() {
        let inputs = MonetaryInputs {
            base_period_wages: 20000.0,
            highest_quarter_wages: Some(8000.0),
            quarters_with_wages: Some(4),
            ..MonetaryInputs::default()
        };
        let facts = WageFacts::from_inputs(&inputs).expect("valid");
        assert_eq!(facts.quarters(), Ok(&[4000.0, 4000.0, 4000.0, 8000.0][..]));
        assert_eq!(facts.highest_quarter(), Ok(8000.0));
    }

    #[test]
    fn stated_high_quarter_stands_alone() {
        let inputs = MonetaryInputs {
            base_period_wages: 52000.0,
            highest_quarter_wages: Some(14000.0),
            ..MonetaryInputs::default()
        };
        let facts = WageFacts::from_inputs(&inputs).expect("valid");

        assert_eq!(facts.highest_quarter(), Ok(14000.0));
        assert_eq!(facts.aggregate(WageAggregate::OutsideHighQuarter), Ok(38000.0));
        assert_eq!(facts.quarters(), Err(InputField::QuarterlyWages));
        assert_eq!(
            facts.aggregate(WageAggregate::LastTwoQuarters),
            Err(InputField::QuarterlyWages)
        );
    }

    #[test]
    fn breakdown_wins_over_stated_high_quarter() {
        let inputs = MonetaryInputs {
            highest_quarter_wages: Some(3000.0),
            ..MonetaryInputs::with_quarters(10000.0, vec![4000.0, 6000.0])
        };
        let facts = WageFacts::from_inputs(&inputs).expect("valid");
        assert_eq!(facts.highest_quarter(), Ok(6000.0));
    }

    #[test]
    fn rejects_questionnaire_answers_that_cannot_add_up() {
        let too_small = MonetaryInputs {
            base_period_wages: 20000.0,
            highest_quarter_wages: Some(2000.0),
            quarters_with_wages: Some(4),
            ..MonetaryInputs::default()
        };
        assert!(matches!(
            WageFacts::from_inputs(&too_small),
            Err(InputViolation::QuartersCannotCoverBasePeriod { count: 4, .. })
        ));

        let no_quarters = MonetaryInputs {
            base_period_wages: 500.0,
            quarters_with_wages: Some(0),
            ..MonetaryInputs::default()
        };
        assert!(matches!(
            WageFacts::from_inputs(&no_quarters),
            Err(InputViolation::WagesWithoutEarningQuarters { .. })
        ));

        let exact = MonetaryInputs {
            base_period_wages: 8000.0,
            highest_quarter_wages: Some(2000.0),
            quarters_with_wages: Some(4),
            ..MonetaryInputs::default()
        };
        let facts = WageFacts::from_inputs(&exact).expect("exact split is possible");
        assert_eq!(facts.quarters(), Ok(&[2000.0, 2000.0, 2000.0, 2000.0][..]));

        let nothing_earned = MonetaryInputs {
            quarters_with_wages: Some(0),
            ..MonetaryInputs::default()
        };
        assert!(WageFacts::from_inputs(&nothing_earned).is_ok());
    }

    #[test]
    fn missing_breakdown_is_reported_as_input_field() {
        let facts = WageFacts::from_inputs(&MonetaryInputs {
            base_period_wages: 5000.0,
            ..MonetaryInputs::default()
        })
        .expect("valid");
        assert_eq!(facts.aggregate(WageAggregate::BasePeriod), Ok(5000.0));
        assert_eq!(
            facts.aggregate(WageAggregate::HighestQuarter),
            Err(InputField::QuarterlyWages)
        );
        assert_eq!(facts.hours_worked(), Err(InputField::HoursWorked));
    }

    #[test]
    fn rejects_malformed_amounts() {
        let negative = MonetaryInputs::with_quarters(-1.0, vec![]);
        assert!(matches!(
            WageFacts::from_inputs(&negative),
            Err(InputViolation::InvalidAmount {
                field: "base_period_wages",
                ..
            })
        ));

        let not_finite = MonetaryInputs::with_quarters(100.0, vec![f64::NAN]);
        assert!(WageFacts::from_inputs(&not_finite).is_err());

        let too_many = MonetaryInputs::with_quarters(100.0, vec![1.0; MAX_QUARTERS + 1]);
        assert!(matches!(
            WageFacts::from_inputs(&too_many),
            Err(InputViolation::TooManyQuarters { .. })
        ));
    }

    #[test]
    fn rejects_high_quarter_above_base_period() {
        let inputs = MonetaryInputs::with_quarters(5000.0, vec![6000.0]);
        assert!(matches!(
            WageFacts::from_inputs(&inputs),
            Err(InputViolation::HighestQuarterExceedsBasePeriod { .. })
        ));
    }

    #[test]
    fn rejects_quarter_count_beyond_breakdown() {
        let inputs = MonetaryInputs {
            base_period_wages: 5000.0,
            quarters_with_wages: Some(5),
            ..MonetaryInputs::default()
        };
        assert!(matches!(
            WageFacts::from_inputs(&inputs),
            Err(InputViolation::QuarterCountOutOfRange { count: 5, max: 4 })
        ));
    }
}
