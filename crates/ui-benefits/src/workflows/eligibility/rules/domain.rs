use serde::{Deserialize, Serialize};
use std::fmt;

/// Two-letter postal code identifying a state rule batch.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StateCode(String);

impl StateCode {
    /// Accepts exactly two ASCII letters in either case and stores them upper-cased.
    pub fn parse(raw: &str) -> Result<Self, InvalidStateCode> {
        let trimmed = raw.trim();
        if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(trimmed.to_ascii_uppercase()))
        } else {
            Err(InvalidStateCode(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for StateCode {
    type Error = InvalidStateCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StateCode> for String {
    fn from(value: StateCode) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a two-letter state code")]
pub struct InvalidStateCode(pub String);

/// Tag naming the evaluator a monetary check is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModuleKind {
    FlatFloor,
    HqFloor,
    OutsideHq,
    HqMultiplier,
    MultiQuarter,
    HoursWorked,
    WeeksWorked,
    WbaMultiplier,
    MinWageMultiplier,
    StateAww,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 10] = [
        ModuleKind::FlatFloor,
        ModuleKind::HqFloor,
        ModuleKind::OutsideHq,
        ModuleKind::HqMultiplier,
        ModuleKind::MultiQuarter,
        ModuleKind::HoursWorked,
        ModuleKind::WeeksWorked,
        ModuleKind::WbaMultiplier,
        ModuleKind::MinWageMultiplier,
        ModuleKind::StateAww,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ModuleKind::FlatFloor => "FLAT_FLOOR",
            ModuleKind::HqFloor => "HQ_FLOOR",
            ModuleKind::OutsideHq => "OUTSIDE_HQ",
            ModuleKind::HqMultiplier => "HQ_MULTIPLIER",
            ModuleKind::MultiQuarter => "MULTI_QUARTER",
            ModuleKind::HoursWorked => "HOURS_WORKED",
            ModuleKind::WeeksWorked => "WEEKS_WORKED",
            ModuleKind::WbaMultiplier => "WBA_MULTIPLIER",
            ModuleKind::MinWageMultiplier => "MIN_WAGE_MULTIPLIER",
            ModuleKind::StateAww => "STATE_AWW",
        }
    }

    /// Parses a dataset/CLI tag such as `HQ_FLOOR` (case-insensitive).
    pub fn from_label(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.label() == normalized)
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Named wage figure a check compares against its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WageAggregate {
    #[default]
    BasePeriod,
    HighestQuarter,
    TwoHighestQuarters,
    LastTwoQuarters,
    AverageTwoHighestQuarters,
    OutsideHighQuarter,
    AverageWeekly,
}

impl WageAggregate {
    /// Whether the figure can only be computed from a per-quarter breakdown.
    pub fn needs_quarters(&self) -> bool {
        !matches!(self, WageAggregate::BasePeriod | WageAggregate::AverageWeekly)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinimumWageSource {
    #[default]
    StateHourly,
    FederalHourly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WagePeriod {
    #[default]
    Annual,
    Weekly,
}

/// How a STATE_AWW threshold scales the state average wage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AverageWageFactor {
    Percentage(f64),
    Multiple(f64),
    Full,
}

impl AverageWageFactor {
    pub fn apply(&self, average: f64) -> f64 {
        match self {
            AverageWageFactor::Percentage(pct) => average * (pct / 100.0),
            AverageWageFactor::Multiple(multiple) => average * multiple,
            AverageWageFactor::Full => average,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutsideHqThreshold {
    Amount(f64),
    PercentOf { percentage: f64, of: WageAggregate },
}

/// Typed parameters for one monetary check, one variant per evaluator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "module", content = "params", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckRule {
    FlatFloor {
        min_amount: f64,
        basis: WageAggregate,
    },
    HqFloor {
        min_amount: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        min_quarters: Option<u8>,
    },
    OutsideHq {
        threshold: OutsideHqThreshold,
    },
    HqMultiplier {
        multiplier: f64,
        tolerance: f64,
    },
    MultiQuarter {
        min_quarters: u8,
    },
    HoursWorked {
        min_hours: u32,
    },
    WeeksWorked {
        min_weeks: u32,
    },
    WbaMultiplier {
        multiplier: f64,
        basis: WageAggregate,
    },
    MinWageMultiplier {
        multiplier: f64,
        wage: MinimumWageSource,
        basis: WageAggregate,
    },
    StateAww {
        factor: AverageWageFactor,
        period: WagePeriod,
        basis: WageAggregate,
    },
}

impl CheckRule {
    pub fn kind(&self) -> ModuleKind {
        match self {
            CheckRule::FlatFloor { .. } => ModuleKind::FlatFloor,
            CheckRule::HqFloor { .. } => ModuleKind::HqFloor,
            CheckRule::OutsideHq { .. } => ModuleKind::OutsideHq,
            CheckRule::HqMultiplier { .. } => ModuleKind::HqMultiplier,
            CheckRule::MultiQuarter { .. } => ModuleKind::MultiQuarter,
            CheckRule::HoursWorked { .. } => ModuleKind::HoursWorked,
            CheckRule::WeeksWorked { .. } => ModuleKind::WeeksWorked,
            CheckRule::WbaMultiplier { .. } => ModuleKind::WbaMultiplier,
            CheckRule::MinWageMultiplier { .. } => ModuleKind::MinWageMultiplier,
            CheckRule::StateAww { .. } => ModuleKind::StateAww,
        }
    }

    /// True when evaluating the rule requires the per-quarter wage breakdown.
    pub fn needs_quarter_breakdown(&self) -> bool {
        match self {
            CheckRule::HqFloor { .. }
            | CheckRule::OutsideHq { .. }
            | CheckRule::HqMultiplier { .. }
            | CheckRule::MultiQuarter { .. } => true,
            CheckRule::HoursWorked { .. } | CheckRule::WeeksWorked { .. } => false,
            CheckRule::FlatFloor { basis, .. }
            | CheckRule::WbaMultiplier { basis, .. }
            | CheckRule::MinWageMultiplier { basis, .. }
            | CheckRule::StateAww { basis, .. } => basis.needs_quarters(),
        }
    }
}

/// One rule clause within a state batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonetaryCheck {
    #[serde(flatten)]
    pub rule: CheckRule,
    pub required: bool,
}

impl MonetaryCheck {
    pub fn module(&self) -> ModuleKind {
        self.rule.kind()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyBenefitFormula {
    pub min_wba: u32,
    pub max_wba: u32,
    /// High-quarter divisor used for individual estimates.
    pub divisor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationCap {
    pub min_weeks: u32,
    pub max_weeks: u32,
}

/// State-wide figures some modules scale their thresholds by.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WageContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_minimum_wage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_average_annual_wage: Option<f64>,
}

/// Immutable monetary-eligibility ruleset for a single state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateRuleBatch {
    pub state_code: StateCode,
    pub state_name: String,
    pub primary_module: ModuleKind,
    pub weekly_benefit: WeeklyBenefitFormula,
    pub duration: DurationCap,
    pub wage_context: WageContext,
    pub checks: Vec<MonetaryCheck>,
}

impl StateRuleBatch {
    pub fn has_module(&self, kind: ModuleKind) -> bool {
        self.checks.iter().any(|check| check.module() == kind)
    }

    pub fn required_checks(&self) -> impl Iterator<Item = &MonetaryCheck> {
        self.checks.iter().filter(|check| check.required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_code_normalizes_case_and_rejects_bad_lengths() {
        assert_eq!(StateCode::parse(" ca ").expect("valid").as_str(), "CA");
        assert!(StateCode::parse("CAL").is_err());
        assert!(StateCode::parse("C1").is_err());
        assert!(StateCode::parse("").is_err());
    }

    #[test]
    fn module_labels_round_trip() {
        for kind in ModuleKind::ALL {
            assert_eq!(ModuleKind::from_label(kind.label()), Some(kind));
        }
        assert_eq!(ModuleKind::from_label("hq_floor"), Some(ModuleKind::HqFloor));
        assert_eq!(ModuleKind::from_label("NOT_A_MODULE"), None);
    }

    #[test]
    fn average_wage_factor_scales_average() {
        assert_eq!(AverageWageFactor::Percentage(8.0).apply(60000.0), 4800.0);
        assert_eq!(AverageWageFactor::Multiple(2.0).apply(500.0), 1000.0);
        assert_eq!(AverageWageFactor::Full.apply(720.0), 720.0);
    }

    #[test]
    fn breakdown_requirement_follows_basis() {
        let base = CheckRule::FlatFloor {
            min_amount: 1000.0,
            basis: WageAggregate::BasePeriod,
        };
        let two_highest = CheckRule::FlatFloor {
            min_amount: 1000.0,
            basis: WageAggregate::TwoHighestQuarters,
        };
        assert!(!base.needs_quarter_breakdown());
        assert!(two_highest.needs_quarter_breakdown());
        assert!(!CheckRule::HoursWorked { min_hours: 680 }.needs_quarter_breakdown());
    }
}
