use super::monetary::format::to_cents;
use super::rules::{RuleStore, StateNotSupported};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

pub const FALLBACK_WEEKLY_BENEFIT: u32 = 450;
pub const FALLBACK_MAX_WEEKS: u32 = 26;
/// Quarters the individual weekly benefit estimate looks back over.
pub const ESTIMATE_QUARTERS: usize = 4;

/// Upper bound of what a state could pay, taken from its caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitCalculation {
    pub weekly_benefit_amount: u32,
    pub max_duration_weeks: u32,
    pub total_potential: u32,
}

impl BenefitCalculation {
    pub fn new(weekly_benefit_amount: u32, max_duration_weeks: u32) -> Self {
        Self {
            weekly_benefit_amount,
            max_duration_weeks,
            total_potential: weekly_benefit_amount.saturating_mul(max_duration_weeks),
        }
    }

    pub fn fallback() -> Self {
        Self::new(FALLBACK_WEEKLY_BENEFIT, FALLBACK_MAX_WEEKS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenefitCap {
    Minimum,
    Maximum,
}

/// Claimant-specific weekly benefit derived from the high quarter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyBenefitEstimate {
    pub high_quarter: f64,
    pub divisor: f64,
    pub pre_cap_amount: f64,
    pub weekly_benefit_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cap_applied: Option<BenefitCap>,
    pub max_duration_weeks: u32,
    pub total_potential: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BenefitEstimateError {
    #[error(transparent)]
    StateNotSupported(#[from] StateNotSupported),
    #[error("at least {required} quarters of earnings are needed (found {found})")]
    InsufficientQuarters { required: usize, found: usize },
    #[error("quarterly earnings must be finite and non-negative (found {0})")]
    InvalidEarnings(f64),
}

/// Looks up benefit caps and computes individual estimates from the rule store.
#[derive(Debug, Clone)]
pub struct BenefitCalculator {
    store: Arc<RuleStore>,
}

impl BenefitCalculator {
    pub fn new(store: Arc<RuleStore>) -> Self {
        Self { store }
    }

    /// Returns the state's maximum weekly benefit and duration. Quarterly
    /// earnings do not change the figure; unknown states get a fixed fallback.
    pub fn calculate_benefits(
        &self,
        state_code: &str,
        _quarterly_earnings: &[f64],
    ) -> BenefitCalculation {
        match self.store.get_state_batch(state_code) {
            Ok(batch) => {
                BenefitCalculation::new(batch.weekly_benefit.max_wba, batch.duration.max_weeks)
            }
            Err(err) => {
                warn!(state = %err.code, "no benefit caps for state, using fallback");
                BenefitCalculation::fallback()
            }
        }
    }

    /// Divides the highest of the four most recent quarters by the state
    /// divisor and clamps the result to the state's weekly range.
    pub fn estimate_weekly_benefit(
        &self,
        state_code: &str,
        quarterly_earnings: &[f64],
    ) -> Result<WeeklyBenefitEstimate, BenefitEstimateError> {
        let batch = self.store.get_state_batch(state_code)?;
        if quarterly_earnings.len() < ESTIMATE_QUARTERS {
            return Err(BenefitEstimateError::InsufficientQuarters {
                required: ESTIMATE_QUARTERS,
                found: quarterly_earnings.len(),
            });
        }
        if let Some(bad) = quarterly_earnings
            .iter()
            .find(|value| !value.is_finite() || **value < 0.0)
        {
            return Err(BenefitEstimateError::InvalidEarnings(*bad));
        }

        let recent = &quarterly_earnings[quarterly_earnings.len() - ESTIMATE_QUARTERS..];
        let high_quarter = recent.iter().copied().fold(0.0, f64::max);
        let divisor = batch.weekly_benefit.divisor;
        let pre_cap_amount = round_cents(high_quarter / divisor);

        let min = f64::from(batch.weekly_benefit.min_wba);
        let max = f64::from(batch.weekly_benefit.max_wba);
        let (weekly_benefit_amount, cap_applied) = if to_cents(pre_cap_amount) > to_cents(max) {
            (max, Some(BenefitCap::Maximum))
        } else if to_cents(pre_cap_amount) < to_cents(min) {
            (min, Some(BenefitCap::Minimum))
        } else {
            (pre_cap_amount, None)
        };

        let max_duration_weeks = batch.duration.max_weeks;
        Ok(WeeklyBenefitEstimate {
            high_quarter,
            divisor,
            pre_cap_amount,
            weekly_benefit_amount,
            cap_applied,
            max_duration_weeks,
            total_potential: round_cents(weekly_benefit_amount * f64::from(max_duration_weeks)),
        })
    }
}

fn round_cents(value: f64) -> f64 {
    to_cents(value) as f64 / 100.0
}
