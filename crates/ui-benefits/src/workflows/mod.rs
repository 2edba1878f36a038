pub mod eligibility;
pub mod wage_history;
