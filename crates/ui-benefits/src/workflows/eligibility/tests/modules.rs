use super::common::{custom_engine, custom_store, engine, quarters};
use crate::workflows::eligibility::monetary::{
    CheckDetail, InputField, MonetaryEligibilityEngine, MonetaryInputs, ThresholdDerivation,
};
use crate::workflows::eligibility::rules::ModuleKind;

#[test]
fn georgia_two_highest_quarters_floor() {
    let engine = engine();

    let passing = engine
        .run_monetary_eligibility("GA", &quarters(&[0.0, 0.0, 900.0, 1000.0]))
        .expect("GA evaluates");
    assert!(passing.eligible);

    let failing = engine
        .run_monetary_eligibility("GA", &quarters(&[0.0, 0.0, 500.0, 1000.0]))
        .expect("GA evaluates");
    assert!(!failing.eligible);
    let floor = failing.check(ModuleKind::FlatFloor).expect("flat floor check");
    assert!(!floor.passed);
    assert_eq!(
        floor.explanation,
        "Two highest quarters ($1,500.00) must be at least $1,680.00"
    );
    assert!(failing
        .check(ModuleKind::HqMultiplier)
        .expect("multiplier check")
        .passed);
    assert_eq!(failing.failed_requirements.len(), 1);
}

#[test]
fn illinois_requires_wages_outside_the_high_quarter() {
    let engine = engine();

    let concentrated = engine
        .run_monetary_eligibility("IL", &quarters(&[0.0, 0.0, 0.0, 2000.0]))
        .expect("IL evaluates");
    let outside = concentrated
        .check(ModuleKind::OutsideHq)
        .expect("outside check");
    assert!(!outside.passed);
    assert_eq!(outside.actual_value, "$0.00");
    assert_eq!(outside.required_value, "$440.00");

    let spread = engine
        .run_monetary_eligibility("IL", &quarters(&[0.0, 300.0, 200.0, 1500.0]))
        .expect("IL evaluates");
    assert!(spread.eligible);
}

#[test]
fn pennsylvania_outside_share_is_a_percentage_of_base_period() {
    let engine = engine();

    let result = engine
        .run_monetary_eligibility("PA", &quarters(&[0.0, 0.0, 500.0, 2000.0]).weeks(20))
        .expect("PA evaluates");
    let outside = result.check(ModuleKind::OutsideHq).expect("outside check");
    assert!(!outside.passed);
    assert_eq!(
        outside.explanation,
        "Wages outside your highest quarter ($500.00) must be at least 37% of base period wages = $925.00"
    );
    match &outside.detail {
        CheckDetail::Wages { derivation, .. } => assert!(matches!(
            derivation,
            ThresholdDerivation::PercentOf { base, .. } if *base == 2500.0
        )),
        other => panic!("unexpected detail {other:?}"),
    }

    let balanced = engine
        .run_monetary_eligibility(
            "PA",
            &quarters(&[1000.0, 1000.0, 1000.0, 2000.0]).weeks(18),
        )
        .expect("PA evaluates");
    assert!(balanced.eligible);
}

#[test]
fn vermont_outside_share_is_inclusive_of_the_percentage_of_high_quarter() {
    let engine = engine();

    let short = engine
        .run_monetary_eligibility("VT", &quarters(&[0.0, 0.0, 1000.0, 3000.0]))
        .expect("VT evaluates");
    assert!(!short.eligible);
    assert_eq!(
        short
            .check(ModuleKind::OutsideHq)
            .expect("outside check")
            .required_value,
        "$1,200.00"
    );

    let exact = engine
        .run_monetary_eligibility("VT", &quarters(&[0.0, 600.0, 600.0, 3000.0]))
        .expect("VT evaluates");
    assert!(exact.eligible);
}

#[test]
fn texas_threshold_uses_state_minimum_weekly_benefit() {
    let result = engine()
        .run_monetary_eligibility("TX", &quarters(&[0.0, 0.0, 1350.0, 1351.0]))
        .expect("TX evaluates");
    let check = result
        .check(ModuleKind::WbaMultiplier)
        .expect("wba multiplier check");
    assert!(check.passed);
    assert_eq!(check.required_value, "$2,701.00 (37x WBA)");
    assert!(result.eligible);

    let short = engine()
        .run_monetary_eligibility("TX", &quarters(&[0.0, 0.0, 1350.0, 1350.0]))
        .expect("TX evaluates");
    assert!(!short.eligible);
    assert_eq!(
        short.failed_requirements,
        vec![
            "Base period wages ($2,700.00) must be at least 37x the weekly benefit amount ($73.00) = $2,701.00"
                .to_string()
        ]
    );
}

#[test]
fn arizona_high_quarter_must_cover_minimum_wage_hours() {
    let engine = engine();

    let passing = engine
        .run_monetary_eligibility("AZ", &quarters(&[0.0, 3000.0, 3000.0, 5733.0]))
        .expect("AZ evaluates");
    assert!(passing.eligible);

    let failing = engine
        .run_monetary_eligibility("AZ", &quarters(&[0.0, 3000.0, 3000.0, 5700.0]))
        .expect("AZ evaluates");
    let check = failing
        .check(ModuleKind::MinWageMultiplier)
        .expect("minimum wage check");
    assert!(!check.passed);
    assert_eq!(
        check.explanation,
        "Highest quarter wages ($5,700.00) must be at least 390 hours at $14.70/hour = $5,733.00"
    );
}

#[test]
fn minnesota_and_wyoming_use_percentages_of_annual_average_wage() {
    let engine = engine();

    let minnesota = engine
        .run_monetary_eligibility("MN", &quarters(&[0.0, 0.0, 2000.0, 2028.0]))
        .expect("MN evaluates");
    assert!(minnesota.eligible);
    assert_eq!(
        minnesota
            .check(ModuleKind::StateAww)
            .expect("average wage check")
            .required_value,
        "$4,028.00"
    );

    let wyoming = engine
        .run_monetary_eligibility("WY", &quarters(&[1000.0, 1000.0, 1000.0, 1799.0]))
        .expect("WY evaluates");
    assert!(!wyoming.eligible);
    assert_eq!(
        wyoming
            .check(ModuleKind::StateAww)
            .expect("average wage check")
            .explanation,
        "Base period wages ($4,799.00) must be at least $4,800.00 based on state average wages"
    );
}

#[test]
fn ohio_compares_average_weekly_wage_to_weekly_state_average() {
    let engine = engine();

    let exact = engine
        .run_monetary_eligibility(
            "OH",
            &MonetaryInputs::with_quarters(17_160.0, vec![]).weeks(20),
        )
        .expect("OH evaluates");
    let check = exact.check(ModuleKind::StateAww).expect("average wage check");
    assert!(check.passed);
    assert_eq!(check.actual_value, "$330.00");
    assert_eq!(check.required_value, "$330.00");

    let short = engine
        .run_monetary_eligibility(
            "OH",
            &MonetaryInputs::with_quarters(17_108.0, vec![]).weeks(20),
        )
        .expect("OH evaluates");
    assert!(!short.eligible);
}

#[test]
fn high_quarter_floor_with_quarter_count_counts_qualifying_quarters() {
    let engine = custom_engine(
        "HQ_FLOOR",
        r#"[{"module": "HQ_FLOOR", "params": {"min_amount": 1000, "min_quarters": 2}}]"#,
    );

    let result = engine
        .run_monetary_eligibility("XX", &quarters(&[400.0, 999.99, 1000.0, 5000.0]))
        .expect("fixture evaluates");
    assert!(result.eligible);
    let check = result.check(ModuleKind::HqFloor).expect("floor check");
    assert_eq!(check.actual_value, "2 quarters with $1,000.00+");
    assert_eq!(check.required_value, "$1,000.00 in 2 quarters");

    let single = engine
        .run_monetary_eligibility("XX", &quarters(&[400.0, 500.0, 600.0, 5000.0]))
        .expect("fixture evaluates");
    assert!(!single.eligible);
    assert_eq!(
        single.failed_requirements,
        vec!["Need at least $1,000.00 in 2 quarters, but only 1 qualify".to_string()]
    );
}

#[test]
fn high_quarter_multiplier_tolerance_lowers_the_threshold() {
    let engine = custom_engine(
        "HQ_MULTIPLIER",
        r#"[{"module": "HQ_MULTIPLIER", "params": {"multiplier": 1.5, "tolerance": 100}}]"#,
    );

    let result = engine
        .run_monetary_eligibility("XX", &quarters(&[0.0, 0.0, 400.0, 1000.0]))
        .expect("fixture evaluates");
    let check = result.check(ModuleKind::HqMultiplier).expect("multiplier");
    assert!(check.passed);
    assert_eq!(check.required_value, "$1,400.00 (1.5x HQW)");
}

#[test]
fn minimum_wage_multiplier_falls_back_to_federal_wage() {
    let checks = r#"[{"module": "MIN_WAGE_MULTIPLIER", "params": {"multiplier": 400}}]"#;
    let engine = MonetaryEligibilityEngine::new(custom_store("MIN_WAGE_MULTIPLIER", checks, "{}"));

    let result = engine
        .run_monetary_eligibility("XX", &MonetaryInputs::with_quarters(2900.0, vec![]))
        .expect("fixture evaluates");
    let check = result.check(ModuleKind::MinWageMultiplier).expect("check");
    assert!(check.passed);
    assert_eq!(check.required_value, "$2,900.00");

    let federal_checks = r#"[{"module": "MIN_WAGE_MULTIPLIER", "params": {"multiplier": 400, "wage_type": "federal_hourly"}}]"#;
    let engine = MonetaryEligibilityEngine::new(custom_store(
        "MIN_WAGE_MULTIPLIER",
        federal_checks,
        r#"{"state_minimum_wage": 15.0}"#,
    ));
    let result = engine
        .run_monetary_eligibility("XX", &MonetaryInputs::with_quarters(2900.0, vec![]))
        .expect("fixture evaluates");
    assert!(result.eligible);
}

#[test]
fn state_average_wage_without_context_uses_default_annual_wage() {
    let engine = custom_engine(
        "STATE_AWW",
        r#"[{"module": "STATE_AWW", "params": {"multiplier": 0.1}}]"#,
    );

    let result = engine
        .run_monetary_eligibility("XX", &MonetaryInputs::with_quarters(5999.0, vec![]))
        .expect("fixture evaluates");
    assert!(!result.eligible);
    assert_eq!(
        result
            .check(ModuleKind::StateAww)
            .expect("average wage check")
            .required_value,
        "$6,000.00"
    );
}

#[test]
fn last_two_quarters_basis_reads_the_newest_quarters() {
    let engine = custom_engine(
        "FLAT_FLOOR",
        r#"[{"module": "FLAT_FLOOR", "params": {"min_amount": 2000, "apply_to": "last_two_quarters"}}]"#,
    );

    let recent = engine
        .run_monetary_eligibility("XX", &quarters(&[5000.0, 5000.0, 1000.0, 1000.0]))
        .expect("fixture evaluates");
    assert!(recent.eligible);

    let early = engine
        .run_monetary_eligibility("XX", &quarters(&[5000.0, 5000.0, 1000.0, 999.0]))
        .expect("fixture evaluates");
    assert!(!early.eligible);
}

#[test]
fn quarter_based_rule_without_breakdown_reports_missing_quarters() {
    let engine = custom_engine(
        "MULTI_QUARTER",
        r#"[{"module": "MULTI_QUARTER", "params": {"min_quarters": 2}}]"#,
    );

    let result = engine
        .run_monetary_eligibility("XX", &MonetaryInputs::with_quarters(8000.0, vec![]))
        .expect("fixture evaluates");
    assert!(!result.eligible);
    assert_eq!(result.missing_inputs, vec![InputField::QuarterlyWages]);
    assert!(result.checks.is_empty());
}
