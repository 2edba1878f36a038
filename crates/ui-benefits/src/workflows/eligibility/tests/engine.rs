use super::common::{custom_engine, engine, quarters};
use crate::workflows::eligibility::localization::Language;
use crate::workflows::eligibility::monetary::{
    EligibilityError, InputField, InputViolation, MonetaryInputs,
};
use crate::workflows::eligibility::rules::ModuleKind;

#[test]
fn california_claimant_with_steady_wages_is_eligible() {
    let inputs =
        MonetaryInputs::with_quarters(52_000.0, vec![12_000.0, 13_000.0, 13_000.0, 14_000.0]);

    let result = engine()
        .run_monetary_eligibility("CA", &inputs)
        .expect("CA evaluates");

    assert!(result.eligible);
    assert_eq!(result.state_name, "California");
    assert_eq!(result.language, Language::English);
    assert!(result.failed_requirements.is_empty());
    assert!(result.missing_required_input().is_none());
    assert_eq!(
        result.summary,
        "You appear to meet California's monetary eligibility requirements."
    );
    let modules: Vec<ModuleKind> = result.checks.iter().map(|check| check.module).collect();
    assert_eq!(
        modules,
        vec![
            ModuleKind::FlatFloor,
            ModuleKind::HqFloor,
            ModuleKind::HqMultiplier
        ]
    );
    let multiplier = result.check(ModuleKind::HqMultiplier).expect("multiplier");
    assert_eq!(multiplier.actual_value, "$52,000.00");
    assert_eq!(multiplier.required_value, "$17,500.00 (1.25x HQW)");
}

#[test]
fn thresholds_are_inclusive() {
    let result = engine()
        .run_monetary_eligibility("CA", &quarters(&[400.0, 900.0]))
        .expect("CA evaluates");

    assert!(result.eligible, "{:?}", result.failed_requirements);
    assert!(result.checks.iter().all(|check| check.passed));
}

#[test]
fn washington_without_hours_reports_missing_input() {
    let engine = engine();

    let result = engine
        .run_monetary_eligibility("WA", &MonetaryInputs::with_quarters(30_000.0, vec![]))
        .expect("WA evaluates");
    assert!(!result.eligible);
    assert_eq!(result.missing_inputs, vec![InputField::HoursWorked]);
    assert_eq!(
        result.missing_required_input(),
        Some(&[InputField::HoursWorked][..])
    );
    assert_eq!(result.summary, "Missing required information: hours_worked (680 required)");
    assert!(result.failed_requirements.is_empty());

    let short = engine
        .run_monetary_eligibility(
            "WA",
            &MonetaryInputs::with_quarters(30_000.0, vec![]).hours(679),
        )
        .expect("WA evaluates");
    assert!(!short.eligible);
    assert_eq!(
        short.failed_requirements,
        vec!["You need at least 680 hours worked, but only have 679".to_string()]
    );
    assert_eq!(
        short.summary,
        "You may not meet Washington's monetary eligibility requirements (1 requirement(s) not met)."
    );

    let enough = engine
        .run_monetary_eligibility(
            "WA",
            &MonetaryInputs::with_quarters(30_000.0, vec![]).hours(680),
        )
        .expect("WA evaluates");
    assert!(enough.eligible);
}

#[test]
fn multi_quarter_counts_only_quarters_with_wages() {
    let engine = custom_engine(
        "MULTI_QUARTER",
        r#"[{"module": "MULTI_QUARTER", "params": {"min_quarters": 4}}]"#,
    );

    let result = engine
        .run_monetary_eligibility("XX", &quarters(&[0.0, 0.0, 5000.0, 5000.0]))
        .expect("fixture evaluates");

    let check = result.check(ModuleKind::MultiQuarter).expect("multi quarter");
    assert!(!check.passed);
    assert_eq!(check.actual_value, "2 quarters");
    assert_eq!(check.required_value, "4 quarters");
    assert_eq!(
        check.explanation,
        "You need wages in at least 4 quarters, but only have 2"
    );
}

#[test]
fn informational_failures_do_not_block_eligibility() {
    let result = engine()
        .run_monetary_eligibility(
            "NJ",
            &MonetaryInputs::with_quarters(10_000.0, vec![]).weeks(20),
        )
        .expect("NJ evaluates");

    assert!(result.eligible);
    assert!(result.failed_requirements.is_empty());
    let advisory = result
        .check(ModuleKind::MinWageMultiplier)
        .expect("informational check is still reported");
    assert!(!advisory.required);
    assert!(!advisory.passed);
    assert_eq!(advisory.required_value, "$15,490.00");
}

#[test]
fn informational_checks_without_input_are_skipped() {
    let result = engine()
        .run_monetary_eligibility(
            "OR",
            &MonetaryInputs::with_quarters(2000.0, vec![]).hours(500),
        )
        .expect("OR evaluates");

    assert!(result.eligible);
    assert!(result.missing_inputs.is_empty());
    assert!(result.check(ModuleKind::HqMultiplier).is_none());
    assert_eq!(result.checks.len(), 2);
}

#[test]
fn oregon_wages_alone_do_not_open_a_second_path() {
    let engine = engine();
    let concentrated = quarters(&[0.0, 0.0, 0.0, 2000.0]);

    let without_hours = engine
        .run_monetary_eligibility("OR", &concentrated)
        .expect("OR evaluates");
    assert!(!without_hours.eligible);
    assert_eq!(without_hours.missing_inputs, vec![InputField::HoursWorked]);

    let with_hours = engine
        .run_monetary_eligibility("OR", &concentrated.hours(500))
        .expect("OR evaluates");
    let multiplier = with_hours.check(ModuleKind::HqMultiplier).expect("multiplier");
    assert!(!multiplier.required);
    assert!(!multiplier.passed);
    assert!(with_hours.eligible);
}

#[test]
fn questionnaire_answers_stand_in_for_a_breakdown() {
    let engine = engine();

    let even = MonetaryInputs {
        base_period_wages: 3000.0,
        quarters_with_wages: Some(2),
        ..MonetaryInputs::default()
    };
    let result = engine
        .run_monetary_eligibility("GA", &even)
        .expect("GA evaluates");
    assert!(result.eligible);

    let concentrated = MonetaryInputs {
        highest_quarter_wages: Some(2500.0),
        ..even
    };
    let result = engine
        .run_monetary_eligibility("GA", &concentrated)
        .expect("GA evaluates");
    assert!(!result.eligible);
    assert!(!result
        .check(ModuleKind::HqMultiplier)
        .expect("multiplier")
        .passed);
}

#[test]
fn stated_high_quarter_is_enough_without_a_breakdown() {
    let inputs = MonetaryInputs {
        base_period_wages: 52_000.0,
        highest_quarter_wages: Some(14_000.0),
        ..MonetaryInputs::default()
    };

    let result = engine()
        .run_monetary_eligibility("CA", &inputs)
        .expect("CA evaluates");

    assert!(result.missing_inputs.is_empty(), "{:?}", result.missing_inputs);
    assert!(result.eligible, "{:?}", result.failed_requirements);
    let multiplier = result.check(ModuleKind::HqMultiplier).expect("multiplier");
    assert_eq!(multiplier.required_value, "$17,500.00 (1.25x HQW)");
}

#[test]
fn impossible_questionnaire_answers_are_malformed() {
    let engine = engine();

    let spread_too_thin = MonetaryInputs {
        base_period_wages: 20_000.0,
        highest_quarter_wages: Some(2_000.0),
        quarters_with_wages: Some(4),
        ..MonetaryInputs::default()
    };
    assert!(matches!(
        engine.run_monetary_eligibility("CA", &spread_too_thin),
        Err(EligibilityError::MalformedInput(
            InputViolation::QuartersCannotCoverBasePeriod { .. }
        ))
    ));

    let wages_from_nowhere = MonetaryInputs {
        base_period_wages: 5_000.0,
        quarters_with_wages: Some(0),
        ..MonetaryInputs::default()
    };
    assert!(matches!(
        engine.run_monetary_eligibility("CA", &wages_from_nowhere),
        Err(EligibilityError::MalformedInput(
            InputViolation::WagesWithoutEarningQuarters { .. }
        ))
    ));
}

#[test]
fn unknown_states_are_rejected() {
    let error = engine()
        .run_monetary_eligibility("ZZ", &MonetaryInputs::with_quarters(10_000.0, vec![]))
        .expect_err("ZZ is not in the dataset");

    match error {
        EligibilityError::StateNotSupported(err) => assert_eq!(err.code, "ZZ"),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(
        engine()
            .run_monetary_eligibility("zz", &MonetaryInputs::default())
            .expect_err("unknown")
            .to_string(),
        "state 'ZZ' is not supported"
    );
}

#[test]
fn state_lookup_is_case_insensitive() {
    let result = engine()
        .run_monetary_eligibility("ca", &quarters(&[400.0, 900.0]))
        .expect("lowercase code resolves");
    assert_eq!(result.state_code.as_str(), "CA");
}

#[test]
fn malformed_inputs_are_rejected_before_evaluation() {
    let engine = engine();

    let negative = MonetaryInputs::with_quarters(-1.0, vec![]);
    assert!(matches!(
        engine.run_monetary_eligibility("CA", &negative),
        Err(EligibilityError::MalformedInput(InputViolation::InvalidAmount {
            field: "base_period_wages",
            ..
        }))
    ));

    let inverted = MonetaryInputs {
        base_period_wages: 1000.0,
        highest_quarter_wages: Some(5000.0),
        quarters_with_wages: Some(1),
        ..MonetaryInputs::default()
    };
    assert!(matches!(
        engine.run_monetary_eligibility("CA", &inverted),
        Err(EligibilityError::MalformedInput(
            InputViolation::HighestQuarterExceedsBasePeriod { .. }
        ))
    ));

    let too_many = quarters(&[100.0; 9]);
    assert!(matches!(
        engine.run_monetary_eligibility("CA", &too_many),
        Err(EligibilityError::MalformedInput(InputViolation::TooManyQuarters {
            max: 8,
            found: 9
        }))
    ));
}

#[test]
fn repeated_runs_return_identical_results() {
    let engine = engine();
    let inputs = quarters(&[1000.0, 2000.0, 0.0, 3500.0]).weeks(19);

    let first = engine
        .run_monetary_eligibility("PA", &inputs)
        .expect("PA evaluates");
    let second = engine
        .run_monetary_eligibility("PA", &inputs)
        .expect("PA evaluates");
    assert_eq!(first, second);
}

#[test]
fn required_inputs_follow_required_checks_only() {
    let engine = engine();

    let washington = engine.required_inputs("WA").expect("WA resolves");
    assert!(washington.needs(InputField::HoursWorked));
    assert!(!washington.needs(InputField::QuarterlyWages));
    assert_eq!(washington.min_hours, Some(680));
    assert_eq!(washington.min_weeks, None);

    let oregon = engine.required_inputs("OR").expect("OR resolves");
    assert!(!oregon.needs(InputField::QuarterlyWages));
    assert_eq!(oregon.min_hours, Some(500));

    let pennsylvania = engine.required_inputs("PA").expect("PA resolves");
    assert_eq!(
        pennsylvania.fields.iter().copied().collect::<Vec<_>>(),
        vec![
            InputField::BasePeriodWages,
            InputField::QuarterlyWages,
            InputField::WeeksWorked
        ]
    );
    assert_eq!(pennsylvania.min_weeks, Some(18));

    assert!(engine.required_inputs("ZZ").is_err());
}

#[test]
fn localized_runs_translate_display_strings_only() {
    let engine = engine();
    let inputs = MonetaryInputs::with_quarters(30_000.0, vec![]).hours(100);

    let english = engine
        .run_localized("WA", &inputs, Language::English)
        .expect("WA evaluates");
    let spanish = engine
        .run_localized("WA", &inputs, Language::Spanish)
        .expect("WA evaluates");

    assert_eq!(english.eligible, spanish.eligible);
    assert_eq!(english.checks[0].detail, spanish.checks[0].detail);
    assert_eq!(spanish.language, Language::Spanish);
    assert_eq!(
        spanish.summary,
        "Es posible que no cumplas con los requisitos monetarios de Washington (1 requisito(s) no cumplido(s))."
    );
    assert_eq!(
        spanish.failed_requirements,
        vec!["Necesitas al menos 680 horas trabajadas, pero solo tienes 100".to_string()]
    );
}
