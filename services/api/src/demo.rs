use crate::infra::{build_service, load_rule_store, HandbookExcerpt, KeywordHandbookRetriever};
use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use ui_benefits::config::RetrievalConfig;
use ui_benefits::error::AppError;
use ui_benefits::workflows::eligibility::assessment::EmploymentDates;
use ui_benefits::workflows::eligibility::benefits::BenefitEstimateError;
use ui_benefits::workflows::eligibility::{
    BenefitCalculation, ClaimantFacts, CollaboratorError, EligibilityReport,
    EligibilityReportRequest, EligibilityService, HandbookSection, Language,
    MonetaryEligibilityResult, MonetaryInputs, QualitativeAssessor, QualitativeOutcome,
    RetrievalOptions, RuleStore, StateCode, WeeklyBenefitEstimate,
};
use ui_benefits::workflows::wage_history::WageHistoryImporter;

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// Two-letter state code (case-insensitive)
    #[arg(long)]
    pub(crate) state: String,
    /// Total base period wages. Defaults to the sum of the quarterly wages.
    #[arg(long, required_unless_present_any = ["quarters", "wages_csv"])]
    pub(crate) base_period_wages: Option<f64>,
    /// Wages for one base period quarter, oldest first. Repeat per quarter.
    #[arg(long = "quarter", conflicts_with = "wages_csv")]
    pub(crate) quarters: Vec<f64>,
    /// Quarter,Wages CSV export to build the wage inputs from
    #[arg(long)]
    pub(crate) wages_csv: Option<PathBuf>,
    /// Highest quarter wages when no quarterly breakdown is available
    #[arg(long)]
    pub(crate) highest_quarter: Option<f64>,
    /// Number of base period quarters with wages
    #[arg(long)]
    pub(crate) quarters_with_wages: Option<u8>,
    /// Hours worked in the base period
    #[arg(long)]
    pub(crate) hours: Option<u32>,
    /// Weeks worked in the base period
    #[arg(long)]
    pub(crate) weeks: Option<u32>,
    /// Why the claimant separated from the last employer. Produces a full report.
    #[arg(long)]
    pub(crate) separation_reason: Option<String>,
    /// Separation category such as layoff or quit
    #[arg(long)]
    pub(crate) separation_type: Option<String>,
    /// First day of the last employment (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date, requires = "employment_end")]
    pub(crate) employment_start: Option<NaiveDate>,
    /// Last day of the last employment (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date, requires = "employment_start")]
    pub(crate) employment_end: Option<NaiveDate>,
    /// Output language (en or es)
    #[arg(long, value_parser = crate::infra::parse_language, default_value = "en")]
    pub(crate) language: Language,
    /// Load state rules from this JSON file instead of the bundled dataset
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
    /// Print the result as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct StatesArgs {
    /// Load state rules from this JSON file instead of the bundled dataset
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
    /// Print every state batch as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Output language for check explanations (en or es)
    #[arg(long, value_parser = crate::infra::parse_language, default_value = "en")]
    pub(crate) language: Language,
    /// Skip the combined report with the sample qualitative assessor
    #[arg(long)]
    pub(crate) skip_report: bool,
}

pub(crate) fn run_check(args: CheckArgs) -> Result<(), AppError> {
    let store = load_rule_store(args.rules.as_deref())?;
    let service = build_service(
        store,
        KeywordHandbookRetriever::default(),
        &RetrievalConfig::default(),
    );
    let inputs = check_inputs(&args)?;

    if args.separation_reason.is_some() || args.separation_type.is_some() {
        let employment_dates = match (args.employment_start, args.employment_end) {
            (Some(start), Some(end)) => Some(EmploymentDates { start, end }),
            _ => None,
        };
        let request = EligibilityReportRequest {
            state_code: args.state.clone(),
            inputs,
            separation_type: args.separation_type.clone(),
            separation_reason: args.separation_reason.clone(),
            employment_dates,
            language: args.language,
        };
        let report = service.report(&request)?;
        if args.json {
            print_json(&report);
        } else {
            render_report(&report);
        }
        return Ok(());
    }

    let result = service.run_monetary_eligibility(&args.state, &inputs, args.language)?;
    let benefits = service.calculate_benefits(&args.state, &inputs.quarterly_wages);
    let estimate = service.estimate_weekly_benefit(&args.state, &inputs.quarterly_wages);

    if args.json {
        print_json(&json!({
            "monetary": result,
            "benefits": benefits,
            "weekly_estimate": estimate.as_ref().ok(),
            "estimate_error": estimate.as_ref().err().map(ToString::to_string),
        }));
    } else {
        render_monetary(&result);
        render_benefits(&benefits, &estimate);
    }
    Ok(())
}

fn check_inputs(args: &CheckArgs) -> Result<MonetaryInputs, AppError> {
    let mut inputs = match &args.wages_csv {
        Some(path) => {
            let history = WageHistoryImporter::from_path(path)?;
            println!(
                "Imported {} quarters of wages ({} through {})",
                history.len(),
                history
                    .entries()
                    .first()
                    .map(|entry| entry.quarter.to_string())
                    .unwrap_or_default(),
                history
                    .entries()
                    .last()
                    .map(|entry| entry.quarter.to_string())
                    .unwrap_or_default()
            );
            history.to_monetary_inputs()
        }
        None => MonetaryInputs::with_quarters(
            args.base_period_wages
                .unwrap_or_else(|| args.quarters.iter().sum()),
            args.quarters.clone(),
        ),
    };

    if let Some(base_period_wages) = args.base_period_wages {
        inputs.base_period_wages = base_period_wages;
    }
    inputs.highest_quarter_wages = args.highest_quarter.or(inputs.highest_quarter_wages);
    inputs.quarters_with_wages = args.quarters_with_wages.or(inputs.quarters_with_wages);
    inputs.hours_worked = args.hours.or(inputs.hours_worked);
    inputs.weeks_worked = args.weeks.or(inputs.weeks_worked);
    Ok(inputs)
}

pub(crate) fn run_states(args: StatesArgs) -> Result<(), AppError> {
    let store = load_rule_store(args.rules.as_deref())?;

    if args.json {
        let batches: Vec<_> = store.batches().collect();
        print_json(&batches);
        return Ok(());
    }

    let metadata = store.metadata();
    println!(
        "{} ({} v{}, effective {})",
        metadata.title, metadata.source, metadata.version, metadata.effective_year
    );
    for batch in store.batches() {
        println!(
            "- {} {}: {} | ${}-${} weekly | up to {} weeks",
            batch.state_code,
            batch.state_name,
            batch.primary_module,
            batch.weekly_benefit.min_wba,
            batch.weekly_benefit.max_wba,
            batch.duration.max_weeks
        );
        for check in &batch.checks {
            let marker = if check.required { "required" } else { "informational" };
            println!("    {} ({})", check.module(), marker);
        }
    }

    let join = |codes: std::collections::BTreeSet<StateCode>| {
        codes
            .iter()
            .map(StateCode::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };
    println!("States asking for hours worked: {}", join(store.states_requiring_hours()));
    println!("States asking for weeks worked: {}", join(store.states_requiring_weeks()));
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        language,
        skip_report,
    } = args;

    println!("Unemployment insurance monetary eligibility demo");
    let store = load_rule_store(None)?;
    let service = build_service(
        Arc::clone(&store),
        KeywordHandbookRetriever::default(),
        &RetrievalConfig::default(),
    );

    for (state, label, inputs) in demo_claimants() {
        println!("\n{label}");
        match service.run_monetary_eligibility(state, &inputs, language) {
            Ok(result) => render_monetary(&result),
            Err(err) => println!("  Evaluation unavailable: {}", err),
        }
        let benefits = service.calculate_benefits(state, &inputs.quarterly_wages);
        let estimate = service.estimate_weekly_benefit(state, &inputs.quarterly_wages);
        render_benefits(&benefits, &estimate);
    }

    if skip_report {
        return Ok(());
    }

    println!("\nCombined report with the sample handbook and keyword assessor");
    let report_service = sample_report_service(store);
    let request = EligibilityReportRequest {
        state_code: "CA".to_string(),
        inputs: MonetaryInputs::with_quarters(
            52_000.0,
            vec![12_000.0, 13_000.0, 13_000.0, 14_000.0],
        ),
        separation_type: Some("layoff".to_string()),
        separation_reason: Some("laid off due to lack of work".to_string()),
        employment_dates: None,
        language,
    };
    match report_service.report(&request) {
        Ok(report) => render_report(&report),
        Err(err) => println!("  Report unavailable: {}", err),
    }

    Ok(())
}

fn demo_claimants() -> Vec<(&'static str, &'static str, MonetaryInputs)> {
    vec![
        (
            "CA",
            "California claimant with a steady year of wages",
            MonetaryInputs::with_quarters(52_000.0, vec![12_000.0, 13_000.0, 13_000.0, 14_000.0]),
        ),
        (
            "WA",
            "Washington claimant who has not reported hours yet",
            MonetaryInputs::with_quarters(30_000.0, vec![7_000.0, 7_500.0, 7_500.0, 8_000.0]),
        ),
        (
            "WA",
            "Washington claimant with 720 hours",
            MonetaryInputs::with_quarters(30_000.0, vec![7_000.0, 7_500.0, 7_500.0, 8_000.0])
                .hours(720),
        ),
        (
            "NJ",
            "New Jersey claimant with 22 base weeks",
            MonetaryInputs::with_quarters(16_000.0, vec![3_000.0, 4_000.0, 4_500.0, 4_500.0])
                .weeks(22),
        ),
        (
            "TX",
            "Texas claimant with a short work history",
            MonetaryInputs::with_quarters(2_400.0, vec![0.0, 0.0, 900.0, 1_500.0]),
        ),
    ]
}

type SampleService = EligibilityService<KeywordHandbookRetriever, KeywordAssessor>;

fn sample_report_service(store: Arc<RuleStore>) -> SampleService {
    let retriever = match StateCode::parse("CA") {
        Ok(state) => KeywordHandbookRetriever::default().with_excerpts(state, sample_handbook()),
        Err(_) => KeywordHandbookRetriever::default(),
    };
    EligibilityService::new(store, Arc::new(retriever), Arc::new(KeywordAssessor))
        .with_retrieval_options(RetrievalOptions::new(3, 0.3))
}

fn sample_handbook() -> Vec<HandbookExcerpt> {
    vec![
        HandbookExcerpt {
            section_id: "SAMPLE-LAYOFF".to_string(),
            title: "Lack of work".to_string(),
            content: "Claimants laid off due to lack of work meet the separation requirement \
                      for unemployment eligibility when their wages qualify."
                .to_string(),
        },
        HandbookExcerpt {
            section_id: "SAMPLE-QUIT".to_string(),
            title: "Voluntary quit".to_string(),
            content: "A claimant who quit work must show good cause for leaving.".to_string(),
        },
        HandbookExcerpt {
            section_id: "SAMPLE-MISCONDUCT".to_string(),
            title: "Discharge for misconduct".to_string(),
            content: "Claimants fired for misconduct connected with the work are disqualified."
                .to_string(),
        },
    ]
}

/// Screens the separation reason for a few phrases. Stands in for a model
/// during demos.
struct KeywordAssessor;

impl QualitativeAssessor for KeywordAssessor {
    fn assess(
        &self,
        facts: &ClaimantFacts,
        sections: &[HandbookSection],
    ) -> Result<String, CollaboratorError> {
        let reason = facts
            .separation_reason
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();
        let (assessment, confidence, risk_factors) =
            if reason.contains("lack of work") || reason.contains("laid off") {
                ("likely", 75, Vec::new())
            } else if reason.contains("misconduct") {
                ("unlikely", 60, vec!["discharge for misconduct"])
            } else {
                ("uncertain", 40, vec!["separation reason needs review"])
            };

        let payload = json!({
            "assessment": assessment,
            "confidence_score": confidence,
            "risk_factors": risk_factors,
            "reasoning_summary": format!(
                "Keyword screen of the separation reason against {} handbook excerpts.",
                sections.len()
            ),
            "key_citations": sections
                .iter()
                .take(2)
                .map(|section| section.section_id.clone())
                .collect::<Vec<_>>(),
        });
        Ok(payload.to_string())
    }
}

fn render_monetary(result: &MonetaryEligibilityResult) {
    println!(
        "- {} ({}): {}",
        result.state_name, result.state_code, result.summary
    );
    for check in &result.checks {
        let marker = match (check.passed, check.required) {
            (true, _) => "pass",
            (false, true) => "FAIL",
            (false, false) => "note",
        };
        println!(
            "  [{}] {}: {} against {}",
            marker, check.module, check.actual_value, check.required_value
        );
        println!("         {}", check.explanation);
    }
    if let Some(missing) = result.missing_required_input() {
        let fields: Vec<&str> = missing.iter().map(|field| field.as_str()).collect();
        println!("  Missing inputs: {}", fields.join(", "));
    }
}

fn render_benefits(
    benefits: &BenefitCalculation,
    estimate: &Result<WeeklyBenefitEstimate, BenefitEstimateError>,
) {
    println!(
        "  Benefit ceiling: ${} weekly for up to {} weeks (${} total)",
        benefits.weekly_benefit_amount, benefits.max_duration_weeks, benefits.total_potential
    );
    match estimate {
        Ok(estimate) => {
            let cap = estimate
                .cap_applied
                .map(|cap| format!(" ({cap:?} applied)"))
                .unwrap_or_default();
            println!(
                "  Estimated weekly benefit: ${:.2}{} from a ${:.2} high quarter / {}",
                estimate.weekly_benefit_amount, cap, estimate.high_quarter, estimate.divisor
            );
        }
        Err(err) => println!("  Estimated weekly benefit unavailable: {}", err),
    }
}

fn render_report(report: &EligibilityReport) {
    render_monetary(&report.monetary);

    match &report.qualitative {
        QualitativeOutcome::Assessed {
            result,
            cited_sections,
        } => {
            if let Some(label) = &report.qualitative_label {
                println!("  Qualitative: {} ({})", label.title, label.description);
            }
            println!(
                "  Confidence {:.0} | {}",
                result.confidence_score, result.reasoning_summary
            );
            if !result.risk_factors.is_empty() {
                println!("  Risk factors: {}", result.risk_factors.join("; "));
            }
            if !cited_sections.is_empty() {
                println!("  Citations: {}", cited_sections.join(", "));
            }
        }
        QualitativeOutcome::Skipped { reason } => println!("  Qualitative skipped: {}", reason),
        QualitativeOutcome::Unavailable { reason } => {
            println!("  Qualitative unavailable: {}", reason)
        }
    }

    if let Some(preliminary) = report
        .preliminary
        .as_ref()
        .and_then(|partial| partial.preliminary_assessment.as_ref())
    {
        println!(
            "  Preliminary: {:?} (factors: {})",
            preliminary.likelihood_range,
            preliminary.key_factors.join(", ")
        );
    }

    println!(
        "  Benefit ceiling: ${} weekly for up to {} weeks",
        report.benefits.weekly_benefit_amount, report.benefits.max_duration_weeks
    );
    if let Some(estimate) = &report.weekly_estimate {
        println!(
            "  Estimated weekly benefit: ${:.2}",
            estimate.weekly_benefit_amount
        );
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(err) => println!("JSON output unavailable: {}", err),
    }
}
