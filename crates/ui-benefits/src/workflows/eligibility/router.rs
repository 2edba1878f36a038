use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::assessment::{ClaimantFacts, HandbookRetriever, QualitativeAssessor};
use super::benefits::BenefitEstimateError;
use super::localization::Language;
use super::monetary::{EligibilityError, MonetaryInputs};
use super::rules::{DatasetMetadata, ModuleKind, StateCode};
use super::service::{EligibilityReportRequest, EligibilityService};

#[derive(Debug, Deserialize)]
pub(crate) struct MonetaryRequest {
    state_code: String,
    inputs: MonetaryInputs,
    #[serde(default)]
    language: Language,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BenefitsRequest {
    state_code: String,
    #[serde(default)]
    quarterly_earnings: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct StateSummary {
    state_code: StateCode,
    state_name: String,
    primary_module: ModuleKind,
}

#[derive(Debug, Serialize)]
struct StatesIndex {
    metadata: DatasetMetadata,
    states: Vec<StateSummary>,
    states_requiring_hours: BTreeSet<StateCode>,
    states_requiring_weeks: BTreeSet<StateCode>,
    states_by_primary_module: BTreeMap<ModuleKind, BTreeSet<StateCode>>,
}

/// Router builder exposing rule lookups, monetary checks, reports and benefit figures.
pub fn eligibility_router<R, A>(service: Arc<EligibilityService<R, A>>) -> Router
where
    R: HandbookRetriever + 'static,
    A: QualitativeAssessor + 'static,
{
    Router::new()
        .route("/api/v1/states", get(states_handler::<R, A>))
        .route("/api/v1/states/:state_code", get(batch_handler::<R, A>))
        .route(
            "/api/v1/states/:state_code/required-inputs",
            get(required_inputs_handler::<R, A>),
        )
        .route(
            "/api/v1/eligibility/monetary",
            post(monetary_handler::<R, A>),
        )
        .route(
            "/api/v1/eligibility/partial",
            post(partial_handler::<R, A>),
        )
        .route("/api/v1/eligibility/report", post(report_handler::<R, A>))
        .route("/api/v1/benefits", post(benefits_handler::<R, A>))
        .with_state(service)
}

fn error_response(error: EligibilityError) -> Response {
    let status = match error {
        EligibilityError::StateNotSupported(_) => StatusCode::NOT_FOUND,
        EligibilityError::MalformedInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn states_handler<R, A>(
    State(service): State<Arc<EligibilityService<R, A>>>,
) -> Response
where
    R: HandbookRetriever + 'static,
    A: QualitativeAssessor + 'static,
{
    let store = service.store();
    let index = StatesIndex {
        metadata: store.metadata().clone(),
        states: store
            .batches()
            .map(|batch| StateSummary {
                state_code: batch.state_code.clone(),
                state_name: batch.state_name.clone(),
                primary_module: batch.primary_module,
            })
            .collect(),
        states_requiring_hours: store.states_requiring_hours(),
        states_requiring_weeks: store.states_requiring_weeks(),
        states_by_primary_module: store.states_by_primary_module(),
    };
    (StatusCode::OK, axum::Json(index)).into_response()
}

pub(crate) async fn batch_handler<R, A>(
    State(service): State<Arc<EligibilityService<R, A>>>,
    Path(state_code): Path<String>,
) -> Response
where
    R: HandbookRetriever + 'static,
    A: QualitativeAssessor + 'static,
{
    match service.store().get_state_batch(&state_code) {
        Ok(batch) => (StatusCode::OK, axum::Json(batch)).into_response(),
        Err(error) => error_response(error.into()),
    }
}

pub(crate) async fn required_inputs_handler<R, A>(
    State(service): State<Arc<EligibilityService<R, A>>>,
    Path(state_code): Path<String>,
) -> Response
where
    R: HandbookRetriever + 'static,
    A: QualitativeAssessor + 'static,
{
    match service.required_inputs(&state_code) {
        Ok(required) => (StatusCode::OK, axum::Json(required)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn monetary_handler<R, A>(
    State(service): State<Arc<EligibilityService<R, A>>>,
    axum::Json(request): axum::Json<MonetaryRequest>,
) -> Response
where
    R: HandbookRetriever + 'static,
    A: QualitativeAssessor + 'static,
{
    let outcome =
        service.run_monetary_eligibility(&request.state_code, &request.inputs, request.language);
    match outcome {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn partial_handler<R, A>(
    State(service): State<Arc<EligibilityService<R, A>>>,
    axum::Json(facts): axum::Json<ClaimantFacts>,
) -> Response
where
    R: HandbookRetriever + 'static,
    A: QualitativeAssessor + 'static,
{
    if let Err(error) = service.store().get_state_batch(facts.state_code.as_str()) {
        return error_response(error.into());
    }
    let partial = service.partial_assessment(&facts);
    (StatusCode::OK, axum::Json(partial)).into_response()
}

pub(crate) async fn report_handler<R, A>(
    State(service): State<Arc<EligibilityService<R, A>>>,
    axum::Json(request): axum::Json<EligibilityReportRequest>,
) -> Response
where
    R: HandbookRetriever + 'static,
    A: QualitativeAssessor + 'static,
{
    match service.report(&request) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn benefits_handler<R, A>(
    State(service): State<Arc<EligibilityService<R, A>>>,
    axum::Json(request): axum::Json<BenefitsRequest>,
) -> Response
where
    R: HandbookRetriever + 'static,
    A: QualitativeAssessor + 'static,
{
    let earnings = &request.quarterly_earnings;
    let calculation = service.calculate_benefits(&request.state_code, earnings);
    let estimate = service.estimate_weekly_benefit(&request.state_code, earnings);

    let payload = match estimate {
        Ok(estimate) => json!({
            "calculation": calculation,
            "estimate": estimate,
        }),
        Err(BenefitEstimateError::StateNotSupported(_)) => json!({
            "calculation": calculation,
            "estimate": serde_json::Value::Null,
            "fallback": true,
        }),
        Err(error) => json!({
            "calculation": calculation,
            "estimate": serde_json::Value::Null,
            "estimate_error": error.to_string(),
        }),
    };
    (StatusCode::OK, axum::Json(payload)).into_response()
}
