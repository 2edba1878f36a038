use crate::infra::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;
use ui_benefits::error::AppError;
use ui_benefits::workflows::eligibility::{
    eligibility_router, EligibilityService, HandbookRetriever, Language,
    MonetaryEligibilityResult, MonetaryInputs, QualitativeAssessor,
};
use ui_benefits::workflows::wage_history::{WageHistory, WageHistoryImporter};

#[derive(Debug, Deserialize)]
pub(crate) struct WageHistoryRequest {
    pub(crate) csv: String,
    /// When present, the imported history is also run through the state's checks.
    #[serde(default)]
    pub(crate) state_code: Option<String>,
    #[serde(default)]
    pub(crate) hours_worked: Option<u32>,
    #[serde(default)]
    pub(crate) weeks_worked: Option<u32>,
    #[serde(default)]
    pub(crate) language: Language,
}

#[derive(Debug, Serialize)]
pub(crate) struct WageHistoryResponse {
    pub(crate) history: WageHistory,
    pub(crate) inputs: MonetaryInputs,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) monetary: Option<MonetaryEligibilityResult>,
}

pub(crate) fn with_application_routes<R, A>(service: Arc<EligibilityService<R, A>>) -> Router
where
    R: HandbookRetriever + 'static,
    A: QualitativeAssessor + 'static,
{
    let imports = Router::new()
        .route(
            "/api/v1/wage-history/import",
            post(wage_history_endpoint::<R, A>),
        )
        .with_state(Arc::clone(&service));

    eligibility_router(service)
        .merge(imports)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn wage_history_endpoint<R, A>(
    State(service): State<Arc<EligibilityService<R, A>>>,
    Json(payload): Json<WageHistoryRequest>,
) -> Result<Json<WageHistoryResponse>, AppError>
where
    R: HandbookRetriever + 'static,
    A: QualitativeAssessor + 'static,
{
    let WageHistoryRequest {
        csv,
        state_code,
        hours_worked,
        weeks_worked,
        language,
    } = payload;

    let history = WageHistoryImporter::from_reader(Cursor::new(csv.into_bytes()))?;
    let mut inputs = history.to_monetary_inputs();
    inputs.hours_worked = hours_worked;
    inputs.weeks_worked = weeks_worked;

    let monetary = state_code
        .map(|code| service.run_monetary_eligibility(&code, &inputs, language))
        .transpose()?;

    Ok(Json(WageHistoryResponse {
        history,
        inputs,
        monetary,
    }))
}
