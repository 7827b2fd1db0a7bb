use std::net::SocketAddr;

use anyhow::Result;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::config::Config;
use crate::economics::{
    margin_snapshot, unit_cost, MarginInputs, MarginSnapshot, QuoteTerms, UnitCostBreakdown,
    UnitCostInputs,
};
use crate::engine::{
    ClassificationResult, Engine, Evaluation, QuoteOutcome, RecommendationResult,
    ScorecardResult, ValueMetricRanking, ValuePosition,
};
use crate::profile::{BusinessProfile, ProfileInput};
use crate::reference::{CatalogId, CatalogSummary, Comparable};

#[derive(Clone)]
struct ApiState {
    engine: Engine,
    config: Config,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Debug, Clone, Deserialize)]
struct QuoteRequest {
    profile: ProfileInput,
    #[serde(flatten)]
    terms: QuoteTerms,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ComparablesQuery {
    archetype: Option<String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    reference_fingerprint: String,
}

#[derive(Debug, Serialize)]
struct RecommendResponse {
    classification: ClassificationResult,
    value_metrics: ValueMetricRanking,
    recommendation: RecommendationResult,
    principles: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ComparablesResponse {
    comparables: Vec<Comparable>,
}

pub async fn run_server(engine: Engine, config: Config, bind: SocketAddr) -> Result<()> {
    let state = ApiState { engine, config };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/v1/catalog", get(catalog))
        .route("/v1/comparables", get(comparables))
        .route("/v1/config", get(show_config))
        .route("/v1/evaluate", post(evaluate))
        .route("/v1/classify", post(classify))
        .route("/v1/recommend", post(recommend))
        .route("/v1/value-position", post(value_position))
        .route("/v1/scorecard", post(scorecard))
        .route("/v1/quote", post(quote))
        .route("/v1/margin", post(margin))
        .route("/v1/unit-cost", post(unit_cost_breakdown))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("REST API listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health(State(state): State<ApiState>) -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        reference_fingerprint: state.engine.catalog().fingerprint().to_string(),
    })
}

async fn catalog(State(state): State<ApiState>) -> Json<ApiResponse<CatalogSummary>> {
    ok(state.engine.catalog().summary())
}

async fn comparables(
    State(state): State<ApiState>,
    Query(query): Query<ComparablesQuery>,
) -> ApiResult<ComparablesResponse> {
    let archetype = query.archetype.map(|raw| CatalogId::new(raw.trim()));
    if let Some(id) = &archetype {
        if state.engine.catalog().archetype(id).is_none() {
            return Err(ApiError::not_found(format!("unknown archetype `{id}`")));
        }
    }
    let comparables = state
        .engine
        .catalog()
        .comparables_for(archetype.as_ref())
        .cloned()
        .collect();
    Ok(ok(ComparablesResponse { comparables }))
}

async fn show_config(State(state): State<ApiState>) -> Json<ApiResponse<Config>> {
    ok(state.config)
}

async fn evaluate(
    State(state): State<ApiState>,
    Json(input): Json<ProfileInput>,
) -> ApiResult<Evaluation> {
    let profile = validate_profile(input)?;
    Ok(ok(state.engine.evaluate(&profile)))
}

async fn classify(
    State(state): State<ApiState>,
    Json(input): Json<ProfileInput>,
) -> ApiResult<ClassificationResult> {
    let profile = validate_profile(input)?;
    Ok(ok(state.engine.classify(&profile)))
}

async fn recommend(
    State(state): State<ApiState>,
    Json(input): Json<ProfileInput>,
) -> ApiResult<RecommendResponse> {
    let profile = validate_profile(input)?;
    let classification = state.engine.classify(&profile);
    let value_metrics = state.engine.map_value_metrics(&profile, &classification);
    let recommendation = state
        .engine
        .recommend(&profile, &classification, &value_metrics);
    let principles = state.engine.principles(&classification);
    Ok(ok(RecommendResponse {
        classification,
        value_metrics,
        recommendation,
        principles,
    }))
}

async fn value_position(
    State(state): State<ApiState>,
    Json(input): Json<ProfileInput>,
) -> ApiResult<ValuePosition> {
    let profile = validate_profile(input)?;
    Ok(ok(state.engine.value_position(&profile)))
}

async fn scorecard(
    State(state): State<ApiState>,
    Json(input): Json<ProfileInput>,
) -> ApiResult<ScorecardResult> {
    let profile = validate_profile(input)?;
    Ok(ok(state.engine.score(&profile)))
}

async fn quote(
    State(state): State<ApiState>,
    Json(request): Json<QuoteRequest>,
) -> ApiResult<QuoteOutcome> {
    let profile = validate_profile(request.profile)?;
    let model = request.model.map(|raw| CatalogId::new(raw.trim()));
    let outcome = state
        .engine
        .quote(&profile, &request.terms, model.as_ref())
        .map_err(|error| ApiError::not_found(error.to_string()))?;
    Ok(ok(outcome))
}

async fn margin(Json(inputs): Json<MarginInputs>) -> ApiResult<MarginSnapshot> {
    let snapshot =
        margin_snapshot(&inputs).map_err(|error| ApiError::bad_request(error.to_string()))?;
    Ok(ok(snapshot))
}

async fn unit_cost_breakdown(Json(inputs): Json<UnitCostInputs>) -> ApiResult<UnitCostBreakdown> {
    let breakdown = unit_cost(&inputs).map_err(|error| ApiError::bad_request(error.to_string()))?;
    Ok(ok(breakdown))
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { ok: true, data })
}

fn validate_profile(input: ProfileInput) -> std::result::Result<BusinessProfile, ApiError> {
    input.validate().map_err(|error| {
        warn!("rejected profile: {error}");
        ApiError::bad_request(error.to_string())
    })
}
