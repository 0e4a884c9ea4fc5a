use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::advisor::{build_recommendations, Recommendation};
use crate::aeration::{calibrated_k, estimate_time, projected_ph, CalibrationSample};
use crate::chemistry::{ChemistryModel, Parameter};
use crate::classify::{check_reading, classify_named, RangeCheck, RangeStatus};
use crate::config::Config;
use crate::solver::{solve_ph_ta, Solution};
use crate::types::{validate_named, ReadingError, WaterReading};

#[derive(Clone)]
struct ApiState {
    config: Arc<Config>,
    model: Arc<ChemistryModel>,
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
    fn bad_request(error: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: error.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<ReadingError> for ApiError {
    fn from(error: ReadingError) -> Self {
        Self::bad_request(error)
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

/// `Json` body extractor whose rejections use the `{ok, error}` envelope.
struct ApiJson<T>(T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(request, state).await?;
        Ok(Self(value))
    }
}

#[derive(Debug, Clone, Deserialize)]
struct SolveRequest {
    ph: f64,
    ta: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct ClassifyRequest {
    parameter: String,
    value: f64,
}

#[derive(Debug, Serialize)]
struct ClassifyResponse {
    parameter: String,
    value: f64,
    status: RangeStatus,
}

#[derive(Debug, Clone, Deserialize)]
struct AdviseRequest {
    #[serde(flatten)]
    reading: WaterReading,
    k: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct EstimateRequest {
    ph_current: f64,
    ph_target: Option<f64>,
    ta: f64,
    k: Option<f64>,
}

#[derive(Debug, Serialize)]
struct EstimateResponse {
    hours: f64,
    k: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct AerationRun {
    ph_before: f64,
    ph_after: f64,
    duration_hours: f64,
    ta: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct CalibrateRequest {
    #[serde(default)]
    runs: Vec<AerationRun>,
}

#[derive(Debug, Serialize)]
struct CalibrateResponse {
    samples: Vec<CalibrationSample>,
    calibrated_k: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct ProjectRequest {
    ph_start: f64,
    elapsed_hours: f64,
    ta: f64,
    k: Option<f64>,
}

#[derive(Debug, Serialize)]
struct ProjectResponse {
    ph: f64,
    k: f64,
    ceiling: f64,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub async fn run_server(config: Config, bind: SocketAddr) -> Result<()> {
    let model = config.build_model()?;
    let state = ApiState {
        config: Arc::new(config),
        model: Arc::new(model),
    };

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("REST API listening on http://{bind}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/v1/config", get(show_config))
        .route("/v1/solve", post(solve))
        .route("/v1/classify", post(classify))
        .route("/v1/check", post(check))
        .route("/v1/advise", post(advise))
        .route("/v1/aeration/estimate", post(aeration_estimate))
        .route("/v1/aeration/calibrate", post(aeration_calibrate))
        .route("/v1/aeration/project", post(aeration_project))
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn show_config(State(state): State<ApiState>) -> Json<ApiResponse<Config>> {
    ok(state.config.as_ref().clone())
}

async fn solve(
    State(state): State<ApiState>,
    ApiJson(request): ApiJson<SolveRequest>,
) -> ApiResult<Solution> {
    WaterReading::default()
        .with(Parameter::Ph, request.ph)
        .with(Parameter::Ta, request.ta)
        .validate()?;
    Ok(ok(solve_ph_ta(&state.model, request.ph, request.ta)))
}

async fn classify(
    State(state): State<ApiState>,
    ApiJson(request): ApiJson<ClassifyRequest>,
) -> ApiResult<ClassifyResponse> {
    validate_named(&request.parameter, request.value)?;
    let status = classify_named(state.model.targets(), &request.parameter, request.value);
    Ok(ok(ClassifyResponse {
        parameter: request.parameter,
        value: request.value,
        status,
    }))
}

async fn check(
    State(state): State<ApiState>,
    ApiJson(reading): ApiJson<WaterReading>,
) -> ApiResult<Vec<RangeCheck>> {
    reading.validate()?;
    Ok(ok(check_reading(state.model.targets(), &reading)))
}

async fn advise(
    State(state): State<ApiState>,
    ApiJson(request): ApiJson<AdviseRequest>,
) -> ApiResult<Vec<Recommendation>> {
    request.reading.validate()?;
    let mut settings = state.config.advisor_settings();
    if let Some(k) = request.k {
        settings.aeration_k = k;
    }
    let recommendations = build_recommendations(&state.model, &request.reading, &settings)
        .map_err(ApiError::bad_request)?;
    Ok(ok(recommendations))
}

async fn aeration_estimate(
    State(state): State<ApiState>,
    ApiJson(request): ApiJson<EstimateRequest>,
) -> ApiResult<EstimateResponse> {
    let k = request.k.unwrap_or_else(|| state.config.effective_k());
    let ph_target = request
        .ph_target
        .unwrap_or_else(|| state.model.spec(Parameter::Ph).target);
    let hours = estimate_time(request.ph_current, ph_target, request.ta, k)
        .map_err(ApiError::bad_request)?;
    Ok(ok(EstimateResponse { hours, k }))
}

async fn aeration_calibrate(
    State(state): State<ApiState>,
    ApiJson(request): ApiJson<CalibrateRequest>,
) -> ApiResult<CalibrateResponse> {
    let samples = request
        .runs
        .iter()
        .map(|run| {
            CalibrationSample::from_run(run.ph_before, run.ph_after, run.duration_hours, run.ta)
        })
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(ApiError::bad_request)?;
    let calibrated_k = calibrated_k(&samples, state.config.aeration.default_k);
    Ok(ok(CalibrateResponse {
        samples,
        calibrated_k,
    }))
}

async fn aeration_project(
    State(state): State<ApiState>,
    ApiJson(request): ApiJson<ProjectRequest>,
) -> ApiResult<ProjectResponse> {
    let k = request.k.unwrap_or_else(|| state.config.effective_k());
    let ceiling = state.config.aeration.ph_ceiling;
    let ph = projected_ph(request.ph_start, request.elapsed_hours, request.ta, k, ceiling)
        .map_err(ApiError::bad_request)?;
    Ok(ok(ProjectResponse { ph, k, ceiling }))
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { ok: true, data })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::RecommendationKind;
    use crate::solver::Strategy;
    use axum::body::Body;
    use tokio_test::block_on;

    fn state() -> ApiState {
        let config = Config::default();
        ApiState {
            model: Arc::new(config.build_model().unwrap()),
            config: Arc::new(config),
        }
    }

    #[test]
    fn router_builds() {
        let _ = router(state());
    }

    #[test]
    fn solve_reports_aeration_as_data() {
        let Json(response) = block_on(solve(
            State(state()),
            ApiJson(SolveRequest { ph: 7.0, ta: 140.0 }),
        ))
        .unwrap();
        assert!(response.ok);
        assert!(!response.data.feasible);
        assert_eq!(response.data.strategy, Strategy::Aeration);
    }

    #[test]
    fn classify_unknown_name_is_within_range() {
        let Json(response) = block_on(classify(
            State(state()),
            ApiJson(ClassifyRequest {
                parameter: "calcium".to_string(),
                value: 900.0,
            }),
        ))
        .unwrap();
        assert_eq!(response.data.status, RangeStatus::WithinRange);
    }

    #[test]
    fn advise_uses_request_rate() {
        let request: AdviseRequest =
            serde_json::from_str(r#"{"ph": 7.4, "ta": 80.0, "k": 0.2}"#).unwrap();
        let Json(response) = block_on(advise(State(state()), ApiJson(request))).unwrap();
        assert!(response.data.is_empty());

        let request: AdviseRequest =
            serde_json::from_str(r#"{"ph": 7.0, "ta": 140.0, "k": 0.2}"#).unwrap();
        let Json(response) = block_on(advise(State(state()), ApiJson(request))).unwrap();
        assert_eq!(response.data[0].kind, RecommendationKind::Aeration);
        assert!((response.data[0].aeration_hours.unwrap() - 1.4).abs() < 1e-9);
    }

    #[test]
    fn estimate_defaults_to_configured_rate_and_target() {
        let Json(response) = block_on(aeration_estimate(
            State(state()),
            ApiJson(EstimateRequest {
                ph_current: 7.0,
                ph_target: None,
                ta: 100.0,
                k: None,
            }),
        ))
        .unwrap();
        assert!((response.data.hours - 2.0).abs() < 1e-9);
        assert_eq!(response.data.k, 0.10);
    }

    #[test]
    fn invalid_alkalinity_is_a_bad_request() {
        let error = block_on(aeration_estimate(
            State(state()),
            ApiJson(EstimateRequest {
                ph_current: 7.0,
                ph_target: Some(7.2),
                ta: 0.0,
                k: None,
            }),
        ))
        .unwrap_err();
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert!(error.message.contains("alkalinity"));
    }

    #[test]
    fn calibrate_averages_runs() {
        let request: CalibrateRequest = serde_json::from_str(
            r#"{"runs": [
                {"ph_before": 7.0, "ph_after": 7.2, "duration_hours": 2.0, "ta": 100.0},
                {"ph_before": 7.0, "ph_after": 7.2, "duration_hours": 2.0, "ta": 200.0}
            ]}"#,
        )
        .unwrap();
        let Json(response) = block_on(aeration_calibrate(State(state()), ApiJson(request))).unwrap();
        assert_eq!(response.data.samples.len(), 2);
        assert!((response.data.calibrated_k - 0.15).abs() < 1e-9);
    }

    #[test]
    fn calibrate_without_runs_falls_back() {
        let request: CalibrateRequest = serde_json::from_str("{}").unwrap();
        let Json(response) = block_on(aeration_calibrate(State(state()), ApiJson(request))).unwrap();
        assert_eq!(response.data.calibrated_k, 0.10);
    }

    #[test]
    fn projection_stops_at_configured_ceiling() {
        let Json(response) = block_on(aeration_project(
            State(state()),
            ApiJson(ProjectRequest {
                ph_start: 7.0,
                elapsed_hours: 100.0,
                ta: 100.0,
                k: None,
            }),
        ))
        .unwrap();
        assert_eq!(response.data.ph, 8.4);
    }

    #[test]
    fn solve_rejects_impossible_alkalinity() {
        let error = block_on(solve(
            State(state()),
            ApiJson(SolveRequest { ph: 7.0, ta: -50.0 }),
        ))
        .unwrap_err();
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert!(error.message.contains("TA must be positive"));
    }

    #[test]
    fn check_and_classify_reject_negative_values() {
        let reading = WaterReading::default().with(Parameter::Salt, -10.0);
        let error = block_on(check(State(state()), ApiJson(reading))).unwrap_err();
        assert_eq!(error.status, StatusCode::BAD_REQUEST);

        let error = block_on(classify(
            State(state()),
            ApiJson(ClassifyRequest {
                parameter: "ph".to_string(),
                value: -1.0,
            }),
        ))
        .unwrap_err();
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn malformed_body_uses_error_envelope() {
        let request = Request::builder()
            .method("POST")
            .uri("/v1/solve")
            .header("content-type", "application/json")
            .body(Body::from("{\"ph\": 7.0,"))
            .unwrap();
        let Err(error) = block_on(ApiJson::<SolveRequest>::from_request(request, &())) else {
            panic!("truncated body should be rejected");
        };
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert!(!error.message.is_empty());

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()["content-type"],
            "application/json"
        );
    }

    #[test]
    fn missing_content_type_uses_error_envelope() {
        let request = Request::builder()
            .method("POST")
            .uri("/v1/solve")
            .body(Body::from(r#"{"ph": 7.0, "ta": 80.0}"#))
            .unwrap();
        let Err(error) = block_on(ApiJson::<SolveRequest>::from_request(request, &())) else {
            panic!("body without content type should be rejected");
        };
        assert_eq!(error.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
