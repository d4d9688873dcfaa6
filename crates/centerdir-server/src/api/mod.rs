mod centers;
mod directory;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use centerdir_core::CenterStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

/// Defaults applied to nearest-center requests.
#[derive(Debug, Clone, Copy)]
pub struct NearestSettings {
    pub default_limit: usize,
    pub max_distance_km: Option<f64>,
}

impl NearestSettings {
    #[must_use]
    pub fn from_app_config(config: &centerdir_core::AppConfig) -> Self {
        Self {
            default_limit: config.nearest_default_limit,
            max_distance_km: config.nearest_max_distance_km,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CenterStore>,
    pub nearest: NearestSettings,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    centers: usize,
    located_centers: usize,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// `limit` for list endpoints, clamped to `1..=100`.
pub(super) fn normalize_limit(limit: Option<i64>, default: usize) -> usize {
    limit.map_or(default, |l| usize::try_from(l.clamp(1, 100)).unwrap_or(1))
}

/// Parse an optional query parameter, answering `validation_error` on garbage.
pub(super) fn parse_param<T: FromStr>(
    request_id: &str,
    name: &str,
    raw: Option<&str>,
) -> Result<Option<T>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => value.parse::<T>().map(Some).map_err(|_| {
            ApiError::new(
                request_id,
                "validation_error",
                format!("query parameter `{name}` has an invalid value: {value}"),
            )
        }),
    }
}

pub(super) fn not_found(request_id: String, what: impl std::fmt::Display) -> ApiError {
    tracing::debug!(%what, "lookup missed");
    ApiError::new(request_id, "not_found", format!("{what} not found"))
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

fn directory_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/centers/nearest", get(centers::nearest_centers))
        .route("/api/v1/centers/{branch_code}", get(centers::get_center))
        .route("/api/v1/search", get(directory::search_centers))
        .route("/api/v1/regions", get(directory::list_regions))
        .route(
            "/api/v1/regions/{region}/states",
            get(directory::list_states),
        )
        .route(
            "/api/v1/regions/{region}/states/{state}/districts",
            get(directory::list_districts),
        )
        .route(
            "/api/v1/regions/{region}/states/{state}/districts/{district}/centers",
            get(directory::list_district_centers),
        )
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(directory_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);
    let centers = state.store.len();
    let located_centers = state.store.located_count();

    if centers == 0 {
        tracing::warn!("health check: center dataset is empty");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse {
                data: HealthData {
                    status: "degraded",
                    centers,
                    located_centers,
                },
                meta,
            }),
        );
    }

    (
        StatusCode::OK,
        Json(ApiResponse {
            data: HealthData {
                status: "ok",
                centers,
                located_centers,
            },
            meta,
        }),
    )
}

pub fn rate_limit_state(per_minute: usize) -> RateLimitState {
    RateLimitState::new(per_minute, Duration::from_secs(60))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
