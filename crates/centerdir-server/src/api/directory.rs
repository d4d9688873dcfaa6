use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use centerdir_core::{slugify, AreaSummary, CenterRecord};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{normalize_limit, not_found, parse_param, ApiError, ApiResponse, AppState, ResponseMeta};

const DEFAULT_SEARCH_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
pub(super) struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<String>,
}

/// Compact listing row used by search and district listings.
#[derive(Debug, Serialize)]
pub(super) struct CenterSummaryItem {
    pub branch_code: String,
    pub name: String,
    pub region: String,
    pub state: String,
    pub district: String,
    pub city: Option<String>,
    pub located: bool,
}

impl From<&CenterRecord> for CenterSummaryItem {
    fn from(center: &CenterRecord) -> Self {
        Self {
            branch_code: center.branch_code.clone(),
            name: center.name.clone(),
            region: center.region.clone(),
            state: center.state.clone(),
            district: center.district.clone(),
            city: center.address.as_ref().and_then(|a| a.city.clone()),
            located: center.coords.is_some(),
        }
    }
}

pub(super) async fn search_centers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<CenterSummaryItem>>>, ApiError> {
    let rid = req_id.0.as_str();
    let needle = query.q.as_deref().map(str::trim).unwrap_or_default();
    if needle.is_empty() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "query parameter `q` is required",
        ));
    }
    let limit = normalize_limit(
        parse_param::<i64>(rid, "limit", query.limit.as_deref())?,
        DEFAULT_SEARCH_LIMIT,
    );

    let data = state
        .store
        .search(needle, limit)
        .into_iter()
        .map(CenterSummaryItem::from)
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_regions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<AreaSummary>>> {
    Json(ApiResponse {
        data: state.store.regions(),
        meta: ResponseMeta::new(req_id.0),
    })
}

pub(super) async fn list_states(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(region): Path<String>,
) -> Result<Json<ApiResponse<Vec<AreaSummary>>>, ApiError> {
    let data = state
        .store
        .states(&slugify(&region))
        .ok_or_else(|| not_found(req_id.0.clone(), format_args!("region '{region}'")))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_districts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((region, state_name)): Path<(String, String)>,
) -> Result<Json<ApiResponse<Vec<AreaSummary>>>, ApiError> {
    let data = state
        .store
        .districts(&slugify(&region), &slugify(&state_name))
        .ok_or_else(|| {
            not_found(
                req_id.0.clone(),
                format_args!("state '{state_name}' in region '{region}'"),
            )
        })?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_district_centers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((region, state_name, district)): Path<(String, String, String)>,
) -> Result<Json<ApiResponse<Vec<CenterSummaryItem>>>, ApiError> {
    let centers = state
        .store
        .centers_in(&slugify(&region), &slugify(&state_name), &slugify(&district))
        .ok_or_else(|| {
            not_found(
                req_id.0.clone(),
                format_args!("district '{district}' in {region}/{state_name}"),
            )
        })?;

    Ok(Json(ApiResponse {
        data: centers.into_iter().map(CenterSummaryItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}
