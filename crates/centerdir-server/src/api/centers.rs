use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use centerdir_core::{config::MAX_NEAREST_LIMIT, CenterRecord, Coordinates, Nearby};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{not_found, parse_param, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct NearbyCenterItem {
    #[serde(flatten)]
    pub center: CenterRecord,
    /// `None` for centers without usable coordinates.
    pub distance_km: Option<f64>,
}

impl From<Nearby<'_, CenterRecord>> for NearbyCenterItem {
    fn from(nearby: Nearby<'_, CenterRecord>) -> Self {
        Self {
            center: nearby.center.clone(),
            distance_km: nearby.is_located().then_some(nearby.distance_km),
        }
    }
}

/// Raw query string; values are parsed by hand so bad input gets the
/// standard error envelope instead of axum's plain-text rejection.
#[derive(Debug, Deserialize)]
pub(super) struct NearestQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub limit: Option<String>,
    pub max_distance_km: Option<String>,
    pub include_unlocated: Option<String>,
}

pub(super) async fn nearest_centers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<NearestQuery>,
) -> Result<Json<ApiResponse<Vec<NearbyCenterItem>>>, ApiError> {
    let rid = req_id.0.as_str();
    let lat = parse_param::<f64>(rid, "lat", query.lat.as_deref())?;
    let lng = parse_param::<f64>(rid, "lng", query.lng.as_deref())?;
    let (Some(lat), Some(lng)) = (lat, lng) else {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "query parameters `lat` and `lng` are required",
        ));
    };
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(ApiError::new(
            rid,
            "validation_error",
            format!("coordinates out of range: lat={lat}, lng={lng}"),
        ));
    }

    let limit = parse_param::<i64>(rid, "limit", query.limit.as_deref())?.map_or(
        state.nearest.default_limit,
        |l| usize::try_from(l.max(0)).map_or(MAX_NEAREST_LIMIT, |l| l.min(MAX_NEAREST_LIMIT)),
    );

    let max_distance_km =
        match parse_param::<f64>(rid, "max_distance_km", query.max_distance_km.as_deref())? {
            Some(km) if !km.is_finite() || km <= 0.0 => {
                return Err(ApiError::new(
                    rid,
                    "validation_error",
                    "query parameter `max_distance_km` must be a positive number",
                ))
            }
            Some(km) => Some(km),
            None => state.nearest.max_distance_km,
        };

    let include_unlocated =
        parse_param::<bool>(rid, "include_unlocated", query.include_unlocated.as_deref())?
            .unwrap_or(false);

    let data: Vec<NearbyCenterItem> = state
        .store
        .nearest(Coordinates::new(lat, lng), limit)
        .into_iter()
        .filter(|n| include_unlocated || n.is_located())
        .filter(|n| max_distance_km.is_none_or(|max| !n.is_located() || n.distance_km <= max))
        .map(NearbyCenterItem::from)
        .collect();

    tracing::debug!(lat, lng, limit, returned = data.len(), "nearest centers");

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_center(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(branch_code): Path<String>,
) -> Result<Json<ApiResponse<CenterRecord>>, ApiError> {
    let center = state
        .store
        .get(&branch_code)
        .cloned()
        .ok_or_else(|| not_found(req_id.0.clone(), format_args!("center '{branch_code}'")))?;

    Ok(Json(ApiResponse {
        data: center,
        meta: ResponseMeta::new(req_id.0),
    }))
}
