//! Great-circle distance and the nearest-center query.

use serde::Serialize;

use crate::centers::{Coordinates, Locatable};

/// Mean Earth radius used by the spherical approximation.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points, in kilometers.
///
/// Inputs are not range-checked. The intermediate term is clamped to
/// `[0, 1]` so out-of-range degrees still yield a finite number.
#[must_use]
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// A center paired with its distance from the query point.
///
/// `distance_km` is `f64::INFINITY` when the center has no usable
/// coordinates; it serializes as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Nearby<'a, T> {
    #[serde(flatten)]
    pub center: &'a T,
    pub distance_km: f64,
}

impl<T> Nearby<'_, T> {
    #[must_use]
    pub fn is_located(&self) -> bool {
        self.distance_km.is_finite()
    }
}

/// Return up to `limit` centers ordered by distance from `query`, nearest first.
///
/// Centers without coordinates sort after every located center. Ties keep
/// input order, but callers must not rely on that. `centers` is never
/// modified and nothing is filtered out; dropping unlocated or distant
/// entries is up to the caller.
pub fn find_nearest<T: Locatable>(
    query: Coordinates,
    centers: &[T],
    limit: usize,
) -> Vec<Nearby<'_, T>> {
    if limit == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<Nearby<'_, T>> = centers
        .iter()
        .map(|center| Nearby {
            center,
            distance_km: distance_to(query, center),
        })
        .collect();

    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked.truncate(limit);
    ranked
}

fn distance_to<T: Locatable>(query: Coordinates, center: &T) -> f64 {
    center
        .coordinates()
        .map(|coords| haversine_km(query, coords))
        .filter(|d| !d.is_nan())
        .unwrap_or(f64::INFINITY)
}
