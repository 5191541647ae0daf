//! Geographic primitives: WGS84 coordinates, Haversine distance, bounding boxes.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres (spherical approximation).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometres per degree of latitude.
const KM_PER_DEG_LAT: f64 = 110.574;

/// Kilometres per degree of longitude at the equator.
const KM_PER_DEG_LNG_EQUATOR: f64 = 111.320;

/// A WGS84 coordinate pair in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Great-circle distance between two points in kilometres.
pub fn haversine_km(a: LatLng, b: LatLng) -> f64 {
    let (lat1, lon1) = (a.lat.to_radians(), a.lng.to_radians());
    let (lat2, lon2) = (b.lat.to_radians(), b.lng.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Axis-aligned bounding box used to bias geocoding searches by proximity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lng: f64,
    pub max_lat: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Box extending `radius_km` in every direction from `center`.
    ///
    /// Longitude degrees shrink with latitude, so the box is widened by
    /// `1 / cos(lat)` to keep the requested radius on the ground.
    pub fn around(center: LatLng, radius_km: f64) -> Self {
        let lat_delta = radius_km / KM_PER_DEG_LAT;
        let lng_scale = (KM_PER_DEG_LNG_EQUATOR * center.lat.to_radians().cos()).max(1e-6);
        let lng_delta = radius_km / lng_scale;
        Self {
            min_lat: center.lat - lat_delta,
            min_lng: center.lng - lng_delta,
            max_lat: center.lat + lat_delta,
            max_lng: center.lng + lng_delta,
        }
    }

    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lng >= self.min_lng
            && point.lng <= self.max_lng
    }
}
