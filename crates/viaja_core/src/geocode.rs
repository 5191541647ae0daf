//! Geocoding collaborator boundary.
//!
//! The core consumes forward and reverse lookups through [`Geocoder`] and
//! never knows which provider sits behind it. Provider responses are mapped
//! into [`AddressCandidate`] here, at the boundary, so core logic downstream
//! never needs defensive field checks.

use crate::address::AddressCandidate;
use crate::geo::LatLng;

/// Errors reported by a geocoding backend.
#[derive(Debug)]
pub enum GeocodeError {
    /// Transport-level failure (connect, timeout, TLS).
    Network(String),
    /// The provider answered but the payload could not be used.
    Malformed(String),
}

impl std::fmt::Display for GeocodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeocodeError::Network(msg) => write!(f, "geocoding network error: {msg}"),
            GeocodeError::Malformed(msg) => write!(f, "geocoding response error: {msg}"),
        }
    }
}

impl std::error::Error for GeocodeError {}

/// Forward and reverse geocoding.
pub trait Geocoder: Send + Sync {
    /// Search for addresses matching `query`, optionally biased towards a
    /// proximity hint.
    fn search(
        &self,
        query: &str,
        proximity: Option<LatLng>,
    ) -> Result<Vec<AddressCandidate>, GeocodeError>;

    /// Resolve a coordinate to its nearest address. `Ok(None)` when the
    /// provider knows nothing about the location.
    fn reverse(&self, position: LatLng) -> Result<Option<AddressCandidate>, GeocodeError>;
}

#[cfg(feature = "opencage")]
pub mod opencage {
    use super::*;
    use crate::address::SourceKind;
    use crate::format::format_place;
    use crate::geo::BoundingBox;
    use reqwest::blocking::Client;
    use serde::Deserialize;
    use std::time::Duration;

    const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
    const RESULT_LIMIT: u8 = 7;

    /// Forward/reverse geocoding via the OpenCage API, tuned for Brazilian
    /// addresses (`countrycode=br`, `language=pt`).
    pub struct OpenCageGeocoder {
        client: Client,
        api_key: String,
        /// Radius of the proximity bounding box sent with searches.
        pub proximity_radius_km: f64,
    }

    impl OpenCageGeocoder {
        pub fn new(api_key: &str) -> Self {
            let client = Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("failed to build HTTP client");
            Self {
                client,
                api_key: api_key.to_string(),
                proximity_radius_km: 50.0,
            }
        }

        fn fetch(&self, query: &str, bounds: Option<BoundingBox>, limit: u8)
            -> Result<Vec<AddressCandidate>, GeocodeError>
        {
            let mut url = reqwest::Url::parse("https://api.opencagedata.com/geocode/v1/json")
                .map_err(|err| GeocodeError::Malformed(err.to_string()))?;
            url.query_pairs_mut()
                .append_pair("q", query)
                .append_pair("key", &self.api_key)
                .append_pair("countrycode", "br")
                .append_pair("language", "pt")
                .append_pair("limit", &limit.to_string());
            if let Some(bounds) = bounds {
                url.query_pairs_mut().append_pair(
                    "bounds",
                    &format!(
                        "{},{},{},{}",
                        bounds.min_lng, bounds.min_lat, bounds.max_lng, bounds.max_lat
                    ),
                );
            }

            let response = self
                .client
                .get(url)
                .send()
                .map_err(|err| GeocodeError::Network(err.to_string()))?;
            let parsed: OpenCageResponse = response
                .json()
                .map_err(|err| GeocodeError::Malformed(err.to_string()))?;

            Ok(parsed
                .results
                .into_iter()
                .filter_map(candidate_from_result)
                .collect())
        }
    }

    /// Minimal OpenCage JSON response structures.
    #[derive(Deserialize)]
    struct OpenCageResponse {
        #[serde(default)]
        results: Vec<OpenCageResult>,
    }

    #[derive(Deserialize)]
    struct OpenCageResult {
        geometry: OpenCageGeometry,
        #[serde(default)]
        components: OpenCageComponents,
    }

    #[derive(Deserialize)]
    struct OpenCageGeometry {
        lat: f64,
        lng: f64,
    }

    #[derive(Default, Deserialize)]
    struct OpenCageComponents {
        road: Option<String>,
        suburb: Option<String>,
        city_district: Option<String>,
        city: Option<String>,
        town: Option<String>,
        village: Option<String>,
        state: Option<String>,
        postcode: Option<String>,
        house_number: Option<String>,
        // POI-ish component kinds, checked in this order.
        tourism: Option<String>,
        amenity: Option<String>,
        shop: Option<String>,
        office: Option<String>,
        building: Option<String>,
    }

    fn candidate_from_result(result: OpenCageResult) -> Option<AddressCandidate> {
        let components = result.components;
        let poi_name = components
            .tourism
            .or(components.amenity)
            .or(components.shop)
            .or(components.office)
            .or(components.building);

        let mut candidate = AddressCandidate {
            display_name: String::new(),
            poi_name,
            road: components.road,
            house_number: components.house_number,
            suburb: components.suburb.or(components.city_district),
            city: components.city.or(components.town).or(components.village),
            state: components.state,
            postcode: components.postcode,
            position: LatLng::new(result.geometry.lat, result.geometry.lng),
            source: SourceKind::Remote,
        };
        candidate.display_name = format_place(&candidate);
        if candidate.display_name.is_empty() {
            return None;
        }
        Some(candidate)
    }

    impl Geocoder for OpenCageGeocoder {
        fn search(
            &self,
            query: &str,
            proximity: Option<LatLng>,
        ) -> Result<Vec<AddressCandidate>, GeocodeError> {
            let bounds = proximity.map(|center| BoundingBox::around(center, self.proximity_radius_km));
            self.fetch(query, bounds, RESULT_LIMIT)
        }

        fn reverse(&self, position: LatLng) -> Result<Option<AddressCandidate>, GeocodeError> {
            let query = format!("{}+{}", position.lat, position.lng);
            let mut results = self.fetch(&query, None, 1)?;
            if results.is_empty() {
                return Ok(None);
            }
            Ok(Some(results.remove(0)))
        }
    }
}
