#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use viaja_core::address::{AddressCandidate, SourceKind};
use viaja_core::geo::LatLng;
use viaja_core::geocode::{GeocodeError, Geocoder};
use viaja_core::routing::{RouteSummary, Router};

/// Central Patos de Minas, the client's fallback coordinates.
pub const CENTER: LatLng = LatLng {
    lat: -18.5807,
    lng: -46.5160,
};

/// Build a candidate with sensible defaults for tests.
pub fn candidate(road: &str, suburb: &str, source: SourceKind) -> AddressCandidate {
    AddressCandidate {
        display_name: format!("{road}, {suburb}, Patos de Minas - MG"),
        poi_name: None,
        road: Some(road.to_string()),
        house_number: None,
        suburb: Some(suburb.to_string()),
        city: Some("Patos de Minas".to_string()),
        state: Some("MG".to_string()),
        postcode: None,
        position: CENTER,
        source,
    }
}

pub fn candidate_at(road: &str, suburb: &str, source: SourceKind, position: LatLng) -> AddressCandidate {
    let mut place = candidate(road, suburb, source);
    place.position = position;
    place
}

/// Geocoder returning a canned result list, counting how often it is hit.
pub struct FakeGeocoder {
    results: Mutex<Vec<AddressCandidate>>,
    pub search_calls: AtomicUsize,
}

impl FakeGeocoder {
    pub fn returning(results: Vec<AddressCandidate>) -> Self {
        Self {
            results: Mutex::new(results),
            search_calls: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::returning(Vec::new())
    }

    /// Swap the canned results for subsequent searches.
    pub fn set_results(&self, results: Vec<AddressCandidate>) {
        *self.results.lock().expect("results lock") = results;
    }

    pub fn calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

impl Geocoder for FakeGeocoder {
    fn search(
        &self,
        _query: &str,
        _proximity: Option<LatLng>,
    ) -> Result<Vec<AddressCandidate>, GeocodeError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.results.lock().expect("results lock").clone())
    }

    fn reverse(&self, _position: LatLng) -> Result<Option<AddressCandidate>, GeocodeError> {
        Ok(self.results.lock().expect("results lock").first().cloned())
    }
}

/// Geocoder that always fails, for degraded-path tests.
pub struct FailingGeocoder;

impl Geocoder for FailingGeocoder {
    fn search(
        &self,
        _query: &str,
        _proximity: Option<LatLng>,
    ) -> Result<Vec<AddressCandidate>, GeocodeError> {
        Err(GeocodeError::Network("connection refused".to_string()))
    }

    fn reverse(&self, _position: LatLng) -> Result<Option<AddressCandidate>, GeocodeError> {
        Err(GeocodeError::Network("connection refused".to_string()))
    }
}

/// Router reporting a fixed distance and duration for every leg.
pub struct FixedRouter {
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

impl Router for FixedRouter {
    fn route(&self, _origin: LatLng, _destination: LatLng) -> Option<RouteSummary> {
        Some(RouteSummary {
            distance_meters: self.distance_meters,
            duration_seconds: self.duration_seconds,
            geometry: Vec::new(),
        })
    }
}

/// Router that never finds a route.
pub struct NoRouteRouter;

impl Router for NoRouteRouter {
    fn route(&self, _origin: LatLng, _destination: LatLng) -> Option<RouteSummary> {
        None
    }
}
