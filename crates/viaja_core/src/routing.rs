//! Pluggable routing collaborators.
//!
//! The core only consumes distance and duration from a route; geometry is
//! passed through untouched for whoever renders it. Two implementations:
//!
//! - [`GreatCircleRouter`]: Haversine distance plus a free-flow duration at a
//!   configurable average speed. Zero dependencies, used as the offline
//!   fallback and in tests.
//! - [`osrm::OsrmRouter`] (feature `osrm`): calls a local/remote OSRM HTTP
//!   endpoint.

use crate::geo::{haversine_km, LatLng};

/// Average city speed assumed when no routing backend reports a duration.
pub const DEFAULT_AVERAGE_SPEED_KMH: f64 = 40.0;

/// Result of a route query between two coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteSummary {
    /// Road-network distance in metres.
    pub distance_meters: f64,
    /// Travel time in seconds.
    pub duration_seconds: f64,
    /// Lat/lng waypoints along the road (empty for the great-circle router).
    pub geometry: Vec<LatLng>,
}

impl RouteSummary {
    pub fn distance_km(&self) -> f64 {
        self.distance_meters / 1000.0
    }
}

/// Trait for routing backends. Implementations must be `Send + Sync` so a
/// provider can be shared behind a `Box<dyn Router>`.
pub trait Router: Send + Sync {
    /// Compute a route between two points. Returns `None` if no route exists.
    fn route(&self, origin: LatLng, destination: LatLng) -> Option<RouteSummary>;

    /// Route through an ordered list of waypoints by chaining legs.
    ///
    /// Returns `None` when fewer than two waypoints are given or any leg
    /// fails, so a partially routable stop list never yields a misleading
    /// partial total.
    fn route_via(&self, waypoints: &[LatLng]) -> Option<RouteSummary> {
        if waypoints.len() < 2 {
            return None;
        }
        let mut total = RouteSummary {
            distance_meters: 0.0,
            duration_seconds: 0.0,
            geometry: Vec::new(),
        };
        for pair in waypoints.windows(2) {
            let leg = self.route(pair[0], pair[1])?;
            total.distance_meters += leg.distance_meters;
            total.duration_seconds += leg.duration_seconds;
            total.geometry.extend(leg.geometry);
        }
        Some(total)
    }
}

/// Routes along the great circle at a fixed average speed.
#[derive(Clone, Copy, Debug)]
pub struct GreatCircleRouter {
    pub average_speed_kmh: f64,
}

impl GreatCircleRouter {
    pub fn new(average_speed_kmh: f64) -> Self {
        Self { average_speed_kmh }
    }
}

impl Default for GreatCircleRouter {
    fn default() -> Self {
        Self::new(DEFAULT_AVERAGE_SPEED_KMH)
    }
}

impl Router for GreatCircleRouter {
    fn route(&self, origin: LatLng, destination: LatLng) -> Option<RouteSummary> {
        let distance_km = haversine_km(origin, destination);
        let duration_seconds = if distance_km > 0.0 && self.average_speed_kmh > 0.0 {
            (distance_km / self.average_speed_kmh) * 3600.0
        } else {
            0.0
        };
        Some(RouteSummary {
            distance_meters: distance_km * 1000.0,
            duration_seconds,
            geometry: Vec::new(),
        })
    }
}

#[cfg(feature = "osrm")]
pub mod osrm {
    use super::*;
    use reqwest::blocking::Client;
    use serde::Deserialize;
    use std::time::Duration;

    const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

    /// Routes via an OSRM HTTP endpoint.
    pub struct OsrmRouter {
        client: Client,
        endpoint: String,
    }

    impl OsrmRouter {
        /// Create a router for the given endpoint (e.g. `http://localhost:5000`).
        pub fn new(endpoint: &str) -> Self {
            let client = Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("failed to build HTTP client");
            Self {
                client,
                endpoint: endpoint.trim_end_matches('/').to_string(),
            }
        }
    }

    /// Minimal OSRM JSON response structures.
    #[derive(Deserialize)]
    struct OsrmResponse {
        code: String,
        routes: Option<Vec<OsrmRoute>>,
    }

    #[derive(Deserialize)]
    struct OsrmRoute {
        distance: f64, // metres
        duration: f64, // seconds
        geometry: OsrmGeometry,
    }

    #[derive(Deserialize)]
    struct OsrmGeometry {
        coordinates: Vec<Vec<f64>>, // [lng, lat]
    }

    impl Router for OsrmRouter {
        fn route(&self, origin: LatLng, destination: LatLng) -> Option<RouteSummary> {
            let url = format!(
                "{}/route/v1/driving/{},{};{},{}?overview=full&geometries=geojson",
                self.endpoint, origin.lng, origin.lat, destination.lng, destination.lat,
            );

            let resp: OsrmResponse = match self.client.get(&url).send() {
                Ok(r) => match r.json() {
                    Ok(j) => j,
                    Err(_) => return None,
                },
                Err(_) => return None,
            };

            if resp.code != "Ok" {
                return None;
            }
            let route = resp.routes?.into_iter().next()?;

            let geometry = route
                .geometry
                .coordinates
                .iter()
                .filter(|c| c.len() >= 2)
                .map(|c| LatLng::new(c[1], c[0])) // OSRM returns [lng, lat]
                .collect();

            Some(RouteSummary {
                distance_meters: route.distance,
                duration_seconds: route.duration,
                geometry,
            })
        }
    }
}
