//! Simulated driver matching.
//!
//! There is no real fleet behind the client; after a trip is confirmed the
//! app pretends to search for a nearby driver. The simulator samples a driver
//! position inside a search radius around the pickup point and derives the
//! pickup ETA from the Haversine distance at a configured average speed.
//! Seeded RNG keeps every run reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::geo::{haversine_km, LatLng};
use crate::pricing::VehicleClass;
use crate::routing::DEFAULT_AVERAGE_SPEED_KMH;

/// Degrees of jitter per drift step, roughly ten metres.
const DRIFT_STEP_DEG: f64 = 0.0001;

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Seed for RNG (for reproducibility).
    pub seed: u64,
    /// Radius around the pickup point where drivers are "found".
    pub search_radius_km: f64,
    /// Average speed used to turn pickup distance into an ETA.
    pub average_speed_kmh: f64,
    /// Probability (0.0–1.0) that a driver is available at all.
    pub availability: f64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            search_radius_km: 3.0,
            average_speed_kmh: DEFAULT_AVERAGE_SPEED_KMH,
            availability: 0.9,
        }
    }
}

/// A driver the simulator "found" for the rider.
#[derive(Clone, Debug, PartialEq)]
pub struct DriverOffer {
    pub driver_name: String,
    pub vehicle: VehicleClass,
    pub position: LatLng,
    pub eta_seconds: u64,
}

/// Stateful driver-matching simulator.
#[derive(Debug)]
pub struct DispatchSimulator {
    config: DispatchConfig,
    rng: StdRng,
    offers_made: u64,
}

impl DispatchSimulator {
    pub fn new(config: DispatchConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            rng,
            offers_made: 0,
        }
    }

    /// Look for a driver near `pickup`. Returns `None` when no driver of the
    /// requested class is available, which callers surface as "keep
    /// searching" rather than an error.
    pub fn find_driver(&mut self, pickup: LatLng, vehicle: VehicleClass) -> Option<DriverOffer> {
        if self.rng.gen::<f64>() >= self.config.availability {
            return None;
        }

        // Sample a position inside the search radius. Latitude degrees are
        // ~111 km; longitude is close enough at city scale for a simulation.
        let radius_deg = self.config.search_radius_km / 111.0;
        let dlat = self.rng.gen_range(-radius_deg..=radius_deg);
        let dlng = self.rng.gen_range(-radius_deg..=radius_deg);
        let position = LatLng::new(pickup.lat + dlat, pickup.lng + dlng);

        let distance_km = haversine_km(pickup, position);
        let eta_seconds = if self.config.average_speed_kmh > 0.0 {
            ((distance_km / self.config.average_speed_kmh) * 3600.0).round() as u64
        } else {
            0
        };

        self.offers_made += 1;
        Some(DriverOffer {
            driver_name: format!("{} {:02}", vehicle.label(), self.offers_made),
            vehicle,
            position,
            eta_seconds,
        })
    }

    /// One step of the fake location watcher: nudge an en-route driver by a
    /// few metres so the UI has something to animate.
    pub fn drift(&mut self, position: LatLng) -> LatLng {
        LatLng::new(
            position.lat + self.rng.gen_range(-DRIFT_STEP_DEG..=DRIFT_STEP_DEG),
            position.lng + self.rng.gen_range(-DRIFT_STEP_DEG..=DRIFT_STEP_DEG),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pickup() -> LatLng {
        LatLng::new(-18.5807, -46.5160)
    }

    #[test]
    fn same_seed_yields_same_offer() {
        let config = DispatchConfig {
            seed: 42,
            ..DispatchConfig::default()
        };
        let mut a = DispatchSimulator::new(config);
        let mut b = DispatchSimulator::new(config);
        assert_eq!(
            a.find_driver(pickup(), VehicleClass::Carro),
            b.find_driver(pickup(), VehicleClass::Carro)
        );
    }

    #[test]
    fn offered_driver_is_within_the_search_radius() {
        let config = DispatchConfig {
            seed: 7,
            availability: 1.0,
            search_radius_km: 3.0,
            ..DispatchConfig::default()
        };
        let mut simulator = DispatchSimulator::new(config);
        for _ in 0..20 {
            let offer = simulator
                .find_driver(pickup(), VehicleClass::Moto)
                .expect("offer");
            // Corner of the sampling square is radius * sqrt(2) away at most.
            assert!(haversine_km(pickup(), offer.position) <= 3.0 * 1.5);
        }
    }

    #[test]
    fn zero_availability_never_finds_a_driver() {
        let config = DispatchConfig {
            availability: 0.0,
            ..DispatchConfig::default()
        };
        let mut simulator = DispatchSimulator::new(config);
        for _ in 0..10 {
            assert!(simulator.find_driver(pickup(), VehicleClass::Carro).is_none());
        }
    }

    #[test]
    fn drift_moves_by_at_most_a_step() {
        let mut simulator = DispatchSimulator::new(DispatchConfig::default());
        let start = pickup();
        let moved = simulator.drift(start);
        assert!((moved.lat - start.lat).abs() <= DRIFT_STEP_DEG);
        assert!((moved.lng - start.lng).abs() <= DRIFT_STEP_DEG);
    }
}
