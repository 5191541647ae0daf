//! The trip-planning state machine.
//!
//! One [`TripSession`] owns a single origin→destination planning session:
//! endpoints, computed route figures, and the selected vehicle with its fare.
//! Phases move `Empty → RouteComputed → VehicleSelected → Confirmed`;
//! cancelling returns to `Empty` from anywhere, clearing route, vehicle, and
//! fare together. Partial resets are not possible: the UI must never show a
//! fare for a vehicle that is no longer selected.
//!
//! Out-of-order calls (selecting a vehicle before any route exists, double
//! clicks racing ahead of the router) are expected from UI event streams and
//! are logged no-ops, never panics.

use chrono::Utc;

use crate::address::AddressCandidate;
use crate::geo::LatLng;
use crate::pricing::{RateCard, VehicleClass};
use crate::routing::RouteSummary;
use crate::store::TripRecord;

/// Where the session is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TripPhase {
    /// No confirmed origin/destination pairing yet.
    #[default]
    Empty,
    /// Distance and time populated by the routing collaborator.
    RouteComputed,
    /// Vehicle chosen and fare computed.
    VehicleSelected,
    /// Handed off to the persistence/ride-request collaborator.
    Confirmed,
}

/// A single trip-planning session. Owned exclusively by the active planning
/// flow; never shared across sessions.
#[derive(Clone, Debug, Default)]
pub struct TripSession {
    origin: Option<AddressCandidate>,
    /// Ordered stops; the last entry is the final destination.
    destinations: Vec<AddressCandidate>,
    distance_km: f64,
    time_seconds: u64,
    vehicle: Option<VehicleClass>,
    fare: Option<f64>,
    phase: TripPhase,
}

impl TripSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> TripPhase {
        self.phase
    }

    pub fn origin(&self) -> Option<&AddressCandidate> {
        self.origin.as_ref()
    }

    pub fn destinations(&self) -> &[AddressCandidate] {
        &self.destinations
    }

    /// The final destination (last stop), when any is set.
    pub fn destination(&self) -> Option<&AddressCandidate> {
        self.destinations.last()
    }

    /// Distance in kilometres; meaningful only once a route is computed.
    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn time_seconds(&self) -> u64 {
        self.time_seconds
    }

    pub fn vehicle(&self) -> Option<VehicleClass> {
        self.vehicle
    }

    pub fn fare(&self) -> Option<f64> {
        self.fare
    }

    /// Origin plus all stops, in routing order. Used to drive the routing
    /// collaborator.
    pub fn waypoints(&self) -> Vec<LatLng> {
        let mut points = Vec::with_capacity(self.destinations.len() + 1);
        if let Some(origin) = &self.origin {
            points.push(origin.position);
        }
        points.extend(self.destinations.iter().map(|d| d.position));
        points
    }

    /// True once both an origin and at least one destination are set.
    pub fn has_endpoints(&self) -> bool {
        self.origin.is_some() && !self.destinations.is_empty()
    }

    pub fn set_origin(&mut self, place: AddressCandidate) {
        self.origin = Some(place);
        self.invalidate_route();
    }

    /// Set or replace the final destination. Earlier intermediate stops are
    /// kept.
    pub fn set_destination(&mut self, place: AddressCandidate) {
        if self.destinations.is_empty() {
            self.destinations.push(place);
        } else {
            let last = self.destinations.len() - 1;
            self.destinations[last] = place;
        }
        self.invalidate_route();
    }

    /// Append a stop at the end of the list; it becomes the new final
    /// destination.
    pub fn add_stop(&mut self, place: AddressCandidate) {
        self.destinations.push(place);
        self.invalidate_route();
    }

    /// Remove the stop at `index`. Out-of-range indexes are a no-op.
    pub fn remove_stop(&mut self, index: usize) {
        if index >= self.destinations.len() {
            return;
        }
        self.destinations.remove(index);
        self.invalidate_route();
    }

    /// Apply the routing collaborator's result for the current endpoints.
    ///
    /// A no-op unless both endpoints are set (a stale callback may arrive
    /// after the user cleared a field) and the trip is not yet confirmed
    /// (a late callback must not reopen a handed-off trip). Any previously
    /// selected vehicle and fare are cleared: they were priced against the
    /// old route.
    pub fn apply_route(&mut self, summary: &RouteSummary) -> bool {
        if self.phase == TripPhase::Confirmed {
            eprintln!("trip: ignoring route result after confirmation");
            return false;
        }
        if !self.has_endpoints() {
            eprintln!("trip: ignoring route result without both endpoints set");
            return false;
        }
        self.distance_km = summary.distance_km();
        self.time_seconds = summary.duration_seconds.round() as u64;
        self.vehicle = None;
        self.fare = None;
        self.phase = TripPhase::RouteComputed;
        true
    }

    /// Choose a vehicle class and price the trip against `rates`.
    ///
    /// A logged no-op before any route exists: the estimator must never run
    /// without a distance. Re-selecting from `VehicleSelected` re-prices.
    /// A class missing from the rate card still selects, with the fare left
    /// as the `None` placeholder.
    pub fn select_vehicle(&mut self, vehicle: VehicleClass, rates: &RateCard) -> bool {
        match self.phase {
            TripPhase::RouteComputed | TripPhase::VehicleSelected => {
                self.vehicle = Some(vehicle);
                self.fare = rates.estimate_fare(self.distance_km, vehicle);
                self.phase = TripPhase::VehicleSelected;
                true
            }
            TripPhase::Empty | TripPhase::Confirmed => {
                eprintln!(
                    "trip: ignoring vehicle selection in phase {:?}",
                    self.phase
                );
                false
            }
        }
    }

    /// Hand the trip off for persistence. Only valid from `VehicleSelected`;
    /// returns the record the persistence collaborator should save.
    pub fn confirm(&mut self, user_id: &str) -> Option<TripRecord> {
        if self.phase != TripPhase::VehicleSelected {
            eprintln!("trip: ignoring confirm in phase {:?}", self.phase);
            return None;
        }
        let origin = self.origin.clone()?;
        let vehicle = self.vehicle?;
        self.phase = TripPhase::Confirmed;
        Some(TripRecord {
            user_id: user_id.to_string(),
            origin,
            destinations: self.destinations.clone(),
            distance_km: self.distance_km,
            time_seconds: self.time_seconds,
            vehicle,
            fare: self.fare,
            requested_at: Utc::now(),
        })
    }

    /// Cancel or restart the session: everything is cleared in one step.
    pub fn cancel(&mut self) {
        *self = TripSession::default();
    }

    /// A route no longer matches the endpoints; drop the computed figures and
    /// any vehicle priced against them.
    fn invalidate_route(&mut self) {
        self.distance_km = 0.0;
        self.time_seconds = 0;
        self.vehicle = None;
        self.fare = None;
        self.phase = TripPhase::Empty;
    }
}
