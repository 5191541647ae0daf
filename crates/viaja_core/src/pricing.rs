//! Fare estimation: per-vehicle-class rate tables.
//!
//! Fares are computed at full `f64` precision; rounding happens only at
//! display time (see [`crate::format::format_fare_brl`]) so repeated
//! estimates for the same trip never accumulate rounding error.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::address::normalize;

/// A pricing tier. Labels keep the Portuguese spelling the client ships with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleClass {
    Moto,
    Carro,
    #[serde(rename = "Lotação", alias = "Lotacao")]
    Lotacao,
    Entrega,
}

impl VehicleClass {
    pub const ALL: [VehicleClass; 4] = [
        VehicleClass::Moto,
        VehicleClass::Carro,
        VehicleClass::Lotacao,
        VehicleClass::Entrega,
    ];

    /// Display label, e.g. shown on the vehicle-selection buttons.
    pub fn label(&self) -> &'static str {
        match self {
            VehicleClass::Moto => "Moto",
            VehicleClass::Carro => "Carro",
            VehicleClass::Lotacao => "Lotação",
            VehicleClass::Entrega => "Entrega",
        }
    }

    /// Parse a user-supplied class name. Accent- and case-insensitive, so
    /// `"lotacao"` and `"Lotação"` both resolve to [`VehicleClass::Lotacao`].
    pub fn parse(input: &str) -> Option<Self> {
        let key = normalize(input);
        Self::ALL
            .into_iter()
            .find(|class| normalize(class.label()) == key)
    }
}

impl std::fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Rate table for one vehicle class, in BRL.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    /// Flag-fall charged on every trip.
    pub base: f64,
    /// Charge per kilometre.
    pub per_km: f64,
    /// Floor applied to the computed fare. Invariant: `min_fare >= base`.
    pub min_fare: f64,
}

impl RateTable {
    pub fn new(base: f64, per_km: f64, min_fare: f64) -> Self {
        debug_assert!(min_fare >= base, "min_fare must be at least the base fare");
        Self {
            base,
            per_km,
            min_fare,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.base >= 0.0 && self.per_km >= 0.0 && self.min_fare >= self.base
    }
}

/// The full set of rate tables, keyed by vehicle class.
///
/// A card may carry fewer classes than [`VehicleClass::ALL`] (for example when
/// loaded from a partial config); estimating against a missing class yields
/// `None` rather than an error, so callers can render a placeholder price.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateCard {
    rates: HashMap<VehicleClass, RateTable>,
}

impl RateCard {
    /// A card with no rates; every estimate is unavailable.
    pub fn empty() -> Self {
        Self {
            rates: HashMap::new(),
        }
    }

    pub fn with_rate(mut self, vehicle: VehicleClass, rate: RateTable) -> Self {
        self.rates.insert(vehicle, rate);
        self
    }

    pub fn rate_for(&self, vehicle: VehicleClass) -> Option<&RateTable> {
        self.rates.get(&vehicle)
    }

    /// Estimate the fare for a trip of `distance_km` with the given class.
    ///
    /// `fare = max(base + distance_km * per_km, min_fare)`. Returns `None`
    /// when the card has no rate for the class.
    pub fn estimate_fare(&self, distance_km: f64, vehicle: VehicleClass) -> Option<f64> {
        debug_assert!(distance_km >= 0.0, "distance must be non-negative");
        let rate = self.rates.get(&vehicle)?;
        Some((rate.base + distance_km * rate.per_km).max(rate.min_fare))
    }

    /// True when every table on the card satisfies the rate invariants.
    pub fn is_valid(&self) -> bool {
        self.rates.values().all(RateTable::is_valid)
    }
}

impl Default for RateCard {
    fn default() -> Self {
        let mut rates = HashMap::new();
        rates.insert(VehicleClass::Moto, RateTable::new(6.00, 1.50, 8.00));
        rates.insert(VehicleClass::Carro, RateTable::new(8.00, 2.50, 12.00));
        rates.insert(VehicleClass::Lotacao, RateTable::new(5.00, 1.00, 7.00));
        rates.insert(VehicleClass::Entrega, RateTable::new(7.00, 2.00, 10.00));
        Self { rates }
    }
}
