//! Application defaults, loadable from a JSON document.
//!
//! The defaults are the constants the shipped client carries: the canonical
//! rate card, suggestion thresholds, and the fallback map coordinates
//! (Patos de Minas, MG).

use std::path::Path;

use serde::Deserialize;

use crate::dispatch::DispatchConfig;
use crate::geo::LatLng;
use crate::pricing::RateCard;
use crate::suggest::SuggestionConfig;

/// Fallback coordinates when no user location is known.
pub const DEFAULT_COORDS: LatLng = LatLng {
    lat: -18.5807,
    lng: -46.5160,
};

/// Radius used to bias geocoding searches towards the user.
pub const PROXIMITY_RADIUS_KM: f64 = 50.0;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub suggestion: SuggestionConfig,
    pub rates: RateCard,
    pub dispatch: DispatchConfig,
    pub default_coords: LatLng,
    pub proximity_radius_km: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            suggestion: SuggestionConfig::default(),
            rates: RateCard::default(),
            dispatch: DispatchConfig::default(),
            default_coords: DEFAULT_COORDS,
            proximity_radius_km: PROXIMITY_RADIUS_KM,
        }
    }
}

impl AppConfig {
    /// Parse a config from a JSON string. Missing fields fall back to the
    /// shipped defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn from_path(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let raw = std::fs::read_to_string(path)?;
        Ok(Self::from_json_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::VehicleClass;

    #[test]
    fn empty_document_yields_shipped_defaults() {
        let config = AppConfig::from_json_str("{}").expect("config");
        assert_eq!(config.default_coords, DEFAULT_COORDS);
        assert_eq!(config.suggestion.max_results, 7);
        let fare = config
            .rates
            .estimate_fare(10.0, VehicleClass::Carro)
            .expect("fare");
        assert!((fare - 33.00).abs() < 1e-9);
    }

    #[test]
    fn rates_can_be_overridden() {
        let raw = r#"{
            "rates": {
                "rates": {
                    "Carro": { "base": 10.0, "per_km": 3.0, "min_fare": 15.0 }
                }
            }
        }"#;
        let config = AppConfig::from_json_str(raw).expect("config");
        let fare = config
            .rates
            .estimate_fare(10.0, VehicleClass::Carro)
            .expect("fare");
        assert!((fare - 40.00).abs() < 1e-9);
        // Classes absent from the override are unavailable, not defaulted.
        assert_eq!(config.rates.estimate_fare(10.0, VehicleClass::Moto), None);
    }
}
