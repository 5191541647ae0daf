//! Persistence collaborator: trip records, ride history, and favorites.
//!
//! The core calls [`PlaceStore`] but does not own storage. [`MemoryStore`]
//! backs tests and the CLI; [`JsonFileStore`] persists the same structure as
//! a single JSON document.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::address::{AddressCandidate, SourceKind};
use crate::pricing::VehicleClass;

/// How many history entries are kept per user, most recent first.
pub const HISTORY_LIMIT: usize = 20;

/// A confirmed trip handed to the persistence collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub user_id: String,
    pub origin: AddressCandidate,
    /// Ordered stops; the last entry is the final destination.
    pub destinations: Vec<AddressCandidate>,
    pub distance_km: f64,
    pub time_seconds: u64,
    pub vehicle: VehicleClass,
    /// `None` when the fare was unavailable for the selected class.
    pub fare: Option<f64>,
    pub requested_at: DateTime<Utc>,
}

/// Errors reported by a store backend.
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Serde(serde_json::Error),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serde(err)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(err) => write!(f, "store I/O error: {err}"),
            StoreError::Serde(err) => write!(f, "store serialization error: {err}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// History, favorites, and trip records, per user.
pub trait PlaceStore: Send + Sync {
    /// Persist a confirmed trip, returning its assigned id.
    fn save_trip(&mut self, trip: &TripRecord) -> Result<String, StoreError>;

    /// Recently used destinations, most recent first, tagged `History`.
    fn list_history(&self, user_id: &str) -> Result<Vec<AddressCandidate>, StoreError>;

    /// Saved favorites in insertion order, tagged `Favorite`.
    fn list_favorites(&self, user_id: &str) -> Result<Vec<AddressCandidate>, StoreError>;

    /// Record a destination in the user's history. Re-adding an existing
    /// place moves it to the front instead of duplicating it.
    fn add_history(&mut self, user_id: &str, place: &AddressCandidate) -> Result<(), StoreError>;

    fn add_favorite(&mut self, user_id: &str, place: &AddressCandidate) -> Result<(), StoreError>;

    /// Remove the favorite matching the candidate's dedupe key. Unknown keys
    /// are ignored.
    fn remove_favorite(&mut self, user_id: &str, place: &AddressCandidate)
        -> Result<(), StoreError>;
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct UserRecords {
    history: Vec<AddressCandidate>,
    favorites: Vec<AddressCandidate>,
    trips: Vec<(String, TripRecord)>,
}

/// In-memory store. The backing structure is serializable so
/// [`JsonFileStore`] can reuse it verbatim.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    users: HashMap<String, UserRecords>,
    next_trip_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records_mut(&mut self, user_id: &str) -> &mut UserRecords {
        self.users.entry(user_id.to_string()).or_default()
    }

    fn same_place(a: &AddressCandidate, b: &AddressCandidate) -> bool {
        match (a.dedupe_key(), b.dedupe_key()) {
            (Some(ka), Some(kb)) => ka == kb,
            // Places without a road fall back to the display name key.
            _ => crate::address::normalize(&a.display_name)
                == crate::address::normalize(&b.display_name),
        }
    }
}

impl PlaceStore for MemoryStore {
    fn save_trip(&mut self, trip: &TripRecord) -> Result<String, StoreError> {
        self.next_trip_id += 1;
        let id = format!("trip-{}", self.next_trip_id);
        self.records_mut(&trip.user_id)
            .trips
            .push((id.clone(), trip.clone()));
        Ok(id)
    }

    fn list_history(&self, user_id: &str) -> Result<Vec<AddressCandidate>, StoreError> {
        Ok(self
            .users
            .get(user_id)
            .map(|records| {
                records
                    .history
                    .iter()
                    .map(|place| place.clone().with_source(SourceKind::History))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_favorites(&self, user_id: &str) -> Result<Vec<AddressCandidate>, StoreError> {
        Ok(self
            .users
            .get(user_id)
            .map(|records| {
                records
                    .favorites
                    .iter()
                    .map(|place| place.clone().with_source(SourceKind::Favorite))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn add_history(&mut self, user_id: &str, place: &AddressCandidate) -> Result<(), StoreError> {
        let records = self.records_mut(user_id);
        records.history.retain(|entry| !Self::same_place(entry, place));
        records.history.insert(0, place.clone());
        records.history.truncate(HISTORY_LIMIT);
        Ok(())
    }

    fn add_favorite(&mut self, user_id: &str, place: &AddressCandidate) -> Result<(), StoreError> {
        let records = self.records_mut(user_id);
        if !records
            .favorites
            .iter()
            .any(|entry| Self::same_place(entry, place))
        {
            records.favorites.push(place.clone());
        }
        Ok(())
    }

    fn remove_favorite(
        &mut self,
        user_id: &str,
        place: &AddressCandidate,
    ) -> Result<(), StoreError> {
        let records = self.records_mut(user_id);
        records
            .favorites
            .retain(|entry| !Self::same_place(entry, place));
        Ok(())
    }
}

/// [`MemoryStore`] persisted to a JSON document after every mutation.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Open the store at `path`, loading the existing document when present.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let inner = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            serde_json::from_str(&raw)?
        } else {
            MemoryStore::default()
        };
        Ok(Self {
            path: path.to_path_buf(),
            inner,
        })
    }

    fn persist(&self) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(&self.inner)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl PlaceStore for JsonFileStore {
    fn save_trip(&mut self, trip: &TripRecord) -> Result<String, StoreError> {
        let id = self.inner.save_trip(trip)?;
        self.persist()?;
        Ok(id)
    }

    fn list_history(&self, user_id: &str) -> Result<Vec<AddressCandidate>, StoreError> {
        self.inner.list_history(user_id)
    }

    fn list_favorites(&self, user_id: &str) -> Result<Vec<AddressCandidate>, StoreError> {
        self.inner.list_favorites(user_id)
    }

    fn add_history(&mut self, user_id: &str, place: &AddressCandidate) -> Result<(), StoreError> {
        self.inner.add_history(user_id, place)?;
        self.persist()
    }

    fn add_favorite(&mut self, user_id: &str, place: &AddressCandidate) -> Result<(), StoreError> {
        self.inner.add_favorite(user_id, place)?;
        self.persist()
    }

    fn remove_favorite(
        &mut self,
        user_id: &str,
        place: &AddressCandidate,
    ) -> Result<(), StoreError> {
        self.inner.remove_favorite(user_id, place)?;
        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::LatLng;

    fn place(road: &str) -> AddressCandidate {
        AddressCandidate {
            display_name: format!("{road}, Centro, Patos de Minas - MG"),
            poi_name: None,
            road: Some(road.to_string()),
            house_number: None,
            suburb: Some("Centro".to_string()),
            city: Some("Patos de Minas".to_string()),
            state: Some("MG".to_string()),
            postcode: None,
            position: LatLng::new(-18.5807, -46.5160),
            source: SourceKind::Remote,
        }
    }

    #[test]
    fn history_is_most_recent_first_and_tagged() {
        let mut store = MemoryStore::new();
        store.add_history("ana", &place("Rua A")).expect("add");
        store.add_history("ana", &place("Rua B")).expect("add");

        let history = store.list_history("ana").expect("list");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].road.as_deref(), Some("Rua B"));
        assert!(history.iter().all(|p| p.source == SourceKind::History));
    }

    #[test]
    fn re_adding_a_history_place_moves_it_to_the_front() {
        let mut store = MemoryStore::new();
        store.add_history("ana", &place("Rua A")).expect("add");
        store.add_history("ana", &place("Rua B")).expect("add");
        store.add_history("ana", &place("Rua A")).expect("add");

        let history = store.list_history("ana").expect("list");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].road.as_deref(), Some("Rua A"));
    }

    #[test]
    fn history_is_capped() {
        let mut store = MemoryStore::new();
        for n in 0..HISTORY_LIMIT + 5 {
            store
                .add_history("ana", &place(&format!("Rua {n}")))
                .expect("add");
        }
        assert_eq!(store.list_history("ana").expect("list").len(), HISTORY_LIMIT);
    }

    #[test]
    fn favorites_do_not_duplicate() {
        let mut store = MemoryStore::new();
        store.add_favorite("ana", &place("Rua A")).expect("add");
        store.add_favorite("ana", &place("rua a")).expect("add");
        assert_eq!(store.list_favorites("ana").expect("list").len(), 1);
    }

    #[test]
    fn remove_favorite_matches_by_normalized_key() {
        let mut store = MemoryStore::new();
        store.add_favorite("ana", &place("Rua São João")).expect("add");
        store
            .remove_favorite("ana", &place("rua sao joao"))
            .expect("remove");
        assert!(store.list_favorites("ana").expect("list").is_empty());
    }

    #[test]
    fn users_are_isolated() {
        let mut store = MemoryStore::new();
        store.add_history("ana", &place("Rua A")).expect("add");
        assert!(store.list_history("bruno").expect("list").is_empty());
    }

    #[test]
    fn trip_ids_are_unique() {
        let mut store = MemoryStore::new();
        let record = TripRecord {
            user_id: "ana".to_string(),
            origin: place("Rua A"),
            destinations: vec![place("Rua B")],
            distance_km: 10.0,
            time_seconds: 900,
            vehicle: VehicleClass::Carro,
            fare: Some(33.0),
            requested_at: Utc::now(),
        };
        let first = store.save_trip(&record).expect("save");
        let second = store.save_trip(&record).expect("save");
        assert_ne!(first, second);
    }
}
