mod support;

use support::{candidate, CENTER};

use chrono::Utc;
use viaja_core::address::SourceKind;
use viaja_core::pricing::VehicleClass;
use viaja_core::store::{JsonFileStore, PlaceStore, TripRecord};

const USER: &str = "ana";

fn record() -> TripRecord {
    TripRecord {
        user_id: USER.to_string(),
        origin: candidate("Rua Major Gote", "Centro", SourceKind::History),
        destinations: vec![candidate("Avenida JK", "Caiçaras", SourceKind::Remote)],
        distance_km: 10.0,
        time_seconds: 900,
        vehicle: VehicleClass::Carro,
        fare: Some(33.0),
        requested_at: Utc::now(),
    }
}

#[test]
fn history_and_favorites_survive_a_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("places.json");

    {
        let mut store = JsonFileStore::open(&path).expect("open");
        store
            .add_history(USER, &candidate("Rua A", "Centro", SourceKind::Remote))
            .expect("history");
        store
            .add_favorite(USER, &candidate("Rua B", "Centro", SourceKind::Remote))
            .expect("favorite");
    }

    let store = JsonFileStore::open(&path).expect("reopen");
    let history = store.list_history(USER).expect("list history");
    let favorites = store.list_favorites(USER).expect("list favorites");

    assert_eq!(history.len(), 1);
    assert_eq!(history[0].road.as_deref(), Some("Rua A"));
    assert_eq!(history[0].source, SourceKind::History);

    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].road.as_deref(), Some("Rua B"));
    assert_eq!(favorites[0].source, SourceKind::Favorite);
}

#[test]
fn trip_ids_keep_advancing_across_reopens() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("places.json");

    let first = {
        let mut store = JsonFileStore::open(&path).expect("open");
        store.save_trip(&record()).expect("save")
    };
    let second = {
        let mut store = JsonFileStore::open(&path).expect("reopen");
        store.save_trip(&record()).expect("save")
    };
    assert_ne!(first, second);
}

#[test]
fn saved_trips_round_trip_their_fields() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("places.json");

    let saved = record();
    {
        let mut store = JsonFileStore::open(&path).expect("open");
        store.save_trip(&saved).expect("save");
    }

    // The document is plain JSON; spot-check it without the store.
    let raw = std::fs::read_to_string(&path).expect("read");
    let doc: serde_json::Value = serde_json::from_str(&raw).expect("parse");
    let trips = &doc["users"][USER]["trips"];
    assert_eq!(trips[0][1]["vehicle"], "Carro");
    assert_eq!(trips[0][1]["distance_km"], 10.0);
    assert_eq!(
        trips[0][1]["origin"]["position"]["lat"],
        serde_json::json!(CENTER.lat)
    );
}

#[test]
fn opening_a_missing_file_starts_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nothing-here.json");
    let store = JsonFileStore::open(&path).expect("open");
    assert!(store.list_history(USER).expect("list").is_empty());
}
