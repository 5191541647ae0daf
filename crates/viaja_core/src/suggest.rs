//! Address suggestions: local matches, remote search, and cancellation.
//!
//! Typing a new character issues a new [`QueryTicket`]; any lookup still in
//! flight for an earlier ticket is discarded when it completes, so results
//! apply last-writer-wins by issue order, never by completion order.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lru::LruCache;
use serde::{Deserialize, Serialize};

use crate::address::{dedupe_candidates, normalize, rank_by_proximity, AddressCandidate};
use crate::geo::LatLng;
use crate::geocode::Geocoder;
use crate::store::PlaceStore;

/// Remote results cached per normalized query.
const QUERY_CACHE_SIZE: usize = 256;

/// Tunable parameters for the suggestion pipeline. Defaults are the shipped
/// client values.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SuggestionConfig {
    /// Minimum query length before anything is suggested.
    pub min_query_len: usize,
    /// Minimum query length before the remote geocoder is consulted.
    pub remote_query_len: usize,
    /// Maximum number of suggestions returned.
    pub max_results: usize,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            min_query_len: 2,
            remote_query_len: 3,
            max_results: 7,
        }
    }
}

/// Issues monotonically increasing query tickets. Cloning shares the counter,
/// so a ticket handed to an in-flight lookup sees later issues.
#[derive(Clone, Debug, Default)]
pub struct QueryGeneration {
    current: Arc<AtomicU64>,
}

impl QueryGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for a new query, making every earlier ticket stale.
    pub fn issue(&self) -> QueryTicket {
        let serial = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        QueryTicket {
            serial,
            current: Arc::clone(&self.current),
        }
    }
}

/// A cancellation token for one suggestion lookup.
#[derive(Clone, Debug)]
pub struct QueryTicket {
    serial: u64,
    current: Arc<AtomicU64>,
}

impl QueryTicket {
    /// True once a newer ticket has been issued; the holder must discard its
    /// result instead of applying it.
    pub fn is_stale(&self) -> bool {
        self.current.load(Ordering::SeqCst) != self.serial
    }
}

/// Combines favorites, history, and remote search into one ranked list.
pub struct SuggestionEngine {
    config: SuggestionConfig,
    generation: QueryGeneration,
    remote_cache: LruCache<String, Vec<AddressCandidate>>,
}

impl SuggestionEngine {
    pub fn new(config: SuggestionConfig) -> Self {
        Self {
            config,
            generation: QueryGeneration::new(),
            remote_cache: LruCache::new(
                NonZeroUsize::new(QUERY_CACHE_SIZE).expect("cache size must be non-zero"),
            ),
        }
    }

    /// Issue the ticket for the next keystroke's query.
    pub fn begin_query(&self) -> QueryTicket {
        self.generation.issue()
    }

    /// Run the suggestion pipeline for `query`.
    ///
    /// Returns `None` when the ticket went stale while the lookup ran; the
    /// caller must not render anything in that case. Store or geocoder
    /// failures degrade to fewer results rather than an error: suggestion
    /// display is non-critical.
    pub fn suggest(
        &mut self,
        query: &str,
        origin: Option<LatLng>,
        user_id: &str,
        store: &dyn PlaceStore,
        geocoder: &dyn Geocoder,
        ticket: &QueryTicket,
    ) -> Option<Vec<AddressCandidate>> {
        if ticket.is_stale() {
            return None;
        }

        let key = normalize(query);
        if key.chars().count() < self.config.min_query_len {
            return Some(Vec::new());
        }

        let mut combined = self.local_matches(&key, user_id, store);

        if key.chars().count() >= self.config.remote_query_len {
            combined.extend(self.remote_matches(query, &key, origin, geocoder));
        }

        // The remote call is the slow part; a newer keystroke may have
        // arrived while it ran.
        if ticket.is_stale() {
            return None;
        }

        let mut result = dedupe_candidates(combined);
        rank_by_proximity(&mut result, origin);
        result.truncate(self.config.max_results);
        Some(result)
    }

    /// Favorites and history whose display name contains the normalized query.
    fn local_matches(
        &self,
        key: &str,
        user_id: &str,
        store: &dyn PlaceStore,
    ) -> Vec<AddressCandidate> {
        let favorites = store.list_favorites(user_id).unwrap_or_default();
        let history = store.list_history(user_id).unwrap_or_default();
        favorites
            .into_iter()
            .chain(history)
            .filter(|place| normalize(&place.display_name).contains(key))
            .collect()
    }

    /// Remote search, served from the per-query LRU cache when possible.
    ///
    /// The geocoder biases results toward `origin`, so the cache key folds in
    /// a coarse origin bucket: entries cached while the rider was in one area
    /// are not replayed after the reference point moves.
    fn remote_matches(
        &mut self,
        query: &str,
        key: &str,
        origin: Option<LatLng>,
        geocoder: &dyn Geocoder,
    ) -> Vec<AddressCandidate> {
        let cache_key = match origin {
            // ~1 km buckets; nearby reference points share cached results.
            Some(point) => format!("{key}@{:.2},{:.2}", point.lat, point.lng),
            None => key.to_string(),
        };
        if let Some(cached) = self.remote_cache.get(&cache_key) {
            return cached.clone();
        }
        match geocoder.search(query, origin) {
            Ok(results) => {
                self.remote_cache.put(cache_key, results.clone());
                results
            }
            // Collaborator failures are the collaborator's concern; an empty
            // remote list is a valid answer here. Failures are not cached.
            Err(_) => Vec::new(),
        }
    }
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self::new(SuggestionConfig::default())
    }
}
