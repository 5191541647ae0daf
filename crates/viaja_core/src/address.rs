//! Address candidates: normalization, deduplication, and proximity ranking.
//!
//! Every textual comparison in the core (search matching, cache lookups,
//! deduplication) goes through [`normalize`]; raw text is never compared
//! directly.

use serde::{Deserialize, Serialize};

use crate::geo::{haversine_km, LatLng};

/// Where a candidate came from. The order here is the priority order used by
/// deduplication: favorites beat history, history beats remote results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Favorite,
    History,
    Remote,
}

impl SourceKind {
    /// Lower ranks win when duplicates collapse.
    pub fn priority(&self) -> u8 {
        match self {
            SourceKind::Favorite => 0,
            SourceKind::History => 1,
            SourceKind::Remote => 2,
        }
    }
}

/// A place record produced by search, history, or favorites.
///
/// Shapes are validated at the collaborator boundary (geocoder / store), so
/// core logic can rely on these fields without existence checks. A candidate
/// without a `road` is not actionable for routing and is dropped from
/// suggestion output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AddressCandidate {
    pub display_name: String,
    pub poi_name: Option<String>,
    pub road: Option<String>,
    pub house_number: Option<String>,
    pub suburb: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub position: LatLng,
    pub source: SourceKind,
}

impl AddressCandidate {
    /// Identity key for deduplication: normalized road plus normalized
    /// suburb. `None` when the candidate has no road.
    pub fn dedupe_key(&self) -> Option<(String, String)> {
        let road = self.road.as_deref()?;
        let suburb = self.suburb.as_deref().unwrap_or("");
        Some((normalize(road), normalize(suburb)))
    }

    /// Whether the candidate can be used as a routing endpoint.
    pub fn is_actionable(&self) -> bool {
        self.road.is_some()
    }

    /// Re-tag the candidate with a new source (e.g. a stored place listed
    /// back as history).
    pub fn with_source(mut self, source: SourceKind) -> Self {
        self.source = source;
        self
    }
}

/// Lowercase the text and strip diacritics. The sole equality key for all
/// address comparisons, so "Rua São João" and "rua sao joao" collide.
pub fn normalize(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(fold_diacritic)
        .collect()
}

/// Fold one lowercase character to its unaccented form. Covers the Latin-1
/// range, which is all Brazilian addresses use in practice.
fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

/// Drop non-actionable candidates and collapse duplicates.
///
/// Candidates sharing a [`AddressCandidate::dedupe_key`] keep only the first
/// occurrence in priority order (favorite, then history, then remote),
/// regardless of input order. Within one source the input order is preserved.
pub fn dedupe_candidates(candidates: Vec<AddressCandidate>) -> Vec<AddressCandidate> {
    let mut ordered = candidates;
    ordered.retain(AddressCandidate::is_actionable);
    ordered.sort_by_key(|c| c.source.priority());

    let mut seen: Vec<(String, String)> = Vec::new();
    let mut result = Vec::with_capacity(ordered.len());
    for candidate in ordered {
        let key = match candidate.dedupe_key() {
            Some(key) => key,
            None => continue,
        };
        if !seen.contains(&key) {
            seen.push(key);
            result.push(candidate);
        }
    }
    result
}

/// Sort candidates by ascending Haversine distance from `origin`.
///
/// When no reference point is known the list is left untouched, preserving
/// priority order. The sort is stable, so equidistant candidates also keep
/// their priority order.
pub fn rank_by_proximity(candidates: &mut [AddressCandidate], origin: Option<LatLng>) {
    let Some(origin) = origin else {
        return;
    };
    candidates.sort_by(|a, b| {
        let da = haversine_km(origin, a.position);
        let db = haversine_km(origin, b.position);
        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(road: Option<&str>, suburb: Option<&str>, source: SourceKind) -> AddressCandidate {
        AddressCandidate {
            display_name: road.unwrap_or("sem rua").to_string(),
            poi_name: None,
            road: road.map(str::to_string),
            house_number: None,
            suburb: suburb.map(str::to_string),
            city: Some("Patos de Minas".to_string()),
            state: Some("MG".to_string()),
            postcode: None,
            position: LatLng::new(-18.5807, -46.5160),
            source,
        }
    }

    #[test]
    fn normalize_folds_accents_and_case() {
        assert_eq!(normalize("Rua São João"), normalize("rua sao joao"));
        assert_eq!(normalize("LOTAÇÃO"), "lotacao");
        assert_eq!(normalize("Avenida Getúlio Vargas"), "avenida getulio vargas");
    }

    #[test]
    fn normalize_leaves_plain_text_untouched() {
        assert_eq!(normalize("rua 12 de outubro"), "rua 12 de outubro");
    }

    #[test]
    fn dedupe_prefers_favorites_over_history_regardless_of_order() {
        let history = candidate(Some("Rua São João"), Some("Centro"), SourceKind::History);
        let favorite = candidate(Some("rua sao joao"), Some("centro"), SourceKind::Favorite);

        // History first in the input; the favorite must still win.
        let result = dedupe_candidates(vec![history, favorite.clone()]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].source, SourceKind::Favorite);
        assert_eq!(result[0].road, favorite.road);
    }

    #[test]
    fn dedupe_prefers_history_over_remote() {
        let remote = candidate(Some("Rua Major Gote"), None, SourceKind::Remote);
        let history = candidate(Some("Rua Major Gote"), None, SourceKind::History);
        let result = dedupe_candidates(vec![remote, history]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].source, SourceKind::History);
    }

    #[test]
    fn dedupe_keeps_distinct_suburbs_apart() {
        let centro = candidate(Some("Rua São João"), Some("Centro"), SourceKind::Remote);
        let lagoinha = candidate(Some("Rua São João"), Some("Lagoinha"), SourceKind::Remote);
        let result = dedupe_candidates(vec![centro, lagoinha]);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn dedupe_drops_candidates_without_a_road() {
        let no_road = candidate(None, Some("Centro"), SourceKind::Remote);
        let with_road = candidate(Some("Rua Major Gote"), Some("Centro"), SourceKind::Remote);
        let result = dedupe_candidates(vec![no_road, with_road]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].road.as_deref(), Some("Rua Major Gote"));
    }

    #[test]
    fn ranking_sorts_by_distance_from_origin() {
        let mut near = candidate(Some("Rua Perto"), None, SourceKind::Remote);
        near.position = LatLng::new(-18.581, -46.517);
        let mut far = candidate(Some("Rua Longe"), None, SourceKind::Remote);
        far.position = LatLng::new(-18.90, -46.00);

        let mut list = vec![far.clone(), near.clone()];
        rank_by_proximity(&mut list, Some(LatLng::new(-18.5807, -46.5160)));
        assert_eq!(list[0].road, near.road);
        assert_eq!(list[1].road, far.road);
    }

    #[test]
    fn ranking_without_origin_preserves_order() {
        let first = candidate(Some("Rua A"), None, SourceKind::Favorite);
        let second = candidate(Some("Rua B"), None, SourceKind::Remote);
        let mut list = vec![first.clone(), second.clone()];
        rank_by_proximity(&mut list, None);
        assert_eq!(list[0].road, first.road);
        assert_eq!(list[1].road, second.road);
    }
}
