//! # Query Engine
//!
//! Pure query functions over a loaded collection. [`TrailStore`](crate::TrailStore)
//! calls these after `load()`; they can also be used directly on any slice.
//!
//! Text matching trims the query term and compares case-insensitively by
//! substring. Fields with the wrong JSON type never match.

use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::Trail;

/// Criteria for [`advanced_search`]. Unset or blank criteria are not applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Substring of `location.region` (case-insensitive)
    pub region: Option<String>,
    /// Substring of `trail_details.difficulty` (case-insensitive)
    pub difficulty: Option<String>,
    /// Exact element of `best_season` (case-sensitive, trimmed)
    pub season: Option<String>,
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = Some(difficulty.into());
        self
    }

    pub fn season(mut self, season: impl Into<String>) -> Self {
        self.season = Some(season.into());
        self
    }

    /// True if no criterion would be applied.
    pub fn is_empty(&self) -> bool {
        normalize(self.region.as_deref()).is_none()
            && normalize(self.difficulty.as_deref()).is_none()
            && trimmed(self.season.as_deref()).is_none()
    }
}

/// Keyword search over name, description, region, location keywords and
/// difficulty.
///
/// Records without valid coordinates are never returned. Each record appears
/// at most once, in collection order.
pub fn search<'a>(trails: &'a [Trail], query: &str) -> Vec<&'a Trail> {
    let Some(needle) = normalize(Some(query)) else {
        return Vec::new();
    };

    #[cfg(feature = "parallel")]
    let matches: Vec<&Trail> = trails
        .par_iter()
        .filter(|t| matches_keyword(t, &needle))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let matches: Vec<&Trail> = trails
        .iter()
        .filter(|t| matches_keyword(t, &needle))
        .collect();

    matches
}

/// Coordinate pre-filter, then first match across the searchable fields.
fn matches_keyword(trail: &Trail, needle: &str) -> bool {
    if !trail.has_valid_coordinates() {
        return false;
    }

    contains_ci(trail.name(), needle)
        || contains_ci(trail.description(), needle)
        || contains_ci(trail.region(), needle)
        || trail.keywords().any(|k| contains_ci(Some(k), needle))
        || contains_ci(trail.difficulty(), needle)
}

/// Exact, case-sensitive id lookup. Returns the first match.
pub fn find_by_id<'a>(trails: &'a [Trail], id: &str) -> Option<&'a Trail> {
    if id.is_empty() {
        return None;
    }
    trails.iter().find(|t| t.id() == Some(id))
}

/// Records whose `location.region` contains `region` (case-insensitive).
pub fn by_region<'a>(trails: &'a [Trail], region: &str) -> Vec<&'a Trail> {
    let Some(needle) = normalize(Some(region)) else {
        return Vec::new();
    };
    trails
        .iter()
        .filter(|t| contains_ci(t.region(), &needle))
        .collect()
}

/// Records matching every provided criterion.
///
/// Iterates the full collection, so an empty criteria set returns every record.
pub fn advanced_search<'a>(trails: &'a [Trail], criteria: &SearchCriteria) -> Vec<&'a Trail> {
    let region = normalize(criteria.region.as_deref());
    let difficulty = normalize(criteria.difficulty.as_deref());
    let season = trimmed(criteria.season.as_deref());

    trails
        .iter()
        .filter(|t| {
            region
                .as_deref()
                .map_or(true, |r| contains_ci(t.region(), r))
        })
        .filter(|t| {
            difficulty
                .as_deref()
                .map_or(true, |d| contains_ci(t.difficulty(), d))
        })
        .filter(|t| season.map_or(true, |s| has_season(t, s)))
        .collect()
}

fn has_season(trail: &Trail, season: &str) -> bool {
    trail
        .seasons()
        .is_some_and(|seasons| seasons.iter().any(|v| v.as_str() == Some(season)))
}

/// Trim and lower-case a query term; blank terms become `None`.
fn normalize(term: Option<&str>) -> Option<String> {
    trimmed(term).map(str::to_lowercase)
}

fn trimmed(term: Option<&str>) -> Option<&str> {
    term.map(str::trim).filter(|t| !t.is_empty())
}

/// `needle` must already be lower-cased.
fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use serde_json::{json, Value};

    fn trail(index: usize, value: Value) -> Trail {
        let Value::Object(fields) = value else {
            panic!("fixture must be an object");
        };
        Trail::from_raw(fields, index, Local::now())
    }

    fn sample_trails() -> Vec<Trail> {
        vec![
            trail(0, json!({
                "id": "rila-1",
                "name": "Rila Lakes Trail",
                "description": "Seven glacial lakes above the tree line",
                "location": {
                    "region": "Rila",
                    "keywords": ["lakes", "cirque"],
                    "coordinates": {"lat": 42.2, "lng": 23.32}
                },
                "trail_details": {"difficulty": "Moderate"},
                "best_season": ["summer", "autumn"]
            })),
            trail(1, json!({
                "id": "rila-2",
                "name": "Malyovitsa Hut Walk",
                "description": "Easy forest walk",
                "location": {
                    "region": "Rila National Park",
                    "keywords": ["forest"],
                    "coordinates": {"lat": 42.19, "lng": 23.38}
                },
                "trail_details": {"difficulty": "easy"},
                "best_season": ["spring", "summer"]
            })),
            trail(2, json!({
                "id": "pirin-1",
                "name": "Vihren Ascent",
                "description": "Steep marble ridge",
                "location": {
                    "region": "Pirin",
                    "keywords": ["summit", "marble"],
                    "coordinates": {"lat": 41.76, "lng": 23.40}
                },
                "trail_details": {"difficulty": "hard"},
                "best_season": "summer"
            })),
            trail(3, json!({
                "id": "ghost-1",
                "name": "Rila Ghost Path",
                "description": "No coordinates recorded",
                "location": {"region": "Rila"},
                "trail_details": {"difficulty": "easy"},
                "best_season": ["summer"]
            })),
            trail(4, json!({
                "id": "strandzha-1",
                "name": "Странджа Eco Trail",
                "location": {
                    "region": "Странджа",
                    "coordinates": {"lat": 42.05, "lng": 27.6}
                },
                "trail_details": {"difficulty": "easy"}
            })),
        ]
    }

    fn ids(trails: &[&Trail]) -> Vec<String> {
        trails.iter().map(|t| t.id().unwrap().to_string()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let trails = sample_trails();
        assert_eq!(ids(&search(&trails, "rila")), vec!["rila-1", "rila-2"]);
        assert_eq!(ids(&search(&trails, "RILA")), vec!["rila-1", "rila-2"]);
        assert_eq!(ids(&search(&trails, "  Lakes  ")), vec!["rila-1"]);
    }

    #[test]
    fn test_search_fields() {
        let trails = sample_trails();
        // description
        assert_eq!(ids(&search(&trails, "marble ridge")), vec!["pirin-1"]);
        // keyword
        assert_eq!(ids(&search(&trails, "cirque")), vec!["rila-1"]);
        // difficulty
        assert_eq!(ids(&search(&trails, "hard")), vec!["pirin-1"]);
        // region, non-ASCII
        assert_eq!(ids(&search(&trails, "СТРАНДЖА")), vec!["strandzha-1"]);
    }

    #[test]
    fn test_search_matches_each_record_once() {
        let trails = sample_trails();
        // "lakes" appears in name, description and keywords of rila-1
        assert_eq!(search(&trails, "lakes").len(), 1);
    }

    #[test]
    fn test_search_skips_invalid_coordinates() {
        let trails = sample_trails();
        assert!(search(&trails, "ghost").is_empty());
    }

    #[test]
    fn test_search_blank_query() {
        let trails = sample_trails();
        assert!(search(&trails, "").is_empty());
        assert!(search(&trails, "   ").is_empty());
    }

    #[test]
    fn test_find_by_id() {
        let trails = sample_trails();
        assert_eq!(find_by_id(&trails, "pirin-1").unwrap().index(), 2);
        assert!(find_by_id(&trails, "PIRIN-1").is_none());
        assert!(find_by_id(&trails, "").is_none());
        assert!(find_by_id(&trails, "nope").is_none());
    }

    #[test]
    fn test_by_region() {
        let trails = sample_trails();
        assert_eq!(
            ids(&by_region(&trails, "rila")),
            vec!["rila-1", "rila-2", "ghost-1"]
        );
        assert_eq!(ids(&by_region(&trails, "national")), vec!["rila-2"]);
        assert!(by_region(&trails, "").is_empty());
        assert!(by_region(&trails, "  ").is_empty());
    }

    #[test]
    fn test_advanced_search_and_semantics() {
        let trails = sample_trails();
        let criteria = SearchCriteria::new().region("Rila").difficulty("easy");
        // ghost-1 has no coordinates but advanced search does not require them
        assert_eq!(ids(&advanced_search(&trails, &criteria)), vec!["rila-2", "ghost-1"]);

        let criteria = SearchCriteria::new().region("rila").difficulty("hard");
        assert!(advanced_search(&trails, &criteria).is_empty());
    }

    #[test]
    fn test_advanced_search_season_is_exact_and_case_sensitive() {
        let trails = sample_trails();

        let criteria = SearchCriteria::new().season(" spring ");
        assert_eq!(ids(&advanced_search(&trails, &criteria)), vec!["rila-2"]);

        let criteria = SearchCriteria::new().season("Spring");
        assert!(advanced_search(&trails, &criteria).is_empty());

        let criteria = SearchCriteria::new().season("summ");
        assert!(advanced_search(&trails, &criteria).is_empty());
    }

    #[test]
    fn test_advanced_search_season_requires_list() {
        let trails = sample_trails();
        // pirin-1 stores best_season as a bare string
        let criteria = SearchCriteria::new().region("pirin").season("summer");
        assert!(advanced_search(&trails, &criteria).is_empty());

        let criteria = SearchCriteria::new().region("pirin");
        assert_eq!(ids(&advanced_search(&trails, &criteria)), vec!["pirin-1"]);
    }

    #[test]
    fn test_advanced_search_without_criteria_returns_everything() {
        // Scans the loaded collection rather than an empty accumulator
        let trails = sample_trails();
        assert!(SearchCriteria::new().is_empty());
        assert_eq!(advanced_search(&trails, &SearchCriteria::new()).len(), trails.len());

        let blank = SearchCriteria::new().region(" ").difficulty("").season("  ");
        assert!(blank.is_empty());
        assert_eq!(advanced_search(&trails, &blank).len(), trails.len());
    }
}
