//! Aggregate statistics over a loaded collection.

use std::collections::BTreeMap;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;

use crate::config::{UNKNOWN_REGION, UNSPECIFIED_DIFFICULTY};
use crate::{Bounds, GpsPoint, Trail};

/// Distribution of the collection by region, difficulty and season.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrailStatistics {
    pub total_trails: usize,
    pub regions: BTreeMap<String, usize>,
    pub difficulties: BTreeMap<String, usize>,
    /// One count per season entry, so the sum may exceed `total_trails`
    pub seasons: BTreeMap<String, usize>,
    /// Bounding box of all valid trail coordinates
    pub extent: Option<Bounds>,
    /// When the statistics were computed; `None` for an empty collection
    pub last_updated: Option<DateTime<Local>>,
    pub cache_info: CacheInfo,
}

/// State of the store's cache at the time statistics were taken.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheInfo {
    pub cached: bool,
    /// Modification time of the source file the cache was built from
    pub source_modified: Option<DateTime<Local>>,
}

impl CacheInfo {
    pub(crate) fn new(source_modified: Option<SystemTime>) -> Self {
        Self {
            cached: source_modified.is_some(),
            source_modified: source_modified.map(DateTime::<Local>::from),
        }
    }
}

/// Count trails per region, difficulty and season.
pub fn compute_statistics(trails: &[Trail], cache_info: CacheInfo) -> TrailStatistics {
    let mut regions = BTreeMap::new();
    let mut difficulties = BTreeMap::new();
    let mut seasons = BTreeMap::new();
    let mut points: Vec<GpsPoint> = Vec::new();

    for trail in trails {
        let region = trail.region().unwrap_or(UNKNOWN_REGION);
        *regions.entry(region.to_string()).or_insert(0) += 1;

        let difficulty = trail.difficulty().unwrap_or(UNSPECIFIED_DIFFICULTY);
        *difficulties.entry(difficulty.to_string()).or_insert(0) += 1;

        for season in trail.seasons().unwrap_or_default() {
            *seasons.entry(season_label(season)).or_insert(0) += 1;
        }

        points.extend(trail.coordinates());
    }

    TrailStatistics {
        total_trails: trails.len(),
        regions,
        difficulties,
        seasons,
        extent: Bounds::from_points(&points),
        last_updated: (!trails.is_empty()).then(Local::now),
        cache_info,
    }
}

fn season_label(season: &Value) -> String {
    match season {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
