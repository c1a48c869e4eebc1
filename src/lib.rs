//! # Eco Trails
//!
//! Cached query layer over a JSON collection of eco-trail records.
//!
//! This library provides:
//! - Loading and admission of trail records from an `eco.json` file
//! - An in-memory cache invalidated by the file's modification time
//! - Keyword search, region lookup and multi-criteria filtering
//! - Aggregate statistics and JSON export
//! - Viewport and radius queries over trail coordinates
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel keyword matching with rayon
//!
//! ## Quick Start
//!
//! ```no_run
//! use eco_trails::{SearchCriteria, TrailStore};
//!
//! let store = TrailStore::open("data/eco.json");
//!
//! for trail in store.search("rila") {
//!     println!("{} ({:?})", trail.name().unwrap_or("unnamed"), trail.difficulty());
//! }
//!
//! let easy_summer = store.advanced_search(
//!     &SearchCriteria::new().difficulty("easy").season("summer"),
//! );
//! println!("{} easy summer trails", easy_summer.len());
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{OptionExt, Result, TrailError};

// Store configuration and constants
pub mod config;
pub use config::StoreConfig;

// Trail record type
pub mod trail;
pub use trail::Trail;

// Strict standalone validation
pub mod validation;
pub use validation::{validate, Validation};

// Payload parsing and load-time admission
pub mod loader;

// Query functions over a loaded collection
pub mod query;
pub use query::SearchCriteria;

// Aggregate statistics
pub mod stats;
pub use stats::{CacheInfo, TrailStatistics};

// R-tree over trail coordinates
pub mod spatial;
pub use spatial::SpatialIndex;

// JSON export
pub mod export;
pub use export::{write_export, ExportInfo};

// Cached store exposing the public query surface
pub mod store;
pub use store::{StoreStats, TrailStore};

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use eco_trails::GpsPoint;
/// let point = GpsPoint::new(42.2, 23.32); // Rila
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Latitude/longitude bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from GPS points.
    pub fn from_points(points: &[GpsPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for p in points {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lng = min_lng.min(p.longitude);
            max_lng = max_lng.max(p.longitude);
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
