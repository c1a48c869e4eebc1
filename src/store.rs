//! # Trail Store
//!
//! Owns the cached collection and answers every query against it.
//!
//! ## Cache coherence
//!
//! The cache holds one collection together with the modification time of the
//! file it was parsed from. `load()` compares that time with the file's
//! current one and only re-reads the file when they differ, so each change
//! on disk is parsed at most once.
//!
//! The check/reload/replace sequence runs under the write half of a single
//! `RwLock` (the hit path only takes the read half), so concurrent callers
//! never parse the same version twice or observe a half-replaced cache.
//!
//! ## Failure policy
//!
//! `load()` and `export()` never fail outright: errors are logged and turned
//! into an empty collection or `false`. Use `try_load()` to see the error.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::SystemTime;

use log::{debug, error, info, warn};
use once_cell::sync::OnceCell;

use crate::config::StoreConfig;
use crate::error::{OptionExt, Result, TrailError};
use crate::export::write_export;
use crate::query::{self, SearchCriteria};
use crate::spatial::SpatialIndex;
use crate::stats::{compute_statistics, CacheInfo, TrailStatistics};
use crate::{loader, Bounds, GpsPoint, Trail};

// ============================================================================
// Cache State
// ============================================================================

/// One loaded version of the collection plus its lazily built spatial index.
#[derive(Clone)]
struct Snapshot {
    trails: Arc<[Trail]>,
    spatial: Arc<OnceCell<SpatialIndex>>,
}

impl Snapshot {
    fn new(trails: Vec<Trail>) -> Self {
        Self {
            trails: trails.into(),
            spatial: Arc::new(OnceCell::new()),
        }
    }

    fn empty() -> Self {
        Self::new(Vec::new())
    }

    fn spatial_index(&self) -> &SpatialIndex {
        self.spatial
            .get_or_init(|| SpatialIndex::build(&self.trails))
    }

    fn pick(&self, positions: impl IntoIterator<Item = usize>) -> Vec<Trail> {
        positions
            .into_iter()
            .filter_map(|p| self.trails.get(p).cloned())
            .collect()
    }
}

struct CacheEntry {
    snapshot: Snapshot,
    source_modified: SystemTime,
}

// ============================================================================
// Trail Store
// ============================================================================

/// Cached, read-only query layer over a trail data file.
pub struct TrailStore {
    config: StoreConfig,
    cache: RwLock<Option<CacheEntry>>,
    reloads: AtomicU64,
    cache_hits: AtomicU64,
}

impl TrailStore {
    /// Create a store with the given configuration. Nothing is read until the
    /// first query.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            cache: RwLock::new(None),
            reloads: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
        }
    }

    /// Create a store backed by `path`, other settings default.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::new(StoreConfig::with_data_path(path))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Current collection, reloading if the data file changed.
    ///
    /// Returns the same `Arc` for as long as the file's modification time is
    /// unchanged. Any failure yields an empty collection.
    pub fn load(&self) -> Arc<[Trail]> {
        self.load_snapshot().trails
    }

    /// Like [`load`](Self::load) but reports why loading failed.
    pub fn try_load(&self) -> Result<Arc<[Trail]>> {
        self.try_load_snapshot().map(|s| s.trails)
    }

    /// Drop the cached collection; the next query re-reads the file.
    pub fn clear_cache(&self) {
        *self.write_cache() = None;
        info!("[TrailStore] Cache cleared");
    }

    fn load_snapshot(&self) -> Snapshot {
        match self.try_load_snapshot() {
            Ok(snapshot) => snapshot,
            Err(TrailError::Io { path, source })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                warn!("[TrailStore] Data file not found: {}", path.display());
                Snapshot::empty()
            }
            Err(e) => {
                error!("[TrailStore] Failed to load trails: {}", e);
                Snapshot::empty()
            }
        }
    }

    fn try_load_snapshot(&self) -> Result<Snapshot> {
        let path = &self.config.data_path;
        let modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .map_err(|e| TrailError::io(path, e))?;

        if let Some(snapshot) = Self::fresh(self.read_cache().as_ref(), modified) {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(snapshot);
        }

        let mut cache = self.write_cache();
        // Another caller may have reloaded while we waited for the lock
        if let Some(snapshot) = Self::fresh(cache.as_ref(), modified) {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(snapshot);
        }

        let snapshot = Snapshot::new(loader::read_collection(path)?);
        self.reloads.fetch_add(1, Ordering::Relaxed);
        *cache = Some(CacheEntry {
            snapshot: snapshot.clone(),
            source_modified: modified,
        });

        Ok(snapshot)
    }

    fn fresh(entry: Option<&CacheEntry>, modified: SystemTime) -> Option<Snapshot> {
        entry
            .filter(|e| e.source_modified == modified)
            .map(|e| e.snapshot.clone())
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, Option<CacheEntry>> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, Option<CacheEntry>> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Keyword search; see [`query::search`]. A blank query does no I/O.
    pub fn search(&self, query: &str) -> Vec<Trail> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        let trails = self.load();
        let found = cloned(query::search(&trails, query));
        debug!("[TrailStore] Search '{}' matched {} trails", query, found.len());
        found
    }

    /// Exact id lookup. An empty id does no I/O.
    pub fn get_by_id(&self, id: &str) -> Option<Trail> {
        if id.is_empty() {
            debug!("[TrailStore] Ignoring lookup with empty id");
            return None;
        }
        let trails = self.load();
        let found = query::find_by_id(&trails, id).cloned();
        if found.is_none() {
            debug!("[TrailStore] Trail '{}' not found", id);
        }
        found
    }

    /// Id lookup that reports a miss as [`TrailError::NotFound`].
    pub fn require_by_id(&self, id: &str) -> Result<Trail> {
        self.get_by_id(id).ok_or_not_found(id)
    }

    /// The whole collection in load order.
    pub fn list_all(&self) -> Arc<[Trail]> {
        self.load()
    }

    /// Trails whose region contains `region`. Blank input does no I/O.
    pub fn by_region(&self, region: &str) -> Vec<Trail> {
        if region.trim().is_empty() {
            return Vec::new();
        }
        let trails = self.load();
        cloned(query::by_region(&trails, region))
    }

    /// Multi-criteria filter; see [`query::advanced_search`].
    pub fn advanced_search(&self, criteria: &SearchCriteria) -> Vec<Trail> {
        let trails = self.load();
        let found = cloned(query::advanced_search(&trails, criteria));
        debug!(
            "[TrailStore] Advanced search {:?} matched {} trails",
            criteria,
            found.len()
        );
        found
    }

    /// Counts by region, difficulty and season.
    pub fn statistics(&self) -> TrailStatistics {
        let trails = self.load();
        let cache_info = CacheInfo::new(self.read_cache().as_ref().map(|e| e.source_modified));
        compute_statistics(&trails, cache_info)
    }

    /// Trails whose coordinates fall inside `bounds`, in load order.
    pub fn within_bounds(&self, bounds: &Bounds) -> Vec<Trail> {
        let snapshot = self.load_snapshot();
        let positions = snapshot.spatial_index().within_bounds(bounds);
        snapshot.pick(positions)
    }

    /// Trails within `radius_meters` of a point, nearest first.
    pub fn find_nearby(&self, lat: f64, lng: f64, radius_meters: f64) -> Vec<Trail> {
        let snapshot = self.load_snapshot();
        let hits = snapshot
            .spatial_index()
            .nearby(GpsPoint::new(lat, lng), radius_meters);
        snapshot.pick(hits.into_iter().map(|(position, _)| position))
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// Export `trails`, or the full collection when `None`, to `path`.
    ///
    /// Returns `false` (after logging) on any failure.
    pub fn export(&self, path: impl AsRef<Path>, trails: Option<&[Trail]>) -> bool {
        let path = path.as_ref();
        let loaded;
        let trails = match trails {
            Some(trails) => trails,
            None => {
                loaded = self.load();
                &loaded[..]
            }
        };

        match write_export(path, trails, &self.config.exported_by) {
            Ok(info) => {
                info!(
                    "[Exporter] Exported {} trails to {}",
                    info.total_count,
                    path.display()
                );
                true
            }
            Err(e) => {
                error!("[Exporter] Export failed: {}", e);
                false
            }
        }
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Cache instrumentation.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            reloads: self.reloads.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cached_count: self
                .read_cache()
                .as_ref()
                .map(|e| e.snapshot.trails.len()),
        }
    }
}

impl Default for TrailStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

/// Store statistics for monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Times the data file was read and parsed successfully
    pub reloads: u64,
    /// Loads answered from the cache
    pub cache_hits: u64,
    /// Size of the cached collection, `None` when nothing is cached
    pub cached_count: Option<usize>,
}

fn cloned(trails: Vec<&Trail>) -> Vec<Trail> {
    trails.into_iter().cloned().collect()
}

// ============================================================================
// Tests
// ============================================================================
