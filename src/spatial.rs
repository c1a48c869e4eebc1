//! # Spatial Index
//!
//! R-tree over the coordinates of a loaded collection, used for viewport
//! and radius queries. Only records with valid coordinates are indexed.
//!
//! Entries refer back to the collection by position, so an index is only
//! meaningful together with the slice it was built from.

use geo::{Distance, Haversine, Point};
use rstar::{RTree, RTreeObject, AABB};

use crate::{Bounds, GpsPoint, Trail};

/// Approximate length of one degree of latitude, in meters.
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Point wrapper for R-tree spatial indexing
#[derive(Debug, Clone)]
pub struct TrailLocation {
    /// Position of the trail in the collection
    pub position: usize,
    pub point: GpsPoint,
}

impl RTreeObject for TrailLocation {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.point.longitude, self.point.latitude])
    }
}

/// Spatial index over one collection snapshot.
#[derive(Debug)]
pub struct SpatialIndex {
    tree: RTree<TrailLocation>,
}

impl SpatialIndex {
    /// Bulk-load an index from the trails that have valid coordinates.
    pub fn build(trails: &[Trail]) -> Self {
        let locations: Vec<TrailLocation> = trails
            .iter()
            .enumerate()
            .filter_map(|(position, t)| {
                t.coordinates()
                    .map(|point| TrailLocation { position, point })
            })
            .collect();

        Self {
            tree: RTree::bulk_load(locations),
        }
    }

    /// Number of indexed trails.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Positions of trails inside `bounds`, in collection order.
    pub fn within_bounds(&self, bounds: &Bounds) -> Vec<usize> {
        let search_bounds = AABB::from_corners(
            [bounds.min_lng, bounds.min_lat],
            [bounds.max_lng, bounds.max_lat],
        );

        let mut positions: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&search_bounds)
            .map(|loc| loc.position)
            .collect();
        positions.sort_unstable();
        positions
    }

    /// Trails within `radius_meters` of `center` (haversine), nearest first.
    ///
    /// Returns `(position, distance_meters)` pairs. An invalid center or a
    /// negative/non-finite radius yields nothing.
    pub fn nearby(&self, center: GpsPoint, radius_meters: f64) -> Vec<(usize, f64)> {
        if !center.is_valid() || !radius_meters.is_finite() || radius_meters < 0.0 {
            return Vec::new();
        }

        let origin = Point::new(center.longitude, center.latitude);
        let mut hits: Vec<(usize, f64)> = self
            .tree
            .locate_in_envelope_intersecting(&search_envelope(center, radius_meters))
            .filter_map(|loc| {
                let dist = Haversine::distance(
                    origin,
                    Point::new(loc.point.longitude, loc.point.latitude),
                );
                (dist <= radius_meters).then_some((loc.position, dist))
            })
            .collect();

        hits.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        hits
    }
}

/// Degree box guaranteed to contain the search circle.
///
/// Falls back to the full longitude range near the poles or when the box
/// would cross the antimeridian.
fn search_envelope(center: GpsPoint, radius_meters: f64) -> AABB<[f64; 2]> {
    let lat_delta = radius_meters / METERS_PER_DEGREE;
    let min_lat = (center.latitude - lat_delta).max(-90.0);
    let max_lat = (center.latitude + lat_delta).min(90.0);

    let cos_lat = min_lat.to_radians().cos().min(max_lat.to_radians().cos());
    let lng_delta = if cos_lat > 1e-6 {
        lat_delta / cos_lat
    } else {
        f64::INFINITY
    };

    let (min_lng, max_lng) = if center.longitude - lng_delta < -180.0
        || center.longitude + lng_delta > 180.0
    {
        (-180.0, 180.0)
    } else {
        (center.longitude - lng_delta, center.longitude + lng_delta)
    };

    AABB::from_corners([min_lng, min_lat], [max_lng, max_lat])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use serde_json::{json, Value};

    fn trail(index: usize, id: &str, coords: Value) -> Trail {
        let Value::Object(fields) = json!({"id": id, "location": {"coordinates": coords}}) else {
            unreachable!()
        };
        Trail::from_raw(fields, index, Local::now())
    }

    fn sample_trails() -> Vec<Trail> {
        vec![
            // Sofia
            trail(0, "vitosha", json!({"lat": 42.58, "lng": 23.29})),
            // Rila lakes, ~60km south of Sofia
            trail(1, "rila", json!({"lat": 42.2, "lng": 23.32})),
            // No coordinates
            trail(2, "ghost", Value::Null),
            // Burgas coast
            trail(3, "strandzha", json!({"lat": 42.05, "lng": 27.6})),
        ]
    }

    #[test]
    fn test_only_valid_coordinates_are_indexed() {
        let index = SpatialIndex::build(&sample_trails());
        assert_eq!(index.len(), 3);
        assert!(!index.is_empty());
        assert!(SpatialIndex::build(&[]).is_empty());
    }

    #[test]
    fn test_within_bounds() {
        let index = SpatialIndex::build(&sample_trails());
        let west_bulgaria = Bounds {
            min_lat: 41.0,
            max_lat: 43.0,
            min_lng: 22.0,
            max_lng: 24.0,
        };
        assert_eq!(index.within_bounds(&west_bulgaria), vec![0, 1]);

        let atlantic = Bounds {
            min_lat: 10.0,
            max_lat: 20.0,
            min_lng: -40.0,
            max_lng: -30.0,
        };
        assert!(index.within_bounds(&atlantic).is_empty());
    }

    #[test]
    fn test_nearby_sorted_by_distance() {
        let index = SpatialIndex::build(&sample_trails());
        let sofia = GpsPoint::new(42.69, 23.32);

        let hits = index.nearby(sofia, 20_000.0);
        assert_eq!(hits.iter().map(|h| h.0).collect::<Vec<_>>(), vec![0]);

        let hits = index.nearby(sofia, 100_000.0);
        assert_eq!(hits.iter().map(|h| h.0).collect::<Vec<_>>(), vec![0, 1]);
        assert!(hits[0].1 < hits[1].1);

        let hits = index.nearby(sofia, 500_000.0);
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_nearby_rejects_bad_input() {
        let index = SpatialIndex::build(&sample_trails());
        assert!(index.nearby(GpsPoint::new(95.0, 0.0), 1000.0).is_empty());
        assert!(index.nearby(GpsPoint::new(42.0, 23.0), -1.0).is_empty());
        assert!(index.nearby(GpsPoint::new(42.0, 23.0), f64::NAN).is_empty());
    }

    #[test]
    fn test_nearby_across_antimeridian() {
        let trails = vec![
            trail(0, "east", json!({"lat": 0.0, "lng": 179.99})),
            trail(1, "west", json!({"lat": 0.0, "lng": -179.99})),
        ];
        let index = SpatialIndex::build(&trails);
        let hits = index.nearby(GpsPoint::new(0.0, 179.999), 5_000.0);
        assert_eq!(hits.len(), 2);
    }
}
