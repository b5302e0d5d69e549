/// Geofence filtering for incoming grid points.
///
/// Two independent checks, applied in a fixed order:
///   1. a planar point-in-polygon test against the region boundary;
///   2. a semantic exclusion — points whose server name mentions open water
///      ("sea" / "ocean") are rejected even when geometrically inside,
///      correcting mislabeled coastal cells.
///
/// The polygon is authoritative; the name rule is a coarse heuristic layered
/// on top of it and both are exposed separately so they stay independently
/// testable.

use crate::model::GridPoint;
use crate::region::REGION_BOUNDARY;

// ---------------------------------------------------------------------------
// Point-in-polygon
// ---------------------------------------------------------------------------

/// Crossing-number (ray casting) containment test on an ordered (lat, lon)
/// ring. The last vertex implicitly connects to the first.
///
/// Odd-even rule: the parity flag toggles once per edge the ray crosses.
/// Points exactly on the boundary are classified by whatever the arithmetic
/// produces — an accepted ambiguity at grid-cell resolution, not a defect.
///
/// O(|ring|) per call, no allocation.
pub fn point_in_polygon(lat: f64, lon: f64, ring: &[(f64, f64)]) -> bool {
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (lat_i, lon_i) = ring[i];
        let (lat_j, lon_j) = ring[j];
        if (lon_i > lon) != (lon_j > lon)
            && lat < (lat_j - lat_i) * (lon - lon_i) / (lon_j - lon_i) + lat_i
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

// ---------------------------------------------------------------------------
// Name exclusion
// ---------------------------------------------------------------------------

/// True if the place name marks the point as open water. Case-insensitive
/// substring match; empty names never match.
pub fn is_water_named(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("sea") || lower.contains("ocean")
}

// ---------------------------------------------------------------------------
// Composed predicate
// ---------------------------------------------------------------------------

/// Retention predicate applied to every incoming grid point.
///
/// Non-finite coordinates (missing or non-numeric upstream values coerced to
/// NaN at ingest) are excluded here rather than erroring, so malformed
/// upstream data never blanks the dashboard.
pub fn retain_point(point: &GridPoint) -> bool {
    if !point.lat.is_finite() || !point.lon.is_finite() {
        return false;
    }
    if !point_in_polygon(point.lat, point.lon, REGION_BOUNDARY) {
        return false;
    }
    !is_water_named(&point.location_name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
