/// Deterministic fallback naming for grid coordinates.
///
/// The backend usually supplies a place name; when it is empty or the
/// "Unknown" placeholder, a coordinate is labeled from the ordered band
/// rules in the region registry. Identical coordinates always resolve to
/// byte-identical labels — exports and the sidebar depend on that.

use crate::model::GridPoint;
use crate::region::NAMING_BANDS;

/// Placeholder the backend emits when reverse geocoding failed upstream.
const PLACEHOLDER_NAME: &str = "Unknown";

/// Resolves a display name for a grid point.
///
/// A usable server name is returned verbatim. Otherwise the naming bands are
/// tried in registry order and the first match labels the point with its
/// coordinates at two decimals. The generic three-decimal fallback is
/// unreachable while the band set covers the plane, but kept so a future
/// band edit cannot panic here.
pub fn resolve_name(point: &GridPoint) -> String {
    resolve_coords(point.lat, point.lon, &point.location_name)
}

/// Same resolution for a bare coordinate pair (custom selections carry
/// their name separately from the grid).
pub fn resolve_coords(lat: f64, lon: f64, server_name: &str) -> String {
    if !server_name.is_empty() && server_name != PLACEHOLDER_NAME {
        return server_name.to_string();
    }
    for band in NAMING_BANDS {
        if band.contains(lat, lon) {
            return format!("{} ({:.2}, {:.2})", band.label, lat, lon);
        }
    }
    format!("Location ({:.3}, {:.3})", lat, lon)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
