/// Grid store: the current raw grid plus its derived views.
///
/// The raw grid is replaced wholesale on every refresh, never mutated in
/// place. The clean grid and the risk-sorted view are recomputed eagerly on
/// each replacement (explicit recompute-on-write) and served as cached
/// slices afterwards, so reads are free and consumers never observe a
/// half-updated state.

use crate::geofence;
use crate::model::{GridPoint, Status};

#[derive(Debug, Default)]
pub struct GridStore {
    raw: Vec<GridPoint>,
    clean: Vec<GridPoint>,
    sorted: Vec<GridPoint>,
    status: Status,
}

impl GridStore {
    pub fn new() -> GridStore {
        GridStore::default()
    }

    /// Replaces the raw grid wholesale and recomputes both derived views.
    ///
    /// The clean grid applies the geofence predicate elementwise, preserving
    /// input order. The sorted view is a stable descending sort on
    /// `flood_probability`: ties keep their clean-grid relative order, which
    /// keeps sidebar ordering deterministic across re-renders.
    pub fn set_raw_grid(&mut self, points: Vec<GridPoint>) {
        self.raw = points;
        self.clean = self
            .raw
            .iter()
            .filter(|p| geofence::retain_point(p))
            .cloned()
            .collect();
        let mut sorted = self.clean.clone();
        sorted.sort_by(|a, b| {
            b.flood_probability
                .partial_cmp(&a.flood_probability)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        self.sorted = sorted;
    }

    pub fn raw_grid(&self) -> &[GridPoint] {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Grid restricted to points inside the landmass boundary and not
    /// name-excluded. Always a subset of the raw grid.
    pub fn clean_grid(&self) -> &[GridPoint] {
        &self.clean
    }

    /// Clean grid in descending flood-probability order.
    pub fn sorted_by_risk(&self) -> &[GridPoint] {
        &self.sorted
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn status_mut(&mut self) -> &mut Status {
        &mut self.status
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
