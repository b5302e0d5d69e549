/// Selection reconciler: keeps the single selected point coherent while the
/// grid underneath it is replaced and the active model switches.
///
/// The backend assigns no persistent point ids — every refresh produces a
/// brand-new collection — so the selection is re-resolved against each new
/// clean grid by coordinate proximity. The tolerance must stay below the
/// minimum spacing between distinct grid cells or a refresh could silently
/// jump the selection to a neighbor.
///
/// Enrichment fetches are asynchronous from the engine's point of view and
/// their completions may arrive out of order (a slow fetch issued before a
/// model switch can land after the newer one). Each request therefore
/// carries an explicit key; completions whose key no longer matches the
/// live selection are discarded at merge time. No cancellation is assumed.

use crate::model::{Enrichment, GridPoint, PointDetail, PredictionModel};

/// Maximum per-axis coordinate delta for two points to count as the same
/// grid cell. Roughly single-digit-meter precision; the grid spacing is
/// two orders of magnitude coarser.
pub const MATCH_TOLERANCE_DEG: f64 = 0.001;

/// True if the two coordinate pairs identify the same grid cell.
pub fn coords_match(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> bool {
    (lat_a - lat_b).abs() < MATCH_TOLERANCE_DEG && (lon_a - lon_b).abs() < MATCH_TOLERANCE_DEG
}

// ---------------------------------------------------------------------------
// Request keys
// ---------------------------------------------------------------------------

/// Identity of one in-flight enrichment request: the coordinates and model
/// it was computed for. Compared at merge time to drop superseded results.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestKey {
    pub lat: f64,
    pub lon: f64,
    pub model: PredictionModel,
}

// ---------------------------------------------------------------------------
// Selection state
// ---------------------------------------------------------------------------

/// Observable lifecycle state of the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    /// No point selected.
    Empty,
    /// Coordinates known, detail not yet fetched (or the fetch failed).
    Pending,
    /// Detail present and computed under the active model.
    Ready,
    /// Detail present but computed under a different model; a background
    /// re-fetch is expected.
    Stale,
}

/// The selected point with everything fetched for it so far.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub point: GridPoint,
    /// True when created from a map click or search result rather than a
    /// grid cell.
    pub custom: bool,
    pub enrichment: Enrichment,
    /// Model the enrichment was computed under; `None` until the first
    /// detail merge.
    pub enriched_model: Option<PredictionModel>,
    pub loading_details: bool,
    /// Error marker from the last failed detail fetch, surfaced to the
    /// presentation layer. Never retried automatically.
    pub detail_error: Option<String>,
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

/// Owns the at-most-one live selection and every transition on it.
/// All mutation goes through these methods, so consumers can never observe
/// a torn state.
#[derive(Debug, Default)]
pub struct SelectionReconciler {
    current: Option<Selection>,
}

impl SelectionReconciler {
    pub fn new() -> SelectionReconciler {
        SelectionReconciler::default()
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.current.as_ref()
    }

    /// Current lifecycle state given the active model.
    pub fn state(&self, active_model: PredictionModel) -> SelectionState {
        match &self.current {
            None => SelectionState::Empty,
            Some(sel) => match sel.enriched_model {
                None => SelectionState::Pending,
                Some(m) if m == active_model => SelectionState::Ready,
                Some(_) => SelectionState::Stale,
            },
        }
    }

    /// True if the selection carries enrichment computed under a model other
    /// than the active one.
    pub fn is_stale(&self, active_model: PredictionModel) -> bool {
        self.state(active_model) == SelectionState::Stale
    }

    /// Selects a grid cell: the selection starts Pending with the
    /// grid-known fields pre-populated, and the caller is handed the key of
    /// the enrichment fetch to issue.
    pub fn select_grid_point(&mut self, point: GridPoint, active_model: PredictionModel) -> RequestKey {
        let key = RequestKey { lat: point.lat, lon: point.lon, model: active_model };
        self.current = Some(Selection {
            point,
            custom: false,
            enrichment: Enrichment::default(),
            enriched_model: None,
            loading_details: true,
            detail_error: None,
        });
        key
    }

    /// Selects an arbitrary coordinate (map click or search result).
    /// Prediction fields are unknown until the detail fetch completes.
    pub fn select_custom(
        &mut self,
        lat: f64,
        lon: f64,
        name: String,
        active_model: PredictionModel,
    ) -> RequestKey {
        let key = RequestKey { lat, lon, model: active_model };
        self.current = Some(Selection {
            point: GridPoint {
                lat,
                lon,
                location_name: name,
                flood_risk: String::new(),
                flood_probability: 0.0,
                predicted_rainfall_mm: 0.0,
                recommended_action: String::new(),
            },
            custom: true,
            enrichment: Enrichment::default(),
            enriched_model: None,
            loading_details: true,
            detail_error: None,
        });
        key
    }

    /// Explicit deselect (or a reload that intentionally resets context).
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Re-resolves the selection against a freshly arrived clean grid.
    ///
    /// On a proximity match the prediction fields are overwritten from the
    /// new point while previously fetched enrichment is preserved. On no
    /// match the selection is left untouched — optimistic continuity across
    /// a refresh boundary, never an implicit clear.
    ///
    /// Returns `true` if a matching point was merged.
    pub fn reconcile_with_grid(&mut self, clean_grid: &[GridPoint]) -> bool {
        let Some(sel) = self.current.as_mut() else {
            return false;
        };
        let Some(updated) = clean_grid
            .iter()
            .find(|p| coords_match(p.lat, p.lon, sel.point.lat, sel.point.lon))
        else {
            return false;
        };
        sel.point = updated.clone();
        sel.loading_details = false;
        true
    }

    /// The active model changed. If the selection's enrichment was computed
    /// under a different model it is now stale and the returned key names
    /// the background re-fetch to issue.
    pub fn on_model_change(&mut self, new_model: PredictionModel) -> Option<RequestKey> {
        let sel = self.current.as_mut()?;
        if sel.enriched_model == Some(new_model) {
            return None;
        }
        sel.loading_details = true;
        Some(RequestKey { lat: sel.point.lat, lon: sel.point.lon, model: new_model })
    }

    /// Merges a completed enrichment fetch, or records its failure.
    ///
    /// The completion is applied only when the request key still matches the
    /// live selection: same grid cell (proximity, since a refresh may have
    /// nudged the stored coordinates) and same model as `active_model`.
    /// Anything else is a superseded result and is dropped without touching
    /// state — the guard that makes overlapping fetches safe without
    /// cancellation.
    ///
    /// Returns `true` if the result was applied, `false` if discarded.
    pub fn apply_detail(
        &mut self,
        key: &RequestKey,
        result: Result<PointDetail, String>,
        active_model: PredictionModel,
    ) -> bool {
        let Some(sel) = self.current.as_mut() else {
            return false;
        };
        if !coords_match(key.lat, key.lon, sel.point.lat, sel.point.lon) {
            return false;
        }
        if key.model != active_model {
            return false;
        }
        match result {
            Ok(detail) => {
                sel.point.flood_risk = detail.flood_risk;
                sel.point.flood_probability = detail.flood_probability;
                sel.point.predicted_rainfall_mm = detail.predicted_rainfall_mm;
                sel.point.recommended_action = detail.recommended_action;
                if sel.point.location_name.is_empty() {
                    if let Some(name) = detail.location_name {
                        sel.point.location_name = name;
                    }
                }
                let mut enrichment = detail.enrichment;
                enrichment.temp_c = enrichment.temp_c.map(f64::round);
                sel.enrichment = enrichment;
                sel.enriched_model = Some(key.model);
                sel.loading_details = false;
                sel.detail_error = None;
            }
            Err(message) => {
                sel.loading_details = false;
                sel.detail_error = Some(message);
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
