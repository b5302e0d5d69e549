//! End-to-end reconciliation scenarios for the dashboard engine.
//!
//! These tests drive the whole pipeline — scheduler, geofence, store,
//! aggregator, selection reconciler — against a scripted in-memory backend,
//! including the failure and out-of-order completion cases that are awkward
//! to reproduce against a live service.

use std::cell::RefCell;
use std::collections::VecDeque;

use chrono::{DateTime, Duration, TimeZone, Utc};

use floodgrid_service::config::ModelSelector;
use floodgrid_service::engine::{DashboardEngine, GridBackend, GridEnvelope, PlaceHit, PlaceSearch};
use floodgrid_service::model::{
    Enrichment, EngineError, GridPoint, PointDetail, PredictionModel,
};
use floodgrid_service::selection::{RequestKey, SelectionState};

// ============================================================================
// Scripted collaborators
// ============================================================================

/// Backend whose responses are queued up front. Every call pops the next
/// scripted response; running out of script is a test bug and panics.
#[derive(Default)]
struct ScriptedBackend {
    grids: RefCell<VecDeque<Result<GridEnvelope, EngineError>>>,
    details: RefCell<VecDeque<Result<PointDetail, EngineError>>>,
    grid_calls: RefCell<Vec<PredictionModel>>,
    refresh_calls: RefCell<Vec<PredictionModel>>,
}

impl ScriptedBackend {
    fn push_grid(&self, response: Result<GridEnvelope, EngineError>) {
        self.grids.borrow_mut().push_back(response);
    }

    fn push_detail(&self, response: Result<PointDetail, EngineError>) {
        self.details.borrow_mut().push_back(response);
    }

    fn grid_call_count(&self) -> usize {
        self.grid_calls.borrow().len()
    }
}

impl GridBackend for &ScriptedBackend {
    fn fetch_latest(&self, model: PredictionModel) -> Result<GridEnvelope, EngineError> {
        self.grid_calls.borrow_mut().push(model);
        self.grids
            .borrow_mut()
            .pop_front()
            .expect("test script ran out of grid responses")
    }

    fn trigger_refresh(&self, model: PredictionModel) -> Result<(), EngineError> {
        self.refresh_calls.borrow_mut().push(model);
        Ok(())
    }

    fn fetch_detail(&self, _key: &RequestKey) -> Result<PointDetail, EngineError> {
        self.details
            .borrow_mut()
            .pop_front()
            .expect("test script ran out of detail responses")
    }
}

struct ScriptedPlaces {
    hits: Vec<PlaceHit>,
}

impl PlaceSearch for ScriptedPlaces {
    fn search(&self, _query: &str, _viewbox: (f64, f64, f64, f64)) -> Result<Vec<PlaceHit>, EngineError> {
        Ok(self.hits.clone())
    }
}

fn no_places() -> ScriptedPlaces {
    ScriptedPlaces { hits: Vec::new() }
}

// ============================================================================
// Fixtures
// ============================================================================

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 3, 9, 0, 0).unwrap()
}

fn point(lat: f64, lon: f64, name: &str, risk: &str, prob: f64) -> GridPoint {
    GridPoint {
        lat,
        lon,
        location_name: name.to_string(),
        flood_risk: risk.to_string(),
        flood_probability: prob,
        predicted_rainfall_mm: prob * 20.0,
        recommended_action: "Monitor".to_string(),
    }
}

/// A 500-point lattice spanning well past the region boundary, so the
/// geofence has real work to do: some points fall on the landmass, the rest
/// over open sea or south of the Green Line.
fn lattice(risk: &str, prob: f64) -> Vec<GridPoint> {
    let mut points = Vec::with_capacity(500);
    for row in 0..20 {
        for col in 0..25 {
            let lat = 34.95 + row as f64 * 0.045;
            let lon = 32.55 + col as f64 * 0.09;
            points.push(point(lat, lon, "", risk, prob));
        }
    }
    points
}

fn envelope(points: Vec<GridPoint>, model: &str) -> GridEnvelope {
    GridEnvelope {
        points,
        model_applied: model.to_string(),
        generated_at_utc: "2025-11-03T09:00:00+00:00".to_string(),
    }
}

fn detail_with_weather(risk: &str, prob: f64, summary: &str) -> PointDetail {
    PointDetail {
        location_name: Some("Resolved Name".to_string()),
        flood_risk: risk.to_string(),
        flood_probability: prob,
        predicted_rainfall_mm: prob * 20.0,
        recommended_action: "Prepare".to_string(),
        enrichment: Enrichment {
            temp_c: Some(18.4),
            humidity: Some(70.0),
            wind_kph: Some(12.0),
            weather_summary: Some(summary.to_string()),
            precipitation_prob: Some(35.0),
            ..Enrichment::default()
        },
    }
}

fn engine_with<'a>(
    backend: &'a ScriptedBackend,
    places: ScriptedPlaces,
    model: PredictionModel,
) -> DashboardEngine<&'a ScriptedBackend, ScriptedPlaces> {
    DashboardEngine::new(backend, places, ModelSelector::ephemeral(model), 300, 3, t0())
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_initial_load_filters_lattice_down_to_the_landmass() {
    let backend = ScriptedBackend::default();
    backend.push_grid(Ok(envelope(lattice("Moderate", 0.5), "rf")));
    let mut engine = engine_with(&backend, no_places(), PredictionModel::Rf);

    engine.tick(t0());

    let clean = engine.clean_grid().len();
    assert!(clean > 0, "some lattice points must fall inside the region");
    assert!(
        clean < 500,
        "the geofence must exclude open-sea points, kept {} of 500",
        clean
    );
    assert_eq!(engine.status().error, None);
    assert_eq!(engine.status().last_updated, Some(t0()));
    assert_eq!(engine.status().active_model.as_deref(), Some("rf"));
    assert_eq!(engine.risk_counts().moderate, clean);
}

#[test]
fn test_malformed_and_mislabeled_points_are_silently_excluded() {
    let backend = ScriptedBackend::default();
    backend.push_grid(Ok(envelope(
        vec![
            point(35.30, 33.32, "Kyrenia", "High", 0.8),
            point(f64::NAN, 33.32, "Broken", "High", 0.9),
            point(35.25, 33.40, "Mediterranean Sea", "High", 0.9),
        ],
        "rf",
    )));
    let mut engine = engine_with(&backend, no_places(), PredictionModel::Rf);

    engine.tick(t0());

    assert_eq!(engine.clean_grid().len(), 1, "only the valid inland point survives");
    assert_eq!(engine.clean_grid()[0].location_name, "Kyrenia");
    assert_eq!(engine.status().error, None, "bad points never fail the load");
}

#[test]
fn test_model_switch_walks_ready_stale_ready_preserving_weather() {
    let backend = ScriptedBackend::default();
    backend.push_grid(Ok(envelope(lattice("Moderate", 0.5), "rf")));
    let mut engine = engine_with(&backend, no_places(), PredictionModel::Rf);
    engine.tick(t0());

    // User selects a point from the clean grid and its enrichment arrives.
    let chosen = engine.clean_grid()[0].clone();
    let key_rf = engine.select_grid_point(chosen.clone());
    backend.push_detail(Ok(detail_with_weather("Moderate", 0.5, "rf weather")));
    assert!(engine.complete_detail(&key_rf));
    assert_eq!(engine.selection_state(), SelectionState::Ready);

    // Switch to the hybrid model: selection goes stale, a re-fetch is
    // requested, and the scheduler forces an immediate reload.
    let key_hybrid = engine
        .change_model(PredictionModel::Hybrid, t0() + Duration::seconds(10))
        .expect("stale selection must request a re-fetch");
    assert_eq!(engine.selection_state(), SelectionState::Stale);
    assert!(engine.selection_is_stale());

    backend.push_grid(Ok(envelope(lattice("High", 0.9), "hybrid")));
    engine.tick(t0() + Duration::seconds(10));

    // The hybrid grid reconciled into the selection: risk fields updated,
    // weather still from the rf fetch, staleness unchanged.
    let sel = engine.selection().expect("selection survives the refresh");
    assert_eq!(sel.point.flood_risk, "High");
    assert_eq!(sel.point.flood_probability, 0.9);
    assert_eq!(sel.enrichment.weather_summary.as_deref(), Some("rf weather"));
    assert_eq!(engine.selection_state(), SelectionState::Stale);

    // The background re-fetch completes and the selection is fresh again.
    backend.push_detail(Ok(detail_with_weather("High", 0.9, "hybrid weather")));
    assert!(engine.complete_detail(&key_hybrid));
    assert_eq!(engine.selection_state(), SelectionState::Ready);
    let sel = engine.selection().unwrap();
    assert_eq!(sel.enrichment.weather_summary.as_deref(), Some("hybrid weather"));
    assert_eq!(sel.enrichment.temp_c, Some(18.0), "merged temperature is rounded");
}

#[test]
fn test_two_consecutive_load_failures_schedule_one_retry_each() {
    let backend = ScriptedBackend::default();
    backend.push_grid(Err(EngineError::Network("connection refused".to_string())));
    backend.push_grid(Err(EngineError::Network("connection refused".to_string())));
    backend.push_grid(Ok(envelope(lattice("Low", 0.1), "rf")));
    let mut engine = engine_with(&backend, no_places(), PredictionModel::Rf);

    // Cold start: the initial load fails.
    engine.tick(t0());
    assert_eq!(backend.grid_call_count(), 1);
    assert!(engine.clean_grid().is_empty(), "grid stays empty after a cold failure");
    assert!(engine.status().error.as_deref().unwrap().contains("connection refused"));

    // Before the retry delay nothing fires.
    engine.tick(t0() + Duration::seconds(2));
    assert_eq!(backend.grid_call_count(), 1, "no retry before its delay elapses");

    // First retry fires, fails, and arms exactly one follow-up.
    engine.tick(t0() + Duration::seconds(3));
    assert_eq!(backend.grid_call_count(), 2);

    engine.tick(t0() + Duration::seconds(4));
    assert_eq!(backend.grid_call_count(), 2, "one retry per failure, not a loop");

    // The chained retry succeeds.
    engine.tick(t0() + Duration::seconds(6));
    assert_eq!(backend.grid_call_count(), 3);
    assert!(!engine.clean_grid().is_empty());
    assert_eq!(engine.status().error, None);
}

#[test]
fn test_failed_load_preserves_previous_grid_and_selection() {
    let backend = ScriptedBackend::default();
    backend.push_grid(Ok(envelope(lattice("Moderate", 0.5), "rf")));
    let mut engine = engine_with(&backend, no_places(), PredictionModel::Rf);
    engine.tick(t0());
    let clean_before = engine.clean_grid().len();

    let key = engine.select_grid_point(engine.clean_grid()[0].clone());
    backend.push_detail(Ok(detail_with_weather("Moderate", 0.5, "overcast")));
    engine.complete_detail(&key);

    // The periodic reload fails; nothing visible is lost.
    backend.push_grid(Err(EngineError::Http(500)));
    engine.tick(t0() + Duration::seconds(300));

    assert_eq!(engine.clean_grid().len(), clean_before, "previous grid kept on failure");
    assert_eq!(engine.selection_state(), SelectionState::Ready);
    assert_eq!(engine.status().error.as_deref(), Some("HTTP error: 500"));
}

#[test]
fn test_out_of_order_completions_keep_only_the_current_key() {
    let backend = ScriptedBackend::default();
    backend.push_grid(Ok(envelope(lattice("Moderate", 0.5), "rf")));
    let mut engine = engine_with(&backend, no_places(), PredictionModel::Rf);
    engine.tick(t0());

    let chosen = engine.clean_grid()[0].clone();
    let key_rf = engine.select_grid_point(chosen);
    backend.push_grid(Ok(envelope(lattice("Moderate", 0.5), "hybrid")));
    let key_hybrid = engine
        .change_model(PredictionModel::Hybrid, t0() + Duration::seconds(5))
        .expect("pending selection still re-fetches under the new model");
    engine.tick(t0() + Duration::seconds(5));

    // The newer (hybrid) completion lands first; the slow rf one afterwards.
    assert!(engine.deliver_detail(&key_hybrid, Ok(detail_with_weather("High", 0.9, "hybrid wx"))));
    assert!(
        !engine.deliver_detail(&key_rf, Ok(detail_with_weather("Low", 0.1, "rf wx"))),
        "the superseded rf completion must be discarded, not merged"
    );

    let sel = engine.selection().unwrap();
    assert_eq!(sel.enrichment.weather_summary.as_deref(), Some("hybrid wx"));
    assert_eq!(engine.selection_state(), SelectionState::Ready);
}

#[test]
fn test_enrichment_failure_marks_only_the_selection() {
    let backend = ScriptedBackend::default();
    backend.push_grid(Ok(envelope(lattice("Moderate", 0.5), "rf")));
    let mut engine = engine_with(&backend, no_places(), PredictionModel::Rf);
    engine.tick(t0());

    let key = engine.select_grid_point(engine.clean_grid()[0].clone());
    backend.push_detail(Err(EngineError::Http(502)));
    assert!(engine.complete_detail(&key), "the failure is recorded against the selection");

    assert_eq!(engine.selection_state(), SelectionState::Pending);
    assert_eq!(
        engine.selection().unwrap().detail_error.as_deref(),
        Some("HTTP error: 502")
    );
    assert_eq!(engine.status().error, None, "grid status is untouched by detail failures");
}

#[test]
fn test_search_resolves_to_a_custom_selection() {
    let backend = ScriptedBackend::default();
    backend.push_grid(Ok(envelope(lattice("Low", 0.1), "rf")));
    let places = ScriptedPlaces {
        hits: vec![PlaceHit {
            lat: 35.3411,
            lon: 33.3190,
            display_name: "Kyrenia Harbour, Cyprus".to_string(),
        }],
    };
    let mut engine = engine_with(&backend, places, PredictionModel::Rf);
    engine.tick(t0());

    let key = engine.search_and_select("Kyrenia").expect("search should resolve");
    let sel = engine.selection().unwrap();
    assert!(sel.custom);
    assert_eq!(sel.point.location_name, "Kyrenia Harbour, Cyprus");
    assert_eq!(
        engine.selection_display_name().as_deref(),
        Some("Kyrenia Harbour, Cyprus"),
        "a usable server name is shown verbatim"
    );
    assert_eq!(engine.selection_state(), SelectionState::Pending);

    backend.push_detail(Ok(detail_with_weather("Moderate", 0.3, "sunny intervals")));
    assert!(engine.complete_detail(&key));
    assert_eq!(engine.selection_state(), SelectionState::Ready);
    assert_eq!(engine.selection().unwrap().point.flood_risk, "Moderate");
}

#[test]
fn test_unnamed_custom_selection_gets_a_band_fallback_name() {
    let backend = ScriptedBackend::default();
    let mut engine = engine_with(&backend, no_places(), PredictionModel::Rf);
    engine.select_custom(35.30, 33.20, String::new());
    assert_eq!(
        engine.selection_display_name().as_deref(),
        Some("Kyrenia West (35.30, 33.20)")
    );
}

#[test]
fn test_search_with_no_hits_is_a_no_place_found_error() {
    let backend = ScriptedBackend::default();
    let mut engine = engine_with(&backend, no_places(), PredictionModel::Rf);
    let err = engine.search_and_select("Atlantis").unwrap_err();
    assert_eq!(err, EngineError::NoPlaceFound("Atlantis".to_string()));
    assert!(engine.selection().is_none(), "a failed search leaves no selection behind");
}

#[test]
fn test_manual_refresh_triggers_regeneration_then_reload() {
    let backend = ScriptedBackend::default();
    backend.push_grid(Ok(envelope(lattice("Low", 0.1), "rf")));
    backend.push_grid(Ok(envelope(lattice("Moderate", 0.4), "rf")));
    let mut engine = engine_with(&backend, no_places(), PredictionModel::Rf);
    engine.tick(t0());

    engine
        .refresh_now(t0() + Duration::seconds(30))
        .expect("refresh should succeed");
    assert_eq!(backend.refresh_calls.borrow().as_slice(), &[PredictionModel::Rf]);
    assert_eq!(backend.grid_call_count(), 2, "refresh reloads after regeneration");
    assert_eq!(engine.risk_counts().moderate, engine.clean_grid().len());
}

#[test]
fn test_sorted_view_and_filters_reflect_the_clean_grid() {
    let backend = ScriptedBackend::default();
    backend.push_grid(Ok(envelope(
        vec![
            point(35.30, 33.32, "Kyrenia", "Low", 0.1),
            point(35.20, 33.60, "Gecitkale", "High", 0.9),
            point(35.18, 33.40, "Haspolat", "Moderate", 0.4),
            point(35.60, 33.30, "Offshore", "High", 0.95), // open sea, filtered out
        ],
        "rf",
    )));
    let mut engine = engine_with(&backend, no_places(), PredictionModel::Rf);
    engine.tick(t0());

    let sorted: Vec<_> = engine
        .sorted_by_risk()
        .iter()
        .map(|p| p.location_name.as_str())
        .collect();
    assert_eq!(sorted, vec!["Gecitkale", "Haspolat", "Kyrenia"]);

    let counts = engine.risk_counts();
    assert_eq!((counts.low, counts.moderate, counts.high), (1, 1, 1));

    use floodgrid_service::aggregate::RiskFilter;
    assert_eq!(engine.filtered(RiskFilter::High).len(), 1);
    assert_eq!(engine.filtered(RiskFilter::ModerateHigh).len(), 2);
    assert_eq!(engine.filtered(RiskFilter::All).len(), 3, "the offshore point never appears");
}
