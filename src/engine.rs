/// Dashboard engine: wires the grid store, selection reconciler, and refresh
/// scheduler to the external collaborators and exposes the operations the
/// presentation layer calls.
///
/// The engine is single-threaded and event-driven. All recomputation
/// (filter, sort, aggregate) runs synchronously inline; the only suspension
/// points are the collaborator calls, and their completions are fed back
/// through engine methods on the same control thread. Overlapping
/// enrichment completions are serialized through the reconciler's
/// request-key guard, so ordering between them never matters.

use chrono::{DateTime, Utc};

use crate::aggregate::{self, RiskCounts, RiskFilter};
use crate::config::ModelSelector;
use crate::logging::{self, Subsystem};
use crate::model::{EngineError, GridPoint, PointDetail, PredictionModel, Status};
use crate::naming;
use crate::region::SEARCH_VIEWBOX;
use crate::scheduler::{DueWork, RefreshScheduler};
use crate::selection::{RequestKey, Selection, SelectionReconciler, SelectionState};
use crate::store::GridStore;

// ---------------------------------------------------------------------------
// Collaborator contracts
// ---------------------------------------------------------------------------

/// A successfully decoded `/grid/latest` response.
#[derive(Debug, Clone, PartialEq)]
pub struct GridEnvelope {
    pub points: Vec<GridPoint>,
    pub model_applied: String,
    pub generated_at_utc: String,
}

/// One hit from the bounded place search.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceHit {
    pub lat: f64,
    pub lon: f64,
    pub display_name: String,
}

/// The prediction backend. Implementations own transport, decoding, and the
/// success-status contract check; the engine only sees domain values.
pub trait GridBackend {
    fn fetch_latest(&self, model: PredictionModel) -> Result<GridEnvelope, EngineError>;
    /// Asks the backend to regenerate its backing data. Does not reload.
    fn trigger_refresh(&self, model: PredictionModel) -> Result<(), EngineError>;
    fn fetch_detail(&self, key: &RequestKey) -> Result<PointDetail, EngineError>;
}

/// Third-party place lookup, bounded to the region viewbox.
pub trait PlaceSearch {
    fn search(&self, query: &str, viewbox: (f64, f64, f64, f64)) -> Result<Vec<PlaceHit>, EngineError>;
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct DashboardEngine<B: GridBackend, P: PlaceSearch> {
    backend: B,
    places: P,
    store: GridStore,
    reconciler: SelectionReconciler,
    scheduler: RefreshScheduler,
    selector: ModelSelector,
}

impl<B: GridBackend, P: PlaceSearch> DashboardEngine<B, P> {
    pub fn new(
        backend: B,
        places: P,
        selector: ModelSelector,
        poll_interval_secs: u64,
        retry_delay_secs: u64,
        now: DateTime<Utc>,
    ) -> DashboardEngine<B, P> {
        DashboardEngine {
            backend,
            places,
            store: GridStore::new(),
            reconciler: SelectionReconciler::new(),
            scheduler: RefreshScheduler::new(poll_interval_secs, retry_delay_secs, now),
            selector,
        }
    }

    // --- Refresh pipeline ---------------------------------------------------

    /// Loads the latest grid for the active model and replaces the store.
    ///
    /// On success the selection is re-reconciled against the new clean grid.
    /// On failure the previous grid and selection stay intact, the error
    /// lands in `Status.error`, and a one-shot retry is armed.
    pub fn reload(&mut self, now: DateTime<Utc>) -> Result<(), EngineError> {
        let model = self.selector.get();
        self.store.status_mut().loading = true;
        self.store.status_mut().error = None;

        match self.backend.fetch_latest(model) {
            Ok(envelope) => {
                let raw_count = envelope.points.len();
                self.store.set_raw_grid(envelope.points);
                *self.store.status_mut() = Status {
                    loading: false,
                    error: None,
                    last_updated: Some(now),
                    active_model: Some(envelope.model_applied),
                    generated_at: Some(envelope.generated_at_utc),
                };
                self.scheduler.note_success();
                let matched = self.reconciler.reconcile_with_grid(self.store.clean_grid());
                logging::info(
                    Subsystem::Grid,
                    None,
                    &format!(
                        "grid reloaded: {} raw, {} clean points (model {})",
                        raw_count,
                        self.store.clean_grid().len(),
                        model
                    ),
                );
                if matched {
                    logging::debug(Subsystem::Grid, None, "selection re-resolved against new grid");
                }
                Ok(())
            }
            Err(err) => {
                let status = self.store.status_mut();
                status.loading = false;
                status.error = Some(err.to_string());
                self.scheduler.note_failure(now);
                logging::log_backend_failure(Subsystem::Grid, None, "grid load", &err);
                Err(err)
            }
        }
    }

    /// Manual refresh: ask the backend to regenerate, then reload.
    pub fn refresh_now(&mut self, now: DateTime<Utc>) -> Result<(), EngineError> {
        self.store.status_mut().loading = true;
        self.store.status_mut().error = None;
        let model = self.selector.get();
        match self.backend.trigger_refresh(model) {
            Ok(()) => {
                logging::info(Subsystem::Grid, None, &format!("backend regeneration triggered (model {})", model));
                self.reload(now)
            }
            Err(err) => {
                *self.store.status_mut() = Status {
                    loading: false,
                    error: Some(err.to_string()),
                    ..Status::default()
                };
                logging::log_backend_failure(Subsystem::Grid, None, "grid refresh", &err);
                Err(err)
            }
        }
    }

    /// Runs whatever scheduled work has come due. The retry reloads only if
    /// the grid is still empty; a successful load in the meantime makes it
    /// a no-op.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        while let Some(work) = self.scheduler.poll(now) {
            match work {
                DueWork::PeriodicReload => {
                    let _ = self.reload(now);
                }
                DueWork::RetryReload => {
                    if self.store.is_empty() {
                        logging::info(Subsystem::Grid, None, "retrying load of still-empty grid");
                        let _ = self.reload(now);
                    }
                }
            }
        }
    }

    // --- Selection ----------------------------------------------------------

    /// Selects a grid cell and returns the enrichment request to issue.
    pub fn select_grid_point(&mut self, point: GridPoint) -> RequestKey {
        let key = self.reconciler.select_grid_point(point, self.selector.get());
        logging::debug(
            Subsystem::Detail,
            Some(&logging::point_id(key.lat, key.lon)),
            "grid cell selected, enrichment fetch issued",
        );
        key
    }

    /// Selects an arbitrary coordinate (map click outside the grid).
    pub fn select_custom(&mut self, lat: f64, lon: f64, name: String) -> RequestKey {
        self.reconciler.select_custom(lat, lon, name, self.selector.get())
    }

    /// Free-text place search bounded to the region viewbox; the first hit
    /// becomes a custom selection with its enrichment fetch issued.
    pub fn search_and_select(&mut self, query: &str) -> Result<RequestKey, EngineError> {
        self.reconciler.clear();
        let hits = self.places.search(query, SEARCH_VIEWBOX).map_err(|err| {
            logging::log_backend_failure(Subsystem::Places, None, "place search", &err);
            err
        })?;
        let Some(hit) = hits.into_iter().next() else {
            return Err(EngineError::NoPlaceFound(query.to_string()));
        };
        logging::info(
            Subsystem::Places,
            Some(&logging::point_id(hit.lat, hit.lon)),
            &format!("search '{}' resolved to {}", query, hit.display_name),
        );
        Ok(self.select_custom(hit.lat, hit.lon, hit.display_name))
    }

    pub fn clear_selection(&mut self) {
        self.reconciler.clear();
    }

    /// Performs the enrichment fetch for `key` and merges the completion.
    /// Returns `true` if the result was applied to the live selection.
    pub fn complete_detail(&mut self, key: &RequestKey) -> bool {
        let result = self.backend.fetch_detail(key).map_err(|err| {
            logging::log_backend_failure(
                Subsystem::Detail,
                Some(&logging::point_id(key.lat, key.lon)),
                "detail fetch",
                &err,
            );
            err
        });
        self.deliver_detail(key, result)
    }

    /// Feeds an already-completed enrichment result into the reconciler.
    /// Event-driven callers use this to deliver completions in whatever
    /// order they actually arrived; superseded results are discarded by the
    /// request-key guard.
    pub fn deliver_detail(&mut self, key: &RequestKey, result: Result<PointDetail, EngineError>) -> bool {
        let applied = self.reconciler.apply_detail(
            key,
            result.map_err(|e| e.to_string()),
            self.selector.get(),
        );
        if !applied {
            logging::debug(
                Subsystem::Detail,
                Some(&logging::point_id(key.lat, key.lon)),
                "stale enrichment completion discarded",
            );
        }
        applied
    }

    // --- Model switching ----------------------------------------------------

    /// Switches the active model: persists the choice, restarts the periodic
    /// cycle with an immediate reload, and — if a selection with foreign
    /// enrichment exists — returns the background re-fetch to issue.
    pub fn change_model(&mut self, model: PredictionModel, now: DateTime<Utc>) -> Option<RequestKey> {
        if model == self.selector.get() {
            return None;
        }
        logging::info(
            Subsystem::System,
            None,
            &format!("active model switched from {} to {}", self.selector.get(), model),
        );
        self.selector.set(model);
        self.scheduler.restart(now);
        self.reconciler.on_model_change(model)
    }

    // --- Read surface -------------------------------------------------------

    pub fn clean_grid(&self) -> &[GridPoint] {
        self.store.clean_grid()
    }

    pub fn sorted_by_risk(&self) -> &[GridPoint] {
        self.store.sorted_by_risk()
    }

    pub fn risk_counts(&self) -> RiskCounts {
        aggregate::aggregate(self.store.clean_grid())
    }

    pub fn filtered(&self, mode: RiskFilter) -> Vec<&GridPoint> {
        aggregate::filter_by(self.store.clean_grid(), mode)
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.reconciler.selection()
    }

    /// Display name of the selected point: the server name when usable,
    /// otherwise the deterministic band fallback.
    pub fn selection_display_name(&self) -> Option<String> {
        self.reconciler.selection().map(|sel| naming::resolve_name(&sel.point))
    }

    pub fn selection_state(&self) -> SelectionState {
        self.reconciler.state(self.selector.get())
    }

    pub fn selection_is_stale(&self) -> bool {
        self.reconciler.is_stale(self.selector.get())
    }

    pub fn status(&self) -> &Status {
        self.store.status()
    }

    pub fn active_model(&self) -> PredictionModel {
        self.selector.get()
    }
}
