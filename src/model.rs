/// Core data types for the flood grid dashboard engine.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic beyond trivial classification helpers, no I/O, and no
/// external dependencies apart from chrono — only types.

use chrono::{DateTime, Utc};

// ---------------------------------------------------------------------------
// Grid points
// ---------------------------------------------------------------------------

/// One cell of the spatial prediction lattice with its risk assessment.
///
/// Produced by the remote prediction backend; immutable once received.
/// Identity for matching purposes is the (lat, lon) pair — the backend
/// assigns no persistent ids, and every refresh produces an entirely new
/// collection of points.
///
/// Coordinates may be non-finite (NaN) when the upstream payload carried a
/// missing or non-numeric value; such points are excluded by the geofence
/// rather than rejected at parse time, so one malformed point never blanks
/// the whole grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridPoint {
    pub lat: f64,
    pub lon: f64,
    /// Server-provided place name; may be empty or the "Unknown" placeholder.
    pub location_name: String,
    /// Risk label as received ("Low" / "Moderate" / "High"); kept as a string
    /// because unrecognized labels are legal and classify as Low downstream.
    pub flood_risk: String,
    /// Probability in [0, 1].
    pub flood_probability: f64,
    pub predicted_rainfall_mm: f64,
    pub recommended_action: String,
}

/// Risk bucket used by the aggregator and filter views.
///
/// Classification is closed-world: anything that is not exactly "High" or
/// "Moderate" counts as Low, including unrecognized labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn classify(label: &str) -> RiskLevel {
        match label {
            "High" => RiskLevel::High,
            "Moderate" => RiskLevel::Moderate,
            _ => RiskLevel::Low,
        }
    }
}

// ---------------------------------------------------------------------------
// Prediction models
// ---------------------------------------------------------------------------

/// The closed set of prediction models the backend can serve.
///
/// The active model is process-wide configuration: switching it invalidates
/// the freshness of any selection enrichment computed under the old model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionModel {
    /// Random Forest (balanced).
    Rf,
    /// XGBoost (aggressive).
    Xgb,
    /// Hybrid ensemble (accurate).
    Hybrid,
}

impl PredictionModel {
    pub const DEFAULT: PredictionModel = PredictionModel::Rf;

    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionModel::Rf => "rf",
            PredictionModel::Xgb => "xgb",
            PredictionModel::Hybrid => "hybrid",
        }
    }

    /// Parses the wire/stored form. Returns `None` for anything outside the
    /// closed set so callers can fall back to `DEFAULT` explicitly.
    pub fn parse(s: &str) -> Option<PredictionModel> {
        match s.trim() {
            "rf" => Some(PredictionModel::Rf),
            "xgb" => Some(PredictionModel::Xgb),
            "hybrid" => Some(PredictionModel::Hybrid),
            _ => None,
        }
    }
}

impl std::fmt::Display for PredictionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Enrichment (per-point detail)
// ---------------------------------------------------------------------------

/// One forecast entry from the hourly strip (3-hour steps, up to 72 h).
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyForecast {
    pub time: String,
    pub temp_c: f64,
    pub precip_pct: f64,
    pub wind_kph: f64,
    pub description: String,
}

/// One day of the daily forecast strip.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyForecast {
    pub day: String,
    pub high_c: f64,
    pub low_c: f64,
    pub icon: String,
}

/// Risk projection for one future horizon (24h / 48h / 72h).
#[derive(Debug, Clone, PartialEq)]
pub struct HorizonOutlook {
    pub time: String,
    pub temp_c: f64,
    pub rainfall_mm: f64,
    pub probability: f64,
    pub risk: String,
}

/// Weather and forecast fields merged into a selection from an on-demand
/// detail fetch. These survive grid refreshes (a refresh only overwrites the
/// prediction fields) and go stale when the active model changes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Enrichment {
    /// Rounded to whole degrees on merge.
    pub temp_c: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_kph: Option<f64>,
    pub weather_summary: Option<String>,
    pub precipitation_prob: Option<f64>,
    pub hourly: Vec<HourlyForecast>,
    pub daily: Vec<DailyForecast>,
    /// Keyed projections for "24h" / "48h" / "72h", in that order.
    pub horizons: Vec<(String, HorizonOutlook)>,
}

/// Everything an on-demand detail fetch returns for one coordinate: fresh
/// prediction fields plus the weather/forecast enrichment. Domain-level
/// counterpart of the `/predict-location` payload; the ingest layer maps the
/// wire shape into this.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointDetail {
    /// Reverse-geocoded name, if the weather provider knew one.
    pub location_name: Option<String>,
    pub flood_risk: String,
    pub flood_probability: f64,
    pub predicted_rainfall_mm: f64,
    pub recommended_action: String,
    pub enrichment: Enrichment,
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Outcome of the grid store's last refresh, surfaced to the presentation
/// layer. A failed load leaves the previous grid intact and records the
/// error here.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Status {
    pub loading: bool,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub active_model: Option<String>,
    /// Backend-reported generation timestamp, passed through verbatim.
    pub generated_at: Option<String>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when talking to the prediction backend or the
/// place-search service.
///
/// Geometry input failures are deliberately absent: a point with unusable
/// coordinates is silently excluded by the geofence, never an error. Stale
/// enrichment completions are likewise not errors — they are discarded at
/// merge time by request-key comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The request could not be sent or the connection failed.
    Network(String),
    /// Non-2xx HTTP response.
    Http(u16),
    /// The response body did not match the expected contract
    /// (e.g. missing `status: "success"` or undecodable JSON).
    Contract(String),
    /// The place search returned no hits inside the region viewbox.
    NoPlaceFound(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Network(msg) => write!(f, "Network failure: {}", msg),
            EngineError::Http(code) => write!(f, "HTTP error: {}", code),
            EngineError::Contract(msg) => write!(f, "Data contract failure: {}", msg),
            EngineError::NoPlaceFound(q) => write!(f, "No place found for query: {}", q),
        }
    }
}

impl std::error::Error for EngineError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
