/// Prediction backend client.
///
/// Wraps the three backend endpoints behind the `GridBackend` trait:
///   GET  /grid/latest?model=<id>      — latest grid snapshot
///   POST /grid/refresh?model=<id>     — trigger regeneration
///   GET  /predict-location?lat=&lon=&model= — per-point detail
///
/// Coordinate leniency: the grid payload has been observed to carry lat/lon
/// as JSON numbers or as numeric strings, and occasionally to omit them.
/// Both are coerced here; anything non-coercible maps to NaN so the
/// geofence excludes the point instead of the whole snapshot failing.

use serde::Deserialize;
use serde_json::Value;

use crate::engine::{GridBackend, GridEnvelope};
use crate::model::{
    DailyForecast, Enrichment, EngineError, GridPoint, HorizonOutlook, HourlyForecast, PointDetail,
    PredictionModel,
};
use crate::selection::RequestKey;

// ============================================================================
// Wire structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct GridLatestWire {
    status: Option<String>,
    message: Option<String>,
    #[serde(default)]
    data: Vec<GridPointWire>,
    model_applied: Option<String>,
    generated_at_utc: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GridPointWire {
    #[serde(default)]
    lat: Value,
    #[serde(default)]
    lon: Value,
    #[serde(default)]
    location_name: String,
    #[serde(default)]
    flood_risk: String,
    #[serde(default)]
    flood_probability: f64,
    #[serde(default)]
    predicted_rainfall_mm: f64,
    #[serde(default)]
    recommended_action: String,
}

#[derive(Debug, Deserialize)]
struct DetailWire {
    location: Option<LocationWire>,
    prediction: PredictionWire,
    temp_c: Option<f64>,
    humidity: Option<f64>,
    wind_kph: Option<f64>,
    weather_summary: Option<String>,
    precipitation_prob: Option<f64>,
    #[serde(default)]
    forecast: ForecastWire,
}

#[derive(Debug, Deserialize)]
struct LocationWire {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PredictionWire {
    #[serde(default)]
    flood_risk: String,
    #[serde(default)]
    flood_probability: f64,
    #[serde(default)]
    predicted_rainfall_mm: f64,
    #[serde(default)]
    recommended_action: String,
    #[serde(default)]
    future_horizons: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize, Default)]
struct ForecastWire {
    #[serde(default)]
    hourly: Vec<HourlyWire>,
    #[serde(default)]
    daily: Vec<DailyWire>,
}

#[derive(Debug, Deserialize)]
struct HourlyWire {
    #[serde(default)]
    time: String,
    #[serde(default)]
    temp: f64,
    #[serde(default)]
    precip: f64,
    #[serde(default)]
    wind: f64,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct DailyWire {
    #[serde(default)]
    day: String,
    #[serde(default)]
    high: f64,
    #[serde(default)]
    low: f64,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct HorizonWire {
    #[serde(default)]
    time: String,
    #[serde(default)]
    temp: f64,
    #[serde(default)]
    rainfall_mm: f64,
    #[serde(default)]
    probability: f64,
    #[serde(default)]
    risk: String,
}

/// Error body shape used by the refresh endpoint: `detail` may be a bare
/// string or `{ "message": ... }`.
#[derive(Debug, Deserialize)]
struct ErrorBodyWire {
    detail: Option<Value>,
}

// ============================================================================
// Coercion helpers
// ============================================================================

/// Coerces a JSON value to a coordinate: numbers pass through, numeric
/// strings parse, everything else becomes NaN for the geofence to drop.
fn coerce_coord(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

fn to_grid_point(wire: GridPointWire) -> GridPoint {
    GridPoint {
        lat: coerce_coord(&wire.lat),
        lon: coerce_coord(&wire.lon),
        location_name: wire.location_name,
        flood_risk: wire.flood_risk,
        flood_probability: wire.flood_probability,
        predicted_rainfall_mm: wire.predicted_rainfall_mm,
        recommended_action: wire.recommended_action,
    }
}

/// Horizons arrive keyed by label; re-emit them in fixed 24h/48h/72h order
/// so downstream rendering and exports are deterministic.
fn to_horizons(map: &serde_json::Map<String, Value>) -> Vec<(String, HorizonOutlook)> {
    ["24h", "48h", "72h"]
        .iter()
        .filter_map(|label| {
            let wire: HorizonWire = serde_json::from_value(map.get(*label)?.clone()).ok()?;
            Some((
                label.to_string(),
                HorizonOutlook {
                    time: wire.time,
                    temp_c: wire.temp,
                    rainfall_mm: wire.rainfall_mm,
                    probability: wire.probability,
                    risk: wire.risk,
                },
            ))
        })
        .collect()
}

fn to_point_detail(wire: DetailWire) -> PointDetail {
    PointDetail {
        location_name: wire.location.and_then(|l| l.name),
        flood_risk: wire.prediction.flood_risk,
        flood_probability: wire.prediction.flood_probability,
        predicted_rainfall_mm: wire.prediction.predicted_rainfall_mm,
        recommended_action: wire.prediction.recommended_action,
        enrichment: Enrichment {
            temp_c: wire.temp_c,
            humidity: wire.humidity,
            wind_kph: wire.wind_kph,
            weather_summary: wire.weather_summary,
            precipitation_prob: wire.precipitation_prob,
            hourly: wire
                .forecast
                .hourly
                .into_iter()
                .map(|h| HourlyForecast {
                    time: h.time,
                    temp_c: h.temp,
                    precip_pct: h.precip,
                    wind_kph: h.wind,
                    description: h.description,
                })
                .collect(),
            daily: wire
                .forecast
                .daily
                .into_iter()
                .map(|d| DailyForecast {
                    day: d.day,
                    high_c: d.high,
                    low_c: d.low,
                    icon: d.icon,
                })
                .collect(),
            horizons: to_horizons(&wire.prediction.future_horizons),
        },
    }
}

// ============================================================================
// Client
// ============================================================================

pub struct BackendClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(client: reqwest::blocking::Client, base_url: impl Into<String>) -> BackendClient {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        BackendClient { client, base_url }
    }

    fn get(&self, path_and_query: &str) -> Result<reqwest::blocking::Response, EngineError> {
        self.client
            .get(format!("{}{}", self.base_url, path_and_query))
            .send()
            .map_err(|e| EngineError::Network(e.to_string()))
    }
}

impl GridBackend for BackendClient {
    fn fetch_latest(&self, model: PredictionModel) -> Result<GridEnvelope, EngineError> {
        let response = self.get(&format!("/grid/latest?model={}", model))?;
        let code = response.status().as_u16();
        if !response.status().is_success() {
            return Err(EngineError::Http(code));
        }
        let wire: GridLatestWire = response
            .json()
            .map_err(|e| EngineError::Contract(format!("grid payload: {}", e)))?;
        if wire.status.as_deref() != Some("success") {
            return Err(EngineError::Contract(
                wire.message
                    .unwrap_or_else(|| "grid API returned non-success status".to_string()),
            ));
        }
        Ok(GridEnvelope {
            points: wire.data.into_iter().map(to_grid_point).collect(),
            model_applied: wire.model_applied.unwrap_or_else(|| model.as_str().to_string()),
            generated_at_utc: wire.generated_at_utc.unwrap_or_default(),
        })
    }

    fn trigger_refresh(&self, model: PredictionModel) -> Result<(), EngineError> {
        let response = self
            .client
            .post(format!("{}/grid/refresh?model={}", self.base_url, model))
            .send()
            .map_err(|e| EngineError::Network(e.to_string()))?;
        let code = response.status().as_u16();
        if response.status().is_success() {
            return Ok(());
        }
        // Surface the structured detail message when the backend sent one.
        if let Ok(body) = response.json::<ErrorBodyWire>() {
            if let Some(detail) = body.detail {
                let message = match detail {
                    Value::String(s) => s,
                    Value::Object(map) => map
                        .get("message")
                        .and_then(|m| m.as_str())
                        .map(String::from)
                        .unwrap_or_else(|| format!("refresh failed (HTTP {})", code)),
                    _ => format!("refresh failed (HTTP {})", code),
                };
                return Err(EngineError::Contract(message));
            }
        }
        Err(EngineError::Http(code))
    }

    fn fetch_detail(&self, key: &RequestKey) -> Result<PointDetail, EngineError> {
        let response = self.get(&format!(
            "/predict-location?lat={}&lon={}&model={}",
            key.lat, key.lon, key.model
        ))?;
        let code = response.status().as_u16();
        if !response.status().is_success() {
            return Err(EngineError::Http(code));
        }
        let wire: DetailWire = response
            .json()
            .map_err(|e| EngineError::Contract(format!("detail payload: {}", e)))?;
        Ok(to_point_detail(wire))
    }
}

// ============================================================================
// Tests
// ============================================================================
