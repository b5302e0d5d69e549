/// Place search client (Nominatim / OpenStreetMap).
///
/// Free-text lookup bounded to the region viewbox so queries like "Kyrenia"
/// cannot resolve to namesakes elsewhere. Hit coordinates arrive as strings
/// and are parsed here; unparseable hits are dropped.

use serde::Deserialize;

use crate::engine::{PlaceHit, PlaceSearch};
use crate::model::EngineError;

const NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";

#[derive(Debug, Deserialize)]
struct NominatimHitWire {
    lat: String,
    lon: String,
    display_name: String,
}

pub struct NominatimClient {
    client: reqwest::blocking::Client,
}

impl NominatimClient {
    pub fn new(client: reqwest::blocking::Client) -> NominatimClient {
        NominatimClient { client }
    }
}

impl PlaceSearch for NominatimClient {
    fn search(&self, query: &str, viewbox: (f64, f64, f64, f64)) -> Result<Vec<PlaceHit>, EngineError> {
        let (lon_min, lat_max, lon_max, lat_min) = viewbox;
        let response = self
            .client
            .get(format!("{}/search", NOMINATIM_BASE_URL))
            .query(&[
                ("format", "json".to_string()),
                ("q", query.to_string()),
                ("bounded", "1".to_string()),
                ("viewbox", format!("{},{},{},{}", lon_min, lat_max, lon_max, lat_min)),
            ])
            .header("User-Agent", "floodgrid_service/0.1")
            .send()
            .map_err(|e| EngineError::Network(e.to_string()))?;
        let code = response.status().as_u16();
        if !response.status().is_success() {
            return Err(EngineError::Http(code));
        }
        let hits: Vec<NominatimHitWire> = response
            .json()
            .map_err(|e| EngineError::Contract(format!("place search payload: {}", e)))?;
        Ok(hits.into_iter().filter_map(to_place_hit).collect())
    }
}

fn to_place_hit(wire: NominatimHitWire) -> Option<PlaceHit> {
    Some(PlaceHit {
        lat: wire.lat.trim().parse().ok()?,
        lon: wire.lon.trim().parse().ok()?,
        display_name: wire.display_name,
    })
}

// ============================================================================
// Tests
// ============================================================================
