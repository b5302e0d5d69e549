/// Service configuration and the persisted model selector.
///
/// Configuration comes from a TOML file (`floodgrid.toml` by default) with
/// every field optional; the base URL can additionally be overridden through
/// the `FLOODGRID_BASE_URL` environment variable (loaded from `.env` by the
/// binary). The active prediction model persists across sessions in a small
/// state file, the headless analog of the browser's local storage.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::model::PredictionModel;

// ---------------------------------------------------------------------------
// Service configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Prediction backend base URL.
    pub base_url: String,
    /// Periodic grid reload interval, seconds.
    pub poll_interval_secs: u64,
    /// Delay before the one-shot retry after a failed load, seconds.
    pub retry_delay_secs: u64,
    /// Where the active model is persisted between sessions.
    pub model_state_path: PathBuf,
    /// Minimum log level ("debug" / "info" / "warn" / "error").
    pub log_level: String,
    /// Optional log file; console-only when absent.
    pub log_file: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> ServiceConfig {
        ServiceConfig {
            base_url: "http://localhost:8000".to_string(),
            poll_interval_secs: 300,
            retry_delay_secs: 3,
            model_state_path: PathBuf::from("selected_model"),
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl ServiceConfig {
    /// Loads configuration from a TOML file, falling back to defaults when
    /// the file is absent. A present-but-malformed file is an error — a typo
    /// should not silently run the service on defaults.
    pub fn load(path: &Path) -> Result<ServiceConfig, String> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(text) => toml::from_str::<ServiceConfig>(&text)
                .map_err(|e| format!("invalid config {}: {}", path.display(), e))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ServiceConfig::default(),
            Err(e) => return Err(format!("cannot read config {}: {}", path.display(), e)),
        };
        if let Ok(url) = std::env::var("FLOODGRID_BASE_URL") {
            if !url.is_empty() {
                config.base_url = url;
            }
        }
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Model selector
// ---------------------------------------------------------------------------

/// Process-wide active prediction model with file-backed persistence.
///
/// Reads the stored value once at startup; unknown or missing content falls
/// back to the default model explicitly. Writes are best-effort — a failed
/// write keeps the in-memory value and logs a warning, it never fails the
/// model switch itself.
#[derive(Debug)]
pub struct ModelSelector {
    path: PathBuf,
    current: PredictionModel,
}

impl ModelSelector {
    pub fn load(path: PathBuf) -> ModelSelector {
        let current = std::fs::read_to_string(&path)
            .ok()
            .and_then(|text| PredictionModel::parse(&text))
            .unwrap_or(PredictionModel::DEFAULT);
        ModelSelector { path, current }
    }

    /// In-memory selector for tests and embedded use; persists nowhere.
    pub fn ephemeral(model: PredictionModel) -> ModelSelector {
        ModelSelector { path: PathBuf::new(), current: model }
    }

    pub fn get(&self) -> PredictionModel {
        self.current
    }

    pub fn set(&mut self, model: PredictionModel) {
        self.current = model;
        if self.path.as_os_str().is_empty() {
            return;
        }
        if let Err(e) = std::fs::write(&self.path, model.as_str()) {
            crate::logging::warn(
                crate::logging::Subsystem::System,
                None,
                &format!("could not persist model selection to {}: {}", self.path.display(), e),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
