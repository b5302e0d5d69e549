/// Headless service loop: runs the dashboard engine against the real
/// prediction backend, reloading on the configured cadence and logging the
/// risk aggregates after each refresh.

use std::path::Path;
use std::time::Duration;

use chrono::Utc;

use floodgrid_service::config::{ModelSelector, ServiceConfig};
use floodgrid_service::engine::DashboardEngine;
use floodgrid_service::ingest::api::BackendClient;
use floodgrid_service::ingest::places::NominatimClient;
use floodgrid_service::logging::{self, LogLevel, Subsystem};
use floodgrid_service::naming;

fn main() {
    dotenv::dotenv().ok();

    let config = match ServiceConfig::load(Path::new("floodgrid.toml")) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    logging::init_logger(
        LogLevel::parse(&config.log_level).unwrap_or(LogLevel::Info),
        config.log_file.as_deref(),
    );

    let http = match reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            logging::error(Subsystem::System, None, &format!("HTTP client init failed: {}", e));
            std::process::exit(1);
        }
    };

    let selector = ModelSelector::load(config.model_state_path.clone());
    logging::info(
        Subsystem::System,
        None,
        &format!("starting against {} (model {})", config.base_url, selector.get()),
    );

    let mut engine = DashboardEngine::new(
        BackendClient::new(http.clone(), config.base_url.clone()),
        NominatimClient::new(http),
        selector,
        config.poll_interval_secs,
        config.retry_delay_secs,
        Utc::now(),
    );

    loop {
        let before = engine.status().last_updated;
        engine.tick(Utc::now());
        if engine.status().last_updated != before {
            let counts = engine.risk_counts();
            logging::info(
                Subsystem::System,
                None,
                &format!(
                    "risk aggregates: {} high / {} moderate / {} low ({} points)",
                    counts.high,
                    counts.moderate,
                    counts.low,
                    counts.total()
                ),
            );
            if let Some(worst) = engine.sorted_by_risk().first() {
                logging::info(
                    Subsystem::Grid,
                    Some(&logging::point_id(worst.lat, worst.lon)),
                    &format!(
                        "highest risk: {}: {} (p={:.2})",
                        naming::resolve_name(worst),
                        worst.flood_risk,
                        worst.flood_probability
                    ),
                );
            }
        }
        std::thread::sleep(Duration::from_secs(1));
    }
}
