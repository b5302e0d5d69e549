/// Flood grid dashboard engine for the North Cyprus region.
///
/// Core pipeline: the refresh scheduler replaces the raw prediction grid,
/// the geofence filters it down to the landmass, the grid store derives the
/// clean and risk-sorted views, and the selection reconciler keeps the
/// user's selected point coherent across refreshes and model switches.
/// The presentation layer (map, sidebar, stats panel) consumes the engine's
/// read surface and is external to this crate, as are the prediction models
/// themselves.

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod geofence;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod naming;
pub mod region;
pub mod scheduler;
pub mod selection;
pub mod store;
