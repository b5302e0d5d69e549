/// HTTP collaborators for the dashboard engine.
///
/// Submodules:
/// - `api` — the prediction backend (grid snapshots, regeneration trigger,
///   per-point detail).
/// - `places` — third-party place search bounded to the region viewbox.

pub mod api;
pub mod places;
