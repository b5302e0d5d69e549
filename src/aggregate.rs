/// Risk bucket statistics and filter views over the clean grid.
///
/// Both operations take the clean grid only — geometric exclusion always
/// applies before counting or filtering, so a mislabeled open-water cell can
/// never inflate the stats panel.

use crate::model::{GridPoint, RiskLevel};

/// Per-bucket counts for the stats panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RiskCounts {
    pub low: usize,
    pub moderate: usize,
    pub high: usize,
}

impl RiskCounts {
    pub fn total(&self) -> usize {
        self.low + self.moderate + self.high
    }
}

/// Which risk buckets a filtered view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskFilter {
    All,
    ModerateHigh,
    High,
}

/// Single-pass bucket classification. Labels are matched exactly; anything
/// that is not "High" or "Moderate" counts as Low, including unrecognized
/// labels (closed-world default-low policy).
pub fn aggregate(clean_grid: &[GridPoint]) -> RiskCounts {
    let mut counts = RiskCounts::default();
    for point in clean_grid {
        match RiskLevel::classify(&point.flood_risk) {
            RiskLevel::High => counts.high += 1,
            RiskLevel::Moderate => counts.moderate += 1,
            RiskLevel::Low => counts.low += 1,
        }
    }
    counts
}

/// Subsequence of the clean grid matching the filter mode, in clean-grid
/// order.
pub fn filter_by<'a>(clean_grid: &'a [GridPoint], mode: RiskFilter) -> Vec<&'a GridPoint> {
    clean_grid
        .iter()
        .filter(|p| match (mode, RiskLevel::classify(&p.flood_risk)) {
            (RiskFilter::All, _) => true,
            (RiskFilter::ModerateHigh, RiskLevel::Moderate | RiskLevel::High) => true,
            (RiskFilter::High, RiskLevel::High) => true,
            _ => false,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
