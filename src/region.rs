/// Region registry for the North Cyprus flood dashboard.
///
/// Defines the authoritative landmass boundary polygon, the place-search
/// viewbox, and the named coordinate bands used for fallback naming.
/// This is the single source of truth for region geometry — all other
/// modules should reference it from here rather than hardcoding vertices.

// ---------------------------------------------------------------------------
// Boundary polygon
// ---------------------------------------------------------------------------

/// Approximate border of the North Cyprus landmass as an ordered
/// (lat, lon) ring. The last vertex implicitly connects to the first.
///
/// The ring is traced coast-first (west coast, Kyrenia coast, Karpaz
/// peninsula, Famagusta bay) and closed along the Green Line. It was tuned
/// against user feedback to shave the Kormakitis and Karpaz tips and to cut
/// Famagusta Bay inland, so that coastal grid cells sitting over open water
/// fall outside.
pub static REGION_BOUNDARY: &[(f64, f64)] = &[
    // West coast & Morphou Bay
    (35.08, 32.75), // Lefke inland
    (35.15, 32.85), // Morphou west coast
    (35.22, 32.94), // Morphou Bay deep
    (35.32, 32.93), // Morphou Bay north / Kormakitis west
    // Cape Kormakitis (shaved tip)
    (35.40, 32.95),
    (35.36, 33.10), // Kormakitis east
    // Kyrenia coast
    (35.34, 33.25), // Lapta / Alsancak
    (35.33, 33.35), // Kyrenia harbor
    (35.34, 33.55), // Catalkoy / Esentepe west
    // Esentepe & Kantara
    (35.38, 33.75), // Esentepe coast
    (35.42, 33.95), // Tatlisu
    (35.47, 34.08), // Kaplica / Kantara north
    // Karpaz peninsula - north side
    (35.54, 34.22), // Yeni Erenkoy
    (35.60, 34.38), // Dipkarpaz north
    (35.67, 34.54), // Zafer Burnu (tip north), retracted
    (35.69, 34.58), // the absolute tip, retracted west
    // Karpaz peninsula - south side
    (35.65, 34.58), // tip south, retracted west
    (35.58, 34.50), // Dipkarpaz south, shaved
    (35.52, 34.35), // Kaleburnu
    (35.45, 34.20), // Balalan coast
    (35.38, 34.10), // Bogaz north
    // Famagusta Bay (cut inland)
    (35.28, 33.97), // Iskele / Long Beach
    (35.20, 33.92), // Glapsides
    (35.12, 33.94), // Famagusta port
    // The Green Line (border)
    (35.09, 33.92), // Varosha south limit
    (35.10, 33.70), // Mesaoria border east
    (35.12, 33.50), // Nicosia north border
    (35.16, 33.35), // Nicosia west buffer
    (35.14, 33.15), // Morphou plain border
    (35.10, 32.90), // back to Lefke area
];

/// Viewbox for bounded place search, as (lon_min, lat_max, lon_max, lat_min)
/// in the order the search service expects.
pub const SEARCH_VIEWBOX: (f64, f64, f64, f64) = (32.2, 35.8, 34.9, 35.0);

// ---------------------------------------------------------------------------
// Naming bands
// ---------------------------------------------------------------------------

/// One longitude/latitude band with its region label.
///
/// `lat_above` splits a longitude band at a latitude line: `Some(true)`
/// matches strictly above it, `Some(false)` matches at or below, `None`
/// ignores latitude.
pub struct NamingBand {
    pub label: &'static str,
    pub lon_min: Option<f64>,
    pub lon_max: Option<f64>,
    pub lat_split: Option<f64>,
    pub lat_above: Option<bool>,
}

/// Fallback naming bands, west to east, coast before interior.
///
/// Order is significant: bands are tried first to last and the first match
/// wins. The set covers the whole region — every finite coordinate falls
/// into exactly one band given the longitude cutoffs at 33.0, 33.5 and
/// 33.95 (lower bound inclusive, upper bound exclusive).
pub static NAMING_BANDS: &[NamingBand] = &[
    NamingBand {
        label: "Lefke / Guzelyurt Region",
        lon_min: None,
        lon_max: Some(33.0),
        lat_split: None,
        lat_above: None,
    },
    NamingBand {
        label: "Kyrenia West",
        lon_min: Some(33.0),
        lon_max: Some(33.5),
        lat_split: Some(35.25),
        lat_above: Some(true),
    },
    NamingBand {
        label: "Nicosia / Guzelyurt",
        lon_min: Some(33.0),
        lon_max: Some(33.5),
        lat_split: Some(35.25),
        lat_above: Some(false),
    },
    NamingBand {
        label: "Kyrenia East / Esentepe",
        lon_min: Some(33.5),
        lon_max: Some(33.95),
        lat_split: Some(35.3),
        lat_above: Some(true),
    },
    NamingBand {
        label: "Mesarya / Nicosia East",
        lon_min: Some(33.5),
        lon_max: Some(33.95),
        lat_split: Some(35.3),
        lat_above: Some(false),
    },
    NamingBand {
        label: "Famagusta Region",
        lon_min: Some(33.95),
        lon_max: None,
        lat_split: Some(35.35),
        lat_above: Some(false),
    },
    NamingBand {
        label: "Iskele / Karpaz",
        lon_min: Some(33.95),
        lon_max: None,
        lat_split: Some(35.35),
        lat_above: Some(true),
    },
];

impl NamingBand {
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        if let Some(min) = self.lon_min {
            if lon < min {
                return false;
            }
        }
        if let Some(max) = self.lon_max {
            if lon >= max {
                return false;
            }
        }
        match (self.lat_split, self.lat_above) {
            (Some(split), Some(true)) => lat > split,
            (Some(split), Some(false)) => lat <= split,
            _ => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
