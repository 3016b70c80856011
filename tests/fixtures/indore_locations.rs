//! Indore locations for realistic test fixtures.
//!
//! Approximate neighborhood coordinates inside the Indore bounding box
//! (22.58..22.90 N, 75.65..76.07 E). Names follow the platform's seed data.

use rescue_planner::geo::Coordinate;
use rescue_planner::model::{Candidate, Stop, StopKind};

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }

    pub fn stop(&self, id: &str, kind: StopKind) -> Stop {
        Stop::new(id, self.name, self.lat, self.lng, kind)
    }
}

pub const INDORE_CENTER: Location = Location::new("Rajwada", 22.7186, 75.8553);

// ============================================================================
// Depots / volunteer homes
// ============================================================================

pub const DEPOTS: &[Location] = &[
    Location::new("Palasia Square", 22.7244, 75.8839),
    Location::new("Bhawarkuan", 22.6936, 75.8680),
];

// ============================================================================
// Donors
// ============================================================================

pub const DONORS: &[Location] = &[
    Location::new("Indore Fresh Mart", 22.7533, 75.8937),
    Location::new("City Bakery", 22.7190, 75.8540),
    Location::new("Green Valley Restaurant", 22.7327, 75.9075),
    Location::new("Royal Kitchen", 22.6975, 75.8340),
    Location::new("Annapurna Food Services", 22.6995, 75.8330),
    Location::new("Spice Garden", 22.7590, 75.8980),
    Location::new("Maharaja Kitchen", 22.7218, 75.8011),
];

// ============================================================================
// NGOs
// ============================================================================

pub const NGOS: &[Location] = &[
    Location::new("Indore Food Bank", 22.7196, 75.8577),
    Location::new("Community Kitchen", 22.7180, 75.9050),
    Location::new("Hope Foundation", 22.6310, 75.8090),
    Location::new("Annapurna Seva", 22.7450, 75.8700),
];

/// Outside the 50 km donation search radius.
pub const UJJAIN_SEVA_TRUST: Location = Location::new("Ujjain Seva Trust", 23.1828, 75.7681);

// ============================================================================
// Builders
// ============================================================================

/// `count` donor stops drawn from [`DONORS`] in order.
pub fn donor_stops(count: usize) -> Vec<Stop> {
    DONORS
        .iter()
        .take(count)
        .enumerate()
        .map(|(i, loc)| loc.stop(&format!("donor_indore_{:03}", i + 1), StopKind::Donor))
        .collect()
}

/// NGO directory entries, each with the given intake capacity.
pub fn ngo_candidates(capacity_kg: Option<f64>) -> Vec<Candidate> {
    NGOS.iter()
        .enumerate()
        .map(|(i, loc)| {
            let candidate = Candidate::new(format!("ngo_indore_{:03}", i + 1), loc.name, "ngo", loc.coordinate());
            match capacity_kg {
                Some(kg) => candidate.with_capacity(kg),
                None => candidate,
            }
        })
        .collect()
}
