//! Planner configuration.
//!
//! All values are read-only once handed to a planner or matcher.

/// Assumed constant travel speed for duration estimates.
pub const DEFAULT_SPEED_KMH: f64 = 30.0;

/// Daily route start, minutes from midnight (09:00).
pub const DEFAULT_DAY_START_MINUTES: u32 = 9 * 60;

/// Demand assumed for a stop that carries no weight.
pub const DEFAULT_STOP_DEMAND_KG: f64 = 100.0;

/// Monetary rates used to price a route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostRates {
    /// Currency per km.
    pub fuel_per_km: f64,
    /// Currency per hour of driving.
    pub hourly: f64,
    /// Currency per km.
    pub maintenance_per_km: f64,
}

impl Default for CostRates {
    fn default() -> Self {
        Self {
            fuel_per_km: 0.10,
            hourly: 15.0,
            maintenance_per_km: 0.05,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Average travel speed in km/h.
    pub speed_kmh: f64,
    /// Minutes from midnight at which every route departs.
    pub day_start_minutes: u32,
    pub cost: CostRates,
    pub default_stop_demand_kg: f64,
    /// Maximum improvement passes for the local search solver.
    pub local_search_iterations: usize,
    /// Stop count at which the distance matrix is built in parallel.
    pub parallel_matrix_threshold: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
            day_start_minutes: DEFAULT_DAY_START_MINUTES,
            cost: CostRates::default(),
            default_stop_demand_kg: DEFAULT_STOP_DEMAND_KG,
            local_search_iterations: 200,
            parallel_matrix_threshold: 64,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MatchingConfig {
    /// Radius used when fetching NGOs near a donor.
    pub search_radius_km: f64,
    /// Intake capacity assumed for an NGO that reports none.
    pub default_ngo_capacity_kg: f64,
    /// Candidate count at which scoring runs on the rayon pool.
    pub parallel_threshold: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            search_radius_km: 50.0,
            default_ngo_capacity_kg: 100.0,
            parallel_threshold: 256,
        }
    }
}

/// Location directory / record sink HTTP endpoint.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 10,
        }
    }
}
