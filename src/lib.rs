//! rescue-planner core
//!
//! Route planning and matching for food redistribution: Haversine distance
//! matrices, a capacitated single-vehicle route solver with a greedy
//! fallback, timed itineraries, donor/NGO and volunteer/task matching, and
//! route and geospatial analysis.

pub mod alternatives;
pub mod analysis;
pub mod config;
pub mod directory;
pub mod error;
pub mod geo;
pub mod matching;
pub mod matrix;
pub mod model;
pub mod planner;
pub mod schedule;
pub mod solver;
pub mod traits;

pub use config::{CostRates, DirectoryConfig, MatchingConfig, PlannerConfig};
pub use error::{CollaboratorError, PlannerError, SolveError, ValidationError};
pub use geo::Coordinate;
pub use matching::MatchingEngine;
pub use planner::RoutePlanner;
