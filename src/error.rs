//! Error taxonomy.
//!
//! Validation errors are client errors and are raised before any solving.
//! Solver errors never leave the planner; they select the fallback.
//! Collaborator errors propagate to the caller as service-unavailable.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("at least 2 stops required for route optimization, got {found}")]
    TooFewStops { found: usize },
    #[error("location {id} has a non-finite coordinate")]
    NonFiniteCoordinate { id: String },
    #[error("location {id} is out of range ({latitude}, {longitude})")]
    CoordinateOutOfRange { id: String, latitude: f64, longitude: f64 },
    #[error("location {id} has priority {priority}, expected 1..=5")]
    InvalidPriority { id: String, priority: u8 },
    #[error("location {id} has invalid demand {demand}")]
    InvalidDemand { id: String, demand: f64 },
    #[error("vehicle capacity must be a positive number, got {0}")]
    InvalidCapacity(f64),
    #[error("search radius must be a positive number, got {0}")]
    InvalidRadius(f64),
    #[error("quantity must be a non-negative number, got {0}")]
    InvalidQuantity(f64),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    #[error("total demand {total_demand} exceeds vehicle capacity {capacity}")]
    Infeasible { total_demand: f64, capacity: f64 },
    #[error("solver unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("request to collaborator failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("collaborator returned {status} for {url}")]
    Status { status: u16, url: String },
}

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("upstream service unavailable: {0}")]
    Unavailable(#[from] CollaboratorError),
}

impl PlannerError {
    /// True for errors caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, PlannerError::Validation(_))
    }
}
