//! Seams between the routing/matching core and the outside world.
//!
//! These are intentionally narrow. The core only needs a distance source, a
//! solver, a way to look up candidates and a fire-and-forget record writer.

use crate::error::{CollaboratorError, SolveError};
use crate::geo::Coordinate;
use crate::matrix::DistanceMatrix;
use crate::model::{Candidate, Objective, RouteRecord};
use crate::solver::Route;

/// Provides a distance matrix (kilometers) for a set of locations.
///
/// The matrix is indexed by the provided location order.
pub trait DistanceMatrixProvider {
    fn matrix_for(&self, locations: &[Coordinate]) -> DistanceMatrix;
}

/// Everything a solver sees of a routing request.
///
/// Index 0 of every slice is the start location.
#[derive(Debug, Clone, Copy)]
pub struct RoutingProblem<'a> {
    pub matrix: &'a DistanceMatrix,
    /// Load picked up at each index; the start carries zero.
    pub demands: &'a [f64],
    /// Priority (1-5) per index; only the balanced objective reads it.
    pub priorities: &'a [u8],
    pub capacity: f64,
    pub objective: Objective,
}

impl RoutingProblem<'_> {
    /// Number of stops excluding the start.
    pub fn stop_count(&self) -> usize {
        self.matrix.size().saturating_sub(1)
    }

    pub fn total_demand(&self) -> f64 {
        self.demands.iter().skip(1).sum()
    }
}

/// Single-vehicle route solver.
///
/// Implementations return a closed route over every stop, or an error when
/// they cannot produce a capacity-feasible one.
pub trait RouteSolver: Send + Sync {
    fn solve(&self, problem: &RoutingProblem<'_>) -> Result<Route, SolveError>;
}

/// Looks up providers (NGOs, volunteers, donors) by location or role.
pub trait LocationDirectory {
    fn candidates_near(
        &self,
        center: Coordinate,
        radius_km: f64,
    ) -> Result<Vec<Candidate>, CollaboratorError>;

    fn candidates_by_role(&self, role: &str) -> Result<Vec<Candidate>, CollaboratorError>;
}

/// Write path for route records. Nothing written here is read back.
pub trait RecordSink {
    fn record_route(&self, record: &RouteRecord) -> Result<(), CollaboratorError>;
}
