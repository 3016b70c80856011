//! Single-vehicle route solving.
//!
//! The primary solver builds a capacity-checked nearest-neighbor tour and
//! improves it with 2-opt and relocate moves under the requested objective.
//! The greedy fallback is plain nearest neighbor and never checks capacity.

use tracing::{debug, warn};

use crate::config::CostRates;
use crate::error::SolveError;
use crate::matrix::DistanceMatrix;
use crate::model::{Objective, SolverStrategy};
use crate::traits::{RouteSolver, RoutingProblem};

/// Distances closer than this are treated as equal.
pub const DISTANCE_TOLERANCE: f64 = 1e-9;

/// Share of the balanced objective given to travelled distance; the rest goes
/// to the priority-weighted mean arrival distance.
const BALANCED_DISTANCE_WEIGHT: f64 = 0.5;

/// A closed route over matrix indices, starting and ending at index 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    indices: Vec<usize>,
}

impl Route {
    /// Wraps a visiting order of stop indices with the start at both ends.
    pub fn closed(order: Vec<usize>) -> Self {
        let mut indices = Vec::with_capacity(order.len() + 2);
        indices.push(0);
        indices.extend(order);
        indices.push(0);
        Self { indices }
    }

    /// Full index sequence including both visits to the start.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Visiting order without the start.
    pub fn stops(&self) -> &[usize] {
        &self.indices[1..self.indices.len() - 1]
    }

    pub fn distance(&self, matrix: &DistanceMatrix) -> f64 {
        matrix.path_length(&self.indices)
    }

    /// True when every stop `1..=stop_count` appears exactly once.
    pub fn is_complete(&self, stop_count: usize) -> bool {
        let stops = self.stops();
        if stops.len() != stop_count {
            return false;
        }
        let mut seen = vec![false; stop_count + 1];
        for &stop in stops {
            if stop == 0 || stop > stop_count || seen[stop] {
                return false;
            }
            seen[stop] = true;
        }
        true
    }

    /// True when the cumulative load never exceeds `capacity` at any prefix.
    pub fn respects_capacity(&self, demands: &[f64], capacity: f64) -> bool {
        let mut load = 0.0;
        for &index in &self.indices {
            load += demands.get(index).copied().unwrap_or(0.0);
            if load > capacity + DISTANCE_TOLERANCE {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone)]
pub struct SolveOptions {
    /// Maximum improvement passes for local search.
    pub max_iterations: usize,
    /// Speed used by the time and cost objectives.
    pub speed_kmh: f64,
    /// Rates used by the cost objective.
    pub cost: CostRates,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            speed_kmh: crate::config::DEFAULT_SPEED_KMH,
            cost: CostRates::default(),
        }
    }
}

/// Capacity-constrained solver: nearest-neighbor construction followed by
/// 2-opt and relocate local search.
#[derive(Debug, Clone, Default)]
pub struct LocalSearchSolver {
    pub options: SolveOptions,
}

impl LocalSearchSolver {
    pub fn new(options: SolveOptions) -> Self {
        Self { options }
    }
}

impl RouteSolver for LocalSearchSolver {
    fn solve(&self, problem: &RoutingProblem<'_>) -> Result<Route, SolveError> {
        if problem.demands.len() != problem.matrix.size() {
            return Err(SolveError::Unavailable(format!(
                "{} demands for {} locations",
                problem.demands.len(),
                problem.matrix.size()
            )));
        }
        if problem.demands.iter().any(|d| !d.is_finite() || *d < 0.0) {
            return Err(SolveError::Unavailable("demands must be finite and non-negative".to_string()));
        }

        // Loads only accumulate, so every order is feasible once the total fits.
        let total_demand = problem.total_demand();
        if total_demand > problem.capacity + DISTANCE_TOLERANCE {
            return Err(SolveError::Infeasible {
                total_demand,
                capacity: problem.capacity,
            });
        }

        let mut order = nearest_neighbor_order(problem.matrix);
        if order.len() >= 2 {
            let passes = local_search(&mut order, problem, &self.options);
            debug!(stops = order.len(), passes, "local search finished");
        }

        let route = Route::closed(order);
        if !route.respects_capacity(problem.demands, problem.capacity) {
            return Err(SolveError::Infeasible {
                total_demand,
                capacity: problem.capacity,
            });
        }
        Ok(route)
    }
}

/// Greedy nearest-neighbor solver. Ignores capacity; always succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestNeighborSolver;

impl RouteSolver for NearestNeighborSolver {
    fn solve(&self, problem: &RoutingProblem<'_>) -> Result<Route, SolveError> {
        Ok(Route::closed(nearest_neighbor_order(problem.matrix)))
    }
}

/// Runs `primary`, dropping to the greedy fallback once if it fails.
pub fn solve_with_fallback(
    primary: &dyn RouteSolver,
    problem: &RoutingProblem<'_>,
) -> (Route, SolverStrategy) {
    match primary.solve(problem) {
        Ok(route) => (route, SolverStrategy::LocalSearch),
        Err(err) => {
            warn!(error = %err, stops = problem.stop_count(), "primary solver failed, using nearest-neighbor fallback");
            let route = Route::closed(nearest_neighbor_order(problem.matrix));
            (route, SolverStrategy::NearestNeighborFallback)
        }
    }
}

/// Visiting order from index 0, always moving to the nearest unvisited index.
///
/// Equidistant candidates (within [`DISTANCE_TOLERANCE`]) resolve to the
/// lowest index.
pub fn nearest_neighbor_order(matrix: &DistanceMatrix) -> Vec<usize> {
    let n = matrix.size();
    if n <= 1 {
        return Vec::new();
    }

    let mut visited = vec![false; n];
    visited[0] = true;
    let mut order = Vec::with_capacity(n - 1);
    let mut current = 0;

    for _ in 1..n {
        let mut best: Option<(usize, f64)> = None;
        for candidate in 1..n {
            if visited[candidate] {
                continue;
            }
            let distance = matrix.get(current, candidate);
            match best {
                None => best = Some((candidate, distance)),
                Some((_, best_distance)) if distance < best_distance - DISTANCE_TOLERANCE => {
                    best = Some((candidate, distance))
                }
                _ => {}
            }
        }

        let Some((next, _)) = best else { break };
        visited[next] = true;
        order.push(next);
        current = next;
    }

    order
}

/// Objective value of a closed route visiting `order`.
pub fn route_cost(order: &[usize], problem: &RoutingProblem<'_>, options: &SolveOptions) -> f64 {
    let matrix = problem.matrix;
    let mut travelled = 0.0;
    let mut weighted_arrival = 0.0;
    let mut priority_total = 0.0;
    let mut previous = 0;

    for &stop in order {
        travelled += matrix.get(previous, stop);
        let priority = f64::from(problem.priorities.get(stop).copied().unwrap_or(1).max(1));
        weighted_arrival += priority * travelled;
        priority_total += priority;
        previous = stop;
    }
    travelled += matrix.get(previous, 0);

    match problem.objective {
        Objective::Distance => travelled,
        Objective::Time => travelled / options.speed_kmh,
        Objective::Cost => {
            let hours = travelled / options.speed_kmh;
            travelled * (options.cost.fuel_per_km + options.cost.maintenance_per_km)
                + hours * options.cost.hourly
        }
        Objective::Balanced => {
            let mean_arrival = if priority_total > 0.0 {
                weighted_arrival / priority_total
            } else {
                0.0
            };
            BALANCED_DISTANCE_WEIGHT * travelled + (1.0 - BALANCED_DISTANCE_WEIGHT) * mean_arrival
        }
    }
}

// ============================================================================
// Local Search Operators
// ============================================================================

/// 2-opt: reverse a segment of the order. Applies the first improving move.
fn two_opt_improve(order: &mut [usize], cost: &mut f64, problem: &RoutingProblem<'_>, options: &SolveOptions) -> bool {
    let n = order.len();
    for i in 0..n - 1 {
        for j in i + 1..n {
            order[i..=j].reverse();
            let candidate = route_cost(order, problem, options);
            if candidate < *cost - DISTANCE_TOLERANCE {
                *cost = candidate;
                return true;
            }
            order[i..=j].reverse();
        }
    }
    false
}

/// Relocate: move one stop to another position. Applies the first improving move.
fn relocate_improve(order: &mut Vec<usize>, cost: &mut f64, problem: &RoutingProblem<'_>, options: &SolveOptions) -> bool {
    let n = order.len();
    for from in 0..n {
        for to in 0..n {
            if to == from {
                continue;
            }
            let stop = order.remove(from);
            order.insert(to, stop);
            let candidate = route_cost(order, problem, options);
            if candidate < *cost - DISTANCE_TOLERANCE {
                *cost = candidate;
                return true;
            }
            let stop = order.remove(to);
            order.insert(from, stop);
        }
    }
    false
}

/// Improve `order` until no move helps or the pass limit is hit.
/// Returns the number of passes run.
fn local_search(order: &mut Vec<usize>, problem: &RoutingProblem<'_>, options: &SolveOptions) -> usize {
    let mut cost = route_cost(order, problem, options);
    let mut passes = 0;

    while passes < options.max_iterations {
        passes += 1;
        let mut improved = two_opt_improve(order, &mut cost, problem, options);
        if relocate_improve(order, &mut cost, problem, options) {
            improved = true;
        }
        if !improved {
            break;
        }
    }

    passes
}
