//! Route optimization entry point.
//!
//! Validation, distance matrix, solver (with a single fallback), schedule,
//! recommendations and comparison routes, in that order.

use tracing::{info, warn};

use crate::alternatives::alternative_routes;
use crate::config::PlannerConfig;
use crate::error::{PlannerError, ValidationError};
use crate::matrix::{DistanceMatrix, HaversineMatrix};
use crate::model::{
    RouteOptimizationRequest, RouteOptimizationResult, RouteRecord, RouteStop, SolverStrategy, Stop,
    round2,
};
use crate::schedule::{RouteMetrics, Scheduler, itinerary};
use crate::solver::{LocalSearchSolver, SolveOptions, solve_with_fallback};
use crate::traits::{DistanceMatrixProvider, RecordSink, RouteSolver, RoutingProblem};

/// Minimum number of stops (excluding the start) a request must carry.
pub const MIN_STOPS: usize = 2;

/// Priority at or above which a stop counts as high priority.
const HIGH_PRIORITY: u8 = 4;

/// Plans single-vehicle delivery routes.
#[derive(Debug, Clone)]
pub struct RoutePlanner<S = LocalSearchSolver, M = HaversineMatrix> {
    config: PlannerConfig,
    solver: S,
    matrix_provider: M,
    scheduler: Scheduler,
}

impl RoutePlanner {
    pub fn new(config: PlannerConfig) -> Self {
        let solver = LocalSearchSolver::new(SolveOptions {
            max_iterations: config.local_search_iterations,
            speed_kmh: config.speed_kmh,
            cost: config.cost,
        });
        let matrix_provider = HaversineMatrix::new(config.parallel_matrix_threshold);
        Self::with_parts(config, solver, matrix_provider)
    }
}

impl Default for RoutePlanner {
    fn default() -> Self {
        Self::new(PlannerConfig::default())
    }
}

impl<S, M> RoutePlanner<S, M>
where
    S: RouteSolver,
    M: DistanceMatrixProvider,
{
    pub fn with_parts(config: PlannerConfig, solver: S, matrix_provider: M) -> Self {
        let scheduler = Scheduler::from_config(&config);
        Self {
            config,
            solver,
            matrix_provider,
            scheduler,
        }
    }

    /// Start followed by every stop, in request order.
    pub fn matrix_for(&self, start: &Stop, stops: &[Stop]) -> DistanceMatrix {
        let locations: Vec<_> = std::iter::once(start)
            .chain(stops)
            .map(Stop::coordinate)
            .collect();
        self.matrix_provider.matrix_for(&locations)
    }

    /// Optimizes a request into a timed itinerary with metrics.
    ///
    /// Returns a validation error for malformed input. Solver failure is not
    /// an error: the greedy fallback runs and the result is flagged degraded.
    pub fn optimize(&self, request: &RouteOptimizationRequest) -> Result<RouteOptimizationResult, PlannerError> {
        validate_request(request)?;

        let matrix = self.matrix_for(&request.start, &request.stops);
        let demands = demands_for(&request.stops, self.config.default_stop_demand_kg);
        let priorities = priorities_for(&request.start, &request.stops);

        let problem = RoutingProblem {
            matrix: &matrix,
            demands: &demands,
            priorities: &priorities,
            capacity: request.vehicle_capacity,
            objective: request.optimization_type,
        };
        let (route, strategy) = solve_with_fallback(&self.solver, &problem);

        let schedule = self.scheduler.schedule(&route, &matrix, &priorities);
        let optimized_route = itinerary(&schedule, &request.start, &request.stops);

        let outcome = RouteOutcome {
            metrics: &schedule.metrics,
            route: &optimized_route,
            strategy,
            capacity_respected: route.respects_capacity(&demands, request.vehicle_capacity),
            max_route_time_hours: request.max_route_time_hours,
            passes_midnight: schedule.passes_midnight(),
        };
        let recommendations = route_recommendations(&outcome);

        let alternatives = alternative_routes(&request.start, &request.stops, &matrix, &priorities, &self.scheduler);

        info!(
            volunteer_id = request.volunteer_id.as_deref().unwrap_or("-"),
            stops = request.stops.len(),
            objective = ?request.optimization_type,
            strategy = ?strategy,
            distance_km = schedule.metrics.total_distance_km,
            "route optimization completed"
        );

        Ok(RouteOptimizationResult {
            optimized_route,
            total_distance_km: round2(schedule.metrics.total_distance_km),
            total_time_hours: round2(schedule.metrics.total_duration_hours),
            total_cost: round2(schedule.metrics.total_cost),
            route_efficiency: round2(schedule.metrics.efficiency),
            recommendations,
            alternative_routes: alternatives,
            solver_strategy: strategy,
            degraded: strategy.is_degraded(),
        })
    }

    /// Optimizes and hands a [`RouteRecord`] to `sink`.
    ///
    /// A failed write is logged and does not affect the returned result.
    pub fn optimize_and_record(
        &self,
        request: &RouteOptimizationRequest,
        sink: &dyn RecordSink,
    ) -> Result<RouteOptimizationResult, PlannerError> {
        let result = self.optimize(request)?;
        let record = RouteRecord {
            volunteer_id: request.volunteer_id.clone(),
            stop_ids: result.optimized_route.iter().map(|s| s.location_id.clone()).collect(),
            total_distance_km: result.total_distance_km,
            total_time_hours: result.total_time_hours,
            solver_strategy: result.solver_strategy,
        };
        if let Err(err) = sink.record_route(&record) {
            warn!(error = %err, "failed to persist route record");
        }
        Ok(result)
    }
}

/// Rejects requests the solver must never see.
pub fn validate_request(request: &RouteOptimizationRequest) -> Result<(), ValidationError> {
    if request.stops.len() < MIN_STOPS {
        return Err(ValidationError::TooFewStops {
            found: request.stops.len(),
        });
    }
    if !request.vehicle_capacity.is_finite() || request.vehicle_capacity <= 0.0 {
        return Err(ValidationError::InvalidCapacity(request.vehicle_capacity));
    }

    for stop in std::iter::once(&request.start).chain(&request.stops) {
        let coordinate = stop.coordinate();
        if !coordinate.is_finite() {
            return Err(ValidationError::NonFiniteCoordinate { id: stop.id.clone() });
        }
        if !coordinate.in_range() {
            return Err(ValidationError::CoordinateOutOfRange {
                id: stop.id.clone(),
                latitude: stop.latitude,
                longitude: stop.longitude,
            });
        }
        if !(1..=5).contains(&stop.priority) {
            return Err(ValidationError::InvalidPriority {
                id: stop.id.clone(),
                priority: stop.priority,
            });
        }
        if let Some(demand) = stop.capacity {
            if !demand.is_finite() || demand < 0.0 {
                return Err(ValidationError::InvalidDemand {
                    id: stop.id.clone(),
                    demand,
                });
            }
        }
    }

    Ok(())
}

/// Demand per matrix index. The start carries nothing; stops without a
/// weight get `default_kg`, while an explicit 0 kg stays 0.
pub fn demands_for(stops: &[Stop], default_kg: f64) -> Vec<f64> {
    std::iter::once(0.0)
        .chain(stops.iter().map(|stop| stop.capacity.unwrap_or(default_kg)))
        .collect()
}

pub fn priorities_for(start: &Stop, stops: &[Stop]) -> Vec<u8> {
    std::iter::once(start)
        .chain(stops)
        .map(|stop| stop.priority)
        .collect()
}

/// What recommendations are derived from.
#[derive(Debug, Clone, Copy)]
pub struct RouteOutcome<'a> {
    pub metrics: &'a RouteMetrics,
    pub route: &'a [RouteStop],
    pub strategy: SolverStrategy,
    pub capacity_respected: bool,
    pub max_route_time_hours: f64,
    pub passes_midnight: bool,
}

pub fn route_recommendations(outcome: &RouteOutcome<'_>) -> Vec<String> {
    let mut recommendations = Vec::new();
    let metrics = outcome.metrics;

    if metrics.efficiency > 80.0 {
        recommendations.push("Excellent route efficiency!".to_string());
    } else if metrics.efficiency > 60.0 {
        recommendations.push("Good route efficiency".to_string());
    } else {
        recommendations.push("Consider route optimization for better efficiency".to_string());
    }

    if metrics.total_distance_km > 50.0 {
        recommendations.push("Long route detected - consider splitting into multiple trips".to_string());
    }

    if metrics.total_duration_hours > 6.0 {
        recommendations.push("Long route time - ensure volunteer availability".to_string());
    }

    let high_priority = outcome
        .route
        .iter()
        .filter(|stop| stop.priority >= HIGH_PRIORITY)
        .count();
    if high_priority > 0 {
        recommendations.push(format!("Route includes {} high-priority locations", high_priority));
    }

    if outcome.strategy.is_degraded() {
        recommendations.push("Route built by the nearest-neighbor fallback; capacity was not enforced".to_string());
    }

    if !outcome.capacity_respected {
        recommendations.push("Total load exceeds vehicle capacity - split pickups across trips".to_string());
    }

    if outcome.max_route_time_hours.is_finite()
        && outcome.max_route_time_hours > 0.0
        && metrics.total_duration_hours > outcome.max_route_time_hours
    {
        recommendations.push(format!(
            "Route takes {:.1} hours, over the {:.1} hour limit",
            metrics.total_duration_hours, outcome.max_route_time_hours
        ));
    }

    if outcome.passes_midnight {
        recommendations.push("Route runs past midnight - arrival times continue past 24:00".to_string());
    }

    recommendations
}
