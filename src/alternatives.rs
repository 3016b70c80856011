//! Comparison routes.
//!
//! Simple orderings reported next to the solved route so a coordinator can
//! see what the solver bought them. None of these are checked against
//! vehicle capacity.

use crate::matrix::DistanceMatrix;
use crate::model::{AlternativeRoute, Stop, round2};
use crate::schedule::{Scheduler, itinerary};
use crate::solver::{Route, nearest_neighbor_order};

/// Stop indices (1-based) sorted by descending priority; ties keep input order.
pub fn priority_first_order(stops: &[Stop]) -> Vec<usize> {
    let mut order: Vec<usize> = (1..=stops.len()).collect();
    order.sort_by(|&a, &b| stops[b - 1].priority.cmp(&stops[a - 1].priority));
    order
}

/// Stop indices (1-based) sorted by ascending distance from the start.
pub fn distance_first_order(matrix: &DistanceMatrix) -> Vec<usize> {
    let mut order: Vec<usize> = (1..matrix.size()).collect();
    order.sort_by(|&a, &b| matrix.get(0, a).total_cmp(&matrix.get(0, b)));
    order
}

/// Builds the advisory alternatives for a request.
pub fn alternative_routes(
    start: &Stop,
    stops: &[Stop],
    matrix: &DistanceMatrix,
    priorities: &[u8],
    scheduler: &Scheduler,
) -> Vec<AlternativeRoute> {
    let candidates = [
        (
            "Priority-based Route",
            "Route optimized by location priority",
            priority_first_order(stops),
        ),
        (
            "Shortest Distance Route",
            "Stops visited in order of distance from the start",
            distance_first_order(matrix),
        ),
        (
            "Greedy Nearest Route",
            "Always drive to the closest remaining stop",
            nearest_neighbor_order(matrix),
        ),
    ];

    candidates
        .into_iter()
        .map(|(name, description, order)| {
            let route = Route::closed(order);
            let schedule = scheduler.schedule(&route, matrix, priorities);
            AlternativeRoute {
                name: name.to_string(),
                description: description.to_string(),
                route: itinerary(&schedule, start, stops),
                total_distance_km: round2(schedule.metrics.total_distance_km),
            }
        })
        .collect()
}
