//! Timed itineraries and route metrics.
//!
//! Turns a solved [`Route`] into arrival times and aggregate distance,
//! duration, cost and efficiency figures. Pure computation.

use std::fmt;

use crate::config::{CostRates, PlannerConfig};
use crate::matrix::DistanceMatrix;
use crate::model::{RouteStop, Stop};
use crate::solver::Route;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Weight of the mean route priority in the efficiency score.
const PRIORITY_WEIGHT: f64 = 20.0;
/// Weight of the distance penalty term in the efficiency score.
const DISTANCE_WEIGHT: f64 = 0.4;
/// Weight of the duration penalty term in the efficiency score.
const DURATION_WEIGHT: f64 = 0.4;

/// Clock time of an arrival, in minutes after midnight of the departure day.
///
/// Arrivals past midnight keep counting hours (`25:10`) instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ArrivalTime {
    minutes: u32,
}

impl ArrivalTime {
    pub fn from_minutes(minutes: u32) -> Self {
        Self { minutes }
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn hour(&self) -> u32 {
        self.minutes / 60
    }

    pub fn minute(&self) -> u32 {
        self.minutes % 60
    }

    /// True when the arrival falls on a later calendar day than departure.
    pub fn past_midnight(&self) -> bool {
        self.minutes >= MINUTES_PER_DAY
    }
}

impl fmt::Display for ArrivalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// One visited index with its arrival.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledVisit {
    pub index: usize,
    pub arrival: ArrivalTime,
    /// Distance driven before reaching this visit.
    pub cumulative_km: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteMetrics {
    pub total_distance_km: f64,
    pub total_duration_hours: f64,
    pub total_cost: f64,
    /// 0-100.
    pub efficiency: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub visits: Vec<ScheduledVisit>,
    pub metrics: RouteMetrics,
}

impl Schedule {
    pub fn passes_midnight(&self) -> bool {
        self.visits.iter().any(|visit| visit.arrival.past_midnight())
    }
}

/// Converts routes into timed itineraries at a constant speed.
#[derive(Debug, Clone)]
pub struct Scheduler {
    pub speed_kmh: f64,
    pub day_start_minutes: u32,
    pub cost: CostRates,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::from_config(&PlannerConfig::default())
    }
}

impl Scheduler {
    pub fn from_config(config: &PlannerConfig) -> Self {
        Self {
            speed_kmh: config.speed_kmh,
            day_start_minutes: config.day_start_minutes,
            cost: config.cost,
        }
    }

    pub fn duration_hours(&self, distance_km: f64) -> f64 {
        distance_km / self.speed_kmh
    }

    /// Fuel plus driver time plus maintenance.
    pub fn cost(&self, distance_km: f64, duration_hours: f64) -> f64 {
        distance_km * self.cost.fuel_per_km
            + duration_hours * self.cost.hourly
            + distance_km * self.cost.maintenance_per_km
    }

    /// Weighted blend of mean priority and distance/duration penalties,
    /// clamped to [0, 100].
    pub fn efficiency(&self, mean_priority: f64, distance_km: f64, duration_hours: f64) -> f64 {
        let distance_term = (100.0 - 2.0 * distance_km).max(0.0);
        let duration_term = (100.0 - 10.0 * duration_hours).max(0.0);
        let score = mean_priority * PRIORITY_WEIGHT
            + distance_term * DISTANCE_WEIGHT
            + duration_term * DURATION_WEIGHT;
        score.clamp(0.0, 100.0)
    }

    pub fn arrival_after(&self, distance_km: f64) -> ArrivalTime {
        let minutes = (self.duration_hours(distance_km) * 60.0).round();
        let minutes = if minutes.is_finite() { minutes.max(0.0) as u32 } else { u32::MAX };
        ArrivalTime::from_minutes(self.day_start_minutes.saturating_add(minutes))
    }

    /// Arrival times and metrics for `route`.
    ///
    /// `priorities` is indexed like the matrix; the mean covers every entry of
    /// the route, both visits to the start included.
    pub fn schedule(&self, route: &Route, matrix: &DistanceMatrix, priorities: &[u8]) -> Schedule {
        let indices = route.indices();
        let mut visits = Vec::with_capacity(indices.len());
        let mut cumulative_km = 0.0;
        let mut previous: Option<usize> = None;

        for &index in indices {
            if let Some(from) = previous {
                cumulative_km += matrix.get(from, index);
            }
            visits.push(ScheduledVisit {
                index,
                arrival: self.arrival_after(cumulative_km),
                cumulative_km,
            });
            previous = Some(index);
        }

        let total_distance_km = cumulative_km;
        let total_duration_hours = self.duration_hours(total_distance_km);
        let mean_priority = if indices.is_empty() {
            0.0
        } else {
            indices
                .iter()
                .map(|&index| f64::from(priorities.get(index).copied().unwrap_or(1)))
                .sum::<f64>()
                / indices.len() as f64
        };

        Schedule {
            visits,
            metrics: RouteMetrics {
                total_distance_km,
                total_duration_hours,
                total_cost: self.cost(total_distance_km, total_duration_hours),
                efficiency: self.efficiency(mean_priority, total_distance_km, total_duration_hours),
            },
        }
    }
}

/// Resolves scheduled indices back to the caller's stops.
///
/// Index 0 is `start`, index `k` is `stops[k - 1]`.
pub fn itinerary(schedule: &Schedule, start: &Stop, stops: &[Stop]) -> Vec<RouteStop> {
    schedule
        .visits
        .iter()
        .enumerate()
        .filter_map(|(sequence, visit)| {
            let stop = if visit.index == 0 {
                start
            } else {
                stops.get(visit.index - 1)?
            };
            Some(RouteStop {
                sequence,
                location_id: stop.id.clone(),
                location_name: stop.name.clone(),
                location_type: stop.location_type,
                latitude: stop.latitude,
                longitude: stop.longitude,
                arrival_time: visit.arrival.to_string(),
                priority: stop.priority,
                capacity: stop.capacity,
            })
        })
        .collect()
}
