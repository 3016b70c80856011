//! Request and result records exchanged with the host.
//!
//! Field names are the wire contract; every type here is a per-request value
//! object and is never mutated by the core once constructed.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Category tag of a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopKind {
    Start,
    Donor,
    Ngo,
    Warehouse,
    VolunteerHome,
}

/// One location to visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub location_type: StopKind,
    /// Demand / load weight in kilograms.
    #[serde(default)]
    pub capacity: Option<f64>,
    /// 1 (low) to 5 (high).
    #[serde(default = "default_priority")]
    pub priority: u8,
    /// Advisory arrival window start, `HH:MM`. Not enforced by the solver.
    #[serde(default)]
    pub time_window_start: Option<String>,
    #[serde(default)]
    pub time_window_end: Option<String>,
}

fn default_priority() -> u8 {
    1
}

impl Stop {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        location_type: StopKind,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            latitude,
            longitude,
            location_type,
            capacity: None,
            priority: default_priority(),
            time_window_start: None,
            time_window_end: None,
        }
    }

    pub fn with_capacity(mut self, kg: f64) -> Self {
        self.capacity = Some(kg);
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// What the route solver minimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    #[default]
    Time,
    Distance,
    Cost,
    /// Distance blended with how early high-priority stops are reached.
    Balanced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteOptimizationRequest {
    #[serde(default)]
    pub volunteer_id: Option<String>,
    pub start: Stop,
    pub stops: Vec<Stop>,
    #[serde(default = "default_max_route_time_hours")]
    pub max_route_time_hours: f64,
    #[serde(default = "default_vehicle_capacity")]
    pub vehicle_capacity: f64,
    #[serde(default)]
    pub optimization_type: Objective,
}

fn default_max_route_time_hours() -> f64 {
    8.0
}

fn default_vehicle_capacity() -> f64 {
    1000.0
}

impl RouteOptimizationRequest {
    pub fn new(start: Stop, stops: Vec<Stop>) -> Self {
        Self {
            volunteer_id: None,
            start,
            stops,
            max_route_time_hours: default_max_route_time_hours(),
            vehicle_capacity: default_vehicle_capacity(),
            optimization_type: Objective::default(),
        }
    }
}

/// Which strategy produced a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverStrategy {
    /// Capacity-constrained construction plus local search.
    LocalSearch,
    /// Greedy nearest neighbor; capacity is not checked.
    NearestNeighborFallback,
}

impl SolverStrategy {
    pub fn is_degraded(&self) -> bool {
        matches!(self, SolverStrategy::NearestNeighborFallback)
    }
}

/// One entry of a timed itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStop {
    pub sequence: usize,
    pub location_id: String,
    pub location_name: String,
    pub location_type: StopKind,
    pub latitude: f64,
    pub longitude: f64,
    pub arrival_time: String,
    pub priority: u8,
    pub capacity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeRoute {
    pub name: String,
    pub description: String,
    pub route: Vec<RouteStop>,
    pub total_distance_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteOptimizationResult {
    pub optimized_route: Vec<RouteStop>,
    pub total_distance_km: f64,
    pub total_time_hours: f64,
    pub total_cost: f64,
    pub route_efficiency: f64,
    pub recommendations: Vec<String>,
    pub alternative_routes: Vec<AlternativeRoute>,
    pub solver_strategy: SolverStrategy,
    /// Set when the fallback heuristic produced the route.
    pub degraded: bool,
}

/// Record handed to the persistence collaborator after an optimization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub volunteer_id: Option<String>,
    pub stop_ids: Vec<String>,
    pub total_distance_km: f64,
    pub total_time_hours: f64,
    pub solver_strategy: SolverStrategy,
}

/// Donation urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl Urgency {
    pub fn multiplier(&self) -> f64 {
        match self {
            Urgency::Low => 0.8,
            Urgency::Normal => 1.0,
            Urgency::High => 1.2,
            Urgency::Urgent => 1.5,
        }
    }
}

/// A provider as returned by the location directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(alias = "id")]
    pub uid: String,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub location: Option<Coordinate>,
    /// Intake capacity in kilograms.
    #[serde(default)]
    pub capacity: Option<f64>,
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default = "default_available")]
    pub available: bool,
}

impl Candidate {
    pub fn new(uid: impl Into<String>, name: impl Into<String>, role: impl Into<String>, location: Coordinate) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            role: role.into(),
            location: Some(location),
            capacity: None,
            points: 0,
            skills: Vec::new(),
            available: true,
        }
    }

    pub fn with_capacity(mut self, kg: f64) -> Self {
        self.capacity = Some(kg);
        self
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingRequest {
    pub requester_location: Coordinate,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub quantity: f64,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub food_type: Option<String>,
}

/// Coarse delivery estimate from distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryWindow {
    #[serde(rename = "15-30 minutes")]
    Within30Minutes,
    #[serde(rename = "30-60 minutes")]
    WithinHour,
    #[serde(rename = "1-2 hours")]
    WithinTwoHours,
    #[serde(rename = "2+ hours")]
    OverTwoHours,
}

impl DeliveryWindow {
    pub fn for_distance(distance_km: f64) -> Self {
        if distance_km < 5.0 {
            DeliveryWindow::Within30Minutes
        } else if distance_km < 15.0 {
            DeliveryWindow::WithinHour
        } else if distance_km < 30.0 {
            DeliveryWindow::WithinTwoHours
        } else {
            DeliveryWindow::OverTwoHours
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub id: String,
    pub name: String,
    pub location: Coordinate,
    pub distance_km: f64,
    pub match_score: f64,
    pub estimated_delivery_time: DeliveryWindow,
    pub capacity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingResult {
    pub matches: Vec<MatchCandidate>,
    pub optimal_match: Option<MatchCandidate>,
    /// Kilometres between matched NGOs, indexed in `matches` order.
    pub distance_matrix: Vec<Vec<f64>>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volunteer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl Volunteer {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Volunteer view of a directory user; `None` when the user has no location.
    pub fn from_candidate(candidate: Candidate) -> Option<Self> {
        let location = candidate.location?;
        Some(Self {
            id: candidate.uid,
            name: candidate.name,
            latitude: location.lat,
            longitude: location.lng,
            skills: candidate.skills,
            available: candidate.available,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub estimated_time: Option<String>,
}

impl Task {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub volunteer_id: String,
    pub volunteer_name: String,
    pub task_id: String,
    pub task_name: String,
    pub assignment_score: f64,
    pub estimated_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentResult {
    pub assignments: Vec<Assignment>,
    pub unassigned_tasks: Vec<Task>,
    pub total_efficiency: f64,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyUser {
    pub uid: String,
    pub name: String,
    pub role: String,
    pub location: Coordinate,
    pub distance_km: f64,
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyResult {
    pub center_location: Coordinate,
    pub radius_km: f64,
    pub user_type_filter: Option<String>,
    pub total_found: usize,
    pub users: Vec<NearbyUser>,
}

/// Rounds to two decimals for presentation.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
