//! Matching engine.
//!
//! Scores providers against a requester and ranks them: NGOs against a
//! donation, volunteers against delivery tasks. Scores are always in
//! [0, 100]; an empty candidate set is a normal, empty result.

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::MatchingConfig;
use crate::error::{PlannerError, ValidationError};
use crate::geo::Coordinate;
use crate::matrix::HaversineMatrix;
use crate::model::{
    Assignment, AssignmentResult, Candidate, DeliveryWindow, MatchCandidate, MatchingRequest, MatchingResult,
    NearbyResult, NearbyUser, Task, Urgency, Volunteer, round2,
};
use crate::traits::{DistanceMatrixProvider, LocationDirectory};

/// Role tag of NGO providers in the location directory.
pub const NGO_ROLE: &str = "ngo";
pub const VOLUNTEER_ROLE: &str = "volunteer";

const DONATION_DISTANCE_WEIGHT: f64 = 0.4;
const DONATION_CAPACITY_WEIGHT: f64 = 0.6;

const SKILL_WEIGHT: f64 = 0.4;
const AVAILABILITY_WEIGHT: f64 = 0.3;
const PROXIMITY_WEIGHT: f64 = 0.3;

const DEFAULT_TASK_TIME: &str = "2 hours";

/// Donation-to-NGO score.
///
/// `(distance_score * 0.4 + capacity_score * 0.6) * urgency`, clamped to
/// [0, 100], where closer and fuller-fitting NGOs score higher.
pub fn donation_match_score(distance_km: f64, quantity_kg: f64, capacity_kg: f64, urgency: Urgency) -> f64 {
    let distance_score = (100.0 - 2.0 * distance_km).max(0.0);
    let capacity_score = if capacity_kg > 0.0 {
        (100.0 * quantity_kg / capacity_kg).min(100.0)
    } else {
        100.0
    };
    let score = (distance_score * DONATION_DISTANCE_WEIGHT + capacity_score * DONATION_CAPACITY_WEIGHT)
        * urgency.multiplier();
    clamp_score(score)
}

/// Percentage of the task's required skills the volunteer has.
/// A task with no requirements is a full match.
pub fn skill_match(volunteer: &Volunteer, task: &Task) -> f64 {
    if task.required_skills.is_empty() {
        return 100.0;
    }
    let matched = task
        .required_skills
        .iter()
        .filter(|skill| volunteer.skills.contains(skill))
        .count();
    100.0 * matched as f64 / task.required_skills.len() as f64
}

pub fn availability_match(volunteer: &Volunteer) -> f64 {
    if volunteer.available { 100.0 } else { 0.0 }
}

/// Volunteer-to-task score: skills 0.4, availability 0.3, proximity 0.3.
pub fn volunteer_task_score(volunteer: &Volunteer, task: &Task) -> f64 {
    let distance_km = volunteer.coordinate().distance_km(&task.coordinate());
    let score = skill_match(volunteer, task) * SKILL_WEIGHT
        + availability_match(volunteer) * AVAILABILITY_WEIGHT
        + (100.0 - distance_km) * PROXIMITY_WEIGHT;
    clamp_score(score)
}

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() { 0.0 } else { score.clamp(0.0, 100.0) }
}

#[derive(Debug, Clone, Default)]
pub struct MatchingEngine {
    config: MatchingConfig,
}

impl MatchingEngine {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    /// Scores `request.candidates` against the donation and ranks them,
    /// best first. Candidates without a usable location are skipped.
    pub fn rank_candidates(&self, request: &MatchingRequest) -> Result<MatchingResult, ValidationError> {
        validate_location("requester", &request.requester_location)?;
        if !request.quantity.is_finite() || request.quantity < 0.0 {
            return Err(ValidationError::InvalidQuantity(request.quantity));
        }

        let score_one = |candidate: &Candidate| self.score_candidate(request, candidate);
        let scored: Vec<Option<MatchCandidate>> = if request.candidates.len() >= self.config.parallel_threshold {
            request.candidates.par_iter().map(score_one).collect()
        } else {
            request.candidates.iter().map(score_one).collect()
        };

        let mut matches: Vec<MatchCandidate> = scored.into_iter().flatten().collect();
        matches.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));

        let optimal_match = matches.first().cloned();
        let distance_matrix = self.match_distances(&matches);
        let recommendations = matching_recommendations(&matches, request.urgency);

        debug!(candidates = request.candidates.len(), matched = matches.len(), "candidates ranked");

        Ok(MatchingResult {
            matches,
            optimal_match,
            distance_matrix,
            recommendations,
        })
    }

    fn score_candidate(&self, request: &MatchingRequest, candidate: &Candidate) -> Option<MatchCandidate> {
        let location = candidate.location.filter(|loc| loc.is_finite() && loc.in_range())?;
        let distance_km = request.requester_location.distance_km(&location);
        let capacity = candidate.capacity.unwrap_or(self.config.default_ngo_capacity_kg);
        let score = donation_match_score(distance_km, request.quantity, capacity, request.urgency);

        Some(MatchCandidate {
            id: candidate.uid.clone(),
            name: candidate.name.clone(),
            location,
            distance_km: round2(distance_km),
            match_score: round2(score),
            estimated_delivery_time: DeliveryWindow::for_distance(distance_km),
            capacity: candidate.capacity,
        })
    }

    fn match_distances(&self, matches: &[MatchCandidate]) -> Vec<Vec<f64>> {
        let locations: Vec<Coordinate> = matches.iter().map(|m| m.location).collect();
        HaversineMatrix::new(self.config.parallel_threshold)
            .matrix_for(&locations)
            .to_rows()
            .into_iter()
            .map(|row| row.into_iter().map(round2).collect())
            .collect()
    }

    /// Fetches NGOs near the donor from `directory` and ranks them.
    ///
    /// Any candidates already on the request are replaced by the fetched set.
    pub fn match_donation<D>(&self, directory: &D, request: &MatchingRequest) -> Result<MatchingResult, PlannerError>
    where
        D: LocationDirectory + ?Sized,
    {
        validate_location("requester", &request.requester_location)?;
        let nearby = directory.candidates_near(request.requester_location, self.config.search_radius_km)?;
        let candidates: Vec<Candidate> = nearby.into_iter().filter(|c| c.role == NGO_ROLE).collect();

        let request = MatchingRequest {
            candidates,
            ..request.clone()
        };
        let result = self.rank_candidates(&request)?;

        info!(
            candidates = request.candidates.len(),
            best_score = result.optimal_match.as_ref().map(|m| m.match_score),
            "donation matching completed"
        );
        Ok(result)
    }

    /// Directory users within `radius_km` of `center`, nearest first.
    pub fn find_nearby<D>(
        &self,
        directory: &D,
        center: Coordinate,
        radius_km: f64,
        role: Option<&str>,
    ) -> Result<NearbyResult, PlannerError>
    where
        D: LocationDirectory + ?Sized,
    {
        validate_location("center", &center)?;
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(ValidationError::InvalidRadius(radius_km).into());
        }

        let fetched = directory.candidates_near(center, radius_km)?;
        let mut users: Vec<NearbyUser> = fetched
            .into_iter()
            .filter(|candidate| role.is_none_or(|role| candidate.role == role))
            .filter_map(|candidate| {
                let location = candidate.location?;
                let distance_km = center.distance_km(&location);
                (distance_km <= radius_km).then(|| NearbyUser {
                    uid: candidate.uid,
                    name: candidate.name,
                    role: candidate.role,
                    location,
                    distance_km: round2(distance_km),
                    points: candidate.points,
                })
            })
            .collect();
        users.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

        Ok(NearbyResult {
            center_location: center,
            radius_km,
            user_type_filter: role.map(str::to_string),
            total_found: users.len(),
            users,
        })
    }

    /// Greedy volunteer-to-task assignment.
    ///
    /// Volunteers are taken in input order; each gets the highest-scoring task
    /// not yet taken, with ties going to the earlier task. This approximates
    /// an optimal bipartite assignment and can miss it.
    ///
    /// Every volunteer and task must have a finite, in-range coordinate.
    pub fn assign_volunteers(
        &self,
        volunteers: &[Volunteer],
        tasks: &[Task],
    ) -> Result<AssignmentResult, ValidationError> {
        for volunteer in volunteers {
            validate_location(&volunteer.id, &volunteer.coordinate())?;
        }
        for task in tasks {
            validate_location(&task.id, &task.coordinate())?;
        }

        let scores: Vec<Vec<f64>> = volunteers
            .par_iter()
            .map(|volunteer| tasks.iter().map(|task| volunteer_task_score(volunteer, task)).collect::<Vec<f64>>())
            .collect();

        let mut taken = vec![false; tasks.len()];
        let mut assignments = Vec::new();

        for (volunteer, row) in volunteers.iter().zip(&scores) {
            let mut best: Option<(usize, f64)> = None;
            for (task_index, &score) in row.iter().enumerate() {
                if taken[task_index] {
                    continue;
                }
                match best {
                    Some((_, best_score)) if score <= best_score => {}
                    _ => best = Some((task_index, score)),
                }
            }

            if let Some((task_index, score)) = best {
                taken[task_index] = true;
                let task = &tasks[task_index];
                assignments.push(Assignment {
                    volunteer_id: volunteer.id.clone(),
                    volunteer_name: volunteer.name.clone(),
                    task_id: task.id.clone(),
                    task_name: task.name.clone(),
                    assignment_score: round2(score),
                    estimated_time: task
                        .estimated_time
                        .clone()
                        .unwrap_or_else(|| DEFAULT_TASK_TIME.to_string()),
                });
            }
        }

        let unassigned_tasks: Vec<Task> = tasks
            .iter()
            .zip(&taken)
            .filter(|(_, taken)| !**taken)
            .map(|(task, _)| task.clone())
            .collect();

        let total_efficiency = mean_score(&assignments);
        let recommendations = assignment_recommendations(total_efficiency, &assignments, &unassigned_tasks);

        info!(
            volunteers = volunteers.len(),
            tasks = tasks.len(),
            assigned = assignments.len(),
            "volunteer assignment completed"
        );

        Ok(AssignmentResult {
            assignments,
            unassigned_tasks,
            total_efficiency: round2(total_efficiency),
            recommendations,
        })
    }

    /// Assigns `tasks` to the volunteers listed in `directory`.
    ///
    /// Volunteers without a location are left out, as are those with a
    /// coordinate that would fail validation.
    pub fn assign_from_directory<D>(&self, directory: &D, tasks: &[Task]) -> Result<AssignmentResult, PlannerError>
    where
        D: LocationDirectory + ?Sized,
    {
        let fetched = directory.candidates_by_role(VOLUNTEER_ROLE)?;
        let listed = fetched.len();
        let volunteers: Vec<Volunteer> = fetched
            .into_iter()
            .filter_map(Volunteer::from_candidate)
            .filter(|volunteer| validate_location(&volunteer.id, &volunteer.coordinate()).is_ok())
            .collect();

        if volunteers.len() < listed {
            warn!(
                listed,
                usable = volunteers.len(),
                "skipped directory volunteers without a usable location"
            );
        }

        Ok(self.assign_volunteers(&volunteers, tasks)?)
    }
}

fn validate_location(id: &str, location: &Coordinate) -> Result<(), ValidationError> {
    if !location.is_finite() {
        return Err(ValidationError::NonFiniteCoordinate { id: id.to_string() });
    }
    if !location.in_range() {
        return Err(ValidationError::CoordinateOutOfRange {
            id: id.to_string(),
            latitude: location.lat,
            longitude: location.lng,
        });
    }
    Ok(())
}

fn mean_score(assignments: &[Assignment]) -> f64 {
    if assignments.is_empty() {
        return 0.0;
    }
    assignments.iter().map(|a| a.assignment_score).sum::<f64>() / assignments.len() as f64
}

pub fn matching_recommendations(matches: &[MatchCandidate], urgency: Urgency) -> Vec<String> {
    let mut recommendations = Vec::new();

    let Some(best) = matches.first() else {
        recommendations.push("No nearby NGOs found. Consider expanding search radius.".to_string());
        return recommendations;
    };

    if best.match_score > 80.0 {
        recommendations.push(format!("Excellent match found: {}", best.name));
        recommendations.push("Proceed with donation immediately".to_string());
    } else if best.match_score > 60.0 {
        recommendations.push(format!("Good match found: {}", best.name));
        recommendations.push("Consider this NGO for donation".to_string());
    } else {
        recommendations.push("Consider expanding search radius for better matches".to_string());
    }

    if best.distance_km > 20.0 {
        recommendations.push("Consider volunteer delivery for long distances".to_string());
    }

    if urgency == Urgency::Urgent {
        recommendations.push("URGENT: Contact NGO immediately".to_string());
        recommendations.push("Consider multiple NGOs for urgent requests".to_string());
    }

    recommendations
}

fn assignment_recommendations(mean: f64, assignments: &[Assignment], unassigned: &[Task]) -> Vec<String> {
    let mut recommendations = Vec::new();

    if !assignments.is_empty() {
        if mean > 80.0 {
            recommendations.push("Excellent volunteer assignments!".to_string());
        } else if mean > 60.0 {
            recommendations.push("Good volunteer assignments".to_string());
        } else {
            recommendations.push("Consider reassigning volunteers for better efficiency".to_string());
        }
    }

    if !unassigned.is_empty() {
        recommendations.push(format!("{} tasks remain unassigned", unassigned.len()));
        recommendations.push("Consider recruiting additional volunteers".to_string());
    }

    recommendations
}
