//! Matching engine tests
//!
//! Donation ranking, directory-backed lookups and volunteer assignment over
//! Indore fixtures.

mod fixtures;

use fixtures::{INDORE_CENTER, NGOS, UJJAIN_SEVA_TRUST, ngo_candidates};
use rescue_planner::directory::InMemoryDirectory;
use rescue_planner::error::{CollaboratorError, PlannerError, ValidationError};
use rescue_planner::geo::{Coordinate, EARTH_RADIUS_KM};
use rescue_planner::model::{Candidate, DeliveryWindow, MatchingRequest, Task, Urgency, Volunteer};
use rescue_planner::traits::LocationDirectory;
use rescue_planner::MatchingEngine;

// ============================================================================
// Helpers
// ============================================================================

fn donation(candidates: Vec<Candidate>, quantity: f64, urgency: Urgency) -> MatchingRequest {
    MatchingRequest {
        requester_location: INDORE_CENTER.coordinate(),
        candidates,
        quantity,
        urgency,
        food_type: Some("vegetarian".to_string()),
    }
}

/// Point due north of `origin` at `km` along the meridian.
fn north_of(origin: Coordinate, km: f64) -> Coordinate {
    Coordinate::new(origin.lat + (km / EARTH_RADIUS_KM).to_degrees(), origin.lng)
}

fn volunteer(id: &str, name: &str, at: Coordinate, skills: &[&str]) -> Volunteer {
    Volunteer {
        id: id.to_string(),
        name: name.to_string(),
        latitude: at.lat,
        longitude: at.lng,
        skills: skills.iter().map(|s| s.to_string()).collect(),
        available: true,
    }
}

fn task(id: &str, at: Coordinate, skills: &[&str]) -> Task {
    Task {
        id: id.to_string(),
        name: format!("Pickup {}", id),
        latitude: at.lat,
        longitude: at.lng,
        required_skills: skills.iter().map(|s| s.to_string()).collect(),
        estimated_time: None,
    }
}

struct OfflineDirectory;

impl LocationDirectory for OfflineDirectory {
    fn candidates_near(&self, _center: Coordinate, _radius_km: f64) -> Result<Vec<Candidate>, CollaboratorError> {
        Err(CollaboratorError::Status {
            status: 503,
            url: "http://directory.invalid/users/nearby".to_string(),
        })
    }

    fn candidates_by_role(&self, _role: &str) -> Result<Vec<Candidate>, CollaboratorError> {
        Err(CollaboratorError::Status {
            status: 503,
            url: "http://directory.invalid/users".to_string(),
        })
    }
}

// ============================================================================
// Donation ranking
// ============================================================================

#[test]
fn test_urgent_donation_ten_km_away() {
    let origin = Coordinate::new(0.0, 0.0);
    let ngo = Candidate::new("ngo-1", "Food Bank", "ngo", north_of(origin, 10.0)).with_capacity(200.0);
    let request = MatchingRequest {
        requester_location: origin,
        candidates: vec![ngo],
        quantity: 100.0,
        urgency: Urgency::Urgent,
        food_type: None,
    };

    let result = MatchingEngine::default().rank_candidates(&request).expect("valid");
    let best = result.optimal_match.expect("one candidate");
    assert_eq!(best.match_score, 93.0);
    assert_eq!(best.distance_km, 10.0);
    assert_eq!(best.estimated_delivery_time, DeliveryWindow::WithinHour);
    assert!(
        result
            .recommendations
            .contains(&"URGENT: Contact NGO immediately".to_string())
    );
}

#[test]
fn test_no_candidates_is_not_an_error() {
    let result = MatchingEngine::default()
        .rank_candidates(&donation(Vec::new(), 40.0, Urgency::Normal))
        .expect("empty is fine");
    assert!(result.matches.is_empty());
    assert!(result.optimal_match.is_none());
}

#[test]
fn test_matches_are_ranked_best_first() {
    let result = MatchingEngine::default()
        .rank_candidates(&donation(ngo_candidates(Some(150.0)), 60.0, Urgency::High))
        .expect("valid");

    assert_eq!(result.matches.len(), NGOS.len());
    for pair in result.matches.windows(2) {
        assert!(pair[0].match_score >= pair[1].match_score);
    }
    for m in &result.matches {
        assert!((0.0..=100.0).contains(&m.match_score));
    }
    // The food bank sits on the donor.
    assert_eq!(result.optimal_match.map(|m| m.name), Some("Indore Food Bank".to_string()));
}

#[test]
fn test_equal_scores_keep_input_order() {
    let at = north_of(INDORE_CENTER.coordinate(), 3.0);
    let candidates = vec![
        Candidate::new("first", "Helping Hands", "ngo", at),
        Candidate::new("second", "Food Aid", "ngo", at),
    ];
    let result = MatchingEngine::default()
        .rank_candidates(&donation(candidates, 50.0, Urgency::Normal))
        .expect("valid");
    let ids: Vec<&str> = result.matches.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["first", "second"]);
}

#[test]
fn test_candidates_without_location_are_skipped() {
    let mut unlocated = Candidate::new("ghost", "Care & Share", "ngo", INDORE_CENTER.coordinate());
    unlocated.location = None;
    let mut candidates = ngo_candidates(None);
    candidates.push(unlocated);

    let result = MatchingEngine::default()
        .rank_candidates(&donation(candidates, 50.0, Urgency::Low))
        .expect("valid");
    assert_eq!(result.matches.len(), NGOS.len());
    assert!(result.matches.iter().all(|m| m.id != "ghost"));
}

#[test]
fn test_missing_capacity_defaults_to_hundred_kg() {
    let at = north_of(INDORE_CENTER.coordinate(), 5.0);
    let with_default = Candidate::new("a", "Food for All", "ngo", at);
    let explicit = Candidate::new("b", "Hunger Relief", "ngo", at).with_capacity(100.0);
    let result = MatchingEngine::default()
        .rank_candidates(&donation(vec![with_default, explicit], 40.0, Urgency::Normal))
        .expect("valid");
    assert_eq!(result.matches[0].match_score, result.matches[1].match_score);
    assert_eq!(result.matches[0].capacity, None);
}

#[test]
fn test_large_candidate_set_matches_sequential_ranking() {
    let center = INDORE_CENTER.coordinate();
    let candidates: Vec<Candidate> = (0..600)
        .map(|i| {
            let at = Coordinate::new(center.lat + (i % 37) as f64 * 0.003, center.lng - (i % 23) as f64 * 0.004);
            Candidate::new(format!("ngo-{}", i), format!("NGO {}", i), "ngo", at).with_capacity(50.0 + (i % 7) as f64 * 25.0)
        })
        .collect();
    let request = donation(candidates, 80.0, Urgency::High);

    let parallel = MatchingEngine::default().rank_candidates(&request).expect("valid");
    let sequential = MatchingEngine::new(rescue_planner::MatchingConfig {
        parallel_threshold: usize::MAX,
        ..Default::default()
    })
    .rank_candidates(&request)
    .expect("valid");

    assert_eq!(parallel, sequential);
}

#[test]
fn test_invalid_quantity_is_rejected() {
    let err = MatchingEngine::default()
        .rank_candidates(&donation(Vec::new(), f64::NAN, Urgency::Normal))
        .expect_err("NaN quantity");
    assert!(matches!(err, ValidationError::InvalidQuantity(_)));
}

// ============================================================================
// Directory-backed lookups
// ============================================================================

fn indore_directory() -> InMemoryDirectory {
    let mut directory = InMemoryDirectory::new(ngo_candidates(Some(200.0)));
    directory.push(Candidate::new(
        "ngo_ujjain_001",
        UJJAIN_SEVA_TRUST.name,
        "ngo",
        UJJAIN_SEVA_TRUST.coordinate(),
    ));
    directory.push(Candidate::new(
        "volunteer_indore_001",
        "Rajesh Kumar",
        "volunteer",
        north_of(INDORE_CENTER.coordinate(), 1.0),
    ));
    directory
}

#[test]
fn test_donation_matching_uses_ngos_within_radius() {
    let result = MatchingEngine::default()
        .match_donation(&indore_directory(), &donation(Vec::new(), 100.0, Urgency::Normal))
        .expect("directory available");

    assert_eq!(result.matches.len(), NGOS.len());
    assert!(result.matches.iter().all(|m| m.id.starts_with("ngo_indore")));
}

#[test]
fn test_directory_outage_is_unavailable() {
    let err = MatchingEngine::default()
        .match_donation(&OfflineDirectory, &donation(Vec::new(), 100.0, Urgency::Normal))
        .expect_err("directory offline");
    assert!(matches!(err, PlannerError::Unavailable(_)));
    assert!(!err.is_client_error());
}

#[test]
fn test_nearby_sorted_and_filtered() {
    let engine = MatchingEngine::default();
    let center = INDORE_CENTER.coordinate();

    let everyone = engine
        .find_nearby(&indore_directory(), center, 25.0, None)
        .expect("directory available");
    assert_eq!(everyone.total_found, NGOS.len() + 1);
    for pair in everyone.users.windows(2) {
        assert!(pair[0].distance_km <= pair[1].distance_km);
    }
    assert!(everyone.users.iter().all(|u| u.distance_km <= 25.0));

    let volunteers = engine
        .find_nearby(&indore_directory(), center, 25.0, Some("volunteer"))
        .expect("directory available");
    assert_eq!(volunteers.total_found, 1);
    assert_eq!(volunteers.user_type_filter.as_deref(), Some("volunteer"));
    assert_eq!(volunteers.users[0].name, "Rajesh Kumar");
}

#[test]
fn test_nearby_rejects_bad_radius() {
    let err = MatchingEngine::default()
        .find_nearby(&indore_directory(), INDORE_CENTER.coordinate(), 0.0, None)
        .expect_err("zero radius");
    assert!(err.is_client_error());
    assert!(matches!(err, PlannerError::Validation(ValidationError::InvalidRadius(_))));
}

// ============================================================================
// Volunteer assignment
// ============================================================================

#[test]
fn test_assignment_prefers_skills_and_proximity() {
    let center = INDORE_CENTER.coordinate();
    let volunteers = vec![
        volunteer("v1", "Priya Sharma", center, &["driving"]),
        volunteer("v2", "Amit Patel", north_of(center, 8.0), &["cooking"]),
    ];
    let tasks = vec![
        task("t1", north_of(center, 8.0), &["cooking"]),
        task("t2", center, &["driving"]),
    ];

    let result = MatchingEngine::default()
        .assign_volunteers(&volunteers, &tasks)
        .expect("valid coordinates");

    let pairs: Vec<(&str, &str)> = result
        .assignments
        .iter()
        .map(|a| (a.volunteer_id.as_str(), a.task_id.as_str()))
        .collect();
    assert_eq!(pairs, vec![("v1", "t2"), ("v2", "t1")]);
    assert!(result.unassigned_tasks.is_empty());
    assert_eq!(result.total_efficiency, 100.0);
    assert_eq!(result.recommendations, vec!["Excellent volunteer assignments!".to_string()]);
}

#[test]
fn test_unavailable_volunteer_still_assigned_greedily() {
    let center = INDORE_CENTER.coordinate();
    let mut busy = volunteer("v1", "Sneha Singh", center, &[]);
    busy.available = false;
    let tasks = vec![task("t1", center, &[])];

    let result = MatchingEngine::default()
        .assign_volunteers(&[busy], &tasks)
        .expect("valid coordinates");
    assert_eq!(result.assignments.len(), 1);
    assert_eq!(result.assignments[0].assignment_score, 70.0);
    assert_eq!(result.recommendations, vec!["Good volunteer assignments".to_string()]);
}

#[test]
fn test_directory_volunteers_are_assigned() {
    let center = INDORE_CENTER.coordinate();
    let mut directory = indore_directory();
    directory.push(
        Candidate::new("volunteer_indore_002", "Priya Sharma", "volunteer", center).with_skills(["driving"]),
    );
    let mut unlocated = Candidate::new("volunteer_indore_003", "Amit Patel", "volunteer", center);
    unlocated.location = None;
    directory.push(unlocated);

    let tasks = vec![
        task("t1", center, &["driving"]),
        task("t2", north_of(center, 1.0), &[]),
    ];
    let result = MatchingEngine::default()
        .assign_from_directory(&directory, &tasks)
        .expect("directory available");

    let pairs: Vec<(&str, &str)> = result
        .assignments
        .iter()
        .map(|a| (a.volunteer_id.as_str(), a.task_id.as_str()))
        .collect();
    assert_eq!(pairs, vec![("volunteer_indore_001", "t2"), ("volunteer_indore_002", "t1")]);
    assert!(result.unassigned_tasks.is_empty());
    assert_eq!(result.total_efficiency, 100.0);
}

#[test]
fn test_directory_assignment_outage_is_unavailable() {
    let tasks = vec![task("t1", INDORE_CENTER.coordinate(), &[])];
    let err = MatchingEngine::default()
        .assign_from_directory(&OfflineDirectory, &tasks)
        .expect_err("directory offline");
    assert!(matches!(err, PlannerError::Unavailable(CollaboratorError::Status { status: 503, .. })));
    assert!(!err.is_client_error());
}

#[test]
fn test_directory_assignment_rejects_bad_task() {
    let tasks = vec![task("t1", Coordinate::new(f64::NAN, 75.8553), &[])];
    let err = MatchingEngine::default()
        .assign_from_directory(&indore_directory(), &tasks)
        .expect_err("NaN task");
    assert!(err.is_client_error());
    assert!(matches!(
        err,
        PlannerError::Validation(ValidationError::NonFiniteCoordinate { ref id }) if id == "t1"
    ));
}

// ============================================================================
// Wire shape
// ============================================================================

#[test]
fn test_matching_request_from_json() {
    let json = serde_json::json!({
        "requester_location": {"lat": 22.7196, "lng": 75.8577},
        "candidates": [{"id": "ngo_indore_001", "name": "Indore Food Bank", "role": "ngo",
                        "location": {"lat": 22.72, "lng": 75.86}}],
        "quantity": 25.0,
        "urgency": "high"
    });
    let request: MatchingRequest = serde_json::from_value(json).expect("valid json");
    assert_eq!(request.urgency, Urgency::High);
    assert_eq!(request.candidates[0].uid, "ngo_indore_001");
    assert_eq!(request.candidates[0].capacity, None);
}

#[test]
fn test_unknown_urgency_is_rejected() {
    let json = serde_json::json!({
        "requester_location": {"lat": 22.7196, "lng": 75.8577},
        "quantity": 25.0,
        "urgency": "whenever"
    });
    assert!(serde_json::from_value::<MatchingRequest>(json).is_err());
}

#[test]
fn test_delivery_window_wire_names() {
    let value = serde_json::to_value(DeliveryWindow::for_distance(3.0)).expect("serializable");
    assert_eq!(value, "15-30 minutes");
}
