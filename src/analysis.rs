//! Route performance and geospatial analysis.
//!
//! Read-only reports over data the caller already has: the legs of a driven
//! route, or a set of typed points on the map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CostRates;
use crate::geo::Coordinate;
use crate::matrix::HaversineMatrix;
use crate::traits::DistanceMatrixProvider;

/// kg of CO2 emitted per km driven.
pub const CO2_KG_PER_KM: f64 = 0.12;
/// Litres of fuel burned per km driven.
pub const FUEL_LITRES_PER_KM: f64 = 0.08;
/// Points closer than this to a cluster seed join its cluster.
pub const CLUSTER_RADIUS_KM: f64 = 5.0;

/// One entry of a driven route. Missing fields count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    #[serde(default)]
    pub distance_to_next: f64,
    /// Hours spent at the location.
    #[serde(default)]
    pub time_at_location: f64,
    #[serde(default)]
    pub travel_time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    #[default]
    Efficiency,
    Cost,
    Time,
    Environmental,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationPotential {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SustainabilityRating {
    Excellent,
    Good,
    Fair,
}

impl SustainabilityRating {
    pub fn for_distance(distance_km: f64) -> Self {
        if distance_km < 20.0 {
            SustainabilityRating::Excellent
        } else if distance_km < 40.0 {
            SustainabilityRating::Good
        } else {
            SustainabilityRating::Fair
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyAnalysis {
    pub total_distance: f64,
    pub total_time: f64,
    pub efficiency_score: f64,
    pub optimization_potential: OptimizationPotential,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostAnalysis {
    pub fuel_cost: f64,
    pub time_cost: f64,
    pub total_cost: f64,
    pub cost_per_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeAnalysis {
    pub total_time: f64,
    pub travel_time: f64,
    pub service_time: f64,
    pub time_efficiency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalAnalysis {
    pub total_distance: f64,
    pub co2_emissions_kg: f64,
    pub environmental_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "analysis_type", rename_all = "lowercase")]
pub enum RouteAnalysis {
    Efficiency(EfficiencyAnalysis),
    Cost(CostAnalysis),
    Time(TimeAnalysis),
    Environmental(EnvironmentalAnalysis),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalImpact {
    pub co2_emissions_kg: f64,
    pub fuel_consumption_liters: f64,
    pub environmental_score: f64,
    pub sustainability_rating: SustainabilityRating,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteAnalysisReport {
    pub analysis_results: RouteAnalysis,
    pub improvements: Vec<String>,
    pub environmental_impact: EnvironmentalImpact,
}

struct LegTotals {
    distance: f64,
    time: f64,
    travel: f64,
}

fn totals(legs: &[RouteLeg]) -> LegTotals {
    legs.iter().fold(
        LegTotals {
            distance: 0.0,
            time: 0.0,
            travel: 0.0,
        },
        |acc, leg| LegTotals {
            distance: acc.distance + leg.distance_to_next,
            time: acc.time + leg.time_at_location,
            travel: acc.travel + leg.travel_time,
        },
    )
}

/// Analyzes `legs` for `kind` and suggests improvements.
pub fn analyze_route(legs: &[RouteLeg], kind: AnalysisKind, rates: &CostRates) -> RouteAnalysisReport {
    let totals = totals(legs);

    let analysis_results = match kind {
        AnalysisKind::Efficiency => RouteAnalysis::Efficiency(EfficiencyAnalysis {
            total_distance: totals.distance,
            total_time: totals.time,
            efficiency_score: (100.0 - (totals.distance * 0.5 + totals.time * 2.0)).max(0.0),
            optimization_potential: if totals.distance > 30.0 {
                OptimizationPotential::High
            } else {
                OptimizationPotential::Medium
            },
        }),
        AnalysisKind::Cost => {
            let fuel_cost = totals.distance * rates.fuel_per_km;
            let time_cost = totals.time * rates.hourly;
            let total_cost = fuel_cost + time_cost;
            RouteAnalysis::Cost(CostAnalysis {
                fuel_cost,
                time_cost,
                total_cost,
                cost_per_km: total_cost / totals.distance.max(1.0),
            })
        }
        AnalysisKind::Time => RouteAnalysis::Time(TimeAnalysis {
            total_time: totals.time,
            travel_time: totals.travel,
            service_time: totals.time - totals.travel,
            time_efficiency: (100.0 - totals.time * 5.0).max(0.0),
        }),
        AnalysisKind::Environmental => {
            let co2_emissions_kg = totals.distance * CO2_KG_PER_KM;
            RouteAnalysis::Environmental(EnvironmentalAnalysis {
                total_distance: totals.distance,
                co2_emissions_kg,
                environmental_score: (100.0 - co2_emissions_kg * 2.0).max(0.0),
            })
        }
    };

    debug!(legs = legs.len(), ?kind, "route analyzed");

    RouteAnalysisReport {
        improvements: route_improvements(&analysis_results),
        environmental_impact: environmental_impact(totals.distance),
        analysis_results,
    }
}

pub fn environmental_impact(total_distance_km: f64) -> EnvironmentalImpact {
    EnvironmentalImpact {
        co2_emissions_kg: total_distance_km * CO2_KG_PER_KM,
        fuel_consumption_liters: total_distance_km * FUEL_LITRES_PER_KM,
        environmental_score: (100.0 - total_distance_km * 0.5).max(0.0),
        sustainability_rating: SustainabilityRating::for_distance(total_distance_km),
    }
}

pub fn route_improvements(analysis: &RouteAnalysis) -> Vec<String> {
    let mut improvements = Vec::new();
    let mut suggest = |condition: bool, text: &str| {
        if condition {
            improvements.push(text.to_string());
        }
    };

    match analysis {
        RouteAnalysis::Efficiency(a) => {
            suggest(a.efficiency_score < 70.0, "Consider route optimization to improve efficiency");
            suggest(a.total_distance > 50.0, "Reduce total distance by clustering nearby locations");
        }
        RouteAnalysis::Cost(a) => {
            suggest(a.total_cost > 100.0, "Optimize route to reduce fuel and time costs");
            suggest(a.cost_per_km > 2.0, "Consider more efficient vehicle or route planning");
        }
        RouteAnalysis::Time(a) => {
            suggest(a.total_time > 8.0, "Split route into multiple trips to reduce time");
            suggest(a.time_efficiency < 60.0, "Optimize time allocation between locations");
        }
        RouteAnalysis::Environmental(a) => {
            suggest(a.co2_emissions_kg > 10.0, "Reduce CO2 emissions by optimizing route");
            suggest(a.environmental_score < 70.0, "Consider eco-friendly transportation options");
        }
    }

    improvements
}

// Geospatial analysis

/// A point on the map tagged with what lives there (`donor`, `ngo`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
    #[serde(rename = "type", default = "unknown_kind")]
    pub kind: String,
}

fn unknown_kind() -> String {
    "unknown".to_string()
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64, kind: impl Into<String>) -> Self {
        Self {
            lat,
            lng,
            kind: kind.into(),
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoAnalysisKind {
    #[default]
    Coverage,
    Clustering,
    Optimization,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageAnalysis {
    pub total_locations: usize,
    pub by_type: BTreeMap<String, usize>,
    /// Locations per 100.
    pub coverage_density: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringAnalysis {
    pub total_clusters: usize,
    pub cluster_sizes: Vec<usize>,
    pub largest_cluster: usize,
    pub clusters: Vec<Vec<GeoPoint>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationAnalysis {
    pub total_locations: usize,
    pub average_distance: f64,
    pub max_distance: f64,
    pub min_distance: f64,
    pub optimization_potential: OptimizationPotential,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "analysis_type", rename_all = "lowercase")]
pub enum GeoAnalysis {
    Coverage(CoverageAnalysis),
    Clustering(ClusteringAnalysis),
    Optimization(OptimizationAnalysis),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoAnalysisReport {
    pub analysis_results: GeoAnalysis,
    pub recommendations: Vec<String>,
}

pub fn analyze_geo(points: &[GeoPoint], kind: GeoAnalysisKind) -> GeoAnalysisReport {
    let analysis_results = match kind {
        GeoAnalysisKind::Coverage => GeoAnalysis::Coverage(coverage(points)),
        GeoAnalysisKind::Clustering => GeoAnalysis::Clustering(clustering(points)),
        GeoAnalysisKind::Optimization => GeoAnalysis::Optimization(optimization(points)),
    };
    debug!(points = points.len(), ?kind, "geospatial analysis completed");

    GeoAnalysisReport {
        recommendations: geo_recommendations(&analysis_results),
        analysis_results,
    }
}

pub fn coverage(points: &[GeoPoint]) -> CoverageAnalysis {
    let mut by_type = BTreeMap::new();
    for point in points {
        *by_type.entry(point.kind.clone()).or_insert(0) += 1;
    }
    CoverageAnalysis {
        total_locations: points.len(),
        by_type,
        coverage_density: points.len() as f64 / 100.0,
    }
}

/// Single-pass greedy clustering in input order.
///
/// Each unclustered point seeds a cluster and pulls in every later
/// unclustered point within [`CLUSTER_RADIUS_KM`] of the seed.
pub fn clustering(points: &[GeoPoint]) -> ClusteringAnalysis {
    let mut clustered = vec![false; points.len()];
    let mut clusters = Vec::new();

    for (i, seed) in points.iter().enumerate() {
        if clustered[i] {
            continue;
        }
        clustered[i] = true;
        let mut cluster = vec![seed.clone()];

        for (j, other) in points.iter().enumerate() {
            if clustered[j] {
                continue;
            }
            if seed.coordinate().distance_km(&other.coordinate()) < CLUSTER_RADIUS_KM {
                clustered[j] = true;
                cluster.push(other.clone());
            }
        }
        clusters.push(cluster);
    }

    let cluster_sizes: Vec<usize> = clusters.iter().map(Vec::len).collect();
    ClusteringAnalysis {
        total_clusters: clusters.len(),
        largest_cluster: cluster_sizes.iter().copied().max().unwrap_or(0),
        cluster_sizes,
        clusters,
    }
}

pub fn optimization(points: &[GeoPoint]) -> OptimizationAnalysis {
    let coordinates: Vec<Coordinate> = points.iter().map(GeoPoint::coordinate).collect();
    let matrix = HaversineMatrix::default().matrix_for(&coordinates);

    let mut count = 0usize;
    let mut sum = 0.0;
    let mut max = f64::NEG_INFINITY;
    let mut min = f64::INFINITY;
    for i in 0..matrix.size() {
        for j in 0..matrix.size() {
            if i == j {
                continue;
            }
            let d = matrix.get(i, j);
            count += 1;
            sum += d;
            max = max.max(d);
            min = min.min(d);
        }
    }

    let (average_distance, max_distance, min_distance) = if count == 0 {
        (0.0, 0.0, 0.0)
    } else {
        (sum / count as f64, max, min)
    };

    OptimizationAnalysis {
        total_locations: points.len(),
        average_distance,
        max_distance,
        min_distance,
        optimization_potential: optimization_potential(count, average_distance),
    }
}

fn optimization_potential(pairs: usize, average_distance: f64) -> OptimizationPotential {
    if pairs == 0 {
        OptimizationPotential::Low
    } else if average_distance > 20.0 {
        OptimizationPotential::High
    } else if average_distance > 10.0 {
        OptimizationPotential::Medium
    } else {
        OptimizationPotential::Low
    }
}

pub fn geo_recommendations(analysis: &GeoAnalysis) -> Vec<String> {
    let mut recommendations = Vec::new();
    match analysis {
        GeoAnalysis::Coverage(a) => {
            if a.coverage_density < 0.5 {
                recommendations.push("Low coverage density - consider adding more locations".to_string());
            }
        }
        GeoAnalysis::Clustering(a) => {
            if a.total_clusters > 10 {
                recommendations.push("Many small clusters - consider consolidation".to_string());
            }
            if a.largest_cluster > 10 {
                recommendations.push("Large cluster detected - consider splitting".to_string());
            }
        }
        GeoAnalysis::Optimization(a) => {
            if a.optimization_potential == OptimizationPotential::High {
                recommendations.push("High optimization potential - implement route optimization".to_string());
                recommendations.push("Consider centralized distribution hubs".to_string());
            }
            if a.average_distance > 15.0 {
                recommendations.push("High average distances - optimize logistics".to_string());
            }
        }
    }
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg(distance_to_next: f64, time_at_location: f64, travel_time: f64) -> RouteLeg {
        RouteLeg {
            distance_to_next,
            time_at_location,
            travel_time,
        }
    }

    #[test]
    fn test_efficiency_analysis() {
        let legs = [leg(20.0, 1.0, 0.5), leg(20.0, 1.0, 0.5)];
        let report = analyze_route(&legs, AnalysisKind::Efficiency, &CostRates::default());
        let RouteAnalysis::Efficiency(a) = &report.analysis_results else {
            panic!("expected efficiency analysis");
        };
        // 100 - (40 * 0.5 + 2 * 2)
        assert_eq!(a.efficiency_score, 76.0);
        assert_eq!(a.optimization_potential, OptimizationPotential::High);
        assert!(report.improvements.is_empty());
    }

    #[test]
    fn test_cost_analysis_short_route() {
        let legs = [leg(0.5, 2.0, 0.0)];
        let report = analyze_route(&legs, AnalysisKind::Cost, &CostRates::default());
        let RouteAnalysis::Cost(a) = &report.analysis_results else {
            panic!("expected cost analysis");
        };
        assert!((a.total_cost - 30.05).abs() < 1e-9);
        // divided by max(1, distance)
        assert!((a.cost_per_km - 30.05).abs() < 1e-9);
        assert_eq!(
            report.improvements,
            vec!["Consider more efficient vehicle or route planning".to_string()]
        );
    }

    #[test]
    fn test_time_analysis() {
        let legs = [leg(5.0, 6.0, 2.0), leg(5.0, 3.0, 1.0)];
        let report = analyze_route(&legs, AnalysisKind::Time, &CostRates::default());
        let RouteAnalysis::Time(a) = &report.analysis_results else {
            panic!("expected time analysis");
        };
        assert_eq!(a.service_time, 6.0);
        assert_eq!(a.time_efficiency, 55.0);
        assert_eq!(report.improvements.len(), 2);
    }

    #[test]
    fn test_environmental_impact() {
        let impact = environmental_impact(50.0);
        assert!((impact.co2_emissions_kg - 6.0).abs() < 1e-9);
        assert!((impact.fuel_consumption_liters - 4.0).abs() < 1e-9);
        assert_eq!(impact.environmental_score, 75.0);
        assert_eq!(impact.sustainability_rating, SustainabilityRating::Fair);
        assert_eq!(SustainabilityRating::for_distance(19.9), SustainabilityRating::Excellent);
        assert_eq!(SustainabilityRating::for_distance(20.0), SustainabilityRating::Good);
    }

    #[test]
    fn test_coverage_counts_by_type() {
        let points = vec![
            GeoPoint::new(22.72, 75.86, "donor"),
            GeoPoint::new(22.73, 75.87, "donor"),
            GeoPoint::new(22.74, 75.88, "ngo"),
        ];
        let report = analyze_geo(&points, GeoAnalysisKind::Coverage);
        let GeoAnalysis::Coverage(a) = &report.analysis_results else {
            panic!("expected coverage analysis");
        };
        assert_eq!(a.by_type.get("donor"), Some(&2));
        assert_eq!(a.by_type.get("ngo"), Some(&1));
        assert!((a.coverage_density - 0.03).abs() < 1e-12);
        assert_eq!(report.recommendations.len(), 1);
    }

    #[test]
    fn test_clustering_is_seeded_in_input_order() {
        // ~1.1 km apart at the equator per 0.01 degree
        let points = vec![
            GeoPoint::new(0.0, 0.0, "donor"),
            GeoPoint::new(0.0, 1.0, "ngo"),
            GeoPoint::new(0.0, 0.01, "donor"),
            GeoPoint::new(0.0, 1.01, "ngo"),
        ];
        let a = clustering(&points);
        assert_eq!(a.total_clusters, 2);
        assert_eq!(a.cluster_sizes, vec![2, 2]);
        assert_eq!(a.clusters[0][1], points[2]);
        assert_eq!(a.largest_cluster, 2);
    }

    #[test]
    fn test_optimization_of_empty_and_single() {
        let empty = optimization(&[]);
        assert_eq!(empty.average_distance, 0.0);
        assert_eq!(empty.optimization_potential, OptimizationPotential::Low);

        let single = optimization(&[GeoPoint::new(22.7, 75.8, "ngo")]);
        assert_eq!(single.total_locations, 1);
        assert_eq!(single.max_distance, 0.0);
    }

    #[test]
    fn test_optimization_potential_high_for_spread_points() {
        let points = vec![GeoPoint::new(22.72, 75.86, "donor"), GeoPoint::new(23.18, 75.78, "ngo")];
        let report = analyze_geo(&points, GeoAnalysisKind::Optimization);
        let GeoAnalysis::Optimization(a) = &report.analysis_results else {
            panic!("expected optimization analysis");
        };
        assert!(a.average_distance > 20.0);
        assert!((a.min_distance - a.max_distance).abs() < 1e-9);
        assert_eq!(a.optimization_potential, OptimizationPotential::High);
        assert!(report.recommendations.contains(&"Consider centralized distribution hubs".to_string()));
    }
}
