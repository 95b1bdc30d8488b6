//! Pairwise spatial proximity between two trajectories.
//!
//! Unlike the spatio-temporal detector, these checks are not restricted to
//! the temporal overlap: both trajectories are evaluated over the union of
//! their own sample grids, clamping each one outside its recorded range.
//! Distances are planar (x, y).

use serde::{Deserialize, Serialize};

use crate::error::TrajectoryError;
use crate::trajectory::Trajectory;

/// Internal sampling resolution, in seconds.
pub const SPATIAL_SAMPLE_STEP_S: f64 = 1.0;

/// Minimum planar separation found over the combined grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClosestApproach {
    pub min_distance_m: f64,
    pub t_a_at_min: f64,
    pub t_b_at_min: f64,
    /// Planar position of A at the minimizing instant
    pub position_a: [f64; 2],
    pub position_b: [f64; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialConflict {
    pub conflict_detected: bool,
    #[serde(flatten)]
    pub approach: ClosestApproach,
}

/// Check whether two trajectories come closer than `buffer_m`.
pub fn check_spatial_conflict(
    traj_a: &Trajectory,
    traj_b: &Trajectory,
    buffer_m: f64,
) -> Result<SpatialConflict, TrajectoryError> {
    let approach = closest_approach(traj_a, traj_b)?;
    Ok(SpatialConflict {
        conflict_detected: approach.min_distance_m < buffer_m,
        approach,
    })
}

/// Closest planar approach between two trajectories.
pub fn closest_approach(
    traj_a: &Trajectory,
    traj_b: &Trajectory,
) -> Result<ClosestApproach, TrajectoryError> {
    let (times_a, _) = traj_a.sample_uniform(SPATIAL_SAMPLE_STEP_S)?;
    let (times_b, _) = traj_b.sample_uniform(SPATIAL_SAMPLE_STEP_S)?;
    let common = union_sorted(times_a, times_b);

    let positions_a = traj_a.sample_sorted(&common);
    let positions_b = traj_b.sample_sorted(&common);

    let mut best: Option<ClosestApproach> = None;
    for ((&t, pa), pb) in common.iter().zip(&positions_a).zip(&positions_b) {
        let distance = planar_distance(pa[0], pa[1], pb[0], pb[1]);
        // Keep the first instant on ties.
        let replace = best
            .as_ref()
            .map(|b| distance < b.min_distance_m)
            .unwrap_or(true);
        if replace {
            best = Some(ClosestApproach {
                min_distance_m: distance,
                t_a_at_min: t,
                t_b_at_min: t,
                position_a: [pa[0], pa[1]],
                position_b: [pb[0], pb[1]],
            });
        }
    }

    // Both grids hold at least one instant, so `common` is never empty.
    best.ok_or(TrajectoryError::TooFewPoints(0))
}

/// Sorted union of two time grids with exact duplicates removed.
fn union_sorted(mut a: Vec<f64>, b: Vec<f64>) -> Vec<f64> {
    a.extend(b);
    a.sort_by(f64::total_cmp);
    a.dedup();
    a
}

pub fn planar_distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{interpolate_from_waypoints, BuildOptions};
    use crate::models::Waypoint;
    use chrono::{Duration, TimeZone, Utc};

    fn windowed(waypoints: [(f64, f64); 2], offset_s: i64, duration_s: i64) -> Trajectory {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap() + Duration::seconds(offset_s);
        let waypoints: Vec<Waypoint> = waypoints
            .iter()
            .map(|&(x, y)| Waypoint::new(x, y, 0.0))
            .collect();
        interpolate_from_waypoints(
            &waypoints,
            &BuildOptions::windowed(start, start + Duration::seconds(duration_s)),
        )
        .unwrap()
    }

    #[test]
    fn test_perpendicular_path_conflict() {
        let a = windowed([(0.0, 0.0), (10.0, 0.0)], 0, 10);
        let b = windowed([(5.0, -5.0), (5.0, 5.0)], 0, 10);

        let result = check_spatial_conflict(&a, &b, 1.0).unwrap();
        assert!(result.conflict_detected);
        assert_eq!(result.approach.min_distance_m, 0.0);
        assert_eq!(result.approach.position_a, [5.0, 0.0]);
        assert_eq!(result.approach.position_b, [5.0, 0.0]);
    }

    #[test]
    fn test_parallel_tracks_no_conflict() {
        let a = windowed([(0.0, 0.0), (10.0, 0.0)], 0, 10);
        let b = windowed([(0.0, 2.0), (10.0, 2.0)], 0, 10);

        let result = check_spatial_conflict(&a, &b, 1.0).unwrap();
        assert!(!result.conflict_detected);
        assert!(result.approach.min_distance_m > 1.0);
    }

    #[test]
    fn test_closest_approach() {
        let a = windowed([(0.0, 0.0), (10.0, 0.0)], 0, 10);
        let b = windowed([(5.0, -5.0), (5.0, 5.0)], 0, 10);

        let approach = closest_approach(&a, &b).unwrap();
        assert_eq!(approach.min_distance_m, 0.0);
        assert_eq!(approach.position_a, [5.0, 0.0]);
        assert_eq!(approach.position_b, [5.0, 0.0]);
        assert_eq!(approach.t_a_at_min, approach.t_b_at_min);
    }

    #[test]
    fn test_union_grid_covers_disjoint_ranges() {
        // B starts after A ends; A is clamped at its last point for B's instants.
        let a = windowed([(0.0, 0.0), (10.0, 0.0)], 0, 10);
        let b = windowed([(10.0, 3.0), (10.0, 20.0)], 20, 10);

        let approach = closest_approach(&a, &b).unwrap();
        assert_eq!(approach.min_distance_m, 3.0);
        assert_eq!(approach.position_a, [10.0, 0.0]);
        assert_eq!(approach.position_b, [10.0, 3.0]);
    }

    #[test]
    fn test_union_sorted_dedups() {
        assert_eq!(
            union_sorted(vec![0.0, 1.0, 2.0], vec![1.0, 1.5, 3.0]),
            vec![0.0, 1.0, 1.5, 2.0, 3.0]
        );
    }
}
