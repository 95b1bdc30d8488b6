//! Building trajectories from waypoint lists.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ConstraintError, Result, TimingError, TrajectoryError};
use crate::models::{Position, Waypoint};
use crate::time::EpochSeconds;
use crate::trajectory::{linspace, Trajectory};

/// Tolerance on the average-speed check so exact equality is not rejected.
const SPEED_TOLERANCE_MPS: f64 = 1e-6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMethod {
    /// Piecewise-linear between consecutive waypoints
    #[default]
    Linear,
}

impl FromStr for InterpolationMethod {
    type Err = TrajectoryError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(InterpolationMethod::Linear),
            other => Err(TrajectoryError::UnsupportedMethod(other.to_string())),
        }
    }
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterpolationMethod::Linear => write!(f, "linear"),
        }
    }
}

/// How a waypoint list is timed. Classified once, at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum WaypointSchedule {
    /// Every waypoint carries a timestamp (epoch seconds)
    Timed(Vec<f64>),
    /// No waypoint carries a timestamp
    Untimed,
}

impl WaypointSchedule {
    pub fn classify(waypoints: &[Waypoint]) -> std::result::Result<Self, TimingError> {
        let timed = waypoints.iter().filter(|wp| wp.t.is_some()).count();
        if timed == 0 {
            Ok(WaypointSchedule::Untimed)
        } else if timed == waypoints.len() {
            Ok(WaypointSchedule::Timed(
                waypoints
                    .iter()
                    .filter_map(|wp| wp.t.map(|t| t.epoch_seconds()))
                    .collect(),
            ))
        } else {
            Err(TimingError::MixedTimestamps)
        }
    }
}

/// Timing context for [`interpolate_from_waypoints`].
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub method: InterpolationMethod,
    /// Required when the waypoints carry no timestamps
    pub mission_window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub max_speed_mps: Option<f64>,
    pub flight_id: Option<String>,
}

impl BuildOptions {
    pub fn windowed(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            mission_window: Some((start, end)),
            ..Self::default()
        }
    }

    pub fn with_max_speed(mut self, max_speed_mps: Option<f64>) -> Self {
        self.max_speed_mps = max_speed_mps;
        self
    }

    pub fn with_flight_id(mut self, flight_id: impl Into<String>) -> Self {
        self.flight_id = Some(flight_id.into());
        self
    }
}

/// Build a [`Trajectory`] from an ordered waypoint list.
///
/// Timed waypoints are used as-is. Untimed waypoints are spread over the
/// mission window in proportion to cumulative 3D path length, and the
/// required average speed is checked against `max_speed_mps`.
pub fn interpolate_from_waypoints(waypoints: &[Waypoint], options: &BuildOptions) -> Result<Trajectory> {
    match options.method {
        InterpolationMethod::Linear => {}
    }
    if waypoints.len() < 2 {
        return Err(TrajectoryError::TooFewPoints(waypoints.len()).into());
    }

    let positions: Vec<Position> = waypoints.iter().map(Waypoint::position).collect();

    let times = match WaypointSchedule::classify(waypoints)? {
        WaypointSchedule::Timed(times) => times,
        WaypointSchedule::Untimed => {
            let (start, end) = options.mission_window.ok_or(TimingError::MissingWindow)?;
            times_from_window(&positions, start, end, options.max_speed_mps)?
        }
    };

    let mut trajectory = Trajectory::new(times, positions)?;
    if let Some(flight_id) = &options.flight_id {
        trajectory = trajectory.with_flight_id(flight_id.clone());
    }

    let (t0, t1) = trajectory.time_range();
    tracing::debug!(
        flight_id = trajectory.flight_id(),
        points = trajectory.times().len(),
        t0,
        t1,
        "built trajectory"
    );
    Ok(trajectory)
}

/// Assign times proportional to cumulative distance along the path.
fn times_from_window(
    positions: &[Position],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    max_speed_mps: Option<f64>,
) -> Result<Vec<f64>> {
    let t_start = start.epoch_seconds();
    let duration_s = end.epoch_seconds() - t_start;
    if duration_s.is_nan() || duration_s <= 0.0 {
        return Err(TimingError::NonPositiveWindow(duration_s).into());
    }

    let mut cumulative = Vec::with_capacity(positions.len());
    cumulative.push(0.0);
    let mut total = 0.0;
    for pair in positions.windows(2) {
        total += distance_3d(pair[0], pair[1]);
        cumulative.push(total);
    }

    // All waypoints coincide: spread evenly instead.
    if total <= 0.0 {
        return Ok(linspace(t_start, t_start + duration_s, positions.len()));
    }

    let required = total / duration_s;
    if let Some(max) = max_speed_mps {
        if required > max + SPEED_TOLERANCE_MPS {
            tracing::warn!(required, max, "mission rejected by speed constraint");
            return Err(ConstraintError::SpeedExceeded { required, max }.into());
        }
    }

    Ok(cumulative
        .into_iter()
        .map(|d| t_start + d / total * duration_s)
        .collect())
}

fn distance_3d(a: Position, b: Position) -> f64 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let dz = b[2] - a[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeconflictError;
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap()
    }

    fn window(secs: i64) -> BuildOptions {
        BuildOptions::windowed(start(), start() + Duration::seconds(secs))
    }

    #[test]
    fn test_linear_midpoint_primary_mission() {
        let waypoints = vec![Waypoint::new(0.0, 0.0, 100.0), Waypoint::new(10.0, 0.0, 100.0)];
        let traj = interpolate_from_waypoints(&waypoints, &window(10).with_max_speed(Some(5.0)))
            .unwrap();

        let (t0, t1) = traj.time_range();
        let [x, y, z] = traj.sample_position_at(0.5 * (t0 + t1));
        assert!((x - 5.0).abs() < 1e-6);
        assert!(y.abs() < 1e-6);
        assert!((z - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_max_speed_constraint_violation() {
        // 1000 m in 10 s needs 100 m/s
        let waypoints = vec![Waypoint::new(0.0, 0.0, 0.0), Waypoint::new(1000.0, 0.0, 0.0)];
        let err = interpolate_from_waypoints(&waypoints, &window(10).with_max_speed(Some(50.0)))
            .unwrap_err();
        assert!(matches!(
            err,
            DeconflictError::Constraint(ConstraintError::SpeedExceeded { .. })
        ));

        assert!(
            interpolate_from_waypoints(&waypoints, &window(10).with_max_speed(Some(100.0))).is_ok()
        );
    }

    #[test]
    fn test_times_follow_cumulative_distance() {
        let waypoints = vec![
            Waypoint::new(0.0, 0.0, 0.0),
            Waypoint::new(3.0, 0.0, 0.0),
            Waypoint::new(3.0, 4.0, 3.0),
        ];
        // Segment lengths 3 and 5 over 8 s
        let traj = interpolate_from_waypoints(&waypoints, &window(8)).unwrap();
        let base = start().epoch_seconds();
        let offsets: Vec<f64> = traj.times().iter().map(|t| t - base).collect();
        assert_eq!(offsets, vec![0.0, 3.0, 8.0]);
    }

    #[test]
    fn test_coincident_waypoints_spread_evenly() {
        let waypoints = vec![Waypoint::new(1.0, 1.0, 1.0); 3];
        let traj = interpolate_from_waypoints(&waypoints, &window(10)).unwrap();
        let base = start().epoch_seconds();
        let offsets: Vec<f64> = traj.times().iter().map(|t| t - base).collect();
        assert_eq!(offsets, vec![0.0, 5.0, 10.0]);
    }

    #[test]
    fn test_waypoint_times_used_for_simulated_flight() {
        let t0 = start();
        let t1 = t0 + Duration::seconds(10);
        let waypoints = vec![
            Waypoint::new(0.0, 0.0, 0.0).at(t0),
            Waypoint::new(10.0, 0.0, 0.0).at(t1),
        ];
        let traj = interpolate_from_waypoints(&waypoints, &BuildOptions::default()).unwrap();
        let (tt0, tt1) = traj.time_range();
        assert!((tt0 - t0.epoch_seconds()).abs() < 1e-6);
        assert!((tt1 - t1.epoch_seconds()).abs() < 1e-6);
    }

    #[test]
    fn test_timed_waypoints_ignore_window_and_speed() {
        let waypoints = vec![
            Waypoint::new(0.0, 0.0, 0.0).at(start()),
            Waypoint::new(1000.0, 0.0, 0.0).at(start() + Duration::seconds(1)),
        ];
        let options = window(3600).with_max_speed(Some(1.0));
        assert!(interpolate_from_waypoints(&waypoints, &options).is_ok());
    }

    #[test]
    fn test_mixed_timestamps_rejected() {
        let waypoints = vec![
            Waypoint::new(0.0, 0.0, 0.0).at(start()),
            Waypoint::new(1.0, 0.0, 0.0),
        ];
        let err = interpolate_from_waypoints(&waypoints, &window(10)).unwrap_err();
        assert!(matches!(
            err,
            DeconflictError::Timing(TimingError::MixedTimestamps)
        ));
    }

    #[test]
    fn test_missing_or_inverted_window_rejected() {
        let waypoints = vec![Waypoint::new(0.0, 0.0, 0.0), Waypoint::new(1.0, 0.0, 0.0)];
        let err = interpolate_from_waypoints(&waypoints, &BuildOptions::default()).unwrap_err();
        assert!(matches!(err, DeconflictError::Timing(TimingError::MissingWindow)));

        let inverted = BuildOptions::windowed(start(), start() - Duration::seconds(1));
        let err = interpolate_from_waypoints(&waypoints, &inverted).unwrap_err();
        assert!(matches!(
            err,
            DeconflictError::Timing(TimingError::NonPositiveWindow(_))
        ));
    }

    #[test]
    fn test_single_waypoint_rejected() {
        let err = interpolate_from_waypoints(&[Waypoint::new(0.0, 0.0, 0.0)], &window(10))
            .unwrap_err();
        assert!(matches!(
            err,
            DeconflictError::Trajectory(TrajectoryError::TooFewPoints(1))
        ));
    }

    #[test]
    fn test_unknown_interpolation_method() {
        assert_eq!("Linear".parse::<InterpolationMethod>(), Ok(InterpolationMethod::Linear));
        assert_eq!(
            "cubic".parse::<InterpolationMethod>(),
            Err(TrajectoryError::UnsupportedMethod("cubic".to_string()))
        );
    }

    #[test]
    fn test_flight_id_applied() {
        let waypoints = vec![Waypoint::new(0.0, 0.0, 0.0), Waypoint::new(1.0, 0.0, 0.0)];
        let traj = interpolate_from_waypoints(&waypoints, &window(10).with_flight_id("S001"))
            .unwrap();
        assert_eq!(traj.flight_id(), "S001");
    }
}
