//! Time-parameterized trajectories.
//!
//! A [`Trajectory`] is a strictly time-ordered polyline in 3D. Positions
//! between recorded points are linearly interpolated per coordinate;
//! queries outside the recorded range clamp to the nearest endpoint.

use serde::Serialize;

use crate::error::TrajectoryError;
use crate::models::Position;
use crate::time::EpochSeconds;

/// Label given to trajectories that were never tagged with a flight id.
pub const PRIMARY_FLIGHT_ID: &str = "primary";

/// Most instants any sampling grid may hold.
pub const MAX_SAMPLES: usize = 1_000_000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    /// Seconds since the Unix epoch, strictly increasing
    times: Vec<f64>,
    positions: Vec<Position>,
    flight_id: String,
}

impl Trajectory {
    /// Build a trajectory from parallel time and position sequences.
    pub fn new(times: Vec<f64>, positions: Vec<Position>) -> Result<Self, TrajectoryError> {
        if times.len() != positions.len() {
            return Err(TrajectoryError::LengthMismatch {
                times: times.len(),
                positions: positions.len(),
            });
        }
        if times.len() < 2 {
            return Err(TrajectoryError::TooFewPoints(times.len()));
        }
        if times.iter().any(|t| !t.is_finite()) {
            return Err(TrajectoryError::NonFiniteValue("time"));
        }
        if positions.iter().flatten().any(|c| !c.is_finite()) {
            return Err(TrajectoryError::NonFiniteValue("position"));
        }
        for (index, pair) in times.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(TrajectoryError::NonIncreasingTimes {
                    index: index + 1,
                    previous: pair[0],
                    current: pair[1],
                });
            }
        }

        Ok(Self {
            times,
            positions,
            flight_id: PRIMARY_FLIGHT_ID.to_string(),
        })
    }

    /// Tag the trajectory with a flight identifier.
    pub fn with_flight_id(mut self, flight_id: impl Into<String>) -> Self {
        self.flight_id = flight_id.into();
        self
    }

    pub fn flight_id(&self) -> &str {
        &self.flight_id
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// First and last recorded times.
    pub fn time_range(&self) -> (f64, f64) {
        (self.times[0], self.times[self.times.len() - 1])
    }

    /// Position at time `t`, given either as a timestamp or as epoch seconds.
    /// A NaN time yields NaN coordinates.
    pub fn sample_position_at(&self, t: impl EpochSeconds) -> Position {
        let mut cursor = 0;
        self.interpolate(t.epoch_seconds(), &mut cursor)
    }

    /// Sample on a uniform grid from `t0` to `t1` inclusive.
    ///
    /// The grid has `floor((t1 - t0) / dt_s) + 1` points spaced evenly so
    /// that the final point lands exactly on `t1`.
    pub fn sample_uniform(&self, dt_s: f64) -> Result<(Vec<f64>, Vec<Position>), TrajectoryError> {
        if !dt_s.is_finite() || dt_s <= 0.0 {
            return Err(TrajectoryError::NonPositiveStep(dt_s));
        }
        let (t0, t1) = self.time_range();
        if t1 <= t0 {
            return Err(TrajectoryError::InvalidTimeRange { start: t0, end: t1 });
        }

        let steps = grid_len(((t1 - t0) / dt_s).floor() + 1.0)?;
        let grid = linspace(t0, t1, steps);
        let positions = self.sample_sorted(&grid);
        Ok((grid, positions))
    }

    /// Sample at every instant of an ascending grid in a single pass.
    pub fn sample_sorted(&self, grid: &[f64]) -> Vec<Position> {
        let mut cursor = 0;
        grid.iter()
            .map(|&t| self.interpolate(t, &mut cursor))
            .collect()
    }

    fn interpolate(&self, t: f64, cursor: &mut usize) -> Position {
        if t.is_nan() {
            return [f64::NAN; 3];
        }
        let (t0, t1) = self.time_range();
        if t <= t0 {
            return self.positions[0];
        }
        if t >= t1 {
            return self.positions[self.positions.len() - 1];
        }

        // Restart from the beginning if the caller went backwards in time.
        if self.times[*cursor] > t {
            *cursor = 0;
        }
        while *cursor + 2 < self.times.len() && self.times[*cursor + 1] <= t {
            *cursor += 1;
        }

        let i = *cursor;
        let (ta, tb) = (self.times[i], self.times[i + 1]);
        let (pa, pb) = (self.positions[i], self.positions[i + 1]);
        let offset = t - ta;
        let span = tb - ta;
        [
            pa[0] + (pb[0] - pa[0]) / span * offset,
            pa[1] + (pb[1] - pa[1]) / span * offset,
            pa[2] + (pb[2] - pa[2]) / span * offset,
        ]
    }
}

/// Size a grid of `count` instants, refusing more than [`MAX_SAMPLES`].
pub(crate) fn grid_len(count: f64) -> Result<usize, TrajectoryError> {
    if !count.is_finite() || count > MAX_SAMPLES as f64 {
        return Err(TrajectoryError::GridTooLarge {
            steps: count,
            max: MAX_SAMPLES,
        });
    }
    Ok(count.max(0.0) as usize)
}

/// `n` evenly spaced values from `start` to `stop`, both included.
pub(crate) fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut values: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
            values[n - 1] = stop;
            values
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn straight_line() -> Trajectory {
        Trajectory::new(vec![0.0, 4.0], vec![[0.0, 0.0, 0.0], [4.0, 0.0, 0.0]]).unwrap()
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let err = Trajectory::new(vec![0.0, 1.0, 2.0], vec![[0.0; 3], [1.0; 3]]).unwrap_err();
        assert_eq!(
            err,
            TrajectoryError::LengthMismatch {
                times: 3,
                positions: 2
            }
        );
    }

    #[test]
    fn test_rejects_duplicate_and_decreasing_times() {
        let dup = Trajectory::new(vec![0.0, 0.0], vec![[0.0; 3], [1.0; 3]]);
        assert!(matches!(dup, Err(TrajectoryError::NonIncreasingTimes { .. })));

        let back = Trajectory::new(vec![0.0, 2.0, 1.0], vec![[0.0; 3]; 3]);
        assert!(matches!(
            back,
            Err(TrajectoryError::NonIncreasingTimes { index: 2, .. })
        ));
    }

    #[test]
    fn test_rejects_single_point() {
        let err = Trajectory::new(vec![0.0], vec![[0.0; 3]]).unwrap_err();
        assert_eq!(err, TrajectoryError::TooFewPoints(1));
    }

    #[test]
    fn test_default_flight_id_is_primary() {
        assert_eq!(straight_line().flight_id(), PRIMARY_FLIGHT_ID);
        assert_eq!(straight_line().with_flight_id("S7").flight_id(), "S7");
    }

    #[test]
    fn test_sample_clamps_outside_range() {
        let traj = straight_line();
        assert_eq!(traj.sample_position_at(-10.0), [0.0, 0.0, 0.0]);
        assert_eq!(traj.sample_position_at(100.0), [4.0, 0.0, 0.0]);
    }

    #[test]
    fn test_sample_interpolates_each_axis() {
        let traj = Trajectory::new(
            vec![0.0, 10.0, 20.0],
            vec![[0.0, 0.0, 100.0], [10.0, 0.0, 100.0], [10.0, 20.0, 120.0]],
        )
        .unwrap();
        assert_eq!(traj.sample_position_at(5.0), [5.0, 0.0, 100.0]);
        assert_eq!(traj.sample_position_at(10.0), [10.0, 0.0, 100.0]);
        assert_eq!(traj.sample_position_at(15.0), [10.0, 10.0, 110.0]);
    }

    #[test]
    fn test_sample_accepts_timestamps() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
        let base = t0.epoch_seconds();
        let traj = Trajectory::new(
            vec![base, base + 10.0],
            vec![[0.0, 0.0, 0.0], [10.0, 0.0, 0.0]],
        )
        .unwrap();
        let mid = t0 + chrono::Duration::seconds(5);
        assert_eq!(traj.sample_position_at(mid), [5.0, 0.0, 0.0]);
        assert_eq!(traj.sample_position_at(base + 5.0), [5.0, 0.0, 0.0]);
    }

    #[test]
    fn test_sample_uniform_grid() {
        let (times, positions) = straight_line().sample_uniform(1.0).unwrap();
        assert_eq!(times, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        let xs: Vec<f64> = positions.iter().map(|p| p[0]).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_sample_uniform_last_point_is_endpoint() {
        let traj = Trajectory::new(vec![0.0, 10.0], vec![[0.0; 3], [7.0, 3.0, 1.0]]).unwrap();
        let (times, positions) = traj.sample_uniform(3.0).unwrap();
        // floor(10 / 3) + 1 = 4 samples, spaced 10/3 apart
        assert_eq!(times.len(), 4);
        assert_eq!(*times.last().unwrap(), 10.0);
        assert_eq!(*positions.last().unwrap(), [7.0, 3.0, 1.0]);
        let spacing = times[1] - times[0];
        for pair in times.windows(2) {
            assert!((pair[1] - pair[0] - spacing).abs() < 1e-9);
        }
    }

    #[test]
    fn test_sample_uniform_rejects_bad_step() {
        let traj = straight_line();
        assert_eq!(
            traj.sample_uniform(0.0).unwrap_err(),
            TrajectoryError::NonPositiveStep(0.0)
        );
        assert!(traj.sample_uniform(-1.0).is_err());
        assert!(traj.sample_uniform(f64::NAN).is_err());
    }

    #[test]
    fn test_sample_uniform_caps_grid_size() {
        let traj = straight_line();
        assert!(matches!(
            traj.sample_uniform(1e-9),
            Err(TrajectoryError::GridTooLarge { max: MAX_SAMPLES, .. })
        ));
        // Subnormal steps overflow the division to infinity.
        assert!(matches!(
            traj.sample_uniform(f64::MIN_POSITIVE / 4.0),
            Err(TrajectoryError::GridTooLarge { .. })
        ));
        assert!(traj.sample_uniform(1e-5).is_ok());
    }

    #[test]
    fn test_nan_query_yields_nan_position() {
        let pos = straight_line().sample_position_at(f64::NAN);
        assert!(pos.iter().all(|c| c.is_nan()));
    }

    #[test]
    fn test_sample_sorted_matches_point_queries() {
        let traj = Trajectory::new(
            vec![0.0, 1.0, 3.0, 6.0],
            vec![[0.0; 3], [1.0, 2.0, 0.0], [3.0, 2.0, 4.0], [0.0, 0.0, 0.0]],
        )
        .unwrap();
        let grid = [-1.0, 0.5, 1.0, 2.2, 4.0, 5.9, 7.0];
        let batch = traj.sample_sorted(&grid);
        for (t, pos) in grid.iter().zip(batch) {
            assert_eq!(traj.sample_position_at(*t), pos);
        }
    }
}
