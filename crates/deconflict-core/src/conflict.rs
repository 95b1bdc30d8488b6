//! Spatio-temporal conflict detection for a primary mission.
//!
//! Each intruder is checked independently against the primary trajectory
//! over their temporal overlap. Every sampled instant where separation is
//! strictly below the safety buffer yields its own [`Conflict`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrajectoryError};
use crate::models::Position;
use crate::rules::SafetyRules;
use crate::spatial::planar_distance;
use crate::time::iso_from_epoch;
use crate::trajectory::{grid_len, Trajectory};

/// Outcome of a detection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionStatus {
    /// No sample fell under the safety buffer
    Clear,
    /// At least one conflict was recorded
    Conflict,
}

impl fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissionStatus::Clear => write!(f, "clear"),
            MissionStatus::Conflict => write!(f, "conflict"),
        }
    }
}

/// Primary and intruder positions at a conflicting instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictPosition {
    pub primary: Position,
    pub sim: Position,
}

/// One violating (intruder, instant) sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub flight_id: String,
    pub conflict_times: Vec<String>,
    pub conflict_positions: Vec<ConflictPosition>,
    pub min_distance_m: f64,
    pub time_of_min: String,
    pub explanation: String,
    /// Violating instant in epoch seconds
    #[serde(skip)]
    pub time_s: f64,
}

/// Status plus every conflict, in intruder order then time order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionReport {
    pub status: MissionStatus,
    pub conflicts: Vec<Conflict>,
}

impl MissionReport {
    pub fn from_conflicts(conflicts: Vec<Conflict>) -> Self {
        let status = if conflicts.is_empty() {
            MissionStatus::Clear
        } else {
            MissionStatus::Conflict
        };
        Self { status, conflicts }
    }

    pub fn is_clear(&self) -> bool {
        self.status == MissionStatus::Clear
    }

    /// The conflict with the smallest separation, first one on ties.
    pub fn closest(&self) -> Option<&Conflict> {
        self.conflicts.iter().fold(None, |best: Option<&Conflict>, c| match best {
            Some(b) if b.min_distance_m <= c.min_distance_m => Some(b),
            _ => Some(c),
        })
    }
}

/// Spatio-temporal conflict detection engine.
#[derive(Debug, Clone)]
pub struct ConflictDetector {
    rules: SafetyRules,
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self {
            rules: SafetyRules::default(),
        }
    }
}

impl ConflictDetector {
    /// Create a detector; fails on a negative buffer or non-positive step.
    pub fn new(rules: SafetyRules) -> Result<Self> {
        rules.validate()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &SafetyRules {
        &self.rules
    }

    /// Check the primary trajectory against every intruder.
    ///
    /// Fails when an overlap window would need more than
    /// [`MAX_SAMPLES`](crate::trajectory::MAX_SAMPLES) instants at this step.
    pub fn detect(&self, primary: &Trajectory, intruders: &[Trajectory]) -> Result<MissionReport> {
        let mut conflicts = Vec::new();
        for intruder in intruders {
            conflicts.extend(self.detect_pair(primary, intruder)?);
        }

        tracing::info!(
            intruders = intruders.len(),
            conflicts = conflicts.len(),
            buffer_m = self.rules.safety_buffer_m,
            "conflict detection complete"
        );
        Ok(MissionReport::from_conflicts(conflicts))
    }

    fn detect_pair(&self, primary: &Trajectory, intruder: &Trajectory) -> Result<Vec<Conflict>> {
        let (primary_t0, primary_t1) = primary.time_range();
        let (sim_t0, sim_t1) = intruder.time_range();

        let overlap_start = primary_t0.max(sim_t0);
        let overlap_end = primary_t1.min(sim_t1);
        if overlap_end <= overlap_start {
            tracing::debug!(flight_id = intruder.flight_id(), "no temporal overlap");
            return Ok(Vec::new());
        }

        let grid = half_open_grid(overlap_start, overlap_end, self.rules.sample_step_s)?;
        if grid.is_empty() {
            return Ok(Vec::new());
        }

        let primary_samples = primary.sample_sorted(&grid);
        let sim_samples = intruder.sample_sorted(&grid);

        let mut conflicts = Vec::new();
        for ((&t, p), s) in grid.iter().zip(&primary_samples).zip(&sim_samples) {
            let distance = self.separation(p, s);
            if distance < self.rules.safety_buffer_m {
                conflicts.push(build_conflict(primary, intruder, t, *p, *s, distance));
            }
        }
        Ok(conflicts)
    }

    fn separation(&self, a: &Position, b: &Position) -> f64 {
        if self.rules.use_3d {
            let dz = b[2] - a[2];
            let planar = planar_distance(a[0], a[1], b[0], b[1]);
            (planar * planar + dz * dz).sqrt()
        } else {
            planar_distance(a[0], a[1], b[0], b[1])
        }
    }
}

/// Check a primary trajectory against intruders with explicit settings.
pub fn check_spatiotemporal_conflicts(
    primary: &Trajectory,
    intruders: &[Trajectory],
    safety_buffer_m: f64,
    dt: f64,
    use_3d: bool,
) -> Result<MissionReport> {
    let detector = ConflictDetector::new(SafetyRules::new(safety_buffer_m, dt, use_3d))?;
    detector.detect(primary, intruders)
}

/// `start, start + dt, ...` strictly below `end`.
fn half_open_grid(start: f64, end: f64, dt: f64) -> std::result::Result<Vec<f64>, TrajectoryError> {
    let steps = grid_len(((end - start) / dt).ceil())?;
    Ok((0..steps).map(|i| start + i as f64 * dt).collect())
}

fn build_conflict(
    primary: &Trajectory,
    intruder: &Trajectory,
    t: f64,
    primary_pos: Position,
    sim_pos: Position,
    distance: f64,
) -> Conflict {
    let t_iso = iso_from_epoch(t);
    let explanation = format!(
        "At {t_iso}, {} and {} were within {distance:.2} m at position [{:?}, {:?}]",
        primary.flight_id(),
        intruder.flight_id(),
        primary_pos[0],
        primary_pos[1],
    );
    Conflict {
        flight_id: intruder.flight_id().to_string(),
        conflict_times: vec![t_iso.clone()],
        conflict_positions: vec![ConflictPosition {
            primary: primary_pos,
            sim: sim_pos,
        }],
        min_distance_m: distance,
        time_of_min: t_iso,
        explanation,
        time_s: t,
    }
}
