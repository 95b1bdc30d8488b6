//! Mission analysis: load, build trajectories, detect, report.

use std::path::Path;

use crate::builder::{interpolate_from_waypoints, BuildOptions};
use crate::conflict::{ConflictDetector, MissionReport, MissionStatus};
use crate::error::Result;
use crate::loader::{load_primary, load_simulated_flights};
use crate::models::{PrimaryMission, SimulatedFlight};
use crate::rules::SafetyRules;
use crate::trajectory::Trajectory;

/// Build the primary trajectory from its mission window and speed limit.
pub fn primary_trajectory(mission: &PrimaryMission) -> Result<Trajectory> {
    let options = BuildOptions::windowed(mission.start, mission.end)
        .with_max_speed(mission.constraints.max_speed_mps);
    interpolate_from_waypoints(&mission.waypoints, &options)
}

/// Build an intruder trajectory from its own waypoint timestamps.
pub fn flight_trajectory(flight: &SimulatedFlight) -> Result<Trajectory> {
    let (start, end) = flight.time_bounds()?;
    let options = BuildOptions::windowed(start, end).with_flight_id(flight.flight_id.clone());
    interpolate_from_waypoints(&flight.waypoints, &options)
}

/// Analyze an in-memory mission against simulated flights.
pub fn analyze(
    mission: &PrimaryMission,
    flights: &[SimulatedFlight],
    rules: &SafetyRules,
) -> Result<(MissionStatus, MissionReport)> {
    let detector = ConflictDetector::new(rules.clone())?;
    mission.validate()?;

    let primary = primary_trajectory(mission)?;
    let intruders = flights
        .iter()
        .map(|flight| {
            flight.validate()?;
            flight_trajectory(flight)
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        mission_id = %mission.mission_id,
        flights = intruders.len(),
        "analyzing mission"
    );

    let report = detector.detect(&primary, &intruders)?;
    Ok((report.status, report))
}

/// Analyze mission files on disk.
pub fn analyze_mission(
    primary_path: impl AsRef<Path>,
    flights_path: impl AsRef<Path>,
    rules: &SafetyRules,
) -> Result<(MissionStatus, MissionReport)> {
    let mission = load_primary(primary_path)?;
    let flights = load_simulated_flights(flights_path)?;
    analyze(&mission, &flights, rules)
}
