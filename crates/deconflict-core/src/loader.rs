//! Loading missions and simulated flights from JSON files.
//!
//! Primary mission file:
//! ```json
//! {
//!   "mission_id": "P001",
//!   "time_window": { "start": "2025-11-20T09:00:00", "end": "2025-11-20T09:15:00" },
//!   "waypoints": [ {"id": "wp1", "x": 0.0, "y": 0.0, "z": 100.0}, ... ],
//!   "constraints": { "max_speed_mps": 20.0 }
//! }
//! ```
//!
//! Simulated flights file: a list of
//! `{ "flight_id", "waypoints": [{"t", "x", "y", "z"}, ...], "metadata", "start"?, "end"? }`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DeconflictError, Result};
use crate::models::{MissionConstraints, PrimaryMission, SimulatedFlight, Waypoint};
use crate::time::parse_iso8601;

#[derive(Debug, Deserialize)]
struct RawTimeWindow {
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPrimaryMission {
    #[serde(default)]
    mission_id: Option<String>,
    #[serde(default)]
    time_window: Option<RawTimeWindow>,
    #[serde(default)]
    waypoints: Option<Vec<Waypoint>>,
    #[serde(default)]
    constraints: Option<MissionConstraints>,
}

#[derive(Debug, Deserialize)]
struct RawSimulatedFlight {
    #[serde(default)]
    flight_id: Option<String>,
    #[serde(default)]
    waypoints: Option<Vec<Waypoint>>,
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
}

/// Parse a primary mission document.
pub fn parse_primary(json: &str) -> Result<PrimaryMission> {
    let raw: RawPrimaryMission = serde_json::from_str(json)?;

    let mission_id = raw
        .mission_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| DeconflictError::Input("Primary mission JSON must contain 'mission_id'".to_string()))?;

    let window = raw.time_window.unwrap_or(RawTimeWindow {
        start: None,
        end: None,
    });
    let (Some(start_raw), Some(end_raw)) = (window.start, window.end) else {
        return Err(DeconflictError::Input(
            "Primary mission JSON must contain time_window.start and time_window.end".to_string(),
        ));
    };

    let mission = PrimaryMission {
        mission_id,
        waypoints: raw.waypoints.unwrap_or_default(),
        start: parse_iso8601(&start_raw)?,
        end: parse_iso8601(&end_raw)?,
        constraints: raw.constraints.unwrap_or_default(),
    };
    mission.validate()?;
    Ok(mission)
}

/// Parse a simulated flights document (a JSON list).
pub fn parse_simulated_flights(json: &str) -> Result<Vec<SimulatedFlight>> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Array(items) = value else {
        return Err(DeconflictError::Input(
            "Simulated flights JSON must be a list of flights".to_string(),
        ));
    };

    let mut flights = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        let raw: RawSimulatedFlight = serde_json::from_value(item)?;
        let flight_id = raw
            .flight_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| DeconflictError::Input(format!("Simulated flight at index {i} missing 'flight_id'")))?;

        let waypoints = raw.waypoints.unwrap_or_default();
        if let Some(j) = waypoints.iter().position(|wp| wp.t.is_none()) {
            return Err(DeconflictError::Input(format!(
                "Waypoint {j} of flight {flight_id} missing time 't'"
            )));
        }

        let (start, end) = match (raw.start, raw.end) {
            (Some(start), Some(end)) => (Some(parse_iso8601(&start)?), Some(parse_iso8601(&end)?)),
            _ => (None, None),
        };

        let flight = SimulatedFlight {
            flight_id,
            waypoints,
            start,
            end,
            metadata: raw.metadata.unwrap_or_default(),
        };
        flight.validate()?;
        flights.push(flight);
    }

    Ok(flights)
}

pub fn load_primary(path: impl AsRef<Path>) -> Result<PrimaryMission> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(DeconflictError::Input(format!(
            "Primary mission file not found: {}",
            path.display()
        )));
    }
    parse_primary(&fs::read_to_string(path)?)
}

pub fn load_simulated_flights(path: impl AsRef<Path>) -> Result<Vec<SimulatedFlight>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(DeconflictError::Input(format!(
            "Simulated flights file not found: {}",
            path.display()
        )));
    }
    parse_simulated_flights(&fs::read_to_string(path)?)
}

/// Write any serializable report as pretty JSON, creating parent directories.
pub fn save_report<T: Serialize>(report: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(report)?)?;
    Ok(())
}
