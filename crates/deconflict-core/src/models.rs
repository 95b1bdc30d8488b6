//! Core data models for mission deconfliction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DeconflictError, Result};
use crate::time::flexible;

/// A position with altitude materialized: `[x, y, z]`.
pub type Position = [f64; 3];

/// Single waypoint in space and optionally time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
    /// Altitude; treated as 0.0 when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(
        default,
        with = "flexible::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub t: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Waypoint {
    /// Create an untimed waypoint.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z: Some(z),
            t: None,
            id: None,
        }
    }

    /// Attach an absolute timestamp.
    pub fn at(mut self, t: DateTime<Utc>) -> Self {
        self.t = Some(t);
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn position(&self) -> Position {
        [self.x, self.y, self.z.unwrap_or(0.0)]
    }
}

/// Mission-level constraints. Unknown keys are preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissionConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_speed_mps: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The mission being checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryMission {
    pub mission_id: String,
    pub waypoints: Vec<Waypoint>,
    #[serde(with = "flexible")]
    pub start: DateTime<Utc>,
    #[serde(with = "flexible")]
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub constraints: MissionConstraints,
}

impl PrimaryMission {
    /// Mission duration in seconds.
    pub fn duration_s(&self) -> f64 {
        (self.end - self.start).num_milliseconds() as f64 / 1000.0
    }

    /// Waypoint positions with missing altitude set to 0.0.
    pub fn positions(&self) -> Vec<Position> {
        self.waypoints.iter().map(Waypoint::position).collect()
    }

    /// Check the structural rules a loaded mission must satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.mission_id.trim().is_empty() {
            return Err(DeconflictError::Input(
                "Primary mission must contain 'mission_id'".to_string(),
            ));
        }
        if self.start >= self.end {
            return Err(DeconflictError::Input(format!(
                "Primary mission start must be before end (got {} >= {})",
                self.start, self.end
            )));
        }
        if self.waypoints.len() < 2 {
            return Err(DeconflictError::Input(
                "Primary mission must contain at least 2 waypoints".to_string(),
            ));
        }
        if let Some(max) = self.constraints.max_speed_mps {
            if !max.is_finite() || max <= 0.0 {
                return Err(DeconflictError::Input(format!(
                    "max_speed_mps must be a positive number, got {max}"
                )));
            }
        }
        Ok(())
    }
}

/// Another drone's known flight through the shared airspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedFlight {
    pub flight_id: String,
    pub waypoints: Vec<Waypoint>,
    /// Optional explicit bounds; validated but the trajectory follows waypoint times
    #[serde(
        default,
        with = "flexible::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub start: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "flexible::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl SimulatedFlight {
    pub fn positions(&self) -> Vec<Position> {
        self.waypoints.iter().map(Waypoint::position).collect()
    }

    /// Earliest and latest waypoint timestamps.
    pub fn time_bounds(&self) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        let mut times = self.waypoints.iter().filter_map(|wp| wp.t);
        let first = times.next().ok_or_else(|| {
            DeconflictError::Input(format!(
                "SimulatedFlight {} has no waypoint times",
                self.flight_id
            ))
        })?;
        Ok(times.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
    }

    pub fn validate(&self) -> Result<()> {
        if self.flight_id.trim().is_empty() {
            return Err(DeconflictError::Input(
                "Simulated flight missing 'flight_id'".to_string(),
            ));
        }
        if self.waypoints.len() < 2 {
            return Err(DeconflictError::Input(format!(
                "Simulated flight {} must have at least 2 waypoints",
                self.flight_id
            )));
        }
        if let Some(idx) = self.waypoints.iter().position(|wp| wp.t.is_none()) {
            return Err(DeconflictError::Input(format!(
                "Waypoint {idx} of flight {} missing time 't'",
                self.flight_id
            )));
        }
        let (start, end) = match (self.start, self.end) {
            (Some(start), Some(end)) => (start, end),
            _ => self.time_bounds()?,
        };
        if start >= end {
            return Err(DeconflictError::Input(format!(
                "Simulated flight {} start must be before end (got {} >= {})",
                self.flight_id, start, end
            )));
        }
        Ok(())
    }
}

/// Request body for the HTTP check endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionRequest {
    pub mission: PrimaryMission,
    pub flights: Vec<SimulatedFlight>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(sec: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, sec).unwrap()
    }

    #[test]
    fn test_missing_altitude_defaults_to_zero() {
        let wp: Waypoint = serde_json::from_str(r#"{"x": 1.0, "y": 2.0}"#).unwrap();
        assert_eq!(wp.position(), [1.0, 2.0, 0.0]);
        assert!(wp.t.is_none());
    }

    #[test]
    fn test_time_bounds_uses_min_and_max() {
        let flight = SimulatedFlight {
            flight_id: "S1".into(),
            waypoints: vec![
                Waypoint::new(0.0, 0.0, 0.0).at(ts(5)),
                Waypoint::new(1.0, 0.0, 0.0).at(ts(1)),
                Waypoint::new(2.0, 0.0, 0.0).at(ts(9)),
            ],
            start: None,
            end: None,
            metadata: Map::new(),
        };
        assert_eq!(flight.time_bounds().unwrap(), (ts(1), ts(9)));
    }

    #[test]
    fn test_flight_without_times_is_invalid() {
        let flight = SimulatedFlight {
            flight_id: "S1".into(),
            waypoints: vec![Waypoint::new(0.0, 0.0, 0.0), Waypoint::new(1.0, 0.0, 0.0)],
            start: None,
            end: None,
            metadata: Map::new(),
        };
        assert!(flight.time_bounds().is_err());
        assert!(flight.validate().is_err());
    }

    #[test]
    fn test_constraints_keep_unknown_keys() {
        let c: MissionConstraints =
            serde_json::from_str(r#"{"max_speed_mps": 20.0, "priority": "high"}"#).unwrap();
        assert_eq!(c.max_speed_mps, Some(20.0));
        assert_eq!(c.extra.get("priority"), Some(&Value::from("high")));
    }

    #[test]
    fn test_mission_duration() {
        let mission = PrimaryMission {
            mission_id: "P1".into(),
            waypoints: vec![Waypoint::new(0.0, 0.0, 0.0), Waypoint::new(1.0, 0.0, 0.0)],
            start: ts(0),
            end: ts(30),
            constraints: MissionConstraints::default(),
        };
        assert_eq!(mission.duration_s(), 30.0);
        assert!(mission.validate().is_ok());
    }
}
