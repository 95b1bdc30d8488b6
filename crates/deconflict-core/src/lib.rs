//! Spatio-temporal deconfliction of a planned drone mission against the
//! known flight paths of other drones.

pub mod analyzer;
pub mod builder;
pub mod conflict;
pub mod error;
pub mod loader;
pub mod models;
pub mod rules;
pub mod spatial;
pub mod time;
pub mod trajectory;

pub use analyzer::{analyze, analyze_mission};
pub use builder::{interpolate_from_waypoints, BuildOptions, InterpolationMethod, WaypointSchedule};
pub use conflict::{
    check_spatiotemporal_conflicts, Conflict, ConflictDetector, ConflictPosition, MissionReport,
    MissionStatus,
};
pub use error::{ConstraintError, DeconflictError, Result, TimingError, TrajectoryError};
pub use loader::{load_primary, load_simulated_flights, save_report};
pub use models::{MissionConstraints, MissionRequest, Position, PrimaryMission, SimulatedFlight, Waypoint};
pub use rules::SafetyRules;
pub use spatial::{check_spatial_conflict, closest_approach, ClosestApproach, SpatialConflict};
pub use trajectory::{Trajectory, MAX_SAMPLES, PRIMARY_FLIGHT_ID};
