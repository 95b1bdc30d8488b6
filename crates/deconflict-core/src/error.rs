//! Error types for mission deconfliction.

use thiserror::Error;

/// Malformed trajectory data or sampling arguments.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrajectoryError {
    #[error("times and positions length mismatch ({times} times, {positions} positions)")]
    LengthMismatch { times: usize, positions: usize },

    #[error("need at least 2 points to build a trajectory, got {0}")]
    TooFewPoints(usize),

    #[error("times must be strictly increasing (index {index}: {previous} then {current})")]
    NonIncreasingTimes {
        index: usize,
        previous: f64,
        current: f64,
    },

    #[error("non-finite {0} value in trajectory input")]
    NonFiniteValue(&'static str),

    #[error("sampling step must be positive, got {0}")]
    NonPositiveStep(f64),

    #[error("sampling grid of {steps} points exceeds the limit of {max}")]
    GridTooLarge { steps: f64, max: usize },

    #[error("invalid time range [{start}, {end}]")]
    InvalidTimeRange { start: f64, end: f64 },

    #[error("only linear interpolation is supported, got {0:?}")]
    UnsupportedMethod(String),
}

/// Ambiguous or missing timing information.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimingError {
    #[error("either all or none of the waypoints must have t set")]
    MixedTimestamps,

    #[error("mission window is required when waypoints have no times")]
    MissingWindow,

    #[error("mission window duration must be positive, got {0} s")]
    NonPositiveWindow(f64),
}

/// Mission-level constraint violations. Never reported as a conflict.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstraintError {
    #[error("required speed {required:.3} m/s exceeds max_speed_mps {max:.3} m/s")]
    SpeedExceeded { required: f64, max: f64 },
}

#[derive(Error, Debug)]
pub enum DeconflictError {
    #[error("Trajectory error: {0}")]
    Trajectory(#[from] TrajectoryError),

    #[error("Timing error: {0}")]
    Timing(#[from] TimingError),

    #[error("Constraint violation: {0}")]
    Constraint(#[from] ConstraintError),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DeconflictError {
    /// Short machine-readable category, used by the HTTP surface.
    pub fn kind(&self) -> &'static str {
        match self {
            DeconflictError::Trajectory(_) => "trajectory",
            DeconflictError::Timing(_) => "timing",
            DeconflictError::Constraint(_) => "constraint",
            DeconflictError::Input(_) => "input",
            DeconflictError::Io(_) => "io",
            DeconflictError::Json(_) => "json",
        }
    }
}

pub type Result<T> = std::result::Result<T, DeconflictError>;
