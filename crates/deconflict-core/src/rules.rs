//! Safety rules and sampling settings for conflict detection.

use serde::{Deserialize, Serialize};

use crate::error::{DeconflictError, Result, TrajectoryError};

/// Configuration for a detection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyRules {
    /// Minimum allowed separation in meters (conflict when strictly below)
    #[serde(default = "default_buffer")]
    pub safety_buffer_m: f64,
    /// Sampling step across the temporal overlap, in seconds
    #[serde(default = "default_step")]
    pub sample_step_s: f64,
    /// Include altitude in the separation distance
    #[serde(default)]
    pub use_3d: bool,
}

fn default_buffer() -> f64 {
    50.0
}

fn default_step() -> f64 {
    1.0
}

impl Default for SafetyRules {
    fn default() -> Self {
        Self {
            safety_buffer_m: default_buffer(),
            sample_step_s: default_step(),
            use_3d: false,
        }
    }
}

impl SafetyRules {
    pub fn new(safety_buffer_m: f64, sample_step_s: f64, use_3d: bool) -> Self {
        Self {
            safety_buffer_m,
            sample_step_s,
            use_3d,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.safety_buffer_m.is_finite() || self.safety_buffer_m < 0.0 {
            return Err(DeconflictError::Input(format!(
                "safety buffer must be a non-negative number, got {}",
                self.safety_buffer_m
            )));
        }
        if !self.sample_step_s.is_finite() || self.sample_step_s <= 0.0 {
            return Err(TrajectoryError::NonPositiveStep(self.sample_step_s).into());
        }
        Ok(())
    }
}
