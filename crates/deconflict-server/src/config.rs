//! Server configuration from environment.

use std::env;

use deconflict_core::SafetyRules;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    /// Rules applied when a request does not override them
    pub default_rules: SafetyRules,
    /// Emit JSON log lines instead of the human format
    pub log_json: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = SafetyRules::default();
        Self {
            server_port: env_parse("DECONFLICT_PORT").unwrap_or(8000),
            default_rules: SafetyRules::new(
                env_parse("DECONFLICT_DEFAULT_BUFFER_M").unwrap_or(defaults.safety_buffer_m),
                env_parse("DECONFLICT_DEFAULT_DT_S").unwrap_or(defaults.sample_step_s),
                env_parse("DECONFLICT_USE_3D").unwrap_or(defaults.use_3d),
            ),
            log_json: env_parse("DECONFLICT_LOG_JSON").unwrap_or(false),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8000,
            default_rules: SafetyRules::default(),
            log_json: false,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}
