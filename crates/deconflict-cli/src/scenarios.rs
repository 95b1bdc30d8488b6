//! Batch scenario runner.
//!
//! A scenario file names the mission inputs and detection settings:
//! ```json
//! {
//!   "primary_mission_file": "data/sample_primary_mission.json",
//!   "simulated_flights_file": "data/sample_simulated_flights.json",
//!   "buffer": 50.0,
//!   "dt": 1.0,
//!   "use_3d": false,
//!   "status": "conflict"
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use deconflict_core::{analyze_mission, save_report, MissionReport, MissionStatus, SafetyRules};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub primary_mission_file: PathBuf,
    pub simulated_flights_file: PathBuf,
    #[serde(default = "default_buffer")]
    pub buffer: f64,
    #[serde(default = "default_dt")]
    pub dt: f64,
    #[serde(default)]
    pub use_3d: bool,
    /// Expected outcome, if the scenario declares one
    #[serde(default)]
    pub status: Option<String>,
}

fn default_buffer() -> f64 {
    50.0
}

fn default_dt() -> f64 {
    1.0
}

impl Scenario {
    pub fn rules(&self) -> SafetyRules {
        SafetyRules::new(self.buffer, self.dt, self.use_3d)
    }
}

/// One row of the run summary.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioSummary {
    pub scenario: String,
    pub status: Option<MissionStatus>,
    pub expected_status: Option<String>,
    pub matches_expected: Option<bool>,
    pub conflict_count: usize,
    pub min_distance_m: Option<f64>,
    pub time_of_min: Option<String>,
    pub error: Option<String>,
}

impl ScenarioSummary {
    fn from_report(name: &str, scenario: &Scenario, report: &MissionReport) -> Self {
        let closest = report.closest();
        Self {
            scenario: name.to_string(),
            status: Some(report.status),
            expected_status: scenario.status.clone(),
            matches_expected: scenario
                .status
                .as_deref()
                .map(|expected| expected.eq_ignore_ascii_case(&report.status.to_string())),
            conflict_count: report.conflicts.len(),
            min_distance_m: closest.map(|c| c.min_distance_m),
            time_of_min: closest.map(|c| c.time_of_min.clone()),
            error: None,
        }
    }

    fn from_error(name: &str, scenario: Option<&Scenario>, err: &anyhow::Error) -> Self {
        Self {
            scenario: name.to_string(),
            status: None,
            expected_status: scenario.and_then(|s| s.status.clone()),
            matches_expected: scenario.and_then(|s| s.status.as_ref()).map(|_| false),
            conflict_count: 0,
            min_distance_m: None,
            time_of_min: None,
            error: Some(format!("{err:#}")),
        }
    }
}

pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading scenario {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing scenario {}", path.display()))
}

/// Run one scenario, resolving its input paths against `root`, and write
/// `<out_dir>/<name>/report.json`.
pub fn run_scenario(name: &str, scenario: &Scenario, root: &Path, out_dir: &Path) -> Result<MissionReport> {
    let (_, report) = analyze_mission(
        root.join(&scenario.primary_mission_file),
        root.join(&scenario.simulated_flights_file),
        &scenario.rules(),
    )
    .with_context(|| format!("analyzing scenario {name}"))?;

    let report_path = out_dir.join(name).join("report.json");
    save_report(&report, &report_path)
        .with_context(|| format!("writing {}", report_path.display()))?;
    Ok(report)
}

/// Run every `*.json` scenario in `dir` (sorted by file name) and write
/// `<out_dir>/summary.json`. Failing scenarios are recorded, not fatal.
pub fn run_all(dir: &Path, root: &Path, out_dir: &Path) -> Result<Vec<ScenarioSummary>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("listing scenarios in {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    let mut summaries = Vec::with_capacity(files.len());
    for path in files {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let summary = match load_scenario(&path) {
            Ok(scenario) => match run_scenario(&name, &scenario, root, out_dir) {
                Ok(report) => ScenarioSummary::from_report(&name, &scenario, &report),
                Err(err) => {
                    tracing::warn!(scenario = %name, error = %format!("{err:#}"), "scenario failed");
                    ScenarioSummary::from_error(&name, Some(&scenario), &err)
                }
            },
            Err(err) => {
                tracing::warn!(scenario = %name, error = %format!("{err:#}"), "invalid scenario file");
                ScenarioSummary::from_error(&name, None, &err)
            }
        };
        tracing::info!(scenario = %name, status = ?summary.status, "scenario done");
        summaries.push(summary);
    }

    save_report(&summaries, out_dir.join("summary.json")).context("writing summary")?;
    Ok(summaries)
}
