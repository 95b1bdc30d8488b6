//! Check a primary mission against simulated flights.
//!
//! Usage:
//!   cargo run -p deconflict-cli --bin deconflict -- \
//!     --primary data/sample_primary_mission.json \
//!     --sim data/sample_simulated_flights.json --buffer 50 --out report.json

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use deconflict_cli::{init_logging, output};
use deconflict_core::{analyze_mission, save_report, SafetyRules};

#[derive(Parser, Debug)]
#[command(author, version, about = "UAV mission deconfliction", long_about = None)]
struct Args {
    /// Path to the primary mission JSON file
    #[arg(long)]
    primary: PathBuf,

    /// Path to the simulated flights JSON file
    #[arg(long)]
    sim: PathBuf,

    /// Safety buffer in meters
    #[arg(long, default_value_t = 50.0)]
    buffer: f64,

    /// Sampling step in seconds
    #[arg(long, default_value_t = 1.0)]
    dt: f64,

    /// Include altitude in separation distance
    #[arg(long = "use-3d")]
    use_3d: bool,

    /// Optional path to save the conflict report JSON
    #[arg(long)]
    out: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let rules = SafetyRules::new(args.buffer, args.dt, args.use_3d);
    let (_status, report) = analyze_mission(&args.primary, &args.sim, &rules)
        .context("mission analysis failed")?;

    for line in output::render_report(&report) {
        println!("{line}");
    }

    if let Some(out) = &args.out {
        save_report(&report, out).with_context(|| format!("writing report to {}", out.display()))?;
        tracing::info!(path = %out.display(), "report saved");
    }

    Ok(())
}
