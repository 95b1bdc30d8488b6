//! Run every scenario in a directory and write a summary.
//!
//! Usage:
//!   cargo run -p deconflict-cli --bin run_scenarios -- --dir scenarios --out outputs

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use deconflict_cli::{init_logging, scenarios};

#[derive(Parser, Debug)]
#[command(author, version, about = "Batch-run deconfliction scenarios")]
struct Args {
    /// Directory holding scenario JSON files
    #[arg(long, default_value = "scenarios")]
    dir: PathBuf,

    /// Directory that scenario input paths are relative to
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Output directory for reports and summary.json
    #[arg(long, default_value = "outputs")]
    out: PathBuf,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let summaries = scenarios::run_all(&args.dir, &args.root, &args.out)?;

    let mut mismatches = 0;
    for summary in &summaries {
        let status = summary
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "error".to_string());
        let mark = match summary.matches_expected {
            Some(true) => "ok",
            Some(false) => {
                mismatches += 1;
                "MISMATCH"
            }
            None => "-",
        };
        println!(
            "{:<32} {:<9} conflicts={:<5} {}",
            summary.scenario, status, summary.conflict_count, mark
        );
    }
    println!("Summary written to {}", args.out.join("summary.json").display());

    if mismatches > 0 {
        anyhow::bail!("{mismatches} scenario(s) did not match their expected status");
    }
    Ok(())
}
