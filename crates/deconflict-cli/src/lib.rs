//! Deconflict CLI - command line tools for mission deconfliction.
//!
//! This crate provides the binaries:
//! - deconflict: check one primary mission against simulated flights
//! - run_scenarios: batch-run every scenario file in a directory

pub mod logging;
pub mod output;
pub mod scenarios;

pub use logging::init_logging;
