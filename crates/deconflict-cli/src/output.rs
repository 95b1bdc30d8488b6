//! Console rendering of mission reports.

use deconflict_core::{MissionReport, MissionStatus};

/// Headline printed for a finished analysis.
pub fn headline(status: MissionStatus) -> &'static str {
    match status {
        MissionStatus::Clear => "CLEAR",
        MissionStatus::Conflict => "CONFLICT DETECTED",
    }
}

/// Human-readable lines for a report: headline, count, one line per conflict.
pub fn render_report(report: &MissionReport) -> Vec<String> {
    let mut lines = vec![headline(report.status).to_string()];
    if report.is_clear() {
        return lines;
    }

    lines.push(format!("Conflicts found: {}", report.conflicts.len()));
    for conflict in &report.conflicts {
        lines.push(format!(
            "  {} at {}: {:.2} m",
            conflict.flight_id, conflict.time_of_min, conflict.min_distance_m
        ));
    }
    if let Some(closest) = report.closest() {
        lines.push(format!(
            "Closest approach: {:.2} m with {} at {}",
            closest.min_distance_m, closest.flight_id, closest.time_of_min
        ));
    }
    lines
}
