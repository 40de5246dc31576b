//! Formatted output helpers for CLI commands.
//!
//! Renders the startup banner, the per-cycle log, and the `scan` table.

use chrono::TimeDelta;
use portreap_common::config::MonitorConfig;
use portreap_common::constants::APP_NAME;
use portreap_core::reconciler::CycleReport;
use portreap_core::snapshot::ObservedRecord;

/// Formats a duration as a compact age (e.g., "2h 05m").
#[must_use]
pub fn format_age(age: TimeDelta) -> String {
    let secs = age.num_seconds().max(0);
    let (hours, minutes) = (secs / 3600, (secs % 3600) / 60);
    if hours > 0 {
        format!("{hours}h {minutes:02}m")
    } else if minutes > 0 {
        format!("{minutes}m")
    } else {
        format!("{secs}s")
    }
}

/// Prints the settings the monitor starts with.
pub fn print_banner(config: &MonitorConfig) {
    println!("{APP_NAME}: monitoring started on port {}", config.port);
    println!("  Check interval:        {} min", config.check_interval_min);
    println!("  Max active duration:   {} min", config.max_active_min);
    println!("  Max inactive duration: {} min", config.max_inactive_min);
    if config.dry_run {
        println!("  Dry run: kills are logged, not executed");
    }
}

/// Renders the human-readable log of one cycle.
#[must_use]
pub fn cycle_lines(report: &CycleReport) -> Vec<String> {
    let mut lines = vec![format!(
        "--- Monitoring cycle: {} ---",
        report.now.to_rfc2822()
    )];
    for entry in &report.new {
        lines.push(format!(
            " + New connection tracked (inode {}): {}",
            entry.id, entry.endpoints
        ));
    }
    for kill in &report.killed {
        lines.push(format!(
            " x Killing active connection (age {}, inode {}): {}",
            format_age(report.now - kill.entry.first_seen),
            kill.entry.id,
            kill.entry.endpoints
        ));
        match &kill.error {
            None => lines.push(format!("   -> kill command executed for {}", kill.entry.endpoints)),
            Some(e) => lines.push(format!("   !! {e}")),
        }
    }
    for entry in &report.expired {
        lines.push(format!(
            " - Removing inactive connection (idle {}, inode {}): {}",
            format_age(report.now - entry.last_seen),
            entry.id,
            entry.endpoints
        ));
    }
    lines.push(format!(
        "Observed {}, total tracked connections: {}",
        report.observed, report.tracked
    ));
    lines
}

/// Prints the log of one cycle to stdout.
pub fn print_cycle(report: &CycleReport) {
    println!();
    for line in cycle_lines(report) {
        println!("{line}");
    }
}

/// Renders observed records as an aligned table with a header row.
#[must_use]
pub fn record_table(records: &[ObservedRecord]) -> Vec<String> {
    let mut lines = vec![format!("{:<12} {:<45} {:<45}", "INODE", "LOCAL", "REMOTE")];
    for r in records {
        lines.push(format!(
            "{:<12} {:<45} {:<45}",
            r.id, r.endpoints.local, r.endpoints.remote
        ));
    }
    lines
}
