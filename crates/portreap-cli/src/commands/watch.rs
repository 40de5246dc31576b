//! `portreap watch` — Track connections and kill the long-lived ones.

use std::sync::mpsc;

use clap::Args;
use portreap_common::config::MonitorConfig;
use portreap_common::constants::{
    DEFAULT_CHECK_INTERVAL_MIN, DEFAULT_MAX_ACTIVE_MIN, DEFAULT_MAX_INACTIVE_MIN, DEFAULT_PORT,
};
use portreap_core::monitor::Monitor;
use portreap_core::preflight;
use portreap_core::scheduler::Scheduler;

use crate::output;

/// Arguments for the `watch` command.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Source port to monitor.
    #[arg(long, env = "PORTREAP_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Minutes between checks.
    #[arg(
        long,
        env = "PORTREAP_CHECK_INTERVAL",
        default_value_t = DEFAULT_CHECK_INTERVAL_MIN,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub check_interval: u32,

    /// Minutes a connection may stay active before it is killed.
    #[arg(
        long,
        env = "PORTREAP_MAX_ACTIVE",
        default_value_t = DEFAULT_MAX_ACTIVE_MIN,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_active: u32,

    /// Minutes an unseen connection stays tracked before it is forgotten.
    #[arg(
        long,
        env = "PORTREAP_MAX_INACTIVE",
        default_value_t = DEFAULT_MAX_INACTIVE_MIN,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_inactive: u32,

    /// Log kills instead of executing them (does not require root).
    #[arg(long, env = "PORTREAP_DRY_RUN")]
    pub dry_run: bool,

    /// Run a single cycle and exit.
    #[arg(long, conflicts_with = "cycles")]
    pub once: bool,

    /// Exit after this many cycles.
    #[arg(long)]
    pub cycles: Option<u64>,
}

impl WatchArgs {
    /// Builds the monitor configuration from the parsed flags.
    pub const fn config(&self) -> MonitorConfig {
        MonitorConfig {
            port: self.port,
            check_interval_min: self.check_interval,
            max_active_min: self.max_active,
            max_inactive_min: self.max_inactive,
            dry_run: self.dry_run,
        }
    }

    const fn max_cycles(&self) -> Option<u64> {
        if self.once { Some(1) } else { self.cycles }
    }
}

/// Executes the `watch` command.
///
/// Runs the preflight checks, then cycles until Ctrl-C or the cycle limit.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, a preflight check
/// fails, or the signal handler cannot be installed. Cycle failures are
/// logged and do not end the command.
pub fn execute(args: &WatchArgs) -> anyhow::Result<()> {
    let config = args.config();
    config.validate()?;
    let _ = preflight::check_environment(!config.dry_run)?;

    output::print_banner(&config);

    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })?;

    let monitor = Monitor::new(&config);
    let mut scheduler = Scheduler::new(config.check_interval());
    if let Some(max) = args.max_cycles() {
        scheduler = scheduler.with_max_cycles(max);
    }

    let cycles = scheduler.run(&monitor, &rx, |result| {
        if let Ok(report) = result {
            output::print_cycle(report);
        }
    });

    let remaining = monitor.tracked()?;
    tracing::info!(cycles, tracked = remaining.len(), "monitoring stopped");
    for entry in &remaining {
        tracing::debug!(inode = %entry.id, endpoints = %entry.endpoints, active = entry.active, "still tracked");
    }
    Ok(())
}
