//! CLI command definitions and dispatch.

pub mod check;
pub mod scan;
pub mod watch;

use clap::{Parser, Subcommand};

/// portreap — reclaim long-lived TCP connections on a local port.
#[derive(Parser, Debug)]
#[command(name = "portreap", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Track connections and kill the ones open too long (requires root).
    Watch(watch::WatchArgs),
    /// List the current connections on a port once, without tracking.
    Scan(scan::ScanArgs),
    /// Verify platform, `ss` availability, and privileges.
    Check(check::CheckArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Watch(args) => watch::execute(&args),
        Command::Scan(args) => scan::execute(&args),
        Command::Check(args) => check::execute(&args),
    }
}
