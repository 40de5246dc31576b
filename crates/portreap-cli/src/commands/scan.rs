//! `portreap scan` — List current connections on a port once.

use clap::Args;
use portreap_common::constants::DEFAULT_PORT;
use portreap_core::preflight;
use portreap_core::snapshot::{self, provider::SsSnapshotProvider};

use crate::output;

/// Arguments for the `scan` command.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Source port to list.
    #[arg(long, env = "PORTREAP_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Print records as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `scan` command.
///
/// # Errors
///
/// Returns an error if `ss` is unavailable or exits unsuccessfully.
pub fn execute(args: &ScanArgs) -> anyhow::Result<()> {
    let _ = preflight::check_environment(false)?;
    let records = snapshot::observe(&SsSnapshotProvider::new(args.port))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("No connections on port {}.", args.port);
        return Ok(());
    }
    for line in output::record_table(&records) {
        println!("{line}");
    }
    Ok(())
}
