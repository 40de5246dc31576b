//! `portreap check` — Verify the host can run the monitor.

use clap::Args;
use portreap_common::error::Result;
use portreap_core::preflight;

/// Arguments for the `check` command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Skip the root privilege check (enough for `scan` and `--dry-run`).
    #[arg(long)]
    pub no_root: bool,
}

/// Executes the `check` command.
///
/// Runs every check and reports each result, then fails if any did.
///
/// # Errors
///
/// Returns an error if at least one check failed.
pub fn execute(args: &CheckArgs) -> anyhow::Result<()> {
    let mut checks: Vec<(&str, Result<String>)> = vec![
        (
            "platform",
            preflight::check_platform().map(|()| std::env::consts::OS.to_string()),
        ),
        (
            "ss binary",
            preflight::locate_ss().map(|path| path.display().to_string()),
        ),
    ];
    if !args.no_root {
        checks.push((
            "root privileges",
            preflight::check_root().map(|()| "euid 0".to_string()),
        ));
    }

    let mut failed = 0_usize;
    for (name, result) in &checks {
        match result {
            Ok(detail) => println!("[ok]   {name} ({detail})"),
            Err(e) => {
                failed += 1;
                println!("[fail] {name}: {e}");
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} preflight check(s) failed");
    }
    println!("All checks passed.");
    Ok(())
}
