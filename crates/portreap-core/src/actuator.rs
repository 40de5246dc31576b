//! Socket termination.
//!
//! [`terminate_entry`] is the only path from a tracked entry to a kill. It
//! validates the endpoint pair, invokes the actuator once, and reports the
//! outcome. It never retries.

use std::process::Command;

use portreap_common::constants::SS_BINARY;
use portreap_common::error::{PortreapError, Result};
use portreap_common::types::EndpointPair;

use crate::table::TrackedEntry;

/// External action that closes a socket identified by its address pair.
pub trait TerminationActuator: Send + Sync {
    /// Terminates the connection between `endpoints.local` and
    /// `endpoints.remote`.
    ///
    /// # Errors
    ///
    /// Returns [`PortreapError::Termination`] or [`PortreapError::Command`]
    /// with diagnostic output when the kill could not be performed.
    fn terminate(&self, endpoints: &EndpointPair) -> Result<()>;
}

/// Kills sockets with `ss --kill dst <remote> src <local>`.
///
/// Requires `CONFIG_INET_DIAG_DESTROY` in the kernel and root privileges.
#[derive(Debug, Clone, Copy, Default)]
pub struct SsKillActuator;

impl SsKillActuator {
    /// Arguments passed to `ss` for the given pair.
    #[must_use]
    pub fn args(endpoints: &EndpointPair) -> [&str; 5] {
        ["--kill", "dst", &endpoints.remote, "src", &endpoints.local]
    }
}

impl TerminationActuator for SsKillActuator {
    fn terminate(&self, endpoints: &EndpointPair) -> Result<()> {
        let output = Command::new(SS_BINARY)
            .args(Self::args(endpoints))
            .output()
            .map_err(|e| PortreapError::Command {
                program: SS_BINARY,
                source: e,
            })?;

        if output.status.success() {
            return Ok(());
        }
        let mut diagnostics = String::from_utf8_lossy(&output.stdout).into_owned();
        diagnostics.push_str(&String::from_utf8_lossy(&output.stderr));
        Err(PortreapError::Termination {
            target: endpoints.to_string(),
            message: format!("{} exited with {}: {}", SS_BINARY, output.status, diagnostics.trim()),
        })
    }
}

/// Logs the kill without touching the socket.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunActuator;

impl TerminationActuator for DryRunActuator {
    fn terminate(&self, endpoints: &EndpointPair) -> Result<()> {
        tracing::info!(local = %endpoints.local, remote = %endpoints.remote, "dry run: kill skipped");
        Ok(())
    }
}

/// Issues one termination attempt for a tracked entry.
///
/// # Errors
///
/// Returns [`PortreapError::Termination`] if the endpoint pair is malformed
/// (nothing is invoked), or the actuator's error if the kill failed.
pub fn terminate_entry(actuator: &dyn TerminationActuator, entry: &TrackedEntry) -> Result<()> {
    if !entry.endpoints.is_well_formed() {
        tracing::error!(inode = %entry.id, endpoints = %entry.endpoints, "malformed endpoint pair");
        return Err(PortreapError::Termination {
            target: entry.endpoints.to_string(),
            message: "malformed endpoint pair".into(),
        });
    }

    match actuator.terminate(&entry.endpoints) {
        Ok(()) => {
            tracing::info!(inode = %entry.id, endpoints = %entry.endpoints, "kill command executed");
            Ok(())
        }
        Err(e) => {
            tracing::error!(inode = %entry.id, endpoints = %entry.endpoints, error = %e, "kill failed");
            Err(e)
        }
    }
}
