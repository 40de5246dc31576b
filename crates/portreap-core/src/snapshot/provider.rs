//! Snapshot providers.
//!
//! A provider returns the raw connection table for one port. It is called
//! synchronously once per cycle; a hang blocks the cycle.

use std::process::Command;

use portreap_common::constants::SS_BINARY;
use portreap_common::error::{PortreapError, Result};

/// Source of the raw connection table.
pub trait SnapshotProvider: Send + Sync {
    /// Returns the current table as text, one connection per line.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be obtained. The caller aborts
    /// the current cycle and leaves tracked state untouched.
    fn fetch(&self) -> Result<String>;
}

/// Enumerates connections with `ss -tnpeH src :<port>`.
#[derive(Debug, Clone)]
pub struct SsSnapshotProvider {
    port: u16,
}

impl SsSnapshotProvider {
    /// Creates a provider filtering on the given local source port.
    #[must_use]
    pub const fn new(port: u16) -> Self {
        Self { port }
    }

    /// Arguments passed to `ss`.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        vec![
            "-tnpeH".into(),
            "src".into(),
            format!(":{}", self.port),
        ]
    }
}

impl SnapshotProvider for SsSnapshotProvider {
    fn fetch(&self) -> Result<String> {
        tracing::debug!(port = self.port, "listing connections");
        let output = Command::new(SS_BINARY)
            .args(self.args())
            .output()
            .map_err(|e| PortreapError::Command {
                program: SS_BINARY,
                source: e,
            })?;

        if !output.status.success() {
            return Err(PortreapError::Snapshot {
                message: format!(
                    "{SS_BINARY} exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
