//! Startup precondition checks.
//!
//! Run once before the first cycle. A failure here is fatal; nothing is
//! re-checked while the loop is running.

use std::path::PathBuf;

use nix::unistd::geteuid;
use portreap_common::constants::SS_BINARY;
use portreap_common::error::{PortreapError, Result};

/// What the preflight checks found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// Resolved path of the `ss` binary.
    pub ss_path: PathBuf,
    /// Effective UID of this process.
    pub euid: u32,
}

/// Fails unless running on Linux.
///
/// # Errors
///
/// Returns [`PortreapError::Unsupported`] on any other OS.
pub fn check_platform() -> Result<()> {
    if cfg!(target_os = "linux") {
        return Ok(());
    }
    Err(PortreapError::Unsupported {
        message: format!(
            "socket termination requires Linux, current OS: {}",
            std::env::consts::OS
        ),
    })
}

/// Resolves `ss` on `PATH`.
///
/// # Errors
///
/// Returns [`PortreapError::NotFound`] with an install hint.
pub fn locate_ss() -> Result<PathBuf> {
    which::which(SS_BINARY).map_err(|_| PortreapError::NotFound {
        kind: "ss utility",
        id: format!("{SS_BINARY} in PATH, install the iproute2 package"),
    })
}

/// Fails unless the effective UID is 0.
///
/// # Errors
///
/// Returns [`PortreapError::PermissionDenied`] naming the current UID.
pub fn check_root() -> Result<()> {
    let euid = geteuid();
    if euid.is_root() {
        return Ok(());
    }
    Err(PortreapError::PermissionDenied {
        message: format!("must run as root (sudo), current UID: {euid}"),
    })
}

/// Runs every check in order: platform, `ss` binary, then privileges when
/// `require_root` is set.
///
/// # Errors
///
/// Returns the first failing check's error.
pub fn check_environment(require_root: bool) -> Result<Environment> {
    check_platform()?;
    let ss_path = locate_ss()?;
    if require_root {
        check_root()?;
    }
    let env = Environment {
        ss_path,
        euid: geteuid().as_raw(),
    };
    tracing::debug!(ss = %env.ss_path.display(), euid = env.euid, "preflight passed");
    Ok(env)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_check_matches_target() {
        assert_eq!(check_platform().is_ok(), cfg!(target_os = "linux"));
    }

    #[test]
    fn root_check_matches_euid() {
        assert_eq!(check_root().is_ok(), geteuid().is_root());
    }

    #[test]
    fn environment_without_root_matches_ss_lookup() {
        let result = check_environment(false);
        if cfg!(target_os = "linux") {
            assert_eq!(result.is_ok(), which::which(SS_BINARY).is_ok());
        } else {
            assert!(result.is_err());
        }
    }
}
