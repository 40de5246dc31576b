//! Monitor configuration model.
//!
//! Supplied once at startup and immutable for the life of the process.

use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CHECK_INTERVAL_MIN, DEFAULT_MAX_ACTIVE_MIN, DEFAULT_MAX_INACTIVE_MIN, DEFAULT_PORT,
};
use crate::error::{PortreapError, Result};

/// Root configuration for a monitor instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Local source port whose connections are tracked.
    pub port: u16,
    /// Minutes between two monitoring cycles.
    pub check_interval_min: u32,
    /// Minutes an active connection may live before it is killed.
    pub max_active_min: u32,
    /// Minutes an unseen connection stays tracked before it is forgotten.
    pub max_inactive_min: u32,
    /// Log kills instead of executing them.
    pub dry_run: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            check_interval_min: DEFAULT_CHECK_INTERVAL_MIN,
            max_active_min: DEFAULT_MAX_ACTIVE_MIN,
            max_inactive_min: DEFAULT_MAX_INACTIVE_MIN,
            dry_run: false,
        }
    }
}

impl MonitorConfig {
    /// Checks that the port and every duration are non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`PortreapError::Config`] naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(PortreapError::Config {
                message: "port must be between 1 and 65535".into(),
            });
        }
        for (name, value) in [
            ("check-interval", self.check_interval_min),
            ("max-active", self.max_active_min),
            ("max-inactive", self.max_inactive_min),
        ] {
            if value == 0 {
                return Err(PortreapError::Config {
                    message: format!("{name} must be greater than 0 minutes"),
                });
            }
        }
        Ok(())
    }

    /// Wall-clock interval between cycles.
    #[must_use]
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.check_interval_min) * 60)
    }

    /// Maximum active lifetime before a kill.
    #[must_use]
    pub fn max_active(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.max_active_min))
    }

    /// Maximum time since last sighting before eviction.
    #[must_use]
    pub fn max_inactive(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.max_inactive_min))
    }
}
