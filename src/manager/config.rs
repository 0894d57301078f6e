//! Session manager configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default interval between validation sweeps (1 hour), in milliseconds.
pub const DEFAULT_VALIDATION_INTERVAL_MS: u64 = 60 * 60 * 1000;

/// Validating session manager configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionManagerConfig {
    /// Gate for lazy activation of the background validation scheduler.
    /// When false, no scheduler is ever started and expired sessions are
    /// only discovered on read.
    #[serde(default = "default_scheduler_enabled")]
    pub scheduler_enabled: bool,

    /// Interval between validation sweeps in milliseconds. Passed to the
    /// default scheduler when none is supplied explicitly.
    #[serde(default = "default_validation_interval")]
    pub validation_interval_ms: u64,
}

fn default_scheduler_enabled() -> bool {
    true
}

fn default_validation_interval() -> u64 {
    DEFAULT_VALIDATION_INTERVAL_MS
}

impl Default for SessionManagerConfig {
    fn default() -> Self {
        Self {
            scheduler_enabled: default_scheduler_enabled(),
            validation_interval_ms: default_validation_interval(),
        }
    }
}

impl SessionManagerConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.validation_interval_ms == 0 {
            return Err("validation_interval_ms must be greater than zero".to_string());
        }
        Ok(())
    }

    /// Sweep interval as a `Duration`.
    pub fn validation_interval(&self) -> Duration {
        Duration::from_millis(self.validation_interval_ms)
    }
}
