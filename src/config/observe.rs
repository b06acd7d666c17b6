use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_MAX_SERVER_OBSERVES;
use crate::constants::DEFAULT_NOTIFICATION_CHECK_INTERVAL_COUNT;
use crate::constants::DEFAULT_NOTIFICATION_CHECK_INTERVAL_TIME_IN_MS;
use crate::Error;
use crate::Result;

/// Parameters of server side observe relations
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ObserveConfig {
    /// Interval after which a NON notification is sent as CON to check,
    /// that the client is still interested.
    #[serde(default = "default_check_interval_time")]
    pub notification_check_interval_time_in_ms: u64,

    /// Number of NON notifications after which one is sent as CON to check,
    /// that the client is still interested.
    #[serde(default = "default_check_interval_count")]
    pub notification_check_interval_count: u32,

    /// Maximum number of observe relations of this server, `0` for unlimited
    #[serde(default = "default_max_server_observes")]
    pub max_server_observes: usize,
}

impl Default for ObserveConfig {
    fn default() -> Self {
        Self {
            notification_check_interval_time_in_ms: default_check_interval_time(),
            notification_check_interval_count: default_check_interval_count(),
            max_server_observes: default_max_server_observes(),
        }
    }
}

impl ObserveConfig {
    pub fn check_interval_time(&self) -> Duration {
        Duration::from_millis(self.notification_check_interval_time_in_ms)
    }

    /// Validates observe configuration
    /// # Errors
    /// Returns `Error::InvalidConfig` when the check interval count is 0
    pub fn validate(&self) -> Result<()> {
        if self.notification_check_interval_count == 0 {
            return Err(Error::InvalidConfig(
                "notification_check_interval_count must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

fn default_check_interval_time() -> u64 {
    DEFAULT_NOTIFICATION_CHECK_INTERVAL_TIME_IN_MS
}
fn default_check_interval_count() -> u32 {
    DEFAULT_NOTIFICATION_CHECK_INTERVAL_COUNT
}
fn default_max_server_observes() -> usize {
    DEFAULT_MAX_SERVER_OBSERVES
}
