//! Coordinator configuration.

use std::time::Duration;

/// Timing configuration for the coordinator's polling loops.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// How often to poll the router and child tables while attached.
    pub topology_interval: Duration,
    /// How often to sweep for expired joiner sessions while attached.
    pub joiner_poll_interval: Duration,
    /// How long a joiner session may run after `joiner_start` before it
    /// expires.
    pub joiner_session_timeout: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        CoordinatorConfig {
            topology_interval: Duration::from_secs(30),
            joiner_poll_interval: Duration::from_secs(10),
            joiner_session_timeout: Duration::from_secs(300),
        }
    }
}
