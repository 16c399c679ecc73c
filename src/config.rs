use crate::types::NetworkId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Planner/executor tuning knobs.
///
/// The defaults match the observed wallet behavior: poll the active
/// network once a second, give up after ten attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Network the root name lives on; the plan starts and ends here.
    pub home_network: NetworkId,

    /// Delay between active-network polls while waiting for the wallet
    /// to finish a requested switch.
    #[serde(default = "default_switch_poll_ms")]
    pub switch_poll_ms: u64,

    /// Polls before a network switch is reported as timed out.
    #[serde(default = "default_switch_max_attempts")]
    pub switch_max_attempts: u32,
}

fn default_switch_poll_ms() -> u64 {
    1_000
}

fn default_switch_max_attempts() -> u32 {
    10
}

impl PlannerConfig {
    pub fn new(home_network: NetworkId) -> Self {
        Self {
            home_network,
            switch_poll_ms: default_switch_poll_ms(),
            switch_max_attempts: default_switch_max_attempts(),
        }
    }

    pub fn with_switch_poll(mut self, poll: Duration) -> Self {
        self.switch_poll_ms = poll.as_millis() as u64;
        self
    }

    pub fn with_switch_max_attempts(mut self, attempts: u32) -> Self {
        self.switch_max_attempts = attempts;
        self
    }

    pub fn switch_poll(&self) -> Duration {
        Duration::from_millis(self.switch_poll_ms)
    }
}
