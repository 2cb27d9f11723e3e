//! Client behaviour knobs.

use crate::UnknownStatePolicy;
use portal_session::{LoginCheck, PortalEndpoints};
use std::time::Duration;

/// Default delay between state checks while waiting for a bolt to move.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default overall wait after a lock or unlock command.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(20);

/// Convergence polling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }
}

/// Options shared by every lock controller and the lock directory.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub endpoints: PortalEndpoints,
    pub login_check: LoginCheck,
    pub unknown_state: UnknownStatePolicy,
    pub poll: PollConfig,
}

impl ClientOptions {
    pub fn with_endpoints(mut self, endpoints: PortalEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_login_check(mut self, login_check: LoginCheck) -> Self {
        self.login_check = login_check;
        self
    }

    pub fn with_unknown_state(mut self, unknown_state: UnknownStatePolicy) -> Self {
        self.unknown_state = unknown_state;
        self
    }
}
