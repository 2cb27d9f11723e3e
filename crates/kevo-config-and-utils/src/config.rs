//! Configuration management for the Kevo client.
//!
//! Credentials are never part of the configuration.

use crate::{CoreError, CoreResult, Paths};
use kevo_locks::{ClientOptions, PollConfig, UnknownStatePolicy};
use portal_session::{
    AuthError, LoginCheck, PortalEndpoints, ReqwestTransport, DEFAULT_PORTAL_URL,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

const ENV_LOG_LEVEL: &str = "KEVO_LOG_LEVEL";
const ENV_PORTAL_URL: &str = "KEVO_PORTAL_URL";

/// Client configuration, read from `~/.kevo/config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Portal base URL.
    #[serde(default = "default_portal_url")]
    pub portal_url: String,
    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Delay between state checks while waiting for a bolt to move.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Overall wait after a lock or unlock command.
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,
    /// Reject logins the portal answers with the sign-in form again.
    #[serde(default = "default_true")]
    pub verify_login: bool,
    /// Fail refreshes that report a bolt state other than locked/unlocked.
    #[serde(default = "default_true")]
    pub reject_unknown_states: bool,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_portal_url() -> String {
    DEFAULT_PORTAL_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

fn default_wait_timeout_secs() -> u64 {
    20
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            portal_url: default_portal_url(),
            request_timeout_secs: default_request_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            wait_timeout_secs: default_wait_timeout_secs(),
            verify_login: true,
            reject_unknown_states: true,
        }
    }
}

impl Config {
    /// Load configuration from `paths`, falling back to defaults, then apply
    /// environment overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file, without environment overrides.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Override from `KEVO_LOG_LEVEL` and `KEVO_PORTAL_URL`. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(log_level) = non_empty(ENV_LOG_LEVEL) {
            self.log_level = log_level;
        }
        if let Some(portal_url) = non_empty(ENV_PORTAL_URL) {
            self.portal_url = portal_url;
        }
    }

    /// Check values that would otherwise fail late.
    pub fn validate(&self) -> CoreResult<()> {
        self.portal_url()?;
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(CoreError::Config(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the portal URL as a parsed URL.
    pub fn portal_url(&self) -> CoreResult<Url> {
        Url::parse(&self.portal_url).map_err(CoreError::from)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(self.poll_interval_ms),
            timeout: Duration::from_secs(self.wait_timeout_secs),
        }
    }

    /// Options for lock controllers and the lock directory.
    pub fn client_options(&self) -> CoreResult<ClientOptions> {
        let endpoints = PortalEndpoints::new(&self.portal_url).map_err(|e| match e {
            AuthError::InvalidUrl(e) => CoreError::InvalidUrl(e),
            other => CoreError::Config(other.to_string()),
        })?;

        Ok(ClientOptions {
            endpoints,
            login_check: if self.verify_login {
                LoginCheck::Verify
            } else {
                LoginCheck::FireAndForget
            },
            unknown_state: if self.reject_unknown_states {
                UnknownStatePolicy::Reject
            } else {
                UnknownStatePolicy::PassThrough
            },
            poll: self.poll_config(),
        })
    }

    /// HTTP transport with the configured request timeout.
    pub fn transport(&self) -> ReqwestTransport {
        ReqwestTransport::with_request_timeout(self.request_timeout())
    }
}
