//! CLI command implementations.

mod locks;

pub use locks::{cycle, list, lock, status, unlock};

use anyhow::{bail, Result};
use kevo_config_and_utils::Config;
use kevo_locks::{ClientOptions, Credentials, Transport};
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

/// Everything a command needs to talk to the portal.
pub struct Context {
    pub transport: Arc<dyn Transport>,
    pub options: ClientOptions,
    pub credentials: Credentials,
}

impl Context {
    /// Build from configuration, prompting for whatever credentials are missing.
    pub fn new(config: &Config, username: Option<String>) -> Result<Self> {
        Ok(Self {
            transport: Arc::new(config.transport()),
            options: config.client_options()?,
            credentials: prompt_credentials(username)?,
        })
    }

    /// Override the wait after lock/unlock commands.
    pub fn with_wait_timeout(mut self, timeout_secs: Option<u64>) -> Self {
        if let Some(secs) = timeout_secs {
            self.options.poll.timeout = Duration::from_secs(secs);
        }
        self
    }
}

/// Read the username (unless given) and the password from the terminal.
fn prompt_credentials(username: Option<String>) -> Result<Credentials> {
    let username = match username.filter(|u| !u.trim().is_empty()) {
        Some(username) => username,
        None => {
            print!("Username: ");
            io::stdout().flush()?;
            let mut username = String::new();
            io::stdin().read_line(&mut username)?;
            username.trim().to_string()
        }
    };

    if username.is_empty() {
        bail!("Username is required");
    }

    // Read password without echo
    let password = rpassword::prompt_password("Password: ")?;

    if password.is_empty() {
        bail!("Password is required");
    }

    Ok(Credentials::new(username, password))
}
