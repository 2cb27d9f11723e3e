//! kevo - command-line client for Kwikset Kevo locks on mykevo.com.

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use kevo_config_and_utils::{init_logging, Config, Paths};
use kevo_locks::KevoError;
use std::path::PathBuf;
use tracing::debug;

/// List, inspect, lock and unlock Kevo locks.
#[derive(Parser)]
#[command(name = "kevo")]
#[command(about = "Command-line client for Kwikset Kevo locks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level or filter directive; overrides the config file
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Config file (default: ~/.kevo/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also append JSONL logs to ~/.kevo/logs/kevo.jsonl
    #[arg(long, global = true)]
    log_file: bool,

    /// Portal username; prompted for when absent
    #[arg(short, long, env = "KEVO_USERNAME", global = true)]
    username: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every lock on the account
    List,

    /// Show the current state of a lock
    Status {
        /// Lock ID
        lock_id: String,
    },

    /// Lock and wait until the bolt reports locked
    Lock {
        /// Lock ID
        lock_id: String,
        /// Seconds to wait for the bolt
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Unlock and wait until the bolt reports unlocked
    Unlock {
        /// Lock ID
        lock_id: String,
        /// Seconds to wait for the bolt
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Unlock, then lock again, in one login
    Cycle {
        /// Lock ID
        lock_id: String,
    },
}

fn load_config(cli: &Cli, paths: &Paths) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = Config::load_from_file(path)?;
            config.apply_overrides(|key| std::env::var(key).ok());
            config.validate()?;
            config
        }
        None => Config::load(paths)?,
    };

    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    let paths = Paths::new()?;
    let config = load_config(&cli, &paths)?;

    init_logging(&config, &paths, cli.log_file)?;
    debug!(portal_url = %config.portal_url, "Configuration loaded");

    let ctx = commands::Context::new(&config, cli.username.clone())?;
    let format = &cli.format;

    match cli.command {
        Commands::List => commands::list(&ctx, format),
        Commands::Status { lock_id } => commands::status(&ctx, &lock_id, format),
        Commands::Lock { lock_id, timeout } => {
            commands::lock(&ctx.with_wait_timeout(timeout), &lock_id, format)
        }
        Commands::Unlock { lock_id, timeout } => {
            commands::unlock(&ctx.with_wait_timeout(timeout), &lock_id, format)
        }
        Commands::Cycle { lock_id } => commands::cycle(&ctx, &lock_id, format),
    }
}

/// Suggest a next step for failures the user can fix on their side.
fn hint(err: &anyhow::Error) -> Option<&'static str> {
    let kevo = err.downcast_ref::<KevoError>()?;
    if kevo.is_network() {
        Some("could not reach the portal; check your network connection or portal_url")
    } else if kevo.is_auth_failure() {
        Some("the portal rejected the session; check your username and password and try again")
    } else {
        None
    }
}

fn main() {
    let cli = Cli::parse();
    let format = cli.format;

    if let Err(e) = run(cli) {
        output::print_error(&format!("{:#}", e), hint(&e), &format);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_lock_with_timeout_and_global_flags() {
        let cli = Cli::try_parse_from([
            "kevo", "lock", "front-door", "--timeout", "5", "--format", "json", "-u", "alice",
        ])
        .unwrap();

        assert!(matches!(cli.format, output::OutputFormat::Json));
        assert_eq!(cli.username.as_deref(), Some("alice"));
        match cli.command {
            Commands::Lock { lock_id, timeout } => {
                assert_eq!(lock_id, "front-door");
                assert_eq!(timeout, Some(5));
            }
            _ => panic!("expected lock command"),
        }
    }

    #[test]
    fn status_requires_lock_id() {
        assert!(Cli::try_parse_from(["kevo", "status"]).is_err());
    }

    #[test]
    fn rejected_session_hints_at_credentials() {
        let err = anyhow::Error::from(KevoError::Command {
            status: 401,
            message: "not signed in".to_string(),
        })
        .context("Failed to load lock front-door");

        assert!(hint(&err).is_some_and(|h| h.contains("username and password")));
    }

    #[test]
    fn unreachable_portal_hints_at_network() {
        let err = anyhow::Error::from(KevoError::Auth(kevo_locks::AuthError::Transport(
            "connection refused".to_string(),
        )))
        .context("Failed to log in");

        assert!(hint(&err).is_some_and(|h| h.contains("portal_url")));
    }

    #[test]
    fn other_failures_have_no_hint() {
        let scrape = anyhow::Error::from(KevoError::Scrape("no lock list".to_string()))
            .context("Failed to list locks");
        assert_eq!(hint(&scrape), None);
        assert_eq!(hint(&anyhow::anyhow!("username must not be empty")), None);
    }
}
