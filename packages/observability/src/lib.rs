//! # Observability
//!
//! Logging setup shared by the Kevo crates and the `kevo` binary.
//!
//! Library code only uses `tracing` macros. The binary calls [`init_with_config`]
//! once at startup, which installs:
//!
//! - a compact human-readable layer on stderr
//! - optionally, a JSONL layer appending to a log file (one object per line)
//!
//! Field values under credential-like keys (`password`, `token`, `cookie`, ...)
//! are written as `[REDACTED]` in the JSONL output.
//!
//! ```rust,ignore
//! fn main() {
//!     observability::init_with_config(observability::LogConfig {
//!         service_name: "kevo".into(),
//!         default_level: "warn".into(),
//!         ..Default::default()
//!     })
//!     .ok();
//!
//!     tracing::info!("ready");
//! }
//! ```

mod file_writer;
mod json_layer;
mod redact;

pub use file_writer::{JsonlFileWriter, WriterFactory};
pub use json_layer::{JsonLayer, LogEntry};

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name written into every JSONL line.
    pub service_name: String,

    /// Default filter (e.g. "warn", "kevo_locks=debug").
    /// `RUST_LOG` takes precedence when set.
    pub default_level: String,

    /// JSONL log file. No file layer when `None`.
    pub log_path: Option<PathBuf>,

    /// Emit human-readable logs on stderr.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "kevo".into(),
            default_level: "warn".into(),
            log_path: None,
            also_stderr: true,
        }
    }
}

/// Errors from logging initialisation.
#[derive(Error, Debug)]
pub enum InitError {
    /// The log file or its directory could not be opened
    #[error("failed to open log file {path:?}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A global subscriber is already installed
    #[error("logging already initialised: {0}")]
    AlreadyInitialised(String),
}

/// Initialise logging with custom configuration.
pub fn init_with_config(config: LogConfig) -> Result<(), InitError> {
    let json_layer = match &config.log_path {
        Some(path) => {
            let writer = JsonlFileWriter::new(path).map_err(|source| InitError::LogFile {
                path: path.clone(),
                source,
            })?;
            Some(
                JsonLayer::new(config.service_name.clone(), WriterFactory::new(writer))
                    .with_filter(env_filter(&config.default_level)),
            )
        }
        None => None,
    };

    let stderr_layer = config.also_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .compact()
            .with_writer(io::stderr)
            .with_filter(env_filter(&config.default_level))
    });

    tracing_subscriber::registry()
        .with(json_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| InitError::AlreadyInitialised(e.to_string()))?;

    if let Some(path) = &config.log_path {
        tracing::debug!(log_path = %path.display(), "observability initialized");
    }
    Ok(())
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

pub use tracing::Level;
