//! Logging initialisation for the `kevo` binary.
//!
//! Delegates to the observability package. `RUST_LOG` wins over the
//! configured level when set.

use crate::{Config, CoreResult, Paths};

/// Initialise logging from configuration.
///
/// Human-readable output always goes to stderr. With `log_to_file`, events are
/// also appended as JSONL to `~/.kevo/logs/kevo.jsonl`.
pub fn init_logging(config: &Config, paths: &Paths, log_to_file: bool) -> CoreResult<()> {
    observability::init_with_config(observability::LogConfig {
        service_name: "kevo".into(),
        default_level: config.log_level.clone(),
        log_path: log_to_file.then(|| paths.log_file()),
        also_stderr: true,
    })?;
    Ok(())
}
