//! Output formatting for the CLI.

use clap::ValueEnum;
use kevo_locks::{BoltState, LockController};
use serde::Serialize;

/// Output format.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// One lock as printed by `list` and `status`.
#[derive(Debug, Serialize)]
pub struct LockRow {
    pub lock_id: String,
    pub name: String,
    pub bolt_state: BoltState,
    pub refreshed_at: Option<String>,
}

impl From<&LockController> for LockRow {
    fn from(lock: &LockController) -> Self {
        let state = lock.state();
        Self {
            lock_id: state.lock_id().to_string(),
            name: state.name().to_string(),
            bolt_state: state.bolt_state(),
            refreshed_at: state.refreshed_at().map(|t| t.to_rfc3339()),
        }
    }
}

/// Print a list of locks.
pub fn print_locks(rows: &[LockRow], format: &OutputFormat) {
    match format {
        OutputFormat::Text => {
            if rows.is_empty() {
                println!("No locks found.");
                return;
            }
            print_heading(&format!("Locks ({})", rows.len()));
            for row in rows {
                println!("  {:<10} {:<24} {}", row.bolt_state, row.name, row.lock_id);
            }
        }
        OutputFormat::Json => print_json(&rows),
    }
}

/// Print one lock in detail.
pub fn print_lock(row: &LockRow, format: &OutputFormat) {
    match format {
        OutputFormat::Text => {
            print_heading(&row.name);
            print_row("Lock ID", &row.lock_id);
            print_row("Bolt", row.bolt_state.as_str());
            print_row(
                "Refreshed",
                row.refreshed_at.as_deref().unwrap_or("never"),
            );
        }
        OutputFormat::Json => print_json(row),
    }
}

/// Print a success message.
pub fn print_success(message: &str, format: &OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", message),
        OutputFormat::Json => print_json(&serde_json::json!({
            "status": "success",
            "message": message,
        })),
    }
}

/// Print an error message, followed by a hint when one applies.
pub fn print_error(message: &str, hint: Option<&str>, format: &OutputFormat) {
    match format {
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
            if let Some(hint) = hint {
                eprintln!("Hint: {}", hint);
            }
        }
        OutputFormat::Json => eprintln!(
            "{}",
            serde_json::json!({
                "status": "error",
                "message": message,
                "hint": hint,
            })
        ),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: failed to encode output: {}", e),
    }
}

/// Print a table row.
fn print_row(label: &str, value: &str) {
    println!("  {:<16} {}", format!("{}:", label), value);
}

/// Print a heading.
fn print_heading(text: &str) {
    println!("\n{}", text);
    println!("{}", "-".repeat(50));
}
