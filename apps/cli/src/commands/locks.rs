//! Lock commands.

use super::Context;
use crate::output::{self, LockRow, OutputFormat};
use anyhow::{Context as _, Result};
use kevo_locks::{LockController, LockDirectory};
use tracing::debug;

/// List every lock on the account.
pub fn list(ctx: &Context, format: &OutputFormat) -> Result<()> {
    let directory = LockDirectory::new(ctx.transport.clone(), ctx.options.clone());
    let locks = directory
        .get_locks(&ctx.credentials)
        .context("Failed to list locks")?;

    let rows: Vec<LockRow> = locks.iter().map(LockRow::from).collect();
    output::print_locks(&rows, format);
    Ok(())
}

/// Show the current state of one lock.
pub fn status(ctx: &Context, lock_id: &str, format: &OutputFormat) -> Result<()> {
    let lock = open_lock(ctx, lock_id)?;
    output::print_lock(&LockRow::from(&lock), format);
    Ok(())
}

/// Lock and wait until the lock reports locked.
pub fn lock(ctx: &Context, lock_id: &str, format: &OutputFormat) -> Result<()> {
    let mut lock = open_lock(ctx, lock_id)?;
    lock.lock()
        .with_context(|| format!("Failed to lock {}", lock.name()))?;

    output::print_success(&lock.to_string(), format);
    Ok(())
}

/// Unlock and wait until the lock reports unlocked.
pub fn unlock(ctx: &Context, lock_id: &str, format: &OutputFormat) -> Result<()> {
    let mut lock = open_lock(ctx, lock_id)?;
    lock.unlock()
        .with_context(|| format!("Failed to unlock {}", lock.name()))?;

    output::print_success(&lock.to_string(), format);
    Ok(())
}

/// Unlock, then lock again, logging in only once.
pub fn cycle(ctx: &Context, lock_id: &str, format: &OutputFormat) -> Result<()> {
    let mut lock = open_lock(ctx, lock_id)?;
    {
        let mut pinned = lock.pin_session().context("Failed to log in")?;

        pinned.unlock().context("Failed to unlock")?;
        output::print_success(&pinned.to_string(), format);

        pinned.lock().context("Failed to lock")?;
        output::print_success(&pinned.to_string(), format);
    }
    debug!(lock_id = %lock.lock_id(), "Cycle finished");
    Ok(())
}

fn open_lock(ctx: &Context, lock_id: &str) -> Result<LockController> {
    LockController::from_lock_id(
        ctx.transport.clone(),
        ctx.credentials.clone(),
        lock_id,
        ctx.options.clone(),
    )
    .with_context(|| format!("Failed to load lock {}", lock_id))
}
