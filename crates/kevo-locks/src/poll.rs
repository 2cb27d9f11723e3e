//! Convergence polling: re-check a bolt until it reports the target state.

use crate::{BoltState, KevoError, KevoResult};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Call `observe` until it reports `target`.
///
/// The deadline is checked after each observation, so a wait ends at the first
/// check past `timeout` and can overshoot it by up to one `interval` plus one
/// observation. Errors from `observe` abort the wait immediately.
pub(crate) fn wait_for_state<F>(
    target: BoltState,
    interval: Duration,
    timeout: Duration,
    mut observe: F,
) -> KevoResult<()>
where
    F: FnMut() -> KevoResult<BoltState>,
{
    let started = Instant::now();
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let observed = observe()?;

        if observed == target {
            debug!(
                target_state = %target,
                attempts,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Bolt reached target state"
            );
            return Ok(());
        }

        let waited = started.elapsed();
        if waited > timeout {
            warn!(
                target_state = %target,
                %observed,
                attempts,
                waited_ms = waited.as_millis() as u64,
                "Gave up waiting for bolt"
            );
            return Err(KevoError::Timeout { target, waited });
        }

        trace!(target_state = %target, %observed, attempts, "Bolt not there yet");
        thread::sleep(interval);
    }
}
