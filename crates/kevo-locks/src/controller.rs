//! One lock: refresh, lock, unlock and wait for the bolt to move.
//!
//! Every network operation runs in a [`SessionScope`]: it reuses a session
//! pinned with [`LockController::start_session`] or [`LockController::pin_session`],
//! and otherwise opens, logs in and closes a session of its own.

use crate::poll::wait_for_state;
use crate::{BoltState, ClientOptions, KevoError, KevoResult, LockId, LockState};
use portal_session::{
    AuthResult, AuthSession, Credentials, SessionScope, Transport, LOCK_DETAIL, REMOTE_LOCK,
    REMOTE_UNLOCK,
};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Longest body excerpt carried in a [`KevoError::Command`].
const ERROR_BODY_LIMIT: usize = 200;

/// Drives a single lock through the portal.
pub struct LockController {
    transport: Arc<dyn Transport>,
    credentials: Credentials,
    options: ClientOptions,
    state: LockState,
    session: Option<AuthSession>,
}

impl LockController {
    /// Create a controller for `lock_id` and fetch its current state.
    pub fn from_lock_id(
        transport: Arc<dyn Transport>,
        credentials: Credentials,
        lock_id: impl Into<LockId>,
        options: ClientOptions,
    ) -> KevoResult<Self> {
        let mut controller = Self {
            transport,
            credentials,
            options,
            state: LockState::pending(lock_id.into()),
            session: None,
        };
        controller.refresh()?;
        Ok(controller)
    }

    /// Create a controller from an already fetched `lock.json` payload.
    /// No network traffic.
    pub fn from_detail(
        transport: Arc<dyn Transport>,
        credentials: Credentials,
        detail: serde_json::Value,
        options: ClientOptions,
    ) -> KevoResult<Self> {
        let state = LockState::from_detail(detail, options.unknown_state)?;
        Ok(Self {
            transport,
            credentials,
            options,
            state,
            session: None,
        })
    }

    pub fn lock_id(&self) -> &LockId {
        self.state.lock_id()
    }

    pub fn name(&self) -> &str {
        self.state.name()
    }

    /// Last observed state. Stale until the next refresh.
    pub fn state(&self) -> &LockState {
        &self.state
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// True while a caller-pinned session is open.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Open and log in a session that later operations reuse until
    /// [`end_session`](Self::end_session). No-op if one is already pinned.
    pub fn start_session(&mut self) -> KevoResult<()> {
        if let Some(session) = &self.session {
            debug!(lock_id = %self.state.lock_id(), session_id = %session.id(), "Session already pinned");
            return Ok(());
        }

        let session = open_session(&*self.transport, &self.options, &self.credentials)?;
        info!(lock_id = %self.state.lock_id(), session_id = %session.id(), "Pinned session");
        self.session = Some(session);
        Ok(())
    }

    /// Close the pinned session, if any.
    pub fn end_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            info!(lock_id = %self.state.lock_id(), session_id = %session.id(), "Ending pinned session");
            session.close();
        }
    }

    /// Pin a session for the lifetime of the returned guard.
    pub fn pin_session(&mut self) -> KevoResult<PinnedSession<'_>> {
        self.start_session()?;
        Ok(PinnedSession { controller: self })
    }

    /// Fetch the current state from the portal.
    pub fn refresh(&mut self) -> KevoResult<()> {
        let mut session = SessionScope::enter(&mut self.session, || {
            open_session(&*self.transport, &self.options, &self.credentials)
        })?;
        refresh_state(&mut session, &self.options, &mut self.state)
    }

    /// Refresh, then return the bolt state.
    pub fn bolt_state(&mut self) -> KevoResult<BoltState> {
        self.refresh()?;
        Ok(self.state.bolt_state())
    }

    pub fn is_locked(&mut self) -> KevoResult<bool> {
        Ok(self.bolt_state()? == BoltState::Locked)
    }

    pub fn is_unlocked(&mut self) -> KevoResult<bool> {
        Ok(self.bolt_state()? == BoltState::Unlocked)
    }

    /// Engage the bolt and wait until the lock reports it locked.
    pub fn lock(&mut self) -> KevoResult<()> {
        self.command_and_wait(REMOTE_LOCK, BoltState::Locked)
    }

    /// Disengage the bolt and wait until the lock reports it unlocked.
    pub fn unlock(&mut self) -> KevoResult<()> {
        self.command_and_wait(REMOTE_UNLOCK, BoltState::Unlocked)
    }

    /// Poll until locked. `None` uses the configured wait timeout.
    pub fn wait_for_locked(&mut self, timeout: Option<Duration>) -> KevoResult<()> {
        self.wait_for(BoltState::Locked, timeout)
    }

    /// Poll until unlocked. `None` uses the configured wait timeout.
    pub fn wait_for_unlocked(&mut self, timeout: Option<Duration>) -> KevoResult<()> {
        self.wait_for(BoltState::Unlocked, timeout)
    }

    /// Poll until the lock reports `target`, all under one session.
    pub fn wait_for(&mut self, target: BoltState, timeout: Option<Duration>) -> KevoResult<()> {
        let timeout = timeout.unwrap_or(self.options.poll.timeout);
        let mut session = SessionScope::enter(&mut self.session, || {
            open_session(&*self.transport, &self.options, &self.credentials)
        })?;
        poll_state(&mut session, &self.options, &mut self.state, target, timeout)
    }

    fn command_and_wait(&mut self, command: &str, target: BoltState) -> KevoResult<()> {
        let mut session = SessionScope::enter(&mut self.session, || {
            open_session(&*self.transport, &self.options, &self.credentials)
        })?;

        send_command(&mut session, &self.options, self.state.lock_id(), command)?;
        let timeout = self.options.poll.timeout;
        poll_state(&mut session, &self.options, &mut self.state, target, timeout)
    }
}

impl fmt::Display for LockController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.state.name(), self.state.bolt_state())
    }
}

impl fmt::Debug for LockController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockController")
            .field("state", &self.state)
            .field("credentials", &self.credentials)
            .field("session", &self.session.as_ref().map(AuthSession::id))
            .finish()
    }
}

impl Drop for LockController {
    fn drop(&mut self) {
        self.end_session();
    }
}

/// Keeps a session pinned on a controller; ends it when dropped.
pub struct PinnedSession<'a> {
    controller: &'a mut LockController,
}

impl Deref for PinnedSession<'_> {
    type Target = LockController;

    fn deref(&self) -> &LockController {
        self.controller
    }
}

impl DerefMut for PinnedSession<'_> {
    fn deref_mut(&mut self) -> &mut LockController {
        self.controller
    }
}

impl Drop for PinnedSession<'_> {
    fn drop(&mut self) {
        self.controller.end_session();
    }
}

fn open_session(
    transport: &dyn Transport,
    options: &ClientOptions,
    credentials: &Credentials,
) -> AuthResult<AuthSession> {
    AuthSession::establish(transport, &options.endpoints, credentials, options.login_check)
}

pub(crate) fn fetch_detail(
    session: &mut AuthSession,
    options: &ClientOptions,
    lock_id: &LockId,
) -> KevoResult<serde_json::Value> {
    let url = options
        .endpoints
        .command(LOCK_DETAIL, lock_id.as_str())
        .map_err(KevoError::from_endpoint)?;
    let response = session.get(&url)?;

    if !response.is_success() {
        return Err(KevoError::Command {
            status: response.status,
            message: excerpt(&response.body),
        });
    }

    Ok(serde_json::from_str(&response.body)?)
}

fn refresh_state(
    session: &mut AuthSession,
    options: &ClientOptions,
    state: &mut LockState,
) -> KevoResult<()> {
    let detail = fetch_detail(session, options, state.lock_id())?;
    let fresh = LockState::from_detail(detail, options.unknown_state)?;

    debug!(
        lock_id = %state.lock_id(),
        bolt_state = %fresh.bolt_state(),
        session_id = %session.id(),
        "Refreshed lock state"
    );
    state.absorb(fresh);
    Ok(())
}

/// Issue a command. The response body is not inspected; success is judged
/// only by the polls that follow.
fn send_command(
    session: &mut AuthSession,
    options: &ClientOptions,
    lock_id: &LockId,
    command: &str,
) -> KevoResult<()> {
    let url = options
        .endpoints
        .command(command, lock_id.as_str())
        .map_err(KevoError::from_endpoint)?;
    let response = session.get(&url)?;
    info!(
        %lock_id,
        command,
        status = response.status,
        session_id = %session.id(),
        "Sent lock command"
    );
    Ok(())
}

fn poll_state(
    session: &mut AuthSession,
    options: &ClientOptions,
    state: &mut LockState,
    target: BoltState,
    timeout: Duration,
) -> KevoResult<()> {
    wait_for_state(target, options.poll.interval, timeout, || {
        refresh_state(session, options, state)?;
        Ok(state.bolt_state())
    })
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
