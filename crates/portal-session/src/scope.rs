//! Auto-session scoping.
//!
//! Every operation that needs authentication runs inside a [`SessionScope`].
//! If the caller already pinned a session in the slot, the scope borrows it
//! and leaves it open. Otherwise the scope opens and logs in a session of its
//! own and closes it when dropped, on success, error and early return alike.

use crate::{AuthResult, AuthSession};
use std::ops::{Deref, DerefMut};
use tracing::trace;

/// A session borrowed from the caller or owned for one operation.
#[derive(Debug)]
pub enum SessionScope<'a> {
    /// Caller-pinned session; left open when the scope ends.
    Pinned(&'a mut AuthSession),
    /// Session opened for this scope; closed when the scope ends.
    Scoped(AuthSession),
}

impl<'a> SessionScope<'a> {
    /// Reuse the session in `slot`, or open one with `open`.
    ///
    /// `open` only runs when `slot` is empty. The opened session is never
    /// written back into `slot`.
    pub fn enter<F>(slot: &'a mut Option<AuthSession>, open: F) -> AuthResult<Self>
    where
        F: FnOnce() -> AuthResult<AuthSession>,
    {
        match slot {
            Some(session) => {
                trace!(session_id = %session.id(), "Reusing pinned session");
                Ok(Self::Pinned(session))
            }
            None => Ok(Self::Scoped(open()?)),
        }
    }

    /// True when the session belongs to the caller.
    pub fn is_pinned(&self) -> bool {
        matches!(self, Self::Pinned(_))
    }
}

impl Deref for SessionScope<'_> {
    type Target = AuthSession;

    fn deref(&self) -> &AuthSession {
        match self {
            Self::Pinned(session) => session,
            Self::Scoped(session) => session,
        }
    }
}

impl DerefMut for SessionScope<'_> {
    fn deref_mut(&mut self) -> &mut AuthSession {
        match self {
            Self::Pinned(session) => session,
            Self::Scoped(session) => session,
        }
    }
}

impl Drop for SessionScope<'_> {
    fn drop(&mut self) {
        if let Self::Scoped(session) = self {
            trace!(session_id = %session.id(), "Releasing scoped session");
            session.close();
        }
    }
}
