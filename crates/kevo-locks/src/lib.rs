//! Kwikset Kevo locks over the mykevo.com portal.
//!
//! - [`LockDirectory`] logs in once and lists every lock on the account
//! - [`LockController`] refreshes, locks and unlocks one lock, polling until
//!   the bolt reports the requested position
//!
//! Sessions are opened per operation unless the caller pins one with
//! [`LockController::pin_session`].

mod controller;
mod directory;
mod error;
mod options;
mod poll;
mod types;

#[cfg(feature = "test-support")]
pub mod testing;

pub use controller::{LockController, PinnedSession};
pub use directory::{parse_lock_ids, LockDirectory};
pub use error::{KevoError, KevoResult};
pub use options::{ClientOptions, PollConfig, DEFAULT_POLL_INTERVAL, DEFAULT_WAIT_TIMEOUT};
pub use types::{BoltState, LockId, LockIdentity, LockState, UnknownStatePolicy};

pub use portal_session::{
    AuthError, Credentials, LoginCheck, PortalEndpoints, ReqwestTransport, Transport,
};
