//! Login sessions against the mykevo.com web portal.
//!
//! This crate provides:
//! - The login exchange (authenticity token + form sign-in) over a cookie-bearing channel
//! - An explicit FSM for the session lifecycle
//! - [`SessionScope`], which opens a session for one operation or reuses a caller-pinned one
//! - A [`Transport`] seam with a blocking reqwest implementation

mod auth_session;
mod credentials;
mod endpoints;
mod error;
pub mod markup;
mod scope;
mod session_fsm;
mod transport;

pub use auth_session::{AuthSession, LoginCheck};
pub use credentials::{AuthToken, Credentials};
pub use endpoints::{
    PortalEndpoints, DEFAULT_PORTAL_URL, LOCK_DETAIL, REMOTE_LOCK, REMOTE_UNLOCK,
};
pub use error::{AuthError, AuthResult};
pub use scope::SessionScope;
pub use session_fsm::{session_machine, SessionPhase};
pub use transport::{
    HttpChannel, PortalResponse, ReqwestTransport, Transport, DEFAULT_REQUEST_TIMEOUT,
};
