//! Portal session error types.

use thiserror::Error;

/// Error raised while establishing or using a portal session.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The login page carried no `authenticity_token` input
    #[error("Could not find auth token on sign-in page")]
    TokenNotFound,

    /// The portal answered the credential submission with a failure
    #[error("Login rejected: {0}")]
    LoginRejected(String),

    /// An authenticated request was attempted before login completed
    #[error("Not logged in")]
    NotLoggedIn,

    /// The session was already closed
    #[error("Session closed")]
    SessionClosed,

    /// Invalid state transition in the session FSM
    #[error("Invalid session state transition: {0}")]
    InvalidStateTransition(String),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parse error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Transport-level failure not covered by reqwest
    #[error("Transport error: {0}")]
    Transport(String),
}

impl AuthError {
    /// Returns true if the error came from the network rather than the portal's answer.
    pub fn is_network(&self) -> bool {
        match self {
            AuthError::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            AuthError::Transport(_) => true,
            _ => false,
        }
    }
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;
