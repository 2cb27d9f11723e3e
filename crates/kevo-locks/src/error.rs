//! Error types for lock operations.

use crate::BoltState;
use portal_session::AuthError;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while discovering or driving a lock.
#[derive(Error, Debug)]
pub enum KevoError {
    /// Login or session failure
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// A state-fetching call answered with a non-success status
    #[error("Error getting lock info: HTTP {status} - {message}")]
    Command { status: u16, message: String },

    /// The lock did not report the target state within the poll budget
    #[error("Timeout waiting for {target} after {}ms", .waited.as_millis())]
    Timeout { target: BoltState, waited: Duration },

    /// The portal reported a bolt state this client does not recognize
    #[error("Unrecognized bolt state: {0:?}")]
    UnknownState(String),

    /// The lock list page did not have the expected structure
    #[error("Unexpected lock list markup: {0}")]
    Scrape(String),

    /// JSON deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A portal URL could not be built
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl KevoError {
    /// Surface URL failures from endpoint construction as [`KevoError::InvalidUrl`].
    pub(crate) fn from_endpoint(err: AuthError) -> Self {
        match err {
            AuthError::InvalidUrl(e) => KevoError::InvalidUrl(e),
            other => KevoError::Auth(other),
        }
    }

    /// Returns true if the portal rejected the session rather than the request.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            KevoError::Auth(e) => !e.is_network(),
            KevoError::Command { status, .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }

    /// Returns true if the portal could not be reached at all.
    pub fn is_network(&self) -> bool {
        matches!(self, KevoError::Auth(e) if e.is_network())
    }
}

/// Result type alias using KevoError.
pub type KevoResult<T> = Result<T, KevoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_names_target_state() {
        let err = KevoError::Timeout {
            target: BoltState::Locked,
            waited: Duration::from_millis(2_004),
        };
        assert_eq!(err.to_string(), "Timeout waiting for locked after 2004ms");
    }

    #[test]
    fn unauthorized_command_counts_as_auth_failure() {
        let err = KevoError::Command {
            status: 401,
            message: "not signed in".to_string(),
        };
        assert!(err.is_auth_failure());
        assert!(KevoError::Auth(AuthError::TokenNotFound).is_auth_failure());
        assert!(!KevoError::UnknownState("jammed".to_string()).is_auth_failure());
    }

    #[test]
    fn endpoint_url_errors_are_not_auth_errors() {
        let parse_err = url::Url::parse("not a url").unwrap_err();
        let err = KevoError::from_endpoint(AuthError::InvalidUrl(parse_err));
        assert!(matches!(err, KevoError::InvalidUrl(_)));
        assert!(!err.is_auth_failure());
    }

    #[test]
    fn transport_failure_is_network_not_auth() {
        let err = KevoError::Auth(AuthError::Transport("connection refused".to_string()));
        assert!(err.is_network());
        assert!(!err.is_auth_failure());
        assert!(!KevoError::Auth(AuthError::TokenNotFound).is_network());
    }
}
