//! Portal session lifecycle state machine using rust-fsm.
//!
//! ```text
//! Opened ──TokenFetched──► TokenIssued ──LoginAccepted──► LoggedIn
//!   ▲                          │
//!   └──────LoginRejected───────┘
//!
//! Close from any live state ──► Closed (terminal)
//! ```

use rust_fsm::*;
use serde::{Deserialize, Serialize};

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub session_machine(Opened)

    Opened => {
        TokenFetched => TokenIssued,
        Close => Closed
    },
    TokenIssued => {
        TokenFetched => TokenIssued,
        LoginAccepted => LoggedIn,
        LoginRejected => Opened,
        Close => Closed
    },
    LoggedIn => {
        Close => Closed
    }
}

pub use session_machine::Input as SessionMachineInput;
pub use session_machine::State as SessionMachineState;
pub use session_machine::StateMachine as SessionMachine;

/// Public view of where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Channel open, no login attempted yet.
    Opened,
    /// Authenticity token fetched, credentials not yet accepted.
    TokenIssued,
    /// Credentials accepted; authenticated requests allowed.
    LoggedIn,
    /// Channel released.
    Closed,
}

impl From<&SessionMachineState> for SessionPhase {
    fn from(state: &SessionMachineState) -> Self {
        match state {
            SessionMachineState::Opened => SessionPhase::Opened,
            SessionMachineState::TokenIssued => SessionPhase::TokenIssued,
            SessionMachineState::LoggedIn => SessionPhase::LoggedIn,
            SessionMachineState::Closed => SessionPhase::Closed,
        }
    }
}
