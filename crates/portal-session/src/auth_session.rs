//! The login exchange and the authenticated session it produces.
//!
//! An [`AuthSession`] owns one [`HttpChannel`]. Logging in fetches a fresh
//! authenticity token from the login page and submits it together with the
//! credentials; the channel's cookie jar then carries the authenticated
//! identity for every later [`AuthSession::get`]. Dropping the session closes
//! the channel.

use crate::markup;
use crate::session_fsm::{SessionMachine, SessionMachineInput, SessionPhase};
use crate::{
    AuthError, AuthResult, AuthToken, Credentials, HttpChannel, PortalEndpoints, PortalResponse,
    Transport,
};
use std::fmt;
use tracing::{debug, info, trace, warn};
use url::Url;
use uuid::Uuid;

/// How a credential submission is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginCheck {
    /// Reject non-2xx answers and answers that render the sign-in form again.
    #[default]
    Verify,
    /// Accept whatever the portal answers; a bad login only shows up on later calls.
    FireAndForget,
}

/// An open, cookie-bearing session with the portal.
pub struct AuthSession {
    id: Uuid,
    channel: Box<dyn HttpChannel>,
    endpoints: PortalEndpoints,
    fsm: SessionMachine,
}

impl AuthSession {
    /// Open a new channel. The session is not logged in yet.
    pub fn open(transport: &dyn Transport, endpoints: &PortalEndpoints) -> AuthResult<Self> {
        let channel = transport.open()?;
        let id = Uuid::new_v4();
        debug!(session_id = %id, "Portal session opened");

        Ok(Self {
            id,
            channel,
            endpoints: endpoints.clone(),
            fsm: SessionMachine::new(),
        })
    }

    /// Open a channel and log in. The channel is closed again if login fails.
    pub fn establish(
        transport: &dyn Transport,
        endpoints: &PortalEndpoints,
        credentials: &Credentials,
        check: LoginCheck,
    ) -> AuthResult<Self> {
        let mut session = Self::open(transport, endpoints)?;
        session.login(credentials, check)?;
        Ok(session)
    }

    /// Session identifier used in log lines.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        SessionPhase::from(self.fsm.state())
    }

    pub fn is_logged_in(&self) -> bool {
        self.phase() == SessionPhase::LoggedIn
    }

    pub fn endpoints(&self) -> &PortalEndpoints {
        &self.endpoints
    }

    /// Fetch the login page and return its hidden `authenticity_token` value.
    ///
    /// Fails with [`AuthError::TokenNotFound`] when the field is absent, which
    /// means the page changed shape or the portal redirected somewhere else.
    pub fn fetch_auth_token(&mut self) -> AuthResult<AuthToken> {
        match self.phase() {
            SessionPhase::Closed => return Err(AuthError::SessionClosed),
            SessionPhase::LoggedIn => {
                return Err(AuthError::InvalidStateTransition(
                    "session is already logged in".to_string(),
                ))
            }
            SessionPhase::Opened | SessionPhase::TokenIssued => {}
        }

        let url = self.endpoints.login_page()?;
        let page = self.channel.get(&url)?;

        let Some(token) = markup::extract_authenticity_token(&page.body) else {
            warn!(
                session_id = %self.id,
                status = page.status,
                "Login page carried no authenticity token"
            );
            return Err(AuthError::TokenNotFound);
        };

        self.transition(&SessionMachineInput::TokenFetched)?;
        Ok(AuthToken::new(token))
    }

    /// Log this session in.
    ///
    /// Returns the portal's answer to the credential submission, which after
    /// redirects is the account's lock list page.
    pub fn login(
        &mut self,
        credentials: &Credentials,
        check: LoginCheck,
    ) -> AuthResult<PortalResponse> {
        let token = self.fetch_auth_token()?;
        let url = self.endpoints.sign_in()?;

        debug!(session_id = %self.id, "Submitting credentials");

        let form = [
            ("user[username]", credentials.username()),
            ("user[password]", credentials.password()),
            ("authenticity_token", token.as_str()),
        ];

        let response = match self.channel.post_form(&url, &form) {
            Ok(response) => response,
            Err(e) => {
                self.transition(&SessionMachineInput::LoginRejected)?;
                return Err(e);
            }
        };

        if check == LoginCheck::Verify {
            if let Err(reason) = verify_login_response(&response) {
                warn!(session_id = %self.id, status = response.status, reason = %reason, "Login rejected");
                self.transition(&SessionMachineInput::LoginRejected)?;
                return Err(AuthError::LoginRejected(reason));
            }
        }

        self.transition(&SessionMachineInput::LoginAccepted)?;
        info!(session_id = %self.id, status = response.status, "Logged in to portal");

        Ok(response)
    }

    /// Authenticated GET.
    pub fn get(&mut self, url: &Url) -> AuthResult<PortalResponse> {
        match self.phase() {
            SessionPhase::LoggedIn => {}
            SessionPhase::Closed => return Err(AuthError::SessionClosed),
            SessionPhase::Opened | SessionPhase::TokenIssued => return Err(AuthError::NotLoggedIn),
        }

        trace!(session_id = %self.id, url = %url, "Portal GET");
        self.channel.get(url)
    }

    /// Close the channel. Safe to call more than once.
    pub fn close(&mut self) {
        if self.phase() == SessionPhase::Closed {
            return;
        }
        // Close is accepted from every live state.
        let _ = self.fsm.consume(&SessionMachineInput::Close);
        self.channel.close();
        debug!(session_id = %self.id, "Portal session closed");
    }

    fn transition(&mut self, input: &SessionMachineInput) -> AuthResult<SessionPhase> {
        let old_phase = self.phase();

        self.fsm.consume(input).map_err(|_| {
            AuthError::InvalidStateTransition(format!(
                "Cannot apply {:?} in state {:?}",
                input,
                self.fsm.state()
            ))
        })?;

        let new_phase = self.phase();
        if old_phase != new_phase {
            trace!(
                session_id = %self.id,
                old_phase = ?old_phase,
                new_phase = ?new_phase,
                "Session phase transition"
            );
        }
        Ok(new_phase)
    }
}

impl Drop for AuthSession {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("id", &self.id)
            .field("phase", &self.phase())
            .finish()
    }
}

fn verify_login_response(response: &PortalResponse) -> Result<(), String> {
    if !response.is_success() {
        return Err(format!("HTTP {}", response.status));
    }
    if markup::has_sign_in_form(&response.body) {
        return Err("portal returned the sign-in form again".to_string());
    }
    Ok(())
}
