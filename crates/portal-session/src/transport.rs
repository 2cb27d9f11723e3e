//! HTTP transport seam.
//!
//! A [`Transport`] opens independent cookie-bearing [`HttpChannel`]s. Each
//! channel is the unit of "being logged in": cookies set during the login
//! exchange live in that channel only.

use crate::{AuthError, AuthResult};
use std::time::Duration;
use url::Url;

/// Default bound on a single HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("kevo-client/", env!("CARGO_PKG_VERSION"));

/// Status and body of a portal response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalResponse {
    pub status: u16,
    pub body: String,
}

impl PortalResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One cookie-bearing HTTP channel.
pub trait HttpChannel: Send {
    /// Issue a GET request.
    fn get(&mut self, url: &Url) -> AuthResult<PortalResponse>;

    /// Submit `form` as an `application/x-www-form-urlencoded` POST.
    fn post_form(&mut self, url: &Url, form: &[(&str, &str)]) -> AuthResult<PortalResponse>;

    /// Release the channel and its cookies.
    fn close(&mut self) {}
}

/// Factory for HTTP channels.
pub trait Transport: Send + Sync {
    /// Open a fresh channel with an empty cookie jar.
    fn open(&self) -> AuthResult<Box<dyn HttpChannel>>;
}

/// Blocking reqwest transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    request_timeout: Duration,
}

impl ReqwestTransport {
    /// Create a transport with the default per-request timeout.
    pub fn new() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Create a transport whose requests give up after `request_timeout`.
    pub fn with_request_timeout(request_timeout: Duration) -> Self {
        Self { request_timeout }
    }

    /// The configured per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for ReqwestTransport {
    fn open(&self) -> AuthResult<Box<dyn HttpChannel>> {
        let client = reqwest::blocking::Client::builder()
            .cookie_store(true)
            .timeout(self.request_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Box::new(ReqwestChannel {
            client: Some(client),
        }))
    }
}

struct ReqwestChannel {
    client: Option<reqwest::blocking::Client>,
}

impl ReqwestChannel {
    fn client(&self) -> AuthResult<&reqwest::blocking::Client> {
        self.client.as_ref().ok_or(AuthError::SessionClosed)
    }
}

impl HttpChannel for ReqwestChannel {
    fn get(&mut self, url: &Url) -> AuthResult<PortalResponse> {
        let response = self.client()?.get(url.clone()).send()?;
        into_portal_response(response)
    }

    fn post_form(&mut self, url: &Url, form: &[(&str, &str)]) -> AuthResult<PortalResponse> {
        let response = self.client()?.post(url.clone()).form(form).send()?;
        into_portal_response(response)
    }

    fn close(&mut self) {
        // Dropping the client drops its cookie jar and connection pool.
        self.client = None;
    }
}

fn into_portal_response(response: reqwest::blocking::Response) -> AuthResult<PortalResponse> {
    let status = response.status().as_u16();
    let body = response.text()?;
    Ok(PortalResponse { status, body })
}
