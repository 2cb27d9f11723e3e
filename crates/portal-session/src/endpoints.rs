//! Fixed URL layout of the mykevo.com portal.

use crate::AuthResult;
use url::Url;

/// Production portal base URL.
pub const DEFAULT_PORTAL_URL: &str = "https://mykevo.com";

const LOGIN_PATH: &str = "login";
const SIGN_IN_PATH: &str = "signin";
const COMMANDS_PATH: &str = "user/remote_locks/command/";

/// Name of the read-only lock detail endpoint.
pub const LOCK_DETAIL: &str = "lock.json";
/// Name of the remote "engage bolt" command endpoint.
pub const REMOTE_LOCK: &str = "remote_lock.json";
/// Name of the remote "disengage bolt" command endpoint.
pub const REMOTE_UNLOCK: &str = "remote_unlock.json";

/// URLs of the portal pages and command endpoints, derived from one base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalEndpoints {
    base_url: Url,
}

impl PortalEndpoints {
    /// Build endpoints rooted at `base_url` (e.g. `https://mykevo.com`).
    pub fn new(base_url: &str) -> AuthResult<Self> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { base_url })
    }

    /// The base URL every endpoint is joined onto.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Landing page carrying the login form.
    pub fn login_page(&self) -> AuthResult<Url> {
        Ok(self.base_url.join(LOGIN_PATH)?)
    }

    /// Credential submission endpoint.
    pub fn sign_in(&self) -> AuthResult<Url> {
        Ok(self.base_url.join(SIGN_IN_PATH)?)
    }

    /// Command endpoint `name` keyed by `lock_id` through the `arguments` query parameter.
    pub fn command(&self, name: &str, lock_id: &str) -> AuthResult<Url> {
        let mut url = self.base_url.join(COMMANDS_PATH)?.join(name)?;
        url.query_pairs_mut().append_pair("arguments", lock_id);
        Ok(url)
    }
}

impl Default for PortalEndpoints {
    fn default() -> Self {
        Self {
            base_url: Url::parse(&format!("{}/", DEFAULT_PORTAL_URL))
                .expect("DEFAULT_PORTAL_URL should parse"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_mykevo() {
        let endpoints = PortalEndpoints::default();
        assert_eq!(
            endpoints.login_page().unwrap().as_str(),
            "https://mykevo.com/login"
        );
        assert_eq!(
            endpoints.sign_in().unwrap().as_str(),
            "https://mykevo.com/signin"
        );
    }

    #[test]
    fn command_url_carries_lock_id() {
        let endpoints = PortalEndpoints::default();
        let url = endpoints
            .command(REMOTE_UNLOCK, "cca7cd1d-c1d5-43ce-a087-c73b974b3529")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://mykevo.com/user/remote_locks/command/remote_unlock.json?arguments=cca7cd1d-c1d5-43ce-a087-c73b974b3529"
        );
    }

    #[test]
    fn base_with_path_prefix_is_preserved() {
        let endpoints = PortalEndpoints::new("http://127.0.0.1:8080/portal").unwrap();
        assert_eq!(
            endpoints.login_page().unwrap().as_str(),
            "http://127.0.0.1:8080/portal/login"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(PortalEndpoints::new("not a url").is_err());
    }
}
