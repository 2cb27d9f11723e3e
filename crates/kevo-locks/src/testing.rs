//! A scripted in-memory portal for tests.
//!
//! [`FakePortal`] implements [`Transport`] and answers the login page, the
//! sign-in form, the lock list and the three command endpoints. Each opened
//! channel keeps its own login flag, like a cookie jar. Counters record every
//! exchange so tests can assert on session and login usage.

use parking_lot::Mutex;
use portal_session::{
    AuthResult, Credentials, HttpChannel, PortalEndpoints, PortalResponse, Transport, LOCK_DETAIL,
    REMOTE_LOCK, REMOTE_UNLOCK,
};
use std::sync::Arc;
use url::Url;

const TOKEN: &str = "fake-authenticity-token";

/// What the fake portal has seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortalCounters {
    pub sessions_opened: usize,
    pub sessions_closed: usize,
    pub token_fetches: usize,
    pub logins: usize,
    pub refreshes: usize,
    /// `(command, lock_id)` in the order received.
    pub commands: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
struct FakeLock {
    id: String,
    name: String,
    bolt_state: String,
    pending: Option<Pending>,
}

#[derive(Debug, Clone)]
struct Pending {
    bolt_state: String,
    refreshes_left: u32,
}

#[derive(Debug)]
struct PortalState {
    username: String,
    password: String,
    locks: Vec<FakeLock>,
    settle_after: u32,
    stuck: bool,
    serve_token: bool,
    counters: PortalCounters,
}

/// Scripted stand-in for mykevo.com.
#[derive(Debug, Clone)]
pub struct FakePortal {
    inner: Arc<Mutex<PortalState>>,
}

impl FakePortal {
    /// A portal that accepts exactly `username` / `password`.
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PortalState {
                username: username.to_string(),
                password: password.to_string(),
                locks: Vec::new(),
                settle_after: 1,
                stuck: false,
                serve_token: true,
                counters: PortalCounters::default(),
            })),
        }
    }

    /// Add a lock reporting `bolt_state` verbatim.
    pub fn with_lock(self, id: &str, name: &str, bolt_state: &str) -> Self {
        self.inner.lock().locks.push(FakeLock {
            id: id.to_string(),
            name: name.to_string(),
            bolt_state: bolt_state.to_string(),
            pending: None,
        });
        self
    }

    /// Number of state refreshes after a command before the bolt reports the
    /// new position. Zero applies it on the next refresh.
    pub fn settle_after(self, refreshes: u32) -> Self {
        self.inner.lock().settle_after = refreshes;
        self
    }

    /// Commands are accepted but the bolt never moves.
    pub fn stuck(self) -> Self {
        self.inner.lock().stuck = true;
        self
    }

    /// Serve a login page without an authenticity token.
    pub fn without_token(self) -> Self {
        self.inner.lock().serve_token = false;
        self
    }

    /// Change what a lock reports, as if someone turned the thumb-turn.
    pub fn set_bolt_state(&self, id: &str, bolt_state: &str) {
        if let Some(lock) = self.inner.lock().locks.iter_mut().find(|l| l.id == id) {
            lock.bolt_state = bolt_state.to_string();
            lock.pending = None;
        }
    }

    /// The bolt state string a lock currently reports.
    pub fn bolt_state(&self, id: &str) -> Option<String> {
        self.inner
            .lock()
            .locks
            .iter()
            .find(|l| l.id == id)
            .map(|l| l.bolt_state.clone())
    }

    pub fn counters(&self) -> PortalCounters {
        self.inner.lock().counters.clone()
    }

    /// Credentials the portal accepts.
    pub fn credentials(&self) -> Credentials {
        let state = self.inner.lock();
        Credentials::new(state.username.clone(), state.password.clone())
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::new(self.clone())
    }

    /// Endpoints the fake answers on.
    pub fn endpoints() -> PortalEndpoints {
        PortalEndpoints::default()
    }
}

impl Transport for FakePortal {
    fn open(&self) -> AuthResult<Box<dyn HttpChannel>> {
        self.inner.lock().counters.sessions_opened += 1;
        Ok(Box::new(FakeChannel {
            portal: Arc::clone(&self.inner),
            logged_in: false,
            closed: false,
        }))
    }
}

struct FakeChannel {
    portal: Arc<Mutex<PortalState>>,
    logged_in: bool,
    closed: bool,
}

impl HttpChannel for FakeChannel {
    fn get(&mut self, url: &Url) -> AuthResult<PortalResponse> {
        let mut state = self.portal.lock();
        let endpoint = url.path_segments().and_then(|mut s| s.next_back()).unwrap_or_default();

        if endpoint == "login" {
            state.counters.token_fetches += 1;
            return Ok(PortalResponse::new(200, login_page(state.serve_token)));
        }

        if !self.logged_in {
            return Ok(PortalResponse::new(401, "You need to sign in before continuing."));
        }

        let lock_id = url
            .query_pairs()
            .find(|(key, _)| key == "arguments")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();

        match endpoint {
            LOCK_DETAIL => Ok(state.refresh(&lock_id)),
            REMOTE_LOCK => Ok(state.command(endpoint, &lock_id, "Locked")),
            REMOTE_UNLOCK => Ok(state.command(endpoint, &lock_id, "Unlocked")),
            _ => Ok(PortalResponse::new(404, "Not found")),
        }
    }

    fn post_form(&mut self, url: &Url, form: &[(&str, &str)]) -> AuthResult<PortalResponse> {
        let mut state = self.portal.lock();
        if url.path_segments().and_then(|mut s| s.next_back()) != Some("signin") {
            return Ok(PortalResponse::new(404, "Not found"));
        }
        state.counters.logins += 1;

        let field = |name: &str| form.iter().find(|(k, _)| *k == name).map(|(_, v)| *v);
        let accepted = field("authenticity_token") == Some(TOKEN)
            && field("user[username]") == Some(state.username.as_str())
            && field("user[password]") == Some(state.password.as_str());

        if accepted {
            self.logged_in = true;
            Ok(PortalResponse::new(200, state.lock_list_page()))
        } else {
            Ok(PortalResponse::new(200, login_page(state.serve_token)))
        }
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.logged_in = false;
            self.portal.lock().counters.sessions_closed += 1;
        }
    }
}

impl PortalState {
    fn refresh(&mut self, lock_id: &str) -> PortalResponse {
        self.counters.refreshes += 1;
        let Some(lock) = self.locks.iter_mut().find(|l| l.id == lock_id) else {
            return PortalResponse::new(404, "Lock not found");
        };

        if let Some(pending) = lock.pending.as_mut() {
            if pending.refreshes_left == 0 {
                lock.bolt_state = pending.bolt_state.clone();
                lock.pending = None;
            } else {
                pending.refreshes_left -= 1;
            }
        }

        let body = serde_json::json!({
            "id": lock.id,
            "name": lock.name,
            "bolt_state": lock.bolt_state,
        });
        PortalResponse::new(200, body.to_string())
    }

    fn command(&mut self, command: &str, lock_id: &str, bolt_state: &str) -> PortalResponse {
        self.counters
            .commands
            .push((command.to_string(), lock_id.to_string()));

        let (settle_after, stuck) = (self.settle_after, self.stuck);
        let Some(lock) = self.locks.iter_mut().find(|l| l.id == lock_id) else {
            return PortalResponse::new(404, "Lock not found");
        };
        if !stuck {
            lock.pending = Some(Pending {
                bolt_state: bolt_state.to_string(),
                refreshes_left: settle_after,
            });
        }
        PortalResponse::new(200, r#"{"status":"queued"}"#)
    }

    fn lock_list_page(&self) -> String {
        let mut html = String::from("<html><body><div id=\"locks\">\n");
        for lock in &self.locks {
            html.push_str(&format!(
                "<ul class=\"lock\"><li class=\"name\">{}</li>\
                 <li><div class=\"lock_unlock_container\" data-lock-id=\"{}\"></div></li></ul>\n",
                lock.name, lock.id
            ));
        }
        html.push_str("</div></body></html>");
        html
    }
}

fn login_page(with_token: bool) -> String {
    let token = if with_token {
        format!("<input type=\"hidden\" name=\"authenticity_token\" value=\"{TOKEN}\" />")
    } else {
        String::new()
    };
    format!(
        "<html><body><form action=\"/signin\" method=\"post\">{token}\
         <input name=\"user[username]\" type=\"text\" />\
         <input name=\"user[password]\" type=\"password\" />\
         </form></body></html>"
    )
}
