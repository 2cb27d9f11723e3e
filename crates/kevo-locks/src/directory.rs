//! Lock discovery from the post-login lock list page.

use crate::controller::fetch_detail;
use crate::{ClientOptions, KevoError, KevoResult, LockController, LockId};
use portal_session::markup::start_tags;
use portal_session::{AuthSession, Credentials, Transport};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};

static UL_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(/?)ul\b[^>]*>").expect("UL_TAG_RE should compile"));

/// Enumerates the locks an account can see.
#[derive(Clone)]
pub struct LockDirectory {
    transport: Arc<dyn Transport>,
    options: ClientOptions,
}

impl LockDirectory {
    pub fn new(transport: Arc<dyn Transport>, options: ClientOptions) -> Self {
        Self { transport, options }
    }

    /// Log in once, read the lock list and fetch every lock's details over
    /// that same session.
    ///
    /// Controllers come back in page order, with no session attached.
    pub fn get_locks(&self, credentials: &Credentials) -> KevoResult<Vec<LockController>> {
        let mut session = AuthSession::open(&*self.transport, &self.options.endpoints)?;
        let page = session.login(credentials, self.options.login_check)?;

        let lock_ids = parse_lock_ids(&page.body)?;
        info!(count = lock_ids.len(), session_id = %session.id(), "Discovered locks");

        let mut locks = Vec::with_capacity(lock_ids.len());
        for lock_id in &lock_ids {
            let detail = fetch_detail(&mut session, &self.options, lock_id)?;
            let controller = LockController::from_detail(
                Arc::clone(&self.transport),
                credentials.clone(),
                detail,
                self.options.clone(),
            )?;
            debug!(lock_id = %controller.lock_id(), name = controller.name(), "Loaded lock");
            locks.push(controller);
        }

        session.close();
        Ok(locks)
    }
}

/// Lock IDs from the lock list page, in document order.
///
/// Each `<ul class="lock">` entry must contain a
/// `<div class="lock_unlock_container" data-lock-id="...">`.
pub fn parse_lock_ids(html: &str) -> KevoResult<Vec<LockId>> {
    let mut lock_ids = Vec::new();

    for (index, entry) in start_tags(html, "ul").filter(|t| t.has_class("lock")).enumerate() {
        let body = &html[entry.end..matching_ul_end(html, entry.end)];

        let container = start_tags(body, "div")
            .find(|t| t.has_class("lock_unlock_container"))
            .ok_or_else(|| {
                KevoError::Scrape(format!("lock entry {index} has no lock_unlock_container"))
            })?;

        let lock_id = container
            .attr("data-lock-id")
            .filter(|id| !id.is_empty())
            .ok_or_else(|| KevoError::Scrape(format!("lock entry {index} has no data-lock-id")))?;

        lock_ids.push(LockId::from(lock_id));
    }

    Ok(lock_ids)
}

/// Offset of the `</ul>` closing the list opened just before `from`,
/// skipping nested lists. End of input when unclosed.
fn matching_ul_end(html: &str, from: usize) -> usize {
    let mut depth = 1usize;
    for caps in UL_TAG_RE.captures_iter(&html[from..]) {
        let Some(tag) = caps.get(0) else { continue };
        if caps.get(1).is_some_and(|slash| !slash.as_str().is_empty()) {
            depth -= 1;
            if depth == 0 {
                return from + tag.start();
            }
        } else {
            depth += 1;
        }
    }
    html.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_LOCKS: &str = r#"
<div id="locks">
  <ul class="lock clearfix">
    <li class="name">Front Door</li>
    <li><div class="lock_unlock_container" data-lock-id="cca7cd1d-c4c3-4f30-b8ed-2b3a5b5dd7be" data-bolt-state="Locked"></div></li>
  </ul>
  <ul class="menu"><li><div class="lock_unlock_container" data-lock-id="not-a-lock"></div></li></ul>
  <UL CLASS='lock'>
    <li><div data-lock-id=garage-1 class="lock_unlock_container"></div></li>
  </UL>
</div>"#;

    #[test]
    fn parses_ids_in_document_order() {
        let ids = parse_lock_ids(TWO_LOCKS).unwrap();
        assert_eq!(
            ids,
            vec![
                LockId::from("cca7cd1d-c4c3-4f30-b8ed-2b3a5b5dd7be"),
                LockId::from("garage-1"),
            ]
        );
    }

    #[test]
    fn page_without_locks_is_empty() {
        assert!(parse_lock_ids("<html><body><p>No locks</p></body></html>")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn entry_without_container_is_scrape_error() {
        let html = r#"<ul class="lock"><li>Front Door</li></ul>"#;
        assert!(matches!(parse_lock_ids(html), Err(KevoError::Scrape(_))));
    }

    #[test]
    fn container_search_stays_inside_its_entry() {
        let html = r#"<ul class="lock"><li>Front</li></ul>
<div class="lock_unlock_container" data-lock-id="outside"></div>"#;
        assert!(matches!(parse_lock_ids(html), Err(KevoError::Scrape(_))));
    }

    #[test]
    fn nested_list_before_container_stays_inside_entry() {
        let html = r#"<ul class="lock"><li>Front</li>
<li><ul class="menu"><li>Settings</li></ul></li>
<li><div class="lock_unlock_container" data-lock-id="front-1"></div></li></ul>
<ul class="lock"><li><div class="lock_unlock_container" data-lock-id="back-2"></div></li></ul>"#;

        let ids = parse_lock_ids(html).unwrap();
        assert_eq!(ids, vec![LockId::from("front-1"), LockId::from("back-2")]);
    }

    #[test]
    fn container_without_id_is_scrape_error() {
        let html = r#"<ul class="lock"><li><div class="lock_unlock_container"></div></li></ul>"#;
        assert!(matches!(parse_lock_ids(html), Err(KevoError::Scrape(_))));
    }
}
