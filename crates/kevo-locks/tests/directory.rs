//! Lock discovery against the scripted portal.

mod common;

use common::{fast_options, portal, FRONT, GARAGE};
use kevo_locks::testing::FakePortal;
use kevo_locks::{AuthError, BoltState, Credentials, KevoError, LockDirectory};

#[test]
fn lists_locks_in_page_order_over_one_session() {
    let portal = portal();
    let directory = LockDirectory::new(portal.transport(), fast_options());

    let locks = directory.get_locks(&portal.credentials()).unwrap();

    let ids: Vec<&str> = locks.iter().map(|l| l.lock_id().as_str()).collect();
    assert_eq!(ids, vec![FRONT, GARAGE]);
    assert_eq!(locks[0].name(), "Front Door");
    assert_eq!(locks[0].state().bolt_state(), BoltState::Locked);
    assert_eq!(locks[1].state().bolt_state(), BoltState::Unlocked);
    assert!(locks.iter().all(|l| !l.has_session()));

    let counters = portal.counters();
    assert_eq!(counters.sessions_opened, 1);
    assert_eq!(counters.logins, 1);
    assert_eq!(counters.refreshes, 2);
    assert_eq!(counters.sessions_closed, 1);
}

#[test]
fn discovered_locks_open_their_own_sessions() {
    let portal = portal();
    let directory = LockDirectory::new(portal.transport(), fast_options());
    let mut locks = directory.get_locks(&portal.credentials()).unwrap();

    assert!(locks[1].is_unlocked().unwrap());

    let counters = portal.counters();
    assert_eq!(counters.sessions_opened, 2);
    assert_eq!(counters.logins, 2);
    assert_eq!(counters.sessions_closed, 2);
}

#[test]
fn account_without_locks_is_empty() {
    let portal = FakePortal::new("bob@example.com", "hunter2");
    let directory = LockDirectory::new(portal.transport(), fast_options());

    let locks = directory.get_locks(&portal.credentials()).unwrap();

    assert!(locks.is_empty());
    assert_eq!(portal.counters().refreshes, 0);
}

#[test]
fn rejected_login_is_an_auth_error() {
    let portal = portal();
    let directory = LockDirectory::new(portal.transport(), fast_options());

    let result = directory.get_locks(&Credentials::new("alice@example.com", "wrong"));

    assert!(matches!(result, Err(KevoError::Auth(AuthError::LoginRejected(_)))));
    assert_eq!(portal.counters().sessions_closed, 1);
}
