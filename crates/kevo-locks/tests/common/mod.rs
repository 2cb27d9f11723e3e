#![allow(dead_code)]

//! Shared fixtures for lock integration tests.

use kevo_locks::testing::FakePortal;
use kevo_locks::{ClientOptions, LockController, PollConfig};
use std::time::Duration;

pub const FRONT: &str = "cca7cd1d-c4c3-4f30-b8ed-2b3a5b5dd7be";
pub const GARAGE: &str = "5f1c0a4e-9b2d-4a8e-8c61-0d2f7e3b9a10";

/// A portal with a locked front door and an unlocked garage.
pub fn portal() -> FakePortal {
    FakePortal::new("alice@example.com", "correct horse")
        .with_lock(FRONT, "Front Door", "Locked")
        .with_lock(GARAGE, "Garage", "Unlocked")
}

/// Options with a short poll interval so convergence tests stay fast.
pub fn fast_options() -> ClientOptions {
    ClientOptions::default().with_poll(PollConfig {
        interval: Duration::from_millis(10),
        timeout: Duration::from_secs(2),
    })
}

/// Controller built from a detail payload, without touching the portal.
pub fn controller(portal: &FakePortal, lock_id: &str, bolt_state: &str) -> LockController {
    let detail = serde_json::json!({
        "id": lock_id,
        "name": "Front Door",
        "bolt_state": bolt_state,
    });
    LockController::from_detail(portal.transport(), portal.credentials(), detail, fast_options())
        .unwrap()
}
