//! Lock identity and state snapshot types.

use crate::{KevoError, KevoResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identifier of a lock (a UUID string on mykevo.com).
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LockId(String);

impl LockId {
    /// Creates a lock ID from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the lock ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for LockId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for LockId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Reported bolt position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoltState {
    Locked,
    Unlocked,
    /// Not yet observed, or a value passed through under [`UnknownStatePolicy::PassThrough`].
    Unknown,
}

impl BoltState {
    /// Case-insensitive match against "locked" / "unlocked".
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("locked") {
            Some(BoltState::Locked)
        } else if trimmed.eq_ignore_ascii_case("unlocked") {
            Some(BoltState::Unlocked)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BoltState::Locked => "locked",
            BoltState::Unlocked => "unlocked",
            BoltState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for BoltState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoltState {
    type Err = KevoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BoltState::parse(s).ok_or_else(|| KevoError::UnknownState(s.to_string()))
    }
}

/// What to do with a bolt state string that is neither locked nor unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownStatePolicy {
    /// Fail the refresh with [`KevoError::UnknownState`].
    #[default]
    Reject,
    /// Store [`BoltState::Unknown`] and keep the raw value in the snapshot.
    PassThrough,
}

impl UnknownStatePolicy {
    pub(crate) fn resolve(self, raw: &str) -> KevoResult<BoltState> {
        match (BoltState::parse(raw), self) {
            (Some(state), _) => Ok(state),
            (None, UnknownStatePolicy::PassThrough) => Ok(BoltState::Unknown),
            (None, UnknownStatePolicy::Reject) => Err(KevoError::UnknownState(raw.to_string())),
        }
    }
}

/// Who a lock is: immutable once discovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockIdentity {
    pub lock_id: LockId,
    pub name: String,
}

/// Fields of the `lock.json` payload this client relies on.
#[derive(Debug, Deserialize)]
struct LockDetail {
    id: String,
    #[serde(default)]
    name: String,
    bolt_state: String,
}

/// Last observed state of a lock.
///
/// Only a refresh replaces it. Between refreshes it is stale and says nothing
/// about the physical bolt right now.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LockState {
    identity: LockIdentity,
    bolt_state: BoltState,
    raw_snapshot: serde_json::Value,
    refreshed_at: Option<DateTime<Utc>>,
}

impl LockState {
    /// A state known only by its ID, before the first refresh.
    pub fn pending(lock_id: LockId) -> Self {
        Self {
            identity: LockIdentity {
                lock_id,
                name: String::new(),
            },
            bolt_state: BoltState::Unknown,
            raw_snapshot: serde_json::Value::Null,
            refreshed_at: None,
        }
    }

    /// Build a state from a `lock.json` payload.
    pub fn from_detail(raw: serde_json::Value, policy: UnknownStatePolicy) -> KevoResult<Self> {
        let detail: LockDetail = serde_json::from_value(raw.clone())?;
        let bolt_state = policy.resolve(&detail.bolt_state)?;

        Ok(Self {
            identity: LockIdentity {
                lock_id: LockId::from(detail.id),
                name: detail.name,
            },
            bolt_state,
            raw_snapshot: raw,
            refreshed_at: Some(Utc::now()),
        })
    }

    pub fn identity(&self) -> &LockIdentity {
        &self.identity
    }

    pub fn lock_id(&self) -> &LockId {
        &self.identity.lock_id
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn bolt_state(&self) -> BoltState {
        self.bolt_state
    }

    /// The full payload of the last refresh (`Null` before the first one).
    pub fn raw_snapshot(&self) -> &serde_json::Value {
        &self.raw_snapshot
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    /// The bolt state string exactly as the portal last reported it.
    pub fn reported_bolt_state(&self) -> Option<&str> {
        self.raw_snapshot.get("bolt_state").and_then(|v| v.as_str())
    }

    /// Take name, bolt state and snapshot from a fresher observation.
    /// The lock ID never changes.
    pub(crate) fn absorb(&mut self, fresh: LockState) {
        self.identity.name = fresh.identity.name;
        self.bolt_state = fresh.bolt_state;
        self.raw_snapshot = fresh.raw_snapshot;
        self.refreshed_at = fresh.refreshed_at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bolt_state_parse_ignores_case() {
        for raw in ["locked", "Locked", "LOCKED", " locked "] {
            assert_eq!(BoltState::parse(raw), Some(BoltState::Locked));
        }
        for raw in ["unlocked", "Unlocked", "UNLOCKED"] {
            assert_eq!(BoltState::parse(raw), Some(BoltState::Unlocked));
        }
        assert_eq!(BoltState::parse("jammed"), None);
    }

    #[test]
    fn bolt_state_from_str_rejects_unknown() {
        assert_eq!("Unlocked".parse::<BoltState>().unwrap(), BoltState::Unlocked);
        assert!(matches!(
            "processing".parse::<BoltState>(),
            Err(KevoError::UnknownState(raw)) if raw == "processing"
        ));
    }

    #[test]
    fn from_detail_keeps_raw_payload() {
        let raw = json!({
            "id": "cca7cd1d",
            "name": "Front Door",
            "bolt_state": "Locked",
            "battery_level": 80
        });

        let state = LockState::from_detail(raw.clone(), UnknownStatePolicy::Reject).unwrap();
        assert_eq!(state.lock_id().as_str(), "cca7cd1d");
        assert_eq!(state.name(), "Front Door");
        assert_eq!(state.bolt_state(), BoltState::Locked);
        assert_eq!(state.raw_snapshot(), &raw);
        assert_eq!(state.reported_bolt_state(), Some("Locked"));
        assert!(state.refreshed_at().is_some());
    }

    #[test]
    fn unknown_state_policy() {
        let raw = json!({"id": "a", "name": "Garage", "bolt_state": "Jammed"});

        assert!(matches!(
            LockState::from_detail(raw.clone(), UnknownStatePolicy::Reject),
            Err(KevoError::UnknownState(_))
        ));

        let state = LockState::from_detail(raw, UnknownStatePolicy::PassThrough).unwrap();
        assert_eq!(state.bolt_state(), BoltState::Unknown);
        assert_eq!(state.reported_bolt_state(), Some("Jammed"));
    }

    #[test]
    fn missing_bolt_state_is_a_json_error() {
        let raw = json!({"id": "a", "name": "Garage"});
        assert!(matches!(
            LockState::from_detail(raw, UnknownStatePolicy::PassThrough),
            Err(KevoError::Json(_))
        ));
    }

    #[test]
    fn pending_state_is_unknown_until_refreshed() {
        let state = LockState::pending(LockId::from("a"));
        assert_eq!(state.bolt_state(), BoltState::Unknown);
        assert!(state.refreshed_at().is_none());
        assert!(state.raw_snapshot().is_null());
    }

    #[test]
    fn absorb_keeps_lock_id() {
        let mut state = LockState::pending(LockId::from("a"));
        let fresh = LockState::from_detail(
            json!({"id": "A", "name": "Back Door", "bolt_state": "unlocked"}),
            UnknownStatePolicy::Reject,
        )
        .unwrap();

        state.absorb(fresh);
        assert_eq!(state.lock_id().as_str(), "a");
        assert_eq!(state.name(), "Back Door");
        assert_eq!(state.bolt_state(), BoltState::Unlocked);
    }
}
