//! Credential redaction for structured log fields.

use serde_json::Value;

pub(crate) const REDACTED: &str = "[REDACTED]";

const DENYLIST_KEYS: [&str; 7] = [
    "password",
    "token",
    "authenticity_token",
    "cookie",
    "authorization",
    "secret",
    "credentials",
];

pub(crate) fn is_sensitive_key(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    DENYLIST_KEYS
        .iter()
        .any(|denied| lower == *denied || lower.ends_with(&format!("_{denied}")))
}

/// Replace the value of a sensitive key.
pub(crate) fn sanitize(key: &str, value: Value) -> Value {
    if is_sensitive_key(key) {
        Value::String(REDACTED.to_string())
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_whole_keys_and_suffixes() {
        assert!(is_sensitive_key("password"));
        assert!(is_sensitive_key("Password"));
        assert!(is_sensitive_key("user_password"));
        assert!(is_sensitive_key("authenticity_token"));
        assert!(is_sensitive_key("session_cookie"));
        assert!(!is_sensitive_key("session_id"));
        assert!(!is_sensitive_key("lock_id"));
        assert!(!is_sensitive_key("tokens_used"));
    }

    #[test]
    fn sanitize_replaces_only_sensitive_values() {
        assert_eq!(
            sanitize("password", Value::String("hunter2".into())),
            Value::String(REDACTED.into())
        );
        assert_eq!(sanitize("status", Value::from(200)), Value::from(200));
    }
}
