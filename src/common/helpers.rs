// Helper functions for safe logging and request parsing

use serde::{Deserialize, Deserializer};

/// Masks email addresses for safe logging
///
/// # Example
/// ```
/// use finance_api::common::safe_email_log;
///
/// assert_eq!(safe_email_log("user@example.com"), "u***@example.com");
/// ```
pub fn safe_email_log(email: &str) -> String {
    if email.len() > 3 {
        let parts: Vec<&str> = email.split('@').collect();
        match (parts.as_slice(), email.chars().next()) {
            ([local, domain], Some(first)) if !local.is_empty() => {
                format!("{}***@{}", first, domain)
            }
            _ => "***@***.***".to_string(),
        }
    } else {
        "***@***.***".to_string()
    }
}

/// Masks tokens for safe logging
/// Shows only first and last 4 characters
pub fn safe_token_log(token: &str) -> String {
    if token.len() > 8 && token.is_ascii() {
        format!("{}...{}", &token[..4], &token[token.len() - 4..])
    } else {
        "***".to_string()
    }
}

/// JSON keys whose values never reach the logs.
const REDACTED_KEYS: &[&str] = &[
    "password",
    "accessToken",
    "refreshToken",
    "access_token",
    "refresh_token",
    "tokens",
];

/// Replaces secret values in a JSON document with `"[REDACTED]"`, recursively.
pub fn redact_json(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, inner) in map.iter_mut() {
                if REDACTED_KEYS.contains(&key.as_str()) {
                    *inner = serde_json::Value::String("[REDACTED]".to_string());
                } else {
                    redact_json(inner);
                }
            }
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(redact_json),
        _ => {}
    }
}

/// For PATCH fields that can be cleared. Paired with `#[serde(default)]`, an
/// absent field stays `None` while an explicit `null` becomes `Some(None)`.
pub fn deserialize_nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
