//! Secret redaction for evidence output.
//!
//! Evidence artifacts leave the machine, so anything credential-shaped is
//! reduced to a fixed-length fingerprint before serialization.

use serde_json::Value;

const MASK: char = '*';
const MASK_LEN: usize = 4;
const VISIBLE_SUFFIX: usize = 4;

/// Field names (case-insensitive substring match) treated as secret-like.
const SECRET_MARKERS: [&str; 5] = ["token", "secret", "key", "password", "credential"];

/// Reduce a secret to a fixed-length fingerprint: a mask prefix plus the
/// last four characters. Secrets of four characters or fewer are fully
/// masked so the fingerprint never reveals the whole value.
pub fn fingerprint(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    let mut out = String::with_capacity(MASK_LEN + VISIBLE_SUFFIX);
    for _ in 0..MASK_LEN {
        out.push(MASK);
    }
    if chars.len() > VISIBLE_SUFFIX {
        out.extend(&chars[chars.len() - VISIBLE_SUFFIX..]);
    } else {
        for _ in 0..VISIBLE_SUFFIX {
            out.push(MASK);
        }
    }
    out
}

/// True when a field name should be treated as secret-like.
pub fn is_secret_field(field: &str) -> bool {
    let lower = field.to_ascii_lowercase();
    SECRET_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Recursively mask every secret-like string field in a JSON value.
///
/// Already-fingerprinted values pass through unchanged: the fingerprint of
/// a fingerprint is itself.
pub fn redact_json(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (field, v) in map.iter_mut() {
                match v {
                    Value::String(s) if is_secret_field(field) => {
                        *v = Value::String(fingerprint(s));
                    }
                    _ => redact_json(v),
                }
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                redact_json(item);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fingerprint_keeps_last_four() {
        assert_eq!(fingerprint("abcdef123456"), "****3456");
    }

    #[test]
    fn fingerprint_is_fixed_length() {
        assert_eq!(fingerprint("abcdef123456").len(), 8);
        assert_eq!(fingerprint("x").len(), 8);
    }

    #[test]
    fn short_secret_fully_masked() {
        assert_eq!(fingerprint("abcd"), "********");
        assert_eq!(fingerprint(""), "********");
    }

    #[test]
    fn fingerprint_is_idempotent() {
        let once = fingerprint("abcdef123456");
        assert_eq!(fingerprint(&once), once);
    }

    #[test]
    fn redact_walks_nested_fields() {
        let mut value = json!({
            "scope": "guild-1",
            "api_token": "abcdef123456",
            "nested": {"client_secret": "topsecret99", "name": "status"},
            "items": [{"password": "hunter2hunter2"}]
        });
        redact_json(&mut value);
        assert_eq!(value["api_token"], "****3456");
        assert_eq!(value["nested"]["client_secret"], "****et99");
        assert_eq!(value["nested"]["name"], "status");
        assert_eq!(value["items"][0]["password"], "****ter2");
        assert_eq!(value["scope"], "guild-1");
    }

    #[test]
    fn non_string_secret_fields_untouched() {
        let mut value = json!({"token_count": 3});
        redact_json(&mut value);
        assert_eq!(value["token_count"], 3);
    }
}
