//! Log sanitization utilities
//!
//! Response bodies can be large (a zone with thousands of records) and
//! request headers carry the API token. Neither goes to the log verbatim.

/// Maximum number of bytes of a body included in a log line.
const TRUNCATE_LIMIT: usize = 256;

/// Number of leading token characters kept by [`mask_secret`].
const VISIBLE_SECRET_PREFIX: usize = 4;

/// Largest char boundary `<= index`.
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    (0..=index).rev().find(|i| s.is_char_boundary(*i)).unwrap_or(0)
}

/// Truncate a string for safe logging.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        return s.to_string();
    }
    format!(
        "{}... [truncated, total {} bytes]",
        &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
        s.len()
    )
}

/// Mask a secret, keeping only a short prefix: `abcd****`.
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }
    let visible = floor_char_boundary(secret, VISIBLE_SECRET_PREFIX.min(secret.len() / 2));
    format!("{}****", &secret[..visible])
}
