//! Syntactic email checks applied before any analysis

use regex::Regex;
use std::sync::LazyLock;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern is a valid regex")
});

/// Lower-case and trim a raw address
pub fn normalize_email(raw: &str) -> String {
    raw.to_lowercase().trim().to_string()
}

/// Whether `email` has the `local@domain.tld` shape the analyzer expects.
///
/// A match guarantees exactly one `@`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}
