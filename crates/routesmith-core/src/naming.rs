//! String casing utilities used to derive identifiers from operation and
//! resource names.
//!
//! Every identifier in a route table comes from a single declared name, so
//! these functions must be deterministic and must not reinterpret acronyms.

use once_cell::sync::Lazy;
use regex::Regex;

static KEBAB_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("kebab boundary pattern is valid"));

/// Convert a camelCase or PascalCase name to kebab-case.
///
/// A hyphen goes between a lowercase letter or digit and a following
/// uppercase letter, then the whole string is lower-cased. Runs of capitals
/// are left joined: `GetHTTPResponse` becomes `get-httpresponse`.
pub fn to_kebab_case(s: &str) -> String {
    KEBAB_BOUNDARY.replace_all(s, "${1}-${2}").to_lowercase()
}

/// Upper-case the first character and keep the rest. Empty input is returned unchanged.
pub fn first_upper(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// Lower-case the first character and keep the rest. Empty input is returned unchanged.
pub fn first_lower(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}
