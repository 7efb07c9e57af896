#![deny(missing_docs)]

//! # Naming Utilities
//!
//! Helpers for turning endpoint names into TypeScript identifiers and literals.

use heck::ToUpperCamelCase;

/// Suffix of each endpoint's schema constant in the generated module.
pub const SCHEMAS_SUFFIX: &str = "_EndpointSchemas";

/// Derives the per-endpoint constant name, e.g. `endpoint1` -> `Endpoint1_EndpointSchemas`.
pub fn schemas_identifier(endpoint_name: &str) -> String {
    let mut base: String = endpoint_name
        .to_upper_camel_case()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if base.is_empty() || base.starts_with(|c: char| c.is_ascii_digit()) {
        base.insert(0, '_');
    }
    format!("{}{}", base, SCHEMAS_SUFFIX)
}

/// Returns true if `s` can be used as a bare object key.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Renders a single-quoted TypeScript string literal.
pub fn ts_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Renders an object key: bare when it is an identifier, quoted otherwise.
pub fn object_key(s: &str) -> String {
    if is_identifier(s) {
        s.to_string()
    } else {
        ts_string(s)
    }
}
