//! Utility functions and helpers.

pub mod http;

/// Replace characters that are illegal in file names and trim stray spaces and dots.
pub fn sanitize_filename(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            other => other,
        })
        .collect();
    replaced.trim_matches(|c| c == ' ' || c == '.').to_string()
}

/// Split a `k=v; k=v` cookie string into trimmed pairs.
///
/// Segments without `=` are ignored.
pub fn parse_cookie_pairs(raw: &str) -> Vec<(&str, &str)> {
    raw.split(';')
        .filter_map(|part| part.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

/// Whether a credential string is a full cookie set rather than a bare token.
pub fn is_cookie_string(raw: &str) -> bool {
    raw.contains('=') || raw.contains(';')
}
