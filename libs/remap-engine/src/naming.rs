//! Column-name resolution helpers.
//!
//! Source field names arrive as camelCase, spaced words, or already
//! underscored tokens; all three must resolve to the same column name.

/// Lowercase `name`, inserting `_` at camelCase word boundaries.
///
/// A boundary sits between a lowercase letter or digit and an uppercase
/// letter (`userId` → `user_id`), and between an uppercase run and its last
/// member when that member starts a new word (`HTMLParser` → `html_parser`).
pub fn decamelize(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let word_start = prev.is_ascii_lowercase() || prev.is_ascii_digit();
            let run_end = prev.is_ascii_uppercase()
                && chars
                    .get(i + 1)
                    .is_some_and(|n| n.is_ascii_lowercase() || n.is_ascii_digit());
            if word_start || run_end {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }

    out
}

/// Canonical column-name segment: decamelized, spaces replaced with `_`.
pub fn fix_naming(name: &str) -> String {
    decamelize(name).replace(' ', "_")
}

/// Case-insensitive substring check of a single pattern.
pub fn contains_pattern(haystack: &str, pattern: &str) -> bool {
    haystack.to_lowercase().contains(&pattern.to_lowercase())
}

/// Case-insensitive substring check against a pattern list.
pub fn contains_any(haystack: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|p| contains_pattern(haystack, p))
}
