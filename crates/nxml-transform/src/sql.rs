//! SQL literal escaping
//!
//! Every value interpolated into generated SQL (titles, DOIs, genre names,
//! journal paths) passes through here first. The target is MySQL/MariaDB
//! string literals, where a backslash escapes the next character.

/// Prefix every `\` and `'` with a backslash
pub fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        if matches!(c, '\\' | '\'') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Escaped value wrapped in single quotes
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", escape_literal(value))
}
