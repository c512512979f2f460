//! Lexical helpers for emitting Cypher text
//!
//! Everything that interpolates user-provided names or strings into a statement
//! goes through these functions so the emitted text always tokenizes the way
//! the caller intended.

use crate::error::BuilderError;

/// Keywords that cannot appear bare where an identifier is expected
const RESERVED_WORDS: &[&str] = &[
    "ADD", "ALL", "AND", "AS", "ASC", "ASCENDING", "BY", "CALL", "CASE", "CONSTRAINT", "CONTAINS",
    "CREATE", "DELETE", "DESC", "DESCENDING", "DETACH", "DISTINCT", "DO", "DROP", "ELSE", "END",
    "ENDS", "EXISTS", "FALSE", "FOR", "IN", "IS", "LIMIT", "MANDATORY", "MATCH", "MERGE", "NOT",
    "NULL", "OF", "ON", "OPTIONAL", "OR", "ORDER", "REMOVE", "REQUIRE", "RETURN", "SCALAR", "SET",
    "SKIP", "STARTS", "THEN", "TRUE", "UNION", "UNIQUE", "UNWIND", "WHEN", "WHERE", "WITH", "XOR",
    "YIELD",
];

/// Returns true if `name` can be emitted without backticks
pub fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_well = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    starts_well
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !RESERVED_WORDS
            .iter()
            .any(|word| word.eq_ignore_ascii_case(name))
}

/// Escapes a variable, label, relationship type or property key
///
/// Plain identifiers are returned unchanged. Anything else is wrapped in
/// backticks with embedded backticks doubled.
pub fn escape_identifier(name: &str) -> Result<String, BuilderError> {
    if name.is_empty() {
        return Err(BuilderError::EmptyIdentifier);
    }
    if is_plain_identifier(name) {
        Ok(name.to_string())
    } else {
        Ok(format!("`{}`", name.replace('`', "``")))
    }
}

/// Renders `value` as a single-quoted Cypher string literal
pub fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}
