//! Identifier handling: quoting for SQL text and sanitizing raw catalog names
//! into identifiers usable by generated code.
//!
//! SQL identifiers cannot be bound as parameters, so catalog names that end up
//! in DDL or in catalog queries are validated and quoted here. Raw names are
//! also turned into logical identifiers: alphanumeric runs joined by a
//! separator, never starting with a digit, never colliding with an identifier
//! already claimed in the same scope.

use std::collections::HashSet;

use crate::error::{ReverseError, Result};

/// Maximum identifier length (SQL Server limit; Pervasive is stricter for columns).
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Prefix of synthesized names for indexes the catalog reports without one.
pub const UNNAMED_INDEX_PREFIX: &str = "unnamed_index_";

/// Validate an identifier for security issues.
///
/// Rejects:
/// - Empty identifiers
/// - Identifiers containing null bytes (injection vector)
/// - Identifiers exceeding maximum length
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ReverseError::Config(
            "Identifier cannot be empty".to_string(),
        ));
    }

    if name.contains('\0') {
        return Err(ReverseError::Config(format!(
            "SECURITY: Identifier contains null byte (possible injection attempt): {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ReverseError::Config(format!(
            "SECURITY: Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}

/// Quote a SQL Server identifier using brackets.
///
/// Escapes closing brackets by doubling them and wraps in brackets.
///
/// ```ignore
/// assert_eq!(quote_mssql("users")?, "[users]");
/// assert_eq!(quote_mssql("table]name")?, "[table]]name]");
/// ```
pub fn quote_mssql(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("[{}]", name.replace(']', "]]")))
}

/// Quote an identifier with ANSI double quotes (Pervasive).
pub fn quote_double(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// Escape a value for use inside a single-quoted SQL string literal.
pub fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Strip one pair of surrounding single quotes from a catalog identifier.
pub fn clean_delimited_identifier(identifier: &str) -> &str {
    identifier
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(identifier)
}

/// Synthesized name for an index that has no catalog name.
pub fn unnamed_index_name(table: &str, ordinal: impl std::fmt::Display) -> String {
    format!("{}{}_{}", UNNAMED_INDEX_PREFIX, table, ordinal)
}

/// Escape a real index name that would be mistaken for a synthesized one.
pub fn escape_index_name(name: &str) -> String {
    if name.starts_with(UNNAMED_INDEX_PREFIX) {
        format!("_{}", name)
    } else {
        name.to_string()
    }
}

/// Alphanumeric runs of a raw name.
fn tokens(raw: &str) -> Vec<&str> {
    raw.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect()
}

fn ucfirst(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// How tokens of a raw name are assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizeStyle {
    /// First token verbatim, later tokens capitalized, joined by the separator:
    /// `order line` -> `order_Line`.
    Joined,
    /// Every token capitalized and concatenated: `order line` -> `OrderLine`.
    Camel,
}

/// Turns raw catalog names into logical identifiers.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    separator: String,
    style: SanitizeStyle,
    same_name: bool,
}

impl Sanitizer {
    pub fn new(style: SanitizeStyle, separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
            style,
            same_name: false,
        }
    }

    /// Return raw names verbatim.
    pub fn with_same_name(mut self, same_name: bool) -> Self {
        self.same_name = same_name;
        self
    }

    pub fn style(&self) -> SanitizeStyle {
        self.style
    }

    fn digit_prefix(&self) -> &str {
        if self.separator.is_empty() {
            "_"
        } else {
            &self.separator
        }
    }

    /// Sanitize a raw name.
    ///
    /// A name without any alphanumeric run is returned unchanged.
    pub fn clean(&self, raw: &str) -> String {
        if self.same_name {
            return raw.to_string();
        }

        let tokens = tokens(raw);
        if tokens.is_empty() {
            return raw.to_string();
        }

        let joined = match self.style {
            SanitizeStyle::Joined => {
                let mut out = tokens[0].to_string();
                for token in &tokens[1..] {
                    out.push_str(&self.separator);
                    out.push_str(&ucfirst(token));
                }
                out
            }
            SanitizeStyle::Camel => tokens.iter().map(|t| ucfirst(t)).collect(),
        };

        if joined.starts_with(|c: char| c.is_ascii_digit()) {
            format!("{}{}", self.digit_prefix(), joined)
        } else {
            joined
        }
    }
}

/// Logical identifiers already handed out within one scope (tables of a
/// database, columns of a table).
#[derive(Debug, Default)]
pub struct IdentifierScope {
    taken: HashSet<String>,
}

impl IdentifierScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `candidate`, appending `_2`, `_3`, ... until it is free.
    /// Comparison is case-insensitive.
    pub fn claim(&mut self, candidate: &str) -> String {
        let mut name = candidate.to_string();
        let mut n = 2;
        while !self.taken.insert(name.to_ascii_lowercase()) {
            name = format!("{}_{}", candidate, n);
            n += 1;
        }
        name
    }

    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(&name.to_ascii_lowercase())
    }
}
