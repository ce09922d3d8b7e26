//! Token validation
//!
//! Both identifier families share one rule: a token is non-empty and every
//! character belongs to the family's charset.

/// Wildcard marker terminating an identifier
pub const WILDCARD: &str = "*";

/// Wildcard marker as a character
pub const WILDCARD_CHAR: char = '*';

/// Character set of an identifier family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Charset {
    /// Latin letters, digits, `-`, `_`, `@`, `.` and `+`
    Krn,
    /// Lowercase latin letters and `-`
    Action,
}

impl Charset {
    /// Check whether a single character is allowed in a token
    pub const fn allows(self, c: char) -> bool {
        match self {
            Charset::Krn => {
                c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '@' | '.' | '+')
            }
            Charset::Action => c.is_ascii_lowercase() || c == '-',
        }
    }

    /// Check whether a token is non-empty and uses only allowed characters
    pub fn is_valid_token(self, token: &str) -> bool {
        !token.is_empty() && token.chars().all(|c| self.allows(c))
    }
}

/// Check whether a token is the wildcard marker
pub fn is_wildcard(token: &str) -> bool {
    token == WILDCARD
}
