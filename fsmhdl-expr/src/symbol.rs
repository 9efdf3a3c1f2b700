//! Identifiers used as expression variables, state names and output names.

use crate::error::ExprError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

const RESERVED: [&str; 5] = ["true", "false", "and", "or", "not"];

/// Returns whether `name` is a valid identifier.
///
/// Identifiers start with an ASCII letter, continue with ASCII letters,
/// digits or underscores, and are not one of the reserved words of the
/// expression grammar (compared case-insensitively).
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    starts_with_letter
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !is_reserved(name)
}

pub(crate) fn is_reserved(word: &str) -> bool {
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(word))
}

/// A variable name inside an expression.
///
/// Cloning is a reference count bump, so symbols can be shared freely between
/// trees.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(Arc<str>);

impl Symbol {
    /// Creates a symbol, validating the name.
    pub fn new(name: &str) -> Result<Self, ExprError> {
        if !is_identifier(name) {
            return Err(ExprError::InvalidIdentifier {
                name: name.to_string(),
            });
        }
        Ok(Self(Arc::from(name)))
    }

    /// Creates a symbol from text the parser has already checked.
    pub(crate) fn new_unchecked(name: &str) -> Self {
        Self(Arc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Symbol {
    type Error = ExprError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Symbol::new(&value)
    }
}

impl TryFrom<&str> for Symbol {
    type Error = ExprError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Symbol::new(value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        assert!(is_identifier("x"));
        assert!(is_identifier("reset_n"));
        assert!(is_identifier("S0"));
        assert!(is_identifier("android"));
    }

    #[test]
    fn test_invalid_identifiers() {
        assert!(!is_identifier(""));
        assert!(!is_identifier("5x"));
        assert!(!is_identifier("_x"));
        assert!(!is_identifier("x-y"));
        assert!(!is_identifier("TRUE"));
        assert!(!is_identifier("Not"));
    }

    #[test]
    fn test_symbol_new() {
        let symbol = Symbol::new("start").unwrap();
        assert_eq!(symbol.as_str(), "start");
        assert_eq!(symbol.to_string(), "start");

        let err = Symbol::new("9lives").unwrap_err();
        assert!(matches!(err, ExprError::InvalidIdentifier { .. }));
    }

    #[test]
    fn test_symbol_serde() {
        let symbol: Symbol = serde_json::from_str("\"go\"").unwrap();
        assert_eq!(symbol.as_str(), "go");
        assert!(serde_json::from_str::<Symbol>("\"or\"").is_err());
    }
}
