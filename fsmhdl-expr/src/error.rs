//! Expression error types.

use thiserror::Error;

/// Legend of every operator spelling the parser accepts.
pub const GRAMMAR_HELP: &str = "operators: not = '!', '~', 'not'; and = '&', 'and'; \
or = '|', ',', 'or'; literals: TRUE, FALSE; identifiers start with a letter \
followed by letters, digits or '_'";

/// Errors from parsing, lowering, or converting expression values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("syntax error at position {position}: {reason}")]
    Syntax { position: usize, reason: String },

    #[error("malformed expression node: {reason}")]
    MalformedNode { reason: String },

    #[error("'{name}' is not a valid identifier")]
    InvalidIdentifier { name: String },

    #[error("value '{value}' is not a logic level (expected 0, 1, true or false)")]
    InvalidValue { value: String },
}

impl ExprError {
    pub(crate) fn syntax(position: usize, reason: impl Into<String>) -> Self {
        ExprError::Syntax {
            position,
            reason: reason.into(),
        }
    }

    /// Returns true for failures caused by malformed expression text.
    pub fn is_syntax(&self) -> bool {
        matches!(self, ExprError::Syntax { .. })
    }

    /// Returns an error code suitable for reports.
    pub fn error_code(&self) -> &'static str {
        match self {
            ExprError::Syntax { .. } => "EXPRESSION_SYNTAX",
            ExprError::MalformedNode { .. } => "MALFORMED_EXPRESSION",
            ExprError::InvalidIdentifier { .. } => "INVALID_IDENTIFIER",
            ExprError::InvalidValue { .. } => "INVALID_VALUE",
        }
    }
}
