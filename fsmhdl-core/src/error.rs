//! Core error types.

use crate::arena::{StateId, TransitionId};
use fsmhdl_expr::ExprError;
use std::convert::Infallible;
use thiserror::Error;

/// Errors from the state machine model.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid condition expression '{text}': {source}")]
    ConditionExpression {
        text: String,
        #[source]
        source: ExprError,
    },

    #[error("cannot convert condition '{condition}': {reason}")]
    ConditionConversion { condition: String, reason: String },

    #[error(transparent)]
    Expr(#[from] ExprError),

    #[error("invalid filter mode '{mode}': expected \"and\" or \"or\"")]
    InvalidFilterMode { mode: String },

    #[error("unknown state handle {id}")]
    UnknownState { id: StateId },

    #[error("unknown transition handle {id}")]
    UnknownTransition { id: TransitionId },

    #[error("invalid states: {reason}")]
    InvalidStates { reason: String },

    #[error("states {} are not reachable", .states.join(", "))]
    UnreachableState { states: Vec<String> },

    #[error("states {} are not exitable", .states.join(", "))]
    UnexitableState { states: Vec<String> },

    #[error("invalid machine definition: {reason}")]
    InvalidDefinition { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<Infallible> for CoreError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

impl CoreError {
    /// Returns whether this error is a graph-validity failure.
    pub fn is_graph_error(&self) -> bool {
        matches!(
            self,
            CoreError::UnreachableState { .. }
                | CoreError::UnexitableState { .. }
                | CoreError::InvalidStates { .. }
        )
    }

    /// Returns an error code suitable for reports.
    pub fn error_code(&self) -> &'static str {
        match self {
            CoreError::ConditionExpression { .. } => "CONDITION_EXPRESSION",
            CoreError::ConditionConversion { .. } => "CONDITION_CONVERSION",
            CoreError::Expr(e) => e.error_code(),
            CoreError::InvalidFilterMode { .. } => "INVALID_VALUE",
            CoreError::UnknownState { .. } => "UNKNOWN_STATE",
            CoreError::UnknownTransition { .. } => "UNKNOWN_TRANSITION",
            CoreError::InvalidStates { .. } => "INVALID_STATES",
            CoreError::UnreachableState { .. } => "UNREACHABLE_STATE",
            CoreError::UnexitableState { .. } => "UNEXITABLE_STATE",
            CoreError::InvalidDefinition { .. } => "BAD_DEFINITION",
            CoreError::Io(_) => "IO_ERROR",
            CoreError::Json(_) => "BAD_DEFINITION",
            CoreError::Yaml(_) => "BAD_DEFINITION",
        }
    }
}
