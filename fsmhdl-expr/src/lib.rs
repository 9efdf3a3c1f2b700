//! # fsmhdl-expr
//!
//! Boolean expression engine for fsmhdl.
//!
//! This crate provides:
//! - Parsing of condition text into immutable [`Expr`] trees
//! - Substitution and algebraic simplification
//! - Disjunctive and conjunctive normal forms
//! - Lowering to VHDL relational text
//! - Logic levels and input bindings

pub mod error;
pub mod expr;
mod lower;
mod normal;
mod parser;
mod simplify;
pub mod symbol;
pub mod value;

pub use error::{ExprError, GRAMMAR_HELP};
pub use expr::{Expr, Precedence};
pub use parser::MAX_NESTING;
pub use symbol::{is_identifier, Symbol};
pub use value::{Bindings, LogicLevel};

/// Parses condition text into an expression.
pub fn parse(text: &str) -> Result<Expr, ExprError> {
    Expr::parse(text)
}
