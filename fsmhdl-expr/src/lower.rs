//! Lowering to VHDL relational text.
//!
//! Variables become comparisons against `'1'`, a negated variable becomes a
//! comparison against `'0'`, and the connectives become `and`, `or` and
//! `not (...)`. Parentheses are emitted only where a looser operator sits
//! under a tighter one.

use crate::error::ExprError;
use crate::expr::{Expr, Precedence};

impl Expr {
    /// Renders the expression as a VHDL boolean condition.
    ///
    /// Fails with [`ExprError::MalformedNode`] if an `And` or `Or` node has
    /// fewer than two operands.
    pub fn to_relational(&self) -> Result<String, ExprError> {
        lower(self, Precedence::Atom)
    }
}

/// Lowers `expr` in a context that demands at least `context` precedence.
fn lower(expr: &Expr, context: Precedence) -> Result<String, ExprError> {
    match expr {
        Expr::Literal(value) => Ok(value.to_string()),
        Expr::Variable(symbol) => Ok(format!("{}='1'", symbol)),
        Expr::Not(inner) => match inner.as_ref() {
            Expr::Variable(symbol) => Ok(format!("{}='0'", symbol)),
            other => Ok(format!("not ({})", lower(other, Precedence::Not)?)),
        },
        Expr::And(operands) => lower_junction(operands, "and", Precedence::And, context),
        Expr::Or(operands) => lower_junction(operands, "or", Precedence::Or, context),
    }
}

fn lower_junction(
    operands: &[Expr],
    keyword: &str,
    precedence: Precedence,
    context: Precedence,
) -> Result<String, ExprError> {
    if operands.len() < 2 {
        return Err(ExprError::MalformedNode {
            reason: format!(
                "'{}' node needs at least 2 operands, found {}",
                keyword,
                operands.len()
            ),
        });
    }

    let lowered = operands
        .iter()
        .map(|operand| lower(operand, precedence))
        .collect::<Result<Vec<_>, _>>()?;
    let joined = lowered.join(&format!(" {} ", keyword));

    if precedence < context {
        Ok(format!("({})", joined))
    } else {
        Ok(joined)
    }
}
