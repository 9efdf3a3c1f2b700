//! Algebraic simplification.

use crate::expr::Expr;
use std::collections::BTreeSet;

/// The two n-ary connectives, which simplify by the same laws with the
/// constants swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Junction {
    And,
    Or,
}

impl Junction {
    /// The constant that can be dropped from the operand list.
    pub(crate) fn identity(self) -> bool {
        self == Junction::And
    }

    /// The constant that decides the whole node.
    pub(crate) fn annihilator(self) -> bool {
        !self.identity()
    }

    pub(crate) fn build(self, operands: Vec<Expr>) -> Expr {
        match self {
            Junction::And => Expr::all(operands),
            Junction::Or => Expr::any(operands),
        }
    }

    fn children(self, expr: &Expr) -> Option<&[Expr]> {
        match (self, expr) {
            (Junction::And, Expr::And(operands)) | (Junction::Or, Expr::Or(operands)) => {
                Some(operands)
            }
            _ => None,
        }
    }

    fn dual(self) -> Junction {
        match self {
            Junction::And => Junction::Or,
            Junction::Or => Junction::And,
        }
    }
}

impl Expr {
    /// Returns an equivalent, simplified tree.
    ///
    /// Applied bottom-up: double negation, constant folding, identity and
    /// annihilator laws, flattening of nested same-kind nodes, duplicate
    /// removal, the complement law and absorption. Operands of the result are
    /// sorted, so equivalent inputs often simplify to equal trees, but the
    /// result is not a canonical form.
    pub fn simplify(&self) -> Expr {
        match self {
            Expr::Literal(_) | Expr::Variable(_) => self.clone(),
            Expr::Not(inner) => match inner.simplify() {
                Expr::Literal(value) => Expr::Literal(!value),
                Expr::Not(operand) => *operand,
                other => Expr::negate(other),
            },
            Expr::And(operands) => simplify_junction(operands, Junction::And),
            Expr::Or(operands) => simplify_junction(operands, Junction::Or),
        }
    }
}

fn simplify_junction(operands: &[Expr], junction: Junction) -> Expr {
    let mut flat: BTreeSet<Expr> = BTreeSet::new();

    for operand in operands {
        match operand.simplify() {
            Expr::Literal(value) if value == junction.annihilator() => {
                return Expr::Literal(value);
            }
            Expr::Literal(_) => {}
            simplified => match junction.children(&simplified) {
                Some(children) => flat.extend(children.iter().cloned()),
                None => {
                    flat.insert(simplified);
                }
            },
        }
    }

    // x & !x = FALSE, x | !x = TRUE
    let complemented = flat.iter().any(|operand| match operand {
        Expr::Not(inner) => flat.contains(inner.as_ref()),
        _ => false,
    });
    if complemented {
        return Expr::Literal(junction.annihilator());
    }

    junction.build(absorb(flat.into_iter().collect(), junction))
}

/// Drops operands absorbed by another operand: `x & (x | y) = x`, and
/// `(x | y) & (x | y | z) = x | y`.
fn absorb(operands: Vec<Expr>, junction: Junction) -> Vec<Expr> {
    let dual = junction.dual();
    let parts: Vec<BTreeSet<&Expr>> = operands
        .iter()
        .map(|operand| match dual.children(operand) {
            Some(children) => children.iter().collect(),
            None => std::iter::once(operand).collect(),
        })
        .collect();

    operands
        .iter()
        .enumerate()
        .filter(|(j, _)| {
            !parts
                .iter()
                .enumerate()
                .any(|(i, part)| i != *j && part.len() < parts[*j].len() && part.is_subset(&parts[*j]))
        })
        .map(|(_, operand)| operand.clone())
        .collect()
}
