//! Negation, disjunctive and conjunctive normal forms.
//!
//! Conversion distributes operators over each other, so the size of the
//! result can grow exponentially with the number of distinct symbols. No
//! limit is applied; callers bound their input.

use crate::expr::Expr;
use crate::simplify::Junction;
use crate::symbol::Symbol;
use std::collections::BTreeMap;

/// A conjunction (in DNF) or disjunction (in CNF) of literals, each symbol
/// mapped to its polarity. A map cannot hold `x` and `!x` together, which is
/// how contradictory terms are detected.
type Term = BTreeMap<Symbol, bool>;

impl Expr {
    /// Pushes negations down to the variables.
    pub fn to_nnf(&self) -> Expr {
        nnf(self, false)
    }

    /// Converts to an OR of ANDs of literals.
    ///
    /// Contradictory terms are dropped and subsumed terms absorbed, so an
    /// unsatisfiable expression converts to `FALSE`.
    pub fn to_dnf(&self) -> Expr {
        let terms = terms(&nnf(self, false));
        tracing::trace!(terms = terms.len(), "converted to DNF");
        build(terms, Junction::Or)
    }

    /// Converts to an AND of ORs of literals.
    ///
    /// Tautological clauses are dropped and subsumed clauses absorbed, so a
    /// tautology converts to `TRUE`.
    pub fn to_cnf(&self) -> Expr {
        // The clauses of e are the negated terms of !e.
        let clauses: Vec<Term> = terms(&nnf(self, true))
            .into_iter()
            .map(|term| term.into_iter().map(|(s, v)| (s, !v)).collect())
            .collect();
        tracing::trace!(clauses = clauses.len(), "converted to CNF");
        build(clauses, Junction::And)
    }
}

fn nnf(expr: &Expr, negated: bool) -> Expr {
    match expr {
        Expr::Literal(value) => Expr::Literal(*value != negated),
        Expr::Variable(_) if negated => Expr::negate(expr.clone()),
        Expr::Variable(_) => expr.clone(),
        Expr::Not(inner) => nnf(inner, !negated),
        Expr::And(operands) => {
            let operands = operands.iter().map(|o| nnf(o, negated)).collect();
            if negated {
                Expr::Or(operands)
            } else {
                Expr::And(operands)
            }
        }
        Expr::Or(operands) => {
            let operands = operands.iter().map(|o| nnf(o, negated)).collect();
            if negated {
                Expr::And(operands)
            } else {
                Expr::Or(operands)
            }
        }
    }
}

/// Computes the satisfiable DNF terms of an expression in negation normal
/// form.
fn terms(expr: &Expr) -> Vec<Term> {
    match expr {
        Expr::Literal(true) => vec![Term::new()],
        Expr::Literal(false) => Vec::new(),
        Expr::Variable(symbol) => vec![Term::from([(symbol.clone(), true)])],
        Expr::Not(inner) => match inner.as_ref() {
            Expr::Variable(symbol) => vec![Term::from([(symbol.clone(), false)])],
            other => terms(&nnf(other, true)),
        },
        Expr::Or(operands) => minimize(operands.iter().flat_map(terms).collect()),
        Expr::And(operands) => {
            let mut product = vec![Term::new()];
            for operand in operands {
                let factor = terms(operand);
                let mut next = Vec::with_capacity(product.len() * factor.len());
                for left in &product {
                    for right in &factor {
                        if let Some(term) = merge(left, right) {
                            next.push(term);
                        }
                    }
                }
                product = minimize(next);
                if product.is_empty() {
                    break;
                }
            }
            product
        }
    }
}

/// Conjoins two terms; `None` when they disagree on a symbol.
fn merge(left: &Term, right: &Term) -> Option<Term> {
    let mut term = left.clone();
    for (symbol, polarity) in right {
        match term.get(symbol) {
            Some(existing) if existing != polarity => return None,
            Some(_) => {}
            None => {
                term.insert(symbol.clone(), *polarity);
            }
        }
    }
    Some(term)
}

fn is_subterm(small: &Term, large: &Term) -> bool {
    small.len() <= large.len() && small.iter().all(|(s, v)| large.get(s) == Some(v))
}

/// Removes duplicate terms and terms that contain another term.
fn minimize(mut terms: Vec<Term>) -> Vec<Term> {
    terms.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    terms.dedup();

    let mut kept: Vec<Term> = Vec::with_capacity(terms.len());
    for term in terms {
        if !kept.iter().any(|k| is_subterm(k, &term)) {
            kept.push(term);
        }
    }
    kept
}

fn literal(symbol: Symbol, polarity: bool) -> Expr {
    let variable = Expr::Variable(symbol);
    if polarity {
        variable
    } else {
        Expr::negate(variable)
    }
}

/// Builds `outer` over terms whose literals are joined by the dual junction.
fn build(terms: Vec<Term>, outer: Junction) -> Expr {
    let inner = match outer {
        Junction::Or => Junction::And,
        Junction::And => Junction::Or,
    };
    outer.build(
        terms
            .into_iter()
            .map(|term| inner.build(term.into_iter().map(|(s, v)| literal(s, v)).collect()))
            .collect(),
    )
}
