//! The boolean expression tree.

use crate::error::ExprError;
use crate::parser::Parser;
use crate::symbol::Symbol;
use crate::value::Bindings;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// An immutable boolean expression.
///
/// `And` and `Or` hold at least two operands. Transforms never modify a tree
/// in place; they return a new one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Expr {
    /// Constant `TRUE` or `FALSE`.
    Literal(bool),
    /// A free input variable.
    Variable(Symbol),
    /// Logical NOT.
    Not(Box<Expr>),
    /// Logical AND of two or more operands.
    And(Vec<Expr>),
    /// Logical OR of two or more operands.
    Or(Vec<Expr>),
}

/// Binding strength of an operator, loosest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Atom = 0,
    Or = 1,
    And = 2,
    Not = 3,
}

impl Expr {
    pub const TRUE: Expr = Expr::Literal(true);
    pub const FALSE: Expr = Expr::Literal(false);

    /// Parses expression text.
    pub fn parse(text: &str) -> Result<Self, ExprError> {
        if text.trim().is_empty() {
            return Err(ExprError::syntax(0, "empty expression"));
        }

        Parser::new(text).parse()
    }

    /// Creates a variable node, validating the name.
    pub fn var(name: &str) -> Result<Self, ExprError> {
        Ok(Expr::Variable(Symbol::new(name)?))
    }

    pub fn negate(expr: Expr) -> Self {
        Expr::Not(Box::new(expr))
    }

    /// Conjunction of `operands`; an empty list is `TRUE` and a single
    /// operand is returned as is.
    pub fn all(operands: impl IntoIterator<Item = Expr>) -> Self {
        let mut operands: Vec<Expr> = operands.into_iter().collect();
        match operands.len() {
            0 => Expr::TRUE,
            1 => operands.remove(0),
            _ => Expr::And(operands),
        }
    }

    /// Disjunction of `operands`; an empty list is `FALSE` and a single
    /// operand is returned as is.
    pub fn any(operands: impl IntoIterator<Item = Expr>) -> Self {
        let mut operands: Vec<Expr> = operands.into_iter().collect();
        match operands.len() {
            0 => Expr::FALSE,
            1 => operands.remove(0),
            _ => Expr::Or(operands),
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Expr::Literal(true))
    }

    pub fn is_false(&self) -> bool {
        matches!(self, Expr::Literal(false))
    }

    pub fn precedence(&self) -> Precedence {
        match self {
            Expr::Literal(_) | Expr::Variable(_) => Precedence::Atom,
            Expr::Not(_) => Precedence::Not,
            Expr::And(_) => Precedence::And,
            Expr::Or(_) => Precedence::Or,
        }
    }

    /// Returns the free variables of the expression.
    pub fn symbols(&self) -> BTreeSet<Symbol> {
        let mut symbols = BTreeSet::new();
        self.collect_symbols(&mut symbols);
        symbols
    }

    fn collect_symbols(&self, out: &mut BTreeSet<Symbol>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Variable(symbol) => {
                out.insert(symbol.clone());
            }
            Expr::Not(inner) => inner.collect_symbols(out),
            Expr::And(operands) | Expr::Or(operands) => {
                for operand in operands {
                    operand.collect_symbols(out);
                }
            }
        }
    }

    /// Substitutes bound variables with literals and simplifies the result.
    ///
    /// Unbound variables stay symbolic, so the result is only a literal when
    /// the bindings decide the expression.
    pub fn substitute(&self, bindings: &Bindings) -> Expr {
        self.replace(bindings).simplify()
    }

    fn replace(&self, bindings: &Bindings) -> Expr {
        match self {
            Expr::Literal(_) => self.clone(),
            Expr::Variable(symbol) => match bindings.get(symbol.as_str()) {
                Some(value) => Expr::Literal(value),
                None => self.clone(),
            },
            Expr::Not(inner) => Expr::negate(inner.replace(bindings)),
            Expr::And(operands) => {
                Expr::And(operands.iter().map(|o| o.replace(bindings)).collect())
            }
            Expr::Or(operands) => Expr::Or(operands.iter().map(|o| o.replace(bindings)).collect()),
        }
    }

    /// Evaluates the expression when `bindings` decide it.
    pub fn evaluate(&self, bindings: &Bindings) -> Option<bool> {
        match self.substitute(bindings) {
            Expr::Literal(value) => Some(value),
            _ => None,
        }
    }
}

impl FromStr for Expr {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Expr::parse(s)
    }
}

impl From<Symbol> for Expr {
    fn from(symbol: Symbol) -> Self {
        Expr::Variable(symbol)
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Expr::Literal(value)
    }
}

/// Canonical surface syntax: `!`, `&`, `|`, `TRUE`, `FALSE`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(true) => f.write_str("TRUE"),
            Expr::Literal(false) => f.write_str("FALSE"),
            Expr::Variable(symbol) => write!(f, "{}", symbol),
            Expr::Not(inner) => match inner.as_ref() {
                Expr::And(_) | Expr::Or(_) => write!(f, "!({})", inner),
                _ => write!(f, "!{}", inner),
            },
            Expr::And(operands) => write_joined(f, operands, " & ", Precedence::And),
            Expr::Or(operands) => write_joined(f, operands, " | ", Precedence::Or),
        }
    }
}

fn write_joined(
    f: &mut fmt::Formatter<'_>,
    operands: &[Expr],
    separator: &str,
    precedence: Precedence,
) -> fmt::Result {
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        // Same-kind children are parenthesized so the text re-parses to the
        // same nesting.
        let operand_precedence = operand.precedence();
        if operand_precedence != Precedence::Atom
            && operand_precedence != Precedence::Not
            && operand_precedence <= precedence
        {
            write!(f, "({})", operand)?;
        } else {
            write!(f, "{}", operand)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Expr {
        Expr::var(name).unwrap()
    }

    #[test]
    fn test_all_any_collapse() {
        assert_eq!(Expr::all(Vec::new()), Expr::TRUE);
        assert_eq!(Expr::any(Vec::new()), Expr::FALSE);
        assert_eq!(Expr::all(vec![var("x")]), var("x"));
        assert_eq!(
            Expr::any(vec![var("x"), var("y")]),
            Expr::Or(vec![var("x"), var("y")])
        );
    }

    #[test]
    fn test_symbols() {
        let expr = Expr::parse("x & y | ~z & x").unwrap();
        let names: Vec<String> = expr.symbols().into_iter().map(String::from).collect();
        assert_eq!(names, vec!["x", "y", "z"]);
        assert!(Expr::TRUE.symbols().is_empty());
    }

    #[test]
    fn test_substitute_decides() {
        let expr = Expr::parse("x & y | z").unwrap();
        let bindings = Bindings::new().with("x", false).with("z", false);
        assert_eq!(expr.substitute(&bindings), Expr::FALSE);

        let bindings = Bindings::new().with("x", false).with("z", true);
        assert_eq!(expr.substitute(&bindings), Expr::TRUE);
    }

    #[test]
    fn test_substitute_leaves_unbound_symbolic() {
        let expr = Expr::parse("x & y").unwrap();
        let bindings = Bindings::new().with("x", true);
        assert_eq!(expr.substitute(&bindings), var("y"));
        assert_eq!(expr.evaluate(&bindings), None);
    }

    #[test]
    fn test_substitute_empty_is_simplify() {
        let expr = Expr::parse("!!x & (TRUE | y)").unwrap();
        assert_eq!(expr.substitute(&Bindings::new()), expr.simplify());
        assert_eq!(expr.simplify(), var("x"));
    }

    #[test]
    fn test_substitution_does_not_touch_original() {
        let expr = Expr::parse("x | ~y").unwrap();
        let before = expr.clone();
        let _ = expr.substitute(&Bindings::new().with("x", true));
        assert_eq!(expr, before);
    }

    #[test]
    fn test_display_canonical() {
        let expr = Expr::parse("not x and (y or z)").unwrap();
        assert_eq!(expr.to_string(), "!x & (y | z)");

        let expr = Expr::parse("~(a & b) | c, true").unwrap();
        assert_eq!(expr.to_string(), "!(a & b) | c | TRUE");
    }

    #[test]
    fn test_display_keeps_nesting() {
        let nested = Expr::Or(vec![Expr::Or(vec![var("a"), var("b")]), var("c")]);
        assert_eq!(nested.to_string(), "(a | b) | c");
        assert_eq!(Expr::parse(&nested.to_string()).unwrap(), nested);
    }
}
