//! Transition conditions and their aggregate analysis.

use crate::error::CoreError;
use fsmhdl_expr::{Bindings, Expr, Symbol};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

/// A boolean condition guarding a transition.
///
/// Wraps one expression. The VHDL lowering is computed on first use and
/// cached for the lifetime of the condition.
#[derive(Clone)]
pub struct Condition {
    expr: Expr,
    vhdl: OnceLock<String>,
}

impl Condition {
    /// Parses a condition from expression text.
    pub fn parse(text: &str) -> Result<Self, CoreError> {
        let expr = Expr::parse(text).map_err(|source| CoreError::ConditionExpression {
            text: text.to_string(),
            source,
        })?;
        Ok(Self::from_expr(expr))
    }

    pub fn from_expr(expr: Expr) -> Self {
        Self {
            expr,
            vhdl: OnceLock::new(),
        }
    }

    /// A condition that always holds.
    pub fn always() -> Self {
        Self::from_expr(Expr::TRUE)
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Returns the input names the condition reads.
    pub fn inputs(&self) -> BTreeSet<Symbol> {
        self.expr.symbols()
    }

    /// Substitutes `bindings` into the condition and simplifies.
    pub fn evaluate(&self, bindings: &Bindings) -> Expr {
        self.expr.substitute(bindings)
    }

    /// Returns whether `bindings` make the condition true.
    pub fn is_satisfied_by(&self, bindings: &Bindings) -> bool {
        self.evaluate(bindings).is_true()
    }

    /// Returns the condition as VHDL relational text, e.g. `x='1' and y='0'`.
    pub fn vhdl(&self) -> Result<&str, CoreError> {
        if let Some(text) = self.vhdl.get() {
            return Ok(text);
        }

        let text = self
            .expr
            .to_relational()
            .map_err(|e| CoreError::ConditionConversion {
                condition: self.expr.to_string(),
                reason: e.to_string(),
            })?;
        Ok(self.vhdl.get_or_init(|| text))
    }
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        self.expr == other.expr
    }
}

impl Eq for Condition {}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Condition('{}')", self.expr)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}

impl From<Expr> for Condition {
    fn from(expr: Expr) -> Self {
        Self::from_expr(expr)
    }
}

/// A collection of conditions analysed together.
///
/// Structurally equal conditions are kept as separate members, since they
/// usually come from different transitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionSet {
    conditions: Vec<Condition>,
}

impl ConditionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Condition> {
        self.conditions.iter()
    }

    pub fn expressions(&self) -> impl Iterator<Item = &Expr> {
        self.conditions.iter().map(Condition::expr)
    }

    /// Returns the union of the members' inputs.
    pub fn inputs(&self) -> BTreeSet<Symbol> {
        self.conditions.iter().flat_map(Condition::inputs).collect()
    }

    /// Returns whether no input assignment makes two members true at once.
    ///
    /// Always true for fewer than two members.
    pub fn is_exclusive(&self) -> bool {
        let overlapping = self.first_overlap();
        if let Some((i, j)) = overlapping {
            tracing::debug!(
                first = %self.conditions[i],
                second = %self.conditions[j],
                "conditions overlap"
            );
        }
        overlapping.is_none()
    }

    /// Returns whether every input assignment makes at least one member true.
    ///
    /// An empty set is never exhaustive.
    pub fn is_exhaustive(&self) -> bool {
        // Two FALSE operands keep the OR well-formed for 0 or 1 members.
        let coverage = Expr::Or(
            [Expr::FALSE, Expr::FALSE]
                .into_iter()
                .chain(self.expressions().cloned())
                .collect(),
        );
        coverage.to_cnf().simplify().is_true()
    }

    /// Returns the index pairs of members that can be true at the same time.
    pub fn overlapping_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for i in 0..self.conditions.len() {
            for j in (i + 1)..self.conditions.len() {
                if self.overlap(i, j) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    fn first_overlap(&self) -> Option<(usize, usize)> {
        let n = self.conditions.len();
        (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .find(|&(i, j)| self.overlap(i, j))
    }

    fn overlap(&self, i: usize, j: usize) -> bool {
        let both = Expr::And(vec![
            self.conditions[i].expr.clone(),
            self.conditions[j].expr.clone(),
        ]);
        !both.to_dnf().simplify().is_false()
    }
}

impl FromIterator<Condition> for ConditionSet {
    fn from_iter<I: IntoIterator<Item = Condition>>(iter: I) -> Self {
        Self {
            conditions: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ConditionSet {
    type Item = &'a Condition;
    type IntoIter = std::slice::Iter<'a, Condition>;

    fn into_iter(self) -> Self::IntoIter {
        self.conditions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conditions(texts: &[&str]) -> ConditionSet {
        texts.iter().map(|t| Condition::parse(t).unwrap()).collect()
    }

    #[test]
    fn test_parse_error_wraps_syntax_error() {
        let err = Condition::parse("").unwrap_err();
        match err {
            CoreError::ConditionExpression { text, source } => {
                assert_eq!(text, "");
                assert!(source.is_syntax());
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(Condition::parse("x & (y").is_err());
    }

    #[test]
    fn test_deeply_nested_condition_is_rejected() {
        let text = format!("{}x{}", "(".repeat(1000), ")".repeat(1000));
        match Condition::parse(&text) {
            Err(CoreError::ConditionExpression { source, .. }) => assert!(source.is_syntax()),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_inputs() {
        let condition = Condition::parse("x & y | z").unwrap();
        let names: Vec<String> = condition.inputs().into_iter().map(String::from).collect();
        assert_eq!(names, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_literal_conditions() {
        let condition = Condition::parse("TRUE").unwrap();
        assert!(condition.inputs().is_empty());
        assert_eq!(condition.vhdl().unwrap(), "true");
        let bindings = Bindings::new().with("x", false).with("z", true);
        assert_eq!(condition.evaluate(&bindings), Expr::TRUE);

        let condition = Condition::parse("FALSE").unwrap();
        assert_eq!(condition.vhdl().unwrap(), "false");
        assert_eq!(condition.evaluate(&bindings), Expr::FALSE);
    }

    #[test]
    fn test_evaluate() {
        let condition = Condition::parse("x & y | z").unwrap();
        let bindings = Bindings::new().with("x", false).with("z", false);
        assert_eq!(condition.evaluate(&bindings), Expr::FALSE);
        let bindings = Bindings::new().with("x", false).with("z", true);
        assert_eq!(condition.evaluate(&bindings), Expr::TRUE);
        assert!(condition.is_satisfied_by(&bindings));
    }

    #[test]
    fn test_vhdl_is_memoized() {
        let condition = Condition::parse("x&(y|~z)").unwrap();
        let first = condition.vhdl().unwrap();
        assert_eq!(first, "x='1' and (y='1' or z='0')");
        let second = condition.vhdl().unwrap();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_vhdl_conversion_error() {
        let condition = Condition::from_expr(Expr::Or(vec![Expr::TRUE]));
        assert!(matches!(
            condition.vhdl(),
            Err(CoreError::ConditionConversion { .. })
        ));
    }

    #[test]
    fn test_equality_is_structural() {
        assert_eq!(
            Condition::parse("x & y").unwrap(),
            Condition::parse("x and y").unwrap()
        );
        assert_ne!(
            Condition::parse("x & y").unwrap(),
            Condition::parse("y & x").unwrap()
        );
    }

    #[test]
    fn test_conjunction_and_disjunction_of_conditions() {
        let a = Condition::parse("x & ~y").unwrap();
        let b = Condition::parse("~x | y").unwrap();
        let both = Expr::And(vec![a.expr().clone(), b.expr().clone()]);
        let either = Expr::Or(vec![a.expr().clone(), b.expr().clone()]);
        // b is the complement of a
        assert!(both.to_dnf().simplify().is_false());
        assert!(either.to_cnf().simplify().is_true());
    }

    #[test]
    fn test_set_inputs() {
        let set = conditions(&["x | y", "x & y"]);
        let names: Vec<String> = set.inputs().into_iter().map(String::from).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(set.expressions().count(), 2);
    }

    #[test]
    fn test_exclusive() {
        assert!(conditions(&["x", "~x & y"]).is_exclusive());
        assert!(!conditions(&["x | y", "~x", "~y"]).is_exclusive());
        assert!(conditions(&["FALSE"]).is_exclusive());
        assert!(conditions(&["x"]).is_exclusive());
        assert!(ConditionSet::new().is_exclusive());
    }

    #[test]
    fn test_duplicates_are_not_exclusive() {
        assert!(!conditions(&["x", "x"]).is_exclusive());
        assert_eq!(conditions(&["x", "x"]).len(), 2);
    }

    #[test]
    fn test_exhaustive() {
        assert!(!conditions(&["x", "~x & y"]).is_exhaustive());
        assert!(conditions(&["x | y", "~x", "~y"]).is_exhaustive());
        assert!(conditions(&["TRUE"]).is_exhaustive());
        assert!(!conditions(&["FALSE"]).is_exhaustive());
        assert!(!ConditionSet::new().is_exhaustive());
    }

    #[test]
    fn test_overlapping_pairs() {
        let set = conditions(&["x | y", "~x", "~y", "x & y"]);
        assert_eq!(set.overlapping_pairs(), vec![(0, 1), (0, 2), (0, 3), (1, 2)]);
        assert!(conditions(&["x", "~x"]).overlapping_pairs().is_empty());
    }
}
