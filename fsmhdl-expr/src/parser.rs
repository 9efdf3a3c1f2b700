//! Recursive descent parser for condition expressions.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! or      := and (('|' | ',' | "or") and)*
//! and     := unary (('&' | "and") unary)*
//! unary   := ('!' | '~' | "not") unary | primary
//! primary := '(' or ')' | TRUE | FALSE | identifier
//! ```
//!
//! Word operators and literals are case-insensitive. Operator chains are
//! collected into a single n-ary node: `x | y | z` is one `Or` with three
//! operands.

use crate::error::ExprError;
use crate::expr::Expr;
use crate::symbol::{is_reserved, Symbol};

/// Deepest nesting of parentheses and prefix negations accepted.
pub const MAX_NESTING: usize = 256;

pub(crate) struct Parser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    /// Parses the whole input as one expression.
    pub(crate) fn parse(mut self) -> Result<Expr, ExprError> {
        let expr = self.parse_or()?;
        self.skip_whitespace();

        match self.peek_char() {
            None => Ok(expr),
            Some(')') => Err(ExprError::syntax(self.pos, "unbalanced ')'")),
            Some(c) => Err(ExprError::syntax(
                self.pos,
                format!("unexpected '{}' after expression", c),
            )),
        }
    }

    fn parse_or(&mut self) -> Result<Expr, ExprError> {
        let mut operands = vec![self.parse_and()?];
        self.skip_whitespace();

        while self.eat_char('|') || self.eat_char(',') || self.eat_keyword("or") {
            operands.push(self.parse_and()?);
            self.skip_whitespace();
        }

        Ok(collect(operands, Expr::Or))
    }

    fn parse_and(&mut self) -> Result<Expr, ExprError> {
        let mut operands = vec![self.parse_unary()?];
        self.skip_whitespace();

        while self.eat_char('&') || self.eat_keyword("and") {
            operands.push(self.parse_unary()?);
            self.skip_whitespace();
        }

        Ok(collect(operands, Expr::And))
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        self.skip_whitespace();

        let start = self.pos;
        if self.eat_char('!') || self.eat_char('~') || self.eat_keyword("not") {
            self.enter(start)?;
            let inner = self.parse_unary()?;
            self.depth -= 1;
            return Ok(Expr::negate(inner));
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        self.skip_whitespace();
        let start = self.pos;

        match self.peek_char() {
            Some('(') => {
                self.enter(start)?;
                self.pos += 1;
                let expr = self.parse_or()?;
                self.depth -= 1;
                self.skip_whitespace();
                if !self.eat_char(')') {
                    return Err(ExprError::syntax(
                        self.pos,
                        format!("expected ')' to close '(' at position {}", start),
                    ));
                }
                Ok(expr)
            }
            Some(c) if c.is_ascii_alphabetic() => {
                let word = self.read_word();
                if word.eq_ignore_ascii_case("true") {
                    Ok(Expr::TRUE)
                } else if word.eq_ignore_ascii_case("false") {
                    Ok(Expr::FALSE)
                } else if is_reserved(word) {
                    Err(ExprError::syntax(
                        start,
                        format!("unexpected operator '{}'", word),
                    ))
                } else {
                    Ok(Expr::Variable(Symbol::new_unchecked(word)))
                }
            }
            Some(')') => Err(ExprError::syntax(start, "unbalanced ')'")),
            Some(c) => Err(ExprError::syntax(start, format!("unknown token '{}'", c))),
            None => Err(ExprError::syntax(start, "unexpected end of expression")),
        }
    }

    /// Opens one nesting level, failing once `MAX_NESTING` is exceeded.
    fn enter(&mut self, position: usize) -> Result<(), ExprError> {
        if self.depth == MAX_NESTING {
            return Err(ExprError::syntax(position, "expression nested too deeply"));
        }
        self.depth += 1;
        Ok(())
    }

    /// Reads `[A-Za-z][A-Za-z0-9_]*`; the caller has checked the first char.
    fn read_word(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        &self.input[start..self.pos]
    }

    fn eat_char(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    /// Consumes a word operator if the next word is exactly `keyword`.
    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let rest = &self.input[self.pos..];
        let word_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());

        if rest[..word_len].eq_ignore_ascii_case(keyword) {
            self.pos += word_len;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }
}

fn collect(mut operands: Vec<Expr>, node: fn(Vec<Expr>) -> Expr) -> Expr {
    if operands.len() == 1 {
        operands.remove(0)
    } else {
        node(operands)
    }
}
