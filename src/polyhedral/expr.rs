//! Affine expressions over named symbols.
//!
//! A linear combination of symbols (loop iterators or parameters) with
//! integer coefficients plus an integer constant:
//! `aff = c1*s1 + c2*s2 + ... + constant`
//!
//! Symbols are kept by name rather than by dimension index because the
//! column layout of the interchange matrices is only known at emission
//! time, once the full parameter list has been collected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An affine expression: sum(coeff[i] * symbol[i]) + constant.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinearExpr {
    /// Terms in first-seen order. Zero coefficients are never stored.
    terms: Vec<(String, i64)>,
    /// Constant term
    pub constant: i64,
}

impl LinearExpr {
    /// Create a zero expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a constant expression.
    pub fn from_constant(value: i64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    /// Create an expression holding a single symbol with the given coefficient.
    pub fn from_term(symbol: impl Into<String>, coeff: i64) -> Self {
        let mut expr = Self::new();
        expr.add_term(&symbol.into(), coeff);
        expr
    }

    /// Add `delta` to a symbol's coefficient, creating the term if absent
    /// and dropping it if the coefficient cancels to zero.
    pub fn add_term(&mut self, symbol: &str, delta: i64) {
        if delta == 0 {
            return;
        }
        if let Some(pos) = self.terms.iter().position(|(s, _)| s == symbol) {
            self.terms[pos].1 += delta;
            if self.terms[pos].1 == 0 {
                self.terms.remove(pos);
            }
        } else {
            self.terms.push((symbol.to_string(), delta));
        }
    }

    /// Add to the constant term.
    pub fn add_constant(&mut self, delta: i64) {
        self.constant += delta;
    }

    /// Get the coefficient for a symbol (0 if absent).
    pub fn coeff(&self, symbol: &str) -> i64 {
        self.terms
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|&(_, c)| c)
            .unwrap_or(0)
    }

    /// Iterate over the symbols with non-zero coefficients, first-seen order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|(s, _)| s.as_str())
    }

    /// The `(symbol, coefficient)` terms, first-seen order.
    pub fn terms(&self) -> &[(String, i64)] {
        &self.terms
    }

    /// Check if this expression has no symbol terms.
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluate by substituting concrete integers for every symbol.
    /// Symbols absent from `bindings` evaluate as 0.
    pub fn evaluate(&self, bindings: &[(&str, i64)]) -> i64 {
        let mut result = self.constant;
        for (symbol, coeff) in &self.terms {
            if let Some(&(_, v)) = bindings.iter().find(|(s, _)| s == symbol) {
                result += coeff * v;
            }
        }
        result
    }
}

impl fmt::Display for LinearExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        for (symbol, coeff) in &self.terms {
            match *coeff {
                1 => parts.push(symbol.clone()),
                -1 => parts.push(format!("-{}", symbol)),
                c => parts.push(format!("{}*{}", c, symbol)),
            }
        }
        if self.constant != 0 || parts.is_empty() {
            parts.push(format!("{}", self.constant));
        }
        write!(f, "{}", parts.join(" + ").replace("+ -", "- "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant() {
        let expr = LinearExpr::from_constant(5);
        assert!(expr.is_constant());
        assert_eq!(expr.evaluate(&[("i", 3)]), 5);
    }

    #[test]
    fn test_add_term() {
        let mut expr = LinearExpr::new();
        expr.add_term("i", 2);
        expr.add_term("i", 1);
        assert_eq!(expr.coeff("i"), 3);
        assert_eq!(expr.evaluate(&[("i", 4)]), 12);
    }

    #[test]
    fn test_cancelled_term_dropped() {
        let mut expr = LinearExpr::from_term("i", 1);
        expr.add_term("i", -1);
        assert!(expr.is_constant());
        assert_eq!(expr.symbols().count(), 0);
    }

    #[test]
    fn test_first_seen_order() {
        let mut expr = LinearExpr::new();
        expr.add_term("j", 1);
        expr.add_term("N", 2);
        expr.add_term("j", 1);
        let symbols: Vec<_> = expr.symbols().collect();
        assert_eq!(symbols, vec!["j", "N"]);
    }

    #[test]
    fn test_display() {
        let mut expr = LinearExpr::new();
        expr.add_term("i", -1);
        expr.add_term("N", 1);
        expr.add_constant(-1);
        assert_eq!(expr.to_string(), "-i + N - 1");
        assert_eq!(LinearExpr::new().to_string(), "0");
    }
}
