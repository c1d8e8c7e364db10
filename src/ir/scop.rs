//! The extracted polyhedral model.
//!
//! One `Scop` per extraction run: a global context (symbolic parameters and
//! parameter-only constraints) plus one `ScopStmt` per affine statement,
//! each carrying a snapshot of its iteration domain, its scattering vector,
//! and its memory accesses.

use crate::polyhedral::LinearExpr;
use crate::utils::location::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One active loop nesting level: the iterator plus its bounds, both in
/// canonical `expr >= 0` form (`iterator - lower >= 0`,
/// `upper - iterator - 1 >= 0`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainScope {
    /// Iterator bound by this loop level
    pub iterator: String,
    /// Lower-bound constraint: `iterator - lower >= 0`
    pub lower: LinearExpr,
    /// Upper-bound constraint: `upper - iterator - 1 >= 0` (half-open range)
    pub upper: LinearExpr,
}

/// An element of the scattering vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScatterEntry {
    /// Variable position: an enclosing loop's iterator
    Loop(String),
    /// Fixed position: a statement counter at one nesting level
    Stmt(i64),
}

impl fmt::Display for ScatterEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScatterEntry::Loop(name) => write!(f, "{}", name),
            ScatterEntry::Stmt(counter) => write!(f, "{}", counter),
        }
    }
}

/// Kind of memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessKind {
    Read,
    Write,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessKind::Read => write!(f, "READ"),
            AccessKind::Write => write!(f, "WRITE"),
        }
    }
}

/// A memory access: direction, array, and affine subscript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRelation {
    /// Access direction
    pub kind: AccessKind,
    /// Array being accessed
    pub array: String,
    /// Affine subscript over enclosing iterators and parameters
    pub subscript: LinearExpr,
}

impl AccessRelation {
    /// Create a new access relation.
    pub fn new(kind: AccessKind, array: impl Into<String>, subscript: LinearExpr) -> Self {
        Self {
            kind,
            array: array.into(),
            subscript,
        }
    }
}

/// A statement of the extracted model. Never mutated once its enclosing
/// traversal step finishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopStmt {
    /// Sequential id (1-based, insertion order)
    pub id: usize,
    /// Domain scopes active at creation time, outer-to-inner
    pub domain: Vec<DomainScope>,
    /// Scattering vector at creation time
    pub scatter: Vec<ScatterEntry>,
    /// Accesses of the source statement, writes before reads
    pub accesses: Vec<AccessRelation>,
    /// Source span of the originating statement
    pub span: Span,
}

impl ScopStmt {
    /// Nesting depth at creation time.
    pub fn depth(&self) -> usize {
        self.domain.len()
    }

    /// Enclosing iterator names, outer-to-inner.
    pub fn iterators(&self) -> Vec<&str> {
        self.domain.iter().map(|s| s.iterator.as_str()).collect()
    }

    /// Read accesses.
    pub fn reads(&self) -> impl Iterator<Item = &AccessRelation> {
        self.accesses
            .iter()
            .filter(|a| a.kind == AccessKind::Read)
    }

    /// Write accesses.
    pub fn writes(&self) -> impl Iterator<Item = &AccessRelation> {
        self.accesses
            .iter()
            .filter(|a| a.kind == AccessKind::Write)
    }
}

/// Symbolic parameters and parameter-only constraints, accumulated across
/// the whole program in traversal order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalContext {
    /// Parameter names, first-seen order, no duplicates
    parameters: Vec<String>,
    /// Parameter-only constraints in canonical `expr >= 0` form
    context_rows: Vec<LinearExpr>,
}

impl GlobalContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an affine expression produced anywhere in the program.
    ///
    /// Symbols of `expr` that are not in `iterators` are free: each unseen
    /// free symbol joins the parameter list, and an expression with free
    /// symbols but no iterator at all is a pure parameter constraint and
    /// becomes a context row.
    pub fn register(&mut self, expr: &LinearExpr, iterators: &[&str]) {
        let has_iterator = expr.symbols().any(|s| iterators.contains(&s));
        let mut has_free = false;
        for symbol in expr.symbols() {
            if iterators.contains(&symbol) {
                continue;
            }
            has_free = true;
            if !self.parameters.iter().any(|p| p == symbol) {
                self.parameters.push(symbol.to_string());
            }
        }
        if has_free && !has_iterator {
            self.context_rows.push(expr.clone());
        }
    }

    /// Parameter names, first-seen order.
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Parameter-only constraint rows.
    pub fn context_rows(&self) -> &[LinearExpr] {
        &self.context_rows
    }

    /// Number of parameters.
    pub fn n_params(&self) -> usize {
        self.parameters.len()
    }
}

/// A complete extracted model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scop {
    /// Parameters and parameter-only constraints
    pub context: GlobalContext,
    /// Statements in ascending id order
    pub statements: Vec<ScopStmt>,
}

impl Scop {
    /// Get a statement by its 1-based id.
    pub fn stmt(&self, id: usize) -> Option<&ScopStmt> {
        self.statements.iter().find(|s| s.id == id)
    }

    /// Number of statements.
    pub fn n_statements(&self) -> usize {
        self.statements.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_parameter_constraint() {
        let mut ctx = GlobalContext::new();
        let mut expr = LinearExpr::from_term("N", 1);
        expr.add_constant(-5);

        ctx.register(&expr, &[]);
        assert_eq!(ctx.parameters(), &["N".to_string()]);
        assert_eq!(ctx.context_rows().len(), 1);

        // same parameter again: no duplicate, but another row
        ctx.register(&expr, &[]);
        assert_eq!(ctx.n_params(), 1);
        assert_eq!(ctx.context_rows().len(), 2);
    }

    #[test]
    fn test_register_with_iterator_is_not_a_row() {
        let mut ctx = GlobalContext::new();
        let mut expr = LinearExpr::from_term("i", -1);
        expr.add_term("N", 1);
        expr.add_constant(-1);

        ctx.register(&expr, &["i"]);
        assert_eq!(ctx.parameters(), &["N".to_string()]);
        assert!(ctx.context_rows().is_empty());
    }

    #[test]
    fn test_register_iterator_only_is_inert() {
        let mut ctx = GlobalContext::new();
        let expr = LinearExpr::from_term("i", 1);
        ctx.register(&expr, &["i"]);
        assert_eq!(ctx.n_params(), 0);
        assert!(ctx.context_rows().is_empty());
    }

    #[test]
    fn test_stmt_access_filters() {
        let stmt = ScopStmt {
            id: 1,
            domain: Vec::new(),
            scatter: vec![ScatterEntry::Stmt(0)],
            accesses: vec![
                AccessRelation::new(AccessKind::Write, "B", LinearExpr::from_term("i", 1)),
                AccessRelation::new(AccessKind::Read, "A", LinearExpr::from_term("i", 1)),
            ],
            span: Span::dummy(),
        };
        assert_eq!(stmt.writes().count(), 1);
        assert_eq!(stmt.reads().count(), 1);
        assert_eq!(stmt.depth(), 0);
    }
}
