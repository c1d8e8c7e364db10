//! The generic statement/expression tree consumed by the extractor.
//!
//! An external front-end parses the surface syntax and hands over this tree,
//! already validated for grammar. The variant set is deliberately wider than
//! what the extractor accepts (`While`, boolean operators, tuple targets,
//! general calls): classification of unsupported constructs happens against
//! realistic trees, as an exhaustive match rather than a name lookup.

use crate::utils::location::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the fixed-step iteration constructor recognized in loop sources.
pub const RANGE_FN: &str = "range";

/// A statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stmt {
    /// The kind of statement
    pub kind: StmtKind,
    /// Source span
    pub span: Span,
}

impl Stmt {
    /// Create a new statement.
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// A short human-readable name for the statement kind.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            StmtKind::Assign { .. } => "assignment",
            StmtKind::For { .. } => "for loop",
            StmtKind::If { .. } => "conditional",
            StmtKind::While { .. } => "while loop",
            StmtKind::Expr { .. } => "expression statement",
            StmtKind::Pass => "pass",
        }
    }
}

/// The kind of a statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StmtKind {
    /// Assignment: `target = value` (chained targets preserved for rejection)
    Assign {
        targets: Vec<Expr>,
        value: Expr,
    },

    /// For loop: `for iterator in source: body`
    For {
        iterator: String,
        source: Expr,
        body: Vec<Stmt>,
    },

    /// Conditional: `if test: body` (`orelse` preserved for rejection)
    If {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },

    /// While loop: `while test: body`
    While {
        test: Expr,
        body: Vec<Stmt>,
    },

    /// Bare expression statement: `expr`
    Expr {
        value: Expr,
    },

    /// No-op statement
    Pass,
}

/// An expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expr {
    /// The kind of expression
    pub kind: ExprKind,
    /// Source span
    pub span: Span,
}

impl Expr {
    /// Create a new expression.
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Create an integer literal.
    pub fn int(value: i64, span: Span) -> Self {
        Self::new(ExprKind::Int(value), span)
    }

    /// Create a name reference.
    pub fn name(name: impl Into<String>, span: Span) -> Self {
        Self::new(ExprKind::Name(name.into()), span)
    }

    /// Create a binary operation.
    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        let span = left.span.merge(&right.span);
        Self::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        )
    }

    /// Create a single-operator comparison.
    pub fn compare(left: Expr, op: CmpOp, right: Expr) -> Self {
        let span = left.span.merge(&right.span);
        Self::new(
            ExprKind::Compare {
                left: Box::new(left),
                ops: vec![op],
                comparators: vec![right],
            },
            span,
        )
    }

    /// Create a subscript expression.
    pub fn subscript(value: Expr, index: Expr, span: Span) -> Self {
        Self::new(
            ExprKind::Subscript {
                value: Box::new(value),
                index: Box::new(index),
            },
            span,
        )
    }

    /// Create a call expression.
    pub fn call(function: impl Into<String>, args: Vec<Expr>, span: Span) -> Self {
        Self::new(
            ExprKind::Call {
                function: function.into(),
                args,
            },
            span,
        )
    }

    /// A short human-readable name for the expression kind.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ExprKind::Int(_) => "integer literal",
            ExprKind::Name(_) => "name",
            ExprKind::Tuple(_) => "tuple",
            ExprKind::Unary { .. } => "unary operation",
            ExprKind::Binary { .. } => "binary operation",
            ExprKind::Bool { .. } => "boolean operation",
            ExprKind::Compare { .. } => "comparison",
            ExprKind::Call { .. } => "call",
            ExprKind::Subscript { .. } => "subscript",
        }
    }
}

/// The kind of an expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExprKind {
    /// Integer literal
    Int(i64),

    /// Name reference (iterator or symbolic parameter)
    Name(String),

    /// Tuple: `(a, b)` (only ever seen as a rejected assignment target)
    Tuple(Vec<Expr>),

    /// Unary operation: `op operand`
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    /// Binary operation: `left op right`
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Boolean combination: `a and b`, `a or b`
    Bool {
        op: BoolOp,
        values: Vec<Expr>,
    },

    /// Comparison: `left ops[0] comparators[0] ops[1] comparators[1] ...`
    /// (chained comparisons preserved for rejection)
    Compare {
        left: Box<Expr>,
        ops: Vec<CmpOp>,
        comparators: Vec<Expr>,
    },

    /// Call: `function(args)`
    Call {
        function: String,
        args: Vec<Expr>,
    },

    /// Subscript: `value[index]`
    Subscript {
        value: Box<Expr>,
        index: Box<Expr>,
    },
}

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinOp::Add => write!(f, "+"),
            BinOp::Sub => write!(f, "-"),
            BinOp::Mul => write!(f, "*"),
            BinOp::Div => write!(f, "/"),
            BinOp::Mod => write!(f, "%"),
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Negation: `-x`
    Neg,
    /// Identity: `+x`
    Pos,
    /// Logical not: `not x`
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Pos => write!(f, "+"),
            UnaryOp::Not => write!(f, "not"),
        }
    }
}

/// Boolean combinators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoolOp {
    And,
    Or,
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CmpOp::Lt => write!(f, "<"),
            CmpOp::Le => write!(f, "<="),
            CmpOp::Gt => write!(f, ">"),
            CmpOp::Ge => write!(f, ">="),
            CmpOp::Eq => write!(f, "=="),
            CmpOp::Ne => write!(f, "!="),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        let span = Span::dummy();
        assert_eq!(Expr::int(3, span).kind_name(), "integer literal");
        assert_eq!(
            Stmt::new(StmtKind::Pass, span).kind_name(),
            "pass"
        );
    }

    #[test]
    fn test_builders() {
        let span = Span::dummy();
        let e = Expr::binary(BinOp::Add, Expr::name("i", span), Expr::int(1, span));
        assert!(matches!(e.kind, ExprKind::Binary { op: BinOp::Add, .. }));

        let c = Expr::compare(Expr::name("i", span), CmpOp::Lt, Expr::name("N", span));
        match c.kind {
            ExprKind::Compare { ops, comparators, .. } => {
                assert_eq!(ops, vec![CmpOp::Lt]);
                assert_eq!(comparators.len(), 1);
            }
            _ => panic!("expected comparison"),
        }
    }
}
