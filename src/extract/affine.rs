//! Affine expression building.
//!
//! Converts expression subtrees into `LinearExpr` form, rejecting anything
//! not expressible as linear integer arithmetic over loop iterators and
//! symbolic parameters. The builder mutates a running accumulator in place,
//! adding each node's contribution scaled by a signed factor; recursion
//! threads the scale through negation and literal multiplication.

use crate::extract::scope::ScopeStack;
use crate::ir::ast::{CmpOp, Expr, ExprKind, BinOp, UnaryOp};
use crate::polyhedral::LinearExpr;
use crate::utils::errors::{ExtractError, ExtractResult};

/// Add `expr`'s contribution, scaled by `scale`, to the accumulator.
pub fn add_expr(expr: &Expr, acc: &mut LinearExpr, scale: i64) -> ExtractResult<()> {
    match &expr.kind {
        ExprKind::Int(value) => {
            acc.add_constant(scale * value);
            Ok(())
        }

        ExprKind::Name(name) => {
            acc.add_term(name, scale);
            Ok(())
        }

        ExprKind::Unary { op, operand } => match op {
            UnaryOp::Neg => add_expr(operand, acc, -scale),
            UnaryOp::Pos | UnaryOp::Not => Err(ExtractError::unsupported_expression(
                format!("unary operator `{}`", op),
                expr.span,
            )),
        },

        ExprKind::Binary { op, left, right } => match op {
            BinOp::Add => {
                add_expr(left, acc, scale)?;
                add_expr(right, acc, scale)
            }
            BinOp::Sub => {
                add_expr(left, acc, scale)?;
                add_expr(right, acc, -scale)
            }
            BinOp::Mul => {
                // Affinity requires one constant factor.
                if let ExprKind::Int(value) = left.kind {
                    add_expr(right, acc, scale * value)
                } else if let ExprKind::Int(value) = right.kind {
                    add_expr(left, acc, scale * value)
                } else {
                    Err(ExtractError::non_affine(
                        "product of two non-literal operands",
                        expr.span,
                    ))
                }
            }
            BinOp::Div | BinOp::Mod => Err(ExtractError::unsupported_expression(
                format!("binary operator `{}`", op),
                expr.span,
            )),
        },

        ExprKind::Compare { .. } => Err(ExtractError::unsupported_expression(
            "comparison inside an arithmetic expression",
            expr.span,
        )),

        ExprKind::Subscript { .. } => Err(ExtractError::unsupported_expression(
            "array subscript inside an affine expression",
            expr.span,
        )),

        ExprKind::Call { function, .. } => Err(ExtractError::unsupported_expression(
            format!("call to `{}()` in affine context", function),
            expr.span,
        )),

        ExprKind::Tuple(_) | ExprKind::Bool { .. } => Err(ExtractError::unsupported_expression(
            format!("{} in affine context", expr.kind_name()),
            expr.span,
        )),
    }
}

/// Normalize a single comparison `left OP right` to canonical `expr >= 0`
/// form: seed the constant, then fold both operands in with opposite signs.
/// Satisfying integer values make the result non-negative, violating values
/// make it negative.
pub fn comparison_expr(expr: &Expr) -> ExtractResult<LinearExpr> {
    let ExprKind::Compare {
        left,
        ops,
        comparators,
    } = &expr.kind
    else {
        return Err(ExtractError::unsupported_expression(
            format!("expected a comparison, found {}", expr.kind_name()),
            expr.span,
        ));
    };

    if ops.len() != 1 || comparators.len() != 1 {
        return Err(ExtractError::unsupported_expression(
            "chained comparison",
            expr.span,
        ));
    }

    let (seed, left_sign) = match ops[0] {
        CmpOp::Lt => (-1, -1), // right - left - 1 >= 0
        CmpOp::Le => (0, -1),  // right - left >= 0
        CmpOp::Gt => (-1, 1),  // left - right - 1 >= 0
        CmpOp::Ge => (0, 1),   // left - right >= 0
        CmpOp::Eq | CmpOp::Ne => {
            return Err(ExtractError::unsupported_expression(
                format!("comparison operator `{}`", ops[0]),
                expr.span,
            ));
        }
    };

    let mut acc = LinearExpr::from_constant(seed);
    add_expr(left, &mut acc, left_sign)?;
    add_expr(&comparators[0], &mut acc, -left_sign)?;
    Ok(acc)
}

/// Build the affine subscript of an array access, unwrapping nested
/// subscript layers (`B[i][j]` accumulates both indices into one form) and
/// reporting the base array name.
///
/// A bare-name index must be an active enclosing iterator.
pub fn subscript_expr(expr: &Expr, scope: &ScopeStack) -> ExtractResult<(String, LinearExpr)> {
    let mut indices = Vec::new();
    let mut base = expr;
    while let ExprKind::Subscript { value, index } = &base.kind {
        indices.push(index.as_ref());
        base = value.as_ref();
    }

    let ExprKind::Name(array) = &base.kind else {
        return Err(ExtractError::unsupported_expression(
            format!("subscript base is {}, not an array name", base.kind_name()),
            base.span,
        ));
    };

    // indices were collected innermost-first
    indices.reverse();

    let mut acc = LinearExpr::new();
    for index in indices {
        if let ExprKind::Name(name) = &index.kind {
            if !scope.is_iterator(name) {
                return Err(ExtractError::undefined_iterator(name, index.span));
            }
        }
        add_expr(index, &mut acc, 1)?;
    }
    Ok((array.clone(), acc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::scop::DomainScope;
    use crate::utils::errors::ExtractErrorKind;
    use crate::utils::location::Span;

    fn sp() -> Span {
        Span::dummy()
    }

    fn build(expr: &Expr) -> ExtractResult<LinearExpr> {
        let mut acc = LinearExpr::new();
        add_expr(expr, &mut acc, 1)?;
        Ok(acc)
    }

    #[test]
    fn test_literal_and_name() {
        // 7 * i + 1
        let expr = Expr::binary(
            BinOp::Add,
            Expr::binary(BinOp::Mul, Expr::int(7, sp()), Expr::name("i", sp())),
            Expr::int(1, sp()),
        );
        let aff = build(&expr).unwrap();
        assert_eq!(aff.coeff("i"), 7);
        assert_eq!(aff.constant, 1);
        // matches direct evaluation at i = 3
        assert_eq!(aff.evaluate(&[("i", 3)]), 7 * 3 + 1);
    }

    #[test]
    fn test_subtraction_and_negation() {
        // -(i - j) - 2  ==  -i + j - 2
        let expr = Expr::binary(
            BinOp::Sub,
            Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(Expr::binary(
                        BinOp::Sub,
                        Expr::name("i", sp()),
                        Expr::name("j", sp()),
                    )),
                },
                sp(),
            ),
            Expr::int(2, sp()),
        );
        let aff = build(&expr).unwrap();
        assert_eq!(aff.coeff("i"), -1);
        assert_eq!(aff.coeff("j"), 1);
        assert_eq!(aff.constant, -2);
        assert_eq!(aff.evaluate(&[("i", 5), ("j", 2)]), -(5 - 2) - 2);
    }

    #[test]
    fn test_literal_times_literal_folds() {
        let expr = Expr::binary(BinOp::Mul, Expr::int(2, sp()), Expr::int(3, sp()));
        let aff = build(&expr).unwrap();
        assert!(aff.is_constant());
        assert_eq!(aff.constant, 6);
    }

    #[test]
    fn test_product_of_names_is_non_affine() {
        let expr = Expr::binary(BinOp::Mul, Expr::name("i", sp()), Expr::name("j", sp()));
        let err = build(&expr).unwrap_err();
        assert_eq!(err.kind, ExtractErrorKind::NonAffineExpression);
    }

    #[test]
    fn test_division_is_unsupported() {
        let expr = Expr::binary(BinOp::Div, Expr::name("i", sp()), Expr::int(2, sp()));
        let err = build(&expr).unwrap_err();
        assert_eq!(err.kind, ExtractErrorKind::UnsupportedExpression);
    }

    #[test]
    fn test_comparison_sign_property() {
        // i < N: satisfied at (2, 5), violated at (5, 5) and (7, 5)
        let cmp = Expr::compare(Expr::name("i", sp()), CmpOp::Lt, Expr::name("N", sp()));
        let aff = comparison_expr(&cmp).unwrap();
        assert!(aff.evaluate(&[("i", 2), ("N", 5)]) >= 0);
        assert!(aff.evaluate(&[("i", 5), ("N", 5)]) < 0);
        assert!(aff.evaluate(&[("i", 7), ("N", 5)]) < 0);
    }

    #[test]
    fn test_all_comparison_operators() {
        let cases = [
            (CmpOp::Lt, (2, 5), (5, 5)),
            (CmpOp::Le, (5, 5), (6, 5)),
            (CmpOp::Gt, (6, 5), (5, 5)),
            (CmpOp::Ge, (5, 5), (4, 5)),
        ];
        for (op, sat, unsat) in cases {
            let cmp = Expr::compare(Expr::name("a", sp()), op, Expr::name("b", sp()));
            let aff = comparison_expr(&cmp).unwrap();
            assert!(
                aff.evaluate(&[("a", sat.0), ("b", sat.1)]) >= 0,
                "satisfying values must be non-negative for {}",
                op
            );
            assert!(
                aff.evaluate(&[("a", unsat.0), ("b", unsat.1)]) < 0,
                "violating values must be negative for {}",
                op
            );
        }
    }

    #[test]
    fn test_chained_comparison_rejected() {
        let cmp = Expr::new(
            ExprKind::Compare {
                left: Box::new(Expr::int(2, sp())),
                ops: vec![CmpOp::Lt, CmpOp::Lt],
                comparators: vec![Expr::name("N", sp()), Expr::int(5, sp())],
            },
            sp(),
        );
        let err = comparison_expr(&cmp).unwrap_err();
        assert_eq!(err.kind, ExtractErrorKind::UnsupportedExpression);
    }

    #[test]
    fn test_equality_comparison_rejected() {
        let cmp = Expr::compare(Expr::name("i", sp()), CmpOp::Eq, Expr::int(0, sp()));
        let err = comparison_expr(&cmp).unwrap_err();
        assert_eq!(err.kind, ExtractErrorKind::UnsupportedExpression);
    }

    #[test]
    fn test_nested_subscript_combines_indices() {
        let mut scope = ScopeStack::new();
        scope.enter_loop(DomainScope {
            iterator: "i".to_string(),
            lower: LinearExpr::from_term("i", 1),
            upper: LinearExpr::from_term("i", -1),
        });
        scope.enter_loop(DomainScope {
            iterator: "j".to_string(),
            lower: LinearExpr::from_term("j", 1),
            upper: LinearExpr::from_term("j", -1),
        });

        // B[i][j + 1]
        let expr = Expr::subscript(
            Expr::subscript(Expr::name("B", sp()), Expr::name("i", sp()), sp()),
            Expr::binary(BinOp::Add, Expr::name("j", sp()), Expr::int(1, sp())),
            sp(),
        );
        let (array, aff) = subscript_expr(&expr, &scope).unwrap();
        assert_eq!(array, "B");
        assert_eq!(aff.coeff("i"), 1);
        assert_eq!(aff.coeff("j"), 1);
        assert_eq!(aff.constant, 1);
    }

    #[test]
    fn test_bare_name_index_must_be_iterator() {
        let scope = ScopeStack::new();
        let expr = Expr::subscript(Expr::name("A", sp()), Expr::name("k", sp()), sp());
        let err = subscript_expr(&expr, &scope).unwrap_err();
        assert_eq!(err.kind, ExtractErrorKind::UndefinedIterator);
    }
}
