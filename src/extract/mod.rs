//! Extraction of the polyhedral model from the input tree.
//!
//! A depth-first recursive descent over an immutable statement tree. All
//! mutable traversal state (scope stack, scattering vector, parameter
//! registry, statement repository) lives in one `Extractor` value owned by
//! the extracting call, so independent programs can be extracted
//! concurrently without shared state.

pub mod affine;
pub mod scope;

use crate::ir::ast::{Expr, ExprKind, BinOp, Stmt, StmtKind, UnaryOp, RANGE_FN};
use crate::ir::scop::{AccessKind, AccessRelation, DomainScope, GlobalContext, Scop, ScopStmt};
use crate::polyhedral::LinearExpr;
use crate::utils::errors::{ExtractError, ExtractResult};
use log::debug;
use scope::ScopeStack;

/// Extract the polyhedral model from a program.
///
/// Returns the finished model, or the first classification error; no
/// partial model is ever produced.
pub fn extract(program: &[Stmt]) -> ExtractResult<Scop> {
    Extractor::new().run(program)
}

/// Traversal state for one extraction run.
#[derive(Debug, Default)]
pub struct Extractor {
    scope: ScopeStack,
    context: GlobalContext,
    statements: Vec<ScopStmt>,
}

impl Extractor {
    /// Create a fresh extractor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the extractor, walking `program` and returning the model.
    pub fn run(mut self, program: &[Stmt]) -> ExtractResult<Scop> {
        self.visit_block(program)?;
        debug_assert!(self.scope.is_empty(), "unbalanced scope stack");
        debug!(
            "extracted {} statement(s), {} parameter(s)",
            self.statements.len(),
            self.context.n_params()
        );
        Ok(Scop {
            context: self.context,
            statements: self.statements,
        })
    }

    fn visit_block(&mut self, stmts: &[Stmt]) -> ExtractResult<()> {
        for stmt in stmts {
            self.visit_stmt(stmt)?;
        }
        Ok(())
    }

    fn visit_stmt(&mut self, stmt: &Stmt) -> ExtractResult<()> {
        match &stmt.kind {
            StmtKind::Assign { targets, value } => self.visit_assign(stmt, targets, value),
            StmtKind::For {
                iterator,
                source,
                body,
            } => self.visit_for(iterator, source, body),
            StmtKind::If { test, body, orelse } => self.visit_if(stmt, test, body, orelse),
            StmtKind::Pass => Ok(()),
            StmtKind::While { .. } | StmtKind::Expr { .. } => Err(
                ExtractError::unsupported_statement(stmt.kind_name(), stmt.span),
            ),
        }
    }

    /// Forward an affine expression to the parameter registry.
    fn register(&mut self, expr: &LinearExpr) {
        let iterators = self.scope.iterators();
        self.context.register(expr, &iterators);
    }

    fn visit_assign(&mut self, stmt: &Stmt, targets: &[Expr], value: &Expr) -> ExtractResult<()> {
        if targets.len() != 1 {
            return Err(ExtractError::unsupported_statement(
                "chained assignment",
                stmt.span,
            ));
        }
        let target = &targets[0];
        if matches!(target.kind, ExprKind::Tuple(_)) {
            return Err(ExtractError::unsupported_statement(
                "tuple assignment target",
                stmt.span,
            ));
        }

        self.scope.enter_statement();
        let mut accesses = Vec::new();

        match &target.kind {
            ExprKind::Subscript { .. } => {
                let (array, subscript) = affine::subscript_expr(target, &self.scope)?;
                self.register(&subscript);
                accesses.push(AccessRelation::new(AccessKind::Write, array, subscript));
            }
            ExprKind::Name(_) => {}
            _ => {
                return Err(ExtractError::unsupported_statement(
                    format!("assignment to {}", target.kind_name()),
                    target.span,
                ));
            }
        }

        match &value.kind {
            ExprKind::Subscript { .. } => {
                let (array, subscript) = affine::subscript_expr(value, &self.scope)?;
                self.register(&subscript);
                accesses.push(AccessRelation::new(AccessKind::Read, array, subscript));
            }
            ExprKind::Binary { .. } | ExprKind::Unary { .. } => {
                self.collect_reads(value, &mut accesses)?;
            }
            ExprKind::Int(_) | ExprKind::Name(_) => {}
            _ => {
                return Err(ExtractError::unsupported_expression(
                    format!("{} on the right-hand side", value.kind_name()),
                    value.span,
                ));
            }
        }

        let id = self.statements.len() + 1;
        debug!("statement {} at depth {}", id, self.scope.depth());
        self.statements.push(ScopStmt {
            id,
            domain: self.scope.scopes().to_vec(),
            scatter: self.scope.scatter().to_vec(),
            accesses,
            span: stmt.span,
        });
        Ok(())
    }

    /// Locate every array read in a composed right-hand side.
    ///
    /// Recursion follows the affinity rules, so a product of two
    /// non-literal operands is rejected here even though its subscripts
    /// would individually be affine. Each access gets a fresh accumulator;
    /// coefficients of distinct accesses are never conflated.
    fn collect_reads(
        &mut self,
        expr: &Expr,
        accesses: &mut Vec<AccessRelation>,
    ) -> ExtractResult<()> {
        match &expr.kind {
            ExprKind::Subscript { .. } => {
                let (array, subscript) = affine::subscript_expr(expr, &self.scope)?;
                self.register(&subscript);
                accesses.push(AccessRelation::new(AccessKind::Read, array, subscript));
                Ok(())
            }

            ExprKind::Binary { op, left, right } => match op {
                BinOp::Add | BinOp::Sub => {
                    self.collect_reads(left, accesses)?;
                    self.collect_reads(right, accesses)
                }
                BinOp::Mul => {
                    if matches!(left.kind, ExprKind::Int(_)) {
                        self.collect_reads(right, accesses)
                    } else if matches!(right.kind, ExprKind::Int(_)) {
                        self.collect_reads(left, accesses)
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

            ExprKind::Unary { op, operand } => match op {
                UnaryOp::Neg => self.collect_reads(operand, accesses),
                UnaryOp::Pos | UnaryOp::Not => Err(ExtractError::unsupported_expression(
                    format!("unary operator `{}`", op),
                    expr.span,
                )),
            },

            ExprKind::Int(_) | ExprKind::Name(_) => Ok(()),

            _ => Err(ExtractError::unsupported_expression(
                format!("{} on the right-hand side", expr.kind_name()),
                expr.span,
            )),
        }
    }

    fn visit_for(&mut self, iterator: &str, source: &Expr, body: &[Stmt]) -> ExtractResult<()> {
        let ExprKind::Call { function, args } = &source.kind else {
            return Err(ExtractError::unsupported_loop_form(
                format!("loop source is {}, not a {}() call", source.kind_name(), RANGE_FN),
                source.span,
            ));
        };
        if function != RANGE_FN {
            return Err(ExtractError::unsupported_loop_form(
                format!("loop source calls `{}()`, not {}()", function, RANGE_FN),
                source.span,
            ));
        }
        if args.is_empty() || args.len() > 2 {
            return Err(ExtractError::unsupported_loop_form(
                format!("{}() takes 1 or 2 arguments, got {}", RANGE_FN, args.len()),
                source.span,
            ));
        }
        for arg in args {
            if !matches!(arg.kind, ExprKind::Int(_) | ExprKind::Name(_)) {
                return Err(ExtractError::unsupported_loop_form(
                    format!("{}() argument is {}, not a literal or name", RANGE_FN, arg.kind_name()),
                    arg.span,
                ));
            }
        }

        // The raw bound values are what the registry sees; the iterator
        // itself is not part of them.
        let mut lower_value = LinearExpr::new();
        if args.len() == 2 {
            affine::add_expr(&args[0], &mut lower_value, 1)?;
        }
        self.register(&lower_value);

        let mut upper_value = LinearExpr::new();
        affine::add_expr(&args[args.len() - 1], &mut upper_value, 1)?;
        self.register(&upper_value);

        // iterator - lower >= 0
        let mut lower = LinearExpr::from_term(iterator, 1);
        if args.len() == 2 {
            affine::add_expr(&args[0], &mut lower, -1)?;
        }

        // upper - iterator - 1 >= 0 (exclusive upper bound)
        let mut upper = LinearExpr::from_term(iterator, -1);
        upper.add_constant(-1);
        affine::add_expr(&args[args.len() - 1], &mut upper, 1)?;

        debug!("enter loop `{}`: {} >= 0, {} >= 0", iterator, lower, upper);
        self.scope.enter_loop(DomainScope {
            iterator: iterator.to_string(),
            lower,
            upper,
        });
        self.visit_block(body)?;
        self.scope.exit_loop();
        debug!("exit loop `{}`", iterator);
        Ok(())
    }

    fn visit_if(
        &mut self,
        stmt: &Stmt,
        test: &Expr,
        body: &[Stmt],
        orelse: &[Stmt],
    ) -> ExtractResult<()> {
        if !orelse.is_empty() {
            return Err(ExtractError::unsupported_statement(
                "conditional with an `else` branch",
                stmt.span,
            ));
        }

        match &test.kind {
            ExprKind::Bool { .. } => Err(ExtractError::unsupported_expression(
                "compound boolean condition; split into separate conditionals",
                test.span,
            )),
            ExprKind::Name(name) => Err(ExtractError::unsupported_expression(
                format!("bare name `{}` as a condition", name),
                test.span,
            )),
            // A literal zero never runs its body; any other literal is not
            // a tractable guard.
            ExprKind::Int(0) => Ok(()),
            ExprKind::Int(value) => Err(ExtractError::unsupported_expression(
                format!("non-zero literal `{}` as a condition", value),
                test.span,
            )),
            ExprKind::Compare { .. } => {
                let condition = affine::comparison_expr(test)?;
                self.register(&condition);
                self.visit_block(body)
            }
            _ => Err(ExtractError::unsupported_expression(
                format!("{} as a condition", test.kind_name()),
                test.span,
            )),
        }
    }
}
