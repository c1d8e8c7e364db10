//! Rendering of the extracted model into the matrix interchange text.
//!
//! The output is a global section (context matrix, parameter names,
//! statement count) followed by one section per statement (domain,
//! scattering, and access matrices). Every matrix is preceded by a
//! `rows cols outDim inDim localDim numParams` header line; all entries are
//! plain decimal integers in fixed-width columns.
//!
//! Column layout for domain and access rows: marker, one coefficient per
//! enclosing iterator (outer-to-inner), one per parameter (registry order),
//! constant. Scattering rows insert the scattering coordinates between the
//! marker and the iterator columns.

use crate::ir::scop::{ScatterEntry, Scop, ScopStmt};
use crate::polyhedral::LinearExpr;
use std::fmt::Write;

/// Width of one matrix column in the rendered text.
const COL_WIDTH: usize = 4;

/// Render a finished model as interchange text.
pub fn emit(scop: &Scop) -> String {
    let mut e = Emitter::new();
    e.global(scop);
    for stmt in &scop.statements {
        e.statement(stmt, scop.context.parameters());
    }
    e.finish()
}

struct Emitter {
    buf: String,
}

impl Emitter {
    fn new() -> Self {
        Self { buf: String::new() }
    }

    fn finish(self) -> String {
        self.buf
    }

    fn line(&mut self, s: &str) {
        self.buf.push_str(s);
        self.buf.push('\n');
    }

    /// One matrix row in fixed-width columns.
    fn row(&mut self, values: &[i64]) {
        for v in values {
            let _ = write!(self.buf, "{:>width$}", v, width = COL_WIDTH);
        }
        self.buf.push('\n');
    }

    /// The `rows cols outDim inDim localDim numParams` header line.
    fn header(&mut self, rows: usize, cols: usize, out: usize, input: usize, params: usize) {
        self.line(&format!("{} {} {} {} 0 {}", rows, cols, out, input, params));
    }

    /// Column legend comment: `#  e/i  <iters>  <params>  1`.
    fn legend(&mut self, iterators: &[&str], params: &[String]) {
        let mut s = String::from("#");
        let _ = write!(s, "{:>width$}", "e/i", width = COL_WIDTH - 1);
        for name in iterators {
            let _ = write!(s, "{:>width$}", name, width = COL_WIDTH);
        }
        for name in params {
            let _ = write!(s, "{:>width$}", name, width = COL_WIDTH);
        }
        let _ = write!(s, "{:>width$}", 1, width = COL_WIDTH);
        self.line(&s);
    }

    /// Coefficients of `expr` over the standard column layout.
    fn coefficients(
        &self,
        marker: i64,
        iterators: &[&str],
        params: &[String],
        expr: &LinearExpr,
    ) -> Vec<i64> {
        let mut row = Vec::with_capacity(iterators.len() + params.len() + 2);
        row.push(marker);
        for name in iterators {
            row.push(expr.coeff(name));
        }
        for name in params {
            row.push(expr.coeff(name));
        }
        row.push(expr.constant);
        row
    }

    fn global(&mut self, scop: &Scop) {
        let params = scop.context.parameters();
        let n_params = params.len();
        let rows = scop.context.context_rows();

        self.line("<OpenScop>");
        self.line("");
        self.line("# =============================================== Global");
        self.line("# Backend Language");
        self.line("C");
        self.line("");
        self.line("# Context");
        self.line("CONTEXT");
        self.header(rows.len(), n_params + 2, 0, 0, n_params);
        if !rows.is_empty() {
            self.legend(&[], params);
            for expr in rows {
                let row = self.coefficients(1, &[], params, expr);
                self.row(&row);
            }
        }
        self.line("");
        self.line("# Parameter names are provided");
        self.line(if n_params > 0 { "1" } else { "0" });
        self.line("");
        self.line("# Parameter names");
        if n_params > 0 {
            self.line(&params.join(" "));
        }
        self.line("");
        self.line("# Number of statements");
        self.line(&scop.n_statements().to_string());
        self.line("");
    }

    fn statement(&mut self, stmt: &ScopStmt, params: &[String]) {
        let iterators = stmt.iterators();
        let depth = stmt.depth();
        let n_params = params.len();
        let n_cols = depth + n_params + 2;

        self.line(&format!(
            "# =============================================== Statement {}",
            stmt.id
        ));
        self.line("# Number of relations describing the statement");
        self.line(&(2 + stmt.accesses.len()).to_string());
        self.line("");

        // Domain: two inequality rows per nesting level, outer-to-inner.
        self.line(&format!(
            "# ----------------------------------------------  {}.1 Domain",
            stmt.id
        ));
        self.line("DOMAIN");
        self.header(2 * depth, n_cols, depth, 0, n_params);
        if depth > 0 {
            self.legend(&iterators, params);
            for scope in &stmt.domain {
                let lower = self.coefficients(1, &iterators, params, &scope.lower);
                self.row(&lower);
                let upper = self.coefficients(1, &iterators, params, &scope.upper);
                self.row(&upper);
            }
        }
        self.line("");

        // Scattering: one equality row per coordinate, -1 on the
        // coordinate's own column, the iterator or the counter on the other
        // side.
        self.line(&format!(
            "# ----------------------------------------------  {}.2 Scattering",
            stmt.id
        ));
        self.line("SCATTERING");
        let n_scat = stmt.scatter.len();
        self.header(n_scat, n_scat + n_cols, n_scat, depth, n_params);
        for (k, entry) in stmt.scatter.iter().enumerate() {
            let mut row = Vec::with_capacity(n_scat + n_cols);
            row.push(0);
            for c in 0..n_scat {
                row.push(if c == k { -1 } else { 0 });
            }
            for name in &iterators {
                row.push(match entry {
                    ScatterEntry::Loop(it) if it == name => 1,
                    _ => 0,
                });
            }
            row.extend(std::iter::repeat(0).take(n_params));
            row.push(match entry {
                ScatterEntry::Stmt(counter) => *counter,
                ScatterEntry::Loop(_) => 0,
            });
            self.row(&row);
        }
        self.line("");

        // Accesses: one single-row relation each, tagged by direction and
        // array.
        self.line(&format!(
            "# ----------------------------------------------  {}.3 Access",
            stmt.id
        ));
        for access in &stmt.accesses {
            self.line(&format!("{} {}", access.kind, access.array));
            self.header(1, n_cols, 0, depth, n_params);
            let row = self.coefficients(0, &iterators, params, &access.subscript);
            self.row(&row);
        }
        self.line("");
    }
}
