//! # PolyScop - Affine Program Extractor
//!
//! Extracts a polyhedral model from a restricted affine loop-and-array
//! program and serializes it into the matrix-based interchange format
//! consumed by polyhedral compilation tools:
//! - iteration domains (one inequality pair per loop level)
//! - a lexicographic scattering order (execution schedule)
//! - read/write access relations (affine array subscripts)
//! - symbolic parameters and parameter-only context constraints
//!
//! ## Architecture
//!
//! ```text
//! Input tree → Extractor (scope stack + affine builder + registry) → Scop → Emitter → text
//! ```
//!
//! The input is a generic statement/expression tree (`ir::ast`) supplied by
//! an external front-end; this crate does not parse text. Anything not
//! expressible as linear integer arithmetic over loop iterators and
//! symbolic parameters is rejected with a classified [`ExtractError`] -
//! extraction never produces a partially built or unsound model.
//!
//! ## Example
//!
//! ```rust
//! use polyscop::ir::ast::{Expr, Stmt, StmtKind, RANGE_FN};
//! use polyscop::utils::location::Span;
//!
//! // for i in range(0, N): b[i] = a[i]
//! let sp = Span::dummy();
//! let body = Stmt::new(
//!     StmtKind::Assign {
//!         targets: vec![Expr::subscript(Expr::name("b", sp), Expr::name("i", sp), sp)],
//!         value: Expr::subscript(Expr::name("a", sp), Expr::name("i", sp), sp),
//!     },
//!     sp,
//! );
//! let program = vec![Stmt::new(
//!     StmtKind::For {
//!         iterator: "i".to_string(),
//!         source: Expr::call(RANGE_FN, vec![Expr::int(0, sp), Expr::name("N", sp)], sp),
//!         body: vec![body],
//!     },
//!     sp,
//! )];
//!
//! let text = polyscop::extract_to_openscop(&program).unwrap();
//! assert!(text.starts_with("<OpenScop>"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod emit;
pub mod extract;
pub mod ir;
pub mod polyhedral;
pub mod utils;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::emit::emit;
    pub use crate::extract::{extract, Extractor};
    pub use crate::ir::ast::*;
    pub use crate::ir::scop::*;
    pub use crate::polyhedral::LinearExpr;
    pub use crate::utils::errors::*;
    pub use crate::utils::location::{SourceLocation, Span};
}

use ir::ast::Stmt;
use ir::scop::Scop;
use utils::errors::ExtractResult;

/// Extract the polyhedral model from a program tree.
pub fn extract(program: &[Stmt]) -> ExtractResult<Scop> {
    extract::extract(program)
}

/// Full pipeline: extract the model and render it as interchange text.
pub fn extract_to_openscop(program: &[Stmt]) -> ExtractResult<String> {
    let scop = extract(program)?;
    Ok(emit::emit(&scop))
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
