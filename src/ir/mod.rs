//! Intermediate representations: the input tree and the extracted model.

pub mod ast;
pub mod scop;

pub use scop::{AccessKind, AccessRelation, DomainScope, GlobalContext, ScatterEntry, Scop, ScopStmt};
