//! Nested iteration scopes and the scattering vector.
//!
//! The stack of active `DomainScope`s and the parallel scattering vector are
//! the only mutable traversal state besides the model itself. Scopes follow
//! strict stack discipline: pushed on loop entry, popped on loop exit, never
//! partially unwound.

use crate::ir::scop::{DomainScope, ScatterEntry};

/// Active loop scopes plus the scattering vector.
#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    scopes: Vec<DomainScope>,
    scatter: Vec<ScatterEntry>,
}

impl ScopeStack {
    /// Create an empty stack (top level).
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a loop: claim a fixed position at the current level, then push
    /// the scope and its iterator tag.
    ///
    /// The counter before the tag keeps the vector alternating
    /// fixed/variable, so two adjacent sibling loops get distinct
    /// coordinates.
    pub fn enter_loop(&mut self, scope: DomainScope) {
        self.enter_statement();
        self.scatter
            .push(ScatterEntry::Loop(scope.iterator.clone()));
        self.scopes.push(scope);
    }

    /// Exit the innermost loop.
    ///
    /// Pops the scope and unwinds the scattering vector: entries are dropped
    /// from the end until the exiting iterator's own tag has been removed,
    /// so sibling statements after the loop continue counting at the
    /// enclosing level.
    pub fn exit_loop(&mut self) {
        let Some(scope) = self.scopes.pop() else {
            return;
        };
        while let Some(entry) = self.scatter.pop() {
            if matches!(entry, ScatterEntry::Loop(ref name) if *name == scope.iterator) {
                break;
            }
        }
    }

    /// Enter a leaf statement: bump the trailing counter, or start one at 0.
    pub fn enter_statement(&mut self) {
        match self.scatter.last_mut() {
            Some(ScatterEntry::Stmt(counter)) => *counter += 1,
            _ => self.scatter.push(ScatterEntry::Stmt(0)),
        }
    }

    /// Check whether `name` is an iterator of an enclosing loop.
    pub fn is_iterator(&self, name: &str) -> bool {
        self.scopes.iter().any(|s| s.iterator == name)
    }

    /// Active iterator names, outer-to-inner.
    pub fn iterators(&self) -> Vec<&str> {
        self.scopes.iter().map(|s| s.iterator.as_str()).collect()
    }

    /// The active scopes, outer-to-inner.
    pub fn scopes(&self) -> &[DomainScope] {
        &self.scopes
    }

    /// The current scattering vector.
    pub fn scatter(&self) -> &[ScatterEntry] {
        &self.scatter
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Check that no scope is active (top level).
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polyhedral::LinearExpr;

    fn scope(iterator: &str) -> DomainScope {
        DomainScope {
            iterator: iterator.to_string(),
            lower: LinearExpr::from_term(iterator, 1),
            upper: LinearExpr::from_term(iterator, -1),
        }
    }

    #[test]
    fn test_statement_counter() {
        let mut stack = ScopeStack::new();
        stack.enter_statement();
        stack.enter_statement();
        assert_eq!(stack.scatter(), &[ScatterEntry::Stmt(1)]);
    }

    #[test]
    fn test_loop_entry_and_exit() {
        let mut stack = ScopeStack::new();
        stack.enter_loop(scope("i"));
        stack.enter_statement();
        assert_eq!(stack.depth(), 1);
        assert_eq!(
            stack.scatter(),
            &[
                ScatterEntry::Stmt(0),
                ScatterEntry::Loop("i".to_string()),
                ScatterEntry::Stmt(0),
            ]
        );

        stack.exit_loop();
        assert!(stack.is_empty());
        assert_eq!(stack.scatter(), &[ScatterEntry::Stmt(0)]);
    }

    #[test]
    fn test_sibling_after_loop_continues_at_enclosing_level() {
        let mut stack = ScopeStack::new();
        // S0; for i { S1 }; S2  -- S2 must get counter 2, not restart at 0
        stack.enter_statement();
        stack.enter_loop(scope("i"));
        stack.enter_statement();
        stack.exit_loop();
        assert_eq!(stack.scatter(), &[ScatterEntry::Stmt(1)]);
        stack.enter_statement();
        assert_eq!(stack.scatter(), &[ScatterEntry::Stmt(2)]);
    }

    #[test]
    fn test_adjacent_sibling_loops_get_distinct_positions() {
        let mut stack = ScopeStack::new();
        stack.enter_loop(scope("i"));
        stack.enter_statement();
        let first = stack.scatter().to_vec();
        stack.exit_loop();
        stack.enter_loop(scope("j"));
        stack.enter_statement();
        let second = stack.scatter().to_vec();

        assert_eq!(first[0], ScatterEntry::Stmt(0));
        assert_eq!(second[0], ScatterEntry::Stmt(1));
    }

    #[test]
    fn test_nested_exit_unwinds_to_matching_tag() {
        let mut stack = ScopeStack::new();
        stack.enter_loop(scope("i"));
        stack.enter_loop(scope("j"));
        stack.enter_statement();
        stack.exit_loop();
        assert_eq!(
            stack.scatter(),
            &[
                ScatterEntry::Stmt(0),
                ScatterEntry::Loop("i".to_string()),
                ScatterEntry::Stmt(0),
            ]
        );
        assert_eq!(stack.iterators(), vec!["i"]);
        stack.exit_loop();
        assert_eq!(stack.scatter(), &[ScatterEntry::Stmt(0)]);
    }

    #[test]
    fn test_is_iterator() {
        let mut stack = ScopeStack::new();
        stack.enter_loop(scope("i"));
        assert!(stack.is_iterator("i"));
        assert!(!stack.is_iterator("N"));
    }
}
