//! Termination analysis and flow-sensitive assumption (`spec.md` §4.4, §4.5).

use crate::expression::Expression;
use crate::location::Node;
use crate::statement::Statement;

/// Shallow, conservative: true iff the top-level statement list contains a
/// `Return`, `Raise`, or `Continue`. Does not recurse into nested blocks —
/// over-approximation (missing a nested-only terminator) is incorrect,
/// under-approximation (this function) is the safe direction (`spec.md`
/// §4.4).
pub fn terminates(body: &[Node<Statement>]) -> bool {
    body.iter().any(|stmt| {
        matches!(
            stmt.value,
            Statement::Return(_) | Statement::Raise(_) | Statement::Continue
        )
    })
}

/// `Assert { test; message: None }` at `test`'s location, for flow-sensitive
/// refinement. `at` provides the location since [`Expression`] carries none
/// of its own.
pub fn assume(at: &Node<Expression>) -> Node<Statement> {
    at.inherit(Statement::Assert {
        test: at.value.clone(),
        message: None,
    })
}
