//! Desugaring Preambles: the short statement lists that make the implicit
//! protocol calls of `for`/`with`/`try` explicit for the type checker
//! (`spec.md` §4.3).
//!
//! Each `preamble` function is a pure, total function of its construct — no
//! lookup of surrounding scope, no mutation of the input.

use crate::expression::Expression;
use crate::location::Node;
use crate::statement::{ExceptHandler, ForStmt, Statement, WithStmt};

/// `for target in iter:` → `target = iter.__iter__().__next__()` (or
/// `__aiter__`/`__anext__` when async). `iter` need not already be an access
/// chain: [`Expression::attribute`]/[`Expression::call`] lift it into one.
pub fn for_preamble(stmt: &ForStmt) -> Vec<Statement> {
    let (iter_method, next_method) = if stmt.is_async {
        ("__aiter__", "__anext__")
    } else {
        ("__iter__", "__next__")
    };
    let iterator = Expression::call(Expression::attribute(stmt.iterator.clone(), iter_method), vec![]);
    let value = Expression::call(Expression::attribute(iterator, next_method), vec![]);
    vec![Statement::Assign {
        target: stmt.target.clone(),
        annotation: None,
        value: Some(value),
        parent: None,
    }]
}

/// For each `(expression, target?)` item: bind `target` to
/// `expression.__enter__()` (`__aenter__` when async), or — when there is no
/// target — type-check `expression` itself as a bare expression statement.
///
/// `spec.md` says `await expression.__aenter__()` for the async case; this
/// crate has no `await` expression node, so the call is emitted exactly as
/// for the sync case and `stmt.is_async` only selects which dunder is
/// invoked. A host with a real expression AST wraps the result in `Await`.
pub fn with_preamble(stmt: &WithStmt) -> Vec<Statement> {
    let enter_method = if stmt.is_async { "__aenter__" } else { "__enter__" };
    stmt.items
        .iter()
        .map(|item| {
            let entered = Expression::call(Expression::attribute(item.context.clone(), enter_method), vec![]);
            match &item.target {
                Some(target) => Statement::Assign {
                    target: target.clone(),
                    annotation: None,
                    value: Some(entered),
                    parent: None,
                },
                None => Statement::Expression(item.context.clone()),
            }
        })
        .collect()
}

/// Per handler (`spec.md` §4.3):
/// - `kind` a single type, `name` bound: `name: kind` (annotated, no value).
/// - `kind` a tuple of types, `name` bound: `name: typing.Union[…]`.
/// - `kind` present, no `name`: bare `kind` as an `Expression` statement.
/// - neither present: nothing.
pub fn try_handler_preamble(handler: &ExceptHandler) -> Vec<Statement> {
    match (&handler.kind, &handler.name) {
        (Some(kind), Some(name)) => {
            let annotation = match kind.as_tuple() {
                Some(alternatives) => Expression::union(alternatives.to_vec()),
                None => kind.clone(),
            };
            vec![Statement::Assign {
                target: Expression::name(name.clone()),
                annotation: Some(annotation),
                value: None,
                parent: None,
            }]
        }
        (Some(kind), None) => vec![Statement::Expression(kind.clone())],
        (None, _) => Vec::new(),
    }
}

/// The concatenated preamble of every handler, in source order.
pub fn try_preamble(handlers: &[ExceptHandler]) -> Vec<Statement> {
    handlers.iter().flat_map(try_handler_preamble).collect()
}

/// Wrap a bare [`Statement`] preamble entry with `at`'s location, the way
/// the type checker prepends a preamble to a construct's body.
pub fn preamble_nodes(at: &Node<Statement>, preamble: Vec<Statement>) -> Vec<Node<Statement>> {
    preamble.into_iter().map(|s| at.inherit(s)).collect()
}
