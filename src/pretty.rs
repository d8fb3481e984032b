//! The canonical pretty printer (`spec.md` §4.6): deterministic surface
//! syntax for diagnostics and golden tests.

use crate::expression::Expression;
use crate::location::Node;
use crate::statement::{Statement, StubDeclaration};
use std::fmt::Write as _;

const INDENT: &str = "  ";

/// Render a single statement (and its nested blocks) at indentation level 0.
pub fn pretty_print(stmt: &Node<Statement>) -> String {
    let mut out = String::new();
    write_statement(&mut out, stmt, 0);
    // Drop the trailing newline the block writer always leaves behind.
    if out.ends_with('\n') {
        out.pop();
    }
    out
}

/// Render a statement list, one top-level statement per pretty-printed
/// chunk joined by blank lines — used for a define/class body or a module.
pub fn pretty_print_block(statements: &[Node<Statement>]) -> String {
    let mut out = String::new();
    for stmt in statements {
        write_statement(&mut out, stmt, 0);
    }
    if out.ends_with('\n') {
        out.pop();
    }
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn write_body(out: &mut String, body: &[Node<Statement>], depth: usize) {
    if body.is_empty() {
        indent(out, depth);
        out.push_str("pass\n");
        return;
    }
    for stmt in body {
        write_statement(out, stmt, depth);
    }
}

fn write_decorators(out: &mut String, decorators: &[Expression], depth: usize) {
    for decorator in decorators {
        indent(out, depth);
        let _ = writeln!(out, "@{decorator}");
    }
}

fn write_assign_target(out: &mut String, target: &Expression, parent: Option<&crate::expression::AccessChain>) {
    match parent {
        Some(parent) => {
            let _ = write!(out, "{parent}.{target}");
        }
        None => {
            let _ = write!(out, "{target}");
        }
    }
}

fn write_statement(out: &mut String, node: &Node<Statement>, depth: usize) {
    // Decorator-bearing variants indent each decorator line themselves, so
    // they skip the blanket indent the rest of the match relies on.
    if let Statement::Define(define) = &node.value {
        write_decorators(out, &define.decorators, depth);
        indent(out, depth);
        let _ = writeln!(
            out,
            "{}def {}({}):",
            if define.is_async { "async " } else { "" },
            define.name,
            format_parameters(&define.parameters),
        );
        write_body(out, &define.body, depth + 1);
        return;
    }
    if let Statement::Class(class) = &node.value {
        write_decorators(out, &class.decorators, depth);
        indent(out, depth);
        if class.bases.is_empty() {
            let _ = writeln!(out, "class {}:", class.name);
        } else {
            let bases: Vec<String> = class.bases.iter().map(ToString::to_string).collect();
            let _ = writeln!(out, "class {}({}):", class.name, bases.join(", "));
        }
        write_body(out, &class.body, depth + 1);
        return;
    }

    indent(out, depth);
    match &node.value {
        Statement::Assign {
            target,
            annotation,
            value,
            parent,
        } => {
            write_assign_target(out, target, parent.as_ref());
            if let Some(value) = value {
                let _ = write!(out, " = {value}");
            }
            if let Some(annotation) = annotation {
                let _ = write!(out, "  # {annotation}");
            }
            out.push('\n');
        }
        Statement::Assert { test, message } => {
            let _ = write!(out, "assert {test}");
            if let Some(message) = message {
                let _ = write!(out, ", {message}");
            }
            out.push('\n');
        }
        Statement::Break => out.push_str("break\n"),
        Statement::Continue => out.push_str("continue\n"),
        Statement::Pass => out.push_str("pass\n"),
        Statement::Delete(expr) => {
            let _ = writeln!(out, "del {expr}");
        }
        Statement::Expression(expr) => {
            let _ = writeln!(out, "{expr}");
        }
        Statement::Raise(expr) => match expr {
            Some(expr) => {
                let _ = writeln!(out, "raise {expr}");
            }
            None => out.push_str("raise\n"),
        },
        Statement::Return(expr) => match expr {
            Some(expr) => {
                let _ = writeln!(out, "return {expr}");
            }
            None => out.push_str("return\n"),
        },
        Statement::Yield(expr) => {
            let _ = writeln!(out, "yield {expr}");
        }
        Statement::YieldFrom(expr) => {
            let _ = writeln!(out, "yield from {expr}");
        }
        Statement::Global(names) => {
            let _ = writeln!(out, "global {}", names.join(", "));
        }
        Statement::Nonlocal(names) => {
            let _ = writeln!(out, "nonlocal {}", names.join(", "));
        }
        Statement::Define(_) | Statement::Class(_) => unreachable!("handled above"),
        Statement::For(for_stmt) => {
            let _ = writeln!(
                out,
                "{}for {} in {}:",
                if for_stmt.is_async { "async " } else { "" },
                for_stmt.target,
                for_stmt.iterator,
            );
            write_body(out, &for_stmt.body, depth + 1);
            if !for_stmt.orelse.is_empty() {
                indent(out, depth);
                out.push_str("else:\n");
                write_body(out, &for_stmt.orelse, depth + 1);
            }
        }
        Statement::While(while_stmt) => {
            let _ = writeln!(out, "while {}:", while_stmt.test);
            write_body(out, &while_stmt.body, depth + 1);
            if !while_stmt.orelse.is_empty() {
                indent(out, depth);
                out.push_str("else:\n");
                write_body(out, &while_stmt.orelse, depth + 1);
            }
        }
        Statement::If(if_stmt) => {
            let _ = writeln!(out, "if {}:", if_stmt.test);
            write_body(out, &if_stmt.body, depth + 1);
            if !if_stmt.orelse.is_empty() {
                indent(out, depth);
                out.push_str("else:\n");
                write_body(out, &if_stmt.orelse, depth + 1);
            }
        }
        Statement::With(with_stmt) => {
            let items: Vec<String> = with_stmt
                .items
                .iter()
                .map(|item| match &item.target {
                    Some(target) => format!("{} as {target}", item.context),
                    None => item.context.to_string(),
                })
                .collect();
            let _ = writeln!(
                out,
                "{}with {}:",
                if with_stmt.is_async { "async " } else { "" },
                items.join(", "),
            );
            write_body(out, &with_stmt.body, depth + 1);
        }
        Statement::Try(try_stmt) => {
            out.push_str("try:\n");
            write_body(out, &try_stmt.body, depth + 1);
            for handler in &try_stmt.handlers {
                indent(out, depth);
                out.push_str("except");
                if let Some(kind) = &handler.kind {
                    let _ = write!(out, " {kind}");
                }
                if let Some(name) = &handler.name {
                    let _ = write!(out, " as {name}");
                }
                out.push_str(":\n");
                write_body(out, &handler.body, depth + 1);
            }
            if !try_stmt.orelse.is_empty() {
                indent(out, depth);
                out.push_str("else:\n");
                write_body(out, &try_stmt.orelse, depth + 1);
            }
            if !try_stmt.finally.is_empty() {
                indent(out, depth);
                out.push_str("finally:\n");
                write_body(out, &try_stmt.finally, depth + 1);
            }
        }
        Statement::Import(import) => {
            let items: Vec<String> = import
                .imports
                .iter()
                .map(|item| match &item.alias {
                    Some(alias) => format!("{} as {alias}", item.name),
                    None => item.name.clone(),
                })
                .collect();
            match &import.from {
                Some(module) => {
                    let dots = ".".repeat(import.level as usize);
                    let _ = writeln!(out, "from {dots}{module} import {}", items.join(", "));
                }
                None => {
                    let _ = writeln!(out, "import {}", items.join(", "));
                }
            }
        }
        Statement::Stub(stub) => write_stub(out, stub),
    }
}

fn write_stub(out: &mut String, stub: &StubDeclaration) {
    match stub {
        StubDeclaration::Assign { target, annotation } => {
            let _ = write!(out, "{target}");
            if let Some(annotation) = annotation {
                let _ = write!(out, ": {annotation}");
            }
            out.push('\n');
        }
        StubDeclaration::Class(class) => {
            if class.bases.is_empty() {
                let _ = writeln!(out, "class {}: ...", class.name);
            } else {
                let bases: Vec<String> = class.bases.iter().map(ToString::to_string).collect();
                let _ = writeln!(out, "class {}({}): ...", class.name, bases.join(", "));
            }
        }
        StubDeclaration::Define(define) => {
            let _ = writeln!(
                out,
                "{}def {}({}): ...",
                if define.is_async { "async " } else { "" },
                define.name,
                format_parameters(&define.parameters),
            );
        }
    }
}

fn format_one_parameter(p: &crate::statement::Parameter) -> String {
    let mut s = p.name.clone();
    if let Some(annotation) = &p.annotation {
        s.push_str(": ");
        s.push_str(&annotation.to_string());
    }
    if let Some(default) = &p.default {
        s.push_str(" = ");
        s.push_str(&default.to_string());
    }
    s
}

fn format_parameters(params: &crate::statement::Parameters) -> String {
    let mut parts: Vec<String> = params.posonly.iter().map(format_one_parameter).collect();
    if !params.posonly.is_empty() {
        parts.push("/".to_string());
    }
    parts.extend(params.args.iter().map(format_one_parameter));
    match &params.vararg {
        Some(vararg) => parts.push(format!("*{}", format_one_parameter(vararg))),
        None if !params.kwonly.is_empty() => parts.push("*".to_string()),
        None => {}
    }
    parts.extend(params.kwonly.iter().map(format_one_parameter));
    if let Some(kwarg) = &params.kwarg {
        parts.push(format!("**{}", format_one_parameter(kwarg)));
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::AccessChain;
    use crate::location::{Location, Position};
    use crate::statement::{ClassDef, Define, Parameters};
    use std::sync::Arc;

    fn loc() -> Location {
        Location::synthetic(Arc::from("m.py"), Position::new(1, 1))
    }

    fn node(stmt: Statement) -> Node<Statement> {
        Node::new(loc(), stmt)
    }

    #[test]
    fn test_pass_and_assign() {
        let assign = node(Statement::Assign {
            target: Expression::name("x"),
            annotation: Some(Expression::name("int")),
            value: Some(Expression::IntegerLiteral(1)),
            parent: None,
        });
        assert_eq!(pretty_print(&assign), "x = 1  # int");
    }

    #[test]
    fn test_parent_qualified_assignment() {
        let assign = node(Statement::Assign {
            target: Expression::name("x"),
            annotation: None,
            value: Some(Expression::IntegerLiteral(1)),
            parent: Some(AccessChain::single("Foo")),
        });
        assert_eq!(pretty_print(&assign), "Foo.x = 1");
    }

    #[test]
    fn test_define_with_decorator_and_indentation() {
        let mut define = Define {
            location: loc(),
            name: AccessChain::single("run"),
            parameters: Parameters::single("self"),
            body: vec![node(Statement::Return(Some(Expression::IntegerLiteral(1))))],
            decorators: vec![Expression::name("staticmethod")],
            docstring: None,
            return_annotation: None,
            is_async: false,
            generated: false,
            parent: Some(AccessChain::single("Foo")),
        };
        define.parameters = Parameters::default();
        let printed = pretty_print(&node(Statement::Define(Box::new(define))));
        assert_eq!(printed, "@staticmethod\ndef run():\n  return 1");
    }

    #[test]
    fn test_class_with_bases_and_body() {
        let class = ClassDef {
            location: loc(),
            name: AccessChain::single("Foo"),
            bases: vec![Expression::name("Base")],
            body: vec![node(Statement::Pass)],
            decorators: vec![],
            docstring: None,
        };
        let printed = pretty_print(&node(Statement::Class(Box::new(class))));
        assert_eq!(printed, "class Foo(Base):\n  pass");
    }

    #[test]
    fn test_try_except_else_finally() {
        let try_stmt = crate::statement::TryStmt {
            body: vec![node(Statement::Pass)],
            handlers: vec![crate::statement::ExceptHandler {
                location: loc(),
                kind: Some(Expression::name("KeyError")),
                name: Some("e".to_string()),
                body: vec![node(Statement::Pass)],
            }],
            orelse: vec![node(Statement::Pass)],
            finally: vec![node(Statement::Pass)],
        };
        let printed = pretty_print(&node(Statement::Try(Box::new(try_stmt))));
        assert_eq!(
            printed,
            "try:\n  pass\nexcept KeyError as e:\n  pass\nelse:\n  pass\nfinally:\n  pass"
        );
    }

    #[test]
    fn test_import_with_alias_and_relative_level() {
        let import = crate::statement::ImportStmt {
            from: Some("pkg".to_string()),
            imports: vec![
                crate::statement::ImportItem {
                    name: "a".to_string(),
                    alias: Some("b".to_string()),
                },
                crate::statement::ImportItem {
                    name: "c".to_string(),
                    alias: None,
                },
            ],
            level: 1,
        };
        let printed = pretty_print(&node(Statement::Import(Box::new(import))));
        assert_eq!(printed, "from .pkg import a as b, c");
    }

    #[test]
    fn test_async_for_and_with() {
        let for_stmt = crate::statement::ForStmt {
            target: Expression::name("x"),
            iterator: Expression::name("items"),
            body: vec![node(Statement::Pass)],
            orelse: vec![],
            is_async: true,
        };
        let printed = pretty_print(&node(Statement::For(Box::new(for_stmt))));
        assert_eq!(printed, "async for x in items:\n  pass");
    }
}
