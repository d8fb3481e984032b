//! Define Services: queries and derivations on function/method definitions.
//!
//! Decorator recognition is built on one primitive, [`has_decorator`], the
//! same way the teacher's dead-code checker builds every decorator-aware
//! rule (`is_exempt`, `is_abstract_method`-equivalents) on top of a single
//! decorator-scanning loop.

use crate::attribute::{Attribute, AttributeMap, AttributeName};
use crate::config::RecognizedNames;
use crate::expression::{AccessChain, Expression, Segment};
use crate::location::{Location, Node};
use crate::statement::{ClassDef, Define, Parameters, Statement};
use std::collections::HashMap;

// ── Decorator queries ──────────────────────────────────────────────────────

/// True iff some decorator of `define` is an access chain whose leading
/// identifier segments equal `dotted_name`'s components, with only trailing
/// `Call` segments permitted beyond that (`spec.md` §4.1).
pub fn has_decorator(define: &Define, dotted_name: &str) -> bool {
    define
        .decorators
        .iter()
        .filter_map(Expression::as_access)
        .any(|chain| chain.matches_decorator(dotted_name))
}

fn has_any_decorator(define: &Define, dotted_names: &[&str]) -> bool {
    dotted_names.iter().any(|name| has_decorator(define, name))
}

pub fn is_coroutine(define: &Define) -> bool {
    has_decorator(define, "asyncio.coroutines.coroutine")
}

pub fn is_abstract_method(define: &Define) -> bool {
    has_any_decorator(
        define,
        &[
            "abstractmethod",
            "abc.abstractmethod",
            "abstractproperty",
            "abc.abstractproperty",
        ],
    )
}

pub fn is_overloaded_method(define: &Define) -> bool {
    has_any_decorator(define, &["overload", "typing.overload"])
}

pub fn is_static_method(define: &Define) -> bool {
    has_decorator(define, "staticmethod")
}

pub fn is_class_method(define: &Define, names: &RecognizedNames) -> bool {
    names
        .classmethod_decorators
        .iter()
        .any(|name| has_decorator(define, name))
}

/// True iff `define` has a decorator whose chain equals `<define.name>.setter`.
pub fn is_property_setter(define: &Define) -> bool {
    let Some(name) = define.name.single_identifier() else {
        return false;
    };
    let expected = format!("{name}.setter");
    define
        .decorators
        .iter()
        .filter_map(Expression::as_access)
        .any(|chain| chain.matches_decorator(&expected))
}

// ── Role queries ────────────────────────────────────────────────────────────

pub fn is_method(define: &Define) -> bool {
    define.is_method()
}

pub fn is_constructor(define: &Define, in_test: bool, names: &RecognizedNames) -> bool {
    if define.parent.is_none() {
        return false;
    }
    let Some(name) = define.name.single_identifier() else {
        return false;
    };
    name == "__init__" || (in_test && names.test_constructor_aliases.contains(name))
}

pub fn is_toplevel(define: &Define) -> bool {
    define.name.single_identifier() == Some(Statement::TOPLEVEL_NAME)
}

pub fn is_async(define: &Define) -> bool {
    define.is_async
}

pub fn is_untyped(define: &Define) -> bool {
    define.return_annotation.is_none()
}

pub fn is_generated_constructor(define: &Define) -> bool {
    define.generated
}

fn is_debug_marker_call(stmt: &Statement, marker: &str) -> bool {
    let Statement::Expression(expr) = stmt else {
        return false;
    };
    let Some(chain) = expr.as_access() else {
        return false;
    };
    matches!(
        chain.segments.as_slice(),
        [Segment::Identifier(name), Segment::Call(_)] if name == marker
    )
}

/// True iff the body contains a top-level `pyre_dump(...)` expression
/// statement — a debug marker, not a real construct.
pub fn dump(define: &Define) -> bool {
    define
        .body
        .iter()
        .any(|stmt| is_debug_marker_call(&stmt.value, "pyre_dump"))
}

pub fn dump_cfg(define: &Define) -> bool {
    define
        .body
        .iter()
        .any(|stmt| is_debug_marker_call(&stmt.value, "pyre_dump_cfg"))
}

// ── Constructors ────────────────────────────────────────────────────────────

/// Wrap a module's top-level statements in the synthetic `$toplevel` define
/// (invariant 6).
pub fn create_toplevel(statements: Vec<Node<Statement>>) -> Define {
    let location = match (statements.first(), statements.last()) {
        (Some(first), Some(last)) => Location::new(
            first.location.file.clone(),
            first.location.start,
            last.location.stop,
        ),
        _ => Location::synthetic(
            std::sync::Arc::from(""),
            crate::location::Position::new(1, 1),
        ),
    };
    Define {
        location,
        name: AccessChain::single(Statement::TOPLEVEL_NAME),
        parameters: Parameters::default(),
        body: statements,
        decorators: Vec::new(),
        docstring: None,
        return_annotation: None,
        is_async: false,
        generated: false,
        parent: None,
    }
}

/// Synthesize a default `__init__` for a class that declares no explicit
/// constructor: one `self` parameter, a `pass` body, `generated = true`.
pub fn create_generated_constructor(class: &ClassDef) -> Define {
    Define {
        location: class.location.clone(),
        name: AccessChain::single("__init__"),
        parameters: Parameters::single("self"),
        body: vec![Node::new(class.location.clone(), Statement::Pass)],
        decorators: Vec::new(),
        docstring: class.docstring.clone(),
        return_annotation: None,
        is_async: false,
        generated: true,
        parent: Some(class.name.clone()),
    }
}

// ── Implicit-attribute extraction ────────────────────────────────────────────

/// The first parameter's name, or the literal `"self"` when the define has
/// no parameters. `spec.md` §9 flags this as matching the parser's
/// convention for (malformed) unparameterized constructors; we keep it for
/// bug-compatibility with the reference implementation.
fn self_parameter_name(define: &Define) -> String {
    define
        .parameters
        .first()
        .map(|p| p.name.clone())
        .unwrap_or_else(|| "self".to_string())
}

fn self_call_method_name<'a>(expr: &'a Expression, self_name: &str) -> Option<&'a str> {
    let chain = expr.as_access()?;
    match chain.segments.as_slice() {
        [Segment::Identifier(base), Segment::Identifier(method), Segment::Call(_)] if base == self_name => {
            Some(method.as_str())
        }
        _ => None,
    }
}

/// Flatten `body` into a list of statement references, inlining the bodies
/// of `If`/`For`/`While`/`Try`/`With`, and — only at the outermost call,
/// `allow_call_inline` — inlining a single level of `self.m(...)` calls to
/// sibling methods defined in the class body (`spec.md` §4.1, §9).
fn expand<'a>(
    body: &'a [Node<Statement>],
    self_name: &str,
    class_methods: &HashMap<&'a str, &'a Define>,
    allow_call_inline: bool,
    out: &mut Vec<&'a Node<Statement>>,
) {
    for stmt in body {
        match &stmt.value {
            Statement::If(inner) => {
                expand(&inner.body, self_name, class_methods, allow_call_inline, out);
                expand(&inner.orelse, self_name, class_methods, allow_call_inline, out);
            }
            Statement::For(inner) => {
                expand(&inner.body, self_name, class_methods, allow_call_inline, out);
                expand(&inner.orelse, self_name, class_methods, allow_call_inline, out);
            }
            Statement::While(inner) => {
                expand(&inner.body, self_name, class_methods, allow_call_inline, out);
                expand(&inner.orelse, self_name, class_methods, allow_call_inline, out);
            }
            Statement::Try(inner) => {
                expand(&inner.body, self_name, class_methods, allow_call_inline, out);
                expand(&inner.orelse, self_name, class_methods, allow_call_inline, out);
                expand(&inner.finally, self_name, class_methods, allow_call_inline, out);
            }
            Statement::With(inner) => {
                expand(&inner.body, self_name, class_methods, allow_call_inline, out);
            }
            Statement::Expression(expr) if allow_call_inline => {
                match self_call_method_name(expr, self_name).and_then(|m| class_methods.get(m)) {
                    // Inline verbatim; the inlined body is flattened for
                    // control flow but is not itself searched for further
                    // self.m(...) calls (single-level inlining).
                    Some(callee) => expand(&callee.body, self_name, class_methods, false, out),
                    None => out.push(stmt),
                }
            }
            _ => out.push(stmt),
        }
    }
}

fn class_method_table(definition: &ClassDef) -> HashMap<&str, &Define> {
    definition
        .body
        .iter()
        .filter_map(|stmt| match &stmt.value {
            Statement::Define(define) => define.name.single_identifier().map(|name| (name, define.as_ref())),
            _ => None,
        })
        .collect()
}

/// Extract `self.<field>` assignment targets from `target`, paired with the
/// RHS component that produced each (if any), for the annotation fallback.
fn self_fields<'a>(
    target: &'a Expression,
    value: Option<&'a Expression>,
    self_name: &str,
) -> Vec<(String, Option<&'a Expression>)> {
    if let Some(field) = target.as_simple_attribute(self_name) {
        return vec![(field.to_string(), value)];
    }
    if let Some(components) = target.as_tuple() {
        let values = value.and_then(Expression::as_tuple);
        return components
            .iter()
            .enumerate()
            .filter_map(|(i, component)| {
                let field = component.as_simple_attribute(self_name)?;
                let paired = values.and_then(|vs| vs.get(i));
                Some((field.to_string(), paired))
            })
            .collect();
    }
    Vec::new()
}

/// Derive the instance attributes a constructor installs via `self.x = …`
/// (`spec.md` §4.1).
pub fn implicit_attributes(define: &Define, definition: &ClassDef) -> AttributeMap {
    if define.generated {
        return AttributeMap::new();
    }

    let self_name = self_parameter_name(define);

    let param_annotations: HashMap<&str, &Expression> = define
        .parameters
        .iter()
        .filter_map(|p| p.annotation.as_ref().map(|a| (p.name.as_str(), a)))
        .collect();

    let class_methods = class_method_table(definition);

    let mut flat = Vec::new();
    expand(&define.body, &self_name, &class_methods, true, &mut flat);

    // (field name, location of first occurrence, annotation if any at this occurrence)
    let mut occurrences: Vec<(String, Location, Option<Expression>)> = Vec::new();
    for stmt in &flat {
        let Statement::Assign {
            target,
            annotation,
            value,
            ..
        } = &stmt.value
        else {
            continue;
        };
        for (field, paired_value) in self_fields(target, value.as_ref(), &self_name) {
            let resolved_annotation = annotation.clone().or_else(|| {
                paired_value
                    .and_then(Expression::as_access)
                    .and_then(AccessChain::single_identifier)
                    .and_then(|name| param_annotations.get(name).cloned().cloned())
            });
            occurrences.push((field, stmt.location.clone(), resolved_annotation));
        }
    }

    let mut map = AttributeMap::new();
    let mut order: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, (Location, Vec<Expression>)> = HashMap::new();
    for (field, location, annotation) in occurrences {
        let entry = grouped
            .entry(field.clone())
            .or_insert_with(|| {
                order.push(field.clone());
                (location.clone(), Vec::new())
            });
        if let Some(ann) = annotation {
            if !entry.1.contains(&ann) {
                entry.1.push(ann);
            }
        }
    }

    for field in order {
        let (location, annotations) = grouped.remove(&field).unwrap();
        let annotation = match annotations.len() {
            0 => None,
            1 => annotations.into_iter().next(),
            _ => Some(Expression::union(annotations)),
        };
        let target = Expression::attribute(Expression::name(self_name.clone()), field.clone());
        map.insert(
            AttributeName::new(field),
            Attribute::primitive(location, target, annotation),
        );
    }
    map
}

// ── Property recognition ─────────────────────────────────────────────────────

/// Derive the attribute a `@property`-style decorator exposes, if any
/// (`spec.md` §4.1).
pub fn property_attribute(location: Location, define: &Define, names: &RecognizedNames) -> Option<Attribute> {
    let target = Expression::name(define.name.single_identifier()?.to_string());

    if has_any_decorator(
        define,
        &names
            .class_property_decorators
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>(),
    ) {
        let annotation = define
            .return_annotation
            .clone()
            .map(Expression::class_var);
        let mut attr = Attribute::synthesized(location, target, annotation);
        attr.is_async = define.is_async;
        return Some(attr);
    }

    if has_any_decorator(
        define,
        &names
            .instance_property_decorators
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>(),
    ) {
        let mut attr = Attribute::synthesized(location, target, define.return_annotation.clone());
        attr.is_async = define.is_async;
        return Some(attr);
    }

    if is_property_setter(define) {
        if let Some(second) = define.parameters.nth(1) {
            let mut attr = Attribute::synthesized(location, target, second.annotation.clone());
            attr.setter = true;
            attr.is_async = define.is_async;
            return Some(attr);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::Parameter;
    use std::sync::Arc;

    fn loc() -> Location {
        Location::synthetic(Arc::from("m.py"), crate::location::Position::new(1, 1))
    }

    fn define(name: &str, parent: Option<&str>) -> Define {
        Define {
            location: loc(),
            name: AccessChain::single(name),
            parameters: Parameters::single("self"),
            body: Vec::new(),
            decorators: Vec::new(),
            docstring: None,
            return_annotation: None,
            is_async: false,
            generated: false,
            parent: parent.map(AccessChain::single),
        }
    }

    fn with_decorator(mut d: Define, dotted: &str) -> Define {
        d.decorators.push(Expression::access(AccessChain::dotted(dotted.split('.'))));
        d
    }

    #[test]
    fn test_is_abstract_method_recognizes_all_aliases() {
        for dotted in ["abstractmethod", "abc.abstractmethod", "abstractproperty", "abc.abstractproperty"] {
            let d = with_decorator(define("f", Some("C")), dotted);
            assert!(is_abstract_method(&d), "{dotted} should be recognized");
        }
    }

    #[test]
    fn test_is_property_setter_matches_own_name() {
        let d = with_decorator(define("foo", Some("C")), "foo.setter");
        assert!(is_property_setter(&d));
        let other = with_decorator(define("foo", Some("C")), "bar.setter");
        assert!(!is_property_setter(&other));
    }

    #[test]
    fn test_is_constructor_init_and_test_alias() {
        let names = RecognizedNames::default();
        let init = define("__init__", Some("C"));
        assert!(is_constructor(&init, false, &names));

        let setup = define("setUp", Some("C"));
        assert!(!is_constructor(&setup, false, &names));
        assert!(is_constructor(&setup, true, &names));
    }

    #[test]
    fn test_is_constructor_requires_parent() {
        let names = RecognizedNames::default();
        let toplevel_init = define("__init__", None);
        assert!(!is_constructor(&toplevel_init, false, &names));
    }

    #[test]
    fn test_create_toplevel_wraps_statements_and_is_toplevel() {
        let stmts = vec![Node::new(loc(), Statement::Pass)];
        let toplevel = create_toplevel(stmts.clone());
        assert_eq!(toplevel.body, stmts);
        assert!(is_toplevel(&toplevel));
    }

    #[test]
    fn test_create_generated_constructor_shape() {
        let class = ClassDef {
            location: loc(),
            name: AccessChain::single("Foo"),
            bases: Vec::new(),
            body: Vec::new(),
            decorators: Vec::new(),
            docstring: Some("doc".to_string()),
        };
        let ctor = create_generated_constructor(&class);
        assert!(ctor.generated);
        assert_eq!(ctor.parameters.len(), 1);
        assert_eq!(ctor.docstring.as_deref(), Some("doc"));
        assert!(matches!(ctor.body.as_slice(), [n] if n.value == Statement::Pass));
    }

    #[test]
    fn test_implicit_attributes_generated_constructor_is_empty() {
        let class = ClassDef {
            location: loc(),
            name: AccessChain::single("Foo"),
            bases: Vec::new(),
            body: Vec::new(),
            decorators: Vec::new(),
            docstring: None,
        };
        let ctor = create_generated_constructor(&class);
        assert!(implicit_attributes(&ctor, &class).is_empty());
    }

    fn assign(target: Expression, annotation: Option<Expression>, value: Option<Expression>) -> Node<Statement> {
        Node::new(
            loc(),
            Statement::Assign {
                target,
                annotation,
                value,
                parent: None,
            },
        )
    }

    /// Scenario A: `self.a = x` with `x: int` parameter, `self.b: str = ""`.
    #[test]
    fn test_scenario_a_parameter_annotation_fallback() {
        let mut ctor = define("__init__", Some("Foo"));
        ctor.parameters = Parameters {
            args: vec![
                Parameter::new("self"),
                Parameter::new("x").with_annotation(Expression::name("int")),
            ],
            ..Default::default()
        };
        ctor.body = vec![
            assign(
                Expression::attribute(Expression::name("self"), "a"),
                None,
                Some(Expression::name("x")),
            ),
            assign(
                Expression::attribute(Expression::name("self"), "b"),
                Some(Expression::name("str")),
                Some(Expression::StringLiteral(String::new())),
            ),
        ];
        let class = ClassDef {
            location: loc(),
            name: AccessChain::single("Foo"),
            bases: Vec::new(),
            body: vec![Node::new(loc(), Statement::Define(Box::new(ctor.clone())))],
            decorators: Vec::new(),
            docstring: None,
        };

        let attrs = implicit_attributes(&ctor, &class);
        assert_eq!(
            attrs.get(&AttributeName::new("a")).unwrap().annotation,
            Some(Expression::name("int"))
        );
        assert_eq!(
            attrs.get(&AttributeName::new("b")).unwrap().annotation,
            Some(Expression::name("str"))
        );
    }

    /// `self.m()` where `m` assigns `self.a`: the call is inlined.
    #[test]
    fn test_delegating_constructor_inlines_sibling_method() {
        let mut helper = define("_init_fields", Some("Foo"));
        helper.body = vec![assign(
            Expression::attribute(Expression::name("self"), "a"),
            Some(Expression::name("int")),
            None,
        )];

        let mut ctor = define("__init__", Some("Foo"));
        ctor.body = vec![Node::new(
            loc(),
            Statement::Expression(Expression::call(
                Expression::attribute(Expression::name("self"), "_init_fields"),
                vec![],
            )),
        )];

        let class = ClassDef {
            location: loc(),
            name: AccessChain::single("Foo"),
            bases: Vec::new(),
            body: vec![
                Node::new(loc(), Statement::Define(Box::new(ctor.clone()))),
                Node::new(loc(), Statement::Define(Box::new(helper))),
            ],
            decorators: Vec::new(),
            docstring: None,
        };

        let attrs = implicit_attributes(&ctor, &class);
        assert_eq!(
            attrs.get(&AttributeName::new("a")).unwrap().annotation,
            Some(Expression::name("int"))
        );
    }

    #[test]
    fn test_property_attribute_setter_uses_second_parameter() {
        let mut setter = define("foo", Some("Foo"));
        setter.parameters = Parameters {
            args: vec![
                Parameter::new("self"),
                Parameter::new("v").with_annotation(Expression::name("str")),
            ],
            ..Default::default()
        };
        let setter = with_decorator(setter, "foo.setter");
        let names = RecognizedNames::default();
        let attr = property_attribute(loc(), &setter, &names).unwrap();
        assert!(attr.setter);
        assert_eq!(attr.annotation, Some(Expression::name("str")));
    }

    #[test]
    fn test_property_attribute_class_level_wraps_classvar() {
        let mut getter = define("foo", Some("Foo"));
        getter.return_annotation = Some(Expression::name("int"));
        let getter = with_decorator(getter, "util.classproperty");
        let names = RecognizedNames::default();
        let attr = property_attribute(loc(), &getter, &names).unwrap();
        assert_eq!(attr.annotation, Some(Expression::class_var(Expression::name("int"))));
    }
}
