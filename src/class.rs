//! Class Services: attribute aggregation and stub merging (`spec.md` §4.2).
//!
//! `attributes` builds five layers independently and merges them into a
//! running accumulator from lowest to highest priority, each layer
//! overwriting same-key entries from the layers merged before it, so layer
//! 1 (explicit assignments), merged last, always wins a key conflict — the
//! same "merge smaller, more specific maps into a running accumulator"
//! shape the teacher's checks use to combine per-scope findings.

use crate::attribute::{Attribute, AttributeMap, AttributeName};
use crate::config::RecognizedNames;
use crate::define;
use crate::expression::Expression;
use crate::location::Node;
use crate::statement::{ClassDef, Define, Statement, StubDeclaration};
use std::collections::HashMap;

/// Target/annotation/value extracted from either an `Assign` or a
/// `Stub(Assign)` class-body entry — the two are treated identically once
/// reduced to this shape.
struct AssignLike<'a> {
    target: &'a Expression,
    annotation: Option<&'a Expression>,
    value: Option<&'a Expression>,
}

fn as_assign_like(stmt: &Statement) -> Option<AssignLike<'_>> {
    match stmt {
        Statement::Assign {
            target,
            annotation,
            value,
            ..
        } => Some(AssignLike {
            target,
            annotation: annotation.as_ref(),
            value: value.as_ref(),
        }),
        Statement::Stub(stub) => match stub.as_ref() {
            StubDeclaration::Assign { target, annotation } => Some(AssignLike {
                target,
                annotation: annotation.as_ref(),
                value: None,
            }),
            _ => None,
        },
        _ => None,
    }
}

/// Layer 1: explicit class-body assignments, including tuple-destructuring
/// forms (`spec.md` §4.2 step 1).
fn explicit_assignment_attributes(class: &ClassDef) -> AttributeMap {
    let mut map = AttributeMap::new();
    for stmt in &class.body {
        let Some(assign) = as_assign_like(&stmt.value) else {
            continue;
        };
        if let Some(name) = assign.target.as_access().and_then(|c| c.single_identifier()) {
            let mut attr = Attribute::primitive(stmt.location.clone(), assign.target.clone(), assign.annotation.cloned());
            attr.value = assign.value.cloned();
            map.insert(AttributeName::new(name), attr);
            continue;
        }
        let Some(targets) = assign.target.as_tuple() else {
            continue;
        };
        if let Some(values) = assign.value.and_then(Expression::as_tuple) {
            if values.len() != targets.len() {
                continue;
            }
            for (target, value) in targets.iter().zip(values) {
                let Some(name) = target.as_access().and_then(|c| c.single_identifier()) else {
                    continue;
                };
                let mut attr = Attribute::primitive(stmt.location.clone(), target.clone(), None);
                attr.value = Some(value.clone());
                map.insert(AttributeName::new(name), attr);
            }
        } else if let Some(rhs) = assign.value {
            for (index, target) in targets.iter().enumerate() {
                let Some(name) = target.as_access().and_then(|c| c.single_identifier()) else {
                    continue;
                };
                let mut attr = Attribute::primitive(stmt.location.clone(), target.clone(), None);
                attr.value = Some(rhs.clone().getitem(index as i64));
                map.insert(AttributeName::new(name), attr);
            }
        }
    }
    map
}

/// One field's accumulated shape across every constructor, before its
/// annotations are collapsed to `None`/single/`Union[...]`.
struct PendingImplicit {
    location: crate::location::Location,
    target: Expression,
    annotations: Vec<Expression>,
}

/// Layer 2: union of `implicit_attributes` over every constructor — a field
/// assigned divergent types across constructors carries their
/// `typing.Union[...]` (`spec.md` §4.2 step 2, Scenario B), the same way
/// `define::implicit_attributes` unions annotations across occurrences
/// within a single constructor's own body.
fn implicit_layer_attributes(class: &ClassDef, in_test: bool, names: &RecognizedNames) -> AttributeMap {
    let mut grouped: HashMap<AttributeName, PendingImplicit> = HashMap::new();
    let mut order: Vec<AttributeName> = Vec::new();
    for stmt in &class.body {
        let Statement::Define(define) = &stmt.value else {
            continue;
        };
        if !define::is_constructor(define, in_test, names) {
            continue;
        }
        for (key, attr) in define::implicit_attributes(define, class) {
            let entry = grouped.entry(key.clone()).or_insert_with(|| {
                order.push(key.clone());
                PendingImplicit {
                    location: attr.location.clone(),
                    target: attr.target.clone(),
                    annotations: Vec::new(),
                }
            });
            if let Some(annotation) = attr.annotation {
                if !entry.annotations.contains(&annotation) {
                    entry.annotations.push(annotation);
                }
            }
        }
    }
    let mut map = AttributeMap::new();
    for key in order {
        let pending = grouped.remove(&key).unwrap();
        let annotation = match pending.annotations.len() {
            0 => None,
            1 => pending.annotations.into_iter().next(),
            _ => Some(Expression::union(pending.annotations)),
        };
        map.insert(key, Attribute::primitive(pending.location, pending.target, annotation));
    }
    map
}

/// Layer 3: property attributes, with setter/getter merged into one entry
/// (`spec.md` §4.2 step 3, Scenario F).
fn property_layer_attributes(class: &ClassDef, names: &RecognizedNames) -> AttributeMap {
    let mut map = AttributeMap::new();
    for stmt in &class.body {
        let define = match &stmt.value {
            Statement::Define(define) => define.as_ref(),
            Statement::Stub(stub) => match stub.as_ref() {
                StubDeclaration::Define(define) => define.as_ref(),
                _ => continue,
            },
            _ => continue,
        };
        let Some(attr) = define::property_attribute(stmt.location.clone(), define, names) else {
            continue;
        };
        let Some(name) = define.name.single_identifier() else {
            continue;
        };
        let key = AttributeName::new(name);
        match map.remove(&key) {
            Some(existing) if existing.setter != attr.setter => {
                let (getter, setter) = if attr.setter { (existing, attr) } else { (attr, existing) };
                map.insert(
                    key,
                    Attribute {
                        setter: true,
                        annotation: getter.annotation,
                        value: setter.annotation,
                        ..getter
                    },
                );
            }
            Some(existing) => {
                map.insert(key, existing);
            }
            None => {
                map.insert(key, attr);
            }
        }
    }
    map
}

/// Layer 4: one callable attribute per method name, `defines` accumulating
/// every overload signature with its body cleared (`spec.md` §4.2 step 4).
fn callable_layer_attributes(class: &ClassDef) -> AttributeMap {
    let mut grouped: HashMap<AttributeName, (crate::location::Location, Expression, Vec<Define>)> = HashMap::new();
    let mut order: Vec<AttributeName> = Vec::new();
    for stmt in &class.body {
        let Statement::Define(define) = &stmt.value else {
            continue;
        };
        let Some(name) = define.name.single_identifier() else {
            continue;
        };
        let key = AttributeName::new(name);
        let mut signature = define.as_ref().clone();
        signature.body = Vec::new();
        let entry = grouped.entry(key.clone()).or_insert_with(|| {
            order.push(key.clone());
            (stmt.location.clone(), Expression::name(name.to_string()), Vec::new())
        });
        entry.2.push(signature);
    }
    let mut map = AttributeMap::new();
    for key in order {
        let (location, target, defines) = grouped.remove(&key).unwrap();
        let is_async = defines.iter().any(|d| d.is_async);
        let mut attr = Attribute::callable(location, target, defines);
        attr.is_async = is_async;
        map.insert(key, attr);
    }
    map
}

/// Layer 5: nested classes contribute `typing.ClassVar[typing.Type[…]]`
/// (`spec.md` §4.2 step 5).
fn nested_class_layer_attributes(class: &ClassDef) -> AttributeMap {
    let mut map = AttributeMap::new();
    for stmt in &class.body {
        let nested = match &stmt.value {
            Statement::Class(nested) => nested.as_ref(),
            Statement::Stub(stub) => match stub.as_ref() {
                StubDeclaration::Class(nested) => nested.as_ref(),
                _ => continue,
            },
            _ => continue,
        };
        let Some(last) = nested.name.leading_identifiers().last().map(|s| s.to_string()) else {
            continue;
        };
        let full = Expression::access(nested.name.clone());
        let annotation = Expression::class_var(Expression::type_of(full));
        map.insert(
            AttributeName::new(last.clone()),
            Attribute::synthesized(stmt.location.clone(), Expression::name(last), Some(annotation)),
        );
    }
    map
}

/// Merge `layer` into `acc`, overwriting any key `acc` already has — callers
/// merge layers lowest-priority-first so the last layer merged always wins.
fn merge_overriding_accumulator(acc: &mut AttributeMap, layer: AttributeMap) {
    for (key, attr) in layer {
        acc.insert(key, attr);
    }
}

/// `spec.md` §4.2: merge the five layers in increasing priority, so layer 1
/// (explicit assignments), merged last, always wins a key conflict.
pub fn attributes(
    class: &ClassDef,
    in_test: bool,
    include_generated_attributes: bool,
    names: &RecognizedNames,
) -> AttributeMap {
    let mut acc = AttributeMap::new();
    merge_overriding_accumulator(&mut acc, nested_class_layer_attributes(class));
    merge_overriding_accumulator(&mut acc, callable_layer_attributes(class));
    merge_overriding_accumulator(&mut acc, property_layer_attributes(class, names));
    if include_generated_attributes {
        merge_overriding_accumulator(&mut acc, implicit_layer_attributes(class, in_test, names));
    }
    merge_overriding_accumulator(&mut acc, explicit_assignment_attributes(class));
    acc
}

/// The sublist of body defines for which `is_constructor` holds.
pub fn constructors<'a>(class: &'a ClassDef, in_test: bool, names: &RecognizedNames) -> Vec<&'a Define> {
    class
        .body
        .iter()
        .filter_map(|stmt| match &stmt.value {
            Statement::Define(define) if define::is_constructor(define, in_test, names) => Some(define.as_ref()),
            _ => None,
        })
        .collect()
}

fn stub_assign_match<'a>(stub: &'a ClassDef, target: &Expression) -> Option<Option<&'a Expression>> {
    stub.body.iter().find_map(|stmt| {
        let assign = as_assign_like(&stmt.value)?;
        (assign.target == target).then_some(assign.annotation)
    })
}

fn stub_define_match<'a>(stub: &'a ClassDef, define: &Define) -> Option<&'a Define> {
    stub.body.iter().find_map(|stmt| {
        let candidate = match &stmt.value {
            Statement::Define(d) => d.as_ref(),
            Statement::Stub(s) => match s.as_ref() {
                StubDeclaration::Define(d) => d.as_ref(),
                _ => return None,
            },
            _ => return None,
        };
        (candidate.name == define.name && candidate.parameters.len() == define.parameters.len()).then_some(candidate)
    })
}

/// Merge a parallel stub class's annotations into `definition`'s body
/// (`spec.md` §4.2 "Stub merge").
pub fn update(definition: &ClassDef, stub: &ClassDef) -> ClassDef {
    let mut matched_stub_assigns: Vec<&Expression> = Vec::new();
    let mut matched_stub_defines: Vec<&Define> = Vec::new();

    let updated: Vec<Node<Statement>> = definition
        .body
        .iter()
        .map(|stmt| match &stmt.value {
            Statement::Assign {
                target,
                annotation,
                value,
                parent,
            } => {
                if let Some(stub_annotation) = stub_assign_match(stub, target) {
                    matched_stub_assigns.push(target);
                    stmt.inherit(Statement::Assign {
                        target: target.clone(),
                        annotation: stub_annotation.cloned(),
                        value: value.clone(),
                        parent: parent.clone(),
                    })
                } else {
                    stmt.clone()
                }
            }
            Statement::Define(define) => {
                if let Some(stub_define) = stub_define_match(stub, define) {
                    matched_stub_defines.push(stub_define);
                    let mut merged = define.as_ref().clone();
                    merged.parameters = stub_define.parameters.clone();
                    merged.return_annotation = stub_define.return_annotation.clone();
                    stmt.inherit(Statement::Define(Box::new(merged)))
                } else {
                    stmt.clone()
                }
            }
            _ => stmt.clone(),
        })
        .collect();

    let undefined: Vec<Node<Statement>> = stub
        .body
        .iter()
        .filter(|stmt| match &stmt.value {
            Statement::Stub(decl) => match decl.as_ref() {
                StubDeclaration::Assign { target, .. } => !matched_stub_assigns.contains(&target),
                StubDeclaration::Define(define) => !matched_stub_defines.iter().any(|d| d.name == define.name),
                StubDeclaration::Class(_) => true,
            },
            _ => false,
        })
        .cloned()
        .collect();

    let mut body = undefined;
    body.extend(updated);

    ClassDef {
        location: definition.location.clone(),
        name: definition.name.clone(),
        bases: definition.bases.clone(),
        body,
        decorators: definition.decorators.clone(),
        docstring: definition.docstring.clone(),
    }
}
