//! The statement model: a single recursive variant covering every surface
//! construct above expression level, plus the payload structs (`Define`,
//! `ClassDef`, `Parameters`, …) those variants carry.
//!
//! The mutual recursion between `Statement` and its block-holding variants
//! is a single tagged enum with boxed recursive payloads — it is not
//! parameterized over its own type, so the recursion closes cleanly (see
//! `DESIGN.md`).

use crate::expression::{AccessChain, Expression};
use crate::location::{Location, Node};

/// One function/method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    pub name: String,
    pub annotation: Option<Expression>,
    pub default: Option<Expression>,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: None,
            default: None,
        }
    }

    pub fn with_annotation(mut self, annotation: Expression) -> Self {
        self.annotation = Some(annotation);
        self
    }
}

/// A define's full parameter list, split by kind the same way the target
/// language's grammar does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Parameters {
    pub posonly: Vec<Parameter>,
    pub args: Vec<Parameter>,
    pub vararg: Option<Parameter>,
    pub kwonly: Vec<Parameter>,
    pub kwarg: Option<Parameter>,
}

impl Parameters {
    pub fn single(name: impl Into<String>) -> Self {
        Self {
            args: vec![Parameter::new(name)],
            ..Default::default()
        }
    }

    /// All parameters in declaration order: posonly, args, vararg, kwonly,
    /// kwarg. Used wherever a query wants "the first parameter" or "the
    /// second parameter" without caring which bucket it lives in.
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.posonly
            .iter()
            .chain(self.args.iter())
            .chain(self.vararg.iter())
            .chain(self.kwonly.iter())
            .chain(self.kwarg.iter())
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn first(&self) -> Option<&Parameter> {
        self.iter().next()
    }

    pub fn nth(&self, n: usize) -> Option<&Parameter> {
        self.iter().nth(n)
    }
}

/// A function or method definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Define {
    pub location: Location,
    pub name: AccessChain,
    pub parameters: Parameters,
    pub body: Vec<Node<Statement>>,
    pub decorators: Vec<Expression>,
    pub docstring: Option<String>,
    pub return_annotation: Option<Expression>,
    pub is_async: bool,
    /// True iff this define was synthesized rather than parsed (e.g. a
    /// default `__init__`). A generated define is never re-parsed and never
    /// contributes implicit attributes of its own (`implicit_attributes` on
    /// a generated constructor is always empty).
    pub generated: bool,
    /// The enclosing class's name, if this define is a method.
    pub parent: Option<AccessChain>,
}

impl Define {
    /// `parent` present and `name` is a single segment (invariant 4).
    pub fn is_method(&self) -> bool {
        self.parent.is_some() && self.name.segments.len() == 1
    }
}

/// A class definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassDef {
    pub location: Location,
    pub name: AccessChain,
    pub bases: Vec<Expression>,
    pub body: Vec<Node<Statement>>,
    pub decorators: Vec<Expression>,
    pub docstring: Option<String>,
}

/// One handler of a `try` statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExceptHandler {
    pub location: Location,
    /// The exception type expression, e.g. `KeyError` or `(KeyError,
    /// ValueError)`. Absent for a bare `except:`.
    pub kind: Option<Expression>,
    /// The bound name in `except E as name:`.
    pub name: Option<String>,
    pub body: Vec<Node<Statement>>,
}

/// One `(expression, target?)` item of a `with` statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WithItem {
    pub location: Location,
    pub context: Expression,
    pub target: Option<Expression>,
}

/// One imported name, optionally aliased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportItem {
    pub name: String,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForStmt {
    pub target: Expression,
    pub iterator: Expression,
    pub body: Vec<Node<Statement>>,
    pub orelse: Vec<Node<Statement>>,
    pub is_async: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WithStmt {
    pub items: Vec<WithItem>,
    pub body: Vec<Node<Statement>>,
    pub is_async: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TryStmt {
    pub body: Vec<Node<Statement>>,
    pub handlers: Vec<ExceptHandler>,
    pub orelse: Vec<Node<Statement>>,
    pub finally: Vec<Node<Statement>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WhileStmt {
    pub test: Expression,
    pub body: Vec<Node<Statement>>,
    pub orelse: Vec<Node<Statement>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IfStmt {
    pub test: Expression,
    pub body: Vec<Node<Statement>>,
    pub orelse: Vec<Node<Statement>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportStmt {
    /// The `from X import …` module, absent for a bare `import a, b`.
    pub from: Option<String>,
    pub imports: Vec<ImportItem>,
    /// Number of leading dots for a relative `from . import …`.
    pub level: u32,
}

/// A declaration-only form of `Assign`, `Class`, or `Define`, carrying no
/// implementation — used for `.pyi`-style side files that are later merged
/// into the real definition by `Class::update`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StubDeclaration {
    Assign {
        target: Expression,
        annotation: Option<Expression>,
    },
    Class(Box<ClassDef>),
    Define(Box<Define>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Statement {
    Assign {
        target: Expression,
        annotation: Option<Expression>,
        value: Option<Expression>,
        /// The enclosing class, if this is a class-body assignment.
        parent: Option<AccessChain>,
    },
    Assert {
        test: Expression,
        message: Option<Expression>,
    },
    Break,
    Continue,
    Pass,
    Class(Box<ClassDef>),
    Define(Box<Define>),
    Delete(Expression),
    Expression(Expression),
    Raise(Option<Expression>),
    Return(Option<Expression>),
    Yield(Expression),
    YieldFrom(Expression),
    For(Box<ForStmt>),
    With(Box<WithStmt>),
    Try(Box<TryStmt>),
    While(Box<WhileStmt>),
    If(Box<IfStmt>),
    Import(Box<ImportStmt>),
    Global(Vec<String>),
    Nonlocal(Vec<String>),
    Stub(Box<StubDeclaration>),
}

impl Statement {
    /// The toplevel synthetic define's name (invariant 6).
    pub const TOPLEVEL_NAME: &'static str = "$toplevel";
}
