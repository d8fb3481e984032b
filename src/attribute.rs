//! The `Attribute` record and the map type class/define services build it
//! into.
//!
//! Attribute map keys are single-segment accesses. Rather than threading
//! `String` everywhere and re-hashing the same identifiers, callers index
//! the map with a small newtype so a future switch to an interned
//! representation does not ripple through the public API (design note,
//! `spec.md` §9: "represent them as a hashed wrapper over the identifier
//! string").

use crate::expression::Expression;
use crate::location::Location;
use crate::statement::Define;
use std::collections::BTreeMap;
use std::fmt;

/// A single-segment name used as an attribute map key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttributeName(pub String);

impl AttributeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AttributeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AttributeName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AttributeName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A discovered class or instance attribute.
///
/// `primitive` distinguishes attributes arising from a direct assignment
/// (explicit class-body assignment or implicit `self.x = …` in a
/// constructor) from synthesized callable/property/nested-class attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub location: Location,
    pub target: Expression,
    pub annotation: Option<Expression>,
    /// Overload signatures accumulated when multiple `Define`s share a
    /// name (bodies cleared before being stored here — see `DESIGN.md`).
    pub defines: Option<Vec<Define>>,
    pub value: Option<Expression>,
    pub is_async: bool,
    pub setter: bool,
    pub primitive: bool,
}

impl Attribute {
    /// A plain, primitive attribute with no overloads, not async, not a
    /// setter — the common case produced by explicit and implicit
    /// assignment extraction.
    pub fn primitive(location: Location, target: Expression, annotation: Option<Expression>) -> Self {
        Self {
            location,
            target,
            annotation,
            defines: None,
            value: None,
            is_async: false,
            setter: false,
            primitive: true,
        }
    }

    pub fn callable(location: Location, target: Expression, defines: Vec<Define>) -> Self {
        Self {
            location,
            target,
            annotation: None,
            defines: Some(defines),
            value: None,
            is_async: false,
            setter: false,
            primitive: false,
        }
    }

    /// A synthesized (non-assignment) attribute — a `@property`/setter pair
    /// or a nested class's `ClassVar[Type[...]]` — not async, no overloads.
    pub fn synthesized(location: Location, target: Expression, annotation: Option<Expression>) -> Self {
        Self {
            location,
            target,
            annotation,
            defines: None,
            value: None,
            is_async: false,
            setter: false,
            primitive: false,
        }
    }
}

/// Attributes keyed by name, iterated in key order so pretty-printing and
/// golden tests never depend on hash-map iteration order (`spec.md` §9).
pub type AttributeMap = BTreeMap<AttributeName, Attribute>;
