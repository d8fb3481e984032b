//! A minimal stand-in for the expression AST.
//!
//! The real expression grammar (identifiers, literals, access chains,
//! calls, tuples, and everything else the target language's expression
//! syntax contains) is an external collaborator: this crate only ever
//! treats it as an opaque, equality-comparable, hashable value and queries
//! its "shape" through [`Expression::as_access`], [`Expression::as_tuple`],
//! [`Expression::as_string`], and [`Expression::as_integer`] — never by
//! matching on variants directly outside this module.
//!
//! This type exists so the rest of the crate has something concrete to
//! compile and test against; a host embedding this crate against its own
//! richer expression AST only needs to implement the same four queries.

use std::fmt;

/// One segment of an [`AccessChain`]: a dotted identifier, a call, or (only
/// ever as the first segment) an arbitrary expression the chain is rooted
/// at — used when a non-access expression needs `.method()` called on it,
/// e.g. the preamble for `for x in some_call():`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Identifier(String),
    Call(Vec<Expression>),
    Base(Box<Expression>),
}

/// An ordered sequence of segments representing a qualified name or call,
/// e.g. `abc.abstractmethod` is two identifier segments; `foo.setter`
/// likewise; `a.b(1, 2).c` is identifier, identifier, call, identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccessChain {
    pub segments: Vec<Segment>,
}

impl AccessChain {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// An access chain made only of identifier segments, e.g. `a.b.c`.
    pub fn dotted(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            segments: names
                .into_iter()
                .map(|n| Segment::Identifier(n.into()))
                .collect(),
        }
    }

    /// A single bare identifier, e.g. `self`.
    pub fn single(name: impl Into<String>) -> Self {
        Self::dotted([name.into()])
    }

    /// The leading identifier segments, stopping at the first non-identifier
    /// segment (i.e. the first call). Used by decorator matching, which
    /// only cares about the dotted name prefix of a (possibly called)
    /// decorator expression.
    pub fn leading_identifiers(&self) -> Vec<&str> {
        self.segments
            .iter()
            .map_while(|s| match s {
                Segment::Identifier(name) => Some(name.as_str()),
                Segment::Call(_) | Segment::Base(_) => None,
            })
            .collect()
    }

    /// True iff every segment is an identifier and their dot-joined form
    /// equals `dotted_name`.
    pub fn is_dotted_name(&self, dotted_name: &str) -> bool {
        let leading = self.leading_identifiers();
        if leading.len() != self.segments.len() {
            return false;
        }
        leading.join(".") == dotted_name
    }

    /// True iff the full chain is `<prefix>.<suffix>` where `prefix` is this
    /// chain's leading identifiers minus the last, and the last identifier
    /// equals `suffix` — used by `is_property_setter`.
    pub fn last_identifier(&self) -> Option<&str> {
        match self.segments.last() {
            Some(Segment::Identifier(name)) => Some(name.as_str()),
            _ => None,
        }
    }

    /// This chain is exactly one identifier segment, e.g. a bare name.
    pub fn single_identifier(&self) -> Option<&str> {
        match self.segments.as_slice() {
            [Segment::Identifier(name)] => Some(name.as_str()),
            _ => None,
        }
    }

    /// True iff `dotted_name`'s components equal this chain's leading
    /// identifier segments exactly, with only `Call` segments allowed to
    /// trail (e.g. `@dataclass(frozen=True)` matches `"dataclass"`).
    /// Segment count of the identifier prefix must equal the number of
    /// dotted components — a decorator with *more* dotted segments than
    /// `dotted_name` does not match (`spec.md` §4.1).
    pub fn matches_decorator(&self, dotted_name: &str) -> bool {
        let leading = self.leading_identifiers();
        if leading.join(".") != dotted_name {
            return false;
        }
        self.segments[leading.len()..]
            .iter()
            .all(|s| matches!(s, Segment::Call(_)))
    }
}

impl fmt::Display for AccessChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            match seg {
                Segment::Identifier(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{name}")?;
                }
                Segment::Call(args) => {
                    write!(f, "(")?;
                    for (j, a) in args.iter().enumerate() {
                        if j > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{a}")?;
                    }
                    write!(f, ")")?;
                }
                Segment::Base(expr) => write!(f, "{expr}")?,
            }
        }
        Ok(())
    }
}

/// Returns `expr`'s inner chain if it already is an access chain, otherwise
/// wraps it as a single [`Segment::Base`] root segment so a caller can
/// uniformly push further identifier/call segments onto the result.
fn ensure_access_chain(expr: Expression) -> AccessChain {
    match expr {
        Expression::Access(chain) => chain,
        other => AccessChain::new(vec![Segment::Base(Box::new(other))]),
    }
}

/// An opaque expression value. Structurally identical expressions compare
/// equal; this is relied on by stub merging (`Class::update`) and by
/// tuple-target assignment matching in attribute aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    Access(AccessChain),
    Tuple(Vec<Expression>),
    StringLiteral(String),
    IntegerLiteral(i64),
    /// A generic-subscript expression, e.g. `typing.Union[int, str]`. This
    /// crate only ever constructs these itself (union synthesis, `ClassVar`
    /// wrapping) — it never needs to query one apart from equality and
    /// display, so it lives outside the four-query opaque contract.
    Subscript(Box<Expression>, Vec<Expression>),
    /// Anything this crate has no structural interest in. Two `Other`
    /// expressions compare equal iff their rendered forms are equal — this
    /// is a deliberately coarse fallback, sufficient for the subset of
    /// expressions this crate ever needs to compare.
    Other(String),
}

impl Expression {
    pub fn access(chain: AccessChain) -> Self {
        Self::Access(chain)
    }

    pub fn name(identifier: impl Into<String>) -> Self {
        Self::Access(AccessChain::single(identifier))
    }

    pub fn attribute(base: Expression, attr: impl Into<String>) -> Self {
        let mut chain = ensure_access_chain(base);
        chain.segments.push(Segment::Identifier(attr.into()));
        Expression::Access(chain)
    }

    pub fn call(func: Expression, args: Vec<Expression>) -> Self {
        let mut chain = ensure_access_chain(func);
        chain.segments.push(Segment::Call(args));
        Expression::Access(chain)
    }

    pub fn as_access(&self) -> Option<&AccessChain> {
        match self {
            Expression::Access(chain) => Some(chain),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[Expression]> {
        match self {
            Expression::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Expression::StringLiteral(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Expression::IntegerLiteral(n) => Some(*n),
            _ => None,
        }
    }

    /// True iff this expression is a two-segment access chain
    /// `<base>.<attr>` with `base` being a bare identifier equal to `base`.
    /// Used to recognize `self.<field>` assignment targets.
    pub fn as_simple_attribute(&self, base: &str) -> Option<&str> {
        let chain = self.as_access()?;
        match chain.segments.as_slice() {
            [Segment::Identifier(b), Segment::Identifier(attr)] if b == base => Some(attr),
            _ => None,
        }
    }

    pub fn subscript(base: Expression, args: Vec<Expression>) -> Self {
        Expression::Subscript(Box::new(base), args)
    }

    /// `typing.Union[a, b, …]`, used to merge divergent attribute
    /// annotations (`spec.md` §4.1 step 4).
    pub fn union(alternatives: Vec<Expression>) -> Self {
        Self::subscript(Expression::access(AccessChain::dotted(["typing", "Union"])), alternatives)
    }

    /// `typing.ClassVar[inner]`, used by class-level property recognition.
    pub fn class_var(inner: Expression) -> Self {
        Self::subscript(Expression::access(AccessChain::dotted(["typing", "ClassVar"])), vec![inner])
    }

    /// `typing.Type[inner]`, used by nested-class attribute synthesis.
    pub fn type_of(inner: Expression) -> Self {
        Self::subscript(Expression::access(AccessChain::dotted(["typing", "Type"])), vec![inner])
    }

    /// Synthesize `self.__getitem__(i)` — used by tuple-destructuring
    /// attribute extraction (`spec.md` §4.2, tuple-RHS-with-tuple-LHS case).
    pub fn getitem(self, index: i64) -> Self {
        let mut chain = ensure_access_chain(self);
        chain.segments.push(Segment::Identifier("__getitem__".to_string()));
        chain.segments.push(Segment::Call(vec![Expression::IntegerLiteral(index)]));
        Expression::Access(chain)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Access(chain) => write!(f, "{chain}"),
            Expression::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Expression::StringLiteral(s) => write!(f, "{s:?}"),
            Expression::IntegerLiteral(n) => write!(f, "{n}"),
            Expression::Subscript(base, args) => {
                write!(f, "{base}[")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{a}")?;
                }
                write!(f, "]")
            }
            Expression::Other(text) => write!(f, "{text}"),
        }
    }
}
