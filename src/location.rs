//! Source locations and the `Node<T>` wrapper that attaches one to a value.
//!
//! Every statement and every synthesized sub-construct in this crate carries
//! a [`Location`] (invariant 2 in the statement-model contract). Locations
//! are plain data: this module does no range arithmetic beyond comparison.

use std::fmt;
use std::sync::Arc;

/// A source position, 1-indexed for both line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The file + start/end position span of a single AST node.
///
/// `file` is reference-counted rather than owned per-node: thousands of
/// nodes in one compilation unit all point at the same path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub file: Arc<str>,
    pub start: Position,
    pub stop: Position,
}

impl Location {
    pub fn new(file: Arc<str>, start: Position, stop: Position) -> Self {
        Self { file, start, stop }
    }

    /// A zero-width location at `pos`, used when synthesizing a node that
    /// has no natural span of its own (e.g. a generated constructor).
    pub fn synthetic(file: Arc<str>, pos: Position) -> Self {
        Self::new(file, pos, pos)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.file, self.start, self.stop)
    }
}

/// Wraps a value with the [`Location`] it was parsed (or synthesized) from.
///
/// `Node<T>` is the one place location-carrying happens; every recursive
/// AST type embeds `Node<Statement>` rather than repeating a `location`
/// field on every variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node<T> {
    pub location: Location,
    pub value: T,
}

impl<T> Node<T> {
    pub fn new(location: Location, value: T) -> Self {
        Self { location, value }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Node<U> {
        Node {
            location: self.location,
            value: f(self.value),
        }
    }

    /// A new node over `value`, inheriting `self`'s location.
    ///
    /// Used by the desugaring preambles (§4.3) to stamp synthesized
    /// statements with the location of the construct that induced them.
    pub fn inherit<U>(&self, value: U) -> Node<U> {
        Node {
            location: self.location.clone(),
            value,
        }
    }
}

impl<T> std::ops::Deref for Node<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> std::ops::DerefMut for Node<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

/// Convert a byte offset into (line, col), both 1-indexed.
///
/// A real parser uses this to turn token offsets into [`Position`]s when
/// building [`Location`]s; kept here as the one piece of location
/// arithmetic this crate still needs for test fixtures.
pub fn offset_to_line_col(offset: usize, source: &str) -> (usize, usize) {
    let mut line = 1;
    let mut line_start = 0;
    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            line_start = i + 1;
        }
    }
    (line, offset - line_start + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(line: usize) -> Location {
        Location::synthetic(Arc::from("test.py"), Position::new(line, 1))
    }

    #[test]
    fn test_line_1_for_start() {
        let src = "import os\n";
        assert_eq!(offset_to_line_col(0, src), (1, 1));
    }

    #[test]
    fn test_second_line() {
        let src = "import os\nimport sys\n";
        assert_eq!(offset_to_line_col(10, src), (2, 1));
    }

    #[test]
    fn test_column_within_line() {
        let src = "x = 1\n";
        assert_eq!(offset_to_line_col(4, src), (1, 5));
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(offset_to_line_col(0, ""), (1, 1));
    }

    #[test]
    fn test_node_inherit_preserves_location() {
        let n = Node::new(loc(3), 42);
        let child = n.inherit("synthesized");
        assert_eq!(child.location, n.location);
        assert_eq!(child.value, "synthesized");
    }

    #[test]
    fn test_node_deref() {
        let n = Node::new(loc(1), vec![1, 2, 3]);
        assert_eq!(n.len(), 3);
    }
}
