//! Docstring extraction (`spec.md` §3 invariant 3, `SPEC_FULL.md` §4.8).

use crate::location::Node;
use crate::statement::Statement;

/// If `statements` opens with an `Expression` statement wrapping a string
/// literal, return it with every continuation line (line 2 onward)
/// unindented to the minimum common indentation of its non-blank lines —
/// the same normalization `inspect.cleandoc` performs on the target
/// language's docstrings. The first line is never touched, since it starts
/// right after the opening quote and carries no leading indentation of its
/// own to strip.
pub fn extract_docstring(statements: &[Node<Statement>]) -> Option<String> {
    let first = statements.first()?;
    let Statement::Expression(expr) = &first.value else {
        return None;
    };
    let raw = expr.as_string()?;
    Some(clean_doc(raw))
}

fn clean_doc(raw: &str) -> String {
    let mut lines = raw.split('\n');
    let Some(first_line) = lines.next() else {
        return String::new();
    };
    let rest: Vec<&str> = lines.collect();

    let min_indent = rest
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min();

    let Some(min_indent) = min_indent else {
        return first_line.trim_end().to_string();
    };

    let mut cleaned = vec![first_line.trim_end().to_string()];
    for line in rest {
        if line.trim().is_empty() {
            cleaned.push(String::new());
        } else {
            cleaned.push(line[min_indent.min(line.len())..].trim_end().to_string());
        }
    }
    while cleaned.last().is_some_and(|l| l.is_empty()) {
        cleaned.pop();
    }
    cleaned.join("\n")
}
