//! Accumulated compiler errors.
use std::{fmt, slice};

use crate::lex::LexError;

/// Stage of the pipeline that reported the problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Lexical,
    Syntactic,
    Semantic,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Lexical => write!(f, "lexical error"),
            Self::Syntactic => write!(f, "syntax error"),
            Self::Semantic => write!(f, "semantic error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub line: u32,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl ToString, line: u32) -> Self {
        Self {
            severity,
            message: message.to_string(),
            line,
        }
    }

    pub fn lexical(err: &LexError, source: &str) -> Self {
        Self::new(Severity::Lexical, err.describe(source), err.span.line)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}: {}: {}", self.line, self.severity, self.message)
    }
}

/// Ordered list of diagnostics, in the order they were reported.
///
/// Reporting never touches any other compiler state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn report(&mut self, diagnostic: Diagnostic) {
        log::debug!("{diagnostic}");
        self.items.push(diagnostic);
    }

    /// Append all diagnostics of another list, keeping their order.
    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    /// Order by line. Diagnostics on the same line keep their relative order.
    pub fn sort_by_line(&mut self) {
        self.items.sort_by_key(|d| d.line);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    /// Number of diagnostics with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.items.iter().filter(|d| d.severity == severity).count()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.items
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// One diagnostic per line.
impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for diagnostic in &self.items {
            writeln!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sort_by_line_is_stable() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(Diagnostic::new(Severity::Semantic, "c", 3));
        diagnostics.report(Diagnostic::new(Severity::Lexical, "a", 1));
        diagnostics.report(Diagnostic::new(Severity::Syntactic, "b", 1));
        diagnostics.sort_by_line();

        let messages = diagnostics.iter().map(|d| d.message.as_str()).collect::<Vec<_>>();
        assert_eq!(messages, vec!["a", "b", "c"]);
        assert_eq!(diagnostics.count(Severity::Lexical), 1);
        assert_eq!(
            diagnostics.to_string(),
            "line 1: lexical error: a\nline 1: syntax error: b\nline 3: semantic error: c\n"
        );
    }
}
