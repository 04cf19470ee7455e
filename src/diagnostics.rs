//! Diagnostics
//!
//! Collects the errors produced by the tokenizer, parser and semantic analyzer.
//! There is a single class of diagnostic: an error with a position and a
//! human-readable message. Clients match on message text.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::syntax::Span;

// =============================================================================
// Diagnostic
// =============================================================================

/// A single diagnostic, rendered as `Line L, Column C: message`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// 1-based line of the offending token or node
    pub line: usize,
    /// 1-based column of the offending token or node
    pub column: usize,
    /// Human-readable message
    pub message: String,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            line: span.line,
            column: span.column,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}, Column {}: {}", self.line, self.column, self.message)
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Ordered list of diagnostics. Never sorted or deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic item
    pub fn push(&mut self, item: Diagnostic) {
        self.items.push(item);
    }

    /// Add an error at the given position
    pub fn error(&mut self, span: Span, message: impl Into<String>) {
        self.push(Diagnostic::new(message, span));
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True if any rendered diagnostic contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.items.iter().any(|d| d.to_string().contains(needle))
    }

    /// Rendered `Line L, Column C: message` strings, in order
    pub fn messages(&self) -> Vec<String> {
        self.items.iter().map(|d| d.to_string()).collect()
    }

    /// Format all diagnostics for display, one per line
    pub fn format_all(&self) -> String {
        let mut output = String::new();
        for item in &self.items {
            output.push_str(&format!("{}\n", item));
        }
        if !self.is_empty() {
            output.push_str(&format!("\n{} error(s)\n", self.len()));
        }
        output
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_all())
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
