//! Semantic Analysis
//!
//! Validates a parsed schema in three phases:
//!
//! 1. symbol table construction (duplicate definition names abort analysis)
//! 2. per-definition structural/reference checks and leaf termination
//! 3. cycle detection, where `ref<entity>` is the only cycle breaker
//!
//! All state is created per call; independent schemas can be analyzed on
//! separate threads without coordination.
//!
//! The analyzer trusts the tree it receives. Callers must not analyze a
//! schema whose parse produced diagnostics (see [`crate::compile`]).

pub mod cycles;
pub mod path;
pub mod structure;
pub mod symbols;
pub mod termination;

use serde::Serialize;
use tracing::debug;

pub use path::{PathSegment, TypePath};
pub use symbols::{SymbolEntry, SymbolTable};

use crate::diagnostics::Diagnostics;
use crate::syntax::Schema;

/// Outcome of analyzing one schema
#[derive(Debug, Clone, Default, Serialize)]
pub struct Analysis {
    pub diagnostics: Diagnostics,
}

impl Analysis {
    /// True when no invariant was violated
    pub fn is_valid(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Run all phases over `schema`
pub fn analyze(schema: &Schema) -> Analysis {
    let mut diagnostics = Diagnostics::new();

    let symbols = SymbolTable::build(schema, &mut diagnostics);
    debug!(
        definitions = schema.len(),
        symbols = symbols.len(),
        duplicates = diagnostics.len(),
        "phase 1: symbol table"
    );
    if !diagnostics.is_empty() {
        // names are ambiguous; later lookups would be unreliable
        return Analysis { diagnostics };
    }

    let before = diagnostics.len();
    for (index, definition) in schema.definitions.iter().enumerate() {
        structure::check_definition(definition, index, &symbols, &mut diagnostics);
        termination::check_definition(definition, &symbols, &mut diagnostics);
    }
    debug!(errors = diagnostics.len() - before, "phase 2: structure and references");

    let before = diagnostics.len();
    cycles::check(schema, &symbols, &mut diagnostics);
    debug!(errors = diagnostics.len() - before, "phase 3: cycles");

    Analysis { diagnostics }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Parser;

    fn analyze_src(src: &str) -> Analysis {
        let out = Parser::new(src).parse();
        assert!(out.is_clean(), "parse failed: {}", out.diagnostics);
        analyze(&out.schema)
    }

    #[test]
    fn test_empty_schema_is_valid() {
        assert!(analyze(&Schema::new()).is_valid());
    }

    #[test]
    fn test_duplicates_stop_analysis() {
        // the undefined reference would be reported if phase 2 ran
        let analysis = analyze_src("A : struct { x: Missing }\nA : u8");
        assert!(!analysis.is_valid());
        assert_eq!(analysis.diagnostics.len(), 1);
        assert!(analysis.diagnostics.contains("Duplicate type definition: 'A'"));
    }

    #[test]
    fn test_phase_two_and_three_accumulate() {
        let analysis = analyze_src("A : struct { b: B, e: struct {} }\nB : struct { a: A }");
        let messages = analysis.diagnostics.messages();
        assert_eq!(messages.len(), 4, "{:?}", messages);
        assert!(messages[0].contains("Illegal forward reference to type 'B' in 'A.b'"));
        assert!(messages[1].contains("Empty struct in 'A.e'"));
        assert!(messages[2].contains("Circular type dependency detected for: 'A'"));
        assert!(messages[3].contains("Circular type dependency detected for: 'B'"));
    }

    #[test]
    fn test_self_reference_by_name() {
        let analysis = analyze_src("Node : struct { child: Node }");
        assert!(analysis.diagnostics.contains("Illegal forward reference to type 'Node'"));
        assert!(analysis.diagnostics.contains("Circular type dependency detected for: 'Node'"));
    }
}
