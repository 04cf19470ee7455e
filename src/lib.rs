//! Carch Schema Compiler Front End
//!
//! Reads the Carch schema language (algebraic record types: structs,
//! variants, enums, containers and opaque `ref<entity>` markers) and decides
//! whether a schema is well formed before any code is generated from it.
//!
//! ## Pipeline
//!
//! ```text
//! text ──► Lexer ──► Parser ──► Schema ──► semantic::analyze ──► ValidatedSchema
//!                      │                        │
//!                      └──── Diagnostics ◄──────┘
//! ```
//!
//! Every stage is synchronous and keeps its state local to one call, so
//! separate texts can be compiled on separate threads.
//!
//! ## Example
//!
//! ```
//! let schema = carch::compile("Position : struct { x: f32, y: f32 }").unwrap();
//! assert_eq!(schema.definitions[0].name, "Position");
//!
//! let errors = carch::compile("Entity : struct { pos: Position }").unwrap_err();
//! assert!(errors.contains("Undefined type 'Position'"));
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod format;
pub mod graph;
pub mod lint;
pub mod semantic;
pub mod sources;
pub mod syntax;

use std::ops::Deref;
use std::path::Path;
use tracing::debug;

pub use config::{CarchConfig, FormatConfig, FormatStyle, LintConfig};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{CarchError, Result};
pub use graph::DefinitionGraph;
pub use semantic::{analyze, Analysis};
pub use syntax::{ParseOutput, Schema, TypeDefinition, TypeExpr, TypeExprKind};

/// Tokenize and parse `source` without semantic analysis
pub fn parse(source: &str) -> ParseOutput {
    let output = syntax::Parser::new(source).parse();
    debug!(
        definitions = output.schema.len(),
        errors = output.diagnostics.len(),
        "parsed schema"
    );
    output
}

/// Run the full pipeline. Syntax errors are returned without running
/// semantic analysis.
pub fn compile(source: &str) -> std::result::Result<ValidatedSchema, Diagnostics> {
    let parsed = parse(source);
    if !parsed.is_clean() {
        return Err(parsed.diagnostics);
    }
    let analysis = analyze(&parsed.schema);
    debug!(valid = analysis.is_valid(), errors = analysis.diagnostics.len(), "analyzed schema");
    if !analysis.is_valid() {
        return Err(analysis.diagnostics);
    }
    Ok(ValidatedSchema {
        schema: parsed.schema,
    })
}

/// Read and compile one file
pub fn compile_file(path: &Path) -> Result<ValidatedSchema> {
    let source = sources::read(path)?;
    compile(&source).map_err(|diagnostics| CarchError::Compile {
        path: path.to_path_buf(),
        diagnostics,
    })
}

/// A schema that passed every check. Only [`compile`] produces one, so code
/// generators taking a `ValidatedSchema` never see an invalid tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSchema {
    schema: Schema,
}

impl ValidatedSchema {
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn into_inner(self) -> Schema {
        self.schema
    }

    /// Dependency graph of the definitions
    pub fn graph(&self) -> DefinitionGraph {
        DefinitionGraph::build(&self.schema)
    }
}

impl Deref for ValidatedSchema {
    type Target = Schema;

    fn deref(&self) -> &Schema {
        &self.schema
    }
}
