//! Schema Style Linting
//!
//! Advisory checks on a parsed (not necessarily validated) schema. Sources
//! that do not parse are not linted; their syntax diagnostics are returned
//! instead.
//!
//! ## Lints
//! 1. **NAMING_CONVENTION**: type names are PascalCase, field names snake_case
//! 2. **COMPLEXITY**: bodies larger than the configured thresholds
//! 3. **NESTING_DEPTH**: inline bodies and containers nested too deeply
//!
//! Every issue is a warning unless the linter runs in strict mode.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::LintConfig;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::semantic::{PathSegment, TypePath};
use crate::sources;
use crate::syntax::{Container, Schema, Span, TypeExpr, TypeExprKind};

pub const NAMING_CONVENTION: &str = "NAMING_CONVENTION";
pub const COMPLEXITY: &str = "COMPLEXITY";
pub const NESTING_DEPTH: &str = "NESTING_DEPTH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LintIssue {
    pub code: &'static str,
    pub severity: Severity,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl LintIssue {
    /// `file:line:col: severity: message [code]`
    pub fn render(&self, file: &str) -> String {
        format!(
            "{}:{}:{}: {}: {} [{}]",
            file, self.line, self.column, self.severity, self.message, self.code
        )
    }
}

/// Result of linting one source
#[derive(Debug, Default, Serialize)]
pub struct LintResult {
    pub source_name: String,
    pub errors: Vec<LintIssue>,
    pub warnings: Vec<LintIssue>,
}

impl LintResult {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// All issues ordered by position
    pub fn issues(&self) -> Vec<&LintIssue> {
        let mut all: Vec<&LintIssue> = self.errors.iter().chain(&self.warnings).collect();
        all.sort_by_key(|i| (i.line, i.column));
        all
    }
}

/// The schema style linter
pub struct SchemaLinter {
    config: LintConfig,
    pascal_case: Regex,
    snake_case: Regex,
}

impl SchemaLinter {
    pub fn new(config: LintConfig) -> Result<Self> {
        Ok(Self {
            config,
            pascal_case: Regex::new(r"^[A-Z][A-Za-z0-9]*$")?,
            snake_case: Regex::new(r"^[a-z][a-z0-9]*(_[a-z0-9]+)*$")?,
        })
    }

    /// Parse and lint `source`. Returns the syntax diagnostics if it does
    /// not parse.
    pub fn lint_source(&self, source_name: &str, source: &str) -> std::result::Result<LintResult, Diagnostics> {
        let parsed = crate::parse(source);
        if !parsed.is_clean() {
            return Err(parsed.diagnostics);
        }
        Ok(self.lint(source_name, &parsed.schema))
    }

    /// Lint a parsed schema
    pub fn lint(&self, source_name: &str, schema: &Schema) -> LintResult {
        let mut result = LintResult {
            source_name: source_name.to_string(),
            ..Default::default()
        };

        for def in &schema.definitions {
            if !self.pascal_case.is_match(&def.name) {
                self.report(
                    &mut result,
                    NAMING_CONVENTION,
                    def.span,
                    format!("Type name '{}' should be PascalCase", def.name),
                );
            }
            let mut path = TypePath::new(&def.name);
            self.lint_expr(&def.ty, 0, &mut path, &mut result);
        }

        result
    }

    fn lint_expr(&self, expr: &TypeExpr, depth: usize, path: &mut TypePath, result: &mut LintResult) {
        let nests = expr.is_braced() || matches!(expr.kind, TypeExprKind::Container(_));
        if nests && depth > self.config.max_nesting_depth {
            self.report(
                result,
                NESTING_DEPTH,
                expr.span,
                format!(
                    "Nesting depth {} in '{}' exceeds maximum {}",
                    depth, path, self.config.max_nesting_depth
                ),
            );
            return;
        }

        match &expr.kind {
            TypeExprKind::Struct { fields } => {
                self.check_size(result, expr.span, path, "Struct", fields.len(), "fields", self.config.max_struct_fields);
                for field in fields {
                    if !self.snake_case.is_match(&field.name) {
                        self.report(
                            result,
                            NAMING_CONVENTION,
                            field.span,
                            format!("Field name '{}' in '{}' should be snake_case", field.name, path),
                        );
                    }
                    path.push(PathSegment::Member(field.name.clone()));
                    self.lint_expr(&field.ty, depth + 1, path, result);
                    path.pop();
                }
            }
            TypeExprKind::Variant { alternatives } => {
                self.check_size(
                    result,
                    expr.span,
                    path,
                    "Variant",
                    alternatives.len(),
                    "alternatives",
                    self.config.max_variant_alternatives,
                );
                for alt in alternatives {
                    if let Some(ty) = &alt.ty {
                        path.push(PathSegment::Member(alt.name.clone()));
                        self.lint_expr(ty, depth + 1, path, result);
                        path.pop();
                    }
                }
            }
            TypeExprKind::Enum { values } => {
                self.check_size(result, expr.span, path, "Enum", values.len(), "values", self.config.max_enum_values);
            }
            TypeExprKind::Container(container) => {
                let segments = match container {
                    Container::Array { .. } => vec![PathSegment::ArrayItems],
                    Container::Map { .. } => vec![PathSegment::MapKey, PathSegment::MapValue],
                    Container::Optional { .. } => vec![PathSegment::Optional],
                };
                for (param, segment) in container.params().into_iter().zip(segments) {
                    if let Some(inner) = param {
                        path.push(segment);
                        self.lint_expr(inner, depth + 1, path, result);
                        path.pop();
                    }
                }
            }
            TypeExprKind::Ref | TypeExprKind::Primitive(_) | TypeExprKind::Identifier(_) => {}
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn check_size(
        &self,
        result: &mut LintResult,
        span: Span,
        path: &TypePath,
        what: &str,
        count: usize,
        members: &str,
        max: usize,
    ) {
        if count > max {
            self.report(
                result,
                COMPLEXITY,
                span,
                format!("{} '{}' has {} {} (maximum {})", what, path, count, members, max),
            );
        }
    }

    fn report(&self, result: &mut LintResult, code: &'static str, span: Span, message: String) {
        let severity = if self.config.strict { Severity::Error } else { Severity::Warning };
        let issue = LintIssue {
            code,
            severity,
            message,
            line: span.line,
            column: span.column,
        };
        match severity {
            Severity::Error => result.errors.push(issue),
            Severity::Warning => result.warnings.push(issue),
        }
    }
}

/// Outcome of linting one file
#[derive(Debug)]
pub enum FileLint {
    Linted(LintResult),
    /// The file did not parse
    Unparsable { path: PathBuf, diagnostics: Diagnostics },
}

/// Lint every `.carch` file under `paths`
pub fn lint_paths(paths: &[PathBuf], config: &LintConfig) -> Result<Vec<FileLint>> {
    let linter = SchemaLinter::new(config.clone())?;
    let mut results = Vec::new();

    for path in sources::collect(paths)? {
        let source = sources::read(&path)?;
        let name = display_name(&path);
        match linter.lint_source(&name, &source) {
            Ok(result) => results.push(FileLint::Linted(result)),
            Err(diagnostics) => results.push(FileLint::Unparsable { path, diagnostics }),
        }
    }

    Ok(results)
}

fn display_name(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linter() -> SchemaLinter {
        SchemaLinter::new(LintConfig::default()).unwrap()
    }

    fn lint(src: &str) -> LintResult {
        linter().lint_source("test.carch", src).unwrap()
    }

    #[test]
    fn test_clean_schema() {
        let result = lint("Position : struct { x_pos: f32, y2: f32 }\nColor : enum { Red }");
        assert!(result.is_clean());
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_naming_conventions() {
        let result = lint("bad_name : struct { GoodField: u8, inner: struct { AlsoBad: u8 } }");
        let messages: Vec<&str> = result.warnings.iter().map(|w| w.message.as_str()).collect();
        assert_eq!(messages.len(), 3, "{:?}", messages);
        assert!(result.warnings.iter().all(|w| w.code == NAMING_CONVENTION));
        assert!(messages[0].contains("Type name 'bad_name' should be PascalCase"));
        assert!(messages[1].contains("Field name 'GoodField' in 'bad_name' should be snake_case"));
        assert!(messages[2].contains("Field name 'AlsoBad' in 'bad_name.inner'"));
        // warnings alone do not fail
        assert!(result.is_clean());
    }

    #[test]
    fn test_complexity_thresholds() {
        let config = LintConfig {
            max_struct_fields: 2,
            max_enum_values: 1,
            max_variant_alternatives: 1,
            ..LintConfig::default()
        };
        let linter = SchemaLinter::new(config).unwrap();
        let result = linter
            .lint_source("t", "Big : struct { a: u8, b: u8, c: u8 }\nE : enum { X, Y }\nV : variant { A, B }")
            .unwrap();
        assert_eq!(result.warnings.len(), 3);
        assert!(result.warnings.iter().all(|w| w.code == COMPLEXITY));
        assert!(result.warnings[0].message.contains("Struct 'Big' has 3 fields (maximum 2)"));
    }

    #[test]
    fn test_nesting_depth() {
        let config = LintConfig {
            max_nesting_depth: 2,
            ..LintConfig::default()
        };
        let linter = SchemaLinter::new(config).unwrap();
        let result = linter
            .lint_source("t", "A : struct { b: struct { c: array<optional<u8>> } }")
            .unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, NESTING_DEPTH);
        assert!(result.warnings[0].message.contains("Nesting depth 3 in 'A.b.c[]' exceeds maximum 2"));
    }

    #[test]
    fn test_strict_mode_turns_warnings_into_errors() {
        let config = LintConfig {
            strict: true,
            ..LintConfig::default()
        };
        let linter = SchemaLinter::new(config).unwrap();
        let result = linter.lint_source("t", "lower : u8").unwrap();
        assert!(!result.is_clean());
        assert_eq!(result.errors[0].severity, Severity::Error);
    }

    #[test]
    fn test_unparsable_source_is_not_linted() {
        let err = linter().lint_source("t", "lower : struct {").unwrap_err();
        assert!(err.contains("Expected '}' after struct fields"));
    }

    #[test]
    fn test_render_issue() {
        let result = lint("\nbad : u8");
        let rendered = result.issues()[0].render("schema.carch");
        assert_eq!(
            rendered,
            "schema.carch:2:1: warning: Type name 'bad' should be PascalCase [NAMING_CONVENTION]"
        );
    }

    #[test]
    fn test_semantic_errors_do_not_block_lint() {
        // undefined type: invalid schema, but it parses
        let result = lint("Thing : struct { Field: Missing }");
        assert_eq!(result.warnings.len(), 1);
    }
}
