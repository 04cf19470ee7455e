//! Structural and reference validation
//!
//! Walks one definition's type expression and checks, at every level:
//! - struct/variant/enum bodies are non-empty with unique member names
//! - containers carry their inner types, and optional does not wrap optional
//! - identifiers resolve to a definition that appears earlier in the schema

use std::collections::HashSet;

use super::path::{PathSegment, TypePath};
use super::symbols::SymbolTable;
use crate::diagnostics::Diagnostics;
use crate::syntax::{Container, Span, TypeDefinition, TypeExpr, TypeExprKind};

struct StructureCheck<'a, 's> {
    /// Index of the definition being checked
    index: usize,
    symbols: &'a SymbolTable<'s>,
    diagnostics: &'a mut Diagnostics,
}

/// Check one definition. `index` is its position in the schema.
pub fn check_definition(
    definition: &TypeDefinition,
    index: usize,
    symbols: &SymbolTable<'_>,
    diagnostics: &mut Diagnostics,
) {
    let mut path = TypePath::new(&definition.name);
    let mut check = StructureCheck {
        index,
        symbols,
        diagnostics,
    };
    check.walk(&definition.ty, &mut path);
}

impl StructureCheck<'_, '_> {
    fn walk(&mut self, expr: &TypeExpr, path: &mut TypePath) {
        match &expr.kind {
            TypeExprKind::Struct { fields } => {
                if fields.is_empty() {
                    self.error(expr.span, format!("Empty struct in '{}': at least one field is required", path));
                }
                let members = fields.iter().map(|f| (f.name.as_str(), f.span));
                self.check_unique(members, "field name", path);
                for field in fields {
                    path.push(PathSegment::Member(field.name.clone()));
                    self.walk(&field.ty, path);
                    path.pop();
                }
            }
            TypeExprKind::Variant { alternatives } => {
                if alternatives.is_empty() {
                    self.error(
                        expr.span,
                        format!("Empty variant in '{}': at least one alternative is required", path),
                    );
                }
                let members = alternatives.iter().map(|a| (a.name.as_str(), a.span));
                self.check_unique(members, "alternative name", path);
                for alt in alternatives {
                    if let Some(ty) = &alt.ty {
                        path.push(PathSegment::Member(alt.name.clone()));
                        self.walk(ty, path);
                        path.pop();
                    }
                }
            }
            TypeExprKind::Enum { values } => {
                if values.is_empty() {
                    self.error(expr.span, format!("Empty enum in '{}': at least one value is required", path));
                }
                let members = values.iter().map(|v| (v.name.as_str(), v.span));
                self.check_unique(members, "enum value", path);
            }
            TypeExprKind::Container(container) => self.walk_container(container, expr.span, path),
            TypeExprKind::Identifier(name) => self.resolve(name, expr.span, path),
            TypeExprKind::Ref | TypeExprKind::Primitive(_) => {}
        }
    }

    fn walk_container(&mut self, container: &Container, span: Span, path: &mut TypePath) {
        match container {
            Container::Array { element } => match element {
                Some(element) => self.walk_inner(element, PathSegment::ArrayItems, path),
                None => self.error(span, format!("Container type missing element type in '{}'", path)),
            },
            Container::Map { key, value } => {
                if key.is_none() || value.is_none() {
                    self.error(span, format!("Map type missing key or value type in '{}'", path));
                }
                if let Some(key) = key {
                    self.walk_inner(key, PathSegment::MapKey, path);
                }
                if let Some(value) = value {
                    self.walk_inner(value, PathSegment::MapValue, path);
                }
            }
            Container::Optional { inner } => match inner {
                Some(inner) => {
                    if matches!(inner.kind, TypeExprKind::Container(Container::Optional { .. })) {
                        self.error(
                            span,
                            format!("Nested optional types (optional<optional<T>>) are not allowed in '{}'", path),
                        );
                    }
                    self.walk_inner(inner, PathSegment::Optional, path);
                }
                None => self.error(span, format!("Container type missing element type in '{}'", path)),
            },
        }
    }

    fn walk_inner(&mut self, inner: &TypeExpr, segment: PathSegment, path: &mut TypePath) {
        path.push(segment);
        self.walk(inner, path);
        path.pop();
    }

    fn resolve(&mut self, name: &str, span: Span, path: &TypePath) {
        match self.symbols.index_of(name) {
            None => self.error(span, format!("Undefined type '{}' referenced in '{}'", name, path)),
            Some(target) if target >= self.index => self.error(
                span,
                format!(
                    "Illegal forward reference to type '{}' in '{}': types must be defined before use",
                    name, path
                ),
            ),
            Some(_) => {}
        }
    }

    /// Report every member whose name was already used in the same body
    fn check_unique<'n>(
        &mut self,
        members: impl Iterator<Item = (&'n str, Span)>,
        what: &str,
        path: &TypePath,
    ) {
        let mut seen = HashSet::new();
        for (name, span) in members {
            if !seen.insert(name) {
                self.error(span, format!("Duplicate {} '{}' in '{}'", what, name, path));
            }
        }
    }

    fn error(&mut self, span: Span, message: String) {
        self.diagnostics.error(span, message);
    }
}
