//! Leaf termination
//!
//! Every path through struct fields, variant alternatives and container
//! parameters must end at a primitive, enum or ref. Identifiers are followed
//! into their targets wherever those appear in the schema. Each definition is
//! expanded at most once per root, so recursive definitions are left to cycle
//! detection instead of looping here. The walk keeps its own work stack, so
//! long reference chains do not grow the call stack.

use std::collections::HashSet;

use super::path::{PathSegment, TypePath};
use super::symbols::SymbolTable;
use crate::diagnostics::Diagnostics;
use crate::syntax::{Container, Span, TypeDefinition, TypeExpr, TypeExprKind};

/// Pending work. `Push`/`Pop` keep the message path in step with the walk.
enum Step<'s> {
    Visit(&'s TypeExpr),
    Push(PathSegment),
    Pop,
    /// A container parameter is missing at the current path
    Unterminated(Span),
}

struct LeafWalk<'a, 's> {
    symbols: &'a SymbolTable<'s>,
    expanded: HashSet<&'s str>,
    stack: Vec<Step<'s>>,
    diagnostics: &'a mut Diagnostics,
}

/// Check that every path from `definition` reaches a leaf type
pub fn check_definition<'s>(
    definition: &'s TypeDefinition,
    symbols: &SymbolTable<'s>,
    diagnostics: &mut Diagnostics,
) {
    let mut walk = LeafWalk {
        symbols,
        expanded: HashSet::from([definition.name.as_str()]),
        stack: vec![Step::Visit(&definition.ty)],
        diagnostics,
    };
    let mut path = TypePath::new(&definition.name);
    walk.run(&mut path);
}

impl<'s> LeafWalk<'_, 's> {
    fn run(&mut self, path: &mut TypePath) {
        while let Some(step) = self.stack.pop() {
            match step {
                Step::Visit(expr) => self.visit(expr),
                Step::Push(segment) => path.push(segment),
                Step::Pop => path.pop(),
                Step::Unterminated(span) => self.unterminated(span, path),
            }
        }
    }

    fn visit(&mut self, expr: &'s TypeExpr) {
        if expr.is_leaf() {
            return;
        }
        match &expr.kind {
            TypeExprKind::Struct { fields } => {
                let members = fields.iter().map(|f| (PathSegment::Member(f.name.clone()), &f.ty));
                self.schedule(members.collect());
            }
            TypeExprKind::Variant { alternatives } => {
                // a data-less alternative is complete on its own
                let members = alternatives
                    .iter()
                    .filter_map(|alt| alt.ty.as_ref().map(|ty| (PathSegment::Member(alt.name.clone()), ty)));
                self.schedule(members.collect());
            }
            TypeExprKind::Container(container) => {
                let segments = match container {
                    Container::Array { .. } => vec![PathSegment::ArrayItems],
                    Container::Map { .. } => vec![PathSegment::MapKey, PathSegment::MapValue],
                    Container::Optional { .. } => vec![PathSegment::Optional],
                };
                let mut steps = Vec::new();
                for (param, segment) in container.params().into_iter().zip(segments) {
                    match param {
                        Some(inner) => steps.extend([Step::Push(segment), Step::Visit(inner), Step::Pop]),
                        None => steps.push(Step::Unterminated(expr.span)),
                    }
                }
                self.stack.extend(steps.into_iter().rev());
            }
            TypeExprKind::Identifier(name) => {
                // unresolved names are reported by the structural check
                let Some(entry) = self.symbols.get(name) else {
                    return;
                };
                let definition = entry.definition;
                if self.expanded.insert(definition.name.as_str()) {
                    self.stack.push(Step::Visit(&definition.ty));
                }
            }
            // leaves returned above
            _ => {}
        }
    }

    /// Queue children so they are visited in source order
    fn schedule(&mut self, children: Vec<(PathSegment, &'s TypeExpr)>) {
        for (segment, child) in children.into_iter().rev() {
            self.stack.push(Step::Pop);
            self.stack.push(Step::Visit(child));
            self.stack.push(Step::Push(segment));
        }
    }

    fn unterminated(&mut self, span: Span, path: &TypePath) {
        self.diagnostics.error(
            span,
            format!(
                "Type path in '{}' does not terminate at a primitive, enum or ref type",
                path
            ),
        );
    }
}
