//! Cycle detection
//!
//! Depth-first search from every definition over struct, variant and
//! container edges, re-entering identifier targets through the symbol table.
//! `ref<entity>` ends a branch without traversal: it is the only way to
//! express a recursive relationship. The search runs on an explicit work
//! stack, so the depth of a reference chain does not grow the call stack.
//!
//! Search state is scoped to one root. A cycle is attributed to the root
//! whose search found it, so a two-definition cycle yields one diagnostic
//! per participant.

use std::collections::HashSet;

use tracing::trace;

use super::symbols::SymbolTable;
use crate::diagnostics::Diagnostics;
use crate::syntax::{Schema, TypeExpr, TypeExprKind};

/// Pending work for one search
enum Step<'s> {
    Visit(&'s TypeExpr),
    /// Leave a definition whose expansion found no cycle
    Exit(&'s str),
}

struct CycleSearch<'a, 's> {
    symbols: &'a SymbolTable<'s>,
    /// Definitions on the current path
    on_stack: HashSet<&'s str>,
    /// Fully explored definitions with no cycle through them
    done: HashSet<&'s str>,
    stack: Vec<Step<'s>>,
}

/// Report every definition from which a non-ref cycle is reachable
pub fn check<'s>(schema: &'s Schema, symbols: &SymbolTable<'s>, diagnostics: &mut Diagnostics) {
    for definition in &schema.definitions {
        let mut search = CycleSearch {
            symbols,
            on_stack: HashSet::from([definition.name.as_str()]),
            done: HashSet::new(),
            stack: vec![Step::Visit(&definition.ty)],
        };
        if search.run() {
            trace!(root = %definition.name, "cycle found");
            diagnostics.error(
                definition.span,
                format!("Circular type dependency detected for: '{}'", definition.name),
            );
        }
    }
}

impl<'s> CycleSearch<'_, 's> {
    /// Depth-first over the work stack. True as soon as a definition on the
    /// current path is reached again.
    fn run(&mut self) -> bool {
        while let Some(step) = self.stack.pop() {
            match step {
                Step::Visit(expr) => {
                    if self.visit(expr) {
                        return true;
                    }
                }
                Step::Exit(key) => {
                    self.on_stack.remove(key);
                    self.done.insert(key);
                }
            }
        }
        false
    }

    fn visit(&mut self, expr: &'s TypeExpr) -> bool {
        if expr.is_leaf() {
            return false;
        }
        let TypeExprKind::Identifier(name) = &expr.kind else {
            for child in expr.children().into_iter().rev() {
                self.stack.push(Step::Visit(child));
            }
            return false;
        };

        let Some(entry) = self.symbols.get(name) else {
            return false;
        };
        let definition = entry.definition;
        let key = definition.name.as_str();
        if self.on_stack.contains(key) {
            return true;
        }
        if !self.done.contains(key) {
            self.on_stack.insert(key);
            self.stack.push(Step::Exit(key));
            self.stack.push(Step::Visit(&definition.ty));
        }
        false
    }
}
