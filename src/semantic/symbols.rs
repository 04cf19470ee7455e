//! Symbol table
//!
//! Maps each definition name to its zero-based position in the schema. The
//! first occurrence of a name owns the slot; later ones are reported as
//! duplicates.

use std::collections::HashMap;

use crate::diagnostics::Diagnostics;
use crate::syntax::{Schema, TypeDefinition};

#[derive(Debug, Clone, Copy)]
pub struct SymbolEntry<'s> {
    /// Textual position of the definition in the schema
    pub index: usize,
    pub definition: &'s TypeDefinition,
}

#[derive(Debug, Default)]
pub struct SymbolTable<'s> {
    entries: HashMap<&'s str, SymbolEntry<'s>>,
}

impl<'s> SymbolTable<'s> {
    /// Build the table, reporting every repeated name
    pub fn build(schema: &'s Schema, diagnostics: &mut Diagnostics) -> Self {
        let mut entries: HashMap<&'s str, SymbolEntry<'s>> = HashMap::new();
        for (index, definition) in schema.definitions.iter().enumerate() {
            if let Some(first) = entries.get(definition.name.as_str()) {
                diagnostics.error(
                    definition.span,
                    format!(
                        "Duplicate type definition: '{}' (first defined at line {}, column {})",
                        definition.name, first.definition.span.line, first.definition.span.column
                    ),
                );
                continue;
            }
            entries.insert(definition.name.as_str(), SymbolEntry { index, definition });
        }
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&SymbolEntry<'s>> {
        self.entries.get(name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.get(name).map(|e| e.index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
