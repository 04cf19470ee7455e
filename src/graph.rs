//! Definition Dependency Graph
//!
//! One node per definition, one edge per identifier reference (from the
//! referencing definition to the referenced one). `ref<entity>` names no
//! target and produces no edge. Used by downstream consumers that need
//! definitions in dependency order, and for DOT export.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

use crate::semantic::{PathSegment, TypePath};
use crate::syntax::{Container, Schema, TypeExpr, TypeExprKind};

/// Node payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionNode {
    pub name: String,
    /// Top-level shape: struct, variant, enum, container, ref, primitive or alias
    pub kind: &'static str,
}

/// The definition dependency graph
pub struct DefinitionGraph {
    graph: DiGraph<DefinitionNode, String>,
    node_indices: HashMap<String, NodeIndex>,
}

impl DefinitionGraph {
    /// Build the graph. References to unknown names are skipped; repeated
    /// names map to their first definition.
    pub fn build(schema: &Schema) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();

        for def in &schema.definitions {
            if node_indices.contains_key(&def.name) {
                continue;
            }
            let idx = graph.add_node(DefinitionNode {
                name: def.name.clone(),
                kind: shape_of(&def.ty),
            });
            node_indices.insert(def.name.clone(), idx);
        }

        for def in &schema.definitions {
            let Some(&source) = node_indices.get(&def.name) else {
                continue;
            };
            let mut refs = Vec::new();
            collect_references(&def.ty, &mut TypePath::new(&def.name), &mut refs);
            for (label, target_name) in refs {
                if let Some(&target) = node_indices.get(target_name) {
                    graph.add_edge(source, target, label);
                }
            }
        }

        Self { graph, node_indices }
    }

    pub fn definition_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Definitions `name` refers to directly, in definition order
    pub fn dependencies_of(&self, name: &str) -> Vec<&str> {
        self.neighbors(name, Direction::Outgoing)
    }

    /// Definitions that refer to `name` directly, in definition order
    pub fn dependents_of(&self, name: &str) -> Vec<&str> {
        self.neighbors(name, Direction::Incoming)
    }

    fn neighbors(&self, name: &str, direction: Direction) -> Vec<&str> {
        let Some(&idx) = self.node_indices.get(name) else {
            return Vec::new();
        };
        let mut others: Vec<NodeIndex> = self.graph.neighbors_directed(idx, direction).collect();
        // node indices follow definition order
        others.sort();
        others.dedup();
        others.into_iter().map(|other| self.graph[other].name.as_str()).collect()
    }

    /// Definitions ordered so every dependency precedes its dependents.
    /// `None` if the graph has a cycle.
    pub fn emission_order(&self) -> Option<Vec<&str>> {
        let sorted = toposort(&self.graph, None).ok()?;
        Some(sorted.into_iter().rev().map(|idx| self.graph[idx].name.as_str()).collect())
    }

    /// Export to GraphViz DOT format
    pub fn to_dot(&self) -> String {
        let mut output = String::new();

        output.push_str("digraph Schema {\n");
        output.push_str("  rankdir=LR;\n");
        output.push_str("  node [shape=box, style=\"filled,rounded\", fontname=\"Helvetica\", fontsize=10];\n");
        output.push_str("  edge [fontname=\"Helvetica\", fontsize=8, fontcolor=\"#808080\"];\n");
        output.push('\n');

        let color_map = [
            ("struct", "#00BCD4"),
            ("variant", "#9C27B0"),
            ("enum", "#FF5722"),
            ("container", "#FF9800"),
            ("ref", "#4CAF50"),
            ("primitive", "#607D8B"),
        ];

        for node in self.graph.node_weights() {
            let color = color_map
                .iter()
                .find(|(kind, _)| *kind == node.kind)
                .map(|(_, color)| *color)
                .unwrap_or("#9E9E9E");
            output.push_str(&format!(
                "  \"{}\" [label=\"{}\\n({})\", fillcolor=\"{}\"];\n",
                node.name, node.name, node.kind, color
            ));
        }

        output.push('\n');

        for edge in self.graph.edge_references() {
            output.push_str(&format!(
                "  \"{}\" -> \"{}\" [label=\"{}\"];\n",
                self.graph[edge.source()].name,
                self.graph[edge.target()].name,
                edge.weight()
            ));
        }

        output.push_str("}\n");
        output
    }
}

fn shape_of(ty: &TypeExpr) -> &'static str {
    match &ty.kind {
        TypeExprKind::Struct { .. } => "struct",
        TypeExprKind::Variant { .. } => "variant",
        TypeExprKind::Enum { .. } => "enum",
        TypeExprKind::Container(_) => "container",
        TypeExprKind::Ref => "ref",
        TypeExprKind::Primitive(_) => "primitive",
        TypeExprKind::Identifier(_) => "alias",
    }
}

/// Collect `(location, target)` for every identifier under `expr`.
/// Locations are relative to the definition, e.g. `items[]`.
fn collect_references<'s>(expr: &'s TypeExpr, path: &mut TypePath, out: &mut Vec<(String, &'s str)>) {
    match &expr.kind {
        TypeExprKind::Identifier(name) => {
            let full = path.to_string();
            let label = full[path.root().len()..].trim_start_matches('.').to_string();
            out.push((label, name.as_str()));
        }
        TypeExprKind::Struct { fields } => {
            for field in fields {
                descend(PathSegment::Member(field.name.clone()), &field.ty, path, out);
            }
        }
        TypeExprKind::Variant { alternatives } => {
            for alt in alternatives {
                if let Some(ty) = &alt.ty {
                    descend(PathSegment::Member(alt.name.clone()), ty, path, out);
                }
            }
        }
        TypeExprKind::Container(container) => match container {
            Container::Array { element } => {
                if let Some(element) = element {
                    descend(PathSegment::ArrayItems, element, path, out);
                }
            }
            Container::Map { key, value } => {
                if let Some(key) = key {
                    descend(PathSegment::MapKey, key, path, out);
                }
                if let Some(value) = value {
                    descend(PathSegment::MapValue, value, path, out);
                }
            }
            Container::Optional { inner } => {
                if let Some(inner) = inner {
                    descend(PathSegment::Optional, inner, path, out);
                }
            }
        },
        TypeExprKind::Enum { .. } | TypeExprKind::Ref | TypeExprKind::Primitive(_) => {}
    }
}

fn descend<'s>(
    segment: PathSegment,
    inner: &'s TypeExpr,
    path: &mut TypePath,
    out: &mut Vec<(String, &'s str)>,
) {
    path.push(segment);
    collect_references(inner, path, out);
    path.pop();
}
