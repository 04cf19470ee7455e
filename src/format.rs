//! Canonical formatting
//!
//! Renders a schema back to source text in one of two layouts:
//!
//! ```text
//! Position : struct { x: f32, y: f32 }        // compact
//!
//! Position : struct {                         // expanded
//!     x: f32,
//!     y: f32,
//! }
//! ```
//!
//! Layout is not significant to the parser, so reformatting never changes
//! the schema. Comments are not kept in the tree; sources containing them
//! are left alone.

use similar::TextDiff;

use crate::config::{FormatConfig, FormatStyle};
use crate::diagnostics::Diagnostics;
use crate::syntax::{Lexer, Schema, TokenKind, TypeDefinition, TypeExpr, TypeExprKind};

/// Why a source was not formatted
#[derive(Debug)]
pub enum Skipped {
    /// Comments would be lost
    HasComments,
    /// The source does not parse
    Invalid(Diagnostics),
}

/// Format `source`, or explain why it cannot be
pub fn format_source(source: &str, config: &FormatConfig) -> Result<String, Skipped> {
    if Lexer::new(source).any(|t| matches!(t.kind, TokenKind::Comment(_))) {
        return Err(Skipped::HasComments);
    }
    let parsed = crate::parse(source);
    if !parsed.is_clean() {
        return Err(Skipped::Invalid(parsed.diagnostics));
    }
    Ok(format_schema(&parsed.schema, config))
}

/// Render a whole schema. Single-line definitions are separated by a line
/// break, multi-line ones by a blank line.
pub fn format_schema(schema: &Schema, config: &FormatConfig) -> String {
    let rendered: Vec<String> = schema
        .definitions
        .iter()
        .map(|def| format_definition(def, config))
        .collect();

    let mut output = String::new();
    for (i, text) in rendered.iter().enumerate() {
        if i > 0 {
            let multi_line = text.contains('\n') || rendered[i - 1].contains('\n');
            output.push_str(if multi_line { "\n\n" } else { "\n" });
        }
        output.push_str(text);
    }
    if !output.is_empty() {
        output.push('\n');
    }
    output
}

/// Render one definition without a trailing newline
pub fn format_definition(def: &TypeDefinition, config: &FormatConfig) -> String {
    let compact = def.to_string();
    let expanded = match config.style {
        FormatStyle::Compact => false,
        FormatStyle::Expanded => true,
        FormatStyle::Auto => compact.chars().count() > config.max_width,
    };
    if !expanded {
        return compact;
    }
    let mut out = format!("{} : ", def.name);
    write_expanded(&def.ty, 0, config.indent, &mut out);
    out
}

fn write_expanded(expr: &TypeExpr, level: usize, indent: usize, out: &mut String) {
    let members: Vec<(String, Option<&TypeExpr>)> = match &expr.kind {
        TypeExprKind::Struct { fields } => fields.iter().map(|f| (f.name.clone(), Some(&f.ty))).collect(),
        TypeExprKind::Variant { alternatives } => {
            alternatives.iter().map(|a| (a.name.clone(), a.ty.as_ref())).collect()
        }
        TypeExprKind::Enum { values } => values.iter().map(|v| (v.name.clone(), None)).collect(),
        TypeExprKind::Container(container) => {
            out.push_str(container.keyword());
            out.push('<');
            for (i, param) in container.params().into_iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                match param {
                    Some(inner) => write_expanded(inner, level, indent, out),
                    None => out.push('?'),
                }
            }
            out.push('>');
            return;
        }
        TypeExprKind::Ref | TypeExprKind::Primitive(_) | TypeExprKind::Identifier(_) => {
            out.push_str(&expr.to_string());
            return;
        }
    };

    let keyword = match &expr.kind {
        TypeExprKind::Struct { .. } => "struct",
        TypeExprKind::Variant { .. } => "variant",
        _ => "enum",
    };
    if members.is_empty() {
        out.push_str(keyword);
        out.push_str(" {}");
        return;
    }

    out.push_str(keyword);
    out.push_str(" {\n");
    let pad = " ".repeat(indent * (level + 1));
    for (name, ty) in members {
        out.push_str(&pad);
        out.push_str(&name);
        if let Some(ty) = ty {
            out.push_str(": ");
            write_expanded(ty, level + 1, indent, out);
        }
        out.push_str(",\n");
    }
    out.push_str(&" ".repeat(indent * level));
    out.push('}');
}

/// Unified diff between the original and formatted text
pub fn diff(path: &str, original: &str, formatted: &str) -> String {
    TextDiff::from_lines(original, formatted)
        .unified_diff()
        .context_radius(3)
        .header(path, &format!("{} (formatted)", path))
        .to_string()
}
