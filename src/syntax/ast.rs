//! Abstract syntax tree
//!
//! A `Schema` owns its definitions, and every node owns its children. The
//! only non-ownership relationship is `TypeExprKind::Identifier`, which holds
//! a name that is resolved through the symbol table, never a pointer.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::token::Span;

// =============================================================================
// Primitive Types
// =============================================================================

/// The 14 fixed scalar kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    Str,
    Int,
    Bool,
    Unit,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 14] = [
        PrimitiveType::Str,
        PrimitiveType::Int,
        PrimitiveType::Bool,
        PrimitiveType::Unit,
        PrimitiveType::U8,
        PrimitiveType::U16,
        PrimitiveType::U32,
        PrimitiveType::U64,
        PrimitiveType::I8,
        PrimitiveType::I16,
        PrimitiveType::I32,
        PrimitiveType::I64,
        PrimitiveType::F32,
        PrimitiveType::F64,
    ];

    /// Look up a primitive by its source spelling
    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }

    /// Source spelling of this primitive
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveType::Str => "str",
            PrimitiveType::Int => "int",
            PrimitiveType::Bool => "bool",
            PrimitiveType::Unit => "unit",
            PrimitiveType::U8 => "u8",
            PrimitiveType::U16 => "u16",
            PrimitiveType::U32 => "u32",
            PrimitiveType::U64 => "u64",
            PrimitiveType::I8 => "i8",
            PrimitiveType::I16 => "i16",
            PrimitiveType::I32 => "i32",
            PrimitiveType::I64 => "i64",
            PrimitiveType::F32 => "f32",
            PrimitiveType::F64 => "f64",
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Schema and Definitions
// =============================================================================

/// One compiled unit: named type definitions in textual order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub definitions: Vec<TypeDefinition>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TypeDefinition> {
        self.definitions.iter()
    }
}

/// `Name : type_expr`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub name: String,
    /// Position of the name token
    pub span: Span,
    pub ty: TypeExpr,
}

// =============================================================================
// Type Expressions
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    /// Position of the first token of the expression
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum TypeExprKind {
    /// Product type
    Struct { fields: Vec<Field> },
    /// Sum type
    Variant { alternatives: Vec<Alternative> },
    /// Sum type without data
    Enum { values: Vec<EnumValue> },
    Container(Container),
    /// `ref<entity>`: opaque relationship marker
    Ref,
    Primitive(PrimitiveType),
    /// Name of another definition
    Identifier(String),
}

/// Container types. An inner type is `None` only when parsing failed
/// before it could be read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "container", rename_all = "snake_case")]
pub enum Container {
    Array {
        element: Option<Box<TypeExpr>>,
    },
    Map {
        key: Option<Box<TypeExpr>>,
        value: Option<Box<TypeExpr>>,
    },
    Optional {
        inner: Option<Box<TypeExpr>>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub span: Span,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub name: String,
    pub span: Span,
    /// `None` for a data-less alternative
    pub ty: Option<TypeExpr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValue {
    pub name: String,
    pub span: Span,
}

impl TypeExpr {
    pub fn new(kind: TypeExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Primitive, enum and ref do not recurse into further user structure
    pub fn is_leaf(&self) -> bool {
        matches!(
            self.kind,
            TypeExprKind::Primitive(_) | TypeExprKind::Enum { .. } | TypeExprKind::Ref
        )
    }

    /// Inline struct, variant or enum body
    pub fn is_braced(&self) -> bool {
        matches!(
            self.kind,
            TypeExprKind::Struct { .. } | TypeExprKind::Variant { .. } | TypeExprKind::Enum { .. }
        )
    }

    /// Direct child expressions in source order, skipping missing container
    /// parameters and data-less alternatives.
    pub fn children(&self) -> Vec<&TypeExpr> {
        match &self.kind {
            TypeExprKind::Struct { fields } => fields.iter().map(|f| &f.ty).collect(),
            TypeExprKind::Variant { alternatives } => {
                alternatives.iter().filter_map(|a| a.ty.as_ref()).collect()
            }
            TypeExprKind::Container(container) => container.params().into_iter().flatten().collect(),
            TypeExprKind::Enum { .. }
            | TypeExprKind::Ref
            | TypeExprKind::Primitive(_)
            | TypeExprKind::Identifier(_) => Vec::new(),
        }
    }
}

impl Container {
    pub fn keyword(&self) -> &'static str {
        match self {
            Container::Array { .. } => "array",
            Container::Map { .. } => "map",
            Container::Optional { .. } => "optional",
        }
    }

    /// Type parameters in source order (one, or two for maps)
    pub fn params(&self) -> Vec<Option<&TypeExpr>> {
        match self {
            Container::Array { element } => vec![element.as_deref()],
            Container::Map { key, value } => vec![key.as_deref(), value.as_deref()],
            Container::Optional { inner } => vec![inner.as_deref()],
        }
    }
}

// =============================================================================
// Display (compact source rendering)
// =============================================================================

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for def in &self.definitions {
            writeln!(f, "{}", def)?;
        }
        Ok(())
    }
}

impl fmt::Display for TypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.name, self.ty)
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeExprKind::Struct { fields } => {
                let body: Vec<String> = fields.iter().map(|fd| format!("{}: {}", fd.name, fd.ty)).collect();
                write_body(f, "struct", &body)
            }
            TypeExprKind::Variant { alternatives } => {
                let body: Vec<String> = alternatives
                    .iter()
                    .map(|alt| match &alt.ty {
                        Some(ty) => format!("{}: {}", alt.name, ty),
                        None => alt.name.clone(),
                    })
                    .collect();
                write_body(f, "variant", &body)
            }
            TypeExprKind::Enum { values } => {
                let body: Vec<&str> = values.iter().map(|v| v.name.as_str()).collect();
                write_body(f, "enum", &body)
            }
            TypeExprKind::Container(container) => write!(f, "{}", container),
            TypeExprKind::Ref => f.write_str("ref<entity>"),
            TypeExprKind::Primitive(p) => f.write_str(p.as_str()),
            TypeExprKind::Identifier(name) => f.write_str(name),
        }
    }
}

fn write_body<S: AsRef<str>>(f: &mut fmt::Formatter<'_>, keyword: &str, members: &[S]) -> fmt::Result {
    if members.is_empty() {
        return write!(f, "{} {{}}", keyword);
    }
    let members: Vec<&str> = members.iter().map(|m| m.as_ref()).collect();
    write!(f, "{} {{ {} }}", keyword, members.join(", "))
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self
            .params()
            .into_iter()
            .map(|p| p.map_or_else(|| "?".to_string(), |ty| ty.to_string()))
            .collect();
        write!(f, "{}<{}>", self.keyword(), params.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(kind: TypeExprKind) -> TypeExpr {
        TypeExpr::new(kind, Span::default())
    }

    fn field(name: &str, ty: TypeExpr) -> Field {
        Field { name: name.to_string(), span: Span::default(), ty }
    }

    #[test]
    fn test_primitive_names_round_trip() {
        for p in PrimitiveType::ALL {
            assert_eq!(PrimitiveType::from_type_name(p.as_str()), Some(p));
        }
        assert_eq!(PrimitiveType::from_type_name("string"), None);
        assert_eq!(PrimitiveType::ALL.len(), 14);
    }

    #[test]
    fn test_compact_display() {
        let ty = expr(TypeExprKind::Struct {
            fields: vec![
                field("id", expr(TypeExprKind::Primitive(PrimitiveType::U64))),
                field(
                    "tags",
                    expr(TypeExprKind::Container(Container::Map {
                        key: Some(Box::new(expr(TypeExprKind::Primitive(PrimitiveType::Str)))),
                        value: Some(Box::new(expr(TypeExprKind::Identifier("Tag".into())))),
                    })),
                ),
                field("owner", expr(TypeExprKind::Ref)),
            ],
        });
        let def = TypeDefinition { name: "Item".into(), span: Span::default(), ty };
        assert_eq!(
            def.to_string(),
            "Item : struct { id: u64, tags: map<str, Tag>, owner: ref<entity> }"
        );
    }

    #[test]
    fn test_variant_display_with_dataless_alternative() {
        let ty = expr(TypeExprKind::Variant {
            alternatives: vec![
                Alternative { name: "None".into(), span: Span::default(), ty: None },
                Alternative {
                    name: "Some".into(),
                    span: Span::default(),
                    ty: Some(expr(TypeExprKind::Primitive(PrimitiveType::I32))),
                },
            ],
        });
        assert_eq!(ty.to_string(), "variant { None, Some: i32 }");
    }

    #[test]
    fn test_incomplete_container_display() {
        let ty = expr(TypeExprKind::Container(Container::Array { element: None }));
        assert_eq!(ty.to_string(), "array<?>");
        assert!(ty.children().is_empty());
    }

    #[test]
    fn test_leaf_classification() {
        assert!(expr(TypeExprKind::Ref).is_leaf());
        assert!(expr(TypeExprKind::Enum { values: vec![] }).is_leaf());
        assert!(!expr(TypeExprKind::Identifier("A".into())).is_leaf());
        assert!(!expr(TypeExprKind::Container(Container::Optional { inner: None })).is_leaf());
    }
}
