//! Type paths
//!
//! Identifies a position inside a definition for diagnostics, e.g.
//! `Entity.pos`, `Inventory.items[]`, `Index.entries<value>`.

use std::fmt;

/// A segment in a type path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Struct field or variant alternative
    Member(String),
    /// Array element type
    ArrayItems,
    MapKey,
    MapValue,
    /// Optional inner type
    Optional,
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Member(name) => write!(f, ".{}", name),
            Self::ArrayItems => write!(f, "[]"),
            Self::MapKey => write!(f, "<key>"),
            Self::MapValue => write!(f, "<value>"),
            Self::Optional => write!(f, "?"),
        }
    }
}

/// Path from a definition's root to the node being checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypePath {
    root: String,
    segments: Vec<PathSegment>,
}

impl TypePath {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            segments: Vec::new(),
        }
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    pub fn pop(&mut self) {
        self.segments.pop();
    }

    pub fn root(&self) -> &str {
        &self.root
    }
}

impl fmt::Display for TypePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root)?;
        for segment in &self.segments {
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display() {
        let mut path = TypePath::new("Index");
        assert_eq!(path.to_string(), "Index");
        path.push(PathSegment::Member("entries".into()));
        path.push(PathSegment::MapValue);
        path.push(PathSegment::Optional);
        assert_eq!(path.to_string(), "Index.entries<value>?");
        path.pop();
        path.pop();
        path.push(PathSegment::ArrayItems);
        assert_eq!(path.to_string(), "Index.entries[]");
    }
}
