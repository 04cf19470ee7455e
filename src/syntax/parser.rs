//! Recursive-descent parser
//!
//! Builds a `Schema` from the token stream and keeps going after errors.
//! Every problem becomes a diagnostic; the returned schema holds whatever
//! could be recovered and must not be analyzed when diagnostics exist.
//!
//! Recovery works at two levels:
//! - inside a braced body, skip to the next `,` or `}` at the same nesting
//!   depth (only reporting if the member itself did not already report);
//! - at the top level, skip at least one token and stop at a layout boundary
//!   or at an identifier that can start a new definition.

use tracing::trace;

use super::ast::{
    Alternative, Container, EnumValue, Field, PrimitiveType, Schema, TypeDefinition, TypeExpr,
    TypeExprKind,
};
use super::lexer::Lexer;
use super::token::{Keyword, Span, Symbol, Token, TokenKind};
use crate::diagnostics::Diagnostics;

/// Deepest inline nesting of type expressions accepted in one definition
pub const MAX_TYPE_NESTING: usize = 128;

/// Result of parsing one text
#[derive(Debug, Clone, Default)]
pub struct ParseOutput {
    /// Possibly partial when `diagnostics` is non-empty
    pub schema: Schema,
    pub diagnostics: Diagnostics,
}

impl ParseOutput {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    /// A newline was crossed between the previous token and `current`
    newline_before: bool,
    /// Type expressions currently being parsed
    nesting: usize,
    diagnostics: Diagnostics,
}

/// Braced body flavours; used for messages
#[derive(Clone, Copy)]
enum Body {
    Struct,
    Variant,
    Enum,
}

impl Body {
    fn keyword(self) -> &'static str {
        match self {
            Body::Struct => "struct",
            Body::Variant => "variant",
            Body::Enum => "enum",
        }
    }

    fn members(self) -> &'static str {
        match self {
            Body::Struct => "struct fields",
            Body::Variant => "variant alternatives",
            Body::Enum => "enum values",
        }
    }
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str) -> Self {
        let mut parser = Self {
            lexer: Lexer::new(src),
            current: Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                span: Span::default(),
            },
            newline_before: false,
            nesting: 0,
            diagnostics: Diagnostics::new(),
        };
        parser.bump();
        parser
    }

    /// Parse the whole input
    pub fn parse(mut self) -> ParseOutput {
        let mut schema = Schema::new();
        while !self.current.is_eof() {
            let start = self.current.span.start;
            let reported = self.diagnostics.len();
            match self.parse_definition() {
                Some(def) => {
                    schema.definitions.push(def);
                    // a definition that broke off mid-line leaves its tail
                    // behind; it was already reported
                    let broken = self.diagnostics.len() > reported;
                    if broken && !self.newline_before && !self.current.is_eof() {
                        self.synchronize();
                    }
                }
                None => {
                    let moved = self.current.span.start != start;
                    let at_name = matches!(self.current.kind, TokenKind::Ident(_));
                    if !(moved && at_name) {
                        self.synchronize();
                    }
                }
            }
        }
        ParseOutput {
            schema,
            diagnostics: self.diagnostics,
        }
    }

    // =========================================================================
    // Token handling
    // =========================================================================

    /// Move to the next significant token, returning the previous one.
    /// Layout is skipped and error tokens are turned into diagnostics.
    fn bump(&mut self) -> Token {
        let mut newline = false;
        loop {
            let tok = self.lexer.next_token();
            match &tok.kind {
                TokenKind::Newline => newline = true,
                TokenKind::Whitespace => {}
                TokenKind::Comment(text) => newline |= text.contains('\n'),
                TokenKind::Error(message) => {
                    self.diagnostics.error(tok.span, message.clone());
                }
                _ => {
                    self.newline_before = newline;
                    return std::mem::replace(&mut self.current, tok);
                }
            }
        }
    }

    fn at_symbol(&self, sym: Symbol) -> bool {
        self.current.kind == TokenKind::Symbol(sym)
    }

    fn error_here(&mut self, message: impl Into<String>) {
        self.diagnostics.error(self.current.span, message);
    }

    /// Consume `sym` if present; otherwise report and leave the token alone
    fn expect_symbol(&mut self, sym: Symbol, message: &str) -> bool {
        if self.at_symbol(sym) {
            self.bump();
            true
        } else {
            self.error_here(message);
            false
        }
    }

    fn expect_ident(&mut self, message: &str) -> Option<(String, Span)> {
        match &self.current.kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                let span = self.bump().span;
                Some((name, span))
            }
            _ => {
                self.error_here(message);
                None
            }
        }
    }

    /// Skip at least one token, then stop at end of input, at the first token
    /// on a new line, or at an identifier.
    fn synchronize(&mut self) {
        let skipped = self.bump();
        trace!(line = skipped.span.line, column = skipped.span.column, "resynchronizing");
        while !self.current.is_eof() {
            if self.newline_before || matches!(self.current.kind, TokenKind::Ident(_)) {
                return;
            }
            self.bump();
        }
    }

    /// Skip to the next `,` or `}` at nesting depth zero. Stray closers are
    /// skipped. Always consumes at least the current token.
    fn recover_in_body(&mut self) {
        let mut depth = 0usize;
        loop {
            match &self.current.kind {
                TokenKind::Eof => return,
                TokenKind::Symbol(Symbol::LBrace | Symbol::LAngle | Symbol::LParen) => depth += 1,
                TokenKind::Symbol(sym @ (Symbol::RBrace | Symbol::RAngle | Symbol::RParen)) => {
                    if depth > 0 {
                        depth -= 1;
                    } else if *sym == Symbol::RBrace {
                        return;
                    }
                }
                TokenKind::Symbol(Symbol::Comma) if depth == 0 => return,
                _ => {}
            }
            self.bump();
        }
    }

    // =========================================================================
    // Grammar
    // =========================================================================

    fn parse_definition(&mut self) -> Option<TypeDefinition> {
        let (name, span) = self.expect_ident("Expected type name")?;
        // reported but not fatal: `Name struct { .. }` still yields a definition.
        // A name alone on its line is abandoned so the next line parses cleanly.
        if self.at_symbol(Symbol::Colon) {
            self.bump();
        } else {
            self.error_here("Expected ':' after type name");
            if self.newline_before {
                return None;
            }
        }
        let ty = self.parse_type_expr()?;
        Some(TypeDefinition { name, span, ty })
    }

    fn parse_type_expr(&mut self) -> Option<TypeExpr> {
        if self.nesting >= MAX_TYPE_NESTING {
            self.error_here(format!("Type nesting exceeds maximum depth of {}", MAX_TYPE_NESTING));
            return None;
        }
        self.nesting += 1;
        let expr = self.parse_type_expr_inner();
        self.nesting -= 1;
        expr
    }

    fn parse_type_expr_inner(&mut self) -> Option<TypeExpr> {
        let span = self.current.span;
        let kind = match &self.current.kind {
            TokenKind::Keyword(Keyword::Struct) => TypeExprKind::Struct {
                fields: self.parse_body(Body::Struct, Self::parse_field),
            },
            TokenKind::Keyword(Keyword::Variant) => TypeExprKind::Variant {
                alternatives: self.parse_body(Body::Variant, Self::parse_alternative),
            },
            TokenKind::Keyword(Keyword::Enum) => TypeExprKind::Enum {
                values: self.parse_body(Body::Enum, Self::parse_enum_value),
            },
            TokenKind::Keyword(kw @ (Keyword::Array | Keyword::Map | Keyword::Optional)) => {
                let kw = *kw;
                TypeExprKind::Container(self.parse_container(kw))
            }
            TokenKind::Keyword(Keyword::Ref) => {
                self.parse_ref();
                TypeExprKind::Ref
            }
            TokenKind::Keyword(Keyword::Unit) => {
                self.bump();
                TypeExprKind::Primitive(PrimitiveType::Unit)
            }
            TokenKind::Primitive(p) => {
                let p = *p;
                self.bump();
                TypeExprKind::Primitive(p)
            }
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.bump();
                TypeExprKind::Identifier(name)
            }
            _ => {
                self.error_here("Expected type expression");
                return None;
            }
        };
        Some(TypeExpr::new(kind, span))
    }

    /// `kw '{' [member (',' member)* [',']] '}'`
    fn parse_body<T>(&mut self, body: Body, mut member: impl FnMut(&mut Self) -> Option<T>) -> Vec<T> {
        self.bump(); // keyword
        let mut items = Vec::new();
        if !self.expect_symbol(Symbol::LBrace, &format!("Expected '{{' after '{}'", body.keyword())) {
            return items;
        }
        loop {
            if self.at_symbol(Symbol::RBrace) {
                self.bump();
                break;
            }
            if self.current.is_eof() {
                self.error_here(format!("Expected '}}' after {}", body.members()));
                break;
            }

            let reported = self.diagnostics.len();
            if let Some(item) = member(self) {
                items.push(item);
            }
            if self.at_symbol(Symbol::Comma) {
                self.bump();
                continue;
            }
            if self.at_symbol(Symbol::RBrace) || self.current.is_eof() {
                continue;
            }

            let clean = self.diagnostics.len() == reported;
            if clean && matches!(self.current.kind, TokenKind::Ident(_)) {
                // missing separator; the identifier starts the next member
                self.error_here(format!("Expected ',' between {}", body.members()));
                continue;
            }
            if clean {
                let found = self.current.kind.to_string();
                self.error_here(format!(
                    "Unexpected {} in {} body; expected ',' or '}}'",
                    found,
                    body.keyword()
                ));
            }
            self.recover_in_body();
            if self.at_symbol(Symbol::Comma) {
                self.bump();
            }
        }
        items
    }

    fn parse_field(&mut self) -> Option<Field> {
        let (name, span) = self.expect_ident("Expected field name")?;
        if !self.expect_symbol(Symbol::Colon, "Expected ':' after field name") {
            return None;
        }
        let ty = self.parse_type_expr()?;
        Some(Field { name, span, ty })
    }

    fn parse_alternative(&mut self) -> Option<Alternative> {
        let (name, span) = self.expect_ident("Expected alternative name")?;
        let ty = if self.at_symbol(Symbol::Colon) {
            self.bump();
            Some(self.parse_type_expr()?)
        } else {
            None
        };
        Some(Alternative { name, span, ty })
    }

    fn parse_enum_value(&mut self) -> Option<EnumValue> {
        let (name, span) = self.expect_ident("Expected enum value")?;
        Some(EnumValue { name, span })
    }

    /// `array<T>`, `map<K, V>`, `optional<T>`. Stops at the first error and
    /// returns what was read so far.
    fn parse_container(&mut self, kw: Keyword) -> Container {
        self.bump(); // keyword
        let arity = if kw == Keyword::Map { 2 } else { 1 };
        let mut params = Vec::with_capacity(arity);
        if self.expect_symbol(Symbol::LAngle, "Expected '<' after container type") {
            self.parse_container_params(arity, &mut params);
        }
        let mut params = params.into_iter();
        match kw {
            Keyword::Array => Container::Array {
                element: params.next(),
            },
            Keyword::Map => Container::Map {
                key: params.next(),
                value: params.next(),
            },
            _ => Container::Optional {
                inner: params.next(),
            },
        }
    }

    fn parse_container_params(&mut self, arity: usize, params: &mut Vec<Box<TypeExpr>>) {
        for i in 0..arity {
            if i > 0
                && !self.expect_symbol(Symbol::Comma, "Expected ',' between map key and value types")
            {
                return;
            }
            match self.parse_type_expr() {
                Some(ty) => params.push(Box::new(ty)),
                None => return,
            }
        }
        self.expect_symbol(Symbol::RAngle, "Expected '>' after container type parameter");
    }

    /// `ref<entity>`
    fn parse_ref(&mut self) {
        self.bump(); // keyword
        if !self.expect_symbol(Symbol::LAngle, "Expected '<' after 'ref'") {
            return;
        }
        if self.current.kind != TokenKind::Keyword(Keyword::Entity) {
            self.error_here("Expected 'entity' in ref type");
            return;
        }
        self.bump();
        self.expect_symbol(Symbol::RAngle, "Expected '>' after 'ref<entity'");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> ParseOutput {
        Parser::new(src).parse()
    }

    fn first_type(src: &str) -> TypeExprKind {
        let out = parse(src);
        assert!(out.is_clean(), "unexpected diagnostics: {}", out.diagnostics);
        out.schema.definitions[0].ty.kind.clone()
    }

    #[test]
    fn test_parse_struct() {
        let out = parse("Position : struct { x: f32, y: f32, z: f32 }");
        assert!(out.is_clean());
        assert_eq!(out.schema.len(), 1);
        let def = &out.schema.definitions[0];
        assert_eq!(def.name, "Position");
        assert_eq!((def.span.line, def.span.column), (1, 1));
        match &def.ty.kind {
            TypeExprKind::Struct { fields } => {
                let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
                assert_eq!(names, vec!["x", "y", "z"]);
                assert_eq!(fields[1].ty.kind, TypeExprKind::Primitive(PrimitiveType::F32));
            }
            other => panic!("expected struct, got {:?}", other),
        }
    }

    #[test]
    fn test_layout_is_insignificant() {
        let compact = parse("Pair : struct { a: u8, b: map<str, i64>, }");
        let expanded = parse(
            "// pair of values\nPair :\n  struct {\n    a: u8, /* first */\n    b: map<\n      str,\n      i64\n    >,\n  }\n",
        );
        assert!(compact.is_clean() && expanded.is_clean());
        assert_eq!(compact.schema.to_string(), expanded.schema.to_string());
    }

    #[test]
    fn test_parse_variant_with_dataless_alternatives() {
        match first_type("Shape : variant { Empty, Circle: f64, Rect: struct { w: f64, h: f64 }, }") {
            TypeExprKind::Variant { alternatives } => {
                assert_eq!(alternatives.len(), 3);
                assert!(alternatives[0].ty.is_none());
                assert!(matches!(
                    alternatives[2].ty.as_ref().map(|t| &t.kind),
                    Some(TypeExprKind::Struct { .. })
                ));
            }
            other => panic!("expected variant, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_enum_and_empty_bodies() {
        match first_type("Color : enum { Red, Green, Blue }") {
            TypeExprKind::Enum { values } => assert_eq!(values.len(), 3),
            other => panic!("expected enum, got {:?}", other),
        }
        // emptiness is a semantic error, not a syntax error
        assert_eq!(first_type("E : struct {}"), TypeExprKind::Struct { fields: vec![] });
    }

    #[test]
    fn test_parse_containers_and_ref() {
        let out = parse("T : struct { a: array<u8>, m: map<str, optional<Item>>, r: ref<entity>, u: unit }");
        assert!(out.is_clean());
        assert_eq!(
            out.schema.definitions[0].to_string(),
            "T : struct { a: array<u8>, m: map<str, optional<Item>>, r: ref<entity>, u: unit }"
        );
    }

    #[test]
    fn test_missing_type_expression() {
        let out = parse("A : struct { x: , y: u8 }");
        assert_eq!(out.diagnostics.len(), 1);
        assert!(out.diagnostics.contains("Line 1, Column 17: Expected type expression"));
        // the remaining field survives
        match &out.schema.definitions[0].ty.kind {
            TypeExprKind::Struct { fields } => assert_eq!(fields[0].name, "y"),
            other => panic!("expected struct, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_colon_is_reported_and_parsing_continues() {
        let out = parse("A struct { x: u8 }\nB : u16");
        assert_eq!(out.diagnostics.len(), 1);
        assert!(out.diagnostics.contains("Expected ':' after type name"));
        assert_eq!(out.schema.len(), 2);
    }

    #[test]
    fn test_unclosed_struct_reaches_eof() {
        let out = parse("A : struct { x: u8");
        assert!(out.diagnostics.contains("Expected '}' after struct fields"));
        assert_eq!(out.schema.len(), 1);
    }

    #[test]
    fn test_missing_comma_between_fields() {
        let out = parse("A : struct {\n  x: u8\n  y: u8\n}");
        assert_eq!(out.diagnostics.messages(), vec!["Line 3, Column 3: Expected ',' between struct fields"]);
        match &out.schema.definitions[0].ty.kind {
            TypeExprKind::Struct { fields } => assert_eq!(fields.len(), 2),
            other => panic!("expected struct, got {:?}", other),
        }
    }

    #[test]
    fn test_container_errors() {
        let out = parse("A : struct { m: map<str u8>, n: array u8, o: optional<u8 }");
        let messages = out.diagnostics.messages();
        assert_eq!(messages.len(), 3, "{:?}", messages);
        assert!(messages[0].contains("Expected ',' between map key and value types"));
        assert!(messages[1].contains("Expected '<' after container type"));
        assert!(messages[2].contains("Expected '>' after container type parameter"));
    }

    #[test]
    fn test_bad_ref() {
        let out = parse("A : struct { r: ref<item> }");
        assert_eq!(out.diagnostics.len(), 1);
        assert!(out.diagnostics.contains("Expected 'entity' in ref type"));
    }

    #[test]
    fn test_lexical_errors_become_diagnostics() {
        let out = parse("A : struct { x: u8 } @\nB : struct { s: str }");
        assert_eq!(out.diagnostics.len(), 1);
        assert!(out.diagnostics.contains("Line 1, Column 22: Unexpected character: '@'"));
        assert_eq!(out.schema.len(), 2);
    }

    #[test]
    fn test_recovery_reports_independent_errors() {
        let src = "A : struct { x: }\n} ,\nB : variant { 1 }\nC : enum { Ok }";
        let out = parse(src);
        let messages = out.diagnostics.messages();
        assert_eq!(messages.len(), 3, "{:?}", messages);
        assert!(messages[0].starts_with("Line 1, Column 17: Expected type expression"));
        assert!(messages[1].starts_with("Line 2, Column 1: Expected type name"));
        assert!(messages[2].starts_with("Line 3, Column 15: Expected alternative name"));
        let names: Vec<&str> = out.schema.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_dangling_name_does_not_swallow_next_line() {
        let out = parse("Orphan\nB : struct { x: u8 }");
        assert_eq!(out.diagnostics.messages(), vec!["Line 2, Column 1: Expected ':' after type name"]);
        let names: Vec<&str> = out.schema.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["B"]);
    }

    #[test]
    fn test_unexpected_token_in_body() {
        let out = parse("A : enum { X Y: u8 }");
        // `Y` is taken as the next value after a missing comma, `:` is unexpected
        let messages = out.diagnostics.messages();
        assert_eq!(messages.len(), 2, "{:?}", messages);
        assert!(messages[1].contains("Unexpected ':' in enum body"));
    }

    #[test]
    fn test_unfinished_container_reported_once() {
        let out = parse("A : map<str>\nB : u8");
        assert_eq!(
            out.diagnostics.messages(),
            vec!["Line 1, Column 12: Expected ',' between map key and value types"]
        );
        let names: Vec<&str> = out.schema.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);

        let out = parse("A : ref<entity x");
        assert_eq!(out.diagnostics.len(), 1, "{}", out.diagnostics);
    }

    #[test]
    fn test_nesting_limit() {
        let depth = MAX_TYPE_NESTING + 50;
        let containers = format!("A : {}u8{}\nB : u8", "array<".repeat(depth), ">".repeat(depth));
        let out = parse(&containers);
        assert_eq!(out.diagnostics.len(), 1, "{}", out.diagnostics);
        assert!(out.diagnostics.contains("Type nesting exceeds maximum depth of 128"));
        assert_eq!(out.schema.len(), 2);

        let structs = format!("A : {}u8{}\nB : u8", "struct { f: ".repeat(depth), " }".repeat(depth));
        let out = parse(&structs);
        assert_eq!(out.diagnostics.len(), 1, "{}", out.diagnostics);
        assert!(out.diagnostics.contains("Type nesting exceeds maximum depth"));
        assert_eq!(out.schema.len(), 2);

        let within = format!("A : {}u8{}", "optional<array<".repeat(60), ">>".repeat(60));
        assert!(parse(&within).is_clean());
    }

    #[test]
    fn test_pathological_input_terminates() {
        let out = parse("} } > , : < { ( ) \"open");
        assert!(!out.diagnostics.is_empty());
        assert!(out.schema.is_empty());
    }
}
