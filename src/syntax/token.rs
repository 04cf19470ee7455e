//! Lexical tokens

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ast::PrimitiveType;

/// Source position of a token or AST node.
///
/// `start`/`end` are byte offsets; `line`/`column` are 1-based and count
/// characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Keyword(Keyword),
    /// Primitive type name (`str`, `u32`, ...). `unit` is a keyword instead.
    Primitive(PrimitiveType),
    Ident(String),
    StringLit(String),
    NumberLit(String),
    BoolLit(bool),
    Symbol(Symbol),
    Comment(String),
    Whitespace,
    Newline,
    Eof,
    /// Lexical error; the payload is the diagnostic message
    Error(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Keyword {
    Struct,
    Variant,
    Enum,
    Unit,
    Array,
    Map,
    Optional,
    Ref,
    Entity,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Symbol {
    Colon,
    Comma,
    LBrace,
    RBrace,
    LAngle,
    RAngle,
    LParen,
    RParen,
}

#[derive(Clone, Debug)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token as written (escapes not processed)
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    /// Layout tokens carry no grammatical meaning and are discarded by the parser
    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Whitespace | TokenKind::Newline | TokenKind::Comment(_)
        )
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

impl Keyword {
    pub fn from_word(word: &str) -> Option<Self> {
        let kw = match word {
            "struct" => Keyword::Struct,
            "variant" => Keyword::Variant,
            "enum" => Keyword::Enum,
            "unit" => Keyword::Unit,
            "array" => Keyword::Array,
            "map" => Keyword::Map,
            "optional" => Keyword::Optional,
            "ref" => Keyword::Ref,
            "entity" => Keyword::Entity,
            _ => return None,
        };
        Some(kw)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Struct => "struct",
            Keyword::Variant => "variant",
            Keyword::Enum => "enum",
            Keyword::Unit => "unit",
            Keyword::Array => "array",
            Keyword::Map => "map",
            Keyword::Optional => "optional",
            Keyword::Ref => "ref",
            Keyword::Entity => "entity",
        }
    }
}

impl Symbol {
    pub fn from_char(ch: char) -> Option<Self> {
        let sym = match ch {
            ':' => Symbol::Colon,
            ',' => Symbol::Comma,
            '{' => Symbol::LBrace,
            '}' => Symbol::RBrace,
            '<' => Symbol::LAngle,
            '>' => Symbol::RAngle,
            '(' => Symbol::LParen,
            ')' => Symbol::RParen,
            _ => return None,
        };
        Some(sym)
    }

    pub fn as_char(&self) -> char {
        match self {
            Symbol::Colon => ':',
            Symbol::Comma => ',',
            Symbol::LBrace => '{',
            Symbol::RBrace => '}',
            Symbol::LAngle => '<',
            Symbol::RAngle => '>',
            Symbol::LParen => '(',
            Symbol::RParen => ')',
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Keyword(kw) => write!(f, "'{}'", kw.as_str()),
            TokenKind::Primitive(p) => write!(f, "'{}'", p.as_str()),
            TokenKind::Ident(name) => write!(f, "identifier '{}'", name),
            TokenKind::StringLit(_) => write!(f, "string literal"),
            TokenKind::NumberLit(n) => write!(f, "number '{}'", n),
            TokenKind::BoolLit(b) => write!(f, "'{}'", b),
            TokenKind::Symbol(sym) => write!(f, "'{}'", sym.as_char()),
            TokenKind::Comment(_) => write!(f, "comment"),
            TokenKind::Whitespace => write!(f, "whitespace"),
            TokenKind::Newline => write!(f, "newline"),
            TokenKind::Eof => write!(f, "end of input"),
            TokenKind::Error(_) => write!(f, "invalid token"),
        }
    }
}
