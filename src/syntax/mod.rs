//! Schema language front end: tokens, lexer, AST and parser

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{
    Alternative, Container, EnumValue, Field, PrimitiveType, Schema, TypeDefinition, TypeExpr,
    TypeExprKind,
};
pub use lexer::Lexer;
pub use parser::{ParseOutput, Parser};
pub use token::{Keyword, Span, Symbol, Token, TokenKind};
