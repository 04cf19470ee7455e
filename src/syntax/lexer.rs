//! Tokenizer
//!
//! Produces tokens on demand with a one-token peek buffer. Layout (whitespace,
//! newlines, comments) is emitted as tokens too; the parser discards it.
//! Malformed input yields `TokenKind::Error` tokens instead of failing, and an
//! unterminated construct always leaves the scan at end of input.

use super::ast::PrimitiveType;
use super::token::{Keyword, Span, Symbol, Token, TokenKind};

pub struct Lexer<'a> {
    src: &'a str,
    idx: usize,
    line: usize,
    col: usize,
    peeked: Option<Token>,
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            idx: 0,
            line: 1,
            col: 1,
            peeked: None,
            done: false,
        }
    }

    /// Consume and return the next token. Returns `Eof` forever once the
    /// input is exhausted.
    pub fn next_token(&mut self) -> Token {
        match self.peeked.take() {
            Some(tok) => tok,
            None => self.scan_token(),
        }
    }

    /// Look at the next token without consuming it. Peeking repeatedly
    /// returns the same token.
    pub fn peek_token(&mut self) -> &Token {
        let tok = match self.peeked.take() {
            Some(tok) => tok,
            None => self.scan_token(),
        };
        self.peeked.insert(tok)
    }

    /// Tokenize the whole input, ending with a single `Eof` token.
    pub fn lex_all(self) -> Vec<Token> {
        self.collect()
    }

    fn scan_token(&mut self) -> Token {
        let start = self.idx;
        let (line, column) = (self.line, self.col);
        let Some(ch) = self.peek_char() else {
            return self.finish(TokenKind::Eof, start, line, column);
        };
        let kind = match ch {
            '\n' => {
                self.advance();
                TokenKind::Newline
            }
            ' ' | '\t' | '\r' => {
                self.read_while(is_inline_space);
                TokenKind::Whitespace
            }
            '/' if self.peek_next_char() == Some('/') => self.scan_line_comment(),
            '/' if self.peek_next_char() == Some('*') => self.scan_block_comment(),
            '"' => self.scan_string(),
            '-' if self.peek_next_char().is_some_and(|c| c.is_ascii_digit()) => {
                self.scan_number()
            }
            c if c.is_ascii_digit() => self.scan_number(),
            c if is_ident_start(c) => self.scan_word(),
            c => {
                self.advance();
                match Symbol::from_char(c) {
                    Some(sym) => TokenKind::Symbol(sym),
                    None => TokenKind::Error(format!("Unexpected character: '{}'", c)),
                }
            }
        };
        self.finish(kind, start, line, column)
    }

    fn finish(&self, kind: TokenKind, start: usize, line: usize, column: usize) -> Token {
        Token {
            kind,
            lexeme: self.src[start..self.idx].to_string(),
            span: Span {
                start,
                end: self.idx,
                line,
                column,
            },
        }
    }

    fn scan_word(&mut self) -> TokenKind {
        let word = self.read_while(is_ident_continue);
        if let Some(kw) = Keyword::from_word(word) {
            return TokenKind::Keyword(kw);
        }
        match word {
            "true" => TokenKind::BoolLit(true),
            "false" => TokenKind::BoolLit(false),
            _ => match PrimitiveType::from_type_name(word) {
                Some(p) => TokenKind::Primitive(p),
                None => TokenKind::Ident(word.to_string()),
            },
        }
    }

    fn scan_number(&mut self) -> TokenKind {
        let start = self.idx;
        if self.peek_char() == Some('-') {
            self.advance();
        }
        if self.peek_char() == Some('0') {
            let radix = match self.peek_next_char() {
                Some('x' | 'X') => Some(16),
                Some('b' | 'B') => Some(2),
                Some('o' | 'O') => Some(8),
                _ => None,
            };
            if let Some(radix) = radix {
                self.advance();
                self.advance();
                let digits = self.read_while(|c| c.is_digit(radix));
                if digits.is_empty() {
                    return TokenKind::Error(format!(
                        "Invalid numeric literal '{}': missing digits",
                        &self.src[start..self.idx]
                    ));
                }
                return TokenKind::NumberLit(self.src[start..self.idx].to_string());
            }
        }
        self.read_while(|c| c.is_ascii_digit());
        if self.peek_char() == Some('.') && self.peek_next_char().is_some_and(|c| c.is_ascii_digit())
        {
            self.advance();
            self.read_while(|c| c.is_ascii_digit());
        }
        if matches!(self.peek_char(), Some('e' | 'E')) && self.exponent_follows() {
            self.advance();
            if matches!(self.peek_char(), Some('+' | '-')) {
                self.advance();
            }
            self.read_while(|c| c.is_ascii_digit());
        }
        TokenKind::NumberLit(self.src[start..self.idx].to_string())
    }

    /// After an `e`/`E`: digits, optionally preceded by a sign
    fn exponent_follows(&self) -> bool {
        let mut rest = self.src[self.idx..].chars().skip(1);
        match rest.next() {
            Some('+' | '-') => rest.next().is_some_and(|c| c.is_ascii_digit()),
            Some(c) => c.is_ascii_digit(),
            None => false,
        }
    }

    fn scan_string(&mut self) -> TokenKind {
        self.advance(); // opening quote
        let mut value = String::new();
        let mut error: Option<String> = None;
        loop {
            match self.peek_char() {
                None => return TokenKind::Error("Unterminated string literal".to_string()),
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.read_escape() {
                        Ok(c) => value.push(c),
                        Err(msg) => {
                            // keep scanning to the closing quote; report the first problem
                            error.get_or_insert(msg);
                        }
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }
        match error {
            Some(msg) => TokenKind::Error(msg),
            None => TokenKind::StringLit(value),
        }
    }

    fn read_escape(&mut self) -> Result<char, String> {
        let Some(esc) = self.peek_char() else {
            return Err("Unterminated string literal".to_string());
        };
        self.advance();
        match esc {
            'n' => Ok('\n'),
            't' => Ok('\t'),
            'r' => Ok('\r'),
            '\\' => Ok('\\'),
            '"' => Ok('"'),
            '\'' => Ok('\''),
            '0' => Ok('\0'),
            'x' => {
                let hi = self
                    .read_hex_digit()
                    .ok_or("Invalid hex escape sequence: missing first hex digit")?;
                let lo = self
                    .read_hex_digit()
                    .ok_or("Invalid hex escape sequence: missing second hex digit")?;
                Ok(char::from(hi << 4 | lo))
            }
            other => Err(format!("Invalid escape sequence: '\\{}'", other)),
        }
    }

    fn read_hex_digit(&mut self) -> Option<u8> {
        let digit = self.peek_char()?.to_digit(16)?;
        self.advance();
        Some(digit as u8)
    }

    fn scan_line_comment(&mut self) -> TokenKind {
        self.advance();
        self.advance();
        let text = self.read_while(|c| c != '\n');
        TokenKind::Comment(text.to_string())
    }

    fn scan_block_comment(&mut self) -> TokenKind {
        self.advance();
        self.advance();
        let body_start = self.idx;
        while let Some(ch) = self.peek_char() {
            if ch == '*' && self.peek_next_char() == Some('/') {
                let text = self.src[body_start..self.idx].to_string();
                self.advance();
                self.advance();
                return TokenKind::Comment(text);
            }
            self.advance();
        }
        TokenKind::Error("Unterminated multi-line comment".to_string())
    }

    fn read_while<F>(&mut self, f: F) -> &'a str
    where
        F: Fn(char) -> bool,
    {
        let start = self.idx;
        while let Some(ch) = self.peek_char() {
            if !f(ch) {
                break;
            }
            self.advance();
        }
        &self.src[start..self.idx]
    }

    fn advance(&mut self) {
        let Some(ch) = self.peek_char() else {
            return;
        };
        self.idx += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.src[self.idx..].chars().next()
    }

    fn peek_next_char(&self) -> Option<char> {
        self.src[self.idx..].chars().nth(1)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    /// Yields every token including a final `Eof`, then stops.
    fn next(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }
        let tok = self.next_token();
        if tok.is_eof() {
            self.done = true;
        }
        Some(tok)
    }
}

fn is_inline_space(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r')
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}
