//! Reference tokenizer
//!
//! Converts raw source text into the classified [`Token`] stream consumed by
//! the parser. Whitespace and comments are dropped here, so the parser never
//! sees trivia. The stream always ends with a [`TokenKind::Eof`] token.
//!
//! The parser itself does not depend on this module; any producer of
//! `&[Token]` with the same classification works.

use std::fmt;

use thiserror::Error;

use super::ast::SourceLocation;

/// Words the tokenizer classifies as keywords rather than identifiers.
///
/// Some of these (`char`, `short`, ...) are not value types of the target;
/// the parser reports them as unknown types.
pub const KEYWORDS: &[&str] = &[
    "int", "long", "float", "double", "void", "const", "char", "short", "unsigned", "signed",
    "return", "if", "else", "while", "do", "for", "break", "continue",
];

const OPERATORS: &[&str] = &[
    "+=", "-=", "*=", "/=", "%=", "==", "!=", "<=", ">=", "&&", "||", "+", "-", "*", "/", "%",
    "=", "<", ">", "!",
];

const PUNCTUATION: &[char] = &['(', ')', '{', '}', ',', ';'];

/// Lexical class of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    Identifier,
    Number,
    Operator,
    Punctuation,
    Eof,
}

/// A classified lexical unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            text: text.into(),
            location,
        }
    }

    pub fn eof(location: SourceLocation) -> Self {
        Self::new(TokenKind::Eof, "", location)
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == word
    }

    pub fn is_operator(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == op
    }

    pub fn is_punct(&self, punct: &str) -> bool {
        self.kind == TokenKind::Punctuation && self.text == punct
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Keyword | TokenKind::Operator | TokenKind::Punctuation => {
                write!(f, "'{}'", self.text)
            }
            TokenKind::Identifier => write!(f, "identifier '{}'", self.text),
            TokenKind::Number => write!(f, "number {}", self.text),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Lexer error at {location}: {message}")]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

/// Tokenize a whole source string
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments()?;

            if self.is_at_end() {
                tokens.push(Token::eof(self.current_location()));
                break;
            }

            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        let ch = self.peek().ok_or_else(|| LexError {
            message: "Unexpected end of file".to_string(),
            location: loc,
        })?;

        if ch.is_ascii_digit() || (ch == '.' && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()))
        {
            return self.number_literal(loc);
        }

        if ch.is_ascii_alphabetic() || ch == '_' {
            return Ok(self.identifier_or_keyword(loc));
        }

        if PUNCTUATION.contains(&ch) {
            self.advance();
            return Ok(Token::new(TokenKind::Punctuation, ch.to_string(), loc));
        }

        // Longest match first: two-character operators precede their prefixes
        for op in OPERATORS {
            if self.starts_with(op) {
                for _ in 0..op.len() {
                    self.advance();
                }
                return Ok(Token::new(TokenKind::Operator, *op, loc));
            }
        }

        Err(LexError {
            message: format!("Unexpected character: '{}'", ch),
            location: loc,
        })
    }

    /// Number literal: decimal or `0x` hex integers, and decimal fractions
    /// with an optional exponent. The spelling is kept verbatim.
    fn number_literal(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let mut text = String::new();

        if self.peek() == Some('0') && matches!(self.peek_ahead(1), Some('x' | 'X')) {
            self.push_advance(&mut text);
            self.push_advance(&mut text);
            let digits_start = text.len();
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.push_advance(&mut text);
            }
            if text.len() == digits_start {
                return Err(LexError {
                    message: format!("Invalid hex literal: {}", text),
                    location: loc,
                });
            }
            return Ok(Token::new(TokenKind::Number, text, loc));
        }

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.push_advance(&mut text);
        }

        if self.peek() == Some('.') {
            self.push_advance(&mut text);
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.push_advance(&mut text);
            }
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            self.push_advance(&mut text);
            if matches!(self.peek(), Some('+' | '-')) {
                self.push_advance(&mut text);
            }
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                return Err(LexError {
                    message: format!("Missing exponent digits in literal: {}", text),
                    location: loc,
                });
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.push_advance(&mut text);
            }
        }

        if self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(LexError {
                message: format!("Invalid number literal: {}{}", text, self.peek().unwrap_or_default()),
                location: loc,
            });
        }

        Ok(Token::new(TokenKind::Number, text, loc))
    }

    fn identifier_or_keyword(&mut self, loc: SourceLocation) -> Token {
        let mut ident = String::new();

        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
            self.push_advance(&mut ident);
        }

        let kind = if KEYWORDS.contains(&ident.as_str()) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        Token::new(kind, ident, loc)
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.advance() {
            if ch == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }

        Err(LexError {
            message: "Unterminated block comment".to_string(),
            location: start_loc,
        })
    }

    fn starts_with(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, c)| self.peek_ahead(i) == Some(c))
    }

    fn push_advance(&mut self, buffer: &mut String) {
        if let Some(ch) = self.advance() {
            buffer.push(ch);
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}
