//! Main parser coordinator
//!
//! This module provides the `Parser` struct, its token helpers and the
//! [`parse`] entry point.
//!
//! # Parser Architecture
//!
//! Parsing, name resolution and type assignment happen in a single
//! recursive-descent pass. Parser methods are split across files using
//! `impl Parser` blocks:
//! - This module: Parser state, token helpers, module loop
//! - `declarations`: globals, functions, parameters, type keywords
//! - `statements`: locals, return, control flow, expression statements
//! - `expressions`: operators, literals, references, assignments, calls
//!
//! The parser value is the resolution context. It owns the symbol table and
//! the active function context, and every recursive call borrows it mutably.
//! Nothing is shared between two parses.

use tracing::debug;

use crate::parser::ast::*;
use crate::parser::errors::ParseError;
use crate::parser::lexer::{Token, TokenKind};
use crate::parser::symbols::SymbolTable;
use crate::parser::types::DataType;

/// Parse a token stream into a typed, resolved `module` node
pub fn parse(tokens: &[Token]) -> Result<Node, ParseError> {
    Parser::new(tokens)?.parse_module()
}

/// Function currently being parsed
#[derive(Debug, Clone)]
pub(crate) struct FunctionContext {
    pub(crate) name: String,
    pub(crate) return_type: Option<DataType>,
}

/// Recursive descent parser and resolver
pub(crate) struct Parser<'a> {
    pub(crate) tokens: &'a [Token],
    pub(crate) position: usize,
    pub(crate) symbols: SymbolTable,
    pub(crate) function: Option<FunctionContext>,
    pub(crate) loop_depth: usize,
}

impl<'a> Parser<'a> {
    /// Fails unless the stream holds exactly one end-of-input token, at the
    /// end
    pub(crate) fn new(tokens: &'a [Token]) -> Result<Self, ParseError> {
        if let Some(stray) = tokens
            .iter()
            .rev()
            .skip(1)
            .find(|t| t.kind == TokenKind::Eof)
        {
            return Err(ParseError::Syntax {
                message: "End of input before the last token".to_string(),
                location: stray.location,
            });
        }

        match tokens.last() {
            Some(token) if token.kind == TokenKind::Eof => {}
            Some(token) => {
                return Err(ParseError::Syntax {
                    message: "Token stream is not terminated by end of input".to_string(),
                    location: token.location,
                });
            }
            None => {
                return Err(ParseError::Syntax {
                    message: "Empty token stream".to_string(),
                    location: SourceLocation::new(1, 1),
                });
            }
        }

        Ok(Self {
            tokens,
            position: 0,
            symbols: SymbolTable::new(),
            function: None,
            loop_depth: 0,
        })
    }

    /// Parse the entire module (top-level declarations)
    pub(crate) fn parse_module(mut self) -> Result<Node, ParseError> {
        let mut module = NodeBuilder::new(NodeType::Module);

        while !self.is_at_end() {
            module.push(self.parse_top_level_declaration()?);
        }

        let module = module.build();
        debug!(
            declarations = module.nodes().len(),
            nodes = module.count(),
            "module parsed"
        );
        Ok(module)
    }

    // ===== Helper methods =====

    pub(crate) fn peek(&self) -> &'a Token {
        let tokens = self.tokens;
        &tokens[self.position]
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&'a Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn advance(&mut self) -> &'a Token {
        let token = self.peek();
        if !self.is_at_end() {
            self.position += 1;
        }
        token
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location
    }

    pub(crate) fn check_punct(&self, punct: &str) -> bool {
        self.peek().is_punct(punct)
    }

    pub(crate) fn check_operator(&self, op: &str) -> bool {
        self.peek().is_operator(op)
    }

    pub(crate) fn check_keyword(&self, word: &str) -> bool {
        self.peek().is_keyword(word)
    }

    pub(crate) fn match_punct(&mut self, punct: &str) -> bool {
        if self.check_punct(punct) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn match_operator(&mut self, op: &str) -> bool {
        if self.check_operator(op) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn match_keyword(&mut self, word: &str) -> bool {
        if self.check_keyword(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn syntax_error(&self, message: impl Into<String>) -> ParseError {
        ParseError::Syntax {
            message: message.into(),
            location: self.current_location(),
        }
    }

    pub(crate) fn expect_punct(&mut self, punct: &str, ctx: &str) -> Result<(), ParseError> {
        if self.match_punct(punct) {
            Ok(())
        } else {
            Err(self.syntax_error(format!(
                "Expected '{}' {}, found {}",
                punct,
                ctx,
                self.peek()
            )))
        }
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_punct(";", ctx)
    }

    /// Consume an identifier, returning its name and location
    pub(crate) fn expect_identifier(&mut self) -> Result<(String, SourceLocation), ParseError> {
        let token = self.peek();
        if token.kind == TokenKind::Identifier {
            self.advance();
            Ok((token.text.clone(), token.location))
        } else {
            Err(self.syntax_error(format!("Expected identifier, found {}", token)))
        }
    }

    pub(crate) fn current_function(&self) -> Option<&FunctionContext> {
        self.function.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::errors::ErrorKind;
    use crate::parser::lexer::tokenize;

    fn parse_source(source: &str) -> Result<Node, ParseError> {
        parse(&tokenize(source).unwrap())
    }

    #[test]
    fn test_parse_empty_module() {
        let module = parse_source("").unwrap();
        assert_eq!(module.kind(), NodeType::Module);
        assert!(module.nodes().is_empty());
    }

    #[test]
    fn test_parse_simple_function() {
        let module = parse_source("int main() { return 0; }").unwrap();

        assert_eq!(module.nodes().len(), 1);
        let function = &module.nodes()[0];
        assert_eq!(function.kind(), NodeType::Function);
        assert_eq!(function.name(), Some("main"));
        assert_eq!(function.data_type(), Some(DataType::I32));
        assert_eq!(function.nodes()[0].kind(), NodeType::Parameters);
        assert_eq!(function.nodes()[1].kind(), NodeType::Body);
        assert_eq!(function.nodes()[1].nodes().len(), 1);
    }

    #[test]
    fn test_rejects_empty_stream() {
        let err = parse(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn test_rejects_unterminated_stream() {
        let mut tokens = tokenize("int x;").unwrap();
        tokens.pop();
        let err = parse(&tokens).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.location(), SourceLocation::new(1, 6));
    }

    #[test]
    fn test_rejects_inner_end_of_input() {
        let mut tokens = tokenize("int x;").unwrap();
        tokens.extend(tokenize("int y;").unwrap());
        let err = parse(&tokens).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.location(), SourceLocation::new(1, 7));
    }

    #[test]
    fn test_independent_parses_share_nothing() {
        let tokens = tokenize("int x = 1;").unwrap();
        assert!(parse(&tokens).is_ok());
        // A second parse of the same stream sees a fresh symbol table
        assert!(parse(&tokens).is_ok());
    }
}
