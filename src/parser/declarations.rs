//! Declaration parsing implementation
//!
//! This module handles the top-level constructs of a module:
//!
//! - Global variables and constants: `[const] type name [= literal];`
//! - Function definitions: `type name(params) { ... }`
//! - Type keywords and parameter lists
//!
//! # Grammar
//!
//! ```text
//! top_level   ::= global_decl | function
//! global_decl ::= ["const"] type identifier ["=" ["-"] number] ";"
//! function    ::= (type | "void") identifier "(" params ")" "{" statement* "}"
//! params      ::= "" | "void" | type identifier ("," type identifier)*
//! ```
//!
//! Globals and functions are registered in the module scope as soon as they
//! are parsed, so later declarations can use them and earlier ones cannot.

use tracing::debug;

use crate::parser::ast::*;
use crate::parser::errors::ParseError;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{FunctionContext, Parser};
use crate::parser::symbols::FunctionSignature;
use crate::parser::types::{resolve_declared_type, DataType};

/// Keywords that open a statement and can never name a type
pub(crate) fn is_statement_keyword(word: &str) -> bool {
    matches!(
        word,
        "return" | "if" | "else" | "while" | "do" | "for" | "break" | "continue"
    )
}

impl<'a> Parser<'a> {
    /// Parse a top-level declaration (global or function)
    pub(crate) fn parse_top_level_declaration(&mut self) -> Result<Node, ParseError> {
        let token = self.peek();
        if token.kind == TokenKind::Keyword && is_statement_keyword(&token.text) {
            return Err(self.syntax_error(format!(
                "{} is not allowed outside of a function",
                token
            )));
        }

        if self.check_keyword("const") {
            return self.parse_global_declaration();
        }

        // type name ( ...
        if self.peek_ahead(2).is_some_and(|t| t.is_punct("(")) {
            return self.parse_function_definition();
        }

        self.parse_global_declaration()
    }

    /// Parse global declaration: [const] type name [= literal];
    fn parse_global_declaration(&mut self) -> Result<Node, ParseError> {
        let is_const = self.match_keyword("const");
        let data_type = self.parse_declared_type()?;
        let (name, loc) = self.expect_identifier()?;

        if self.check_punct("(") {
            return Err(self.syntax_error(format!("Function '{}' cannot be declared const", name)));
        }

        self.symbols.declare_global(&name, data_type, is_const, loc)?;

        let init = if self.match_operator("=") {
            Some(self.parse_literal_initializer(data_type)?)
        } else if is_const {
            return Err(ParseError::Syntax {
                message: format!("Constant '{}' requires an initializer", name),
                location: loc,
            });
        } else {
            None
        };

        self.expect_semicolon("after global declaration")?;

        debug!(global = %name, %data_type, is_const, "global declared");

        Ok(NodeBuilder::new(NodeType::GlobalVar)
            .name(name)
            .data_type(data_type)
            .maybe_child(init)
            .build())
    }

    /// Global initializers are constant: an optionally negated number
    fn parse_literal_initializer(&mut self, data_type: DataType) -> Result<Node, ParseError> {
        let negative = self.match_operator("-");
        let token = self.peek();
        if token.kind != TokenKind::Number {
            return Err(self.syntax_error(format!(
                "Global initializer must be a number literal, found {}",
                token
            )));
        }
        self.advance();
        Self::number_node(&token.text, negative, data_type, token.location)
    }

    /// Parse function definition: type name(params) { body }
    fn parse_function_definition(&mut self) -> Result<Node, ParseError> {
        let return_type = self.parse_return_type()?;
        let (name, loc) = self.expect_identifier()?;

        self.expect_punct("(", "after function name")?;

        self.symbols.enter_function_scope();

        let (params, param_types) = self.parse_parameter_list()?;

        self.expect_punct(")", "after parameters")?;

        let param_count = param_types.len();
        self.symbols.declare_function(
            &name,
            FunctionSignature {
                return_type,
                params: param_types,
            },
            loc,
        )?;
        self.function = Some(FunctionContext {
            name: name.clone(),
            return_type,
        });

        self.expect_punct("{", "before function body")?;
        let body = self.parse_block_statements(NodeType::Body)?;
        self.expect_punct("}", "after function body")?;

        self.function = None;
        self.symbols.exit_function_scope();

        debug!(
            function = %name,
            return_type = ?return_type,
            params = param_count,
            statements = body.nodes().len(),
            "function parsed"
        );

        Ok(NodeBuilder::new(NodeType::Function)
            .name(name)
            .maybe_data_type(return_type)
            .child(params)
            .child(body)
            .build())
    }

    /// Parse parameter list: type name, type name, ...
    ///
    /// Each parameter is registered in the active function scope.
    fn parse_parameter_list(&mut self) -> Result<(Node, Vec<DataType>), ParseError> {
        let mut params = NodeBuilder::new(NodeType::Parameters);
        let mut types = Vec::new();

        if self.check_punct(")") {
            return Ok((params.build(), types));
        }

        // (void) means no parameters
        if self.check_keyword("void") && self.peek_ahead(1).is_some_and(|t| t.is_punct(")")) {
            self.advance();
            return Ok((params.build(), types));
        }

        loop {
            let data_type = self.parse_declared_type()?;
            let (name, loc) = self.expect_identifier()?;
            self.symbols.declare_parameter(&name, data_type, loc)?;

            params.push(
                NodeBuilder::new(NodeType::Parameter)
                    .name(name)
                    .data_type(data_type)
                    .build(),
            );
            types.push(data_type);

            if !self.match_punct(",") {
                break;
            }
        }

        Ok((params.build(), types))
    }

    /// Function return type, `None` for `void`
    fn parse_return_type(&mut self) -> Result<Option<DataType>, ParseError> {
        if self.match_keyword("void") {
            Ok(None)
        } else {
            self.parse_declared_type().map(Some)
        }
    }

    /// Parse a type keyword in declaration position.
    ///
    /// Any keyword other than a statement keyword, and any identifier that is
    /// directly followed by another identifier, stands in type position here.
    /// Those that do not name a data type are unknown types.
    pub(crate) fn parse_declared_type(&mut self) -> Result<DataType, ParseError> {
        let token = self.peek();
        let in_type_position = match token.kind {
            TokenKind::Keyword => !is_statement_keyword(&token.text),
            TokenKind::Identifier => self
                .peek_ahead(1)
                .is_some_and(|t| t.kind == TokenKind::Identifier),
            _ => false,
        };

        if !in_type_position {
            return Err(self.syntax_error(format!("Expected type, found {}", token)));
        }

        self.advance();
        resolve_declared_type(&token.text, token.location)
    }
}
