//! Statement parsing implementation
//!
//! This module handles everything that can appear in a function body:
//!
//! - Local declarations: `int x = 42;`
//! - Control flow: `if`, `while`, `do-while`
//! - Jump statements: `return`, `break`, `continue`
//! - Nested blocks: `{ ... }`
//! - Expression statements: assignments and calls
//!
//! # Grammar
//!
//! ```text
//! statement ::= local_decl | return_stmt | if_stmt | while_stmt
//!             | do_while_stmt | break_stmt | continue_stmt | block | expr_stmt
//! ```
//!
//! Locals belong to the function scope. A nested block does not open a scope
//! of its own, so a name can be declared only once per function.

use crate::parser::ast::*;
use crate::parser::errors::ParseError;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;
use crate::parser::types::DataType;

impl<'a> Parser<'a> {
    /// Parse statements up to the closing brace (not consumed) into a
    /// container node of the given kind
    pub(crate) fn parse_block_statements(&mut self, kind: NodeType) -> Result<Node, ParseError> {
        let mut block = NodeBuilder::new(kind);

        while !self.check_punct("}") && !self.is_at_end() {
            block.push(self.parse_statement()?);
        }

        Ok(block.build())
    }

    /// Parse a statement
    pub(crate) fn parse_statement(&mut self) -> Result<Node, ParseError> {
        let token = self.peek();
        let loc = token.location;

        if token.kind == TokenKind::Keyword {
            match token.text.as_str() {
                "return" => {
                    self.advance();
                    return self.parse_return_statement(loc);
                }
                "if" => {
                    self.advance();
                    return self.parse_if_statement();
                }
                "while" => {
                    self.advance();
                    return self.parse_while_statement();
                }
                "do" => {
                    self.advance();
                    return self.parse_do_while_statement();
                }
                "break" | "continue" => {
                    self.advance();
                    return self.parse_jump_statement(&token.text, loc);
                }
                "else" => return Err(self.syntax_error("'else' without a matching 'if'")),
                "for" => return Err(self.syntax_error("'for' loops are not supported")),
                "const" => {
                    return Err(self.syntax_error("'const' is only allowed at module scope"));
                }
                // Any other keyword stands in type position
                _ => return self.parse_local_declaration(),
            }
        }

        if self.match_punct("{") {
            let block = self.parse_block_statements(NodeType::Block)?;
            self.expect_punct("}", "after block")?;
            return Ok(block);
        }

        // Two identifiers in a row can only be a declaration with an unknown type
        if token.kind == TokenKind::Identifier
            && self
                .peek_ahead(1)
                .is_some_and(|t| t.kind == TokenKind::Identifier)
        {
            return self.parse_local_declaration();
        }

        self.parse_expression_statement()
    }

    /// Parse local declaration: type name [= expr];
    fn parse_local_declaration(&mut self) -> Result<Node, ParseError> {
        let data_type = self.parse_declared_type()?;
        let (name, loc) = self.expect_identifier()?;

        if self.check_punct("(") {
            return Err(self.syntax_error("Function definitions cannot be nested"));
        }

        // The initializer is resolved before the new name is visible
        let init = if self.match_operator("=") {
            Some(self.parse_typed_expression(data_type, "initializer")?)
        } else {
            None
        };

        self.expect_semicolon("after variable declaration")?;

        self.symbols.declare_local(&name, data_type, loc)?;

        Ok(NodeBuilder::new(NodeType::LocalVar)
            .name(name)
            .data_type(data_type)
            .maybe_child(init)
            .build())
    }

    /// Parse return statement. The node carries the enclosing function's
    /// name and return type.
    fn parse_return_statement(&mut self, loc: SourceLocation) -> Result<Node, ParseError> {
        let Some(function) = self.current_function().cloned() else {
            return Err(ParseError::Syntax {
                message: "'return' outside of a function".to_string(),
                location: loc,
            });
        };

        let mut node = NodeBuilder::new(NodeType::Return)
            .name(function.name.as_str())
            .maybe_data_type(function.return_type);

        match (function.return_type, self.check_punct(";")) {
            (Some(return_type), true) => {
                return Err(ParseError::TypeMismatch {
                    message: format!(
                        "function '{}' must return a value of type {}",
                        function.name, return_type
                    ),
                    location: loc,
                });
            }
            (None, false) => {
                return Err(ParseError::TypeMismatch {
                    message: format!("void function '{}' cannot return a value", function.name),
                    location: self.current_location(),
                });
            }
            (Some(return_type), false) => {
                node = node.child(self.parse_typed_expression(return_type, "return value")?);
            }
            (None, true) => {}
        }

        self.expect_semicolon("after return")?;

        Ok(node.build())
    }

    /// Parse if statement
    fn parse_if_statement(&mut self) -> Result<Node, ParseError> {
        self.expect_punct("(", "after 'if'")?;
        let condition = self.parse_condition()?;
        self.expect_punct(")", "after if condition")?;

        let then_branch = self.parse_statement_or_block()?;

        let else_branch = if self.match_keyword("else") {
            Some(self.parse_statement_or_block()?)
        } else {
            None
        };

        Ok(NodeBuilder::new(NodeType::If)
            .child(condition)
            .child(then_branch)
            .maybe_child(else_branch)
            .build())
    }

    /// Parse while statement
    fn parse_while_statement(&mut self) -> Result<Node, ParseError> {
        self.expect_punct("(", "after 'while'")?;
        let condition = self.parse_condition()?;
        self.expect_punct(")", "after while condition")?;

        let body = self.parse_loop_body()?;

        Ok(NodeBuilder::new(NodeType::While)
            .child(condition)
            .child(body)
            .build())
    }

    /// Parse do-while statement
    fn parse_do_while_statement(&mut self) -> Result<Node, ParseError> {
        let body = self.parse_loop_body()?;

        if !self.match_keyword("while") {
            return Err(self.syntax_error(format!(
                "Expected 'while' after do body, found {}",
                self.peek()
            )));
        }
        self.expect_punct("(", "after 'while'")?;
        let condition = self.parse_condition()?;
        self.expect_punct(")", "after do-while condition")?;
        self.expect_semicolon("after do-while")?;

        Ok(NodeBuilder::new(NodeType::DoWhile)
            .child(body)
            .child(condition)
            .build())
    }

    fn parse_jump_statement(&mut self, keyword: &str, loc: SourceLocation) -> Result<Node, ParseError> {
        if self.loop_depth == 0 {
            return Err(ParseError::Syntax {
                message: format!("'{}' outside of a loop", keyword),
                location: loc,
            });
        }
        self.expect_semicolon(&format!("after '{}'", keyword))?;

        let kind = if keyword == "break" {
            NodeType::Break
        } else {
            NodeType::Continue
        };
        Ok(NodeBuilder::new(kind).build())
    }

    /// Parse expression statement. Assignments stand on their own, anything
    /// else is wrapped so its value can be discarded.
    fn parse_expression_statement(&mut self) -> Result<Node, ParseError> {
        let expr = self.parse_expression(None)?;
        self.expect_semicolon("after expression")?;

        match expr.kind() {
            NodeType::LocalSet | NodeType::GlobalSet => Ok(expr),
            _ => Ok(NodeBuilder::new(NodeType::Expression).child(expr).build()),
        }
    }

    /// Conditions are `i32`, like comparison results
    fn parse_condition(&mut self) -> Result<Node, ParseError> {
        self.parse_typed_expression(DataType::I32, "condition")
    }

    fn parse_loop_body(&mut self) -> Result<Node, ParseError> {
        self.loop_depth += 1;
        let body = self.parse_statement_or_block();
        self.loop_depth -= 1;
        body
    }

    /// Parse statement or block (for if/while bodies); always yields a block
    pub(crate) fn parse_statement_or_block(&mut self) -> Result<Node, ParseError> {
        if self.match_punct("{") {
            let block = self.parse_block_statements(NodeType::Block)?;
            self.expect_punct("}", "after block")?;
            Ok(block)
        } else {
            Ok(NodeBuilder::new(NodeType::Block)
                .child(self.parse_statement()?)
                .build())
        }
    }
}
