//! Expression parsing implementation
//!
//! This module parses expressions with one function per precedence level and
//! types every node while it is built.
//!
//! # Supported Expressions
//!
//! - Number literals, typed by their context
//! - Variable references, resolved to `localGet` / `globalGet`
//! - Assignments `=` and compound `+= -= *= /= %=`, resolved to
//!   `localSet` / `globalSet`
//! - Binary operators: arithmetic, comparison, logical
//! - Unary operators: `-`, `!`
//! - Casts: `(type) expr`
//! - Function calls
//!
//! # Literal typing
//!
//! A number literal has no type of its own. It is carried up the precedence
//! levels as [`Pending`] until something fixes its type: a sibling operand,
//! an operator, a cast, or the enclosing declaration, return, argument or
//! assignment. Arithmetic between literals only stays pending, so `3 * 2 < n`
//! types the product from `n`. Only then are the `number` nodes built, so a
//! node's type is never revised after construction. A literal nothing
//! constrains gets [`LITERAL_DEFAULT`].

use crate::parser::ast::*;
use crate::parser::declarations::is_statement_keyword;
use crate::parser::errors::ParseError;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;
use crate::parser::symbols::{StorageClass, Symbol};
use crate::parser::types::{
    expect_type, is_fractional_spelling, literal_value, types_compatible, DataType,
    LITERAL_DEFAULT,
};

/// Number literal whose type is not decided yet
#[derive(Debug, Clone)]
pub(crate) struct PendingLiteral {
    text: String,
    negative: bool,
    location: SourceLocation,
}

/// Literal-only expression whose type is not decided yet
#[derive(Debug, Clone)]
pub(crate) enum Pending {
    Literal(PendingLiteral),
    Neg(Box<Pending>),
    Binary {
        kind: NodeType,
        op: &'static str,
        left: Box<Pending>,
        right: Box<Pending>,
        location: SourceLocation,
    },
}

impl Pending {
    /// Type the expression has with nothing around it: `f64` as soon as one
    /// literal is fractional, the literal default otherwise
    fn natural_type(&self) -> DataType {
        if self.has_fraction() {
            DataType::F64
        } else {
            LITERAL_DEFAULT
        }
    }

    fn has_fraction(&self) -> bool {
        match self {
            Pending::Literal(lit) => is_fractional_spelling(&lit.text),
            Pending::Neg(inner) => inner.has_fraction(),
            Pending::Binary { left, right, .. } => left.has_fraction() || right.has_fraction(),
        }
    }

    /// Build the nodes, every literal typed as `data_type`
    fn build(self, data_type: DataType) -> Result<Node, ParseError> {
        match self {
            Pending::Literal(lit) => {
                Parser::number_node(&lit.text, lit.negative, data_type, lit.location)
            }
            Pending::Neg(inner) => Ok(NodeBuilder::new(NodeType::Neg)
                .data_type(data_type)
                .child(inner.build(data_type)?)
                .build()),
            Pending::Binary {
                kind,
                op,
                left,
                right,
                location,
            } => {
                let left = left.build(data_type)?;
                let right = right.build(data_type)?;
                binary_node(kind, op, left, right, location)
            }
        }
    }
}

/// Result of a precedence level
#[derive(Debug, Clone)]
pub(crate) enum Operand {
    Node(Node),
    Pending(Pending),
}

impl Operand {
    /// Build the final node, typing a pending expression with `data_type`
    /// (or the literal default)
    fn freeze(self, data_type: Option<DataType>) -> Result<Node, ParseError> {
        match self {
            Operand::Node(node) => Ok(node),
            Operand::Pending(pending) => pending.build(data_type.unwrap_or(LITERAL_DEFAULT)),
        }
    }
}

const ASSIGNMENT_OPERATORS: &[&str] = &["=", "+=", "-=", "*=", "/=", "%="];

/// Operand type of a value node; `void` calls have none
fn require_value(node: &Node, op: &str, location: SourceLocation) -> Result<DataType, ParseError> {
    node.data_type().ok_or_else(|| ParseError::TypeMismatch {
        message: format!("void value used as operand of '{}'", op),
        location,
    })
}

/// Type both operands of a binary operator identically. A pending side takes
/// the type of the other; two pending sides get the literal default.
fn unify(
    left: Operand,
    right: Operand,
    op: &str,
    location: SourceLocation,
) -> Result<(Node, Node), ParseError> {
    match (left, right) {
        (Operand::Node(l), Operand::Node(r)) => {
            let lt = require_value(&l, op, location)?;
            let rt = require_value(&r, op, location)?;
            if !types_compatible(lt, rt) {
                return Err(ParseError::TypeMismatch {
                    message: format!("operands of '{}' differ: {} and {}", op, lt, rt),
                    location,
                });
            }
            Ok((l, r))
        }
        (Operand::Node(l), pending) => {
            let lt = require_value(&l, op, location)?;
            let r = pending.freeze(Some(lt))?;
            Ok((l, r))
        }
        (pending, Operand::Node(r)) => {
            let rt = require_value(&r, op, location)?;
            Ok((pending.freeze(Some(rt))?, r))
        }
        (l, r) => Ok((l.freeze(None)?, r.freeze(None)?)),
    }
}

/// Arithmetic or comparison node over two operands of the same type
fn binary_node(
    kind: NodeType,
    op: &str,
    left: Node,
    right: Node,
    location: SourceLocation,
) -> Result<Node, ParseError> {
    let operand_type = require_value(&left, op, location)?;

    if kind == NodeType::Rem && !operand_type.is_integer() {
        return Err(ParseError::TypeMismatch {
            message: format!("'%' requires integer operands, found {}", operand_type),
            location,
        });
    }

    let result = if kind.is_comparison() {
        DataType::I32
    } else {
        operand_type
    };

    Ok(NodeBuilder::new(kind)
        .data_type(result)
        .child(left)
        .child(right)
        .build())
}

/// `+ - * / %`; stays pending while both sides are
fn arithmetic(
    kind: NodeType,
    op: &'static str,
    left: Operand,
    right: Operand,
    location: SourceLocation,
) -> Result<Operand, ParseError> {
    match (left, right) {
        (Operand::Pending(l), Operand::Pending(r)) => Ok(Operand::Pending(Pending::Binary {
            kind,
            op,
            left: Box::new(l),
            right: Box::new(r),
            location,
        })),
        (left, right) => {
            let (left, right) = unify(left, right, op, location)?;
            Ok(Operand::Node(binary_node(kind, op, left, right, location)?))
        }
    }
}

/// `== != < <= > >=`. The result is always `i32`, so the surrounding
/// context never types the operands.
fn comparison(
    kind: NodeType,
    op: &str,
    left: Operand,
    right: Operand,
    location: SourceLocation,
) -> Result<Operand, ParseError> {
    let (left, right) = unify(left, right, op, location)?;
    Ok(Operand::Node(binary_node(kind, op, left, right, location)?))
}

fn logical(
    kind: NodeType,
    op: &str,
    left: Operand,
    right: Operand,
    location: SourceLocation,
) -> Result<Operand, ParseError> {
    let context = format!("operand of '{}'", op);
    let left = left.freeze(Some(DataType::I32))?;
    expect_type(DataType::I32, left.data_type(), &context, location)?;
    let right = right.freeze(Some(DataType::I32))?;
    expect_type(DataType::I32, right.data_type(), &context, location)?;

    Ok(Operand::Node(
        NodeBuilder::new(kind)
            .data_type(DataType::I32)
            .child(left)
            .child(right)
            .build(),
    ))
}

/// Node for a variable access, picked by storage class
fn access_node(symbol: &Symbol, local: NodeType, global: NodeType) -> NodeBuilder {
    let kind = if symbol.storage.is_local() { local } else { global };
    NodeBuilder::new(kind)
        .name(symbol.name.as_str())
        .data_type(symbol.data_type)
}

impl<'a> Parser<'a> {
    /// Parse expression (top-level entry point). `expected` types pending
    /// literals; it is not checked here.
    pub(crate) fn parse_expression(&mut self, expected: Option<DataType>) -> Result<Node, ParseError> {
        self.parse_expression_operand()?.freeze(expected)
    }

    /// Parse an expression that must have type `expected`
    pub(crate) fn parse_typed_expression(
        &mut self,
        expected: DataType,
        context: &str,
    ) -> Result<Node, ParseError> {
        let loc = self.current_location();
        let node = self.parse_expression(Some(expected))?;
        expect_type(expected, node.data_type(), context, loc)?;
        Ok(node)
    }

    fn parse_expression_operand(&mut self) -> Result<Operand, ParseError> {
        if self.peek().kind == TokenKind::Identifier
            && self.peek_ahead(1).is_some_and(|t| {
                t.kind == TokenKind::Operator && ASSIGNMENT_OPERATORS.contains(&t.text.as_str())
            })
        {
            return Ok(Operand::Node(self.parse_assignment()?));
        }

        self.parse_logical_or()
    }

    /// Parse assignment: name (= | op=) expr
    fn parse_assignment(&mut self) -> Result<Node, ParseError> {
        let (name, loc) = self.expect_identifier()?;
        let op_token = self.advance();

        let symbol = self.symbols.lookup(&name, loc)?.clone();
        if symbol.storage == StorageClass::GlobalConstant {
            return Err(ParseError::ConstAssignment {
                name,
                location: loc,
            });
        }

        let value_loc = self.current_location();
        let value = match op_token.text.as_str() {
            "=" => self.parse_typed_expression(symbol.data_type, "assigned value")?,
            compound => {
                let (kind, op) = match compound {
                    "+=" => (NodeType::Add, "+"),
                    "-=" => (NodeType::Sub, "-"),
                    "*=" => (NodeType::Mul, "*"),
                    "/=" => (NodeType::Div, "/"),
                    _ => (NodeType::Rem, "%"),
                };
                let current =
                    access_node(&symbol, NodeType::LocalGet, NodeType::GlobalGet).build();
                let rhs = self.parse_expression_operand()?;
                let combined = arithmetic(kind, op, Operand::Node(current), rhs, op_token.location)?
                    .freeze(Some(symbol.data_type))?;
                expect_type(symbol.data_type, combined.data_type(), "assigned value", value_loc)?;
                combined
            }
        };

        Ok(access_node(&symbol, NodeType::LocalSet, NodeType::GlobalSet)
            .child(value)
            .build())
    }

    /// Parse logical OR (||)
    fn parse_logical_or(&mut self) -> Result<Operand, ParseError> {
        let mut left = self.parse_logical_and()?;

        loop {
            let loc = self.current_location();
            if !self.match_operator("||") {
                break;
            }
            let right = self.parse_logical_and()?;
            left = logical(NodeType::Or, "||", left, right, loc)?;
        }

        Ok(left)
    }

    /// Parse logical AND (&&)
    fn parse_logical_and(&mut self) -> Result<Operand, ParseError> {
        let mut left = self.parse_equality()?;

        loop {
            let loc = self.current_location();
            if !self.match_operator("&&") {
                break;
            }
            let right = self.parse_equality()?;
            left = logical(NodeType::And, "&&", left, right, loc)?;
        }

        Ok(left)
    }

    /// Parse equality (== !=)
    fn parse_equality(&mut self) -> Result<Operand, ParseError> {
        let mut left = self.parse_relational()?;

        loop {
            let loc = self.current_location();
            let (kind, op) = if self.match_operator("==") {
                (NodeType::Eq, "==")
            } else if self.match_operator("!=") {
                (NodeType::Ne, "!=")
            } else {
                break;
            };

            let right = self.parse_relational()?;
            left = comparison(kind, op, left, right, loc)?;
        }

        Ok(left)
    }

    /// Parse relational (< <= > >=)
    fn parse_relational(&mut self) -> Result<Operand, ParseError> {
        let mut left = self.parse_additive()?;

        loop {
            let loc = self.current_location();
            let (kind, op) = if self.match_operator("<") {
                (NodeType::Lt, "<")
            } else if self.match_operator("<=") {
                (NodeType::Le, "<=")
            } else if self.match_operator(">") {
                (NodeType::Gt, ">")
            } else if self.match_operator(">=") {
                (NodeType::Ge, ">=")
            } else {
                break;
            };

            let right = self.parse_additive()?;
            left = comparison(kind, op, left, right, loc)?;
        }

        Ok(left)
    }

    /// Parse additive (+ -)
    fn parse_additive(&mut self) -> Result<Operand, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let loc = self.current_location();
            let (kind, op) = if self.match_operator("+") {
                (NodeType::Add, "+")
            } else if self.match_operator("-") {
                (NodeType::Sub, "-")
            } else {
                break;
            };

            let right = self.parse_multiplicative()?;
            left = arithmetic(kind, op, left, right, loc)?;
        }

        Ok(left)
    }

    /// Parse multiplicative (* / %)
    fn parse_multiplicative(&mut self) -> Result<Operand, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let loc = self.current_location();
            let (kind, op) = if self.match_operator("*") {
                (NodeType::Mul, "*")
            } else if self.match_operator("/") {
                (NodeType::Div, "/")
            } else if self.match_operator("%") {
                (NodeType::Rem, "%")
            } else {
                break;
            };

            let right = self.parse_unary()?;
            left = arithmetic(kind, op, left, right, loc)?;
        }

        Ok(left)
    }

    /// Parse unary (- ! cast)
    fn parse_unary(&mut self) -> Result<Operand, ParseError> {
        let loc = self.current_location();

        if self.match_operator("-") {
            return match self.parse_unary()? {
                // -literal is a negative literal, not a negation
                Operand::Pending(Pending::Literal(lit)) => {
                    Ok(Operand::Pending(Pending::Literal(PendingLiteral {
                        negative: !lit.negative,
                        ..lit
                    })))
                }
                Operand::Pending(pending) => Ok(Operand::Pending(Pending::Neg(Box::new(pending)))),
                Operand::Node(node) => {
                    let data_type = require_value(&node, "-", loc)?;
                    Ok(Operand::Node(
                        NodeBuilder::new(NodeType::Neg)
                            .data_type(data_type)
                            .child(node)
                            .build(),
                    ))
                }
            };
        }

        if self.match_operator("!") {
            let operand = self.parse_unary()?.freeze(Some(DataType::I32))?;
            expect_type(DataType::I32, operand.data_type(), "operand of '!'", loc)?;
            return Ok(Operand::Node(
                NodeBuilder::new(NodeType::Not)
                    .data_type(DataType::I32)
                    .child(operand)
                    .build(),
            ));
        }

        if self.is_cast() {
            return self.parse_cast();
        }

        self.parse_primary()
    }

    /// `(` followed by a type keyword and `)`
    fn is_cast(&self) -> bool {
        self.check_punct("(")
            && self.peek_ahead(1).is_some_and(|t| {
                t.kind == TokenKind::Keyword
                    && !is_statement_keyword(&t.text)
            })
            && self.peek_ahead(2).is_some_and(|t| t.is_punct(")"))
    }

    /// Parse cast: (type) unary
    ///
    /// A literal whose spelling fits the target is written directly in the
    /// target type, so `(float) 1` is a single `number` node. Anything else
    /// built from literals keeps its natural type under a `cast` node:
    /// `(int) 3.5` converts an `f64` literal, and `(double) (1 / 2)` converts
    /// an `i32` division.
    fn parse_cast(&mut self) -> Result<Operand, ParseError> {
        let loc = self.current_location();
        self.advance(); // consume '('
        let target = self.parse_declared_type()?;
        self.expect_punct(")", "after cast type")?;

        let node = match self.parse_unary()? {
            Operand::Pending(Pending::Literal(lit))
                if target.is_float() || !is_fractional_spelling(&lit.text) =>
            {
                return Ok(Operand::Node(Self::number_node(
                    &lit.text,
                    lit.negative,
                    target,
                    lit.location,
                )?));
            }
            Operand::Pending(pending) => {
                let natural = pending.natural_type();
                pending.build(natural)?
            }
            Operand::Node(node) => node,
        };

        if require_value(&node, "cast", loc)? == target {
            return Ok(Operand::Node(node));
        }

        Ok(Operand::Node(
            NodeBuilder::new(NodeType::Cast)
                .data_type(target)
                .child(node)
                .build(),
        ))
    }

    /// Parse primary (literals, variables, calls, parenthesized expressions)
    fn parse_primary(&mut self) -> Result<Operand, ParseError> {
        let token = self.peek();

        match token.kind {
            TokenKind::Number => {
                self.advance();
                Ok(Operand::Pending(Pending::Literal(PendingLiteral {
                    text: token.text.clone(),
                    negative: false,
                    location: token.location,
                })))
            }
            TokenKind::Identifier => {
                if self.peek_ahead(1).is_some_and(|t| t.is_punct("(")) {
                    return Ok(Operand::Node(self.parse_call()?));
                }
                self.advance();
                let symbol = self.symbols.lookup(&token.text, token.location)?;
                Ok(Operand::Node(
                    access_node(symbol, NodeType::LocalGet, NodeType::GlobalGet).build(),
                ))
            }
            TokenKind::Punctuation if token.text == "(" => {
                self.advance();
                let inner = self.parse_expression_operand()?;
                self.expect_punct(")", "after expression")?;
                Ok(inner)
            }
            _ => Err(self.syntax_error(format!("Expected expression, found {}", token))),
        }
    }

    /// Parse function call: name(args). Each argument is typed by the
    /// matching parameter.
    fn parse_call(&mut self) -> Result<Node, ParseError> {
        let (name, loc) = self.expect_identifier()?;
        self.advance(); // consume '('

        let signature = self.symbols.lookup_function(&name, loc)?.clone();
        let mut call = NodeBuilder::new(NodeType::Call)
            .name(name.as_str())
            .maybe_data_type(signature.return_type);

        let mut count = 0;
        if !self.check_punct(")") {
            loop {
                let Some(&param_type) = signature.params.get(count) else {
                    return Err(ParseError::TypeMismatch {
                        message: format!(
                            "too many arguments to '{}': expected {}",
                            name,
                            signature.params.len()
                        ),
                        location: self.current_location(),
                    });
                };
                let context = format!("argument {} of '{}'", count + 1, name);
                call.push(self.parse_typed_expression(param_type, &context)?);
                count += 1;

                if !self.match_punct(",") {
                    break;
                }
            }
        }

        if count < signature.params.len() {
            return Err(ParseError::TypeMismatch {
                message: format!(
                    "too few arguments to '{}': expected {}, found {}",
                    name,
                    signature.params.len(),
                    count
                ),
                location: self.current_location(),
            });
        }

        self.expect_punct(")", "after function arguments")?;

        Ok(call.build())
    }

    /// Typed `number` node from a literal spelling
    pub(crate) fn number_node(
        text: &str,
        negative: bool,
        data_type: DataType,
        location: SourceLocation,
    ) -> Result<Node, ParseError> {
        let value = literal_value(text, negative, data_type, location)?;
        Ok(NodeBuilder::new(NodeType::Number)
            .value(value)
            .data_type(data_type)
            .build())
    }
}
