//! Source parser, resolver and type propagator
//!
//! This module turns a token stream into a typed, resolved tree:
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parsing (tokens → typed tree)
//! - [`ast`]: Tree node definitions
//! - [`symbols`]: Module and function scopes
//! - [`types`]: Machine value types and literal conversion
//! - [`errors`]: Parse error categories
//!
//! # Supported Language
//!
//! - Types: `int`, `long`, `float`, `double` (mapped to `i32`, `i64`, `f32`,
//!   `f64`), plus `void` as a function return type
//! - Top level: global variables, `const` globals, function definitions
//! - Statements: local declarations, assignments, `if`, `while`,
//!   `do-while`, `break`, `continue`, `return`
//! - Expressions: arithmetic, comparison, logical, casts, function calls
//!
//! # Parser Implementation
//!
//! Hand-written single-pass recursive descent. Every identifier is resolved
//! and every node typed as it is built, so the tree can be lowered to stack
//! machine instructions without another walk.

pub mod ast;
pub mod errors;
pub mod lexer;
pub mod parse;
pub mod symbols;
pub mod types;

mod declarations;
mod expressions;
mod statements;

pub use ast::{Node, NodeBuilder, NodeType, NodeValue, SourceLocation};
pub use errors::{ErrorKind, ParseError};
pub use lexer::{tokenize, LexError, Token, TokenKind};
pub use parse::parse;
pub use types::DataType;
