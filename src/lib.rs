//! # Introduction
//!
//! stackc is the front end of a compiler for a small C-like language that
//! targets a typed stack machine. It parses a token stream, resolves every
//! identifier to a global, a parameter or a local, and assigns a machine
//! value type to every value-producing node, all in a single pass.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Parser + Resolver → Typed tree → (code generator)
//! ```
//!
//! 1. [`parser::lexer`] tokenises the source. Any producer of the same
//!    [`Token`] classification may stand in for it.
//! 2. [`parse`] builds the tree. Names are looked up in a two-level
//!    [`parser::symbols::SymbolTable`] and literals take their type from the
//!    context they appear in.
//! 3. The resulting [`Node`] tree can be printed as an outline through its
//!    `Display` impl or serialized with serde.
//!
//! ## Example
//!
//! ```
//! use stackc::{parse, tokenize, DataType, NodeType};
//!
//! let tokens = tokenize("int bar = 42; int foo() { return bar; }").unwrap();
//! let module = parse(&tokens).unwrap();
//!
//! let ret = &module.nodes()[1].nodes()[1].nodes()[0];
//! assert_eq!(ret.kind(), NodeType::Return);
//! assert_eq!(ret.nodes()[0].kind(), NodeType::GlobalGet);
//! assert_eq!(ret.nodes()[0].data_type(), Some(DataType::I32));
//! ```

pub mod parser;

pub use parser::{
    parse, tokenize, DataType, ErrorKind, LexError, Node, NodeType, NodeValue, ParseError,
    SourceLocation, Token, TokenKind,
};
