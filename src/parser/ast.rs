// Typed node tree produced by the parser

use std::fmt;

use serde::Serialize;

use super::types::DataType;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Node tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    // Structure
    Module,
    Function,
    Parameters,
    Parameter,
    Body,
    Block,

    // Declarations
    GlobalVar,
    LocalVar,

    // Statements
    Return,
    If,
    While,
    DoWhile,
    Break,
    Continue,
    Expression,

    // Values
    Number,
    GlobalGet,
    GlobalSet,
    LocalGet,
    LocalSet,
    Call,
    Cast,

    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
    // Unary
    Neg,
    Not,
}

impl NodeType {
    /// Tag name as it appears in serialized trees
    pub fn name(self) -> &'static str {
        match self {
            NodeType::Module => "module",
            NodeType::Function => "function",
            NodeType::Parameters => "parameters",
            NodeType::Parameter => "parameter",
            NodeType::Body => "body",
            NodeType::Block => "block",
            NodeType::GlobalVar => "globalVar",
            NodeType::LocalVar => "localVar",
            NodeType::Return => "return",
            NodeType::If => "if",
            NodeType::While => "while",
            NodeType::DoWhile => "doWhile",
            NodeType::Break => "break",
            NodeType::Continue => "continue",
            NodeType::Expression => "expression",
            NodeType::Number => "number",
            NodeType::GlobalGet => "globalGet",
            NodeType::GlobalSet => "globalSet",
            NodeType::LocalGet => "localGet",
            NodeType::LocalSet => "localSet",
            NodeType::Call => "call",
            NodeType::Cast => "cast",
            NodeType::Add => "add",
            NodeType::Sub => "sub",
            NodeType::Mul => "mul",
            NodeType::Div => "div",
            NodeType::Rem => "rem",
            NodeType::Eq => "eq",
            NodeType::Ne => "ne",
            NodeType::Lt => "lt",
            NodeType::Le => "le",
            NodeType::Gt => "gt",
            NodeType::Ge => "ge",
            NodeType::And => "and",
            NodeType::Or => "or",
            NodeType::Neg => "neg",
            NodeType::Not => "not",
        }
    }

    /// True for the comparison operators, whose result is always `i32`
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            NodeType::Eq
                | NodeType::Ne
                | NodeType::Lt
                | NodeType::Le
                | NodeType::Gt
                | NodeType::Ge
        )
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Literal or name carried by a node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NodeValue {
    Name(String),
    Int(i64),
    Float(f64),
}

impl fmt::Display for NodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeValue::Name(name) => f.write_str(name),
            NodeValue::Int(n) => write!(f, "{}", n),
            NodeValue::Float(x) => write!(f, "{:?}", x),
        }
    }
}

/// A node of the typed tree.
///
/// Nodes are only created through [`NodeBuilder`] and are never mutated once
/// built; every child has exactly one parent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    #[serde(rename = "type")]
    kind: NodeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<NodeValue>,
    #[serde(rename = "dataType", skip_serializing_if = "Option::is_none")]
    data_type: Option<DataType>,
    nodes: Vec<Node>,
}

impl Node {
    pub fn kind(&self) -> NodeType {
        self.kind
    }

    pub fn value(&self) -> Option<&NodeValue> {
        self.value.as_ref()
    }

    pub fn data_type(&self) -> Option<DataType> {
        self.data_type
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The name carried by declaration, get/set, call and return nodes
    pub fn name(&self) -> Option<&str> {
        match &self.value {
            Some(NodeValue::Name(name)) => Some(name),
            _ => None,
        }
    }

    /// Child at `index`, if present
    pub fn child(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Total number of nodes in this subtree, including `self`
    pub fn count(&self) -> usize {
        1 + self.nodes.iter().map(Node::count).sum::<usize>()
    }

    fn write_outline(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{:indent$}{}", "", self.kind, indent = depth * 2)?;
        if let Some(value) = &self.value {
            write!(f, " {}", value)?;
        }
        if let Some(data_type) = self.data_type {
            write!(f, " : {}", data_type)?;
        }
        writeln!(f)?;
        for child in &self.nodes {
            child.write_outline(f, depth + 1)?;
        }
        Ok(())
    }
}

/// Indented outline, one node per line: `tag [value] [: type]`
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_outline(f, 0)
    }
}

/// Accumulates the parts of a [`Node`] before freezing it.
#[derive(Debug)]
pub struct NodeBuilder {
    kind: NodeType,
    value: Option<NodeValue>,
    data_type: Option<DataType>,
    nodes: Vec<Node>,
}

impl NodeBuilder {
    pub fn new(kind: NodeType) -> Self {
        Self {
            kind,
            value: None,
            data_type: None,
            nodes: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.value = Some(NodeValue::Name(name.into()));
        self
    }

    pub fn value(mut self, value: NodeValue) -> Self {
        self.value = Some(value);
        self
    }

    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    pub fn maybe_data_type(mut self, data_type: Option<DataType>) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn child(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn maybe_child(mut self, node: Option<Node>) -> Self {
        self.nodes.extend(node);
        self
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn build(self) -> Node {
        Node {
            kind: self.kind,
            value: self.value,
            data_type: self.data_type,
            nodes: self.nodes,
        }
    }
}
