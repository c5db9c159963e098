// Integration tests for the parser and resolver

use stackc::{parse, tokenize, DataType, ErrorKind, Node, NodeType, NodeValue, ParseError};

fn parse_source(source: &str) -> Result<Node, ParseError> {
    let tokens = tokenize(source).expect("Tokenizing failed");
    parse(&tokens)
}

/// Statements of the named function's body
fn body_of<'a>(module: &'a Node, name: &str) -> &'a [Node] {
    module
        .nodes()
        .iter()
        .find(|n| n.kind() == NodeType::Function && n.name() == Some(name))
        .map(|f| f.nodes()[1].nodes())
        .expect("function not found")
}

#[test]
fn test_float_return_literal() {
    let module = parse_source("float foo() { return 3.14; }").expect("Parsing failed");

    let function = &module.nodes()[0];
    assert_eq!(function.kind(), NodeType::Function);
    assert_eq!(function.name(), Some("foo"));
    assert_eq!(function.data_type(), Some(DataType::F32));

    let ret = &body_of(&module, "foo")[0];
    assert_eq!(ret.kind(), NodeType::Return);
    assert_eq!(ret.name(), Some("foo"));
    assert_eq!(ret.data_type(), Some(DataType::F32));

    let literal = &ret.nodes()[0];
    assert_eq!(literal.kind(), NodeType::Number);
    assert_eq!(literal.value(), Some(&NodeValue::Float(3.14)));
    assert_eq!(literal.data_type(), Some(DataType::F32));
}

#[test]
fn test_global_read() {
    let module = parse_source("int bar = 42; int foo() { return bar; }").expect("Parsing failed");

    let global = &module.nodes()[0];
    assert_eq!(global.kind(), NodeType::GlobalVar);
    assert_eq!(global.name(), Some("bar"));
    assert_eq!(global.data_type(), Some(DataType::I32));
    assert_eq!(global.nodes()[0].value(), Some(&NodeValue::Int(42)));
    assert_eq!(global.nodes()[0].data_type(), Some(DataType::I32));

    let get = &body_of(&module, "foo")[0].nodes()[0];
    assert_eq!(get.kind(), NodeType::GlobalGet);
    assert_eq!(get.name(), Some("bar"));
    assert_eq!(get.data_type(), Some(DataType::I32));
}

#[test]
fn test_const_global_read() {
    let module =
        parse_source("const int bar = 42; int foo() { return bar; }").expect("Parsing failed");
    let get = &body_of(&module, "foo")[0].nodes()[0];
    assert_eq!(get.kind(), NodeType::GlobalGet);
    assert_eq!(get.data_type(), Some(DataType::I32));
}

#[test]
fn test_parameter_read() {
    let module = parse_source("int foo(int bar) { return bar; }").expect("Parsing failed");

    let params = &module.nodes()[0].nodes()[0];
    assert_eq!(params.nodes()[0].kind(), NodeType::Parameter);
    assert_eq!(params.nodes()[0].name(), Some("bar"));

    let get = &body_of(&module, "foo")[0].nodes()[0];
    assert_eq!(get.kind(), NodeType::LocalGet);
    assert_eq!(get.name(), Some("bar"));
}

#[test]
fn test_local_read() {
    let module = parse_source("int foo() { int bar; return bar; }").expect("Parsing failed");
    let stmts = body_of(&module, "foo");

    assert_eq!(stmts[0].kind(), NodeType::LocalVar);
    assert_eq!(stmts[0].data_type(), Some(DataType::I32));
    assert!(stmts[0].nodes().is_empty());
    assert_eq!(stmts[1].nodes()[0].kind(), NodeType::LocalGet);
}

#[test]
fn test_shadowing() {
    let module = parse_source(
        "long bar = 1;
         long param(long bar) { return bar; }
         long local() { long bar = 2; return bar; }
         long global() { return bar; }",
    )
    .expect("Parsing failed");

    assert_eq!(body_of(&module, "param")[0].nodes()[0].kind(), NodeType::LocalGet);
    assert_eq!(body_of(&module, "local")[1].nodes()[0].kind(), NodeType::LocalGet);
    assert_eq!(body_of(&module, "global")[0].nodes()[0].kind(), NodeType::GlobalGet);
}

#[test]
fn test_assignments() {
    let module = parse_source(
        "double total = 0;
         void add(double amount) { double scaled; scaled = amount * 2; total = total + scaled; }",
    )
    .expect("Parsing failed");
    let stmts = body_of(&module, "add");

    assert_eq!(stmts[1].kind(), NodeType::LocalSet);
    assert_eq!(stmts[1].data_type(), Some(DataType::F64));
    assert_eq!(stmts[2].kind(), NodeType::GlobalSet);
    assert_eq!(stmts[2].name(), Some("total"));
    assert_eq!(stmts[2].data_type(), Some(DataType::F64));
}

#[test]
fn test_error_categories() {
    let cases = [
        ("int x; int x;", ErrorKind::DuplicateSymbol),
        ("int f(int a) { int a; return a; }", ErrorKind::DuplicateSymbol),
        ("const int k = 1; void f() { k = 2; }", ErrorKind::ConstAssignment),
        ("int f() { return y; }", ErrorKind::UndeclaredSymbol),
        ("int f() { return 1.5; }", ErrorKind::TypeMismatch),
        ("float f() { long n; return n; }", ErrorKind::TypeMismatch),
        ("char f() { return 1; }", ErrorKind::UnknownType),
        ("int f() { return 1 }", ErrorKind::Syntax),
    ];

    for (source, expected) in cases {
        let err = parse_source(source).expect_err(source);
        assert_eq!(err.kind(), expected, "{source}: {err}");
    }
}

#[test]
fn test_error_location_and_message() {
    let err = parse_source("int f() {\n  return missing;\n}").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UndeclaredSymbol);
    assert_eq!(err.location().line, 2);
    assert_eq!(err.location().column, 10);
    assert!(err.to_string().contains("missing"));
}

#[test]
fn test_json_shape() {
    let module = parse_source("int bar = 42;").expect("Parsing failed");
    let json = serde_json::to_value(&module).expect("Serialization failed");

    assert_eq!(json["type"], "module");
    let global = &json["nodes"][0];
    assert_eq!(global["type"], "globalVar");
    assert_eq!(global["value"], "bar");
    assert_eq!(global["dataType"], "i32");
    assert_eq!(global["nodes"][0]["type"], "number");
    assert_eq!(global["nodes"][0]["value"], 42);
}

#[test]
fn test_outline() {
    let module = parse_source("int foo(int bar) { return bar + 1; }").expect("Parsing failed");
    let outline = module.to_string();
    let lines: Vec<&str> = outline.lines().collect();

    assert_eq!(lines[0], "module");
    assert_eq!(lines[1], "  function foo : i32");
    assert!(lines.contains(&"          localGet bar : i32"));
    assert!(lines.contains(&"          number 1 : i32"));
}
