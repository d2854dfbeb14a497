use std::rc::Rc;

use pyrite::interpreter::Statement;
use pyrite::parser::{Parser, ParserError, ParserErrorKind};

fn parse(source: &str) -> Result<Statement, ParserError> {
    Parser::new(source).and_then(|parser| parser.parse())
}

fn parse_error(source: &str, test_name: &str) -> ParserError {
    parse(source).expect_err(&format!("Expected {test_name} to fail parsing."))
}

#[test]
fn simple_program_shape() {
    let program = parse("x = 1\nprint x\n").expect("Program is expected to parse.");
    let Statement::Compound { statements } = program else {
        panic!("The root is always a compound statement.");
    };
    assert_eq!(statements.len(), 2);
    assert!(matches!(
        &statements[0],
        Statement::Assignment { name, .. } if name == "x"
    ));
    assert!(matches!(
        &statements[1],
        Statement::Print { args } if args.len() == 1
    ));
}

#[test]
fn dotted_target_becomes_field_assignment() {
    let program = parse("p.x = 1\n").expect("Program is expected to parse.");
    let Statement::Compound { statements } = program else {
        panic!("The root is always a compound statement.");
    };
    let Statement::FieldAssignment { object, field, .. } = &statements[0] else {
        panic!("Expected a field assignment.");
    };
    assert_eq!(field, "x");
    assert!(matches!(
        object.as_ref(),
        Statement::VariableValue { dotted_ids } if dotted_ids.len() == 1
    ));
}

#[test]
fn construction_references_the_declared_class() {
    let source = "class A:\n  def m():\n    return 1\na = A()\n";
    let program = parse(source).expect("Program is expected to parse.");
    let Statement::Compound { statements } = program else {
        panic!("The root is always a compound statement.");
    };
    let Statement::ClassDefinition { class: declared } = &statements[0] else {
        panic!("Expected a class definition.");
    };
    let Statement::Assignment { value, .. } = &statements[1] else {
        panic!("Expected an assignment.");
    };
    let Statement::NewInstance { class, args } = value.as_ref() else {
        panic!("Expected a construction.");
    };
    assert!(Rc::ptr_eq(declared, class));
    assert_eq!(args.as_ref().map(Vec::len), Some(0));
}

#[test]
fn str_builtin_becomes_stringify() {
    let program = parse("y = str(5)\n").expect("Program is expected to parse.");
    let Statement::Compound { statements } = program else {
        panic!("The root is always a compound statement.");
    };
    let Statement::Assignment { value, .. } = &statements[0] else {
        panic!("Expected an assignment.");
    };
    assert!(matches!(value.as_ref(), Statement::Stringify { .. }));
}

#[test]
fn dotted_call_becomes_method_call() {
    let program = parse("a.b.c(1)\n").expect("Program is expected to parse.");
    let Statement::Compound { statements } = program else {
        panic!("The root is always a compound statement.");
    };
    let Statement::MethodCall {
        object,
        method,
        args,
    } = &statements[0]
    else {
        panic!("Expected a method call.");
    };
    assert_eq!(method, "c");
    assert_eq!(args.len(), 1);
    assert!(matches!(
        object.as_ref(),
        Statement::VariableValue { dotted_ids } if dotted_ids.len() == 2
    ));
}

#[test]
fn invalid_assignment_target() {
    let error = parse_error("1 = 2\n", "number target");
    assert_eq!(error.kind, ParserErrorKind::InvalidAssignmentTarget);
}

#[test]
fn construction_of_unknown_class() {
    let error = parse_error("a = A()\n", "unknown class");
    assert_eq!(error.kind, ParserErrorKind::UnknownClass("A".into()));
    assert_eq!(error.line, 1);
}

#[test]
fn unknown_parent_class() {
    let error = parse_error("class B(A):\n  def m():\n    return 1\n", "unknown parent");
    assert_eq!(error.kind, ParserErrorKind::UnknownClass("A".into()));
}

#[test]
fn missing_colon_after_if() {
    let error = parse_error("if x\n  print x\n", "missing colon");
    assert!(matches!(
        error.kind,
        ParserErrorKind::UnexpectedToken { expected: "`:`", .. }
    ));
}

#[test]
fn class_body_allows_only_methods() {
    let error = parse_error("class A:\n  x = 1\n", "non-def in class body");
    assert!(matches!(
        error.kind,
        ParserErrorKind::UnexpectedToken {
            expected: "`def`",
            ..
        }
    ));
}

#[test]
fn error_reports_the_offending_line() {
    let error = parse_error("x = 1\ny = )\n", "line number");
    assert_eq!(error.line, 2);
    assert!(matches!(error.kind, ParserErrorKind::NonExpression(_)));
}

#[test]
fn lexer_failure_surfaces_as_parse_error() {
    let error = parse_error(" x = 1\n", "lexical error");
    assert!(matches!(error.kind, ParserErrorKind::Lexical(_)));
}
