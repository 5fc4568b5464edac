//! Integration tests for the whole scan-parse-evaluate pipeline

use monkey::ast::Statement;
use monkey::error::ErrorKind;
use monkey::object::{Object, NULL, TRUE};
use monkey::parser::parse;
use monkey::token::TokenKind;
use monkey::{run, run_in, run_with, Environment, Evaluator, Lexer};

fn canonical(source: &str) -> String {
    let (program, errors) = parse(Lexer::new(source));
    assert!(errors.is_empty(), "parse errors for {:?}: {:?}", source, errors);
    program.to_string()
}

#[test]
fn test_lexer_passes_are_repeatable() {
    let source = "let add = fn(a, b) { a + b }; if (add(1, 2) != 3) { !true } ~";
    let first = Lexer::new(source).tokenize();
    let second = Lexer::new(source).tokenize();

    assert_eq!(first, second);
    assert_eq!(first.last().map(|t| t.kind), Some(TokenKind::Eof));
}

#[test]
fn test_precedence_rendering() {
    assert_eq!(canonical("5 + 5 * 2;"), "(5 + (5 * 2))");
    assert_eq!(canonical("-a * b;"), "((-a) * b)");
}

#[test]
fn test_let_statement_shape() {
    let (program, errors) = parse(Lexer::new("let x = 5;"));
    assert!(errors.is_empty());
    assert_eq!(program.statements.len(), 1);

    let Statement::Let(stmt) = &program.statements[0] else {
        panic!("expected let statement, got {:?}", program.statements[0]);
    };
    assert_eq!(stmt.name.value, "x");
    assert_eq!(stmt.value.to_string(), "5");
}

#[test]
fn test_missing_name_reports_once() {
    let (program, errors) = parse(Lexer::new("let = 5;"));
    assert!(program.statements.is_empty());
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors[0].kind,
        ErrorKind::ExpectedToken { expected: TokenKind::Ident, .. }
    ));
}

#[test]
fn test_literal_evaluation() {
    assert_eq!(run("5").expect("parse failed"), Object::Integer(5));
    assert_eq!(run("true").expect("parse failed"), TRUE);
}

#[test]
fn test_conditional_evaluation() {
    assert_eq!(run("if (true) { 10 }").expect("parse failed"), Object::Integer(10));
    assert_eq!(run("if (false) { 10 }").expect("parse failed"), NULL);
}

#[test]
fn test_round_trip() {
    let programs = [
        "let x = 5;",
        "let y = -x * (3 + 4) / 2;",
        "return x == y;",
        "a; -b",
        "if (x < y) { x } else { y }",
        "if (ok) { let z = 1; z }",
        "let add = fn(a, b) { return a + b; }; add(1, add(2, 3))",
        "fn() { }()",
        "let f = fn(x) { fn(y) { x + y } }; f(1)(2)",
        "!(1 < 2) != false",
    ];

    for source in programs {
        let once = canonical(source);
        let twice = canonical(&once);
        assert_eq!(once, twice, "source: {}", source);
    }
}

#[test]
fn test_canonical_forms() {
    assert_eq!(canonical("if (x < y) { x } else { y }"), "if (x < y) { x } else { y }");
    assert_eq!(canonical("let f = fn(a,b){a+b};"), "let f = fn(a, b) { (a + b) };");
    assert_eq!(canonical("a\n-b"), "(a - b)");
    assert_eq!(canonical("a;\n-b"), "a; (-b)");
}

#[test]
fn test_error_propagation() {
    let error = run("1 + true").expect("parse failed");
    assert_eq!(error, Object::error("type mismatch: INTEGER + BOOLEAN"));

    let compounded = run("(1 + true) + 5").expect("parse failed");
    assert_eq!(compounded, error);
}

#[test]
fn test_parse_errors_carry_source() {
    let errors = run("let x = 1;\nlet = 2;").expect_err("should not parse");
    assert_eq!(errors.len(), 1);

    let rendered = errors.to_string();
    assert!(rendered.starts_with("[line 2:5] Error: expected next token to be IDENT"));
    assert!(rendered.contains("let = 2;"));
}

#[test]
fn test_environment_persists_between_runs() {
    let env = Environment::new_env();
    assert_eq!(run_in("let double = fn(n) { n * 2 };", &env).expect("parse failed"), NULL);
    assert_eq!(run_in("let x = double(21);", &env).expect("parse failed"), NULL);
    assert_eq!(run_in("x", &env).expect("parse failed"), Object::Integer(42));
}

#[test]
fn test_illegal_characters_are_parse_errors() {
    let errors = run("let x = 5 $ 3;").expect_err("should not parse");
    assert!(errors.iter().any(|e| e.kind == ErrorKind::NoPrefixParse(TokenKind::Illegal)));
}

#[test]
fn test_runaway_recursion_is_an_error() {
    let result = run("let f = fn(x) { f(x) }; f(1)").expect("parse failed");
    assert_eq!(result, Object::error("stack overflow"));

    let result = run("let down = fn(n) { 1 + down(n - 1) }; down(100000)").expect("parse failed");
    assert_eq!(result, Object::error("stack overflow"));
}

#[test]
fn test_run_with_custom_depth() {
    let source = "let count = fn(n) { if (n == 0) { 0 } else { 1 + count(n - 1) } }; count(30)";
    let env = Environment::new_env();

    let shallow = run_with(source, &env, &mut Evaluator::with_max_depth(16)).expect("parse failed");
    assert_eq!(shallow, Object::error("stack overflow"));

    let result = run(source).expect("parse failed");
    assert_eq!(result, Object::Integer(30));
}
