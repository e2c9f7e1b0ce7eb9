// ABOUTME: End-to-end tests driving the interpreter over whole programs

use glint::error::GlintError;
use glint::interpreter;
use glint::value::Value;

fn run(source: &str) -> Result<Value, GlintError> {
    interpreter::run("test", source)
}

fn run_output(source: &str) -> String {
    interpreter::run_capturing("test", source).unwrap().1
}

#[test]
fn arithmetic_expression_statement_returns_its_value() {
    let value = run("1 * 2 - 3 / -5 + 0.8;").unwrap();
    assert!(matches!(value, Value::Number(n) if (n - 3.4000000000000004).abs() < 1e-9));
}

#[test]
fn while_loop_prints_each_iteration() {
    let output = run_output("var x = 1; while (x < 5) { print x; x = x + 1; }");
    assert_eq!(output, "1.0\n2.0\n3.0\n4.0\n");
}

#[test]
fn for_loop_prints_each_iteration() {
    let output = run_output("for (var x = 0; x < 5; x = x + 1) { print x; }");
    assert_eq!(output, "0.0\n1.0\n2.0\n3.0\n4.0\n");
}

#[test]
fn function_call_concatenates_strings() {
    let output = run_output(
        r#"fun sayHi(first, last) { print "Hi, " + first + " " + last + "!"; } sayHi("Dear", "Reader");"#,
    );
    assert_eq!(output, "Hi, Dear Reader!\n");
}

#[test]
fn recursive_function_prints_descending_then_ascending() {
    let output = run_output("fun count(n) { if (n > 1) count(n - 1); print n; } count(3);");
    assert_eq!(output, "1.0\n2.0\n3.0\n");
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    let err = run("2 / 0;").unwrap_err();
    match err {
        GlintError::Runtime { detail, .. } => assert_eq!(detail, glint::error::DIVISION_BY_ZERO),
        other => panic!("expected a runtime error, got {other:?}"),
    }
}

#[test]
fn string_plus_number_is_a_type_error() {
    let err = run(r#""a" + 1;"#).unwrap_err();
    match err {
        GlintError::Runtime { detail, .. } => assert_eq!(detail, glint::error::BINARY_OPS_TYPE_ERROR),
        other => panic!("expected a runtime error, got {other:?}"),
    }
}

#[test]
fn arity_mismatch_reports_expected_and_actual_counts() {
    let err = run("fun add(a,b,c){print a+b+c;} add(1,2);").unwrap_err();
    match err {
        GlintError::Runtime { detail, .. } => {
            assert_eq!(detail, "Expected 3 arguments, but got 2.");
        }
        other => panic!("expected a runtime error, got {other:?}"),
    }
}

#[test]
fn and_short_circuits_without_evaluating_the_right_operand() {
    let output = run_output("var x=1; false and (x=2); print x;");
    assert_eq!(output, "1.0\n");
}

#[test]
fn or_short_circuits_and_evaluates_the_right_operand_when_left_is_falsy() {
    let output = run_output("var x=1; false or (x=2); print x;");
    assert_eq!(output, "2.0\n");
}

#[test]
fn block_shadowing_does_not_leak_into_outer_scope() {
    run("var a=1; { var b=-1; print a*b; }").unwrap();
    let err = run("var a=1; { var b=-1; print a*b; } print b;").unwrap_err();
    match err {
        GlintError::Runtime { detail, .. } => assert_eq!(detail, "Undefined variable 'b'"),
        other => panic!("expected a runtime error, got {other:?}"),
    }
}

#[test]
fn redefining_a_name_in_the_same_scope_is_a_runtime_error() {
    let err = run("var a; var a = 2;").unwrap_err();
    match err {
        GlintError::Runtime { detail, .. } => assert_eq!(detail, "Variable 'a' already defined"),
        other => panic!("expected a runtime error, got {other:?}"),
    }
}

#[test]
fn illegal_character_is_reported_at_the_lexer_stage() {
    let err = run("1 @ 2;").unwrap_err();
    assert!(matches!(err, GlintError::IllegalChar { .. }));
}

#[test]
fn unterminated_string_is_an_invalid_syntax_error() {
    let err = run("\"abc").unwrap_err();
    assert!(matches!(err, GlintError::InvalidSyntax { .. }));
}

#[test]
fn calling_a_non_callable_value_is_a_runtime_error() {
    let err = run("var x = 1; x();").unwrap_err();
    match err {
        GlintError::Runtime { detail, .. } => assert_eq!(detail, glint::error::CALLS_RESTRICTION),
        other => panic!("expected a runtime error, got {other:?}"),
    }
}

#[test]
fn clock_native_function_returns_a_number() {
    run("var t = clock(); print t;").unwrap();
}

#[test]
fn parenthesized_expression_round_trips_to_the_same_value() {
    let bare = run("1 + 2 * 3;").unwrap();
    let parenthesized = run("(1 + 2 * 3);").unwrap();
    match (bare, parenthesized) {
        (Value::Number(a), Value::Number(b)) => assert_eq!(a, b),
        other => panic!("expected two matching numbers, got {other:?}"),
    }
}
