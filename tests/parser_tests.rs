// tests/parser_tests.rs
//! Integration tests for the GDScript parser
//!
//! These tests parse complete scripts from `test_scripts/` and check that
//! all features work together and print back unchanged.

mod test_harness;

use gdscript::*;
use test_harness::TestHarness;

#[test]
fn test_player_script() {
    let harness = TestHarness::new();
    let result = harness.load_and_parse("player.gd");

    result.assert_success();

    let counter = result.count();
    assert_eq!(counter.method_count, 3);
    assert_eq!(counter.lambda_count, 0);
    assert_eq!(counter.if_count, 2);
    assert_eq!(counter.get_node_count, 2);
    assert_eq!(counter.ternary_count, 1);
    assert_eq!(counter.return_count, 1, "getter body is walked");
    assert!(counter.call_count >= 10, "Should have many calls");
}

#[test]
fn test_control_flow_script() {
    let harness = TestHarness::new();
    let result = harness.load_and_parse("control_flow.gd");

    result.assert_success();

    let counter = result.count();
    assert_eq!(counter.lambda_count, 2);
    assert_eq!(counter.method_count, 6, "four methods and two lambdas");
    assert_eq!(counter.match_count, 1);
    assert_eq!(counter.for_count, 2);
    assert_eq!(counter.while_count, 1);
    assert_eq!(counter.if_count, 2);
    assert_eq!(counter.ternary_count, 1);
    assert_eq!(counter.return_count, 9);
}

#[test]
fn test_legacy_script() {
    let harness = TestHarness::new();
    let result = harness.load_and_parse("legacy.gd");

    result.assert_success();

    let class = &result.class;
    assert!(class.is_tool());
    let base = class.extends().unwrap();
    assert!(matches!(base, TypeNode::String(_)));
    assert_eq!(base.to_string(), "\"res://scripts/base.gd\"");

    let init = class.methods().next().unwrap();
    assert_eq!(init.name().unwrap().as_str(), "_init");
    let body: Vec<_> = init.statements().unwrap().items().collect();
    assert_eq!(body, [&Statement::Pass, &Statement::Pass, &Statement::Breakpoint]);
}

#[test]
fn test_match_cases() {
    let harness = TestHarness::new();
    let result = harness.load_and_parse("control_flow.gd");

    let classify = result
        .class
        .methods()
        .find(|m| m.name().is_some_and(|n| n.as_str() == "classify"))
        .unwrap();
    let Some(Statement::Match(m)) = classify.statements().unwrap().first() else {
        panic!("expected a match statement");
    };
    let cases: Vec<_> = m.cases().collect();
    assert_eq!(cases.len(), 5);
    assert_eq!(cases[0].patterns().count(), 2);
    assert!(matches!(cases[1].patterns().next(), Some(Expression::Array(_))));
    assert!(matches!(
        cases[2].patterns().next(),
        Some(Expression::Dictionary(_))
    ));
    assert!(cases[3].guard().is_some());
    assert!(cases[4].is_wildcard());
}

#[test]
fn test_multiline_lambda_in_local() {
    let harness = TestHarness::new();
    let result = harness.load_and_parse("control_flow.gd");

    let callbacks = result
        .class
        .methods()
        .find(|m| m.name().is_some_and(|n| n.as_str() == "callbacks"))
        .unwrap();
    let body: Vec<_> = callbacks.statements().unwrap().items().collect();
    assert_eq!(body.len(), 6);

    let adder = body[1].as_variable().unwrap();
    assert_eq!(adder.name().unwrap().as_str(), "adder");
    let Some(Expression::Lambda(lambda)) = adder.initializer() else {
        panic!("expected a lambda initializer");
    };
    assert_eq!(lambda.parameters().count(), 2);
    assert_eq!(lambda.statements().unwrap().len(), 1);

    // The statement after the lambda body is not swallowed by it.
    assert!(body[2].as_expression().and_then(Expression::as_call).is_some());
}

#[test]
fn test_every_statement_kind() {
    let source = "\
func f(items):
\tvar total = 0
\tfor item in items:
\t\tif item == null:
\t\t\tcontinue
\t\telif item < 0:
\t\t\tbreak
\t\telse:
\t\t\ttotal += item
\twhile total > 10:
\t\ttotal -= 1
\tmatch total:
\t\t_:
\t\t\tpass
\tbreakpoint
\t@warning_ignore(\"unused_variable\")
\tvar unused := 1
\treturn total
";
    let class = gdscript::parse(source).unwrap();
    assert_eq!(class.to_string(), source);
    assert!(!class.has_invalid_tokens());

    let body: Vec<_> = class
        .methods()
        .next()
        .unwrap()
        .statements()
        .unwrap()
        .items()
        .collect();
    assert_eq!(body.len(), 8);
    assert!(matches!(body[0], Statement::Variable(_)));
    assert!(matches!(body[1], Statement::For(_)));
    assert!(matches!(body[2], Statement::While(_)));
    assert!(matches!(body[3], Statement::Match(_)));
    assert_eq!(body[4], &Statement::Breakpoint);
    assert!(matches!(body[5], Statement::Attribute(_)));
    assert!(matches!(body[6], Statement::Variable(_)));
    assert!(matches!(body[7], Statement::Return(_)));
}

#[test]
fn test_statement_entry_point() {
    let stmt = gdscript::parse_statement("for i in range(3):\n\tprint(i)").unwrap();
    let Statement::For(for_stmt) = &stmt else {
        panic!("expected a for loop, got {stmt:?}");
    };
    assert_eq!(for_stmt.variable().unwrap().as_str(), "i");
    assert_eq!(for_stmt.statements().unwrap().len(), 1);
}

#[test]
fn test_expression_entry_point() {
    let expr = gdscript::parse_expression("1 + 2 * 3").unwrap();
    let add = expr.as_dual().unwrap();
    assert_eq!(add.kind(), DualOperatorKind::Add);
    assert_eq!(add.right().as_dual().unwrap().kind(), DualOperatorKind::Mul);

    let err = gdscript::parse_expression("1 + 2\nfoo").unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::UnexpectedRoot);
}
