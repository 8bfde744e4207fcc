// tests/round_trip_tests.rs
//! Round-trip tests: printing a parsed tree gives back the exact source,
//! whitespace, comments, line endings and malformed text included.

mod test_harness;

use gdscript::*;
use test_harness::TestHarness;

fn assert_round_trip(source: &str) -> ClassDeclaration {
    let class = gdscript::parse(source)
        .unwrap_or_else(|e| panic!("Failed to parse {:?}: {}", source, e));
    assert_eq!(class.to_string(), source);
    class
}

#[test]
fn test_all_scripts_round_trip() {
    let harness = TestHarness::new();
    for name in ["player.gd", "control_flow.gd", "legacy.gd"] {
        harness.load_and_parse(name).assert_round_trip();
    }
}

#[test]
fn test_scripts_with_crlf() {
    let harness = TestHarness::new();
    let source = harness.load("player.gd").replace('\n', "\r\n");
    let class = assert_round_trip(&source);
    assert!(!class.has_invalid_tokens());
    assert_eq!(class.methods().count(), 3);
}

#[test]
fn test_space_indentation() {
    let source = "func f():\n    var x = [\n        1,\n        2,\n    ]\n    return x\n";
    let class = assert_round_trip(source);
    assert!(!class.has_invalid_tokens());
    let body = class.methods().next().unwrap().statements().unwrap();
    assert_eq!(body.len(), 2);
}

#[test]
fn test_comments_everywhere() {
    let source = "# header\nextends Node # base\n\nvar a = 1 # one\n\nfunc f(): # trailing\n\tpass # body\n# column zero\n\tpass\n";
    let class = assert_round_trip(source);
    assert!(!class.has_invalid_tokens());
    assert_eq!(class.extends().unwrap().to_string(), "Node");
    let body = class.methods().next().unwrap().statements().unwrap();
    assert_eq!(body.len(), 2);
}

#[test]
fn test_blank_lines_with_spaces() {
    let source = "func f():\n\tpass  \n\n  \n\t\n\tpass\n\n";
    let class = assert_round_trip(source);
    let body = class.methods().next().unwrap().statements().unwrap();
    assert_eq!(body.len(), 2);
}

#[test]
fn test_strings() {
    let source = "var a = \"héllo 🌍\"\nvar b = 'single \\' quote'\nvar c = \"\"\"first\nsecond\"\"\"\nvar d = &\"name\"\nvar e = ^\"Path/To\"\n";
    let class = assert_round_trip(source);
    assert!(!class.has_invalid_tokens());
    assert_eq!(class.variables().count(), 5);
}

#[test]
fn test_unterminated_string() {
    let class = assert_round_trip("var a = \"open\nvar b = 1\n");
    assert_eq!(class.variables().count(), 2);
    let Some(Expression::String(s)) = class.variables().next().unwrap().initializer() else {
        panic!("expected a string");
    };
    assert!(!s.is_terminated());
}

#[test]
fn test_unclosed_bracket_at_end() {
    let class = assert_round_trip("var a = [1, 2");
    let Some(Expression::Array(list)) = class.variables().next().unwrap().initializer() else {
        panic!("expected an array");
    };
    assert!(!list.is_closed());
    assert_eq!(list.len(), 2);
}

#[test]
fn test_dangling_operator() {
    let class = assert_round_trip("var x = 1 +\nvar y\n");
    assert!(class.has_invalid_tokens());
    assert_eq!(class.variables().count(), 2);
}

#[test]
fn test_stray_lines_are_kept() {
    let class = assert_round_trip("var a = 1\n)\nnonsense words\nvar b = 2\n");
    let invalid: Vec<_> = class.invalid_tokens().iter().map(|t| t.as_str()).collect();
    assert_eq!(invalid, [")", "nonsense words"]);
    assert_eq!(class.variables().count(), 2);
}

#[test]
fn test_empty_and_whitespace_only() {
    for source in ["", "\n", "   ", "\n\n\t\n", "# only a comment"] {
        let class = assert_round_trip(source);
        assert_eq!(class.members().count(), 0);
    }
}

#[test]
fn test_reparse_is_stable() {
    let harness = TestHarness::new();
    for source in [
        harness.load("control_flow.gd"),
        "var a = 1\n)\nnonsense words\nfunc f(:\n\treturn [1,\n".to_string(),
    ] {
        let printed = gdscript::parse(&source).unwrap().to_string();
        let reprinted = gdscript::parse(&printed).unwrap().to_string();
        assert_eq!(reprinted, printed);
    }
}

#[test]
fn test_leading_dot_float() {
    let class = assert_round_trip("var a = .5\nvar b = x * .25e2\n");
    assert!(!class.has_invalid_tokens());
    let Some(Expression::Number(n)) = class.variables().next().unwrap().initializer() else {
        panic!("expected a number");
    };
    assert_eq!(n.kind(), NumberKind::Float);
    assert_eq!(n.value(), Some(0.5));
}

#[test]
fn test_pass_in_class_body() {
    let class = assert_round_trip("class Empty:\n\tpass\n\nvar x\n");
    assert!(!class.has_invalid_tokens());
    let inner = class.inner_classes().next().unwrap();
    assert!(matches!(inner.members().next(), Some(ClassMember::Pass)));
    assert_eq!(class.variables().count(), 1);
}

#[test]
fn test_line_continuation() {
    let source = "func f():\n\tvar x = 1 +\\\n\t\t2\n\tif a and \\\r\n\t\tb:\n\t\treturn \\\n\t\t\tx\nvar y = \\\n\t3\n";
    let class = assert_round_trip(source);
    assert!(!class.has_invalid_tokens());
    assert_eq!(class.variables().count(), 1);
    assert_eq!(class.members().count(), 2);
    let body = class.methods().next().unwrap().statements().unwrap();
    assert_eq!(body.len(), 2);

    let Some(Statement::Variable(var)) = body.first() else {
        panic!("expected a variable");
    };
    let sum = var.initializer().unwrap();
    assert_eq!(sum.as_dual().unwrap().kind(), DualOperatorKind::Add);
    assert_eq!(sum.to_source(), "1 +\\\n\t\t2");
}

#[test]
fn test_backslash_in_strings_and_comments() {
    let source = "var a = \"x\\\\\" # trailing \\\nvar b = r\"C:\\dir\\\"\"\n";
    let class = assert_round_trip(source);
    assert!(!class.has_invalid_tokens());
    assert_eq!(class.variables().count(), 2);
    let Some(Expression::String(s)) = class.variables().nth(1).unwrap().initializer() else {
        panic!("expected a string");
    };
    assert_eq!(s.prefix(), Some(StringPrefix::Raw));
}

/// Parenthesize an expression by its tree shape.
fn shape(expr: &Expression) -> String {
    match expr {
        Expression::Dual(d) => format!("({} {} {})", shape(d.left()), d.operator(), shape(d.right())),
        Expression::Single(s) => format!("({} {})", s.operator().as_str(), shape(s.operand())),
        Expression::Ternary(t) => format!(
            "({} if {} else {})",
            shape(t.true_value()),
            shape(t.condition()),
            shape(t.false_value())
        ),
        other => other.to_source().trim().to_string(),
    }
}

#[test]
fn test_operator_table_shapes() {
    let cases = [
        ("await f() is Node", "((await f()) is Node)"),
        ("a is Node and b is not C", "((a is Node) and (b is not C))"),
        ("-a ** 2", "(- (a ** 2))"),
        ("2 ** 3 ** 2", "((2 ** 3) ** 2)"),
        ("~a * b", "((~ a) * b)"),
        ("a + b * c - d", "((a + (b * c)) - d)"),
        ("1 << 2 + 3", "(1 << (2 + 3))"),
        ("a | b ^ c & d", "(a | (b ^ (c & d)))"),
        ("a & b == c", "((a & b) == c)"),
        ("a < b in c", "((a < b) in c)"),
        ("not a in b", "(not (a in b))"),
        ("a not in b or c and d", "((a not in b) or (c and d))"),
        ("a if c else b if d else e", "(a if c else (b if d else e))"),
        ("x or y if c else d", "((x or y) if c else d)"),
        ("x as Node if c else d", "(x as (Node if c else d))"),
        ("x = y as T", "(x = (y as T))"),
        ("a = b = c", "(a = (b = c))"),
    ];
    for (source, expected) in cases {
        let expr = gdscript::parse_expression(source)
            .unwrap_or_else(|e| panic!("Failed to parse {:?}: {}", source, e));
        assert_eq!(expr.to_source(), source);
        assert_eq!(shape(&expr), expected, "shape of {:?}", source);
    }
}
