// tests/parser_tests.rs

use jsonquery_lang::{Error, Options, Query, SyntaxErrorKind, Value, parse};
use rstest::rstest;
use serde_json::json;

fn parse_json(text: &str) -> serde_json::Value {
    parse(text, &Options::default())
        .unwrap_or_else(|e| panic!("failed to parse {:?}: {}", text, e))
        .to_json()
}

fn syntax_error(text: &str) -> (SyntaxErrorKind, usize) {
    match parse(text, &Options::default()) {
        Err(Error::Syntax(e)) => {
            assert_eq!(e.query, text);
            (e.kind, e.position)
        }
        other => panic!("Expected syntax error for {:?}, got {:?}", text, other),
    }
}

// ============================================================================
// Literals
// ============================================================================

#[rstest]
#[case("42", json!(42))]
#[case("-1.5e2", json!(-150.0))]
#[case("\"hello\"", json!("hello"))]
#[case("true", json!(true))]
#[case("false", json!(false))]
#[case("null", json!(null))]
fn test_parse_literals(#[case] text: &str, #[case] expected: serde_json::Value) {
    assert_eq!(parse_json(text), expected);
}

#[test]
fn test_integer_and_float_literals_differ() {
    let query = parse("2.0", &Options::default()).unwrap();
    assert!(matches!(query, Query::Literal(Value::Float(_))));

    let query = parse("2", &Options::default()).unwrap();
    assert!(matches!(query, Query::Literal(Value::Integer(2))));
}

// ============================================================================
// Property paths
// ============================================================================

#[rstest]
#[case(".name", json!(["get", "name"]))]
#[case(".address.city", json!(["get", "address", "city"]))]
#[case(".\"first name\"", json!(["get", "first name"]))]
#[case(".items.0", json!(["get", "items", "0"]))]
#[case(".a.\"b.c\".d", json!(["get", "a", "b.c", "d"]))]
fn test_parse_paths(#[case] text: &str, #[case] expected: serde_json::Value) {
    assert_eq!(parse_json(text), expected);
}

// ============================================================================
// Function calls, objects and arrays
// ============================================================================

#[rstest]
#[case("sum()", json!(["sum"]))]
#[case("sort(.age, \"desc\")", json!(["sort", ["get", "age"], "desc"]))]
#[case("sort( .age ,\"desc\" )", json!(["sort", ["get", "age"], "desc"]))]
#[case("filter(.age > 18)", json!(["filter", ["gt", ["get", "age"], 18]]))]
#[case("get()", json!(["get"]))]
fn test_parse_calls(#[case] text: &str, #[case] expected: serde_json::Value) {
    assert_eq!(parse_json(text), expected);
}

#[test]
fn test_parse_object() {
    assert_eq!(
        parse_json("{ name: .name, \"full name\": .a, 2: 3 }"),
        json!(["object", {"name": ["get", "name"], "full name": ["get", "a"], "2": 3}])
    );
    assert_eq!(parse_json("{}"), json!(["object", {}]));
}

#[test]
fn test_parse_array() {
    assert_eq!(parse_json("[1, .a, \"x\"]"), json!(["array", 1, ["get", "a"], "x"]));
    assert_eq!(parse_json("[ ]"), json!(["array"]));
}

#[test]
fn test_parse_multiline_query() {
    let text = ".friends\n  | filter(.city == \"New York\")\n  | sort(.age)\n  | pick(.name, .age)\n";
    assert_eq!(
        parse_json(text),
        json!([
            "pipe",
            ["get", "friends"],
            ["filter", ["eq", ["get", "city"], "New York"]],
            ["sort", ["get", "age"]],
            ["pick", ["get", "name"], ["get", "age"]]
        ])
    );
}

// ============================================================================
// Operators
// ============================================================================

#[rstest]
#[case("1 + 2 * 3", json!(["add", 1, ["multiply", 2, 3]]))]
#[case("(1 + 2) * 3", json!(["multiply", ["add", 1, 2], 3]))]
#[case("2 * 3 ^ 2", json!(["multiply", 2, ["pow", 3, 2]]))]
#[case("1 - 2 - 3", json!(["subtract", ["subtract", 1, 2], 3]))]
#[case("8 / 4 % 3", json!(["mod", ["divide", 8, 4], 3]))]
#[case(".a > 1 and .b < 2", json!(["and", ["gt", ["get", "a"], 1], ["lt", ["get", "b"], 2]]))]
#[case(".a == 1 or .b != 2", json!(["or", ["eq", ["get", "a"], 1], ["ne", ["get", "b"], 2]]))]
#[case(".a >= 1", json!(["gte", ["get", "a"], 1]))]
#[case(".a <= 1", json!(["lte", ["get", "a"], 1]))]
#[case(".x in [1, 2]", json!(["in", ["get", "x"], ["array", 1, 2]]))]
#[case(".x not in [1, 2]", json!(["not in", ["get", "x"], ["array", 1, 2]]))]
#[case("1 - -2", json!(["subtract", 1, -2]))]
#[case("1+2", json!(["add", 1, 2]))]
fn test_parse_operators(#[case] text: &str, #[case] expected: serde_json::Value) {
    assert_eq!(parse_json(text), expected);
}

#[test]
fn test_vararg_operators_collapse() {
    assert_eq!(
        parse_json(".a and .b and .c"),
        json!(["and", ["get", "a"], ["get", "b"], ["get", "c"]])
    );
    assert_eq!(
        parse_json("1 or 2 or 3 or 4"),
        json!(["or", 1, 2, 3, 4])
    );
}

#[test]
fn test_parentheses_stop_vararg_collapse() {
    assert_eq!(
        parse_json("(.a and .b) and .c"),
        json!(["and", ["and", ["get", "a"], ["get", "b"]], ["get", "c"]])
    );
    assert_eq!(
        parse_json(".a and (.b and .c)"),
        json!(["and", ["get", "a"], ["and", ["get", "b"], ["get", "c"]]])
    );
}

#[test]
fn test_only_a_leading_parenthesized_operand_is_protected() {
    // Once combined, the accumulated operand is no longer parenthesized
    assert_eq!(
        parse_json("(.a) | .b | .c"),
        json!(["pipe", ["get", "a"], ["get", "b"], ["get", "c"]])
    );
}

#[test]
fn test_different_operators_of_one_group_combine() {
    assert_eq!(
        parse_json("1 == 2 != 3"),
        json!(["ne", ["eq", 1, 2], 3])
    );
}

#[test]
fn test_parenthesized_chain_of_non_associative_operator() {
    assert_eq!(parse_json("(1 == 2) == 3"), json!(["eq", ["eq", 1, 2], 3]));
    assert_eq!(parse_json("2 ^ (3 ^ 2)"), json!(["pow", 2, ["pow", 3, 2]]));
}

// ============================================================================
// Errors
// ============================================================================

#[rstest]
#[case("", SyntaxErrorKind::ValueExpected, 0)]
#[case(".", SyntaxErrorKind::PropertyExpected, 1)]
#[case("sort(.age", SyntaxErrorKind::CharExpected(')'), 9)]
#[case("{a 1}", SyntaxErrorKind::CharExpected(':'), 3)]
#[case("{.a: 1}", SyntaxErrorKind::KeyExpected, 1)]
#[case("[1 2]", SyntaxErrorKind::CharExpected(','), 3)]
#[case("\"open", SyntaxErrorKind::ValueExpected, 0)]
#[case("\"a\\x\"", SyntaxErrorKind::InvalidString, 0)]
#[case("1 2", SyntaxErrorKind::UnexpectedPart("2".to_string()), 2)]
#[case("1 == 2 == 3", SyntaxErrorKind::UnexpectedPart("== 3".to_string()), 7)]
#[case("2 ^ 3 ^ 2", SyntaxErrorKind::UnexpectedPart("^ 2".to_string()), 6)]
#[case("1 +", SyntaxErrorKind::ValueExpected, 3)]
fn test_syntax_errors(
    #[case] text: &str,
    #[case] kind: SyntaxErrorKind,
    #[case] position: usize,
) {
    assert_eq!(syntax_error(text), (kind, position));
}

#[test]
fn test_error_message_includes_position() {
    let err = parse("1 2", &Options::default()).unwrap_err();
    assert_eq!(err.to_string(), "Syntax error: Unexpected part '2' (pos: 2)");
}

#[test]
fn test_nesting_limit() {
    let options = Options {
        max_depth: 8,
        ..Options::default()
    };

    let shallow = format!("{}1{}", "[".repeat(7), "]".repeat(7));
    assert!(parse(&shallow, &options).is_ok());

    let deep = format!("{}1{}", "[".repeat(8), "]".repeat(8));
    assert!(matches!(
        parse(&deep, &options),
        Err(Error::Syntax(e)) if e.kind == SyntaxErrorKind::RecursionLimitExceeded { limit: 8 }
    ));
}

#[test]
fn test_long_left_associative_chain_hits_limit() {
    let text = format!("1{}", " - 1".repeat(50_000));
    assert!(matches!(
        parse(&text, &Options::default()),
        Err(Error::Syntax(e)) if e.kind == SyntaxErrorKind::RecursionLimitExceeded { limit: 128 }
    ));
}

#[test]
fn test_chain_height_counts_against_limit() {
    let options = Options {
        max_depth: 4,
        ..Options::default()
    };

    // four nested subtractions
    assert!(parse("1 - 1 - 1 - 1 - 1", &options).is_ok());
    assert!(matches!(
        parse("1 - 1 - 1 - 1 - 1 - 1", &options),
        Err(Error::Syntax(e)) if e.kind == SyntaxErrorKind::RecursionLimitExceeded { limit: 4 }
    ));
    // the chain inside a call argument adds to the call's own level
    assert!(matches!(
        parse("abs(1 - 1 - 1 - 1 - 1)", &options),
        Err(Error::Syntax(e)) if e.kind == SyntaxErrorKind::RecursionLimitExceeded { limit: 4 }
    ));
}

#[test]
fn test_long_vararg_chain_stays_flat() {
    let text = format!(".a{}", " | .a".repeat(50_000));
    match parse(&text, &Options::default()).unwrap() {
        Query::Call { name, args } => {
            assert_eq!(name, "pipe");
            assert_eq!(args.len(), 50_001);
        }
        other => panic!("Expected pipe call, got {:?}", other),
    }
}
