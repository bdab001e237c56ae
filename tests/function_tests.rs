// tests/function_tests.rs

use jsonquery_lang::{Error, Options, ReferenceError, RuntimeError, Value, evaluate};
use rstest::{fixture, rstest};
use serde_json::json;

fn run(data: &serde_json::Value, query: &str) -> Result<Value, Error> {
    evaluate(&Value::from(data.clone()), query, &Options::default())
}

#[fixture]
fn friends() -> serde_json::Value {
    json!([
        {"name": "Chris", "age": 23, "city": "New York"},
        {"name": "Emily", "age": 19, "city": "Atlanta"},
        {"name": "Joe", "age": 32, "city": "New York"},
        {"name": "Kevin", "age": 19, "city": "Atlanta"},
        {"name": "Michelle", "age": 27, "city": "Los Angeles"},
        {"name": "Robert", "age": 45, "city": "Manhattan"},
        {"name": "Sarah", "age": 31, "city": "New York"}
    ])
}

// ============================================================================
// Array functions
// ============================================================================

#[rstest]
#[case("size()", json!(7))]
#[case(".0.name", json!("Chris"))]
#[case("sort(.age) | map(.name)", json!(["Emily", "Kevin", "Chris", "Michelle", "Sarah", "Joe", "Robert"]))]
#[case("sort(.age, \"desc\") | map(.name)", json!(["Robert", "Joe", "Sarah", "Michelle", "Chris", "Emily", "Kevin"]))]
#[case("filter(.city == \"New York\") | map(.name)", json!(["Chris", "Joe", "Sarah"]))]
#[case("filter(.age > 30 and .city == \"New York\") | pick(.name)", json!([{"name": "Joe"}, {"name": "Sarah"}]))]
#[case("groupBy(.city) | keys()", json!(["New York", "Atlanta", "Los Angeles", "Manhattan"]))]
#[case("groupBy(.city) | .Atlanta | map(.name)", json!(["Emily", "Kevin"]))]
#[case("keyBy(.age) | .19.name", json!("Emily"))]
#[case("uniqBy(.city) | map(.name)", json!(["Chris", "Emily", "Michelle", "Robert"]))]
#[case("map(.age) | uniq() | size()", json!(6))]
#[case("map(.age) | sum()", json!(196))]
#[case("map(.age) | average()", json!(28))]
#[case("map(.age) | min()", json!(19))]
#[case("map(.age) | max()", json!(45))]
#[case("limit(2) | map(.name)", json!(["Chris", "Emily"]))]
#[case("reverse() | limit(1) | map(.name)", json!(["Sarah"]))]
#[case("map(.city) | uniq() | join(\", \")", json!("New York, Atlanta, Los Angeles, Manhattan"))]
#[case("filter(regex(.name, \"[A-E]\")) | map(.name)", json!(["Chris", "Emily"]))]
#[case("filter(regex(.city, \"new\", \"i\")) | size()", json!(3))]
#[case("map(substring(.name, 0, 3)) | limit(3)", json!(["Chr", "Emi", "Joe"]))]
#[case("filter(exists(.city)) | size()", json!(7))]
#[case("filter(.name in [\"Joe\", \"Sarah\"]) | map(.age)", json!([32, 31]))]
#[case("{ names: map(.name) | limit(2), total: size() }", json!({"names": ["Chris", "Emily"], "total": 7}))]
fn test_array_functions(
    friends: serde_json::Value,
    #[case] query: &str,
    #[case] expected: serde_json::Value,
) {
    assert_eq!(run(&friends, query).unwrap(), Value::from(expected), "query: {}", query);
}

#[test]
fn test_sort_orders_mixed_types_by_rank() {
    let data = json!([3, "b", true, null, 1.5, "a", false]);
    assert_eq!(
        run(&data, "sort()").unwrap(),
        Value::from(json!([false, true, 1.5, 3, "a", "b", null]))
    );
}

#[test]
fn test_flatten_one_level() {
    assert_eq!(
        run(&json!([1, [2, 3], [[4]]]), "flatten()").unwrap(),
        Value::from(json!([1, 2, 3, [4]]))
    );
}

// ============================================================================
// Object functions
// ============================================================================

#[rstest]
#[case("keys()", json!(["a", "b"]))]
#[case("values()", json!([1, 2]))]
#[case("mapValues(get() * 10)", json!({"a": 10, "b": 20}))]
#[case("mapKeys(\"x_\" + get())", json!({"x_a": 1, "x_b": 2}))]
#[case("mapObject({ key: .value, value: .key })", json!({"1": "a", "2": "b"}))]
#[case("size()", json!(2))]
#[case("exists(.a)", json!(true))]
#[case("exists(.c)", json!(false))]
#[case(".c.d", json!(null))]
fn test_object_functions(#[case] query: &str, #[case] expected: serde_json::Value) {
    let data = json!({"a": 1, "b": 2});
    assert_eq!(run(&data, query).unwrap(), Value::from(expected), "query: {}", query);
}

// ============================================================================
// Scalars
// ============================================================================

#[rstest]
#[case("1 + 2 * 3", json!(7))]
#[case("7 / 2", json!(3.5))]
#[case("6 / 3", json!(2))]
#[case("-7 % 3", json!(2))]
#[case("2 ^ 10", json!(1024))]
#[case("0.5 + 1", json!(1.5))]
#[case("1 / 0", json!(null))]
#[case("\"a\" - 1", json!(null))]
#[case("\"a\" + 1", json!("a1"))]
#[case("abs(-3)", json!(3))]
#[case("round(2.5)", json!(3))]
#[case("round(3.14159, 2)", json!(3.14))]
#[case("string(42)", json!("42"))]
#[case("number(\"3.5\")", json!(3.5))]
#[case("number(\"x\")", json!(null))]
#[case("split(\"a b\")", json!(["a", "b"]))]
#[case("if(1 > 2, \"yes\", \"no\")", json!("no"))]
#[case("not(1 == 1)", json!(false))]
#[case("1 == 1.0", json!(true))]
#[case("\"2\" > 1", json!(false))]
fn test_scalar_functions(#[case] query: &str, #[case] expected: serde_json::Value) {
    assert_eq!(run(&json!(null), query).unwrap(), Value::from(expected), "query: {}", query);
}

#[test]
fn test_size_of_string_counts_characters() {
    assert_eq!(run(&json!("héllo"), "size()").unwrap(), Value::Integer(5));
}

// ============================================================================
// Errors
// ============================================================================

#[rstest]
#[case("filter(.a)", RuntimeError::ArrayExpected)]
#[case("sort()", RuntimeError::ArrayExpected)]
#[case("sum()", RuntimeError::ArrayExpected)]
#[case("mapObject(1)", RuntimeError::ObjectExpected)]
#[case("map(.a) | keys()", RuntimeError::ArrayExpected)]
fn test_runtime_errors(#[case] query: &str, #[case] expected: RuntimeError) {
    assert_eq!(run(&json!({"a": 1}), query), Err(Error::Runtime(expected)));
}

#[test]
fn test_keys_require_object() {
    assert_eq!(
        run(&json!([1, 2]), "keys()"),
        Err(Error::Runtime(RuntimeError::ObjectExpected))
    );
}

#[rstest]
#[case("sort(.a, \"up\")", "sort")]
#[case("limit(.n)", "limit")]
#[case("regex(.a, \"(\")", "regex")]
#[case("regex(.a, \"x\", \"q\")", "regex")]
#[case("get(.a)", "get")]
#[case("add(1)", "add")]
#[case("pick(\"a\")", "pick")]
#[case("if(1, 2)", "if")]
#[case("join(.sep)", "join")]
fn test_invalid_arguments(#[case] query: &str, #[case] expected_function: &str) {
    match run(&json!(null), query) {
        Err(Error::Reference(ReferenceError::InvalidArgument { function, .. })) => {
            assert_eq!(function, expected_function)
        }
        other => panic!("Expected invalid argument for {:?}, got {:?}", query, other),
    }
}

#[test]
fn test_unknown_function() {
    assert_eq!(
        run(&json!(null), "nope()"),
        Err(Error::Reference(ReferenceError::UnknownFunction("nope".to_string())))
    );
}
