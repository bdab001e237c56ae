// tests/lexer_tests.rs

use jsonquery_lang::Value;
use jsonquery_lang::lexer::{Lexer, is_integer_key, is_unquoted_property};
use rstest::rstest;

// ============================================================================
// Numbers
// ============================================================================

#[rstest]
#[case("0", Value::Integer(0))]
#[case("42", Value::Integer(42))]
#[case("-7", Value::Integer(-7))]
#[case("1.5", Value::Float(1.5))]
#[case("-0.25", Value::Float(-0.25))]
#[case("2e3", Value::Float(2000.0))]
#[case("2E-2", Value::Float(0.02))]
#[case("1.5e+2", Value::Float(150.0))]
#[case("12345678901234567890", Value::Float(12345678901234567890.0))]
fn test_read_number(#[case] input: &str, #[case] expected: Value) {
    let mut lexer = Lexer::new(input);
    let number = lexer.read_number().unwrap();
    assert!(
        matches!(
            (&number, &expected),
            (Value::Integer(_), Value::Integer(_)) | (Value::Float(_), Value::Float(_))
        ),
        "wrong number type for {}: {:?}",
        input,
        number
    );
    assert_eq!(number, expected);
    assert!(lexer.is_at_end(), "input left over for {}", input);
}

#[test]
fn test_number_stops_before_incomplete_parts() {
    // A dot or exponent without digits is not part of the number
    let mut lexer = Lexer::new("1.a");
    assert_eq!(lexer.read_number(), Some(Value::Integer(1)));
    assert_eq!(lexer.rest(), ".a");

    let mut lexer = Lexer::new("3e");
    assert_eq!(lexer.read_number(), Some(Value::Integer(3)));
    assert_eq!(lexer.rest(), "e");
}

#[test]
fn test_not_a_number() {
    for input in ["-", "abc", ".5", "-x"] {
        let mut lexer = Lexer::new(input);
        assert_eq!(lexer.read_number(), None, "Failed for input: {}", input);
        assert_eq!(lexer.position(), 0);
    }
}

// ============================================================================
// Strings
// ============================================================================

#[rstest]
#[case(r#""hello""#, "hello")]
#[case(r#""""#, "")]
#[case(r#""a\"b""#, "a\"b")]
#[case(r#""line\nbreak""#, "line\nbreak")]
#[case(r#""été""#, "été")]
#[case(r#""tab\tslash\/""#, "tab\tslash/")]
fn test_read_string(#[case] input: &str, #[case] expected: &str) {
    let mut lexer = Lexer::new(input);
    assert_eq!(lexer.read_string(), Some(Ok(expected.to_string())));
    assert!(lexer.is_at_end());
}

#[test]
fn test_invalid_escape_is_an_error() {
    let mut lexer = Lexer::new(r#""bad \x escape""#);
    assert_eq!(lexer.read_string(), Some(Err(())));
    assert_eq!(lexer.position(), 0);
}

#[test]
fn test_unterminated_string_is_not_a_string() {
    let mut lexer = Lexer::new(r#""open"#);
    assert_eq!(lexer.read_string(), None);
    assert_eq!(lexer.position(), 0);
}

// ============================================================================
// Names and keys
// ============================================================================

#[test]
fn test_read_identifier() {
    let mut lexer = Lexer::new("first_name$2 rest");
    assert_eq!(lexer.read_identifier(), Some("first_name$2".to_string()));
    assert_eq!(lexer.rest(), " rest");

    let mut lexer = Lexer::new("2abc");
    assert_eq!(lexer.read_identifier(), None);
}

#[test]
fn test_read_integer_without_leading_zeros() {
    let mut lexer = Lexer::new("007");
    assert_eq!(lexer.read_integer(), Some("0".to_string()));
    assert_eq!(lexer.rest(), "07");

    let mut lexer = Lexer::new("120.");
    assert_eq!(lexer.read_integer(), Some("120".to_string()));
}

#[rstest]
#[case("name", true)]
#[case("_private", true)]
#[case("$ref", true)]
#[case("a1", true)]
#[case("1a", false)]
#[case("first name", false)]
#[case("", false)]
#[case("é", false)]
fn test_unquoted_property(#[case] text: &str, #[case] expected: bool) {
    assert_eq!(is_unquoted_property(text), expected);
}

#[rstest]
#[case("0", true)]
#[case("17", true)]
#[case("01", false)]
#[case("-1", false)]
#[case("1.0", false)]
#[case("", false)]
fn test_integer_key(#[case] text: &str, #[case] expected: bool) {
    assert_eq!(is_integer_key(text), expected);
}

// ============================================================================
// Cursor
// ============================================================================

#[test]
fn test_whitespace_and_symbols() {
    let mut lexer = Lexer::new(" \t\r\n>= 1");
    lexer.skip_whitespace();
    assert_eq!(lexer.position(), 4);
    assert!(lexer.starts_with(">="));
    assert!(!lexer.eat_str(">=="));
    assert!(lexer.eat_str(">="));
    lexer.skip_whitespace();
    assert_eq!(lexer.current_char(), Some('1'));
}

#[test]
fn test_positions_count_characters() {
    let mut lexer = Lexer::new("\"é\" x");
    lexer.read_string().unwrap().unwrap();
    assert_eq!(lexer.position(), 3);

    lexer.reset(0);
    assert_eq!(lexer.current_char(), Some('"'));
    assert_eq!(lexer.source(), "\"é\" x");
}
