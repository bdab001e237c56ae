//! Character scanner for query text.
//!
//! Operator symbols come from an extensible table, so there is no fixed
//! token set: the parser drives the scanner directly, asking it to read the
//! piece it expects next. Every `read_*` method either consumes a complete
//! match and returns it, or consumes nothing and returns `None`.

use crate::value::Value;

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Offset in characters
    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves back to an offset returned by [`Lexer::position`]
    pub fn reset(&mut self, position: usize) {
        self.position = position;
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    pub fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    /// The whole input
    pub fn source(&self) -> String {
        self.input.iter().collect()
    }

    /// The unread remainder of the input
    pub fn rest(&self) -> String {
        self.input[self.position.min(self.input.len())..].iter().collect()
    }

    pub fn skip_whitespace(&mut self) {
        while let Some(' ' | '\n' | '\t' | '\r') = self.current_char() {
            self.advance();
        }
    }

    /// Consumes `ch` if it is next
    pub fn eat(&mut self, ch: char) -> bool {
        if self.current_char() == Some(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn starts_with(&self, text: &str) -> bool {
        let mut offset = 0;
        for ch in text.chars() {
            if self.peek_char(offset) != Some(ch) {
                return false;
            }
            offset += 1;
        }
        true
    }

    /// Consumes `text` if the input continues with it
    pub fn eat_str(&mut self, text: &str) -> bool {
        if self.starts_with(text) {
            self.position += text.chars().count();
            true
        } else {
            false
        }
    }

    /// Unquoted name: `[A-Za-z_$][A-Za-z0-9_$]*`
    pub fn read_identifier(&mut self) -> Option<String> {
        match self.current_char() {
            Some(ch) if is_identifier_start(ch) => {}
            _ => return None,
        }

        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if is_identifier_char(ch) {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        Some(result)
    }

    /// Non-negative integer without leading zeros: `0|[1-9][0-9]*`
    pub fn read_integer(&mut self) -> Option<String> {
        match self.current_char() {
            Some('0') => {
                self.advance();
                Some("0".to_string())
            }
            Some('1'..='9') => Some(self.read_digits()),
            _ => None,
        }
    }

    fn read_digits(&mut self) -> String {
        let mut digits = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        digits
    }

    /// JSON string literal.
    ///
    /// Returns `None` when no complete quoted string starts here, and
    /// `Some(Err(()))` when the quotes match but the contents are not valid
    /// JSON (a bad escape or a raw control character). On `Some(Err(()))`
    /// nothing is consumed.
    pub fn read_string(&mut self) -> Option<Result<String, ()>> {
        if self.current_char() != Some('"') {
            return None;
        }

        let start = self.position;
        self.advance(); // Consume opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                '"' => {
                    self.advance();
                    let raw: String = self.input[start..self.position].iter().collect();
                    return match serde_json::from_str::<String>(&raw) {
                        Ok(decoded) => Some(Ok(decoded)),
                        Err(_) => {
                            self.position = start;
                            Some(Err(()))
                        }
                    };
                }
                '\\' => {
                    // The escaped character is validated when decoding
                    self.advance();
                    if self.is_at_end() {
                        break;
                    }
                    self.advance();
                }
                _ => self.advance(),
            }
        }

        // Unterminated: not a string at all
        self.position = start;
        None
    }

    /// JSON number: `-?(0|[1-9]\d*)(\.\d+)?([eE][+-]?\d+)?`
    ///
    /// Integral text becomes [`Value::Integer`] when it fits, anything with
    /// a fraction or exponent becomes [`Value::Float`].
    pub fn read_number(&mut self) -> Option<Value> {
        let start = self.position;
        let mut number = String::new();

        if self.eat('-') {
            number.push('-');
        }
        match self.read_integer() {
            Some(digits) => number.push_str(&digits),
            None => {
                self.position = start;
                return None;
            }
        }

        let mut is_float = false;

        if self.current_char() == Some('.') && self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            number.push('.');
            number.push_str(&self.read_digits());
            is_float = true;
        }

        if let Some(e @ ('e' | 'E')) = self.current_char() {
            let sign = match self.peek_char(1) {
                Some(s @ ('+' | '-')) => Some(s),
                _ => None,
            };
            let digits_at = if sign.is_some() { 2 } else { 1 };
            if self.peek_char(digits_at).is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
                number.push(e);
                if let Some(s) = sign {
                    self.advance();
                    number.push(s);
                }
                number.push_str(&self.read_digits());
                is_float = true;
            }
        }

        if !is_float && let Ok(n) = number.parse::<i64>() {
            return Some(Value::Integer(n));
        }
        match number.parse::<f64>() {
            Ok(n) => Some(Value::Float(n)),
            Err(_) => {
                self.position = start;
                None
            }
        }
    }

    /// `true`, `false` or `null`
    pub fn read_keyword(&mut self) -> Option<Value> {
        if self.eat_str("true") {
            Some(Value::Boolean(true))
        } else if self.eat_str("false") {
            Some(Value::Boolean(false))
        } else if self.eat_str("null") {
            Some(Value::Null)
        } else {
            None
        }
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '$'
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '$'
}

/// Whether `text` can be written as a property without quotes
pub fn is_unquoted_property(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next().is_some_and(is_identifier_start) && chars.all(is_identifier_char)
}

/// Whether `text` reads back from [`Lexer::read_integer`] unchanged
pub fn is_integer_key(text: &str) -> bool {
    match text.as_bytes() {
        [b'0'] => true,
        [b'1'..=b'9', rest @ ..] => rest.iter().all(u8::is_ascii_digit),
        _ => false,
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("true false null nil");
    assert_eq!(lexer.read_keyword(), Some(Value::Boolean(true)));
    lexer.skip_whitespace();
    assert_eq!(lexer.read_keyword(), Some(Value::Boolean(false)));
    lexer.skip_whitespace();
    assert_eq!(lexer.read_keyword(), Some(Value::Null));
    lexer.skip_whitespace();
    assert_eq!(lexer.read_keyword(), None);
    assert_eq!(lexer.rest(), "nil");
}

#[test]
fn test_numbers() {
    let mut lexer = Lexer::new("-12.5e2 7 1e");
    assert_eq!(lexer.read_number(), Some(Value::Float(-1250.0)));
    lexer.skip_whitespace();
    assert!(matches!(lexer.read_number(), Some(Value::Integer(7))));
    lexer.skip_whitespace();
    // The dangling exponent is not part of the number
    assert!(matches!(lexer.read_number(), Some(Value::Integer(1))));
    assert_eq!(lexer.rest(), "e");
}

#[test]
fn test_strings() {
    let mut lexer = Lexer::new(r#""a\"bA" "bad\q" "open"#);
    assert_eq!(lexer.read_string(), Some(Ok("a\"bA".to_string())));
    lexer.skip_whitespace();
    let before = lexer.position();
    assert_eq!(lexer.read_string(), Some(Err(())));
    assert_eq!(lexer.position(), before);
}

#[test]
fn test_property_patterns() {
    assert!(is_unquoted_property("$name_1"));
    assert!(!is_unquoted_property("1abc"));
    assert!(!is_unquoted_property("first name"));
    assert!(!is_unquoted_property(""));
    assert!(is_integer_key("0"));
    assert!(is_integer_key("120"));
    assert!(!is_integer_key("012"));
    assert!(!is_integer_key("-1"));
}
