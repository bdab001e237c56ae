//! JSON output serialization for query values.
//!
//! This module provides JSON serialization with support for both compact and
//! pretty-printed output formats. Object keys are written in insertion order,
//! which is the order queries such as `object` and `groupBy` produce them.
//!
//! # Features
//!
//! - **Compact output** via [`to_json()`] - minimal whitespace for efficient transmission
//! - **Pretty output** via [`to_json_pretty()`] - human-readable with 2-space indentation
//! - **String escaping** - handles special characters, control codes, and Unicode
//! - **Type preservation** - integers print bare, floats always carry a decimal point
//!
//! # Examples
//!
//! ```
//! use jsonquery_lang::Value;
//! use jsonquery_lang::output::{to_json, to_json_pretty};
//!
//! let value = Value::Integer(42);
//!
//! // Compact output
//! assert_eq!(to_json(&value), "42");
//!
//! // Pretty output (identical for simple values)
//! assert_eq!(to_json_pretty(&value), "42");
//!
//! assert_eq!(to_json(&Value::Float(2.0)), "2.0");
//! ```

use indexmap::IndexMap;

use crate::value::Value;

/// Writes values as JSON text, compact or indented by two spaces per level.
pub struct JsonPrinter {
    pretty: bool,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        JsonPrinter { pretty }
    }

    pub fn print(&self, value: &Value) -> String {
        let mut out = String::new();
        self.write_value(&mut out, value, 0);
        out
    }

    fn write_value(&self, out: &mut String, value: &Value, depth: usize) {
        match value {
            Value::Null => out.push_str("null"),
            Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Integer(n) => out.push_str(&n.to_string()),
            Value::Float(n) if n.is_finite() => out.push_str(&format_float(*n)),
            Value::Float(_) => out.push_str("null"),
            Value::String(s) => out.push_str(&quote_string(s)),
            Value::Array(items) => {
                self.write_container(out, ('[', ']'), items.len(), depth, |out, i| {
                    self.write_value(out, &items[i], depth + 1)
                })
            }
            Value::Object(entries) => self.write_object(out, entries, depth),
        }
    }

    fn write_object(&self, out: &mut String, entries: &IndexMap<String, Value>, depth: usize) {
        let separator = if self.pretty { ": " } else { ":" };
        self.write_container(out, ('{', '}'), entries.len(), depth, |out, i| {
            if let Some((key, value)) = entries.get_index(i) {
                out.push_str(&quote_string(key));
                out.push_str(separator);
                self.write_value(out, value, depth + 1);
            }
        })
    }

    /// Shared bracket, comma and newline handling for arrays and objects
    fn write_container(
        &self,
        out: &mut String,
        (open, close): (char, char),
        len: usize,
        depth: usize,
        mut write_item: impl FnMut(&mut String, usize),
    ) {
        out.push(open);
        for i in 0..len {
            if i > 0 {
                out.push(',');
            }
            if self.pretty {
                out.push('\n');
                push_indent(out, depth + 1);
            }
            write_item(out, i);
        }
        if self.pretty && len > 0 {
            out.push('\n');
            push_indent(out, depth);
        }
        out.push(close);
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

/// Encodes a string as a JSON string literal, quotes included.
pub fn quote_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push('"');
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => result.push_str(&format!("\\u{:04x}", c as u32)),
            c => result.push(c),
        }
    }
    result.push('"');
    result
}

/// Formats a float the way JSON serializers do: shortest round-trip digits,
/// always with a fraction or exponent (`2.0`, `0.1`, `1e21`).
///
/// Non-finite values have no JSON spelling and print as `NaN`, `inf` or
/// `-inf`; JSON output replaces them with `null` before calling this.
pub fn format_float(n: f64) -> String {
    match serde_json::Number::from_f64(n) {
        Some(number) => number.to_string(),
        None => n.to_string(),
    }
}

/// Converts a Value to compact JSON string representation.
///
/// # Examples
///
/// ```
/// use jsonquery_lang::Value;
/// use jsonquery_lang::output::to_json;
/// use indexmap::IndexMap;
///
/// let mut obj = IndexMap::new();
/// obj.insert("name".to_string(), Value::String("Alice".to_string()));
/// obj.insert("age".to_string(), Value::Integer(30));
///
/// assert_eq!(to_json(&Value::Object(obj)), r#"{"name":"Alice","age":30}"#);
/// ```
pub fn to_json(value: &Value) -> String {
    JsonPrinter::new(false).print(value)
}

/// Converts a Value to pretty-printed JSON string representation.
///
/// Used by the CLI's `--pretty` flag.
///
/// # Examples
///
/// ```
/// use jsonquery_lang::Value;
/// use jsonquery_lang::output::to_json_pretty;
///
/// let value = Value::Array(vec![Value::Integer(1), Value::Null]);
/// assert_eq!(to_json_pretty(&value), "[\n  1,\n  null\n]");
/// ```
pub fn to_json_pretty(value: &Value) -> String {
    JsonPrinter::new(true).print(value)
}
