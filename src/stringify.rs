//! Renders queries back into text.
//!
//! Output is canonical: operators are written infix with only the
//! parentheses the parser needs, property paths use dot syntax, and a
//! call, object or array is spread over several lines only when its
//! single-line form would be longer than the configured maximum. Parsing
//! the output yields an equivalent query, and stringifying that again
//! yields the same text.
//!
//! A call written in function form needs a name the parser reads as an
//! identifier. `not in` is written as its alias `notIn`; a custom function
//! registered under any other non-identifier name has no text form and is
//! only reachable through the JSON form.

use std::fmt;

use crate::{
    ast::{OperatorTable, Query},
    lexer, output,
    value::Value,
};

pub const DEFAULT_INDENTATION: &str = "  ";
pub const DEFAULT_MAX_LINE_LENGTH: usize = 40;

pub struct Stringifier<'t> {
    operators: &'t OperatorTable,
    indentation: &'t str,
    max_line_length: usize,
}

impl<'t> Stringifier<'t> {
    pub fn new(operators: &'t OperatorTable) -> Self {
        Stringifier {
            operators,
            indentation: DEFAULT_INDENTATION,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }

    pub fn with_indentation(mut self, indentation: &'t str) -> Self {
        self.indentation = indentation;
        self
    }

    pub fn with_max_line_length(mut self, max_line_length: usize) -> Self {
        self.max_line_length = max_line_length;
        self
    }

    pub fn stringify(&self, query: &Query) -> String {
        self.query(query, "", false)
    }

    fn query(&self, query: &Query, indent: &str, parenthesis: bool) -> String {
        match query {
            Query::Literal(value) => self.literal(value, indent),
            Query::Call { name, args } => self.call(name, args, indent, parenthesis),
            Query::Mapping(entries) => {
                let child_indent = self.child_indent(indent);
                let entries = entries
                    .iter()
                    .map(|(key, value)| (key, self.query(value, &child_indent, false)))
                    .collect();
                self.object(entries, indent)
            }
        }
    }

    /// Scalars as JSON; container values in the literal syntax that parses
    /// back into an equivalent constructor
    fn literal(&self, value: &Value, indent: &str) -> String {
        let child_indent = self.child_indent(indent);
        match value {
            Value::Array(items) => {
                let items: Vec<String> =
                    items.iter().map(|item| self.literal(item, &child_indent)).collect();
                self.array(&items, indent)
            }
            Value::Object(entries) => {
                let entries = entries
                    .iter()
                    .map(|(key, value)| (key, self.literal(value, &child_indent)))
                    .collect();
                self.object(entries, indent)
            }
            scalar => output::to_json(scalar),
        }
    }

    fn call(&self, name: &str, args: &[Query], indent: &str, parenthesis: bool) -> String {
        let child_indent = self.child_indent(indent);

        if name == "get"
            && !args.is_empty()
            && let Some(path) = path(args)
        {
            return path;
        }

        if let ("object", [Query::Mapping(_)]) = (name, args) {
            return self.query(&args[0], indent, false);
        }

        if name == "array" {
            let items: Vec<String> = args
                .iter()
                .map(|item| self.query(item, &child_indent, false))
                .collect();
            return self.array(&items, indent);
        }

        if let Some(symbol) = self.infix_symbol(name, args) {
            let items: Vec<String> = args
                .iter()
                .enumerate()
                .map(|(index, arg)| {
                    self.query(arg, &child_indent, self.needs_parenthesis(name, arg, index))
                })
                .collect();

            let (start, end) = if parenthesis { ("(", ")") } else { ("", "") };
            let separator = format!(" {} ", symbol);
            let formatted_separator = format!("\n{}{} ", child_indent, symbol);
            return self.join(
                &items,
                [start, &separator, end],
                [start, &formatted_separator, end],
            );
        }

        // Regular function like sort(.age)
        let name = function_name(name);
        let start = format!("{}(", name);
        if let [arg] = args {
            let item = self.query(arg, indent, false);
            let separator = format!(",\n{}", indent);
            return self.join(&[item], [&start, ", ", ")"], [&start, &separator, ")"]);
        }

        let items: Vec<String> = args
            .iter()
            .map(|arg| self.query(arg, &child_indent, false))
            .collect();
        let formatted_start = format!("{}(\n{}", name, child_indent);
        let formatted_separator = format!(",\n{}", child_indent);
        let formatted_end = format!("\n{})", indent);
        self.join(
            &items,
            [&start, ", ", ")"],
            [&formatted_start, &formatted_separator, &formatted_end],
        )
    }

    /// The symbol to write a call with, when it has one and reads back as
    /// the same call: two arguments, or more for vararg operators.
    fn infix_symbol(&self, name: &str, args: &[Query]) -> Option<&'t str> {
        let operators = self.operators;
        let symbol = operators.symbol(name)?;
        match args.len() {
            2 => Some(symbol),
            n if n > 2 && operators.is_vararg(name) => Some(symbol),
            _ => None,
        }
    }

    fn needs_parenthesis(&self, parent: &str, child: &Query, index: usize) -> bool {
        let Some((child_name, child_args)) = (match child {
            Query::Call { name, args } => Some((name.as_str(), args.as_slice())),
            _ => None,
        }) else {
            return false;
        };
        if self.infix_symbol(child_name, child_args).is_none() {
            return false;
        }

        let precedence = self.operators.precedence(parent);
        let child_precedence = self.operators.precedence(child_name);

        child_precedence > precedence
            || (child_precedence == precedence && index > 0)
            || (child_name == parent
                && (!self.operators.is_left_associative(parent) || self.operators.is_vararg(parent)))
    }

    fn object(&self, entries: Vec<(&String, String)>, indent: &str) -> String {
        if entries.is_empty() {
            return "{}".to_string();
        }

        let child_indent = self.child_indent(indent);
        let items: Vec<String> = entries
            .into_iter()
            .map(|(key, value)| format!("{}: {}", property(key), value))
            .collect();

        let formatted_start = format!("{{\n{}", child_indent);
        let formatted_separator = format!(",\n{}", child_indent);
        let formatted_end = format!("\n{}}}", indent);
        self.join(
            &items,
            ["{ ", ", ", " }"],
            [&formatted_start, &formatted_separator, &formatted_end],
        )
    }

    fn array(&self, items: &[String], indent: &str) -> String {
        let child_indent = self.child_indent(indent);
        let formatted_start = format!("[\n{}", child_indent);
        let formatted_separator = format!(",\n{}", child_indent);
        let formatted_end = format!("\n{}]", indent);
        self.join(
            items,
            ["[", ", ", "]"],
            [&formatted_start, &formatted_separator, &formatted_end],
        )
    }

    /// Single line when it fits within the maximum length, otherwise the
    /// formatted delimiters
    fn join(&self, items: &[String], compact: [&str; 3], formatted: [&str; 3]) -> String {
        let [start, separator, end] = compact;
        let length = |s: &str| s.chars().count();

        let compact_length = length(start)
            + items.iter().map(|item| length(item)).sum::<usize>()
            + length(separator) * items.len().saturating_sub(1)
            + length(end);

        let [start, separator, end] = if items.is_empty() || compact_length <= self.max_line_length {
            compact
        } else {
            formatted
        };
        format!("{}{}{}", start, items.join(separator), end)
    }

    fn child_indent(&self, indent: &str) -> String {
        format!("{}{}", indent, self.indentation)
    }
}

/// `.a.b.0` when every segment is a string or a non-negative integer
/// The name a call is written with in function form
fn function_name(name: &str) -> &str {
    match name {
        "not in" => "notIn",
        name => name,
    }
}

fn path(args: &[Query]) -> Option<String> {
    let mut path = String::new();
    for arg in args {
        let key = match arg {
            Query::Literal(Value::String(key)) => key.clone(),
            Query::Literal(Value::Integer(n)) if *n >= 0 => n.to_string(),
            _ => return None,
        };
        path.push('.');
        path.push_str(&property(&key));
    }
    Some(path)
}

fn property(key: &str) -> String {
    if lexer::is_unquoted_property(key) || lexer::is_integer_key(key) {
        key.to_string()
    } else {
        output::quote_string(key)
    }
}

/// Formats with the builtin operators and default layout
impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operators = OperatorTable::builtin();
        f.write_str(&Stringifier::new(&operators).stringify(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stringify(json: serde_json::Value) -> String {
        Query::from_json(&json).unwrap().to_string()
    }

    #[test]
    fn test_paths() {
        assert_eq!(stringify(json!(["get", "a", "b"])), ".a.b");
        assert_eq!(stringify(json!(["get", "first name", 0])), ".\"first name\".0");
        assert_eq!(stringify(json!(["get", "items", -1])), "get(\"items\", -1)");
        assert_eq!(stringify(json!(["get"])), "get()");
    }

    #[test]
    fn test_parenthesis_only_where_needed() {
        assert_eq!(stringify(json!(["add", 1, ["multiply", 2, 3]])), "1 + 2 * 3");
        assert_eq!(stringify(json!(["multiply", ["add", 1, 2], 3])), "(1 + 2) * 3");
        assert_eq!(stringify(json!(["subtract", 1, ["subtract", 2, 3]])), "1 - (2 - 3)");
        assert_eq!(stringify(json!(["subtract", ["subtract", 1, 2], 3])), "1 - 2 - 3");
        assert_eq!(stringify(json!(["eq", ["eq", 1, 2], 3])), "(1 == 2) == 3");
    }

    #[test]
    fn test_nested_vararg_is_parenthesized() {
        assert_eq!(
            stringify(json!(["pipe", ["pipe", ["get", "a"], ["get", "b"]], ["get", "c"]])),
            "(.a | .b) | .c"
        );
        assert_eq!(
            stringify(json!(["pipe", ["get", "a"], ["get", "b"], ["get", "c"]])),
            ".a | .b | .c"
        );
    }

    #[test]
    fn test_not_in_function_form_uses_alias() {
        assert_eq!(
            stringify(json!(["not in", ["get", "x"], ["array", 1], ["array", 2]])),
            "notIn(.x, [1], [2])"
        );
        assert_eq!(stringify(json!(["not in", ["get", "x"], ["array", 1]])), ".x not in [1]");
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(stringify(json!(["object", {}])), "{}");
        assert_eq!(stringify(json!(["array"])), "[]");
    }
}
