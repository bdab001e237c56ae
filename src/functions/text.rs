use regex::{Regex, RegexBuilder};

use super::{Arity, Function, Functions, literal_arg, on_array};
use crate::{compiler::eval, error::ReferenceError, value::Value};

pub(super) fn register(functions: &mut Functions) {
    functions.insert(
        "join",
        Function::higher_order(|args, _| {
            Arity::between(0, 1).check("join", args.len())?;
            let separator = match args.first().map(|arg| literal_arg("join", arg)).transpose()? {
                None => String::new(),
                Some(Value::String(separator)) => separator.clone(),
                Some(other) => {
                    return Err(ReferenceError::invalid_argument(
                        "join",
                        format!("separator must be a string, got {}", other.as_string()),
                    ));
                }
            };

            Ok(on_array(move |items| {
                let parts: Vec<String> = items.iter().map(Value::as_string).collect();
                Ok(Value::String(parts.join(&separator)))
            }))
        }),
    );

    functions.insert(
        "split",
        Function::value(|args| {
            let Some(text) = args[0].as_str() else {
                return Ok(Value::Null);
            };
            let parts: Vec<Value> = match args.get(1).unwrap_or(&Value::Null) {
                Value::Null => text.split_whitespace().map(Value::from).collect(),
                Value::String(separator) if separator.is_empty() => {
                    text.chars().map(|c| Value::String(c.to_string())).collect()
                }
                Value::String(separator) => text.split(separator.as_str()).map(Value::from).collect(),
                _ => return Ok(Value::Null),
            };
            Ok(Value::Array(parts))
        })
        .with_arity(1, Some(2)),
    );

    functions.insert(
        "substring",
        Function::value(|args| {
            let (Some(text), Some(start)) = (args[0].as_str(), args[1].as_int()) else {
                return Ok(Value::Null);
            };
            let end = match args.get(2) {
                None | Some(Value::Null) => None,
                Some(end) => match end.as_int() {
                    Some(end) => Some(end),
                    None => return Ok(Value::Null),
                },
            };
            Ok(Value::String(substring(text, start, end)))
        })
        .with_arity(2, Some(3)),
    );

    functions.insert(
        "regex",
        Function::higher_order(|args, compiler| {
            Arity::between(2, 3).check("regex", args.len())?;
            let getter = compiler.compile(&args[0])?;

            let pattern = string_literal(literal_arg("regex", &args[1])?, "pattern")?;
            let flags = match args.get(2) {
                Some(flags) => string_literal(literal_arg("regex", flags)?, "flags")?,
                None => "",
            };
            let regex = build_regex(pattern, flags)?;

            Ok(eval(move |data| {
                let matched = match getter(data)? {
                    Value::String(text) => is_prefix_match(&regex, &text),
                    _ => false,
                };
                Ok(Value::Boolean(matched))
            }))
        }),
    );

    functions.insert(
        "string",
        Function::value(|args| Ok(Value::String(args[0].as_string()))).with_arity(1, Some(1)),
    );

    functions.insert(
        "number",
        Function::value(|args| Ok(to_number(&args[0]))).with_arity(1, Some(1)),
    );
}

/// Characters from `start` (negative counts as 0) up to `end`, where a
/// negative `end` counts back from the end of the text.
fn substring(text: &str, start: i64, end: Option<i64>) -> String {
    let length = text.chars().count();
    let clamp = |n: i64| usize::try_from(n).map_or(0, |n| n.min(length));

    let start = clamp(start);
    let end = match end {
        None => length,
        Some(end) if end < 0 => clamp(length as i64 + end),
        Some(end) => clamp(end),
    };

    if start >= end {
        return String::new();
    }
    text.chars().skip(start).take(end - start).collect()
}

fn string_literal<'v>(value: &'v Value, what: &str) -> Result<&'v str, ReferenceError> {
    value.as_str().ok_or_else(|| {
        ReferenceError::invalid_argument(
            "regex",
            format!("{} must be a string, got {}", what, value.as_string()),
        )
    })
}

/// Flag letters, in either case: `i` case-insensitive, `m` multi-line,
/// `s` dot matches newline, `x` ignore whitespace, `u` unicode (the
/// default), `a` ASCII only.
fn build_regex(pattern: &str, flags: &str) -> Result<Regex, ReferenceError> {
    let mut builder = RegexBuilder::new(pattern);

    for flag in flags.chars() {
        match flag.to_ascii_lowercase() {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            'u' => builder.unicode(true),
            'a' => builder.unicode(false),
            other => {
                return Err(ReferenceError::invalid_argument(
                    "regex",
                    format!("unknown flag '{}'", other),
                ));
            }
        };
    }

    builder
        .build()
        .map_err(|e| ReferenceError::invalid_argument("regex", e.to_string()))
}

/// Matches only at the start of the text, without requiring the whole text
fn is_prefix_match(regex: &Regex, text: &str) -> bool {
    // The leftmost match starts at 0 whenever any match does
    regex.find(text).is_some_and(|m| m.start() == 0)
}

fn to_number(value: &Value) -> Value {
    let number = match value {
        Value::Integer(n) => *n as f64,
        Value::Float(n) => *n,
        Value::Boolean(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::String(text) => match text.trim().parse::<f64>() {
            Ok(n) => n,
            Err(_) => return Value::Null,
        },
        _ => return Value::Null,
    };

    if number.is_finite() {
        Value::Float(number)
    } else {
        Value::Null
    }
}
