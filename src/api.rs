//! The composed entry points: parse text, compile a query, stringify a
//! query, or do all of it at once with [`evaluate`].

use tracing::debug;

use crate::{
    ast::{CustomOperator, OperatorTable, Query},
    compiler::{Compiler, Executor},
    error::Result,
    functions::Functions,
    lexer::Lexer,
    parser::{DEFAULT_MAX_DEPTH, Parser},
    stringify::{DEFAULT_INDENTATION, DEFAULT_MAX_LINE_LENGTH, Stringifier},
    value::Value,
};

/// Settings shared by parsing, compiling and evaluating.
#[derive(Debug, Clone)]
pub struct Options {
    /// Added to the builtin library; a name already in it is replaced
    pub functions: Functions,
    /// Folded into the builtin operator table, in order
    pub operators: Vec<CustomOperator>,
    /// Nesting limit for both the parser and the compiler
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            functions: Functions::new(),
            operators: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Layout settings for [`stringify`].
#[derive(Debug, Clone)]
pub struct StringifyOptions {
    pub operators: Vec<CustomOperator>,
    /// One level of indentation in multi-line output
    pub indentation: String,
    /// Longest single-line form, in characters, before breaking lines
    pub max_line_length: usize,
}

impl Default for StringifyOptions {
    fn default() -> Self {
        StringifyOptions {
            operators: Vec::new(),
            indentation: DEFAULT_INDENTATION.to_string(),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

/// A query given either as text or as an already built tree
#[derive(Debug, Clone, PartialEq)]
pub enum QuerySource {
    Text(String),
    Query(Query),
}

impl From<&str> for QuerySource {
    fn from(text: &str) -> Self {
        QuerySource::Text(text.to_string())
    }
}

impl From<String> for QuerySource {
    fn from(text: String) -> Self {
        QuerySource::Text(text)
    }
}

impl From<Query> for QuerySource {
    fn from(query: Query) -> Self {
        QuerySource::Query(query)
    }
}

impl From<&Query> for QuerySource {
    fn from(query: &Query) -> Self {
        QuerySource::Query(query.clone())
    }
}

fn operator_table(custom: &[CustomOperator]) -> Result<OperatorTable> {
    Ok(OperatorTable::builtin().extend(custom)?)
}

/// Parses query text into a tree.
///
/// # Examples
///
/// ```
/// use jsonquery_lang::{parse, Options};
/// use serde_json::json;
///
/// let query = parse(".friends | sort(.age)", &Options::default()).unwrap();
/// assert_eq!(
///     query.to_json(),
///     json!(["pipe", ["get", "friends"], ["sort", ["get", "age"]]])
/// );
/// ```
pub fn parse(text: &str, options: &Options) -> Result<Query> {
    debug!(query = %text, custom_operators = options.operators.len(), "parsing query");
    let operators = operator_table(&options.operators)?;
    let query = Parser::new(Lexer::new(text), &operators)
        .with_max_depth(options.max_depth)
        .parse()?;
    Ok(query)
}

/// Compiles a query against the builtin functions plus `options.functions`.
pub fn compile(query: &Query, options: &Options) -> Result<Executor> {
    debug!(custom_functions = options.functions.len(), "compiling query");
    let functions = if options.functions.is_empty() {
        Functions::builtin()
    } else {
        Functions::builtin().merged(&options.functions)
    };
    let executor = Compiler::new(&functions)
        .with_max_depth(options.max_depth)
        .executor(query)?;
    Ok(executor)
}

/// Renders a query as text.
///
/// # Examples
///
/// ```
/// use jsonquery_lang::{stringify, Query, StringifyOptions};
/// use serde_json::json;
///
/// let query = Query::from_json(&json!(["add", ["get", "a"], ["multiply", 2, 3]])).unwrap();
/// assert_eq!(stringify(&query, &StringifyOptions::default()).unwrap(), ".a + 2 * 3");
/// ```
pub fn stringify(query: &Query, options: &StringifyOptions) -> Result<String> {
    debug!(
        custom_operators = options.operators.len(),
        max_line_length = options.max_line_length,
        "stringifying query"
    );
    let operators = operator_table(&options.operators)?;
    Ok(Stringifier::new(&operators)
        .with_indentation(&options.indentation)
        .with_max_line_length(options.max_line_length)
        .stringify(query))
}

/// Parses when given text, then compiles and runs the query on `data`.
///
/// # Examples
///
/// ```
/// use jsonquery_lang::{evaluate, Options, Value};
/// use serde_json::json;
///
/// let data = Value::from(json!({
///     "friends": [
///         {"name": "Chris", "age": 23, "city": "New York"},
///         {"name": "Emily", "age": 19, "city": "Atlanta"},
///         {"name": "Joe", "age": 32, "city": "New York"}
///     ]
/// }));
///
/// let result = evaluate(
///     &data,
///     r#".friends | filter(.city == "New York") | sort(.age) | map(.name)"#,
///     &Options::default(),
/// )
/// .unwrap();
/// assert_eq!(result, Value::from(json!(["Chris", "Joe"])));
/// ```
pub fn evaluate(data: &Value, query: impl Into<QuerySource>, options: &Options) -> Result<Value> {
    let query = match query.into() {
        QuerySource::Text(text) => parse(&text, options)?,
        QuerySource::Query(query) => query,
    };
    let executor = compile(&query, options)?;
    debug!(input = data.type_name(), "evaluating query");
    Ok(executor.evaluate(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ReferenceError};

    #[test]
    fn test_unknown_anchor_surfaces_from_parse() {
        let options = Options {
            operators: vec![CustomOperator::at("x", "@@", "~~")],
            ..Options::default()
        };
        assert!(matches!(
            parse("1", &options),
            Err(Error::Reference(ReferenceError::UnknownAnchor { .. }))
        ));
    }

    #[test]
    fn test_evaluate_accepts_tree() {
        let query = Query::call(
            "add",
            vec![Query::Literal(Value::Integer(1)), Query::Literal(Value::Integer(2))],
        );
        assert_eq!(
            evaluate(&Value::Null, &query, &Options::default()).unwrap(),
            Value::Integer(3)
        );
    }

    #[test]
    fn test_max_depth_applies_to_parser() {
        let options = Options {
            max_depth: 3,
            ..Options::default()
        };
        assert!(matches!(parse("((((1))))", &options), Err(Error::Syntax(_))));
    }
}
