//! Run, parse and format queries

use tracing::debug;

use super::{CliError, load_query, parse_input};
use crate::{CustomOperator, Options, StringifyOptions, Value, compile, stringify};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The query, as text or as JSON when `ast` is set
    pub query: String,
    pub ast: bool,
    /// JSON input string
    pub input: Option<String>,
    pub operators: Vec<CustomOperator>,
    /// Only validate the query, don't execute
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// The query parsed and compiled
    SyntaxValid,
    /// The query ran; the value it produced
    Success(Value),
}

/// Parses and compiles the query, then runs it against the input unless
/// only the syntax is checked
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let query_options = Options {
        operators: options.operators.clone(),
        ..Options::default()
    };
    let query = load_query(&options.query, options.ast, &query_options)?;
    let executor = compile(&query, &query_options)?;

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    let input = options.input.as_deref().ok_or(CliError::NoInput)?;
    let data = parse_input(input)?;
    debug!(query = %options.query, "running query");

    let output = executor.evaluate(&data).map_err(crate::Error::from)?;
    Ok(CheckResult::Success(output))
}

/// The JSON form of query text
pub fn execute_parse(query: &str, operators: &[CustomOperator]) -> Result<serde_json::Value, CliError> {
    let options = Options {
        operators: operators.to_vec(),
        ..Options::default()
    };
    Ok(load_query(query, false, &options)?.to_json())
}

/// Options for the format command
#[derive(Debug, Clone, Default)]
pub struct FormatOptions {
    pub query: String,
    pub ast: bool,
    pub stringify: StringifyOptions,
}

/// Canonical text of a text or JSON query
pub fn execute_format(options: &FormatOptions) -> Result<String, CliError> {
    let parse_options = Options {
        operators: options.stringify.operators.clone(),
        ..Options::default()
    };
    let query = load_query(&options.query, options.ast, &parse_options)?;
    Ok(stringify(&query, &options.stringify)?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_check_runs_query() {
        let options = CheckOptions {
            query: ".a + 1".to_string(),
            input: Some(r#"{"a": 2}"#.to_string()),
            ..CheckOptions::default()
        };
        assert!(matches!(
            execute_check(&options).unwrap(),
            CheckResult::Success(Value::Integer(3))
        ));
    }

    #[test]
    fn test_syntax_only_needs_no_input() {
        let options = CheckOptions {
            query: "sort(.age)".to_string(),
            syntax_only: true,
            ..CheckOptions::default()
        };
        assert!(matches!(execute_check(&options).unwrap(), CheckResult::SyntaxValid));

        let options = CheckOptions {
            syntax_only: false,
            ..options
        };
        assert!(matches!(execute_check(&options), Err(CliError::NoInput)));
    }

    #[test]
    fn test_parse_and_format() {
        assert_eq!(
            execute_parse(".a == 1", &[]).unwrap(),
            json!(["eq", ["get", "a"], 1])
        );

        let options = FormatOptions {
            query: r#"["pipe", ["get", "a"], ["sort"]]"#.to_string(),
            ast: true,
            ..FormatOptions::default()
        };
        assert_eq!(execute_format(&options).unwrap(), ".a | sort()");
    }
}
