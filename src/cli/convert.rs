//! Reading command-line arguments into queries and values, and writing
//! results back out

use crate::{CustomOperator, Options, Query, Value, output, parse};

use super::CliError;

/// Parses a JSON document given on the command line or stdin
pub fn parse_input(json: &str) -> Result<Value, CliError> {
    let json: serde_json::Value = serde_json::from_str(json)?;
    Ok(Value::from(json))
}

/// Parses the `--operators` flag: a JSON list of operator descriptors
pub fn parse_operators(json: Option<&str>) -> Result<Vec<CustomOperator>, CliError> {
    let Some(json) = json else {
        return Ok(Vec::new());
    };
    let json: serde_json::Value = serde_json::from_str(json)?;
    Ok(CustomOperator::list_from_json(&json)?)
}

/// Reads a query from text, or from its JSON form when `ast` is set
pub fn load_query(query: &str, ast: bool, options: &Options) -> Result<Query, CliError> {
    if ast {
        let json: serde_json::Value = serde_json::from_str(query)?;
        return Ok(Query::from_json(&json)?);
    }
    Ok(parse(query, options)?)
}

pub fn render(value: &Value, pretty: bool) -> String {
    if pretty {
        output::to_json_pretty(value)
    } else {
        output::to_json(value)
    }
}
