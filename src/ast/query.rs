use indexmap::IndexMap;

use crate::{error::ReferenceError, value::Value};

/// A node of the query tree.
///
/// Queries are immutable once built, whether by the parser or by hand, and
/// own their argument sub-trees.
///
/// # Examples
///
/// ```
/// use jsonquery_lang::{Query, Value};
///
/// // .age > 18
/// let query = Query::call(
///     "gt",
///     vec![Query::get(["age"]), Query::Literal(Value::Integer(18))],
/// );
///
/// assert_eq!(query.call_name(), Some("gt"));
/// assert_eq!(
///     query.to_json(),
///     serde_json::json!(["gt", ["get", "age"], 18])
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Constant value, returned as-is regardless of input
    ///
    /// # Example
    /// ```text
    /// "hello"
    /// 42
    /// ```
    Literal(Value),

    /// Function call with ordered argument sub-queries
    ///
    /// # Examples
    /// ```text
    /// sort(.age, "desc")
    /// .a + 1              // Call { name: "add", ... }
    /// .a.b                // Call { name: "get", args: ["a", "b"] }
    /// ```
    Call { name: String, args: Vec<Query> },

    /// Keyed sub-queries. Only meaningful as the single argument of
    /// `object`; compiling one directly is an error.
    ///
    /// # Example
    /// ```text
    /// { name: .name, total: sum() }
    /// ```
    Mapping(IndexMap<String, Query>),
}

impl Query {
    pub fn literal(value: impl Into<Value>) -> Self {
        Query::Literal(value.into())
    }

    pub fn call(name: impl Into<String>, args: Vec<Query>) -> Self {
        Query::Call {
            name: name.into(),
            args,
        }
    }

    /// Property path, `.a.b` is `Query::get(["a", "b"])`
    pub fn get<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Query::call(
            "get",
            path.into_iter()
                .map(|segment| Query::Literal(Value::String(segment.into())))
                .collect(),
        )
    }

    /// Object constructor, `{ a: .x }`
    pub fn object(entries: IndexMap<String, Query>) -> Self {
        Query::call("object", vec![Query::Mapping(entries)])
    }

    /// Array constructor, `[.x, 1]`
    pub fn array(items: Vec<Query>) -> Self {
        Query::call("array", items)
    }

    /// The function name when this node is a call
    pub fn call_name(&self) -> Option<&str> {
        match self {
            Query::Call { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Reads the JSON interchange form.
    ///
    /// A list whose head is a string is a call, an object is the mapping
    /// argument of `object`, and scalars are literals. Lists with any other
    /// head are rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use jsonquery_lang::Query;
    /// use serde_json::json;
    ///
    /// let query = Query::from_json(&json!(["sort", ["get", "age"], "desc"])).unwrap();
    /// assert_eq!(query.call_name(), Some("sort"));
    ///
    /// assert!(Query::from_json(&json!([1, 2, 3])).is_err());
    /// ```
    pub fn from_json(json: &serde_json::Value) -> Result<Query, ReferenceError> {
        match json {
            serde_json::Value::Array(items) => match items.split_first() {
                Some((serde_json::Value::String(name), args)) => Ok(Query::Call {
                    name: name.clone(),
                    args: args
                        .iter()
                        .map(Query::from_json)
                        .collect::<Result<_, _>>()?,
                }),
                Some((head, _)) => Err(ReferenceError::InvalidQuery(format!(
                    "a function call must start with a function name, got {}",
                    head
                ))),
                None => Err(ReferenceError::InvalidQuery(
                    "an empty list is not a function call".to_string(),
                )),
            },
            serde_json::Value::Object(entries) => Ok(Query::Mapping(
                entries
                    .iter()
                    .map(|(key, value)| Ok((key.clone(), Query::from_json(value)?)))
                    .collect::<Result<_, ReferenceError>>()?,
            )),
            scalar => Ok(Query::Literal(Value::from(scalar.clone()))),
        }
    }

    /// Writes the JSON interchange form.
    ///
    /// Container literals built by hand are wrapped as `["array", ...]` and
    /// `["object", {...}]` so that the output reads back as an equivalent
    /// query.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Query::Literal(value) => literal_to_json(value),
            Query::Call { name, args } => {
                let mut items = Vec::with_capacity(args.len() + 1);
                items.push(serde_json::Value::String(name.clone()));
                items.extend(args.iter().map(Query::to_json));
                serde_json::Value::Array(items)
            }
            Query::Mapping(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

fn literal_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Array(items) => {
            let mut call = vec![serde_json::Value::String("array".to_string())];
            call.extend(items.iter().map(literal_to_json));
            serde_json::Value::Array(call)
        }
        Value::Object(entries) => serde_json::Value::Array(vec![
            serde_json::Value::String("object".to_string()),
            serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), literal_to_json(value)))
                    .collect(),
            ),
        ]),
        scalar => serde_json::Value::from(scalar.clone()),
    }
}

impl From<Value> for Query {
    fn from(value: Value) -> Self {
        Query::Literal(value)
    }
}
