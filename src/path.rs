use crate::{ast::Query, error::ReferenceError, lexer, value::Value};

/// A segment of a property path.
///
/// Paths come from the literal arguments of `get` calls and locate values
/// inside nested objects and arrays.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    /// Object key, or array index when written as a non-negative integer
    ///
    /// # Examples
    /// - `.name` → `Field("name")`
    /// - `.items.0` → `[Field("items"), Field("0")]`
    /// - `."first name"` → `Field("first name")`
    Field(String),

    /// Array index from a JSON query, negative counts from the end
    ///
    /// # Examples
    /// - `["get", "items", -1]` → `[Field("items"), Index(-1)]`
    ///
    /// # Note
    /// On objects the index is used as its decimal key (`"-1"`).
    Index(i64),
}

impl PathSegment {
    /// The key this segment names on an object
    pub fn key(&self) -> String {
        match self {
            PathSegment::Field(name) => name.clone(),
            PathSegment::Index(n) => n.to_string(),
        }
    }

    fn index(&self) -> Option<i64> {
        match self {
            PathSegment::Index(n) => Some(*n),
            PathSegment::Field(name) if lexer::is_integer_key(name) => name.parse().ok(),
            PathSegment::Field(_) => None,
        }
    }

    /// Looks the segment up in one container; `None` when the value is not
    /// indexable or has no such entry.
    pub fn lookup<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        match value {
            Value::Object(map) => match self {
                PathSegment::Field(name) => map.get(name),
                PathSegment::Index(n) => map.get(&n.to_string()),
            },
            Value::Array(arr) => {
                let n = self.index()?;
                let index = if n < 0 {
                    // Negative index: count from end (-1 = last, -2 = second to last)
                    arr.len().checked_sub(n.unsigned_abs().try_into().ok()?)?
                } else {
                    n.try_into().ok()?
                };
                arr.get(index)
            }
            _ => None,
        }
    }
}

/// A sequence of path segments, walked left to right.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path(Vec<PathSegment>);

impl Path {
    /// Builds a path from the arguments of a `get` call. Every argument
    /// must be a literal string or integer.
    pub fn from_args(function: &str, args: &[Query]) -> Result<Path, ReferenceError> {
        args.iter()
            .map(|arg| match arg {
                Query::Literal(Value::String(name)) => Ok(PathSegment::Field(name.clone())),
                Query::Literal(Value::Integer(n)) => Ok(PathSegment::Index(*n)),
                other => Err(ReferenceError::invalid_argument(
                    function,
                    format!(
                        "path segments must be string or integer literals, got {}",
                        other.to_json()
                    ),
                )),
            })
            .collect::<Result<_, _>>()
            .map(Path)
    }

    /// Reads the path out of a `get` call argument, as `pick` and `exists`
    /// take them.
    pub fn from_get(function: &str, query: &Query) -> Result<Path, ReferenceError> {
        match query {
            Query::Call { name, args } if name == "get" => Path::from_args(function, args),
            other => Err(ReferenceError::invalid_argument(
                function,
                format!("a property path like .name expected, got {}", other.to_json()),
            )),
        }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn last_key(&self) -> Option<String> {
        self.0.last().map(PathSegment::key)
    }

    pub fn lookup<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        self.0
            .iter()
            .try_fold(value, |current, segment| segment.lookup(current))
    }

    /// The value at the path, or null when any step is missing
    pub fn get(&self, value: &Value) -> Value {
        self.lookup(value).cloned().unwrap_or(Value::Null)
    }

    /// Whether every step of the path is present (a present `null` counts)
    pub fn exists(&self, value: &Value) -> bool {
        self.lookup(value).is_some()
    }
}
