//! Error types for the three phases: parsing, compiling and evaluating.

use std::fmt;

/// What went wrong while reading query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// A value (literal, path, call, object or array) was expected
    ValueExpected,
    /// A property name was expected after `.`
    PropertyExpected,
    /// An object key was expected
    KeyExpected,
    /// A delimiter or separator was missing
    CharExpected(char),
    /// A string literal with an invalid escape or control character
    InvalidString,
    /// Text left over after a complete query
    UnexpectedPart(String),
    /// Parentheses, calls, arrays or objects nested deeper than allowed
    RecursionLimitExceeded { limit: usize },
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxErrorKind::ValueExpected => write!(f, "Value expected"),
            SyntaxErrorKind::PropertyExpected => write!(f, "Property expected"),
            SyntaxErrorKind::KeyExpected => write!(f, "Key expected"),
            SyntaxErrorKind::CharExpected(c) => write!(f, "Character '{}' expected", c),
            SyntaxErrorKind::InvalidString => write!(f, "Invalid string"),
            SyntaxErrorKind::UnexpectedPart(rest) => write!(f, "Unexpected part '{}'", rest),
            SyntaxErrorKind::RecursionLimitExceeded { limit } => {
                write!(f, "Nesting deeper than {} levels", limit)
            }
        }
    }
}

/// A parse failure, with the query text and the character offset where it
/// was raised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} (pos: {position})")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    /// Offset in characters (not bytes) from the start of `query`
    pub position: usize,
    pub query: String,
}

/// Compile-time failures: names that do not resolve, malformed arguments,
/// and invalid operator extensions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    #[error("Unknown function \"{0}\"")]
    UnknownFunction(String),

    /// A bare mapping reached the compiler outside `["object", {...}]`
    #[error("Function notation [\"object\", {{...}}] expected but got a mapping")]
    MappingNotAllowed,

    #[error("Invalid arguments for \"{function}\": {message}")]
    InvalidArgument { function: String, message: String },

    /// Custom operators were not given as an ordered list
    #[error("Invalid custom operators: a list of operator descriptors expected")]
    InvalidOperators,

    /// A custom operator descriptor that cannot be read
    #[error("Invalid custom operator: {0}")]
    MalformedOperator(String),

    /// A custom operator anchored to a symbol no group contains
    #[error("Invalid custom operator \"{name}\": no operator group contains '{anchor}'")]
    UnknownAnchor { name: String, anchor: String },

    /// JSON that is not a query
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Query nested deeper than {limit} levels")]
    RecursionLimitExceeded { limit: usize },
}

impl ReferenceError {
    pub(crate) fn invalid_argument(function: &str, message: impl Into<String>) -> Self {
        ReferenceError::InvalidArgument {
            function: function.to_string(),
            message: message.into(),
        }
    }
}

/// Evaluation-time failures. Only functions that require a particular
/// container type raise; everything else degrades to `null` or `false`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    #[error("Array expected")]
    ArrayExpected,

    #[error("Object expected")]
    ObjectExpected,

    /// Raised by caller-supplied functions
    #[error("{0}")]
    Custom(String),
}

/// Any failure of the composed entry points.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("Reference error: {0}")]
    Reference(#[from] ReferenceError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

/// Result type for the composed entry points.
pub type Result<T> = std::result::Result<T, Error>;
