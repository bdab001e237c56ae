//! A query language for JSON documents.
//!
//! Queries are written in a compact text form such as
//! `.friends | filter(.age > 18) | map(.name)`, or exchanged as JSON
//! (`["pipe", ["get", "friends"], ...]`). Text is parsed into a [`Query`]
//! tree, the tree is compiled against a function library into an
//! [`Executor`], and the executor runs against any number of documents.
//! [`stringify`] turns a tree back into canonical text.
//!
//! ```
//! use jsonquery_lang::{evaluate, Options, Value};
//! use serde_json::json;
//!
//! let data = Value::from(json!([{"n": 3}, {"n": 1}, {"n": 2}]));
//! let result = evaluate(&data, "sort(.n) | map(.n * 10)", &Options::default()).unwrap();
//! assert_eq!(result, Value::from(json!([10, 20, 30])));
//! ```
pub mod api;
pub mod ast;
pub mod cli;
pub mod compiler;
pub mod error;
pub mod functions;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod path;
pub mod stringify;
pub mod value;

pub use api::{Options, QuerySource, StringifyOptions, compile, evaluate, parse, stringify};
pub use ast::{CustomOperator, Insertion, OperatorGroup, OperatorTable, Query};
pub use compiler::{Compiler, Eval, Executor};
pub use error::{Error, ReferenceError, Result, RuntimeError, SyntaxError, SyntaxErrorKind};
pub use functions::{Arity, Function, Functions};
pub use lexer::Lexer;
pub use output::{to_json, to_json_pretty};
pub use parser::Parser;
pub use stringify::Stringifier;
pub use value::Value;
