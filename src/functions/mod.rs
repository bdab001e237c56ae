//! The function library.
//!
//! Every call in a query resolves to a [`Function`] by name. There are two
//! kinds:
//!
//! - **Value functions** get their arguments already evaluated against the
//!   same input, e.g. `add(.a, 1)` or `string(.id)`.
//! - **Higher-order functions** get the raw argument queries and a
//!   [`Compiler`], and decide themselves what to compile and which input to
//!   run it on, e.g. `filter(.age > 18)` runs its predicate per element.
//!
//! # Examples
//!
//! ```
//! use jsonquery_lang::{evaluate, Function, Functions, Options, Value};
//!
//! let mut functions = Functions::new();
//! functions.insert(
//!     "times",
//!     Function::value(|args| match (args[0].as_int(), args[1].as_int()) {
//!         (Some(a), Some(b)) => Ok(Value::Integer(a * b)),
//!         _ => Ok(Value::Null),
//!     })
//!     .with_arity(2, Some(2)),
//! );
//!
//! let options = Options { functions, ..Options::default() };
//! let result = evaluate(&Value::Integer(4), "times(get(), 3)", &options).unwrap();
//! assert_eq!(result, Value::Integer(12));
//! ```

mod access;
mod aggregate;
mod collections;
mod logic;
mod math;
mod text;

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, LazyLock},
};

use indexmap::IndexMap;

use crate::{
    ast::Query,
    compiler::{Compiler, Eval, eval},
    error::{ReferenceError, RuntimeError},
    value::Value,
};

/// Signature of value functions
pub type ValueFn = dyn Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync;

/// Signature of higher-order functions
pub type HigherOrderFn =
    dyn Fn(&[Query], &Compiler<'_>) -> Result<Eval, ReferenceError> + Send + Sync;

/// Accepted argument counts, checked at compile time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    /// `None` for any number of arguments
    pub max: Option<usize>,
}

impl Arity {
    pub const ANY: Arity = Arity { min: 0, max: None };

    pub const fn exactly(n: usize) -> Self {
        Arity {
            min: n,
            max: Some(n),
        }
    }

    pub const fn between(min: usize, max: usize) -> Self {
        Arity {
            min,
            max: Some(max),
        }
    }

    pub fn check(&self, function: &str, count: usize) -> Result<(), ReferenceError> {
        let too_many = self.max.is_some_and(|max| count > max);
        if count >= self.min && !too_many {
            return Ok(());
        }

        let expected = match self.max {
            Some(max) if max == self.min => format!("{}", max),
            Some(max) => format!("{} to {}", self.min, max),
            None => format!("at least {}", self.min),
        };
        Err(ReferenceError::invalid_argument(
            function,
            format!("expected {} arguments, got {}", expected, count),
        ))
    }
}

/// A named operation a query can call.
#[derive(Clone)]
pub enum Function {
    Value { arity: Arity, call: Arc<ValueFn> },
    HigherOrder(Arc<HigherOrderFn>),
}

impl Function {
    /// A value function accepting any number of arguments
    pub fn value<F>(call: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    {
        Function::Value {
            arity: Arity::ANY,
            call: Arc::new(call),
        }
    }

    /// Restricts the argument count of a value function; higher-order
    /// functions check their own arguments.
    pub fn with_arity(self, min: usize, max: Option<usize>) -> Self {
        match self {
            Function::Value { call, .. } => Function::Value {
                arity: Arity { min, max },
                call,
            },
            higher_order => higher_order,
        }
    }

    pub fn higher_order<F>(build: F) -> Self
    where
        F: Fn(&[Query], &Compiler<'_>) -> Result<Eval, ReferenceError> + Send + Sync + 'static,
    {
        Function::HigherOrder(Arc::new(build))
    }

    pub(crate) fn build(
        &self,
        name: &str,
        args: &[Query],
        compiler: &Compiler<'_>,
    ) -> Result<Eval, ReferenceError> {
        match self {
            Function::Value { arity, call } => {
                arity.check(name, args.len())?;
                let args = compiler.compile_all(args)?;
                let call = Arc::clone(call);

                // Every argument is evaluated, in order, before the call
                Ok(eval(move |data| {
                    let values = args
                        .iter()
                        .map(|arg| arg(data))
                        .collect::<Result<Vec<_>, _>>()?;
                    call(&values)
                }))
            }
            Function::HigherOrder(build) => build(args, compiler),
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Value { arity, .. } => {
                f.debug_struct("Value").field("arity", arity).finish_non_exhaustive()
            }
            Function::HigherOrder(_) => f.write_str("HigherOrder"),
        }
    }
}

/// A function registry keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Functions {
    map: HashMap<String, Function>,
}

static BUILTIN: LazyLock<Functions> = LazyLock::new(|| {
    let mut functions = Functions::new();
    access::register(&mut functions);
    collections::register(&mut functions);
    aggregate::register(&mut functions);
    logic::register(&mut functions);
    math::register(&mut functions);
    text::register(&mut functions);
    functions
});

impl Functions {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The builtin library
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Adds or replaces a function, returning the one it replaced.
    ///
    /// Query text can only call names that read as identifiers; a function
    /// registered under any other name is reachable through the JSON form.
    pub fn insert(&mut self, name: impl Into<String>, function: Function) -> Option<Function> {
        self.map.insert(name.into(), function)
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        self.map.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Function names in alphabetical order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.map.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// A copy of this registry with `overrides` added on top; on a name
    /// collision the override wins.
    pub fn merged(&self, overrides: &Functions) -> Functions {
        let mut map = self.map.clone();
        map.extend(
            overrides
                .map
                .iter()
                .map(|(name, function)| (name.clone(), function.clone())),
        );
        Functions { map }
    }
}

pub(crate) fn require_array(value: &Value) -> Result<&[Value], RuntimeError> {
    value.as_array().ok_or(RuntimeError::ArrayExpected)
}

pub(crate) fn require_object(value: &Value) -> Result<&IndexMap<String, Value>, RuntimeError> {
    value.as_object().ok_or(RuntimeError::ObjectExpected)
}

/// The single argument of a one-argument higher-order function
pub(crate) fn single_arg<'q>(function: &str, args: &'q [Query]) -> Result<&'q Query, ReferenceError> {
    Arity::exactly(1).check(function, args.len())?;
    Ok(&args[0])
}

/// Rejects arguments given to a function that takes none
pub(crate) fn no_args(function: &str, args: &[Query]) -> Result<(), ReferenceError> {
    Arity::exactly(0).check(function, args.len())
}

/// A literal argument, for parameters fixed at compile time such as the
/// direction of `sort`.
pub(crate) fn literal_arg<'q>(function: &str, arg: &'q Query) -> Result<&'q Value, ReferenceError> {
    match arg {
        Query::Literal(value) => Ok(value),
        other => Err(ReferenceError::invalid_argument(
            function,
            format!("a literal value expected, got {}", other.to_json()),
        )),
    }
}

/// Wraps a function that transforms a whole array
pub(crate) fn on_array<F>(transform: F) -> Eval
where
    F: Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static,
{
    eval(move |data| transform(require_array(data)?))
}
