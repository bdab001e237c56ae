use std::fmt;

use tracing::trace;

use crate::{
    ast::Query,
    error::{ReferenceError, RuntimeError},
    functions::Functions,
    parser::DEFAULT_MAX_DEPTH,
    value::Value,
};

/// A compiled query node: input document in, result out.
pub type Eval = Box<dyn Fn(&Value) -> Result<Value, RuntimeError> + Send + Sync>;

/// Boxes a closure as an [`Eval`]
pub fn eval<F>(f: F) -> Eval
where
    F: Fn(&Value) -> Result<Value, RuntimeError> + Send + Sync + 'static,
{
    Box::new(f)
}

/// A compiled query.
///
/// Built once from a [`Query`]; holds no mutable state, so it can be run
/// any number of times, from any number of threads.
///
/// # Examples
///
/// ```
/// use jsonquery_lang::{compile, Options, Query, Value};
/// use serde_json::json;
///
/// let query = Query::from_json(&json!(["sort", ["get", "age"], "desc"])).unwrap();
/// let executor = compile(&query, &Options::default()).unwrap();
///
/// let people = Value::from(json!([{"age": 19}, {"age": 32}]));
/// assert_eq!(
///     executor.evaluate(&people).unwrap(),
///     Value::from(json!([{"age": 32}, {"age": 19}]))
/// );
/// ```
pub struct Executor {
    eval: Eval,
}

impl Executor {
    pub fn evaluate(&self, data: &Value) -> Result<Value, RuntimeError> {
        (self.eval)(data)
    }
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor").finish_non_exhaustive()
    }
}

/// Turns queries into [`Eval`] closures against a function registry.
///
/// Higher-order functions receive the compiler to compile the argument
/// queries they need; it tracks nesting so that deep trees fail with
/// [`ReferenceError::RecursionLimitExceeded`] instead of exhausting the
/// stack.
#[derive(Clone, Copy)]
pub struct Compiler<'f> {
    functions: &'f Functions,
    max_depth: usize,
    depth: usize,
}

impl<'f> Compiler<'f> {
    pub fn new(functions: &'f Functions) -> Self {
        Compiler {
            functions,
            max_depth: DEFAULT_MAX_DEPTH,
            depth: 0,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn compile(&self, query: &Query) -> Result<Eval, ReferenceError> {
        match query {
            Query::Literal(value) => {
                let value = value.clone();
                Ok(eval(move |_| Ok(value.clone())))
            }
            Query::Call { name, args } => {
                if self.depth >= self.max_depth {
                    return Err(ReferenceError::RecursionLimitExceeded {
                        limit: self.max_depth,
                    });
                }

                let function = self
                    .functions
                    .get(name)
                    .ok_or_else(|| ReferenceError::UnknownFunction(name.clone()))?;
                trace!(function = %name, args = args.len(), "compiling call");

                let nested = Compiler {
                    depth: self.depth + 1,
                    ..*self
                };
                function.build(name, args, &nested)
            }
            Query::Mapping(_) => Err(ReferenceError::MappingNotAllowed),
        }
    }

    pub fn compile_all(&self, queries: &[Query]) -> Result<Vec<Eval>, ReferenceError> {
        queries.iter().map(|query| self.compile(query)).collect()
    }

    pub fn executor(&self, query: &Query) -> Result<Executor, ReferenceError> {
        Ok(Executor {
            eval: self.compile(query)?,
        })
    }
}
