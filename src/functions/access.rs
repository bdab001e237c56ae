use indexmap::IndexMap;

use super::{Function, Functions, single_arg};
use crate::{ast::Query, compiler::eval, error::ReferenceError, path::Path, value::Value};

pub(super) fn register(functions: &mut Functions) {
    functions.insert(
        "get",
        Function::higher_order(|args, _| {
            let path = Path::from_args("get", args)?;
            Ok(eval(move |data| Ok(path.get(data))))
        }),
    );

    functions.insert(
        "pick",
        Function::higher_order(|args, _| {
            let mut paths = Vec::with_capacity(args.len());
            for arg in args {
                let path = Path::from_get("pick", arg)?;
                let key = path.last_key().ok_or_else(|| {
                    ReferenceError::invalid_argument("pick", "an empty path has no key to pick")
                })?;
                paths.push((key, path));
            }

            let pick = move |item: &Value| -> Value {
                Value::Object(
                    paths
                        .iter()
                        .map(|(key, path)| (key.clone(), path.get(item)))
                        .collect(),
                )
            };

            Ok(eval(move |data| match data {
                Value::Array(items) => Ok(Value::Array(items.iter().map(&pick).collect())),
                item => Ok(pick(item)),
            }))
        }),
    );

    functions.insert(
        "object",
        Function::higher_order(|args, compiler| {
            let entries = match single_arg("object", args)? {
                Query::Mapping(entries) => entries,
                other => {
                    return Err(ReferenceError::invalid_argument(
                        "object",
                        format!("a mapping of keys to queries expected, got {}", other.to_json()),
                    ));
                }
            };

            let getters = entries
                .iter()
                .map(|(key, query)| Ok((key.clone(), compiler.compile(query)?)))
                .collect::<Result<Vec<_>, ReferenceError>>()?;

            Ok(eval(move |data| {
                let mut object = IndexMap::with_capacity(getters.len());
                for (key, getter) in &getters {
                    object.insert(key.clone(), getter(data)?);
                }
                Ok(Value::Object(object))
            }))
        }),
    );

    functions.insert(
        "array",
        Function::higher_order(|args, compiler| {
            let items = compiler.compile_all(args)?;
            Ok(eval(move |data| {
                items
                    .iter()
                    .map(|item| item(data))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }))
        }),
    );

    functions.insert(
        "pipe",
        Function::higher_order(|args, compiler| {
            let stages = compiler.compile_all(args)?;
            Ok(eval(move |data| {
                let Some((first, rest)) = stages.split_first() else {
                    return Ok(data.clone());
                };
                rest.iter()
                    .try_fold(first(data)?, |value, stage| stage(&value))
            }))
        }),
    );

    functions.insert(
        "exists",
        Function::higher_order(|args, _| {
            let path = Path::from_get("exists", single_arg("exists", args)?)?;
            Ok(eval(move |data| Ok(Value::Boolean(path.exists(data)))))
        }),
    );
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{Options, Query, Value, compile};

    fn run(query: serde_json::Value, data: serde_json::Value) -> Value {
        let query = Query::from_json(&query).unwrap();
        compile(&query, &Options::default())
            .unwrap()
            .evaluate(&Value::from(data))
            .unwrap()
    }

    #[test]
    fn test_get_without_path_is_identity() {
        assert_eq!(run(json!(["get"]), json!({"a": 1})), Value::from(json!({"a": 1})));
    }

    #[test]
    fn test_pick_keys_by_last_segment() {
        let result = run(
            json!(["pick", ["get", "name"], ["get", "address", "city"]]),
            json!([{"name": "Chris", "address": {"city": "NY"}}, {"name": "Joe"}]),
        );
        assert_eq!(
            result,
            Value::from(json!([{"name": "Chris", "city": "NY"}, {"name": "Joe", "city": null}]))
        );
    }

    #[test]
    fn test_pipe_threads_output() {
        let result = run(
            json!(["pipe", ["get", "items"], ["map", ["get", "n"]], ["sum"]]),
            json!({"items": [{"n": 1}, {"n": 2}]}),
        );
        assert_eq!(result, Value::Integer(3));
        assert_eq!(run(json!(["pipe"]), json!(5)), Value::Integer(5));
    }

    #[test]
    fn test_pick_requires_paths() {
        let query = Query::from_json(&json!(["pick", "name"])).unwrap();
        assert!(compile(&query, &Options::default()).is_err());
    }
}
