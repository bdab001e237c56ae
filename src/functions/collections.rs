use indexmap::IndexMap;

use super::{Arity, Function, Functions, literal_arg, no_args, on_array, require_object, single_arg};
use crate::{
    compiler::{Eval, eval},
    error::{ReferenceError, RuntimeError},
    value::Value,
};

pub(super) fn register(functions: &mut Functions) {
    functions.insert(
        "filter",
        Function::higher_order(|args, compiler| {
            let predicate = compiler.compile(single_arg("filter", args)?)?;
            Ok(on_array(move |items| {
                let mut kept = Vec::new();
                for item in items {
                    if predicate(item)?.is_truthy() {
                        kept.push(item.clone());
                    }
                }
                Ok(Value::Array(kept))
            }))
        }),
    );

    functions.insert(
        "map",
        Function::higher_order(|args, compiler| {
            let callback = compiler.compile(single_arg("map", args)?)?;
            Ok(on_array(move |items| {
                items
                    .iter()
                    .map(&callback)
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }))
        }),
    );

    functions.insert(
        "mapObject",
        Function::higher_order(|args, compiler| {
            let callback = compiler.compile(single_arg("mapObject", args)?)?;
            Ok(eval(move |data| {
                let mut object = IndexMap::new();
                for (key, value) in require_object(data)? {
                    let entry = IndexMap::from([
                        ("key".to_string(), Value::String(key.clone())),
                        ("value".to_string(), value.clone()),
                    ]);
                    let result = callback(&Value::Object(entry))?;
                    let result = require_object(&result)?;

                    let new_key = result.get("key").map_or_else(|| "null".to_string(), Value::as_string);
                    let new_value = result.get("value").cloned().unwrap_or_default();
                    object.insert(new_key, new_value);
                }
                Ok(Value::Object(object))
            }))
        }),
    );

    functions.insert(
        "mapKeys",
        Function::higher_order(|args, compiler| {
            let callback = compiler.compile(single_arg("mapKeys", args)?)?;
            Ok(eval(move |data| {
                let mut object = IndexMap::new();
                for (key, value) in require_object(data)? {
                    let new_key = callback(&Value::String(key.clone()))?.as_string();
                    object.insert(new_key, value.clone());
                }
                Ok(Value::Object(object))
            }))
        }),
    );

    functions.insert(
        "mapValues",
        Function::higher_order(|args, compiler| {
            let callback = compiler.compile(single_arg("mapValues", args)?)?;
            Ok(eval(move |data| {
                let mut object = IndexMap::new();
                for (key, value) in require_object(data)? {
                    object.insert(key.clone(), callback(value)?);
                }
                Ok(Value::Object(object))
            }))
        }),
    );

    functions.insert(
        "sort",
        Function::higher_order(|args, compiler| {
            Arity::between(0, 2).check("sort", args.len())?;

            let getter = args.first().map(|path| compiler.compile(path)).transpose()?;
            let descending = match args.get(1).map(|arg| literal_arg("sort", arg)).transpose()? {
                None => false,
                Some(Value::String(direction)) if direction == "asc" => false,
                Some(Value::String(direction)) if direction == "desc" => true,
                Some(other) => {
                    return Err(ReferenceError::invalid_argument(
                        "sort",
                        format!("direction must be \"asc\" or \"desc\", got {}", other.as_string()),
                    ));
                }
            };

            Ok(on_array(move |items| {
                let keys = match &getter {
                    Some(getter) => items.iter().map(getter).collect::<Result<Vec<_>, _>>()?,
                    None => items.to_vec(),
                };

                // Stable: equal keys keep their input order in both directions
                let mut order: Vec<usize> = (0..items.len()).collect();
                order.sort_by(|&a, &b| {
                    let ordering = keys[a].sort_cmp(&keys[b]);
                    if descending { ordering.reverse() } else { ordering }
                });

                Ok(Value::Array(order.into_iter().map(|i| items[i].clone()).collect()))
            }))
        }),
    );

    functions.insert(
        "reverse",
        Function::higher_order(|args, _| {
            no_args("reverse", args)?;
            Ok(on_array(|items| Ok(Value::Array(items.iter().rev().cloned().collect()))))
        }),
    );

    functions.insert(
        "groupBy",
        Function::higher_order(|args, compiler| {
            let getter = compiler.compile(single_arg("groupBy", args)?)?;
            Ok(on_array(move |items| {
                let mut groups: IndexMap<String, Vec<Value>> = IndexMap::new();
                for item in items {
                    let key = getter(item)?.as_string();
                    groups.entry(key).or_default().push(item.clone());
                }
                Ok(Value::Object(
                    groups
                        .into_iter()
                        .map(|(key, members)| (key, Value::Array(members)))
                        .collect(),
                ))
            }))
        }),
    );

    functions.insert(
        "keyBy",
        Function::higher_order(|args, compiler| {
            let getter = compiler.compile(single_arg("keyBy", args)?)?;
            Ok(on_array(move |items| Ok(Value::Object(key_by(&getter, items)?))))
        }),
    );

    functions.insert(
        "flatten",
        Function::higher_order(|args, _| {
            no_args("flatten", args)?;
            Ok(on_array(|items| {
                let mut flat = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::Array(inner) => flat.extend(inner.iter().cloned()),
                        other => flat.push(other.clone()),
                    }
                }
                Ok(Value::Array(flat))
            }))
        }),
    );

    functions.insert(
        "uniq",
        Function::higher_order(|args, _| {
            no_args("uniq", args)?;
            Ok(on_array(|items| {
                let mut unique: Vec<Value> = Vec::new();
                for item in items {
                    if !unique.contains(item) {
                        unique.push(item.clone());
                    }
                }
                Ok(Value::Array(unique))
            }))
        }),
    );

    functions.insert(
        "uniqBy",
        Function::higher_order(|args, compiler| {
            let getter = compiler.compile(single_arg("uniqBy", args)?)?;
            Ok(on_array(move |items| {
                Ok(Value::Array(key_by(&getter, items)?.into_values().collect()))
            }))
        }),
    );

    functions.insert(
        "limit",
        Function::higher_order(|args, _| {
            let count = match literal_arg("limit", single_arg("limit", args)?)?.as_int() {
                Some(count) => usize::try_from(count).unwrap_or(0),
                None => {
                    return Err(ReferenceError::invalid_argument(
                        "limit",
                        "an integer count expected",
                    ));
                }
            };
            Ok(on_array(move |items| Ok(Value::Array(items.iter().take(count).cloned().collect()))))
        }),
    );

    functions.insert(
        "size",
        Function::higher_order(|args, _| {
            no_args("size", args)?;
            Ok(eval(|data| {
                let size = match data {
                    Value::Array(items) => items.len(),
                    Value::Object(entries) => entries.len(),
                    Value::String(text) => text.chars().count(),
                    _ => return Ok(Value::Null),
                };
                Ok(Value::Integer(size as i64))
            }))
        }),
    );

    functions.insert(
        "keys",
        Function::higher_order(|args, _| {
            no_args("keys", args)?;
            Ok(eval(|data| {
                let keys = require_object(data)?.keys().cloned().map(Value::String).collect();
                Ok(Value::Array(keys))
            }))
        }),
    );

    functions.insert(
        "values",
        Function::higher_order(|args, _| {
            no_args("values", args)?;
            Ok(eval(|data| Ok(Value::Array(require_object(data)?.values().cloned().collect()))))
        }),
    );
}

/// First item per key, keys in order of first appearance
fn key_by(getter: &Eval, items: &[Value]) -> Result<IndexMap<String, Value>, RuntimeError> {
    let mut keyed = IndexMap::new();
    for item in items {
        let key = getter(item)?.as_string();
        keyed.entry(key).or_insert_with(|| item.clone());
    }
    Ok(keyed)
}
