use std::cmp::Ordering;

use super::{Arity, Function, Functions};
use crate::{compiler::eval, value::Value};

pub(super) fn register(functions: &mut Functions) {
    // Value functions evaluate every argument before deciding, so `and` and
    // `or` never skip an operand
    functions.insert(
        "and",
        Function::value(|args| {
            Ok(match args.iter().find(|value| !value.is_truthy()) {
                Some(falsy) => falsy.clone(),
                None => args.last().cloned().unwrap_or_default(),
            })
        }),
    );

    functions.insert(
        "or",
        Function::value(|args| {
            Ok(match args.iter().find(|value| value.is_truthy()) {
                Some(truthy) => truthy.clone(),
                None => args.last().cloned().unwrap_or_default(),
            })
        }),
    );

    functions.insert(
        "not",
        Function::value(|args| Ok(Value::Boolean(!args[0].is_truthy()))).with_arity(1, Some(1)),
    );

    let comparisons: [(&str, fn(&Value, &Value) -> bool); 6] = [
        ("eq", |a, b| a == b),
        ("ne", |a, b| a != b),
        ("gt", |a, b| a.compare_same_type(b) == Some(Ordering::Greater)),
        ("gte", |a, b| a.compare_same_type(b) == Some(Ordering::Greater) || a == b),
        ("lt", |a, b| a.compare_same_type(b) == Some(Ordering::Less)),
        ("lte", |a, b| a.compare_same_type(b) == Some(Ordering::Less) || a == b),
    ];
    for (name, compare) in comparisons {
        functions.insert(
            name,
            Function::value(move |args| Ok(Value::Boolean(compare(&args[0], &args[1]))))
                .with_arity(2, Some(2)),
        );
    }

    functions.insert(
        "if",
        Function::higher_order(|args, compiler| {
            Arity::exactly(3).check("if", args.len())?;
            let condition = compiler.compile(&args[0])?;
            let then = compiler.compile(&args[1])?;
            let otherwise = compiler.compile(&args[2])?;

            Ok(eval(move |data| {
                if condition(data)?.is_truthy() {
                    then(data)
                } else {
                    otherwise(data)
                }
            }))
        }),
    );

    // The candidates are any query producing an array, usually an array
    // literal; anything else contains nothing
    functions.insert(
        "in",
        Function::value(|args| Ok(Value::Boolean(contains(&args[1], &args[0])))).with_arity(2, Some(2)),
    );
    for name in ["not in", "notIn"] {
        functions.insert(
            name,
            Function::value(|args| Ok(Value::Boolean(!contains(&args[1], &args[0]))))
                .with_arity(2, Some(2)),
        );
    }
}

fn contains(candidates: &Value, value: &Value) -> bool {
    candidates
        .as_array()
        .is_some_and(|items| items.contains(value))
}
