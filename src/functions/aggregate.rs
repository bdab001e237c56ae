use super::{
    Function, Functions,
    math::{Op, add, arithmetic},
    no_args, on_array,
};
use crate::value::Value;

pub(super) fn register(functions: &mut Functions) {
    functions.insert(
        "sum",
        Function::higher_order(|args, _| {
            no_args("sum", args)?;
            Ok(on_array(|items| Ok(sum(items))))
        }),
    );

    functions.insert(
        "prod",
        Function::higher_order(|args, _| {
            no_args("prod", args)?;
            Ok(on_array(|items| {
                let Some((first, rest)) = items.split_first() else {
                    return Ok(Value::Null);
                };
                Ok(rest
                    .iter()
                    .fold(numeric(first), |product, item| arithmetic(Op::Multiply, &product, item)))
            }))
        }),
    );

    functions.insert(
        "average",
        Function::higher_order(|args, _| {
            no_args("average", args)?;
            Ok(on_array(|items| {
                if items.is_empty() {
                    return Ok(Value::Null);
                }
                let count = Value::Integer(items.len() as i64);
                Ok(arithmetic(Op::Divide, &sum(items), &count))
            }))
        }),
    );

    functions.insert(
        "min",
        Function::higher_order(|args, _| {
            no_args("min", args)?;
            Ok(on_array(|items| {
                Ok(items.iter().min_by(|a, b| a.sort_cmp(b)).cloned().unwrap_or_default())
            }))
        }),
    );

    functions.insert(
        "max",
        Function::higher_order(|args, _| {
            no_args("max", args)?;
            Ok(on_array(|items| {
                Ok(items.iter().max_by(|a, b| a.sort_cmp(b)).cloned().unwrap_or_default())
            }))
        }),
    );
}

/// Sum of numbers; null as soon as any item is not a number
fn sum(items: &[Value]) -> Value {
    items.iter().fold(Value::Integer(0), |total, item| match item {
        Value::Integer(_) | Value::Float(_) => add(&total, item),
        _ => Value::Null,
    })
}

fn numeric(value: &Value) -> Value {
    if value.is_number() { value.clone() } else { Value::Null }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use crate::{Options, Query, RuntimeError, Value, compile};

    fn run(function: &str, data: serde_json::Value) -> Result<Value, RuntimeError> {
        compile(&Query::call(function, vec![]), &Options::default())
            .unwrap()
            .evaluate(&Value::from(data))
    }

    #[rstest]
    #[case("sum", json!([1, 2, 3]), json!(6))]
    #[case("sum", json!([]), json!(0))]
    #[case("sum", json!([1, "2"]), json!(null))]
    #[case("prod", json!([2, 3, 4]), json!(24))]
    #[case("prod", json!([]), json!(null))]
    #[case("average", json!([2, 4]), json!(3))]
    #[case("average", json!([1, 2]), json!(1.5))]
    #[case("average", json!([]), json!(null))]
    #[case("min", json!([3, 1.5, 2]), json!(1.5))]
    #[case("max", json!([3, 1.5, 2]), json!(3))]
    #[case("max", json!([]), json!(null))]
    fn test_aggregates(
        #[case] function: &str,
        #[case] data: serde_json::Value,
        #[case] expected: serde_json::Value,
    ) {
        assert_eq!(run(function, data).unwrap(), Value::from(expected));
    }

    #[test]
    fn test_aggregates_require_array() {
        for function in ["sum", "prod", "average", "min", "max"] {
            assert_eq!(run(function, json!({"a": 1})), Err(RuntimeError::ArrayExpected));
        }
    }
}
