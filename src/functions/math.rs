use rust_decimal::{Decimal, RoundingStrategy, prelude::FromPrimitive, prelude::ToPrimitive};

use super::{Function, Functions};
use crate::value::Value;

/// Binary arithmetic shared by the operators and the aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Op {
    Add,
    Subtract,
    Multiply,
    Divide,
    Mod,
}

pub(super) fn register(functions: &mut Functions) {
    functions.insert(
        "add",
        Function::value(|args| Ok(add(&args[0], &args[1]))).with_arity(2, Some(2)),
    );

    for (name, op) in [
        ("subtract", Op::Subtract),
        ("multiply", Op::Multiply),
        ("divide", Op::Divide),
        ("mod", Op::Mod),
    ] {
        functions.insert(
            name,
            Function::value(move |args| Ok(arithmetic(op, &args[0], &args[1]))).with_arity(2, Some(2)),
        );
    }

    functions.insert(
        "pow",
        Function::value(|args| Ok(pow(&args[0], &args[1]))).with_arity(2, Some(2)),
    );

    functions.insert(
        "abs",
        Function::value(|args| {
            Ok(match &args[0] {
                Value::Integer(n) => n.checked_abs().map_or(Value::Float((*n as f64).abs()), Value::Integer),
                Value::Float(n) => Value::Float(n.abs()),
                _ => Value::Null,
            })
        })
        .with_arity(1, Some(1)),
    );

    functions.insert(
        "round",
        Function::value(|args| {
            let digits = match args.get(1) {
                None => None,
                Some(digits) => match digits.as_int() {
                    Some(digits) => Some(digits),
                    None => return Ok(Value::Null),
                },
            };
            Ok(round(&args[0], digits))
        })
        .with_arity(1, Some(2)),
    );
}

/// Numeric addition, or concatenation when either side is a string
pub(super) fn add(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::String(_), _) | (_, Value::String(_)) => {
            Value::String(format!("{}{}", a.as_string(), b.as_string()))
        }
        _ => arithmetic(Op::Add, a, b),
    }
}

/// Numbers only; anything else gives null, and so does a zero divisor.
///
/// Two integers stay integers unless the result overflows or, for
/// division, is fractional. A mix of integer and float is computed in
/// decimal and comes back as an integer when the result is whole, so
/// `0.5 * 4` is `2`. `mod` takes the sign of the divisor.
pub(super) fn arithmetic(op: Op, a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => integer_op(op, *x, *y),
        (Value::Float(x), Value::Float(y)) => float_op(op, *x, *y),
        (Value::Integer(_), Value::Float(_)) | (Value::Float(_), Value::Integer(_)) => {
            decimal_op(op, a, b)
        }
        _ => Value::Null,
    }
}

fn integer_op(op: Op, a: i64, b: i64) -> Value {
    let exact = match op {
        Op::Add => a.checked_add(b),
        Op::Subtract => a.checked_sub(b),
        Op::Multiply => a.checked_mul(b),
        Op::Divide if b == 0 => return Value::Null,
        Op::Divide => match a.checked_rem(b) {
            Some(0) => a.checked_div(b),
            _ => None,
        },
        Op::Mod if b == 0 => return Value::Null,
        Op::Mod => a.checked_rem(b).map(|r| if r != 0 && (r < 0) != (b < 0) { r + b } else { r }),
    };

    match exact {
        Some(n) => Value::Integer(n),
        None => float_op(op, a as f64, b as f64),
    }
}

fn float_op(op: Op, a: f64, b: f64) -> Value {
    let result = match op {
        Op::Add => a + b,
        Op::Subtract => a - b,
        Op::Multiply => a * b,
        Op::Divide if b == 0.0 => return Value::Null,
        Op::Divide => a / b,
        Op::Mod if b == 0.0 => return Value::Null,
        Op::Mod => {
            let r = a % b;
            if r != 0.0 && (r < 0.0) != (b < 0.0) { r + b } else { r }
        }
    };
    Value::Float(result)
}

fn decimal_op(op: Op, a: &Value, b: &Value) -> Value {
    if let Some(x) = to_decimal(a)
        && let Some(y) = to_decimal(b)
    {
        let result = match op {
            Op::Add => x.checked_add(y),
            Op::Subtract => x.checked_sub(y),
            Op::Multiply => x.checked_mul(y),
            Op::Divide if y.is_zero() => return Value::Null,
            Op::Divide => x.checked_div(y),
            Op::Mod if y.is_zero() => return Value::Null,
            Op::Mod => x.checked_rem(y).map(|r| {
                if !r.is_zero() && r.is_sign_negative() != y.is_sign_negative() { r + y } else { r }
            }),
        };

        if let Some(rd) = result {
            if rd.is_integer()
                && let Some(n) = rd.to_i64()
            {
                return Value::Integer(n);
            } else if let Some(n) = rd.to_f64() {
                return Value::Float(n);
            }
        }
    }

    // Outside the decimal range
    match (a.as_float(), b.as_float()) {
        (Some(x), Some(y)) => float_op(op, x, y),
        _ => Value::Null,
    }
}

fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Integer(n) => Decimal::from_i64(*n),
        Value::Float(n) => Decimal::from_f64(*n),
        _ => None,
    }
}

fn pow(base: &Value, exponent: &Value) -> Value {
    if let (Value::Integer(b), Value::Integer(e)) = (base, exponent)
        && let Ok(e) = u32::try_from(*e)
        && let Some(n) = b.checked_pow(e)
    {
        return Value::Integer(n);
    }

    match (base.as_float(), exponent.as_float()) {
        (Some(b), Some(e)) => {
            let n = b.powf(e);
            if n.is_finite() { Value::Float(n) } else { Value::Null }
        }
        _ => Value::Null,
    }
}

/// Rounds half away from zero. Integers stay integers; a float rounded
/// without `digits` becomes an integer, with `digits` it stays a float.
/// Negative `digits` round to tens, hundreds and so on.
fn round(value: &Value, digits: Option<i64>) -> Value {
    let places = digits.unwrap_or(0);

    match value {
        Value::Integer(_) if places >= 0 => value.clone(),
        Value::Integer(_) | Value::Float(_) => {
            let Some(rounded) = to_decimal(value).and_then(|x| round_decimal(x, places)) else {
                // Non-finite floats, or beyond the decimal range
                return value.clone();
            };

            let keep_float = matches!(value, Value::Float(_)) && digits.is_some();
            match rounded.to_i64() {
                Some(n) if !keep_float => Value::Integer(n),
                _ => rounded.to_f64().map_or(Value::Null, Value::Float),
            }
        }
        _ => Value::Null,
    }
}

fn round_decimal(x: Decimal, places: i64) -> Option<Decimal> {
    if places >= 0 {
        let places = u32::try_from(places).unwrap_or(u32::MAX).min(28);
        return Some(x.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero));
    }

    let scale = u32::try_from(places.unsigned_abs())
        .ok()
        .and_then(|p| 10_i64.checked_pow(p))
        .and_then(Decimal::from_i64);
    match scale {
        Some(scale) => x
            .checked_div(scale)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .checked_mul(scale),
        // Rounding to more digits than any value has
        None => Some(Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_arithmetic() {
        assert_eq!(arithmetic(Op::Add, &Value::Integer(2), &Value::Integer(3)), Value::Integer(5));
        assert!(matches!(
            arithmetic(Op::Divide, &Value::Integer(6), &Value::Integer(3)),
            Value::Integer(2)
        ));
        assert!(matches!(
            arithmetic(Op::Divide, &Value::Integer(7), &Value::Integer(2)),
            Value::Float(n) if n == 3.5
        ));
        assert!(matches!(
            arithmetic(Op::Add, &Value::Integer(i64::MAX), &Value::Integer(1)),
            Value::Float(_)
        ));
    }

    #[test]
    fn test_mixed_arithmetic_uses_decimal() {
        assert!(matches!(
            arithmetic(Op::Add, &Value::Float(0.5), &Value::Integer(1)),
            Value::Float(n) if n == 1.5
        ));
        assert!(matches!(
            arithmetic(Op::Multiply, &Value::Float(0.5), &Value::Integer(4)),
            Value::Integer(2)
        ));
    }

    #[test]
    fn test_zero_divisor_is_null() {
        assert_eq!(arithmetic(Op::Divide, &Value::Integer(1), &Value::Integer(0)), Value::Null);
        assert_eq!(arithmetic(Op::Mod, &Value::Float(1.0), &Value::Float(0.0)), Value::Null);
        assert_eq!(arithmetic(Op::Divide, &Value::Float(1.0), &Value::Integer(0)), Value::Null);
    }

    #[test]
    fn test_mod_takes_divisor_sign() {
        assert_eq!(arithmetic(Op::Mod, &Value::Integer(-7), &Value::Integer(3)), Value::Integer(2));
        assert_eq!(arithmetic(Op::Mod, &Value::Integer(7), &Value::Integer(-3)), Value::Integer(-2));
        assert_eq!(arithmetic(Op::Mod, &Value::Float(-1.5), &Value::Float(1.0)), Value::Float(0.5));
    }

    #[test]
    fn test_non_numbers_are_null() {
        assert_eq!(arithmetic(Op::Subtract, &Value::from("a"), &Value::Integer(1)), Value::Null);
        assert_eq!(add(&Value::from("a"), &Value::Null), Value::from("anull"));
        assert_eq!(add(&Value::Integer(1), &Value::from("x")), Value::from("1x"));
    }

    #[test]
    fn test_round() {
        assert!(matches!(round(&Value::Float(2.5), None), Value::Integer(3)));
        assert!(matches!(round(&Value::Float(-2.5), None), Value::Integer(-3)));
        assert!(matches!(round(&Value::Float(2.25), Some(1)), Value::Float(n) if n == 2.3));
        assert!(matches!(round(&Value::Integer(1250), Some(-2)), Value::Integer(1300)));
        assert_eq!(round(&Value::from("2.5"), None), Value::Null);
    }

    #[test]
    fn test_pow() {
        assert!(matches!(pow(&Value::Integer(2), &Value::Integer(10)), Value::Integer(1024)));
        assert!(matches!(pow(&Value::Integer(2), &Value::Integer(-1)), Value::Float(n) if n == 0.5));
        assert_eq!(pow(&Value::Float(-8.0), &Value::Float(0.5)), Value::Null);
    }
}
