//! Value coercion at INSERT sites
//!
//! `coerce` rewrites a VALUES cell to the schema column's type: literals
//! are converted in place (or rejected), an explicit cast over a literal is
//! folded to the cast's result, and a non-literal expression passes through
//! unchanged when its type promotes losslessly to the target.

use super::bound_expression::{BoundExpression, BoundExpressionKind};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use quail_common::{Error, Result, Value, ValueType};
use rust_decimal::Decimal;

/// Produce a replacement expression carrying `target` for an INSERT cell
pub fn coerce(expr: &BoundExpression, target: &ValueType) -> Result<BoundExpression> {
    if expr.return_type == *target && !matches!(expr.kind, BoundExpressionKind::Cast { .. }) {
        return Ok(expr.clone());
    }

    match &expr.kind {
        BoundExpressionKind::Constant(value) => {
            let converted = convert_value(value, target)?;
            Ok(replacement(expr, converted, *target))
        }

        BoundExpressionKind::Cast {
            expr: inner,
            target_type,
        } => {
            if let BoundExpressionKind::Constant(value) = &inner.kind {
                // Fold the cast first, then carry the result to the column type
                let casted = convert_value(value, target_type)?;
                let converted = convert_value(&casted, target)?;
                Ok(replacement(expr, converted, *target))
            } else if target_type == target {
                Ok(expr.clone())
            } else {
                Err(mismatch(target, &expr.return_type))
            }
        }

        _ => {
            if expr.return_type.promotes_to(target) {
                Ok(expr.clone())
            } else {
                Err(mismatch(target, &expr.return_type))
            }
        }
    }
}

fn replacement(
    original: &BoundExpression,
    value: Value,
    value_type: ValueType,
) -> BoundExpression {
    let display_name = value.to_string();
    BoundExpression {
        kind: BoundExpressionKind::Constant(value),
        return_type: value_type,
        depth: original.depth,
        has_subquery: false,
        display_name,
        alias: original.alias.clone(),
    }
}

fn mismatch(expected: &ValueType, got: &ValueType) -> Error {
    Error::TypeMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    }
}

/// Convert a literal to the target type, or fail with a type mismatch
fn convert_value(value: &Value, target: &ValueType) -> Result<Value> {
    if value.value_type() == *target {
        return Ok(value.clone());
    }

    // A NULL literal takes on whatever type the column has
    if value.is_null() {
        return Ok(Value::Null);
    }

    if let Some(i) = value.as_i64() {
        return integer_to(i, target).ok_or_else(|| mismatch(target, &value.value_type()));
    }

    match (value, target) {
        (Value::Varchar(s), ValueType::Date) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Value::Date)
            .map_err(|_| mismatch(target, &ValueType::Varchar)),

        (Value::Varchar(s), ValueType::Timestamp) => {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
                .or_else(|_| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d").map(|d| d.and_time(NaiveTime::MIN))
                })
                .map(Value::Timestamp)
                .map_err(|_| mismatch(target, &ValueType::Varchar))
        }

        (Value::Date(d), ValueType::Timestamp) => Ok(Value::Timestamp(d.and_time(NaiveTime::MIN))),

        (other, _) => Err(mismatch(target, &other.value_type())),
    }
}

/// Carry an integer into the target type, range-checked
fn integer_to(i: i64, target: &ValueType) -> Option<Value> {
    match target {
        ValueType::TinyInt => i8::try_from(i).ok().map(Value::TinyInt),
        ValueType::SmallInt => i16::try_from(i).ok().map(Value::SmallInt),
        ValueType::Integer => i32::try_from(i).ok().map(Value::Integer),
        ValueType::BigInt => Some(Value::BigInt(i)),
        ValueType::Decimal => Some(Value::Decimal(Decimal::from(i))),
        _ => None,
    }
}
