//! Expression binding
//!
//! Turns `sqlparser` expressions into annotated `BoundExpression` trees.
//! Column references are resolved through the binder's scope-frame stack,
//! so correlated references inside subqueries find their enclosing tables.
//! Leaves are built with `BoundExpression::leaf`; every interior node goes
//! through `BoundExpression::derive`, which owns the depth and subquery
//! computation.

use super::{
    AggregateFunction, Binder, BoundBinaryOperator, BoundExpression, BoundExpressionKind,
    BoundUnaryOperator,
};
use chrono::{NaiveDate, NaiveDateTime};
use quail_common::{Error, Result, Value, ValueType};
use rust_decimal::Decimal;
use sqlparser::ast as sql;

/// Depth of the innermost scope frame, or 0 outside any frame
fn current_depth(binder: &Binder) -> u32 {
    binder.context().map(|c| c.depth()).unwrap_or(0)
}

/// Bind an expression
pub(crate) fn bind_expression(binder: &mut Binder, expr: &sql::Expr) -> Result<BoundExpression> {
    match expr {
        sql::Expr::Value(value) => bind_value(value, current_depth(binder)),

        sql::Expr::Identifier(ident) => bind_column_ref(binder, std::slice::from_ref(ident)),

        sql::Expr::CompoundIdentifier(idents) => bind_column_ref(binder, idents),

        sql::Expr::BinaryOp { left, op, right } => {
            let left = bind_expression(binder, left)?;
            let right = bind_expression(binder, right)?;
            let op = bind_binary_op(op)?;
            let return_type = op.result_type(&left.return_type, &right.return_type);
            let display_name = format!("{} {} {}", left.display_name, op, right.display_name);
            Ok(BoundExpression::derive(
                BoundExpressionKind::BinaryOp {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                return_type,
                display_name,
                current_depth(binder),
            ))
        }

        sql::Expr::UnaryOp { op, expr } => {
            let bound = bind_expression(binder, expr)?;
            let (op, return_type) = match op {
                sql::UnaryOperator::Minus => (BoundUnaryOperator::Negate, bound.return_type),
                sql::UnaryOperator::Plus => return Ok(bound),
                sql::UnaryOperator::Not => (BoundUnaryOperator::Not, ValueType::Boolean),
                other => {
                    return Err(Error::NotImplemented(format!("unary operator {:?}", other)))
                }
            };
            let display_name = format!("{}{}", op, bound.display_name);
            Ok(BoundExpression::derive(
                BoundExpressionKind::UnaryOp {
                    op,
                    expr: Box::new(bound),
                },
                return_type,
                display_name,
                current_depth(binder),
            ))
        }

        sql::Expr::Nested(inner) => bind_expression(binder, inner),

        sql::Expr::IsNull(inner) => {
            let bound = bind_expression(binder, inner)?;
            let display_name = format!("{} IS NULL", bound.display_name);
            Ok(BoundExpression::derive(
                BoundExpressionKind::IsNull(Box::new(bound)),
                ValueType::Boolean,
                display_name,
                current_depth(binder),
            ))
        }

        sql::Expr::IsNotNull(inner) => {
            let bound = bind_expression(binder, inner)?;
            let display_name = format!("{} IS NOT NULL", bound.display_name);
            Ok(BoundExpression::derive(
                BoundExpressionKind::IsNotNull(Box::new(bound)),
                ValueType::Boolean,
                display_name,
                current_depth(binder),
            ))
        }

        sql::Expr::Between {
            expr,
            negated,
            low,
            high,
        } => {
            let bound = bind_expression(binder, expr)?;
            let low = bind_expression(binder, low)?;
            let high = bind_expression(binder, high)?;
            let display_name = format!("{} BETWEEN", bound.display_name);
            Ok(BoundExpression::derive(
                BoundExpressionKind::Between {
                    expr: Box::new(bound),
                    low: Box::new(low),
                    high: Box::new(high),
                    negated: *negated,
                },
                ValueType::Boolean,
                display_name,
                current_depth(binder),
            ))
        }

        sql::Expr::InList {
            expr,
            list,
            negated,
        } => {
            let bound = bind_expression(binder, expr)?;
            let list = list
                .iter()
                .map(|e| bind_expression(binder, e))
                .collect::<Result<Vec<_>>>()?;
            let display_name = format!("{} IN", bound.display_name);
            Ok(BoundExpression::derive(
                BoundExpressionKind::InList {
                    expr: Box::new(bound),
                    list,
                    negated: *negated,
                },
                ValueType::Boolean,
                display_name,
                current_depth(binder),
            ))
        }

        sql::Expr::Case {
            operand,
            conditions,
            results,
            else_result,
        } => {
            let operand = operand
                .as_ref()
                .map(|e| bind_expression(binder, e))
                .transpose()?;
            let mut when_clauses = Vec::new();
            for (cond, result) in conditions.iter().zip(results.iter()) {
                when_clauses.push((bind_expression(binder, cond)?, bind_expression(binder, result)?));
            }
            let else_result = else_result
                .as_ref()
                .map(|e| bind_expression(binder, e))
                .transpose()?;

            let return_type = when_clauses
                .first()
                .map(|(_, r)| r.return_type)
                .unwrap_or(ValueType::Null);
            Ok(BoundExpression::derive(
                BoundExpressionKind::Case {
                    operand: operand.map(Box::new),
                    when_clauses,
                    else_result: else_result.map(Box::new),
                },
                return_type,
                "CASE".to_string(),
                current_depth(binder),
            ))
        }

        sql::Expr::Cast {
            expr, data_type, ..
        } => {
            let bound = bind_expression(binder, expr)?;
            let target_type = bind_data_type(data_type)?;
            let display_name = format!("CAST({} AS {})", bound.display_name, target_type);
            Ok(BoundExpression::derive(
                BoundExpressionKind::Cast {
                    expr: Box::new(bound),
                    target_type,
                },
                target_type,
                display_name,
                current_depth(binder),
            ))
        }

        // DATE '2020-01-01', TIMESTAMP '2020-01-01 00:00:00'
        sql::Expr::TypedString { data_type, value } => {
            let depth = current_depth(binder);
            match data_type {
                sql::DataType::Date => {
                    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
                        .map_err(|e| Error::Parse(format!("Invalid date: {}", e)))?;
                    Ok(BoundExpression::leaf(
                        BoundExpressionKind::Constant(Value::Date(date)),
                        ValueType::Date,
                        value.clone(),
                        depth,
                    ))
                }
                sql::DataType::Timestamp(_, _) => {
                    let ts = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
                        .map_err(|e| Error::Parse(format!("Invalid timestamp: {}", e)))?;
                    Ok(BoundExpression::leaf(
                        BoundExpressionKind::Constant(Value::Timestamp(ts)),
                        ValueType::Timestamp,
                        value.clone(),
                        depth,
                    ))
                }
                other => Err(Error::NotImplemented(format!(
                    "typed string for {:?}",
                    other
                ))),
            }
        }

        sql::Expr::Function(func) => bind_function(binder, func),

        sql::Expr::Wildcard(_) => {
            let ctx = binder.context().ok_or(Error::InvalidStar)?;
            if !ctx.has_regular_tables() {
                return Err(Error::InvalidStar);
            }
            Ok(BoundExpression::leaf(
                BoundExpressionKind::Star,
                ValueType::Invalid,
                "*".to_string(),
                ctx.depth(),
            ))
        }

        sql::Expr::Subquery(query) => {
            let subselect = super::statement_binder::bind_subquery(binder, query)?;
            let return_type = subselect
                .select_list
                .first()
                .map(|e| e.return_type)
                .unwrap_or(ValueType::Null);
            Ok(BoundExpression::derive(
                BoundExpressionKind::ScalarSubquery(Box::new(subselect)),
                return_type,
                "subquery".to_string(),
                current_depth(binder),
            ))
        }

        sql::Expr::Exists { subquery, negated } => {
            let subselect = super::statement_binder::bind_subquery(binder, subquery)?;
            Ok(BoundExpression::derive(
                BoundExpressionKind::Exists {
                    subquery: Box::new(subselect),
                    negated: *negated,
                },
                ValueType::Boolean,
                "EXISTS".to_string(),
                current_depth(binder),
            ))
        }

        sql::Expr::InSubquery {
            expr,
            subquery,
            negated,
        } => {
            let bound = bind_expression(binder, expr)?;
            let subselect = super::statement_binder::bind_subquery(binder, subquery)?;
            let display_name = format!("{} IN", bound.display_name);
            Ok(BoundExpression::derive(
                BoundExpressionKind::InSubquery {
                    expr: Box::new(bound),
                    subquery: Box::new(subselect),
                    negated: *negated,
                },
                ValueType::Boolean,
                display_name,
                current_depth(binder),
            ))
        }

        other => Err(Error::NotImplemented(format!(
            "expression type: {:?}",
            other
        ))),
    }
}

/// Bind a literal value
fn bind_value(value: &sql::Value, depth: u32) -> Result<BoundExpression> {
    let (val, value_type) = match value {
        sql::Value::Number(n, _) => {
            if let Ok(i) = n.parse::<i64>() {
                if i >= i32::MIN as i64 && i <= i32::MAX as i64 {
                    (Value::Integer(i as i32), ValueType::Integer)
                } else {
                    (Value::BigInt(i), ValueType::BigInt)
                }
            } else if let Ok(d) = n.parse::<Decimal>() {
                (Value::Decimal(d), ValueType::Decimal)
            } else {
                return Err(Error::Parse(format!("Invalid number: {}", n)));
            }
        }
        sql::Value::SingleQuotedString(s) | sql::Value::DoubleQuotedString(s) => {
            (Value::Varchar(s.clone()), ValueType::Varchar)
        }
        sql::Value::Boolean(b) => (Value::Boolean(*b), ValueType::Boolean),
        sql::Value::Null => (Value::Null, ValueType::Null),
        other => {
            return Err(Error::NotImplemented(format!("value type: {:?}", other)));
        }
    };

    let display_name = val.to_string();
    Ok(BoundExpression::leaf(
        BoundExpressionKind::Constant(val),
        value_type,
        display_name,
        depth,
    ))
}

/// Bind a column reference, qualified or not
fn bind_column_ref(binder: &Binder, idents: &[sql::Ident]) -> Result<BoundExpression> {
    let column_name = idents
        .last()
        .map(|i| i.value.clone())
        .ok_or_else(|| Error::Internal("empty column reference".to_string()))?;

    let qualifier = if idents.len() >= 2 {
        Some(idents[idents.len() - 2].value.as_str())
    } else {
        None
    };

    let ctx = binder
        .context()
        .ok_or_else(|| Error::ColumnNotFound(column_name.clone()))?;
    let resolved = match qualifier {
        Some(table) => ctx.resolve_qualified(table, &column_name)?,
        None => ctx.resolve_unqualified(&column_name)?,
    };
    Ok(resolved.into_expression())
}

/// Bind a binary operator
fn bind_binary_op(op: &sql::BinaryOperator) -> Result<BoundBinaryOperator> {
    match op {
        sql::BinaryOperator::Plus => Ok(BoundBinaryOperator::Add),
        sql::BinaryOperator::Minus => Ok(BoundBinaryOperator::Subtract),
        sql::BinaryOperator::Multiply => Ok(BoundBinaryOperator::Multiply),
        sql::BinaryOperator::Divide => Ok(BoundBinaryOperator::Divide),
        sql::BinaryOperator::Modulo => Ok(BoundBinaryOperator::Modulo),
        sql::BinaryOperator::Eq => Ok(BoundBinaryOperator::Equal),
        sql::BinaryOperator::NotEq => Ok(BoundBinaryOperator::NotEqual),
        sql::BinaryOperator::Lt => Ok(BoundBinaryOperator::LessThan),
        sql::BinaryOperator::LtEq => Ok(BoundBinaryOperator::LessThanOrEqual),
        sql::BinaryOperator::Gt => Ok(BoundBinaryOperator::GreaterThan),
        sql::BinaryOperator::GtEq => Ok(BoundBinaryOperator::GreaterThanOrEqual),
        sql::BinaryOperator::And => Ok(BoundBinaryOperator::And),
        sql::BinaryOperator::Or => Ok(BoundBinaryOperator::Or),
        other => Err(Error::NotImplemented(format!("binary operator {:?}", other))),
    }
}

/// Bind a function call
fn bind_function(binder: &mut Binder, func: &sql::Function) -> Result<BoundExpression> {
    let name = func.name.to_string().to_lowercase();

    if func.over.is_some() {
        return Err(Error::NotImplemented(format!("window function {}", name)));
    }

    let (arg_exprs, distinct, star) = match &func.args {
        sql::FunctionArguments::List(list) => {
            let distinct = list.duplicate_treatment == Some(sql::DuplicateTreatment::Distinct);
            let mut exprs = Vec::new();
            let mut star = false;
            for arg in &list.args {
                match arg {
                    sql::FunctionArg::Unnamed(sql::FunctionArgExpr::Expr(e)) => exprs.push(e),
                    sql::FunctionArg::Unnamed(sql::FunctionArgExpr::Wildcard) => star = true,
                    other => {
                        return Err(Error::NotImplemented(format!(
                            "function argument {:?} in {}",
                            other, name
                        )))
                    }
                }
            }
            (exprs, distinct, star)
        }
        sql::FunctionArguments::None => (Vec::new(), false, false),
        sql::FunctionArguments::Subquery(_) => {
            return Err(Error::NotImplemented(format!(
                "subquery argument in {}",
                name
            )))
        }
    };

    let mut args = Vec::new();
    for expr in arg_exprs {
        args.push(bind_expression(binder, expr)?);
    }
    let scope_depth = current_depth(binder);

    let aggregate = match name.as_str() {
        "count" if star => Some(AggregateFunction::CountStar),
        "count" => Some(AggregateFunction::Count),
        "sum" => Some(AggregateFunction::Sum),
        "min" => Some(AggregateFunction::Min),
        "max" => Some(AggregateFunction::Max),
        "avg" => Some(AggregateFunction::Avg),
        _ => None,
    };

    if let Some(function) = aggregate {
        if function == AggregateFunction::CountStar {
            return Ok(BoundExpression::derive(
                BoundExpressionKind::Aggregate {
                    function,
                    arg: None,
                    distinct,
                },
                ValueType::BigInt,
                "count(*)".to_string(),
                scope_depth,
            ));
        }
        if args.len() != 1 {
            return Err(Error::Parse(format!(
                "{}() takes exactly one argument, got {}",
                name,
                args.len()
            )));
        }
        let arg = args.remove(0);
        let return_type = function.return_type(Some(&arg.return_type));
        let display_name = format!("{}({})", function, arg.display_name);
        return Ok(BoundExpression::derive(
            BoundExpressionKind::Aggregate {
                function,
                arg: Some(Box::new(arg)),
                distinct,
            },
            return_type,
            display_name,
            scope_depth,
        ));
    }

    // Small scalar set; anything else is unknown to the binder
    let return_type = match name.as_str() {
        "lower" | "upper" => ValueType::Varchar,
        "length" => ValueType::BigInt,
        "abs" | "coalesce" => args
            .first()
            .map(|a| a.return_type)
            .unwrap_or(ValueType::Null),
        _ => {
            return Err(Error::NotImplemented(format!("function {}", name)));
        }
    };

    let arg_names: Vec<_> = args.iter().map(|a| a.display_name.clone()).collect();
    let display_name = format!("{}({})", name, arg_names.join(", "));
    Ok(BoundExpression::derive(
        BoundExpressionKind::Function { name, args },
        return_type,
        display_name,
        scope_depth,
    ))
}

/// Lower a SQL data type to a ValueType
pub(crate) fn bind_data_type(data_type: &sql::DataType) -> Result<ValueType> {
    match data_type {
        sql::DataType::Boolean => Ok(ValueType::Boolean),
        sql::DataType::TinyInt(_) => Ok(ValueType::TinyInt),
        sql::DataType::SmallInt(_) => Ok(ValueType::SmallInt),
        sql::DataType::Int(_) | sql::DataType::Integer(_) => Ok(ValueType::Integer),
        sql::DataType::BigInt(_) => Ok(ValueType::BigInt),
        sql::DataType::Decimal(_) | sql::DataType::Numeric(_) => Ok(ValueType::Decimal),
        sql::DataType::Varchar(_) | sql::DataType::Text | sql::DataType::String(_) => {
            Ok(ValueType::Varchar)
        }
        sql::DataType::Date => Ok(ValueType::Date),
        sql::DataType::Timestamp(_, _) => Ok(ValueType::Timestamp),
        other => Err(Error::NotImplemented(format!("data type: {:?}", other))),
    }
}
