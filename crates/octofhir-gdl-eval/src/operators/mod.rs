//! Operator implementations
//!
//! Each submodule adds methods to [`GdlEngine`] or provides the pure
//! operator functions they are built on.

pub mod aggregate;
pub mod arithmetic;
pub mod comparison;
pub mod datetime;
pub mod logical;

use chrono::{DateTime, FixedOffset};
use octofhir_gdl_ast::{BinaryExpression, OperatorKind};
use octofhir_gdl_types::{DataValue, TimePeriod, TimeUnit, date_epoch_millis};

use crate::context::EvaluationContext;
use crate::engine::GdlEngine;
use crate::environment::VariableEnvironment;
use crate::error::{EvalError, EvalResult};

impl GdlEngine {
    /// Evaluate a binary expression
    pub(crate) fn eval_binary(
        &self,
        expr: &BinaryExpression,
        env: &VariableEnvironment,
        ctx: &mut EvaluationContext<'_>,
    ) -> EvalResult<DataValue> {
        match expr.operator {
            OperatorKind::Or => self.eval_or(expr, env, ctx),
            OperatorKind::And => self.eval_and(expr, env, ctx),
            OperatorKind::IsA | OperatorKind::IsNotA => self.eval_subsumption(expr, env, ctx),
            op => {
                let left = self.evaluate(&expr.left, env, ctx)?;
                let right = self.evaluate(&expr.right, env, ctx)?;
                apply_binary(op, &left, &right, ctx.now())
                    .map_err(|e| e.in_expression(expr.to_string(), vec![left, right]))
            }
        }
    }
}

/// Apply a non-logical binary operator to two evaluated operands
pub fn apply_binary(
    op: OperatorKind,
    left: &DataValue,
    right: &DataValue,
    now: DateTime<FixedOffset>,
) -> EvalResult<DataValue> {
    if matches!(left, DataValue::Duration(_)) || matches!(right, DataValue::Duration(_)) {
        return datetime::datetime_math(op, left, right, now);
    }
    if op.is_equality() {
        let equal = comparison::values_equal(left, right, now);
        return Ok(DataValue::Boolean(if op == OperatorKind::Equality {
            equal
        } else {
            !equal
        }));
    }
    if op.is_relational() {
        return comparison::compare(op, left, right, now).map(DataValue::Boolean);
    }
    if op.is_arithmetic() {
        return arithmetic::arithmetic(op, left, right, now);
    }
    Err(EvalError::unsupported_operator(op.symbol(), operand_types(left, right)))
}

/// Numeric view of a value.
///
/// Time quantities and periods become their length in milliseconds counted
/// from `now`, dates and date-times their epoch milliseconds, strings are
/// parsed.
pub fn to_double(value: &DataValue, now: DateTime<FixedOffset>) -> Option<f64> {
    match value {
        DataValue::Int(i) | DataValue::Count(i) => Some(*i as f64),
        DataValue::Double(d) => Some(*d),
        DataValue::Ordinal(o) => Some(o.value as f64),
        DataValue::Quantity(q) => match TimeUnit::from_symbol(&q.units) {
            Some(unit) => period_millis(&TimePeriod::new(q.magnitude, unit), now),
            None => Some(q.magnitude),
        },
        DataValue::Duration(p) => period_millis(p, now),
        DataValue::Date(d) => Some(date_epoch_millis(d) as f64),
        DataValue::DateTime(dt) => Some(dt.epoch_millis() as f64),
        DataValue::String(s) | DataValue::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn period_millis(period: &TimePeriod, now: DateTime<FixedOffset>) -> Option<f64> {
    period.millis_from(now).map(|ms| ms as f64)
}

/// Numeric view or a type mismatch naming the operand's kind
pub(crate) fn require_number(value: &DataValue, now: DateTime<FixedOffset>) -> EvalResult<f64> {
    to_double(value, now).ok_or_else(|| EvalError::type_mismatch("number", value.kind().name()))
}

pub(crate) fn operand_types(left: &DataValue, right: &DataValue) -> String {
    format!("{} and {}", left.kind(), right.kind())
}
