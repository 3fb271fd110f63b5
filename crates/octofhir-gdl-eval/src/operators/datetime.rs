//! DateTime Operators
//!
//! Binary operations where at least one operand is a time period. Periods
//! are measured from the evaluation's "now" when a length is needed, so
//! `(currentDateTime - birth) / 1,a` yields an age in years.

use chrono::{DateTime, FixedOffset, NaiveDate};
use octofhir_gdl_ast::OperatorKind;
use octofhir_gdl_types::{DataValue, DvDateTime, TimePeriod, date_epoch_millis, utc_offset};

use super::arithmetic::apply;
use super::comparison::compare_numbers;
use super::{operand_types, period_millis, to_double};
use crate::error::{EvalError, EvalResult};

/// Apply `op` where one or both operands are durations
pub fn datetime_math(
    op: OperatorKind,
    left: &DataValue,
    right: &DataValue,
    now: DateTime<FixedOffset>,
) -> EvalResult<DataValue> {
    use DataValue as V;
    use OperatorKind::{Addition, Division, Subtraction};

    if left.is_null() || right.is_null() {
        return match op {
            op if op.is_arithmetic() => Err(EvalError::null_operand(op.symbol())),
            OperatorKind::Inequality => Ok(V::Boolean(!(left.is_null() && right.is_null()))),
            OperatorKind::Equality => Ok(V::Boolean(left.is_null() && right.is_null())),
            _ => Ok(V::Boolean(false)),
        };
    }

    match (left, right, op) {
        (V::Duration(a), V::Duration(b), _) => {
            numeric_result(op, length(a, now)?, length(b, now)?)
        }
        (V::DateTime(dt), V::Duration(p), Addition | Subtraction) => {
            shift(dt.to_fixed(), p, op).map(|shifted| V::DateTime(keep_zone(dt, shifted)))
        }
        (V::Duration(p), V::DateTime(dt), Addition) => {
            shift(dt.to_fixed(), p, op).map(|shifted| V::DateTime(keep_zone(dt, shifted)))
        }
        (V::Date(d), V::Duration(p), Addition | Subtraction) => {
            shift(midnight(d)?, p, op).map(|shifted| V::Date(shifted.date_naive()))
        }
        (V::Duration(p), V::Date(d), Addition) => {
            shift(midnight(d)?, p, op).map(|shifted| V::Date(shifted.date_naive()))
        }
        (number, V::Duration(p), Addition | Subtraction) | (V::Duration(p), number, Addition)
            if is_plain_number(number) =>
        {
            let anchor = epoch_anchor(number, now)?;
            shift(anchor, p, op).map(|shifted| V::Int(shifted.timestamp_millis()))
        }
        // Anything with a numeric view (date-times as epoch millis, time
        // quantities as millis from now) divides by or compares with a period
        (value, V::Duration(p), Division) if has_number(value, now) => {
            Ok(V::Double(plain(value, now)? / length(p, now)?))
        }
        (value, V::Duration(p), _) if has_number(value, now) && !op.is_arithmetic() => {
            numeric_result(op, plain(value, now)?, length(p, now)?)
        }
        (V::Duration(p), value, _) if has_number(value, now) && !op.is_arithmetic() => {
            numeric_result(op, length(p, now)?, plain(value, now)?)
        }
        _ => Err(EvalError::unsupported_operator(op.symbol(), operand_types(left, right))),
    }
}

fn numeric_result(op: OperatorKind, a: f64, b: f64) -> EvalResult<DataValue> {
    if op.is_arithmetic() {
        apply(op, a, b).map(DataValue::Double)
    } else {
        compare_numbers(op, a, b).map(DataValue::Boolean)
    }
}

fn is_plain_number(value: &DataValue) -> bool {
    matches!(
        value,
        DataValue::Int(_) | DataValue::Double(_) | DataValue::Count(_) | DataValue::String(_)
    )
}

fn has_number(value: &DataValue, now: DateTime<FixedOffset>) -> bool {
    to_double(value, now).is_some()
}

fn plain(value: &DataValue, now: DateTime<FixedOffset>) -> EvalResult<f64> {
    to_double(value, now).ok_or_else(|| EvalError::type_mismatch("number", value.kind().name()))
}

/// Length of a period in milliseconds, laid out from `now`
fn length(period: &TimePeriod, now: DateTime<FixedOffset>) -> EvalResult<f64> {
    period_millis(period, now).ok_or_else(|| out_of_range(period))
}

fn shift(
    anchor: DateTime<FixedOffset>,
    period: &TimePeriod,
    op: OperatorKind,
) -> EvalResult<DateTime<FixedOffset>> {
    let shifted = match op {
        OperatorKind::Subtraction => period.subtract_from(anchor),
        _ => period.add_to(anchor),
    };
    shifted.ok_or_else(|| out_of_range(period))
}

fn epoch_anchor(value: &DataValue, now: DateTime<FixedOffset>) -> EvalResult<DateTime<FixedOffset>> {
    let millis = plain(value, now)? as i64;
    from_epoch_millis(millis)
        .ok_or_else(|| EvalError::type_mismatch("epoch milliseconds", value.to_string()))
}

fn midnight(date: &NaiveDate) -> EvalResult<DateTime<FixedOffset>> {
    from_epoch_millis(date_epoch_millis(date))
        .ok_or_else(|| EvalError::type_mismatch("date", date.to_string()))
}

fn from_epoch_millis(millis: i64) -> Option<DateTime<FixedOffset>> {
    DateTime::from_timestamp_millis(millis).map(|utc| utc.with_timezone(&utc_offset()))
}

/// Shifted instant expressed in the original value's zone, or naive
fn keep_zone(original: &DvDateTime, shifted: DateTime<FixedOffset>) -> DvDateTime {
    match original.offset {
        Some(_) => DvDateTime::zoned(shifted),
        None => DvDateTime::naive(shifted.naive_utc()),
    }
}

fn out_of_range(period: &TimePeriod) -> EvalError {
    EvalError::type_mismatch("period within the supported date range", period.to_string())
}
