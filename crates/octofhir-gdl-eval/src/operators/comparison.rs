//! Comparison Operators
//!
//! Implements: `== !=` (null-aware, type-directed) and `< <= > >=` over
//! numeric views.

use chrono::{DateTime, FixedOffset};
use octofhir_gdl_ast::OperatorKind;
use octofhir_gdl_types::DataValue;

use super::{require_number, to_double};
use crate::error::{EvalError, EvalResult};

/// Equality between two evaluated operands.
///
/// Two nulls are equal and a null never equals a value. Booleans compare
/// against the boolean reading of the other side, quantities are
/// unit-sensitive against each other but compare by magnitude against plain
/// numbers, coded values compare by code, and any other pair with numeric
/// views on both sides compares numerically.
pub fn values_equal(left: &DataValue, right: &DataValue, now: DateTime<FixedOffset>) -> bool {
    use DataValue as V;

    match (left, right) {
        (V::Null, V::Null) => true,
        (V::Null, _) | (_, V::Null) => false,
        (V::Boolean(b), other) | (other, V::Boolean(b)) => other.coerce_boolean() == Some(*b),
        (V::Quantity(a), V::Quantity(b)) => a == b,
        (V::Ordinal(a), V::Ordinal(b)) => a.value == b.value,
        (V::CodedText(a), V::CodedText(b)) => a == b,
        (V::String(a) | V::Text(a), V::String(b) | V::Text(b)) => a == b,
        (V::Object(a), V::Object(b)) => a == b,
        _ => match (to_double(left, now), to_double(right, now)) {
            (Some(a), Some(b)) => a == b,
            _ => left == right,
        },
    }
}

/// Ordering comparison. A null operand makes the comparison false.
pub fn compare(
    op: OperatorKind,
    left: &DataValue,
    right: &DataValue,
    now: DateTime<FixedOffset>,
) -> EvalResult<bool> {
    if left.is_null() || right.is_null() {
        return Ok(false);
    }
    let a = require_number(left, now)?;
    let b = require_number(right, now)?;
    compare_numbers(op, a, b)
}

pub(crate) fn compare_numbers(op: OperatorKind, a: f64, b: f64) -> EvalResult<bool> {
    let result = match op {
        OperatorKind::LessThan => a < b,
        OperatorKind::LessThanOrEqual => a <= b,
        OperatorKind::GreaterThan => a > b,
        OperatorKind::GreaterThanOrEqual => a >= b,
        OperatorKind::Equality => a == b,
        OperatorKind::Inequality => a != b,
        other => return Err(EvalError::unsupported_operator(other.symbol(), "numbers")),
    };
    Ok(result)
}
