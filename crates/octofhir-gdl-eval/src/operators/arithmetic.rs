//! Arithmetic Operators
//!
//! Implements: `+ - * / ^ %` over numeric views of the operands, and the
//! unary math functions. Results are always `Double`.

use chrono::{DateTime, FixedOffset};
use octofhir_gdl_ast::OperatorKind;
use octofhir_gdl_types::DataValue;

use super::require_number;
use crate::error::{EvalError, EvalResult};

/// Apply an arithmetic operator. A null operand is an error.
pub fn arithmetic(
    op: OperatorKind,
    left: &DataValue,
    right: &DataValue,
    now: DateTime<FixedOffset>,
) -> EvalResult<DataValue> {
    if left.is_null() || right.is_null() {
        return Err(EvalError::null_operand(op.symbol()));
    }
    let a = require_number(left, now)?;
    let b = require_number(right, now)?;
    Ok(DataValue::Double(apply(op, a, b)?))
}

pub(crate) fn apply(op: OperatorKind, a: f64, b: f64) -> EvalResult<f64> {
    let result = match op {
        OperatorKind::Addition => a + b,
        OperatorKind::Subtraction => a - b,
        OperatorKind::Multiplication => a * b,
        OperatorKind::Division => a / b,
        OperatorKind::Exponent => a.powf(b),
        OperatorKind::Remainder => a % b,
        other => return Err(EvalError::unsupported_operator(other.symbol(), "numbers")),
    };
    Ok(result)
}

/// Look up a unary math function by name
pub fn math_function(name: &str) -> Option<fn(f64) -> f64> {
    let function: fn(f64) -> f64 = match name {
        "abs" => f64::abs,
        "ceil" => f64::ceil,
        "exp" => f64::exp,
        "floor" => f64::floor,
        "log" => f64::ln,
        "log10" => f64::log10,
        "log1p" => f64::ln_1p,
        "round" => f64::round,
        "sqrt" => f64::sqrt,
        "sin" => f64::sin,
        "cos" => f64::cos,
        "tan" => f64::tan,
        _ => return None,
    };
    Some(function)
}
