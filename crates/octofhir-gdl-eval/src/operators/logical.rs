//! Logical Operators
//!
//! Implements: And, Or, Not with three-valued logic. `None` stands for the
//! unknown truth value.

use octofhir_gdl_ast::BinaryExpression;
use octofhir_gdl_types::DataValue;

use crate::context::EvaluationContext;
use crate::engine::GdlEngine;
use crate::environment::VariableEnvironment;
use crate::error::{EvalError, EvalResult};

/// Three-valued AND
///
/// | A     | B     | A and B |
/// |-------|-------|---------|
/// | true  | true  | true    |
/// | true  | false | false   |
/// | true  | null  | null    |
/// | false | null  | false   |
/// | null  | null  | null    |
pub fn logic_and(a: Option<bool>, b: Option<bool>) -> Option<bool> {
    match (a, b) {
        (Some(false), _) | (_, Some(false)) => Some(false),
        (Some(true), Some(true)) => Some(true),
        _ => None,
    }
}

/// Three-valued OR
///
/// | A     | B     | A or B  |
/// |-------|-------|---------|
/// | true  | null  | true    |
/// | false | false | false   |
/// | false | null  | null    |
/// | null  | null  | null    |
pub fn logic_or(a: Option<bool>, b: Option<bool>) -> Option<bool> {
    match (a, b) {
        (Some(true), _) | (_, Some(true)) => Some(true),
        (Some(false), Some(false)) => Some(false),
        _ => None,
    }
}

/// Three-valued NOT; unknown stays unknown
pub fn logic_not(value: &DataValue) -> EvalResult<DataValue> {
    Ok(from_truth(truth(value)?.map(|b| !b)))
}

/// Truth value of an operand: booleans, `true`/`false` strings, or null
pub fn truth(value: &DataValue) -> EvalResult<Option<bool>> {
    match value {
        DataValue::Null => Ok(None),
        other => other
            .coerce_boolean()
            .map(Some)
            .ok_or_else(|| EvalError::type_mismatch("Boolean", other.kind().name())),
    }
}

fn from_truth(value: Option<bool>) -> DataValue {
    value.map_or(DataValue::Null, DataValue::Boolean)
}

impl GdlEngine {
    /// OR short-circuits on a true left operand
    pub(crate) fn eval_or(
        &self,
        expr: &BinaryExpression,
        env: &VariableEnvironment,
        ctx: &mut EvaluationContext<'_>,
    ) -> EvalResult<DataValue> {
        let left = self.evaluate(&expr.left, env, ctx)?;
        let left_truth = truth(&left).map_err(|e| e.in_expression(expr.to_string(), vec![left.clone()]))?;
        if left_truth == Some(true) {
            return Ok(DataValue::Boolean(true));
        }

        let right = self.evaluate(&expr.right, env, ctx)?;
        let right_truth = truth(&right)
            .map_err(|e| e.in_expression(expr.to_string(), vec![left.clone(), right.clone()]))?;
        Ok(from_truth(logic_or(left_truth, right_truth)))
    }

    /// AND is plain boolean when both sides are known, three-valued when
    /// either is null
    pub(crate) fn eval_and(
        &self,
        expr: &BinaryExpression,
        env: &VariableEnvironment,
        ctx: &mut EvaluationContext<'_>,
    ) -> EvalResult<DataValue> {
        let left = self.evaluate(&expr.left, env, ctx)?;
        let right = self.evaluate(&expr.right, env, ctx)?;
        let truths = truth(&left).and_then(|l| truth(&right).map(|r| (l, r)));
        let (l, r) = truths.map_err(|e| e.in_expression(expr.to_string(), vec![left, right]))?;
        Ok(from_truth(logic_and(l, r)))
    }
}
