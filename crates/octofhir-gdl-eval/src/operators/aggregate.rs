//! Aggregate Operators
//!
//! Implements: `sum` over a variable's value list, and the `any[...]`
//! quantifier.

use octofhir_gdl_ast::AnyExpression;
use octofhir_gdl_types::{DataValue, DvQuantity};

use crate::context::EvaluationContext;
use crate::engine::GdlEngine;
use crate::environment::VariableEnvironment;
use crate::error::{EvalError, EvalResult};

const SUMMABLE: &str = "Count, Quantity, Ordinal or number";

/// Sum a value list. Nulls are skipped and an empty list sums to `0`.
///
/// Counts sum to a Count, quantities to a Quantity in the units of the
/// first (with the largest precision seen), ordinals to an integer of their
/// values and plain numbers to a Double. Mixed lists are a type mismatch.
pub fn sum_values(values: &[DataValue]) -> EvalResult<DataValue> {
    let mut present = values.iter().filter(|v| !v.is_null());
    let Some(first) = present.next() else {
        return Ok(DataValue::Int(0));
    };

    let mismatch = |value: &DataValue| EvalError::type_mismatch(first.kind().name(), value.kind().name());

    match first {
        DataValue::Count(c) => present
            .try_fold(*c, |acc, v| match v {
                DataValue::Count(n) => Ok(acc + n),
                other => Err(mismatch(other)),
            })
            .map(DataValue::Count),
        DataValue::Quantity(q) => present
            .try_fold(q.clone(), |acc, v| match v {
                DataValue::Quantity(n) => Ok(DvQuantity::new(
                    acc.magnitude + n.magnitude,
                    acc.units,
                    acc.precision.max(n.precision),
                )),
                other => Err(mismatch(other)),
            })
            .map(DataValue::Quantity),
        DataValue::Ordinal(o) => present
            .try_fold(o.value, |acc, v| match v {
                DataValue::Ordinal(n) => Ok(acc + n.value),
                other => Err(mismatch(other)),
            })
            .map(DataValue::Int),
        DataValue::Int(_) | DataValue::Double(_) => {
            let start = first.as_number().unwrap_or_default();
            present
                .try_fold(start, |acc, v| match v {
                    DataValue::Int(_) | DataValue::Double(_) => Ok(acc + v.as_number().unwrap_or_default()),
                    other => Err(mismatch(other)),
                })
                .map(DataValue::Double)
        }
        other => Err(EvalError::type_mismatch(SUMMABLE, other.kind().name())),
    }
}

impl GdlEngine {
    /// True when the operand holds at any position of the input variables'
    /// value lists, taken in lock-step. Shorter lists repeat their last
    /// value and absent variables read as null.
    pub(crate) fn eval_any(
        &self,
        expr: &AnyExpression,
        env: &VariableEnvironment,
        ctx: &mut EvaluationContext<'_>,
    ) -> EvalResult<DataValue> {
        let lists: Vec<(&str, &[DataValue])> = expr
            .input_variables
            .iter()
            .filter_map(|v| v.key())
            .map(|code| (code, env.values(code)))
            .collect();
        let rounds = lists.iter().map(|(_, values)| values.len()).max().unwrap_or(0);

        let mut scope = env.clone();
        for index in 0..rounds {
            for (code, values) in &lists {
                let value = values.get(index).or(values.last()).cloned();
                scope.bind(*code, value.unwrap_or(DataValue::Null));
            }
            if self.evaluate(&expr.operand, &scope, ctx)?.is_true() {
                return Ok(DataValue::Boolean(true));
            }
        }
        Ok(DataValue::Boolean(false))
    }
}
