//! Logical Operator Tests
//!
//! Tests for: &&, ||, ! with three-valued logic, and fired/!fired

use octofhir_gdl_ast::{ConstantKind, ExpressionItem, OperatorKind};
use octofhir_gdl_eval::{EvalError, VariableEnvironment};
use octofhir_gdl_types::DataValue;
use rstest::rstest;

use super::{ctx, engine};

fn truth(value: Option<bool>) -> ExpressionItem {
    match value {
        Some(b) => ExpressionItem::boolean(b),
        None => ExpressionItem::null(),
    }
}

fn result(value: Option<bool>) -> DataValue {
    value.map_or(DataValue::Null, DataValue::Boolean)
}

// ============================================================================
// And / Or Tests - Three-Valued Logic
// ============================================================================

#[rstest]
#[case(Some(true), Some(true), Some(true))]
#[case(Some(true), Some(false), Some(false))]
#[case(Some(true), None, None)]
#[case(Some(false), None, Some(false))]
#[case(None, Some(false), Some(false))]
#[case(None, None, None)]
fn test_and(#[case] a: Option<bool>, #[case] b: Option<bool>, #[case] expected: Option<bool>) {
    let engine = engine();
    let expr = ExpressionItem::binary(truth(a), OperatorKind::And, truth(b));
    let value = engine.evaluate(&expr, &VariableEnvironment::new(), &mut ctx(&engine)).unwrap();
    assert_eq!(value, result(expected));
}

#[rstest]
#[case(Some(true), None, Some(true))]
#[case(None, Some(true), Some(true))]
#[case(Some(false), Some(false), Some(false))]
#[case(Some(false), None, None)]
#[case(None, None, None)]
fn test_or(#[case] a: Option<bool>, #[case] b: Option<bool>, #[case] expected: Option<bool>) {
    let engine = engine();
    let expr = ExpressionItem::binary(truth(a), OperatorKind::Or, truth(b));
    let value = engine.evaluate(&expr, &VariableEnvironment::new(), &mut ctx(&engine)).unwrap();
    assert_eq!(value, result(expected));
}

#[test]
fn test_or_short_circuits() {
    let engine = engine();
    // The right side would be a type error if evaluated
    let expr = ExpressionItem::binary(
        ExpressionItem::boolean(true),
        OperatorKind::Or,
        ExpressionItem::integer(5),
    );
    let value = engine.evaluate(&expr, &VariableEnvironment::new(), &mut ctx(&engine)).unwrap();
    assert_eq!(value, DataValue::Boolean(true));
}

#[test]
fn test_boolean_strings_are_truth_values() {
    let engine = engine();
    let expr = ExpressionItem::binary(
        ExpressionItem::constant(ConstantKind::String, "TRUE"),
        OperatorKind::And,
        ExpressionItem::boolean(true),
    );
    let value = engine.evaluate(&expr, &VariableEnvironment::new(), &mut ctx(&engine)).unwrap();
    assert_eq!(value, DataValue::Boolean(true));
}

#[test]
fn test_not() {
    let engine = engine();
    let env = VariableEnvironment::new();
    let not = |item| ExpressionItem::unary(OperatorKind::Not, item);

    assert_eq!(
        engine.evaluate(&not(ExpressionItem::boolean(false)), &env, &mut ctx(&engine)),
        Ok(DataValue::Boolean(true))
    );
    assert_eq!(
        engine.evaluate(&not(ExpressionItem::null()), &env, &mut ctx(&engine)),
        Ok(DataValue::Null)
    );
    let err = engine
        .evaluate(&not(ExpressionItem::integer(1)), &env, &mut ctx(&engine))
        .unwrap_err();
    assert!(matches!(err, EvalError::InExpression { .. }));
    assert!(matches!(err.root_cause(), EvalError::TypeMismatch { .. }));
}

#[test]
fn test_fired() {
    let engine = engine();
    let env = VariableEnvironment::new();
    let mut ctx = ctx(&engine);
    ctx.mark_fired("gt0010");

    let fired = ExpressionItem::unary(OperatorKind::Fired, ExpressionItem::variable("gt0010"));
    let not_fired = ExpressionItem::unary(OperatorKind::NotFired, ExpressionItem::variable("gt0011"));
    assert_eq!(engine.evaluate(&fired, &env, &mut ctx), Ok(DataValue::Boolean(true)));
    assert_eq!(engine.evaluate(&not_fired, &env, &mut ctx), Ok(DataValue::Boolean(true)));
}
