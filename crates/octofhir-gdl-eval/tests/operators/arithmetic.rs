//! Arithmetic Operator Tests
//!
//! Tests for: + - * / ^ %, operator precedence in long expressions and
//! the math functions

use octofhir_gdl_ast::{ConstantKind, ExpressionItem, LongExpression, OperatorKind};
use octofhir_gdl_eval::{EvalError, VariableEnvironment};
use octofhir_gdl_types::DataValue;
use pretty_assertions::assert_eq;
use rstest::rstest;

use super::{ctx, engine};

fn double(raw: &str) -> ExpressionItem {
    ExpressionItem::constant(ConstantKind::Double, raw)
}

fn eval(expr: &ExpressionItem, env: &VariableEnvironment) -> Result<DataValue, EvalError> {
    let engine = engine();
    engine.evaluate(expr, env, &mut ctx(&engine))
}

#[rstest]
#[case(OperatorKind::Addition, 7.0)]
#[case(OperatorKind::Subtraction, 3.0)]
#[case(OperatorKind::Multiplication, 10.0)]
#[case(OperatorKind::Division, 2.5)]
#[case(OperatorKind::Exponent, 25.0)]
#[case(OperatorKind::Remainder, 1.0)]
fn test_binary_arithmetic(#[case] op: OperatorKind, #[case] expected: f64) {
    let expr = ExpressionItem::binary(ExpressionItem::integer(5), op, ExpressionItem::integer(2));
    assert_eq!(eval(&expr, &VariableEnvironment::new()), Ok(DataValue::Double(expected)));
}

#[test]
fn test_long_expression_precedence() {
    // 2+3*4^2 == 2+(3*(4^2)) == 50
    let long = LongExpression::starting_with(ExpressionItem::integer(2))
        .push(OperatorKind::Addition, ExpressionItem::integer(3))
        .push(OperatorKind::Multiplication, ExpressionItem::integer(4))
        .push(OperatorKind::Exponent, ExpressionItem::integer(2));
    assert_eq!(
        eval(&ExpressionItem::Long(long), &VariableEnvironment::new()),
        Ok(DataValue::Double(50.0))
    );
}

#[test]
fn test_bmi_from_quantities() {
    let mut env = VariableEnvironment::new();
    env.insert("gt0003", DataValue::quantity(72.0, "kg", 1));
    env.insert("gt0004", DataValue::quantity(180.0, "cm", 0));

    // $gt0003.magnitude/(($gt0004.magnitude/100)^2)
    let height_m = ExpressionItem::binary(
        ExpressionItem::attribute("gt0004", "magnitude"),
        OperatorKind::Division,
        ExpressionItem::integer(100),
    );
    let expr = ExpressionItem::binary(
        ExpressionItem::attribute("gt0003", "magnitude"),
        OperatorKind::Division,
        ExpressionItem::binary(height_m, OperatorKind::Exponent, ExpressionItem::integer(2)),
    );
    match eval(&expr, &env) {
        Ok(DataValue::Double(bmi)) => assert!((bmi - 22.222).abs() < 0.001),
        other => panic!("expected double, got {other:?}"),
    }
}

#[test]
fn test_null_operand_is_an_error() {
    let expr = ExpressionItem::binary(ExpressionItem::variable("gt0001"), OperatorKind::Addition, double("1.0"));
    let err = eval(&expr, &VariableEnvironment::new()).unwrap_err();
    assert_eq!(err.root_cause(), &EvalError::null_operand("+"));
    match err {
        EvalError::InExpression { expression, operands, .. } => {
            assert_eq!(expression, "$gt0001+1.0");
            assert_eq!(operands, vec![DataValue::Null, DataValue::Double(1.0)]);
        }
        other => panic!("expected expression context, got {other:?}"),
    }
}

#[test]
fn test_missing_magnitude_reads_zero() {
    let expr = ExpressionItem::binary(
        ExpressionItem::attribute("gt0001", "magnitude"),
        OperatorKind::Addition,
        ExpressionItem::integer(1),
    );
    assert_eq!(eval(&expr, &VariableEnvironment::new()), Ok(DataValue::Double(1.0)));
}

#[rstest]
#[case("abs", "-2.5", 2.5)]
#[case("ceil", "1.2", 2.0)]
#[case("floor", "1.8", 1.0)]
#[case("round", "2.5", 3.0)]
#[case("sqrt", "16.0", 4.0)]
#[case("exp", "0.0", 1.0)]
fn test_functions(#[case] name: &str, #[case] arg: &str, #[case] expected: f64) {
    let expr = ExpressionItem::function(name, vec![double(arg)]);
    assert_eq!(eval(&expr, &VariableEnvironment::new()), Ok(DataValue::Double(expected)));
}

#[test]
fn test_unknown_function() {
    let expr = ExpressionItem::function("median", vec![double("1.0")]);
    assert_eq!(
        eval(&expr, &VariableEnvironment::new()),
        Err(EvalError::unsupported_function("median"))
    );
}
