//! Aggregate Operator Tests
//!
//! Tests for: count, sum and the any[...] quantifier

use octofhir_gdl_ast::{AnyExpression, ConstantKind, ExpressionItem, OperatorKind, Variable};
use octofhir_gdl_eval::VariableEnvironment;
use octofhir_gdl_types::DataValue;
use pretty_assertions::assert_eq;

use super::{ctx, engine};

fn medications() -> VariableEnvironment {
    let mut env = VariableEnvironment::new();
    for (code, dose) in [("N02BE01", 500.0), ("B01AC06", 75.0), ("C10AA01", 20.0)] {
        env.insert("gt0010", DataValue::coded_text(code, "ATC", code));
        env.insert("gt0011", DataValue::quantity(dose, "mg", 0));
    }
    env
}

#[test]
fn test_count_and_sum() {
    let engine = engine();
    let env = medications();

    assert_eq!(
        engine.evaluate(&ExpressionItem::attribute("gt0010", "count"), &env, &mut ctx(&engine)),
        Ok(DataValue::Int(3))
    );
    assert_eq!(
        engine.evaluate(&ExpressionItem::attribute("gt0011", "sum"), &env, &mut ctx(&engine)),
        Ok(DataValue::quantity(595.0, "mg", 0))
    );
    assert_eq!(
        engine.evaluate(&ExpressionItem::attribute("gt0099", "count"), &env, &mut ctx(&engine)),
        Ok(DataValue::Int(0))
    );
}

#[test]
fn test_any_matches_in_lock_step() {
    let engine = engine();
    let env = medications();

    // any[$gt0010, $gt0011]($gt0010 == ATC::B01AC06 && $gt0011.magnitude < 100)
    let condition = |limit: i64| {
        ExpressionItem::Any(AnyExpression {
            input_variables: vec![Variable::code("gt0010"), Variable::code("gt0011")],
            operand: Box::new(ExpressionItem::binary(
                ExpressionItem::binary(
                    ExpressionItem::variable("gt0010"),
                    OperatorKind::Equality,
                    ExpressionItem::constant(ConstantKind::CodePhrase, "ATC::B01AC06"),
                ),
                OperatorKind::And,
                ExpressionItem::binary(
                    ExpressionItem::attribute("gt0011", "magnitude"),
                    OperatorKind::LessThan,
                    ExpressionItem::integer(limit),
                ),
            )),
        })
    };

    assert_eq!(engine.evaluate(&condition(100), &env, &mut ctx(&engine)), Ok(DataValue::Boolean(true)));
    assert_eq!(engine.evaluate(&condition(50), &env, &mut ctx(&engine)), Ok(DataValue::Boolean(false)));
}

#[test]
fn test_any_pads_shorter_lists() {
    let engine = engine();
    let mut env = medications();
    env.insert("gt0020", DataValue::Boolean(true));

    let expr = ExpressionItem::Any(AnyExpression {
        input_variables: vec![Variable::code("gt0011"), Variable::code("gt0020")],
        operand: Box::new(ExpressionItem::binary(
            ExpressionItem::binary(
                ExpressionItem::attribute("gt0011", "magnitude"),
                OperatorKind::Equality,
                ExpressionItem::integer(20),
            ),
            OperatorKind::And,
            ExpressionItem::variable("gt0020"),
        )),
    });
    assert_eq!(engine.evaluate(&expr, &env, &mut ctx(&engine)), Ok(DataValue::Boolean(true)));
}

#[test]
fn test_any_over_empty_lists_is_false() {
    let engine = engine();
    let expr = ExpressionItem::Any(AnyExpression {
        input_variables: vec![Variable::code("gt0099")],
        operand: Box::new(ExpressionItem::boolean(true)),
    });
    assert_eq!(
        engine.evaluate(&expr, &VariableEnvironment::new(), &mut ctx(&engine)),
        Ok(DataValue::Boolean(false))
    );
}
