//! DateTime Operator Tests
//!
//! Tests for: date/date-time arithmetic with periods, ages, and the
//! current date-time variables

use octofhir_gdl_ast::{ConstantKind, ExpressionItem, OperatorKind, Variable};
use octofhir_gdl_eval::{CURRENT_DATE_TIME, EngineConfig, EvalError, GdlEngine, VariableEnvironment};
use octofhir_gdl_types::{DataValue, DvDateTime};
use pretty_assertions::assert_eq;

use super::{ctx, engine};

fn date_time(raw: &str) -> DataValue {
    DataValue::DateTime(DvDateTime::parse(raw).unwrap())
}

fn period(raw: &str) -> ExpressionItem {
    ExpressionItem::constant(ConstantKind::Quantity, raw)
}

#[test]
fn test_age_in_years() {
    let engine = engine();
    let mut env = VariableEnvironment::new();
    env.insert("gt0004", date_time("1972-10-02T00:00:00Z"));

    // ($currentDateTime.value-$gt0004.value)/1,a
    let elapsed = ExpressionItem::binary(
        ExpressionItem::attribute(CURRENT_DATE_TIME, "value"),
        OperatorKind::Subtraction,
        ExpressionItem::attribute("gt0004", "value"),
    );
    let age = ExpressionItem::binary(elapsed, OperatorKind::Division, period("1,a"));
    match engine.evaluate(&age, &env, &mut ctx(&engine)) {
        Ok(DataValue::Double(years)) => assert_eq!(years.trunc(), 44.0),
        other => panic!("expected double, got {other:?}"),
    }
}

#[test]
fn test_date_time_plus_period_keeps_zone() {
    let engine = engine();
    let mut env = VariableEnvironment::new();
    env.insert("gt0001", date_time("2017-01-31T08:00:00+02:00"));

    let expr = ExpressionItem::binary(ExpressionItem::variable("gt0001"), OperatorKind::Addition, period("1,mo"));
    assert_eq!(
        engine.evaluate(&expr, &env, &mut ctx(&engine)),
        Ok(date_time("2017-02-28T08:00:00+02:00"))
    );
}

#[test]
fn test_current_date_time_minus_period_compared() {
    let engine = engine();
    let mut env = VariableEnvironment::new();
    env.insert("gt0007", date_time("2016-12-01T00:00:00Z"));

    // $gt0007 > ($currentDateTime-6,mo)
    let threshold = ExpressionItem::binary(
        ExpressionItem::Variable(Variable::code(CURRENT_DATE_TIME)),
        OperatorKind::Subtraction,
        period("6,mo"),
    );
    let expr = ExpressionItem::binary(ExpressionItem::variable("gt0007"), OperatorKind::GreaterThan, threshold);
    assert_eq!(engine.evaluate(&expr, &env, &mut ctx(&engine)), Ok(DataValue::Boolean(true)));
}

#[test]
fn test_period_comparison() {
    let engine = engine();
    let expr = ExpressionItem::binary(period("1,a"), OperatorKind::GreaterThan, period("11,mo"));
    assert_eq!(
        engine.evaluate(&expr, &VariableEnvironment::new(), &mut ctx(&engine)),
        Ok(DataValue::Boolean(true))
    );
}

#[test]
fn test_string_attribute_uses_configured_format() {
    let now = chrono::DateTime::parse_from_rfc3339("2017-03-17T10:52:10Z").unwrap();
    let config = EngineConfig::builder()
        .current_date_time(now)
        .date_time_format("%d/%m/%Y")
        .build()
        .unwrap();
    let engine = GdlEngine::with_config(config).unwrap();
    let mut env = VariableEnvironment::new();
    env.insert("gt0001", date_time("2017-01-31T08:00:00Z"));

    let expr = ExpressionItem::attribute("gt0001", "string");
    assert_eq!(
        engine.evaluate(&expr, &env, &mut ctx(&engine)),
        Ok(DataValue::text("31/01/2017"))
    );
}

#[test]
fn test_period_beyond_date_range_is_an_error() {
    let engine = engine();
    let expr = ExpressionItem::binary(
        ExpressionItem::variable(CURRENT_DATE_TIME),
        OperatorKind::Subtraction,
        period("10000000000000,h"),
    );
    let err = engine
        .evaluate(&expr, &VariableEnvironment::new(), &mut ctx(&engine))
        .unwrap_err();
    assert!(matches!(err.root_cause(), EvalError::TypeMismatch { .. }));
}

#[test]
fn test_date_time_compared_with_period() {
    let engine = engine();
    let mut env = VariableEnvironment::new();
    env.insert("gt0001", date_time("2017-01-01T00:00:00Z"));

    // epoch millis of the date-time against the length of one year
    let expr = ExpressionItem::binary(ExpressionItem::variable("gt0001"), OperatorKind::GreaterThan, period("1,a"));
    assert_eq!(engine.evaluate(&expr, &env, &mut ctx(&engine)), Ok(DataValue::Boolean(true)));
}
