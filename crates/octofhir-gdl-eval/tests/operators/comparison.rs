//! Comparison Operator Tests
//!
//! Tests for: == != < <= > >= across clinical value types, and is_a

use octofhir_gdl_ast::{ConstantKind, ExpressionItem, Guideline, Ontology, OperatorKind};
use octofhir_gdl_eval::{VariableEnvironment, values_equal};
use octofhir_gdl_types::{CodePhrase, DataValue};
use rstest::rstest;

use super::{ctx, engine};

fn compare(left: ExpressionItem, op: OperatorKind, right: ExpressionItem) -> DataValue {
    let engine = engine();
    engine
        .evaluate(&ExpressionItem::binary(left, op, right), &VariableEnvironment::new(), &mut ctx(&engine))
        .unwrap()
}

#[rstest]
#[case(ExpressionItem::null(), ExpressionItem::null(), true)]
#[case(ExpressionItem::null(), ExpressionItem::integer(1), false)]
#[case(ExpressionItem::integer(1), ExpressionItem::constant(ConstantKind::Double, "1.0"), true)]
#[case(
    ExpressionItem::constant(ConstantKind::Quantity, "72.0,kg"),
    ExpressionItem::constant(ConstantKind::Quantity, "72,kg"),
    true
)]
#[case(
    ExpressionItem::constant(ConstantKind::Quantity, "72,kg"),
    ExpressionItem::constant(ConstantKind::Quantity, "72,lb"),
    false
)]
#[case(
    ExpressionItem::constant(ConstantKind::CodedText, "local::gt0009|Present|"),
    ExpressionItem::constant(ConstantKind::CodedText, "local::gt0009|Presente|"),
    true
)]
#[case(
    ExpressionItem::constant(ConstantKind::Ordinal, "2|local::at0002|Moderate|"),
    ExpressionItem::constant(ConstantKind::Ordinal, "2|local::at0007|Other|"),
    true
)]
#[case(ExpressionItem::constant(ConstantKind::String, "true"), ExpressionItem::boolean(true), true)]
fn test_equality(#[case] left: ExpressionItem, #[case] right: ExpressionItem, #[case] expected: bool) {
    assert_eq!(compare(left.clone(), OperatorKind::Equality, right.clone()), DataValue::Boolean(expected));
    assert_eq!(compare(left, OperatorKind::Inequality, right), DataValue::Boolean(!expected));
}

#[rstest]
#[case(OperatorKind::LessThan, false)]
#[case(OperatorKind::LessThanOrEqual, true)]
#[case(OperatorKind::GreaterThan, false)]
#[case(OperatorKind::GreaterThanOrEqual, true)]
fn test_relational(#[case] op: OperatorKind, #[case] expected: bool) {
    let value = compare(
        ExpressionItem::constant(ConstantKind::Count, "3"),
        op,
        ExpressionItem::constant(ConstantKind::Double, "3.0"),
    );
    assert_eq!(value, DataValue::Boolean(expected));
}

#[test]
fn test_relational_with_null_is_false() {
    for op in [OperatorKind::LessThan, OperatorKind::GreaterThanOrEqual] {
        assert_eq!(
            compare(ExpressionItem::null(), op, ExpressionItem::integer(1)),
            DataValue::Boolean(false)
        );
    }
}

#[test]
fn test_values_equal_is_symmetric_for_numbers() {
    let now = chrono::Utc::now().fixed_offset();
    let a = DataValue::Count(4);
    let b = DataValue::Double(4.0);
    assert!(values_equal(&a, &b, now));
    assert!(values_equal(&b, &a, now));
}

#[test]
fn test_is_a_through_ontology_bindings() {
    let engine = engine();
    let guideline = Guideline::new("diabetes.v1").with_ontology(
        Ontology::default().with_binding("ICD10", "gt0101", CodePhrase::new("ICD10", "E10")),
    );
    let mut env = VariableEnvironment::new();
    env.insert("gt0005", DataValue::coded_text("Type 1 diabetes", "ICD10", "E10.9"));
    let mut ctx = engine.context(Some(&guideline));

    let is_a = |op| {
        ExpressionItem::binary(
            ExpressionItem::variable("gt0005"),
            op,
            ExpressionItem::constant(ConstantKind::CodePhrase, "local::gt0101"),
        )
    };
    assert_eq!(
        engine.evaluate(&is_a(OperatorKind::IsA), &env, &mut ctx),
        Ok(DataValue::Boolean(true))
    );
    assert_eq!(
        engine.evaluate(&is_a(OperatorKind::IsNotA), &env, &mut ctx),
        Ok(DataValue::Boolean(false))
    );
}
