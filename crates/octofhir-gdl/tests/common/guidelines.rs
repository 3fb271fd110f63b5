//! Guidelines built in code for the end-to-end scenarios

use octofhir_gdl::ast::{
    AnyExpression, AssignmentExpression, ConstantKind, CreateInstanceExpression, Element, Ontology,
    OperatorKind, Reference, ResourceDescription, Template, UseTemplateExpression, Variable,
};
use octofhir_gdl::types::{CodePhrase, ValueKind};
use octofhir_gdl::{Card, DataBinding, ExpressionItem, Guideline, Rule};
use serde_json::json;

use super::{
    BSA, DEMOGRAPHICS, DIAGNOSIS, MEDICATION, VALUE_PATH, assign, not_null, string,
};

/// Age in whole years from the birth date
pub fn age_guideline() -> Guideline {
    let elapsed = ExpressionItem::binary(
        ExpressionItem::variable("currentDateTime"),
        OperatorKind::Subtraction,
        ExpressionItem::variable("gt0004"),
    );
    let years = ExpressionItem::binary(
        elapsed,
        OperatorKind::Division,
        ExpressionItem::constant(ConstantKind::Quantity, "1,a"),
    );

    Guideline::new("Age.Calculation.v1")
        .with_binding(
            DataBinding::input("gt0001", DEMOGRAPHICS).with_element("gt0004", Element::new("/data/birth_date")),
        )
        .with_binding(DataBinding::output("gt0002", DEMOGRAPHICS).with_element("gt0009", Element::new("/data/age")))
        .with_pre_condition(not_null("gt0004"))
        .with_rule(Rule::new("gt0010", 1).then(assign("gt0009", "magnitude", years)))
}

/// Flags diabetes when a diagnosis is subsumed by the bound ICD-10 codes
pub fn diabetes_guideline() -> Guideline {
    let diagnosis_path = "/data/items[at0002]/value";
    let ontology = Ontology::default()
        .with_term("en", "gt0101", "Diabetes")
        .with_term("en", "gt0102", "Present")
        .with_term("sv", "gt0102", "Förekommer")
        .with_binding("ICD10", "gt0101", CodePhrase::new("ICD10", "E10"))
        .with_binding("ICD10", "gt0101", CodePhrase::new("ICD10", "E11"));

    Guideline::new("Diabetes.Flag.v1")
        .with_ontology(ontology)
        .with_description(ResourceDescription {
            purpose: None,
            references: vec![Reference::new("NICE NG28", "https://www.nice.org.uk/guidance/ng28")],
        })
        .with_binding(
            DataBinding::input("gt0001", DIAGNOSIS)
                .with_element("gt0003", Element::new(diagnosis_path))
                .with_predicate(ExpressionItem::binary(
                    ExpressionItem::Variable(Variable::path(diagnosis_path)),
                    OperatorKind::IsA,
                    ExpressionItem::constant(ConstantKind::CodePhrase, "local::gt0101"),
                )),
        )
        .with_binding(
            DataBinding::output("gt0002", DIAGNOSIS)
                .with_element("gt0020", Element::typed("/data/diabetes", ValueKind::CodedText)),
        )
        .with_rule(
            Rule::new("gt0010", 1)
                .when(not_null("gt0003"))
                .then(ExpressionItem::assign(
                    Variable::code("gt0020"),
                    ExpressionItem::constant(ConstantKind::CodedText, "local::gt0102|present|"),
                ))
                .with_card(
                    Card::new("Diabetes: {$gt0020.value}")
                        .with_detail("{$gt0003.count} matching diagnosis, see {$ref[1].url}"),
                ),
        )
}

/// Flags a large body surface area computed by an earlier guideline
pub fn large_bsa_guideline() -> Guideline {
    Guideline::new("BSA.Flag.v1")
        .with_binding(DataBinding::input("gt0001", BSA).with_element("gt0003", Element::new(VALUE_PATH)))
        .with_binding(
            DataBinding::output("gt0002", BSA).with_element("gt0004", Element::new("/data/large")),
        )
        .with_rule(
            Rule::new("gt0010", 1)
                .when(ExpressionItem::binary(
                    ExpressionItem::attribute("gt0003", "magnitude"),
                    OperatorKind::GreaterThanOrEqual,
                    ExpressionItem::constant(ConstantKind::Double, "1.8"),
                ))
                .then(ExpressionItem::assign(Variable::code("gt0004"), string("true"))),
        )
}

/// A rule whose condition adds to a missing value
pub fn failing_guideline() -> Guideline {
    Guideline::new("Failing.v1")
        .with_binding(DataBinding::input("gt0001", BSA).with_element("gt0003", Element::new("/data/missing")))
        .with_rule(Rule::new("gt0010", 1).when(ExpressionItem::binary(
            ExpressionItem::binary(ExpressionItem::variable("gt0003"), OperatorKind::Addition, ExpressionItem::integer(1)),
            OperatorKind::GreaterThan,
            ExpressionItem::integer(2),
        )))
}

/// One medication request per current medication with a known dose, plus a
/// review instance when any dose is high
pub fn medication_guideline() -> Guideline {
    let template = Template::new(
        "gt2001",
        "MedicationRequest",
        json!({
            "status": "draft",
            "medication": "{$gt2002}",
            "dose": {"value": "{$gt2003.magnitude}", "unit": "{$gt2003.units}"},
            "note": "Review of {$gt2002.value}",
        }),
    );
    let use_template = ExpressionItem::UseTemplate(UseTemplateExpression {
        variable: Variable::code("gt2001"),
        assignments: vec![],
        if_variables: vec![Variable::code("gt2003")],
        input_variable_map: [
            ("gt2002".to_string(), Variable::code("gt0010")),
            ("gt2003".to_string(), Variable::code("gt0011")),
        ]
        .into_iter()
        .collect(),
    });

    let high_dose = ExpressionItem::Any(AnyExpression {
        input_variables: vec![Variable::code("gt0011")],
        operand: Box::new(ExpressionItem::binary(
            ExpressionItem::attribute("gt0011", "magnitude"),
            OperatorKind::GreaterThan,
            ExpressionItem::integer(400),
        )),
    });
    let review = ExpressionItem::CreateInstance(CreateInstanceExpression {
        variable: Variable::code("gt0030"),
        assignments: vec![
            AssignmentExpression::new(Variable::code("gt0031"), string("high dose")),
            AssignmentExpression::new(
                Variable::code("gt0032"),
                ExpressionItem::attribute("gt0011", "count"),
            ),
        ],
    });

    Guideline::new("Medication.Review.v1")
        .with_template(template)
        .with_binding(
            DataBinding::input("gt0001", MEDICATION)
                .with_element("gt0010", Element::new("/activities/medicine"))
                .with_element("gt0011", Element::new("/activities/dose")),
        )
        .with_binding(
            DataBinding::output("gt0030", "openEHR-EHR-EVALUATION.medication_review.v1")
                .with_element("gt0031", Element::new("/data/reason"))
                .with_element("gt0032", Element::new("/data/dose_count")),
        )
        .with_rule(Rule::new("gt0020", 1).when(not_null("gt0010")).then(use_template))
        .with_rule(Rule::new("gt0021", 2).when(high_dose).then(review))
}
