//! Common test utilities for guideline evaluation
//!
//! Fixture loading, a pinned-clock engine and small builders for input
//! instances and guideline expressions.

pub mod guidelines;

pub use guidelines::*;

use chrono::DateTime;
use octofhir_gdl::ast::{ConstantKind, Variable};
use octofhir_gdl::eval::MapObjectCreator;
use octofhir_gdl::types::{DataInstance, DataValue, DvDateTime};
use octofhir_gdl::{EngineConfig, ExpressionItem, GdlEngine, Guideline};
use std::path::PathBuf;

pub const WEIGHT: &str = "openEHR-EHR-OBSERVATION.body_weight.v1";
pub const HEIGHT: &str = "openEHR-EHR-OBSERVATION.height.v1";
pub const BSA: &str = "openEHR-EHR-OBSERVATION.body_surface_area.v1";
pub const DEMOGRAPHICS: &str = "openEHR-EHR-OBSERVATION.basic_demographic.v1";
pub const DIAGNOSIS: &str = "openEHR-EHR-EVALUATION.problem_diagnosis.v1";
pub const MEDICATION: &str = "openEHR-EHR-INSTRUCTION.medication.v1";

pub const VALUE_PATH: &str = "/data/events/data/items[at0004]/value";
pub const TIME_PATH: &str = "/data/events/time";

/// Engine with "now" pinned to 2017-03-17T10:52:10Z
pub fn engine() -> GdlEngine {
    engine_with(EngineConfig::builder())
}

pub fn engine_with(builder: octofhir_gdl::eval::EngineConfigBuilder) -> GdlEngine {
    let now = DateTime::parse_from_rfc3339("2017-03-17T10:52:10Z").unwrap();
    GdlEngine::with_config(builder.current_date_time(now).build().unwrap())
        .unwrap()
        .with_object_creator(MapObjectCreator::default().with_type_field("resourceType"))
}

pub fn load_guideline(file_name: &str) -> Guideline {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(file_name);
    let json = std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display()));
    serde_json::from_str(&json).unwrap_or_else(|e| panic!("parsing {}: {e}", path.display()))
}

pub fn date_time(raw: &str) -> DataValue {
    DataValue::DateTime(DvDateTime::parse(raw).unwrap())
}

pub fn weight(kg: f64, time: &str) -> DataInstance {
    DataInstance::new(WEIGHT)
        .with(VALUE_PATH, DataValue::quantity(kg, "kg", 1))
        .with(TIME_PATH, date_time(time))
}

pub fn height(cm: f64) -> DataInstance {
    DataInstance::new(HEIGHT).with(VALUE_PATH, DataValue::quantity(cm, "cm", 0))
}

pub fn diagnosis(terminology: &str, code: &str) -> DataInstance {
    DataInstance::new(DIAGNOSIS).with(
        "/data/items[at0002]/value",
        DataValue::coded_text(code, terminology, code),
    )
}

pub fn medication(atc: &str, dose_mg: Option<f64>) -> DataInstance {
    let instance = DataInstance::new(MEDICATION)
        .with("/activities/medicine", DataValue::coded_text(atc, "ATC", atc));
    match dose_mg {
        Some(dose) => instance.with("/activities/dose", DataValue::quantity(dose, "mg", 0)),
        None => instance,
    }
}

pub fn not_null(code: &str) -> ExpressionItem {
    ExpressionItem::binary(
        ExpressionItem::variable(code),
        octofhir_gdl::ast::OperatorKind::Inequality,
        ExpressionItem::null(),
    )
}

pub fn string(raw: &str) -> ExpressionItem {
    ExpressionItem::constant(ConstantKind::String, raw)
}

pub fn assign(code: &str, attribute: &str, rhs: ExpressionItem) -> ExpressionItem {
    ExpressionItem::assign(Variable::code(code).with_attribute(attribute), rhs)
}
