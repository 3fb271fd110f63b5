//! Operator integration tests for GDL evaluation
//!
//! These tests verify operator behavior including:
//! - Correct computation for the clinical value types
//! - Null handling in arithmetic, comparison and logic
//! - Date arithmetic with calendar periods
//! - List-aware attributes and the `any` quantifier

pub mod aggregate;
pub mod arithmetic;
pub mod comparison;
pub mod datetime;
pub mod logical;

use chrono::DateTime;
use octofhir_gdl_eval::{EngineConfig, EvaluationContext, GdlEngine};

/// Engine with "now" pinned to 2017-03-17T10:52:10Z
pub fn engine() -> GdlEngine {
    let now = DateTime::parse_from_rfc3339("2017-03-17T10:52:10Z").unwrap();
    GdlEngine::with_config(EngineConfig::builder().current_date_time(now).build().unwrap()).unwrap()
}

pub fn ctx(engine: &GdlEngine) -> EvaluationContext<'static> {
    engine.context(None)
}
