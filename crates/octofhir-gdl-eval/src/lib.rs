//! GDL Evaluation Engine
//!
//! This crate evaluates GDL guidelines against clinical data instances:
//!
//! - **Data binding**: model/path projection onto local variable codes,
//!   with predicate filtering (`max`/`min`, `is_a`, boolean filters)
//! - **Expressions**: arithmetic, comparison and logical operators, date
//!   arithmetic with calendar periods, `any`, `sum`, `count` and functions
//! - **Statements**: typed assignments, instance creation and templates
//! - **Rules**: preconditions, default actions, priority-ordered rules,
//!   `fired`/`!fired` and decision-support cards
//! - **Terminology**: `is_a` subsumption with per-terminology evaluators
//!
//! # Example
//!
//! ```ignore
//! use octofhir_gdl_eval::GdlEngine;
//!
//! let engine = GdlEngine::new();
//! let result = engine.evaluate_guideline(&guideline, &inputs)?;
//! for output in &result.outputs {
//!     println!("{}: {:?}", output.model_id, output.values);
//! }
//! ```
//!
//! # Three-Valued Logic
//!
//! `null` is a truth value of its own:
//!
//! - `&&`: false dominates (null && false = false)
//! - `||`: true dominates (null || true = true)
//! - relational comparisons with a null operand are false
//! - a rule only fires when every condition is exactly `true`

pub mod assignment;
pub mod bindings;
pub mod cards;
pub mod config;
pub mod context;
pub mod creator;
pub mod engine;
pub mod environment;
pub mod error;
pub mod operators;
pub mod rules;
pub mod template;
pub mod terminology;

// Re-export main types
pub use config::{EngineConfig, EngineConfigBuilder, RuleOrder};
pub use context::EvaluationContext;
pub use creator::{CreationError, MapObjectCreator, ObjectCreator};
pub use engine::{CURRENT_DATE, CURRENT_DATE_TIME, GdlEngine, REFERENCE_NOT_FOUND};
pub use environment::{ValueList, VariableEnvironment};
pub use error::{EvalError, EvalResult};
pub use rules::{BatchResult, EvaluationPhase, GuidelineFailure, GuidelineResult};
pub use template::{Substitution, Token, fill_json, fill_text};
pub use terminology::{
    Icd10SubsumptionEvaluator, PrefixSubsumptionEvaluator, ReadV2SubsumptionEvaluator,
    SubsumptionEvaluator, SubsumptionRegistry,
};

// Re-export commonly used operator helpers
pub use operators::aggregate::sum_values;
pub use operators::apply_binary;
pub use operators::comparison::values_equal;
