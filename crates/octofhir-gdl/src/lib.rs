//! Guideline Definition Language (GDL) engine for Rust
//!
//! This crate bundles the GDL implementation:
//! - The clinical value model and data instances
//! - The expression and guideline model, with operator precedence
//! - Rule evaluation, data binding, templates and cards
//!
//! # Example
//!
//! ```ignore
//! use octofhir_gdl::{GdlEngine, Guideline};
//!
//! let guideline: Guideline = serde_json::from_str(&json)?;
//! let engine = GdlEngine::new();
//! let result = engine.evaluate_guideline(&guideline, &inputs)?;
//! ```

// Re-export all public APIs from internal crates
pub use octofhir_gdl_ast as ast;
pub use octofhir_gdl_eval as eval;
pub use octofhir_gdl_types as types;

// Convenience re-exports
pub use octofhir_gdl_ast::{Card, DataBinding, ExpressionItem, Guideline, Rule};
pub use octofhir_gdl_eval::{
    BatchResult, EngineConfig, EvalError, EvalResult, GdlEngine, GuidelineResult, ObjectCreator,
};
pub use octofhir_gdl_types::{DataInstance, DataValue};
