//! Terminology subsumption
//!
//! `is_a` checks whether one code is subsumed by another. Each terminology
//! can register its own evaluator; codes of unregistered terminologies are
//! compared by prefix.

use indexmap::IndexMap;
use octofhir_gdl_ast::{BinaryExpression, Ontology, OperatorKind};
use octofhir_gdl_types::{CodePhrase, DataValue};
use std::fmt;
use std::sync::Arc;

use crate::context::EvaluationContext;
use crate::engine::GdlEngine;
use crate::environment::VariableEnvironment;
use crate::error::EvalResult;

/// Decides whether `code_a` is subsumed by `code_b` within one terminology
pub trait SubsumptionEvaluator: Send + Sync {
    fn is_a(&self, code_a: &str, code_b: &str) -> bool;
}

/// `code_a` starts with `code_b`
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixSubsumptionEvaluator;

impl SubsumptionEvaluator for PrefixSubsumptionEvaluator {
    fn is_a(&self, code_a: &str, code_b: &str) -> bool {
        code_a.starts_with(code_b)
    }
}

/// Read codes v2: `code_b` is cut at its first `.` before the prefix test
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadV2SubsumptionEvaluator;

impl SubsumptionEvaluator for ReadV2SubsumptionEvaluator {
    fn is_a(&self, code_a: &str, code_b: &str) -> bool {
        let parent = code_b.split('.').next().unwrap_or(code_b);
        code_a.starts_with(parent)
    }
}

/// ICD-10: dots are ignored on both sides (`E10.1` is-a `E10`)
#[derive(Debug, Clone, Copy, Default)]
pub struct Icd10SubsumptionEvaluator;

impl SubsumptionEvaluator for Icd10SubsumptionEvaluator {
    fn is_a(&self, code_a: &str, code_b: &str) -> bool {
        let a: String = code_a.chars().filter(|c| *c != '.').collect();
        let b: String = code_b.chars().filter(|c| *c != '.').collect();
        a.starts_with(&b)
    }
}

/// Terminology id to evaluator
#[derive(Clone)]
pub struct SubsumptionRegistry {
    evaluators: IndexMap<String, Arc<dyn SubsumptionEvaluator>>,
    fallback: Arc<dyn SubsumptionEvaluator>,
}

impl Default for SubsumptionRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for SubsumptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubsumptionRegistry")
            .field("terminologies", &self.evaluators.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SubsumptionRegistry {
    /// Registry with prefix comparison for every terminology
    pub fn empty() -> Self {
        Self {
            evaluators: IndexMap::new(),
            fallback: Arc::new(PrefixSubsumptionEvaluator),
        }
    }

    /// Registry with the ICD-10 and Read v2 evaluators
    pub fn standard() -> Self {
        Self::empty()
            .with("ICD10", Icd10SubsumptionEvaluator)
            .with("READ2", ReadV2SubsumptionEvaluator)
    }

    pub fn with(mut self, terminology: impl Into<String>, evaluator: impl SubsumptionEvaluator + 'static) -> Self {
        self.register(terminology, evaluator);
        self
    }

    pub fn register(&mut self, terminology: impl Into<String>, evaluator: impl SubsumptionEvaluator + 'static) {
        self.evaluators.insert(terminology.into(), Arc::new(evaluator));
    }

    pub fn evaluator(&self, terminology: &str) -> &dyn SubsumptionEvaluator {
        self.evaluators
            .get(terminology)
            .map(|evaluator| evaluator.as_ref())
            .unwrap_or(self.fallback.as_ref())
    }

    /// Whether `a` is subsumed by `b`.
    ///
    /// When `b` is a guideline-local term with bindings in `a`'s terminology,
    /// `a` must be subsumed by one of the bound codes. Otherwise both codes
    /// must come from the same terminology.
    pub fn is_a(&self, a: &CodePhrase, b: &CodePhrase, ontology: Option<&Ontology>) -> bool {
        if b.is_local() {
            let bound = ontology
                .map(|o| o.bindings_in(&a.terminology, &b.code))
                .unwrap_or(&[]);
            if !bound.is_empty() {
                return bound.iter().any(|code| self.same_terminology_is_a(a, code));
            }
        }
        self.same_terminology_is_a(a, b)
    }

    /// `is_a` over evaluated operands; `None` when either side is not coded
    pub fn is_a_value(&self, a: &DataValue, b: &DataValue, ontology: Option<&Ontology>) -> Option<bool> {
        let a = coded(a)?;
        let b = coded(b)?;
        Some(self.is_a(&a, &b, ontology))
    }

    fn same_terminology_is_a(&self, a: &CodePhrase, b: &CodePhrase) -> bool {
        a.terminology == b.terminology && self.evaluator(&a.terminology).is_a(&a.code, &b.code)
    }
}

/// Code phrase of a coded value, or of a `terminology::code` string
fn coded(value: &DataValue) -> Option<CodePhrase> {
    match value {
        DataValue::String(s) | DataValue::Text(s) => CodePhrase::parse(s).ok(),
        other => other.code_phrase().cloned(),
    }
}

impl GdlEngine {
    /// `is_a` / `!is_a`. Non-coded operands give false for both.
    pub(crate) fn eval_subsumption(
        &self,
        expr: &BinaryExpression,
        env: &VariableEnvironment,
        ctx: &mut EvaluationContext<'_>,
    ) -> EvalResult<DataValue> {
        let left = self.evaluate(&expr.left, env, ctx)?;
        let right = self.evaluate(&expr.right, env, ctx)?;
        let ontology = ctx.guideline().map(|g| &g.ontology);

        let result = match self.subsumption().is_a_value(&left, &right, ontology) {
            Some(is_a) if expr.operator == OperatorKind::IsNotA => !is_a,
            Some(is_a) => is_a,
            None => false,
        };
        Ok(DataValue::Boolean(result))
    }
}
