//! Guideline evaluation
//!
//! One guideline run goes through fixed phases: project the inputs, check
//! the preconditions, run the default actions, then try each rule in
//! priority order. A rule fires when every `when` condition is true; its
//! actions write the environment and its cards are rendered.

use indexmap::IndexMap;
use octofhir_gdl_ast::{Card, Guideline, Rule};
use octofhir_gdl_types::DataInstance;
use serde_json::Value;

use crate::config::RuleOrder;
use crate::context::EvaluationContext;
use crate::engine::GdlEngine;
use crate::environment::VariableEnvironment;
use crate::error::{EvalError, EvalResult};

/// How far a guideline run got
///
/// A run that stops at `NotStarted` had a precondition that did not hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EvaluationPhase {
    NotStarted,
    /// Every precondition was true
    PreconditionsChecked,
    DefaultActionsApplied,
    RulesEvaluating,
    Done,
}

/// Outcome of running one guideline
#[derive(Debug, Clone)]
pub struct GuidelineResult {
    pub guideline_id: String,
    pub phase: EvaluationPhase,
    /// Ids of the rules that fired, in firing order
    pub fired_rules: Vec<String>,
    pub outputs: Vec<DataInstance>,
    pub cards: Vec<Card>,
    /// Objects materialised from templates
    pub objects: Vec<Value>,
    /// Final variable environment
    pub environment: VariableEnvironment,
}

impl GuidelineResult {
    pub fn preconditions_passed(&self) -> bool {
        self.phase >= EvaluationPhase::PreconditionsChecked
    }

    fn advance(&mut self, phase: EvaluationPhase) {
        log::trace!("guideline {}: {:?} -> {:?}", self.guideline_id, self.phase, phase);
        self.phase = phase;
    }

    pub fn has_fired(&self, rule_id: &str) -> bool {
        self.fired_rules.iter().any(|id| id == rule_id)
    }

    /// First output instance of a model
    pub fn output(&self, model_id: &str) -> Option<&DataInstance> {
        self.outputs.iter().find(|o| o.model_id == model_id)
    }
}

/// A guideline that failed inside a batch run with `continue_on_error`
#[derive(Debug, Clone, PartialEq)]
pub struct GuidelineFailure {
    pub guideline_id: String,
    pub error: EvalError,
}

/// Outcome of running several guidelines in sequence
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub results: Vec<GuidelineResult>,
    /// Outputs of all guidelines, merged into one instance per model
    pub outputs: Vec<DataInstance>,
    pub failures: Vec<GuidelineFailure>,
}

impl BatchResult {
    pub fn output(&self, model_id: &str) -> Option<&DataInstance> {
        self.outputs.iter().find(|o| o.model_id == model_id)
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.results.iter().flat_map(|r| r.cards.iter())
    }
}

impl GdlEngine {
    /// Run one guideline against the given input instances
    pub fn evaluate_guideline(&self, guideline: &Guideline, inputs: &[DataInstance]) -> EvalResult<GuidelineResult> {
        log::debug!("evaluating guideline {}", guideline.id);
        let mut ctx = self.context(Some(guideline));
        let mut env = self.build_environment(guideline, inputs, &mut ctx)?;

        let mut result = GuidelineResult {
            guideline_id: guideline.id.clone(),
            phase: EvaluationPhase::NotStarted,
            fired_rules: Vec::new(),
            outputs: Vec::new(),
            cards: Vec::new(),
            objects: Vec::new(),
            environment: VariableEnvironment::new(),
        };

        for condition in &guideline.pre_conditions {
            let passed = self
                .evaluate_condition(condition, &env, &mut ctx)
                .map_err(|e| e.in_expression(condition.to_string(), vec![]))?;
            if !passed {
                log::debug!("guideline {}: precondition {condition} not met", guideline.id);
                result.environment = env;
                return Ok(result);
            }
        }

        result.advance(EvaluationPhase::PreconditionsChecked);

        env.begin_firing();
        for action in &guideline.default_actions {
            self.execute(action, &mut env, &mut ctx)?;
        }
        result.advance(EvaluationPhase::DefaultActionsApplied);

        result.advance(EvaluationPhase::RulesEvaluating);
        for rule in self.ordered_rules(guideline) {
            if !self.rule_applies(rule, &env, &mut ctx)? {
                log::trace!("rule {} not applicable", rule.id);
                continue;
            }

            env.begin_firing();
            for action in &rule.then {
                self.execute(action, &mut env, &mut ctx)?;
            }
            for card in &rule.cards {
                result.cards.push(self.render_card(card, &env, &ctx));
            }
            ctx.mark_fired(&rule.id);
            log::debug!("guideline {}: rule {} fired", guideline.id, rule.id);
        }

        result.advance(EvaluationPhase::Done);
        result.fired_rules = ctx.fired_rules().map(str::to_string).collect();
        result.outputs = self.project_outputs(guideline, &env, &mut ctx);
        result.objects = ctx.take_objects();
        result.environment = env;
        Ok(result)
    }

    /// Run guidelines in order. Each guideline sees the caller's inputs
    /// plus the merged outputs of the guidelines before it.
    pub fn evaluate_guidelines(&self, guidelines: &[Guideline], inputs: &[DataInstance]) -> EvalResult<BatchResult> {
        let mut batch = BatchResult::default();
        let mut merged: IndexMap<String, DataInstance> = IndexMap::new();

        for guideline in guidelines {
            let mut available = inputs.to_vec();
            available.extend(merged.values().cloned());

            match self.evaluate_guideline(guideline, &available) {
                Ok(result) => {
                    for output in &result.outputs {
                        match merged.get_mut(&output.model_id) {
                            Some(existing) => existing.merge(output.clone()),
                            None => {
                                merged.insert(output.model_id.clone(), output.clone());
                            }
                        }
                    }
                    batch.results.push(result);
                }
                Err(error) if self.config().continue_on_error => {
                    log::warn!("guideline {} failed: {error}", guideline.id);
                    batch.failures.push(GuidelineFailure {
                        guideline_id: guideline.id.clone(),
                        error,
                    });
                }
                Err(error) => return Err(error),
            }
        }

        batch.outputs = merged.into_values().collect();
        Ok(batch)
    }

    /// Rules sorted by priority; equal priorities keep declaration order
    fn ordered_rules<'g>(&self, guideline: &'g Guideline) -> Vec<&'g Rule> {
        let mut rules: Vec<&Rule> = guideline.rules.iter().collect();
        match self.config().rule_order {
            RuleOrder::Ascending => rules.sort_by_key(|r| r.priority),
            RuleOrder::Descending => rules.sort_by(|a, b| b.priority.cmp(&a.priority)),
        }
        rules
    }

    fn rule_applies(
        &self,
        rule: &Rule,
        env: &VariableEnvironment,
        ctx: &mut EvaluationContext<'_>,
    ) -> EvalResult<bool> {
        for condition in &rule.when {
            let holds = self
                .evaluate_condition(condition, env, ctx)
                .map_err(|e| e.in_expression(condition.to_string(), vec![]))?;
            if !holds {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
