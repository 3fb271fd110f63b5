//! Data binding
//!
//! Input bindings select the instances of their model, filter them through
//! the binding predicates and project element paths onto variable codes.
//! Output bindings turn written variables back into data instances.

use octofhir_gdl_ast::{DataBinding, ExpressionItem, Guideline, OperatorKind};
use octofhir_gdl_types::{DataInstance, DataValue};

use crate::context::EvaluationContext;
use crate::engine::{GdlEngine, null_flavor_key};
use crate::environment::VariableEnvironment;
use crate::error::EvalResult;
use crate::operators::to_double;

impl GdlEngine {
    /// Project the input instances onto the variables of a guideline
    pub fn build_environment(
        &self,
        guideline: &Guideline,
        inputs: &[DataInstance],
        ctx: &mut EvaluationContext<'_>,
    ) -> EvalResult<VariableEnvironment> {
        let mut env = VariableEnvironment::new();
        for binding in guideline.input_bindings() {
            let candidates: Vec<&DataInstance> =
                inputs.iter().filter(|i| i.model_id == binding.model_id).collect();
            let selected = self.filter_instances(binding, candidates, ctx)?;
            log::debug!(
                "binding {} ({}): {} instance(s) selected",
                binding.id,
                binding.model_id,
                selected.len()
            );

            // Absent elements project as null so that value lists stay
            // aligned by instance
            for instance in selected {
                for (code, element) in &binding.elements {
                    let value = instance.get(&element.path).cloned().unwrap_or(DataValue::Null);
                    env.insert(code.as_str(), value);
                }
            }
        }
        Ok(env)
    }

    /// Apply the binding predicates in order, with `max`/`min` selections
    /// last
    pub(crate) fn filter_instances<'i>(
        &self,
        binding: &DataBinding,
        mut candidates: Vec<&'i DataInstance>,
        ctx: &mut EvaluationContext<'_>,
    ) -> EvalResult<Vec<&'i DataInstance>> {
        let (extremes, ordinary): (Vec<&ExpressionItem>, Vec<&ExpressionItem>) =
            binding.predicates.iter().partition(|p| extreme(p).is_some());

        for predicate in ordinary {
            let mut kept = Vec::with_capacity(candidates.len());
            for instance in candidates {
                let env = instance_environment(binding, instance);
                if self.evaluate_condition(predicate, &env, ctx)? {
                    kept.push(instance);
                }
            }
            candidates = kept;
        }

        for predicate in extremes {
            if let Some((operator, path)) = extreme(predicate) {
                let path = binding
                    .elements
                    .get(path)
                    .map(|e| e.path.as_str())
                    .unwrap_or(path);
                candidates = select_extreme(operator, path, candidates, ctx).into_iter().collect();
            }
        }
        Ok(candidates)
    }

    /// Written variables of each output binding as a data instance, followed
    /// by the instances created by `create` statements
    pub(crate) fn project_outputs(
        &self,
        guideline: &Guideline,
        env: &VariableEnvironment,
        ctx: &mut EvaluationContext<'_>,
    ) -> Vec<DataInstance> {
        let mut outputs = Vec::new();
        for binding in guideline.output_bindings() {
            let mut instance = DataInstance::new(&binding.model_id);
            for (code, element) in &binding.elements {
                if ctx.is_claimed(code) {
                    continue;
                }
                if env.was_written(code) {
                    if let Some(value) = env.latest(code) {
                        instance.set(&element.path, value.clone());
                    }
                }
                let flavor_key = null_flavor_key(code);
                if env.was_written(&flavor_key) {
                    if let Some(flavor) = env.latest(&flavor_key) {
                        instance.set(format!("{}/null_flavour", element.path), flavor.clone());
                    }
                }
            }
            if !instance.is_empty() {
                outputs.push(instance);
            }
        }
        outputs.extend(ctx.take_created());
        outputs
    }
}

/// `max(path)` / `min(path)` predicates: the operator and the path or code
fn extreme(predicate: &ExpressionItem) -> Option<(OperatorKind, &str)> {
    match predicate {
        ExpressionItem::Unary(unary) if matches!(unary.operator, OperatorKind::Max | OperatorKind::Min) => {
            match unary.operand.as_ref() {
                ExpressionItem::Variable(v) => v.key().map(|key| (unary.operator, key)),
                _ => None,
            }
        }
        _ => None,
    }
}

/// The instance with the largest (or smallest) value at `path`. The first
/// instance wins ties; instances without a comparable value are ignored.
fn select_extreme<'i>(
    operator: OperatorKind,
    path: &str,
    candidates: Vec<&'i DataInstance>,
    ctx: &EvaluationContext<'_>,
) -> Option<&'i DataInstance> {
    let mut best: Option<(f64, &'i DataInstance)> = None;
    for instance in candidates {
        let Some(value) = instance.get(path).and_then(|v| to_double(v, ctx.now())) else {
            continue;
        };
        let better = match best {
            None => true,
            Some((current, _)) if operator == OperatorKind::Max => value > current,
            Some((current, _)) => value < current,
        };
        if better {
            best = Some((value, instance));
        }
    }
    best.map(|(_, instance)| instance)
}

/// Environment of a single candidate instance, addressable both by path
/// and by the binding's variable codes
fn instance_environment(binding: &DataBinding, instance: &DataInstance) -> VariableEnvironment {
    let mut env = VariableEnvironment::new();
    for (path, values) in instance.flattened() {
        if let Some(code) = binding.code_for_path(&path) {
            for value in &values {
                env.insert(code, value.clone());
            }
        }
        for value in values {
            env.insert(path.as_str(), value);
        }
    }
    env
}
